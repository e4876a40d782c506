use crate::cc::{BcnAimd, BcnMessage, Feedback, NoControl, RateAdvertisement};
use crate::net::{FlowId, Packet, QueueSnapshot, Switch};
use crate::sim::Tick;

fn pkt(seq: u64, rate_limited: bool) -> Packet {
    Packet::new(FlowId(0), seq, Tick::ZERO, 10, rate_limited)
}

fn advance(sw: &mut Switch, ticks: u64) {
    for _ in 0..ticks {
        sw.tick();
    }
}

#[test]
fn thresholds_round_half_to_even() {
    let cases = [(15, 4, 11), (21, 5, 16), (10, 2, 8), (2, 0, 2), (4, 1, 3)];
    for (cap, eq, sc) in cases {
        let sw = Switch::new(cap, 1);
        assert_eq!(sw.eq_threshold(), eq, "q_eq for capacity {cap}");
        assert_eq!(sw.severe_threshold(), sc, "q_sc for capacity {cap}");
    }
}

#[test]
fn egress_is_rate_gated() {
    let mut strategy = NoControl;
    let mut sw = Switch::new(8, 10);
    for seq in 0..3 {
        assert!(sw.receive(Some(pkt(seq, false)), &mut strategy));
    }
    assert!(!sw.receive(None, &mut strategy));

    let first = sw.try_send(&mut strategy).expect("ok").expect("gate open at 0");
    assert_eq!(first.pkt.seq, 0);
    assert_eq!(first.feedback, None);

    for _ in 1..10 {
        sw.tick();
        assert!(sw.try_send(&mut strategy).expect("ok").is_none());
    }
    sw.tick();
    assert_eq!(sw.now(), Tick(10));
    let second = sw.try_send(&mut strategy).expect("ok").expect("gate open at 10");
    assert_eq!(second.pkt.seq, 1);
    assert_eq!(sw.queue_len(), 1);
    assert_eq!(sw.feedback_sent(), 0);
}

#[test]
fn empty_queue_relays_nothing() {
    let mut strategy = NoControl;
    let mut sw = Switch::new(4, 1);
    assert!(sw.try_send(&mut strategy).expect("ok").is_none());
}

#[test]
fn full_buffer_drops_arrivals() {
    let mut strategy = NoControl;
    let mut sw = Switch::new(2, 1);
    assert!(sw.receive(Some(pkt(0, false)), &mut strategy));
    assert!(sw.receive(Some(pkt(1, false)), &mut strategy));
    assert!(!sw.receive(Some(pkt(2, false)), &mut strategy));
    assert_eq!(sw.queue_len(), 2);
    assert_eq!(sw.drops(), 1);
    let seqs: Vec<u64> = sw.queue().iter().map(|p| p.seq).collect();
    assert_eq!(seqs, vec![0, 1]);
}

#[test]
fn congestion_measure_combines_offset_and_delta() {
    let q = QueueSnapshot {
        len: 6,
        prev_len: 8,
        capacity: 15,
        eq_threshold: 4,
        severe_threshold: 11,
    };
    assert_eq!(q.offset(), -2);
    // 队列在排空
    assert_eq!(q.delta(), 2);
    assert_eq!(q.congestion_measure(1), -4);
    assert_eq!(q.congestion_measure(0), -2);
    assert_eq!(q.congestion_measure(3), -8);
}

#[test]
fn congestion_measure_saturates_for_extreme_weights() {
    let draining = QueueSnapshot {
        len: 6,
        prev_len: 8,
        capacity: 15,
        eq_threshold: 4,
        severe_threshold: 11,
    };
    assert_eq!(draining.congestion_measure(i64::MAX), i64::MIN);

    let filling = QueueSnapshot {
        len: 0,
        prev_len: 12,
        ..draining
    };
    // q_delta > 0，乘积饱和到 i64::MAX
    assert_eq!(filling.congestion_measure(i64::MAX), 4 - i64::MAX);

    let growing = QueueSnapshot {
        len: 2,
        prev_len: 0,
        ..draining
    };
    assert_eq!(growing.congestion_measure(i64::MAX), i64::MAX);
}

#[test]
fn bcn_feedback_is_computed_on_post_pop_queue_length() {
    let mut strategy = BcnAimd::new(1);
    let mut sw = Switch::new(15, 10);
    for seq in 0..13 {
        assert!(sw.receive(Some(pkt(seq, false)), &mut strategy));
    }

    // L = 12 > q_sc = 11
    let r = sw.try_send(&mut strategy).expect("ok").expect("pkt");
    assert_eq!(
        r.feedback,
        Some(Feedback::Bcn {
            message: BcnMessage::Stop,
            // (4 - 12) - 1 * (0 - 12)
            measure: 4,
        })
    );

    advance(&mut sw, 10);
    // L = 11 = q_sc
    let r = sw.try_send(&mut strategy).expect("ok").expect("pkt");
    assert_eq!(
        r.feedback,
        Some(Feedback::Bcn {
            message: BcnMessage::Normal,
            // (4 - 11) - 1 * (12 - 11)
            measure: -8,
        })
    );
    assert_eq!(sw.feedback_sent(), 2);
}

#[test]
fn bcn_low_queue_feedback_depends_on_rate_limited_tag() {
    let mut strategy = BcnAimd::new(1);
    let mut sw = Switch::new(15, 1);
    sw.receive(Some(pkt(0, false)), &mut strategy);
    sw.receive(Some(pkt(1, true)), &mut strategy);

    let r = sw.try_send(&mut strategy).expect("ok").expect("pkt");
    assert!(matches!(
        r.feedback,
        Some(Feedback::Bcn {
            message: BcnMessage::Nil,
            ..
        })
    ));
    sw.tick();
    let r = sw.try_send(&mut strategy).expect("ok").expect("pkt");
    assert!(matches!(
        r.feedback,
        Some(Feedback::Bcn {
            message: BcnMessage::Normal,
            ..
        })
    ));
}

#[test]
fn rate_advertisement_stamps_packets_on_ingress() {
    let mut strategy = RateAdvertisement::new(20, 200);
    let mut sw = Switch::new(4, 1);

    sw.receive(Some(pkt(0, false)), &mut strategy);
    sw.receive(Some(pkt(1, false).stamped(30)), &mut strategy);
    sw.receive(Some(pkt(2, false).stamped(5)), &mut strategy);

    let stamps: Vec<Option<u64>> = sw.queue().iter().map(|p| p.advertised_rate).collect();
    assert_eq!(stamps, vec![Some(20), Some(30), Some(20)]);

    let r = sw.try_send(&mut strategy).expect("ok").expect("pkt");
    assert_eq!(r.feedback, None);
    assert_eq!(sw.feedback_sent(), 0);
}
