use crate::cc::{BcnMessage, Feedback};
use crate::net::{FlowId, Packet, Receiver, Relayed};
use crate::sim::Tick;
use crate::trace::TraceRecord;

fn relayed(flow: usize, seq: u64) -> Relayed {
    Relayed {
        pkt: Packet::new(FlowId(flow), seq, Tick(seq * 10), 10, false),
        feedback: None,
    }
}

#[test]
fn in_order_arrivals_advance_expected_sequence() {
    let mut rx = Receiver::new(2, 2);
    let mut log: Vec<TraceRecord> = Vec::new();

    let ack = rx.handle(relayed(1, 0), &mut log).expect("handle");
    assert_eq!(ack.flow, FlowId(1));
    assert_eq!(ack.seq, 0);
    assert_eq!(rx.expected(FlowId(1)), 1);
    assert_eq!(rx.expected(FlowId(0)), 0);
    assert_eq!(rx.acks_sent(), 1);
}

#[test]
fn duplicate_and_out_of_order_arrivals_are_traced_but_not_counted() {
    let mut rx = Receiver::new(1, 5);
    let mut log: Vec<TraceRecord> = Vec::new();

    rx.handle(relayed(0, 0), &mut log).expect("handle");
    let ack = rx.handle(relayed(0, 2), &mut log).expect("handle");
    assert_eq!(ack.seq, 2);
    rx.handle(relayed(0, 0), &mut log).expect("handle");

    assert_eq!(rx.expected(FlowId(0)), 1);
    assert_eq!(rx.acks_sent(), 1);
    assert_eq!(rx.duplicates(), 2);
    assert_eq!(log.len(), 3);
}

#[test]
fn trace_record_uses_receiver_clock() {
    let mut rx = Receiver::new(1, 5);
    let mut log: Vec<TraceRecord> = Vec::new();
    for _ in 0..42 {
        rx.tick();
    }
    rx.handle(relayed(0, 0), &mut log).expect("handle");
    assert_eq!(
        log,
        vec![TraceRecord {
            flow: FlowId(0),
            seq: 0,
            send_time: Tick(0),
            receive_time: Tick(42),
            rate: 10,
        }]
    );
}

#[test]
fn is_complete_is_idempotent() {
    let mut rx = Receiver::new(2, 1);
    let mut log: Vec<TraceRecord> = Vec::new();
    assert!(!rx.is_complete());
    assert!(!rx.is_complete());

    rx.handle(relayed(0, 0), &mut log).expect("handle");
    assert!(!rx.is_complete());
    rx.handle(relayed(1, 0), &mut log).expect("handle");
    assert!(rx.is_complete());
    assert!(rx.is_complete());
    assert_eq!(rx.delivered(), 2);
}

#[test]
fn ack_carries_strategy_feedback() {
    let mut rx = Receiver::new(1, 5);
    let mut log: Vec<TraceRecord> = Vec::new();

    let bcn = Feedback::Bcn {
        message: BcnMessage::Stop,
        measure: -2,
    };
    let mut r = relayed(0, 0);
    r.feedback = Some(bcn);
    assert_eq!(rx.handle(r, &mut log).expect("handle").feedback, Some(bcn));

    let r = Relayed {
        pkt: Packet::new(FlowId(0), 1, Tick(10), 10, false).stamped(40),
        feedback: None,
    };
    assert_eq!(
        rx.handle(r, &mut log).expect("handle").feedback,
        Some(Feedback::AdvertisedRate(40))
    );

    assert_eq!(rx.handle(relayed(0, 2), &mut log).expect("handle").feedback, None);
}
