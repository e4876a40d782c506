use crate::cc::{
    BcnAimd, BcnMessage, CongestionStrategy, Feedback, NoControl, RateAdvertisement, SignalBoard,
    TickContext, build_strategy, estimated_arrival_interval,
};
use crate::net::{Ack, FlowId, QueueSnapshot, Sender};
use crate::sim::{SimConfig, StrategyKind, Tick};

fn snapshot(len: usize) -> QueueSnapshot {
    QueueSnapshot {
        len,
        prev_len: len,
        capacity: 15,
        eq_threshold: 4,
        severe_threshold: 11,
    }
}

#[test]
fn bcn_classification_follows_queue_regions() {
    // 平衡区：看标记
    assert_eq!(BcnAimd::classify(false, &snapshot(0)), BcnMessage::Nil);
    assert_eq!(BcnAimd::classify(false, &snapshot(4)), BcnMessage::Nil);
    assert_eq!(BcnAimd::classify(true, &snapshot(4)), BcnMessage::Normal);
    // 中间区：总是 NORMAL
    assert_eq!(BcnAimd::classify(false, &snapshot(5)), BcnMessage::Normal);
    assert_eq!(BcnAimd::classify(false, &snapshot(11)), BcnMessage::Normal);
    // 严重拥塞
    assert_eq!(BcnAimd::classify(false, &snapshot(12)), BcnMessage::Stop);
    assert_eq!(BcnAimd::classify(true, &snapshot(15)), BcnMessage::Stop);
}

#[test]
fn bcn_ack_publishes_process_wide_signal() {
    let strategy = BcnAimd::new(1);
    let mut board = SignalBoard::default();
    let mut s = Sender::new(FlowId(1), 1, 50, 10);
    assert_eq!(board.message(), BcnMessage::Nil);

    let ack = Ack {
        flow: FlowId(1),
        seq: 0,
        feedback: Some(Feedback::Bcn {
            message: BcnMessage::Stop,
            measure: -6,
        }),
    };
    strategy.on_ack(&mut s, &ack, &mut board);
    assert!(board.is_stop());
    assert_eq!(board.measure(), -6);
    // 信号是全局的，ACK 本身不改速率
    assert_eq!(s.rate(), 10);
}

#[test]
fn arrival_interval_matches_two_sender_formula() {
    for (r1, r2) in [(10_u64, 10_u64), (10, 30), (7, 13), (1, 64), (20, 40)] {
        let general = estimated_arrival_interval([r1, r2]).expect("non-empty");
        let pair = (r1 * r2) as f64 / (r1 + r2) as f64;
        assert!((general - pair).abs() < 1e-9, "{r1},{r2}: {general} vs {pair}");
    }
    assert_eq!(estimated_arrival_interval([10, 10]), Some(5.0));
    assert_eq!(estimated_arrival_interval([30, 30, 30]), Some(10.0));
}

#[test]
fn arrival_interval_rejects_degenerate_inputs() {
    assert_eq!(estimated_arrival_interval(Vec::<u64>::new()), None);
    assert_eq!(estimated_arrival_interval([10, 0]), None);
}

#[test]
fn advertised_rate_scales_by_load_factor() {
    let mut ra = RateAdvertisement::new(20, 200);
    // 到达间隔 5，服务间隔 10：负载因子 2
    ra.recompute(10, 5.0);
    assert_eq!(ra.advertised_rate(), Some(40));
    // 到达间隔 20：负载因子 0.5
    ra.recompute(10, 20.0);
    assert_eq!(ra.advertised_rate(), Some(20));
    // 2.5 -> 2
    let mut ra = RateAdvertisement::new(1, 200);
    ra.recompute(10, 4.0);
    assert_eq!(ra.advertised_rate(), Some(2));
}

#[test]
fn advertised_rate_recomputed_only_on_interval_ticks() {
    let senders = vec![
        Sender::new(FlowId(0), 1, 50, 10),
        Sender::new(FlowId(1), 1, 50, 10),
    ];
    let ctx = TickContext {
        switch_rate: 10,
        senders: &senders,
    };
    let mut ra = RateAdvertisement::new(20, 200);

    ra.on_tick_end(Tick(0), &ctx);
    assert_eq!(ra.advertised_rate(), Some(40));
    for t in 1..200 {
        ra.on_tick_end(Tick(t), &ctx);
        assert_eq!(ra.advertised_rate(), Some(40));
    }
    ra.on_tick_end(Tick(200), &ctx);
    assert_eq!(ra.advertised_rate(), Some(80));
}

#[test]
fn advertised_rate_ack_sets_sender_rate() {
    let strategy = RateAdvertisement::new(20, 200);
    let mut board = SignalBoard::default();
    let mut s = Sender::new(FlowId(0), 1, 50, 10);
    let ack = Ack {
        flow: FlowId(0),
        seq: 0,
        feedback: Some(Feedback::AdvertisedRate(35)),
    };
    strategy.on_ack(&mut s, &ack, &mut board);
    assert_eq!(s.rate(), 35);
    assert_eq!(board, SignalBoard::default());
}

#[test]
fn no_control_ignores_feedback() {
    let strategy = NoControl;
    let mut board = SignalBoard::default();
    let mut s = Sender::new(FlowId(0), 1, 50, 10);
    let ack = Ack {
        flow: FlowId(0),
        seq: 0,
        feedback: Some(Feedback::AdvertisedRate(35)),
    };
    strategy.on_ack(&mut s, &ack, &mut board);
    assert_eq!(s.rate(), 10);
    assert_eq!(strategy.advertised_rate(), None);
}

#[test]
fn build_strategy_follows_config() {
    for kind in StrategyKind::ALL {
        let cfg = SimConfig::preset(kind);
        assert_eq!(build_strategy(&cfg).kind(), kind);
    }
    // r0 = switch_rate * N
    let mut cfg = SimConfig::preset(StrategyKind::RateAdvertisement);
    cfg.num_senders = 3;
    assert_eq!(build_strategy(&cfg).advertised_rate(), Some(30));
}
