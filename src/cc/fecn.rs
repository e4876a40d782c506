//! FECN 风格的速率通告
//!
//! 交换机维护一个通告速率（tick 间隔）。每个经过瓶颈的 packet 的反馈字段被
//! 收紧为 `max(字段, 通告速率)`，接收方在 ACK 中回显，发送方直接采用。
//! 每 `t_interval` 个 tick 按负载因子重新计算一次通告速率。

use tracing::debug;

use super::{CongestionStrategy, Feedback, SignalBoard, TickContext};
use crate::net::{Ack, Packet, QueueSnapshot, Sender};
use crate::sim::{StrategyKind, Tick};

#[derive(Debug, Clone)]
pub struct RateAdvertisement {
    advertised_rate: u64,
    t_interval: u64,
}

/// 估计聚合到达间隔：各发送方以各自间隔发送时，整体的平均到达间隔为
/// `1 / Σ(1 / r_i)`。两个发送方时即 `r1 * r2 / (r1 + r2)`。
///
/// 没有发送方或存在 0 间隔时返回 None。
pub fn estimated_arrival_interval(rates: impl IntoIterator<Item = u64>) -> Option<f64> {
    let mut inv_sum = 0.0_f64;
    let mut n = 0usize;
    for r in rates {
        if r == 0 {
            return None;
        }
        inv_sum += 1.0 / r as f64;
        n += 1;
    }
    if n == 0 {
        return None;
    }
    Some(1.0 / inv_sum)
}

impl RateAdvertisement {
    pub fn new(initial_rate: u64, t_interval: u64) -> Self {
        Self {
            advertised_rate: initial_rate,
            t_interval,
        }
    }

    pub fn t_interval(&self) -> u64 {
        self.t_interval
    }

    /// `advertised = round(advertised * switch_rate / arrival_interval)`
    pub fn recompute(&mut self, switch_rate: u64, arrival_interval: f64) {
        let load_factor = switch_rate as f64 / arrival_interval;
        let next = (self.advertised_rate as f64 * load_factor).round_ties_even();
        debug!(
            old = self.advertised_rate,
            new = next,
            arrival_interval,
            load_factor,
            "重新计算通告速率"
        );
        self.advertised_rate = next as u64;
    }
}

impl CongestionStrategy for RateAdvertisement {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RateAdvertisement
    }

    fn on_enqueue(&mut self, pkt: Packet, _q: &QueueSnapshot) -> Packet {
        pkt.stamped(self.advertised_rate)
    }

    fn on_ack(&self, sender: &mut Sender, ack: &Ack, _board: &mut SignalBoard) {
        if let Some(fb @ Feedback::AdvertisedRate(_)) = ack.feedback {
            sender.apply_feedback(&fb);
        }
    }

    fn on_tick_end(&mut self, now: Tick, ctx: &TickContext<'_>) {
        if !now.is_multiple_of(self.t_interval) {
            return;
        }
        if let Some(arrival) = estimated_arrival_interval(ctx.senders.iter().map(|s| s.rate())) {
            self.recompute(ctx.switch_rate, arrival);
        }
    }

    fn advertised_rate(&self) -> Option<u64> {
        Some(self.advertised_rate)
    }
}
