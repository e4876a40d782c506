//! 拥塞控制策略
//!
//! 三种策略共享同一个仿真引擎，差异只在反馈的计算与速率调整规则：
//! - `NoControl`：不做任何控制（基线）
//! - `BcnAimd`：交换机按队列占用发出 NORMAL / STOP / NIL，发送方做 AIMD
//! - `RateAdvertisement`：交换机周期性计算通告速率，随数据包/ACK 回传

mod bcn;
mod fecn;
mod none;
mod signal;

pub use bcn::BcnAimd;
pub use fecn::{RateAdvertisement, estimated_arrival_interval};
pub use none::NoControl;
pub use signal::{BcnMessage, Feedback, SignalBoard};

use std::fmt;

use crate::net::{Ack, Packet, QueueSnapshot, Sender};
use crate::sim::{SimConfig, StrategyConfig, StrategyKind, Tick};

/// 每个 tick 结束前交给策略的只读上下文
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub switch_rate: u64,
    pub senders: &'a [Sender],
}

/// 拥塞控制策略接口
///
/// 钩子在一个 tick 内的调用顺序：`on_dequeue` → `on_ack` →
/// （每个发送方）`on_send_opportunity` → `on_enqueue` → `on_tick_end`。
pub trait CongestionStrategy: fmt::Debug {
    fn kind(&self) -> StrategyKind;

    /// packet 进入交换机缓冲区之前调用，可返回改写后的副本。
    /// 无论随后是否被尾丢弃都会调用。
    fn on_enqueue(&mut self, pkt: Packet, _q: &QueueSnapshot) -> Packet {
        pkt
    }

    /// 交换机出队一个 packet 之后调用（`q` 为出队后的队列状态）。
    /// 返回 Some 计为一次交换机发出的信令。
    fn on_dequeue(&mut self, _pkt: &Packet, _q: &QueueSnapshot) -> Option<Feedback> {
        None
    }

    /// ACK 到达发送方
    fn on_ack(&self, _sender: &mut Sender, _ack: &Ack, _board: &mut SignalBoard) {}

    /// 发送方速率门控打开且未被 STOP 阻塞
    fn on_send_opportunity(&self, _sender: &mut Sender, _board: &SignalBoard) {}

    /// 注入阶段结束、各组件时钟推进之前
    fn on_tick_end(&mut self, _now: Tick, _ctx: &TickContext<'_>) {}

    /// 当前通告速率（仅速率通告策略有）
    fn advertised_rate(&self) -> Option<u64> {
        None
    }
}

/// 按配置构造策略对象
pub fn build_strategy(cfg: &SimConfig) -> Box<dyn CongestionStrategy> {
    match cfg.strategy {
        StrategyConfig::None => Box::new(NoControl),
        StrategyConfig::Ecn { congestion_weight } => Box::new(BcnAimd::new(congestion_weight)),
        StrategyConfig::RateAdvertisement { t_interval } => {
            // 初始通告速率 r0 = C / N0（以 tick 间隔表示即 switch_rate * N）
            let initial = cfg.switch_rate.saturating_mul(cfg.num_senders as u64);
            Box::new(RateAdvertisement::new(initial, t_interval))
        }
    }
}
