//! 运行结果汇总

use serde::Serialize;

use super::config::StrategyKind;
use super::time::Tick;
use crate::net::{FlowId, Stats};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowSummary {
    pub flow: FlowId,
    pub sent: u64,
    pub acked: u64,
    pub retransmits: u64,
    pub completed_at: Option<Tick>,
    pub final_rate: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub strategy: StrategyKind,
    /// 运行的 tick 数
    pub ticks: u64,
    /// 接收方按序确认的 ACK 数
    pub acks_sent: u64,
    /// 交换机发出的反馈数
    pub feedback_sent: u64,
    /// 信令开销 = acks_sent + feedback_sent
    pub overhead: u64,
    pub stats: Stats,
    pub flows: Vec<FlowSummary>,
}
