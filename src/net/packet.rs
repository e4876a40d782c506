//! 数据包类型
//!
//! 定义发送方产生的数据包，以及经交换机转发、接收方回送的 ACK。

use super::id::FlowId;
use crate::cc::Feedback;
use crate::sim::Tick;

/// 数据包：创建后只读。
///
/// 速率通告策略需要在瓶颈处改写反馈字段，此时通过 [`Packet::stamped`]
/// 生成一个新副本，而不是原地修改。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub flow: FlowId,
    pub seq: u64,
    pub send_time: Tick,
    /// 发送时的速率（tick 间隔）
    pub rate_at_send: u64,
    /// 发送方当前处于限速状态（速率慢于基准速率）
    pub rate_limited: bool,
    /// 速率通告字段；None 表示尚未经过任何瓶颈
    pub advertised_rate: Option<u64>,
}

impl Packet {
    pub fn new(flow: FlowId, seq: u64, send_time: Tick, rate_at_send: u64, rate_limited: bool) -> Self {
        Self {
            flow,
            seq,
            send_time,
            rate_at_send,
            rate_limited,
            advertised_rate: None,
        }
    }

    /// 经过瓶颈时取 `max(当前字段, 通告速率)`，只会单调收紧。
    pub fn stamped(self, advertised_rate: u64) -> Self {
        let rate = match self.advertised_rate {
            Some(cur) => cur.max(advertised_rate),
            None => advertised_rate,
        };
        Self {
            advertised_rate: Some(rate),
            ..self
        }
    }
}

/// 交换机转发出的一个 packet，以及该次出队产生的反馈（如果有）
#[derive(Debug, Clone, PartialEq)]
pub struct Relayed {
    pub pkt: Packet,
    pub feedback: Option<Feedback>,
}

/// 接收方回送给发送方的确认
#[derive(Debug, Clone, PartialEq)]
pub struct Ack {
    pub flow: FlowId,
    pub seq: u64,
    pub feedback: Option<Feedback>,
}
