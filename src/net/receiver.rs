//! 接收方
//!
//! 终点：对每个到达的 packet 记录一条轨迹并回送 ACK，按流严格按序推进
//! 期望序号。

use tracing::trace;

use super::id::FlowId;
use super::packet::{Ack, Relayed};
use crate::cc::Feedback;
use crate::sim::{SimError, Tick};
use crate::trace::{TraceRecord, TraceSink};

#[derive(Debug, Clone)]
pub struct Receiver {
    expected: Vec<u64>,
    total: u64,
    clock: Tick,
    acks_sent: u64,
    duplicates: u64,
}

impl Receiver {
    pub fn new(num_flows: usize, total_per_flow: u64) -> Self {
        Self {
            expected: vec![0; num_flows],
            total: total_per_flow,
            clock: Tick::ZERO,
            acks_sent: 0,
            duplicates: 0,
        }
    }

    pub fn now(&self) -> Tick {
        self.clock
    }

    pub fn tick(&mut self) {
        self.clock.advance();
    }

    pub fn expected(&self, flow: FlowId) -> u64 {
        self.expected.get(flow.0).copied().unwrap_or(0)
    }

    /// 按序确认的 ACK 数
    pub fn acks_sent(&self) -> u64 {
        self.acks_sent
    }

    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }

    /// 所有流都已按序收齐
    pub fn is_complete(&self) -> bool {
        self.expected.iter().all(|&e| e >= self.total)
    }

    /// 已按序收到的 packet 总数
    pub fn delivered(&self) -> u64 {
        self.expected.iter().sum()
    }

    /// 处理一个到达的 packet，返回回送给发送方的 ACK。
    ///
    /// 每个到达都会记录轨迹并生成 ACK；只有序号等于期望值时才推进并计数。
    /// BCN 消息取自出队时的反馈，速率通告取自 packet 上的字段。
    pub fn handle(&mut self, relayed: Relayed, sink: &mut dyn TraceSink) -> Result<Ack, SimError> {
        let Relayed { pkt, feedback } = relayed;
        sink.record(&TraceRecord {
            flow: pkt.flow,
            seq: pkt.seq,
            send_time: pkt.send_time,
            receive_time: self.clock,
            rate: pkt.rate_at_send,
        })?;

        let expected = &mut self.expected[pkt.flow.0];
        if pkt.seq == *expected {
            *expected += 1;
            self.acks_sent += 1;
        } else {
            self.duplicates += 1;
            trace!(flow = %pkt.flow, seq = pkt.seq, expected = *expected, "乱序/重复到达");
        }

        Ok(Ack {
            flow: pkt.flow,
            seq: pkt.seq,
            feedback: feedback.or(pkt.advertised_rate.map(Feedback::AdvertisedRate)),
        })
    }
}
