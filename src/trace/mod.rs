//! 轨迹输出
//!
//! 接收方每处理一个 packet 产生一条 `TraceRecord`，交给 `TraceSink`；仿真
//! 结束时 sink 还会收到 `Summary`。

mod sink;

pub use sink::{LineSink, TraceFormat};

use serde::{Deserialize, Serialize};

use crate::cc::BcnMessage;
use crate::net::FlowId;
use crate::sim::{SimError, Summary, Tick};

/// 一个被接收方处理的 packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub flow: FlowId,
    pub seq: u64,
    pub send_time: Tick,
    pub receive_time: Tick,
    /// 发送时的速率
    pub rate: u64,
}

/// 每个 tick 注入阶段结束后的队列采样（用于离线绘图）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueSample {
    pub tick: Tick,
    pub queue_len: usize,
    pub signal: BcnMessage,
    pub advertised_rate: Option<u64>,
}

pub trait TraceSink {
    fn record(&mut self, rec: &TraceRecord) -> Result<(), SimError>;

    fn summary(&mut self, _summary: &Summary) -> Result<(), SimError> {
        Ok(())
    }
}

/// 内存中收集轨迹
impl TraceSink for Vec<TraceRecord> {
    fn record(&mut self, rec: &TraceRecord) -> Result<(), SimError> {
        self.push(*rec);
        Ok(())
    }
}
