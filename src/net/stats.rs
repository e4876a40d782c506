//! 统计信息

use serde::Serialize;

/// 仿真统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// 因队列满被尾丢弃的 packet 数
    pub drops: u64,
    pub retransmits: u64,
    /// 接收方收到的重复或乱序 packet 数
    pub duplicate_arrivals: u64,
    pub max_queue_len: usize,
}
