//! 瓶颈交换机
//!
//! 持有唯一的有界缓冲区：入口尾丢弃，出口按速率门控每次最多转发一个
//! packet，并在出队时调用当前策略计算反馈。

use tracing::{debug, trace};

use super::packet::{Packet, Relayed};
use crate::cc::CongestionStrategy;
use crate::queue::BoundedQueue;
use crate::sim::{SimError, Tick};

/// 平衡队列长度占容量的比例
const EQUILIBRIUM_FRACTION: f64 = 0.25;
/// 严重拥塞队列长度占容量的比例
const SEVERE_FRACTION: f64 = 0.75;

/// 出队/入队时交给策略的队列状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub len: usize,
    /// 上一次出队后的队列长度
    pub prev_len: usize,
    pub capacity: usize,
    pub eq_threshold: usize,
    pub severe_threshold: usize,
}

impl QueueSnapshot {
    /// `q_off = q_eq - L`
    pub fn offset(&self) -> i64 {
        (self.eq_threshold as i64).saturating_sub(self.len as i64)
    }

    /// `q_delta = prev - L`，为正表示队列在排空
    pub fn delta(&self) -> i64 {
        (self.prev_len as i64).saturating_sub(self.len as i64)
    }

    /// `e = q_off - w * q_delta`，各步饱和运算
    pub fn congestion_measure(&self, weight: i64) -> i64 {
        self.offset()
            .saturating_sub(weight.saturating_mul(self.delta()))
    }
}

fn threshold(capacity: usize, fraction: f64) -> usize {
    (capacity as f64 * fraction).round_ties_even() as usize
}

#[derive(Debug)]
pub struct Switch {
    queue: BoundedQueue,
    rate: u64,
    clock: Tick,
    eq_threshold: usize,
    severe_threshold: usize,
    prev_len: usize,

    // stats
    feedback_sent: u64,
    drops: u64,
}

impl Switch {
    pub fn new(capacity: usize, rate: u64) -> Self {
        Self {
            queue: BoundedQueue::new(capacity),
            rate,
            clock: Tick::ZERO,
            eq_threshold: threshold(capacity, EQUILIBRIUM_FRACTION),
            severe_threshold: threshold(capacity, SEVERE_FRACTION),
            prev_len: 0,
            feedback_sent: 0,
            drops: 0,
        }
    }

    pub fn rate(&self) -> u64 {
        self.rate
    }

    pub fn now(&self) -> Tick {
        self.clock
    }

    pub fn queue(&self) -> &BoundedQueue {
        &self.queue
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn eq_threshold(&self) -> usize {
        self.eq_threshold
    }

    pub fn severe_threshold(&self) -> usize {
        self.severe_threshold
    }

    /// 交换机发出的反馈次数
    pub fn feedback_sent(&self) -> u64 {
        self.feedback_sent
    }

    pub fn drops(&self) -> u64 {
        self.drops
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            len: self.queue.len(),
            prev_len: self.prev_len,
            capacity: self.queue.capacity(),
            eq_threshold: self.eq_threshold,
            severe_threshold: self.severe_threshold,
        }
    }

    pub fn tick(&mut self) {
        self.clock.advance();
    }

    /// 接收发送方注入的 packet；队列满则尾丢弃。返回是否入队成功。
    pub fn receive(&mut self, pkt: Option<Packet>, strategy: &mut dyn CongestionStrategy) -> bool {
        let Some(pkt) = pkt else {
            return false;
        };
        let pkt = strategy.on_enqueue(pkt, &self.snapshot());
        match self.queue.push(pkt) {
            Ok(()) => {
                trace!(queue_len = self.queue.len(), "入队");
                true
            }
            Err(dropped) => {
                self.drops += 1;
                debug!(
                    flow = %dropped.flow,
                    seq = dropped.seq,
                    now = %self.clock,
                    capacity = self.queue.capacity(),
                    "队列已满，尾丢弃"
                );
                false
            }
        }
    }

    /// 速率门控打开且队列非空时出队一个 packet，并由策略计算反馈。
    pub fn try_send(&mut self, strategy: &mut dyn CongestionStrategy) -> Result<Option<Relayed>, SimError> {
        if !self.clock.is_multiple_of(self.rate) || self.queue.is_empty() {
            return Ok(None);
        }
        let pkt = self.queue.pop()?;
        let feedback = strategy.on_dequeue(&pkt, &self.snapshot());
        if feedback.is_some() {
            self.feedback_sent += 1;
        }
        self.prev_len = self.queue.len();
        trace!(flow = %pkt.flow, seq = pkt.seq, queue_len = self.prev_len, "出队转发");
        Ok(Some(Relayed { pkt, feedback }))
    }
}
