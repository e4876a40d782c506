//! 发送方
//!
//! 每个发送方对应一条流：按速率门控依次发送 `total` 个 packet，只跟踪最老
//! 的未确认 packet 的计时器，超时后重传该序号。ACK 必须按序到达才能推进。

use tracing::{debug, info, trace};

use super::id::FlowId;
use super::packet::Packet;
use crate::cc::{CongestionStrategy, Feedback, SignalBoard};
use crate::sim::Tick;

/// AIMD 乘性减小时拥塞度量的缩放系数
const AIMD_DECREASE_SCALE: f64 = 10.0;

/// 单个序号的计时器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSlot {
    /// 未启动
    Idle,
    /// 已运行的 tick 数
    Running(u64),
    /// 已确认，计时停止
    Acked,
}

#[derive(Debug, Clone)]
pub struct Sender {
    id: FlowId,
    total: u64,
    window: u64,
    base_rate: u64,
    rate: u64,
    sent: u64,
    acked: u64,
    /// 只覆盖已发送过的序号，随发送增长
    timers: Vec<TimerSlot>,
    clock: Tick,
    strict_oldest_only: bool,

    // stats
    retransmits: u64,
    done_at: Option<Tick>,
}

impl Sender {
    pub fn new(id: FlowId, total: u64, window: u64, rate: u64) -> Self {
        Self {
            id,
            total,
            window,
            base_rate: rate,
            rate,
            sent: 0,
            acked: 0,
            timers: Vec::new(),
            clock: Tick::ZERO,
            strict_oldest_only: true,
            retransmits: 0,
            done_at: None,
        }
    }

    /// 超时检查是否只看第 0 个序号
    pub fn with_strict_oldest_only(mut self, strict: bool) -> Self {
        self.strict_oldest_only = strict;
        self
    }

    pub fn id(&self) -> FlowId {
        self.id
    }

    pub fn rate(&self) -> u64 {
        self.rate
    }

    pub fn base_rate(&self) -> u64 {
        self.base_rate
    }

    pub fn sent_count(&self) -> u64 {
        self.sent
    }

    pub fn acked_count(&self) -> u64 {
        self.acked
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn now(&self) -> Tick {
        self.clock
    }

    pub fn retransmits(&self) -> u64 {
        self.retransmits
    }

    pub fn is_done(&self) -> bool {
        self.acked >= self.total
    }

    pub fn done_time(&self) -> Option<Tick> {
        self.done_at
    }

    /// 序号超出 `total` 时返回 None；尚未发送的序号为 `Idle`
    pub fn timer(&self, seq: u64) -> Option<TimerSlot> {
        if seq >= self.total {
            return None;
        }
        Some(self.timers.get(seq as usize).copied().unwrap_or(TimerSlot::Idle))
    }

    /// 当前速率慢于基准速率（tick 间隔更大）即视为被限速
    pub fn is_rate_limited(&self) -> bool {
        self.rate > self.base_rate
    }

    /// 推进本地时钟，所有运行中的计时器加一
    pub fn tick(&mut self) {
        self.clock.advance();
        for slot in &mut self.timers {
            if let TimerSlot::Running(t) = slot {
                *t = t.saturating_add(1);
            }
        }
    }

    /// 返回需要重传的序号。
    ///
    /// 严格模式下只检查第 0 个槽位（第 0 个 packet 确认后就不会再超时）；
    /// 否则返回序号最小的已超时槽位。
    pub fn check_timeout(&self) -> Option<u64> {
        let expired = |slot: &TimerSlot| matches!(slot, TimerSlot::Running(t) if *t >= self.window);
        if self.strict_oldest_only {
            return self.timers.first().filter(|s| expired(s)).map(|_| 0);
        }
        self.timers.iter().position(expired).map(|i| i as u64)
    }

    /// 尝试发送一个 packet。
    ///
    /// 门控条件：流未完成、`clock mod rate == 0`、未被 STOP 阻塞。门控打开后
    /// 优先重传超时序号，否则发送下一个新序号；两者皆无则空闲等待。
    pub fn try_send(&mut self, board: &SignalBoard, strategy: &dyn CongestionStrategy) -> Option<Packet> {
        if self.is_done() {
            return None;
        }
        if !self.clock.is_multiple_of(self.rate) || board.is_stop() {
            return None;
        }

        let pkt = self.next_packet();
        // 策略在 packet 构造之后调整速率，packet 上记录的是调整前的速率
        strategy.on_send_opportunity(self, board);
        pkt
    }

    fn next_packet(&mut self) -> Option<Packet> {
        let rate_limited = self.is_rate_limited();
        let seq = match self.check_timeout() {
            Some(seq) => {
                self.timers[seq as usize] = TimerSlot::Running(0);
                self.retransmits += 1;
                debug!(flow = %self.id, seq, now = %self.clock, "超时重传");
                seq
            }
            None if self.sent < self.total => {
                let seq = self.sent;
                self.sent += 1;
                self.timers.push(if seq == self.acked {
                    TimerSlot::Running(0)
                } else {
                    TimerSlot::Idle
                });
                seq
            }
            None => {
                trace!(flow = %self.id, "全部已发送，等待 ACK 或超时");
                return None;
            }
        };
        Some(Packet::new(self.id, seq, self.clock, self.rate, rate_limited))
    }

    /// 处理 ACK：只有序号等于当前最老未确认序号时才推进，否则忽略。
    pub fn on_ack(&mut self, seq: u64) {
        if seq != self.acked {
            trace!(flow = %self.id, seq, expected = self.acked, "忽略乱序 ACK");
            return;
        }
        let Some(slot) = self.timers.get_mut(seq as usize) else {
            trace!(flow = %self.id, seq, "忽略未发送序号的 ACK");
            return;
        };
        *slot = TimerSlot::Acked;
        self.acked += 1;
        // 计时器转交给下一个最老的未确认 packet
        if let Some(next) = self.timers.get_mut(self.acked as usize) {
            *next = TimerSlot::Running(0);
        }
        if self.is_done() {
            self.done_at = Some(self.clock);
            info!(flow = %self.id, now = %self.clock, retransmits = self.retransmits, "流传输完成");
        }
    }

    /// 应用策略反馈
    pub fn apply_feedback(&mut self, feedback: &Feedback) {
        let old = self.rate;
        match *feedback {
            Feedback::Bcn { measure, .. } => {
                if measure < 0 {
                    // 乘性减小发送速率（间隔变大）
                    let factor = 1.0 - measure as f64 / AIMD_DECREASE_SCALE;
                    self.rate = (self.rate as f64 * factor).round_ties_even() as u64;
                } else if measure > 0 {
                    // 加性增大发送速率（间隔变小），不低于 1
                    self.rate = self.rate.saturating_sub(measure as u64).max(1);
                }
            }
            Feedback::AdvertisedRate(rate) => {
                if rate > 0 {
                    self.rate = rate;
                }
            }
        }
        if self.rate != old {
            debug!(flow = %self.id, old, new = self.rate, "发送速率调整");
        }
    }
}
