//! BCN（Backward Congestion Notification）+ AIMD
//!
//! 交换机每出队一个 packet，按出队后的队列长度 L 给出消息：
//! - `L <= q_eq`：packet 被标记为限速则 NORMAL，否则 NIL
//! - `q_eq < L <= q_sc`：NORMAL
//! - `L > q_sc`：STOP（全局阻塞所有发送方）
//!
//! 同时采样拥塞度量 `e = q_off - w * q_delta`。消息为 NORMAL 期间，每个
//! 发送方在门控打开时用 `e` 调整自己的速率。

use tracing::{debug, trace};

use super::{BcnMessage, CongestionStrategy, Feedback, SignalBoard};
use crate::net::{Ack, Packet, QueueSnapshot, Sender};
use crate::sim::StrategyKind;

#[derive(Debug, Clone)]
pub struct BcnAimd {
    /// 拥塞度量中 q_delta 的权重
    weight: i64,
}

impl BcnAimd {
    pub fn new(weight: i64) -> Self {
        Self { weight }
    }

    pub fn weight(&self) -> i64 {
        self.weight
    }

    /// 按出队后的队列状态给出 BCN 消息
    pub fn classify(rate_limited: bool, q: &QueueSnapshot) -> BcnMessage {
        if q.len <= q.eq_threshold {
            if rate_limited {
                BcnMessage::Normal
            } else {
                BcnMessage::Nil
            }
        } else if q.len <= q.severe_threshold {
            BcnMessage::Normal
        } else {
            BcnMessage::Stop
        }
    }
}

impl CongestionStrategy for BcnAimd {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Ecn
    }

    fn on_dequeue(&mut self, pkt: &Packet, q: &QueueSnapshot) -> Option<Feedback> {
        let measure = q.congestion_measure(self.weight);
        let message = Self::classify(pkt.rate_limited, q);
        debug!(
            flow = %pkt.flow,
            seq = pkt.seq,
            queue_len = q.len,
            measure,
            ?message,
            "BCN 反馈"
        );
        Some(Feedback::Bcn { message, measure })
    }

    fn on_ack(&self, _sender: &mut Sender, ack: &Ack, board: &mut SignalBoard) {
        if let Some(Feedback::Bcn { message, measure }) = ack.feedback {
            board.publish(message, measure);
        }
    }

    fn on_send_opportunity(&self, sender: &mut Sender, board: &SignalBoard) {
        if board.message() != BcnMessage::Normal {
            return;
        }
        trace!(flow = %sender.id(), measure = board.measure(), "NORMAL：按拥塞度量调整速率");
        sender.apply_feedback(&Feedback::Bcn {
            message: BcnMessage::Normal,
            measure: board.measure(),
        });
    }
}
