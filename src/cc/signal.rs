//! 反馈信号
//!
//! `Feedback` 是交换机/接收方沿 ACK 回传的信号；`SignalBoard` 是 BCN 的
//! 全局状态：由交换机产生的最新消息，所有发送方在门控时读取。

use serde::{Deserialize, Serialize};

/// BCN 消息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BcnMessage {
    Normal,
    Stop,
    /// 本次没有 BCN 消息
    #[default]
    Nil,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Feedback {
    /// BCN 消息及出队时采样的拥塞度量
    Bcn { message: BcnMessage, measure: i64 },
    /// 速率通告（tick 间隔）
    AdvertisedRate(u64),
}

/// 所有发送方共享的 BCN 状态（单写者：每个 tick 至多一次出队）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalBoard {
    message: BcnMessage,
    measure: i64,
}

impl SignalBoard {
    pub fn message(&self) -> BcnMessage {
        self.message
    }

    pub fn measure(&self) -> i64 {
        self.measure
    }

    /// STOP 阻塞所有发送方，直到下一个 NORMAL / NIL
    pub fn is_stop(&self) -> bool {
        self.message == BcnMessage::Stop
    }

    pub fn publish(&mut self, message: BcnMessage, measure: i64) {
        self.message = message;
        self.measure = measure;
    }
}
