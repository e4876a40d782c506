//! 仿真错误类型

use std::io;

/// 仿真过程中可能出现的错误
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// 配置不合法，仿真开始前即被拒绝
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },

    /// 对空队列调用 pop（调用方未先检查 is_empty）
    #[error("pop on empty queue")]
    EmptyQueue,

    /// 超过安全上限仍未完成（活锁保护）
    #[error("simulation did not complete within {max_ticks} ticks ({acked}/{expected} packets acknowledged)")]
    NonTermination {
        max_ticks: u64,
        acked: u64,
        expected: u64,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("serde error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }
}
