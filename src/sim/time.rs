//! 仿真时间类型
//!
//! 离散时间仿真：一个 tick 即一个时间单位，所有组件的时钟同步推进。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 仿真时间（tick）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// 前进一个 tick
    pub fn advance(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    /// 速率门控：当前时刻是否为 `interval` 的整数倍。
    ///
    /// `interval` 为 0 时永远不开门（配置校验会拒绝这种情况）。
    pub fn is_multiple_of(self, interval: u64) -> bool {
        interval != 0 && self.0 % interval == 0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
