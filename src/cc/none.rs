//! 无拥塞控制（基线）

use super::CongestionStrategy;
use crate::sim::StrategyKind;

#[derive(Debug, Default, Clone, Copy)]
pub struct NoControl;

impl CongestionStrategy for NoControl {
    fn kind(&self) -> StrategyKind {
        StrategyKind::None
    }
}
