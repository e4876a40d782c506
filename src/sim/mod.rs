//! 仿真核心模块
//!
//! 离散时间仿真：配置、时间、错误类型、驱动与结果汇总。

// 子模块声明
mod config;
mod error;
mod simulation;
mod summary;
mod time;

// 重新导出公共接口
pub use config::{DEFAULT_CONGESTION_WEIGHT, DEFAULT_MAX_TICKS, SimConfig, StrategyConfig, StrategyKind};
pub use error::SimError;
pub use simulation::{Simulation, run};
pub use summary::{FlowSummary, Summary};
pub use time::Tick;
