use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use super::error::SimError;

pub const DEFAULT_MAX_TICKS: u64 = 10_000_000;
pub const DEFAULT_CONGESTION_WEIGHT: i64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    pub buffer_capacity: usize,
    pub num_senders: usize,
    pub packets_per_sender: u64,
    /// 超时阈值（tick）
    pub timeout_window: u64,
    /// 发送方基准速率（两次发送之间的 tick 数，越小越快）
    pub base_sender_rate: u64,
    /// 交换机出队速率（两次出队之间的 tick 数）
    pub switch_rate: u64,
    pub strategy: StrategyConfig,
    /// 活锁保护：超过这么多 tick 仍未完成则报错
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
    /// 超时检查只看第 0 个序号的计时器；
    /// 关闭后会找序号最小的已超时计时器。
    #[serde(default = "default_strict_oldest_only")]
    pub strict_oldest_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    None,
    Ecn {
        #[serde(default = "default_congestion_weight")]
        congestion_weight: i64,
    },
    RateAdvertisement {
        t_interval: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    None,
    Ecn,
    RateAdvertisement,
}

fn default_max_ticks() -> u64 {
    DEFAULT_MAX_TICKS
}

fn default_strict_oldest_only() -> bool {
    true
}

fn default_congestion_weight() -> i64 {
    DEFAULT_CONGESTION_WEIGHT
}

impl StrategyConfig {
    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyConfig::None => StrategyKind::None,
            StrategyConfig::Ecn { .. } => StrategyKind::Ecn,
            StrategyConfig::RateAdvertisement { .. } => StrategyKind::RateAdvertisement,
        }
    }
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::None,
        StrategyKind::Ecn,
        StrategyKind::RateAdvertisement,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::None => "none",
            StrategyKind::Ecn => "ecn",
            StrategyKind::RateAdvertisement => "rate_advertisement",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SimConfig {
    /// 各策略的默认参数表
    pub fn preset(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::None => Self {
                buffer_capacity: 21,
                num_senders: 2,
                packets_per_sender: 20,
                timeout_window: 50,
                base_sender_rate: 10,
                switch_rate: 10,
                strategy: StrategyConfig::None,
                max_ticks: DEFAULT_MAX_TICKS,
                strict_oldest_only: true,
            },
            StrategyKind::Ecn => Self {
                buffer_capacity: 15,
                packets_per_sender: 20,
                strategy: StrategyConfig::Ecn {
                    congestion_weight: DEFAULT_CONGESTION_WEIGHT,
                },
                ..Self::preset(StrategyKind::None)
            },
            StrategyKind::RateAdvertisement => Self {
                buffer_capacity: 21,
                packets_per_sender: 200,
                strategy: StrategyConfig::RateAdvertisement { t_interval: 200 },
                ..Self::preset(StrategyKind::None)
            },
        }
    }

    /// 从 JSON 文件读取配置（读取后立即校验）
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let s = std::fs::read_to_string(path)?;
        let cfg: SimConfig = serde_json::from_str(&s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// 切换策略并保留其余参数；策略专属参数取默认值。
    pub fn with_strategy(mut self, kind: StrategyKind) -> Self {
        self.strategy = match kind {
            StrategyKind::None => StrategyConfig::None,
            StrategyKind::Ecn => StrategyConfig::Ecn {
                congestion_weight: DEFAULT_CONGESTION_WEIGHT,
            },
            StrategyKind::RateAdvertisement => StrategyConfig::RateAdvertisement { t_interval: 200 },
        };
        self
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let positive = [
            ("buffer_capacity", self.buffer_capacity as u64),
            ("num_senders", self.num_senders as u64),
            ("packets_per_sender", self.packets_per_sender),
            ("timeout_window", self.timeout_window),
            ("base_sender_rate", self.base_sender_rate),
            ("switch_rate", self.switch_rate),
            ("max_ticks", self.max_ticks),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(SimError::invalid(field, "must be positive"));
            }
        }
        match self.strategy {
            StrategyConfig::None => {}
            StrategyConfig::Ecn { congestion_weight } => {
                if congestion_weight < 0 {
                    return Err(SimError::invalid(
                        "congestion_weight",
                        format!("must not be negative (got {congestion_weight})"),
                    ));
                }
            }
            StrategyConfig::RateAdvertisement { t_interval } => {
                if t_interval == 0 {
                    return Err(SimError::invalid("t_interval", "must be positive"));
                }
            }
        }
        Ok(())
    }

    pub fn total_packets(&self) -> u64 {
        self.packets_per_sender
            .saturating_mul(self.num_senders as u64)
    }
}
