//! 仿真驱动
//!
//! 每个 tick 的顺序固定：交换机先出队（接收方处理、ACK 回到发送方），
//! 再按流编号升序让每个发送方注入，最后所有组件推进时钟。先排空后注入
//! 决定了缓冲区在一个 tick 内能否溢出，不可调换。

use tracing::{debug, info, trace};

use super::config::SimConfig;
use super::error::SimError;
use super::summary::{FlowSummary, Summary};
use super::time::Tick;
use crate::cc::{CongestionStrategy, SignalBoard, TickContext, build_strategy};
use crate::net::{FlowId, Receiver, Sender, Stats, Switch};
use crate::trace::{QueueSample, TraceSink};

pub struct Simulation {
    cfg: SimConfig,
    switch: Switch,
    senders: Vec<Sender>,
    receiver: Receiver,
    strategy: Box<dyn CongestionStrategy>,
    board: SignalBoard,
    ticks: u64,
    max_queue_len: usize,
    queue_log: Option<Vec<QueueSample>>,
}

impl Simulation {
    /// 校验配置并构建所有组件
    pub fn new(cfg: SimConfig) -> Result<Self, SimError> {
        cfg.validate()?;
        let strategy = build_strategy(&cfg);
        Self::with_strategy(cfg, strategy)
    }

    /// 使用自定义策略对象；配置同样先校验，其中的 strategy 字段不再用于构造策略
    pub fn with_strategy(cfg: SimConfig, strategy: Box<dyn CongestionStrategy>) -> Result<Self, SimError> {
        cfg.validate()?;
        let mut senders = Vec::new();
        senders
            .try_reserve_exact(cfg.num_senders)
            .map_err(|e| SimError::invalid("num_senders", format!("cannot allocate {} senders: {e}", cfg.num_senders)))?;
        senders.extend((0..cfg.num_senders).map(|i| {
            Sender::new(
                FlowId(i),
                cfg.packets_per_sender,
                cfg.timeout_window,
                cfg.base_sender_rate,
            )
            .with_strict_oldest_only(cfg.strict_oldest_only)
        }));
        Ok(Self {
            switch: Switch::new(cfg.buffer_capacity, cfg.switch_rate),
            receiver: Receiver::new(cfg.num_senders, cfg.packets_per_sender),
            senders,
            strategy,
            board: SignalBoard::default(),
            ticks: 0,
            max_queue_len: 0,
            queue_log: None,
            cfg,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    pub fn now(&self) -> Tick {
        Tick(self.ticks)
    }

    pub fn switch(&self) -> &Switch {
        &self.switch
    }

    pub fn senders(&self) -> &[Sender] {
        &self.senders
    }

    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    pub fn strategy(&self) -> &dyn CongestionStrategy {
        &*self.strategy
    }

    pub fn board(&self) -> &SignalBoard {
        &self.board
    }

    pub fn is_complete(&self) -> bool {
        self.receiver.is_complete()
    }

    pub fn enable_queue_log(&mut self) {
        self.queue_log = Some(Vec::new());
    }

    pub fn queue_samples(&self) -> Option<&[QueueSample]> {
        self.queue_log.as_deref()
    }

    /// 推进一个 tick
    pub fn step(&mut self, sink: &mut dyn TraceSink) -> Result<(), SimError> {
        // 1. 排空：交换机出队 → 接收方 → ACK 回到发送方
        if let Some(relayed) = self.switch.try_send(&mut *self.strategy)? {
            let ack = self.receiver.handle(relayed, sink)?;
            let sender = &mut self.senders[ack.flow.0];
            sender.on_ack(ack.seq);
            self.strategy.on_ack(sender, &ack, &mut self.board);
        }

        // 2. 注入：按流编号升序
        for sender in &mut self.senders {
            let pkt = sender.try_send(&self.board, &*self.strategy);
            self.switch.receive(pkt, &mut *self.strategy);
        }

        // 3. 策略的周期性更新
        let ctx = TickContext {
            switch_rate: self.switch.rate(),
            senders: &self.senders,
        };
        self.strategy.on_tick_end(self.switch.now(), &ctx);

        let queue_len = self.switch.queue_len();
        self.max_queue_len = self.max_queue_len.max(queue_len);
        if let Some(log) = &mut self.queue_log {
            log.push(QueueSample {
                tick: self.switch.now(),
                queue_len,
                signal: self.board.message(),
                advertised_rate: self.strategy.advertised_rate(),
            });
        }
        trace!(tick = self.ticks, queue_len, signal = ?self.board.message(), "tick 结束");

        // 4. 推进时钟
        for sender in &mut self.senders {
            sender.tick();
        }
        self.receiver.tick();
        self.switch.tick();
        self.ticks += 1;
        Ok(())
    }

    /// 运行直到所有流完成；超过 `max_ticks` 返回 `NonTermination`。
    #[tracing::instrument(skip(self, sink), fields(strategy = %self.strategy.kind()))]
    pub fn run(&mut self, sink: &mut dyn TraceSink) -> Result<Summary, SimError> {
        info!("▶️  开始运行仿真");
        debug!(config = ?self.cfg, "初始配置");

        while !self.receiver.is_complete() {
            if self.ticks >= self.cfg.max_ticks {
                return Err(SimError::NonTermination {
                    max_ticks: self.cfg.max_ticks,
                    acked: self.receiver.delivered(),
                    expected: self.cfg.total_packets(),
                });
            }
            self.step(sink)?;
        }

        let summary = self.summary();
        info!(
            ticks = summary.ticks,
            acks = summary.acks_sent,
            feedback = summary.feedback_sent,
            overhead = summary.overhead,
            drops = summary.stats.drops,
            "✅ 仿真完成"
        );
        sink.summary(&summary)?;
        Ok(summary)
    }

    pub fn stats(&self) -> Stats {
        Stats {
            drops: self.switch.drops(),
            retransmits: self.senders.iter().map(Sender::retransmits).sum(),
            duplicate_arrivals: self.receiver.duplicates(),
            max_queue_len: self.max_queue_len,
        }
    }

    pub fn summary(&self) -> Summary {
        let acks_sent = self.receiver.acks_sent();
        let feedback_sent = self.switch.feedback_sent();
        Summary {
            strategy: self.strategy.kind(),
            ticks: self.ticks,
            acks_sent,
            feedback_sent,
            overhead: acks_sent + feedback_sent,
            stats: self.stats(),
            flows: self
                .senders
                .iter()
                .map(|s| FlowSummary {
                    flow: s.id(),
                    sent: s.sent_count(),
                    acked: s.acked_count(),
                    retransmits: s.retransmits(),
                    completed_at: s.done_time(),
                    final_rate: s.rate(),
                })
                .collect(),
        }
    }
}

/// 以配置运行一次完整仿真
pub fn run(cfg: SimConfig, sink: &mut dyn TraceSink) -> Result<Summary, SimError> {
    Simulation::new(cfg)?.run(sink)
}
