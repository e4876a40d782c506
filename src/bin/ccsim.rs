//! 拥塞信令仿真
//!
//! 多发送方 → 单瓶颈交换机 → 单接收方，按所选策略运行至所有流完成，
//! 输出每个 packet 的轨迹与信令开销。

use ccsim_rs::sim::{SimConfig, SimError, Simulation, StrategyConfig, StrategyKind};
use ccsim_rs::trace::{LineSink, TraceFormat};
use clap::{Parser, ValueEnum};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    None,
    Ecn,
    #[value(alias = "fecn")]
    RateAdvertisement,
}

impl From<StrategyArg> for StrategyKind {
    fn from(s: StrategyArg) -> Self {
        match s {
            StrategyArg::None => StrategyKind::None,
            StrategyArg::Ecn => StrategyKind::Ecn,
            StrategyArg::RateAdvertisement => StrategyKind::RateAdvertisement,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Csv,
    Jsonl,
}

impl From<FormatArg> for TraceFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Text => TraceFormat::Text,
            FormatArg::Csv => TraceFormat::Csv,
            FormatArg::Jsonl => TraceFormat::Jsonl,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "ccsim", about = "拥塞信令仿真：N 个发送方经单个瓶颈交换机发往一个接收方")]
struct Args {
    /// 配置文件（JSON）；不填则使用 --preset 对应的默认参数
    #[arg(long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// 使用某个策略的默认参数表
    #[arg(long, value_enum, default_value_t = StrategyArg::Ecn)]
    preset: StrategyArg,

    /// 交换机缓冲区容量（packet 个数）
    #[arg(long)]
    buffer: Option<usize>,

    #[arg(long)]
    senders: Option<usize>,

    /// 每个发送方要发送的 packet 数
    #[arg(long)]
    packets: Option<u64>,

    /// 超时阈值（tick）
    #[arg(long)]
    window: Option<u64>,

    /// 发送方基准速率（两次发送之间的 tick 数）
    #[arg(long)]
    sender_rate: Option<u64>,

    /// 交换机出队速率（两次出队之间的 tick 数）
    #[arg(long)]
    switch_rate: Option<u64>,

    /// ECN：拥塞度量中 q_delta 的权重
    #[arg(long)]
    weight: Option<i64>,

    /// 速率通告：重新计算通告速率的周期（tick）
    #[arg(long)]
    t_interval: Option<u64>,

    /// 活锁保护上限（tick）
    #[arg(long)]
    max_ticks: Option<u64>,

    /// 超时检查扫描所有计时器，而不是只看第 0 个序号
    #[arg(long)]
    scan_all_timers: bool,

    /// 轨迹输出格式
    #[arg(long, value_enum, default_value_t = FormatArg::Text)]
    format: FormatArg,

    /// 轨迹输出文件；不填则输出到 stdout
    #[arg(long)]
    trace_out: Option<PathBuf>,

    /// 输出汇总 JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// 输出每 tick 的队列采样 CSV
    #[arg(long)]
    queue_csv: Option<PathBuf>,

    /// 不打印日志
    #[arg(long)]
    quiet: bool,
}

fn build_config(args: &Args) -> Result<SimConfig, SimError> {
    let mut cfg = match &args.config {
        Some(path) => SimConfig::from_json_file(path)?,
        None => SimConfig::preset(args.preset.into()),
    };
    if let Some(v) = args.buffer {
        cfg.buffer_capacity = v;
    }
    if let Some(v) = args.senders {
        cfg.num_senders = v;
    }
    if let Some(v) = args.packets {
        cfg.packets_per_sender = v;
    }
    if let Some(v) = args.window {
        cfg.timeout_window = v;
    }
    if let Some(v) = args.sender_rate {
        cfg.base_sender_rate = v;
    }
    if let Some(v) = args.switch_rate {
        cfg.switch_rate = v;
    }
    if let Some(v) = args.max_ticks {
        cfg.max_ticks = v;
    }
    if args.scan_all_timers {
        cfg.strict_oldest_only = false;
    }
    let kind = cfg.strategy.kind();
    match &mut cfg.strategy {
        StrategyConfig::Ecn { congestion_weight } => {
            if let Some(w) = args.weight {
                *congestion_weight = w;
            }
        }
        StrategyConfig::RateAdvertisement { t_interval } => {
            if let Some(t) = args.t_interval {
                *t_interval = t;
            }
        }
        StrategyConfig::None => {}
    }
    if args.weight.is_some() && kind != StrategyKind::Ecn {
        warn!(strategy = %kind, "--weight 只对 ecn 生效，已忽略");
    }
    if args.t_interval.is_some() && kind != StrategyKind::RateAdvertisement {
        warn!(strategy = %kind, "--t-interval 只对 rate_advertisement 生效，已忽略");
    }
    Ok(cfg)
}

fn run(args: &Args) -> Result<(), SimError> {
    let cfg = build_config(args)?;
    let mut sim = Simulation::new(cfg)?;
    if args.queue_csv.is_some() {
        sim.enable_queue_log();
    }

    let format = TraceFormat::from(args.format);
    let out: Box<dyn Write> = match &args.trace_out {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut sink = LineSink::new(out, format);
    let summary = sim.run(&mut sink)?;

    if let Some(path) = &args.summary_json {
        fs::write(path, serde_json::to_string_pretty(&summary)?)?;
        eprintln!("wrote summary to {}", path.display());
    }

    if let (Some(path), Some(samples)) = (&args.queue_csv, sim.queue_samples()) {
        let mut w = BufWriter::new(File::create(path)?);
        writeln!(w, "tick,queue_len,signal,advertised_rate")?;
        for s in samples {
            let signal = serde_json::to_value(s.signal)?;
            writeln!(
                w,
                "{},{},{},{}",
                s.tick,
                s.queue_len,
                signal.as_str().unwrap_or_default(),
                s.advertised_rate.map(|r| r.to_string()).unwrap_or_default()
            )?;
        }
        w.flush()?;
        eprintln!("wrote queue samples to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(if args.quiet {
            tracing_subscriber::EnvFilter::new("off")
        } else {
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        })
        .with_writer(io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
