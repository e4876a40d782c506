//! 策略对比
//!
//! 同一组负载参数下依次运行三种策略，打印信令开销与完成时间对比表。

use ccsim_rs::sim::{SimConfig, SimError, StrategyConfig, StrategyKind, Summary};
use ccsim_rs::trace::TraceRecord;
use clap::Parser;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "compare", about = "同一负载下对比 none / ecn / rate_advertisement 三种策略")]
struct Args {
    #[arg(long, default_value_t = 21)]
    buffer: usize,
    #[arg(long, default_value_t = 2)]
    senders: usize,
    #[arg(long, default_value_t = 20)]
    packets: u64,
    #[arg(long, default_value_t = 50)]
    window: u64,
    #[arg(long, default_value_t = 10)]
    sender_rate: u64,
    #[arg(long, default_value_t = 10)]
    switch_rate: u64,
    #[arg(long, default_value_t = 1)]
    weight: i64,
    #[arg(long, default_value_t = 200)]
    t_interval: u64,
    #[arg(long, default_value_t = 1_000_000)]
    max_ticks: u64,
    /// 超时检查扫描所有计时器
    #[arg(long)]
    scan_all_timers: bool,
    /// 输出 JSON 数组而不是表格
    #[arg(long)]
    json: bool,
    #[arg(long)]
    quiet: bool,
}

fn config_for(args: &Args, kind: StrategyKind) -> SimConfig {
    let strategy = match kind {
        StrategyKind::None => StrategyConfig::None,
        StrategyKind::Ecn => StrategyConfig::Ecn {
            congestion_weight: args.weight,
        },
        StrategyKind::RateAdvertisement => StrategyConfig::RateAdvertisement {
            t_interval: args.t_interval,
        },
    };
    SimConfig {
        buffer_capacity: args.buffer,
        num_senders: args.senders,
        packets_per_sender: args.packets,
        timeout_window: args.window,
        base_sender_rate: args.sender_rate,
        switch_rate: args.switch_rate,
        strategy,
        max_ticks: args.max_ticks,
        strict_oldest_only: !args.scan_all_timers,
    }
}

fn run(args: &Args) -> Result<(), SimError> {
    let mut rows: Vec<(StrategyKind, Result<Summary, SimError>)> = Vec::new();
    for kind in StrategyKind::ALL {
        // 只需要汇总，轨迹留在内存里
        let mut records: Vec<TraceRecord> = Vec::new();
        let res = ccsim_rs::sim::run(config_for(args, kind), &mut records);
        if matches!(res, Err(SimError::InvalidConfiguration { .. })) {
            return res.map(|_| ());
        }
        rows.push((kind, res));
    }

    if args.json {
        let out: Vec<serde_json::Value> = rows
            .iter()
            .map(|(kind, res)| match res {
                Ok(s) => serde_json::to_value(s),
                Err(e) => Ok(serde_json::json!({ "strategy": kind, "error": e.to_string() })),
            })
            .collect::<Result<Vec<_>, _>>()?;
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "{:<20} {:>10} {:>8} {:>10} {:>10} {:>8} {:>12}",
        "strategy", "ticks", "acks", "feedback", "overhead", "drops", "retransmits"
    );
    for (kind, res) in &rows {
        match res {
            Ok(s) => println!(
                "{:<20} {:>10} {:>8} {:>10} {:>10} {:>8} {:>12}",
                kind.as_str(),
                s.ticks,
                s.acks_sent,
                s.feedback_sent,
                s.overhead,
                s.stats.drops,
                s.stats.retransmits
            ),
            Err(e) => println!("{:<20} {}", kind.as_str(), e),
        }
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
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
        })
        .with_writer(std::io::stderr)
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
