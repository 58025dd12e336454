//! 网状网络场景仿真
//!
//! 读取拓扑/位置文件和设置文件，按脚本发送消息，把每个收到的数据包写入结果 XML。

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use simbeenet_rs::scenario::{DEFAULT_TOTAL_TIME, ScenarioOptions, ScenarioPaths, run_scenario};
use simbeenet_rs::sim::SimTime;
use tracing::error;

#[derive(Debug, Parser)]
#[command(
    name = "simbeenet",
    about = "Run a scripted mesh scenario and record every received packet"
)]
struct Args {
    /// Topology file: node count, node positions, then the scripted communications
    #[arg(long, default_value = "scratch/Positions.txt")]
    positions: PathBuf,

    /// Settings file of `key:value` lines (delay, protocol, dataRate, baseIP, subnetMask)
    #[arg(long, default_value = "scratch/Settings.txt")]
    settings: PathBuf,

    /// Output results XML
    #[arg(long, default_value = "results.xml")]
    results: PathBuf,

    /// 仿真总时长，例如 `10s`、`2500ms`
    #[arg(long, default_value_t = DEFAULT_TOTAL_TIME)]
    total_time: SimTime,

    /// Write a JSON run summary here
    #[arg(long)]
    summary_json: Option<PathBuf>,
}

fn main() -> ExitCode {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let paths = ScenarioPaths {
        positions: args.positions,
        settings: args.settings,
        results: args.results,
    };
    let opts = ScenarioOptions {
        total_time: args.total_time,
    };

    let summary = match run_scenario(&paths, &opts) {
        Ok(summary) => summary,
        Err(err) => {
            error!(stage = err.stage(), error = %err, "scenario failed");
            eprintln!("error: {} stage failed: {err}", err.stage());
            return ExitCode::FAILURE;
        }
    };

    println!(
        "done @ {}s, packets_received={}, bytes_total={}, results={}",
        summary.finished_at_s,
        summary.packets_received,
        summary.bytes_total,
        paths.results.display()
    );

    if let Some(path) = &args.summary_json {
        let json = match serde_json::to_string_pretty(&summary) {
            Ok(json) => json,
            Err(err) => {
                eprintln!("error: cannot serialize summary: {err}");
                return ExitCode::FAILURE;
            }
        };
        if let Err(err) = fs::write(path, json) {
            eprintln!("error: cannot write {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
        eprintln!("wrote run summary to {}", path.display());
    }

    ExitCode::SUCCESS
}
