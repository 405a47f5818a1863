//! # Host CLI
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p host-cli -- --deck demos/proof.json
//! cargo run -p host-cli -- --deck demos/proof.json --steps next,next,prev
//! cargo run -p host-cli -- --deck demos/proof.json --config host.json --log-level debug --print-log
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use host_cli::{DeckScript, HostConfig, Session, Step};
use tracing::{Level, info};

#[derive(Parser)]
#[command(name = "host-cli")]
#[command(about = "无界面演示宿主 - 按步骤驱动片段效果")]
#[command(version)]
struct Cli {
    /// Deck 脚本（JSON）
    #[arg(short, long)]
    deck: PathBuf,

    /// 宿主配置文件（JSON）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 导航步骤，逗号分隔（next, prev, goto:N）；缺省时一直前进到最后
    #[arg(short, long, value_delimiter = ',')]
    steps: Option<Vec<Step>>,

    /// 日志级别（覆盖配置文件）
    #[arg(long)]
    log_level: Option<String>,

    /// 结束时输出效果日志
    #[arg(long)]
    print_log: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => HostConfig::load(path)
            .with_context(|| format!("无法加载配置文件: {}", path.display()))?,
        None => HostConfig::default(),
    };
    config.apply_overrides(cli.log_level.as_deref(), cli.print_log);

    init_tracing(config.level()?);

    let script = DeckScript::load(&cli.deck)
        .with_context(|| format!("无法加载 Deck 脚本: {}", cli.deck.display()))?;
    info!(deck = %script.id, slides = script.slides.len(), "Deck 脚本加载成功");

    let session = Session::new(&script, config.runner.clone()).context("无法启动演示")?;

    let reports = match &cli.steps {
        Some(steps) => session.run(steps),
        None => session.run_to_end(),
    };
    for (i, report) in reports.iter().enumerate() {
        println!("[{:>3}] {}", i + 1, report.summary());
    }

    let snapshot = serde_json::to_string_pretty(&session.snapshot())?;
    println!("{}", snapshot);

    if config.print_log {
        let log = serde_json::to_string_pretty(&session.log())?;
        println!("{}", log);
    }

    let failures = session.log().failure_count();
    if failures > 0 {
        info!(failures, "部分效果执行失败，详见日志");
    }

    Ok(())
}

fn init_tracing(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
