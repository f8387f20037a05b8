//! # Axio
//!
//! 动画眼球控制程序：视觉跟踪、自动眨眼、语音命令与 AI 对话。
//!
//! ```bash
//! # 使用默认配置运行（串口 /dev/ttyUSB0）
//! axio
//!
//! # 无硬件试运行，模拟目标
//! axio --dry-run run --simulate
//!
//! # 检查串口握手
//! axio --port /dev/ttyACM0 probe
//!
//! # 打印生效的配置
//! axio config show
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod collaborators;
mod commands;
mod config;

use commands::{ConfigCommand, RunCommand};
use config::AxioConfig;

/// Axio - 动画眼球控制程序
#[derive(Parser, Debug)]
#[command(name = "axio")]
#[command(about = "Animatronic eye controller", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件（默认 <config_dir>/axio/config.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 串口设备（覆盖配置）
    #[arg(long, global = true)]
    port: Option<String>,

    /// 波特率（覆盖配置）
    #[arg(long, global = true)]
    baud: Option<u32>,

    /// 不打开串口，使用内存中的模拟设备
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 运行控制循环（默认）
    Run(RunCommand),

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 打开链路，执行一次 WAKE 和一次 SLEEP 握手
    Probe,
}

fn main() -> Result<()> {
    axio_sdk::init_logger();

    let cli = Cli::parse();
    let (mut config, path) = AxioConfig::load(cli.config.as_deref())?;
    config.apply_overrides(cli.port.as_deref(), cli.baud);
    match &path {
        Some(path) => tracing::info!("Loaded configuration from {}", path.display()),
        None => tracing::debug!("No configuration file, using defaults"),
    }

    match cli.command.unwrap_or(Commands::Run(RunCommand::default())) {
        Commands::Run(cmd) => cmd.execute(config, cli.dry_run),
        Commands::Config(cmd) => cmd.execute(&config, path.as_deref()),
        Commands::Probe => commands::probe::execute(&config, cli.dry_run),
    }
}
