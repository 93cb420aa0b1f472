//! # AIM CLI
//!
//! VEX AIM 机器人的命令行工具。
//!
//! ## One-shot 模式
//!
//! 每个命令独立执行：连接 -> 执行 -> 断开。
//!
//! ```bash
//! # 配置默认机器人
//! aim-cli config set --host 192.168.4.1
//!
//! # 向前移动 300 mm，再右转 90°
//! aim-cli move --distance 300
//! aim-cli turn --angle 90
//!
//! # 临时指定机器人
//! aim-cli --host 192.168.4.2 status --watch
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod modes;
mod safety;
mod validation;

use commands::{
    ConfigCommand, EmojiCommand, LedCommand, MoveCommand, PlayCommand, SnapshotCommand,
    StatusCommand, StopCommand, TurnCommand,
};
use modes::oneshot::OneShotMode;

/// AIM CLI - VEX AIM 机器人命令行工具
#[derive(Parser, Debug)]
#[command(name = "aim-cli")]
#[command(about = "Command-line interface for VEX AIM robots", long_about = None)]
#[command(version)]
struct Cli {
    /// 机器人地址，覆盖配置文件（写在子命令之前）
    #[arg(long)]
    host: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 查询机器人状态
    Status {
        #[command(flatten)]
        args: StatusCommand,
    },

    /// 定距平移
    Move {
        #[command(flatten)]
        args: MoveCommand,
    },

    /// 定角旋转
    Turn {
        #[command(flatten)]
        args: TurnCommand,
    },

    /// 停止所有运动
    Stop {
        #[command(flatten)]
        args: StopCommand,
    },

    /// 保存一帧相机图像
    Snapshot {
        #[command(flatten)]
        args: SnapshotCommand,
    },

    /// 播放声音
    Play {
        #[command(flatten)]
        args: PlayCommand,
    },

    /// 设置 LED 颜色
    Led {
        #[command(flatten)]
        args: LedCommand,
    },

    /// 显示表情
    Emoji {
        #[command(flatten)]
        args: EmojiCommand,
    },
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("aim_cli=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let host = cli.host;
    let mode = move || OneShotMode::new(host);

    match cli.command {
        Commands::Config(cmd) => cmd.execute(),
        Commands::Status { args } => args.execute(&mode()?),
        Commands::Move { args } => args.execute(&mode()?),
        Commands::Turn { args } => args.execute(&mode()?),
        Commands::Stop { args } => args.execute(&mode()?),
        Commands::Snapshot { args } => args.execute(&mode()?),
        Commands::Play { args } => args.execute(&mode()?),
        Commands::Led { args } => args.execute(&mode()?),
        Commands::Emoji { args } => args.execute(&mode()?),
    }
}
