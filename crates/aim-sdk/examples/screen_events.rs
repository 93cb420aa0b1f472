//! 触屏与碰撞事件演示
//!
//! 每次按下屏幕切换一个表情；碰撞时播放音效。按电源键或 Ctrl-C 退出。

use aim_sdk::prelude::*;
use clap::Parser;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Parser, Debug)]
#[command(name = "screen_events")]
#[command(about = "触屏与碰撞事件演示")]
struct Args {
    /// 机器人主机名或 IP（默认取 settings.json）
    #[arg(long)]
    host: Option<String>,
}

const EMOJIS: [EmojiType; 6] = [
    EmojiType::Happy,
    EmojiType::Amazed,
    EmojiType::Thrilled,
    EmojiType::Surprised,
    EmojiType::Laughing,
    EmojiType::Confident,
];

fn main() -> anyhow::Result<()> {
    aim_sdk::init_logger();
    let args = Args::parse();

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || r.store(false, Ordering::SeqCst))?;

    let mut builder = RobotBuilder::new();
    if let Some(host) = &args.host {
        builder = builder.host(host);
    }
    let robot = builder.build()?;

    // 回调运行在状态线程上，只更新计数
    let presses = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&presses);
    robot.screen().pressed(move |x, y| {
        counter.fetch_add(1, Ordering::SeqCst);
        println!("👆 pressed at ({}, {})", x, y);
    });
    robot.screen().released(|x, y| println!("   released at ({}, {})", x, y));

    let crashed = Arc::new(AtomicBool::new(false));
    let crash_flag = Arc::clone(&crashed);
    robot.inertial().set_crash_sensitivity(SensitivityType::Medium)?;
    robot.inertial().crashed(move || crash_flag.store(true, Ordering::SeqCst));

    let mut shown = usize::MAX;
    while running.load(Ordering::SeqCst) && !robot.shutdown_requested() {
        let index = presses.load(Ordering::SeqCst) % EMOJIS.len();
        if index != shown {
            robot.screen().show_emoji(EMOJIS[index], EmojiLookType::Forward)?;
            shown = index;
        }
        if crashed.swap(false, Ordering::SeqCst) {
            println!("💥 crash detected");
            robot.sound().play(SoundType::Fail, 50)?;
        }
        sleep(20.0, TimeUnits::Msec);
    }

    robot.screen().hide_emoji()?;
    println!("👋 bye");
    Ok(())
}
