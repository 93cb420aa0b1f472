//! AI 视觉报告
//!
//! 周期性打印视觉对象，发现蓝桶时在屏幕上提示。

use aim_sdk::prelude::*;
use clap::Parser;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "vision_report")]
#[command(about = "周期性打印 AI 视觉检测结果")]
struct Args {
    /// 机器人主机名或 IP（默认取 settings.json）
    #[arg(long)]
    host: Option<String>,

    /// 运行时长（秒）
    #[arg(long, default_value = "10")]
    duration_sec: u64,

    /// 打印周期（毫秒）
    #[arg(long, default_value = "500")]
    period_ms: f64,
}

fn main() -> anyhow::Result<()> {
    aim_sdk::init_logger();
    let args = Args::parse();

    let mut builder = RobotBuilder::new();
    if let Some(host) = &args.host {
        builder = builder.host(host);
    }
    let robot = builder.build()?;
    let vision = robot.vision();

    vision.tag_detection(true)?;
    vision.model_detection(true)?;
    robot.screen().show_aivision()?;

    let deadline = Instant::now() + Duration::from_secs(args.duration_sec);
    while Instant::now() < deadline && !robot.shutdown_requested() {
        let objects = vision.get_data(&VisionObject::ALL_VISION, 8);
        println!("🔍 {} object(s)", vision.object_count());
        for obj in &objects {
            let label = if obj.classname.is_empty() {
                format!("type {} id {}", obj.object_type, obj.id)
            } else {
                obj.classname.clone()
            };
            println!(
                "   {:<16} center ({:>3}, {:>3}) area {:>5} bearing {:>6.1}°",
                label, obj.center_x, obj.center_y, obj.area, obj.bearing
            );
        }

        if robot.has_blue_barrel() {
            robot.led().on(LightType::All, Color::BLUE)?;
            println!("   🛢  blue barrel in front of the kicker");
        } else {
            robot.led().off(LightType::All)?;
        }
        sleep(args.period_ms, TimeUnits::Msec);
    }

    robot.screen().hide_aivision()?;
    Ok(())
}
