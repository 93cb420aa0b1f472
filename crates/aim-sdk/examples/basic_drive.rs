//! 方形路径演示
//!
//! 机器人沿正方形的四条边平移，每条边换一种 LED 颜色，最后回到起始航向。

use aim_sdk::prelude::*;
use clap::Parser;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "basic_drive")]
#[command(about = "方形路径演示 - 每条边切换一次 LED 颜色")]
struct Args {
    /// 机器人主机名或 IP（默认取 settings.json）
    #[arg(long)]
    host: Option<String>,

    /// 边长（毫米）
    #[arg(long, default_value = "100")]
    side_mm: f64,

    /// 平移速度（%）
    #[arg(long, default_value = "50")]
    velocity: f64,
}

fn main() -> anyhow::Result<()> {
    aim_sdk::init_logger();
    let args = Args::parse();

    let mut builder = RobotBuilder::new();
    if let Some(host) = &args.host {
        builder = builder.host(host);
    }
    let robot = builder.build()?;
    println!("✅ 已连接，电量 {}%", robot.get_battery_capacity());

    robot.set_move_velocity(args.velocity, DriveVelocityUnits::Percent)?;

    let sides = [
        (0.0, Color::BLUE),
        (270.0, Color::RED),
        (180.0, Color::GREEN),
        (90.0, Color::ORANGE),
    ];
    for (angle, color) in sides {
        robot.led().on(LightType::All, color)?;
        robot.move_for(args.side_mm, angle, None, DriveVelocityUnits::Percent, true)?;
        println!(
            "   📍 angle {:>5.1}° -> ({:.0}, {:.0})",
            angle,
            robot.get_x_position(),
            robot.get_y_position()
        );
    }

    robot.turn_to(0.0, None, TurnVelocityUnits::Percent, true)?;
    robot.led().off(LightType::All)?;
    println!("✅ 完成，航向 {}°", robot.inertial().get_heading());
    Ok(())
}
