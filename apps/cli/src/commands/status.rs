//! 状态查询命令

use crate::modes::oneshot::OneShotMode;
use aim_sdk::prelude::*;
use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 状态命令参数
#[derive(Args, Debug)]
pub struct StatusCommand {
    /// 以 JSON 输出完整状态
    #[arg(long)]
    pub json: bool,

    /// 持续刷新，Ctrl+C 退出
    #[arg(short, long)]
    pub watch: bool,

    /// 刷新频率（Hz）
    #[arg(short, long, default_value_t = 2)]
    pub frequency: u32,
}

/// 已置位标志的名称
pub fn flag_names(flags: StatusFlags) -> Vec<&'static str> {
    const NAMES: [(StatusFlags, &str); 10] = [
        (StatusFlags::SOUND_PLAYING, "SOUND_PLAYING"),
        (StatusFlags::IS_MOVE_ACTIVE, "MOVE_ACTIVE"),
        (StatusFlags::IMU_CAL, "IMU_CAL"),
        (StatusFlags::IS_TURN_ACTIVE, "TURN_ACTIVE"),
        (StatusFlags::IS_MOVING, "MOVING"),
        (StatusFlags::HAS_CRASHED, "CRASHED"),
        (StatusFlags::IS_SHAKE, "SHAKE"),
        (StatusFlags::PWR_BUTTON, "PWR_BUTTON"),
        (StatusFlags::PROG_ACTIVE, "PROG_ACTIVE"),
        (StatusFlags::IS_SOUND_DNL, "SOUND_DNL"),
    ];
    NAMES
        .iter()
        .filter(|(flag, _)| flags.contains(*flag))
        .map(|(_, name)| *name)
        .collect()
}

impl StatusCommand {
    pub fn execute(&self, mode: &OneShotMode) -> Result<()> {
        let robot = mode.connect()?;
        if !self.watch {
            return self.print_once(&robot);
        }

        let running = Arc::new(AtomicBool::new(true));
        let r = Arc::clone(&running);
        ctrlc::set_handler(move || r.store(false, Ordering::SeqCst))
            .context("设置 Ctrl+C 处理失败")?;

        println!("📊 监控中 ({} Hz)，按 Ctrl+C 停止\n", self.frequency);
        let period_ms = 1000.0 / f64::from(self.frequency.max(1));
        while running.load(Ordering::SeqCst) && !robot.shutdown_requested() {
            self.print_once(&robot)?;
            sleep(period_ms, TimeUnits::Msec);
        }
        Ok(())
    }

    fn print_once(&self, robot: &Robot) -> Result<()> {
        if self.json {
            let status = robot.status();
            println!("{}", serde_json::to_string_pretty(status.as_ref())?);
            return Ok(());
        }

        let status = robot.status();
        let info = &status.robot;
        println!("🔋 电量: {}%", info.battery);
        println!(
            "🧭 航向: {}°  旋转: {}°",
            robot.inertial().get_heading(),
            robot.inertial().get_rotation()
        );
        println!(
            "📍 位置: ({:.1}, {:.1}) mm",
            robot.get_x_position(),
            robot.get_y_position()
        );
        println!(
            "   姿态: roll {:.1}° pitch {:.1}° yaw {:.1}°",
            info.roll, info.pitch, info.yaw
        );
        println!("🚩 标志: {}", flag_names(info.flags).join(" | "));
        if info.is_screen_pressed() {
            println!("👆 触屏: ({}, {})", info.touch_x, info.touch_y);
        }

        let objects = robot.vision().get_data(&VisionObject::ALL_VISION, 8);
        println!("👁  视觉对象: {}", objects.len());
        for obj in &objects {
            let label = if obj.classname.is_empty() {
                format!("type {} id {}", obj.object_type, obj.id)
            } else {
                obj.classname.clone()
            };
            println!(
                "   {:<16} center ({:>3}, {:>3}) {}x{} bearing {:.1}°",
                label, obj.center_x, obj.center_y, obj.width, obj.height, obj.bearing
            );
        }
        println!();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_names() {
        let flags = StatusFlags::PROG_ACTIVE | StatusFlags::IS_MOVING;
        assert_eq!(flag_names(flags), vec!["MOVING", "PROG_ACTIVE"]);
        assert!(flag_names(StatusFlags::empty()).is_empty());
    }
}
