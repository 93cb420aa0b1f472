//! 停止命令
//!
//! 停止所有平移与旋转

use crate::modes::oneshot::OneShotMode;
use anyhow::Result;
use clap::Args;

/// 停止命令参数
#[derive(Args, Debug)]
pub struct StopCommand {
    /// 同时停止声音
    #[arg(long)]
    pub sound: bool,
}

impl StopCommand {
    pub fn execute(&self, mode: &OneShotMode) -> Result<()> {
        let robot = mode.connect()?;

        println!("🛑 停止所有运动...");
        robot.stop_all_movement()?;
        if self.sound {
            robot.sound().stop()?;
        }
        println!("✅ 已停止");
        Ok(())
    }
}
