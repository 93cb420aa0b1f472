//! LED 命令

use crate::modes::oneshot::OneShotMode;
use crate::validation::{parse_color, parse_led_target};
use anyhow::Result;
use clap::Args;

/// LED 命令参数
#[derive(Args, Debug)]
pub struct LedCommand {
    /// LED 目标：all 或 0-5
    #[arg(short, long, default_value = "all")]
    pub target: String,

    /// 颜色 #RRGGBB，#000000 为熄灭
    #[arg(short, long)]
    pub color: String,
}

impl LedCommand {
    pub fn execute(&self, mode: &OneShotMode) -> Result<()> {
        let light = parse_led_target(&self.target)?;
        let color = parse_color(&self.color)?;
        let robot = mode.connect()?;

        robot.led().on(light, color)?;
        println!("💡 {} -> {}", light, color);
        Ok(())
    }
}
