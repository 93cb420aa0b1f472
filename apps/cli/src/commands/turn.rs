//! 旋转命令

use crate::modes::oneshot::OneShotMode;
use crate::validation::{finite, validate_percent};
use aim_sdk::prelude::*;
use anyhow::Result;
use clap::Args;

/// 旋转命令参数
#[derive(Args, Debug)]
pub struct TurnCommand {
    /// 旋转角度（度）
    #[arg(short, long)]
    pub angle: f64,

    /// 逆时针旋转（默认顺时针）
    #[arg(long)]
    pub left: bool,

    /// 速度（%），默认 75 dps
    #[arg(short, long)]
    pub velocity: Option<f64>,
}

impl TurnCommand {
    pub fn validate(&self) -> Result<()> {
        finite("angle", self.angle)?;
        if let Some(v) = self.velocity {
            validate_percent("velocity", v)?;
        }
        Ok(())
    }

    pub fn direction(&self) -> TurnType {
        if self.left { TurnType::Left } else { TurnType::Right }
    }

    pub fn execute(&self, mode: &OneShotMode) -> Result<()> {
        self.validate()?;
        let robot = mode.connect()?;

        println!("🔄 旋转 {}° ({:?})...", self.angle, self.direction());
        robot.turn_for(
            self.direction(),
            self.angle,
            self.velocity,
            TurnVelocityUnits::Percent,
            true,
        )?;
        println!("✅ 完成，航向 {}°", robot.inertial().get_heading());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction() {
        let cmd = TurnCommand {
            angle: 90.0,
            left: true,
            velocity: None,
        };
        assert_eq!(cmd.direction(), TurnType::Left);
        assert!(cmd.validate().is_ok());
    }
}
