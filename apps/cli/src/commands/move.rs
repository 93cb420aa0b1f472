//! 移动命令
//!
//! 沿指定方向平移一段距离，长距离移动需要确认

use crate::modes::oneshot::OneShotMode;
use crate::validation::{finite, validate_distance, validate_percent};
use aim_sdk::prelude::*;
use anyhow::Result;
use clap::Args;

/// 移动命令参数
#[derive(Args, Debug)]
pub struct MoveCommand {
    /// 平移距离（毫米），负值后退
    #[arg(short, long, allow_hyphen_values = true)]
    pub distance: f64,

    /// 方向（度），0 为正前方，90 为右侧
    #[arg(short, long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub angle: f64,

    /// 速度（%），默认 50
    #[arg(short, long)]
    pub velocity: Option<f64>,

    /// 跳过确认提示
    #[arg(long)]
    pub force: bool,
}

impl MoveCommand {
    /// 连接前验证参数
    pub fn validate(&self) -> Result<()> {
        validate_distance(self.distance)?;
        finite("angle", self.angle)?;
        if let Some(v) = self.velocity {
            validate_percent("velocity", v)?;
        }
        Ok(())
    }

    pub fn execute(&self, mode: &OneShotMode) -> Result<()> {
        self.validate()?;

        let safety = mode.safety();
        if !self.force
            && safety.requires_confirmation(self.distance)
            && !safety.confirm_distance(self.distance)?
        {
            println!("❌ 操作已取消");
            return Ok(());
        }

        let robot = mode.connect()?;
        println!("🚗 平移 {} mm @ {}°...", self.distance, self.angle);
        robot.move_for(
            self.distance,
            self.angle,
            self.velocity,
            DriveVelocityUnits::Percent,
            true,
        )?;
        println!(
            "✅ 完成，位置 ({:.0}, {:.0})",
            robot.get_x_position(),
            robot.get_y_position()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let cmd = MoveCommand {
            distance: 200.0,
            angle: 90.0,
            velocity: Some(50.0),
            force: false,
        };
        assert!(cmd.validate().is_ok());

        let cmd = MoveCommand {
            velocity: Some(150.0),
            ..cmd
        };
        assert!(cmd.validate().is_err());
    }
}
