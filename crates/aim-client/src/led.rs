//! LED 灯环

use crate::error::Result;
use crate::raw_commander::RawCommander;
use crate::types::{LedColor, LedTarget};
use aim_protocol::{Color, Command, LightType};

/// 六颗 RGB LED
pub struct Led {
    commander: RawCommander,
}

impl Led {
    pub(crate) fn new(commander: RawCommander) -> Self {
        Self { commander }
    }

    /// 设置 LED 颜色
    ///
    /// # 示例
    ///
    /// ```rust,no_run
    /// # use aim_client::RobotBuilder;
    /// use aim_client::{Color, LightType};
    /// # let robot = RobotBuilder::new().build()?;
    /// robot.led().on(LightType::All, Color::BLUE)?;
    /// robot.led().on(1, Color::RED)?;
    /// robot.led().on(2, (10u8, 20u8, 30u8))?;
    /// robot.led().on(3, true)?;
    /// # Ok::<(), aim_client::RobotError>(())
    /// ```
    pub fn on(&self, target: impl Into<LedTarget>, color: impl Into<LedColor>) -> Result<()> {
        let (r, g, b) = color.into().rgb();
        self.commander
            .send(Command::light_set(target.into().light(), Color::from_rgb(r, g, b)))?;
        Ok(())
    }

    /// 熄灭指定 LED
    pub fn off(&self, led: LightType) -> Result<()> {
        self.commander.send(Command::light_set(led, Color::BLACK))?;
        Ok(())
    }
}
