//! 表情命令

use crate::modes::oneshot::OneShotMode;
use crate::validation::{parse_emoji, parse_look};
use anyhow::Result;
use clap::Args;

/// 表情命令参数
#[derive(Args, Debug)]
pub struct EmojiCommand {
    /// 表情名（如 happy、thinking），`hide` 隐藏表情
    pub name: String,

    /// 视线方向：forward / left / right
    #[arg(short, long, default_value = "forward")]
    pub look: String,
}

impl EmojiCommand {
    pub fn execute(&self, mode: &OneShotMode) -> Result<()> {
        if self.name.eq_ignore_ascii_case("hide") {
            let robot = mode.connect()?;
            robot.screen().hide_emoji()?;
            println!("✅ 已隐藏表情");
            return Ok(());
        }

        let emoji = parse_emoji(&self.name)?;
        let look = parse_look(&self.look)?;
        let robot = mode.connect()?;

        robot.screen().show_emoji(emoji, look)?;
        println!("😀 {} ({})", emoji.name(), self.look);
        Ok(())
    }
}
