//! 踢球器

use crate::error::Result;
use crate::raw_commander::RawCommander;
use aim_protocol::{Command, KickType};

/// 踢球器
pub struct Kicker {
    commander: RawCommander,
}

impl Kicker {
    pub(crate) fn new(commander: RawCommander) -> Self {
        Self { commander }
    }

    /// 以指定力度踢出
    pub fn kick(&self, kick_type: KickType) -> Result<()> {
        self.commander.send(Command::kick(kick_type))?;
        Ok(())
    }

    /// 轻推，把物体放到机器人正前方
    pub fn place(&self) -> Result<()> {
        self.kick(KickType::Soft)
    }
}
