//! 声音命令
//!
//! 播放内置音效、音符或本地 WAV/MP3 文件（三选一）

use crate::modes::oneshot::OneShotMode;
use crate::validation::parse_sound;
use aim_sdk::prelude::*;
use anyhow::{Result, bail};
use clap::Args;
use std::path::PathBuf;

/// 声音命令参数
#[derive(Args, Debug)]
pub struct PlayCommand {
    /// 内置音效名（如 tada）
    #[arg(long, conflicts_with_all = ["note", "file"])]
    pub sound: Option<String>,

    /// 音符（如 C5、F#6）
    #[arg(long, conflicts_with = "file")]
    pub note: Option<String>,

    /// 音符时长（毫秒）
    #[arg(long, default_value_t = 750)]
    pub duration_ms: u32,

    /// 本地 WAV/MP3 文件
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// 音量（0-100）
    #[arg(long, default_value_t = 50)]
    pub volume: u8,
}

/// 要播放的内容
#[derive(Debug, PartialEq)]
pub enum PlayTarget {
    Sound(SoundType),
    Note(String),
    File(PathBuf),
}

impl PlayCommand {
    pub fn target(&self) -> Result<PlayTarget> {
        if self.volume > 100 {
            bail!("volume {} 超出范围 [0, 100]", self.volume);
        }
        match (&self.sound, &self.note, &self.file) {
            (Some(name), None, None) => Ok(PlayTarget::Sound(parse_sound(name)?)),
            (None, Some(note), None) => Ok(PlayTarget::Note(note.clone())),
            (None, None, Some(path)) => {
                if !path.is_file() {
                    bail!("文件不存在: {}", path.display());
                }
                Ok(PlayTarget::File(path.clone()))
            },
            _ => bail!("请指定 --sound、--note 或 --file 之一"),
        }
    }

    pub fn execute(&self, mode: &OneShotMode) -> Result<()> {
        let target = self.target()?;
        let robot = mode.connect()?;
        let volume = i32::from(self.volume);

        match target {
            PlayTarget::Sound(sound) => {
                println!("🔊 播放音效 {}", sound);
                robot.sound().play(sound, volume)?;
            },
            PlayTarget::Note(note) => {
                println!("🎵 播放音符 {} ({} ms)", note, self.duration_ms);
                robot.sound().play_note(&note, self.duration_ms, volume)?;
            },
            PlayTarget::File(path) => {
                println!("📤 上传 {}", path.display());
                robot.sound().play_local_file(&path, self.volume)?;
            },
        }
        println!("✅ 已发送");
        Ok(())
    }
}
