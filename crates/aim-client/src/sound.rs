//! 声音
//!
//! 播放均为非阻塞：指令发出后立即返回。本地文件与音符在发出后立刻把
//! `SOUND_PLAYING | IS_SOUND_DNL` 置位（同时登记到下一个状态包），
//! 紧随其后的 `is_active()` 能看到正在播放。

use crate::error::{Result, RobotError};
use crate::raw_commander::RawCommander;
use aim_protocol::{AudioUpload, Command, NOTE_DURATION_MAX_MS, ProtocolError, SoundType, StatusFlags, parse_note};
use std::path::Path;
use tracing::debug;

/// 内置音效与机器人上文件的默认音量
pub const DEFAULT_VOLUME: i32 = 50;
/// 本地文件的默认音量
pub const DEFAULT_LOCAL_FILE_VOLUME: u8 = 100;
/// 音符默认时长（毫秒）
pub const DEFAULT_NOTE_DURATION_MS: u32 = 750;

/// 扬声器
pub struct Sound {
    commander: RawCommander,
}

impl Sound {
    pub(crate) fn new(commander: RawCommander) -> Self {
        Self { commander }
    }

    fn set_sound_active(&self) {
        self.commander.driver().set_local_flags(
            StatusFlags::SOUND_PLAYING | StatusFlags::IS_SOUND_DNL,
            StatusFlags::empty(),
        );
    }

    /// 播放内置音效
    ///
    /// # 参数
    /// - `sound`: 音效
    /// - `volume`: 音量百分比（默认 [`DEFAULT_VOLUME`]）
    pub fn play(&self, sound: SoundType, volume: i32) -> Result<()> {
        self.commander.send(Command::PlaySound {
            name: sound,
            volume,
        })?;
        Ok(())
    }

    /// 播放用户预先上传到机器人上的声音文件
    pub fn play_file(&self, name: &str, volume: i32) -> Result<()> {
        self.commander.send(Command::PlayFile {
            name: name.to_string(),
            volume,
        })?;
        Ok(())
    }

    /// 上传并播放本地 WAV / MP3 文件（最大 255 KB）
    ///
    /// # 错误
    /// - `RobotError::Io`: 文件无法读取
    /// - `RobotError::InvalidSoundFile`: 扩展名、大小或 WAV 头部不合法
    pub fn play_local_file(&self, path: impl AsRef<Path>, volume: u8) -> Result<()> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map_or_else(|| path.to_string_lossy(), |name| name.to_string_lossy());

        let upload = AudioUpload::from_bytes(&file_name, data, volume).map_err(|e| match e {
            ProtocolError::InvalidSoundFile(msg) => RobotError::InvalidSoundFile(msg),
            other => RobotError::Protocol(other),
        })?;
        debug!(
            "uploading {} ({} bytes, volume {})",
            upload.file_name(),
            upload.data_len(),
            upload.volume()
        );

        self.commander.send_audio(upload.encode())?;
        self.set_sound_active();
        Ok(())
    }

    /// 播放音符
    ///
    /// # 参数
    /// - `note`: 音符字符串，如 `"C5"`、`"F#6"`、`"Bb7"`
    /// - `duration_ms`: 时长，超过 4000 毫秒按 4000 处理
    /// - `volume`: 音量，限制在 0-100
    ///
    /// # 示例
    ///
    /// ```rust,no_run
    /// # use aim_client::RobotBuilder;
    /// # let robot = RobotBuilder::new().build()?;
    /// robot.sound().play_note("C5", 2000, 50)?;
    /// robot.sound().play_note("F#6", 2000, 100)?;
    /// # Ok::<(), aim_client::RobotError>(())
    /// ```
    pub fn play_note(&self, note: &str, duration_ms: u32, volume: i32) -> Result<()> {
        let (note, octave) = parse_note(note)?;
        self.commander.send(Command::PlayNote {
            note,
            octave,
            duration: duration_ms.min(NOTE_DURATION_MAX_MS),
            volume: volume.clamp(0, 100) as u8,
        })?;
        self.set_sound_active();
        Ok(())
    }

    /// 正在播放或正在传输
    pub fn is_active(&self) -> bool {
        self.commander
            .flags()
            .intersects(StatusFlags::SOUND_PLAYING | StatusFlags::IS_SOUND_DNL)
    }

    /// 停止播放（实际停止会有一点延迟）
    pub fn stop(&self) -> Result<()> {
        self.commander.send(Command::StopSound)?;
        Ok(())
    }
}
