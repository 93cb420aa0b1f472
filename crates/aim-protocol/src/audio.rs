//! 音频上传帧
//!
//! `ws_audio` 上每个文件以一帧发送：64 字节头部 + 文件数据。
//!
//! ```text
//! [0]       格式（0 = wav, 1 = mp3）
//! [1]       音量
//! [4..8]    数据长度（小端 u32）
//! [8..12]   块编号（恒为 0）
//! [32..64]  文件名（最多 32 字节）
//! ```

use crate::ProtocolError;
use crate::constants::{AUDIO_FILENAME_MAX, AUDIO_HEADER_LEN, SOUND_SIZE_MAX_BYTES};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::path::Path;

/// 音频格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum AudioFormat {
    Wav = 0,
    Mp3 = 1,
}

impl AudioFormat {
    /// 按文件扩展名识别（大小写不敏感）
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "wav" => Some(AudioFormat::Wav),
            "mp3" => Some(AudioFormat::Mp3),
            _ => None,
        }
    }
}

/// 经过校验的音频上传
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioUpload {
    format: AudioFormat,
    file_name: String,
    volume: u8,
    stereo: bool,
    data: Vec<u8>,
}

impl AudioUpload {
    /// 校验文件内容并构造上传
    ///
    /// # 参数
    /// - `file_name`: 文件名（仅用于识别格式和写入头部）
    /// - `data`: 文件内容
    /// - `volume`: 音量 0-100
    ///
    /// # 错误
    /// 扩展名不支持、文件过大或 WAV 头部不合法时返回 `InvalidSoundFile`。
    pub fn from_bytes(
        file_name: &str,
        data: Vec<u8>,
        volume: u8,
    ) -> Result<Self, ProtocolError> {
        let format = AudioFormat::from_file_name(file_name).ok_or_else(|| {
            ProtocolError::InvalidSoundFile(format!("{}: only wav and mp3 are supported", file_name))
        })?;

        if data.len() > SOUND_SIZE_MAX_BYTES {
            return Err(ProtocolError::InvalidSoundFile(format!(
                "{}: {} bytes exceeds the {} byte limit",
                file_name,
                data.len(),
                SOUND_SIZE_MAX_BYTES
            )));
        }

        let mut stereo = false;
        if format == AudioFormat::Wav {
            let channels = wav_channels(&data).ok_or_else(|| {
                ProtocolError::InvalidSoundFile(format!("{}: not a RIFF/WAVE file", file_name))
            })?;
            if channels > 2 {
                return Err(ProtocolError::InvalidSoundFile(format!(
                    "{}: {} channels is not supported",
                    file_name, channels
                )));
            }
            if channels == 2 {
                tracing::warn!("{}: stereo wav, only the left channel is played", file_name);
                stereo = true;
            }
        }

        let base_name = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(file_name)
            .to_string();

        Ok(Self {
            format,
            file_name: base_name,
            volume,
            stereo,
            data,
        })
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn is_stereo(&self) -> bool {
        self.stereo
    }

    pub fn data_len(&self) -> usize {
        self.data.len()
    }

    /// 编码为上传帧：头部 + 数据
    pub fn encode(&self) -> Vec<u8> {
        let mut frame = vec![0u8; AUDIO_HEADER_LEN];
        frame[0] = self.format.into();
        frame[1] = self.volume;
        frame[4..8].copy_from_slice(&(self.data.len() as u32).to_le_bytes());
        frame[8..12].copy_from_slice(&0u32.to_le_bytes());

        let name = self.file_name.as_bytes();
        let n = name.len().min(AUDIO_FILENAME_MAX);
        frame[32..32 + n].copy_from_slice(&name[..n]);

        frame.extend_from_slice(&self.data);
        frame
    }
}

/// 读取 WAV 声道数；不是 RIFF/WAVE 时返回 None
fn wav_channels(data: &[u8]) -> Option<u16> {
    if data.len() < 24 || &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return None;
    }
    Some(u16::from_le_bytes([data[22], data[23]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav(channels: u16, payload: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(44 + payload);
        data.extend_from_slice(b"RIFF");
        data.extend_from_slice(&((36 + payload) as u32).to_le_bytes());
        data.extend_from_slice(b"WAVE");
        data.extend_from_slice(b"fmt ");
        data.extend_from_slice(&16u32.to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&channels.to_le_bytes());
        data.resize(44 + payload, 0);
        data
    }

    #[test]
    fn test_header_layout() {
        let upload = AudioUpload::from_bytes("sounds/beep.wav", wav(1, 100), 80).unwrap();
        let frame = upload.encode();

        assert_eq!(frame.len(), AUDIO_HEADER_LEN + 144);
        assert_eq!(frame[0], 0);
        assert_eq!(frame[1], 80);
        assert_eq!(u32::from_le_bytes(frame[4..8].try_into().unwrap()), 144);
        assert_eq!(&frame[8..12], &[0, 0, 0, 0]);
        assert_eq!(&frame[32..40], b"beep.wav");
        assert_eq!(frame[40], 0);
        assert_eq!(&frame[64..68], b"RIFF");
        assert!(!upload.is_stereo());
    }

    #[test]
    fn test_mp3_and_long_name() {
        let name = format!("{}.MP3", "x".repeat(40));
        let upload = AudioUpload::from_bytes(&name, vec![0xFF, 0xFB, 0x90], 100).unwrap();
        assert_eq!(upload.format(), AudioFormat::Mp3);

        let frame = upload.encode();
        assert_eq!(frame[0], 1);
        assert_eq!(&frame[32..64], "x".repeat(32).as_bytes());
        assert_eq!(&frame[64..], &[0xFF, 0xFB, 0x90]);
    }

    #[test]
    fn test_stereo_wav_accepted() {
        let upload = AudioUpload::from_bytes("a.wav", wav(2, 8), 50).unwrap();
        assert!(upload.is_stereo());
    }

    #[test]
    fn test_rejected_files() {
        assert!(matches!(
            AudioUpload::from_bytes("a.ogg", vec![0; 10], 50),
            Err(ProtocolError::InvalidSoundFile(_))
        ));
        assert!(AudioUpload::from_bytes("a.wav", vec![0; 64], 50).is_err());
        assert!(AudioUpload::from_bytes("a.wav", wav(6, 8), 50).is_err());
        assert!(AudioUpload::from_bytes("a.mp3", vec![0; SOUND_SIZE_MAX_BYTES + 1], 50).is_err());
        assert!(AudioUpload::from_bytes("a.mp3", vec![0; SOUND_SIZE_MAX_BYTES], 50).is_ok());
    }
}
