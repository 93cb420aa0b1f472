//! # AIM Protocol
//!
//! VEX AIM 机器人 WebSocket 协议定义（无 IO 依赖）
//!
//! ## 模块
//!
//! - `constants`: 协议常量（通道名、速度上限、视觉窗口等）
//! - `flags`: 状态标志位
//! - `status`: `ws_status` 返回的状态文档
//! - `command`: `ws_cmd` 指令与响应
//! - `types`: 颜色、音效、字体、表情等枚举
//! - `audio`: `ws_audio` 上传帧
//! - `vision`: AI 视觉对象解析与过滤
//!
//! ## 编码
//!
//! 指令为紧凑 JSON（无空白），以二进制帧发送；状态为 JSON 文本，
//! 数值字段可能是数字也可能是数字字符串，解析时两者都接受。

pub mod audio;
pub mod command;
pub mod constants;
pub mod flags;
mod num;
pub mod status;
pub mod types;
pub mod vision;

// 重新导出常用类型
pub use audio::{AudioFormat, AudioUpload};
pub use command::{Command, CommandResponse, LightSetting, ResponseStatus};
pub use constants::*;
pub use flags::StatusFlags;
pub use status::{
    AiVisionInfo, Axes, ClassName, ClassNames, ControllerInfo, ObjectList, RawObject, RobotInfo,
    RobotStatus, ScreenCursor,
};
pub use types::*;
pub use vision::{
    AiVisionObject, CodeDesc, ColorDesc, TagCorners, VisionDescriptor, VisionObject, VisionSnapshot,
    type_mask,
};

use thiserror::Error;

/// 协议解析错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid number for field {field}: {value:?}")]
    InvalidNumber { field: String, value: String },

    #[error("Invalid flags: {0:?}")]
    InvalidFlags(String),

    #[error("Invalid color: {0:?}")]
    InvalidColor(String),

    #[error("Invalid note string: {0:?}")]
    InvalidNote(String),

    #[error("Invalid sound file: {0}")]
    InvalidSoundFile(String),

    #[error("Invalid image file: {0}")]
    InvalidImageFile(String),

    #[error("Invalid value for field {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::InvalidNote("H9".to_string());
        assert_eq!(format!("{}", err), "Invalid note string: \"H9\"");

        let err = ProtocolError::InvalidValue {
            field: "heading".to_string(),
            reason: "must be between -360 and 360".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("heading") && msg.contains("-360"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ProtocolError = json_err.into();
        assert!(matches!(err, ProtocolError::Json(_)));
    }
}
