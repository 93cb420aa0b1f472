//! 错误类型体系
//!
//! 客户端层错误，包装驱动层与协议层错误，并区分致命错误和可重试错误。
//!
//! # 示例
//!
//! ```rust
//! use aim_client::RobotError;
//!
//! fn handle_error(err: RobotError) {
//!     if err.is_fatal() {
//!         eprintln!("致命错误: {}", err);
//!     } else if err.is_retryable() {
//!         eprintln!("可重试错误: {}", err);
//!     } else {
//!         eprintln!("错误: {}", err);
//!     }
//! }
//! ```

use aim_driver::DriverError;
use aim_protocol::ProtocolError;
use thiserror::Error;

/// 机器人错误类型
#[derive(Debug, Error)]
pub enum RobotError {
    /// 驱动层错误
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// 协议层错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 与机器人断开连接
    #[error("Disconnected: {0}")]
    Disconnected(String),

    /// 图像流开启后仍未收到图像
    #[error("no image was received")]
    NoImage,

    /// 声音文件不合法
    #[error("Invalid sound file: {0}")]
    InvalidSoundFile(String),

    /// 图片文件不合法
    #[error("Invalid image file: {0}")]
    InvalidImageFile(String),

    /// 参数无效
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 等待运动完成超时
    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 配置文件错误
    #[error("Settings error: {0}")]
    Settings(String),
}

impl RobotError {
    /// 是否为致命错误
    ///
    /// 致命错误表示与机器人的连接已经不可用，继续发送指令没有意义。
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Disconnected(_) => true,
            Self::Driver(e) => matches!(
                e,
                DriverError::Connect { .. } | DriverError::ChannelClosed | DriverError::IoThread(_)
            ),
            _ => false,
        }
    }

    /// 是否可重试
    ///
    /// 断线后驱动会在后台重连，稍后重发同一指令可能会成功。
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::NoImage => true,
            Self::Driver(e) => {
                e.is_disconnect() || matches!(e, DriverError::Timeout | DriverError::ChannelFull)
            },
            _ => false,
        }
    }

    /// 添加上下文信息
    pub fn context(self, context: impl Into<String>) -> Self {
        let context = context.into();
        match self {
            Self::Disconnected(msg) => Self::Disconnected(format!("{}: {}", context, msg)),
            Self::InvalidInput(msg) => Self::InvalidInput(format!("{}: {}", context, msg)),
            Self::Timeout(msg) => Self::Timeout(format!("{}: {}", context, msg)),
            Self::Settings(msg) => Self::Settings(format!("{}: {}", context, msg)),
            Self::InvalidSoundFile(msg) => Self::InvalidSoundFile(format!("{}: {}", context, msg)),
            Self::InvalidImageFile(msg) => Self::InvalidImageFile(format!("{}: {}", context, msg)),
            other => other,
        }
    }

    /// 创建参数无效错误
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, RobotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_errors() {
        assert!(RobotError::Disconnected("ws_cmd".to_string()).is_fatal());
        assert!(RobotError::Driver(DriverError::ChannelClosed).is_fatal());
        assert!(!RobotError::NoImage.is_fatal());
        assert!(!RobotError::InvalidInput("velocity".to_string()).is_fatal());
    }

    #[test]
    fn test_retryable_errors() {
        assert!(RobotError::Timeout("is_move_active".to_string()).is_retryable());
        assert!(RobotError::Driver(DriverError::Timeout).is_retryable());
        assert!(RobotError::Driver(DriverError::Disconnected("x".to_string())).is_retryable());
        assert!(!RobotError::InvalidImageFile("a.jpg".to_string()).is_retryable());
    }

    #[test]
    fn test_context() {
        let err = RobotError::InvalidInput("must be positive".to_string()).context("set_move_velocity");
        assert_eq!(
            err.to_string(),
            "Invalid input: set_move_velocity: must be positive"
        );

        // 包装类型不改写
        let err = RobotError::NoImage.context("camera");
        assert!(matches!(err, RobotError::NoImage));
    }

    #[test]
    fn test_from_conversions() {
        let err: RobotError = ProtocolError::InvalidNote("H9".to_string()).into();
        assert!(matches!(err, RobotError::Protocol(_)));

        let err: RobotError = std::io::Error::new(std::io::ErrorKind::NotFound, "x").into();
        assert!(matches!(err, RobotError::Io(_)));
    }
}
