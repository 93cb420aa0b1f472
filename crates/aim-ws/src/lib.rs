//! # AIM WebSocket Transport Layer
//!
//! WebSocket 传输抽象层。机器人对外暴露四个独立的 WebSocket 通道
//! （`ws_status`、`ws_img`、`ws_cmd`、`ws_audio`），每个通道由一个
//! [`WsTransport`] 实例承载，驱动层为每个通道各开一个 IO 线程。
//!
//! ## 后端
//!
//! - `tungstenite-backend`（默认）：阻塞式 [`TungsteniteTransport`]
//! - `mock`：脚本化的 [`MockTransport`]，用于无硬件测试

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[cfg(feature = "tungstenite-backend")]
pub mod client;

#[cfg(feature = "tungstenite-backend")]
pub use client::{ConnectOptions, TungsteniteTransport};

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "mock")]
pub use mock::{MockNetwork, MockReply, MockTransport};

/// WebSocket 传输层统一错误类型
#[derive(Error, Debug)]
pub enum WsError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Protocol Error: {0}")]
    Protocol(String),
    #[error("Device Error: {0}")]
    Device(#[from] WsDeviceError),
    #[error("Read timeout")]
    Timeout,
    #[error("Connection closed")]
    Closed,
    #[error("Not connected")]
    NotConnected,
}

impl WsError {
    /// 该错误是否意味着连接已断开（需要重连）
    pub fn is_disconnect(&self) -> bool {
        match self {
            WsError::Closed | WsError::NotConnected => true,
            WsError::Io(e) => !matches!(
                e.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}

/// 连接/后端错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WsDeviceErrorKind {
    Unknown,
    /// 主机名无法解析
    NotFound,
    /// TCP 连接被拒绝或超时
    Refused,
    /// WebSocket 握手失败
    HandshakeFailed,
    InvalidUrl,
    Backend,
}

/// 结构化连接错误
#[derive(Error, Debug, Clone)]
#[error("{kind:?}: {message}")]
pub struct WsDeviceError {
    pub kind: WsDeviceErrorKind,
    pub message: String,
}

impl WsDeviceError {
    pub fn new(kind: WsDeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// 重试也无法恢复的错误
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            WsDeviceErrorKind::NotFound | WsDeviceErrorKind::InvalidUrl
        )
    }
}

impl From<String> for WsDeviceError {
    fn from(message: String) -> Self {
        Self::new(WsDeviceErrorKind::Unknown, message)
    }
}

impl From<&str> for WsDeviceError {
    fn from(message: &str) -> Self {
        Self::new(WsDeviceErrorKind::Unknown, message)
    }
}

/// 收到的数据帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsMessage {
    Text(String),
    Binary(Vec<u8>),
}

impl WsMessage {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            WsMessage::Text(s) => s.as_bytes(),
            WsMessage::Binary(b) => b,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            WsMessage::Text(s) => s.into_bytes(),
            WsMessage::Binary(b) => b,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// 单个 WebSocket 通道
pub trait WsTransport: Send {
    /// 通道名（如 `ws_status`）
    fn channel(&self) -> &str;
    fn send_text(&mut self, text: &str) -> Result<(), WsError>;
    fn send_binary(&mut self, data: &[u8]) -> Result<(), WsError>;
    /// 阻塞接收一帧，超过读超时返回 [`WsError::Timeout`]
    fn receive(&mut self) -> Result<WsMessage, WsError>;
    fn is_connected(&self) -> bool;
    /// 丢弃旧连接并重新握手
    fn reconnect(&mut self) -> Result<(), WsError>;
    fn close(&mut self);
    fn set_read_timeout(&mut self, _timeout: Option<Duration>) -> Result<(), WsError> {
        Ok(())
    }
}

/// 按通道名打开传输的工厂
pub type TransportFactory =
    Arc<dyn Fn(&str) -> Result<Box<dyn WsTransport>, WsError> + Send + Sync>;

/// 基于 tungstenite 的工厂
#[cfg(feature = "tungstenite-backend")]
pub fn tungstenite_factory(host: &str, options: ConnectOptions) -> TransportFactory {
    let host = host.to_string();
    Arc::new(move |channel: &str| {
        let transport = TungsteniteTransport::connect(&host, channel, options)?;
        Ok(Box::new(transport) as Box<dyn WsTransport>)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_error_fatal() {
        assert!(WsDeviceError::new(WsDeviceErrorKind::NotFound, "no such host").is_fatal());
        assert!(WsDeviceError::new(WsDeviceErrorKind::InvalidUrl, "bad").is_fatal());
        assert!(!WsDeviceError::new(WsDeviceErrorKind::Refused, "refused").is_fatal());
        assert!(!WsDeviceError::from("oops").is_fatal());
        assert_eq!(
            WsDeviceError::from("oops".to_string()).kind,
            WsDeviceErrorKind::Unknown
        );
    }

    #[test]
    fn test_error_display() {
        let err: WsError = WsDeviceError::new(WsDeviceErrorKind::Refused, "10.0.0.2:80").into();
        assert_eq!(err.to_string(), "Device Error: Refused: 10.0.0.2:80");
        assert_eq!(WsError::Timeout.to_string(), "Read timeout");
    }

    #[test]
    fn test_is_disconnect() {
        assert!(WsError::Closed.is_disconnect());
        assert!(WsError::NotConnected.is_disconnect());
        assert!(!WsError::Timeout.is_disconnect());
        let would_block = std::io::Error::new(std::io::ErrorKind::WouldBlock, "wb");
        assert!(!WsError::Io(would_block).is_disconnect());
        let reset = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(WsError::Io(reset).is_disconnect());
    }

    #[test]
    fn test_message_bytes() {
        let text = WsMessage::Text("{}".to_string());
        assert_eq!(text.as_bytes(), b"{}");
        assert_eq!(text.len(), 2);
        assert_eq!(WsMessage::Binary(vec![1]).into_bytes(), vec![1]);
        assert!(WsMessage::Binary(Vec::new()).is_empty());
    }
}
