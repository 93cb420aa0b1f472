//! 驱动层错误类型定义

use aim_protocol::ProtocolError;
use aim_ws::WsError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// WebSocket 传输错误
    #[error("WebSocket error: {0}")]
    Ws(#[from] WsError),

    /// 协议解析错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 初始连接失败
    #[error(
        "Could not connect to ws://{host}/{channel} (reason: {message}). \
         Verify that \"{host}\" is the correct IP/hostname of the AIM robot \
         and that it is connected to the same network (AP mode is 192.168.4.1)"
    )]
    Connect {
        channel: String,
        host: String,
        message: String,
    },

    /// 发送时通道已断开
    #[error("Disconnected: {0}")]
    Disconnected(String),

    /// 接收响应失败
    #[error("Receive error: {0}")]
    ReceiveError(String),

    /// 请求通道已关闭（IO 线程退出）
    #[error("Request channel closed")]
    ChannelClosed,

    /// 请求通道已满（缓冲区容量 10）
    #[error("Request channel full (buffer size: 10)")]
    ChannelFull,

    /// 操作超时
    #[error("Operation timeout")]
    Timeout,

    /// IO 线程错误
    #[error("IO thread error: {0}")]
    IoThread(String),

    /// 无效输入
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DriverError {
    /// 连接是否已经断开
    pub fn is_disconnect(&self) -> bool {
        match self {
            DriverError::Disconnected(_) | DriverError::ReceiveError(_) => true,
            DriverError::Ws(e) => e.is_disconnect(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DriverError;
    use aim_protocol::ProtocolError;
    use aim_ws::WsError;

    /// 测试 DriverError 的 Display 实现
    #[test]
    fn test_driver_error_display() {
        let err = DriverError::Ws(WsError::Timeout);
        assert_eq!(format!("{}", err), "WebSocket error: Read timeout");

        let err = DriverError::Connect {
            channel: "ws_cmd".to_string(),
            host: "10.0.0.9".to_string(),
            message: "refused".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.starts_with("Could not connect to ws://10.0.0.9/ws_cmd (reason: refused)"));
        assert!(msg.contains("192.168.4.1"));

        assert_eq!(format!("{}", DriverError::ChannelClosed), "Request channel closed");
        assert_eq!(format!("{}", DriverError::Timeout), "Operation timeout");

        let msg = format!("{}", DriverError::IoThread("spawn failed".to_string()));
        assert!(msg.contains("IO thread") && msg.contains("spawn failed"));
    }

    /// 测试 From 转换
    #[test]
    fn test_from_conversions() {
        let err: DriverError = WsError::Closed.into();
        assert!(matches!(err, DriverError::Ws(WsError::Closed)));
        assert!(err.is_disconnect());

        let err: DriverError = ProtocolError::InvalidFlags("zz".to_string()).into();
        match err {
            DriverError::Protocol(ProtocolError::InvalidFlags(s)) => assert_eq!(s, "zz"),
            _ => panic!("Expected InvalidFlags variant"),
        }
    }

    /// 测试断线分类
    #[test]
    fn test_is_disconnect() {
        assert!(DriverError::Disconnected("ws_cmd".to_string()).is_disconnect());
        assert!(!DriverError::Timeout.is_disconnect());
        assert!(!DriverError::Ws(WsError::Timeout).is_disconnect());
    }
}
