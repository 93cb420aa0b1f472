//! 基于 tungstenite 的阻塞式 WebSocket 传输
//!
//! 每个实例持有一条 TCP 连接。读超时作用在底层 `TcpStream` 上，
//! 超时以 [`WsError::Timeout`] 返回，连接保持可用。

use crate::{WsDeviceError, WsDeviceErrorKind, WsError, WsMessage, WsTransport};
use aim_protocol::channel_url;
use std::io::ErrorKind;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::{debug, trace};
use tungstenite::handshake::HandshakeError;
use tungstenite::{Message, WebSocket};

/// 连接参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectOptions {
    /// TCP 连接与写超时
    pub connect_timeout: Duration,
    /// 读超时（None 表示永久阻塞）
    pub read_timeout: Option<Duration>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(4),
            read_timeout: Some(Duration::from_secs(1)),
        }
    }
}

/// tungstenite 传输
pub struct TungsteniteTransport {
    host: String,
    channel: String,
    options: ConnectOptions,
    socket: Option<WebSocket<TcpStream>>,
}

impl TungsteniteTransport {
    /// 连接 `ws://{host}/{channel}`
    ///
    /// `host` 可以带端口（`192.168.4.1:8080`），缺省为 80。
    pub fn connect(host: &str, channel: &str, options: ConnectOptions) -> Result<Self, WsError> {
        let mut transport = Self {
            host: host.to_string(),
            channel: channel.to_string(),
            options,
            socket: None,
        };
        transport.open()?;
        Ok(transport)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn open(&mut self) -> Result<(), WsError> {
        let addr = resolve(&self.host)?;
        let stream = TcpStream::connect_timeout(&addr, self.options.connect_timeout)
            .map_err(|e| WsDeviceError::new(WsDeviceErrorKind::Refused, format!("{}: {}", addr, e)))?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(self.options.read_timeout)?;
        stream.set_write_timeout(Some(self.options.connect_timeout))?;

        let url = channel_url(&self.host, &self.channel);
        let (socket, _response) = tungstenite::client(url.as_str(), stream).map_err(|e| match e {
            HandshakeError::Failure(tungstenite::Error::Url(err)) => {
                WsDeviceError::new(WsDeviceErrorKind::InvalidUrl, format!("{}: {}", url, err))
            },
            HandshakeError::Failure(err) => {
                WsDeviceError::new(WsDeviceErrorKind::HandshakeFailed, format!("{}: {}", url, err))
            },
            HandshakeError::Interrupted(_) => WsDeviceError::new(
                WsDeviceErrorKind::HandshakeFailed,
                format!("{}: handshake interrupted", url),
            ),
        })?;

        debug!("Connected to {}", url);
        self.socket = Some(socket);
        Ok(())
    }

    /// 转换错误；除超时外都视为连接失效
    fn fail(&mut self, err: tungstenite::Error) -> WsError {
        let err = map_error(err);
        if !matches!(err, WsError::Timeout) {
            debug!("{} dropped: {}", self.channel, err);
            self.socket = None;
        }
        err
    }

    fn send_message(&mut self, message: Message) -> Result<(), WsError> {
        let result = match self.socket.as_mut() {
            Some(socket) => socket.send(message),
            None => return Err(WsError::NotConnected),
        };
        result.map_err(|e| self.fail(e))
    }
}

impl WsTransport for TungsteniteTransport {
    fn channel(&self) -> &str {
        &self.channel
    }

    fn send_text(&mut self, text: &str) -> Result<(), WsError> {
        self.send_message(Message::Text(text.to_string()))
    }

    fn send_binary(&mut self, data: &[u8]) -> Result<(), WsError> {
        self.send_message(Message::Binary(data.to_vec()))
    }

    fn receive(&mut self) -> Result<WsMessage, WsError> {
        loop {
            let result = match self.socket.as_mut() {
                Some(socket) => socket.read(),
                None => return Err(WsError::NotConnected),
            };
            match result {
                Ok(Message::Text(text)) => return Ok(WsMessage::Text(text)),
                Ok(Message::Binary(data)) => return Ok(WsMessage::Binary(data)),
                // Ping 的应答由 tungstenite 在下一次读写时自动发出
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {
                    trace!("{}: control frame skipped", self.channel);
                },
                Ok(Message::Close(frame)) => {
                    debug!("{}: close frame received: {:?}", self.channel, frame);
                    self.socket = None;
                    return Err(WsError::Closed);
                },
                Err(e) => return Err(self.fail(e)),
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    fn reconnect(&mut self) -> Result<(), WsError> {
        self.close();
        self.open()
    }

    fn close(&mut self) {
        if let Some(mut socket) = self.socket.take() {
            let _ = socket.close(None);
            let _ = socket.flush();
        }
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), WsError> {
        self.options.read_timeout = timeout;
        if let Some(socket) = self.socket.as_ref() {
            socket.get_ref().set_read_timeout(timeout)?;
        }
        Ok(())
    }
}

impl Drop for TungsteniteTransport {
    fn drop(&mut self) {
        self.close();
    }
}

fn resolve(host: &str) -> Result<SocketAddr, WsError> {
    let target = if host.contains(':') {
        host.to_string()
    } else {
        format!("{}:80", host)
    };
    target
        .to_socket_addrs()
        .map_err(|e| WsDeviceError::new(WsDeviceErrorKind::NotFound, format!("{}: {}", host, e)))?
        .next()
        .ok_or_else(|| {
            WsDeviceError::new(
                WsDeviceErrorKind::NotFound,
                format!("{}: no address found", host),
            )
            .into()
        })
}

fn map_error(err: tungstenite::Error) -> WsError {
    match err {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            WsError::Closed
        },
        tungstenite::Error::Io(e)
            if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
        {
            WsError::Timeout
        },
        tungstenite::Error::Io(e) => WsError::Io(e),
        tungstenite::Error::Url(e) => {
            WsDeviceError::new(WsDeviceErrorKind::InvalidUrl, e.to_string()).into()
        },
        other => WsError::Protocol(other.to_string()),
    }
}
