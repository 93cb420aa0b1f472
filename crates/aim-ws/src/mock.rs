//! 脚本化的内存传输（无需网络）
//!
//! - 预置回复队列，或用应答函数按发送内容生成回复
//! - 记录所有发出的帧，测试可以随时检查
//! - 可模拟断线、重连失败
//!
//! `MockTransport` 可克隆，所有克隆共享同一状态：把一个克隆交给驱动，
//! 另一个留在测试里观察流量。

use crate::{WsDeviceError, WsDeviceErrorKind, WsError, WsMessage, WsTransport, TransportFactory};
use parking_lot::{Condvar, Mutex};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 预置回复
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    Text(String),
    Binary(Vec<u8>),
    /// 本次接收超时
    Timeout,
    /// 对端关闭连接
    Close,
    /// 协议错误
    Fail(String),
}

type Responder = Box<dyn FnMut(&WsMessage) -> Option<MockReply> + Send>;

struct MockState {
    connected: bool,
    replies: VecDeque<MockReply>,
    sent: Vec<WsMessage>,
    responder: Option<Responder>,
    fail_reconnect: bool,
    reconnects: usize,
    read_timeout: Option<Duration>,
}

struct Shared {
    state: Mutex<MockState>,
    ready: Condvar,
}

/// Mock 传输
#[derive(Clone)]
pub struct MockTransport {
    channel: String,
    shared: Arc<Shared>,
}

impl MockTransport {
    /// 创建已连接的 mock，读超时默认 20ms
    pub fn new(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
            shared: Arc::new(Shared {
                state: Mutex::new(MockState {
                    connected: true,
                    replies: VecDeque::new(),
                    sent: Vec::new(),
                    responder: None,
                    fail_reconnect: false,
                    reconnects: 0,
                    read_timeout: Some(Duration::from_millis(20)),
                }),
                ready: Condvar::new(),
            }),
        }
    }

    /// 追加一条回复
    pub fn push_reply(&self, reply: MockReply) {
        self.shared.state.lock().replies.push_back(reply);
        self.shared.ready.notify_all();
    }

    /// 追加一条文本回复
    pub fn push_text(&self, text: impl Into<String>) {
        self.push_reply(MockReply::Text(text.into()));
    }

    /// 设置应答函数：每发出一帧调用一次，返回的回复进入队列
    pub fn set_responder<F>(&self, responder: F)
    where
        F: FnMut(&WsMessage) -> Option<MockReply> + Send + 'static,
    {
        self.shared.state.lock().responder = Some(Box::new(responder));
    }

    /// 已发出的全部帧
    pub fn sent(&self) -> Vec<WsMessage> {
        self.shared.state.lock().sent.clone()
    }

    /// 已发出的帧（按 UTF-8 解码）
    pub fn sent_text(&self) -> Vec<String> {
        self.sent()
            .iter()
            .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
            .collect()
    }

    pub fn clear_sent(&self) {
        self.shared.state.lock().sent.clear();
    }

    /// 模拟断线（清空未读回复）
    pub fn disconnect(&self) {
        let mut state = self.shared.state.lock();
        state.connected = false;
        state.replies.clear();
        drop(state);
        self.shared.ready.notify_all();
    }

    /// 让后续重连失败
    pub fn set_reconnect_fails(&self, fails: bool) {
        self.shared.state.lock().fail_reconnect = fails;
    }

    pub fn reconnect_count(&self) -> usize {
        self.shared.state.lock().reconnects
    }
}

impl WsTransport for MockTransport {
    fn channel(&self) -> &str {
        &self.channel
    }

    fn send_text(&mut self, text: &str) -> Result<(), WsError> {
        self.record(WsMessage::Text(text.to_string()))
    }

    fn send_binary(&mut self, data: &[u8]) -> Result<(), WsError> {
        self.record(WsMessage::Binary(data.to_vec()))
    }

    fn receive(&mut self) -> Result<WsMessage, WsError> {
        let mut state = self.shared.state.lock();
        let deadline = state.read_timeout.map(|t| Instant::now() + t);

        loop {
            if !state.connected {
                return Err(WsError::NotConnected);
            }
            if let Some(reply) = state.replies.pop_front() {
                return match reply {
                    MockReply::Text(text) => Ok(WsMessage::Text(text)),
                    MockReply::Binary(data) => Ok(WsMessage::Binary(data)),
                    MockReply::Timeout => Err(WsError::Timeout),
                    MockReply::Close => {
                        state.connected = false;
                        Err(WsError::Closed)
                    },
                    MockReply::Fail(reason) => Err(WsError::Protocol(reason)),
                };
            }
            match deadline {
                Some(deadline) => {
                    if self.shared.ready.wait_until(&mut state, deadline).timed_out() {
                        return Err(WsError::Timeout);
                    }
                },
                None => self.shared.ready.wait(&mut state),
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.shared.state.lock().connected
    }

    fn reconnect(&mut self) -> Result<(), WsError> {
        let mut state = self.shared.state.lock();
        state.reconnects += 1;
        if state.fail_reconnect {
            return Err(WsDeviceError::new(
                WsDeviceErrorKind::Refused,
                format!("mock {}: reconnect refused", self.channel),
            )
            .into());
        }
        state.connected = true;
        Ok(())
    }

    fn close(&mut self) {
        self.disconnect();
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), WsError> {
        self.shared.state.lock().read_timeout = timeout;
        Ok(())
    }
}

impl MockTransport {
    fn record(&mut self, message: WsMessage) -> Result<(), WsError> {
        let mut state = self.shared.state.lock();
        if !state.connected {
            return Err(WsError::NotConnected);
        }
        let reply = state.responder.as_mut().and_then(|r| r(&message));
        state.sent.push(message);
        if let Some(reply) = reply {
            state.replies.push_back(reply);
            drop(state);
            self.shared.ready.notify_all();
        }
        Ok(())
    }
}

/// 一组按通道名索引的 mock，提供 [`TransportFactory`]
#[derive(Clone, Default)]
pub struct MockNetwork {
    channels: Arc<Mutex<HashMap<String, MockTransport>>>,
    refused: Arc<Mutex<Vec<String>>>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取得（必要时创建）某个通道的 mock
    pub fn transport(&self, channel: &str) -> MockTransport {
        self.channels
            .lock()
            .entry(channel.to_string())
            .or_insert_with(|| MockTransport::new(channel))
            .clone()
    }

    /// 让某个通道的首次连接失败
    pub fn refuse(&self, channel: &str) {
        self.refused.lock().push(channel.to_string());
    }

    pub fn factory(&self) -> TransportFactory {
        let network = self.clone();
        Arc::new(move |channel: &str| {
            if network.refused.lock().iter().any(|c| c == channel) {
                return Err(WsDeviceError::new(
                    WsDeviceErrorKind::Refused,
                    format!("mock {}: connection refused", channel),
                )
                .into());
            }
            Ok(Box::new(network.transport(channel)) as Box<dyn WsTransport>)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_replies_in_order() {
        let mock = MockTransport::new("ws_cmd");
        let mut transport = mock.clone();
        mock.push_text("a");
        mock.push_reply(MockReply::Binary(vec![1, 2]));
        mock.push_reply(MockReply::Timeout);

        assert_eq!(transport.receive().unwrap(), WsMessage::Text("a".to_string()));
        assert_eq!(transport.receive().unwrap(), WsMessage::Binary(vec![1, 2]));
        assert!(matches!(transport.receive(), Err(WsError::Timeout)));
        // 队列为空时等待读超时
        assert!(matches!(transport.receive(), Err(WsError::Timeout)));
    }

    #[test]
    fn test_records_and_responds() {
        let mock = MockTransport::new("ws_status");
        mock.set_responder(|msg| {
            (msg.as_bytes() == [1]).then(|| MockReply::Text("{}".to_string()))
        });
        let mut transport = mock.clone();

        transport.send_binary(&[1]).unwrap();
        transport.send_text("ignored").unwrap();
        assert_eq!(transport.receive().unwrap(), WsMessage::Text("{}".to_string()));
        assert!(matches!(transport.receive(), Err(WsError::Timeout)));
        assert_eq!(mock.sent().len(), 2);
        assert_eq!(mock.sent_text()[1], "ignored");
    }

    #[test]
    fn test_disconnect_and_reconnect() {
        let mock = MockTransport::new("ws_img");
        let mut transport = mock.clone();

        mock.push_reply(MockReply::Close);
        assert!(matches!(transport.receive(), Err(WsError::Closed)));
        assert!(!transport.is_connected());
        assert!(matches!(transport.send_binary(&[0]), Err(WsError::NotConnected)));

        mock.set_reconnect_fails(true);
        assert!(transport.reconnect().is_err());
        mock.set_reconnect_fails(false);
        transport.reconnect().unwrap();
        assert!(transport.is_connected());
        assert_eq!(mock.reconnect_count(), 2);
    }

    #[test]
    fn test_network_factory() {
        let network = MockNetwork::new();
        network.refuse("ws_audio");
        let factory = network.factory();

        let mut cmd = factory("ws_cmd").unwrap();
        cmd.send_text("hello").unwrap();
        assert_eq!(network.transport("ws_cmd").sent_text(), vec!["hello"]);
        assert!(factory("ws_audio").is_err());
    }
}
