//! 通道连接监控
//!
//! 每个通道记录最近一次成功收发的时间，用于判断机器人是否仍在响应。

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// 机器人的四个 WebSocket 通道
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Status,
    Image,
    Command,
    Audio,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Status,
        Channel::Image,
        Channel::Command,
        Channel::Audio,
    ];

    /// WebSocket 路径名
    pub const fn name(self) -> &'static str {
        match self {
            Channel::Status => aim_protocol::WS_STATUS,
            Channel::Image => aim_protocol::WS_IMAGE,
            Channel::Command => aim_protocol::WS_COMMAND,
            Channel::Audio => aim_protocol::WS_AUDIO,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 连接监控
///
/// 时间戳以监控创建时刻为基准的微秒数存储，0 表示从未更新。
pub struct ConnectionMonitor {
    start: Instant,
    last_update_us: [AtomicU64; 4],
    up: [AtomicBool; 4],
}

impl ConnectionMonitor {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            last_update_us: Default::default(),
            up: Default::default(),
        }
    }

    /// 记录一次成功的收发
    pub fn touch(&self, channel: Channel) {
        // +1 保证刚创建时的更新也不为 0
        let us = self.start.elapsed().as_micros() as u64 + 1;
        self.last_update_us[channel.index()].store(us, Ordering::Relaxed);
    }

    /// 更新通道的连接状态（由 IO 线程维护）
    pub fn set_up(&self, channel: Channel, up: bool) {
        self.up[channel.index()].store(up, Ordering::Release);
    }

    /// IO 线程报告的连接状态
    pub fn is_up(&self, channel: Channel) -> bool {
        self.up[channel.index()].load(Ordering::Acquire)
    }

    /// 距离上次成功收发的时间（从未收发返回 None）
    pub fn time_since_last_update(&self, channel: Channel) -> Option<Duration> {
        let us = self.last_update_us[channel.index()].load(Ordering::Relaxed);
        if us == 0 {
            return None;
        }
        let last = Duration::from_micros(us - 1);
        Some(self.start.elapsed().saturating_sub(last))
    }

    /// 在 `timeout` 内有过成功收发
    pub fn is_connected(&self, channel: Channel, timeout: Duration) -> bool {
        self.time_since_last_update(channel)
            .is_some_and(|elapsed| elapsed < timeout)
    }
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_updated() {
        let monitor = ConnectionMonitor::new();
        assert!(monitor.time_since_last_update(Channel::Status).is_none());
        assert!(!monitor.is_connected(Channel::Status, Duration::from_secs(10)));
        assert!(!monitor.is_up(Channel::Command));
    }

    #[test]
    fn test_touch_and_expire() {
        let monitor = ConnectionMonitor::new();
        monitor.touch(Channel::Status);
        assert!(monitor.is_connected(Channel::Status, Duration::from_secs(1)));
        // 其他通道不受影响
        assert!(!monitor.is_connected(Channel::Image, Duration::from_secs(1)));

        std::thread::sleep(Duration::from_millis(30));
        assert!(!monitor.is_connected(Channel::Status, Duration::from_millis(10)));
        assert!(monitor.time_since_last_update(Channel::Status).unwrap() >= Duration::from_millis(30));
    }

    #[test]
    fn test_up_flag() {
        let monitor = ConnectionMonitor::new();
        monitor.set_up(Channel::Audio, true);
        assert!(monitor.is_up(Channel::Audio));
        monitor.set_up(Channel::Audio, false);
        assert!(!monitor.is_up(Channel::Audio));
    }

    #[test]
    fn test_channel_names() {
        let names: Vec<_> = Channel::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names, aim_protocol::WS_CHANNELS.to_vec());
        assert_eq!(Channel::Command.to_string(), "ws_cmd");
    }
}
