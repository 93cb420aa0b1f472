//! IO 链路计数器
//!
//! 各 IO 线程用 `fetch_add(1, Ordering::Relaxed)` 累加，
//! [`DriverMetrics::snapshot`] 取一份一致性不严格的快照用于监控。

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// 驱动计数器
#[derive(Debug, Default)]
pub struct DriverMetrics {
    /// 成功解析并存储的状态包
    pub status_packets: AtomicU64,
    /// 丢失（接收或解析失败）的状态包
    pub status_lost: AtomicU64,
    /// 因连续丢包而重置为空状态的次数
    pub status_resets: AtomicU64,
    /// 收到的图像帧
    pub images_received: AtomicU64,
    /// 已发送的指令
    pub commands_sent: AtomicU64,
    /// 机器人拒绝（`cmd_unknown` 或 `error`）的指令
    pub commands_rejected: AtomicU64,
    /// 已发送的音频帧
    pub audio_frames_sent: AtomicU64,
    /// 重连尝试次数
    pub reconnects: AtomicU64,
}

impl DriverMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            status_packets: self.status_packets.load(Ordering::Relaxed),
            status_lost: self.status_lost.load(Ordering::Relaxed),
            status_resets: self.status_resets.load(Ordering::Relaxed),
            images_received: self.images_received.load(Ordering::Relaxed),
            commands_sent: self.commands_sent.load(Ordering::Relaxed),
            commands_rejected: self.commands_rejected.load(Ordering::Relaxed),
            audio_frames_sent: self.audio_frames_sent.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
        }
    }
}

/// 计数器快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub status_packets: u64,
    pub status_lost: u64,
    pub status_resets: u64,
    pub images_received: u64,
    pub commands_sent: u64,
    pub commands_rejected: u64,
    pub audio_frames_sent: u64,
    pub reconnects: u64,
}

impl MetricsSnapshot {
    /// 状态包丢失率（0.0 ~ 1.0）
    pub fn status_loss_rate(&self) -> f64 {
        let total = self.status_packets + self.status_lost;
        if total == 0 {
            0.0
        } else {
            self.status_lost as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let metrics = DriverMetrics::new();
        metrics.status_packets.fetch_add(3, Ordering::Relaxed);
        metrics.status_lost.fetch_add(1, Ordering::Relaxed);
        metrics.reconnects.fetch_add(2, Ordering::Relaxed);

        let snap = metrics.snapshot();
        assert_eq!(snap.status_packets, 3);
        assert_eq!(snap.status_lost, 1);
        assert_eq!(snap.reconnects, 2);
        assert_eq!(snap.commands_sent, 0);
        assert!((snap.status_loss_rate() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_loss_rate_without_traffic() {
        assert_eq!(MetricsSnapshot::default().status_loss_rate(), 0.0);
    }
}
