//! 驱动层模块
//!
//! 本模块提供 VEX AIM 机器人的设备驱动功能，包括：
//! - IO 线程管理（状态、图像、指令、音频四个通道各一个线程）
//! - 状态同步（ArcSwap 无锁读取）
//! - 本地标志覆盖（指令被接受后立即反映到状态）
//! - 钩子系统：屏幕、碰撞、关机事件回调
//! - 断线自动重连
//!
//! # 使用场景
//!
//! 适用于需要直接发送协议指令、读取原始状态的场景。
//! 大多数用户应该使用 `aim-client` 提供的 `Robot` 接口。

mod builder;
mod driver;
mod error;
pub mod heartbeat;
pub mod hooks;
pub mod metrics;
pub mod pipeline;
pub mod state;

pub use builder::AimDriverBuilder;
pub use driver::{AimDriver, ChannelTransports};
pub use error::DriverError;
pub use heartbeat::{Channel, ConnectionMonitor};
pub use hooks::{CallbackKind, EventCallback, FnCallback, HookManager, RobotEvent};
pub use metrics::{DriverMetrics, MetricsSnapshot};
pub use pipeline::{
    AudioRequest, ChannelRequest, CommandRequest, PipelineConfig, StreamControl, audio_loop,
    command_loop, image_loop, status_loop,
};
pub use state::{AimContext, ImageBuffer, PendingFlags};
