//! 内部指令发送器
//!
//! 各子系统（屏幕、声音、LED 等）共享同一个驱动，经由 `RawCommander` 发送指令、
//! 读取状态。不对外暴露。

use crate::error::{Result, RobotError};
use aim_driver::{AimDriver, DriverError};
use aim_protocol::{Command, CommandResponse, RobotStatus, StatusFlags};
use std::sync::Arc;
use tracing::trace;

#[derive(Clone)]
pub(crate) struct RawCommander {
    driver: Arc<AimDriver>,
}

impl RawCommander {
    pub(crate) fn new(driver: Arc<AimDriver>) -> Self {
        Self { driver }
    }

    /// 发送指令并等待响应
    ///
    /// 机器人拒绝的指令只记录日志（驱动层完成），这里返回 `Ok`。
    pub(crate) fn send(&self, command: Command) -> Result<CommandResponse> {
        trace!("send {}", command.cmd_id());
        self.driver.send_command(&command).map_err(map_driver_error)
    }

    /// 在 `ws_audio` 上发送一帧
    pub(crate) fn send_audio(&self, frame: Vec<u8>) -> Result<()> {
        self.driver.send_audio(frame).map_err(map_driver_error)
    }

    pub(crate) fn status(&self) -> Arc<RobotStatus> {
        self.driver.status()
    }

    /// 当前状态标志（已叠加本地覆盖）
    pub(crate) fn flags(&self) -> StatusFlags {
        self.driver.status().robot.flags
    }

    /// 当前状态标志，或尚待叠加的置位请求中包含 `flag`
    pub(crate) fn flag_or_pending(&self, flag: StatusFlags) -> bool {
        let (set, _) = self.driver.pending();
        set.contains(flag) || self.flags().contains(flag)
    }

    pub(crate) fn driver(&self) -> &Arc<AimDriver> {
        &self.driver
    }
}

/// 断线统一映射为 `RobotError::Disconnected`，其余保持驱动层错误
fn map_driver_error(err: DriverError) -> RobotError {
    match err {
        DriverError::Disconnected(msg) => RobotError::Disconnected(msg),
        other => RobotError::Driver(other),
    }
}
