//! Builder 模式实现
//!
//! 提供链式构造 [`Robot`] 的便捷方式。未指定主机时从 `settings.json` 读取。

use crate::error::Result;
use crate::robot::{DEFAULT_MOTION_TIMEOUT, Robot};
use crate::settings::Settings;
use aim_driver::{AimDriverBuilder, PipelineConfig};
use aim_ws::TransportFactory;
use std::time::Duration;
use tracing::info;

/// Robot Builder（链式构造）
///
/// # 示例
///
/// ```rust,no_run
/// use aim_client::RobotBuilder;
///
/// // 主机来自 settings.json（默认 localhost）
/// let robot = RobotBuilder::new().build()?;
///
/// // 直连 AP 模式下的机器人
/// let robot = RobotBuilder::new().host("192.168.4.1").build()?;
/// # Ok::<(), aim_client::RobotError>(())
/// ```
#[derive(Default)]
pub struct RobotBuilder {
    host: Option<String>,
    config: Option<PipelineConfig>,
    factory: Option<TransportFactory>,
    motion_timeout: Option<Duration>,
}

impl RobotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 机器人主机名或 IP（可带端口）
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Pipeline 配置
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// 使用自定义传输工厂（测试时注入 mock）
    pub fn transport_factory(mut self, factory: TransportFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    /// 阻塞式运动的超时（默认 10 秒）
    pub fn motion_timeout(mut self, timeout: Duration) -> Self {
        self.motion_timeout = Some(timeout);
        self
    }

    /// 连接机器人
    ///
    /// # 错误
    /// - `RobotError::Settings`: 设置文件存在但无法解析
    /// - `RobotError::Driver`: 任一通道连接失败或启动超时
    pub fn build(self) -> Result<Robot> {
        let host = match self.host {
            Some(host) if !host.is_empty() => host,
            _ => Settings::load()?.host().to_string(),
        };
        info!("Welcome to the AIM Rust client, robot host is {}", host);

        let mut builder = AimDriverBuilder::new()
            .host(host)
            .config(self.config.unwrap_or_default());
        if let Some(factory) = self.factory {
            builder = builder.transport_factory(factory);
        }
        let driver = builder.build()?;

        Ok(Robot::from_driver(
            driver,
            self.motion_timeout.unwrap_or(DEFAULT_MOTION_TIMEOUT),
        ))
    }
}
