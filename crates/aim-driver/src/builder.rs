//! Builder 模式实现
//!
//! 提供链式构造 `AimDriver` 实例的便捷方式。

use crate::driver::{AimDriver, ChannelTransports};
use crate::error::DriverError;
use crate::heartbeat::Channel;
use crate::pipeline::PipelineConfig;
use aim_protocol::{AP_MODE_HOST, Command, client_version_string};
use aim_ws::{TransportFactory, WsTransport};
use tracing::{error, info};

/// AimDriver Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use aim_driver::{AimDriverBuilder, PipelineConfig};
///
/// // 连接 AP 模式下的机器人（192.168.4.1）
/// let driver = AimDriverBuilder::new().build().unwrap();
///
/// // 指定主机与 Pipeline 配置
/// let config = PipelineConfig {
///     status_interval_ms: 20,
///     ..PipelineConfig::default()
/// };
/// let driver = AimDriverBuilder::new()
///     .host("10.0.0.42")
///     .config(config)
///     .build()
///     .unwrap();
/// ```
#[derive(Default)]
pub struct AimDriverBuilder {
    /// 机器人主机名或 IP（可带端口）
    host: Option<String>,
    /// Pipeline 配置
    config: Option<PipelineConfig>,
    /// 自定义传输工厂（测试时注入 mock）
    factory: Option<TransportFactory>,
}

impl AimDriverBuilder {
    /// 创建新的 Builder
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置机器人地址（默认 AP 模式地址 `192.168.4.1`）
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// 设置 Pipeline 配置
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// 使用自定义传输工厂
    pub fn transport_factory(mut self, factory: TransportFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    /// 连接四个通道、启动 IO 线程并完成握手
    ///
    /// 1. 依次打开 `ws_status`、`ws_img`、`ws_cmd`、`ws_audio`，任一失败返回
    ///    [`DriverError::Connect`]
    /// 2. 启动 IO 线程
    /// 3. 发送 `program_init`
    /// 4. 等待第一个状态包（最长 `startup_timeout_ms`）
    pub fn build(self) -> Result<AimDriver, DriverError> {
        let host = self.host.unwrap_or_else(|| AP_MODE_HOST.to_string());
        let config = self.config.unwrap_or_default();
        let factory = match self.factory {
            Some(factory) => factory,
            None => default_factory(&host, &config)?,
        };

        info!(
            "AIM client version {} connecting to {}",
            client_version_string(),
            host
        );

        let transports = ChannelTransports {
            status: open_channel(&factory, &host, Channel::Status)?,
            image: open_channel(&factory, &host, Channel::Image)?,
            command: open_channel(&factory, &host, Channel::Command)?,
            audio: open_channel(&factory, &host, Channel::Audio)?,
        };

        let startup_timeout = config.startup_timeout();
        let driver = AimDriver::start(host, config, transports)?;

        driver.send_command(&Command::ProgramInit)?;
        if let Err(e) = driver.wait_for_status(startup_timeout) {
            error!("No status received from {} within {:?}", driver.host(), startup_timeout);
            return Err(e);
        }
        info!("Connected to AIM robot at {}", driver.host());

        Ok(driver)
    }
}

fn open_channel(
    factory: &TransportFactory,
    host: &str,
    channel: Channel,
) -> Result<Box<dyn WsTransport>, DriverError> {
    factory(channel.name()).map_err(|e| {
        let err = DriverError::Connect {
            channel: channel.name().to_string(),
            host: host.to_string(),
            message: e.to_string(),
        };
        error!("{}", err);
        err
    })
}

#[cfg(feature = "tungstenite-backend")]
fn default_factory(host: &str, config: &PipelineConfig) -> Result<TransportFactory, DriverError> {
    let options = aim_ws::ConnectOptions {
        connect_timeout: config.connect_timeout(),
        read_timeout: Some(config.read_timeout()),
    };
    Ok(aim_ws::tungstenite_factory(host, options))
}

#[cfg(not(feature = "tungstenite-backend"))]
fn default_factory(_host: &str, _config: &PipelineConfig) -> Result<TransportFactory, DriverError> {
    Err(DriverError::InvalidInput(
        "no WebSocket backend enabled; use transport_factory()".to_string(),
    ))
}
