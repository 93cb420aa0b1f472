//! Pipeline IO 循环模块
//!
//! 四个 WebSocket 通道各由一个后台线程独占：
//!
//! - `status_loop`: 周期轮询状态、叠加本地覆盖、触发事件
//! - `image_loop`: 接收相机图像流（双缓冲）
//! - `command_loop`: 串行执行指令请求（请求/响应）
//! - `audio_loop`: 发送音频帧（无响应）
//!
//! 通道断开后各线程按 `reconnect_interval_ms` 的间隔自行重连。

use crate::error::DriverError;
use crate::heartbeat::Channel;
use crate::hooks::RobotEvent;
use crate::metrics::DriverMetrics;
use crate::state::AimContext;
use aim_protocol::{Command, CommandResponse, ResponseStatus, RobotStatus, StatusFlags};
use aim_ws::WsTransport;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Pipeline 配置
///
/// 控制 IO 线程的轮询周期、超时与重连行为。
///
/// # Example
///
/// ```
/// use aim_driver::PipelineConfig;
///
/// // 默认配置（50ms 状态轮询，4s 连接超时）
/// let config = PipelineConfig::default();
///
/// // 自定义配置
/// let config = PipelineConfig {
///     status_interval_ms: 20,
///     ..PipelineConfig::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// 状态轮询周期（毫秒）
    pub status_interval_ms: u64,
    /// TCP 连接与握手超时（毫秒），同时用作指令响应的读超时
    pub connect_timeout_ms: u64,
    /// 状态与图像通道的读超时（毫秒）
    pub read_timeout_ms: u64,
    /// 断线后的重连间隔（毫秒）
    pub reconnect_interval_ms: u64,
    /// 连续丢失超过该数量的状态包后，状态回到空文档
    pub max_lost_packets: u32,
    /// 等待指令响应的超时（毫秒）
    pub command_timeout_ms: u64,
    /// 启动时等待第一个状态包的超时（毫秒）
    pub startup_timeout_ms: u64,
    /// 首次取图时等待图像的时间（毫秒）
    pub image_wait_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            status_interval_ms: 50,
            connect_timeout_ms: 4000,
            read_timeout_ms: 1000,
            reconnect_interval_ms: 200,
            max_lost_packets: 5,
            command_timeout_ms: 5000,
            startup_timeout_ms: 10_000,
            image_wait_ms: 500,
        }
    }
}

impl PipelineConfig {
    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.status_interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }

    pub fn image_wait(&self) -> Duration {
        Duration::from_millis(self.image_wait_ms)
    }
}

/// 通道请求：负载 + 独立的应答通道
pub struct ChannelRequest<T, R> {
    pub payload: T,
    pub reply: Sender<Result<R, DriverError>>,
}

/// `ws_cmd` 请求
pub type CommandRequest = ChannelRequest<Command, CommandResponse>;

/// `ws_audio` 请求
pub type AudioRequest = ChannelRequest<Vec<u8>, ()>;

/// 图像流控制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamControl {
    Start,
    Stop,
}

/// 图像线程空闲时的休眠周期
const IMAGE_IDLE: Duration = Duration::from_millis(50);

// ============================================================
// 重连
// ============================================================

/// 断线重连状态
struct Reconnector {
    channel: Channel,
    interval: Duration,
    last_attempt: Option<Instant>,
}

impl Reconnector {
    fn new(channel: Channel, interval: Duration) -> Self {
        Self {
            channel,
            interval,
            last_attempt: None,
        }
    }

    /// 已连接返回 true；断线时按间隔尝试重连
    fn ensure_connected(
        &mut self,
        transport: &mut dyn WsTransport,
        ctx: &AimContext,
        metrics: &DriverMetrics,
    ) -> bool {
        if transport.is_connected() {
            return true;
        }
        ctx.connection_monitor.set_up(self.channel, false);

        if let Some(last) = self.last_attempt
            && last.elapsed() < self.interval
        {
            return false;
        }
        self.last_attempt = Some(Instant::now());
        metrics.reconnects.fetch_add(1, Ordering::Relaxed);

        info!("{}: attempting to reconnect", self.channel);
        match transport.reconnect() {
            Ok(()) => {
                info!("{}: reconnected", self.channel);
                ctx.connection_monitor.set_up(self.channel, true);
                true
            },
            Err(e) => {
                warn!("{}: reconnect failed: {}", self.channel, e);
                false
            },
        }
    }
}

fn apply_read_timeout(transport: &mut dyn WsTransport, timeout: Duration) {
    if let Err(e) = transport.set_read_timeout(Some(timeout)) {
        warn!("{}: failed to set read timeout: {}", transport.channel(), e);
    }
}

// ============================================================
// 状态线程
// ============================================================

/// 状态包处理器
///
/// 保存跨包的状态：连续丢包计数、上一次的屏幕按压状态。
pub(crate) struct StatusTracker {
    lost: u32,
    max_lost: u32,
    screen_pressed: bool,
}

impl StatusTracker {
    pub(crate) fn new(max_lost: u32) -> Self {
        Self {
            lost: 0,
            max_lost,
            screen_pressed: false,
        }
    }

    /// 处理一个有效状态包
    pub(crate) fn on_packet(&mut self, ctx: &AimContext, status: RobotStatus, metrics: &DriverMetrics) {
        self.lost = 0;

        let (set, clear) = ctx.pending.take();
        let status = status.with_flag_overrides(set, clear);
        let flags = status.robot.flags;
        let pressed = status.robot.is_screen_pressed();
        let (x, y) = (status.robot.touch_x, status.robot.touch_y);

        ctx.store_status(status);
        metrics.status_packets.fetch_add(1, Ordering::Relaxed);

        ctx.fire(&RobotEvent::Status);

        if flags.contains(StatusFlags::HAS_CRASHED) {
            ctx.fire(&RobotEvent::Crashed);
        }

        if pressed != self.screen_pressed {
            self.screen_pressed = pressed;
            if pressed {
                ctx.fire(&RobotEvent::ScreenPressed { x, y });
            } else {
                ctx.fire(&RobotEvent::ScreenReleased { x, y });
            }
        }

        if flags.contains(StatusFlags::PWR_BUTTON) {
            info!("Detected power button press");
            ctx.request_shutdown("power button pressed");
        }

        let active = flags.contains(StatusFlags::PROG_ACTIVE);
        if ctx.swap_program_active(active) && !active {
            info!("Robot program is no longer active");
            ctx.request_shutdown("robot program stopped");
        }
    }

    /// 记录一次丢包
    pub(crate) fn on_lost(&mut self, ctx: &AimContext, err: &DriverError, metrics: &DriverMetrics) {
        self.lost = self.lost.saturating_add(1);
        metrics.status_lost.fetch_add(1, Ordering::Relaxed);
        warn!("Status thread: lost status packet ({}), counter: {}", err, self.lost);

        if self.lost > self.max_lost && ctx.has_status() {
            warn!(
                "Status thread: {} consecutive packets lost, resetting status",
                self.lost
            );
            ctx.reset_status();
            metrics.status_resets.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// 发送 `[1]` 并读取一份状态文档
fn poll_status(transport: &mut dyn WsTransport) -> Result<RobotStatus, DriverError> {
    transport.send_binary(&[1])?;
    let message = transport.receive()?;
    Ok(RobotStatus::parse_bytes(message.as_bytes())?)
}

/// 状态线程主循环
///
/// # 参数
/// - `transport`: `ws_status` 通道
/// - `ctx`: 共享状态上下文
/// - `config`: Pipeline 配置
/// - `is_running`: 运行标志（用于生命周期联动）
/// - `metrics`: 计数器
pub fn status_loop(
    mut transport: Box<dyn WsTransport>,
    ctx: Arc<AimContext>,
    config: PipelineConfig,
    is_running: Arc<AtomicBool>,
    metrics: Arc<DriverMetrics>,
) {
    apply_read_timeout(transport.as_mut(), config.read_timeout());
    ctx.connection_monitor.set_up(Channel::Status, transport.is_connected());

    let interval = config.status_interval();
    let mut reconnector = Reconnector::new(Channel::Status, config.reconnect_interval());
    let mut tracker = StatusTracker::new(config.max_lost_packets);

    loop {
        // Acquire: If we see false, we must see all cleanup writes from other threads
        if !is_running.load(Ordering::Acquire) {
            trace!("Status thread: is_running flag is false, exiting");
            break;
        }

        if !reconnector.ensure_connected(transport.as_mut(), &ctx, &metrics) {
            spin_sleep::sleep(interval);
            continue;
        }

        match poll_status(transport.as_mut()) {
            Ok(status) => {
                ctx.connection_monitor.touch(Channel::Status);
                tracker.on_packet(&ctx, status, &metrics);
            },
            Err(e) => tracker.on_lost(&ctx, &e, &metrics),
        }

        spin_sleep::sleep(interval);
    }
}

// ============================================================
// 图像线程
// ============================================================

fn apply_stream_control(transport: &mut dyn WsTransport, ctx: &AimContext, control: StreamControl) {
    match control {
        StreamControl::Start => match transport.send_binary(&[1]) {
            Ok(()) => {
                debug!("Image thread: stream started");
                ctx.image.set_streaming(true);
            },
            Err(e) => warn!("Image thread: failed to start stream: {}", e),
        },
        StreamControl::Stop => {
            ctx.image.set_streaming(false);
            if let Err(e) = transport.send_binary(&[0]) {
                debug!("Image thread: failed to stop stream: {}", e);
            }
        },
    }
}

/// 图像线程主循环
///
/// 流开启时每次接收一帧存入双缓冲；接收失败把当前帧标记为缺失。
/// 流关闭时阻塞在控制通道上（最长 50ms）。
pub fn image_loop(
    mut transport: Box<dyn WsTransport>,
    ctx: Arc<AimContext>,
    control: Receiver<StreamControl>,
    config: PipelineConfig,
    is_running: Arc<AtomicBool>,
    metrics: Arc<DriverMetrics>,
) {
    apply_read_timeout(transport.as_mut(), config.read_timeout());
    ctx.connection_monitor.set_up(Channel::Image, transport.is_connected());

    let mut reconnector = Reconnector::new(Channel::Image, config.reconnect_interval());

    loop {
        if !is_running.load(Ordering::Acquire) {
            trace!("Image thread: is_running flag is false, exiting");
            break;
        }

        // 先处理积压的流控请求
        loop {
            match control.try_recv() {
                Ok(c) => apply_stream_control(transport.as_mut(), &ctx, c),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        if !transport.is_connected() {
            if ctx.image.is_streaming() {
                debug!("Image thread: connection lost, stream stopped");
                ctx.image.set_streaming(false);
            }
            if !reconnector.ensure_connected(transport.as_mut(), &ctx, &metrics) {
                spin_sleep::sleep(IMAGE_IDLE);
            }
            continue;
        }

        if ctx.image.is_streaming() {
            match transport.receive() {
                Ok(message) => {
                    ctx.connection_monitor.touch(Channel::Image);
                    metrics.images_received.fetch_add(1, Ordering::Relaxed);
                    ctx.image.store(message.into_bytes());
                },
                Err(e) => {
                    debug!("Image thread: receive failed: {}", e);
                    ctx.image.mark_missing();
                },
            }
        } else {
            match control.recv_timeout(IMAGE_IDLE) {
                Ok(c) => apply_stream_control(transport.as_mut(), &ctx, c),
                Err(RecvTimeoutError::Timeout) => {},
                Err(RecvTimeoutError::Disconnected) => spin_sleep::sleep(IMAGE_IDLE),
            }
        }
    }

    // 退出前尽量关闭图像流
    if ctx.image.is_streaming() && transport.is_connected() {
        apply_stream_control(transport.as_mut(), &ctx, StreamControl::Stop);
    }
}

// ============================================================
// 指令 / 音频线程
// ============================================================

/// 发送指令并读取响应
///
/// 接收失败时关闭连接，避免迟到的响应被当成下一条指令的回复。
pub(crate) fn execute_command(
    transport: &mut dyn WsTransport,
    command: &Command,
    ctx: &AimContext,
    metrics: &DriverMetrics,
) -> Result<CommandResponse, DriverError> {
    let cmd_id = command.cmd_id();
    let json = command.to_json()?;

    if let Err(e) = transport.send_binary(json.as_bytes()) {
        return Err(DriverError::Disconnected(format!(
            "error sending {} to robot: {}",
            cmd_id, e
        )));
    }
    metrics.commands_sent.fetch_add(1, Ordering::Relaxed);

    let reply = match transport.receive() {
        Ok(reply) => reply,
        Err(e) => {
            transport.close();
            return Err(DriverError::Disconnected(format!(
                "robot got disconnected after sending cmd_id: {} ({})",
                cmd_id, e
            )));
        },
    };
    ctx.connection_monitor.touch(Channel::Command);

    let response = match CommandResponse::parse(reply.as_bytes()) {
        Ok(response) => response,
        Err(e) => {
            warn!("Could not parse robot reply to {}: {}", cmd_id, e);
            return Ok(CommandResponse {
                cmd_id: cmd_id.to_string(),
                ..CommandResponse::default()
            });
        },
    };

    if response.is_unknown_command() {
        metrics.commands_rejected.fetch_add(1, Ordering::Relaxed);
        warn!("Robot did not recognize command: {}", cmd_id);
    } else if response.status() == ResponseStatus::Error {
        metrics.commands_rejected.fetch_add(1, Ordering::Relaxed);
        warn!(
            "Robot error processing command {}, reason: {}",
            cmd_id,
            response.error_reason()
        );
    } else {
        ctx.pending.apply_accepted(response.implied_flags());
    }

    Ok(response)
}

fn send_audio_frame(
    transport: &mut dyn WsTransport,
    frame: &[u8],
    ctx: &AimContext,
    metrics: &DriverMetrics,
) -> Result<(), DriverError> {
    transport.send_binary(frame).map_err(|e| {
        DriverError::Disconnected(format!("error sending audio frame to robot: {}", e))
    })?;
    ctx.connection_monitor.touch(Channel::Audio);
    metrics.audio_frames_sent.fetch_add(1, Ordering::Relaxed);
    Ok(())
}

/// 请求/应答线程的公共循环
///
/// 请求通道关闭（驱动 Drop）或 `is_running` 为 false 时退出。
#[allow(clippy::too_many_arguments)]
fn serve_requests<T, R, F>(
    mut transport: Box<dyn WsTransport>,
    channel: Channel,
    requests: Receiver<ChannelRequest<T, R>>,
    ctx: Arc<AimContext>,
    config: &PipelineConfig,
    is_running: Arc<AtomicBool>,
    metrics: Arc<DriverMetrics>,
    mut handle: F,
) where
    F: FnMut(&mut dyn WsTransport, &T) -> Result<R, DriverError>,
{
    ctx.connection_monitor.set_up(channel, transport.is_connected());
    let poll = config.reconnect_interval();
    let mut reconnector = Reconnector::new(channel, poll);

    loop {
        if !is_running.load(Ordering::Acquire) {
            trace!("{} thread: is_running flag is false, exiting", channel);
            break;
        }

        reconnector.ensure_connected(transport.as_mut(), &ctx, &metrics);

        let request = match requests.recv_timeout(poll) {
            Ok(request) => request,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                trace!("{} thread: request channel closed, exiting", channel);
                break;
            },
        };

        let result = if transport.is_connected() {
            handle(transport.as_mut(), &request.payload)
        } else {
            Err(DriverError::Disconnected(format!("{} is not connected", channel)))
        };
        if result.is_err() {
            ctx.connection_monitor.set_up(channel, transport.is_connected());
        }
        // 调用方可能已超时放弃
        let _ = request.reply.send(result);
    }
}

/// 指令线程主循环
pub fn command_loop(
    mut transport: Box<dyn WsTransport>,
    requests: Receiver<CommandRequest>,
    ctx: Arc<AimContext>,
    config: PipelineConfig,
    is_running: Arc<AtomicBool>,
    metrics: Arc<DriverMetrics>,
) {
    // 指令响应可能晚于状态轮询周期，使用连接超时作为读超时
    apply_read_timeout(transport.as_mut(), config.connect_timeout());

    let handler_ctx = Arc::clone(&ctx);
    let handler_metrics = Arc::clone(&metrics);
    serve_requests(
        transport,
        Channel::Command,
        requests,
        ctx,
        &config,
        is_running,
        metrics,
        move |transport, command| {
            execute_command(transport, command, &handler_ctx, &handler_metrics)
        },
    );
}

/// 音频线程主循环
pub fn audio_loop(
    transport: Box<dyn WsTransport>,
    requests: Receiver<AudioRequest>,
    ctx: Arc<AimContext>,
    config: PipelineConfig,
    is_running: Arc<AtomicBool>,
    metrics: Arc<DriverMetrics>,
) {
    let handler_ctx = Arc::clone(&ctx);
    let handler_metrics = Arc::clone(&metrics);
    serve_requests(
        transport,
        Channel::Audio,
        requests,
        ctx,
        &config,
        is_running,
        metrics,
        move |transport, frame| send_audio_frame(transport, frame, &handler_ctx, &handler_metrics),
    );
}
