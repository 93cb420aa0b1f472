//! AIM 驱动（对外 API）
//!
//! 持有四个 IO 线程与共享上下文，提供线程安全的状态读取与指令发送。

use crate::error::DriverError;
use crate::heartbeat::Channel;
use crate::hooks::{CallbackKind, EventCallback, FnCallback, RobotEvent};
use crate::metrics::{DriverMetrics, MetricsSnapshot};
use crate::pipeline::*;
use crate::state::AimContext;
use aim_protocol::{Command, CommandResponse, RobotStatus, StatusFlags};
use aim_ws::WsTransport;
use crossbeam_channel::{RecvTimeoutError, SendTimeoutError, Sender, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{JoinHandle, spawn};
use std::time::{Duration, Instant};
use tracing::{error, info};

/// 请求通道容量
const REQUEST_CHANNEL_CAPACITY: usize = 10;

/// 线程 join 超时
const JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// 带超时的 join
trait JoinTimeout {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()>;
}

impl<T: Send + 'static> JoinTimeout for JoinHandle<T> {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()> {
        use std::sync::mpsc;

        let (tx, rx) = mpsc::channel();

        // 看门狗线程负责真正的 join
        spawn(move || {
            let result = self.join();
            let _ = tx.send(result);
        });

        match rx.recv_timeout(timeout) {
            Ok(join_result) => join_result.map(|_| ()),
            Err(mpsc::RecvTimeoutError::Timeout) => Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "Thread join timeout",
            ))),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "Thread panicked during join",
            ))),
        }
    }
}

/// 四个通道的传输
pub struct ChannelTransports {
    pub status: Box<dyn WsTransport>,
    pub image: Box<dyn WsTransport>,
    pub command: Box<dyn WsTransport>,
    pub audio: Box<dyn WsTransport>,
}

/// AIM 机器人驱动
///
/// 通常通过 [`AimDriverBuilder`](crate::AimDriverBuilder) 创建。
/// Drop 时停止所有 IO 线程（每个线程最多等待 2 秒）。
pub struct AimDriver {
    host: String,
    config: PipelineConfig,
    ctx: Arc<AimContext>,
    metrics: Arc<DriverMetrics>,
    is_running: Arc<AtomicBool>,
    command_tx: Option<Sender<CommandRequest>>,
    audio_tx: Option<Sender<AudioRequest>>,
    stream_tx: Option<Sender<StreamControl>>,
    status_thread: Option<JoinHandle<()>>,
    image_thread: Option<JoinHandle<()>>,
    command_thread: Option<JoinHandle<()>>,
    audio_thread: Option<JoinHandle<()>>,
}

impl AimDriver {
    /// 用已连接的传输启动四个 IO 线程
    ///
    /// 不发送 `program_init`，也不等待状态；完整的启动流程见
    /// [`AimDriverBuilder::build`](crate::AimDriverBuilder::build)。
    pub fn start(
        host: impl Into<String>,
        config: PipelineConfig,
        transports: ChannelTransports,
    ) -> Result<Self, DriverError> {
        let ctx = Arc::new(AimContext::new());
        let metrics = Arc::new(DriverMetrics::new());
        let is_running = Arc::new(AtomicBool::new(true));

        let (command_tx, command_rx) = bounded::<CommandRequest>(REQUEST_CHANNEL_CAPACITY);
        let (audio_tx, audio_rx) = bounded::<AudioRequest>(REQUEST_CHANNEL_CAPACITY);
        let (stream_tx, stream_rx) = bounded::<StreamControl>(REQUEST_CHANNEL_CAPACITY);

        // 先构造驱动再逐个启动线程：中途失败时 Drop 会回收已启动的线程
        let mut driver = Self {
            host: host.into(),
            config: config.clone(),
            ctx: Arc::clone(&ctx),
            metrics: Arc::clone(&metrics),
            is_running: Arc::clone(&is_running),
            command_tx: Some(command_tx),
            audio_tx: Some(audio_tx),
            stream_tx: Some(stream_tx),
            status_thread: None,
            image_thread: None,
            command_thread: None,
            audio_thread: None,
        };

        let ChannelTransports {
            status,
            image,
            command,
            audio,
        } = transports;

        driver.status_thread = Some(spawn_io(Channel::Status, {
            let (ctx, config, is_running, metrics) =
                (Arc::clone(&ctx), config.clone(), Arc::clone(&is_running), Arc::clone(&metrics));
            move || status_loop(status, ctx, config, is_running, metrics)
        })?);

        driver.image_thread = Some(spawn_io(Channel::Image, {
            let (ctx, config, is_running, metrics) =
                (Arc::clone(&ctx), config.clone(), Arc::clone(&is_running), Arc::clone(&metrics));
            move || image_loop(image, ctx, stream_rx, config, is_running, metrics)
        })?);

        driver.command_thread = Some(spawn_io(Channel::Command, {
            let (ctx, config, is_running, metrics) =
                (Arc::clone(&ctx), config.clone(), Arc::clone(&is_running), Arc::clone(&metrics));
            move || command_loop(command, command_rx, ctx, config, is_running, metrics)
        })?);

        driver.audio_thread = Some(spawn_io(Channel::Audio, {
            move || audio_loop(audio, audio_rx, ctx, config, is_running, metrics)
        })?);

        Ok(driver)
    }

    // ==================== 指令 ====================

    /// 发送指令并等待机器人响应（最长 `command_timeout_ms`）
    ///
    /// 机器人拒绝指令（`cmd_unknown` / `error`）时仍返回 `Ok`，
    /// 由调用方检查 [`CommandResponse::status`]。
    pub fn send_command(&self, command: &Command) -> Result<CommandResponse, DriverError> {
        submit(self.command_tx.as_ref(), command.clone(), self.config.command_timeout())
    }

    /// 在 `ws_audio` 上发送一帧（头部 + 数据）
    pub fn send_audio(&self, frame: Vec<u8>) -> Result<(), DriverError> {
        submit(self.audio_tx.as_ref(), frame, self.config.command_timeout())
    }

    // ==================== 状态 ====================

    /// 最新状态快照（无锁）
    pub fn status(&self) -> Arc<RobotStatus> {
        self.ctx.status.load_full()
    }

    /// 是否收到过有效状态（连续丢包后会复位）
    pub fn has_status(&self) -> bool {
        self.ctx.has_status()
    }

    /// 待叠加的本地标志 `(set, clear)`
    pub fn pending(&self) -> (StatusFlags, StatusFlags) {
        self.ctx.pending.snapshot()
    }

    /// 立即修改本地状态标志，并在下一个状态包上强制叠加
    pub fn set_local_flags(&self, set: StatusFlags, clear: StatusFlags) {
        self.ctx.set_local_flags(set, clear);
    }

    /// 心跳位：每收到一个状态包翻转一次
    pub fn heartbeat(&self) -> bool {
        self.ctx.heartbeat()
    }

    /// 等待 `count` 个新状态包
    pub fn wait_for_status_updates(&self, count: u64, timeout: Duration) -> Result<(), DriverError> {
        let target = self.ctx.status_seq() + count;
        self.poll_until(timeout, || self.ctx.status_seq() >= target)
    }

    /// 等待第一个有效状态
    pub fn wait_for_status(&self, timeout: Duration) -> Result<(), DriverError> {
        self.poll_until(timeout, || self.ctx.has_status())
    }

    fn poll_until(&self, timeout: Duration, done: impl Fn() -> bool) -> Result<(), DriverError> {
        let start = Instant::now();
        loop {
            if done() {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(DriverError::Timeout);
            }
            if !self.is_running.load(Ordering::Acquire) {
                return Err(DriverError::ChannelClosed);
            }
            spin_sleep::sleep(Duration::from_millis(5));
        }
    }

    // ==================== 回调 ====================

    pub fn add_callback(&self, kind: CallbackKind, callback: Arc<dyn EventCallback>) {
        self.ctx.add_callback(kind, callback);
    }

    /// 用闭包注册回调
    pub fn on<F>(&self, kind: CallbackKind, f: F)
    where
        F: Fn(&RobotEvent) + Send + Sync + 'static,
    {
        self.ctx.add_callback(kind, Arc::new(FnCallback::new(f)));
    }

    // ==================== 图像 ====================

    /// 请求开启图像流（由图像线程发送 `[1]`）
    pub fn start_stream(&self) -> Result<(), DriverError> {
        self.stream_control(StreamControl::Start)
    }

    /// 请求关闭图像流（由图像线程发送 `[0]`）
    pub fn stop_stream(&self) -> Result<(), DriverError> {
        self.stream_control(StreamControl::Stop)
    }

    fn stream_control(&self, control: StreamControl) -> Result<(), DriverError> {
        let tx = self.stream_tx.as_ref().ok_or(DriverError::ChannelClosed)?;
        tx.send_timeout(control, self.config.command_timeout())
            .map_err(|e| match e {
                SendTimeoutError::Timeout(_) => DriverError::ChannelFull,
                SendTimeoutError::Disconnected(_) => DriverError::ChannelClosed,
            })
    }

    pub fn is_streaming(&self) -> bool {
        self.ctx.image.is_streaming()
    }

    /// 最新的图像帧（JPEG），缺失时返回 None
    pub fn latest_image(&self) -> Option<Arc<Vec<u8>>> {
        self.ctx.image.latest()
    }

    /// 等待图像帧
    pub fn wait_for_image(&self, timeout: Duration) -> Option<Arc<Vec<u8>>> {
        self.ctx.image.wait_for_image(timeout)
    }

    // ==================== 连接与生命周期 ====================

    /// 指令通道是否已连接
    pub fn is_connected(&self) -> bool {
        self.ctx.connection_monitor.is_up(Channel::Command)
    }

    /// 某个通道在 `timeout` 内是否有过成功收发
    pub fn is_channel_alive(&self, channel: Channel, timeout: Duration) -> bool {
        self.ctx.connection_monitor.is_connected(channel, timeout)
    }

    /// 距离某个通道上次成功收发的时间
    pub fn time_since_last_update(&self, channel: Channel) -> Option<Duration> {
        self.ctx.connection_monitor.time_since_last_update(channel)
    }

    /// 电源键按下或机器人程序结束
    pub fn shutdown_requested(&self) -> bool {
        self.ctx.shutdown_requested()
    }

    /// 检查 IO 线程是否存活
    pub fn is_healthy(&self) -> bool {
        [
            &self.status_thread,
            &self.image_thread,
            &self.command_thread,
            &self.audio_thread,
        ]
        .into_iter()
        .all(|handle| handle.as_ref().is_some_and(|h| !h.is_finished()))
    }

    /// 获取计数器快照
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 共享上下文（高级用法）
    pub fn context(&self) -> &Arc<AimContext> {
        &self.ctx
    }
}

impl Drop for AimDriver {
    fn drop(&mut self) {
        // Release: 线程看到 false 时也能看到之前的所有写入
        self.is_running.store(false, Ordering::Release);

        // 关闭请求通道，阻塞在 recv 上的线程立即退出
        self.command_tx.take();
        self.audio_tx.take();
        self.stream_tx.take();

        let threads = [
            ("status", self.status_thread.take()),
            ("image", self.image_thread.take()),
            ("command", self.command_thread.take()),
            ("audio", self.audio_thread.take()),
        ];
        for (name, handle) in threads {
            if let Some(handle) = handle
                && let Err(_e) = handle.join_timeout(JOIN_TIMEOUT)
            {
                error!("{} thread failed to join within {:?}", name, JOIN_TIMEOUT);
            }
        }
        info!("AIM driver for {} stopped", self.host);
    }
}

fn spawn_io<F>(channel: Channel, f: F) -> Result<JoinHandle<()>, DriverError>
where
    F: FnOnce() + Send + 'static,
{
    std::thread::Builder::new()
        .name(format!("aim-{}", channel.name()))
        .spawn(f)
        .map_err(|e| DriverError::IoThread(format!("failed to spawn {} thread: {}", channel, e)))
}

/// 提交请求并等待应答
fn submit<T, R>(
    tx: Option<&Sender<ChannelRequest<T, R>>>,
    payload: T,
    timeout: Duration,
) -> Result<R, DriverError> {
    let tx = tx.ok_or(DriverError::ChannelClosed)?;
    let (reply_tx, reply_rx) = bounded(1);

    tx.send_timeout(
        ChannelRequest {
            payload,
            reply: reply_tx,
        },
        timeout,
    )
    .map_err(|e| match e {
        SendTimeoutError::Timeout(_) => DriverError::ChannelFull,
        SendTimeoutError::Disconnected(_) => DriverError::ChannelClosed,
    })?;

    match reply_rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(DriverError::Timeout),
        Err(RecvTimeoutError::Disconnected) => Err(DriverError::ChannelClosed),
    }
}
