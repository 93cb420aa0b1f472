//! 共享状态
//!
//! IO 线程与用户线程之间共享的全部状态都在 [`AimContext`] 中：
//!
//! - 状态文档：`ArcSwap`，读取无锁
//! - 本地标志覆盖：两个原子掩码
//! - 图像：双缓冲 + `Condvar`
//! - 回调：`RwLock<HookManager>`

use crate::heartbeat::ConnectionMonitor;
use crate::hooks::{CallbackKind, EventCallback, HookManager, RobotEvent};
use aim_protocol::{RobotStatus, StatusFlags};
use arc_swap::ArcSwap;
use parking_lot::{Condvar, Mutex, RwLock};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::info;

// ============================================================
// 本地标志覆盖
// ============================================================

/// 等待叠加到下一个状态包上的标志覆盖
///
/// 指令被机器人接受后，对应的“运动中”等标志要等若干个状态包才会出现在
/// 机器人上报的 flags 里。为了让紧随其后的查询看到正确结果，驱动先在本地
/// 置位，并在下一个状态包上强制叠加：`(flags | set) & !clear`。
#[derive(Debug, Default)]
pub struct PendingFlags {
    set: AtomicU32,
    clear: AtomicU32,
}

impl PendingFlags {
    pub const fn new() -> Self {
        Self {
            set: AtomicU32::new(0),
            clear: AtomicU32::new(0),
        }
    }

    /// 请求在下一个状态包上置位
    pub fn request_set(&self, flags: StatusFlags) {
        self.set.fetch_or(flags.bits(), Ordering::AcqRel);
    }

    /// 请求在下一个状态包上清除
    pub fn request_clear(&self, flags: StatusFlags) {
        self.clear.fetch_or(flags.bits(), Ordering::AcqRel);
    }

    /// 撤销尚未生效的清除请求
    pub fn cancel_clear(&self, flags: StatusFlags) {
        self.clear.fetch_and(!flags.bits(), Ordering::AcqRel);
    }

    /// 撤销尚未生效的置位请求
    pub fn cancel_set(&self, flags: StatusFlags) {
        self.set.fetch_and(!flags.bits(), Ordering::AcqRel);
    }

    /// 取出并清空两个掩码：`(set, clear)`
    pub fn take(&self) -> (StatusFlags, StatusFlags) {
        let set = self.set.swap(0, Ordering::AcqRel);
        let clear = self.clear.swap(0, Ordering::AcqRel);
        (StatusFlags::from_bits(set), StatusFlags::from_bits(clear))
    }

    /// 读取但不清空
    pub fn snapshot(&self) -> (StatusFlags, StatusFlags) {
        (
            StatusFlags::from_bits(self.set.load(Ordering::Acquire)),
            StatusFlags::from_bits(self.clear.load(Ordering::Acquire)),
        )
    }

    /// 按机器人接受的指令登记隐含标志
    pub fn apply_accepted(&self, implied: StatusFlags) {
        if implied.is_empty() {
            return;
        }
        self.request_set(implied);
        if implied.contains(StatusFlags::IS_MOVING) {
            self.cancel_clear(StatusFlags::IS_MOVING);
        }
    }
}

// ============================================================
// 图像双缓冲
// ============================================================

struct ImageSlots {
    frames: [Option<Arc<Vec<u8>>>; 2],
    current: usize,
    seq: u64,
}

/// 相机图像双缓冲
///
/// 图像线程写入后台槽位再交换，读者拿到的是 `Arc`，不会被后续写入覆盖。
/// 接收失败时当前帧标记为缺失（`None`）。
pub struct ImageBuffer {
    slots: Mutex<ImageSlots>,
    ready: Condvar,
    streaming: AtomicBool,
}

impl ImageBuffer {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(ImageSlots {
                frames: [None, None],
                current: 0,
                seq: 0,
            }),
            ready: Condvar::new(),
            streaming: AtomicBool::new(false),
        }
    }

    /// 写入新帧（后台槽位）并交换
    pub fn store(&self, frame: Vec<u8>) {
        self.swap_in(Some(Arc::new(frame)));
    }

    /// 当前帧标记为缺失
    pub fn mark_missing(&self) {
        self.swap_in(None);
    }

    fn swap_in(&self, frame: Option<Arc<Vec<u8>>>) {
        let mut slots = self.slots.lock();
        let back = 1 - slots.current;
        slots.frames[back] = frame;
        slots.current = back;
        slots.seq += 1;
        drop(slots);
        self.ready.notify_all();
    }

    /// 最新一帧（缺失时返回 None）
    pub fn latest(&self) -> Option<Arc<Vec<u8>>> {
        let slots = self.slots.lock();
        slots.frames[slots.current].clone()
    }

    /// 已交换的帧数（含缺失帧）
    pub fn sequence(&self) -> u64 {
        self.slots.lock().seq
    }

    /// 阻塞直到有可用帧或超时
    pub fn wait_for_image(&self, timeout: Duration) -> Option<Arc<Vec<u8>>> {
        let deadline = Instant::now() + timeout;
        let mut slots = self.slots.lock();
        loop {
            if let Some(frame) = slots.frames[slots.current].as_ref() {
                return Some(Arc::clone(frame));
            }
            if self.ready.wait_until(&mut slots, deadline).timed_out() {
                return slots.frames[slots.current].clone();
            }
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::Acquire)
    }

    pub fn set_streaming(&self, streaming: bool) {
        self.streaming.store(streaming, Ordering::Release);
    }
}

impl Default for ImageBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================
// 共享上下文
// ============================================================

/// IO 线程与用户 API 共享的上下文
pub struct AimContext {
    /// 最新状态文档（已叠加本地覆盖）
    pub status: ArcSwap<RobotStatus>,
    has_status: AtomicBool,
    /// 待叠加的本地标志
    pub pending: PendingFlags,
    heartbeat: AtomicBool,
    /// 已存储的状态包总数
    status_seq: AtomicU64,
    program_active: AtomicBool,
    shutdown_requested: AtomicBool,
    pub hooks: RwLock<HookManager>,
    pub image: ImageBuffer,
    pub connection_monitor: ConnectionMonitor,
}

impl AimContext {
    pub fn new() -> Self {
        Self {
            status: ArcSwap::from_pointee(RobotStatus::empty()),
            has_status: AtomicBool::new(false),
            pending: PendingFlags::new(),
            heartbeat: AtomicBool::new(false),
            status_seq: AtomicU64::new(0),
            program_active: AtomicBool::new(false),
            shutdown_requested: AtomicBool::new(false),
            hooks: RwLock::new(HookManager::new()),
            image: ImageBuffer::new(),
            connection_monitor: ConnectionMonitor::new(),
        }
    }

    /// 存储新状态：置位 `has_status` 并翻转心跳
    pub fn store_status(&self, status: RobotStatus) {
        self.status.store(Arc::new(status));
        self.has_status.store(true, Ordering::Release);
        self.heartbeat.fetch_xor(true, Ordering::AcqRel);
        self.status_seq.fetch_add(1, Ordering::AcqRel);
    }

    /// 连续丢包后回到空状态
    pub fn reset_status(&self) {
        self.status.store(Arc::new(RobotStatus::empty()));
        self.has_status.store(false, Ordering::Release);
    }

    pub fn has_status(&self) -> bool {
        self.has_status.load(Ordering::Acquire)
    }

    pub fn heartbeat(&self) -> bool {
        self.heartbeat.load(Ordering::Acquire)
    }

    /// 已存储的状态包序号
    pub fn status_seq(&self) -> u64 {
        self.status_seq.load(Ordering::Acquire)
    }

    /// 立即修改当前状态的标志，并登记到下一个状态包
    pub fn set_local_flags(&self, set: StatusFlags, clear: StatusFlags) {
        self.status.rcu(|current| {
            let mut next = RobotStatus::clone(current);
            next.robot.flags.insert(set);
            next.robot.flags.remove(clear);
            next
        });
        if !set.is_empty() {
            self.pending.request_set(set);
        }
        if !clear.is_empty() {
            self.pending.request_clear(clear);
        }
    }

    pub fn program_active(&self) -> bool {
        self.program_active.load(Ordering::Acquire)
    }

    /// 更新程序运行标志，返回之前的值
    pub fn swap_program_active(&self, active: bool) -> bool {
        self.program_active.swap(active, Ordering::AcqRel)
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }

    /// 请求关机；首次请求时触发 `ShutdownRequested` 回调
    pub fn request_shutdown(&self, reason: &str) {
        if !self.shutdown_requested.swap(true, Ordering::AcqRel) {
            info!("Shutdown requested: {}", reason);
            self.fire(&RobotEvent::ShutdownRequested);
        }
    }

    pub fn add_callback(&self, kind: CallbackKind, callback: Arc<dyn EventCallback>) {
        self.hooks.write().add_callback(kind, callback);
    }

    /// 触发事件
    ///
    /// 先在读锁下快照回调，释放锁后再调用。
    pub fn fire(&self, event: &RobotEvent) {
        let callbacks = self.hooks.read().callbacks_for(event.kind());
        for callback in callbacks {
            callback.on_event(event);
        }
    }
}

impl Default for AimContext {
    fn default() -> Self {
        Self::new()
    }
}
