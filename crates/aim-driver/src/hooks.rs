//! 钩子系统（Hook System）
//!
//! 状态线程在检测到事件（屏幕按下/松开、碰撞、新状态包、关机请求）时
//! 触发已注册的回调。
//!
//! # 执行模型
//!
//! - 回调在状态线程上**同步**执行，按注册顺序调用
//! - 回调应尽快返回：阻塞回调会推迟下一次状态轮询
//! - 触发前先在读锁下快照回调列表，回调内部可以安全地注册新回调
//!
//! # 使用示例
//!
//! ```rust
//! use aim_driver::hooks::{CallbackKind, FnCallback, HookManager, RobotEvent};
//! use std::sync::Arc;
//!
//! let mut hooks = HookManager::new();
//! hooks.add_callback(
//!     CallbackKind::ScreenPressed,
//!     Arc::new(FnCallback::new(|event: &RobotEvent| println!("{:?}", event))),
//! );
//! hooks.trigger(&RobotEvent::ScreenPressed { x: 10, y: 20 });
//! ```

use std::sync::Arc;

/// 状态线程产生的事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotEvent {
    /// 屏幕由松开变为按下
    ScreenPressed { x: i32, y: i32 },
    /// 屏幕由按下变为松开
    ScreenReleased { x: i32, y: i32 },
    /// 状态包中 `HAS_CRASHED` 置位（每个置位的包都会触发）
    Crashed,
    /// 收到并存储了一个新状态包
    Status,
    /// 电源键按下或程序结束，请求应用退出
    ShutdownRequested,
}

impl RobotEvent {
    /// 事件对应的回调类型
    pub fn kind(&self) -> CallbackKind {
        match self {
            RobotEvent::ScreenPressed { .. } => CallbackKind::ScreenPressed,
            RobotEvent::ScreenReleased { .. } => CallbackKind::ScreenReleased,
            RobotEvent::Crashed => CallbackKind::Crashed,
            RobotEvent::Status => CallbackKind::Status,
            RobotEvent::ShutdownRequested => CallbackKind::ShutdownRequested,
        }
    }
}

/// 回调类型：决定回调接收哪一类事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackKind {
    ScreenPressed,
    ScreenReleased,
    Crashed,
    Status,
    ShutdownRequested,
}

/// 事件回调 Trait
///
/// # 示例
///
/// ```rust
/// use aim_driver::hooks::{EventCallback, RobotEvent};
/// use crossbeam_channel::{Sender, bounded};
///
/// struct Forward {
///     sender: Sender<RobotEvent>,
/// }
///
/// impl EventCallback for Forward {
///     fn on_event(&self, event: &RobotEvent) {
///         let _ = self.sender.try_send(*event);
///     }
/// }
/// ```
pub trait EventCallback: Send + Sync {
    /// 事件发生时调用（在状态线程上）
    fn on_event(&self, event: &RobotEvent);
}

/// 闭包适配器
pub struct FnCallback<F> {
    f: F,
}

impl<F> FnCallback<F>
where
    F: Fn(&RobotEvent) + Send + Sync,
{
    pub const fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventCallback for FnCallback<F>
where
    F: Fn(&RobotEvent) + Send + Sync,
{
    fn on_event(&self, event: &RobotEvent) {
        (self.f)(event)
    }
}

/// 钩子管理器
///
/// 通常放在 `RwLock<HookManager>` 中：注册时取写锁，触发时取读锁。
#[derive(Default)]
pub struct HookManager {
    callbacks: Vec<(CallbackKind, Arc<dyn EventCallback>)>,
}

impl HookManager {
    /// 创建新的钩子管理器
    #[must_use]
    pub const fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// 注册回调
    ///
    /// # 参数
    ///
    /// - `kind`: 回调接收的事件类型
    /// - `callback`: 回调对象
    pub fn add_callback(&mut self, kind: CallbackKind, callback: Arc<dyn EventCallback>) {
        self.callbacks.push((kind, callback));
    }

    /// 按注册顺序取出匹配某类事件的回调
    pub fn callbacks_for(&self, kind: CallbackKind) -> Vec<Arc<dyn EventCallback>> {
        self.callbacks
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, cb)| Arc::clone(cb))
            .collect()
    }

    /// 触发匹配事件类型的所有回调
    pub fn trigger(&self, event: &RobotEvent) {
        let kind = event.kind();
        for (k, callback) in &self.callbacks {
            if *k == kind {
                callback.on_event(event);
            }
        }
    }

    /// 清空所有回调
    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    /// 已注册回调数量
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<(u8, RobotEvent)>>>, impl Fn(u8) -> Arc<dyn EventCallback>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = Arc::clone(&log);
        let make = move |tag: u8| {
            let log = Arc::clone(&log_clone);
            Arc::new(FnCallback::new(move |event: &RobotEvent| {
                log.lock().push((tag, *event));
            })) as Arc<dyn EventCallback>
        };
        (log, make)
    }

    #[test]
    fn test_hook_manager_empty() {
        let hooks = HookManager::new();
        assert!(hooks.is_empty());
        assert_eq!(hooks.len(), 0);
        // 没有回调时触发不做任何事
        hooks.trigger(&RobotEvent::Crashed);
    }

    #[test]
    fn test_trigger_filters_by_kind_in_order() {
        let (log, make) = recorder();
        let mut hooks = HookManager::new();
        hooks.add_callback(CallbackKind::ScreenPressed, make(1));
        hooks.add_callback(CallbackKind::Crashed, make(2));
        hooks.add_callback(CallbackKind::ScreenPressed, make(3));
        assert_eq!(hooks.len(), 3);

        hooks.trigger(&RobotEvent::ScreenPressed { x: 5, y: 6 });
        hooks.trigger(&RobotEvent::ScreenReleased { x: 5, y: 6 });

        let log = log.lock();
        assert_eq!(
            *log,
            vec![
                (1, RobotEvent::ScreenPressed { x: 5, y: 6 }),
                (3, RobotEvent::ScreenPressed { x: 5, y: 6 }),
            ]
        );
    }

    #[test]
    fn test_callbacks_for_and_clear() {
        let (_log, make) = recorder();
        let mut hooks = HookManager::new();
        hooks.add_callback(CallbackKind::Status, make(1));
        hooks.add_callback(CallbackKind::ShutdownRequested, make(2));

        assert_eq!(hooks.callbacks_for(CallbackKind::Status).len(), 1);
        assert!(hooks.callbacks_for(CallbackKind::Crashed).is_empty());

        hooks.clear();
        assert!(hooks.is_empty());
    }

    #[test]
    fn test_event_kind() {
        assert_eq!(
            RobotEvent::ScreenReleased { x: 0, y: 0 }.kind(),
            CallbackKind::ScreenReleased
        );
        assert_eq!(RobotEvent::ShutdownRequested.kind(), CallbackKind::ShutdownRequested);
    }
}
