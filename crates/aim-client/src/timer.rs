//! 计时器与线程辅助函数

use crate::types::TimeUnits;
use parking_lot::Mutex;
use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// 计时器
///
/// # 示例
///
/// ```rust
/// use aim_client::{TimeUnits, Timer};
///
/// let timer = Timer::new();
/// assert!(timer.time(TimeUnits::Msec) < 1000.0);
/// timer.reset();
/// ```
#[derive(Debug)]
pub struct Timer {
    start: Mutex<Instant>,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Mutex::new(Instant::now()),
        }
    }

    /// 经过的时间：毫秒为整数，秒保留两位小数
    pub fn time(&self, units: TimeUnits) -> f64 {
        let elapsed = self.start.lock().elapsed();
        match units {
            TimeUnits::Msec => elapsed.as_millis() as f64,
            TimeUnits::Seconds => (elapsed.as_secs_f64() * 100.0).round() / 100.0,
        }
    }

    /// 计时归零
    pub fn reset(&self) {
        *self.start.lock() = Instant::now();
    }

    /// `delay_ms` 毫秒后在新线程上调用 `callback`
    pub fn event<F>(&self, callback: F, delay_ms: u64) -> io::Result<JoinHandle<()>>
    where
        F: FnOnce() + Send + 'static,
    {
        thread::Builder::new()
            .name("aim-timer_event".into())
            .spawn(move || {
                spin_sleep::sleep(Duration::from_millis(delay_ms));
                callback();
            })
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// 在新的命名线程上运行 `f`
pub fn spawn<F, T>(f: F) -> io::Result<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    thread::Builder::new().name("aim-user".into()).spawn(f)
}

/// 阻塞当前线程
///
/// # 示例
///
/// ```rust
/// use aim_client::{TimeUnits, sleep};
///
/// sleep(10.0, TimeUnits::Msec);
/// ```
pub fn sleep(duration: f64, units: TimeUnits) {
    spin_sleep::sleep(units.to_duration(duration));
}

/// 同 [`sleep`]
pub fn wait(duration: f64, units: TimeUnits) {
    sleep(duration, units);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_timer_measures_elapsed() {
        let timer = Timer::new();
        sleep(30.0, TimeUnits::Msec);
        let ms = timer.time(TimeUnits::Msec);
        assert!(ms >= 30.0, "elapsed {}ms", ms);
        assert_eq!(ms.fract(), 0.0);

        let secs = timer.time(TimeUnits::Seconds);
        assert!(secs >= 0.03 && secs < 60.0);
    }

    #[test]
    fn test_timer_reset() {
        let timer = Timer::new();
        sleep(100.0, TimeUnits::Msec);
        timer.reset();
        assert!(timer.time(TimeUnits::Msec) < 100.0);
    }

    #[test]
    fn test_timer_event() {
        let timer = Timer::new();
        let fired = Arc::new(AtomicBool::new(false));
        let fired_clone = Arc::clone(&fired);

        let handle = timer
            .event(move || fired_clone.store(true, Ordering::SeqCst), 10)
            .unwrap();
        handle.join().unwrap();
        assert!(fired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_spawn_named_thread() {
        let name = spawn(|| thread::current().name().map(str::to_string))
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(name.as_deref(), Some("aim-user"));
    }
}
