//! 惯性传感器
//!
//! 航向与转角的零点只保存在本地：`set_heading(h)` 记录 `offset = raw - h`，
//! 之后读数为 `raw - offset`。机器人上报的原始值不受影响。

use crate::error::Result;
use crate::raw_commander::RawCommander;
use crate::types::AxisType;
use aim_driver::{CallbackKind, RobotEvent};
use aim_protocol::{Command, SensitivityType, StatusFlags};
use parking_lot::Mutex;
use tracing::debug;

/// 保留两位小数
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 惯性传感器（陀螺仪 + 加速度计）
pub struct Inertial {
    commander: RawCommander,
    heading_offset: Mutex<f64>,
    rotation_offset: Mutex<f64>,
}

impl Inertial {
    pub(crate) fn new(commander: RawCommander) -> Self {
        Self {
            commander,
            heading_offset: Mutex::new(0.0),
            rotation_offset: Mutex::new(0.0),
        }
    }

    // ==================== 指令 ====================

    /// 校准 IMU（校准期间 `is_calibrating()` 为 true）
    pub fn calibrate(&self) -> Result<()> {
        self.commander.send(Command::ImuCalibrate)?;
        Ok(())
    }

    /// 设置碰撞检测灵敏度
    pub fn set_crash_sensitivity(&self, sensitivity: SensitivityType) -> Result<()> {
        self.commander.send(Command::ImuSetCrashThreshold {
            sensitivity: sensitivity.into(),
        })?;
        Ok(())
    }

    // ==================== 零点 ====================

    /// 把当前航向设为 `heading`
    pub fn set_heading(&self, heading: f64) {
        let raw = self.get_heading_raw();
        *self.heading_offset.lock() = raw - heading;
        debug!("heading set to {} (raw {})", heading, raw);
    }

    /// 当前航向归零
    pub fn reset_heading(&self) {
        self.set_heading(0.0);
    }

    /// 把当前累计转角设为 `rotation`
    pub fn set_rotation(&self, rotation: f64) {
        let raw = self.get_rotation_raw();
        *self.rotation_offset.lock() = raw - rotation;
    }

    pub fn reset_rotation(&self) {
        self.set_rotation(0.0);
    }

    /// 本地航向零点（度）
    pub fn heading_offset(&self) -> f64 {
        *self.heading_offset.lock()
    }

    // ==================== 读数 ====================

    /// 航向（度），范围 [0, 360)
    pub fn get_heading(&self) -> f64 {
        let mut heading = round2((self.get_heading_raw() - self.heading_offset()) % 360.0);
        if heading < 0.0 {
            heading = round2(heading + 360.0);
        }
        // 359.995 以上会被舍入到 360
        if heading >= 360.0 {
            heading -= 360.0;
        }
        heading
    }

    /// IMU 上报的原始航向
    pub fn get_heading_raw(&self) -> f64 {
        self.commander.status().robot.heading
    }

    /// 自上次归零以来的累计转角（度）
    pub fn get_rotation(&self) -> f64 {
        round2(self.get_rotation_raw() - *self.rotation_offset.lock())
    }

    pub fn get_rotation_raw(&self) -> f64 {
        self.commander.status().robot.rotation
    }

    /// 加速度（g）
    ///
    /// `axis` 可以是 [`AxisType`] 或 [`AccelerationType`](crate::AccelerationType)。
    pub fn get_acceleration(&self, axis: impl Into<AxisType>) -> f64 {
        let acceleration = self.commander.status().robot.acceleration;
        match axis.into() {
            AxisType::X => acceleration.x,
            AxisType::Y => acceleration.y,
            AxisType::Z => acceleration.z,
        }
    }

    /// 角速度（度/秒）
    ///
    /// `axis` 可以是 [`AxisType`] 或 [`OrientationType`](crate::OrientationType)。
    pub fn get_turn_rate(&self, axis: impl Into<AxisType>) -> f64 {
        let rate = self.commander.status().robot.gyro_rate;
        match axis.into() {
            AxisType::X => rate.x,
            AxisType::Y => rate.y,
            AxisType::Z => rate.z,
        }
    }

    /// 横滚角，-180 到 180 度
    pub fn get_roll(&self) -> f64 {
        round2(self.commander.status().robot.roll)
    }

    /// 俯仰角，-90 到 90 度
    pub fn get_pitch(&self) -> f64 {
        round2(self.commander.status().robot.pitch)
    }

    /// 偏航角，-180 到 180 度
    pub fn get_yaw(&self) -> f64 {
        round2(self.commander.status().robot.yaw)
    }

    pub fn is_calibrating(&self) -> bool {
        self.commander.flag_or_pending(StatusFlags::IMU_CAL)
    }

    // ==================== 回调 ====================

    /// 检测到碰撞时调用 `callback`（在状态线程上执行）
    pub fn crashed<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.commander
            .driver()
            .on(CallbackKind::Crashed, move |_: &RobotEvent| callback());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.23456), 1.23);
        assert_eq!(round2(-7.5), -7.5);
        assert_eq!(round2(359.996), 360.0);
    }
}
