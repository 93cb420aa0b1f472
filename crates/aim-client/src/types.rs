//! 单位与参数类型
//!
//! 速度单位换算在这里完成，机器人指令统一使用毫米/秒与度/秒。

use aim_protocol::{Color, DRIVE_VELOCITY_MAX_MMPS, LightType, TURN_VELOCITY_MAX_DPS};
use std::time::Duration;

// ==================== 速度单位 ====================

/// 平移速度单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DriveVelocityUnits {
    /// 百分比，100% = 200 毫米/秒
    #[default]
    Percent,
    /// 毫米/秒
    Mmps,
}

impl DriveVelocityUnits {
    /// 换算为毫米/秒（只限制上限，负值原样保留）
    pub fn to_mmps(self, velocity: f64) -> i32 {
        match self {
            DriveVelocityUnits::Percent => (velocity.min(100.0) * 2.0) as i32,
            DriveVelocityUnits::Mmps => velocity.min(DRIVE_VELOCITY_MAX_MMPS) as i32,
        }
    }
}

/// 旋转速度单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TurnVelocityUnits {
    /// 百分比，100% = 180 度/秒
    #[default]
    Percent,
    /// 度/秒
    Dps,
}

impl TurnVelocityUnits {
    /// 换算为度/秒（只限制上限，负值原样保留）
    pub fn to_dps(self, velocity: f64) -> i32 {
        match self {
            TurnVelocityUnits::Percent => (velocity.min(100.0) * 1.8) as i32,
            TurnVelocityUnits::Dps => velocity.min(TURN_VELOCITY_MAX_DPS) as i32,
        }
    }
}

/// 旋转方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnType {
    /// 逆时针
    Left,
    /// 顺时针
    Right,
}

// ==================== 时间单位 ====================

/// 时间单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeUnits {
    #[default]
    Msec,
    Seconds,
}

impl TimeUnits {
    /// 换算为 `Duration`（负值视为 0）
    pub fn to_duration(self, value: f64) -> Duration {
        let secs = match self {
            TimeUnits::Msec => value / 1000.0,
            TimeUnits::Seconds => value,
        };
        Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
    }
}

// ==================== 惯性传感器轴 ====================

/// 坐标轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisType {
    X,
    Y,
    Z,
}

/// 加速度方向（等价于 X/Y/Z 轴）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccelerationType {
    Forward,
    Rightward,
    Downward,
}

impl From<AccelerationType> for AxisType {
    fn from(value: AccelerationType) -> Self {
        match value {
            AccelerationType::Forward => AxisType::X,
            AccelerationType::Rightward => AxisType::Y,
            AccelerationType::Downward => AxisType::Z,
        }
    }
}

/// 姿态角（等价于 X/Y/Z 轴的角速度）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrientationType {
    Roll,
    Pitch,
    Yaw,
}

impl From<OrientationType> for AxisType {
    fn from(value: OrientationType) -> Self {
        match value {
            OrientationType::Roll => AxisType::X,
            OrientationType::Pitch => AxisType::Y,
            OrientationType::Yaw => AxisType::Z,
        }
    }
}

// ==================== LED ====================

/// LED 目标：0 起始的下标或灯位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedTarget {
    /// 0..=5 选择单个灯，其他值为全部
    Index(i64),
    Light(LightType),
}

impl LedTarget {
    pub fn light(self) -> LightType {
        match self {
            LedTarget::Index(index) => LightType::from_index(index),
            LedTarget::Light(light) => light,
        }
    }
}

impl From<LightType> for LedTarget {
    fn from(value: LightType) -> Self {
        LedTarget::Light(value)
    }
}

impl From<i64> for LedTarget {
    fn from(value: i64) -> Self {
        LedTarget::Index(value)
    }
}

impl From<i32> for LedTarget {
    fn from(value: i32) -> Self {
        LedTarget::Index(value as i64)
    }
}

impl From<usize> for LedTarget {
    fn from(value: usize) -> Self {
        LedTarget::Index(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

/// LED 颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedColor {
    Color(Color),
    /// `true` 为灰白色（128, 128, 128），`false` 为熄灭
    On(bool),
    Off,
    Rgb(u8, u8, u8),
}

impl LedColor {
    /// LED 亮度为 128 的灰白色
    pub const GRAY_LEVEL: u8 = 128;

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            LedColor::Color(color) => color.rgb(),
            LedColor::On(true) => (Self::GRAY_LEVEL, Self::GRAY_LEVEL, Self::GRAY_LEVEL),
            LedColor::On(false) | LedColor::Off => (0, 0, 0),
            LedColor::Rgb(r, g, b) => (r, g, b),
        }
    }
}

impl From<Color> for LedColor {
    fn from(value: Color) -> Self {
        LedColor::Color(value)
    }
}

impl From<bool> for LedColor {
    fn from(value: bool) -> Self {
        LedColor::On(value)
    }
}

impl From<Option<Color>> for LedColor {
    fn from(value: Option<Color>) -> Self {
        value.map_or(LedColor::Off, LedColor::Color)
    }
}

impl From<(u8, u8, u8)> for LedColor {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        LedColor::Rgb(r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_drive_velocity_conversion() {
        assert_eq!(DriveVelocityUnits::Percent.to_mmps(50.0), 100);
        assert_eq!(DriveVelocityUnits::Percent.to_mmps(150.0), 200);
        assert_eq!(DriveVelocityUnits::Percent.to_mmps(-50.0), -100);
        assert_eq!(DriveVelocityUnits::Mmps.to_mmps(250.0), 200);
        assert_eq!(DriveVelocityUnits::Mmps.to_mmps(99.9), 99);
    }

    #[test]
    fn test_turn_velocity_conversion() {
        assert_eq!(TurnVelocityUnits::Percent.to_dps(50.0), 90);
        assert_eq!(TurnVelocityUnits::Percent.to_dps(200.0), 180);
        assert_eq!(TurnVelocityUnits::Dps.to_dps(300.0), 180);
        assert_eq!(TurnVelocityUnits::Dps.to_dps(-30.0), -30);
    }

    #[test]
    fn test_time_units() {
        assert_eq!(TimeUnits::Msec.to_duration(250.0), Duration::from_millis(250));
        assert_eq!(TimeUnits::Seconds.to_duration(1.5), Duration::from_millis(1500));
        assert_eq!(TimeUnits::Msec.to_duration(-5.0), Duration::ZERO);
        assert_eq!(TimeUnits::Seconds.to_duration(f64::INFINITY), Duration::MAX);
        assert_eq!(TimeUnits::Msec.to_duration(1e300), Duration::MAX);
    }

    #[test]
    fn test_axis_aliases() {
        assert_eq!(AxisType::from(AccelerationType::Downward), AxisType::Z);
        assert_eq!(AxisType::from(OrientationType::Pitch), AxisType::Y);
    }

    #[test]
    fn test_led_target() {
        assert_eq!(LedTarget::Index(0).light(), LightType::Led1);
        assert_eq!(LedTarget::Index(5).light(), LightType::Led6);
        assert_eq!(LedTarget::Index(6).light(), LightType::All);
        assert_eq!(LedTarget::Index(-1).light(), LightType::All);
        assert_eq!(LedTarget::from(LightType::Led3).light(), LightType::Led3);
    }

    #[test]
    fn test_led_color() {
        assert_eq!(LedColor::from(Color::RED).rgb(), (255, 0, 0));
        assert_eq!(LedColor::from(true).rgb(), (128, 128, 128));
        assert_eq!(LedColor::from(false).rgb(), (0, 0, 0));
        assert_eq!(LedColor::from(None::<Color>).rgb(), (0, 0, 0));
        assert_eq!(LedColor::from((1, 2, 3)).rgb(), (1, 2, 3));
    }

    proptest! {
        #[test]
        fn prop_drive_velocity_never_exceeds_max(v in 0.0f64..10_000.0) {
            prop_assert!(DriveVelocityUnits::Percent.to_mmps(v) <= 200);
            prop_assert!(DriveVelocityUnits::Mmps.to_mmps(v) <= 200);
        }

        #[test]
        fn prop_turn_velocity_never_exceeds_max(v in 0.0f64..10_000.0) {
            prop_assert!(TurnVelocityUnits::Percent.to_dps(v) <= 180);
            prop_assert!(TurnVelocityUnits::Dps.to_dps(v) <= 180);
        }
    }
}
