//! 状态标志位
//!
//! `robot.flags` 以十六进制字符串（如 `"0x00000422"`）上报，
//! 这里解析为 32 位标志集合。

use crate::ProtocolError;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

/// 机器人状态标志集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StatusFlags(u32);

impl StatusFlags {
    /// 正在播放声音
    pub const SOUND_PLAYING: Self = Self(1 << 0);
    /// move_at / move_for 等平移指令活动中
    pub const IS_MOVE_ACTIVE: Self = Self(1 << 1);
    /// IMU 校准中
    pub const IMU_CAL: Self = Self(1 << 3);
    /// turn / turn_to / turn_for 等旋转指令活动中
    pub const IS_TURN_ACTIVE: Self = Self(1 << 4);
    /// 任意轮子在转动
    pub const IS_MOVING: Self = Self(1 << 5);
    /// 检测到碰撞
    pub const HAS_CRASHED: Self = Self(1 << 6);
    /// 检测到摇晃
    pub const IS_SHAKE: Self = Self(1 << 8);
    /// 电源键被按下
    pub const PWR_BUTTON: Self = Self(1 << 9);
    /// 机器人端程序处于活动状态
    pub const PROG_ACTIVE: Self = Self(1 << 10);
    /// 正在下载声音
    pub const IS_SOUND_DNL: Self = Self(1 << 16);

    /// 空集合
    pub const fn empty() -> Self {
        Self(0)
    }

    /// 从原始位构造
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// 原始位
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// 是否包含 `other` 的全部位
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// 是否与 `other` 有交集
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// 解析十六进制字符串（可带 `0x` 前缀）
    pub fn parse_hex(s: &str) -> Result<Self, ProtocolError> {
        parse_hex_u32(s)
            .map(Self)
            .ok_or_else(|| ProtocolError::InvalidFlags(s.to_string()))
    }
}

/// 解析十六进制字符串为 u32，容忍 `0x`/`0X` 前缀和首尾空白
pub(crate) fn parse_hex_u32(s: &str) -> Option<u32> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

impl BitOr for StatusFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for StatusFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for StatusFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for StatusFlags {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl fmt::Display for StatusFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl Serialize for StatusFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for StatusFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FlagsVisitor;

        impl Visitor<'_> for FlagsVisitor {
            type Value = StatusFlags;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a hex string or an integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<StatusFlags, E> {
                StatusFlags::parse_hex(v).map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<StatusFlags, E> {
                Ok(StatusFlags(v as u32))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<StatusFlags, E> {
                Ok(StatusFlags(v as u32))
            }
        }

        deserializer.deserialize_any(FlagsVisitor)
    }
}
