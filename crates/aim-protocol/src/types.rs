//! 协议类型：颜色、音效、字体、表情、灯光等
//!
//! 带字符串编码的枚举（音效、字体）在指令中以小写形式出现，
//! 带整数编码的枚举（表情、朝向、灵敏度）通过 `num_enum` 与 `u8` 互转。

use crate::ProtocolError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// 颜色
// ============================================================================

/// 24 位 RGB 颜色（可带透明标记）
///
/// # 示例
///
/// ```
/// use aim_protocol::Color;
///
/// let c: Color = "#00F".parse().unwrap();
/// assert_eq!(c.value(), 0x0000FF);
/// assert_eq!(Color::from_rgb(0, 0x18, 0x71), Color::BLUE);
/// assert_eq!(Color::BLUE.to_string(), "0x001871");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    value: u32,
    transparent: bool,
}

impl Color {
    pub const BLACK: Color = Color::from_u32(0x000000);
    pub const WHITE: Color = Color::from_u32(0xFFFFFF);
    pub const RED: Color = Color::from_u32(0xFF0000);
    pub const GREEN: Color = Color::from_u32(0x00FF00);
    pub const BLUE: Color = Color::from_u32(0x001871);
    pub const YELLOW: Color = Color::from_u32(0xFFFF00);
    pub const ORANGE: Color = Color::from_u32(0xFF8500);
    pub const PURPLE: Color = Color::from_u32(0xFF00FF);
    pub const CYAN: Color = Color::from_u32(0x00FFFF);
    pub const TRANSPARENT: Color = Color {
        value: 0x000000,
        transparent: true,
    };

    /// 从整数值构造（不做掩码）
    pub const fn from_u32(value: u32) -> Self {
        Self {
            value,
            transparent: false,
        }
    }

    /// 从三个通道构造
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_u32(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// 宽松解析网页颜色（`#RGB` 或 `#RRGGBB`），格式不对时返回黑色
    pub fn from_web(s: &str) -> Self {
        s.parse().unwrap_or(Self::BLACK)
    }

    pub const fn value(&self) -> u32 {
        self.value
    }

    pub const fn r(&self) -> u8 {
        ((self.value >> 16) & 0xFF) as u8
    }

    pub const fn g(&self) -> u8 {
        ((self.value >> 8) & 0xFF) as u8
    }

    pub const fn b(&self) -> u8 {
        (self.value & 0xFF) as u8
    }

    pub const fn rgb(&self) -> (u8, u8, u8) {
        (self.r(), self.g(), self.b())
    }

    pub const fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// 设置透明标记
    pub const fn with_transparency(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    /// 修改为新的 RGB 值
    pub fn set_rgb(&mut self, r: u8, g: u8, b: u8) {
        self.value = Self::from_rgb(r, g, b).value;
    }

    /// 修改为新的整数值
    pub fn set_value(&mut self, value: u32) {
        self.value = value;
    }
}

impl FromStr for Color {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProtocolError::InvalidColor(s.to_string());
        let digits = s.strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        match digits.len() {
            3 => {
                let mut value = 0u32;
                for c in digits.chars() {
                    // 每个半字节重复一次：#1AF -> #11AAFF
                    let nibble = c.to_digit(16).ok_or_else(invalid)?;
                    value = (value << 8) | (nibble << 4) | nibble;
                }
                Ok(Self::from_u32(value))
            },
            6 => u32::from_str_radix(digits, 16)
                .map(Self::from_u32)
                .map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#08x}", self.value)
    }
}

impl From<u32> for Color {
    fn from(value: u32) -> Self {
        Self::from_u32(value)
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::from_rgb(r, g, b)
    }
}

// ============================================================================
// 字符串编码的枚举
// ============================================================================

/// 为字符串编码枚举生成 `ALL`、`as_str`、`Display` 与 `FromStr`（大小写不敏感）
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:tt),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant,)+
        }

        impl $name {
            /// 全部取值
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// 协议中的编码（小写）
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ProtocolError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lower = s.trim().to_ascii_lowercase();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == lower)
                    .ok_or_else(|| ProtocolError::InvalidValue {
                        field: stringify!($name).to_string(),
                        reason: format!("unknown value {:?}", s),
                    })
            }
        }
    };
}

string_enum! {
    /// 内置音效
    SoundType {
        Doorbell => "doorbell",
        Tada => "tada",
        Fail => "fail",
        Sparkle => "sparkle",
        Flourish => "flourish",
        Forward => "forward",
        Reverse => "reverse",
        Right => "right",
        Left => "left",
        Blinker => "blinker",
        Crash => "crash",
        Brakes => "brakes",
        Huah => "huah",
        Pickup => "pickup",
        Cheer => "cheer",
        Sensing => "sensing",
        Detected => "detected",
        Obstacle => "obstacle",
        Looping => "looping",
        Complete => "complete",
        Pause => "pause",
        Resume => "resume",
        Send => "send",
        Receive => "receive",
        ActHappy => "act_happy",
        ActSad => "act_sad",
        ActExcited => "act_excited",
        ActAngry => "act_angry",
        ActSilly => "act_silly",
    }
}

string_enum! {
    /// 屏幕字体
    FontType {
        Mono12 => "mono12",
        Mono15 => "mono15",
        Mono20 => "mono20",
        Mono24 => "mono24",
        Mono30 => "mono30",
        Mono36 => "mono36",
        Mono40 => "mono40",
        Mono60 => "mono60",
        Prop20 => "prop20",
        Prop24 => "prop24",
        Prop30 => "prop30",
        Prop36 => "prop36",
        Prop40 => "prop40",
        Prop60 => "prop60",
    }
}

string_enum! {
    /// LED 灯位（LED1 位于 315° 方向）
    LightType {
        Led1 => "light1",
        Led2 => "light2",
        Led3 => "light3",
        Led4 => "light4",
        Led5 => "light5",
        Led6 => "light6",
        All => "all",
    }
}

impl LightType {
    /// 按 0 起始的下标选择灯位，超出 0..=5 时为全部
    pub fn from_index(index: i64) -> Self {
        match index {
            0 => Self::Led1,
            1 => Self::Led2,
            2 => Self::Led3,
            3 => Self::Led4,
            4 => Self::Led5,
            5 => Self::Led6,
            _ => Self::All,
        }
    }
}

/// 踢球力度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KickType {
    Soft,
    Medium,
    Hard,
}

impl KickType {
    /// 对应的指令名
    pub const fn cmd_id(&self) -> &'static str {
        match self {
            KickType::Soft => "kick_soft",
            KickType::Medium => "kick_medium",
            KickType::Hard => "kick_hard",
        }
    }
}

impl FromStr for KickType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "soft" => Ok(KickType::Soft),
            "medium" => Ok(KickType::Medium),
            "hard" => Ok(KickType::Hard),
            _ => Err(ProtocolError::InvalidValue {
                field: "KickType".to_string(),
                reason: format!("unknown value {:?}", s),
            }),
        }
    }
}

// ============================================================================
// 整数编码的枚举
// ============================================================================

/// 表情
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, num_enum::TryFromPrimitive, num_enum::IntoPrimitive,
)]
#[repr(u8)]
pub enum EmojiType {
    Excited = 0,
    Confident = 1,
    Silly = 2,
    Amazed = 3,
    Strong = 4,
    Thrilled = 5,
    Happy = 6,
    Proud = 7,
    Laughing = 8,
    Optimistic = 9,
    Determined = 10,
    Affectionate = 11,
    Calm = 12,
    Quiet = 13,
    Shy = 14,
    Cheerful = 15,
    Loved = 16,
    Surprised = 17,
    Thinking = 18,
    Tired = 19,
    Confused = 20,
    Bored = 21,
    Embarrassed = 22,
    Worried = 23,
    Sad = 24,
    Sick = 25,
    Disappointed = 26,
    Nervous = 27,
    Annoyed = 28,
    Stressed = 29,
    Angry = 30,
    Frustrated = 31,
    Jealous = 32,
    Shocked = 33,
    Fear = 34,
    Disgust = 35,
}

impl EmojiType {
    const NAMES: [&'static str; 36] = [
        "excited",
        "confident",
        "silly",
        "amazed",
        "strong",
        "thrilled",
        "happy",
        "proud",
        "laughing",
        "optimistic",
        "determined",
        "affectionate",
        "calm",
        "quiet",
        "shy",
        "cheerful",
        "loved",
        "surprised",
        "thinking",
        "tired",
        "confused",
        "bored",
        "embarrassed",
        "worried",
        "sad",
        "sick",
        "disappointed",
        "nervous",
        "annoyed",
        "stressed",
        "angry",
        "frustrated",
        "jealous",
        "shocked",
        "fear",
        "disgust",
    ];

    pub fn name(&self) -> &'static str {
        Self::NAMES[u8::from(*self) as usize]
    }
}

impl FromStr for EmojiType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::NAMES
            .iter()
            .position(|n| *n == lower)
            .and_then(|i| EmojiType::try_from(i as u8).ok())
            .ok_or_else(|| ProtocolError::InvalidValue {
                field: "EmojiType".to_string(),
                reason: format!("unknown value {:?}", s),
            })
    }
}

/// 表情视线方向
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    num_enum::TryFromPrimitive,
    num_enum::IntoPrimitive,
)]
#[repr(u8)]
pub enum EmojiLookType {
    #[default]
    Forward = 0,
    Left = 1,
    Right = 2,
}

/// 指令叠加方式
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    num_enum::TryFromPrimitive,
    num_enum::IntoPrimitive,
)]
#[repr(u8)]
pub enum StackingType {
    #[default]
    Off = 0,
    MoveRelative = 1,
    MoveGlobal = 2,
}

/// 碰撞检测灵敏度
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    num_enum::TryFromPrimitive,
    num_enum::IntoPrimitive,
)]
#[repr(u8)]
pub enum SensitivityType {
    #[default]
    Low = 0,
    Medium = 1,
    High = 2,
}

// ============================================================================
// 音符
// ============================================================================

/// 解析音符字符串（如 `"C5"`、`"F#6"`、`"Bb7"`）
///
/// 返回 `(note, octave)`：
/// - `note`: 0-11，C=0, D=2, E=4, F=5, G=7, A=9, B=11；`#` 升半音（B 除外），`b` 降半音（C 除外）
/// - `octave`: 0-3，对应字符 `5`-`8`
pub fn parse_note(note: &str) -> Result<(u8, u8), ProtocolError> {
    let invalid = || ProtocolError::InvalidNote(note.to_string());
    let chars: Vec<char> = note.chars().collect();

    let mut value = match chars.first().map(|c| c.to_ascii_lowercase()) {
        Some('c') => 0u8,
        Some('d') => 2,
        Some('e') => 4,
        Some('f') => 5,
        Some('g') => 7,
        Some('a') => 9,
        Some('b') => 11,
        _ => return Err(invalid()),
    };

    let octave_char = match chars.len() {
        2 => chars[1],
        3 => {
            match chars[1] {
                '#' if value < 11 => value += 1,
                'b' if value > 0 => value -= 1,
                '#' | 'b' => {},
                _ => return Err(invalid()),
            }
            chars[2]
        },
        _ => return Err(invalid()),
    };

    if !('5'..='8').contains(&octave_char) {
        return Err(invalid());
    }
    let octave = octave_char as u8 - b'5';
    Ok((value, octave))
}
