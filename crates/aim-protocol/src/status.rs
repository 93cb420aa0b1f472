//! 状态文档
//!
//! 每次在 `ws_status` 上发送单字节 `1`，机器人返回一份 JSON 状态文档：
//!
//! ```text
//! {
//!   "robot":      { flags, battery, touch_flags, touch_x, ..., screen },
//!   "controller": { flags, stick_x, stick_y, battery },
//!   "aivision":   { classnames: {count, items}, objects: {count, items} }
//! }
//! ```
//!
//! 缺失字段取默认值；数值字段接受数字或数字字符串。

use crate::flags::StatusFlags;
use crate::{ProtocolError, num};
use serde::{Deserialize, Serialize};

/// 三轴数据（加速度 / 角速度）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Axes {
    #[serde(deserialize_with = "num::f64")]
    pub x: f64,
    #[serde(deserialize_with = "num::f64")]
    pub y: f64,
    #[serde(deserialize_with = "num::f64")]
    pub z: f64,
}

/// 屏幕光标位置（行列从 1 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenCursor {
    #[serde(deserialize_with = "num::i32")]
    pub row: i32,
    #[serde(deserialize_with = "num::i32")]
    pub column: i32,
}

impl Default for ScreenCursor {
    fn default() -> Self {
        Self { row: 1, column: 1 }
    }
}

/// `robot` 段
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotInfo {
    pub flags: StatusFlags,
    #[serde(deserialize_with = "num::f64")]
    pub battery: f64,
    /// bit 0 = 屏幕被按下
    #[serde(deserialize_with = "num::hex_u32")]
    pub touch_flags: u32,
    #[serde(deserialize_with = "num::i32")]
    pub touch_x: i32,
    #[serde(deserialize_with = "num::i32")]
    pub touch_y: i32,
    /// 里程计 x（毫米，机器人坐标系）
    #[serde(deserialize_with = "num::f64")]
    pub robot_x: f64,
    /// 里程计 y（毫米，机器人坐标系）
    #[serde(deserialize_with = "num::f64")]
    pub robot_y: f64,
    #[serde(deserialize_with = "num::f64")]
    pub roll: f64,
    #[serde(deserialize_with = "num::f64")]
    pub pitch: f64,
    #[serde(deserialize_with = "num::f64")]
    pub yaw: f64,
    #[serde(deserialize_with = "num::f64")]
    pub heading: f64,
    #[serde(deserialize_with = "num::f64")]
    pub rotation: f64,
    pub acceleration: Axes,
    pub gyro_rate: Axes,
    pub screen: ScreenCursor,
}

impl RobotInfo {
    /// 屏幕当前是否被按下
    pub fn is_screen_pressed(&self) -> bool {
        self.touch_flags & 0x0001 != 0
    }
}

/// `controller` 段（遥控手柄）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerInfo {
    #[serde(deserialize_with = "num::hex_u32")]
    pub flags: u32,
    #[serde(deserialize_with = "num::i32")]
    pub stick_x: i32,
    #[serde(deserialize_with = "num::i32")]
    pub stick_y: i32,
    #[serde(deserialize_with = "num::f64")]
    pub battery: f64,
}

/// AI 模型类别名
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassName {
    #[serde(deserialize_with = "num::u32")]
    pub index: u32,
    #[serde(deserialize_with = "num::string")]
    pub name: String,
}

/// 类别名列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassNames {
    #[serde(deserialize_with = "num::u32")]
    pub count: u32,
    pub items: Vec<ClassName>,
}

impl Default for ClassNames {
    /// 固件内置模型的四个类别
    fn default() -> Self {
        let names = ["SportsBall", "BlueBarrel", "OrangeBarrel", "Robot"];
        Self {
            count: names.len() as u32,
            items: names
                .iter()
                .enumerate()
                .map(|(index, name)| ClassName {
                    index: index as u32,
                    name: (*name).to_string(),
                })
                .collect(),
        }
    }
}

impl ClassNames {
    /// 按类别 id 查找类别名
    ///
    /// 优先匹配 `index` 字段，找不到时按位置回退。
    pub fn name_of(&self, id: u32) -> Option<&str> {
        self.items
            .iter()
            .find(|c| c.index == id)
            .or_else(|| self.items.get(id as usize))
            .map(|c| c.name.as_str())
    }
}

/// 视觉检测到的原始对象
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawObject {
    #[serde(rename = "type", deserialize_with = "num::u32")]
    pub object_type: u32,
    #[serde(deserialize_with = "num::u32")]
    pub id: u32,
    #[serde(deserialize_with = "num::string")]
    pub type_str: String,
    #[serde(deserialize_with = "num::i32")]
    pub originx: i32,
    #[serde(deserialize_with = "num::i32")]
    pub originy: i32,
    #[serde(deserialize_with = "num::i32")]
    pub width: i32,
    #[serde(deserialize_with = "num::i32")]
    pub height: i32,
    #[serde(deserialize_with = "num::f64")]
    pub score: f64,
    #[serde(deserialize_with = "num::string")]
    pub name: String,
    /// 原始角度（0.01 度）
    #[serde(deserialize_with = "num::f64")]
    pub angle: f64,
    #[serde(deserialize_with = "num::i32")]
    pub x0: i32,
    #[serde(deserialize_with = "num::i32")]
    pub x1: i32,
    #[serde(deserialize_with = "num::i32")]
    pub x2: i32,
    #[serde(deserialize_with = "num::i32")]
    pub x3: i32,
    #[serde(deserialize_with = "num::i32")]
    pub y0: i32,
    #[serde(deserialize_with = "num::i32")]
    pub y1: i32,
    #[serde(deserialize_with = "num::i32")]
    pub y2: i32,
    #[serde(deserialize_with = "num::i32")]
    pub y3: i32,
}

/// 视觉对象列表
///
/// `count` 才是有效对象数，`items` 可能带占位元素。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectList {
    #[serde(deserialize_with = "num::u32")]
    pub count: u32,
    pub items: Vec<RawObject>,
}

impl ObjectList {
    /// 有效对象（前 `count` 个）
    pub fn valid(&self) -> impl Iterator<Item = &RawObject> {
        self.items.iter().take(self.count as usize)
    }
}

/// `aivision` 段
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AiVisionInfo {
    pub classnames: ClassNames,
    pub objects: ObjectList,
}

/// 完整状态文档
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotStatus {
    pub robot: RobotInfo,
    pub controller: ControllerInfo,
    pub aivision: AiVisionInfo,
}

impl RobotStatus {
    /// 尚未收到任何状态时使用的空文档
    pub fn empty() -> Self {
        Self::default()
    }

    /// 解析 `ws_status` 返回的 JSON 文本
    pub fn parse(json: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(json)?)
    }

    /// 解析二进制帧（UTF-8 JSON）
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// 叠加本地标志覆盖：`(flags | set) & !clear`
    pub fn with_flag_overrides(mut self, set: StatusFlags, clear: StatusFlags) -> Self {
        self.robot.flags.insert(set);
        self.robot.flags.remove(clear);
        self
    }
}
