//! AI 视觉对象
//!
//! 状态文档中的 `aivision.objects` 是未经过滤的原始对象列表，
//! [`get_data`] 按描述符过滤并按面积从大到小排序。

use crate::constants::{
    AIVISION_MAX_OBJECTS, BALL_MAX_CX, BALL_MIN_CX, BALL_MIN_Y, BARREL_MAX_CX, BARREL_MIN_CX,
    BARREL_MIN_Y, MATCH_ALL_ID,
};
use crate::status::{AiVisionInfo, ClassNames, RawObject};
use serde::{Deserialize, Serialize};

/// 对象类型掩码
pub mod type_mask {
    pub const UNKNOWN: u32 = 0;
    pub const COLOR: u32 = 1 << 0;
    pub const CODE: u32 = 1 << 1;
    pub const MODEL: u32 = 1 << 2;
    pub const TAG: u32 = 1 << 3;
    pub const ALL: u32 = 0x3F;
}

// ============================================================================
// 描述符
// ============================================================================

/// 颜色描述（id 1-7）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorDesc {
    pub id: u32,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// 色相容差
    pub hangle: f64,
    /// 饱和度容差
    pub hdsat: f64,
}

impl ColorDesc {
    pub const fn new(id: u32, red: u8, green: u8, blue: u8, hangle: f64, hdsat: f64) -> Self {
        Self {
            id,
            red,
            green,
            blue,
            hangle,
            hdsat,
        }
    }
}

/// 颜色码描述：2 到 5 个颜色的组合（id 1-5）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeDesc {
    pub id: u32,
    colors: Vec<ColorDesc>,
}

impl CodeDesc {
    /// 颜色码最多包含的颜色数
    pub const MAX_COLORS: usize = 5;

    pub fn new(id: u32, c1: ColorDesc, c2: ColorDesc) -> Self {
        Self {
            id,
            colors: vec![c1, c2],
        }
    }

    /// 追加一个颜色，已满 5 个时忽略
    pub fn with_color(mut self, color: ColorDesc) -> Self {
        if self.colors.len() < Self::MAX_COLORS {
            self.colors.push(color);
        }
        self
    }

    pub fn colors(&self) -> &[ColorDesc] {
        &self.colors
    }

    /// `c1..c5` 槽位：颜色 id，未使用为 -1
    pub fn slots(&self) -> [i64; 5] {
        let mut slots = [-1i64; 5];
        for (slot, color) in slots.iter_mut().zip(&self.colors) {
            *slot = color.id as i64;
        }
        slots
    }
}

/// 视觉对象描述符
#[derive(Debug, Clone, PartialEq)]
pub enum VisionDescriptor {
    Color(ColorDesc),
    Code(CodeDesc),
    /// AprilTag id
    Tag(u32),
    /// AI 模型类别 id
    AiObject(u32),
    /// 任意类型，只匹配 id
    Object(u32),
    /// 任一成员匹配即匹配
    Any(Vec<VisionDescriptor>),
}

impl VisionDescriptor {
    /// 描述符对应的类型掩码
    pub fn type_mask(&self) -> u32 {
        match self {
            VisionDescriptor::Color(_) => type_mask::COLOR,
            VisionDescriptor::Code(_) => type_mask::CODE,
            VisionDescriptor::Tag(_) => type_mask::TAG,
            VisionDescriptor::AiObject(_) => type_mask::MODEL,
            VisionDescriptor::Object(_) | VisionDescriptor::Any(_) => type_mask::ALL,
        }
    }

    /// 描述符的 id（`Any` 没有 id）
    pub fn id(&self) -> Option<u32> {
        match self {
            VisionDescriptor::Color(c) => Some(c.id),
            VisionDescriptor::Code(c) => Some(c.id),
            VisionDescriptor::Tag(id)
            | VisionDescriptor::AiObject(id)
            | VisionDescriptor::Object(id) => Some(*id),
            VisionDescriptor::Any(_) => None,
        }
    }

    /// 判断对象类型与 id 是否匹配
    pub fn matches(&self, object_type: u32, id: u32) -> bool {
        match self {
            VisionDescriptor::Any(members) => {
                object_type & type_mask::ALL != 0
                    && members.iter().any(|m| m.matches(object_type, id))
            },
            other => {
                let wanted = other.id().unwrap_or(MATCH_ALL_ID);
                object_type & other.type_mask() != 0 && (wanted == MATCH_ALL_ID || wanted == id)
            },
        }
    }
}

impl From<ColorDesc> for VisionDescriptor {
    fn from(desc: ColorDesc) -> Self {
        VisionDescriptor::Color(desc)
    }
}

impl From<CodeDesc> for VisionDescriptor {
    fn from(desc: CodeDesc) -> Self {
        VisionDescriptor::Code(desc)
    }
}

/// 预定义描述符
pub struct VisionObject;

impl VisionObject {
    pub const SPORTS_BALL: VisionDescriptor = VisionDescriptor::AiObject(0);
    pub const BLUE_BARREL: VisionDescriptor = VisionDescriptor::AiObject(1);
    pub const ORANGE_BARREL: VisionDescriptor = VisionDescriptor::AiObject(2);
    pub const AIM_ROBOT: VisionDescriptor = VisionDescriptor::AiObject(3);

    pub const ALL_TAGS: VisionDescriptor = VisionDescriptor::Tag(MATCH_ALL_ID);
    pub const ALL_AIOBJS: VisionDescriptor = VisionDescriptor::AiObject(MATCH_ALL_ID);
    pub const ALL_VISION: VisionDescriptor = VisionDescriptor::Object(MATCH_ALL_ID);

    /// 最大的 AprilTag id
    pub const TAG_MAX: u32 = 37;

    /// AprilTag `n`（TAG0..TAG37）
    pub const fn tag(n: u32) -> VisionDescriptor {
        VisionDescriptor::Tag(n)
    }

    /// 匹配任意颜色的颜色描述
    pub const fn any_color() -> ColorDesc {
        ColorDesc::new(MATCH_ALL_ID, 0, 0, 0, 0.0, 0.0)
    }

    /// 任意颜色或颜色码
    pub fn all_colors() -> VisionDescriptor {
        let any = Self::any_color();
        VisionDescriptor::Any(vec![
            VisionDescriptor::Color(any),
            VisionDescriptor::Code(CodeDesc::new(MATCH_ALL_ID, any, any)),
        ])
    }

    /// 球或任一颜色的桶
    pub fn all_cargo() -> VisionDescriptor {
        VisionDescriptor::Any(vec![
            Self::SPORTS_BALL,
            Self::BLUE_BARREL,
            Self::ORANGE_BARREL,
        ])
    }
}

// ============================================================================
// 对象
// ============================================================================

/// AprilTag 四个角点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagCorners {
    pub x: [i32; 4],
    pub y: [i32; 4],
}

/// 解析后的视觉对象
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AiVisionObject {
    pub object_type: u32,
    pub id: u32,
    pub origin_x: i32,
    pub origin_y: i32,
    pub center_x: i32,
    pub center_y: i32,
    pub width: i32,
    pub height: i32,
    /// 角度（度），仅颜色与颜色码对象
    pub angle: f64,
    pub rotation: f64,
    /// 置信度，仅模型对象
    pub score: f64,
    pub area: i32,
    /// 相对机器人正前方的方位角（度）
    pub bearing: f64,
    /// 类别名，仅模型对象
    pub classname: String,
    /// 角点，仅 AprilTag 对象
    pub tag: TagCorners,
}

impl AiVisionObject {
    /// 从原始对象构造
    pub fn from_raw(raw: &RawObject, classnames: &ClassNames) -> Self {
        let center_x = (raw.originx as f64 + raw.width as f64 / 2.0) as i32;
        let center_y = (raw.originy as f64 + raw.height as f64 / 2.0) as i32;

        let angle = match raw.object_type {
            type_mask::COLOR | type_mask::CODE => raw.angle * 0.01,
            _ => 0.0,
        };

        let (score, classname) = if raw.object_type == type_mask::MODEL {
            let name = classnames.name_of(raw.id).unwrap_or_default().to_string();
            (raw.score, name)
        } else {
            (0.0, String::new())
        };

        let tag = if raw.object_type == type_mask::TAG {
            TagCorners {
                x: [raw.x0, raw.x1, raw.x2, raw.x3],
                y: [raw.y0, raw.y1, raw.y2, raw.y3],
            }
        } else {
            TagCorners::default()
        };

        Self {
            object_type: raw.object_type,
            id: raw.id,
            origin_x: raw.originx,
            origin_y: raw.originy,
            center_x,
            center_y,
            width: raw.width,
            height: raw.height,
            angle,
            rotation: angle,
            score,
            area: raw.width.saturating_mul(raw.height),
            bearing: bearing(center_x as f64, center_y as f64),
            classname,
            tag,
        }
    }

    /// 不取整的水平中心
    pub fn exact_center_x(&self) -> f64 {
        self.origin_x as f64 + self.width as f64 / 2.0
    }

    /// 桶是否位于踢球器前方
    pub fn is_barrel_held(&self) -> bool {
        let cx = self.exact_center_x();
        BARREL_MIN_CX < cx && cx < BARREL_MAX_CX && self.origin_y > BARREL_MIN_Y
    }

    /// 球是否位于踢球器前方
    pub fn is_ball_held(&self) -> bool {
        let cx = self.exact_center_x();
        BALL_MIN_CX < cx && cx < BALL_MAX_CX && self.origin_y > BALL_MIN_Y
    }
}

/// 图像坐标到方位角的二次拟合
fn bearing(cx: f64, cy: f64) -> f64 {
    -34.656 + cx * 0.22539 + cy * 0.011526 - 0.000042011 * cx * cx + 0.000010433 * cx * cy
        - 0.00007073 * cy * cy
}

/// 过滤结果
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VisionSnapshot {
    /// 匹配的对象，面积从大到小
    pub objects: Vec<AiVisionObject>,
    /// 匹配对象中面积最大的一个
    pub largest: Option<AiVisionObject>,
}

/// 按描述符过滤视觉对象
///
/// 面积相同时，后出现的对象排在前面。返回最多 `min(count, 24)` 个对象。
pub fn get_data(info: &AiVisionInfo, desc: &VisionDescriptor, count: usize) -> VisionSnapshot {
    let count = count.min(AIVISION_MAX_OBJECTS);

    let mut sorted: Vec<AiVisionObject> = Vec::new();
    for raw in info.objects.valid() {
        if !desc.matches(raw.object_type, raw.id) {
            continue;
        }
        let object = AiVisionObject::from_raw(raw, &info.classnames);
        let pos = sorted
            .iter()
            .position(|o| object.area >= o.area)
            .unwrap_or(sorted.len());
        sorted.insert(pos, object);
    }

    let largest = sorted.first().cloned();
    sorted.truncate(count);
    VisionSnapshot {
        objects: sorted,
        largest,
    }
}
