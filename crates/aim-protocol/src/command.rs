//! 指令定义
//!
//! 每条指令序列化为一个紧凑 JSON 对象，`cmd_id` 字段在前，其余字段按声明顺序：
//!
//! ```
//! use aim_protocol::Command;
//!
//! let cmd = Command::Turn { turn_rate: -75, stacking_type: 0 };
//! assert_eq!(
//!     cmd.to_json().unwrap(),
//!     r#"{"cmd_id":"turn","turn_rate":-75,"stacking_type":0}"#
//! );
//! ```
//!
//! 机器人对每条指令回复一个 [`CommandResponse`]。

use crate::flags::StatusFlags;
use crate::types::{Color, FontType, KickType, LightType, SoundType};
use crate::vision::{CodeDesc, ColorDesc};
use crate::ProtocolError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// `ws_cmd` 指令
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cmd_id", rename_all = "snake_case")]
pub enum Command {
    // ==================== 程序 ====================
    /// 通知机器人新程序开始
    ProgramInit,

    // ==================== 运动 ====================
    /// 以 `speed`（毫米/秒）沿 `angle` 方向持续平移
    Drive {
        angle: f64,
        speed: i32,
        stacking_type: u8,
    },
    /// 沿 `angle` 方向平移 `distance` 毫米
    DriveFor {
        distance: f64,
        angle: f64,
        final_heading: f64,
        drive_speed: i32,
        turn_speed: i32,
        stacking_type: u8,
    },
    DriveWithVector { x: f64, t: f64, r: f64 },
    /// 以 `turn_rate`（度/秒）持续旋转，负值为逆时针
    Turn { turn_rate: i32, stacking_type: u8 },
    /// 旋转到绝对航向
    TurnTo {
        heading: f64,
        turn_rate: i32,
        stacking_type: u8,
    },
    /// 相对旋转 `angle` 度
    TurnFor {
        angle: f64,
        turn_rate: i32,
        stacking_type: u8,
    },
    /// 直接设定三个轮子的速度
    SpinWheels { vel1: i32, vel2: i32, vel3: i32 },
    /// 重设里程计位置
    SetPose { x: f64, y: f64 },

    // ==================== 屏幕 ====================
    LcdPrint { string: String },
    LcdPrintAt {
        x: i32,
        y: i32,
        string: String,
        b_opaque: bool,
    },
    LcdSetCursor { row: i32, col: i32 },
    LcdSetOrigin { x: i32, y: i32 },
    LcdNextRow,
    LcdClearRow { number: i32, r: u8, g: u8, b: u8 },
    LcdClearScreen { r: u8, g: u8, b: u8 },
    LcdSetFont { fontname: FontType },
    LcdSetPenWidth { width: u32 },
    LcdSetPenColor { r: u8, g: u8, b: u8 },
    LcdSetFillColor {
        r: u8,
        g: u8,
        b: u8,
        b_transparency: bool,
    },
    LcdDrawLine { x1: i32, y1: i32, x2: i32, y2: i32 },
    LcdDrawRectangle {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        r: u8,
        g: u8,
        b: u8,
        b_transparency: bool,
    },
    LcdDrawCircle {
        x: i32,
        y: i32,
        radius: i32,
        r: u8,
        g: u8,
        b: u8,
        b_transparency: bool,
    },
    LcdDrawPixel { x: i32, y: i32 },
    LcdDrawImageFromFile { filename: String, x: i32, y: i32 },
    LcdSetClipRegion {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    ShowEmoji { name: u8, look: u8 },
    HideEmoji,
    ShowAivision,
    HideAivision,

    // ==================== 惯性传感器 ====================
    ImuCalibrate,
    ImuSetCrashThreshold { sensitivity: u8 },

    // ==================== 踢球器 ====================
    KickSoft,
    KickMedium,
    KickHard,

    // ==================== 声音 ====================
    PlaySound { name: SoundType, volume: i32 },
    PlayFile { name: String, volume: i32 },
    PlayNote {
        note: u8,
        octave: u8,
        duration: u32,
        volume: u8,
    },
    StopSound,

    // ==================== LED ====================
    LightSet(LightSetting),

    // ==================== AI 视觉 ====================
    ColorDescription {
        id: u32,
        red: u8,
        green: u8,
        blue: u8,
        hangle: f64,
        hdsat: f64,
    },
    CodeDescription {
        id: u32,
        c1: i64,
        c2: i64,
        c3: i64,
        c4: i64,
        c5: i64,
    },
    TagDetection { b_enable: bool },
    ColorDetection { b_enable: bool, b_merge: bool },
    ModelDetection { b_enable: bool },
}

impl Command {
    /// 踢球指令
    pub fn kick(kick: KickType) -> Self {
        match kick {
            KickType::Soft => Command::KickSoft,
            KickType::Medium => Command::KickMedium,
            KickType::Hard => Command::KickHard,
        }
    }

    /// LED 设置指令
    pub fn light_set(led: LightType, color: Color) -> Self {
        let (r, g, b) = color.rgb();
        Command::LightSet(LightSetting { led, r, g, b })
    }

    /// 颜色描述指令
    pub fn color_description(desc: &ColorDesc) -> Self {
        Command::ColorDescription {
            id: desc.id,
            red: desc.red,
            green: desc.green,
            blue: desc.blue,
            hangle: desc.hangle,
            hdsat: desc.hdsat,
        }
    }

    /// 颜色码描述指令，未使用的槽位为 -1
    pub fn code_description(desc: &CodeDesc) -> Self {
        let [c1, c2, c3, c4, c5] = desc.slots();
        Command::CodeDescription {
            id: desc.id,
            c1,
            c2,
            c3,
            c4,
            c5,
        }
    }

    /// 指令名（与序列化后的 `cmd_id` 一致）
    pub fn cmd_id(&self) -> &'static str {
        match self {
            Command::ProgramInit => "program_init",
            Command::Drive { .. } => "drive",
            Command::DriveFor { .. } => "drive_for",
            Command::DriveWithVector { .. } => "drive_with_vector",
            Command::Turn { .. } => "turn",
            Command::TurnTo { .. } => "turn_to",
            Command::TurnFor { .. } => "turn_for",
            Command::SpinWheels { .. } => "spin_wheels",
            Command::SetPose { .. } => "set_pose",
            Command::LcdPrint { .. } => "lcd_print",
            Command::LcdPrintAt { .. } => "lcd_print_at",
            Command::LcdSetCursor { .. } => "lcd_set_cursor",
            Command::LcdSetOrigin { .. } => "lcd_set_origin",
            Command::LcdNextRow => "lcd_next_row",
            Command::LcdClearRow { .. } => "lcd_clear_row",
            Command::LcdClearScreen { .. } => "lcd_clear_screen",
            Command::LcdSetFont { .. } => "lcd_set_font",
            Command::LcdSetPenWidth { .. } => "lcd_set_pen_width",
            Command::LcdSetPenColor { .. } => "lcd_set_pen_color",
            Command::LcdSetFillColor { .. } => "lcd_set_fill_color",
            Command::LcdDrawLine { .. } => "lcd_draw_line",
            Command::LcdDrawRectangle { .. } => "lcd_draw_rectangle",
            Command::LcdDrawCircle { .. } => "lcd_draw_circle",
            Command::LcdDrawPixel { .. } => "lcd_draw_pixel",
            Command::LcdDrawImageFromFile { .. } => "lcd_draw_image_from_file",
            Command::LcdSetClipRegion { .. } => "lcd_set_clip_region",
            Command::ShowEmoji { .. } => "show_emoji",
            Command::HideEmoji => "hide_emoji",
            Command::ShowAivision => "show_aivision",
            Command::HideAivision => "hide_aivision",
            Command::ImuCalibrate => "imu_calibrate",
            Command::ImuSetCrashThreshold { .. } => "imu_set_crash_threshold",
            Command::KickSoft => KickType::Soft.cmd_id(),
            Command::KickMedium => KickType::Medium.cmd_id(),
            Command::KickHard => KickType::Hard.cmd_id(),
            Command::PlaySound { .. } => "play_sound",
            Command::PlayFile { .. } => "play_file",
            Command::PlayNote { .. } => "play_note",
            Command::StopSound => "stop_sound",
            Command::LightSet(_) => "light_set",
            Command::ColorDescription { .. } => "color_description",
            Command::CodeDescription { .. } => "code_description",
            Command::TagDetection { .. } => "tag_detection",
            Command::ColorDetection { .. } => "color_detection",
            Command::ModelDetection { .. } => "model_detection",
        }
    }

    /// 序列化为紧凑 JSON
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// LED 设置：序列化为 `{"<led>": {"r":..,"g":..,"b":..}}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightSetting {
    pub led: LightType,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Serialize)]
struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

impl Serialize for LightSetting {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            self.led.as_str(),
            &Rgb {
                r: self.r,
                g: self.g,
                b: self.b,
            },
        )?;
        map.end()
    }
}

// ============================================================================
// 响应
// ============================================================================

/// 指令处理状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseStatus {
    Complete,
    InProgress,
    Error,
    Other(String),
}

/// `ws_cmd` 响应
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandResponse {
    pub cmd_id: String,
    pub status: String,
    pub error_info: Option<String>,
}

impl CommandResponse {
    /// 机器人不认识该指令时回复的 `cmd_id`
    pub const CMD_UNKNOWN: &'static str = "cmd_unknown";

    pub fn parse(bytes: &[u8]) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn status(&self) -> ResponseStatus {
        match self.status.as_str() {
            "complete" => ResponseStatus::Complete,
            "in_progress" => ResponseStatus::InProgress,
            "error" => ResponseStatus::Error,
            other => ResponseStatus::Other(other.to_string()),
        }
    }

    pub fn is_unknown_command(&self) -> bool {
        self.cmd_id == Self::CMD_UNKNOWN
    }

    /// 指令已被接受（完成或进行中）
    pub fn is_accepted(&self) -> bool {
        matches!(
            self.status(),
            ResponseStatus::Complete | ResponseStatus::InProgress
        )
    }

    /// 错误原因（无则为 "no reason given"）
    pub fn error_reason(&self) -> &str {
        self.error_info.as_deref().unwrap_or("no reason given")
    }

    /// 指令被接受后，下一帧状态中应当置位的标志
    ///
    /// 固件在接受指令后的第一帧状态里往往还没有反映出运动，
    /// 需要在本地先行置位。
    pub fn implied_flags(&self) -> StatusFlags {
        if !self.is_accepted() {
            return StatusFlags::empty();
        }
        match self.cmd_id.as_str() {
            "drive" | "drive_for" => StatusFlags::IS_MOVE_ACTIVE | StatusFlags::IS_MOVING,
            "turn" | "turn_for" | "turn_to" => {
                StatusFlags::IS_TURN_ACTIVE | StatusFlags::IS_MOVING
            },
            "imu_calibrate" => StatusFlags::IMU_CAL,
            _ => StatusFlags::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EmojiLookType, EmojiType};

    #[test]
    fn test_unit_command() {
        assert_eq!(
            Command::ProgramInit.to_json().unwrap(),
            r#"{"cmd_id":"program_init"}"#
        );
        assert_eq!(
            Command::LcdNextRow.to_json().unwrap(),
            r#"{"cmd_id":"lcd_next_row"}"#
        );
    }

    #[test]
    fn test_drive_for_field_order() {
        let cmd = Command::DriveFor {
            distance: -150.0,
            angle: 90.0,
            final_heading: 0.0,
            drive_speed: 100,
            turn_speed: 75,
            stacking_type: 0,
        };
        assert_eq!(
            cmd.to_json().unwrap(),
            r#"{"cmd_id":"drive_for","distance":-150.0,"angle":90.0,"final_heading":0.0,"drive_speed":100,"turn_speed":75,"stacking_type":0}"#
        );
    }

    #[test]
    fn test_enum_fields_lowercase() {
        let cmd = Command::PlaySound {
            name: SoundType::ActHappy,
            volume: 50,
        };
        assert_eq!(
            cmd.to_json().unwrap(),
            r#"{"cmd_id":"play_sound","name":"act_happy","volume":50}"#
        );

        let cmd = Command::LcdSetFont {
            fontname: FontType::Mono20,
        };
        assert_eq!(
            cmd.to_json().unwrap(),
            r#"{"cmd_id":"lcd_set_font","fontname":"mono20"}"#
        );

        let cmd = Command::ShowEmoji {
            name: EmojiType::Thinking.into(),
            look: EmojiLookType::Left.into(),
        };
        assert_eq!(
            cmd.to_json().unwrap(),
            r#"{"cmd_id":"show_emoji","name":18,"look":1}"#
        );
    }

    #[test]
    fn test_light_set_dynamic_key() {
        let cmd = Command::light_set(LightType::Led2, Color::ORANGE);
        assert_eq!(
            cmd.to_json().unwrap(),
            r#"{"cmd_id":"light_set","light2":{"r":255,"g":133,"b":0}}"#
        );
        assert_eq!(cmd.cmd_id(), "light_set");
    }

    #[test]
    fn test_kick_ids() {
        assert_eq!(
            Command::kick(KickType::Hard).to_json().unwrap(),
            r#"{"cmd_id":"kick_hard"}"#
        );
        assert_eq!(Command::kick(KickType::Soft).cmd_id(), "kick_soft");
    }

    #[test]
    fn test_code_description_slots() {
        let red = ColorDesc::new(1, 237, 61, 74, 10.0, 0.2);
        let blue = ColorDesc::new(2, 13, 114, 227, 10.0, 0.2);
        let green = ColorDesc::new(3, 0, 200, 0, 10.0, 0.2);
        let code = CodeDesc::new(1, red, blue).with_color(green);
        assert_eq!(
            Command::code_description(&code).to_json().unwrap(),
            r#"{"cmd_id":"code_description","id":1,"c1":1,"c2":2,"c3":3,"c4":-1,"c5":-1}"#
        );
    }

    #[test]
    fn test_cmd_id_matches_serialized_tag() {
        let samples = [
            Command::ProgramInit,
            Command::SpinWheels {
                vel1: 1,
                vel2: 2,
                vel3: 3,
            },
            Command::LcdDrawImageFromFile {
                filename: "logo.png".to_string(),
                x: 0,
                y: 0,
            },
            Command::ImuSetCrashThreshold { sensitivity: 2 },
            Command::ColorDetection {
                b_enable: true,
                b_merge: false,
            },
            Command::KickMedium,
        ];
        for cmd in samples {
            let value: serde_json::Value = serde_json::from_str(&cmd.to_json().unwrap()).unwrap();
            assert_eq!(value["cmd_id"], cmd.cmd_id());
        }
    }

    #[test]
    fn test_response_parsing() {
        let resp = CommandResponse::parse(br#"{"cmd_id":"drive","status":"in_progress"}"#).unwrap();
        assert!(resp.is_accepted());
        assert_eq!(
            resp.implied_flags(),
            StatusFlags::IS_MOVE_ACTIVE | StatusFlags::IS_MOVING
        );

        let resp =
            CommandResponse::parse(br#"{"cmd_id":"turn_to","status":"error","error_info":"busy"}"#)
                .unwrap();
        assert_eq!(resp.status(), ResponseStatus::Error);
        assert_eq!(resp.error_reason(), "busy");
        assert!(resp.implied_flags().is_empty());

        let resp = CommandResponse::parse(br#"{"cmd_id":"cmd_unknown"}"#).unwrap();
        assert!(resp.is_unknown_command());
        assert_eq!(resp.error_reason(), "no reason given");

        let resp =
            CommandResponse::parse(br#"{"cmd_id":"imu_calibrate","status":"complete"}"#).unwrap();
        assert_eq!(resp.implied_flags(), StatusFlags::IMU_CAL);
    }
}
