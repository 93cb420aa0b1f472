//! 输入验证模块
//!
//! 命令行参数在连接机器人之前完成解析与验证。

use aim_sdk::prelude::*;
use anyhow::{Context, Result, bail};

/// 平移距离上限（毫米）
pub const MAX_DISTANCE_MM: f64 = 5000.0;

/// 验证有限数值
pub fn finite(name: &str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        bail!("{} 无效: {}", name, value);
    }
    Ok(value)
}

/// 验证平移距离
pub fn validate_distance(distance: f64) -> Result<f64> {
    let distance = finite("distance", distance)?;
    if distance.abs() > MAX_DISTANCE_MM {
        bail!(
            "distance {:.1} mm 超出范围 [-{}, {}]",
            distance,
            MAX_DISTANCE_MM,
            MAX_DISTANCE_MM
        );
    }
    Ok(distance)
}

/// 验证百分比速度（0-100）
pub fn validate_percent(name: &str, value: f64) -> Result<f64> {
    let value = finite(name, value)?;
    if !(0.0..=100.0).contains(&value) {
        bail!("{} {} 超出范围 [0, 100]", name, value);
    }
    Ok(value)
}

/// 解析 LED 目标：`all` 或 0-5
pub fn parse_led_target(s: &str) -> Result<LightType> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("all") {
        return Ok(LightType::All);
    }
    let index: i64 = s
        .parse()
        .with_context(|| format!("无效的 LED 目标: {}（应为 all 或 0-5）", s))?;
    if !(0..=5).contains(&index) {
        bail!("LED 下标 {} 超出范围 [0, 5]", index);
    }
    Ok(LightType::from_index(index))
}

/// 解析 `#RRGGBB` / `#RGB` 颜色
pub fn parse_color(s: &str) -> Result<Color> {
    s.trim()
        .parse::<Color>()
        .with_context(|| format!("无效的颜色: {}（应为 #RRGGBB）", s))
}

/// 解析表情名
pub fn parse_emoji(s: &str) -> Result<EmojiType> {
    s.parse::<EmojiType>()
        .with_context(|| format!("未知表情: {}", s))
}

/// 解析视线方向：forward / left / right
pub fn parse_look(s: &str) -> Result<EmojiLookType> {
    match s.trim().to_ascii_lowercase().as_str() {
        "forward" => Ok(EmojiLookType::Forward),
        "left" => Ok(EmojiLookType::Left),
        "right" => Ok(EmojiLookType::Right),
        _ => bail!("未知视线方向: {}（应为 forward / left / right）", s),
    }
}

/// 解析内置音效名
pub fn parse_sound(s: &str) -> Result<SoundType> {
    s.parse::<SoundType>()
        .with_context(|| format!("未知音效: {}", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_distance() {
        assert_eq!(validate_distance(-200.0).unwrap(), -200.0);
        assert!(validate_distance(f64::NAN).is_err());
        assert!(validate_distance(6000.0).is_err());
    }

    #[test]
    fn test_validate_percent() {
        assert!(validate_percent("velocity", 50.0).is_ok());
        assert!(validate_percent("velocity", -1.0).is_err());
        assert!(validate_percent("velocity", 101.0).is_err());
    }

    #[test]
    fn test_parse_led_target() {
        assert_eq!(parse_led_target("all").unwrap(), LightType::All);
        assert_eq!(parse_led_target("ALL").unwrap(), LightType::All);
        assert_eq!(parse_led_target("0").unwrap(), LightType::Led1);
        assert_eq!(parse_led_target("5").unwrap(), LightType::Led6);
        assert!(parse_led_target("6").is_err());
        assert!(parse_led_target("left").is_err());
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#FF0000").unwrap(), Color::RED);
        assert_eq!(parse_color(" #0f0 ").unwrap(), Color::GREEN);
        assert!(parse_color("red").is_err());
        assert!(parse_color("#12345").is_err());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(parse_emoji("happy").unwrap(), EmojiType::Happy);
        assert!(parse_emoji("grumpy").is_err());
        assert_eq!(parse_look("Left").unwrap(), EmojiLookType::Left);
        assert!(parse_look("up").is_err());
        assert_eq!(parse_sound("tada").unwrap(), SoundType::Tada);
        assert!(parse_sound("boing").is_err());
    }
}
