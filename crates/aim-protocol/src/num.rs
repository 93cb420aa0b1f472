//! 宽松数值反序列化
//!
//! 固件上报的数值字段有时是 JSON 数字，有时是数字字符串（如 `"12.50"`），
//! 这些辅助函数两种都接受，`null` 视为 0。

use crate::flags::parse_hex_u32;
use serde::de::{self, Deserializer, Visitor};
use std::fmt;

struct LenientF64;

impl Visitor<'_> for LenientF64 {
    type Value = f64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<f64, E> {
        Ok(if v { 1.0 } else { 0.0 })
    }

    fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
        Ok(0.0)
    }

    fn visit_none<E: de::Error>(self) -> Result<f64, E> {
        Ok(0.0)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            return Ok(0.0);
        }
        trimmed
            .parse::<f64>()
            .map_err(|_| E::custom(format!("invalid numeric string {:?}", v)))
    }
}

pub(crate) fn f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    deserializer.deserialize_any(LenientF64)
}

pub(crate) fn i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    f64(deserializer).map(|v| v as i32)
}

pub(crate) fn u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    f64(deserializer).map(|v| v as u32)
}

struct LenientHex;

impl Visitor<'_> for LenientHex {
    type Value = u32;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a hex string or an integer")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u32, E> {
        Ok(v as u32)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u32, E> {
        Ok(v as u32)
    }

    fn visit_unit<E: de::Error>(self) -> Result<u32, E> {
        Ok(0)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u32, E> {
        parse_hex_u32(v).ok_or_else(|| E::custom(format!("invalid hex string {:?}", v)))
    }
}

pub(crate) fn hex_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    deserializer.deserialize_any(LenientHex)
}

struct LenientString;

impl Visitor<'_> for LenientString {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or a number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }
}

pub(crate) fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    deserializer.deserialize_any(LenientString)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "super::f64")]
        value: f64,
        #[serde(deserialize_with = "super::i32")]
        count: i32,
        #[serde(deserialize_with = "super::hex_u32")]
        mask: u32,
        #[serde(deserialize_with = "super::string")]
        name: String,
    }

    #[test]
    fn test_accepts_strings_and_numbers() {
        let p: Probe =
            serde_json::from_str(r#"{"value":"12.5","count":"3","mask":"0x0001","name":7}"#)
                .unwrap();
        assert_eq!(p.value, 12.5);
        assert_eq!(p.count, 3);
        assert_eq!(p.mask, 1);
        assert_eq!(p.name, "7");

        let p: Probe =
            serde_json::from_str(r#"{"value":-4,"count":2.9,"mask":16,"name":"ball"}"#).unwrap();
        assert_eq!(p.value, -4.0);
        assert_eq!(p.count, 2);
        assert_eq!(p.mask, 16);
        assert_eq!(p.name, "ball");
    }

    #[test]
    fn test_rejects_garbage() {
        let res = serde_json::from_str::<Probe>(
            r#"{"value":"abc","count":1,"mask":"0x0","name":""}"#,
        );
        assert!(res.is_err());
    }
}
