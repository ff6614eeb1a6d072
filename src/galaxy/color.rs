//! 颜色与径向渐变
//!
//! 星系颜色在 sRGB 空间中直接插值，不做伽马校正。

use super::errors::{GalaxyError, GalaxyResult};
use glam::Vec3;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// RGB 颜色（各通道范围 0-1）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// 从 8 位通道构造
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// 解析 `#rrggbb` 或 `rrggbb` 格式
    pub fn from_hex(hex: &str) -> GalaxyResult<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || GalaxyError::InvalidColor(hex.to_string());
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
        };
        Ok(Self::from_u8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// 转为 8 位通道（四舍五入并截断到 0-255）
    pub fn to_u8(self) -> [u8; 3] {
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b)]
    }

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_u8();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }

    pub fn from_vec3(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = GalaxyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

/// 两端点的径向颜色渐变
///
/// 因子 0 对应内侧颜色，因子 1 对应外侧颜色。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorGradient {
    inside: Vec3,
    outside: Vec3,
    lower: Vec3,
    upper: Vec3,
}

impl ColorGradient {
    pub fn new(inside: Rgb, outside: Rgb) -> Self {
        let inside = inside.to_vec3();
        let outside = outside.to_vec3();
        Self {
            inside,
            outside,
            lower: inside.min(outside),
            upper: inside.max(outside),
        }
    }

    /// 采样颜色
    ///
    /// `t` 会被截断到 [0, 1]；结果逐通道限制在两端点张成的区间内，
    /// 浮点舍入不会产生越界值。
    pub fn sample(&self, t: f32) -> Vec3 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        (self.inside + (self.outside - self.inside) * t).clamp(self.lower, self.upper)
    }

    pub fn inside(&self) -> Rgb {
        Rgb::from_vec3(self.inside)
    }

    pub fn outside(&self) -> Rgb {
        Rgb::from_vec3(self.outside)
    }
}
