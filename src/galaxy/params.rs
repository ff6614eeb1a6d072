//! 星系生成参数
//!
//! 每个数值字段都有独立的 min/max/step 约束，UI 面板直接使用这些约束。

use super::color::Rgb;
use super::errors::{GalaxyError, GalaxyResult};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;

/// 参数字段标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterField {
    ParticleSize,
    ParticleCount,
    Radius,
    BranchCount,
    Spin,
    Randomness,
    RandomnessPower,
    InsideColor,
    OutsideColor,
}

impl ParameterField {
    /// 所有字段（面板显示顺序）
    pub const ALL: [ParameterField; 9] = [
        ParameterField::ParticleSize,
        ParameterField::ParticleCount,
        ParameterField::Radius,
        ParameterField::BranchCount,
        ParameterField::Spin,
        ParameterField::Randomness,
        ParameterField::RandomnessPower,
        ParameterField::InsideColor,
        ParameterField::OutsideColor,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ParameterField::ParticleSize => "particle_size",
            ParameterField::ParticleCount => "particle_count",
            ParameterField::Radius => "radius",
            ParameterField::BranchCount => "branch_count",
            ParameterField::Spin => "spin",
            ParameterField::Randomness => "randomness",
            ParameterField::RandomnessPower => "randomness_power",
            ParameterField::InsideColor => "inside_color",
            ParameterField::OutsideColor => "outside_color",
        }
    }

    /// 面板上显示的标签
    pub fn label(&self) -> &'static str {
        match self {
            ParameterField::ParticleSize => "size",
            ParameterField::ParticleCount => "stars",
            ParameterField::Radius => "radius",
            ParameterField::BranchCount => "branches",
            ParameterField::Spin => "spin",
            ParameterField::Randomness => "randomness",
            ParameterField::RandomnessPower => "randomnessPower",
            ParameterField::InsideColor => "insideColor",
            ParameterField::OutsideColor => "outsideColor",
        }
    }

    /// 数值字段的约束；颜色字段返回 `None`
    pub fn bounds(&self) -> Option<FieldBounds> {
        let bounds = match self {
            ParameterField::ParticleSize => FieldBounds::new(0.0001, 0.03, 0.0001),
            ParameterField::ParticleCount => FieldBounds::new(1.0, 100_000.0, 1.0),
            ParameterField::Radius => FieldBounds::new(1.0, 10.0, 1.0),
            ParameterField::BranchCount => FieldBounds::new(2.0, 8.0, 1.0),
            ParameterField::Spin => FieldBounds::new(0.0, PI as f64, 0.1),
            ParameterField::Randomness => FieldBounds::new(0.0, 0.5, 0.01),
            ParameterField::RandomnessPower => FieldBounds::new(1.0, 10.0, 0.001),
            ParameterField::InsideColor | ParameterField::OutsideColor => return None,
        };
        Some(bounds)
    }

    pub fn is_color(&self) -> bool {
        matches!(self, ParameterField::InsideColor | ParameterField::OutsideColor)
    }
}

impl fmt::Display for ParameterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 数值字段约束（闭区间）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl FieldBounds {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    /// 检查值是否在范围内
    pub fn check(&self, field: ParameterField, value: f64) -> GalaxyResult<()> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(GalaxyError::invalid(
                field,
                value,
                format!("expected a value in [{}, {}]", self.min, self.max),
            ))
        }
    }
}

/// 星系参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalaxyParameters {
    /// 点大小（世界单位，随距离衰减）
    pub particle_size: f32,
    /// 粒子数
    pub particle_count: u32,
    /// 星系半径
    pub radius: f32,
    /// 旋臂数
    pub branch_count: u32,
    /// 旋转角随半径增长的系数（弧度）
    pub spin: f32,
    /// 随机偏移幅度（相对半径）
    pub randomness: f32,
    /// 随机偏移指数，越大越靠近旋臂中心线
    pub randomness_power: f32,
    /// 中心颜色
    pub inside_color: Rgb,
    /// 外缘颜色
    pub outside_color: Rgb,
}

impl Default for GalaxyParameters {
    fn default() -> Self {
        Self {
            particle_size: 0.01,
            particle_count: 50_000,
            radius: 5.0,
            branch_count: 3,
            spin: 0.66,
            randomness: 0.35,
            randomness_power: 3.0,
            inside_color: Rgb::from_u8(0xff, 0x60, 0x30),
            outside_color: Rgb::from_u8(0x1b, 0x39, 0x84),
        }
    }
}

impl GalaxyParameters {
    /// 读取数值字段（颜色字段返回 `None`）
    pub fn numeric(&self, field: ParameterField) -> Option<f64> {
        let value = match field {
            ParameterField::ParticleSize => self.particle_size as f64,
            ParameterField::ParticleCount => self.particle_count as f64,
            ParameterField::Radius => self.radius as f64,
            ParameterField::BranchCount => self.branch_count as f64,
            ParameterField::Spin => self.spin as f64,
            ParameterField::Randomness => self.randomness as f64,
            ParameterField::RandomnessPower => self.randomness_power as f64,
            ParameterField::InsideColor | ParameterField::OutsideColor => return None,
        };
        Some(value)
    }

    /// 按文档约束校验所有字段
    pub fn validate(&self) -> GalaxyResult<()> {
        for field in ParameterField::ALL {
            if let (Some(bounds), Some(value)) = (field.bounds(), self.numeric(field)) {
                bounds.check(field, value)?;
            }
        }
        Ok(())
    }
}
