//! 参数存储
//!
//! 保存当前参数，提供逐字段的类型化 setter，并在字段「提交」时
//! 通知注册的回调。中间拖动值通过 setter 写入但不触发回调，
//! 只有 [`ParameterStore::commit`] 才会触发重新生成。

use super::color::Rgb;
use super::errors::{GalaxyError, GalaxyResult};
use super::params::{FieldBounds, GalaxyParameters, ParameterField};

/// 提交回调
pub type CommitCallback = Box<dyn FnMut(ParameterField, &GalaxyParameters)>;

/// 面板注册字段时需要的描述
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDescriptor {
    pub field: ParameterField,
    /// 当前值（颜色字段为 `None`）
    pub value: Option<f64>,
    pub bounds: Option<FieldBounds>,
}

/// 参数存储
pub struct ParameterStore {
    params: GalaxyParameters,
    callbacks: Vec<CommitCallback>,
    commits: u64,
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterStore {
    /// 使用默认参数创建
    pub fn new() -> Self {
        Self {
            params: GalaxyParameters::default(),
            callbacks: Vec::new(),
            commits: 0,
        }
    }

    /// 使用给定参数创建（参数必须满足约束）
    pub fn with_parameters(params: GalaxyParameters) -> GalaxyResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            callbacks: Vec::new(),
            commits: 0,
        })
    }

    /// 当前参数快照
    pub fn parameters(&self) -> &GalaxyParameters {
        &self.params
    }

    /// 已提交次数
    pub fn commits(&self) -> u64 {
        self.commits
    }

    /// 注册提交回调
    pub fn on_commit<F>(&mut self, callback: F)
    where
        F: FnMut(ParameterField, &GalaxyParameters) + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// 字段描述（供面板注册控件）
    pub fn descriptor(&self, field: ParameterField) -> FieldDescriptor {
        FieldDescriptor {
            field,
            value: self.params.numeric(field),
            bounds: field.bounds(),
        }
    }

    /// 提交字段，通知所有回调
    pub fn commit(&mut self, field: ParameterField) {
        self.commits += 1;
        tracing::debug!(target: "galaxy", field = field.name(), "Parameter committed");
        let params = &self.params;
        for callback in self.callbacks.iter_mut() {
            callback(field, params);
        }
    }

    pub fn particle_size(&self) -> f32 {
        self.params.particle_size
    }

    pub fn set_particle_size(&mut self, value: f32) -> GalaxyResult<()> {
        check(ParameterField::ParticleSize, value as f64)?;
        self.params.particle_size = value;
        Ok(())
    }

    pub fn particle_count(&self) -> u32 {
        self.params.particle_count
    }

    pub fn set_particle_count(&mut self, value: u32) -> GalaxyResult<()> {
        check(ParameterField::ParticleCount, value as f64)?;
        self.params.particle_count = value;
        Ok(())
    }

    pub fn radius(&self) -> f32 {
        self.params.radius
    }

    pub fn set_radius(&mut self, value: f32) -> GalaxyResult<()> {
        check(ParameterField::Radius, value as f64)?;
        self.params.radius = value;
        Ok(())
    }

    pub fn branch_count(&self) -> u32 {
        self.params.branch_count
    }

    pub fn set_branch_count(&mut self, value: u32) -> GalaxyResult<()> {
        check(ParameterField::BranchCount, value as f64)?;
        self.params.branch_count = value;
        Ok(())
    }

    pub fn spin(&self) -> f32 {
        self.params.spin
    }

    pub fn set_spin(&mut self, value: f32) -> GalaxyResult<()> {
        check(ParameterField::Spin, value as f64)?;
        self.params.spin = value;
        Ok(())
    }

    pub fn randomness(&self) -> f32 {
        self.params.randomness
    }

    pub fn set_randomness(&mut self, value: f32) -> GalaxyResult<()> {
        check(ParameterField::Randomness, value as f64)?;
        self.params.randomness = value;
        Ok(())
    }

    pub fn randomness_power(&self) -> f32 {
        self.params.randomness_power
    }

    pub fn set_randomness_power(&mut self, value: f32) -> GalaxyResult<()> {
        check(ParameterField::RandomnessPower, value as f64)?;
        self.params.randomness_power = value;
        Ok(())
    }

    pub fn inside_color(&self) -> Rgb {
        self.params.inside_color
    }

    pub fn set_inside_color(&mut self, color: Rgb) -> GalaxyResult<()> {
        check_color(ParameterField::InsideColor, color)?;
        self.params.inside_color = color;
        Ok(())
    }

    pub fn outside_color(&self) -> Rgb {
        self.params.outside_color
    }

    pub fn set_outside_color(&mut self, color: Rgb) -> GalaxyResult<()> {
        check_color(ParameterField::OutsideColor, color)?;
        self.params.outside_color = color;
        Ok(())
    }

    /// 按字段写入数值（面板使用）；整数字段会四舍五入
    pub fn set_numeric(&mut self, field: ParameterField, value: f64) -> GalaxyResult<()> {
        match field {
            ParameterField::ParticleSize => self.set_particle_size(value as f32),
            ParameterField::ParticleCount => {
                check(field, value.round())?;
                self.set_particle_count(value.round() as u32)
            }
            ParameterField::Radius => self.set_radius(value as f32),
            ParameterField::BranchCount => {
                check(field, value.round())?;
                self.set_branch_count(value.round() as u32)
            }
            ParameterField::Spin => self.set_spin(value as f32),
            ParameterField::Randomness => self.set_randomness(value as f32),
            ParameterField::RandomnessPower => self.set_randomness_power(value as f32),
            ParameterField::InsideColor | ParameterField::OutsideColor => Err(
                GalaxyError::invalid(field, value, "color fields take an RGB value"),
            ),
        }
    }
}

fn check(field: ParameterField, value: f64) -> GalaxyResult<()> {
    match field.bounds() {
        Some(bounds) => bounds.check(field, value),
        None => Ok(()),
    }
}

fn check_color(field: ParameterField, color: Rgb) -> GalaxyResult<()> {
    for channel in color.to_array() {
        if !(0.0..=1.0).contains(&channel) {
            return Err(GalaxyError::invalid(
                field,
                channel,
                "color channels must lie in [0, 1]",
            ));
        }
    }
    Ok(())
}
