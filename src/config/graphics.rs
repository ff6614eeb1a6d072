use super::{ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};

/// 窗口与表面配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// 标题
    pub title: String,

    /// 初始宽度（逻辑像素）
    pub width: u32,

    /// 初始高度（逻辑像素）
    pub height: u32,

    /// 垂直同步
    pub vsync: bool,

    /// 设备像素比上限
    pub max_pixel_ratio: f32,

    /// 背景色（线性 RGB）
    pub clear_color: [f64; 3],
}

impl_default!(WindowConfig {
    title: "Galaxy Generator".to_string(),
    width: 1280,
    height: 720,
    vsync: true,
    max_pixel_ratio: 2.0,
    clear_color: [0.0, 0.0, 0.0],
});

impl WindowConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ValidationError(
                "Invalid window size".to_string(),
            ));
        }
        if !(self.max_pixel_ratio >= 1.0) {
            return Err(ConfigError::ValidationError(
                "max_pixel_ratio must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// 相机配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// 垂直视场角（度）
    pub fov_degrees: f32,
    /// 近平面
    pub near: f32,
    /// 远平面
    pub far: f32,
    /// 初始位置（看向原点）
    pub position: [f32; 3],
    /// 阻尼系数（每帧保留的速度比例为 1 - damping）
    pub damping: f32,
    /// 拖动旋转速度（弧度/像素）
    pub rotate_speed: f32,
    /// 滚轮缩放速度
    pub zoom_speed: f32,
    /// 最小距离
    pub min_distance: f32,
    /// 最大距离
    pub max_distance: f32,
}

impl_default!(CameraConfig {
    fov_degrees: 75.0,
    near: 0.1,
    far: 100.0,
    position: [-4.0, 6.0, 4.0],
    damping: 0.05,
    rotate_speed: 0.005,
    zoom_speed: 0.1,
    min_distance: 0.5,
    max_distance: 50.0,
});

impl CameraConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(ConfigError::ValidationError(format!(
                "fov_degrees out of range: {}",
                self.fov_degrees
            )));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(ConfigError::ValidationError(
                "Camera planes must satisfy 0 < near < far".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(ConfigError::ValidationError(
                "damping must lie in [0, 1]".to_string(),
            ));
        }
        if !(self.min_distance > 0.0 && self.max_distance >= self.min_distance) {
            return Err(ConfigError::ValidationError(
                "Invalid camera distance limits".to_string(),
            ));
        }
        Ok(())
    }
}

/// 动画配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// 绕 Y 轴的旋转速度（弧度/秒）
    pub rotation_speed: f32,
}

impl_default!(AnimationConfig {
    rotation_speed: -0.15,
});

impl AnimationConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.rotation_speed.is_finite() {
            return Err(ConfigError::ValidationError(
                "rotation_speed must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// 给定运行时间下的旋转角
    pub fn rotation_at(&self, elapsed_seconds: f32) -> f32 {
        elapsed_seconds * self.rotation_speed
    }
}
