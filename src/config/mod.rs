//! 统一配置系统
//!
//! 提供TOML/JSON配置文件、环境变量覆盖。配置只描述窗口、相机、动画、
//! 随机种子与日志；星系参数不在配置中保存。

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod graphics;

pub use graphics::{AnimationConfig, CameraConfig, WindowConfig};

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 应用主配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 窗口配置
    #[serde(default)]
    pub window: WindowConfig,

    /// 相机配置
    #[serde(default)]
    pub camera: CameraConfig,

    /// 动画配置
    #[serde(default)]
    pub animation: AnimationConfig,

    /// 生成配置
    #[serde(default)]
    pub generation: GenerationConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// 用给定的查找函数覆盖配置（便于测试）
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // 窗口配置
        if let Some(width) = lookup("GALAXY_WINDOW_WIDTH").and_then(|v| v.parse().ok()) {
            self.window.width = width;
        }
        if let Some(height) = lookup("GALAXY_WINDOW_HEIGHT").and_then(|v| v.parse().ok()) {
            self.window.height = height;
        }
        if let Some(val) = lookup("GALAXY_VSYNC") {
            self.window.vsync = val.parse().unwrap_or(self.window.vsync);
        }

        // 动画配置
        if let Some(speed) = lookup("GALAXY_ROTATION_SPEED").and_then(|v| v.parse().ok()) {
            self.animation.rotation_speed = speed;
        }

        // 生成配置
        if let Some(val) = lookup("GALAXY_SEED") {
            match val.parse() {
                Ok(seed) => self.generation.seed = Some(seed),
                Err(_) => tracing::warn!(target: "config", "Ignoring invalid GALAXY_SEED: {}", val),
            }
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.window.validate()?;
        self.camera.validate()?;
        self.animation.validate()?;
        Ok(())
    }

    /// 自动查找并加载配置文件
    ///
    /// 按以下顺序查找：
    /// 1. ./galaxy.toml
    /// 2. ./galaxy.json
    /// 3. <用户配置目录>/galaxy_generator/config.toml
    /// 4. 使用默认配置
    pub fn load_or_default() -> Self {
        if let Ok(config) = Self::from_toml_file("galaxy.toml") {
            tracing::info!(target: "config", "Loaded config from galaxy.toml");
            return config;
        }

        if let Ok(config) = Self::from_json_file("galaxy.json") {
            tracing::info!(target: "config", "Loaded config from galaxy.json");
            return config;
        }

        if let Some(path) = Self::user_config_path() {
            if let Ok(config) = Self::from_toml_file(&path) {
                tracing::info!(target: "config", "Loaded config from {:?}", path);
                return config;
            }
        }

        tracing::info!(target: "config", "Using default configuration");
        Self::default()
    }

    /// 用户配置文件路径
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("galaxy_generator").join("config.toml"))
    }
}

/// 生成配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// 固定随机种子；为空时每次重新生成都使用系统熵
    #[serde(default)]
    pub seed: Option<u64>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别（`RUST_LOG` 优先）
    pub level: LogLevel,
}

use crate::impl_default;

impl_default!(LoggingConfig {
    level: LogLevel::Info,
});

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}

impl LogLevel {
    /// 作为 `EnvFilter` 指令
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.generation.seed.is_none());
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [window]
            title = "Spiral"
            width = 1024
            height = 768

            [generation]
            seed = 42

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.window.title, "Spiral");
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.generation.seed, Some(42));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.camera.fov_degrees, CameraConfig::default().fov_degrees);
    }

    #[test]
    fn test_json_config() {
        let config = AppConfig::from_json_str(r#"{"animation": {"rotation_speed": 0.3}}"#).unwrap();
        assert_eq!(config.animation.rotation_speed, 0.3);
        assert!(AppConfig::from_json_str("{not json").is_err());
    }

    #[test]
    fn test_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[window]\nwidth = 640\nheight = 480").unwrap();
        let config = AppConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.window.width, 640);
        assert!(matches!(
            AppConfig::from_toml_file("/nonexistent/galaxy.toml"),
            Err(ConfigError::FileError(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("GALAXY_WINDOW_WIDTH", "1280"),
            ("GALAXY_VSYNC", "false"),
            ("GALAXY_SEED", "7"),
            ("GALAXY_ROTATION_SPEED", "not-a-number"),
        ]
        .into_iter()
        .collect();
        let mut config = AppConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.window.width, 1280);
        assert!(!config.window.vsync);
        assert_eq!(config.generation.seed, Some(7));
        assert_eq!(
            config.animation.rotation_speed,
            AnimationConfig::default().rotation_speed
        );
    }

    #[test]
    fn test_validation_errors() {
        let mut config = AppConfig::default();
        config.window.width = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
