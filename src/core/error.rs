//! 统一错误处理模块
//!
//! ## 错误类型分层
//!
//! - **基础设施层错误** (`core::error`): 窗口、事件循环、GPU 设备、配置
//! - **领域层错误** (`galaxy::errors`): 参数校验、资源创建与释放
//!
//! `EngineError` 可以同时承载两层的错误。

use crate::config::ConfigError;
use crate::galaxy::GalaxyError;
use thiserror::Error;

/// 应用核心错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Window creation failed: {0}")]
    Window(String),

    #[error("Event loop error: {0}")]
    EventLoop(String),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Galaxy error: {0}")]
    Galaxy(#[from] GalaxyError),
}

/// 渲染系统错误
#[derive(Error, Debug, Clone)]
pub enum RenderError {
    #[error("Failed to create surface: {0}")]
    SurfaceCreation(String),

    #[error("Failed to request adapter: no compatible GPU found")]
    NoAdapter,

    #[error("Failed to request device: {0}")]
    DeviceRequest(String),

    #[error("Surface error: {0}")]
    Surface(String),
}

/// 结果类型别名
pub type EngineResult<T> = Result<T, EngineError>;
pub type RenderResult<T> = Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::ParameterField;

    #[test]
    fn test_error_conversion() {
        let galaxy_err = GalaxyError::invalid(ParameterField::Radius, 0.0f32, "must be positive");
        let engine_err: EngineError = galaxy_err.into();
        assert!(matches!(engine_err, EngineError::Galaxy(_)));

        let config_err = ConfigError::ValidationError("bad".to_string());
        assert!(matches!(EngineError::from(config_err), EngineError::Config(_)));

        // 文件读取错误经由配置层上抛
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let engine_err: EngineError = ConfigError::from(io_err).into();
        assert!(matches!(engine_err, EngineError::Config(ConfigError::FileError(_))));
    }

    #[test]
    fn test_error_display() {
        let err = RenderError::NoAdapter;
        assert_eq!(
            err.to_string(),
            "Failed to request adapter: no compatible GPU found"
        );
        let err: EngineError = RenderError::Surface("lost".to_string()).into();
        assert_eq!(err.to_string(), "Render error: Surface error: lost");
    }
}
