//! 核心模块
//!
//! 包含应用的核心功能：
//! - `engine` - 主入口和运行循环
//! - `error` - 错误类型定义
//! - `macros` - 配置默认值宏

pub mod engine;
pub mod error;
#[macro_use]
pub mod macros;

// 重新导出错误类型
pub use error::{EngineError, EngineResult, RenderError, RenderResult};

// 重新导出主要类型
pub use engine::Engine;
