//! 星系领域错误类型

use super::params::ParameterField;
use thiserror::Error;

/// 星系领域错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GalaxyError {
    /// 参数超出文档约定的范围，或会导致 NaN/Infinity
    #[error("Invalid parameter {field}: {value} ({reason})")]
    ParameterValidation {
        field: ParameterField,
        value: f64,
        reason: String,
    },
    /// 无法解析的颜色字符串
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    /// 渲染资源创建失败
    #[error("Resource creation failed: {0}")]
    ResourceCreation(String),
    /// 渲染资源释放失败
    #[error("Resource disposal failed: {0}")]
    ResourceDisposal(String),
}

impl GalaxyError {
    pub fn invalid(field: ParameterField, value: impl Into<f64>, reason: impl Into<String>) -> Self {
        Self::ParameterValidation {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

pub type GalaxyResult<T> = Result<T, GalaxyError>;
