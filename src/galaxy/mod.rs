//! 星系领域模块
//!
//! 程序化点云星系的核心逻辑，不依赖任何渲染后端：
//!
//! - [`color`]: 颜色与径向渐变
//! - [`params`]: 参数与字段约束
//! - [`generator`]: 点云生成算法
//! - [`lifecycle`]: 当前星系资源的所有权与替换
//! - [`store`]: 参数存储与提交回调
//!
//! ## 使用示例
//!
//! ```ignore
//! let mut store = ParameterStore::new();
//! let mut lifecycle = GalaxyLifecycle::new(SeedPolicy::Fixed(42));
//! lifecycle.regenerate(store.parameters(), &mut scene)?;
//! ```

pub mod color;
pub mod errors;
pub mod generator;
pub mod lifecycle;
pub mod params;
#[cfg(test)]
mod property_tests;
pub mod store;

// 重新导出主要类型
pub use color::{ColorGradient, Rgb};
pub use errors::{GalaxyError, GalaxyResult};
pub use generator::{
    branch_angle, branch_index, PointCloud, PointCloudGenerator, PointMaterial, RandomSource,
    SeedPolicy,
};
pub use lifecycle::{
    Disposable, GalaxyLifecycle, LifecycleState, RegenerationReport, SceneGraph,
};
pub use params::{FieldBounds, GalaxyParameters, ParameterField};
pub use store::{CommitCallback, FieldDescriptor, ParameterStore};
