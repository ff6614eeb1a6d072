//! 星系生命周期
//!
//! 持有当前显示的点云资源，重新生成时先释放旧资源再挂载新资源。
//!
//! ## 状态机
//!
//! ```text
//!   Empty ──regenerate()──▶ Populated ──regenerate()──┐
//!                               ▲                      │
//!                               └──────────────────────┘
//! ```
//!
//! 没有 Populated → Empty 的转换。一次 `regenerate()` 内同步完成
//! 「生成 → 上传 → 释放旧资源 → 移除旧资源 → 挂载新资源」，
//! 场景在两帧之间永远恰好包含一个星系。

use super::errors::{GalaxyError, GalaxyResult};
use super::generator::{PointCloud, PointCloudGenerator, SeedPolicy};
use super::params::GalaxyParameters;
use std::time::Instant;

/// 可显式释放的渲染资源
pub trait Disposable {
    /// 释放底层缓冲区（GPU 内存等）
    ///
    /// 释放后资源不能再被绘制；重复释放返回 `ResourceDisposal` 错误。
    fn dispose(&mut self) -> GalaxyResult<()>;
}

/// 外部渲染引擎的场景图边界
pub trait SceneGraph {
    /// 场景中可绘制的资源
    type Resource: Disposable;

    /// 把点云上传为可绘制资源
    fn create_resource(&mut self, cloud: PointCloud) -> GalaxyResult<Self::Resource>;

    /// 挂载资源
    fn add(&mut self, resource: &Self::Resource);

    /// 移除资源
    fn remove(&mut self, resource: &Self::Resource);
}

/// 生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Empty,
    Populated,
}

/// 一次重新生成的结果摘要
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegenerationReport {
    /// 生成的粒子数
    pub particle_count: u32,
    /// 是否释放了旧资源
    pub replaced: bool,
    /// 耗时（毫秒）
    pub elapsed_ms: f64,
}

/// 星系生命周期（单一所有者的资源槽）
pub struct GalaxyLifecycle<S: SceneGraph> {
    current: Option<S::Resource>,
    generator: PointCloudGenerator,
    seed: SeedPolicy,
    regenerations: u64,
}

impl<S: SceneGraph> GalaxyLifecycle<S> {
    pub fn new(seed: SeedPolicy) -> Self {
        Self {
            current: None,
            generator: PointCloudGenerator::new(),
            seed,
            regenerations: 0,
        }
    }

    pub fn state(&self) -> LifecycleState {
        if self.current.is_some() {
            LifecycleState::Populated
        } else {
            LifecycleState::Empty
        }
    }

    /// 当前挂载的资源
    pub fn current(&self) -> Option<&S::Resource> {
        self.current.as_ref()
    }

    /// 成功完成的重新生成次数
    pub fn regenerations(&self) -> u64 {
        self.regenerations
    }

    pub fn seed_policy(&self) -> SeedPolicy {
        self.seed
    }

    /// 重新生成星系
    ///
    /// # 错误
    ///
    /// - `ParameterValidation`: 参数无法生成，场景保持不变
    /// - `ResourceCreation`: 新资源创建失败，场景保持不变
    /// - `ResourceDisposal`: 旧资源释放失败，新资源被丢弃，旧星系继续显示
    pub fn regenerate(
        &mut self,
        params: &GalaxyParameters,
        scene: &mut S,
    ) -> GalaxyResult<RegenerationReport> {
        let _span = tracing::info_span!(target: "galaxy", "regenerate").entered();
        let start = Instant::now();

        let mut rng = self.seed.rng();
        let cloud = self.generator.generate(params, &mut rng)?;
        let mut resource = scene.create_resource(cloud)?;

        let replaced = match self.current.as_mut() {
            Some(old) => {
                if let Err(err) = old.dispose() {
                    if let Err(cleanup) = resource.dispose() {
                        tracing::warn!(target: "galaxy", "Failed to release discarded galaxy: {}", cleanup);
                    }
                    return Err(err);
                }
                scene.remove(old);
                true
            }
            None => false,
        };

        scene.add(&resource);
        self.current = Some(resource);
        self.regenerations += 1;

        let report = RegenerationReport {
            particle_count: params.particle_count,
            replaced,
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        };
        tracing::debug!(
            target: "galaxy",
            particles = report.particle_count,
            branches = params.branch_count,
            replaced = report.replaced,
            "Galaxy regenerated in {:.2}ms",
            report.elapsed_ms
        );
        Ok(report)
    }
}

/// 只能释放一次的资源辅助检查
pub fn ensure_not_disposed(disposed: bool, what: &str) -> GalaxyResult<()> {
    if disposed {
        Err(GalaxyError::ResourceDisposal(format!("{} already disposed", what)))
    } else {
        Ok(())
    }
}
