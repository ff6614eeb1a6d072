//! 星系点云生成器
//!
//! 把一组 [`GalaxyParameters`] 映射为两条平行的扁平数组：位置与颜色，
//! 每个粒子占用偏移 `3 * i` 处的三个分量。
//!
//! ## 算法
//!
//! ```text
//! radius_i  = U(0,1) * radius                     // 按半径均匀，中心更密
//! branch_i  = (i mod branches) / branches * 2π   // 轮询分配旋臂
//! spin_i    = spin * radius_i
//! offset_a  = U(0,1)^power * (±1) * randomness * radius_i   (a ∈ x,y,z)
//! position  = (r·sin(branch+spin) + ox, oy, r·cos(branch+spin) + oz)
//! color     = lerp(inside, outside, radius_i / radius)
//! ```

use super::color::ColorGradient;
use super::errors::GalaxyResult;
use super::params::GalaxyParameters;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// 随机数来源
///
/// 生成器只需要两种采样；任何 [`rand::Rng`] 都自动实现该 trait，
/// 测试可以注入固定种子的生成器或手写序列。
pub trait RandomSource {
    /// [0, 1) 上的均匀采样
    fn next_unit(&mut self) -> f32;

    /// 等概率返回 +1 或 -1
    fn next_sign(&mut self) -> f32 {
        if self.next_unit() < 0.5 {
            1.0
        } else {
            -1.0
        }
    }
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn next_unit(&mut self) -> f32 {
        self.gen::<f32>()
    }

    fn next_sign(&mut self) -> f32 {
        if self.gen_bool(0.5) {
            1.0
        } else {
            -1.0
        }
    }
}

/// 每次重新生成时如何获得随机源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeedPolicy {
    /// 每次都从系统熵重新播种
    #[default]
    Entropy,
    /// 每次都用同一个种子，相同参数得到逐位相同的结果
    Fixed(u64),
}

impl SeedPolicy {
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or(SeedPolicy::Entropy, SeedPolicy::Fixed)
    }

    /// 为一次生成创建新的随机源
    pub fn rng(&self) -> StdRng {
        match self {
            SeedPolicy::Entropy => StdRng::from_entropy(),
            SeedPolicy::Fixed(seed) => StdRng::seed_from_u64(*seed),
        }
    }
}

/// 点材质
///
/// 对应渲染引擎的点精灵材质：顶点着色、加法混合、不写深度。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMaterial {
    /// 点大小
    pub size: f32,
    /// 点大小随距离衰减
    pub size_attenuation: bool,
    /// 关闭深度写入
    pub depth_write: bool,
    /// 加法混合
    pub additive_blending: bool,
    /// 使用逐顶点颜色
    pub vertex_colors: bool,
}

impl PointMaterial {
    pub fn galaxy(size: f32) -> Self {
        Self {
            size,
            size_attenuation: true,
            depth_write: false,
            additive_blending: true,
            vertex_colors: true,
        }
    }
}

/// 生成结果：扁平位置/颜色数组与材质
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    /// 位置 `[x0, y0, z0, x1, ...]`
    pub positions: Vec<f32>,
    /// 颜色 `[r0, g0, b0, r1, ...]`
    pub colors: Vec<f32>,
    /// 材质
    pub material: PointMaterial,
}

impl PointCloud {
    /// 粒子数
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// 第 `i` 个粒子的位置
    pub fn position(&self, i: usize) -> [f32; 3] {
        let i3 = i * 3;
        [self.positions[i3], self.positions[i3 + 1], self.positions[i3 + 2]]
    }

    /// 第 `i` 个粒子的颜色
    pub fn color(&self, i: usize) -> [f32; 3] {
        let i3 = i * 3;
        [self.colors[i3], self.colors[i3 + 1], self.colors[i3 + 2]]
    }
}

/// 粒子所属旋臂（轮询分配）
pub fn branch_index(index: u32, branch_count: u32) -> u32 {
    index % branch_count
}

/// 旋臂基础角度
pub fn branch_angle(index: u32, branch_count: u32) -> f32 {
    branch_index(index, branch_count) as f32 / branch_count as f32 * TAU
}

/// 点云生成器
#[derive(Debug, Clone, Copy, Default)]
pub struct PointCloudGenerator;

impl PointCloudGenerator {
    pub fn new() -> Self {
        Self
    }

    /// 生成点云
    ///
    /// # 错误
    ///
    /// 任一数值字段超出 [`ParameterField::bounds`](super::params::ParameterField::bounds)
    /// 时返回 `GalaxyError::ParameterValidation`，此时不会消耗任何随机数。
    /// 约束范围保证 `spin * radius` 与 `randomness * radius` 不会溢出。
    pub fn generate<R: RandomSource + ?Sized>(
        &self,
        params: &GalaxyParameters,
        rng: &mut R,
    ) -> GalaxyResult<PointCloud> {
        params.validate()?;

        let count = params.particle_count as usize;
        let gradient = ColorGradient::new(params.inside_color, params.outside_color);
        let mut positions = vec![0.0f32; count * 3];
        let mut colors = vec![0.0f32; count * 3];

        for i in 0..params.particle_count {
            let radius = rng.next_unit() * params.radius;
            let angle = branch_angle(i, params.branch_count) + params.spin * radius;

            let offset_x = scatter(rng, params, radius);
            let offset_y = scatter(rng, params, radius);
            let offset_z = scatter(rng, params, radius);

            let i3 = i as usize * 3;
            positions[i3] = radius * angle.sin() + offset_x;
            positions[i3 + 1] = offset_y;
            positions[i3 + 2] = radius * angle.cos() + offset_z;

            let color = gradient.sample(radius / params.radius);
            colors[i3] = color.x;
            colors[i3 + 1] = color.y;
            colors[i3 + 2] = color.z;
        }

        Ok(PointCloud {
            positions,
            colors,
            material: PointMaterial::galaxy(params.particle_size),
        })
    }
}

/// 单轴随机偏移；指数大于 1 时偏移集中在 0 附近
fn scatter<R: RandomSource + ?Sized>(rng: &mut R, params: &GalaxyParameters, radius: f32) -> f32 {
    let magnitude = rng.next_unit().powf(params.randomness_power);
    magnitude * rng.next_sign() * params.randomness * radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::errors::GalaxyError;
    use crate::galaxy::params::ParameterField;
    use std::f32::consts::{FRAC_PI_2, PI};

    /// 循环返回预设序列的随机源
    struct Sequence {
        values: Vec<f32>,
        cursor: usize,
    }

    impl Sequence {
        fn new(values: &[f32]) -> Self {
            Self {
                values: values.to_vec(),
                cursor: 0,
            }
        }
    }

    impl RandomSource for Sequence {
        fn next_unit(&mut self) -> f32 {
            let v = self.values[self.cursor % self.values.len()];
            self.cursor += 1;
            v
        }
    }

    fn flat(count: u32, branches: u32) -> GalaxyParameters {
        GalaxyParameters {
            particle_count: count,
            branch_count: branches,
            radius: 5.0,
            spin: 0.0,
            randomness: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_buffer_lengths() {
        let params = GalaxyParameters {
            particle_count: 1234,
            ..Default::default()
        };
        let cloud = PointCloudGenerator::new()
            .generate(&params, &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(cloud.positions.len(), 1234 * 3);
        assert_eq!(cloud.colors.len(), 1234 * 3);
        assert_eq!(cloud.len(), 1234);
        assert!(!cloud.is_empty());
    }

    #[test]
    fn test_single_particle_on_z_axis() {
        let mut rng = StdRng::seed_from_u64(7);
        let cloud = PointCloudGenerator::new().generate(&flat(1, 3), &mut rng).unwrap();
        let [x, y, z] = cloud.position(0);
        assert!(x.abs() < 1e-6);
        assert_eq!(y, 0.0);
        assert!((0.0..=5.0).contains(&z));
    }

    #[test]
    fn test_four_branches_quarter_turns() {
        let angles: Vec<f32> = (0..4).map(|i| branch_angle(i, 4)).collect();
        assert_eq!(angles, vec![0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2]);

        // 半径固定为 0.5 * 5 = 2.5，检查实际落点
        let mut rng = Sequence::new(&[0.5]);
        let cloud = PointCloudGenerator::new().generate(&flat(4, 4), &mut rng).unwrap();
        let expected = [(0.0, 2.5), (2.5, 0.0), (0.0, -2.5), (-2.5, 0.0)];
        for (i, (ex, ez)) in expected.iter().enumerate() {
            let [x, _, z] = cloud.position(i);
            assert!((x - ex).abs() < 1e-5, "particle {} x={}", i, x);
            assert!((z - ez).abs() < 1e-5, "particle {} z={}", i, z);
        }
    }

    #[test]
    fn test_spin_grows_with_radius() {
        let params = GalaxyParameters {
            spin: 1.0,
            ..flat(1, 2)
        };
        // radius = 0.2 * 5 = 1.0，角度 = 1.0 弧度
        let mut rng = Sequence::new(&[0.2]);
        let cloud = PointCloudGenerator::new().generate(&params, &mut rng).unwrap();
        let [x, _, z] = cloud.position(0);
        assert!((x - 1.0f32.sin()).abs() < 1e-6);
        assert!((z - 1.0f32.cos()).abs() < 1e-6);
    }

    #[test]
    fn test_scatter_formula() {
        let params = GalaxyParameters {
            randomness: 0.5,
            randomness_power: 2.0,
            ..flat(1, 3)
        };
        // 采样顺序：radius, |x|, sign x, |y|, sign y, |z|, sign z
        let mut rng = Sequence::new(&[0.8, 0.5, 0.1, 0.5, 0.9, 1.0, 0.1]);
        let cloud = PointCloudGenerator::new().generate(&params, &mut rng).unwrap();
        let radius = 0.8 * 5.0;
        let [x, y, z] = cloud.position(0);
        assert!((x - 0.25 * 0.5 * radius).abs() < 1e-5);
        assert!((y + 0.25 * 0.5 * radius).abs() < 1e-5);
        assert!((z - (radius + 0.5 * radius)).abs() < 1e-5);
    }

    #[test]
    fn test_colors_follow_radius() {
        let mut rng = Sequence::new(&[0.0, 0.999_999]);
        let params = flat(2, 2);
        let cloud = PointCloudGenerator::new().generate(&params, &mut rng).unwrap();
        let inside = params.inside_color.to_array();
        for (c, e) in cloud.color(0).iter().zip(inside.iter()) {
            assert!((c - e).abs() < 1e-6);
        }
        let outside = params.outside_color.to_array();
        for (c, e) in cloud.color(1).iter().zip(outside.iter()) {
            assert!((c - e).abs() < 1e-4);
        }
    }

    #[test]
    fn test_material_flags() {
        let params = GalaxyParameters {
            particle_count: 3,
            particle_size: 0.02,
            ..Default::default()
        };
        let cloud = PointCloudGenerator::new()
            .generate(&params, &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(cloud.material.size, 0.02);
        assert!(cloud.material.additive_blending);
        assert!(cloud.material.vertex_colors);
        assert!(!cloud.material.depth_write);
    }

    #[test]
    fn test_rejects_zero_particles_without_sampling() {
        let mut rng = Sequence::new(&[0.5]);
        let err = PointCloudGenerator::new()
            .generate(&flat(0, 3), &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            GalaxyError::ParameterValidation {
                field: ParameterField::ParticleCount,
                ..
            }
        ));
        assert_eq!(rng.cursor, 0);
    }

    #[test]
    fn test_rejects_overflowing_spin() {
        let params = GalaxyParameters {
            particle_count: 100,
            spin: 1e38,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let err = PointCloudGenerator::new().generate(&params, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            GalaxyError::ParameterValidation {
                field: ParameterField::Spin,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_huge_radius_and_randomness() {
        let params = GalaxyParameters {
            particle_count: 100,
            radius: 1e20,
            randomness: 1e20,
            ..Default::default()
        };
        let mut rng = Sequence::new(&[0.5]);
        let err = PointCloudGenerator::new().generate(&params, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            GalaxyError::ParameterValidation {
                field: ParameterField::Radius,
                ..
            }
        ));
        assert_eq!(rng.cursor, 0);
    }

    #[test]
    fn test_fixed_seed_policy_is_reproducible() {
        let params = GalaxyParameters {
            particle_count: 500,
            ..Default::default()
        };
        let policy = SeedPolicy::Fixed(42);
        let generator = PointCloudGenerator::new();
        let a = generator.generate(&params, &mut policy.rng()).unwrap();
        let b = generator.generate(&params, &mut policy.rng()).unwrap();
        assert_eq!(a, b);

        let c = generator
            .generate(&params, &mut SeedPolicy::Entropy.rng())
            .unwrap();
        assert_eq!(c.positions.len(), a.positions.len());
        assert_ne!(c.positions, a.positions);
    }
}
