//! 星系生成属性测试
//!
//! 使用proptest在整个参数约束范围内验证生成器的不变量

#[cfg(test)]
mod tests {
    use crate::galaxy::color::Rgb;
    use crate::galaxy::generator::{branch_index, PointCloudGenerator, RandomSource, SeedPolicy};
    use crate::galaxy::params::GalaxyParameters;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f32::consts::TAU;

    /// 半径采样避开 0，保证每个粒子的方向都可以还原
    struct OffCenter(StdRng);

    impl RandomSource for OffCenter {
        fn next_unit(&mut self) -> f32 {
            self.0.gen::<f32>().max(1e-3)
        }
    }

    /// 由无噪声粒子的位置反推所在旋臂
    fn branch_of(x: f32, z: f32, branches: u32) -> u32 {
        let angle = x.atan2(z).rem_euclid(TAU);
        (angle / (TAU / branches as f32)).round() as u32 % branches
    }

    fn unit_rgb() -> impl Strategy<Value = Rgb> {
        (0.0f32..=1.0, 0.0f32..=1.0, 0.0f32..=1.0).prop_map(|(r, g, b)| Rgb::new(r, g, b))
    }

    // 粒子数上限压低以保持测试速度，其余字段覆盖完整约束
    fn valid_params() -> impl Strategy<Value = GalaxyParameters> {
        (
            1u32..2_000,
            2u32..=8,
            1.0f32..=10.0,
            0.0f32..=std::f32::consts::PI,
            0.0f32..=0.5,
            1.0f32..=10.0,
            0.0001f32..=0.03,
            unit_rgb(),
            unit_rgb(),
        )
            .prop_map(
                |(count, branches, radius, spin, randomness, power, size, inside, outside)| {
                    GalaxyParameters {
                        particle_size: size,
                        particle_count: count,
                        radius,
                        branch_count: branches,
                        spin,
                        randomness,
                        randomness_power: power,
                        inside_color: inside,
                        outside_color: outside,
                    }
                },
            )
    }

    proptest! {
        #[test]
        fn buffers_have_three_floats_per_particle(params in valid_params(), seed in any::<u64>()) {
            let cloud = PointCloudGenerator::new()
                .generate(&params, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            prop_assert_eq!(cloud.positions.len(), params.particle_count as usize * 3);
            prop_assert_eq!(cloud.colors.len(), params.particle_count as usize * 3);
        }

        #[test]
        fn positions_are_finite(params in valid_params(), seed in any::<u64>()) {
            let cloud = PointCloudGenerator::new()
                .generate(&params, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            prop_assert!(cloud.positions.iter().all(|v| v.is_finite()));
            prop_assert!(cloud.colors.iter().all(|v| v.is_finite()));
        }

        #[test]
        fn colors_never_overshoot_endpoints(params in valid_params(), seed in any::<u64>()) {
            let cloud = PointCloudGenerator::new()
                .generate(&params, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            let inside = params.inside_color.to_array();
            let outside = params.outside_color.to_array();
            for i in 0..cloud.len() {
                let color = cloud.color(i);
                for c in 0..3 {
                    let lo = inside[c].min(outside[c]);
                    let hi = inside[c].max(outside[c]);
                    prop_assert!(color[c] >= lo && color[c] <= hi,
                        "channel {} of particle {} = {} outside [{}, {}]", c, i, color[c], lo, hi);
                }
            }
        }

        #[test]
        fn round_robin_branch_counts_are_exact(params in valid_params(), seed in any::<u64>()) {
            let params = GalaxyParameters { spin: 0.0, randomness: 0.0, ..params };
            let count = params.particle_count;
            let branches = params.branch_count;
            let cloud = PointCloudGenerator::new()
                .generate(&params, &mut OffCenter(StdRng::seed_from_u64(seed)))
                .unwrap();

            let mut per_branch = vec![0u32; branches as usize];
            for i in 0..cloud.len() {
                let [x, _, z] = cloud.position(i);
                let branch = branch_of(x, z, branches);
                prop_assert_eq!(branch, branch_index(i as u32, branches), "particle {}", i);
                per_branch[branch as usize] += 1;
            }
            for (k, n) in per_branch.iter().enumerate() {
                let k = k as u32;
                let expected = if count > k { (count - k).div_ceil(branches) } else { 0 };
                prop_assert_eq!(*n, expected, "branch {}", k);
            }
        }

        #[test]
        fn noiseless_radius_stays_within_galaxy(params in valid_params(), seed in any::<u64>()) {
            let params = GalaxyParameters { randomness: 0.0, ..params };
            let cloud = PointCloudGenerator::new()
                .generate(&params, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            for i in 0..cloud.len() {
                let [x, y, z] = cloud.position(i);
                let r = (x * x + z * z).sqrt();
                prop_assert!(r <= params.radius * (1.0 + 1e-5));
                prop_assert_eq!(y, 0.0);
            }
        }

        #[test]
        fn fixed_seed_is_bit_identical(params in valid_params(), seed in any::<u64>()) {
            let policy = SeedPolicy::Fixed(seed);
            let generator = PointCloudGenerator::new();
            let a = generator.generate(&params, &mut policy.rng()).unwrap();
            let b = generator.generate(&params, &mut policy.rng()).unwrap();
            prop_assert_eq!(a.positions, b.positions);
            prop_assert_eq!(a.colors, b.colors);
        }
    }
}
