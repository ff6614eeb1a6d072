//! 核心宏定义
//!
//! 配置结构体的默认值集中在一处声明

/// 为结构体实现Default trait的宏
///
/// 使用示例:
/// ```rust
/// use galaxy_generator::impl_default;
///
/// struct Viewport {
///     width: u32,
///     title: String,
/// }
///
/// impl_default!(Viewport {
///     width: 1280,
///     title: String::from("galaxy"),
/// });
///
/// assert_eq!(Viewport::default().width, 1280);
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    struct Limits {
        min: f32,
        max: f32,
        label: String,
    }

    impl_default!(Limits {
        min: 1.0,
        max: 10.0,
        label: "radius".to_string(),
    });

    #[test]
    fn test_impl_default() {
        let limits = Limits::default();
        assert_eq!(limits.min, 1.0);
        assert_eq!(limits.max, 10.0);
        assert_eq!(limits.label, "radius");
    }
}
