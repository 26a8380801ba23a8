//! # DBR 叠层构建器
//!
//! 将高/低折射率多孔层交替排列 `period_count` 次，两端为入射介质与衬底。
//! 高折射率层紧邻入射介质。
//!
//! ## 依赖关系
//! - 被 `commands/stack.rs` 调用
//! - 使用 `models/stack.rs` 的 StackBuilder

use crate::error::{DbrError, Result};
use crate::models::layer::validate_thickness;
use crate::models::{MaterialIndex, PorousLayer, Stack};

/// 构建交替高/低折射率层的 DBR 叠层
pub fn build_stack(
    period_count: usize,
    high_layer: &PorousLayer,
    low_layer: &PorousLayer,
    incident_medium: MaterialIndex,
    substrate: MaterialIndex,
) -> Result<Stack> {
    if period_count < 1 {
        return Err(DbrError::invalid(format!(
            "period count must be at least 1, got {}",
            period_count
        )));
    }
    validate_thickness(high_layer.thickness())?;
    validate_thickness(low_layer.thickness())?;

    Stack::builder(incident_medium)
        .repeat(&[high_layer.clone(), low_layer.clone()], period_count)
        .finish(substrate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::index::real_index;

    fn gan_air(thickness: f64, porosity: f64) -> PorousLayer {
        PorousLayer::new(thickness, porosity, real_index(2.4), real_index(1.0)).unwrap()
    }

    #[test]
    fn test_gan_dbr_five_periods() {
        let high = gan_air(60.0, 0.2);
        let low = gan_air(80.0, 0.7);
        let stack = build_stack(5, &high, &low, real_index(1.0), real_index(2.4)).unwrap();

        let entries = stack.entries();
        assert_eq!(entries.len(), 12);
        assert_eq!(entries[0].index, real_index(1.0));
        assert_eq!(entries[11].index, real_index(2.4));

        for (i, entry) in entries[1..11].iter().enumerate() {
            if i % 2 == 0 {
                assert_eq!(entry.thickness, 60.0);
                assert!((entry.index.re - 2.12).abs() < 1e-12);
            } else {
                assert_eq!(entry.thickness, 80.0);
                assert!((entry.index.re - 1.42).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_length_scales_with_period_count() {
        let high = gan_air(60.0, 0.2);
        let low = gan_air(80.0, 0.7);
        for n in 1..8 {
            let stack = build_stack(n, &high, &low, real_index(1.0), real_index(1.76)).unwrap();
            assert_eq!(stack.entries().len(), 2 * n + 2);
            assert_eq!(stack.layers()[0], high);
        }
    }

    #[test]
    fn test_zero_periods_rejected() {
        let high = gan_air(60.0, 0.2);
        let low = gan_air(80.0, 0.7);
        let err = build_stack(0, &high, &low, real_index(1.0), real_index(2.4));
        assert!(matches!(err, Err(DbrError::InvalidParameter(_))));
    }
}
