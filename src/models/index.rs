//! # 折射率数据模型
//!
//! 复折射率 `n + ik` 的表示、校验与格式化。
//!
//! ## 依赖关系
//! - 被 `models/layer.rs`, `optics/` 使用
//! - 使用 `num-complex` 表示复数

use crate::error::{DbrError, Result};

use num_complex::Complex64;

/// 材料折射率（实部为 n，虚部为消光系数 k）
pub type MaterialIndex = Complex64;

/// 由实数折射率创建（k = 0）
pub fn real_index(n: f64) -> MaterialIndex {
    Complex64::new(n, 0.0)
}

/// 由 n 和 k 创建
pub fn complex_index(n: f64, k: f64) -> MaterialIndex {
    Complex64::new(n, k)
}

/// 校验折射率：实部 > 0，虚部 >= 0，均为有限值
pub fn validate_index(name: &str, index: MaterialIndex) -> Result<()> {
    if !index.re.is_finite() || !index.im.is_finite() {
        return Err(DbrError::invalid(format!(
            "{} index must be finite, got {}",
            name,
            format_index(index)
        )));
    }
    if index.re <= 0.0 {
        return Err(DbrError::invalid(format!(
            "{} index must have a positive real part, got {}",
            name,
            format_index(index)
        )));
    }
    if index.im < 0.0 {
        return Err(DbrError::invalid(format!(
            "{} index must have a non-negative extinction coefficient, got {}",
            name,
            format_index(index)
        )));
    }
    Ok(())
}

/// 格式化折射率（k 为零时只显示实部）
pub fn format_index(index: MaterialIndex) -> String {
    if index.im == 0.0 {
        format!("{:.4}", index.re)
    } else {
        format!("{:.4}+{:.4}i", index.re, index.im)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_index() {
        assert!(validate_index("solid", real_index(2.4)).is_ok());
        assert!(validate_index("solid", complex_index(2.4, 0.1)).is_ok());
        assert!(validate_index("solid", real_index(0.0)).is_err());
        assert!(validate_index("solid", real_index(-1.0)).is_err());
        assert!(validate_index("solid", complex_index(2.4, -0.1)).is_err());
        assert!(validate_index("solid", real_index(f64::NAN)).is_err());
    }

    #[test]
    fn test_format_index() {
        assert_eq!(format_index(real_index(2.4)), "2.4000");
        assert_eq!(format_index(complex_index(2.4, 0.05)), "2.4000+0.0500i");
    }
}
