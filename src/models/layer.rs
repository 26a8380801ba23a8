//! # 多孔层数据模型
//!
//! 一个多孔层由厚度、孔隙率、固体折射率和孔隙填充物折射率描述，
//! 其有效折射率在构造时由有效介质混合器计算。
//!
//! ## 依赖关系
//! - 被 `models/stack.rs`, `optics/builder.rs`, `optics/structure.rs` 使用
//! - 使用 `optics/mixing.rs` 计算有效折射率

use crate::error::{DbrError, Result};
use crate::models::index::MaterialIndex;
use crate::optics::mixing::{mix_with, MixingRule};

/// 多孔层
#[derive(Debug, Clone, PartialEq)]
pub struct PorousLayer {
    /// 厚度 (nm)
    thickness: f64,
    /// 孔隙率 [0, 1]
    porosity: f64,
    /// 固体材料折射率
    solid_index: MaterialIndex,
    /// 孔隙填充物折射率
    pore_index: MaterialIndex,
    /// 有效折射率（派生）
    effective_index: MaterialIndex,
}

impl PorousLayer {
    /// 使用线性混合律创建多孔层
    pub fn new(
        thickness: f64,
        porosity: f64,
        solid_index: MaterialIndex,
        pore_index: MaterialIndex,
    ) -> Result<Self> {
        Self::with_rule(
            thickness,
            porosity,
            solid_index,
            pore_index,
            MixingRule::default(),
        )
    }

    /// 使用指定混合律创建多孔层
    pub fn with_rule(
        thickness: f64,
        porosity: f64,
        solid_index: MaterialIndex,
        pore_index: MaterialIndex,
        rule: MixingRule,
    ) -> Result<Self> {
        validate_thickness(thickness)?;
        let effective_index = mix_with(rule, solid_index, pore_index, porosity)?;

        Ok(PorousLayer {
            thickness,
            porosity,
            solid_index,
            pore_index,
            effective_index,
        })
    }

    /// 无孔（致密）层，孔隙率为 0
    pub fn solid(thickness: f64, index: MaterialIndex) -> Result<Self> {
        Self::new(thickness, 0.0, index, index)
    }

    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    pub fn porosity(&self) -> f64 {
        self.porosity
    }

    pub fn solid_index(&self) -> MaterialIndex {
        self.solid_index
    }

    pub fn pore_index(&self) -> MaterialIndex {
        self.pore_index
    }

    pub fn effective_index(&self) -> MaterialIndex {
        self.effective_index
    }
}

/// 厚度必须为有限正数
pub fn validate_thickness(thickness: f64) -> Result<()> {
    if !thickness.is_finite() || thickness <= 0.0 {
        return Err(DbrError::invalid(format!(
            "layer thickness must be a positive number of nm, got {}",
            thickness
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::index::real_index;

    #[test]
    fn test_effective_index_is_derived() {
        let layer = PorousLayer::new(60.0, 0.5, real_index(2.4), real_index(1.0)).unwrap();
        assert!((layer.effective_index().re - 1.7).abs() < 1e-12);
        assert_eq!(layer.thickness(), 60.0);
        assert_eq!(layer.porosity(), 0.5);
    }

    #[test]
    fn test_solid_layer_keeps_index() {
        let layer = PorousLayer::solid(3400.0, real_index(2.38)).unwrap();
        assert_eq!(layer.effective_index(), real_index(2.38));
    }

    #[test]
    fn test_rejects_bad_thickness() {
        for t in [0.0, -5.0, f64::INFINITY, f64::NAN] {
            let err = PorousLayer::new(t, 0.2, real_index(2.4), real_index(1.0));
            assert!(matches!(err, Err(DbrError::InvalidParameter(_))));
        }
    }

    #[test]
    fn test_rejects_bad_porosity() {
        let err = PorousLayer::new(60.0, 1.2, real_index(2.4), real_index(1.0));
        assert!(matches!(err, Err(DbrError::InvalidParameter(_))));
    }
}
