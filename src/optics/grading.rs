//! # 渐变界面
//!
//! 将一个多孔层拆分为若干等厚子层，孔隙率由两侧向层中心按
//! `1 + factor·j^order` 上升再对称下降，并整体缩放使平均孔隙率等于目标值。
//!
//! ## 依赖关系
//! - 被 `optics/structure.rs` 调用

use crate::error::{DbrError, Result};
use crate::optics::mixing::validate_porosity;

/// 渐变参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradingProfile {
    /// 子层数（奇数）
    pub grades: usize,
    /// 渐变幅度
    pub factor: f64,
    /// 渐变指数
    pub order: f64,
}

impl Default for GradingProfile {
    fn default() -> Self {
        Self::uniform()
    }
}

/// 渐变后的子层
#[derive(Debug, Clone, PartialEq)]
pub struct GradedLayers {
    /// 各子层孔隙率
    pub porosities: Vec<f64>,
    /// 各子层厚度 (nm)
    pub thicknesses: Vec<f64>,
}

impl GradingProfile {
    pub fn new(grades: usize, factor: f64, order: f64) -> Result<Self> {
        if grades == 0 || grades % 2 == 0 {
            return Err(DbrError::invalid(format!(
                "number of grades must be odd, got {}",
                grades
            )));
        }
        if !factor.is_finite() || !order.is_finite() {
            return Err(DbrError::invalid("grading factor and order must be finite"));
        }
        Ok(Self {
            grades,
            factor,
            order,
        })
    }

    /// 不渐变（单一子层）
    pub fn uniform() -> Self {
        Self {
            grades: 1,
            factor: 0.0,
            order: 1.0,
        }
    }

    /// 相对孔隙率分布（未归一化）
    fn weights(&self) -> Vec<f64> {
        let half = (self.grades + 1) / 2;
        let rise = (0..half).map(|j| 1.0 + self.factor * (j as f64).powf(self.order));
        let fall = (0..half - 1)
            .rev()
            .map(|j| 1.0 + self.factor * (j as f64).powf(self.order));
        rise.chain(fall).collect()
    }

    /// 对厚度为 `thickness`、平均孔隙率为 `porosity` 的多孔层做渐变
    pub fn apply(&self, thickness: f64, porosity: f64) -> Result<GradedLayers> {
        if self.grades == 0 || self.grades % 2 == 0 {
            return Err(DbrError::invalid(format!(
                "number of grades must be odd, got {}",
                self.grades
            )));
        }
        validate_porosity(porosity)?;

        let weights = self.weights();
        let sum: f64 = weights.iter().sum();
        if sum <= 0.0 || !sum.is_finite() {
            return Err(DbrError::invalid("grading profile has no positive weight"));
        }

        let scale = self.grades as f64 * porosity / sum;
        let porosities: Vec<f64> = weights.iter().map(|w| w * scale).collect();

        for p in &porosities {
            if !(0.0..=1.0).contains(p) {
                return Err(DbrError::invalid(format!(
                    "graded porosity {:.4} falls outside [0, 1]; reduce the grading factor or porosity",
                    p
                )));
            }
        }

        let thicknesses = vec![thickness / self.grades as f64; self.grades];

        Ok(GradedLayers {
            porosities,
            thicknesses,
        })
    }
}
