//! # 有效介质混合器
//!
//! 由固体折射率、孔隙填充物折射率与孔隙率计算多孔层的有效折射率。
//!
//! ## 混合律
//! - `Linear`: n = (1 − p)·n_s + p·n_p（默认）
//! - `VolumeAverage`: n = sqrt((1 − p)·n_s² + p·n_p²)，即介电常数体积平均
//! - `Bruggeman`: 对称两相 Bruggeman 有效介质近似
//! - `MaxwellGarnett`: 固体为基体、孔隙为夹杂的 Maxwell-Garnett 近似
//!
//! p = 0 时精确返回固体折射率，p = 1 时精确返回孔隙折射率。
//!
//! ## 依赖关系
//! - 被 `models/layer.rs`, `commands/mix.rs` 调用
//! - 使用 `models/index.rs` 校验折射率

use crate::error::{DbrError, Result};
use crate::models::index::{validate_index, MaterialIndex};

use clap::ValueEnum;
use num_complex::Complex64;

/// 有效介质混合律
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum MixingRule {
    /// Linear volume-weighted average of refractive indices
    #[default]
    Linear,
    /// Volume-weighted average of permittivities (n²)
    VolumeAverage,
    /// Symmetric Bruggeman effective-medium approximation
    Bruggeman,
    /// Maxwell-Garnett with solid host and pore inclusions
    MaxwellGarnett,
}

impl std::fmt::Display for MixingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MixingRule::Linear => write!(f, "linear"),
            MixingRule::VolumeAverage => write!(f, "volume-average"),
            MixingRule::Bruggeman => write!(f, "bruggeman"),
            MixingRule::MaxwellGarnett => write!(f, "maxwell-garnett"),
        }
    }
}

/// 使用线性混合律计算有效折射率
pub fn mix(
    solid_index: MaterialIndex,
    pore_index: MaterialIndex,
    porosity: f64,
) -> Result<MaterialIndex> {
    mix_with(MixingRule::Linear, solid_index, pore_index, porosity)
}

/// 使用指定混合律计算有效折射率
pub fn mix_with(
    rule: MixingRule,
    solid_index: MaterialIndex,
    pore_index: MaterialIndex,
    porosity: f64,
) -> Result<MaterialIndex> {
    validate_porosity(porosity)?;
    validate_index("solid", solid_index)?;
    validate_index("pore", pore_index)?;

    // 端点精确返回
    if porosity == 0.0 {
        return Ok(solid_index);
    }
    if porosity == 1.0 {
        return Ok(pore_index);
    }

    let fill = 1.0 - porosity;

    let effective = match rule {
        MixingRule::Linear => solid_index * fill + pore_index * porosity,
        MixingRule::VolumeAverage => {
            let eps = solid_index * solid_index * fill + pore_index * pore_index * porosity;
            eps.sqrt()
        }
        MixingRule::Bruggeman => {
            bruggeman(solid_index * solid_index, pore_index * pore_index, fill).sqrt()
        }
        MixingRule::MaxwellGarnett => {
            maxwell_garnett(solid_index * solid_index, pore_index * pore_index, porosity).sqrt()
        }
    };

    Ok(effective)
}

/// 孔隙率必须在 [0, 1] 内
pub fn validate_porosity(porosity: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&porosity) {
        return Err(DbrError::invalid(format!(
            "porosity must be within [0, 1], got {}",
            porosity
        )));
    }
    Ok(())
}

/// 两相 Bruggeman 方程的物理根
///
/// f·(ε_a − ε)/(ε_a + 2ε) + (1 − f)·(ε_b − ε)/(ε_b + 2ε) = 0
/// 整理为 2ε² − βε − ε_a·ε_b = 0。
fn bruggeman(eps_a: Complex64, eps_b: Complex64, fraction_a: f64) -> Complex64 {
    let fraction_b = 1.0 - fraction_a;
    let beta = eps_a * (3.0 * fraction_a - 1.0) + eps_b * (3.0 * fraction_b - 1.0);
    let disc = (beta * beta + eps_a * eps_b * 8.0).sqrt();

    let plus = (beta + disc) / 4.0;
    let minus = (beta - disc) / 4.0;

    // 取 Im(ε) >= 0 且 Re(ε) > 0 的根
    let physical = |e: &Complex64| e.im >= -1e-12 && e.re > 0.0;
    if physical(&plus) {
        plus
    } else if physical(&minus) {
        minus
    } else if plus.im >= minus.im {
        plus
    } else {
        minus
    }
}

/// Maxwell-Garnett 公式（基体 ε_h，夹杂 ε_i，夹杂体积分数 f）
fn maxwell_garnett(eps_host: Complex64, eps_incl: Complex64, fraction_incl: f64) -> Complex64 {
    let diff = eps_incl - eps_host;
    let numerator = eps_incl + eps_host * 2.0 + diff * (2.0 * fraction_incl);
    let denominator = eps_incl + eps_host * 2.0 - diff * fraction_incl;
    eps_host * numerator / denominator
}
