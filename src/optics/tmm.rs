//! # 传输矩阵法反射率求解器
//!
//! 反射率计算通过 `ReflectivitySolver` trait 抽象，任何满足该接口的求解器都可替换，
//! 混合器和叠层构建器不受影响。
//!
//! ## 算法概述 (CoherentTmm)
//! 1. 由复 Snell 定律求每层的 cos θ，选择前向传播分支
//! 2. 计算各界面的 Fresnel 系数 r, t
//! 3. 计算各内部层的相位厚度 δ = 2π n d cos θ / λ
//! 4. 级联 2×2 特征矩阵，得到整体 r, t
//! 5. R = |r|²，T = |t|² 按入射/出射介质的功率通量比修正
//!
//! ## 参考
//! - S. J. Byrnes, "Multilayer optical calculations", arXiv:1603.02720
//!
//! ## 依赖关系
//! - 被 `optics/structure.rs`, `commands/stack.rs` 调用
//! - 使用 `models/stack.rs` 的 Stack
//! - 使用 `optics/curve.rs` 的 ReflectivityCurve

use crate::error::{DbrError, Result};
use crate::models::Stack;
use crate::optics::curve::ReflectivityCurve;

use clap::ValueEnum;
use num_complex::Complex64;
use std::f64::consts::PI;

/// 强吸收层的相位虚部上限，避免矩阵元素溢出
const MAX_PHASE_IMAG: f64 = 35.0;

/// 复数判零容差
const EPS: f64 = 1e-12;

type Matrix2 = [[Complex64; 2]; 2];

/// 偏振方向
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum Polarization {
    /// s (TE) polarization
    #[default]
    S,
    /// p (TM) polarization
    P,
}

impl std::fmt::Display for Polarization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Polarization::S => write!(f, "s"),
            Polarization::P => write!(f, "p"),
        }
    }
}

/// 反射率求解器接口
pub trait ReflectivitySolver: Send + Sync {
    /// 单一波长 (nm) 下的反射率
    fn reflectance(&self, stack: &Stack, wavelength_nm: f64) -> Result<f64>;

    /// 在一组波长上求解反射谱
    fn solve(&self, stack: &Stack, wavelengths: &[f64]) -> Result<ReflectivityCurve> {
        let reflectance = wavelengths
            .iter()
            .map(|&w| self.reflectance(stack, w))
            .collect::<Result<Vec<_>>>()?;
        ReflectivityCurve::new(wavelengths.to_vec(), reflectance)
    }
}

/// 单一波长下的求解结果
#[derive(Debug, Clone, Copy)]
pub struct TmmResult {
    /// 反射率
    pub reflectance: f64,
    /// 透射率
    pub transmittance: f64,
}

/// 相干传输矩阵法
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoherentTmm {
    polarization: Polarization,
    /// 入射角（度）
    angle_deg: f64,
}

impl Default for CoherentTmm {
    fn default() -> Self {
        Self::normal_incidence()
    }
}

impl CoherentTmm {
    /// 正入射（s 与 p 等价）
    pub fn normal_incidence() -> Self {
        Self {
            polarization: Polarization::S,
            angle_deg: 0.0,
        }
    }

    /// 指定偏振和入射角
    pub fn new(polarization: Polarization, angle_deg: f64) -> Result<Self> {
        if !(0.0..90.0).contains(&angle_deg) {
            return Err(DbrError::invalid(format!(
                "angle of incidence must be within [0, 90) degrees, got {}",
                angle_deg
            )));
        }
        Ok(Self {
            polarization,
            angle_deg,
        })
    }

    /// 计算 r, t, R, T
    pub fn evaluate(&self, stack: &Stack, wavelength_nm: f64) -> Result<TmmResult> {
        if !wavelength_nm.is_finite() || wavelength_nm <= 0.0 {
            return Err(DbrError::invalid(format!(
                "wavelength must be a positive number of nm, got {}",
                wavelength_nm
            )));
        }

        let entries = stack.entries();
        let n: Vec<Complex64> = entries.iter().map(|e| e.index).collect();
        let last = n.len() - 1;

        if self.angle_deg != 0.0 && n[0].im.abs() > EPS {
            return Err(DbrError::invalid(
                "oblique incidence requires a non-absorbing incident medium",
            ));
        }

        // n_i sin θ_i 守恒
        let sin0 = Complex64::new(self.angle_deg.to_radians().sin(), 0.0);
        let kx = n[0] * sin0;
        let cos: Vec<Complex64> = n.iter().map(|&ni| forward_cos(ni, kx)).collect();

        let k0 = 2.0 * PI / wavelength_nm;
        let i = Complex64::new(0.0, 1.0);

        let (r01, t01) = self.fresnel(n[0], n[1], cos[0], cos[1]);
        let mut m: Matrix2 = [
            [Complex64::new(1.0, 0.0) / t01, r01 / t01],
            [r01 / t01, Complex64::new(1.0, 0.0) / t01],
        ];

        for layer in 1..last {
            let mut delta = n[layer] * cos[layer] * (k0 * entries[layer].thickness);
            if delta.im > MAX_PHASE_IMAG {
                delta = Complex64::new(delta.re, MAX_PHASE_IMAG);
            }

            let (r, t) = self.fresnel(n[layer], n[layer + 1], cos[layer], cos[layer + 1]);
            let back = (-i * delta).exp();
            let fwd = (i * delta).exp();

            let propagate: Matrix2 = [
                [back / t, back * r / t],
                [fwd * r / t, fwd / t],
            ];
            m = mat_mul(&m, &propagate);
        }

        let r = m[1][0] / m[0][0];
        let t = Complex64::new(1.0, 0.0) / m[0][0];

        let reflectance = r.norm_sqr();
        let transmittance = match self.polarization {
            Polarization::S => {
                t.norm_sqr() * (n[last] * cos[last]).re / (n[0] * cos[0]).re
            }
            Polarization::P => {
                t.norm_sqr() * (n[last] * cos[last].conj()).re / (n[0] * cos[0].conj()).re
            }
        };

        Ok(TmmResult {
            reflectance,
            transmittance,
        })
    }

    /// 界面 Fresnel 系数 (r, t)
    fn fresnel(
        &self,
        n_i: Complex64,
        n_j: Complex64,
        cos_i: Complex64,
        cos_j: Complex64,
    ) -> (Complex64, Complex64) {
        match self.polarization {
            Polarization::S => {
                let denom = n_i * cos_i + n_j * cos_j;
                ((n_i * cos_i - n_j * cos_j) / denom, n_i * cos_i * 2.0 / denom)
            }
            Polarization::P => {
                let denom = n_j * cos_i + n_i * cos_j;
                ((n_j * cos_i - n_i * cos_j) / denom, n_i * cos_i * 2.0 / denom)
            }
        }
    }
}

impl ReflectivitySolver for CoherentTmm {
    fn reflectance(&self, stack: &Stack, wavelength_nm: f64) -> Result<f64> {
        Ok(self.evaluate(stack, wavelength_nm)?.reflectance)
    }
}

/// 前向传播分支的 cos θ
fn forward_cos(n: Complex64, kx: Complex64) -> Complex64 {
    let sin = kx / n;
    let cos = (Complex64::new(1.0, 0.0) - sin * sin).sqrt();
    let ncos = n * cos;

    let forward = if ncos.im.abs() > EPS * 100.0 {
        ncos.im > 0.0
    } else {
        ncos.re > 0.0
    };

    if forward {
        cos
    } else {
        -cos
    }
}

/// 2×2 复矩阵乘法
fn mat_mul(a: &Matrix2, b: &Matrix2) -> Matrix2 {
    [
        [
            a[0][0] * b[0][0] + a[0][1] * b[1][0],
            a[0][0] * b[0][1] + a[0][1] * b[1][1],
        ],
        [
            a[1][0] * b[0][0] + a[1][1] * b[1][0],
            a[1][0] * b[0][1] + a[1][1] * b[1][1],
        ],
    ]
}
