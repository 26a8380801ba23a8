//! # 反射谱
//!
//! 反射率-波长曲线及其常用分析：峰值、阻带、差值。
//!
//! ## 依赖关系
//! - 由 `optics/tmm.rs` 求解器产生
//! - 被 `optics/export.rs`, `optics/plot.rs`, `commands/simulate.rs` 使用

use crate::error::{DbrError, Result};

/// 波长网格（等间距）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavelengthGrid {
    /// 起始波长 (nm)
    pub start: f64,
    /// 终止波长 (nm)
    pub end: f64,
    /// 点数
    pub points: usize,
}

impl WavelengthGrid {
    /// 创建 [start, end] 上 `points` 个等间距点
    pub fn linspace(start: f64, end: f64, points: usize) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() || start <= 0.0 || end <= start {
            return Err(DbrError::InvalidRange(format!(
                "{}-{} nm (must be 0 < start < end)",
                start, end
            )));
        }
        if points < 2 {
            return Err(DbrError::invalid(format!(
                "wavelength grid needs at least 2 points, got {}",
                points
            )));
        }
        Ok(Self { start, end, points })
    }

    /// 限制在 [min, max] 内，保持点密度
    pub fn clamp_to(&self, min: f64, max: f64) -> Result<Self> {
        let start = self.start.max(min);
        let end = self.end.min(max);
        if end <= start {
            return Err(DbrError::InvalidRange(format!(
                "{}-{} nm does not overlap the available data {}-{} nm",
                self.start, self.end, min, max
            )));
        }
        let density = (self.points - 1) as f64 / (self.end - self.start);
        let points = ((end - start) * density).round() as usize + 1;
        Self::linspace(start, end, points.max(2))
    }

    /// 生成波长序列
    pub fn values(&self) -> Vec<f64> {
        let step = (self.end - self.start) / (self.points - 1) as f64;
        (0..self.points)
            .map(|i| {
                if i == self.points - 1 {
                    self.end
                } else {
                    self.start + step * i as f64
                }
            })
            .collect()
    }
}

impl Default for WavelengthGrid {
    fn default() -> Self {
        Self {
            start: 200.0,
            end: 1000.0,
            points: 800,
        }
    }
}

/// 反射率-波长曲线
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectivityCurve {
    wavelengths: Vec<f64>,
    reflectance: Vec<f64>,
}

/// 阻带
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopBand {
    /// 短波边 (nm)
    pub lower: f64,
    /// 长波边 (nm)
    pub upper: f64,
}

impl StopBand {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn center(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }
}

impl ReflectivityCurve {
    pub fn new(wavelengths: Vec<f64>, reflectance: Vec<f64>) -> Result<Self> {
        if wavelengths.len() != reflectance.len() {
            return Err(DbrError::invalid(format!(
                "curve has {} wavelengths but {} reflectance values",
                wavelengths.len(),
                reflectance.len()
            )));
        }
        Ok(Self {
            wavelengths,
            reflectance,
        })
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn reflectance(&self) -> &[f64] {
        &self.reflectance
    }

    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    /// (波长, 反射率) 点列
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.wavelengths
            .iter()
            .copied()
            .zip(self.reflectance.iter().copied())
    }

    /// 最大反射率及其波长
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.points()
            .fold(None, |best: Option<(f64, f64)>, (w, r)| match best {
                Some((_, br)) if br >= r => best,
                _ => Some((w, r)),
            })
    }

    /// 峰值附近反射率不低于 `threshold` 的连续区间
    pub fn stop_band(&self, threshold: f64) -> Option<StopBand> {
        let peak_idx = self
            .reflectance
            .iter()
            .enumerate()
            .fold(None, |best: Option<usize>, (i, &r)| match best {
                Some(b) if self.reflectance[b] >= r => best,
                _ => Some(i),
            })?;

        if self.reflectance[peak_idx] < threshold {
            return None;
        }

        let mut lo = peak_idx;
        while lo > 0 && self.reflectance[lo - 1] >= threshold {
            lo -= 1;
        }
        let mut hi = peak_idx;
        while hi + 1 < self.len() && self.reflectance[hi + 1] >= threshold {
            hi += 1;
        }

        Some(StopBand {
            lower: self.wavelengths[lo],
            upper: self.wavelengths[hi],
        })
    }

    /// 逐点差值 self − other（波长网格必须一致）
    pub fn difference(&self, other: &ReflectivityCurve) -> Result<ReflectivityCurve> {
        let same_grid = self.len() == other.len()
            && self
                .wavelengths
                .iter()
                .zip(&other.wavelengths)
                .all(|(a, b)| (a - b).abs() < 1e-9);
        if !same_grid {
            return Err(DbrError::invalid(
                "curves must share the same wavelength grid to be subtracted",
            ));
        }

        let reflectance = self
            .reflectance
            .iter()
            .zip(&other.reflectance)
            .map(|(a, b)| a - b)
            .collect();

        Self::new(self.wavelengths.clone(), reflectance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> ReflectivityCurve {
        ReflectivityCurve::new(
            vec![400.0, 410.0, 420.0, 430.0, 440.0, 450.0],
            vec![0.1, 0.6, 0.9, 0.95, 0.7, 0.2],
        )
        .unwrap()
    }

    #[test]
    fn test_linspace_endpoints() {
        let grid = WavelengthGrid::linspace(200.0, 1000.0, 800).unwrap();
        let values = grid.values();
        assert_eq!(values.len(), 800);
        assert_eq!(values[0], 200.0);
        assert_eq!(values[799], 1000.0);
        assert!(values.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_linspace_rejects_bad_input() {
        assert!(WavelengthGrid::linspace(500.0, 400.0, 10).is_err());
        assert!(WavelengthGrid::linspace(0.0, 400.0, 10).is_err());
        assert!(WavelengthGrid::linspace(200.0, 400.0, 1).is_err());
    }

    #[test]
    fn test_clamp_keeps_density() {
        let grid = WavelengthGrid::linspace(200.0, 1000.0, 801).unwrap();
        let clamped = grid.clamp_to(350.0, 1500.0).unwrap();
        assert_eq!(clamped.start, 350.0);
        assert_eq!(clamped.end, 1000.0);
        assert_eq!(clamped.points, 651);
        assert!(grid.clamp_to(1200.0, 1500.0).is_err());
    }

    #[test]
    fn test_peak_and_stop_band() {
        let c = curve();
        assert_eq!(c.peak(), Some((430.0, 0.95)));
        let band = c.stop_band(0.5).unwrap();
        assert_eq!(band.lower, 410.0);
        assert_eq!(band.upper, 440.0);
        assert_eq!(band.width(), 30.0);
        assert!(c.stop_band(0.99).is_none());
    }

    #[test]
    fn test_difference() {
        let a = curve();
        let b = ReflectivityCurve::new(a.wavelengths().to_vec(), vec![0.1; 6]).unwrap();
        let d = a.difference(&b).unwrap();
        assert!((d.reflectance()[3] - 0.85).abs() < 1e-12);

        let other_grid = ReflectivityCurve::new(vec![1.0, 2.0], vec![0.0, 0.0]).unwrap();
        assert!(matches!(
            a.difference(&other_grid),
            Err(DbrError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        assert!(ReflectivityCurve::new(vec![1.0, 2.0], vec![0.5]).is_err());
    }
}
