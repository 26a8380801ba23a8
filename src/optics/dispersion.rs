//! # 色散折射率
//!
//! 固体折射率可以是常数，也可以从 CSV 表格读取并按波长线性插值。
//!
//! ## 表格格式
//! - 第一行为表头
//! - 列：波长, n[, k]
//! - 波长单位默认为 µm（读取后转换为 nm）
//!
//! ## 依赖关系
//! - 被 `optics/structure.rs`, `commands/simulate.rs` 使用
//! - 使用 `csv` 读取数据

use crate::error::{DbrError, Result};
use crate::models::index::{complex_index, validate_index, MaterialIndex};

use clap::ValueEnum;
use std::path::Path;

/// 表格中的波长单位
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum WavelengthUnit {
    /// Micrometres
    #[default]
    Um,
    /// Nanometres
    Nm,
}

impl WavelengthUnit {
    fn to_nm(self, value: f64) -> f64 {
        match self {
            WavelengthUnit::Um => value * 1000.0,
            WavelengthUnit::Nm => value,
        }
    }
}

/// 折射率表（按波长升序）
#[derive(Debug, Clone, PartialEq)]
pub struct IndexTable {
    /// 波长 (nm)
    wavelengths: Vec<f64>,
    /// 对应折射率
    indices: Vec<MaterialIndex>,
}

impl IndexTable {
    /// 从数据点创建（至少 2 点，波长严格递增）
    pub fn new(wavelengths: Vec<f64>, indices: Vec<MaterialIndex>) -> Result<Self> {
        if wavelengths.len() != indices.len() {
            return Err(DbrError::invalid(
                "index table needs one index per wavelength",
            ));
        }
        if wavelengths.len() < 2 {
            return Err(DbrError::invalid(
                "index table needs at least two data points",
            ));
        }
        if let Some(bad) = wavelengths.iter().find(|w| !w.is_finite()) {
            return Err(DbrError::invalid(format!(
                "index table wavelengths must be finite numbers, got {}",
                bad
            )));
        }
        for pair in wavelengths.windows(2) {
            if pair[1] <= pair[0] {
                return Err(DbrError::invalid(format!(
                    "index table wavelengths must be strictly increasing ({} then {})",
                    pair[0], pair[1]
                )));
            }
        }
        for index in &indices {
            validate_index("tabulated", *index)?;
        }

        Ok(Self {
            wavelengths,
            indices,
        })
    }

    /// 从 CSV 文件读取
    pub fn from_csv(path: &Path, unit: WavelengthUnit) -> Result<Self> {
        if !path.exists() {
            return Err(DbrError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut wavelengths = Vec::new();
        let mut indices = Vec::new();

        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let parse_err = |reason: String| DbrError::ParseError {
                format: "refractive index CSV".to_string(),
                path: path.display().to_string(),
                reason: format!("row {}: {}", line + 2, reason),
            };

            let field = |i: usize| -> Result<Option<f64>> {
                match record.get(i).filter(|s| !s.is_empty()) {
                    Some(s) => s
                        .parse::<f64>()
                        .map(Some)
                        .map_err(|_| parse_err(format!("cannot parse '{}' as a number", s))),
                    None => Ok(None),
                }
            };

            let wavelength =
                field(0)?.ok_or_else(|| parse_err("missing wavelength column".to_string()))?;
            let n = field(1)?.ok_or_else(|| parse_err("missing n column".to_string()))?;
            let k = field(2)?.unwrap_or(0.0);

            wavelengths.push(unit.to_nm(wavelength));
            indices.push(complex_index(n, k));
        }

        Self::new(wavelengths, indices).map_err(|e| DbrError::ParseError {
            format: "refractive index CSV".to_string(),
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// 表格覆盖的波长范围 (nm)
    pub fn range(&self) -> (f64, f64) {
        (self.wavelengths[0], self.wavelengths[self.wavelengths.len() - 1])
    }

    /// 线性插值
    pub fn lookup(&self, wavelength_nm: f64) -> Result<MaterialIndex> {
        let (min, max) = self.range();
        if !(min..=max).contains(&wavelength_nm) {
            return Err(DbrError::invalid(format!(
                "wavelength {} nm is outside the index table range [{}, {}] nm",
                wavelength_nm, min, max
            )));
        }

        let hi = self
            .wavelengths
            .partition_point(|&w| w < wavelength_nm)
            .max(1);
        let lo = hi - 1;

        let x0 = self.wavelengths[lo];
        let x1 = self.wavelengths[hi];
        let t = (wavelength_nm - x0) / (x1 - x0);

        Ok(self.indices[lo] * (1.0 - t) + self.indices[hi] * t)
    }
}

/// 固体折射率模型
#[derive(Debug, Clone, PartialEq)]
pub enum IndexModel {
    /// 与波长无关
    Constant(MaterialIndex),
    /// 表格插值
    Tabulated(IndexTable),
}

impl IndexModel {
    /// 给定波长下的折射率
    pub fn at(&self, wavelength_nm: f64) -> Result<MaterialIndex> {
        match self {
            IndexModel::Constant(n) => Ok(*n),
            IndexModel::Tabulated(table) => table.lookup(wavelength_nm),
        }
    }

    /// 有效波长范围（常数模型无限制）
    pub fn coverage(&self) -> Option<(f64, f64)> {
        match self {
            IndexModel::Constant(_) => None,
            IndexModel::Tabulated(table) => Some(table.range()),
        }
    }

    /// 简短描述
    pub fn describe(&self) -> String {
        match self {
            IndexModel::Constant(n) => crate::models::index::format_index(*n),
            IndexModel::Tabulated(table) => {
                let (min, max) = table.range();
                format!("tabulated {:.0}-{:.0} nm", min, max)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::index::real_index;
    use std::io::Write;

    fn table() -> IndexTable {
        IndexTable::new(
            vec![400.0, 500.0, 600.0],
            vec![real_index(2.5), real_index(2.4), real_index(2.35)],
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_interpolates() {
        let t = table();
        assert_eq!(t.lookup(400.0).unwrap(), real_index(2.5));
        assert_eq!(t.lookup(600.0).unwrap(), real_index(2.35));
        assert!((t.lookup(450.0).unwrap().re - 2.45).abs() < 1e-12);
        assert!((t.lookup(550.0).unwrap().re - 2.375).abs() < 1e-12);
    }

    #[test]
    fn test_lookup_out_of_range() {
        let t = table();
        assert!(matches!(t.lookup(399.0), Err(DbrError::InvalidParameter(_))));
        assert!(t.lookup(601.0).is_err());
    }

    #[test]
    fn test_table_validation() {
        assert!(IndexTable::new(vec![400.0], vec![real_index(2.5)]).is_err());
        assert!(IndexTable::new(
            vec![500.0, 400.0],
            vec![real_index(2.5), real_index(2.4)]
        )
        .is_err());
        assert!(IndexTable::new(vec![400.0, 500.0], vec![real_index(2.5)]).is_err());
    }

    #[test]
    fn test_table_rejects_non_finite_wavelength() {
        let err = IndexTable::new(vec![f64::NAN, 500.0], vec![real_index(2.5), real_index(2.4)]);
        assert!(matches!(err, Err(DbrError::InvalidParameter(_))));
        let err = IndexTable::new(
            vec![400.0, f64::INFINITY],
            vec![real_index(2.5), real_index(2.4)],
        );
        assert!(matches!(err, Err(DbrError::InvalidParameter(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Wavelength,n").unwrap();
        writeln!(file, "nan,2.60").unwrap();
        writeln!(file, "0.50,2.42").unwrap();
        file.flush().unwrap();
        assert!(IndexTable::from_csv(file.path(), WavelengthUnit::Um).is_err());
    }

    #[test]
    fn test_from_csv_micrometres() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Wavelength, n").unwrap();
        writeln!(file, "0.35, 2.60").unwrap();
        writeln!(file, "0.45, 2.45").unwrap();
        writeln!(file, "0.65, 2.36").unwrap();
        file.flush().unwrap();

        let t = IndexTable::from_csv(file.path(), WavelengthUnit::Um).unwrap();
        assert_eq!(t.range(), (350.0, 650.0));
        assert!((t.lookup(400.0).unwrap().re - 2.525).abs() < 1e-9);
    }

    #[test]
    fn test_from_csv_with_extinction() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "wl_nm,n,k").unwrap();
        writeln!(file, "300,2.7,0.3").unwrap();
        writeln!(file, "400,2.5,0.1").unwrap();
        file.flush().unwrap();

        let t = IndexTable::from_csv(file.path(), WavelengthUnit::Nm).unwrap();
        let n = t.lookup(350.0).unwrap();
        assert!((n.re - 2.6).abs() < 1e-12);
        assert!((n.im - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_from_csv_bad_row() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Wavelength,n").unwrap();
        writeln!(file, "0.35,abc").unwrap();
        file.flush().unwrap();

        let err = IndexTable::from_csv(file.path(), WavelengthUnit::Um);
        assert!(matches!(err, Err(DbrError::ParseError { .. })));
    }

    #[test]
    fn test_constant_model() {
        let model = IndexModel::Constant(real_index(2.38));
        assert_eq!(model.at(123.0).unwrap(), real_index(2.38));
        assert!(model.coverage().is_none());
    }
}
