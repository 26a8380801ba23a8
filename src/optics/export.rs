//! # 数据导出
//!
//! 导出模拟反射谱、差值曲线和叠层描述到 CSV。
//!
//! ## 模拟结果 CSV 格式
//! ```text
//! TMM Simulation result
//! ,<label> <porosity> % <period> nm <ratio> Ratio
//! <pairs> pair DBR
//! <porous> nm porous layer
//! <solid> nm non-porous layer
//! <porosity> % Porosity
//!
//! Wavelength,Reflectance
//! nm,
//! <λ>,<R>
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/simulate.rs`, `commands/stack.rs` 调用
//! - 使用 `csv` + `serde` 写入数据

use crate::error::{DbrError, Result};
use crate::models::Stack;
use crate::optics::curve::ReflectivityCurve;
use crate::optics::structure::{DbrStructure, SimulationResult};

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// 叠层 CSV 行
#[derive(Debug, Serialize)]
struct StackRow {
    position: usize,
    role: &'static str,
    thickness_nm: f64,
    porosity: Option<f64>,
    n: f64,
    k: f64,
    solid_n: Option<f64>,
    pore_n: Option<f64>,
}

/// 模拟结果默认文件名
pub fn default_file_name(structure: &DbrStructure) -> String {
    format!(
        "TMM_{}_{}Pr_{}nm_{}-{}_{}Pc.csv",
        structure.label,
        structure.pairs,
        structure.period_nm.trunc() as i64,
        structure.porous_thickness().trunc() as i64,
        structure.solid_thickness().trunc() as i64,
        percent(structure.porosity),
    )
}

/// 孔隙率百分数，截断取整（文件名与表头一致）
fn percent(porosity: f64) -> i64 {
    (porosity * 100.0).trunc() as i64
}

/// 导出单个模拟结果
pub fn write_simulation_csv(result: &SimulationResult, output_path: &Path) -> Result<()> {
    let write_err = |e: std::io::Error| DbrError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    };

    let file = File::create(output_path).map_err(write_err)?;
    let mut out = BufWriter::new(file);
    let s = &result.structure;

    writeln!(out, "TMM Simulation result").map_err(write_err)?;
    writeln!(
        out,
        ",{} {} % {:.2} nm {:.3} Ratio",
        s.label,
        percent(s.porosity),
        s.period_nm,
        s.thickness_ratio
    )
    .map_err(write_err)?;
    writeln!(out, "{} pair DBR", s.pairs).map_err(write_err)?;
    if let Some(top) = &result.top {
        writeln!(
            out,
            "{} pair top DBR at {} % Porosity",
            top.pairs,
            percent(top.porosity)
        )
        .map_err(write_err)?;
    }
    writeln!(out, "{:.2} nm porous layer", s.porous_thickness()).map_err(write_err)?;
    writeln!(out, "{:.2} nm non-porous layer", s.solid_thickness()).map_err(write_err)?;
    writeln!(out, "{} % Porosity", percent(s.porosity)).map_err(write_err)?;
    writeln!(out).map_err(write_err)?;
    writeln!(out, "Wavelength,Reflectance").map_err(write_err)?;
    writeln!(out, "nm,").map_err(write_err)?;

    write_points(&mut out, &result.curve)?;
    out.flush().map_err(write_err)?;

    Ok(())
}

/// 导出一条曲线（两列：波长, 数值）
pub fn write_curve_csv(curve: &ReflectivityCurve, column: &str, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    wtr.write_record(["wavelength_nm", column])?;
    for (w, r) in curve.points() {
        wtr.write_record(&[format!("{:.4}", w), format!("{:.6}", r)])?;
    }
    wtr.flush().map_err(|e| DbrError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

/// 导出叠层描述
pub fn write_stack_csv(stack: &Stack, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    let layers = stack.layers();

    for (position, entry) in stack.entries().iter().enumerate() {
        let layer = if entry.is_boundary() {
            None
        } else {
            layers.get(position - 1)
        };
        let role = match (position, layer) {
            (0, _) => "incident",
            (_, Some(_)) => "layer",
            (_, None) => "substrate",
        };
        wtr.serialize(StackRow {
            position,
            role,
            thickness_nm: entry.thickness,
            porosity: layer.map(|l| l.porosity()),
            n: entry.index.re,
            k: entry.index.im,
            solid_n: layer.map(|l| l.solid_index().re),
            pore_n: layer.map(|l| l.pore_index().re),
        })?;
    }

    wtr.flush().map_err(|e| DbrError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

fn write_points<W: Write>(out: W, curve: &ReflectivityCurve) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    for (w, r) in curve.points() {
        wtr.write_record(&[format!("{:.4}", w), format!("{:.6}", r)])?;
    }
    wtr.flush().map_err(|e| DbrError::Other(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::index::real_index;
    use crate::models::PorousLayer;
    use crate::optics::builder::build_stack;
    use crate::optics::curve::ReflectivityCurve;
    use std::fs;

    fn result() -> SimulationResult {
        let structure = DbrStructure::new("All_45", 97.3, 0.345, 0.4, 12).unwrap();
        SimulationResult {
            structure,
            top: None,
            curve: ReflectivityCurve::new(vec![400.0, 401.0], vec![0.25, 0.5]).unwrap(),
        }
    }

    #[test]
    fn test_default_file_name() {
        let r = result();
        assert_eq!(
            default_file_name(&r.structure),
            "TMM_All_45_12Pr_97nm_33-63_40Pc.csv"
        );
    }

    #[test]
    fn test_write_simulation_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_simulation_csv(&result(), &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "TMM Simulation result");
        assert_eq!(lines[1], ",All_45 40 % 97.30 nm 0.345 Ratio");
        assert_eq!(lines[2], "12 pair DBR");
        assert_eq!(lines[7], "Wavelength,Reflectance");
        assert_eq!(lines[8], "nm,");
        assert_eq!(lines[9], "400.0000,0.250000");
        assert_eq!(lines[10], "401.0000,0.500000");
    }

    #[test]
    fn test_write_stack_csv() {
        let high = PorousLayer::new(60.0, 0.2, real_index(2.4), real_index(1.0)).unwrap();
        let low = PorousLayer::new(80.0, 0.7, real_index(2.4), real_index(1.0)).unwrap();
        let stack = build_stack(2, &high, &low, real_index(1.0), real_index(2.4)).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stack.csv");
        write_stack_csv(&stack, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 6);
        assert_eq!(&rows[0][1], "incident");
        assert_eq!(&rows[1][2], "60.0");
        assert_eq!(&rows[5][1], "substrate");
        assert_eq!(&rows[5][0], "5");
        assert_eq!(&rows[1][6], "2.4");
        assert_eq!(&rows[1][7], "1.0");
        assert_eq!(&rows[0][6], "");
    }

    #[test]
    fn test_porosity_percent_truncates_everywhere() {
        let structure = DbrStructure::new("P", 97.3, 0.345, 0.295, 12).unwrap();
        let top = DbrStructure::new("P_top", 97.3, 0.345, 0.659, 5).unwrap();
        assert_eq!(
            default_file_name(&structure),
            "TMM_P_12Pr_97nm_33-63_29Pc.csv"
        );

        let r = SimulationResult {
            structure,
            top: Some(top),
            curve: ReflectivityCurve::new(vec![400.0], vec![0.5]).unwrap(),
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.csv");
        write_simulation_csv(&r, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], ",P 29 % 97.30 nm 0.345 Ratio");
        assert_eq!(lines[3], "5 pair top DBR at 65 % Porosity");
        assert_eq!(lines[6], "29 % Porosity");
    }

    #[test]
    fn test_write_curve_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diff.csv");
        write_curve_csv(&result().curve, "delta_R", &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("wavelength_nm,delta_R\n"));
    }
}
