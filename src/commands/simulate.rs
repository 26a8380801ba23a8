//! # simulate 命令实现
//!
//! 多孔 DBR 反射谱模拟。
//!
//! ## 功能
//! - 每个孔隙率生成一个结构，并行计算（rayon）
//! - 可选顶部第二段 DBR
//! - 常数或表格色散的固体折射率
//! - 输出高质量图像 (PNG/SVG) 或逐结构 CSV
//! - 可选输出相对第一个结构的反射率差值
//!
//! ## 依赖关系
//! - 使用 `cli/simulate.rs` 定义的 SimulateArgs
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `optics/` 模块进行计算、导出和绘图

use crate::batch::{BatchRunner, ProcessResult};
use crate::cli::simulate::{SimulateArgs, SimulateOutputFormat};
use crate::commands::material_indices;
use crate::error::{DbrError, Result};
use crate::models::index::real_index;
use crate::models::MaterialIndex;
use crate::optics::dispersion::{IndexModel, IndexTable};
use crate::optics::grading::GradingProfile;
use crate::optics::plot::{self, LabeledCurve};
use crate::optics::{
    export, CoherentTmm, DbrStructure, MixingRule, ReflectivityCurve, Simulation,
    SimulationResult, WavelengthGrid,
};
use crate::utils::output;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabled::{Table, Tabled};

/// 阻带阈值
const STOP_BAND_THRESHOLD: f64 = 0.5;

/// 共享模拟配置
struct SimulationConfig {
    top: Option<DbrStructure>,
    solid: IndexModel,
    pore: MaterialIndex,
    incident: MaterialIndex,
    substrate: MaterialIndex,
    rule: MixingRule,
    solver: CoherentTmm,
    grid: WavelengthGrid,
    /// CSV 模式下的输出目录
    csv_dir: Option<PathBuf>,
    overwrite: bool,
}

/// 结果汇总行
#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Structure")]
    label: String,
    #[tabled(rename = "Porosity")]
    porosity: String,
    #[tabled(rename = "Peak R")]
    peak_r: String,
    #[tabled(rename = "Peak λ (nm)")]
    peak_wavelength: String,
    #[tabled(rename = "Stop band (nm)")]
    stop_band: String,
    #[tabled(rename = "Center (nm)")]
    center: String,
}

/// 执行 simulate 命令
pub fn execute(args: SimulateArgs) -> Result<()> {
    output::print_header("Porous DBR Reflectivity Simulation");

    let (solid, pore) = material_indices(&args.material)?;

    let solid_model = match &args.index_file {
        Some(path) => {
            let table = IndexTable::from_csv(path, args.index_unit)?;
            let model = IndexModel::Tabulated(table);
            output::print_info(&format!(
                "Solid index from '{}' ({})",
                path.display(),
                model.describe()
            ));
            model
        }
        None => IndexModel::Constant(solid),
    };

    let (start, end) = parse_range(&args.range)?;
    let grid = WavelengthGrid::linspace(start, end, args.points)?;
    let solver = CoherentTmm::new(args.polarization, args.angle)?;
    let grading = GradingProfile::new(args.grades, args.grade_factor, args.grade_order)?;

    let top = build_top(&args, grading)?;
    let structures = build_structures(&args, grading)?;

    output::print_info(&format!(
        "{} structure(s), {} pairs, period {:.2} nm, ratio {:.3}, {} grades",
        structures.len(),
        args.pairs,
        args.period,
        args.ratio,
        args.grades
    ));
    if let Some(top) = &top {
        output::print_info(&format!(
            "Top DBR: {} pairs at porosity {:.3}",
            top.pairs, top.porosity
        ));
    }
    output::print_info(&format!(
        "Wavelength range: {:.1}-{:.1} nm ({} points), {}-polarized at {:.1}°, {} mixing",
        start, end, args.points, args.polarization, args.angle, args.rule
    ));

    let format = args
        .format
        .unwrap_or_else(|| guess_format_from_extension(&args.output));

    let csv_dir = if format == SimulateOutputFormat::Csv {
        fs::create_dir_all(&args.output).map_err(|e| DbrError::FileWriteError {
            path: args.output.display().to_string(),
            source: e,
        })?;
        Some(args.output.clone())
    } else {
        None
    };

    let config = Arc::new(SimulationConfig {
        top,
        solid: solid_model,
        pore,
        incident: real_index(args.incident),
        substrate: real_index(args.substrate),
        rule: args.rule,
        solver,
        grid,
        csv_dir,
        overwrite: args.overwrite,
    });

    // 并行模拟
    let runner = BatchRunner::new(args.jobs).with_progress(structures.len() > 1);
    output::print_info(&format!("Running on {} thread(s)", runner.jobs()));
    let batch = runner.run(&structures, |s| process_structure(s, &config))?;

    for (name, err) in &batch.failures {
        output::print_error(&format!("  {}: {}", name, err));
    }
    for reason in &batch.skipped {
        output::print_skip(&format!("  {}", reason));
    }
    if !batch.skipped.is_empty() {
        output::print_info("Use --overwrite to recompute skipped structures");
    }

    if batch.outputs.is_empty() {
        return if batch.failed > 0 {
            Err(DbrError::Other(format!(
                "All {} simulations failed",
                batch.failed
            )))
        } else {
            Ok(())
        };
    }

    print_summary(&batch.outputs);

    match format {
        SimulateOutputFormat::Png | SimulateOutputFormat::Svg => {
            write_plots(&args, &batch.outputs, format == SimulateOutputFormat::Svg)?;
        }
        SimulateOutputFormat::Csv => {
            if args.difference {
                write_difference_csv(&args.output, &batch.outputs)?;
            }
        }
    }

    output::print_separator();
    output::print_success(&format!(
        "Simulation complete: {}/{} success, {} skipped, {} failed",
        batch.success(),
        batch.total(),
        batch.skipped.len(),
        batch.failed
    ));

    Ok(())
}

/// 每个孔隙率一个结构
fn build_structures(args: &SimulateArgs, grading: GradingProfile) -> Result<Vec<DbrStructure>> {
    if args.porosity.is_empty() {
        return Err(DbrError::invalid("at least one porosity is required"));
    }

    args.porosity
        .iter()
        .map(|&p| {
            let label = if args.porosity.len() == 1 {
                args.label.clone()
            } else {
                format!("{}_{}", args.label, (p * 100.0).round() as i64)
            };
            Ok(
                DbrStructure::new(label, args.period, args.ratio, p, args.pairs)?
                    .with_template(args.template)?
                    .with_grading(grading),
            )
        })
        .collect()
}

/// 可选的顶部 DBR（无模板层）
fn build_top(args: &SimulateArgs, grading: GradingProfile) -> Result<Option<DbrStructure>> {
    if args.top_pairs == 0 {
        return Ok(None);
    }
    let porosity = args.top_porosity.ok_or_else(|| {
        DbrError::invalid("--top-porosity is required when --top-pairs is greater than 0")
    })?;

    let top = DbrStructure::new(
        format!("{}_top", args.label),
        args.period,
        args.ratio,
        porosity,
        args.top_pairs,
    )?
    .with_grading(grading);
    Ok(Some(top))
}

/// 模拟单个结构
fn process_structure(
    structure: &DbrStructure,
    config: &Arc<SimulationConfig>,
) -> ProcessResult<SimulationResult> {
    let csv_path = config
        .csv_dir
        .as_ref()
        .map(|dir| dir.join(export::default_file_name(structure)));

    if let Some(path) = &csv_path {
        if path.exists() && !config.overwrite {
            return ProcessResult::Skipped(format!("Output exists: {}", path.display()));
        }
    }

    match simulate_structure(structure, config, csv_path.as_deref()) {
        Ok(result) => ProcessResult::Success(result),
        Err(e) => ProcessResult::Failed(structure.label.clone(), e.to_string()),
    }
}

fn simulate_structure(
    structure: &DbrStructure,
    config: &SimulationConfig,
    csv_path: Option<&Path>,
) -> Result<SimulationResult> {
    let mut simulation = Simulation::new(structure.clone())
        .with_solid_index(config.solid.clone())
        .with_pore_index(config.pore)
        .with_incident(config.incident)
        .with_substrate(config.substrate)
        .with_rule(config.rule)
        .with_solver(config.solver);
    if let Some(top) = &config.top {
        simulation = simulation.with_top(top.clone());
    }

    let result = simulation.run(&config.grid)?;

    if let Some(path) = csv_path {
        export::write_simulation_csv(&result, path)?;
    }

    Ok(result)
}

/// 绘制反射谱（及差值谱）
fn write_plots(args: &SimulateArgs, results: &[SimulationResult], use_svg: bool) -> Result<()> {
    let x_range = match &args.plot_range {
        Some(range) => Some(parse_range(range)?),
        None => None,
    };
    let title = args
        .title
        .clone()
        .unwrap_or_else(|| "Porous DBR reflectance".to_string());

    let curves: Vec<LabeledCurve> = results
        .iter()
        .map(|r| LabeledCurve {
            label: r.label().to_string(),
            curve: &r.curve,
        })
        .collect();

    plot::generate_reflectance_plot(
        &curves,
        &args.output,
        &title,
        "Reflectance",
        x_range,
        (0.0, 1.0),
        args.width,
        args.height,
        use_svg,
    )?;
    output::print_success(&format!("Plot saved to '{}'", args.output.display()));

    if args.difference {
        let diffs = differences(results)?;
        if diffs.is_empty() {
            output::print_warning("Difference output needs at least two structures");
            return Ok(());
        }

        let diff_curves: Vec<LabeledCurve> = diffs
            .iter()
            .map(|(label, curve)| LabeledCurve {
                label: label.clone(),
                curve,
            })
            .collect();
        let diff_path = sibling_path(&args.output, "difference");
        plot::generate_reflectance_plot(
            &diff_curves,
            &diff_path,
            &format!("{} (difference)", title),
            "ΔReflectance",
            x_range,
            plot::symmetric_y_range(&diff_curves),
            args.width,
            args.height,
            use_svg,
        )?;
        output::print_success(&format!(
            "Difference plot saved to '{}'",
            diff_path.display()
        ));
    }

    Ok(())
}

/// 差值写入 CSV
fn write_difference_csv(dir: &Path, results: &[SimulationResult]) -> Result<()> {
    let diffs = differences(results)?;
    if diffs.is_empty() {
        output::print_warning("Difference output needs at least two structures");
        return Ok(());
    }
    for (label, curve) in &diffs {
        let path = dir.join(format!("{}_difference.csv", label));
        export::write_curve_csv(curve, "delta_reflectance", &path)?;
        output::print_success(&format!("Difference saved to '{}'", path.display()));
    }
    Ok(())
}

/// 各结构相对第一个结构的反射率差
fn differences(results: &[SimulationResult]) -> Result<Vec<(String, ReflectivityCurve)>> {
    let Some((reference, rest)) = results.split_first() else {
        return Ok(Vec::new());
    };
    rest.iter()
        .map(|r| {
            let label = format!("{}_minus_{}", r.label(), reference.label());
            Ok((label, r.curve.difference(&reference.curve)?))
        })
        .collect()
}

/// 打印结果汇总表
fn print_summary(results: &[SimulationResult]) {
    let rows: Vec<SummaryRow> = results.iter().map(summary_row).collect();
    output::print_header(&format!("{} Simulated Spectra", rows.len()));
    println!("{}", Table::new(&rows));
}

fn summary_row(result: &SimulationResult) -> SummaryRow {
    let (peak_wavelength, peak_r) = match result.curve.peak() {
        Some((w, r)) => (format!("{:.1}", w), format!("{:.4}", r)),
        None => ("-".to_string(), "-".to_string()),
    };
    let (stop_band, center) = match result.curve.stop_band(STOP_BAND_THRESHOLD) {
        Some(band) => (
            format!("{:.1}-{:.1} ({:.1})", band.lower, band.upper, band.width()),
            format!("{:.1}", band.center()),
        ),
        None => ("-".to_string(), "-".to_string()),
    };

    SummaryRow {
        label: result.label().to_string(),
        porosity: format!("{:.3}", result.structure.porosity),
        peak_r,
        peak_wavelength,
        stop_band,
        center,
    }
}

/// 在文件名后加后缀：out.png -> out_difference.png
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("reflectance");
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_{}.{}", stem, suffix, ext),
        None => format!("{}_{}", stem, suffix),
    };
    path.with_file_name(name)
}

/// 从文件扩展名推断输出格式
fn guess_format_from_extension(path: &Path) -> SimulateOutputFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("svg") => SimulateOutputFormat::Svg,
        Some(_) => SimulateOutputFormat::Png,
        None => SimulateOutputFormat::Csv,
    }
}

/// 解析波长范围 "min-max" (nm)
fn parse_range(range: &str) -> Result<(f64, f64)> {
    let parts: Vec<&str> = range.split('-').map(|s| s.trim()).collect();
    if parts.len() != 2 {
        return Err(DbrError::InvalidRange(range.to_string()));
    }

    let min: f64 = parts[0]
        .parse()
        .map_err(|_| DbrError::InvalidRange(range.to_string()))?;
    let max: f64 = parts[1]
        .parse()
        .map_err(|_| DbrError::InvalidRange(range.to_string()))?;

    if min <= 0.0 || max <= min {
        return Err(DbrError::InvalidRange(format!(
            "{} (must be 0 < min < max)",
            range
        )));
    }

    Ok((min, max))
}
