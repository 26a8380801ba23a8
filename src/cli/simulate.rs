//! # simulate 子命令 CLI 定义
//!
//! 多孔 DBR 反射谱模拟。每个 `--porosity` 值生成一个结构，批量并行计算。
//!
//! 默认值对应 97.3 nm 周期、34.5% 多孔层厚度比、12 对、3400 nm GaN 模板、
//! 蓝宝石衬底、11 层渐变界面的 GaN/空气 DBR。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/simulate.rs`

use crate::cli::MaterialArgs;
use crate::optics::dispersion::WavelengthUnit;
use crate::optics::{MixingRule, Polarization};

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 模拟输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SimulateOutputFormat {
    /// PNG image
    Png,
    /// SVG vector image
    Svg,
    /// One CSV file per structure
    Csv,
}

/// simulate 子命令参数
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Label prefix for the simulated structures
    #[arg(short, long, default_value = "DBR")]
    pub label: String,

    /// DBR period thickness in nm
    #[arg(long, default_value_t = 97.3)]
    pub period: f64,

    /// Porous layer thickness as a fraction of the period
    #[arg(long, default_value_t = 0.345)]
    pub ratio: f64,

    /// Average porosity of the porous layers; repeat or comma separate for several structures
    #[arg(short, long, value_delimiter = ',', default_value = "0.37")]
    pub porosity: Vec<f64>,

    /// Number of DBR pairs
    #[arg(short = 'n', long, default_value_t = 12)]
    pub pairs: usize,

    /// Thickness of the non-porous template layer below the DBR in nm (0 = none)
    #[arg(long, default_value_t = 3400.0)]
    pub template: f64,

    // ─────────────────────────────────────────────────────────────
    // 渐变界面
    // ─────────────────────────────────────────────────────────────
    /// Number of graded sub-layers per porous layer (odd, 1 = no grading)
    #[arg(long, default_value_t = 11)]
    pub grades: usize,

    /// Grading amplitude
    #[arg(long, default_value_t = 1.0)]
    pub grade_factor: f64,

    /// Grading exponent
    #[arg(long, default_value_t = 0.125)]
    pub grade_order: f64,

    // ─────────────────────────────────────────────────────────────
    // 双段结构
    // ─────────────────────────────────────────────────────────────
    /// Number of pairs of a second DBR stacked on top (0 = single DBR)
    #[arg(long, default_value_t = 0)]
    pub top_pairs: usize,

    /// Average porosity of the top DBR
    #[arg(long)]
    pub top_porosity: Option<f64>,

    // ─────────────────────────────────────────────────────────────
    // 材料
    // ─────────────────────────────────────────────────────────────
    #[command(flatten)]
    pub material: MaterialArgs,

    /// CSV table of the solid refractive index (wavelength, n[, k]); overrides --solid
    #[arg(long, env = "PDBR_INDEX_FILE")]
    pub index_file: Option<PathBuf>,

    /// Wavelength unit used in the index table
    #[arg(long, value_enum, default_value = "um")]
    pub index_unit: WavelengthUnit,

    /// Refractive index of the incident medium
    #[arg(long, default_value_t = 1.0)]
    pub incident: f64,

    /// Refractive index of the substrate (sapphire by default)
    #[arg(long, default_value_t = 1.76)]
    pub substrate: f64,

    /// Effective-medium mixing rule
    #[arg(long, value_enum, default_value = "linear")]
    pub rule: MixingRule,

    // ─────────────────────────────────────────────────────────────
    // 求解器
    // ─────────────────────────────────────────────────────────────
    /// Wavelength range in nm (e.g., "200-1000")
    #[arg(short, long, default_value = "200-1000")]
    pub range: String,

    /// Number of wavelength points
    #[arg(long, default_value_t = 800)]
    pub points: usize,

    /// Angle of incidence in degrees
    #[arg(long, default_value_t = 0.0)]
    pub angle: f64,

    /// Polarization (s and p coincide at normal incidence)
    #[arg(long, value_enum, default_value = "s")]
    pub polarization: Polarization,

    // ─────────────────────────────────────────────────────────────
    // 输出
    // ─────────────────────────────────────────────────────────────
    /// Output: plot file, or directory for CSV output
    #[arg(short, long, default_value = "reflectance.png")]
    pub output: PathBuf,

    /// Output format (auto-detected from extension if not specified)
    #[arg(short, long, value_enum)]
    pub format: Option<SimulateOutputFormat>,

    /// Wavelength range shown in the plot (e.g., "350-650")
    #[arg(long)]
    pub plot_range: Option<String>,

    /// Also output the reflectance difference of each structure relative to the first
    #[arg(long, default_value_t = false)]
    pub difference: bool,

    /// Figure width in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Figure height in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Title for the plot
    #[arg(long)]
    pub title: Option<String>,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0, env = "PDBR_JOBS")]
    pub jobs: usize,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
