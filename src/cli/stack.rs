//! # stack 子命令 CLI 定义
//!
//! 构建高/低孔隙率交替的 DBR 叠层并打印层表。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/stack.rs`

use crate::cli::MaterialArgs;
use crate::optics::MixingRule;

use clap::Args;
use std::path::PathBuf;

/// stack 子命令参数
#[derive(Args, Debug)]
pub struct StackArgs {
    /// Number of high/low layer pairs
    #[arg(short = 'n', long, default_value_t = 5)]
    pub periods: usize,

    /// Thickness of the high-index (low-porosity) layer in nm
    #[arg(long)]
    pub high_thickness: f64,

    /// Porosity of the high-index layer
    #[arg(long)]
    pub high_porosity: f64,

    /// Thickness of the low-index (high-porosity) layer in nm
    #[arg(long)]
    pub low_thickness: f64,

    /// Porosity of the low-index layer
    #[arg(long)]
    pub low_porosity: f64,

    #[command(flatten)]
    pub material: MaterialArgs,

    /// Refractive index of the incident medium
    #[arg(long, default_value_t = 1.0)]
    pub incident: f64,

    /// Refractive index of the substrate
    #[arg(long, default_value_t = 1.76)]
    pub substrate: f64,

    /// Effective-medium mixing rule
    #[arg(long, value_enum, default_value = "linear")]
    pub rule: MixingRule,

    /// Report normal-incidence reflectance at this wavelength (nm)
    #[arg(short, long)]
    pub wavelength: Option<f64>,

    /// Write the layer table to a CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
