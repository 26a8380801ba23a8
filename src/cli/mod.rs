//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `mix`: 有效介质混合（孔隙率 → 有效折射率）
//! - `stack`: 构建高/低孔隙率交替的 DBR 叠层
//! - `simulate`: 多孔 DBR 反射谱模拟
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: mix, stack, simulate

pub mod mix;
pub mod simulate;
pub mod stack;

use clap::{Args, Parser, Subcommand};

/// pdbr - 多孔 DBR 反射谱模拟工具
#[derive(Parser)]
#[command(name = "pdbr")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Reflectivity simulator for porous distributed Bragg reflectors", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Compute effective refractive indices of porous layers
    Mix(mix::MixArgs),

    /// Build an alternating high/low porosity DBR stack
    Stack(stack::StackArgs),

    /// Simulate the reflectivity spectrum of porous DBRs
    Simulate(simulate::SimulateArgs),
}

// ─────────────────────────────────────────────────────────────
// 共享参数
// ─────────────────────────────────────────────────────────────

/// 固体与孔隙填充材料的折射率
#[derive(Args, Debug, Clone)]
pub struct MaterialArgs {
    /// Refractive index n of the solid material (GaN by default)
    #[arg(long, default_value_t = 2.38)]
    pub solid: f64,

    /// Extinction coefficient k of the solid material
    #[arg(long, default_value_t = 0.0)]
    pub solid_k: f64,

    /// Refractive index n of the pore-filling material (air by default)
    #[arg(long, default_value_t = 1.0)]
    pub pore: f64,

    /// Extinction coefficient k of the pore-filling material
    #[arg(long, default_value_t = 0.0)]
    pub pore_k: f64,
}
