//! # 光学计算模块
//!
//! 提供多孔 DBR 反射谱计算功能。
//!
//! ## 子模块
//! - `mixing`: 有效介质混合器
//! - `builder`: DBR 叠层构建器
//! - `grading`: 渐变界面
//! - `dispersion`: 色散折射率表
//! - `tmm`: 传输矩阵法求解器
//! - `curve`: 反射谱与波长网格
//! - `structure`: DBR 结构与模拟
//! - `plot`: 图表生成
//! - `export`: 数据导出
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/` 的 PorousLayer, Stack

pub mod builder;
pub mod curve;
pub mod dispersion;
pub mod export;
pub mod grading;
pub mod mixing;
pub mod plot;
pub mod structure;
pub mod tmm;

pub use builder::build_stack;
pub use curve::{ReflectivityCurve, WavelengthGrid};
pub use mixing::{mix, mix_with, MixingRule};
pub use structure::{DbrStructure, Simulation, SimulationResult};
pub use tmm::{CoherentTmm, Polarization};
