//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `optics/`, `models/`, `utils/`
//! - 子模块: mix, stack, simulate

pub mod mix;
pub mod simulate;
pub mod stack;

use crate::cli::{Commands, MaterialArgs};
use crate::error::Result;
use crate::models::index::{complex_index, validate_index};
use crate::models::MaterialIndex;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Mix(args) => mix::execute(args),
        Commands::Stack(args) => stack::execute(args),
        Commands::Simulate(args) => simulate::execute(args),
    }
}

/// 从命令行参数读取 (固体, 孔隙) 折射率
pub(crate) fn material_indices(args: &MaterialArgs) -> Result<(MaterialIndex, MaterialIndex)> {
    let solid = complex_index(args.solid, args.solid_k);
    let pore = complex_index(args.pore, args.pore_k);
    validate_index("solid", solid)?;
    validate_index("pore", pore)?;
    Ok((solid, pore))
}
