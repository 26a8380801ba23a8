//! # pdbr - 多孔 DBR 反射谱模拟工具
//!
//! 由固体/孔隙折射率与孔隙率计算多孔层有效折射率，组装 DBR 叠层，
//! 并用传输矩阵法计算反射谱。
//!
//! ## 子命令
//! - `mix` - 有效介质混合
//! - `stack` - 构建高/低孔隙率交替叠层
//! - `simulate` - 反射谱模拟（渐变界面、色散、双段结构、批量并行）
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── optics/    (混合器、叠层构建、TMM、导出、绘图)
//!   │     ├── models/    (数据模型)
//!   │     └── batch/     (并行批处理)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod models;
mod optics;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
