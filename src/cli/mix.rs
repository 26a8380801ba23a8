//! # mix 子命令 CLI 定义
//!
//! 由孔隙率计算多孔层的有效折射率。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/mix.rs`

use crate::cli::MaterialArgs;
use crate::optics::MixingRule;

use clap::Args;

/// mix 子命令参数
#[derive(Args, Debug)]
pub struct MixArgs {
    #[command(flatten)]
    pub material: MaterialArgs,

    /// Porosity fraction(s) in [0, 1], comma separated (e.g., 0.2,0.5,0.7)
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub porosity: Vec<f64>,

    /// Effective-medium mixing rule
    #[arg(long, value_enum, default_value = "linear")]
    pub rule: MixingRule,

    /// Evaluate every mixing rule side by side
    #[arg(long, default_value_t = false)]
    pub compare: bool,
}
