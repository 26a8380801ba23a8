//! # mix 命令实现
//!
//! 打印各孔隙率下的有效折射率表。
//!
//! ## 依赖关系
//! - 使用 `cli/mix.rs` 定义的参数
//! - 使用 `optics/mixing.rs`
//! - 使用 `utils/output.rs`

use crate::cli::mix::MixArgs;
use crate::commands::material_indices;
use crate::error::Result;
use crate::models::index::format_index;
use crate::models::MaterialIndex;
use crate::optics::{mix, mix_with, MixingRule};
use crate::utils::output;

use tabled::builder::Builder;

const ALL_RULES: [MixingRule; 4] = [
    MixingRule::Linear,
    MixingRule::VolumeAverage,
    MixingRule::Bruggeman,
    MixingRule::MaxwellGarnett,
];

/// 执行 mix 命令
pub fn execute(args: MixArgs) -> Result<()> {
    output::print_header("Effective-Medium Mixing");

    let (solid, pore) = material_indices(&args.material)?;
    output::print_info(&format!(
        "Solid n = {}, pore n = {}",
        format_index(solid),
        format_index(pore)
    ));

    let rules: Vec<MixingRule> = if args.compare {
        ALL_RULES.to_vec()
    } else {
        output::print_info(&format!("Mixing rule: {}", args.rule));
        vec![args.rule]
    };

    let table = mix_table(solid, pore, &args.porosity, &rules)?;

    let mut builder = Builder::default();
    let mut header = vec!["Porosity".to_string()];
    header.extend(rules.iter().map(|r| r.to_string()));
    builder.push_record(header);
    for (porosity, indices) in args.porosity.iter().zip(&table) {
        let mut row = vec![format!("{:.3}", porosity)];
        row.extend(indices.iter().map(|n| format_index(*n)));
        builder.push_record(row);
    }
    println!("{}", builder.build());

    output::print_success(&format!("Computed {} effective indices", table.len() * rules.len()));
    Ok(())
}

/// 每个孔隙率一行，每个混合律一列
fn mix_table(
    solid: MaterialIndex,
    pore: MaterialIndex,
    porosities: &[f64],
    rules: &[MixingRule],
) -> Result<Vec<Vec<MaterialIndex>>> {
    porosities
        .iter()
        .map(|&p| {
            rules
                .iter()
                .map(|&rule| match rule {
                    MixingRule::Linear => mix(solid, pore, p),
                    _ => mix_with(rule, solid, pore, p),
                })
                .collect()
        })
        .collect()
}
