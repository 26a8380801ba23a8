//! # stack 命令实现
//!
//! 由高/低孔隙率层模板构建 DBR 叠层，打印层表，可选计算单波长反射率并导出 CSV。
//!
//! ## 依赖关系
//! - 使用 `cli/stack.rs` 定义的参数
//! - 使用 `optics/builder.rs`, `optics/tmm.rs`, `optics/export.rs`
//! - 使用 `utils/output.rs`

use crate::cli::stack::StackArgs;
use crate::commands::material_indices;
use crate::error::Result;
use crate::models::index::{format_index, real_index};
use crate::models::{PorousLayer, Stack};
use crate::optics::tmm::CoherentTmm;
use crate::optics::{build_stack, export};
use crate::utils::output;

use tabled::{Table, Tabled};

/// 层表行
#[derive(Debug, Clone, Tabled)]
struct LayerRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Layer")]
    role: String,
    #[tabled(rename = "d (nm)")]
    thickness: String,
    #[tabled(rename = "Porosity")]
    porosity: String,
    #[tabled(rename = "n_eff")]
    index: String,
}

/// 执行 stack 命令
pub fn execute(args: StackArgs) -> Result<()> {
    output::print_header("Porous DBR Stack");

    let (solid, pore) = material_indices(&args.material)?;
    let high = PorousLayer::with_rule(
        args.high_thickness,
        args.high_porosity,
        solid,
        pore,
        args.rule,
    )?;
    let low = PorousLayer::with_rule(
        args.low_thickness,
        args.low_porosity,
        solid,
        pore,
        args.rule,
    )?;

    output::print_info(&format!(
        "High layer: {:.2} nm, porosity {:.3} -> n = {}",
        high.thickness(),
        high.porosity(),
        format_index(high.effective_index())
    ));
    output::print_info(&format!(
        "Low layer:  {:.2} nm, porosity {:.3} -> n = {}",
        low.thickness(),
        low.porosity(),
        format_index(low.effective_index())
    ));

    let stack = build_stack(
        args.periods,
        &high,
        &low,
        real_index(args.incident),
        real_index(args.substrate),
    )?;

    println!("{}", Table::new(layer_rows(&stack)));
    output::print_success(&format!(
        "{} entries ({} pairs), total thickness {:.2} nm",
        stack.entry_count(),
        args.periods,
        stack.total_thickness()
    ));

    if let Some(wavelength) = args.wavelength {
        let tmm = CoherentTmm::normal_incidence();
        let res = tmm.evaluate(&stack, wavelength)?;
        output::print_info(&format!(
            "At {:.1} nm: R = {:.4}, T = {:.4}",
            wavelength, res.reflectance, res.transmittance
        ));
    }

    if let Some(path) = &args.output {
        export::write_stack_csv(&stack, path)?;
        output::print_success(&format!("Stack saved to '{}'", path.display()));
    }

    Ok(())
}

/// 叠层展开为表格行
fn layer_rows(stack: &Stack) -> Vec<LayerRow> {
    let mut rows = Vec::with_capacity(stack.entry_count());
    rows.push(LayerRow {
        position: 0,
        role: "incident".to_string(),
        thickness: "∞".to_string(),
        porosity: "-".to_string(),
        index: format_index(stack.incident()),
    });

    for (i, layer) in stack.layers().iter().enumerate() {
        rows.push(LayerRow {
            position: i + 1,
            role: if i % 2 == 0 { "high" } else { "low" }.to_string(),
            thickness: format!("{:.2}", layer.thickness()),
            porosity: format!("{:.3}", layer.porosity()),
            index: format_index(layer.effective_index()),
        });
    }

    rows.push(LayerRow {
        position: stack.entry_count() - 1,
        role: "substrate".to_string(),
        thickness: "∞".to_string(),
        porosity: "-".to_string(),
        index: format_index(stack.substrate()),
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_rows_alternate() {
        let high = PorousLayer::new(60.0, 0.2, real_index(2.4), real_index(1.0)).unwrap();
        let low = PorousLayer::new(80.0, 0.7, real_index(2.4), real_index(1.0)).unwrap();
        let stack = build_stack(5, &high, &low, real_index(1.0), real_index(2.4)).unwrap();

        let rows = layer_rows(&stack);
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].role, "incident");
        assert_eq!(rows[1].role, "high");
        assert_eq!(rows[1].index, "2.1200");
        assert_eq!(rows[2].role, "low");
        assert_eq!(rows[2].index, "1.4200");
        assert_eq!(rows[11].role, "substrate");
        assert_eq!(rows[11].position, 11);
    }
}
