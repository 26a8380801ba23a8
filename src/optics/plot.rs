//! # 反射谱图表生成
//!
//! 使用 `plotters` 库绘制一条或多条反射谱（或差值谱）。
//!
//! ## 功能
//! - 多条曲线叠加并带图例
//! - 可选 x 轴范围
//! - 支持 PNG 和 SVG 输出
//!
//! ## 依赖关系
//! - 被 `commands/simulate.rs` 调用
//! - 使用 `optics/curve.rs` 的 ReflectivityCurve
//! - 使用 `plotters` 渲染图表

use crate::error::{DbrError, Result};
use crate::optics::curve::ReflectivityCurve;

use plotters::prelude::*;
use std::path::Path;

/// 带标签的曲线
pub struct LabeledCurve<'a> {
    pub label: String,
    pub curve: &'a ReflectivityCurve,
}

/// 生成反射谱图
#[allow(clippy::too_many_arguments)]
pub fn generate_reflectance_plot(
    curves: &[LabeledCurve],
    output_path: &Path,
    title: &str,
    y_desc: &str,
    x_range: Option<(f64, f64)>,
    y_range: (f64, f64),
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    if curves.is_empty() {
        return Err(DbrError::invalid("nothing to plot"));
    }

    let x_range = x_range.unwrap_or_else(|| data_x_range(curves));

    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_chart(&root, curves, title, y_desc, x_range, y_range)?;
        root.present()
            .map_err(|e| DbrError::PlotError(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_chart(&root, curves, title, y_desc, x_range, y_range)?;
        root.present()
            .map_err(|e| DbrError::PlotError(e.to_string()))?;
    }
    Ok(())
}

/// 差值曲线的 y 轴范围（对称，留 10% 余量）
pub fn symmetric_y_range(curves: &[LabeledCurve]) -> (f64, f64) {
    let max_abs = curves
        .iter()
        .flat_map(|c| c.curve.reflectance().iter())
        .map(|r| r.abs())
        .fold(0.0_f64, f64::max);
    let limit = if max_abs > 0.0 { max_abs * 1.1 } else { 1.0 };
    (-limit, limit)
}

/// 所有曲线覆盖的波长范围
fn data_x_range(curves: &[LabeledCurve]) -> (f64, f64) {
    let min = curves
        .iter()
        .filter_map(|c| c.curve.wavelengths().first())
        .cloned()
        .fold(f64::INFINITY, f64::min);
    let max = curves
        .iter()
        .filter_map(|c| c.curve.wavelengths().last())
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);

    if min.is_finite() && max.is_finite() && max > min {
        (min, max)
    } else {
        (200.0, 1000.0)
    }
}

/// 绘制图表的核心逻辑
fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    curves: &[LabeledCurve],
    title: &str,
    y_desc: &str,
    x_range: (f64, f64),
    y_range: (f64, f64),
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| DbrError::PlotError(format!("{:?}", e)))?;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)
        .map_err(|e| DbrError::PlotError(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc("Wavelength (nm)")
        .y_desc(y_desc)
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| DbrError::PlotError(format!("{:?}", e)))?;

    for (i, labeled) in curves.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        chart
            .draw_series(LineSeries::new(
                labeled
                    .curve
                    .points()
                    .filter(|(w, _)| *w >= x_range.0 && *w <= x_range.1),
                color.stroke_width(2),
            ))
            .map_err(|e| DbrError::PlotError(format!("{:?}", e)))?
            .label(labeled.label.clone())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(("sans-serif", 16))
        .draw()
        .map_err(|e| DbrError::PlotError(format!("{:?}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_y_range() {
        let c = ReflectivityCurve::new(vec![1.0, 2.0], vec![-0.2, 0.1]).unwrap();
        let curves = [LabeledCurve {
            label: "d".to_string(),
            curve: &c,
        }];
        let (lo, hi) = symmetric_y_range(&curves);
        assert!((hi - 0.22).abs() < 1e-12);
        assert_eq!(lo, -hi);
    }

    #[test]
    fn test_data_x_range() {
        let a = ReflectivityCurve::new(vec![300.0, 600.0], vec![0.0, 0.0]).unwrap();
        let b = ReflectivityCurve::new(vec![350.0, 900.0], vec![0.0, 0.0]).unwrap();
        let curves = [
            LabeledCurve {
                label: "a".to_string(),
                curve: &a,
            },
            LabeledCurve {
                label: "b".to_string(),
                curve: &b,
            },
        ];
        assert_eq!(data_x_range(&curves), (300.0, 900.0));
    }
}
