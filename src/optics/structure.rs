//! # 多孔 DBR 结构与模拟
//!
//! 由周期、多孔层厚度比、平均孔隙率和对数描述一个多孔 DBR，
//! 在每个波长下组装叠层并交给反射率求解器。
//!
//! ## 叠层顺序
//! ```text
//! 入射介质 | [顶部 DBR 单元] × top.pairs | [致密层, 渐变多孔子层...] × pairs | 模板层 | 衬底
//! ```
//! 模板层厚度为 0 时省略。
//!
//! ## 依赖关系
//! - 被 `commands/simulate.rs` 调用
//! - 使用 `optics/grading.rs`, `optics/dispersion.rs`, `optics/tmm.rs`
//! - 使用 `models/` 的 PorousLayer, Stack

use crate::error::{DbrError, Result};
use crate::models::index::real_index;
use crate::models::{MaterialIndex, PorousLayer, Stack};
use crate::optics::curve::{ReflectivityCurve, WavelengthGrid};
use crate::optics::dispersion::IndexModel;
use crate::optics::grading::{GradedLayers, GradingProfile};
use crate::optics::mixing::{validate_porosity, MixingRule};
use crate::optics::tmm::{CoherentTmm, ReflectivitySolver};

/// 默认 GaN 折射率
pub const GAN_INDEX: f64 = 2.38;
/// 默认蓝宝石衬底折射率
pub const SAPPHIRE_INDEX: f64 = 1.76;

/// 多孔 DBR 结构
#[derive(Debug, Clone, PartialEq)]
pub struct DbrStructure {
    /// 标签
    pub label: String,
    /// 周期厚度 (nm)
    pub period_nm: f64,
    /// 多孔层占周期的厚度比
    pub thickness_ratio: f64,
    /// 多孔层平均孔隙率
    pub porosity: f64,
    /// DBR 对数
    pub pairs: usize,
    /// 下方致密模板层厚度 (nm)
    pub template_nm: f64,
    /// 界面渐变
    pub grading: GradingProfile,
}

impl DbrStructure {
    /// 创建结构（无模板层，无渐变）
    pub fn new(
        label: impl Into<String>,
        period_nm: f64,
        thickness_ratio: f64,
        porosity: f64,
        pairs: usize,
    ) -> Result<Self> {
        if !period_nm.is_finite() || period_nm <= 0.0 {
            return Err(DbrError::invalid(format!(
                "period must be a positive number of nm, got {}",
                period_nm
            )));
        }
        if !(thickness_ratio > 0.0 && thickness_ratio < 1.0) {
            return Err(DbrError::invalid(format!(
                "porous thickness ratio must be within (0, 1), got {}",
                thickness_ratio
            )));
        }
        validate_porosity(porosity)?;
        if pairs < 1 {
            return Err(DbrError::invalid("a DBR needs at least one pair"));
        }

        Ok(Self {
            label: label.into(),
            period_nm,
            thickness_ratio,
            porosity,
            pairs,
            template_nm: 0.0,
            grading: GradingProfile::uniform(),
        })
    }

    /// 设置模板层厚度
    pub fn with_template(mut self, template_nm: f64) -> Result<Self> {
        if !template_nm.is_finite() || template_nm < 0.0 {
            return Err(DbrError::invalid(format!(
                "template thickness must be >= 0 nm, got {}",
                template_nm
            )));
        }
        self.template_nm = template_nm;
        Ok(self)
    }

    /// 设置界面渐变
    pub fn with_grading(mut self, grading: GradingProfile) -> Self {
        self.grading = grading;
        self
    }

    /// 多孔层厚度 (nm)
    pub fn porous_thickness(&self) -> f64 {
        self.thickness_ratio * self.period_nm
    }

    /// 致密层厚度 (nm)
    pub fn solid_thickness(&self) -> f64 {
        self.period_nm - self.porous_thickness()
    }

    /// 渐变后的多孔子层
    pub fn graded(&self) -> Result<GradedLayers> {
        self.grading.apply(self.porous_thickness(), self.porosity)
    }

    /// 一个周期单元：致密层 + 渐变多孔子层
    pub fn unit_cell(
        &self,
        solid: MaterialIndex,
        pore: MaterialIndex,
        rule: MixingRule,
    ) -> Result<Vec<PorousLayer>> {
        let graded = self.graded()?;

        let mut cell = Vec::with_capacity(graded.porosities.len() + 1);
        cell.push(PorousLayer::solid(self.solid_thickness(), solid)?);
        for (&thickness, &porosity) in graded.thicknesses.iter().zip(&graded.porosities) {
            cell.push(PorousLayer::with_rule(
                thickness, porosity, solid, pore, rule,
            )?);
        }
        Ok(cell)
    }
}

/// 模拟结果
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub structure: DbrStructure,
    pub top: Option<DbrStructure>,
    pub curve: ReflectivityCurve,
}

impl SimulationResult {
    pub fn label(&self) -> &str {
        &self.structure.label
    }
}

/// 一次反射谱模拟
#[derive(Debug, Clone)]
pub struct Simulation<S: ReflectivitySolver = CoherentTmm> {
    structure: DbrStructure,
    top: Option<DbrStructure>,
    solid: IndexModel,
    pore: MaterialIndex,
    incident: MaterialIndex,
    substrate: MaterialIndex,
    rule: MixingRule,
    solver: S,
}

impl Simulation<CoherentTmm> {
    /// 使用默认参数（GaN / 空气 / 蓝宝石，正入射相干 TMM）
    pub fn new(structure: DbrStructure) -> Self {
        Self {
            structure,
            top: None,
            solid: IndexModel::Constant(real_index(GAN_INDEX)),
            pore: real_index(1.0),
            incident: real_index(1.0),
            substrate: real_index(SAPPHIRE_INDEX),
            rule: MixingRule::default(),
            solver: CoherentTmm::default(),
        }
    }
}

impl<S: ReflectivitySolver> Simulation<S> {
    /// 在上方叠加另一个 DBR
    pub fn with_top(mut self, top: DbrStructure) -> Self {
        self.top = Some(top);
        self
    }

    pub fn with_solid_index(mut self, solid: IndexModel) -> Self {
        self.solid = solid;
        self
    }

    pub fn with_pore_index(mut self, pore: MaterialIndex) -> Self {
        self.pore = pore;
        self
    }

    pub fn with_incident(mut self, incident: MaterialIndex) -> Self {
        self.incident = incident;
        self
    }

    pub fn with_substrate(mut self, substrate: MaterialIndex) -> Self {
        self.substrate = substrate;
        self
    }

    pub fn with_rule(mut self, rule: MixingRule) -> Self {
        self.rule = rule;
        self
    }

    /// 替换求解器
    pub fn with_solver<T: ReflectivitySolver>(self, solver: T) -> Simulation<T> {
        Simulation {
            structure: self.structure,
            top: self.top,
            solid: self.solid,
            pore: self.pore,
            incident: self.incident,
            substrate: self.substrate,
            rule: self.rule,
            solver,
        }
    }

    /// 指定波长下的完整叠层
    pub fn stack_at(&self, wavelength_nm: f64) -> Result<Stack> {
        let solid = self.solid.at(wavelength_nm)?;

        let mut builder = Stack::builder(self.incident);
        if let Some(top) = &self.top {
            let cell = top.unit_cell(solid, self.pore, self.rule)?;
            builder = builder.repeat(&cell, top.pairs);
        }

        let cell = self.structure.unit_cell(solid, self.pore, self.rule)?;
        builder = builder.repeat(&cell, self.structure.pairs);

        if self.structure.template_nm > 0.0 {
            builder = builder.layer(PorousLayer::solid(self.structure.template_nm, solid)?);
        }

        builder.finish(self.substrate)
    }

    /// 在波长网格上运行（有色散表时网格限制在表格范围内）
    pub fn run(&self, grid: &WavelengthGrid) -> Result<SimulationResult> {
        let curve = match self.solid.coverage() {
            None => {
                let stack = self.stack_at(grid.start)?;
                self.solver.solve(&stack, &grid.values())?
            }
            Some((min, max)) => {
                let wavelengths = grid.clamp_to(min, max)?.values();
                let reflectance = wavelengths
                    .iter()
                    .map(|&w| {
                        let stack = self.stack_at(w)?;
                        self.solver.reflectance(&stack, w)
                    })
                    .collect::<Result<Vec<_>>>()?;
                ReflectivityCurve::new(wavelengths, reflectance)?
            }
        };

        Ok(SimulationResult {
            structure: self.structure.clone(),
            top: self.top.clone(),
            curve,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::index::complex_index;
    use crate::optics::dispersion::IndexTable;
    use std::sync::Mutex;

    /// 记录每次调用 (条目数, 首层折射率, 波长)，反射率恒为 0.25
    #[derive(Debug, Default)]
    struct RecordingSolver {
        calls: Mutex<Vec<(usize, f64, f64)>>,
    }

    impl ReflectivitySolver for RecordingSolver {
        fn reflectance(&self, stack: &Stack, wavelength_nm: f64) -> Result<f64> {
            let first = stack.layers()[0].effective_index().re;
            self.calls
                .lock()
                .unwrap()
                .push((stack.entry_count(), first, wavelength_nm));
            Ok(0.25)
        }
    }

    fn structure(porosity: f64, pairs: usize) -> DbrStructure {
        DbrStructure::new("test", 97.3, 0.345, porosity, pairs)
            .unwrap()
            .with_template(3400.0)
            .unwrap()
            .with_grading(GradingProfile::new(11, 1.0, 0.125).unwrap())
    }

    #[test]
    fn test_thickness_split() {
        let s = structure(0.37, 12);
        assert!((s.porous_thickness() - 33.5685).abs() < 1e-9);
        assert!((s.solid_thickness() - 63.7315).abs() < 1e-9);
    }

    #[test]
    fn test_structure_validation() {
        assert!(DbrStructure::new("x", 0.0, 0.3, 0.4, 5).is_err());
        assert!(DbrStructure::new("x", 100.0, 0.0, 0.4, 5).is_err());
        assert!(DbrStructure::new("x", 100.0, 1.0, 0.4, 5).is_err());
        assert!(DbrStructure::new("x", 100.0, 0.3, 1.4, 5).is_err());
        assert!(DbrStructure::new("x", 100.0, 0.3, 0.4, 0).is_err());
        let s = DbrStructure::new("x", 100.0, 0.3, 0.4, 5).unwrap();
        assert!(s.with_template(-1.0).is_err());
    }

    #[test]
    fn test_stack_layout() {
        let sim = Simulation::new(structure(0.4, 12));
        let stack = sim.stack_at(500.0).unwrap();

        // 12 × (1 + 11) + 模板层
        assert_eq!(stack.layers().len(), 12 * 12 + 1);
        assert_eq!(stack.entry_count(), 12 * 12 + 3);
        assert_eq!(stack.incident(), real_index(1.0));
        assert_eq!(stack.substrate(), real_index(SAPPHIRE_INDEX));

        let first = &stack.layers()[0];
        assert_eq!(first.porosity(), 0.0);
        assert_eq!(first.effective_index(), real_index(GAN_INDEX));

        let template = stack.layers().last().unwrap();
        assert_eq!(template.thickness(), 3400.0);

        let expected = 12.0 * 97.3 + 3400.0;
        assert!((stack.total_thickness() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_two_part_stack_puts_top_first() {
        let top = DbrStructure::new("top", 97.3, 0.345, 0.655, 5).unwrap();
        let bottom = DbrStructure::new("bottom", 97.3, 0.345, 0.4, 7).unwrap();
        let sim = Simulation::new(bottom).with_top(top);
        let stack = sim.stack_at(500.0).unwrap();

        assert_eq!(stack.layers().len(), 2 * (5 + 7));
        assert_eq!(stack.layers()[1].porosity(), 0.655);
        assert_eq!(stack.layers()[2 * 5 + 1].porosity(), 0.4);
    }

    #[test]
    fn test_run_constant_index_has_stop_band() {
        let sim = Simulation::new(structure(0.4, 12));
        let grid = WavelengthGrid::linspace(350.0, 650.0, 301).unwrap();
        let result = sim.run(&grid).unwrap();

        assert_eq!(result.curve.len(), 301);
        assert_eq!(result.label(), "test");
        let (_, peak) = result.curve.peak().unwrap();
        assert!(peak > 0.5 && peak <= 1.0);
        assert!(result.curve.reflectance().iter().all(|r| (0.0..=1.0).contains(r)));
    }

    #[test]
    fn test_higher_porosity_raises_reflectance() {
        let grid = WavelengthGrid::linspace(350.0, 650.0, 301).unwrap();
        let low = Simulation::new(structure(0.2, 12)).run(&grid).unwrap();
        let high = Simulation::new(structure(0.5, 12)).run(&grid).unwrap();
        assert!(high.curve.peak().unwrap().1 > low.curve.peak().unwrap().1);
    }

    #[test]
    fn test_run_tabulated_clamps_grid() {
        let table = IndexTable::new(
            vec![360.0, 500.0, 1500.0],
            vec![real_index(2.55), real_index(2.42), complex_index(2.30, 0.0)],
        )
        .unwrap();
        let sim = Simulation::new(structure(0.37, 4)).with_solid_index(IndexModel::Tabulated(table));
        let grid = WavelengthGrid::default();
        let result = sim.run(&grid).unwrap();

        assert_eq!(result.curve.wavelengths()[0], 360.0);
        assert_eq!(*result.curve.wavelengths().last().unwrap(), 1000.0);
    }

    #[test]
    fn test_run_uses_substituted_solver() {
        let sim = Simulation::new(structure(0.4, 3)).with_solver(RecordingSolver::default());
        let grid = WavelengthGrid::linspace(400.0, 500.0, 11).unwrap();
        let result = sim.run(&grid).unwrap();

        let calls = sim.solver.calls.lock().unwrap();
        assert_eq!(calls.len(), 11);
        // 3 × (1 + 11) + 模板层 + 两端介质
        assert!(calls.iter().all(|&(entries, _, _)| entries == 3 * 12 + 3));
        assert!(calls.iter().all(|&(_, n, _)| n == GAN_INDEX));
        let seen: Vec<f64> = calls.iter().map(|&(_, _, w)| w).collect();
        assert_eq!(seen, grid.values());

        assert_eq!(result.curve.wavelengths(), grid.values().as_slice());
        assert!(result.curve.reflectance().iter().all(|&r| r == 0.25));
    }

    #[test]
    fn test_run_tabulated_uses_substituted_solver() {
        let table = IndexTable::new(
            vec![360.0, 500.0, 1500.0],
            vec![real_index(2.55), real_index(2.42), real_index(2.30)],
        )
        .unwrap();
        let sim = Simulation::new(structure(0.37, 2))
            .with_solid_index(IndexModel::Tabulated(table.clone()))
            .with_solver(RecordingSolver::default());
        let grid = WavelengthGrid::linspace(300.0, 700.0, 41).unwrap();
        let result = sim.run(&grid).unwrap();

        let calls = sim.solver.calls.lock().unwrap();
        assert_eq!(calls.len(), result.curve.len());
        assert_eq!(calls[0].2, 360.0);
        assert_eq!(calls.last().unwrap().2, 700.0);
        for (&(entries, n, w), &cw) in calls.iter().zip(result.curve.wavelengths()) {
            assert_eq!(entries, 2 * 12 + 3);
            assert_eq!(w, cw);
            assert!((n - table.lookup(w).unwrap().re).abs() < 1e-12);
        }
        assert!(result.curve.reflectance().iter().all(|&r| r == 0.25));
    }
}
