//! # DBR 叠层数据模型
//!
//! 叠层是按沉积顺序排列的多孔层序列，两端为入射介质和衬底（半无限介质）。
//! 第一层紧邻入射介质。
//!
//! ## 依赖关系
//! - 被 `optics/builder.rs`, `optics/structure.rs`, `optics/tmm.rs`, `optics/export.rs` 使用
//! - 使用 `models/layer.rs`, `models/index.rs`

use crate::error::{DbrError, Result};
use crate::models::index::{validate_index, MaterialIndex};
use crate::models::layer::PorousLayer;

/// 传递给反射率求解器的 (厚度, 折射率) 条目
///
/// 边界介质的厚度为 `f64::INFINITY`。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackEntry {
    /// 厚度 (nm)
    pub thickness: f64,
    /// 折射率
    pub index: MaterialIndex,
}

impl StackEntry {
    /// 是否为半无限边界介质
    pub fn is_boundary(&self) -> bool {
        self.thickness.is_infinite()
    }
}

/// DBR 叠层
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    incident: MaterialIndex,
    layers: Vec<PorousLayer>,
    substrate: MaterialIndex,
}

impl Stack {
    /// 从入射介质开始构建叠层
    pub fn builder(incident: MaterialIndex) -> StackBuilder {
        StackBuilder::new(incident)
    }

    /// 入射介质折射率
    pub fn incident(&self) -> MaterialIndex {
        self.incident
    }

    /// 衬底折射率
    pub fn substrate(&self) -> MaterialIndex {
        self.substrate
    }

    /// 有限厚度层（沉积顺序）
    pub fn layers(&self) -> &[PorousLayer] {
        &self.layers
    }

    /// 条目总数（层数 + 2 个边界介质）
    pub fn entry_count(&self) -> usize {
        self.layers.len() + 2
    }

    /// 有限厚度层的总厚度 (nm)
    pub fn total_thickness(&self) -> f64 {
        self.layers.iter().map(|l| l.thickness()).sum()
    }

    /// 展开为求解器使用的条目列表：入射介质、各层、衬底
    pub fn entries(&self) -> Vec<StackEntry> {
        let mut entries = Vec::with_capacity(self.entry_count());
        entries.push(StackEntry {
            thickness: f64::INFINITY,
            index: self.incident,
        });
        entries.extend(self.layers.iter().map(|l| StackEntry {
            thickness: l.thickness(),
            index: l.effective_index(),
        }));
        entries.push(StackEntry {
            thickness: f64::INFINITY,
            index: self.substrate,
        });
        entries
    }
}

/// 叠层构建器
#[derive(Debug, Clone)]
pub struct StackBuilder {
    incident: MaterialIndex,
    layers: Vec<PorousLayer>,
}

impl StackBuilder {
    /// 创建新的构建器
    pub fn new(incident: MaterialIndex) -> Self {
        Self {
            incident,
            layers: Vec::new(),
        }
    }

    /// 追加单层
    pub fn layer(mut self, layer: PorousLayer) -> Self {
        self.layers.push(layer);
        self
    }

    /// 将单元重复 `count` 次
    pub fn repeat(mut self, unit_cell: &[PorousLayer], count: usize) -> Self {
        self.layers.reserve(unit_cell.len() * count);
        for _ in 0..count {
            self.layers.extend_from_slice(unit_cell);
        }
        self
    }

    /// 以衬底结束并校验
    pub fn finish(self, substrate: MaterialIndex) -> Result<Stack> {
        validate_index("incident medium", self.incident)?;
        validate_index("substrate", substrate)?;

        if self.layers.is_empty() {
            return Err(DbrError::invalid("stack must contain at least one layer"));
        }

        Ok(Stack {
            incident: self.incident,
            layers: self.layers,
            substrate,
        })
    }
}
