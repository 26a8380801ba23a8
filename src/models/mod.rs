//! # 数据模型模块
//!
//! 定义折射率、多孔层与 DBR 叠层的统一数据模型。
//!
//! 所有实体在一次模拟中新建，构造完成后不可变。
//!
//! ## 依赖关系
//! - 被 `optics/` 和 `commands/` 使用
//! - 子模块: index, layer, stack

pub mod index;
pub mod layer;
pub mod stack;

pub use index::MaterialIndex;
pub use layer::PorousLayer;
pub use stack::Stack;
