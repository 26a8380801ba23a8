//! # 统一错误处理模块
//!
//! 定义 pdbr 的所有错误类型，使用 `thiserror` 派生。
//!
//! 混合器与叠层构建器只产生 `InvalidParameter`，在构造时同步报告。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// pdbr 统一错误类型
#[derive(Error, Debug)]
pub enum DbrError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid range format: {0}")]
    InvalidRange(String),

    // ─────────────────────────────────────────────────────────────
    // CSV / 绘图错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Plot rendering failed: {0}")]
    PlotError(String),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl DbrError {
    /// 构造参数错误
    pub fn invalid(msg: impl Into<String>) -> Self {
        DbrError::InvalidParameter(msg.into())
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, DbrError>;
