//! # 批量执行器
//!
//! 并行执行批量模拟任务。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代，结果保持输入顺序
//! - 进度条显示
//! - 错误收集与汇总报告
//!
//! ## 依赖关系
//! - 被 `commands/simulate.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::error::{DbrError, Result};
use crate::utils::progress;

use rayon::prelude::*;

/// 单个任务处理结果
#[derive(Debug, Clone)]
pub enum ProcessResult<T> {
    /// 处理成功
    Success(T),
    /// 跳过（如输出已存在）
    Skipped(String),
    /// 处理失败
    Failed(String, String), // (任务名, 错误信息)
}

/// 批量处理结果统计
#[derive(Debug)]
pub struct BatchResult<T> {
    /// 成功任务的输出（按输入顺序）
    pub outputs: Vec<T>,
    /// 跳过原因
    pub skipped: Vec<String>,
    /// 失败数量
    pub failed: usize,
    /// 失败详情
    pub failures: Vec<(String, String)>,
}

impl<T> Default for BatchResult<T> {
    fn default() -> Self {
        Self {
            outputs: Vec::new(),
            skipped: Vec::new(),
            failed: 0,
            failures: Vec::new(),
        }
    }
}

impl<T> BatchResult<T> {
    /// 合并处理结果
    pub fn merge(&mut self, result: ProcessResult<T>) {
        match result {
            ProcessResult::Success(output) => self.outputs.push(output),
            ProcessResult::Skipped(reason) => self.skipped.push(reason),
            ProcessResult::Failed(name, err) => {
                self.failed += 1;
                self.failures.push((name, err));
            }
        }
    }

    /// 成功数量
    pub fn success(&self) -> usize {
        self.outputs.len()
    }

    /// 总处理数量
    pub fn total(&self) -> usize {
        self.success() + self.skipped.len() + self.failed
    }
}

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
    /// 是否显示进度条
    show_progress: bool,
}

impl BatchRunner {
    /// 创建新的批量执行器（0 = 自动）
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self {
            jobs,
            show_progress: true,
        }
    }

    /// 是否显示进度条
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// 并行处理任务列表
    pub fn run<I, T, F>(&self, items: &[I], processor: F) -> Result<BatchResult<T>>
    where
        I: Sync,
        T: Send,
        F: Fn(&I) -> ProcessResult<T> + Sync + Send,
    {
        let pb = if self.show_progress {
            progress::create_progress_bar(items.len() as u64, "Simulating")
        } else {
            indicatif::ProgressBar::hidden()
        };

        // 配置 rayon 线程池
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| DbrError::Other(format!("Failed to start thread pool: {}", e)))?;

        let results: Vec<ProcessResult<T>> = pool.install(|| {
            items
                .par_iter()
                .map(|item| {
                    let result = processor(item);
                    pb.inc(1);
                    result
                })
                .collect()
        });

        pb.finish_and_clear();

        // 汇总结果
        let mut batch_result = BatchResult::default();
        for result in results {
            batch_result.merge(result);
        }

        Ok(batch_result)
    }
}
