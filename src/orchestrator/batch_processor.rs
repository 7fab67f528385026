//! 批量查询处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量查询的调度和统计。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验配置、创建会话工厂和 OCR 引擎
//! 2. **批量加载**：扫描并加载所有输入记录（`Vec<SearchCriteria>`）
//! 3. **并发控制**：`buffer_unordered` 限制同时执行的查询数量
//! 4. **全局统计**：汇总成功 / 空结果 / 失败
//!
//! 每次执行自己打开会话和临时目录，执行之间没有共享的可变状态。

use crate::config::Config;
use crate::infrastructure::{
    default_engine, DefaultEngine, HttpSessionFactory, OcrEngine, SessionFactory,
};
use crate::models::{load_all_criteria, SearchCriteria};
use crate::orchestrator::query_runner::QueryRunner;
use crate::utils::logging;
use crate::workflow::{QueryCtx, QueryPipeline};
use anyhow::Result;
use futures::stream::{self, StreamExt};
use std::path::Path;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App<F, E> {
    config: Config,
    pipeline: QueryPipeline<F, E>,
    runner: QueryRunner,
}

impl App<HttpSessionFactory, DefaultEngine> {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;
        let engine = default_engine(&config)?;
        let sessions = HttpSessionFactory::new(&config);

        Ok(Self::with_parts(config, sessions, engine))
    }
}

impl<F, E> App<F, E>
where
    F: SessionFactory,
    E: OcrEngine,
{
    /// 使用指定的会话工厂和 OCR 引擎组装应用
    pub fn with_parts(config: Config, sessions: F, engine: E) -> Self {
        let pipeline = QueryPipeline::new(sessions, engine, &config);
        let runner = QueryRunner::new(&config);
        Self {
            config,
            pipeline,
            runner,
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        logging::log_startup(
            self.config.max_concurrent_queries,
            &self.runner.store().output_root().display().to_string(),
        );

        info!("\n📁 正在扫描待处理的输入记录...");
        let all_records = load_all_criteria(&self.config.input_folder).await?;

        if all_records.is_empty() {
            warn!("⚠️ 没有找到待处理的TOML文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        logging::log_records_loaded(all_records.len(), self.config.max_concurrent_queries);

        let outcomes: Vec<RunOutcome> = stream::iter(all_records.into_iter().enumerate())
            .map(|(idx, (path, criteria))| async move {
                self.run_one(idx + 1, &path, &criteria).await
            })
            .buffer_unordered(self.config.max_concurrent_queries.max(1))
            .collect()
            .await;

        let mut stats = ProcessingStats {
            total: outcomes.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                RunOutcome::Found => stats.success += 1,
                RunOutcome::Empty => stats.empty += 1,
                RunOutcome::Failed => stats.failed += 1,
            }
        }

        logging::print_final_stats(stats.success, stats.empty, stats.failed, stats.total);
        Ok(stats)
    }

    /// 执行并保存单条记录
    async fn run_one(&self, run_index: usize, path: &Path, criteria: &SearchCriteria) -> RunOutcome {
        let ctx = QueryCtx::new(&self.config.query_name, run_index);
        info!("{} 📄 {} ({})", ctx, criteria, path.display());

        match self
            .runner
            .execute_and_persist(&ctx, criteria, || self.pipeline.run(criteria, &ctx))
            .await
        {
            Ok((record, _)) if record.result.found_packages => {
                info!("{} ✅ 找到 {} 个包裹", ctx, record.result.total_packages);
                RunOutcome::Found
            }
            Ok(_) => {
                info!("{} 未找到包裹", ctx);
                RunOutcome::Empty
            }
            Err(e) => {
                error!("{} ❌ 处理过程中发生错误: {}", ctx, e);
                RunOutcome::Failed
            }
        }
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    /// 找到至少一个包裹
    pub success: usize,
    /// 查询成功但结果为空
    pub empty: usize,
    pub failed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy)]
enum RunOutcome {
    Found,
    Empty,
    Failed,
}
