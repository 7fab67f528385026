//! 查询处理流程 - 流程层
//!
//! 核心职责：定义"一条输入记录"的完整查询流程
//!
//! 流程顺序：
//! 1. 建立会话（起始页 + Cookie）
//! 2. 识别验证码 → 提交表单，被拒绝时换新验证码重试
//! 3. 解析结果列表 → 逐个抓取详情页
//!
//! 验证码预算耗尽时，整条流程延迟后从第 1 步重来。

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{OcrEngine, ScratchSpace, SessionFactory, Transport};
use crate::models::{
    PackageResult, QueryResult, SearchCriteria, TrackingRow, DELIVERY_DATE_PLACEHOLDER,
};
use crate::services::{
    extract_detail, extract_listing, CaptchaSolver, FormSubmitter, SessionBootstrapper,
    SubmissionOutcome,
};
use crate::utils::logging::truncate_text;
use crate::workflow::query_ctx::QueryCtx;

/// 查询处理流程
///
/// - 每次执行打开一个独占的会话和临时目录，执行结束即丢弃
/// - 决定何时重试、何时放弃、何时重启
/// - 只依赖业务能力（services）
pub struct QueryPipeline<F, E> {
    sessions: F,
    bootstrapper: SessionBootstrapper,
    solver: CaptchaSolver<E>,
    submitter: FormSubmitter,
    detail_url_prefix: String,
    accept_language: String,
    max_rejections: usize,
    max_restarts: usize,
    restart_delay: Duration,
}

impl<F, E> QueryPipeline<F, E>
where
    F: SessionFactory,
    E: OcrEngine,
{
    pub fn new(sessions: F, engine: E, config: &Config) -> Self {
        Self {
            sessions,
            bootstrapper: SessionBootstrapper::new(config),
            solver: CaptchaSolver::new(engine, config),
            submitter: FormSubmitter::new(config),
            detail_url_prefix: config.tracking_detail_url_prefix.clone(),
            accept_language: config.accept_language.clone(),
            max_rejections: config.max_rejections,
            max_restarts: config.max_restarts,
            restart_delay: config.restart_delay(),
        }
    }

    /// 执行一次查询（含重启策略）
    ///
    /// # 返回
    /// - `Ok(QueryResult)`：正常结果，第 3 次被拒绝时为空结果
    /// - `Err`：传输重试耗尽、重启后验证码仍然失败、页面结构异常
    pub async fn run(&self, criteria: &SearchCriteria, ctx: &QueryCtx) -> AppResult<QueryResult> {
        let mut restarts = 0;
        loop {
            match self.execute_once(criteria, ctx).await {
                Err(e) if e.is_restartable() && restarts < self.max_restarts => {
                    restarts += 1;
                    warn!(
                        "{} ⚠️ {}，{:?} 后重启流程 ({}/{})",
                        ctx, e, self.restart_delay, restarts, self.max_restarts
                    );
                    sleep(self.restart_delay).await;
                }
                Err(e) => {
                    error!("{} ❌ 查询失败: {}", ctx, e);
                    return Err(e);
                }
                Ok(result) => return Ok(result),
            }
        }
    }

    /// 单次完整执行，不做重启
    pub async fn execute_once(
        &self,
        criteria: &SearchCriteria,
        ctx: &QueryCtx,
    ) -> AppResult<QueryResult> {
        let mut session = self.sessions.open()?;
        let scratch = ScratchSpace::new()?;

        // ========== 阶段 1: 建立会话 ==========
        info!("{} 🔍 正在建立会话...", ctx);
        self.bootstrapper.bootstrap(&mut session).await?;
        session.set_header("Accept-Language", &self.accept_language);

        // ========== 阶段 2: 验证码 + 提交 ==========
        let Some(listing_html) = self
            .submit_until_accepted(&session, &scratch, criteria, ctx)
            .await?
        else {
            warn!(
                "{} ⚠️ 连续被拒绝 {} 次，返回空结果",
                ctx, self.max_rejections
            );
            return Ok(QueryResult::empty());
        };

        // ========== 阶段 3: 列表 + 详情 ==========
        debug!("{} 列表页: {}", ctx, truncate_text(&listing_html, 200));
        let rows = extract_listing(&listing_html)?;
        info!("{} ✓ 结果列表中有 {} 个包裹", ctx, rows.len());

        let mut result = QueryResult::empty();
        for row in &rows {
            if let Some(package) = self.fetch_package(&session, row, ctx).await? {
                result.found_packages = true;
                result.push_package(package);
            }
        }

        info!(
            "{} ✓ 查询完成: {}/{} 个包裹",
            ctx,
            result.total_packages,
            rows.len()
        );
        Ok(result)
    }

    /// 每次提交都重新识别验证码；全部被拒绝时返回 `None`
    async fn submit_until_accepted<T: Transport>(
        &self,
        session: &T,
        scratch: &ScratchSpace,
        criteria: &SearchCriteria,
        ctx: &QueryCtx,
    ) -> AppResult<Option<String>> {
        for submission in 1..=self.max_rejections {
            let token = self.solver.solve(session, scratch).await?;

            match self.submitter.submit(session, criteria, &token).await? {
                SubmissionOutcome::Accepted { listing_html } => return Ok(Some(listing_html)),
                SubmissionOutcome::Rejected { message } => {
                    warn!(
                        "{} 提交被拒绝 ({}/{}): {}",
                        ctx,
                        submission,
                        self.max_rejections,
                        message.as_deref().unwrap_or("无错误提示")
                    );
                }
            }
        }

        Ok(None)
    }

    /// 抓取单个详情页；失败只跳过该包裹
    async fn fetch_package<T: Transport>(
        &self,
        session: &T,
        row: &TrackingRow,
        ctx: &QueryCtx,
    ) -> AppResult<Option<PackageResult>> {
        let url = format!("{}{}", self.detail_url_prefix, row.reference);

        let response = match session.get(&url).await {
            Ok(response) if response.is_ok() => response,
            Ok(response) => {
                warn!(
                    "{} ⚠️ 详情页返回 {}，跳过包裹 {}",
                    ctx, response.status, row.package_label
                );
                return Ok(None);
            }
            Err(e) => {
                warn!("{} ⚠️ 详情页请求失败，跳过包裹 {}: {}", ctx, row.package_label, e);
                return Ok(None);
            }
        };

        let status_list = extract_detail(&response.text())?;
        Ok(Some(PackageResult {
            delivery_date: DELIVERY_DATE_PLACEHOLDER.to_string(),
            package_id: row.package_label.clone(),
            status_list,
        }))
    }
}
