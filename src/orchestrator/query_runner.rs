//! 查询执行器 - 编排层
//!
//! 把"执行查询"和"保存结果"组合起来：
//! 校验输入 → 记录时间戳 → 执行查询函数 → 包装成 `QueryRecord` → 交给 `ResultStore`

use crate::config::Config;
use crate::error::AppResult;
use crate::models::record::TIMESTAMP_FORMAT;
use crate::models::{QueryRecord, QueryResult, SearchCriteria};
use crate::services::ResultStore;
use crate::workflow::QueryCtx;
use chrono::Local;
use std::future::Future;
use std::path::PathBuf;
use tracing::info;

pub struct QueryRunner {
    query_name: String,
    query_version: String,
    store: ResultStore,
}

impl QueryRunner {
    pub fn new(config: &Config) -> Self {
        Self {
            query_name: config.query_name.clone(),
            query_version: config.query_version.clone(),
            store: ResultStore::new(&config.output_root),
        }
    }

    /// 执行查询函数并附加运行元数据
    ///
    /// 输入不合法时不会调用 `query_fn`。
    pub async fn execute<Q, Fut>(
        &self,
        ctx: &QueryCtx,
        criteria: &SearchCriteria,
        query_fn: Q,
    ) -> AppResult<QueryRecord>
    where
        Q: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<QueryResult>>,
    {
        criteria.validate()?;

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let result = query_fn().await?;

        info!("{} 结果: {}", ctx, serde_json::to_string(&result)?);

        Ok(QueryRecord {
            query_name: self.query_name.clone(),
            query_version: self.query_version.clone(),
            query_input: criteria.clone(),
            query_date: timestamp.clone(),
            file_timestamp: timestamp,
            result,
        })
    }

    /// 执行并保存，返回记录和文件路径
    pub async fn execute_and_persist<Q, Fut>(
        &self,
        ctx: &QueryCtx,
        criteria: &SearchCriteria,
        query_fn: Q,
    ) -> AppResult<(QueryRecord, PathBuf)>
    where
        Q: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<QueryResult>>,
    {
        let record = self.execute(ctx, criteria, query_fn).await?;
        let path = self.store.save(&record).await?;
        Ok((record, path))
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }
}
