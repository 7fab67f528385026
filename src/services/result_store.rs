//! 结果存储服务 - 业务能力层
//!
//! 只负责"把一条记录写成 JSON 文件"，不关心记录怎么来的

use crate::error::{AppError, AppResult};
use crate::models::record::{QueryRecord, TIMESTAMP_FORMAT};
use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 文件名各段之间的分隔符
const FIELD_SEPARATOR: &str = "#@#";

/// 成功记录的状态标记
pub const STATUS_SUCCESS: &str = "SUCCESS";

/// 结果存储服务
///
/// 目录结构：`{output_root}/parser/{query_name}/{年}/{月}/{日}/{时}/{文件名}`，
/// 日期各段不补零。
pub struct ResultStore {
    output_root: PathBuf,
}

impl ResultStore {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    /// 写入一条记录，返回文件路径
    pub async fn save(&self, record: &QueryRecord) -> AppResult<PathBuf> {
        let stamped_at = parse_timestamp(&record.file_timestamp);
        let dir = self.record_dir(&record.query_name, &stamped_at);

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::file(dir.display().to_string(), e))?;

        let file_name = generate_filename(
            &record.query_input.values(),
            STATUS_SUCCESS,
            &record.file_timestamp,
            "json",
        );
        let path = dir.join(file_name);

        let json = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| AppError::file(path.display().to_string(), e))?;

        info!("📦 结果已保存: {}", path.display());
        Ok(path)
    }

    fn record_dir(&self, query_name: &str, at: &NaiveDateTime) -> PathBuf {
        self.output_root
            .join("parser")
            .join(query_name)
            .join(at.year().to_string())
            .join(at.month().to_string())
            .join(at.day().to_string())
            .join(at.hour().to_string())
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }
}

/// 生成文件名：输入值用 `#@#` 连接（空格换成 `_`），再拼上状态和时间戳
pub fn generate_filename(values: &[&str], status: &str, timestamp: &str, ext: &str) -> String {
    let mut name = values
        .iter()
        .map(|v| v.replace(' ', "_"))
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR);
    name.push_str(&format!(
        "{FIELD_SEPARATOR}{status}{FIELD_SEPARATOR}{timestamp}.{ext}"
    ));
    name
}

/// 时间戳格式不对时退回当前时间，记录仍然要落盘
fn parse_timestamp(timestamp: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).unwrap_or_else(|e| {
        warn!("⚠️ 时间戳 {:?} 无法解析 ({}), 使用当前时间", timestamp, e);
        Local::now().naive_local()
    })
}
