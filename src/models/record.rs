//! 持久化记录：查询结果 + 运行元数据

use crate::models::query::{QueryResult, SearchCriteria};
use serde::{Deserialize, Serialize};

/// 文件时间戳格式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d--%H:%M:%S";

/// 写入存储的完整记录
///
/// 结果字段被展开到顶层，与元数据并列。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub query_name: String,
    pub query_version: String,
    pub query_input: SearchCriteria,
    pub query_date: String,
    pub file_timestamp: String,
    #[serde(flatten)]
    pub result: QueryResult,
}
