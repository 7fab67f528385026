//! 查询执行上下文
//!
//! 封装"我正在执行哪个查询的第几条记录"这一信息

use std::fmt::Display;

/// 查询执行上下文
#[derive(Debug, Clone)]
pub struct QueryCtx {
    /// 查询名称
    pub query_name: String,

    /// 输入记录序号（从1开始，仅用于日志显示）
    pub run_index: usize,
}

impl QueryCtx {
    pub fn new(query_name: impl Into<String>, run_index: usize) -> Self {
        Self {
            query_name: query_name.into(),
            run_index,
        }
    }
}

impl Display for QueryCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[查询 {}#{}]", self.query_name, self.run_index)
    }
}
