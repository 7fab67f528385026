//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量查询处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载输入记录
//! - 控制并发数量
//! - 输出全局统计信息
//!
//! ### `query_runner` - 单次查询执行器
//! - 校验输入、附加运行元数据
//! - 把结果交给 `ResultStore` 落盘
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<SearchCriteria>)
//!     ↓
//! query_runner (元数据 + 持久化)
//!     ↓
//! workflow::QueryPipeline (处理单条记录)
//!     ↓
//! services (能力层：验证码 / 会话 / 提交 / 解析 / 存储)
//!     ↓
//! infrastructure (基础设施：HTTP 会话、OCR、临时目录)
//! ```

pub mod batch_processor;
pub mod query_runner;

pub use batch_processor::{App, ProcessingStats};
pub use query_runner::QueryRunner;
