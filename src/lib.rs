//! # Parcel Tracking Query
//!
//! 验证码保护的包裹追踪站点查询程序：输入姓名、税号、邮编，输出包裹及其状态历史
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源，只暴露能力
//! - `HttpSession` - 带 Cookie 的 HTTP 会话，一次执行独占一个
//! - `OcrEngine` - 图片 → 文本
//! - `ScratchSpace` - 每次执行独立的临时目录
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `SessionBootstrapper` - 建立会话
//! - `CaptchaSolver` - 下载、预处理、识别验证码
//! - `FormSubmitter` - 提交查询表单
//! - `result_extractor` - 解析列表页与详情页
//! - `ResultStore` - 结果落盘
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一条记录"的完整查询流程
//! - `QueryCtx` - 上下文封装（查询名称 + 记录序号）
//! - `QueryPipeline` - 流程编排（会话 → 验证码 → 提交 → 解析，含重启策略）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量查询处理器，管理并发和统计
//! - `orchestrator/query_runner` - 附加运行元数据并保存结果
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{QueryRecord, QueryResult, SearchCriteria};
pub use orchestrator::{App, ProcessingStats, QueryRunner};
pub use workflow::{QueryCtx, QueryPipeline};
