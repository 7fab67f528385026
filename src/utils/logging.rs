/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志订阅器
///
/// `RUST_LOG` 优先；未设置时默认 `info`，详细模式下为 `debug`。
/// 重复调用不会报错。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `max_concurrent`: 最大并发数
/// - `output_root`: 结果输出根目录
pub fn log_startup(max_concurrent: usize, output_root: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 包裹追踪批量查询");
    info!("📊 最大并发数: {}", max_concurrent);
    info!("📂 输出目录: {}", output_root);
    info!("{}", "=".repeat(60));
}

/// 记录输入加载信息
pub fn log_records_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 条待查询的记录", total);
    info!("📋 同时最多执行 {} 个查询\n", max_concurrent);
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 找到包裹的数量
/// - `empty`: 空结果数量
/// - `failed`: 失败数量
/// - `total`: 总数
pub fn print_final_stats(success: usize, empty: usize, failed: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 找到包裹: {}/{}", success, total);
    info!("📭 空结果: {}", empty);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
