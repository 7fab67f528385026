use anyhow::Result;
use parcel_tracking_query::utils::logging;
use parcel_tracking_query::{App, Config};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置：指定了 CONFIG_FILE 时读取 TOML，否则读取环境变量
    let config = match std::env::var("CONFIG_FILE") {
        Ok(path) => Config::from_toml_file(Path::new(&path))?,
        Err(_) => Config::from_env(),
    };

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let stats = App::initialize(config).await?.run().await?;

    if stats.failed > 0 {
        anyhow::bail!("{} 条记录查询失败", stats.failed);
    }

    Ok(())
}
