use anyhow::Result;
use schufa_score_exporter::utils::logging;
use schufa_score_exporter::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 读取 .env（文件不存在时忽略），要在日志之前，RUST_LOG 也可能写在里面
    let dotenv = dotenvy::dotenv();

    // 初始化日志
    logging::init();
    if let Ok(path) = dotenv {
        tracing::debug!("已加载 {}", path.display());
    }

    // 加载配置
    let config = Config::from_env()?;

    // 初始化并运行应用
    App::initialize(config).run().await?;

    Ok(())
}
