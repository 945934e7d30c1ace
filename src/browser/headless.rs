use std::path::Path;

use anyhow::Result;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use super::BrowserSession;

/// 启动浏览器并打开空白页面
pub async fn launch_browser(executable: Option<&Path>, headless: bool) -> Result<BrowserSession> {
    info!("🚀 启动浏览器 (headless: {})...", headless);

    let mut builder = BrowserConfig::builder();
    builder = if headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(path) = executable {
        debug!("浏览器路径: {}", path.display());
        builder = builder.chrome_executable(path);
    }

    let config = builder
        .args(vec![
            "--disable-gpu",
            "--no-sandbox",            // 容器里没有沙盒权限
            "--disable-dev-shm-usage", // 防止共享内存不足
            "--lang=de-DE",
        ])
        .build()
        .map_err(|e| {
            error!("配置浏览器失败: {}", e);
            anyhow::anyhow!("配置浏览器失败: {}", e)
        })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        anyhow::anyhow!("启动浏览器失败: {}", e)
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    // 创建页面失败时 browser 在这里被 drop，进程随之结束
    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建页面失败: {}", e);
        handler_task.abort();
        anyhow::anyhow!("创建页面失败: {}", e)
    })?;

    Ok(BrowserSession::new(browser, handler_task, page, true))
}
