//! 单次抓取
//!
//! 打开浏览器 → 登录 → 解析看板 → 关闭浏览器

use std::sync::Arc;

use tracing::{error, info};

use crate::browser::BrowserSession;
use crate::config::Config;
use crate::error::{AppResult, SessionError};
use crate::infrastructure::{ChromiumPage, PageDriver};
use crate::models::ScoreRecord;
use crate::services::{CodeSource, RecordExtractor};
use crate::workflow::SessionFlow;

/// 完整抓取一次分数
///
/// 浏览器在所有返回路径上都会被关闭
pub async fn fetch_score(
    config: &Config,
    code_source: Arc<dyn CodeSource>,
) -> AppResult<ScoreRecord> {
    let mut session = BrowserSession::open(&config.browser)
        .await
        .map_err(|e| SessionError::BrowserLaunch { source: e.into() })?;

    let page = ChromiumPage::new(session.page().clone());
    let result = retrieve(&page, config, code_source).await;

    session.close().await;

    if let Err(e) = &result {
        error!("❌ 抓取失败: {}", e);
    }
    result
}

/// 在给定页面上登录并解析看板
pub async fn retrieve<D: PageDriver + ?Sized>(
    page: &D,
    config: &Config,
    code_source: Arc<dyn CodeSource>,
) -> AppResult<ScoreRecord> {
    let authenticated = SessionFlow::new(page, config, code_source)
        .authenticate()
        .await?;

    let record = RecordExtractor::new(config).extract(&authenticated).await?;
    info!("✓ 抓取完成");
    Ok(record)
}
