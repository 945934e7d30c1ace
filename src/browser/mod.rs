//! 浏览器资源
//!
//! 每次抓取独占一个 `BrowserSession`，结束时无论成功失败都要释放

pub mod connection;
pub mod headless;

use anyhow::Result;
use chromiumoxide::{Browser, Page};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::BrowserMode;

pub use connection::connect_to_browser;
pub use headless::launch_browser;

/// 一次抓取用到的浏览器和页面
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Page,
    /// 浏览器进程是否由本程序启动（连接模式下只关闭页面）
    launched: bool,
}

impl BrowserSession {
    fn new(browser: Browser, handler_task: JoinHandle<()>, page: Page, launched: bool) -> Self {
        Self {
            browser,
            handler_task,
            page,
            launched,
        }
    }

    /// 按配置启动或连接浏览器
    pub async fn open(mode: &BrowserMode) -> Result<Self> {
        match mode {
            BrowserMode::Launch {
                executable,
                headless,
            } => launch_browser(executable.as_deref(), *headless).await,
            BrowserMode::Connect { port } => connect_to_browser(*port).await,
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 关闭页面（以及自己启动的浏览器），错误只记录不返回
    pub async fn close(&mut self) {
        if self.launched {
            if let Err(e) = self.browser.close().await {
                warn!("关闭浏览器失败: {}", e);
            }
            if let Err(e) = self.browser.wait().await {
                warn!("等待浏览器退出失败: {}", e);
            }
        } else if let Err(e) = self.page.clone().close().await {
            warn!("关闭页面失败: {}", e);
        }

        self.handler_task.abort();
        debug!("浏览器资源已释放");
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}
