//! 页面能力抽象
//!
//! 登录流程和看板解析只通过这个 trait 操作页面，测试时可以换成假页面

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

/// 单个浏览器页面暴露的操作
///
/// 所有 `wait_*` 方法在超时后返回 `false` / `None`，而不是错误：
/// 控件不存在是正常情况，由调用方决定是否致命。
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// 导航到指定 URL 并等待加载完成
    async fn goto(&self, url: &str) -> Result<()>;

    /// 等待选择器匹配的元素出现
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool>;

    /// 等待包含指定文字的按钮或链接出现
    async fn wait_for_text(&self, text: &str, timeout: Duration) -> Result<bool>;

    /// 点击选择器匹配的第一个元素
    async fn click(&self, selector: &str) -> Result<()>;

    /// 点击包含指定文字的按钮或链接
    async fn click_text(&self, text: &str) -> Result<()>;

    /// 清空输入框并输入内容
    async fn fill(&self, selector: &str, value: &str) -> Result<()>;

    /// 在元素上按下回车
    async fn press_enter(&self, selector: &str) -> Result<()>;

    /// 读取元素属性，元素或属性不存在时返回 `None`
    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>>;

    /// 统计匹配的元素数量
    async fn count(&self, selector: &str) -> Result<usize>;

    /// 在第 `index` 个 `scope` 元素内部读取 `selector` 的文本
    ///
    /// 最多等待 `timeout`，仍不存在时返回 `None`
    async fn text_within(
        &self,
        scope: &str,
        index: usize,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<String>>;
}
