//! Chromium 页面 - 基础设施层
//!
//! 持有唯一的 page 资源，通过执行 JS 和 CDP 输入事件实现 `PageDriver`

use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, Instant};
use tracing::debug;

use super::PageDriver;

/// 轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 可点击元素的选择器（用于按文字查找按钮）
const CLICKABLE: &str = "button, a, [role=button], input[type=submit]";

/// Chromium 页面
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 和 `PageDriver` 能力
/// - 不认识登录流程和看板结构
pub struct ChromiumPage {
    page: Page,
}

impl ChromiumPage {
    /// 创建新的页面封装
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 执行 JS 表达式并返回 JSON 结果
    ///
    /// 表达式的值会先在页面里 `JSON.stringify`，这样 `null` 也能原样带回来
    pub async fn eval(&self, js_expr: &str) -> Result<JsonValue> {
        let wrapped = format!("JSON.stringify(({}) ?? null)", js_expr);
        let result = self.page.evaluate(wrapped).await?;
        let text: String = result.into_value()?;
        Ok(serde_json::from_str(&text)?)
    }

    /// 执行 JS 表达式并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_expr: &str) -> Result<T> {
        let json_value = self.eval(js_expr).await?;
        Ok(serde_json::from_value(json_value)?)
    }

    /// 反复执行表达式，直到返回非 null 或超时
    ///
    /// 页面跳转期间执行上下文会被销毁，这类错误按"尚未出现"处理
    async fn poll<T: DeserializeOwned>(&self, js_expr: &str, timeout: Duration) -> Result<Option<T>> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.eval_as::<Option<T>>(js_expr).await {
                Ok(Some(value)) => return Ok(Some(value)),
                Ok(None) => {}
                Err(e) => debug!("轮询时执行脚本失败（页面可能正在跳转）: {}", e),
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}

/// 把字符串转成 JS 字面量
fn js_str(value: &str) -> String {
    JsonValue::String(value.to_string()).to_string()
}

#[async_trait]
impl PageDriver for ChromiumPage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool> {
        let js = format!(
            "document.querySelector({}) !== null ? true : null",
            js_str(selector)
        );
        Ok(self.poll::<bool>(&js, timeout).await?.is_some())
    }

    async fn wait_for_text(&self, text: &str, timeout: Duration) -> Result<bool> {
        let js = format!(
            "Array.from(document.querySelectorAll({})).some(el => (el.innerText || el.value || '').includes({})) ? true : null",
            js_str(CLICKABLE),
            js_str(text)
        );
        Ok(self.poll::<bool>(&js, timeout).await?.is_some())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.page.find_element(selector).await?.click().await?;
        Ok(())
    }

    async fn click_text(&self, text: &str) -> Result<()> {
        let js = format!(
            r#"(() => {{
                const el = Array.from(document.querySelectorAll({}))
                    .find(el => (el.innerText || el.value || '').includes({}));
                if (!el) return false;
                el.click();
                return true;
            }})()"#,
            js_str(CLICKABLE),
            js_str(text)
        );

        if !self.eval_as::<bool>(&js).await? {
            bail!("未找到包含文字 '{}' 的按钮", text);
        }
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let element = self.page.find_element(selector).await?;
        element.click().await?;

        let clear = format!(
            r#"(() => {{
                const el = document.querySelector({});
                if (!el) return false;
                el.value = '';
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                return true;
            }})()"#,
            js_str(selector)
        );
        self.eval(&clear).await?;

        if !value.is_empty() {
            element.type_str(value).await?;
        }
        Ok(())
    }

    async fn press_enter(&self, selector: &str) -> Result<()> {
        self.page
            .find_element(selector)
            .await?
            .press_key("Enter")
            .await?;
        Ok(())
    }

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({});
                return el ? el.getAttribute({}) : null;
            }})()"#,
            js_str(selector),
            js_str(name)
        );
        self.eval_as(&js).await
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        let js = format!("document.querySelectorAll({}).length", js_str(selector));
        self.eval_as(&js).await
    }

    async fn text_within(
        &self,
        scope: &str,
        index: usize,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<String>> {
        let js = format!(
            r#"(() => {{
                const scope = document.querySelectorAll({})[{}];
                if (!scope) return null;
                const el = scope.querySelector({});
                return el ? el.innerText : null;
            }})()"#,
            js_str(scope),
            index,
            js_str(selector)
        );
        self.poll(&js, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_str_escapes_quotes() {
        assert_eq!(js_str("#username"), r##""#username""##);
        assert_eq!(js_str(r#"a"b"#), r#""a\"b""#);
        assert_eq!(js_str(".kopfbereich > h3"), "\".kopfbereich > h3\"");
    }
}
