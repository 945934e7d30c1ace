//! 测试用的假页面
//!
//! 元素存在与否由测试预先设定，所有操作按顺序记录下来

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::PageDriver;

#[derive(Default)]
pub struct FakePage {
    present: HashSet<String>,
    texts: HashSet<String>,
    attributes: HashMap<(String, String), String>,
    tile_scope: String,
    tiles: Vec<HashMap<String, String>>,
    failing: HashSet<String>,
    actions: Mutex<Vec<String>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self {
            tile_scope: ".sao-kachel".to_string(),
            ..Default::default()
        }
    }

    pub fn with_element(mut self, selector: &str) -> Self {
        self.present.insert(selector.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.texts.insert(text.to_string());
        self
    }

    pub fn with_attribute(mut self, selector: &str, name: &str, value: &str) -> Self {
        self.present.insert(selector.to_string());
        self.attributes
            .insert((selector.to_string(), name.to_string()), value.to_string());
        self
    }

    pub fn with_tile(mut self, fields: &[(&str, &str)]) -> Self {
        self.tiles.push(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    /// 对该选择器（或 goto 的 URL）的操作都会失败。
    /// `"click <sel>"` / `"enter <sel>"` 只让点击 / 回车失败
    pub fn failing_on(mut self, target: &str) -> Self {
        self.failing.insert(target.to_string());
        self
    }

    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }

    fn record(&self, action: String) {
        self.actions.lock().unwrap().push(action);
    }

    fn check(&self, target: &str) -> Result<()> {
        if self.failing.contains(target) {
            Err(anyhow!("simulated failure on {}", target))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.record(format!("goto {}", url));
        self.check(url)
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> Result<bool> {
        self.check(selector)?;
        Ok(self.present.contains(selector))
    }

    async fn wait_for_text(&self, text: &str, _timeout: Duration) -> Result<bool> {
        Ok(self.texts.contains(text))
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let action = format!("click {}", selector);
        self.record(action.clone());
        self.check(selector)?;
        self.check(&action)
    }

    async fn click_text(&self, text: &str) -> Result<()> {
        self.record(format!("click_text {}", text));
        self.check(text)
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        self.record(format!("fill {}={}", selector, value));
        self.check(selector)
    }

    async fn press_enter(&self, selector: &str) -> Result<()> {
        self.record(format!("enter {}", selector));
        self.check(&format!("enter {}", selector))
    }

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        Ok(self
            .attributes
            .get(&(selector.to_string(), name.to_string()))
            .cloned())
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        self.check(selector)?;
        if selector == self.tile_scope {
            Ok(self.tiles.len())
        } else {
            Ok(usize::from(self.present.contains(selector)))
        }
    }

    async fn text_within(
        &self,
        scope: &str,
        index: usize,
        selector: &str,
        _timeout: Duration,
    ) -> Result<Option<String>> {
        if scope != self.tile_scope {
            return Ok(None);
        }
        Ok(self
            .tiles
            .get(index)
            .and_then(|tile| tile.get(selector))
            .cloned())
    }
}
