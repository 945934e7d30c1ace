//! 看板解析服务 - 业务能力层
//!
//! 只负责把已登录的看板解析成 `ScoreRecord`

use std::time::Duration;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::ExtractError;
use crate::infrastructure::PageDriver;
use crate::models::{RecordEntry, ScoreRecord};
use crate::portal::DashboardSelectors;
use crate::workflow::AuthenticatedPage;

/// 看板解析服务
///
/// 任意一张卡片缺少必填字段时整个结果作废，不返回部分数据。
/// 只有 details 是可选的，缺失时记为空字符串。
pub struct RecordExtractor {
    selectors: DashboardSelectors,
    element_timeout: Duration,
    optional_timeout: Duration,
}

impl RecordExtractor {
    pub fn new(config: &Config) -> Self {
        Self {
            selectors: DashboardSelectors::default(),
            element_timeout: config.timeouts.element,
            optional_timeout: config.timeouts.optional,
        }
    }

    pub fn with_selectors(mut self, selectors: DashboardSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    /// 解析分数和所有卡片
    pub async fn extract<D: PageDriver + ?Sized>(
        &self,
        authenticated: &AuthenticatedPage<'_, D>,
    ) -> Result<ScoreRecord, ExtractError> {
        let page = authenticated.page();

        let raw_score = page
            .attribute(&self.selectors.score_element, &self.selectors.score_attribute)
            .await
            .map_err(|e| ExtractError::PageRead {
                target: self.selectors.score_element.clone(),
                source: e.into(),
            })?;
        let mut record = ScoreRecord::new(parse_score(raw_score.as_deref())?);

        let tile_count = page
            .count(&self.selectors.tile)
            .await
            .map_err(|e| ExtractError::TileEnumeration { source: e.into() })?;
        debug!("看板上共有 {} 张卡片", tile_count);

        for index in 0..tile_count {
            record.datalist.push(self.extract_tile(page, index).await?);
        }

        info!(
            "📊 分数 {}，共 {} 条记录",
            record.score,
            record.datalist.len()
        );
        Ok(record)
    }

    async fn extract_tile<D: PageDriver + ?Sized>(
        &self,
        page: &D,
        index: usize,
    ) -> Result<RecordEntry, ExtractError> {
        let s = &self.selectors;

        let heading = self.required(page, index, &s.name, "name").await?;
        let category = self.required(page, index, &s.category, "category").await?;
        let entry_type = self.required(page, index, &s.type_label, "type").await?;
        let details = self.optional(page, index, &s.details).await?;
        let date = self.required(page, index, &s.date, "date").await?;

        Ok(RecordEntry {
            name: heading_name(&heading, &category),
            category,
            entry_type,
            details,
            date,
        })
    }

    async fn required<D: PageDriver + ?Sized>(
        &self,
        page: &D,
        index: usize,
        selector: &str,
        field: &'static str,
    ) -> Result<String, ExtractError> {
        self.read(page, index, selector, self.element_timeout)
            .await?
            .ok_or(ExtractError::RequiredFieldMissing { tile: index, field })
    }

    async fn optional<D: PageDriver + ?Sized>(
        &self,
        page: &D,
        index: usize,
        selector: &str,
    ) -> Result<String, ExtractError> {
        match self.read(page, index, selector, self.optional_timeout).await? {
            Some(text) => Ok(text),
            None => {
                debug!("卡片 #{} 没有 {}，记为空", index, selector);
                Ok(String::new())
            }
        }
    }

    async fn read<D: PageDriver + ?Sized>(
        &self,
        page: &D,
        index: usize,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<String>, ExtractError> {
        let text = page
            .text_within(&self.selectors.tile, index, selector, timeout)
            .await
            .map_err(|e| ExtractError::PageRead {
                target: format!("卡片 #{} {}", index, selector),
                source: e.into(),
            })?;
        Ok(text.map(|t| t.trim().to_string()))
    }
}

/// 把分数属性解析成数字
pub fn parse_score(raw: Option<&str>) -> Result<f32, ExtractError> {
    let parse_error = || ExtractError::ScoreParse {
        raw: raw.map(str::to_string),
    };

    let value: f32 = raw
        .ok_or_else(parse_error)?
        .trim()
        .parse()
        .map_err(|_| parse_error())?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(parse_error())
    }
}

/// 标题的 innerText 里包含嵌套的类别标签，去掉它只留名称
fn heading_name(heading: &str, category: &str) -> String {
    let heading = heading.trim();
    if category.is_empty() {
        return heading.to_string();
    }
    heading
        .strip_suffix(category)
        .map(str::trim_end)
        .filter(|name| !name.is_empty())
        .unwrap_or(heading)
        .to_string()
}
