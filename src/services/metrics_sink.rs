//! 指标写入服务 - 业务能力层
//!
//! 把 `ScoreSummary` 写入 InfluxDB，或者只写日志

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::InfluxConfig;
use crate::error::ExportError;
use crate::models::ScoreSummary;

/// 指标写入能力
#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn publish(&self, summary: &ScoreSummary) -> Result<(), ExportError>;
}

/// 根据配置创建指标写入服务
pub fn build_metrics_sink(influx: Option<&InfluxConfig>) -> Box<dyn MetricsSink> {
    match influx {
        Some(config) => Box::new(InfluxSink::new(config)),
        None => Box::new(LogSink),
    }
}

/// InfluxDB v2 写入
pub struct InfluxSink {
    client: reqwest::Client,
    url: String,
    token: String,
    org: String,
    bucket: String,
}

impl InfluxSink {
    pub fn new(config: &InfluxConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.url.trim_end_matches('/').to_string(),
            token: config.token.expose().to_string(),
            org: config.org.clone(),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl MetricsSink for InfluxSink {
    async fn publish(&self, summary: &ScoreSummary) -> Result<(), ExportError> {
        let body = to_line_protocol(summary, chrono::Utc::now().timestamp());
        debug!("写入 InfluxDB:\n{}", body);

        let response = self
            .client
            .post(format!("{}/api/v2/write", self.url))
            .query(&[
                ("org", self.org.as_str()),
                ("bucket", self.bucket.as_str()),
                ("precision", "s"),
            ])
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::Rejected {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        info!("✓ 指标已写入 InfluxDB ({} 个点)", 1 + summary.types.len() + summary.categories.len());
        Ok(())
    }
}

/// 只写日志，未配置 InfluxDB 时使用
pub struct LogSink;

#[async_trait]
impl MetricsSink for LogSink {
    async fn publish(&self, summary: &ScoreSummary) -> Result<(), ExportError> {
        info!("📈 分数: {} | 记录数: {}", summary.score, summary.entry_count);
        for (entry_type, count) in &summary.types {
            info!("   类型 {}: {}", entry_type, count);
        }
        for (category, count) in &summary.categories {
            info!("   类别 {}: {}", category, count);
        }
        Ok(())
    }
}

/// 空标签值的占位符，InfluxDB 不接受空标签
const EMPTY_TAG: &str = "unknown";

/// 生成 InfluxDB 行协议
///
/// 类别点沿用 `type` 作为标签名。标签值规范化后相同的计数会合并
pub fn to_line_protocol(summary: &ScoreSummary, timestamp: i64) -> String {
    let mut lines = vec![format!(
        "score value={},data={}i {}",
        summary.score, summary.entry_count, timestamp
    )];

    for (measurement, counts) in [("types", &summary.types), ("categories", &summary.categories)] {
        let mut merged: BTreeMap<String, u64> = BTreeMap::new();
        for (tag, count) in counts {
            *merged.entry(escape_tag(tag)).or_default() += count;
        }
        for (tag, count) in merged {
            lines.push(format!("{},type={} value={}i {}", measurement, tag, count, timestamp));
        }
    }

    lines.join("\n")
}

/// 转义标签值：空白折叠成单个空格，空值换成占位符
fn escape_tag(value: &str) -> String {
    let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return EMPTY_TAG.to_string();
    }

    let mut escaped = String::with_capacity(normalized.len());
    for c in normalized.chars() {
        if matches!(c, ',' | '=' | ' ' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
