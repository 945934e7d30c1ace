//! 定时导出
//!
//! 按固定间隔抓取分数并写入指标，同一时间只有一个浏览器会话

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{error, warn};

use crate::config::{Config, SmsProviderConfig};
use crate::error::AppResult;
use crate::models::{ScoreRecord, ScoreSummary};
use crate::orchestrator::retrieval::fetch_score;
use crate::services::{build_code_source, build_metrics_sink, CodeSource, MetricsSink};
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    code_source: Arc<dyn CodeSource>,
    sink: Box<dyn MetricsSink>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Self {
        let code_source = build_code_source(&config.sms_provider);
        let sink = build_metrics_sink(config.influx.as_ref());

        let provider = match config.sms_provider {
            SmsProviderConfig::HttpSms { .. } => "httpsms",
            SmsProviderConfig::Webhook => "webhook",
        };
        logging::log_startup(provider, config.interval);

        Self {
            config,
            code_source,
            sink,
        }
    }

    /// 运行抓取循环，只有在 `exit_on_error` 时才会返回错误
    pub async fn run(&self) -> AppResult<()> {
        let mut cycle: u64 = 0;
        loop {
            cycle += 1;
            logging::log_cycle_start(cycle);

            let result = self.run_once().await;
            match result {
                Ok(summary) => logging::log_cycle_complete(cycle, &summary),
                Err(e) if self.config.exit_on_error => {
                    error!("❌ 第 {} 轮失败，程序退出: {}", cycle, e);
                    return Err(e);
                }
                Err(e) => warn!("⚠️ 第 {} 轮失败，等待下一轮: {}", cycle, e),
            }

            logging::log_next_cycle(self.config.interval);
            sleep(self.config.interval).await;
        }
    }

    /// 抓取一次并写入指标
    pub async fn run_once(&self) -> AppResult<ScoreSummary> {
        let record = fetch_score(&self.config, self.code_source.clone()).await?;
        publish_record(self.sink.as_ref(), &record).await
    }
}

/// 汇总抓取结果并写入指标
pub async fn publish_record(
    sink: &dyn MetricsSink,
    record: &ScoreRecord,
) -> AppResult<ScoreSummary> {
    let summary = ScoreSummary::from_record(record);
    sink.publish(&summary).await?;
    Ok(summary)
}
