//! httpSMS 验证码来源
//!
//! 读取手机上 httpSMS 应用转发的最新一条短信，从正文中取出验证码

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::CodeSource;
use crate::error::SmsError;

/// 短信正文中验证码后面的固定文字
pub const MESSAGE_SUFFIX: &str = " ist Ihr Sicherheitscode für den Login auf www.meineSCHUFA.de";

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    data: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    id: String,
    content: String,
}

/// httpSMS 验证码来源
pub struct HttpSmsCodeSource {
    client: reqwest::Client,
    base_url: String,
    number: String,
    api_key: String,
    sender: String,
    max_attempts: u32,
    poll_interval: Duration,
}

impl HttpSmsCodeSource {
    pub fn new(base_url: &str, number: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            number: number.to_string(),
            api_key: api_key.to_string(),
            sender: "Schufa".to_string(),
            max_attempts: 3,
            poll_interval: Duration::from_secs(5),
        }
    }

    /// 按发件人过滤短信
    pub fn with_sender(mut self, sender: &str) -> Self {
        self.sender = sender.to_string();
        self
    }

    /// 收件箱为空时的轮询次数和间隔
    pub fn with_polling(mut self, max_attempts: u32, poll_interval: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.poll_interval = poll_interval;
        self
    }

    async fn fetch_latest(&self) -> Result<Option<Message>, SmsError> {
        let response = self
            .client
            .get(format!("{}/v1/messages", self.base_url))
            .query(&[
                ("owner", self.number.as_str()),
                ("contact", self.sender.as_str()),
                ("limit", "1"),
            ])
            .header("Accept", "application/json")
            .header("X-API-KEY", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SmsError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)?;
        Ok(parsed.data.into_iter().next())
    }
}

#[async_trait]
impl CodeSource for HttpSmsCodeSource {
    async fn latest_code(&self) -> Result<String, SmsError> {
        for attempt in 1..=self.max_attempts {
            if let Some(message) = self.fetch_latest().await? {
                debug!("收到短信 id={}", message.id);
                let code = extract_code(&message.content);
                info!("📨 已从 httpSMS 获取验证码（{} 位）", code.chars().count());
                return Ok(code);
            }

            warn!("httpSMS 暂无短信 (尝试 {}/{})", attempt, self.max_attempts);
            if attempt < self.max_attempts {
                sleep(self.poll_interval).await;
            }
        }

        Err(SmsError::NoMessage {
            attempts: self.max_attempts,
        })
    }
}

fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+").expect("验证码正则无效"))
}

/// 去掉固定后缀后取出第一段数字；没有数字时返回去掉后缀的正文
pub fn extract_code(content: &str) -> String {
    let stripped = content.replacen(MESSAGE_SUFFIX, "", 1);
    match code_pattern().find(&stripped) {
        Some(m) => m.as_str().to_string(),
        None => stripped.trim().to_string(),
    }
}
