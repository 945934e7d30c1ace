//! 短信验证码来源 - 业务能力层
//!
//! 登录流程只依赖 `CodeSource`，不关心验证码从哪里来

pub mod httpsms;
pub mod webhook;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::SmsProviderConfig;
use crate::error::SmsError;

pub use httpsms::HttpSmsCodeSource;
pub use webhook::WebhookCodeSource;

/// 获取最新短信验证码的能力
///
/// 调用可能阻塞较长时间；超时和重试由实现自己负责
#[async_trait]
pub trait CodeSource: Send + Sync {
    async fn latest_code(&self) -> Result<String, SmsError>;
}

/// 根据配置创建验证码来源
pub fn build_code_source(config: &SmsProviderConfig) -> Arc<dyn CodeSource> {
    match config {
        SmsProviderConfig::HttpSms {
            number,
            api_key,
            base_url,
            sender,
            max_attempts,
            poll_interval,
        } => Arc::new(
            HttpSmsCodeSource::new(base_url, number, api_key.expose())
                .with_sender(sender)
                .with_polling(*max_attempts, *poll_interval),
        ),
        SmsProviderConfig::Webhook => Arc::new(WebhookCodeSource),
    }
}
