use async_trait::async_trait;
use tracing::info;

use super::CodeSource;
use crate::error::SmsError;

/// 验证由外部 webhook 完成时使用的占位实现，总是返回空验证码
#[derive(Debug, Default, Clone, Copy)]
pub struct WebhookCodeSource;

#[async_trait]
impl CodeSource for WebhookCodeSource {
    async fn latest_code(&self) -> Result<String, SmsError> {
        info!("📨 验证码由 webhook 渠道处理，返回空验证码");
        Ok(String::new())
    }
}
