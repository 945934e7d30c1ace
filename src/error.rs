use std::time::Duration;

use thiserror::Error;

/// 第三方错误的统一装箱类型
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 登录流程错误
    #[error("登录流程错误: {0}")]
    Session(#[from] SessionError),
    /// 看板解析错误
    #[error("看板解析错误: {0}")]
    Extract(#[from] ExtractError),
    /// 短信验证码获取错误
    #[error("短信验证码错误: {0}")]
    Sms(#[from] SmsError),
    /// 指标导出错误
    #[error("指标导出错误: {0}")]
    Export(#[from] ExportError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 登录流程中每一步的错误，均带有步骤信息
#[derive(Debug, Error)]
pub enum SessionError {
    /// 启动或连接浏览器失败
    #[error("[browser] 无法获取浏览器页面: {source}")]
    BrowserLaunch { source: BoxError },
    /// 导航失败
    #[error("[navigate] 导航到 {url} 失败: {source}")]
    Navigation { url: String, source: BoxError },
    /// 接受 Cookie 失败
    #[error("[consent] 无法接受 Cookie 提示: {source}")]
    Consent { source: BoxError },
    /// 填写登录表单失败
    #[error("[login] 无法填写 {field}: {source}")]
    LoginFill {
        field: &'static str,
        source: BoxError,
    },
    /// 提交登录表单失败
    #[error("[login] 无法提交登录表单: {source}")]
    LoginSubmit { source: BoxError },
    /// 请求短信验证码失败
    #[error("[sms] 无法请求短信验证码: {source}")]
    SmsRequest { source: BoxError },
    /// 验证码获取失败
    #[error("[code] 无法获取短信验证码: {0}")]
    CodeDelivery(#[from] SmsError),
    /// 验证码为空且策略要求拒绝
    #[error("[code] 获取到的短信验证码为空")]
    EmptyCode,
    /// 填写或提交验证码失败
    #[error("[code] 无法提交短信验证码: {source}")]
    CodeSubmit { source: BoxError },
    /// 等待看板时浏览器出错
    #[error("[dashboard] 等待看板时出错: {source}")]
    Dashboard { source: BoxError },
    /// 看板在超时时间内未出现（包括验证码被拒绝的情况）
    #[error("[dashboard] 看板在 {timeout:?} 内未出现")]
    DashboardTimeout { timeout: Duration },
}

impl SessionError {
    /// 出错的步骤名称
    pub fn step(&self) -> &'static str {
        match self {
            SessionError::BrowserLaunch { .. } => "browser",
            SessionError::Navigation { .. } => "navigate",
            SessionError::Consent { .. } => "consent",
            SessionError::LoginFill { .. } | SessionError::LoginSubmit { .. } => "login",
            SessionError::SmsRequest { .. } => "sms",
            SessionError::CodeDelivery(_)
            | SessionError::EmptyCode
            | SessionError::CodeSubmit { .. } => "code",
            SessionError::Dashboard { .. } | SessionError::DashboardTimeout { .. } => "dashboard",
        }
    }
}

/// 看板解析错误
#[derive(Debug, Error)]
pub enum ExtractError {
    /// 分数不是数字（或分数元素不存在）
    #[error("无法解析分数: {raw:?}")]
    ScoreParse { raw: Option<String> },
    /// 无法枚举卡片
    #[error("无法枚举看板卡片: {source}")]
    TileEnumeration { source: BoxError },
    /// 卡片缺少必填字段，整个结果作废
    #[error("卡片 #{tile} 缺少必填字段 {field}")]
    RequiredFieldMissing { tile: usize, field: &'static str },
    /// 读取页面内容失败
    #[error("读取 {target} 失败: {source}")]
    PageRead { target: String, source: BoxError },
}

/// 短信验证码获取错误
#[derive(Debug, Error)]
pub enum SmsError {
    /// 网络请求失败
    #[error("短信接口请求失败: {0}")]
    Request(#[from] reqwest::Error),
    /// 接口返回非成功状态码
    #[error("短信接口返回错误状态 {status}: {body}")]
    BadStatus { status: u16, body: String },
    /// 响应 JSON 解析失败
    #[error("短信接口响应解析失败: {0}")]
    Decode(#[from] serde_json::Error),
    /// 多次轮询后仍未收到短信
    #[error("轮询 {attempts} 次后仍未收到短信")]
    NoMessage { attempts: u32 },
}

/// 指标导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// 网络请求失败
    #[error("写入请求失败: {0}")]
    Request(#[from] reqwest::Error),
    /// 服务端拒绝写入
    #[error("写入被拒绝 ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },
    /// 未知的短信提供方
    #[error("未知的短信提供方: {provider}")]
    UnknownSmsProvider { provider: String },
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
