use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// 门户默认入口
pub const DEFAULT_PORTAL_URL: &str = "https://pkp.meineschufa.de/sao/uebersicht";
/// httpSMS 默认接口地址
pub const DEFAULT_HTTPSMS_BASE_URL: &str = "https://api.httpsms.com";

/// 不会出现在 Debug 输出里的敏感字符串
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// 登录凭据
#[derive(Clone, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: Secret,
}

/// 验证码来源
#[derive(Clone, Debug)]
pub enum SmsProviderConfig {
    /// 通过 httpSMS 接口读取最新短信
    HttpSms {
        number: String,
        api_key: Secret,
        base_url: String,
        sender: String,
        max_attempts: u32,
        poll_interval: Duration,
    },
    /// 验证由其他渠道完成，总是返回空验证码
    Webhook,
}

/// 验证码为空时的处理方式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EmptyCodePolicy {
    /// 照常填写并提交空验证码
    #[default]
    Submit,
    /// 不碰验证码输入框，直接等待看板
    Skip,
    /// 视为验证码获取失败
    Reject,
}

impl FromStr for EmptyCodePolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "submit" => Ok(EmptyCodePolicy::Submit),
            "skip" => Ok(EmptyCodePolicy::Skip),
            "reject" => Ok(EmptyCodePolicy::Reject),
            _ => Err(()),
        }
    }
}

/// 浏览器获取方式
#[derive(Clone, Debug)]
pub enum BrowserMode {
    /// 每次启动一个新的浏览器进程
    Launch {
        executable: Option<PathBuf>,
        headless: bool,
    },
    /// 连接到已在调试端口运行的浏览器
    Connect { port: u16 },
}

/// 登录流程中的各种等待时间
#[derive(Clone, Debug)]
pub struct Timeouts {
    /// 探测可选控件（Cookie 按钮、登录表单、发送短信按钮）
    pub probe: Duration,
    /// 点击发送短信后，查询验证码前的等待
    pub sms_settle: Duration,
    /// 等待看板出现
    pub dashboard: Duration,
    /// 读取卡片必填字段
    pub element: Duration,
    /// 读取卡片可选字段
    pub optional: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            probe: Duration::from_secs(3),
            sms_settle: Duration::from_secs(10),
            dashboard: Duration::from_secs(30),
            element: Duration::from_secs(5),
            optional: Duration::from_secs(1),
        }
    }
}

/// InfluxDB v2 写入配置
#[derive(Clone, Debug)]
pub struct InfluxConfig {
    pub url: String,
    pub token: Secret,
    pub org: String,
    pub bucket: String,
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 门户入口 URL
    pub portal_url: String,
    pub credentials: Credentials,
    pub sms_provider: SmsProviderConfig,
    pub empty_code_policy: EmptyCodePolicy,
    pub timeouts: Timeouts,
    pub browser: BrowserMode,
    /// 未配置时只把指标写进日志
    pub influx: Option<InfluxConfig>,
    /// 两次抓取之间的间隔
    pub interval: Duration,
    /// 抓取失败时是否直接退出
    pub exit_on_error: bool,
}

impl Config {
    /// 从进程环境变量读取配置
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取配置
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };
        let defaults = Timeouts::default();

        let credentials = Credentials {
            username: env.required("MEINESCHUFA_USERNAME")?,
            password: Secret::new(env.required("MEINESCHUFA_PASSWORD")?),
        };

        let provider = env.required("SMS_PROVIDER")?;
        let sms_provider = match provider.trim() {
            "httpsms" => SmsProviderConfig::HttpSms {
                number: env.required("HTTPSMS_NUMBER")?,
                api_key: Secret::new(env.required("HTTPSMS_API_KEY")?),
                base_url: env
                    .optional("HTTPSMS_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_HTTPSMS_BASE_URL.to_string()),
                sender: env
                    .optional("HTTPSMS_SENDER")
                    .unwrap_or_else(|| "Schufa".to_string()),
                max_attempts: env.parsed("HTTPSMS_MAX_ATTEMPTS", "u32")?.unwrap_or(3),
                poll_interval: env
                    .secs("HTTPSMS_POLL_INTERVAL_SECS")?
                    .unwrap_or(Duration::from_secs(5)),
            },
            "webhook" => SmsProviderConfig::Webhook,
            other => {
                return Err(ConfigError::UnknownSmsProvider {
                    provider: other.to_string(),
                })
            }
        };

        let empty_code_policy = match env.optional("EMPTY_CODE_POLICY") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::EnvVarParseFailed {
                    var_name: "EMPTY_CODE_POLICY".to_string(),
                    value,
                    expected_type: "submit|skip|reject".to_string(),
                })?,
            None => EmptyCodePolicy::default(),
        };

        let timeouts = Timeouts {
            probe: env.secs("PROBE_TIMEOUT_SECS")?.unwrap_or(defaults.probe),
            sms_settle: env.secs("SMS_SETTLE_SECS")?.unwrap_or(defaults.sms_settle),
            dashboard: env
                .secs("DASHBOARD_TIMEOUT_SECS")?
                .unwrap_or(defaults.dashboard),
            element: env.secs("ELEMENT_TIMEOUT_SECS")?.unwrap_or(defaults.element),
            optional: defaults.optional,
        };

        let browser = match env.parsed::<u16>("BROWSER_DEBUG_PORT", "u16")? {
            Some(port) => BrowserMode::Connect { port },
            None => BrowserMode::Launch {
                executable: env.optional("CHROME_EXECUTABLE").map(PathBuf::from),
                headless: env.parsed("HEADLESS", "bool")?.unwrap_or(true),
            },
        };

        let influx = match env.optional("INFLUXDB_URL") {
            Some(url) => Some(InfluxConfig {
                url,
                token: Secret::new(env.required("INFLUXDB_TOKEN")?),
                org: env.required("INFLUXDB_ORG")?,
                bucket: env.required("INFLUXDB_BUCKET")?,
            }),
            None => None,
        };

        Ok(Self {
            portal_url: env
                .optional("PORTAL_URL")
                .unwrap_or_else(|| DEFAULT_PORTAL_URL.to_string()),
            credentials,
            sms_provider,
            empty_code_policy,
            timeouts,
            browser,
            influx,
            interval: env
                .secs("EXPORT_INTERVAL_SECS")?
                .unwrap_or(Duration::from_secs(3600)),
            exit_on_error: env.parsed("EXIT_ON_ERROR", "bool")?.unwrap_or(false),
        })
    }
}

#[cfg(test)]
impl Config {
    /// 不需要环境变量、所有等待均为零的配置
    pub(crate) fn for_tests() -> Self {
        Self {
            portal_url: DEFAULT_PORTAL_URL.to_string(),
            credentials: Credentials {
                username: "user@example.org".to_string(),
                password: Secret::new("hunter2"),
            },
            sms_provider: SmsProviderConfig::Webhook,
            empty_code_policy: EmptyCodePolicy::Submit,
            timeouts: Timeouts {
                probe: Duration::ZERO,
                sms_settle: Duration::ZERO,
                dashboard: Duration::ZERO,
                element: Duration::ZERO,
                optional: Duration::ZERO,
            },
            browser: BrowserMode::Connect { port: 9222 },
            influx: None,
            interval: Duration::ZERO,
            exit_on_error: false,
        }
    }
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key).ok_or_else(|| ConfigError::EnvVarNotFound {
            var_name: key.to_string(),
        })
    }

    fn parsed<T: FromStr>(&self, key: &str, expected: &str) -> Result<Option<T>, ConfigError> {
        match self.optional(key) {
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::EnvVarParseFailed {
                    var_name: key.to_string(),
                    value,
                    expected_type: expected.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn secs(&self, key: &str) -> Result<Option<Duration>, ConfigError> {
        Ok(self.parsed::<u64>(key, "u64")?.map(Duration::from_secs))
    }
}
