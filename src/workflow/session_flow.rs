//! 登录流程 - 流程层
//!
//! 核心职责：把页面从门户入口一路推进到看板
//!
//! 流程顺序：
//! 1. 打开门户 → 接受 Cookie（如有）
//! 2. 填写用户名密码（如有登录表单）
//! 3. 发送短信 → 等待 → 获取验证码 → 提交（如有短信按钮）
//! 4. 等待看板出现（有超时）
//!
//! 每一步先探测控件是否存在再操作，任何一步失败都直接结束，不在这里重试。

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::{Config, Credentials, EmptyCodePolicy, Timeouts};
use crate::error::SessionError;
use crate::infrastructure::PageDriver;
use crate::portal::LoginSelectors;
use crate::services::sms::CodeSource;
use crate::workflow::session_state::SessionState;

/// 已到达看板的页面
///
/// 只能由 `SessionFlow::authenticate` 创建，看板解析必须持有它
pub struct AuthenticatedPage<'a, D: PageDriver + ?Sized> {
    page: &'a D,
}

impl<'a, D: PageDriver + ?Sized> AuthenticatedPage<'a, D> {
    pub fn page(&self) -> &'a D {
        self.page
    }

    #[cfg(test)]
    pub(crate) fn assume_authenticated(page: &'a D) -> Self {
        Self { page }
    }
}

/// 登录流程
///
/// - 持有页面引用、门户地址和凭据
/// - 验证码来源通过构造函数注入
/// - 每次转换都可以单独调用 `step` 测试
pub struct SessionFlow<'a, D: PageDriver + ?Sized> {
    page: &'a D,
    portal_url: String,
    credentials: Credentials,
    selectors: LoginSelectors,
    timeouts: Timeouts,
    empty_code_policy: EmptyCodePolicy,
    code_source: Arc<dyn CodeSource>,
}

impl<'a, D: PageDriver + ?Sized> SessionFlow<'a, D> {
    /// 创建新的登录流程
    pub fn new(page: &'a D, config: &Config, code_source: Arc<dyn CodeSource>) -> Self {
        Self {
            page,
            portal_url: config.portal_url.clone(),
            credentials: config.credentials.clone(),
            selectors: LoginSelectors::default(),
            timeouts: config.timeouts.clone(),
            empty_code_policy: config.empty_code_policy,
            code_source,
        }
    }

    /// 替换默认的页面选择器
    pub fn with_selectors(mut self, selectors: LoginSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    /// 从 Init 一直推进到 Authenticated
    pub async fn authenticate(self) -> Result<AuthenticatedPage<'a, D>, SessionError> {
        let mut state = SessionState::Init;

        while !state.is_terminal() {
            let next = self.step(state.clone()).await?;
            debug_assert!(next.rank() > state.rank(), "{} -> {}", state, next);
            debug!("登录状态: {} -> {}", state, next);
            state = next;
        }

        info!("✅ 已进入看板");
        Ok(AuthenticatedPage { page: self.page })
    }

    /// 执行当前状态的出口动作，返回下一个状态
    pub async fn step(&self, state: SessionState) -> Result<SessionState, SessionError> {
        match state {
            SessionState::Init => self.navigate().await,
            SessionState::Navigated => self.resolve_consent().await,
            SessionState::ConsentResolved => self.submit_login().await,
            SessionState::LoginSubmitted => self.request_sms().await,
            SessionState::SmsRequested => self.receive_code().await,
            SessionState::CodeReceived(code) => self.submit_code(&code).await,
            SessionState::DashboardWait => self.wait_for_dashboard().await,
            SessionState::Authenticated => Ok(SessionState::Authenticated),
        }
    }

    async fn navigate(&self) -> Result<SessionState, SessionError> {
        info!("🌐 正在打开门户: {}", self.portal_url);
        self.page
            .goto(&self.portal_url)
            .await
            .map_err(|e| SessionError::Navigation {
                url: self.portal_url.clone(),
                source: e.into(),
            })?;
        Ok(SessionState::Navigated)
    }

    async fn resolve_consent(&self) -> Result<SessionState, SessionError> {
        let text = &self.selectors.consent_button_text;
        let present = self
            .page
            .wait_for_text(text, self.timeouts.probe)
            .await
            .map_err(|e| SessionError::Consent { source: e.into() })?;

        if present {
            self.page
                .click_text(text)
                .await
                .map_err(|e| SessionError::Consent { source: e.into() })?;
            info!("🍪 已接受 Cookie 提示");
        } else {
            debug!("没有 Cookie 提示");
        }
        Ok(SessionState::ConsentResolved)
    }

    async fn submit_login(&self) -> Result<SessionState, SessionError> {
        let username = &self.selectors.username_input;
        let password = &self.selectors.password_input;

        let present = self
            .page
            .wait_for(username, self.timeouts.probe)
            .await
            .map_err(|e| SessionError::LoginFill {
                field: "username",
                source: e.into(),
            })?;

        if !present {
            debug!("没有登录表单，可能已登录");
            return Ok(SessionState::LoginSubmitted);
        }

        self.page
            .fill(username, &self.credentials.username)
            .await
            .map_err(|e| SessionError::LoginFill {
                field: "username",
                source: e.into(),
            })?;
        self.page
            .fill(password, self.credentials.password.expose())
            .await
            .map_err(|e| SessionError::LoginFill {
                field: "password",
                source: e.into(),
            })?;
        self.page
            .press_enter(password)
            .await
            .map_err(|e| SessionError::LoginSubmit { source: e.into() })?;

        info!("🔑 已提交登录表单");
        Ok(SessionState::LoginSubmitted)
    }

    async fn request_sms(&self) -> Result<SessionState, SessionError> {
        let button = &self.selectors.send_sms_button;
        let present = self
            .page
            .wait_for(button, self.timeouts.probe)
            .await
            .map_err(|e| SessionError::SmsRequest { source: e.into() })?;

        if !present {
            info!("没有短信验证步骤，直接等待看板");
            return Ok(SessionState::DashboardWait);
        }

        self.page
            .click(button)
            .await
            .map_err(|e| SessionError::SmsRequest { source: e.into() })?;
        info!("📱 已请求短信验证码");
        Ok(SessionState::SmsRequested)
    }

    async fn receive_code(&self) -> Result<SessionState, SessionError> {
        debug!("等待短信送达 {:?}", self.timeouts.sms_settle);
        sleep(self.timeouts.sms_settle).await;

        let code = self.code_source.latest_code().await?;
        if !code.is_empty() {
            return Ok(SessionState::CodeReceived(code));
        }

        match self.empty_code_policy {
            EmptyCodePolicy::Submit => {
                warn!("⚠️ 验证码为空，仍按原样提交");
                Ok(SessionState::CodeReceived(code))
            }
            EmptyCodePolicy::Skip => {
                info!("验证码为空，跳过填写，等待其他渠道完成验证");
                Ok(SessionState::DashboardWait)
            }
            EmptyCodePolicy::Reject => Err(SessionError::EmptyCode),
        }
    }

    async fn submit_code(&self, code: &str) -> Result<SessionState, SessionError> {
        let input = &self.selectors.sms_code_input;
        self.page
            .fill(input, code)
            .await
            .map_err(|e| SessionError::CodeSubmit { source: e.into() })?;
        self.page
            .press_enter(input)
            .await
            .map_err(|e| SessionError::CodeSubmit { source: e.into() })?;

        info!("🔢 已提交短信验证码");
        Ok(SessionState::DashboardWait)
    }

    async fn wait_for_dashboard(&self) -> Result<SessionState, SessionError> {
        let timeout = self.timeouts.dashboard;
        let appeared = self
            .page
            .wait_for(&self.selectors.dashboard_marker, timeout)
            .await
            .map_err(|e| SessionError::Dashboard { source: e.into() })?;

        if appeared {
            Ok(SessionState::Authenticated)
        } else {
            Err(SessionError::DashboardTimeout { timeout })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SmsError;
    use crate::infrastructure::fake_page::FakePage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 记录调用次数的验证码来源
    struct FixedCode {
        code: Option<String>,
        calls: AtomicUsize,
    }

    impl FixedCode {
        fn ok(code: &str) -> Arc<Self> {
            Arc::new(Self {
                code: Some(code.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                code: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CodeSource for FixedCode {
        async fn latest_code(&self) -> Result<String, SmsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.code
                .clone()
                .ok_or(SmsError::NoMessage { attempts: 1 })
        }
    }

    fn full_login_page() -> FakePage {
        FakePage::new()
            .with_text("Alles akzeptieren")
            .with_element("#username")
            .with_element("#password")
            .with_element("#sendSms")
            .with_element("#sms-tan")
            .with_element("#bonitaet-datum")
    }

    #[tokio::test]
    async fn test_full_flow_with_two_factor() {
        let page = full_login_page();
        let code = FixedCode::ok("482913");
        let config = Config::for_tests();

        SessionFlow::new(&page, &config, code.clone())
            .authenticate()
            .await
            .unwrap();

        assert_eq!(code.calls(), 1);
        assert_eq!(
            page.actions(),
            vec![
                format!("goto {}", config.portal_url),
                "click_text Alles akzeptieren".to_string(),
                "fill #username=user@example.org".to_string(),
                "fill #password=hunter2".to_string(),
                "enter #password".to_string(),
                "click #sendSms".to_string(),
                "fill #sms-tan=482913".to_string(),
                "enter #sms-tan".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_skips_two_factor_without_sms_button() {
        let page = FakePage::new()
            .with_element("#username")
            .with_element("#password")
            .with_element("#bonitaet-datum");
        let code = FixedCode::ok("000000");
        let config = Config::for_tests();
        let flow = SessionFlow::new(&page, &config, code.clone());

        let next = flow.step(SessionState::LoginSubmitted).await.unwrap();
        assert_eq!(next, SessionState::DashboardWait);

        flow.authenticate().await.unwrap();
        assert_eq!(code.calls(), 0);
        assert!(!page.actions().iter().any(|a| a.contains("#sms-tan")));
    }

    #[tokio::test]
    async fn test_already_logged_in_goes_straight_to_dashboard() {
        let page = FakePage::new().with_element("#bonitaet-datum");
        let code = FixedCode::ok("1");
        let config = Config::for_tests();

        SessionFlow::new(&page, &config, code.clone())
            .authenticate()
            .await
            .unwrap();

        assert_eq!(page.actions(), vec![format!("goto {}", config.portal_url)]);
        assert_eq!(code.calls(), 0);
    }

    #[tokio::test]
    async fn test_consent_absent_is_not_an_error() {
        let page = FakePage::new();
        let config = Config::for_tests();
        let flow = SessionFlow::new(&page, &config, FixedCode::ok("1"));

        let next = flow.step(SessionState::Navigated).await.unwrap();
        assert_eq!(next, SessionState::ConsentResolved);
        assert!(page.actions().is_empty());
    }

    #[tokio::test]
    async fn test_consent_click_failure() {
        let page = FakePage::new()
            .with_text("Alles akzeptieren")
            .failing_on("Alles akzeptieren");
        let config = Config::for_tests();
        let flow = SessionFlow::new(&page, &config, FixedCode::ok("1"));

        let err = flow.step(SessionState::Navigated).await.unwrap_err();
        assert!(matches!(err, SessionError::Consent { .. }));
        assert_eq!(err.step(), "consent");
    }

    #[tokio::test]
    async fn test_navigation_failure_is_tagged() {
        let config = Config::for_tests();
        let page = FakePage::new().failing_on(&config.portal_url);

        let err = SessionFlow::new(&page, &config, FixedCode::ok("1"))
            .authenticate()
            .await
            .err()
            .unwrap();

        assert!(matches!(err, SessionError::Navigation { .. }));
        assert_eq!(err.step(), "navigate");
    }

    #[tokio::test]
    async fn test_password_fill_failure_names_field() {
        let page = FakePage::new()
            .with_element("#username")
            .with_element("#password")
            .failing_on("#password");
        let config = Config::for_tests();
        let flow = SessionFlow::new(&page, &config, FixedCode::ok("1"));

        let err = flow.step(SessionState::ConsentResolved).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::LoginFill {
                field: "password",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_login_submit_failure() {
        let page = FakePage::new()
            .with_element("#username")
            .with_element("#password")
            .failing_on("enter #password");
        let config = Config::for_tests();
        let flow = SessionFlow::new(&page, &config, FixedCode::ok("1"));

        let err = flow.step(SessionState::ConsentResolved).await.unwrap_err();
        assert!(matches!(err, SessionError::LoginSubmit { .. }));
    }

    #[tokio::test]
    async fn test_sms_request_failure() {
        let page = full_login_page().failing_on("click #sendSms");
        let code = FixedCode::ok("482913");
        let config = Config::for_tests();

        let err = SessionFlow::new(&page, &config, code.clone())
            .authenticate()
            .await
            .err()
            .unwrap();

        assert!(matches!(err, SessionError::SmsRequest { .. }));
        assert_eq!(err.step(), "sms");
        assert_eq!(code.calls(), 0);
        assert!(!page.actions().iter().any(|a| a.starts_with("fill #sms-tan")));
    }

    #[tokio::test]
    async fn test_code_delivery_failure_aborts() {
        let page = full_login_page();
        let code = FixedCode::failing();
        let config = Config::for_tests();

        let err = SessionFlow::new(&page, &config, code.clone())
            .authenticate()
            .await
            .err()
            .unwrap();

        assert!(matches!(err, SessionError::CodeDelivery(_)));
        assert_eq!(code.calls(), 1);
        assert!(!page.actions().iter().any(|a| a.starts_with("fill #sms-tan")));
    }

    #[tokio::test]
    async fn test_empty_code_is_submitted_by_default() {
        let page = full_login_page();
        let config = Config::for_tests();
        let flow = SessionFlow::new(&page, &config, FixedCode::ok(""));

        let next = flow.step(SessionState::SmsRequested).await.unwrap();
        assert_eq!(next, SessionState::CodeReceived(String::new()));

        flow.step(next).await.unwrap();
        assert!(page.actions().contains(&"fill #sms-tan=".to_string()));
    }

    #[tokio::test]
    async fn test_empty_code_skip_policy() {
        let page = full_login_page();
        let mut config = Config::for_tests();
        config.empty_code_policy = EmptyCodePolicy::Skip;
        let flow = SessionFlow::new(&page, &config, FixedCode::ok(""));

        let next = flow.step(SessionState::SmsRequested).await.unwrap();
        assert_eq!(next, SessionState::DashboardWait);
    }

    #[tokio::test]
    async fn test_empty_code_reject_policy() {
        let page = full_login_page();
        let mut config = Config::for_tests();
        config.empty_code_policy = EmptyCodePolicy::Reject;
        let flow = SessionFlow::new(&page, &config, FixedCode::ok(""));

        let err = flow.step(SessionState::SmsRequested).await.unwrap_err();
        assert!(matches!(err, SessionError::EmptyCode));
    }

    #[tokio::test]
    async fn test_code_submit_failure() {
        let page = full_login_page().failing_on("enter #sms-tan");
        let config = Config::for_tests();
        let flow = SessionFlow::new(&page, &config, FixedCode::ok("1"));

        let err = flow
            .step(SessionState::CodeReceived("1".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::CodeSubmit { .. }));
    }

    #[tokio::test]
    async fn test_dashboard_timeout() {
        // 验证码被拒绝时看板不会出现
        let page = FakePage::new()
            .with_element("#sendSms")
            .with_element("#sms-tan");
        let config = Config::for_tests();

        let err = SessionFlow::new(&page, &config, FixedCode::ok("999999"))
            .authenticate()
            .await
            .err()
            .unwrap();

        assert!(matches!(err, SessionError::DashboardTimeout { .. }));
        assert_eq!(err.step(), "dashboard");
    }

    #[tokio::test]
    async fn test_custom_selectors() {
        let page = FakePage::new().with_element("#home");
        let config = Config::for_tests();
        let selectors = LoginSelectors {
            dashboard_marker: "#home".to_string(),
            ..LoginSelectors::default()
        };

        SessionFlow::new(&page, &config, FixedCode::ok("1"))
            .with_selectors(selectors)
            .authenticate()
            .await
            .unwrap();
    }
}
