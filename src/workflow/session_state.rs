//! 登录状态
//!
//! 状态只会向前推进，不存在回到早先状态的转换

use std::fmt::{self, Display};

/// 登录流程状态
#[derive(Clone, PartialEq, Eq)]
pub enum SessionState {
    /// 刚开始，尚未打开门户
    Init,
    /// 门户页面已加载
    Navigated,
    /// Cookie 提示已处理（或不存在）
    ConsentResolved,
    /// 登录表单已提交（或不需要登录）
    LoginSubmitted,
    /// 已点击发送短信
    SmsRequested,
    /// 已拿到验证码，等待填写
    CodeReceived(String),
    /// 等待看板出现
    DashboardWait,
    /// 看板已出现
    Authenticated,
}

impl SessionState {
    /// 状态在流程中的位置，每次转换都必须严格增大
    pub fn rank(&self) -> u8 {
        match self {
            SessionState::Init => 0,
            SessionState::Navigated => 1,
            SessionState::ConsentResolved => 2,
            SessionState::LoginSubmitted => 3,
            SessionState::SmsRequested => 4,
            SessionState::CodeReceived(_) => 5,
            SessionState::DashboardWait => 6,
            SessionState::Authenticated => 7,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Authenticated)
    }
}

// 验证码不能出现在日志里
impl Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Init => "Init",
            SessionState::Navigated => "Navigated",
            SessionState::ConsentResolved => "ConsentResolved",
            SessionState::LoginSubmitted => "LoginSubmitted",
            SessionState::SmsRequested => "SmsRequested",
            SessionState::CodeReceived(_) => "CodeReceived",
            SessionState::DashboardWait => "DashboardWait",
            SessionState::Authenticated => "Authenticated",
        };
        f.write_str(name)
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}
