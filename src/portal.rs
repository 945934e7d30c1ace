//! 门户页面结构
//!
//! 登录页和看板上用到的选择器集中放在这里，站点改版时只需改这一处

/// 登录流程用到的控件
#[derive(Clone, Debug)]
pub struct LoginSelectors {
    /// Cookie 提示中"全部接受"按钮的文字
    pub consent_button_text: String,
    pub username_input: String,
    pub password_input: String,
    pub send_sms_button: String,
    pub sms_code_input: String,
    /// 看板已渲染的标志元素
    pub dashboard_marker: String,
}

impl Default for LoginSelectors {
    fn default() -> Self {
        Self {
            consent_button_text: "Alles akzeptieren".to_string(),
            username_input: "#username".to_string(),
            password_input: "#password".to_string(),
            send_sms_button: "#sendSms".to_string(),
            sms_code_input: "#sms-tan".to_string(),
            dashboard_marker: "#bonitaet-datum".to_string(),
        }
    }
}

/// 看板上的分数和卡片
#[derive(Clone, Debug)]
pub struct DashboardSelectors {
    pub score_element: String,
    pub score_attribute: String,
    pub tile: String,
    /// 以下选择器都相对于单张卡片
    pub name: String,
    pub category: String,
    pub type_label: String,
    pub details: String,
    pub date: String,
}

impl Default for DashboardSelectors {
    fn default() -> Self {
        Self {
            score_element: "score-element".to_string(),
            score_attribute: "score".to_string(),
            tile: ".sao-kachel".to_string(),
            name: ".kopfbereich > h3".to_string(),
            category: ".kopfbereich > h3 > small".to_string(),
            type_label: ".typ-label".to_string(),
            details: ".typ > span".to_string(),
            date: ".datum".to_string(),
        }
    }
}
