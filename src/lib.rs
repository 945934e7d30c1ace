//! # Schufa Score Exporter
//!
//! 定时登录 meineSCHUFA 门户，抓取分数和记录条目，并导出为指标
//!
//! ## 架构设计
//!
//! 本系统沿用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `browser/` - 启动或连接浏览器，持有 `BrowserSession`
//! - `infrastructure/` - `PageDriver` 页面能力抽象，`ChromiumPage` 是唯一的 page owner
//!
//! ### ② 业务能力层（Services）
//! - `RecordExtractor` - 把看板解析成 `ScoreRecord`
//! - `CodeSource` - 获取短信验证码（httpSMS / webhook）
//! - `MetricsSink` - 写入指标（InfluxDB / 日志）
//!
//! ### ③ 流程层（Workflow）
//! - `SessionFlow` - 登录状态机（导航 → Cookie → 登录 → 短信 → 看板）
//! - `SessionState` - 只向前推进的状态
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/retrieval` - 单次抓取，保证浏览器在所有路径上被关闭
//! - `orchestrator/exporter` - 定时循环，汇总并写入指标
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod portal;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{ChromiumPage, PageDriver};
pub use models::{RecordEntry, ScoreRecord, ScoreSummary};
pub use orchestrator::{fetch_score, App};
pub use workflow::{AuthenticatedPage, SessionFlow, SessionState};
