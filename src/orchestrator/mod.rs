//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层持有浏览器资源并负责调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `retrieval` - 单次抓取
//! - 打开浏览器会话（启动或连接）
//! - 依次调用登录流程和看板解析
//! - 在所有返回路径上关闭浏览器
//!
//! ### `exporter` - 定时导出
//! - 按间隔循环抓取，同一时间只有一个会话
//! - 汇总结果并写入指标
//! - 根据配置决定失败时退出还是等待下一轮
//!
//! ## 层次关系
//!
//! ```text
//! exporter (循环 + 指标)
//!     ↓
//! retrieval (一次抓取，持有 BrowserSession)
//!     ↓
//! workflow::SessionFlow (登录状态机)
//!     ↓
//! services (看板解析 / 验证码 / 指标写入)
//!     ↓
//! infrastructure (PageDriver / ChromiumPage)
//! ```

pub mod exporter;
pub mod retrieval;

pub use exporter::{publish_record, App};
pub use retrieval::{fetch_score, retrieve};
