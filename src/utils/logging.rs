/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::ScoreSummary;

/// 初始化 tracing，默认级别 info，可用 RUST_LOG 覆盖
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // 测试里可能被调用多次
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `provider`: 验证码来源名称
/// - `interval`: 抓取间隔
pub fn log_startup(provider: &str, interval: Duration) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 定时抓取模式");
    info!("📨 验证码来源: {}", provider);
    info!("⏱️ 抓取间隔: {:?}", interval);
    info!("{}", "=".repeat(60));
}

/// 记录一轮抓取开始
pub fn log_cycle_start(cycle: u64) {
    info!("\n{}", "─".repeat(60));
    info!(
        "🔄 第 {} 轮抓取 - {}",
        cycle,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "─".repeat(60));
}

/// 记录一轮抓取结果
pub fn log_cycle_complete(cycle: u64, summary: &ScoreSummary) {
    info!(
        "✓ 第 {} 轮完成: 分数 {}，记录 {} 条（{} 种类型，{} 个类别）",
        cycle,
        summary.score,
        summary.entry_count,
        summary.types.len(),
        summary.categories.len()
    );
}

/// 记录下一轮开始时间
pub fn log_next_cycle(interval: Duration) {
    let next = chrono::Local::now()
        + chrono::Duration::from_std(interval).unwrap_or_else(|_| chrono::Duration::zero());
    info!("💤 下一轮: {}", next.format("%Y-%m-%d %H:%M:%S"));
}
