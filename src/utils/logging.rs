/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::{debug, info};

use crate::error::Diagnostic;
use crate::models::BankSummary;

/// 记录题库加载完成信息
///
/// # 参数
/// - `location`: 工作簿位置
/// - `summary`: 题库统计
/// - `diagnostics`: 归一化过程中的诊断信息
pub fn log_bank_loaded(location: &str, summary: &BankSummary, diagnostics: &[Diagnostic]) {
    info!("{}", "=".repeat(60));
    info!("✓ 题库加载完成: {}", location);
    info!(
        "📊 题目 {} 道 | 测试 {} 个 ({} 个引用) | play 题目 {} 道",
        summary.questions, summary.tests, summary.references, summary.play_questions
    );
    if !diagnostics.is_empty() {
        info!("⚠️ 跳过或覆盖 {} 处，详见 debug 日志", diagnostics.len());
        for diagnostic in diagnostics {
            debug!("  - {}", diagnostic);
        }
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
