//! 日志工具模块
//!
//! 提供日志格式化和输出的辅助函数

use tracing::{info, warn};

use crate::models::{to_plain_text, GeneratedPaper};

/// 记录程序启动信息
///
/// # 参数
/// - `command`: 本次执行的命令名
/// - `data_dir`: 题库目录
pub fn log_startup(command: &str, data_dir: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - {}", command);
    info!("📁 题库目录: {}", data_dir);
    info!("{}", "=".repeat(60));
}

/// 记录组卷结果
///
/// 不足目标总分时给出"题库不足"的警告
pub fn log_paper_generated(paper: &GeneratedPaper, pool_size: usize) {
    info!("\n{}", "─".repeat(60));
    info!(
        "📄 组卷完成 {}: 选中 {} 题，共 {} 分",
        paper.blueprint,
        paper.questions.len(),
        paper.achieved_marks()
    );

    if paper.is_empty() && pool_size > 0 {
        warn!("⚠️ 题池中每道题的分值都超过总分 {}", paper.blueprint.total_marks);
    } else if !paper.is_complete() {
        warn!(
            "⚠️ 题库不足: 还差 {} 分 (题池共 {} 题)",
            paper.shortfall(),
            pool_size
        );
    }
    info!("{}", "─".repeat(60));
}

/// 打印试卷预览
pub fn print_paper_summary(paper: &GeneratedPaper) {
    for (index, question) in paper.questions.iter().enumerate() {
        info!(
            "Q{}. {} [{}]",
            index + 1,
            truncate_text(&to_plain_text(&question.text), 80),
            question.marks
        );
    }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_by_characters_not_bytes() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
        assert_eq!(truncate_text("物理试卷第一题", 4), "物理试卷...");
    }
}
