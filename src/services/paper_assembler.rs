//! 组卷算法 - 业务能力层
//!
//! 贪心 + 随机的一次遍历选题，不是最优装箱：
//!
//! 1. 只保留科目完全相同（区分大小写）的题目
//! 2. Fisher–Yates 均匀洗牌
//! 3. 依次遍历，`当前分数 + 分值 <= 总分` 时选入，否则跳过继续往后看
//! 4. 刚好凑满总分时立即结束，否则走完整个题池
//!
//! 即使题池中存在恰好凑满的组合，一次遍历也不保证找到。
//! 结果不足总分不是错误，由调用方判断"题库不足"。

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::Question;

/// 使用线程随机数生成试卷
pub fn generate(pool: &[Question], subject: &str, total_marks: u32) -> AppResult<Vec<Question>> {
    generate_with_rng(pool, subject, total_marks, &mut rand::thread_rng())
}

/// 使用指定随机源生成试卷
///
/// 返回顺序即选入顺序；同一 `id` 最多出现一次；分值之和不超过 `total_marks`。
pub fn generate_with_rng<R: Rng + ?Sized>(
    pool: &[Question],
    subject: &str,
    total_marks: u32,
    rng: &mut R,
) -> AppResult<Vec<Question>> {
    if total_marks == 0 {
        return Err(AppError::invalid_input("total_marks", "总分必须为正整数"));
    }

    let mut candidates: Vec<&Question> = pool.iter().filter(|q| q.subject == subject).collect();
    if let Some(bad) = candidates.iter().find(|q| q.marks == 0) {
        return Err(AppError::invalid_input(
            "marks",
            format!(
                "题目 {} 的分值必须为正整数",
                bad.id.as_deref().unwrap_or("<未保存>")
            ),
        ));
    }
    candidates.shuffle(rng);

    let mut current_marks: u32 = 0;
    let mut accepted_ids: HashSet<&str> = HashSet::new();
    let mut selected = Vec::new();

    for question in candidates {
        if let Some(id) = question.id.as_deref() {
            if accepted_ids.contains(id) {
                continue;
            }
        }

        let fits = current_marks
            .checked_add(question.marks)
            .is_some_and(|sum| sum <= total_marks);
        if fits {
            current_marks += question.marks;
            if let Some(id) = question.id.as_deref() {
                accepted_ids.insert(id);
            }
            selected.push(question.clone());
        }

        if current_marks == total_marks {
            break;
        }
    }

    debug!(
        "组卷完成: 科目 {} 目标 {} 实得 {} 共 {} 题",
        subject,
        total_marks,
        current_marks,
        selected.len()
    );

    Ok(selected)
}
