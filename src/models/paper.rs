use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::question::Question;

/// 组卷蓝图：科目 + 总分
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Blueprint {
    pub subject: String,
    pub total_marks: u32,
}

impl Blueprint {
    pub fn new(subject: impl Into<String>, total_marks: u32) -> AppResult<Self> {
        let subject = subject.into();
        if subject.trim().is_empty() {
            return Err(AppError::invalid_input("subject", "科目不能为空"));
        }
        if total_marks == 0 {
            return Err(AppError::invalid_input("total_marks", "总分必须为正整数"));
        }
        Ok(Self {
            subject,
            total_marks,
        })
    }
}

impl std::fmt::Display for Blueprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[科目 {} 总分 {}]", self.subject, self.total_marks)
    }
}

/// 一次组卷的结果，不持久化
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedPaper {
    pub blueprint: Blueprint,
    pub questions: Vec<Question>,
}

impl GeneratedPaper {
    pub fn new(blueprint: Blueprint, questions: Vec<Question>) -> Self {
        Self {
            blueprint,
            questions,
        }
    }

    /// 实际选中题目的分值之和
    pub fn achieved_marks(&self) -> u32 {
        self.questions.iter().map(|q| q.marks).sum()
    }

    /// 距离目标总分还差多少
    pub fn shortfall(&self) -> u32 {
        self.blueprint
            .total_marks
            .saturating_sub(self.achieved_marks())
    }

    pub fn is_complete(&self) -> bool {
        self.shortfall() == 0
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
