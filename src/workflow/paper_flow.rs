//! 组卷流程 - 流程层
//!
//! 流程顺序：
//! 1. 查询当前用户该科目的题池
//! 2. 组卷算法选题
//! 3. 判断题库是否足够并记录日志
//! 4. （可选）导出 PDF

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::AppResult;
use crate::infrastructure::DocumentStore;
use crate::models::{Blueprint, GeneratedPaper, Principal};
use crate::services::{paper_assembler, PdfExporter, QuestionService};
use crate::utils::logging::{log_paper_generated, print_paper_summary};

/// 组卷流程
///
/// - 不持有存储资源，只依赖题库服务和导出服务
/// - 每次生成都是一份新的、不持久化的试卷
pub struct PaperFlow<S> {
    questions: QuestionService<S>,
    exporter: PdfExporter,
    output_dir: PathBuf,
    verbose_logging: bool,
}

impl<S: DocumentStore> PaperFlow<S> {
    pub fn new(
        questions: QuestionService<S>,
        exporter: PdfExporter,
        output_dir: impl Into<PathBuf>,
        verbose_logging: bool,
    ) -> Self {
        Self {
            questions,
            exporter,
            output_dir: output_dir.into(),
            verbose_logging,
        }
    }

    /// 按蓝图生成试卷
    ///
    /// 不足总分不是错误，返回的试卷通过 `shortfall()` 反映缺口
    pub async fn generate(
        &self,
        principal: &Principal,
        blueprint: &Blueprint,
    ) -> AppResult<GeneratedPaper> {
        info!("[{}] ⚡ 开始组卷 {}", principal.id, blueprint);

        let pool = self
            .questions
            .list_by_subject(principal, &blueprint.subject)
            .await?;
        info!("[{}] ✓ 题池共 {} 题", principal.id, pool.len());

        let selected =
            paper_assembler::generate(&pool, &blueprint.subject, blueprint.total_marks)?;
        let paper = GeneratedPaper::new(blueprint.clone(), selected);

        log_paper_generated(&paper, pool.len());
        if self.verbose_logging {
            print_paper_summary(&paper);
        }

        Ok(paper)
    }

    /// 导出 PDF，未指定路径时写入输出目录下的默认文件名
    pub async fn export(&self, paper: &GeneratedPaper, path: Option<&Path>) -> AppResult<PathBuf> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => self.output_dir.join(PdfExporter::default_file_name(
                &paper.blueprint.subject,
                chrono::Local::now().date_naive(),
            )),
        };
        self.exporter.export(paper, &path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryStore;
    use crate::models::{Difficulty, QuestionDraft, QuestionType};
    use std::sync::Arc;

    fn owner() -> Principal {
        Principal::new("t1", "Asha", "")
    }

    fn draft(subject: &str, marks: u32) -> QuestionDraft {
        QuestionDraft {
            subject: subject.to_string(),
            chapter: "Waves".to_string(),
            text: format!("A {}-mark question on $\\lambda$", marks),
            marks,
            question_type: QuestionType::Short,
            difficulty: Difficulty::Medium,
        }
    }

    async fn flow_with(drafts: &[(&str, u32)], owner: &Principal) -> PaperFlow<MemoryStore> {
        let service = QuestionService::new(Arc::new(MemoryStore::new()));
        for (subject, marks) in drafts {
            service.create(owner, &draft(subject, *marks)).await.unwrap();
        }
        PaperFlow::new(service, PdfExporter::new("School", "1 Hr"), "out", false)
    }

    #[tokio::test]
    async fn generates_within_budget_from_own_subject_pool() {
        let flow = flow_with(
            &[("Physics", 5), ("Physics", 5), ("Physics", 5), ("Maths", 1)],
            &owner(),
        )
        .await;

        let paper = flow
            .generate(&owner(), &Blueprint::new("Physics", 10).unwrap())
            .await
            .unwrap();
        assert_eq!(paper.achieved_marks(), 10);
        assert!(paper.is_complete());
        assert!(paper.questions.iter().all(|q| q.subject == "Physics"));
    }

    #[tokio::test]
    async fn short_bank_is_reported_as_shortfall() {
        let flow = flow_with(&[("Physics", 3), ("Physics", 4)], &owner()).await;
        let paper = flow
            .generate(&owner(), &Blueprint::new("Physics", 20).unwrap())
            .await
            .unwrap();
        assert_eq!(paper.achieved_marks(), 7);
        assert_eq!(paper.shortfall(), 13);
    }

    #[tokio::test]
    async fn oversized_pool_yields_empty_paper() {
        let flow = flow_with(&[("Physics", 5), ("Physics", 5)], &owner()).await;
        let paper = flow
            .generate(&owner(), &Blueprint::new("Physics", 3).unwrap())
            .await
            .unwrap();
        assert!(paper.is_empty());
        assert_eq!(paper.shortfall(), 3);
        assert!(!paper.is_complete());
    }

    #[tokio::test]
    async fn other_users_questions_are_not_in_the_pool() {
        let someone_else = Principal::new("t2", "Ravi", "");
        let flow = flow_with(&[("Physics", 5)], &someone_else).await;
        let paper = flow
            .generate(&owner(), &Blueprint::new("Physics", 10).unwrap())
            .await
            .unwrap();
        assert!(paper.is_empty());
    }

    #[tokio::test]
    async fn export_defaults_to_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let service = QuestionService::new(Arc::new(MemoryStore::new()));
        service.create(&owner(), &draft("Physics", 2)).await.unwrap();
        let flow = PaperFlow::new(service, PdfExporter::new("School", "1 Hr"), dir.path(), false);

        let paper = flow
            .generate(&owner(), &Blueprint::new("Physics", 10).unwrap())
            .await
            .unwrap();
        let path = flow.export(&paper, None).await.unwrap();
        assert!(path.starts_with(dir.path()));
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("Physics_Paper_"));
        assert!(path.exists());
    }
}
