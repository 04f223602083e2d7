use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, FileError, StoreError};
use crate::infrastructure::{JsonFileStore, LocalIdentity};
use crate::models::{
    load_all_toml_files, load_toml_to_drafts, to_plain_text, Blueprint, Principal, Question,
    QuestionDraft, QuestionPatch,
};
use crate::orchestrator::cli::{AddArgs, Command, EditArgs, GenerateArgs};
use crate::services::{PdfExporter, QuestionService};
use crate::utils::logging::{log_startup, truncate_text};
use crate::workflow::{PaperFlow, Session};

/// 应用主结构
///
/// 唯一持有存储和身份资源的地方
pub struct App {
    config: Config,
    session: Session<LocalIdentity>,
    questions: QuestionService<JsonFileStore>,
    paper_flow: PaperFlow<JsonFileStore>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;

        let store = Arc::new(JsonFileStore::new(&config.data_dir));
        let questions = QuestionService::new(store);
        let paper_flow = PaperFlow::new(
            questions.clone(),
            PdfExporter::from_config(&config),
            &config.output_dir,
            config.verbose_logging,
        );
        let session = Session::new(LocalIdentity::from_config(&config));

        Ok(Self {
            config,
            session,
            questions,
            paper_flow,
        })
    }

    /// 执行一条命令
    pub async fn run(&self, command: Command) -> Result<()> {
        log_startup(command_name(&command), &self.config.data_dir);
        let principal = self.session.ensure_signed_in().await?;

        match command {
            Command::Add(args) => self.add(&principal, args).await,
            Command::Import { path } => self.import(&principal, &path).await,
            Command::List { subject } => self.list(&principal, subject.as_deref()).await,
            Command::Show { id } => self.show(&principal, &id).await,
            Command::Edit(args) => self.edit(&principal, args).await,
            Command::Delete { id, yes } => self.delete(&principal, &id, yes).await,
            Command::Generate(args) => self.generate(&principal, args).await,
            Command::Whoami => {
                println!("{}", principal);
                Ok(())
            }
        }
    }

    async fn add(&self, principal: &Principal, args: AddArgs) -> Result<()> {
        let draft = QuestionDraft {
            subject: args.subject,
            chapter: args.chapter,
            text: args.text,
            marks: args.marks,
            question_type: args.question_type.into(),
            difficulty: args.difficulty.into(),
        };
        let question = self.questions.create(principal, &draft).await?;
        println!("{}", question.id.unwrap_or_default());
        Ok(())
    }

    async fn import(&self, principal: &Principal, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(AppError::from(FileError::NotFound {
                path: path.display().to_string(),
            })
            .into());
        }

        let drafts = if path.is_dir() {
            load_all_toml_files(&path.to_string_lossy()).await?
        } else {
            load_toml_to_drafts(path).await?
        };
        info!("📁 读取到 {} 道待导入的题目", drafts.len());

        let stats = self.questions.import_drafts(principal, &drafts).await?;
        println!("created: {}, skipped: {}", stats.created, stats.invalid);
        Ok(())
    }

    async fn list(&self, principal: &Principal, subject: Option<&str>) -> Result<()> {
        let questions = match subject {
            Some(subject) => self.questions.list_by_subject(principal, subject).await?,
            None => self.questions.list(principal).await?,
        };
        if questions.is_empty() {
            warn!("⚠️ 题库为空");
        }
        for question in &questions {
            println!("{}", list_line(question));
        }
        Ok(())
    }

    async fn show(&self, principal: &Principal, id: &str) -> Result<()> {
        let question = self
            .questions
            .get(principal, id)
            .await?
            .with_context(|| format!("题目不存在: {}", id))?;
        println!("{}", serde_json::to_string_pretty(&question)?);
        Ok(())
    }

    async fn edit(&self, principal: &Principal, args: EditArgs) -> Result<()> {
        let patch = QuestionPatch {
            subject: args.subject,
            chapter: args.chapter,
            text: args.text,
            marks: args.marks,
            question_type: args.question_type.map(Into::into),
            difficulty: args.difficulty.map(Into::into),
        };
        let question = self.questions.update(principal, &args.id, &patch).await?;
        println!("{}", list_line(&question));
        Ok(())
    }

    async fn delete(&self, principal: &Principal, id: &str, yes: bool) -> Result<()> {
        // 格式不合法的文档也允许删除
        let label = match self.questions.get(principal, id).await {
            Ok(Some(question)) => list_line(&question),
            Ok(None) => anyhow::bail!("题目不存在: {}", id),
            Err(AppError::Store(StoreError::MalformedDocument { .. })) => {
                format!("{}  [格式不合法]", id)
            }
            Err(e) => return Err(e.into()),
        };

        if !yes && !confirm(&format!("确认删除 \"{}\"? [y/N] ", label)).await? {
            info!("已取消删除");
            return Ok(());
        }

        self.questions.delete(principal, id).await?;
        println!("deleted: {}", id);
        Ok(())
    }

    async fn generate(&self, principal: &Principal, args: GenerateArgs) -> Result<()> {
        let total_marks = args.marks.unwrap_or(self.config.default_total_marks);
        let blueprint = Blueprint::new(args.subject, total_marks)?;
        let paper = self.paper_flow.generate(principal, &blueprint).await?;

        println!(
            "{} - {} / {} marks",
            blueprint.subject,
            paper.achieved_marks(),
            blueprint.total_marks
        );
        if paper.is_empty() {
            println!("Not enough questions in bank!");
        }
        for (index, question) in paper.questions.iter().enumerate() {
            println!(
                "Q{}. {} [{}]",
                index + 1,
                to_plain_text(&question.text),
                question.marks
            );
        }

        if args.export || args.pdf.is_some() {
            let path = self.paper_flow.export(&paper, args.pdf.as_deref()).await?;
            println!("pdf: {}", path.display());
        }
        Ok(())
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Add(_) => "新建题目",
        Command::Import { .. } => "批量导入",
        Command::List { .. } => "题库列表",
        Command::Show { .. } => "查看题目",
        Command::Edit(_) => "编辑题目",
        Command::Delete { .. } => "删除题目",
        Command::Generate(_) => "自动组卷",
        Command::Whoami => "当前用户",
    }
}

fn list_line(question: &Question) -> String {
    format!(
        "{}  [{}|{}|{}|{} marks]  {}",
        question.id.as_deref().unwrap_or("-"),
        question.subject,
        question.question_type,
        question.difficulty,
        question.marks,
        truncate_text(&to_plain_text(&question.text), 60)
    )
}

/// 终端确认
async fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{}", prompt);
    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await
        .context("读取确认输入失败")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
