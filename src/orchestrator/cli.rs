//! 命令行定义

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::models::{Difficulty, QuestionType};

/// 题库管理与自动组卷
#[derive(Debug, Parser)]
#[command(name = "paper_generator", version, about, long_about = None)]
pub struct Cli {
    /// 显示详细日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 新建一道题
    Add(AddArgs),
    /// 从 TOML 文件或目录批量导入
    Import {
        /// TOML 文件或包含 TOML 文件的目录
        path: PathBuf,
    },
    /// 列出题库，最新的在前
    List {
        /// 只看某一科目
        #[arg(short, long)]
        subject: Option<String>,
    },
    /// 查看单道题
    Show { id: String },
    /// 编辑题目
    Edit(EditArgs),
    /// 删除题目
    Delete {
        id: String,
        /// 跳过确认
        #[arg(short, long)]
        yes: bool,
    },
    /// 按科目和总分自动组卷
    Generate(GenerateArgs),
    /// 显示当前登录用户
    Whoami,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub subject: String,
    #[arg(long)]
    pub chapter: String,
    /// 题干，公式用 `$...$` 包裹
    #[arg(long)]
    pub text: String,
    /// 分值 (1-5)
    #[arg(long)]
    pub marks: u32,
    #[arg(long = "type", value_enum)]
    pub question_type: TypeArg,
    #[arg(long, value_enum)]
    pub difficulty: DifficultyArg,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    pub id: String,
    #[arg(long)]
    pub subject: Option<String>,
    #[arg(long)]
    pub chapter: Option<String>,
    #[arg(long)]
    pub text: Option<String>,
    #[arg(long)]
    pub marks: Option<u32>,
    #[arg(long = "type", value_enum)]
    pub question_type: Option<TypeArg>,
    #[arg(long, value_enum)]
    pub difficulty: Option<DifficultyArg>,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    #[arg(short, long)]
    pub subject: String,
    /// 试卷总分，默认取配置 DEFAULT_TOTAL_MARKS
    #[arg(short, long)]
    pub marks: Option<u32>,
    /// 导出 PDF
    #[arg(long)]
    pub export: bool,
    /// PDF 路径，指定后自动导出
    #[arg(long)]
    pub pdf: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TypeArg {
    Mcq,
    Short,
    Long,
}

impl From<TypeArg> for QuestionType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Mcq => QuestionType::Mcq,
            TypeArg::Short => QuestionType::Short,
            TypeArg::Long => QuestionType::Long,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generate_command() {
        let cli = Cli::parse_from([
            "paper_generator",
            "generate",
            "--subject",
            "Physics",
            "--marks",
            "25",
            "--pdf",
            "out/p.pdf",
        ]);
        match cli.command {
            Command::Generate(args) => {
                assert_eq!(args.subject, "Physics");
                assert_eq!(args.marks, Some(25));
                assert_eq!(args.pdf, Some(PathBuf::from("out/p.pdf")));
            }
            other => panic!("解析错误: {:?}", other),
        }
    }

    #[test]
    fn parses_add_command_enums() {
        let cli = Cli::parse_from([
            "paper_generator",
            "add",
            "--subject",
            "Maths",
            "--chapter",
            "Algebra",
            "--text",
            "Solve $x+1=2$",
            "--marks",
            "2",
            "--type",
            "mcq",
            "--difficulty",
            "hard",
        ]);
        match cli.command {
            Command::Add(args) => {
                assert_eq!(QuestionType::from(args.question_type), QuestionType::Mcq);
                assert_eq!(Difficulty::from(args.difficulty), Difficulty::Hard);
            }
            other => panic!("解析错误: {:?}", other),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
