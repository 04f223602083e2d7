//! # Paper Generator
//!
//! 教师题库管理与自动组卷
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有外部资源，只暴露能力
//! - `DocumentStore` - 文档存储（内存 / 本地 JSON 文件）
//! - `IdentityProvider` - 当前登录用户
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `QuestionService` - 题库增删改查，存储边界校验
//! - `paper_assembler` - 组卷算法（均匀洗牌 + 贪心一次遍历）
//! - `PdfExporter` - 试卷导出 PDF
//!
//! ### ③ 流程层（Workflow）
//! - `Session` - 把登录用户变成显式参数
//! - `PaperFlow` - 查询题池 → 组卷 → 判断题库是否足够 → 导出
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/cli` - 命令行定义
//! - `orchestrator/app` - 持有资源并分派命令
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{DocumentStore, JsonFileStore, LocalIdentity, MemoryStore};
pub use models::{
    split_math, Blueprint, Difficulty, GeneratedPaper, MathSegment, Principal, Question,
    QuestionDraft, QuestionPatch, QuestionType,
};
pub use orchestrator::{App, Cli};
pub use services::{generate, PdfExporter, QuestionService};
pub use workflow::{PaperFlow, Session};
