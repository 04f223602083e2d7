//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 解析命令行、持有资源（文档存储、身份），把命令分派给流程层和服务层。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator (命令分派)
//!     ↓
//! workflow::PaperFlow / Session
//!     ↓
//! services (能力层：题库 / 组卷 / 导出)
//!     ↓
//! infrastructure (基础设施：DocumentStore / IdentityProvider)
//! ```

pub mod app;
pub mod cli;

pub use app::App;
pub use cli::{Cli, Command};
