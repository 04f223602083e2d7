//! 基础设施层
//!
//! 持有外部资源（文档存储、身份提供方），只暴露能力

pub mod document_store;
pub mod identity;
pub mod json_file_store;
pub mod memory_store;

pub use document_store::{Direction, Document, DocumentStore, Filter, OrderBy};
pub use identity::{IdentityProvider, LocalIdentity};
pub use json_file_store::JsonFileStore;
pub use memory_store::MemoryStore;
