pub mod paper_assembler;
pub mod pdf_export;
pub mod question_service;

pub use paper_assembler::{generate, generate_with_rng};
pub use pdf_export::PdfExporter;
pub use question_service::{ImportStats, QuestionService, QUESTIONS_COLLECTION};
