pub mod loaders;
pub mod math_text;
pub mod paper;
pub mod principal;
pub mod question;

pub use loaders::{load_all_toml_files, load_toml_to_drafts};
pub use math_text::{split_math, to_plain_text, MathSegment};
pub use paper::{Blueprint, GeneratedPaper};
pub use principal::Principal;
pub use question::{Difficulty, Question, QuestionDraft, QuestionPatch, QuestionType};
