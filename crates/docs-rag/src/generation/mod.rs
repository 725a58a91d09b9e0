//! Prompt assembly and answer generation

pub mod answer;
pub mod prompt;

pub use answer::{AnswerGenerator, GeneratedAnswer};
pub use prompt::PromptBuilder;
