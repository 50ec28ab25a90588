pub mod orchestrator;
pub mod prompt;
pub mod provider;

pub use orchestrator::classify_all;
pub use provider::{ClassifyError, LlmClassifier, ReviewClassifier};
