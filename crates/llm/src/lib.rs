pub mod generate;
pub mod pipeline;
pub mod prompts;
pub mod provider;
pub mod providers;
pub mod response;

pub use generate::{Evaluation, ExamGenerator, GenerateError};
pub use pipeline::generate_exam;
pub use provider::{LlmError, LlmProvider, Prompt, SamplingParams};
