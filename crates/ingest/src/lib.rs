pub mod document;

pub use document::chunker::{estimate_tokens, split_into_chunks, Chunk};
pub use document::{extract_text, ExtractedText, ExtractionError};
