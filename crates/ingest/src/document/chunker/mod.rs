//! Paragraph-aligned chunking under an estimated token budget.
//!
//! Splits extracted text into the units of work sent to the generative
//! model, each tagged with its ordinal position. The budget is a soft
//! target: a single over-budget paragraph still becomes its own chunk
//! rather than being dropped or split mid-paragraph.

mod splitter;
mod types;

pub use splitter::{estimate_tokens, split_into_chunks};
pub use types::Chunk;
