//! Chunk output type.

/// A paragraph-aligned slice of extracted text with its ordinal position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 0-based index within the document.
    pub index: usize,
    /// Total number of chunks produced from the document.
    pub total: usize,
    /// The chunk text content, paragraphs joined by blank lines.
    pub content: String,
}
