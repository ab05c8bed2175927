pub mod chunker;
mod doc;
mod docx;
mod pdf;
mod txt;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("Failed to extract text from {file_type} file: {reason}")]
    ExtractionFailed { file_type: String, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractionError {
    fn failed(file_type: &str, reason: impl ToString) -> Self {
        Self::ExtractionFailed {
            file_type: file_type.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result of extracting text from an uploaded document.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    /// Original filename.
    pub filename: String,
    /// File type: "pdf", "docx", "doc", "txt"
    pub file_type: String,
    /// Full textual content, paragraphs separated by blank lines.
    pub text: String,
}

impl ExtractedText {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Extract text from file bytes based on the filename's extension.
///
/// Reads only — never deletes or mutates the uploaded bytes.
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<ExtractedText, ExtractionError> {
    let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();
    let file_type = ext.as_str();
    debug!("Extracting '{}' as {}", filename, file_type);

    let text = match file_type {
        "txt" | "text" => txt::extract_txt(bytes)?,
        "pdf" => pdf::extract_pdf(bytes)?,
        "docx" => docx::extract_docx(bytes)?,
        "doc" => doc::extract_doc(bytes)?,
        other => return Err(ExtractionError::UnsupportedType(other.to_string())),
    };

    Ok(ExtractedText {
        filename: filename.to_string(),
        file_type: file_type.to_string(),
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_on_lowercased_extension() {
        let out = extract_text(b"hello world", "Notes.TXT").unwrap();
        assert_eq!(out.file_type, "txt");
        assert_eq!(out.text, "hello world");
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = extract_text(b"...", "slides.pptx").unwrap_err();
        match err {
            ExtractionError::UnsupportedType(ext) => assert_eq!(ext, "pptx"),
            other => panic!("expected UnsupportedType, got {other:?}"),
        }
    }

    #[test]
    fn extension_is_last_dot_segment() {
        let out = extract_text(b"x", "report.v2.final.txt").unwrap();
        assert_eq!(out.file_type, "txt");
    }
}
