use super::ExtractionError;

pub fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractionError::failed("pdf", e))?;

    // pdf-extract returns all text as one string with form feeds (\x0C)
    // between pages. Normalize page breaks to paragraph separators so the
    // chunker sees them as boundaries.
    let normalized = text.replace('\x0C', "\n\n");
    Ok(normalized.trim().to_string())
}
