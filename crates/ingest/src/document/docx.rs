use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ExtractionError;

fn local_name(qname: &[u8]) -> &[u8] {
    match qname.iter().position(|&b| b == b':') {
        Some(i) => &qname[i + 1..],
        None => qname,
    }
}

/// Minimal DOCX extraction: open the zip container, parse
/// `word/document.xml`, and concatenate run text with paragraph breaks.
pub fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::failed("docx", format!("not a valid zip container: {e}")))?;

    let mut doc_xml = String::new();
    zip.by_name("word/document.xml")
        .map_err(|_| ExtractionError::failed("docx", "missing word/document.xml"))?
        .read_to_string(&mut doc_xml)
        .map_err(|e| ExtractionError::failed("docx", e))?;

    let mut reader = Reader::from_str(&doc_xml);
    let mut buf = Vec::new();

    let mut text = String::new();
    let mut paragraph = String::new();
    let mut in_t = false;

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match local_name(e.name().as_ref()) {
                b"t" => in_t = true,
                b"br" => paragraph.push('\n'),
                b"tab" => paragraph.push('\t'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match local_name(e.name().as_ref()) {
                b"br" => paragraph.push('\n'),
                b"tab" => paragraph.push('\t'),
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if in_t {
                    let piece = t
                        .unescape()
                        .map_err(|e| ExtractionError::failed("docx", e))?;
                    paragraph.push_str(&piece);
                }
            }
            Ok(Event::End(e)) => match local_name(e.name().as_ref()) {
                b"t" => in_t = false,
                b"p" => {
                    let p = paragraph.trim();
                    if !p.is_empty() {
                        if !text.is_empty() {
                            text.push_str("\n\n");
                        }
                        text.push_str(p);
                    }
                    paragraph.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractionError::failed("docx", e)),
            _ => {}
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn docx_bytes(document_xml: &str) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options = zip::write::FileOptions::default();
            writer.start_file("word/document.xml", options).unwrap();
            writer.write_all(document_xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn extracts_paragraph_text() {
        let xml = r#"<?xml version="1.0"?>
            <w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
              <w:body>
                <w:p><w:r><w:t>First paragraph.</w:t></w:r></w:p>
                <w:p><w:r><w:t>Second </w:t></w:r><w:r><w:t>paragraph.</w:t></w:r></w:p>
              </w:body>
            </w:document>"#;
        let text = extract_docx(&docx_bytes(xml)).unwrap();
        assert_eq!(text, "First paragraph.\n\nSecond paragraph.");
    }

    #[test]
    fn rejects_non_zip_bytes() {
        let err = extract_docx(b"definitely not a zip").unwrap_err();
        assert!(err.to_string().contains("docx"));
    }

    #[test]
    fn rejects_zip_without_document_xml() {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options = zip::write::FileOptions::default();
            writer.start_file("other.xml", options).unwrap();
            writer.write_all(b"<x/>").unwrap();
            writer.finish().unwrap();
        }
        let err = extract_docx(&cursor.into_inner()).unwrap_err();
        assert!(err.to_string().contains("word/document.xml"));
    }
}
