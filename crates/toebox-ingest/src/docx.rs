//! Word-processor document text extraction.
//!
//! A `.docx` file is a zip archive whose `word/document.xml` member holds
//! the body; text lives in `<w:t>` runs grouped into `<w:p>` paragraphs.

use regex::Regex;
use std::io::Read;
use std::sync::OnceLock;

use toebox_core::SourceError;

use crate::html::decode_entities;

fn text_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<w:t[^>]*>(.*?)</w:t>").expect("valid regex"))
}

/// Extract plain text from the bytes of a `.docx` file.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, SourceError> {
    let cursor = std::io::Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(cursor)
        .map_err(|e| SourceError::Parse(format!("not a docx archive: {e}")))?;

    let mut document = archive
        .by_name("word/document.xml")
        .map_err(|e| SourceError::Parse(format!("missing word/document.xml: {e}")))?;

    let mut xml = String::new();
    document.read_to_string(&mut xml)?;

    Ok(document_xml_to_text(&xml))
}

/// Flatten the document XML: one line per paragraph, text runs joined.
fn document_xml_to_text(xml: &str) -> String {
    let mut paragraphs = Vec::new();
    for paragraph in xml.split("</w:p>") {
        let mut runs = Vec::new();
        for capture in text_run_re().captures_iter(paragraph) {
            runs.push(decode_entities(&capture[1]));
        }
        let joined = runs.concat();
        if !joined.trim().is_empty() {
            paragraphs.push(joined);
        }
    }
    paragraphs.join("\n\n")
}
