//! Report text extraction — uploaded file bytes to analyzable text.
//!
//! Two accepted inputs: plain text (UTF-8 read) and PDF (native text
//! layer via PDFium, no rendering, no OCR). Anything else is rejected
//! before any state changes.

pub mod pdf;
pub mod sanitize;

pub use sanitize::sanitize_report_text;

use thiserror::Error;

pub const MIME_PLAIN_TEXT: &str = "text/plain";
pub const MIME_PDF: &str = "application/pdf";

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported file type {0}. Please upload a .txt or .pdf file.")]
    UnsupportedFileType(String),

    #[error("The file seems to be empty. Please upload a valid report.")]
    EmptyDocument,

    #[error("Text encoding error: {0}")]
    Encoding(String),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),
}

/// Extract analyzable text from uploaded file bytes.
///
/// Dispatches on the declared MIME type, sanitizes the result, and fails
/// with [`ExtractionError::EmptyDocument`] if nothing readable remains.
pub fn extract_report_text(bytes: &[u8], mime_type: &str) -> Result<String, ExtractionError> {
    let raw = match mime_type {
        MIME_PLAIN_TEXT => String::from_utf8(bytes.to_vec())
            .map_err(|e| ExtractionError::Encoding(e.to_string()))?,
        MIME_PDF => pdf::extract_text_layer(bytes)?,
        other => return Err(ExtractionError::UnsupportedFileType(other.to_string())),
    };

    let text = sanitize_report_text(&raw);
    if text.trim().is_empty() {
        return Err(ExtractionError::EmptyDocument);
    }

    tracing::info!(
        mime_type = mime_type,
        text_length = text.len(),
        "Report text extracted"
    );
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_extraction() {
        let text = extract_report_text(b"Potassium: 4.2 mmol/L", MIME_PLAIN_TEXT).unwrap();
        assert!(text.contains("Potassium"));
    }

    #[test]
    fn unsupported_mime_rejected() {
        let result = extract_report_text(b"GIF89a", "image/gif");
        assert!(matches!(
            result,
            Err(ExtractionError::UnsupportedFileType(mime)) if mime == "image/gif"
        ));
    }

    #[test]
    fn blank_text_rejected_as_empty() {
        let result = extract_report_text(b"   \n\t  \n", MIME_PLAIN_TEXT);
        assert!(matches!(result, Err(ExtractionError::EmptyDocument)));
    }

    #[test]
    fn control_characters_stripped() {
        let text = extract_report_text(b"Hemoglobin\x00: 13.5\x01 g/dL", MIME_PLAIN_TEXT).unwrap();
        assert!(!text.contains('\x00'));
        assert!(!text.contains('\x01'));
        assert!(text.contains("13.5"));
    }

    #[test]
    fn invalid_utf8_rejected() {
        let result = extract_report_text(&[0xff, 0xfe, 0x80], MIME_PLAIN_TEXT);
        assert!(matches!(result, Err(ExtractionError::Encoding(_))));
    }
}
