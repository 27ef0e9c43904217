//! PDF text-layer extraction via Google PDFium.
//!
//! Reads the embedded text directly — no rendering, no OCR. Scanned PDFs
//! without a text layer come back blank and are rejected upstream as
//! empty documents.
//!
//! Each call loads a fresh `Pdfium` instance because the upstream type is
//! `!Send`. The OS caches `dlopen`/`LoadLibrary` calls, so repeat loads
//! are near-free.

use pdfium_render::prelude::*;

use super::ExtractionError;

/// Extract the native text layer from PDF bytes, pages joined by newlines.
pub fn extract_text_layer(pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
    let pdfium = load_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(pdf_bytes, None)
        .map_err(|e| ExtractionError::PdfParsing(format!("Failed to load PDF: {e}")))?;

    let page_count = document.pages().len();
    if page_count == 0 {
        return Err(ExtractionError::EmptyDocument);
    }

    let mut pages = Vec::with_capacity(page_count as usize);
    for page in document.pages().iter() {
        let text = page.text().map(|t| t.all()).unwrap_or_default();
        pages.push(text);
    }

    tracing::debug!(pages = page_count, "PDF text layer extracted");
    Ok(pages.join("\n"))
}

/// Load the PDFium dynamic library.
///
/// Discovery order:
/// 1. `PDFIUM_DYNAMIC_LIB_PATH` env var (explicit path to library file)
/// 2. Alongside the running executable
/// 3. System library search paths
fn load_pdfium() -> Result<Pdfium, ExtractionError> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        tracing::debug!(path = %path, "Loading PDFium from env var");
        let bindings = Pdfium::bind_to_library(&path).map_err(|e| {
            ExtractionError::PdfParsing(format!("Failed to load PDFium from {path}: {e}"))
        })?;
        return Ok(Pdfium::new(bindings));
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            let lib_path =
                Pdfium::pdfium_platform_library_name_at_path(exe_dir.to_string_lossy().as_ref());
            if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
                tracing::debug!(dir = %exe_dir.display(), "Loaded PDFium next to executable");
                return Ok(Pdfium::new(bindings));
            }
        }
    }

    let bindings = Pdfium::bind_to_system_library().map_err(|e| {
        ExtractionError::PdfParsing(format!(
            "PDFium library not found. Set PDFIUM_DYNAMIC_LIB_PATH or install PDFium: {e}"
        ))
    })?;
    Ok(Pdfium::new(bindings))
}
