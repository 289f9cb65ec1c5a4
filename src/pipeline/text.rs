//! Page text extraction via pdfium.

use crate::error::Pdf2DeckError;
use crate::pipeline::document::{open_document, pdfium};
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, warn};

/// Extracted text of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 1-indexed page number.
    pub page_number: u32,
    pub text: String,
}

/// Extract the text of every page, in document order.
pub fn extract_page_texts(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<Vec<PageText>, Pdf2DeckError> {
    let pdfium = pdfium()?;
    let document = open_document(&pdfium, pdf_path, password)?;

    document
        .pages()
        .iter()
        .enumerate()
        .map(|(i, page)| -> Result<PageText, Pdf2DeckError> {
            let page_number = i as u32 + 1;
            let text = page_text(&page, page_number)?;
            debug!("Page {page_number}: {} chars of text", text.len());
            Ok(PageText { page_number, text })
        })
        .collect()
}

/// Extract the text of a single 1-indexed page.
///
/// An out-of-range page number is reported and yields `Ok(None)`.
pub fn extract_text_from_page(
    pdf_path: &Path,
    page_number: u32,
    password: Option<&str>,
) -> Result<Option<String>, Pdf2DeckError> {
    let pdfium = pdfium()?;
    let document = open_document(&pdfium, pdf_path, password)?;
    let pages = document.pages();
    let total = pages.len() as u32;

    if page_number < 1 || page_number > total {
        warn!("Error: Page number {page_number} is out of range (document has {total} pages)");
        return Ok(None);
    }

    let page = pages
        .get((page_number - 1) as u16)
        .map_err(|e| Pdf2DeckError::TextExtractionFailed {
            page: page_number,
            detail: format!("{:?}", e),
        })?;
    page_text(&page, page_number).map(Some)
}

fn page_text(page: &PdfPage<'_>, page_number: u32) -> Result<String, Pdf2DeckError> {
    let text = page
        .text()
        .map_err(|e| Pdf2DeckError::TextExtractionFailed {
            page: page_number,
            detail: format!("{:?}", e),
        })?;
    Ok(text.all())
}
