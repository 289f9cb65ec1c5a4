//! pdfium binding, document opening and metadata.
//!
//! pdfium is loaded dynamically; each operation binds its own handle since
//! `Pdfium` is not shareable across threads. Lookup order for the shared
//! library:
//!
//! 1. `PDFIUM_LIB_PATH`: `libpdfium.{so,dylib}` / `pdfium.dll`, or the directory holding it
//! 2. the current working directory
//! 3. the system library search path

use crate::error::Pdf2DeckError;
use crate::output::DocumentMetadata;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Bind the pdfium library and return a fresh handle.
pub fn pdfium() -> Result<Pdfium, Pdf2DeckError> {
    let bindings = match std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from) {
        Some(path) => {
            debug!("Binding pdfium from PDFIUM_LIB_PATH={}", path.display());
            if path.is_dir() {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&path))
            } else {
                Pdfium::bind_to_library(&path)
            }
        }
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| Pdf2DeckError::PdfiumBindingFailed(e.to_string()))?;

    Ok(Pdfium::new(bindings))
}

/// Open a PDF, mapping pdfium's load errors onto [`Pdf2DeckError`].
pub fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, Pdf2DeckError> {
    let document = pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                Pdf2DeckError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                Pdf2DeckError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            Pdf2DeckError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })?;

    info!(
        "PDF loaded: {} ({} pages)",
        pdf_path.display(),
        document.pages().len()
    );
    Ok(document)
}

/// Read document metadata without rendering any page.
pub fn extract_metadata(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, Pdf2DeckError> {
    let pdfium = pdfium()?;
    let document = open_document(&pdfium, pdf_path, password)?;

    let metadata = document.metadata();
    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().trim().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    Ok(DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: document.pages().len() as u32,
        pdf_version: format!("{:?}", document.version()),
    })
}
