//! Input resolution: validate a user-supplied PDF path before rendering.
//!
//! pdfium reports a missing or non-PDF file as a generic load failure. Checking
//! existence, read permission and the `%PDF` magic bytes up front gives the
//! user a precise error instead.

use crate::error::Pdf2DeckError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate that `path` names a readable PDF and return it as an owned path.
pub fn resolve_pdf(path: impl AsRef<Path>) -> Result<PathBuf, Pdf2DeckError> {
    let path = path.as_ref().to_path_buf();

    if !path.exists() {
        return Err(Pdf2DeckError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(Pdf2DeckError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2DeckError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Pdf2DeckError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

/// Check that a non-PDF input file (template, manifest) exists.
pub fn require_file(path: impl AsRef<Path>) -> Result<PathBuf, Pdf2DeckError> {
    let path = path.as_ref().to_path_buf();
    if !path.is_file() {
        return Err(Pdf2DeckError::FileNotFound { path });
    }
    Ok(path)
}
