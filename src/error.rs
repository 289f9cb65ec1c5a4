//! Error types for the pdf2deck library.
//!
//! Every failure that aborts a pipeline run is a [`Pdf2DeckError`]. The
//! pipeline also has two softer outcomes that are deliberately *not* errors:
//!
//! * out-of-range page requests are logged and listed in
//!   [`crate::output::RenderReport::skipped_pages`], and the batch continues;
//! * a page image with no content after trimming is logged and left as-is
//!   (see [`crate::pipeline::trim::TrimOutcome::NoContent`]).
//!
//! Unmatched manifest-editor targets and unrecognized slide types are absorbed
//! silently by their callers.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2deck library.
#[derive(Debug, Error)]
pub enum Pdf2DeckError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: u32, detail: String },

    /// Text extraction failed for a specific page.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextExtractionFailed { page: u32, detail: String },

    // ── Image errors ──────────────────────────────────────────────────────
    /// An image could not be decoded or encoded.
    #[error("Image error for '{path}': {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    // ── Manifest errors ───────────────────────────────────────────────────
    /// The CSV manifest could not be read or written.
    #[error("Manifest '{path}': {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The manifest parsed but its content cannot drive assembly.
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    // ── Template / deck errors ────────────────────────────────────────────
    /// The template is not a usable `.pptx` package.
    #[error("Template '{path}' is not a valid presentation: {detail}")]
    InvalidTemplate { path: PathBuf, detail: String },

    /// A semantic slide role could not be mapped to a template layout.
    #[error(
        "No layout for {role} slides (wanted {selector}).\n\
Available layouts: {available}\n\
Pick one with --layout {role}=<name or index>."
    )]
    LayoutNotFound {
        role: String,
        selector: String,
        available: String,
    },

    /// The chosen layout lacks a placeholder the slide kind needs.
    #[error("Layout '{layout}' has no {placeholder} placeholder")]
    PlaceholderMissing { layout: String, placeholder: String },

    /// An XML part of the presentation could not be parsed.
    #[error("Malformed XML in part '{part}': {detail}")]
    MalformedXml { part: String, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create a directory or write an output file.
    #[error("Failed to write '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not read an input file other than the PDF.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
pdf2deck loads pdfium dynamically. You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Place libpdfium next to the working directory.\n\
  • Install pdfium system-wide (binaries: https://github.com/bblanchon/pdfium-binaries).\n"
    )]
    PdfiumBindingFailed(String),
}

impl Pdf2DeckError {
    pub(crate) fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Pdf2DeckError::OutputWriteFailed {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Pdf2DeckError::Image {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_not_found_names_role_and_choices() {
        let e = Pdf2DeckError::LayoutNotFound {
            role: "image".into(),
            selector: "#3".into(),
            available: "#0 \"Title Slide\", #1 \"Title and Content\"".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("image slides"), "got: {msg}");
        assert!(msg.contains("Title and Content"), "got: {msg}");
        assert!(msg.contains("--layout image="), "got: {msg}");
    }

    #[test]
    fn rasterisation_display() {
        let e = Pdf2DeckError::RasterisationFailed {
            page: 3,
            detail: "bad stream".into(),
        };
        assert!(e.to_string().contains("page 3"));
        assert!(e.to_string().contains("bad stream"));
    }

    #[test]
    fn placeholder_missing_display() {
        let e = Pdf2DeckError::PlaceholderMissing {
            layout: "Blank".into(),
            placeholder: "title".into(),
        };
        assert_eq!(e.to_string(), "Layout 'Blank' has no title placeholder");
    }

    #[test]
    fn write_failed_keeps_source() {
        let e = Pdf2DeckError::write_failed(
            "/tmp/x.pptx",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        assert!(e.to_string().contains("disk full"));
        assert!(std::error::Error::source(&e).is_some());
    }
}
