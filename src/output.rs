//! Result types returned by the pipeline entry points.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Document-level metadata read from the PDF without rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: u32,
    pub pdf_version: String,
}

/// One page image written by the rasterizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedPage {
    /// 1-indexed page number.
    pub page_number: u32,
    /// The full-page render.
    pub image_path: PathBuf,
    /// Where the trimmed copy landed, when trimming ran and found content.
    pub trimmed_path: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
}

/// What a rendering call produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderReport {
    /// Pages written, in processing order.
    pub pages: Vec<RenderedPage>,
    /// Requested page numbers that do not exist in the document.
    pub skipped_pages: Vec<u32>,
    /// Pages whose trim found no content (image left untrimmed).
    pub blank_pages: Vec<u32>,
    pub total_pages: u32,
}

/// What the deck assembler produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssemblyReport {
    /// Slides appended to the template.
    pub slides_added: usize,
    /// Rows whose slide type was not recognized.
    pub rows_skipped: usize,
    pub output_path: PathBuf,
}

/// What a full [`crate::convert::run_pipeline`] call produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Title written on the title slide.
    pub deck_title: String,
    /// Manifest written between classification and assembly.
    pub manifest_path: PathBuf,
    /// Number of manifest rows built from the PDF.
    pub manifest_rows: usize,
    pub render: RenderReport,
    pub assembly: AssemblyReport,
}
