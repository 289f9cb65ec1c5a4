//! # pdf2deck
//!
//! Turn the pages of a PDF into a slide deck built from a `.pptx` template.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     validate the local file (exists, readable, %PDF)
//!  ├─ 2. Render    rasterise pages via pdfium → page_<n>.png
//!  ├─ 3. Trim      crop fixed margins, shrink to the content band
//!  ├─ 4. Classify  page text → title page / table of contents / main
//!  ├─ 5. Manifest  classifications → CSV (editable, subtitle rows insertable)
//!  └─ 6. Assemble  manifest rows + images → slides on the template
//! ```
//!
//! Every stage is usable on its own; the manifest is the hand-off point
//! between classification and assembly so it can be reviewed or edited.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2deck::{run_pipeline, PipelineConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::builder().deck_title("Quarterly Review").build()?;
//!     let report = run_pipeline(
//!         Path::new("review.pdf"),
//!         Path::new("template.pptx"),
//!         Path::new("work"),
//!         Path::new("review.pptx"),
//!         &config,
//!     )?;
//!     eprintln!("{} slides", report.assembly.slides_added);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2deck` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2deck = { version = "0.1", default-features = false }
//! ```
//!
//! ## pdfium
//!
//! Rendering, text extraction and metadata need a pdfium shared library at
//! run time; see [`pipeline::document`] for the lookup order. Trimming,
//! manifest handling and assembly work without it.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assemble;
pub mod classify;
pub mod config;
pub mod convert;
pub mod deck;
pub mod error;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use assemble::generate_presentation;
pub use classify::{classify_page, classify_pages, PageClassification};
pub use config::{
    ImageFrame, LayoutMap, LayoutSelector, PageSelection, PipelineConfig, PipelineConfigBuilder,
    RenderResolution, SlideRole, TrimConfig,
};
pub use convert::{extract_and_trim, extract_slide_info, inspect, pdf_to_png, run_pipeline};
pub use deck::Deck;
pub use error::Pdf2DeckError;
pub use manifest::{insert_subtitle_row, Manifest, ManifestRow, SlideType};
pub use output::{AssemblyReport, DocumentMetadata, PipelineReport, RenderReport, RenderedPage};
pub use pipeline::trim::{trim_image, TrimOutcome};
pub use progress::{PipelineProgressCallback, ProgressCallback, Stage};
