//! Page-level pipeline stages.
//!
//! Each submodule implements one transformation step and is usable on its
//! own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ trim          (image path)
//!   │
//!   └────▶ text ──▶ classify ──▶ manifest ──▶ assemble
//! ```
//!
//! 1. [`input`]    — validate the user-supplied PDF path
//! 2. [`document`] — bind pdfium, open documents, read metadata
//! 3. [`render`]   — rasterise pages to `page_<n>.png`
//! 4. [`trim`]     — crop margins and vertical whitespace
//! 5. [`text`]     — extract per-page text for the classifier

pub mod document;
pub mod input;
pub mod render;
pub mod text;
pub mod trim;
