//! Manifest-driven deck assembly.
//!
//! Each manifest row becomes at most one slide, appended in row order:
//!
//! | slide type         | layout role | content                        |
//! |--------------------|-------------|--------------------------------|
//! | `title page`       | title       | title, subtitle                |
//! | `table of content` | content     | title, one paragraph per line  |
//! | `subtitle`         | title-only  | title                          |
//! | `main`             | image       | title, fitted picture          |
//!
//! Rows with any other slide type are skipped and counted. The deck is only
//! written after every row succeeded.

use crate::config::PipelineConfig;
use crate::deck::Deck;
use crate::error::Pdf2DeckError;
use crate::manifest::{Manifest, ManifestRow, SlideType};
use crate::output::AssemblyReport;
use crate::pipeline::input::require_file;
use crate::progress::{callback_or_noop, PipelineProgressCallback, Stage};
use std::path::Path;
use tracing::{debug, info, warn};

/// Build a presentation from the manifest at `manifest_path`, resolving
/// picture names against `images_dir`, and save it to `output`.
pub fn generate_presentation(
    manifest_path: &Path,
    template: &Path,
    images_dir: &Path,
    output: &Path,
    config: &PipelineConfig,
) -> Result<AssemblyReport, Pdf2DeckError> {
    let manifest_path = require_file(manifest_path)?;
    let template = require_file(template)?;

    let manifest = Manifest::read(&manifest_path)?;
    if let Err(e) = manifest.validate() {
        warn!("{e}");
    }

    let mut deck = Deck::open(&template, &config.layouts, config.frame)?;
    let progress = callback_or_noop(&config.progress_callback);
    let rows_skipped = add_rows(&mut deck, &manifest.rows, images_dir, progress.as_ref())?;

    deck.save(output)?;
    info!("Presentation saved to {}", output.display());

    Ok(AssemblyReport {
        slides_added: deck.slides_added(),
        rows_skipped,
        output_path: output.to_path_buf(),
    })
}

/// Append one slide per recognized row. Returns the number of rows skipped.
pub fn add_rows(
    deck: &mut Deck,
    rows: &[ManifestRow],
    images_dir: &Path,
    progress: &dyn PipelineProgressCallback,
) -> Result<usize, Pdf2DeckError> {
    progress.on_stage_start(Stage::Assemble, rows.len());

    let mut skipped = 0;
    for row in rows {
        if add_row(deck, row, images_dir)? {
            progress.on_item_complete(Stage::Assemble, row.page_number, rows.len());
        } else {
            skipped += 1;
            progress.on_item_skipped(
                Stage::Assemble,
                row.page_number,
                format!("unrecognized slide type '{}'", row.slide_type),
            );
        }
    }

    progress.on_stage_complete(Stage::Assemble, rows.len() - skipped);
    Ok(skipped)
}

/// Add the slide for one row. `Ok(false)` means the row was skipped.
pub fn add_row(deck: &mut Deck, row: &ManifestRow, images_dir: &Path) -> Result<bool, Pdf2DeckError> {
    match &row.slide_type {
        SlideType::TitlePage => deck.add_title_slide(&row.title, &row.subtitle)?,
        SlideType::TableOfContents => deck.add_content_slide(&row.title, &row.subtitle)?,
        SlideType::SubtitleOnly => deck.add_title_only_slide(&row.title)?,
        SlideType::Main => {
            let name = row
                .image_name
                .as_deref()
                .filter(|n| !n.trim().is_empty())
                .ok_or_else(|| {
                    Pdf2DeckError::InvalidManifest(format!(
                        "main slide for page {} has no image name",
                        row.page_number
                    ))
                })?;
            let image = require_file(images_dir.join(name))?;
            deck.add_image_slide(&row.title, &image)?;
        }
        SlideType::Unrecognized(kind) => {
            debug!("Skipping page {} row with slide type '{kind}'", row.page_number);
            return Ok(false);
        }
    }
    Ok(true)
}
