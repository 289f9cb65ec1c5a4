//! Whole-operation entry points.
//!
//! Each function validates its inputs, runs one or more pipeline stages and
//! returns a report. [`run_pipeline`] chains all of them:
//!
//! ```text
//! <work_dir>/output_images/page_<n>.png   rendered, trimmed in place
//! <work_dir>/manifest.csv                 classified pages
//! <output>                                assembled deck
//! ```

use crate::assemble::generate_presentation;
use crate::classify::classify_pages;
use crate::config::{PageSelection, PipelineConfig};
use crate::error::Pdf2DeckError;
use crate::manifest::Manifest;
use crate::output::{DocumentMetadata, PipelineReport, RenderReport};
use crate::pipeline::{document, input, render, text};
use crate::progress::{callback_or_noop, Stage};
use std::path::Path;
use tracing::{debug, info};

/// File name of the manifest written by [`run_pipeline`].
pub const MANIFEST_FILE_NAME: &str = "manifest.csv";

/// Render every page of `pdf_path` into `out_dir` as `page_<n>.png`,
/// trimming each in place when `trim` is set.
pub fn pdf_to_png(
    pdf_path: &Path,
    out_dir: &Path,
    config: &PipelineConfig,
    trim: bool,
) -> Result<RenderReport, Pdf2DeckError> {
    let pdf_path = input::resolve_pdf(pdf_path)?;
    render::render_all_pages(&pdf_path, out_dir, config, trim)
}

/// Render the selected pages into `raw_dir` and write trimmed copies to
/// `trimmed_dir`. Pages outside the document are reported, not fatal.
pub fn extract_and_trim(
    pdf_path: &Path,
    pages: &PageSelection,
    raw_dir: &Path,
    trimmed_dir: &Path,
    config: &PipelineConfig,
) -> Result<RenderReport, Pdf2DeckError> {
    let pdf_path = input::resolve_pdf(pdf_path)?;
    let total = document::extract_metadata(&pdf_path, config.password.as_deref())?.page_count;
    let page_numbers = pages.page_numbers(total);
    debug!("Extracting pages {:?}", page_numbers);
    render::extract_and_trim_pages(&pdf_path, raw_dir, trimmed_dir, &page_numbers, config)
}

/// Classify every page of `pdf_path` and write the manifest to `csv_path`.
///
/// The title slide gets [`PipelineConfig::deck_title`], else the PDF's
/// metadata title, else the file stem.
pub fn extract_slide_info(
    pdf_path: &Path,
    csv_path: &Path,
    config: &PipelineConfig,
) -> Result<Manifest, Pdf2DeckError> {
    let pdf_path = input::resolve_pdf(pdf_path)?;
    let title = deck_title(&pdf_path, config)?;
    let manifest = build_manifest(&pdf_path, &title, config)?;
    if let Some(parent) = csv_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Pdf2DeckError::write_failed(parent, e))?;
    }
    manifest.write(csv_path)?;
    Ok(manifest)
}

/// Render, trim, classify and assemble in one call.
///
/// Intermediate files live in `work_dir`; they are kept after the run so the
/// manifest can be edited and the deck re-assembled.
pub fn run_pipeline(
    pdf_path: &Path,
    template: &Path,
    work_dir: &Path,
    output: &Path,
    config: &PipelineConfig,
) -> Result<PipelineReport, Pdf2DeckError> {
    info!("Starting pipeline: {}", pdf_path.display());

    // ── Step 1: Validate inputs ──────────────────────────────────────────
    let pdf_path = input::resolve_pdf(pdf_path)?;
    let template = input::require_file(template)?;

    // ── Step 2: Render and trim every page ───────────────────────────────
    let images_dir = work_dir.join(&config.images_subdir);
    let render_report = render::render_all_pages(&pdf_path, &images_dir, config, true)?;

    // ── Step 3: Classify pages into a manifest ───────────────────────────
    let title = deck_title(&pdf_path, config)?;
    let manifest = build_manifest(&pdf_path, &title, config)?;
    let manifest_path = work_dir.join(MANIFEST_FILE_NAME);
    manifest.write(&manifest_path)?;

    // ── Step 4: Assemble the deck ────────────────────────────────────────
    let assembly = generate_presentation(&manifest_path, &template, &images_dir, output, config)?;

    info!(
        "Pipeline complete: {} pages → {} slides",
        render_report.pages.len(),
        assembly.slides_added
    );

    Ok(PipelineReport {
        deck_title: title,
        manifest_path,
        manifest_rows: manifest.len(),
        render: render_report,
        assembly,
    })
}

/// Read PDF metadata without rendering any page.
pub fn inspect(pdf_path: &Path, password: Option<&str>) -> Result<DocumentMetadata, Pdf2DeckError> {
    let pdf_path = input::resolve_pdf(pdf_path)?;
    document::extract_metadata(&pdf_path, password)
}

fn build_manifest(pdf_path: &Path, title: &str, config: &PipelineConfig) -> Result<Manifest, Pdf2DeckError> {
    let progress = callback_or_noop(&config.progress_callback);
    let pages = text::extract_page_texts(pdf_path, config.password.as_deref())?;

    progress.on_stage_start(Stage::Classify, pages.len());
    let classified = classify_pages(&pages, title);
    for page in &classified {
        debug!("Page {} → {} '{}'", page.page_number, page.slide_type, page.title);
        progress.on_item_complete(Stage::Classify, page.page_number, pages.len());
    }
    progress.on_stage_complete(Stage::Classify, classified.len());

    Ok(Manifest::from_classifications(&classified))
}

fn deck_title(pdf_path: &Path, config: &PipelineConfig) -> Result<String, Pdf2DeckError> {
    if let Some(title) = &config.deck_title {
        return Ok(title.clone());
    }
    let metadata = document::extract_metadata(pdf_path, config.password.as_deref())?;
    Ok(metadata.title.unwrap_or_else(|| file_stem_title(pdf_path)))
}

fn file_stem_title(pdf_path: &Path) -> String {
    pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_title_drops_directory_and_extension() {
        assert_eq!(file_stem_title(Path::new("/tmp/reports/Q3 Review.pdf")), "Q3 Review");
        assert_eq!(file_stem_title(Path::new("/")), "");
    }

    #[test]
    fn configured_title_skips_pdf_access() {
        let config = PipelineConfig::builder().deck_title("Board Deck").build().unwrap();
        let title = deck_title(Path::new("/no/such.pdf"), &config).unwrap();
        assert_eq!(title, "Board Deck");
    }

    #[test]
    fn missing_pdf_fails_before_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let err = pdf_to_png(
            &dir.path().join("missing.pdf"),
            dir.path(),
            &PipelineConfig::default(),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, Pdf2DeckError::FileNotFound { .. }));
    }
}
