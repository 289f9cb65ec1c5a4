//! PDF rasterisation: render pages to PNG files via pdfium.
//!
//! Two entry points share one per-page routine:
//!
//! * [`render_all_pages`] renders every page to `page_<n>.png`, optionally
//!   trimming each file in place;
//! * [`extract_and_trim_pages`] renders an explicit page list into an
//!   untrimmed directory and writes `trimmed_page_<n>.png` copies into a
//!   second directory.
//!
//! Pages are rendered strictly in the requested order. A requested page that
//! does not exist is logged, reported and skipped; any pdfium failure on an
//! existing page aborts the call.

use crate::config::{PipelineConfig, RenderResolution};
use crate::error::Pdf2DeckError;
use crate::output::{RenderReport, RenderedPage};
use crate::pipeline::document::{open_document, pdfium};
use crate::pipeline::trim::{trim_image, TrimOutcome};
use crate::progress::{callback_or_noop, Stage};
use image::ImageFormat;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// File name of the full-page render of page `n`.
pub fn page_image_name(page_number: u32) -> String {
    format!("page_{page_number}.png")
}

/// File name of the trimmed copy of page `n`.
pub fn trimmed_image_name(page_number: u32) -> String {
    format!("trimmed_page_{page_number}.png")
}

/// Where the trimmed copy of a freshly rendered page goes.
#[derive(Debug, Clone, Copy)]
enum TrimTarget<'a> {
    /// Keep the raw render only.
    Skip,
    /// Overwrite the raw render with its trimmed version.
    InPlace,
    /// Write `trimmed_page_<n>.png` into this directory.
    Into(&'a Path),
}

/// Render every page of `pdf_path` into `out_dir` as `page_<n>.png`.
///
/// With `trim_in_place`, each file is trimmed right after it is written;
/// pages without content keep their untrimmed render.
pub fn render_all_pages(
    pdf_path: &Path,
    out_dir: &Path,
    config: &PipelineConfig,
    trim_in_place: bool,
) -> Result<RenderReport, Pdf2DeckError> {
    create_dir(out_dir)?;
    let pdfium = pdfium()?;
    let document = open_document(&pdfium, pdf_path, config.password.as_deref())?;
    let page_numbers: Vec<u32> = (1..=document.pages().len() as u32).collect();

    let trim = if trim_in_place {
        TrimTarget::InPlace
    } else {
        TrimTarget::Skip
    };
    render_pages(&document, &page_numbers, config.resolution, config, out_dir, trim)
}

/// Render the given 1-indexed pages into `untrimmed_dir` and trim each into
/// `trimmed_dir/trimmed_page_<n>.png`.
pub fn extract_and_trim_pages(
    pdf_path: &Path,
    untrimmed_dir: &Path,
    trimmed_dir: &Path,
    page_numbers: &[u32],
    config: &PipelineConfig,
) -> Result<RenderReport, Pdf2DeckError> {
    create_dir(untrimmed_dir)?;
    create_dir(trimmed_dir)?;
    let pdfium = pdfium()?;
    let document = open_document(&pdfium, pdf_path, config.password.as_deref())?;

    render_pages(
        &document,
        page_numbers,
        config.subset_resolution,
        config,
        untrimmed_dir,
        TrimTarget::Into(trimmed_dir),
    )
}

fn render_pages(
    document: &PdfDocument<'_>,
    page_numbers: &[u32],
    resolution: RenderResolution,
    config: &PipelineConfig,
    out_dir: &Path,
    trim: TrimTarget<'_>,
) -> Result<RenderReport, Pdf2DeckError> {
    let progress = callback_or_noop(&config.progress_callback);
    let pages = document.pages();
    let total_pages = pages.len() as u32;
    let render_config = PdfRenderConfig::new().scale_page_by_factor(resolution.zoom());

    let mut report = RenderReport {
        total_pages,
        ..RenderReport::default()
    };
    progress.on_stage_start(Stage::Render, page_numbers.len());

    for &n in page_numbers {
        if n < 1 || n > total_pages {
            warn!("Error: Page number {n} is out of range (document has {total_pages} pages)");
            report.skipped_pages.push(n);
            progress.on_item_skipped(Stage::Render, n, format!("out of range (total={total_pages})"));
            continue;
        }

        let path = out_dir.join(page_image_name(n));
        let (width, height) = render_page_to(&pages, n, &render_config, &path)?;
        info!("Extracted page {} to {}", n, path.display());

        let target = match trim {
            TrimTarget::Skip => None,
            TrimTarget::InPlace => Some(path.clone()),
            TrimTarget::Into(dir) => Some(dir.join(trimmed_image_name(n))),
        };
        let mut trimmed = None;
        if let Some(target) = target {
            match trim_image(&path, &target, &config.trim)? {
                TrimOutcome::Trimmed { .. } => {
                    info!("Trimmed page {} saved to {}", n, target.display());
                    trimmed = Some(target);
                }
                TrimOutcome::NoContent => {
                    report.blank_pages.push(n);
                    progress.on_item_skipped(Stage::Render, n, "no content to trim".into());
                }
            }
        }

        report.pages.push(RenderedPage {
            page_number: n,
            image_path: path,
            trimmed_path: trimmed,
            width,
            height,
        });
        progress.on_item_complete(Stage::Render, n, page_numbers.len());
    }

    progress.on_stage_complete(Stage::Render, report.pages.len());
    info!(
        "Rendered {} of {} requested pages ({} skipped)",
        report.pages.len(),
        page_numbers.len(),
        report.skipped_pages.len()
    );
    Ok(report)
}

/// Rasterise one existing page and save it as PNG. Returns the pixel size.
fn render_page_to(
    pages: &PdfPages<'_>,
    page_number: u32,
    render_config: &PdfRenderConfig,
    path: &Path,
) -> Result<(u32, u32), Pdf2DeckError> {
    let page = pages
        .get((page_number - 1) as u16)
        .map_err(|e| Pdf2DeckError::RasterisationFailed {
            page: page_number,
            detail: format!("{:?}", e),
        })?;

    let bitmap = page
        .render_with_config(render_config)
        .map_err(|e| Pdf2DeckError::RasterisationFailed {
            page: page_number,
            detail: format!("{:?}", e),
        })?;

    let image = bitmap.as_image();
    debug!(
        "Rendered page {} → {}x{} px",
        page_number,
        image.width(),
        image.height()
    );

    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| Pdf2DeckError::image(path, e))?;

    Ok((image.width(), image.height()))
}

fn create_dir(dir: &Path) -> Result<(), Pdf2DeckError> {
    std::fs::create_dir_all(dir).map_err(|e| Pdf2DeckError::write_failed(dir, e))
}
