//! Whitespace trimming of rendered page images.
//!
//! Two crops in sequence:
//!
//! ```text
//! ┌───────────────────────────┐
//! │ header band (margin_top)  │  ← stage 1: fixed margins
//! │ ┌───────────────────────┐ │
//! │ │    blank              │ │  ← stage 2: rows without content
//! │ │ ███ content ███       │ │     are dropped; columns are kept
//! │ │ ███████               │ │     (left = 0, right = width − inset)
//! │ │    blank              │ │
//! │ └───────────────────────┘ │
//! │ footer band (margin_bot.) │
//! └───────────────────────────┘
//! ```
//!
//! Only the vertical extent shrinks to the content: keeping the full width
//! preserves the horizontal layout of the page, so slides made from
//! different pages line up.

use crate::config::TrimConfig;
use crate::error::Pdf2DeckError;
use image::imageops;
use image::{GrayImage, ImageFormat, Luma, RgbImage};
use std::path::Path;
use tracing::{debug, warn};

/// The result of trimming one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimOutcome {
    /// The trimmed image was written to the output path.
    Trimmed { width: u32, height: u32 },
    /// No content pixel was found; nothing was written.
    NoContent,
}

/// Pixel rectangle with exclusive right/bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl ContentBox {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

/// Trim the image at `input` and save the result as PNG at `output`.
///
/// `input` and `output` may be the same path. When the image has no content
/// the file at `output` is left untouched.
pub fn trim_image(
    input: &Path,
    output: &Path,
    config: &TrimConfig,
) -> Result<TrimOutcome, Pdf2DeckError> {
    let image = image::open(input).map_err(|e| Pdf2DeckError::image(input, e))?;

    match trim_rgb(&image.to_rgb8(), config) {
        Some(trimmed) => {
            let (width, height) = trimmed.dimensions();
            trimmed
                .save_with_format(output, ImageFormat::Png)
                .map_err(|e| Pdf2DeckError::image(output, e))?;
            debug!(
                "Trimmed {} → {} ({}x{} px)",
                input.display(),
                output.display(),
                width,
                height
            );
            Ok(TrimOutcome::Trimmed { width, height })
        }
        None => {
            warn!(
                "No non-white area found in {}; the image was not cropped",
                input.display()
            );
            Ok(TrimOutcome::NoContent)
        }
    }
}

/// Apply both trimming stages to an in-memory image.
///
/// Returns `None` when the margins swallow the whole image or no pixel
/// passes the threshold.
pub fn trim_rgb(image: &RgbImage, config: &TrimConfig) -> Option<RgbImage> {
    let (width, height) = image.dimensions();
    let crop_w = width.saturating_sub(config.margin_left.saturating_add(config.margin_right));
    let crop_h = height.saturating_sub(config.margin_top.saturating_add(config.margin_bottom));
    if crop_w == 0 || crop_h == 0 {
        return None;
    }

    let cropped =
        imageops::crop_imm(image, config.margin_left, config.margin_top, crop_w, crop_h).to_image();

    let mask = content_mask(&cropped, config.white_threshold);
    let found = bounding_box(&mask)?;

    let right = width.saturating_sub(config.right_inset).min(crop_w);
    if right == 0 {
        return None;
    }
    let band = ContentBox {
        left: 0,
        top: found.top,
        right,
        bottom: found.bottom,
    };

    Some(imageops::crop_imm(&cropped, band.left, band.top, band.width(), band.height()).to_image())
}

/// Binarize: 255 where any channel is darker than `threshold`, 0 elsewhere.
pub fn content_mask(image: &RgbImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let px = image.get_pixel(x, y);
        if px.0.iter().any(|&c| c < threshold) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Minimal rectangle containing every non-zero mask pixel.
pub fn bounding_box(mask: &GrayImage) -> Option<ContentBox> {
    let mut found: Option<ContentBox> = None;
    for (x, y, px) in mask.enumerate_pixels() {
        if px.0[0] == 0 {
            continue;
        }
        found = Some(match found {
            None => ContentBox {
                left: x,
                top: y,
                right: x + 1,
                bottom: y + 1,
            },
            Some(b) => ContentBox {
                left: b.left.min(x),
                top: b.top.min(y),
                right: b.right.max(x + 1),
                bottom: b.bottom.max(y + 1),
            },
        });
    }
    found
}
