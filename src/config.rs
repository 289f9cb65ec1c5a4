//! Configuration types for the PDF-to-deck pipeline.
//!
//! Every knob lives in [`PipelineConfig`], built via its
//! [`PipelineConfigBuilder`]. The nested types group the settings of one
//! stage each: [`TrimConfig`] for the whitespace trimmer, [`ImageFrame`] for
//! picture placement on image slides and [`LayoutMap`] for choosing template
//! layouts.
//!
//! The numeric defaults reproduce the geometry of the deck this tool was
//! first tuned for (a PDF export with a 100px header band and a 66px footer).
//! They are defaults, not assumptions: change them for other sources.

use crate::error::Pdf2DeckError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Configuration for a pipeline run.
///
/// Built via [`PipelineConfig::builder()`] or using
/// [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2deck::{PipelineConfig, RenderResolution};
///
/// let config = PipelineConfig::builder()
///     .resolution(RenderResolution::Dpi(200))
///     .deck_title("Quarterly Review")
///     .white_threshold(120)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Resolution for whole-document rendering. Default: 300 DPI.
    pub resolution: RenderResolution,

    /// Resolution for rendering an explicit page subset. Default: zoom 3.0.
    pub subset_resolution: RenderResolution,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Title placed on the title slide. If None, the PDF metadata title is
    /// used, then the file stem.
    pub deck_title: Option<String>,

    /// Directory (relative to the working directory) holding page images
    /// referenced by the manifest. Default: `output_images`.
    pub images_subdir: String,

    /// Whitespace trimmer settings.
    pub trim: TrimConfig,

    /// Picture placement on image slides.
    pub frame: ImageFrame,

    /// Template layout used for each slide role.
    pub layouts: LayoutMap,

    /// Optional progress callback for per-page and per-row events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resolution: RenderResolution::Dpi(300),
            subset_resolution: RenderResolution::Zoom(3.0),
            password: None,
            deck_title: None,
            images_subdir: "output_images".to_string(),
            trim: TrimConfig::default(),
            frame: ImageFrame::default(),
            layouts: LayoutMap::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("resolution", &self.resolution)
            .field("subset_resolution", &self.subset_resolution)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("deck_title", &self.deck_title)
            .field("images_subdir", &self.images_subdir)
            .field("trim", &self.trim)
            .field("frame", &self.frame)
            .field("layouts", &self.layouts)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn PipelineProgressCallback>"),
            )
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn resolution(mut self, resolution: RenderResolution) -> Self {
        self.config.resolution = resolution;
        self
    }

    pub fn subset_resolution(mut self, resolution: RenderResolution) -> Self {
        self.config.subset_resolution = resolution;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn deck_title(mut self, title: impl Into<String>) -> Self {
        self.config.deck_title = Some(title.into());
        self
    }

    pub fn images_subdir(mut self, dir: impl Into<String>) -> Self {
        self.config.images_subdir = dir.into();
        self
    }

    pub fn trim(mut self, trim: TrimConfig) -> Self {
        self.config.trim = trim;
        self
    }

    pub fn white_threshold(mut self, threshold: u8) -> Self {
        self.config.trim.white_threshold = threshold;
        self
    }

    pub fn frame(mut self, frame: ImageFrame) -> Self {
        self.config.frame = frame;
        self
    }

    pub fn layout(mut self, role: SlideRole, selector: LayoutSelector) -> Self {
        self.config.layouts.set(role, selector);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, Pdf2DeckError> {
        let c = &self.config;
        c.resolution.validate()?;
        c.subset_resolution.validate()?;
        if c.images_subdir.trim().is_empty() {
            return Err(Pdf2DeckError::InvalidConfig(
                "Images directory name must not be empty".into(),
            ));
        }
        c.frame.validate()?;
        Ok(self.config)
    }
}

// ── Rendering ────────────────────────────────────────────────────────────

/// How finely a PDF page is rasterised.
///
/// PDF user space is 72 units per inch, so `Dpi(d)` is the same as
/// `Zoom(d / 72)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RenderResolution {
    /// Dots per inch. Range: 18–1200.
    Dpi(u32),
    /// Scale factor over the page's natural size. Range: 0.25–16.
    Zoom(f32),
}

impl RenderResolution {
    /// The scale factor handed to the renderer.
    pub fn zoom(&self) -> f32 {
        match *self {
            RenderResolution::Dpi(dpi) => dpi as f32 / 72.0,
            RenderResolution::Zoom(z) => z,
        }
    }

    fn validate(&self) -> Result<(), Pdf2DeckError> {
        match *self {
            RenderResolution::Dpi(dpi) if !(18..=1200).contains(&dpi) => Err(
                Pdf2DeckError::InvalidConfig(format!("DPI must be 18–1200, got {dpi}")),
            ),
            RenderResolution::Zoom(z) if !(0.25..=16.0).contains(&z) => Err(
                Pdf2DeckError::InvalidConfig(format!("Zoom must be 0.25–16, got {z}")),
            ),
            _ => Ok(()),
        }
    }
}

/// Specifies which pages of the PDF to render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Every page (default).
    #[default]
    All,
    /// A single page (1-indexed).
    Single(u32),
    /// A contiguous range of pages (1-indexed, inclusive).
    Range(u32, u32),
    /// Specific pages (1-indexed), processed in the given order.
    Set(Vec<u32>),
    /// Pages and inclusive ranges as written on the command line, e.g.
    /// `1,3,5-7`. Ranges are only expanded against a known page count.
    Ranges(Vec<(u32, u32)>),
}

impl PageSelection {
    /// Expand the selection into 1-indexed page numbers.
    ///
    /// Order is preserved and duplicates are dropped. Explicit numbers beyond
    /// `total_pages` are kept so the renderer can report them; a range that
    /// runs past the end is clamped and contributes its first missing page.
    pub fn page_numbers(&self, total_pages: u32) -> Vec<u32> {
        let mut raw = Vec::new();
        match self {
            PageSelection::All => raw.extend(1..=total_pages),
            PageSelection::Single(p) => raw.push(*p),
            PageSelection::Range(start, end) => push_clamped(&mut raw, *start, *end, total_pages),
            PageSelection::Set(pages) => raw.extend_from_slice(pages),
            PageSelection::Ranges(ranges) => {
                for &(start, end) in ranges {
                    push_clamped(&mut raw, start, end, total_pages);
                }
            }
        }
        let mut seen = std::collections::HashSet::new();
        raw.into_iter().filter(|p| seen.insert(*p)).collect()
    }
}

fn push_clamped(out: &mut Vec<u32>, start: u32, end: u32, total_pages: u32) {
    let start = start.max(1);
    if start > end {
        return;
    }
    if start <= total_pages {
        out.extend(start..=end.min(total_pages));
    }
    if end > total_pages {
        out.push(start.max(total_pages.saturating_add(1)));
    }
}

impl FromStr for PageSelection {
    type Err = Pdf2DeckError;

    /// Parse `all`, `5`, `3-15` or `1,3,5-7`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "all" {
            return Ok(PageSelection::All);
        }

        let parse_page = |p: &str| -> Result<u32, Pdf2DeckError> {
            let n: u32 = p
                .trim()
                .parse()
                .map_err(|_| Pdf2DeckError::InvalidConfig(format!("Invalid page number: '{}'", p.trim())))?;
            if n < 1 {
                return Err(Pdf2DeckError::InvalidConfig(format!(
                    "Pages are 1-indexed, minimum is 1 (got {n})"
                )));
            }
            Ok(n)
        };
        let parse_range = |r: &str| -> Result<(u32, u32), Pdf2DeckError> {
            let (a, b) = r
                .split_once('-')
                .ok_or_else(|| Pdf2DeckError::InvalidConfig(format!("Invalid page range '{r}'")))?;
            let (a, b) = (parse_page(a)?, parse_page(b)?);
            if a > b {
                return Err(Pdf2DeckError::InvalidConfig(format!(
                    "Invalid page range '{a}-{b}': start must be <= end"
                )));
            }
            Ok((a, b))
        };

        if s.contains(',') {
            let mut ranges = Vec::new();
            for part in s.split(',').filter(|p| !p.trim().is_empty()) {
                if part.contains('-') {
                    ranges.push(parse_range(part)?);
                } else {
                    let n = parse_page(part)?;
                    ranges.push((n, n));
                }
            }
            return Ok(PageSelection::Ranges(ranges));
        }

        if s.contains('-') {
            let (a, b) = parse_range(&s)?;
            return Ok(PageSelection::Range(a, b));
        }

        Ok(PageSelection::Single(parse_page(&s)?))
    }
}

// ── Trimming ─────────────────────────────────────────────────────────────

/// Whitespace trimmer settings.
///
/// The fixed margins cut away a known header/footer band first; the content
/// box is then computed on what remains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimConfig {
    /// Pixels removed from the top before measuring. Default: 100.
    pub margin_top: u32,
    /// Pixels removed from the bottom before measuring. Default: 66.
    pub margin_bottom: u32,
    /// Pixels removed from the left before measuring. Default: 5.
    pub margin_left: u32,
    /// Pixels removed from the right before measuring. Default: 5.
    pub margin_right: u32,
    /// A pixel is content when any channel is below this value. Default: 100.
    pub white_threshold: u8,
    /// The kept band ends this many pixels short of the source width.
    /// Default: 10.
    pub right_inset: u32,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            margin_top: 100,
            margin_bottom: 66,
            margin_left: 5,
            margin_right: 5,
            white_threshold: 100,
            right_inset: 10,
        }
    }
}

// ── Deck geometry ────────────────────────────────────────────────────────

/// EMUs (English Metric Units) per typographic point.
pub const EMU_PER_POINT: f64 = 12_700.0;

/// Where pictures go on image slides, in points.
///
/// The content area is the slide minus the two margins; the fitted picture is
/// centred in it and then shifted by the offsets, which leaves room for the
/// title bar of the layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageFrame {
    /// Subtracted from the slide width. Default: 180pt.
    pub horizontal_margin_pt: f64,
    /// Subtracted from the slide height. Default: 150pt.
    pub vertical_margin_pt: f64,
    /// Added to the centred x position. Default: 100pt.
    pub offset_x_pt: f64,
    /// Added to the centred y position. Default: 90pt.
    pub offset_y_pt: f64,
}

impl Default for ImageFrame {
    fn default() -> Self {
        Self {
            horizontal_margin_pt: 180.0,
            vertical_margin_pt: 150.0,
            offset_x_pt: 100.0,
            offset_y_pt: 90.0,
        }
    }
}

impl ImageFrame {
    fn validate(&self) -> Result<(), Pdf2DeckError> {
        let all = [
            self.horizontal_margin_pt,
            self.vertical_margin_pt,
            self.offset_x_pt,
            self.offset_y_pt,
        ];
        if all.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(Pdf2DeckError::InvalidConfig(format!(
                "Image frame values must be finite and non-negative: {self:?}"
            )));
        }
        Ok(())
    }
    /// Reject margins that leave no room for a picture on a slide of
    /// `slide_size` EMU.
    pub(crate) fn check_fits(&self, slide_size: (i64, i64)) -> Result<(), Pdf2DeckError> {
        let margin_w = self.horizontal_margin_pt * EMU_PER_POINT;
        let margin_h = self.vertical_margin_pt * EMU_PER_POINT;
        if margin_w >= slide_size.0 as f64 || margin_h >= slide_size.1 as f64 {
            return Err(Pdf2DeckError::InvalidConfig(format!(
                "Image frame margins ({}pt x {}pt) leave no room on a {} x {} EMU slide",
                self.horizontal_margin_pt, self.vertical_margin_pt, slide_size.0, slide_size.1
            )));
        }
        Ok(())
    }
}

// ── Layouts ──────────────────────────────────────────────────────────────

/// The semantic kind of slide a layout is needed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlideRole {
    /// Title and subtitle.
    Title,
    /// Title and a multi-line body (table of contents).
    Content,
    /// Title alone (section divider).
    TitleOnly,
    /// Title plus a picture.
    Image,
}

impl SlideRole {
    pub const ALL: [SlideRole; 4] = [
        SlideRole::Title,
        SlideRole::Content,
        SlideRole::TitleOnly,
        SlideRole::Image,
    ];
}

impl fmt::Display for SlideRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SlideRole::Title => "title",
            SlideRole::Content => "content",
            SlideRole::TitleOnly => "title-only",
            SlideRole::Image => "image",
        })
    }
}

impl FromStr for SlideRole {
    type Err = Pdf2DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "title" => Ok(SlideRole::Title),
            "content" | "toc" => Ok(SlideRole::Content),
            "title-only" | "subtitle" => Ok(SlideRole::TitleOnly),
            "image" | "main" => Ok(SlideRole::Image),
            other => Err(Pdf2DeckError::InvalidConfig(format!(
                "Unknown slide role '{other}' (expected title, content, title-only or image)"
            ))),
        }
    }
}

/// Identifies a layout in the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutSelector {
    /// Position in the first slide master's layout list (0-based).
    Index(usize),
    /// Layout name as shown in PowerPoint (`<p:cSld name="…">`), matched
    /// case-insensitively.
    Name(String),
}

impl fmt::Display for LayoutSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutSelector::Index(i) => write!(f, "#{i}"),
            LayoutSelector::Name(n) => write!(f, "\"{n}\""),
        }
    }
}

impl FromStr for LayoutSelector {
    type Err = Pdf2DeckError;

    /// `3` or `#3` select by position; anything else selects by name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Pdf2DeckError::InvalidConfig("Empty layout selector".into()));
        }
        let digits = s.strip_prefix('#').unwrap_or(s);
        match digits.parse::<usize>() {
            Ok(i) => Ok(LayoutSelector::Index(i)),
            Err(_) => Ok(LayoutSelector::Name(s.to_string())),
        }
    }
}

/// Which template layout serves each [`SlideRole`].
///
/// Defaults are the first four layouts of the template, in the order
/// title, content, title-only, image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutMap {
    pub title: LayoutSelector,
    pub content: LayoutSelector,
    pub title_only: LayoutSelector,
    pub image: LayoutSelector,
}

impl Default for LayoutMap {
    fn default() -> Self {
        Self {
            title: LayoutSelector::Index(0),
            content: LayoutSelector::Index(1),
            title_only: LayoutSelector::Index(2),
            image: LayoutSelector::Index(3),
        }
    }
}

impl LayoutMap {
    pub fn get(&self, role: SlideRole) -> &LayoutSelector {
        match role {
            SlideRole::Title => &self.title,
            SlideRole::Content => &self.content,
            SlideRole::TitleOnly => &self.title_only,
            SlideRole::Image => &self.image,
        }
    }

    pub fn set(&mut self, role: SlideRole, selector: LayoutSelector) {
        match role {
            SlideRole::Title => self.title = selector,
            SlideRole::Content => self.content = selector,
            SlideRole::TitleOnly => self.title_only = selector,
            SlideRole::Image => self.image = selector,
        }
    }

    /// Apply a `role=selector` override, e.g. `image=Picture Slide`.
    pub fn apply_override(&mut self, spec: &str) -> Result<(), Pdf2DeckError> {
        let (role, selector) = spec.split_once('=').ok_or_else(|| {
            Pdf2DeckError::InvalidConfig(format!(
                "Layout override '{spec}' must look like role=selector"
            ))
        })?;
        self.set(role.parse()?, selector.parse()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dpi_converts_to_zoom() {
        assert!((RenderResolution::Dpi(300).zoom() - 300.0 / 72.0).abs() < f32::EPSILON);
        assert_eq!(RenderResolution::Zoom(3.0).zoom(), 3.0);
    }

    #[test]
    fn builder_rejects_bad_resolution() {
        let err = PipelineConfig::builder()
            .resolution(RenderResolution::Dpi(5))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("DPI"));

        let err = PipelineConfig::builder()
            .subset_resolution(RenderResolution::Zoom(0.0))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Zoom"));
    }

    #[test]
    fn builder_rejects_empty_images_dir() {
        assert!(PipelineConfig::builder().images_subdir("  ").build().is_err());
    }

    #[test]
    fn trim_defaults_match_known_footer_band() {
        let t = TrimConfig::default();
        assert_eq!(
            (t.margin_top, t.margin_bottom, t.margin_left, t.margin_right),
            (100, 66, 5, 5)
        );
        assert_eq!(t.white_threshold, 100);
        assert_eq!(t.right_inset, 10);
    }

    #[test]
    fn page_selection_parsing() {
        assert_eq!("all".parse::<PageSelection>().unwrap(), PageSelection::All);
        assert_eq!("5".parse::<PageSelection>().unwrap(), PageSelection::Single(5));
        assert_eq!(
            "3-15".parse::<PageSelection>().unwrap(),
            PageSelection::Range(3, 15)
        );
        assert_eq!(
            "1,3,5-7".parse::<PageSelection>().unwrap(),
            PageSelection::Ranges(vec![(1, 1), (3, 3), (5, 7)])
        );
        assert!("0".parse::<PageSelection>().is_err());
        assert!("9-2".parse::<PageSelection>().is_err());
        assert!("x".parse::<PageSelection>().is_err());
    }

    #[test]
    fn page_numbers_keep_order_and_out_of_range() {
        assert_eq!(PageSelection::All.page_numbers(3), vec![1, 2, 3]);
        assert_eq!(PageSelection::Range(2, 4).page_numbers(3), vec![2, 3, 4]);
        assert_eq!(
            PageSelection::Set(vec![5, 1, 5, 2]).page_numbers(3),
            vec![5, 1, 2]
        );
    }

    #[test]
    fn oversized_ranges_are_clamped_to_the_document() {
        let huge: PageSelection = "1-4294967295".parse().unwrap();
        assert_eq!(huge, PageSelection::Range(1, u32::MAX));
        assert_eq!(huge.page_numbers(3), vec![1, 2, 3, 4]);

        let mixed: PageSelection = "2,10-4294967295,2".parse().unwrap();
        assert_eq!(mixed.page_numbers(12), vec![2, 10, 11, 12, 13]);
        assert_eq!(PageSelection::Range(7, 9).page_numbers(3), vec![7]);
    }

    #[test]
    fn layout_selector_parsing() {
        assert_eq!("2".parse::<LayoutSelector>().unwrap(), LayoutSelector::Index(2));
        assert_eq!("#4".parse::<LayoutSelector>().unwrap(), LayoutSelector::Index(4));
        assert_eq!(
            "Title Only".parse::<LayoutSelector>().unwrap(),
            LayoutSelector::Name("Title Only".into())
        );
        assert!("".parse::<LayoutSelector>().is_err());
    }

    #[test]
    fn layout_override() {
        let mut map = LayoutMap::default();
        map.apply_override("image=Picture Slide").unwrap();
        map.apply_override("title_only=#5").unwrap();
        assert_eq!(map.image, LayoutSelector::Name("Picture Slide".into()));
        assert_eq!(map.title_only, LayoutSelector::Index(5));
        assert!(map.apply_override("nonsense").is_err());
        assert!(map.apply_override("footer=1").is_err());
    }
}
