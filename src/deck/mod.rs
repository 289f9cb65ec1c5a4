//! Presentation assembly on top of a `.pptx` template.
//!
//! A [`Deck`] is opened once from a template, receives slides in order, and
//! is written once with [`Deck::save`]. Slides already present in the
//! template are kept in front of the new ones.
//!
//! ## Package edits per slide
//!
//! ```text
//! ppt/slides/slideN.xml              new slide, placeholders from the layout
//! ppt/slides/_rels/slideN.xml.rels   → layout (+ → media image)
//! ppt/media/imageM.<ext>             picture bytes (image slides only)
//! ppt/_rels/presentation.xml.rels    + slide relationship
//! ppt/presentation.xml               + <p:sldId> in <p:sldIdLst>
//! [Content_Types].xml                + slide override, + image default
//! ```

pub mod layout;
mod package;
pub mod slide;
mod xml;

pub use layout::{LayoutPlaceholder, TemplateLayout};
pub use slide::{fit_picture, Placement};

use crate::config::{ImageFrame, LayoutMap, SlideRole};
use crate::error::Pdf2DeckError;
use layout::{read_layouts, resolve_layouts, ResolvedLayouts};
use package::{
    add_override, ensure_default, next_relationship_id, relationships_xml, relative_target,
    rels_part_name, resolve_target, Package, Relationship, CONTENT_TYPES_PART, CT_SLIDE,
    RT_IMAGE, RT_OFFICE_DOCUMENT, RT_SLIDE, RT_SLIDE_LAYOUT,
};
use quick_xml::events::Event;
use quick_xml::Reader;
use slide::{slide_xml, SlidePicture, SlideText};
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;
use tracing::{debug, info};
use xml::{attr, attributes, malformed};

/// Slide size used when the template does not declare one (10in × 7.5in).
const DEFAULT_SLIDE_SIZE: (i64, i64) = (9_144_000, 6_858_000);

/// Smallest id PowerPoint accepts in `<p:sldId>`.
const MIN_SLIDE_ID: u32 = 256;

/// A presentation being built from a template.
pub struct Deck {
    package: Package,
    presentation_part: String,
    presentation_rels: Vec<Relationship>,
    content_types: String,
    layouts: Vec<TemplateLayout>,
    resolved: ResolvedLayouts,
    frame: ImageFrame,
    slide_size: (i64, i64),
    next_slide_id: u32,
    /// `(sldId id, relationship id)` of every slide added so far.
    new_slides: Vec<(u32, String)>,
    template_slides: usize,
}

impl Deck {
    /// Open `template` and resolve the layout for every slide role.
    ///
    /// Fails with [`Pdf2DeckError::LayoutNotFound`] or
    /// [`Pdf2DeckError::PlaceholderMissing`] before anything is built.
    pub fn open(template: &Path, layouts: &LayoutMap, frame: ImageFrame) -> Result<Self, Pdf2DeckError> {
        let package = Package::open(template)?;
        Self::from_package(package, layouts, frame)
    }

    /// Same as [`Deck::open`] for a template already in memory.
    pub fn from_bytes(
        template_name: &Path,
        bytes: Vec<u8>,
        layouts: &LayoutMap,
        frame: ImageFrame,
    ) -> Result<Self, Pdf2DeckError> {
        Self::from_package(Package::from_bytes(template_name, bytes)?, layouts, frame)
    }

    fn from_package(package: Package, map: &LayoutMap, frame: ImageFrame) -> Result<Self, Pdf2DeckError> {
        let presentation_part = main_part(&package)?;
        let presentation_rels = package.relationships(&presentation_part)?;
        let content_types = package.part_str(CONTENT_TYPES_PART)?.to_string();

        let info = PresentationInfo::parse(package.part(&presentation_part)?, &presentation_part)?;
        let layouts = read_layouts(&package, &presentation_part)?;
        let resolved = resolve_layouts(&layouts, map)?;

        let slide_size = info.slide_size.unwrap_or_else(|| {
            debug!("Template declares no slide size; using 4:3 default");
            DEFAULT_SLIDE_SIZE
        });
        frame.check_fits(slide_size)?;
        let next_slide_id = info
            .slide_ids
            .iter()
            .copied()
            .max()
            .map_or(MIN_SLIDE_ID, |max| (max + 1).max(MIN_SLIDE_ID));

        info!(
            "Opened template {} ({} layouts, {} existing slides)",
            package.source().display(),
            layouts.len(),
            info.slide_ids.len()
        );

        Ok(Deck {
            package,
            presentation_part,
            presentation_rels,
            content_types,
            layouts,
            resolved,
            frame,
            slide_size,
            next_slide_id,
            new_slides: Vec::new(),
            template_slides: info.slide_ids.len(),
        })
    }

    /// All layouts of the first slide master, in order.
    pub fn layouts(&self) -> &[TemplateLayout] {
        &self.layouts
    }

    /// The layout used for slides of `role`.
    pub fn layout_for(&self, role: SlideRole) -> &TemplateLayout {
        self.resolved.get(role)
    }

    /// Slide width and height in EMU.
    pub fn slide_size(&self) -> (i64, i64) {
        self.slide_size
    }

    /// Template slides plus slides added so far.
    pub fn slide_count(&self) -> usize {
        self.template_slides + self.new_slides.len()
    }

    pub fn slides_added(&self) -> usize {
        self.new_slides.len()
    }

    /// Title slide: title plus subtitle.
    pub fn add_title_slide(&mut self, title: &str, subtitle: &str) -> Result<(), Pdf2DeckError> {
        let text = SlideText {
            title,
            body: Some(subtitle),
        };
        self.add_slide(SlideRole::Title, text, None)
    }

    /// Content slide: title plus a body with one paragraph per line.
    pub fn add_content_slide(&mut self, title: &str, body: &str) -> Result<(), Pdf2DeckError> {
        let text = SlideText {
            title,
            body: Some(body),
        };
        self.add_slide(SlideRole::Content, text, None)
    }

    /// Section divider: title only.
    pub fn add_title_only_slide(&mut self, title: &str) -> Result<(), Pdf2DeckError> {
        self.add_slide(SlideRole::TitleOnly, SlideText { title, body: None }, None)
    }

    /// Image slide: title plus the picture at `image_path`, scaled into the
    /// configured frame.
    pub fn add_image_slide(&mut self, title: &str, image_path: &Path) -> Result<(), Pdf2DeckError> {
        let format = image::ImageFormat::from_path(image_path).map_err(|e| Pdf2DeckError::image(image_path, e))?;
        let (extension, content_type) = match format {
            image::ImageFormat::Png => ("png", "image/png"),
            image::ImageFormat::Jpeg => ("jpeg", "image/jpeg"),
            other => {
                return Err(Pdf2DeckError::InvalidManifest(format!(
                    "unsupported picture format {other:?} for '{}'",
                    image_path.display()
                )))
            }
        };
        let size = image::image_dimensions(image_path).map_err(|e| Pdf2DeckError::image(image_path, e))?;
        let bytes = std::fs::read(image_path).map_err(|e| Pdf2DeckError::ReadFailed {
            path: image_path.to_path_buf(),
            source: e,
        })?;

        let media_part = self.package.next_part_name("ppt/media", "image", extension);
        self.package.set_part(media_part.clone(), bytes);
        ensure_default(&mut self.content_types, extension, content_type)?;

        let placement = fit_picture(self.slide_size, size, &self.frame);
        debug!(
            "Placing {}x{} px image at ({}, {}) size {}x{} EMU",
            size.0, size.1, placement.x, placement.y, placement.cx, placement.cy
        );
        let picture = PendingPicture {
            media_part,
            description: image_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            placement,
        };
        self.add_slide(SlideRole::Image, SlideText { title, body: None }, Some(picture))
    }

    fn add_slide(
        &mut self,
        role: SlideRole,
        text: SlideText<'_>,
        picture: Option<PendingPicture>,
    ) -> Result<(), Pdf2DeckError> {
        let slide_part = self.package.next_part_name("ppt/slides", "slide", "xml");
        let layout = self.resolved.get(role);

        let mut slide_rels = vec![Relationship::internal(
            "rId1",
            RT_SLIDE_LAYOUT,
            relative_target(&slide_part, &layout.part),
        )];
        let picture = picture.map(|p| {
            let rel_id = next_relationship_id(&slide_rels);
            slide_rels.push(Relationship::internal(
                rel_id.clone(),
                RT_IMAGE,
                relative_target(&slide_part, &p.media_part),
            ));
            SlidePicture {
                rel_id,
                description: p.description,
                placement: p.placement,
            }
        });

        let xml = slide_xml(layout, text, picture.as_ref());
        self.package.set_part(slide_part.clone(), xml);
        self.package
            .set_part(rels_part_name(&slide_part), relationships_xml(&slide_rels));
        add_override(&mut self.content_types, &slide_part, CT_SLIDE)?;

        let rel_id = next_relationship_id(&self.presentation_rels);
        self.presentation_rels.push(Relationship::internal(
            rel_id.clone(),
            RT_SLIDE,
            relative_target(&self.presentation_part, &slide_part),
        ));
        self.new_slides.push((self.next_slide_id, rel_id));
        self.next_slide_id += 1;

        debug!("Added {role} slide {slide_part} from layout {}", layout.display_name());
        Ok(())
    }

    /// Serialise the finished presentation.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Pdf2DeckError> {
        let mut package = self.package.clone();
        let presentation = package.part_str(&self.presentation_part)?;
        let presentation = insert_slide_ids(presentation, &self.presentation_part, &self.new_slides)?;
        package.set_part(self.presentation_part.clone(), presentation);
        package.set_part(
            rels_part_name(&self.presentation_part),
            relationships_xml(&self.presentation_rels),
        );
        package.set_part(CONTENT_TYPES_PART, self.content_types.clone());
        package.to_bytes()
    }

    /// Write the presentation to `output` atomically: the file either holds
    /// the complete deck or is left untouched.
    pub fn save(&self, output: &Path) -> Result<(), Pdf2DeckError> {
        let bytes = self.to_bytes()?;

        let parent = match output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(|e| Pdf2DeckError::write_failed(output, e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| Pdf2DeckError::write_failed(output, e))?;
        tmp.write_all(&bytes)
            .map_err(|e| Pdf2DeckError::write_failed(output, e))?;
        tmp.persist(output)
            .map_err(|e| Pdf2DeckError::write_failed(output, e.error))?;

        info!(
            "Saved {} slides ({} new) to {}",
            self.slide_count(),
            self.slides_added(),
            output.display()
        );
        Ok(())
    }
}

impl std::fmt::Debug for Deck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deck")
            .field("template", &self.package.source())
            .field("layouts", &self.layouts.len())
            .field("slide_size", &self.slide_size)
            .field("slides_added", &self.new_slides.len())
            .finish()
    }
}

struct PendingPicture {
    media_part: String,
    description: String,
    placement: Placement,
}

/// The main document part named by the package's root relationships.
fn main_part(package: &Package) -> Result<String, Pdf2DeckError> {
    let rels = package.relationships("")?;
    let part = rels
        .iter()
        .find(|r| r.is_type(RT_OFFICE_DOCUMENT))
        .map(|r| resolve_target("", &r.target))
        .unwrap_or_else(|| "ppt/presentation.xml".to_string());
    if !package.contains(&part) {
        return Err(Pdf2DeckError::InvalidTemplate {
            path: package.source().to_path_buf(),
            detail: format!("missing presentation part '{part}'"),
        });
    }
    Ok(part)
}

/// What the assembler needs from `presentation.xml`.
#[derive(Debug, Default, PartialEq, Eq)]
struct PresentationInfo {
    /// Namespace prefix of the root element, usually `p`.
    prefix: Option<String>,
    /// Prefix bound to the relationships namespace, usually `r`.
    rel_prefix: Option<String>,
    slide_size: Option<(i64, i64)>,
    slide_ids: Vec<u32>,
}

const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

impl PresentationInfo {
    fn parse(xml: &[u8], part: &str) -> Result<Self, Pdf2DeckError> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut info = PresentationInfo::default();
        let mut seen_root = false;
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) if !seen_root => {
                    seen_root = true;
                    info.prefix = e
                        .name()
                        .prefix()
                        .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());
                    info.rel_prefix = attributes(e, part)?
                        .into_iter()
                        .find(|(k, v)| k.starts_with("xmlns:") && v == RELATIONSHIPS_NS)
                        .map(|(k, _)| k["xmlns:".len()..].to_string());
                }
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    match e.local_name().as_ref() {
                        b"sldSz" => {
                            let attrs = attributes(e, part)?;
                            let dim = |name| attr(&attrs, name).and_then(|v| v.parse::<i64>().ok());
                            if let (Some(cx), Some(cy)) = (dim("cx"), dim("cy")) {
                                info.slide_size = Some((cx, cy));
                            }
                        }
                        b"sldId" => {
                            let attrs = attributes(e, part)?;
                            if let Some(id) = attr(&attrs, "id").and_then(|v| v.parse().ok()) {
                                info.slide_ids.push(id);
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(malformed(part, e)),
                _ => {}
            }
            buf.clear();
        }
        Ok(info)
    }
}

/// Append `<p:sldId>` entries for `slides` to the slide list of
/// `presentation`, creating the list when the template has none.
fn insert_slide_ids(presentation: &str, part: &str, slides: &[(u32, String)]) -> Result<String, Pdf2DeckError> {
    if slides.is_empty() {
        return Ok(presentation.to_string());
    }
    let info = PresentationInfo::parse(presentation.as_bytes(), part)?;
    let p = info.prefix.map(|p| format!("{p}:")).unwrap_or_default();
    let r = info.rel_prefix.ok_or_else(|| {
        malformed(part, "root element does not declare the relationships namespace")
    })?;

    let mut entries = String::new();
    for (id, rid) in slides {
        let _ = write!(entries, r#"<{p}sldId id="{id}" {r}:id="{rid}"/>"#);
    }

    let mut out = presentation.to_string();
    let list_end = format!("</{p}sldIdLst>");
    let empty_list = format!("<{p}sldIdLst/>");
    if let Some(pos) = out.find(&list_end) {
        out.insert_str(pos, &entries);
    } else if let Some(pos) = out.find(&empty_list) {
        out.replace_range(pos..pos + empty_list.len(), &format!("<{p}sldIdLst>{entries}</{p}sldIdLst>"));
    } else {
        // The list precedes sldSz, or notesSz when sldSz is absent.
        let anchor = [format!("<{p}sldSz"), format!("<{p}notesSz")]
            .into_iter()
            .find_map(|tag| out.find(&tag))
            .ok_or_else(|| malformed(part, "no sldSz or notesSz element to anchor the slide list"))?;
        out.insert_str(anchor, &format!("<{p}sldIdLst>{entries}</{p}sldIdLst>"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PRESENTATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldSz cx="12192000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#;

    #[test]
    fn reads_prefixes_and_size() {
        let info = PresentationInfo::parse(PRESENTATION.as_bytes(), "ppt/presentation.xml").unwrap();
        assert_eq!(info.prefix.as_deref(), Some("p"));
        assert_eq!(info.rel_prefix.as_deref(), Some("r"));
        assert_eq!(info.slide_size, Some((12_192_000, 6_858_000)));
        assert!(info.slide_ids.is_empty());
    }

    #[test]
    fn creates_slide_list_before_slide_size() {
        let out = insert_slide_ids(
            PRESENTATION,
            "ppt/presentation.xml",
            &[(256, "rId2".into()), (257, "rId3".into())],
        )
        .unwrap();
        assert!(out.contains(
            r#"</p:sldMasterIdLst><p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst><p:sldSz"#
        ));
        let info = PresentationInfo::parse(out.as_bytes(), "p").unwrap();
        assert_eq!(info.slide_ids, vec![256, 257]);
    }

    #[test]
    fn appends_to_existing_list() {
        let existing = PRESENTATION.replace(
            "<p:sldSz",
            r#"<p:sldIdLst><p:sldId id="300" r:id="rId5"/></p:sldIdLst><p:sldSz"#,
        );
        let out = insert_slide_ids(&existing, "p", &[(301, "rId6".into())]).unwrap();
        assert_eq!(
            PresentationInfo::parse(out.as_bytes(), "p").unwrap().slide_ids,
            vec![300, 301]
        );
    }

    #[test]
    fn expands_empty_list_element() {
        let existing = PRESENTATION.replace("<p:sldSz", "<p:sldIdLst/><p:sldSz");
        let out = insert_slide_ids(&existing, "p", &[(256, "rId2".into())]).unwrap();
        assert!(out.contains(r#"<p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst>"#));
        assert!(!out.contains("<p:sldIdLst/>"));
    }

    #[test]
    fn nothing_to_insert_is_identity() {
        assert_eq!(insert_slide_ids(PRESENTATION, "p", &[]).unwrap(), PRESENTATION);
    }
}
