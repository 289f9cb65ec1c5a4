//! Slide layouts of the template's first slide master, and the mapping from
//! slide roles to them.

use super::package::{resolve_target, Package};
use super::xml::{attr, attributes, malformed, prefixed_attr};
use crate::config::{LayoutMap, LayoutSelector, SlideRole};
use crate::error::Pdf2DeckError;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

/// A placeholder declared on a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPlaceholder {
    /// Shape name on the layout, reused on new slides.
    pub name: String,
    /// `type` attribute of `<p:ph>`; absent means `obj`.
    pub ph_type: Option<String>,
    pub idx: Option<u32>,
    pub orient: Option<String>,
    pub sz: Option<String>,
}

impl LayoutPlaceholder {
    pub fn kind(&self) -> &str {
        self.ph_type.as_deref().unwrap_or("obj")
    }

    pub fn is_title(&self) -> bool {
        matches!(self.kind(), "title" | "ctrTitle")
    }

    /// Date, footer and slide-number placeholders are not copied to slides.
    pub fn is_footer_like(&self) -> bool {
        matches!(self.kind(), "dt" | "ftr" | "sldNum")
    }

    pub fn accepts_text(&self) -> bool {
        matches!(self.kind(), "title" | "ctrTitle" | "subTitle" | "body" | "obj")
    }
}

/// One slide layout of the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLayout {
    /// Position in the master's layout list.
    pub index: usize,
    /// `<p:cSld name>`, empty when unnamed.
    pub name: String,
    /// Part name, e.g. `ppt/slideLayouts/slideLayout4.xml`.
    pub part: String,
    pub placeholders: Vec<LayoutPlaceholder>,
}

impl TemplateLayout {
    pub fn title_placeholder(&self) -> Option<&LayoutPlaceholder> {
        self.placeholders.iter().find(|p| p.is_title())
    }

    /// The subtitle or body placeholder.
    pub fn body_placeholder(&self) -> Option<&LayoutPlaceholder> {
        self.placeholders.iter().find(|p| p.idx == Some(1))
    }

    pub fn display_name(&self) -> String {
        format!("#{} \"{}\"", self.index, self.name)
    }
}

/// The layout chosen for each slide role.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedLayouts {
    pub title: TemplateLayout,
    pub content: TemplateLayout,
    pub title_only: TemplateLayout,
    pub image: TemplateLayout,
}

impl ResolvedLayouts {
    pub(crate) fn get(&self, role: SlideRole) -> &TemplateLayout {
        match role {
            SlideRole::Title => &self.title,
            SlideRole::Content => &self.content,
            SlideRole::TitleOnly => &self.title_only,
            SlideRole::Image => &self.image,
        }
    }
}

/// Map every role to a layout, checking that each layout carries the
/// placeholders its role writes into.
pub(crate) fn resolve_layouts(
    layouts: &[TemplateLayout],
    map: &LayoutMap,
) -> Result<ResolvedLayouts, Pdf2DeckError> {
    let pick = |role: SlideRole| -> Result<TemplateLayout, Pdf2DeckError> {
        let selector = map.get(role);
        let layout = find_layout(layouts, selector).ok_or_else(|| Pdf2DeckError::LayoutNotFound {
            role: role.to_string(),
            selector: selector.to_string(),
            available: available_layouts(layouts),
        })?;
        check_placeholders(layout, role)?;
        debug!("Layout for {role} slides: {}", layout.display_name());
        Ok(layout.clone())
    };

    Ok(ResolvedLayouts {
        title: pick(SlideRole::Title)?,
        content: pick(SlideRole::Content)?,
        title_only: pick(SlideRole::TitleOnly)?,
        image: pick(SlideRole::Image)?,
    })
}

fn find_layout<'a>(layouts: &'a [TemplateLayout], selector: &LayoutSelector) -> Option<&'a TemplateLayout> {
    match selector {
        LayoutSelector::Index(i) => layouts.get(*i),
        LayoutSelector::Name(name) => layouts
            .iter()
            .find(|l| l.name == *name)
            .or_else(|| layouts.iter().find(|l| l.name.eq_ignore_ascii_case(name))),
    }
}

fn check_placeholders(layout: &TemplateLayout, role: SlideRole) -> Result<(), Pdf2DeckError> {
    let missing = |placeholder: &str| Pdf2DeckError::PlaceholderMissing {
        layout: layout.name.clone(),
        placeholder: placeholder.to_string(),
    };
    if layout.title_placeholder().is_none() {
        return Err(missing("title"));
    }
    match role {
        SlideRole::Title if layout.body_placeholder().is_none() => Err(missing("subtitle (idx=1)")),
        SlideRole::Content if layout.body_placeholder().is_none() => Err(missing("body (idx=1)")),
        _ => Ok(()),
    }
}

pub(crate) fn available_layouts(layouts: &[TemplateLayout]) -> String {
    if layouts.is_empty() {
        return "(none)".to_string();
    }
    layouts
        .iter()
        .map(TemplateLayout::display_name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read the layouts of the first slide master listed in `presentation_part`.
pub(crate) fn read_layouts(
    package: &Package,
    presentation_part: &str,
) -> Result<Vec<TemplateLayout>, Pdf2DeckError> {
    let pres_rels = package.relationships(presentation_part)?;
    let master_ids = relationship_ids_of(
        package.part(presentation_part)?,
        presentation_part,
        b"sldMasterId",
    )?;
    let master_rid = master_ids.first().ok_or_else(|| Pdf2DeckError::InvalidTemplate {
        path: package.source().to_path_buf(),
        detail: "presentation has no slide master".into(),
    })?;
    let master_part = target_of(&pres_rels, master_rid, presentation_part, package)?;

    let master_rels = package.relationships(&master_part)?;
    let layout_ids = relationship_ids_of(package.part(&master_part)?, &master_part, b"sldLayoutId")?;

    layout_ids
        .iter()
        .enumerate()
        .map(|(index, rid)| {
            let part = target_of(&master_rels, rid, &master_part, package)?;
            let (name, placeholders) = parse_layout(package.part(&part)?, &part)?;
            Ok(TemplateLayout {
                index,
                name,
                part,
                placeholders,
            })
        })
        .collect()
}

fn target_of(
    rels: &[super::package::Relationship],
    rid: &str,
    source_part: &str,
    package: &Package,
) -> Result<String, Pdf2DeckError> {
    rels.iter()
        .find(|r| r.id == rid)
        .map(|r| resolve_target(source_part, &r.target))
        .ok_or_else(|| Pdf2DeckError::InvalidTemplate {
            path: package.source().to_path_buf(),
            detail: format!("'{source_part}' references missing relationship {rid}"),
        })
}

/// The `r:id` of every `<element>` in document order.
fn relationship_ids_of(xml: &[u8], part: &str, element: &[u8]) -> Result<Vec<String>, Pdf2DeckError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut ids = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.local_name().as_ref() == element => {
                let attrs = attributes(e, part)?;
                if let Some(rid) = prefixed_attr(&attrs, "id") {
                    ids.push(rid.to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(part, e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(ids)
}

/// Layout name and placeholders, in shape-tree order.
pub(crate) fn parse_layout(xml: &[u8], part: &str) -> Result<(String, Vec<LayoutPlaceholder>), Pdf2DeckError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut name = String::new();
    let mut placeholders = Vec::new();
    let mut in_sp = false;
    let mut shape_name: Option<String> = None;
    let mut current: Option<LayoutPlaceholder> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"cSld" => {
                    let attrs = attributes(e, part)?;
                    name = attr(&attrs, "name").unwrap_or_default().to_string();
                }
                b"sp" => {
                    in_sp = true;
                    shape_name = None;
                    current = None;
                }
                b"cNvPr" if in_sp && shape_name.is_none() => {
                    let attrs = attributes(e, part)?;
                    shape_name = attr(&attrs, "name").map(str::to_string);
                }
                b"ph" if in_sp => {
                    let attrs = attributes(e, part)?;
                    current = Some(LayoutPlaceholder {
                        name: String::new(),
                        ph_type: attr(&attrs, "type").map(str::to_string),
                        idx: attr(&attrs, "idx").and_then(|v| v.parse().ok()),
                        orient: attr(&attrs, "orient").map(str::to_string),
                        sz: attr(&attrs, "sz").map(str::to_string),
                    });
                }
                _ => {}
            },
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"sp" => {
                if let Some(mut ph) = current.take() {
                    ph.name = shape_name.take().unwrap_or_default();
                    placeholders.push(ph);
                }
                in_sp = false;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(part, e)),
            _ => {}
        }
        buf.clear();
    }
    Ok((name, placeholders))
}
