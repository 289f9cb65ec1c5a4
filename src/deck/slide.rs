//! Slide XML generation and picture placement.

use super::layout::{LayoutPlaceholder, TemplateLayout};
use super::xml::escape_xml;
use crate::config::{ImageFrame, EMU_PER_POINT};
use std::fmt::Write as _;

/// Position and size of a picture, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

/// Scale an image of `image_size` pixels into the frame's content area of a
/// slide of `slide_size` EMU, keeping its aspect ratio.
pub fn fit_picture(slide_size: (i64, i64), image_size: (u32, u32), frame: &ImageFrame) -> Placement {
    let area_w = (slide_size.0 as f64 - frame.horizontal_margin_pt * EMU_PER_POINT).max(0.0);
    let area_h = (slide_size.1 as f64 - frame.vertical_margin_pt * EMU_PER_POINT).max(0.0);
    let image_ratio = image_size.0 as f64 / image_size.1.max(1) as f64;
    let area_ratio = area_w / area_h;

    let (w, h) = if image_ratio > area_ratio {
        (area_w, area_w / image_ratio)
    } else {
        (area_h * image_ratio, area_h)
    };

    Placement {
        x: ((area_w - w) / 2.0 + frame.offset_x_pt * EMU_PER_POINT) as i64,
        y: ((area_h - h) / 2.0 + frame.offset_y_pt * EMU_PER_POINT) as i64,
        cx: w as i64,
        cy: h as i64,
    }
}

/// A picture to embed, already registered as relationship `rel_id`.
#[derive(Debug, Clone)]
pub(crate) struct SlidePicture {
    pub rel_id: String,
    pub description: String,
    pub placement: Placement,
}

/// Text destined for the layout's placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SlideText<'a> {
    pub title: &'a str,
    /// Goes to the `idx=1` placeholder; one paragraph per line.
    pub body: Option<&'a str>,
}

/// Build the XML of a slide based on `layout`.
///
/// Every layout placeholder except date, footer and slide number is
/// repeated on the slide so that it inherits position and formatting.
pub(crate) fn slide_xml(layout: &TemplateLayout, text: SlideText<'_>, picture: Option<&SlidePicture>) -> String {
    let mut xml = String::with_capacity(2048);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    xml.push_str(r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#);
    xml.push_str(r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#);
    xml.push_str(r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#);
    xml.push_str("<p:cSld><p:spTree>");
    xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
    xml.push_str(r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#);

    let mut shape_id = 2u32;
    for ph in layout.placeholders.iter().filter(|p| !p.is_footer_like()) {
        let content = if ph.is_title() {
            Some(text.title)
        } else if ph.idx == Some(1) {
            text.body
        } else {
            None
        };
        write_placeholder(&mut xml, shape_id, ph, content);
        shape_id += 1;
    }

    if let Some(picture) = picture {
        write_picture(&mut xml, shape_id, picture);
    }

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sld>");
    xml
}

fn write_placeholder(xml: &mut String, id: u32, ph: &LayoutPlaceholder, content: Option<&str>) {
    xml.push_str("<p:sp><p:nvSpPr>");
    let _ = write!(xml, r#"<p:cNvPr id="{id}" name="{}"/>"#, escape_xml(&ph.name));
    xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#);
    xml.push_str("<p:nvPr><p:ph");
    if let Some(t) = &ph.ph_type {
        let _ = write!(xml, r#" type="{}""#, escape_xml(t));
    }
    if let Some(o) = &ph.orient {
        let _ = write!(xml, r#" orient="{}""#, escape_xml(o));
    }
    if let Some(sz) = &ph.sz {
        let _ = write!(xml, r#" sz="{}""#, escape_xml(sz));
    }
    if let Some(idx) = ph.idx.filter(|i| *i != 0) {
        let _ = write!(xml, r#" idx="{idx}""#);
    }
    xml.push_str("/></p:nvPr></p:nvSpPr><p:spPr/>");

    if ph.accepts_text() || content.is_some() {
        xml.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");
        write_paragraphs(xml, content.unwrap_or_default());
        xml.push_str("</p:txBody>");
    }
    xml.push_str("</p:sp>");
}

/// One `<a:p>` per line; empty text gives a single empty paragraph.
/// Vertical tab and form feed, common in extracted PDF text, also end a line.
fn write_paragraphs(xml: &mut String, text: &str) {
    if text.is_empty() {
        xml.push_str("<a:p/>");
        return;
    }
    for line in text.split(['\n', '\u{b}', '\u{c}']) {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            xml.push_str("<a:p/>");
        } else {
            let _ = write!(
                xml,
                r#"<a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
                escape_xml(line)
            );
        }
    }
}

fn write_picture(xml: &mut String, id: u32, picture: &SlidePicture) {
    let Placement { x, y, cx, cy } = picture.placement;
    xml.push_str("<p:pic><p:nvPicPr>");
    let _ = write!(
        xml,
        r#"<p:cNvPr id="{id}" name="Picture {}" descr="{}"/>"#,
        id - 1,
        escape_xml(&picture.description)
    );
    xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#);
    let _ = write!(
        xml,
        r#"<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
        escape_xml(&picture.rel_id)
    );
    let _ = write!(
        xml,
        r#"<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#
    );
    xml.push_str("</p:pic>");
}
