//! Shared fixtures for the integration tests: a minimal `.pptx` template,
//! generated page images and helpers to look inside written decks.

#![allow(dead_code)]

use image::{Rgb, RgbImage};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/slideLayouts/slideLayout2.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/slideLayouts/slideLayout3.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/slideLayouts/slideLayout4.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#;

const PRESENTATION_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/></Relationships>"#;

const MASTER_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout2.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout3.xml"/><Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout4.xml"/></Relationships>"#;

const LAYOUT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/></Relationships>"#;

/// Layout names of the generated template, in master order.
pub const LAYOUT_NAMES: [&str; 4] = ["Title Slide", "Title and Content", "Title Only", "Picture Slide"];

fn presentation_xml(slide_size: (i64, i64)) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation {NS}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldSz cx="{}" cy="{}"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
        slide_size.0, slide_size.1
    )
}

fn master_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster {NS}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/><p:sldLayoutId id="2147483650" r:id="rId2"/><p:sldLayoutId id="2147483651" r:id="rId3"/><p:sldLayoutId id="2147483652" r:id="rId4"/></p:sldLayoutIdLst></p:sldMaster>"#
    )
}

fn placeholder(id: u32, name: &str, ph: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr/><p:nvPr>{ph}</p:nvPr></p:nvSpPr><p:spPr/></p:sp>"#
    )
}

fn layout_xml(name: &str, shapes: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout {NS}><p:cSld name="{name}"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sldLayout>"#,
        shapes.concat()
    )
}

fn layouts() -> [String; 4] {
    [
        layout_xml(
            LAYOUT_NAMES[0],
            &[
                placeholder(2, "Title 1", r#"<p:ph type="ctrTitle"/>"#),
                placeholder(3, "Subtitle 2", r#"<p:ph type="subTitle" idx="1"/>"#),
                placeholder(4, "Date Placeholder 3", r#"<p:ph type="dt" sz="half" idx="10"/>"#),
            ],
        ),
        layout_xml(
            LAYOUT_NAMES[1],
            &[
                placeholder(2, "Title 1", r#"<p:ph type="title"/>"#),
                placeholder(3, "Content Placeholder 2", r#"<p:ph idx="1"/>"#),
            ],
        ),
        layout_xml(
            LAYOUT_NAMES[2],
            &[placeholder(2, "Title 1", r#"<p:ph type="title"/>"#)],
        ),
        layout_xml(
            LAYOUT_NAMES[3],
            &[
                placeholder(2, "Title 1", r#"<p:ph type="title"/>"#),
                placeholder(3, "Picture Placeholder 2", r#"<p:ph type="pic" idx="1"/>"#),
            ],
        ),
    ]
}

/// Bytes of a four-layout template with a 4:3 slide size.
pub fn template_bytes() -> Vec<u8> {
    template_bytes_with_size((9_144_000, 6_858_000))
}

pub fn template_bytes_with_size(slide_size: (i64, i64)) -> Vec<u8> {
    let mut parts: Vec<(String, String)> = vec![
        ("[Content_Types].xml".into(), CONTENT_TYPES.into()),
        ("_rels/.rels".into(), ROOT_RELS.into()),
        ("ppt/presentation.xml".into(), presentation_xml(slide_size)),
        ("ppt/_rels/presentation.xml.rels".into(), PRESENTATION_RELS.into()),
        ("ppt/slideMasters/slideMaster1.xml".into(), master_xml()),
        ("ppt/slideMasters/_rels/slideMaster1.xml.rels".into(), MASTER_RELS.into()),
    ];
    for (i, xml) in layouts().into_iter().enumerate() {
        let n = i + 1;
        parts.push((format!("ppt/slideLayouts/slideLayout{n}.xml"), xml));
        parts.push((format!("ppt/slideLayouts/_rels/slideLayout{n}.xml.rels"), LAYOUT_RELS.into()));
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn write_template(path: &Path) {
    std::fs::write(path, template_bytes()).unwrap();
}

/// White page with a dark block covering `rows` × `cols`.
pub fn page_image(width: u32, height: u32, rows: std::ops::Range<u32>, cols: std::ops::Range<u32>) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        if rows.contains(&y) && cols.contains(&x) {
            Rgb([20, 20, 20])
        } else {
            Rgb([255, 255, 255])
        }
    })
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    page_image(width, height, 0..height, 0..width).save(path).unwrap();
}

/// Every entry of the zip at `path`, decoded as UTF-8 where possible.
pub fn read_entries(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = ZipArchive::new(file).unwrap();
    let mut entries = BTreeMap::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).unwrap();
        entries.insert(entry.name().to_string(), bytes);
    }
    entries
}

pub fn entry_text(entries: &BTreeMap<String, Vec<u8>>, name: &str) -> String {
    let bytes = entries
        .get(name)
        .unwrap_or_else(|| panic!("missing part {name}"));
    String::from_utf8(bytes.clone()).unwrap()
}

/// Slide part names in the deck, in numeric order.
pub fn slide_parts(entries: &BTreeMap<String, Vec<u8>>) -> Vec<String> {
    let mut slides: Vec<(u32, String)> = entries
        .keys()
        .filter_map(|k| {
            let n = k.strip_prefix("ppt/slides/slide")?.strip_suffix(".xml")?;
            Some((n.parse().ok()?, k.clone()))
        })
        .collect();
    slides.sort();
    slides.into_iter().map(|(_, k)| k).collect()
}
