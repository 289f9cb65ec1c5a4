//! The `.pptx` container: a zip of named parts, their relationships and the
//! `[Content_Types].xml` registry.
//!
//! Part names are stored without the leading slash (`ppt/presentation.xml`).

use super::xml::{attr, attributes, escape_xml, malformed};
use crate::error::Pdf2DeckError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub(crate) const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub(crate) const ROOT_RELS_PART: &str = "_rels/.rels";

pub(crate) const RT_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub(crate) const RT_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub(crate) const RT_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub(crate) const RT_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

pub(crate) const CT_SLIDE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

/// One `<Relationship>` entry of a `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

impl Relationship {
    pub(crate) fn internal(id: impl Into<String>, rel_type: &str, target: impl Into<String>) -> Self {
        Relationship {
            id: id.into(),
            rel_type: rel_type.to_string(),
            target: target.into(),
            external: false,
        }
    }

    /// Relationship types are matched on their last path segment so that
    /// strict-conformance namespaces resolve too.
    pub(crate) fn is_type(&self, rel_type: &str) -> bool {
        let last = |t: &str| t.rsplit('/').next().map(str::to_owned);
        last(&self.rel_type) == last(rel_type)
    }
}

/// All parts of a package, in memory.
#[derive(Clone)]
pub(crate) struct Package {
    source: PathBuf,
    parts: BTreeMap<String, Vec<u8>>,
}

impl Package {
    pub(crate) fn open(path: &Path) -> Result<Self, Pdf2DeckError> {
        let bytes = std::fs::read(path).map_err(|e| Pdf2DeckError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_bytes(path, bytes)
    }

    /// `source` is only used in error messages.
    pub(crate) fn from_bytes(source: &Path, bytes: Vec<u8>) -> Result<Self, Pdf2DeckError> {
        let invalid = |detail: String| Pdf2DeckError::InvalidTemplate {
            path: source.to_path_buf(),
            detail,
        };

        let mut archive =
            ZipArchive::new(Cursor::new(bytes)).map_err(|e| invalid(format!("not a zip archive ({e})")))?;

        let mut parts = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| invalid(format!("unreadable zip entry #{i} ({e})")))?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().trim_start_matches('/').to_string();
            let mut content = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut content)
                .map_err(|e| invalid(format!("unreadable part '{name}' ({e})")))?;
            parts.insert(name, content);
        }

        if !parts.contains_key(CONTENT_TYPES_PART) {
            return Err(invalid(format!("missing {CONTENT_TYPES_PART}")));
        }

        Ok(Package {
            source: source.to_path_buf(),
            parts,
        })
    }

    pub(crate) fn source(&self) -> &Path {
        &self.source
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    pub(crate) fn part(&self, name: &str) -> Result<&[u8], Pdf2DeckError> {
        self.parts
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| Pdf2DeckError::InvalidTemplate {
                path: self.source.clone(),
                detail: format!("missing part '{name}'"),
            })
    }

    pub(crate) fn part_str(&self, name: &str) -> Result<&str, Pdf2DeckError> {
        std::str::from_utf8(self.part(name)?).map_err(|e| malformed(name, e))
    }

    pub(crate) fn set_part(&mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.parts.insert(name.into(), content.into());
    }

    /// Relationships of `part`; a part without a `.rels` file has none.
    pub(crate) fn relationships(&self, part: &str) -> Result<Vec<Relationship>, Pdf2DeckError> {
        let rels_name = rels_part_name(part);
        match self.parts.get(&rels_name) {
            Some(xml) => parse_relationships(xml, &rels_name),
            None => Ok(Vec::new()),
        }
    }

    /// First unused `<dir>/<stem><n>.<ext>` part name, counting from 1.
    pub(crate) fn next_part_name(&self, dir: &str, stem: &str, ext: &str) -> String {
        (1..)
            .map(|n| format!("{dir}/{stem}{n}.{ext}"))
            .find(|name| !self.parts.contains_key(name))
            .unwrap_or_default()
    }

    /// Serialise the package as a zip, `[Content_Types].xml` first.
    pub(crate) fn to_bytes(&self) -> Result<Vec<u8>, Pdf2DeckError> {
        let zip_err = |e: zip::result::ZipError| {
            Pdf2DeckError::write_failed(&self.source, std::io::Error::other(e.to_string()))
        };

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        let ordered = self
            .parts
            .iter()
            .filter(|(name, _)| name.as_str() == CONTENT_TYPES_PART)
            .chain(
                self.parts
                    .iter()
                    .filter(|(name, _)| name.as_str() != CONTENT_TYPES_PART),
            );
        for (name, content) in ordered {
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
            writer.start_file(name.as_str(), options).map_err(zip_err)?;
            writer
                .write_all(content)
                .map_err(|e| Pdf2DeckError::write_failed(&self.source, e))?;
        }

        let cursor = writer.finish().map_err(zip_err)?;
        Ok(cursor.into_inner())
    }
}

/// `ppt/slides/slide1.xml` → `ppt/slides/_rels/slide1.xml.rels`.
pub(crate) fn rels_part_name(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None if part.is_empty() => ROOT_RELS_PART.to_string(),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolve a relationship target against the part that owns the `.rels`.
pub(crate) fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for seg in target.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Relative reference from `source_part` to `target_part`, as written into
/// a `.rels` file.
pub(crate) fn relative_target(source_part: &str, target_part: &str) -> String {
    let from: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let to: Vec<&str> = target_part.split('/').collect();
    let common = from
        .iter()
        .zip(&to)
        .take_while(|(a, b)| a == b)
        .count();

    let mut out: Vec<&str> = std::iter::repeat("..").take(from.len() - common).collect();
    out.extend_from_slice(&to[common..]);
    out.join("/")
}

pub(crate) fn parse_relationships(xml: &[u8], part: &str) -> Result<Vec<Relationship>, Pdf2DeckError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut rels = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let attrs = attributes(e, part)?;
                if let (Some(id), Some(rel_type), Some(target)) =
                    (attr(&attrs, "Id"), attr(&attrs, "Type"), attr(&attrs, "Target"))
                {
                    rels.push(Relationship {
                        id: id.to_string(),
                        rel_type: rel_type.to_string(),
                        target: target.to_string(),
                        external: attr(&attrs, "TargetMode") == Some("External"),
                    });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(part, e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(rels)
}

pub(crate) fn relationships_xml(rels: &[Relationship]) -> String {
    let mut xml = String::with_capacity(256 + rels.len() * 160);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for rel in rels {
        let _ = write!(
            xml,
            r#"<Relationship Id="{}" Type="{}" Target="{}"{}/>"#,
            escape_xml(&rel.id),
            escape_xml(&rel.rel_type),
            escape_xml(&rel.target),
            if rel.external { r#" TargetMode="External""# } else { "" }
        );
    }
    xml.push_str("</Relationships>");
    xml
}

/// `rId<max + 1>` over the numeric ids in `rels`.
pub(crate) fn next_relationship_id(rels: &[Relationship]) -> String {
    let max = rels
        .iter()
        .filter_map(|r| r.id.strip_prefix("rId")?.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("rId{}", max + 1)
}

/// Register an `<Override>` for `part` unless one exists.
pub(crate) fn add_override(
    content_types: &mut String,
    part: &str,
    content_type: &str,
) -> Result<(), Pdf2DeckError> {
    let part_name = format!("/{part}");
    let exists = content_type_entries(content_types)?
        .iter()
        .any(|(kind, key, _)| kind == "Override" && key.eq_ignore_ascii_case(&part_name));
    if exists {
        return Ok(());
    }
    insert_before_types_end(
        content_types,
        &format!(
            r#"<Override PartName="{}" ContentType="{}"/>"#,
            escape_xml(&part_name),
            escape_xml(content_type)
        ),
    )
}

/// Register a `<Default>` for `extension` unless one exists.
pub(crate) fn ensure_default(
    content_types: &mut String,
    extension: &str,
    content_type: &str,
) -> Result<(), Pdf2DeckError> {
    let exists = content_type_entries(content_types)?
        .iter()
        .any(|(kind, key, _)| kind == "Default" && key.eq_ignore_ascii_case(extension));
    if exists {
        return Ok(());
    }
    insert_before_types_end(
        content_types,
        &format!(
            r#"<Default Extension="{}" ContentType="{}"/>"#,
            escape_xml(extension),
            escape_xml(content_type)
        ),
    )
}

/// `(element, PartName or Extension, ContentType)` for every entry.
fn content_type_entries(xml: &str) -> Result<Vec<(String, String, String)>, Pdf2DeckError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                let kind = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                let key = match kind.as_str() {
                    "Default" => "Extension",
                    "Override" => "PartName",
                    _ => continue,
                };
                let attrs = attributes(e, CONTENT_TYPES_PART)?;
                if let (Some(k), Some(ct)) = (attr(&attrs, key), attr(&attrs, "ContentType")) {
                    entries.push((kind, k.to_string(), ct.to_string()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(CONTENT_TYPES_PART, e)),
            _ => {}
        }
    }
    Ok(entries)
}

fn insert_before_types_end(xml: &mut String, element: &str) -> Result<(), Pdf2DeckError> {
    let end = xml
        .rfind("</Types>")
        .ok_or_else(|| malformed(CONTENT_TYPES_PART, "no closing </Types> tag"))?;
    xml.insert_str(end, element);
    Ok(())
}
