//! The CSV manifest that drives deck assembly.
//!
//! ```text
//! Page Number,Title,Slide Type,Image Name,Subtitle
//! 1,Annual Report,title page,page_1.png,Intro
//! 2,Table of Contents,table of content,page_2.png,"Section A
//! Section B"
//! 3,Results,main,page_3.png,
//! ```
//!
//! The file is UTF-8, comma-delimited, CRLF-terminated, with standard CSV
//! quoting. Slide type spellings on the wire match manifests produced by
//! earlier tooling; snake-case names are accepted on read.

mod editor;

pub use editor::insert_subtitle_row;

use crate::classify::PageClassification;
use crate::error::Pdf2DeckError;
use crate::pipeline::render::page_image_name;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;
use tracing::info;

/// The fixed header row.
pub const HEADER: [&str; 5] = ["Page Number", "Title", "Slide Type", "Image Name", "Subtitle"];

/// How a manifest row is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SlideType {
    TitlePage,
    TableOfContents,
    SubtitleOnly,
    Main,
    /// Any other value found in a manifest; kept verbatim, never rendered.
    Unrecognized(String),
}

impl SlideType {
    /// Wire spelling used in the `Slide Type` column.
    pub fn as_str(&self) -> &str {
        match self {
            SlideType::TitlePage => "title page",
            SlideType::TableOfContents => "table of content",
            SlideType::SubtitleOnly => "subtitle",
            SlideType::Main => "main",
            SlideType::Unrecognized(s) => s,
        }
    }

    /// Parse a `Slide Type` cell. Never fails: unknown values become
    /// [`SlideType::Unrecognized`].
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "title page" | "title_page" => SlideType::TitlePage,
            "table of content" | "table of contents" | "table_of_contents" => {
                SlideType::TableOfContents
            }
            "subtitle" | "subtitle_only" => SlideType::SubtitleOnly,
            "main" => SlideType::Main,
            _ => SlideType::Unrecognized(s.to_string()),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, SlideType::Unrecognized(_))
    }
}

impl fmt::Display for SlideType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SlideType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SlideType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(SlideType::parse(&s))
    }
}

/// One record of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRow {
    #[serde(rename = "Page Number")]
    pub page_number: u32,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Slide Type")]
    pub slide_type: SlideType,
    /// Bare file name, resolved against the images directory.
    #[serde(rename = "Image Name")]
    pub image_name: Option<String>,
    /// May span several lines.
    #[serde(rename = "Subtitle")]
    pub subtitle: String,
}

impl From<&PageClassification> for ManifestRow {
    fn from(c: &PageClassification) -> Self {
        ManifestRow {
            page_number: c.page_number,
            title: c.title.clone(),
            slide_type: c.slide_type.clone(),
            image_name: Some(page_image_name(c.page_number)),
            subtitle: c.subtitle.clone(),
        }
    }
}

/// Ordered manifest rows. The header is implicit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub rows: Vec<ManifestRow>,
}

impl Manifest {
    /// Build rows from classifier output, one per page, in page order.
    pub fn from_classifications(pages: &[PageClassification]) -> Self {
        Manifest {
            rows: pages.iter().map(ManifestRow::from).collect(),
        }
    }

    /// Read a manifest.
    ///
    /// When the header names all five standard columns, fields are looked up
    /// by name and any other columns are ignored. Otherwise rows are mapped
    /// by position, so a header with different wording is tolerated.
    pub fn read(path: &Path) -> Result<Self, Pdf2DeckError> {
        let map_err = |source: csv::Error| Pdf2DeckError::Manifest {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(map_err)?;
        let headers = reader.headers().map_err(map_err)?.clone();
        let by_name = HEADER.iter().all(|h| headers.iter().any(|c| c == *h));
        let headers = by_name.then_some(headers);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(map_err)?;
            let row: ManifestRow = record.deserialize(headers.as_ref()).map_err(map_err)?;
            rows.push(row);
        }
        Ok(Manifest { rows })
    }

    /// Write the header and every row to `path`, replacing the file atomically.
    pub fn write(&self, path: &Path) -> Result<(), Pdf2DeckError> {
        write_records(path, |writer| {
            writer.write_record(HEADER)?;
            for row in &self.rows {
                writer.serialize(row)?;
            }
            Ok(())
        })?;

        info!("Wrote {} manifest rows to {}", self.rows.len(), path.display());
        Ok(())
    }

    /// Check the title-page invariant: exactly one title-page row, and it is
    /// page 1.
    pub fn validate(&self) -> Result<(), Pdf2DeckError> {
        let title_rows: Vec<&ManifestRow> = self
            .rows
            .iter()
            .filter(|r| r.slide_type == SlideType::TitlePage)
            .collect();

        match title_rows.as_slice() {
            [row] if row.page_number == 1 => Ok(()),
            [row] => Err(Pdf2DeckError::InvalidManifest(format!(
                "the title page row is on page {}, expected page 1",
                row.page_number
            ))),
            rows => Err(Pdf2DeckError::InvalidManifest(format!(
                "expected exactly one title page row, found {}",
                rows.len()
            ))),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

type ManifestWriter<'a> = csv::Writer<&'a mut tempfile::NamedTempFile>;

/// Write CSV records to `path` through a temporary file in the same
/// directory; the target is only replaced once every record is flushed.
pub(crate) fn write_records<F>(path: &Path, fill: F) -> Result<(), Pdf2DeckError>
where
    F: FnOnce(&mut ManifestWriter<'_>) -> Result<(), csv::Error>,
{
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp =
        tempfile::NamedTempFile::new_in(parent).map_err(|e| Pdf2DeckError::write_failed(path, e))?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .terminator(csv::Terminator::CRLF)
            .from_writer(&mut tmp);
        fill(&mut writer).map_err(|source| Pdf2DeckError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;
        writer
            .flush()
            .map_err(|e| Pdf2DeckError::write_failed(path, e))?;
    }
    tmp.persist(path)
        .map_err(|e| Pdf2DeckError::write_failed(path, e.error))?;
    Ok(())
}
