//! In-place manifest editing.

use super::{write_records, SlideType};
use crate::error::Pdf2DeckError;
use std::path::Path;
use tracing::{debug, info};

/// Insert a subtitle-only row directly after the first row whose
/// `Page Number` equals `page_number`.
///
/// Columns are located by header name, so extra or reordered columns are
/// preserved, and [`Manifest::read`](super::Manifest::read) looks them up the
/// same way. Cells that are not integers never match. The file is replaced
/// atomically whether or not a row was inserted; the return value says which
/// happened.
pub fn insert_subtitle_row(
    csv_path: &Path,
    page_number: u32,
    title: &str,
) -> Result<bool, Pdf2DeckError> {
    let map_err = |source: csv::Error| Pdf2DeckError::Manifest {
        path: csv_path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(csv_path)
        .map_err(map_err)?;
    let headers = reader.headers().map_err(map_err)?.clone();
    let mut rows = reader
        .records()
        .collect::<Result<Vec<csv::StringRecord>, _>>()
        .map_err(map_err)?;

    let column = |name: &str| {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            Pdf2DeckError::InvalidManifest(format!(
                "'{}' has no '{name}' column",
                csv_path.display()
            ))
        })
    };
    let page_col = column("Page Number")?;
    let title_col = column("Title")?;
    let type_col = column("Slide Type")?;

    let found = rows.iter().position(|row| {
        row.get(page_col)
            .and_then(|cell| cell.trim().parse::<u32>().ok())
            == Some(page_number)
    });

    if let Some(i) = found {
        let page = page_number.to_string();
        let new_row: csv::StringRecord = (0..headers.len())
            .map(|c| match c {
                c if c == page_col => page.as_str(),
                c if c == title_col => title,
                c if c == type_col => SlideType::SubtitleOnly.as_str(),
                _ => "",
            })
            .collect();
        rows.insert(i + 1, new_row);
        info!("Inserted subtitle row '{title}' after page {page_number}");
    } else {
        debug!("No row for page {page_number}; manifest left unchanged");
    }

    write_records(csv_path, |writer| {
        writer.write_record(&headers)?;
        for row in &rows {
            writer.write_record(row)?;
        }
        Ok(())
    })?;

    Ok(found.is_some())
}
