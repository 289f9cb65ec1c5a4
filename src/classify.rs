//! Heuristic page classification.
//!
//! Each page is classified from its own text and position only; neighbouring
//! pages never influence the result. Rules are checked in a fixed order and
//! the first match wins:
//!
//! | # | condition | slide type | title | subtitle |
//! |---|-----------|------------|-------|----------|
//! | 1 | first page | title page | deck title | first text line |
//! | 2 | text contains `Table of Contents` | table of contents | first line | lines between first and last |
//! | 3 | otherwise | main | first line, or `No Title` | empty |
//!
//! No rule produces a subtitle-only slide: those rows are added afterwards
//! with [`crate::manifest::insert_subtitle_row`].

use crate::manifest::SlideType;
use crate::pipeline::text::PageText;

/// Marker that turns a page into a table-of-contents slide.
pub const TOC_MARKER: &str = "Table of Contents";

/// Title used for pages without any extracted text.
pub const NO_TITLE: &str = "No Title";

/// The classifier's verdict for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageClassification {
    /// 1-indexed page number.
    pub page_number: u32,
    pub title: String,
    pub slide_type: SlideType,
    pub subtitle: String,
}

/// Classify the page at 0-based `index` from its extracted `text`.
pub fn classify_page(index: usize, text: &str, deck_title: &str) -> PageClassification {
    let text = text.trim();
    let lines: Vec<&str> = text.lines().collect();
    let first_line = lines.first().copied();
    let page_number = index as u32 + 1;

    if index == 0 {
        return PageClassification {
            page_number,
            title: deck_title.to_string(),
            slide_type: SlideType::TitlePage,
            subtitle: first_line.unwrap_or_default().to_string(),
        };
    }

    let title = first_line.unwrap_or(NO_TITLE).to_string();

    if text.contains(TOC_MARKER) {
        PageClassification {
            page_number,
            title,
            slide_type: SlideType::TableOfContents,
            subtitle: middle_lines(text),
        }
    } else {
        PageClassification {
            page_number,
            title,
            slide_type: SlideType::Main,
            subtitle: String::new(),
        }
    }
}

/// Classify every page, in order.
pub fn classify_pages(pages: &[PageText], deck_title: &str) -> Vec<PageClassification> {
    pages
        .iter()
        .enumerate()
        .map(|(i, page)| {
            let mut c = classify_page(i, &page.text, deck_title);
            c.page_number = page.page_number;
            c
        })
        .collect()
}

/// All lines except the first and the last, joined with `\n`.
///
/// Fewer than three lines yield an empty string.
pub fn middle_lines(text: &str) -> String {
    let lines: Vec<&str> = text.trim().lines().collect();
    if lines.len() < 3 {
        return String::new();
    }
    lines[1..lines.len() - 1].join("\n")
}
