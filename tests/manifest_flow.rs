//! The offline half of the pipeline: trim page images, build a manifest from
//! page text, edit it, then assemble. No pdfium needed.

mod common;

use common::{entry_text, page_image, read_entries, slide_parts, write_template};
use pdf2deck::pipeline::text::PageText;
use pdf2deck::{
    classify_pages, generate_presentation, insert_subtitle_row, trim_image, Manifest,
    PipelineConfig, SlideType, TrimConfig, TrimOutcome,
};
use pretty_assertions::assert_eq;

fn pages() -> Vec<PageText> {
    let texts = [
        "ACME Corp\nAnnual Report\n2024\nConfidential",
        "Table of Contents\nOverview\nFinancials\nOutlook\n2",
        "Overview\nWe grew.\n3",
        "Financials\nRevenue up.\n4",
        "",
    ];
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| PageText {
            page_number: i as u32 + 1,
            text: t.to_string(),
        })
        .collect()
}

#[test]
fn trimmed_images_keep_the_content_band() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("page_1.png");
    page_image(400, 500, 200..260, 50..120).save(&page).unwrap();

    let outcome = trim_image(&page, &page, &TrimConfig::default()).unwrap();
    assert_eq!(outcome, TrimOutcome::Trimmed { width: 390, height: 60 });
    assert_eq!(image::image_dimensions(&page).unwrap(), (390, 60));
}

#[test]
fn blank_page_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("page_1.png");
    let target = dir.path().join("trimmed_page_1.png");
    page_image(300, 300, 0..0, 0..0).save(&page).unwrap();

    let outcome = trim_image(&page, &target, &TrimConfig::default()).unwrap();
    assert_eq!(outcome, TrimOutcome::NoContent);
    assert!(!target.exists());
}

#[test]
fn classified_pages_round_trip_through_csv() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("manifest.csv");

    let manifest = Manifest::from_classifications(&classify_pages(&pages(), "ACME 2024"));
    manifest.validate().unwrap();
    manifest.write(&csv).unwrap();

    let read = Manifest::read(&csv).unwrap();
    assert_eq!(read, manifest);

    let kinds: Vec<&SlideType> = read.rows.iter().map(|r| &r.slide_type).collect();
    assert_eq!(
        kinds,
        vec![
            &SlideType::TitlePage,
            &SlideType::TableOfContents,
            &SlideType::Main,
            &SlideType::Main,
            &SlideType::Main,
        ]
    );
    assert_eq!(read.rows[0].title, "ACME 2024");
    assert_eq!(read.rows[1].subtitle, "Overview\nFinancials\nOutlook");
    assert_eq!(read.rows[4].title, "No Title");
    assert_eq!(read.rows[2].image_name.as_deref(), Some("page_3.png"));

    let raw = std::fs::read_to_string(&csv).unwrap();
    assert!(raw.starts_with("Page Number,Title,Slide Type,Image Name,Subtitle\r\n"));
}

#[test]
fn edited_manifest_assembles_with_section_slides() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("manifest.csv");
    let images = dir.path().join("images");
    let template = dir.path().join("template.pptx");
    std::fs::create_dir(&images).unwrap();
    write_template(&template);
    for n in 3..=5 {
        page_image(390, 60, 0..60, 0..390)
            .save(images.join(format!("page_{n}.png")))
            .unwrap();
    }

    Manifest::from_classifications(&classify_pages(&pages(), "ACME 2024"))
        .write(&csv)
        .unwrap();
    assert!(insert_subtitle_row(&csv, 2, "Part I").unwrap());
    assert!(insert_subtitle_row(&csv, 3, "Part II").unwrap());
    assert!(!insert_subtitle_row(&csv, 42, "Nowhere").unwrap());

    let edited = Manifest::read(&csv).unwrap();
    let titles: Vec<&str> = edited.rows.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["ACME 2024", "Table of Contents", "Part I", "Overview", "Part II", "Financials", "No Title"]
    );

    let output = dir.path().join("deck.pptx");
    let report =
        generate_presentation(&csv, &template, &images, &output, &PipelineConfig::default()).unwrap();
    assert_eq!(report.slides_added, 7);

    let entries = read_entries(&output);
    let slides = slide_parts(&entries);
    assert_eq!(slides.len(), 7);
    assert!(entry_text(&entries, &slides[2]).contains("<a:t>Part I</a:t>"));
    assert!(!entry_text(&entries, &slides[2]).contains("<p:pic>"));
    assert!(entry_text(&entries, &slides[3]).contains("<p:pic>"));
    assert_eq!(
        entries.keys().filter(|k| k.starts_with("ppt/media/")).count(),
        3
    );
}
