//! Deck assembly against a generated template.
//!
//! Run with:
//!   cargo test --test assemble

mod common;

use common::{entry_text, read_entries, slide_parts, write_png, write_template};
use pdf2deck::config::LayoutSelector;
use pdf2deck::{
    generate_presentation, Deck, ImageFrame, LayoutMap, Manifest, ManifestRow, Pdf2DeckError,
    PipelineConfig, SlideRole, SlideType,
};
use std::path::Path;

fn row(page: u32, title: &str, slide_type: SlideType, image: Option<&str>, subtitle: &str) -> ManifestRow {
    ManifestRow {
        page_number: page,
        title: title.into(),
        slide_type,
        image_name: image.map(String::from),
        subtitle: subtitle.into(),
    }
}

fn sample_manifest() -> Manifest {
    Manifest {
        rows: vec![
            row(1, "Annual Report", SlideType::TitlePage, Some("page_1.png"), "2024 & beyond"),
            row(2, "Contents", SlideType::TableOfContents, Some("page_2.png"), "Intro\nResults"),
            row(2, "Results", SlideType::SubtitleOnly, None, ""),
            row(3, "Revenue", SlideType::Main, Some("page_3.png"), ""),
        ],
    }
}

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new(manifest: &Manifest) -> Self {
        let dir = tempfile::tempdir().unwrap();
        write_template(&dir.path().join("template.pptx"));
        std::fs::create_dir(dir.path().join("images")).unwrap();
        write_png(&dir.path().join("images/page_3.png"), 390, 30);
        manifest.write(&dir.path().join("manifest.csv")).unwrap();
        Fixture { dir }
    }

    fn path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }

    fn assemble(&self, config: &PipelineConfig) -> Result<pdf2deck::AssemblyReport, Pdf2DeckError> {
        generate_presentation(
            &self.path("manifest.csv"),
            &self.path("template.pptx"),
            &self.path("images"),
            &self.path("out/deck.pptx"),
            config,
        )
    }
}

#[test]
fn manifest_rows_become_slides_in_order() {
    let fx = Fixture::new(&sample_manifest());
    let report = fx.assemble(&PipelineConfig::default()).unwrap();
    assert_eq!(report.slides_added, 4);
    assert_eq!(report.rows_skipped, 0);
    assert_eq!(report.output_path, fx.path("out/deck.pptx"));

    let entries = read_entries(&fx.path("out/deck.pptx"));
    let slides = slide_parts(&entries);
    assert_eq!(slides.len(), 4);

    let title = entry_text(&entries, &slides[0]);
    assert!(title.contains(r#"<p:ph type="ctrTitle"/>"#));
    assert!(title.contains("<a:t>Annual Report</a:t>"));
    assert!(title.contains("<a:t>2024 &amp; beyond</a:t>"));
    assert!(!title.contains("Date Placeholder"));

    let toc = entry_text(&entries, &slides[1]);
    assert!(toc.contains("<a:t>Contents</a:t>"));
    assert!(toc.contains("<a:t>Intro</a:t>"));
    assert!(toc.contains("<a:t>Results</a:t>"));

    let section = entry_text(&entries, &slides[2]);
    assert!(section.contains("<a:t>Results</a:t>"));
    assert!(!section.contains("<p:pic>"));

    let picture = entry_text(&entries, &slides[3]);
    assert!(picture.contains("<a:t>Revenue</a:t>"));
    assert!(picture.contains(r#"<a:blip r:embed="rId2"/>"#));
    assert!(picture.contains(r#"<a:off x="1270000" y="3355730"/><a:ext cx="6858000" cy="527538"/>"#));

    let picture_rels = entry_text(&entries, "ppt/slides/_rels/slide4.xml.rels");
    assert!(picture_rels.contains(r#"Target="../slideLayouts/slideLayout4.xml""#));
    assert!(picture_rels.contains(r#"Target="../media/image1.png""#));
    assert!(entries.contains_key("ppt/media/image1.png"));

    let section_rels = entry_text(&entries, "ppt/slides/_rels/slide3.xml.rels");
    assert!(section_rels.contains(r#"Target="../slideLayouts/slideLayout3.xml""#));
}

#[test]
fn package_bookkeeping_is_updated() {
    let fx = Fixture::new(&sample_manifest());
    fx.assemble(&PipelineConfig::default()).unwrap();
    let entries = read_entries(&fx.path("out/deck.pptx"));

    let presentation = entry_text(&entries, "ppt/presentation.xml");
    assert!(presentation.contains(
        r#"<p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/><p:sldId id="258" r:id="rId4"/><p:sldId id="259" r:id="rId5"/></p:sldIdLst><p:sldSz"#
    ));

    let rels = entry_text(&entries, "ppt/_rels/presentation.xml.rels");
    assert!(rels.contains(r#"Target="slideMasters/slideMaster1.xml""#));
    for n in 1..=4 {
        assert!(rels.contains(&format!(r#"Target="slides/slide{n}.xml""#)), "{rels}");
    }

    let types = entry_text(&entries, "[Content_Types].xml");
    assert!(types.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));
    assert_eq!(
        types
            .matches("application/vnd.openxmlformats-officedocument.presentationml.slide+xml")
            .count(),
        4
    );
}

#[test]
fn unrecognized_rows_are_skipped() {
    let mut manifest = sample_manifest();
    manifest
        .rows
        .insert(2, row(2, "Appendix", SlideType::Unrecognized("appendix".into()), None, ""));
    let fx = Fixture::new(&manifest);

    let report = fx.assemble(&PipelineConfig::default()).unwrap();
    assert_eq!(report.slides_added, 4);
    assert_eq!(report.rows_skipped, 1);
    let entries = read_entries(&fx.path("out/deck.pptx"));
    assert!(entries
        .values()
        .all(|bytes| !String::from_utf8_lossy(bytes).contains("Appendix")));
}

#[test]
fn missing_picture_fails_without_writing_output() {
    let mut manifest = sample_manifest();
    manifest.rows.push(row(4, "Costs", SlideType::Main, Some("page_4.png"), ""));
    let fx = Fixture::new(&manifest);

    let err = fx.assemble(&PipelineConfig::default()).unwrap_err();
    assert!(matches!(err, Pdf2DeckError::FileNotFound { ref path } if path.ends_with("page_4.png")));
    assert!(!fx.path("out/deck.pptx").exists());
}

#[test]
fn main_row_without_image_name_is_invalid() {
    let mut manifest = sample_manifest();
    manifest.rows.push(row(4, "Costs", SlideType::Main, None, ""));
    let fx = Fixture::new(&manifest);

    let err = fx.assemble(&PipelineConfig::default()).unwrap_err();
    assert!(matches!(err, Pdf2DeckError::InvalidManifest(_)), "{err}");
}

#[test]
fn layouts_can_be_chosen_by_name() {
    let fx = Fixture::new(&sample_manifest());
    // Section dividers on the content layout, matched ignoring case.
    let config = PipelineConfig::builder()
        .layout(SlideRole::TitleOnly, LayoutSelector::Name("title and content".into()))
        .build()
        .unwrap();
    fx.assemble(&config).unwrap();

    let entries = read_entries(&fx.path("out/deck.pptx"));
    let rels = entry_text(&entries, "ppt/slides/_rels/slide3.xml.rels");
    assert!(rels.contains(r#"Target="../slideLayouts/slideLayout2.xml""#));
    let section = entry_text(&entries, "ppt/slides/slide3.xml");
    assert!(section.contains(r#"<p:ph idx="1"/>"#));
}

#[test]
fn unknown_layout_is_reported_before_building() {
    let fx = Fixture::new(&sample_manifest());
    let config = PipelineConfig::builder()
        .layout(SlideRole::Image, LayoutSelector::Index(9))
        .build()
        .unwrap();

    let err = fx.assemble(&config).unwrap_err();
    let msg = err.to_string();
    assert!(matches!(err, Pdf2DeckError::LayoutNotFound { .. }));
    assert!(msg.contains("Picture Slide"), "{msg}");
    assert!(!fx.path("out/deck.pptx").exists());
}

#[test]
fn layout_without_body_cannot_serve_title_slides() {
    let fx = Fixture::new(&sample_manifest());
    let config = PipelineConfig::builder()
        .layout(SlideRole::Title, LayoutSelector::Name("Title Only".into()))
        .build()
        .unwrap();

    let err = fx.assemble(&config).unwrap_err();
    assert!(matches!(err, Pdf2DeckError::PlaceholderMissing { .. }), "{err}");
}

#[test]
fn invalid_title_row_only_warns() {
    let mut manifest = sample_manifest();
    manifest.rows[0].slide_type = SlideType::Main;
    manifest.rows[0].image_name = Some("page_3.png".into());
    let fx = Fixture::new(&manifest);

    let report = fx.assemble(&PipelineConfig::default()).unwrap();
    assert_eq!(report.slides_added, 4);
}

#[test]
fn non_pptx_template_is_rejected() {
    let fx = Fixture::new(&sample_manifest());
    std::fs::write(fx.path("template.pptx"), b"not a zip").unwrap();
    let err = fx.assemble(&PipelineConfig::default()).unwrap_err();
    assert!(matches!(err, Pdf2DeckError::InvalidTemplate { .. }), "{err}");
}

#[test]
fn deck_api_places_pictures_on_wide_slides() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("tall.png");
    write_png(&image, 100, 400);

    let bytes = common::template_bytes_with_size((12_192_000, 6_858_000));
    let mut deck = Deck::from_bytes(
        Path::new("wide.pptx"),
        bytes,
        &LayoutMap::default(),
        ImageFrame::default(),
    )
    .unwrap();
    assert_eq!(deck.slide_size(), (12_192_000, 6_858_000));
    assert_eq!(deck.layouts().len(), 4);
    assert_eq!(deck.layout_for(SlideRole::Image).name, "Picture Slide");

    deck.add_image_slide("Tall", &image).unwrap();
    deck.add_image_slide("Tall again", &image).unwrap();
    assert_eq!(deck.slide_count(), 2);

    let out = dir.path().join("wide-out.pptx");
    deck.save(&out).unwrap();
    let entries = read_entries(&out);
    // Same bytes are stored once per slide.
    assert!(entries.contains_key("ppt/media/image1.png"));
    assert!(entries.contains_key("ppt/media/image2.png"));
    let slide = entry_text(&entries, "ppt/slides/slide1.xml");
    // area 9906000 x 4953000; height-bound 1238250 wide, centred + 100pt.
    assert!(slide.contains(r#"<a:ext cx="1238250" cy="4953000"/>"#), "{slide}");
    assert!(slide.contains(r#"<a:off x="5603875" y="1143000"/>"#), "{slide}");
}

#[test]
fn frame_margins_must_fit_the_slide() {
    // 180pt of horizontal margin is wider than a one-inch slide.
    let bytes = common::template_bytes_with_size((914_400, 914_400));
    let err = Deck::from_bytes(
        Path::new("tiny.pptx"),
        bytes,
        &LayoutMap::default(),
        ImageFrame::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Pdf2DeckError::InvalidConfig(_)), "{err}");
    assert!(err.to_string().contains("914400 x 914400"), "{err}");
}
