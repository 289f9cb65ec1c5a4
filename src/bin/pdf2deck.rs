//! CLI binary for pdf2deck.
//!
//! A thin shim over the library crate: each subcommand maps its flags to a
//! `PipelineConfig`, calls one library entry point and prints a summary.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdf2deck::{
    extract_and_trim, extract_slide_info, generate_presentation, insert_subtitle_row, inspect,
    pdf_to_png, run_pipeline, trim_image, LayoutMap, PageSelection, PipelineConfig,
    PipelineProgressCallback, ProgressCallback, RenderReport, RenderResolution, SlideRole, Stage,
    TrimConfig, TrimOutcome,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: [&str; 11] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar that is re-armed for every stage,
/// with skipped pages and rows logged above it.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Items skipped across all stages.
    skipped: AtomicUsize,
}

impl CliProgressCallback {
    /// Start as a spinner; `on_stage_start` switches to a counted bar.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            skipped: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, stage: Stage, total: usize) {
        let unit = match stage {
            Stage::Assemble => "rows",
            Stage::Render | Stage::Classify => "pages",
        };
        let progress_style = ProgressStyle::with_template(&format!(
            "{{spinner:.cyan}} {{prefix:.bold}}  \
             [{{bar:42.green/238}}] {{pos:>3}}/{{len}} {unit}  \
             ⏱ {{elapsed_precise}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&TICKS);

        self.bar.reset();
        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix(stage.to_string());
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage, total: usize) {
        self.activate_bar(stage, total);
    }

    fn on_item_complete(&self, _stage: Stage, item: u32, _total: usize) {
        self.bar.set_message(format!("page {item}"));
        self.bar.inc(1);
    }

    fn on_item_skipped(&self, stage: Stage, item: u32, reason: String) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} {} page {:>3}  {}",
            cyan("⚠"),
            stage,
            item,
            dim(&reason)
        ));
        self.bar.inc(1);
    }

    fn on_stage_complete(&self, stage: Stage, completed: usize) {
        self.bar.println(format!(
            "  {} {} done  {}",
            green("✓"),
            stage,
            dim(&format!("{completed} ok, {} skipped so far", self.skipped.load(Ordering::SeqCst)))
        ));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Whole pipeline: PDF → trimmed images → manifest → deck
  pdf2deck run report.pdf --template brand.pptx --work-dir work -o report.pptx

  # Step by step, editing the manifest in between
  pdf2deck render report.pdf -o work/output_images
  pdf2deck classify report.pdf -o work/manifest.csv --title "Q3 Review"
  pdf2deck insert-subtitle work/manifest.csv --after 4 --title "Appendix"
  pdf2deck assemble work/manifest.csv --template brand.pptx \
      --images work/output_images -o report.pptx

  # Pick template layouts by name or position
  pdf2deck assemble manifest.csv --template brand.pptx --images imgs -o out.pptx \
      --layout image="Picture Slide" --layout title-only=5

  # Render a few pages and keep both raw and trimmed copies
  pdf2deck extract report.pdf --pages 1,3,5-7 --raw-dir raw --trimmed-dir trimmed

  # Inspect PDF metadata
  pdf2deck inspect report.pdf --json

MANIFEST COLUMNS:
  Page Number, Title, Slide Type, Image Name, Subtitle
  Slide types: "title page", "table of content", "subtitle", "main"

LAYOUT ROLES (--layout role=selector):
  title        title + subtitle            default #0
  content      title + body (TOC)          default #1
  title-only   section divider             default #2
  image        title + picture             default #3

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH      Path to libpdfium (file or directory)
  PDF2DECK_TEMPLATE    Default --template
  PDF2DECK_PASSWORD    PDF user password
  RUST_LOG             Overrides the log filter
"#;

/// Turn PDF pages into a PowerPoint deck built from a template.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2deck",
    version,
    about = "Turn PDF pages into a PowerPoint deck built from a template",
    long_about = "Render PDF pages to trimmed PNG images, classify each page into a CSV \
manifest (title page, table of contents, main), and assemble the manifest into slides \
on a .pptx template. Each stage can be run on its own.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDF2DECK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDF2DECK_QUIET")]
    quiet: bool,

    /// Disable progress bar.
    #[arg(long, global = true, env = "PDF2DECK_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every page to page_<n>.png, trimmed in place.
    Render {
        pdf: PathBuf,

        /// Output directory for the images.
        #[arg(short, long, env = "PDF2DECK_IMAGES_DIR")]
        output: PathBuf,

        #[command(flatten)]
        resolution: ResolutionArgs,

        /// Keep the full-page renders untouched.
        #[arg(long)]
        no_trim: bool,

        #[command(flatten)]
        trim: TrimArgs,

        #[command(flatten)]
        pdf_args: PdfArgs,
    },

    /// Render selected pages and write trimmed copies to a second directory.
    Extract {
        pdf: PathBuf,

        /// Page selection: all, 5, 3-15, or 1,3,5-7.
        #[arg(long, env = "PDF2DECK_PAGES", default_value = "all")]
        pages: String,

        /// Directory for the untrimmed renders.
        #[arg(long)]
        raw_dir: PathBuf,

        /// Directory for trimmed_page_<n>.png.
        #[arg(long)]
        trimmed_dir: PathBuf,

        /// Scale factor over the page's natural size (0.25–16).
        #[arg(long, default_value_t = 3.0)]
        zoom: f32,

        #[command(flatten)]
        trim: TrimArgs,

        #[command(flatten)]
        pdf_args: PdfArgs,
    },

    /// Trim one image: cut fixed margins, then crop to the content band.
    Trim {
        input: PathBuf,
        output: PathBuf,

        #[command(flatten)]
        trim: TrimArgs,
    },

    /// Classify every page and write the CSV manifest.
    Classify {
        pdf: PathBuf,

        /// Manifest path.
        #[arg(short, long, env = "PDF2DECK_MANIFEST")]
        output: PathBuf,

        /// Title of the title slide (default: PDF metadata title, then file name).
        #[arg(long, env = "PDF2DECK_TITLE")]
        title: Option<String>,

        #[command(flatten)]
        pdf_args: PdfArgs,
    },

    /// Insert a subtitle row after the first row of a page.
    InsertSubtitle {
        csv: PathBuf,

        /// Page number whose row the new row follows.
        #[arg(long)]
        after: u32,

        /// Title of the subtitle slide.
        #[arg(long)]
        title: String,
    },

    /// Build a deck from a manifest, page images and a template.
    Assemble {
        csv: PathBuf,

        #[command(flatten)]
        deck: DeckArgs,

        /// Directory the manifest's image names are resolved against.
        #[arg(long, env = "PDF2DECK_IMAGES_DIR")]
        images: PathBuf,

        /// Output .pptx path.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Render, trim, classify and assemble in one go.
    Run {
        pdf: PathBuf,

        #[command(flatten)]
        deck: DeckArgs,

        /// Directory for images and the manifest (kept after the run).
        #[arg(long, env = "PDF2DECK_WORK_DIR")]
        work_dir: PathBuf,

        /// Output .pptx path.
        #[arg(short, long)]
        output: PathBuf,

        /// Title of the title slide (default: PDF metadata title, then file name).
        #[arg(long, env = "PDF2DECK_TITLE")]
        title: Option<String>,

        #[command(flatten)]
        resolution: ResolutionArgs,

        #[command(flatten)]
        trim: TrimArgs,

        #[command(flatten)]
        pdf_args: PdfArgs,
    },

    /// Print PDF metadata only, no rendering.
    Inspect {
        pdf: PathBuf,

        /// Output JSON instead of a table.
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        pdf_args: PdfArgs,
    },
}

#[derive(Args, Debug)]
struct PdfArgs {
    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2DECK_PASSWORD")]
    password: Option<String>,
}

#[derive(Args, Debug)]
struct ResolutionArgs {
    /// Rendering DPI (18–1200).
    #[arg(long, env = "PDF2DECK_DPI", default_value_t = 300, conflicts_with = "zoom")]
    dpi: u32,

    /// Scale factor instead of DPI (0.25–16).
    #[arg(long)]
    zoom: Option<f32>,
}

impl ResolutionArgs {
    fn resolution(&self) -> RenderResolution {
        match self.zoom {
            Some(z) => RenderResolution::Zoom(z),
            None => RenderResolution::Dpi(self.dpi),
        }
    }
}

/// Whitespace trimmer controls, defaults as in `TrimConfig`.
#[derive(Args, Debug)]
struct TrimArgs {
    /// Pixels cut from the top before measuring content.
    #[arg(long, default_value_t = 100)]
    margin_top: u32,

    /// Pixels cut from the bottom before measuring content.
    #[arg(long, default_value_t = 66)]
    margin_bottom: u32,

    /// Pixels cut from the left before measuring content.
    #[arg(long, default_value_t = 5)]
    margin_left: u32,

    /// Pixels cut from the right before measuring content.
    #[arg(long, default_value_t = 5)]
    margin_right: u32,

    /// A pixel is content when any channel is below this value.
    #[arg(long, default_value_t = 100)]
    threshold: u8,

    /// The kept band ends this many pixels short of the source width.
    #[arg(long, default_value_t = 10)]
    right_inset: u32,
}

impl TrimArgs {
    fn trim_config(&self) -> TrimConfig {
        TrimConfig {
            margin_top: self.margin_top,
            margin_bottom: self.margin_bottom,
            margin_left: self.margin_left,
            margin_right: self.margin_right,
            white_threshold: self.threshold,
            right_inset: self.right_inset,
        }
    }
}

#[derive(Args, Debug)]
struct DeckArgs {
    /// Template .pptx providing the slide layouts.
    #[arg(long, env = "PDF2DECK_TEMPLATE")]
    template: PathBuf,

    /// Layout for a role, e.g. image="Picture Slide" or content=1. Repeatable.
    #[arg(long = "layout", value_name = "ROLE=SELECTOR")]
    layouts: Vec<String>,
}

impl DeckArgs {
    fn layout_map(&self) -> Result<LayoutMap> {
        let mut map = LayoutMap::default();
        for spec in &self.layouts {
            map.apply_override(spec)
                .with_context(|| format!("Invalid --layout '{spec}'"))?;
        }
        Ok(map)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let json = matches!(cli.command, Command::Inspect { json: true, .. });
    let show_progress = !cli.quiet && !cli.no_progress && !json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress = if show_progress {
        Some(CliProgressCallback::new_dynamic())
    } else {
        None
    };
    let progress_cb: Option<ProgressCallback> = progress
        .as_ref()
        .map(|cb| Arc::clone(cb) as Arc<dyn PipelineProgressCallback>);

    let result = run(cli.command, progress_cb);
    if let Some(cb) = &progress {
        cb.finish();
    }
    let message = result?;

    if !cli.quiet {
        if let Some(message) = message {
            eprintln!("{} {}", green("✔"), message);
        }
    }
    Ok(())
}

fn base_config(progress: Option<ProgressCallback>) -> pdf2deck::PipelineConfigBuilder {
    let builder = PipelineConfig::builder();
    match progress {
        Some(cb) => builder.progress_callback(cb),
        None => builder,
    }
}

fn with_password(
    builder: pdf2deck::PipelineConfigBuilder,
    args: &PdfArgs,
) -> pdf2deck::PipelineConfigBuilder {
    match &args.password {
        Some(pwd) => builder.password(pwd.clone()),
        None => builder,
    }
}

fn with_layouts(
    mut builder: pdf2deck::PipelineConfigBuilder,
    map: &LayoutMap,
) -> pdf2deck::PipelineConfigBuilder {
    for role in SlideRole::ALL {
        builder = builder.layout(role, map.get(role).clone());
    }
    builder
}

fn render_summary(report: &RenderReport) -> String {
    let mut msg = format!(
        "{} pages rendered",
        bold(&report.pages.len().to_string())
    );
    if !report.skipped_pages.is_empty() {
        msg.push_str(&format!("  ({} out of range: {:?})", red(&report.skipped_pages.len().to_string()), report.skipped_pages));
    }
    if !report.blank_pages.is_empty() {
        msg.push_str(&format!("  {}", dim(&format!("blank: {:?}", report.blank_pages))));
    }
    msg
}

/// Execute one subcommand. Returns the success line to print, if any.
fn run(command: Command, progress: Option<ProgressCallback>) -> Result<Option<String>> {
    match command {
        Command::Render {
            pdf,
            output,
            resolution,
            no_trim,
            trim,
            pdf_args,
        } => {
            let config = with_password(base_config(progress), &pdf_args)
                .resolution(resolution.resolution())
                .trim(trim.trim_config())
                .build()?;
            let report = pdf_to_png(&pdf, &output, &config, !no_trim)
                .with_context(|| format!("Failed to render {}", pdf.display()))?;
            Ok(Some(format!(
                "{} → {}",
                render_summary(&report),
                output.display()
            )))
        }

        Command::Extract {
            pdf,
            pages,
            raw_dir,
            trimmed_dir,
            zoom,
            trim,
            pdf_args,
        } => {
            let selection: PageSelection = pages.parse()?;
            let config = with_password(base_config(progress), &pdf_args)
                .subset_resolution(RenderResolution::Zoom(zoom))
                .trim(trim.trim_config())
                .build()?;
            let report = extract_and_trim(&pdf, &selection, &raw_dir, &trimmed_dir, &config)
                .with_context(|| format!("Failed to extract pages from {}", pdf.display()))?;
            Ok(Some(format!(
                "{} → {}",
                render_summary(&report),
                trimmed_dir.display()
            )))
        }

        Command::Trim { input, output, trim } => {
            match trim_image(&input, &output, &trim.trim_config())
                .with_context(|| format!("Failed to trim {}", input.display()))?
            {
                TrimOutcome::Trimmed { width, height } => Ok(Some(format!(
                    "Trimmed image saved to {}  {}",
                    output.display(),
                    dim(&format!("{width}x{height} px"))
                ))),
                TrimOutcome::NoContent => Ok(Some(format!(
                    "{} no content found in {}; nothing written",
                    cyan("⚠"),
                    input.display()
                ))),
            }
        }

        Command::Classify {
            pdf,
            output,
            title,
            pdf_args,
        } => {
            let mut builder = with_password(base_config(progress), &pdf_args);
            if let Some(title) = title {
                builder = builder.deck_title(title);
            }
            let manifest = extract_slide_info(&pdf, &output, &builder.build()?)
                .with_context(|| format!("Failed to classify {}", pdf.display()))?;
            Ok(Some(format!(
                "Slide information saved to {}  {}",
                output.display(),
                dim(&format!("{} rows", manifest.len()))
            )))
        }

        Command::InsertSubtitle { csv, after, title } => {
            let inserted = insert_subtitle_row(&csv, after, &title)
                .with_context(|| format!("Failed to update {}", csv.display()))?;
            if inserted {
                Ok(Some(format!(
                    "Inserted subtitle {} after page {after}",
                    bold(&format!("\"{title}\""))
                )))
            } else {
                Ok(Some(format!(
                    "{} no row for page {after}; {} unchanged",
                    cyan("⚠"),
                    csv.display()
                )))
            }
        }

        Command::Assemble {
            csv,
            deck,
            images,
            output,
        } => {
            let config = with_layouts(base_config(progress), &deck.layout_map()?).build()?;
            let report = generate_presentation(&csv, &deck.template, &images, &output, &config)
                .with_context(|| format!("Failed to assemble {}", output.display()))?;
            Ok(Some(format!(
                "Presentation saved to {}  {}",
                output.display(),
                dim(&format!(
                    "{} slides, {} rows skipped",
                    report.slides_added, report.rows_skipped
                ))
            )))
        }

        Command::Run {
            pdf,
            deck,
            work_dir,
            output,
            title,
            resolution,
            trim,
            pdf_args,
        } => {
            let mut builder = with_layouts(
                with_password(base_config(progress), &pdf_args),
                &deck.layout_map()?,
            )
            .resolution(resolution.resolution())
            .trim(trim.trim_config());
            if let Some(title) = title {
                builder = builder.deck_title(title);
            }
            let report = run_pipeline(&pdf, &deck.template, &work_dir, &output, &builder.build()?)
                .with_context(|| format!("Failed to convert {}", pdf.display()))?;
            Ok(Some(format!(
                "{} → {}  {}",
                bold(&report.deck_title),
                output.display(),
                dim(&format!(
                    "{} pages, {} slides, manifest {}",
                    report.render.pages.len(),
                    report.assembly.slides_added,
                    report.manifest_path.display()
                ))
            )))
        }

        Command::Inspect {
            pdf,
            json,
            pdf_args,
        } => {
            let meta = inspect(&pdf, pdf_args.password.as_deref()).context("Failed to inspect PDF")?;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
                );
            } else {
                println!("File:         {}", pdf.display());
                if let Some(ref t) = meta.title {
                    println!("Title:        {}", t);
                }
                if let Some(ref a) = meta.author {
                    println!("Author:       {}", a);
                }
                if let Some(ref s) = meta.subject {
                    println!("Subject:      {}", s);
                }
                println!("Pages:        {}", meta.page_count);
                println!("PDF Version:  {}", meta.pdf_version);
                if let Some(ref p) = meta.producer {
                    println!("Producer:     {}", p);
                }
                if let Some(ref c) = meta.creator {
                    println!("Creator:      {}", c);
                }
            }
            Ok(None)
        }
    }
}
