//! CLI binary for edgequake-wordcloud.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `CloudConfig`, writes the three output files and prints the table.

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use edgequake_wordcloud::{
    generate_from_source, list_fonts, write_outputs, CloudConfig, Colormap, FontChoice,
    GenerationProgressCallback, GenerationSummary, HexColor, ProgressCallback, Shape, Stage,
    TextSource, WrittenFiles,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::PathBuf;
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner naming the current stage, switched
/// to a counter bar while words are being placed.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Self::with_bar(ProgressBar::new(0))
    }

    fn with_bar(bar: ProgressBar) -> Arc<Self> {
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} words  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Placing");
    }

    /// Remove the spinner line if generation ended without a completion event.
    fn clear(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl Drop for CliProgressCallback {
    fn drop(&mut self) {
        self.clear();
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_prefix(stage.label());
        self.bar.set_message("…");
    }

    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        self.bar.println(format!(
            "  {} {:<16} {}",
            green("✓"),
            stage.label(),
            dim(&format!("{elapsed_ms}ms")),
        ));
    }

    fn on_word_placed(&self, attempted: usize, total: usize) {
        if self.bar.length() != Some(total as u64) {
            self.activate_bar(total);
        }
        self.bar.set_position(attempted as u64);
    }

    fn on_generation_complete(&self, placed: usize, total: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {}/{} words placed",
            if placed == total { green("✔") } else { cyan("⚠") },
            bold(&placed.to_string()),
            total
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Cloud from a text file, written to ./out
  wordcloud --text-file speech.txt -o out

  # Straight from a PDF, heart-shaped, plasma palette on black
  wordcloud --pdf report.pdf --shape heart --colormap plasma --background '#000000'

  # Inline text, custom mask, JSON summary on stdout
  wordcloud --text "cat cat dog" --mask silhouette.png --json

  # Read text from stdin
  cat notes.md | wordcloud --text-file -

  # Which fonts can I pick?
  wordcloud --list-fonts --font-dir /usr/share/fonts/truetype/dejavu

OUTPUT FILES:
  word_cloud.png         the cloud, WIDTH x HEIGHT
  word_frequencies.csv   Word, Raw Count, Normalized Frequency (%)
  top_words_chart.png    horizontal bar chart of the top 10 words

MASKS:
  White (#ffffff) pixels are kept empty; any other colour is drawable.
  An uploaded --mask always wins over --shape.

ENVIRONMENT VARIABLES:
  WORDCLOUD_BACKGROUND, WORDCLOUD_MAX_WORDS, WORDCLOUD_WIDTH, WORDCLOUD_HEIGHT,
  WORDCLOUD_COLORMAP, WORDCLOUD_FONT, WORDCLOUD_FONT_DIR, WORDCLOUD_SHAPE,
  WORDCLOUD_MASK_DIR, WORDCLOUD_SEED, WORDCLOUD_OUTPUT
  RUST_LOG                 Override the log filter (e.g. edgequake_wordcloud=debug)
"#;

/// Generate a word cloud and top-word frequency report from text or a PDF.
#[derive(Parser, Debug)]
#[command(
    name = "wordcloud",
    version,
    about = "Generate a word cloud and top-word frequency report from text or a PDF",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
#[command(group(ArgGroup::new("source").args(["text", "text_file", "pdf"])))]
struct Cli {
    /// Text to visualise.
    #[arg(long)]
    text: Option<String>,

    /// Read text from this file (`-` for stdin).
    #[arg(long)]
    text_file: Option<PathBuf>,

    /// Extract text from this PDF document.
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Background colour as #rrggbb.
    #[arg(long, env = "WORDCLOUD_BACKGROUND", default_value = "#ffffff")]
    background: HexColor,

    /// Maximum number of words drawn (50–300).
    #[arg(long, env = "WORDCLOUD_MAX_WORDS", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(50..=300))]
    max_words: u32,

    /// Image width in pixels (400–1200).
    #[arg(long, env = "WORDCLOUD_WIDTH", default_value_t = 800,
          value_parser = clap::value_parser!(u32).range(400..=1200))]
    width: u32,

    /// Image height in pixels (300–800).
    #[arg(long, env = "WORDCLOUD_HEIGHT", default_value_t = 400,
          value_parser = clap::value_parser!(u32).range(300..=800))]
    height: u32,

    /// Colour palette.
    #[arg(long, env = "WORDCLOUD_COLORMAP", value_enum, default_value = "viridis")]
    colormap: ColormapArg,

    /// Font: "Default" or a .ttf file name from --font-dir.
    #[arg(long, env = "WORDCLOUD_FONT", default_value = "Default")]
    font: String,

    /// Directory searched for .ttf fonts.
    #[arg(long, env = "WORDCLOUD_FONT_DIR", default_value = "fonts")]
    font_dir: PathBuf,

    /// Built-in mask shape.
    #[arg(long, env = "WORDCLOUD_SHAPE", value_enum, default_value = "none")]
    shape: ShapeArg,

    /// Custom PNG mask; overrides --shape.
    #[arg(long)]
    mask: Option<PathBuf>,

    /// Directory holding circle.png and heart.png.
    #[arg(long, env = "WORDCLOUD_MASK_DIR", default_value = "masks")]
    mask_dir: PathBuf,

    /// Seed for word placement and colours.
    #[arg(long, env = "WORDCLOUD_SEED", default_value_t = 42)]
    seed: u64,

    /// Directory the PNG and CSV outputs are written to.
    #[arg(short, long, env = "WORDCLOUD_OUTPUT", default_value = ".")]
    output: PathBuf,

    /// Print a JSON summary on stdout instead of the table.
    #[arg(long)]
    json: bool,

    /// Echo the acquired text (useful to check PDF extraction).
    #[arg(long)]
    show_text: bool,

    /// List fonts available in --font-dir and exit.
    #[arg(long)]
    list_fonts: bool,

    /// Disable progress output.
    #[arg(long, env = "WORDCLOUD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "WORDCLOUD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "WORDCLOUD_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ColormapArg {
    Viridis,
    Plasma,
    Inferno,
    Magma,
    Cividis,
    Cool,
    Hot,
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl From<ColormapArg> for Colormap {
    fn from(v: ColormapArg) -> Self {
        match v {
            ColormapArg::Viridis => Colormap::Viridis,
            ColormapArg::Plasma => Colormap::Plasma,
            ColormapArg::Inferno => Colormap::Inferno,
            ColormapArg::Magma => Colormap::Magma,
            ColormapArg::Cividis => Colormap::Cividis,
            ColormapArg::Cool => Colormap::Cool,
            ColormapArg::Hot => Colormap::Hot,
            ColormapArg::Spring => Colormap::Spring,
            ColormapArg::Summer => Colormap::Summer,
            ColormapArg::Autumn => Colormap::Autumn,
            ColormapArg::Winter => Colormap::Winter,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ShapeArg {
    None,
    Circle,
    Heart,
}

impl From<ShapeArg> for Shape {
    fn from(v: ShapeArg) -> Self {
        match v {
            ShapeArg::None => Shape::None,
            ShapeArg::Circle => Shape::Circle,
            ShapeArg::Heart => Shape::Heart,
        }
    }
}

/// Shape of the `--json` document.
#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    summary: GenerationSummary,
    files: &'a WrittenFiles,
    source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_count: Option<usize>,
    failed_pages: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress output covers everything INFO would say.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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

    // ── List-fonts mode ──────────────────────────────────────────────────
    if cli.list_fonts {
        println!("Default");
        for name in list_fonts(&cli.font_dir) {
            println!("{name}");
        }
        return Ok(());
    }

    // ── Acquire input ────────────────────────────────────────────────────
    let source = read_source(&cli)?;

    let progress = show_progress.then(CliProgressCallback::new);
    let progress_cb: Option<ProgressCallback> = progress
        .clone()
        .map(|p| p as Arc<dyn GenerationProgressCallback>);
    let config = build_config(&cli, progress_cb)?;

    // ── Generate ─────────────────────────────────────────────────────────
    let run = generate_from_source(&source, &config);
    // blank input and failures never reach on_generation_complete
    if let Some(ref progress) = progress {
        progress.clear();
    }
    let run = run.context("Word cloud generation failed")?;

    if cli.show_text {
        if !cli.quiet {
            eprintln!("{}", bold("Extracted text:"));
        }
        println!("{}", run.acquired.text);
    }
    if !cli.quiet {
        for page in &run.acquired.failed_pages {
            eprintln!("  {} {}", red("✗"), page);
        }
    }

    let Some(output) = run.output else {
        if !cli.quiet {
            eprintln!(
                "{} Please enter some text or provide a PDF file to generate a word cloud.",
                cyan("ℹ")
            );
        }
        return Ok(());
    };

    let files = write_outputs(&output, &cli.output).context("Failed to write outputs")?;

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        let report = JsonReport {
            summary: output.summary(&config, false)?,
            files: &files,
            source: match source {
                TextSource::Direct(_) => "text",
                TextSource::Document(_) => "pdf",
            },
            page_count: run.acquired.page_count,
            failed_pages: run
                .acquired
                .failed_pages
                .iter()
                .map(|p| p.to_string())
                .collect(),
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    if !cli.quiet {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(output.report.to_table().as_bytes())
            .context("Failed to write to stdout")?;

        eprintln!(
            "{}  {}/{} words  {}ms  →  {}",
            green("✔"),
            output.stats.placed_words,
            output.stats.retained_words,
            output.stats.total_duration_ms,
            bold(&files.word_cloud.display().to_string()),
        );
        eprintln!(
            "   {}  {}",
            dim(&files.frequencies_csv.display().to_string()),
            dim(&files.chart.display().to_string()),
        );
    }

    Ok(())
}

/// Resolve the mutually exclusive input flags into a [`TextSource`].
fn read_source(cli: &Cli) -> Result<TextSource> {
    if let Some(ref text) = cli.text {
        return Ok(TextSource::Direct(text.clone()));
    }
    if let Some(ref path) = cli.text_file {
        let text = if path.as_os_str() == "-" {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read text from stdin")?;
            buf
        } else {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read text from {:?}", path))?
        };
        return Ok(TextSource::Direct(text));
    }
    if let Some(ref path) = cli.pdf {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read PDF from {:?}", path))?;
        return Ok(TextSource::Document(bytes));
    }
    bail!("No input: pass --text, --text-file or --pdf")
}

/// Map CLI args to `CloudConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<CloudConfig> {
    let mut builder = CloudConfig::builder()
        .background(cli.background)
        .max_words(cli.max_words as usize)
        .size(cli.width, cli.height)
        .colormap(cli.colormap.clone().into())
        .font(FontChoice::from_menu(&cli.font))
        .font_dir(cli.font_dir.clone())
        .shape(cli.shape.clone().into())
        .mask_dir(cli.mask_dir.clone())
        .seed(cli.seed);

    if let Some(ref path) = cli.mask {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read mask from {:?}", path))?;
        builder = builder.custom_mask(bytes);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
