//! CLI binary for img2webp.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` and writes results.

use anyhow::{Context, Result};
use clap::Parser;
use img2webp::{
    convert, convert_batch, convert_to_webp, convert_to_webp_base64, resolve_input, validate,
    ConversionConfig, ConversionProgressCallback, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and per-file log
/// lines using [indicatif]. Designed to work correctly when files complete
/// out-of-order (concurrent batch mode).
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Count of files that errored out.
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total_files as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }

    fn on_file_start(&self, input: &str, _total: usize) {
        self.bar.set_message(short_name(input).to_string());
    }

    fn on_file_complete(&self, input: &str, _total: usize, output_bytes: usize) {
        self.bar.println(format!(
            "  {} {:<32}  {}",
            green("✓"),
            short_name(input),
            dim(&format!("{output_bytes:>8} bytes")),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, input: &str, _total: usize, error: String) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = if error.len() > 80 {
            format!("{}\u{2026}", &error[..79])
        } else {
            error
        };

        self.bar.println(format!(
            "  {} {:<32}  {}",
            red("✗"),
            short_name(input),
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let failed = total_files.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} files converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files converted  ({} failed)",
                if failed == total_files {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_files,
                red(&failed.to_string()),
            );
        }
    }
}

/// Last path segment of an input, for compact log lines.
fn short_name(input: &str) -> &str {
    input.rsplit(['/', '\\']).next().unwrap_or(input)
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a single image (writes photo.webp next to the input)
  img2webp photo.jpg

  # Explicit output path and quality
  img2webp photo.png -o thumb.webp --quality 0.6

  # Convert a whole directory's worth of files into ./webp/
  img2webp *.jpg *.png -o webp/

  # Convert from a URL
  img2webp https://example.com/banner.png -o banner.webp

  # Print a base64 data URI instead of writing a file
  img2webp avatar.gif --base64

  # Raise the upload ceiling and cap decode size
  img2webp scan.png --max-size-mb 20 --max-pixels 40000000

  # Bypass the format/size gate (the image/* check still applies)
  img2webp odd-extension.bin --force -o out.webp

ACCEPTED INPUT FORMATS:
  JPEG, PNG, GIF, WebP — anything else is rejected by the upload gate.
  Output is always lossy WebP at the configured quality; pixel dimensions
  are preserved exactly (no resizing).

ENVIRONMENT VARIABLES:
  IMG2WEBP_QUALITY      Default encoding quality (0.0–1.0)
  IMG2WEBP_MAX_SIZE_MB  Default upload size ceiling in MB
  IMG2WEBP_CONCURRENCY  Default batch concurrency
"#;

/// Normalise images to WebP.
#[derive(Parser, Debug)]
#[command(
    name = "img2webp",
    version,
    about = "Normalise JPEG/PNG/GIF/WebP images to lossy WebP",
    long_about = "Validate uploaded images (format allow-list + size ceiling) and re-encode \
them as lossy WebP at a controlled quality, preserving pixel dimensions. Accepts local \
files, HTTP/HTTPS URLs, and base64 data URIs.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input images: local paths, HTTP/HTTPS URLs, or data URIs.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output file (single input) or directory (multiple inputs).
    /// Defaults to the input path with a .webp extension.
    #[arg(short, long, env = "IMG2WEBP_OUTPUT")]
    output: Option<PathBuf>,

    /// WebP encoding quality, 0.0–1.0. Higher = larger output, fewer artefacts.
    #[arg(long, env = "IMG2WEBP_QUALITY", default_value_t = 0.8)]
    quality: f32,

    /// Maximum accepted input size in megabytes.
    #[arg(long = "max-size-mb", env = "IMG2WEBP_MAX_SIZE_MB", default_value_t = 5)]
    max_size_mb: u32,

    /// Reject images whose header dimensions exceed this many pixels
    /// (width × height). Unbounded when unset.
    #[arg(long = "max-pixels", env = "IMG2WEBP_MAX_PIXELS")]
    max_pixels: Option<u64>,

    /// Number of files converted concurrently in batch mode.
    #[arg(short, long, env = "IMG2WEBP_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Print a data:image/webp;base64,… URI to stdout instead of writing files.
    #[arg(long)]
    base64: bool,

    /// Output per-file results as JSON.
    #[arg(long, env = "IMG2WEBP_JSON")]
    json: bool,

    /// Skip the upload gate (format allow-list + size ceiling).
    /// The converter still rejects declared non-image types. Single input only.
    #[arg(long)]
    force: bool,

    /// Disable the progress bar.
    #[arg(long, env = "IMG2WEBP_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "IMG2WEBP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "IMG2WEBP_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "IMG2WEBP_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress =
        !cli.quiet && !cli.no_progress && !cli.json && !cli.base64 && cli.inputs.len() > 1;
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

    if cli.force && cli.inputs.len() > 1 {
        anyhow::bail!("--force only applies to a single input");
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let mut builder = ConversionConfig::builder()
        .quality(cli.quality)
        .max_size_megabytes(cli.max_size_mb)
        .concurrency(cli.concurrency)
        .download_timeout_secs(cli.download_timeout);
    if let Some(px) = cli.max_pixels {
        builder = builder.max_decoded_pixels(px);
    }
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("invalid configuration")?;

    // ── Run ──────────────────────────────────────────────────────────────
    if cli.base64 {
        run_base64(&cli, &config).await
    } else if cli.inputs.len() == 1 {
        run_single(&cli, &config).await
    } else {
        run_batch(&cli, &config).await
    }
}

/// `--base64`: print a data URI per input to stdout.
async fn run_base64(cli: &Cli, config: &ConversionConfig) -> Result<()> {
    for input in &cli.inputs {
        let file = resolve_input(input, config.download_timeout_secs)
            .await
            .with_context(|| format!("failed to resolve '{input}'"))?;
        if !cli.force {
            validate(&file, config.max_size_megabytes)?;
        }
        let uri = convert_to_webp_base64(&file, config)
            .await
            .with_context(|| format!("conversion failed for '{input}'"))?;

        if cli.json {
            println!(
                "{}",
                serde_json::json!({ "input": input, "data_uri": uri })
            );
        } else {
            println!("{uri}");
        }
    }
    Ok(())
}

/// One input, one output file.
async fn run_single(cli: &Cli, config: &ConversionConfig) -> Result<()> {
    let input = &cli.inputs[0];
    let out_path = output_path_for(input, cli.output.as_deref());

    if cli.force {
        // Bypass the gate: resolve and call the converter directly. Its own
        // image/* check is the only remaining precondition.
        let file = resolve_input(input, config.download_timeout_secs)
            .await
            .with_context(|| format!("failed to resolve '{input}'"))?;
        let image = convert_to_webp(&file, config)
            .await
            .with_context(|| format!("conversion failed for '{input}'"))?;

        let (width, height, len) = (image.width, image.height, image.len());
        tokio::fs::write(&out_path, image.into_bytes())
            .await
            .with_context(|| format!("failed to write {}", out_path.display()))?;

        if !cli.quiet {
            eprintln!(
                "{}  {}x{} px  {} bytes  →  {}",
                green("✔"),
                width,
                height,
                len,
                bold(&out_path.display().to_string()),
            );
        }
        return Ok(());
    }

    let output = convert(input, config)
        .await
        .with_context(|| format!("conversion failed for '{input}'"))?;

    if cli.json {
        let summary = serde_json::json!({
            "input": input,
            "output": out_path.display().to_string(),
            "width": output.image.width,
            "height": output.image.height,
            "input_bytes": output.stats.input_bytes,
            "output_bytes": output.stats.output_bytes,
            "compression_ratio": output.stats.compression_ratio(),
            "total_duration_ms": output.stats.total_duration_ms,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    let stats = output.stats.clone();
    tokio::fs::write(&out_path, output.image.into_bytes())
        .await
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    if !cli.quiet && !cli.json {
        eprintln!(
            "{}  {} → {} bytes  ({:.0}% of input)  {}ms  →  {}",
            green("✔"),
            stats.input_bytes,
            stats.output_bytes,
            stats.compression_ratio() * 100.0,
            stats.total_duration_ms,
            bold(&out_path.display().to_string()),
        );
    }

    Ok(())
}

/// Many inputs: convert concurrently into an output directory.
async fn run_batch(cli: &Cli, config: &ConversionConfig) -> Result<()> {
    let out_dir = cli.output.clone().unwrap_or_else(|| PathBuf::from("."));
    tokio::fs::create_dir_all(&out_dir)
        .await
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let reports = convert_batch(&cli.inputs, config).await;

    let mut failed = 0usize;
    let mut json_items = Vec::new();

    for report in &reports {
        match &report.result {
            Ok(output) => {
                let out_path = out_dir.join(default_file_name(&report.input));
                tokio::fs::write(&out_path, &output.image.bytes)
                    .await
                    .with_context(|| format!("failed to write {}", out_path.display()))?;
                if cli.json {
                    json_items.push(serde_json::json!({
                        "input": report.input,
                        "output": out_path.display().to_string(),
                        "width": output.image.width,
                        "height": output.image.height,
                        "output_bytes": output.stats.output_bytes,
                    }));
                }
            }
            Err(e) => {
                failed += 1;
                if cli.json {
                    json_items.push(serde_json::json!({
                        "input": report.input,
                        "error": e.to_string(),
                    }));
                } else if !cli.quiet && cli.no_progress {
                    eprintln!("{} {}: {e}", red("✗"), report.input);
                }
            }
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if !cli.quiet && !show_bar_already_summarised(cli) {
        let ok = reports.len() - failed;
        eprintln!("Converted {ok}/{} files into {}", reports.len(), out_dir.display());
    }

    if failed == reports.len() && !reports.is_empty() {
        anyhow::bail!("all {} files failed to convert", reports.len());
    }

    Ok(())
}

/// Whether the progress callback already printed the batch summary line.
fn show_bar_already_summarised(cli: &Cli) -> bool {
    !cli.quiet && !cli.no_progress && !cli.json && cli.inputs.len() > 1
}

/// Derive the output path for a single conversion.
fn output_path_for(input: &str, output: Option<&Path>) -> PathBuf {
    match output {
        Some(p) if p.is_dir() => p.join(default_file_name(input)),
        Some(p) => p.to_path_buf(),
        None => {
            if input.starts_with("http://")
                || input.starts_with("https://")
                || input.starts_with("data:")
            {
                default_file_name(input)
            } else {
                Path::new(input).with_extension("webp")
            }
        }
    }
}

/// A `.webp` file name derived from the input's last path segment.
fn default_file_name(input: &str) -> PathBuf {
    if input.starts_with("data:") {
        return PathBuf::from("image.webp");
    }
    let last = input
        .trim_end_matches('/')
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("image");
    let stem = last.rsplit_once('.').map(|(s, _)| s).unwrap_or(last);
    let stem = if stem.is_empty() { "image" } else { stem };
    PathBuf::from(format!("{stem}.webp"))
}
