//! CLI binary for pdf2tiff.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConverterConfig`, installs logging, and runs the watch loop.

use anyhow::{Context, Result};
use clap::Parser;
use pdf2tiff::{
    inspect, scan_once, watch, ConverterConfig, DocumentInfo, SystemRunner, ToolPaths,
};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Watch three product folders, re-scanning every 10 seconds
  pdf2tiff --rgb-profile sRGB.icc --cmyk-profile USWebCoatedSWOP.icc \
      /srv/print/cartao_de_visita /srv/print/folhetos /srv/print/adesivos

  # One pass, then exit (cron-style)
  pdf2tiff --once --rgb-profile sRGB.icc --cmyk-profile SWOP.icc /srv/print/folhetos

  # Show page count, size and the DPI that would be used
  pdf2tiff --inspect-only banner.pdf poster.pdf

LAYOUT:
  PDFs directly inside a root are templates and are never converted.
  Each converted PDF gets {stem}-001.tif, {stem}-002.tif, … beside it; their
  presence is what marks the PDF as done. Delete them to convert again.

JOURNALS (per directory):
  log_pdfs_incorretos.txt   one line per PDF pdfinfo could not open (appended)
  fontes-faltando.txt       font warnings of the latest job that had any

ENVIRONMENT VARIABLES:
  PDF2TIFF_PDFINFO, PDF2TIFF_MUTOOL, PDF2TIFF_GHOSTSCRIPT, PDF2TIFF_MAGICK
                            Tool paths (otherwise looked up on PATH)
  PDF2TIFF_RGB_PROFILE      Input RGB ICC profile
  PDF2TIFF_CMYK_PROFILE     Output CMYK ICC profile
  PDF2TIFF_INTERVAL         Seconds between passes
  RUST_LOG                  Log filter, overrides -v / -q
"#;

/// Watch folders and rasterise print-ready PDFs into CMYK TIFF pages.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2tiff",
    version,
    about = "Watch folders and rasterise print-ready PDFs into CMYK TIFF pages",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Root directories to watch (or PDF files with --inspect-only).
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Seconds to sleep between two passes.
    #[arg(long, env = "PDF2TIFF_INTERVAL", default_value_t = 10,
          value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// Run a single pass and exit.
    #[arg(long)]
    once: bool,

    /// Input RGB ICC profile for Ghostscript.
    #[arg(long, env = "PDF2TIFF_RGB_PROFILE", required_unless_present = "inspect_only")]
    rgb_profile: Option<PathBuf>,

    /// Output CMYK ICC profile for Ghostscript.
    #[arg(long, env = "PDF2TIFF_CMYK_PROFILE", required_unless_present = "inspect_only")]
    cmyk_profile: Option<PathBuf>,

    /// pdfinfo binary (poppler).
    #[arg(long, env = "PDF2TIFF_PDFINFO")]
    pdfinfo: Option<PathBuf>,

    /// mutool binary (MuPDF).
    #[arg(long, env = "PDF2TIFF_MUTOOL")]
    mutool: Option<PathBuf>,

    /// Ghostscript binary.
    #[arg(long, env = "PDF2TIFF_GHOSTSCRIPT")]
    ghostscript: Option<PathBuf>,

    /// ImageMagick binary.
    #[arg(long, env = "PDF2TIFF_MAGICK")]
    magick: Option<PathBuf>,

    /// Do not convert text to curves even if mutool is available.
    #[arg(long)]
    no_outline: bool,

    /// Print PDF metadata and the DPI decision only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Print JSON (inspect results, or the pass summary with --once).
    #[arg(long)]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2TIFF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2TIFF_QUIET")]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
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

    let tools = resolve_tools(&cli);

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let mut infos = Vec::with_capacity(cli.paths.len());
        for pdf in &cli.paths {
            infos.push(inspect(&SystemRunner, tools.pdfinfo.as_deref(), pdf).await);
        }
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&infos).context("Failed to serialise metadata")?
            );
        } else {
            for info in &infos {
                print_info(info);
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    tools.log_availability();
    let config = build_config(&cli, tools)?;

    // ── Run ──────────────────────────────────────────────────────────────
    if cli.once {
        let report = scan_once(&config, &SystemRunner).await;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialise report")?
            );
        } else if !cli.quiet {
            eprintln!(
                "{} candidates ({} templates ignored): {} converted, {} already done, {} skipped, {} failed",
                report.candidates,
                report.templates,
                report.converted,
                report.already_converted,
                report.skipped,
                report.failed,
            );
        }
    } else {
        watch(&config, &SystemRunner).await;
    }

    Ok(())
}

/// Explicit flags first, then `PATH` discovery.
fn resolve_tools(cli: &Cli) -> ToolPaths {
    let mut tools = ToolPaths {
        pdfinfo: cli.pdfinfo.clone(),
        mutool: cli.mutool.clone(),
        ghostscript: cli.ghostscript.clone(),
        magick: cli.magick.clone(),
    }
    .or_discover();
    if cli.no_outline {
        tools.mutool = None;
    }
    tools
}

/// Map CLI args to `ConverterConfig`.
fn build_config(cli: &Cli, tools: ToolPaths) -> Result<ConverterConfig> {
    let (Some(rgb), Some(cmyk)) = (&cli.rgb_profile, &cli.cmyk_profile) else {
        anyhow::bail!("--rgb-profile and --cmyk-profile are required");
    };
    for profile in [rgb, cmyk] {
        if !profile.is_file() {
            tracing::warn!("ICC profile {} does not exist", profile.display());
        }
    }

    ConverterConfig::builder()
        .roots(cli.paths.iter().cloned())
        .tools(tools)
        .icc_profiles(rgb, cmyk)
        .poll_interval(Duration::from_secs(cli.interval))
        .build()
        .context("Invalid configuration")
}

fn print_info(info: &DocumentInfo) {
    println!("File:         {}", info.path.display());
    match info.valid {
        Some(true) => {}
        Some(false) => println!("Valid:        no (pdfinfo could not open it)"),
        None => println!("Valid:        unknown (pdfinfo not available)"),
    }
    println!("Pages:        {}", info.page_count);
    println!(
        "Page size:    {:.2} x {:.2} cm",
        info.width_cm, info.height_cm
    );
    println!(
        "DPI:          {} ({:?})",
        info.resolution.dpi, info.resolution.reason
    );
    println!();
}
