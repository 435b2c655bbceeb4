//! # pdf2tiff
//!
//! Watch print-queue folders and rasterise every new PDF into production
//! TIFF pages, one `{stem}-NNN.tif` per page, written beside the source.
//!
//! ## Why external tools?
//!
//! The shop's output devices are calibrated against Ghostscript's CMYK
//! conversion and ImageMagick's TIFF writer. Instead of re-implementing
//! either, this crate decides *what* to render (whether a document is due,
//! at which DPI, which pages) and sequences the tools, tolerating the
//! failure of any one of them per document.
//!
//! ## Pipeline Overview
//!
//! ```text
//! roots
//!  │
//!  ├─ 1. Scan      recursive *.pdf walk; root-level files are templates
//!  ├─ 2. Pre-check skip if {stem}-???.tif already exists
//!  ├─ 3. Outline   mutool clean -gg (text → curves), optional
//!  ├─ 4. Validate  pdfinfo must open the file; aspect ratio ≤ 10:1
//!  ├─ 5. Decide    page range + DPI (area policy, product overrides)
//!  ├─ 6. Raster    Ghostscript → one multi-page tiff32nc, RGB → CMYK
//!  ├─ 7. Tile      ImageMagick → {stem}-001.tif, {stem}-002.tif, …
//!  └─ 8. Cleanup   intermediates removed on every exit path
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2tiff::{scan_once, ConverterConfig, SystemRunner, ToolPaths};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConverterConfig::builder()
//!         .root("/srv/print/folhetos")
//!         .tools(ToolPaths::discover())
//!         .icc_profiles("/srv/icc/sRGB.icc", "/srv/icc/USWebCoatedSWOP.icc")
//!         .build()?;
//!     let report = scan_once(&config, &SystemRunner).await;
//!     eprintln!("{} converted, {} failed", report.converted, report.failed);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2tiff` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod eligibility;
pub mod error;
pub mod job;
pub mod journal;
pub mod output;
pub mod pipeline;
pub mod policy;
pub mod runner;
pub mod scan;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConverterConfig, ConverterConfigBuilder, IccProfiles, ProductRules, ToolPaths};
pub use convert::{convert, convert_document};
pub use error::{Pdf2TiffError, SkipReason};
pub use output::{ConversionOutcome, ConversionReport, DocumentInfo, PageRange, ScanReport};
pub use pipeline::inspect::inspect;
pub use policy::{resolve_dpi, DpiReason, ResolutionDecision};
pub use runner::{CommandOutput, CommandRunner, Invocation, SystemRunner};
pub use scan::{scan_once, watch};
