//! Conversion of a single PDF into production TIFF pages.
//!
//! ## Stage order
//!
//! ```text
//! outline ─▶ validate ─▶ aspect ratio ─▶ page range ─▶ DPI ─▶ raster ─▶ tile
//! ```
//!
//! Validation and geometry run on the *working source*, the outlined copy
//! when `mutool` is available, because flattening can change what `pdfinfo`
//! reports. That is why geometry is fetched again for the DPI decision
//! instead of being reused from an earlier call.
//!
//! An invalid or mis-shaped document is an expected outcome and returns
//! `Ok(ConversionOutcome::Skipped(..))`. A tool that fails to launch or
//! exits non-zero in the outline, raster or tile stage returns `Err`.
//! Intermediates are removed on every one of these paths.

use crate::config::ConverterConfig;
use crate::eligibility;
use crate::error::{Pdf2TiffError, SkipReason};
use crate::job::{ConversionJob, Document, Intermediates};
use crate::journal;
use crate::output::{ConversionOutcome, ConversionReport, PageRange};
use crate::pipeline::{check_status, inspect, outline, raster, tile};
use crate::policy;
use crate::runner::{CommandRunner, SystemRunner};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Convert `pdf` into `{stem}-NNN.tif` pages beside it.
///
/// Does not check whether the document was already converted; the scanner
/// does that before calling in.
///
/// # Errors
/// Returns `Err(Pdf2TiffError)` when an external tool cannot be launched or
/// fails, or when a journal cannot be written.
pub async fn convert_document<R: CommandRunner>(
    pdf: &Path,
    config: &ConverterConfig,
    runner: &R,
) -> Result<ConversionOutcome, Pdf2TiffError> {
    let start = Instant::now();
    let document = Document::new(pdf)?;
    let pdfinfo = config.tools.pdfinfo.as_deref();
    let rules = &config.rules;

    Intermediates::clear_stale(&document);
    let mut intermediates = Intermediates::new();
    intermediates.register(document.raster_path());

    // ── Step 1: Text to curves ───────────────────────────────────────────
    let (source, outlined) = match config.tools.mutool.as_deref() {
        Some(mutool) => {
            let outlined = document.outlined_path();
            intermediates.register(&outlined);
            outline::outline(runner, mutool, &document.path, &outlined).await?;
            (outlined, true)
        }
        None => (document.path.clone(), false),
    };

    // ── Step 2: Validate ─────────────────────────────────────────────────
    match inspect::probe(runner, pdfinfo, &source).await {
        inspect::InfoProbe::Failed { code } => {
            journal::record_invalid_pdf(&document.parent, &document.file_name()).await?;
            return Ok(ConversionOutcome::Skipped(SkipReason::InvalidPdf { code }));
        }
        inspect::InfoProbe::Unavailable => {
            debug!("Validation skipped for {}: no pdfinfo", document.file_name());
        }
        inspect::InfoProbe::Report(_) => {}
    }

    // ── Step 3: Aspect ratio ─────────────────────────────────────────────
    let (width_cm, height_cm) = inspect::page_size_cm(runner, pdfinfo, &source).await;
    if let Some(ratio) = eligibility::aspect_ratio(width_cm, height_cm) {
        if ratio > rules.max_aspect_ratio {
            info!(
                "Ignoring {}: aspect ratio {:.1}:1 > {}:1",
                document.stem, ratio, rules.max_aspect_ratio
            );
            return Ok(ConversionOutcome::Skipped(SkipReason::AspectRatio {
                ratio,
                limit: rules.max_aspect_ratio,
            }));
        }
    }

    // ── Step 4: Page range ───────────────────────────────────────────────
    let pages = inspect::page_count(runner, pdfinfo, &source).await;
    let page_range = policy::page_range(&document.stem, pages, rules);
    if page_range == PageRange::FirstPageOnly {
        info!(
            "{}: {} pages > {}, exporting page 1 only",
            document.stem, pages, rules.first_page_threshold
        );
    }

    // ── Step 5: DPI ──────────────────────────────────────────────────────
    let (width_cm, height_cm) = inspect::page_size_cm(runner, pdfinfo, &source).await;
    let base = policy::resolve_dpi(width_cm, height_cm);
    let resolution = policy::apply_overrides(base, &source, &document.stem, rules);
    if resolution != base {
        info!("DPI override to {} for {}", resolution.dpi, document.file_name());
    } else {
        info!("Converting {}: {} DPI", document.file_name(), resolution.dpi);
    }

    let job = ConversionJob {
        source,
        resolution,
        page_range,
        raster_tif: document.raster_path(),
        output_pattern: document.output_pattern(),
    };

    // ── Step 6: Rasterise ────────────────────────────────────────────────
    let output = raster::rasterize(runner, config.ghostscript(), &config.icc, &job).await?;
    let warnings = raster::font_warnings(&output.stderr);
    if !warnings.is_empty() {
        journal::record_missing_fonts(&document.parent, &warnings).await?;
    }
    check_status("ghostscript", &job.source, output)?;

    // ── Step 7: Split pages ──────────────────────────────────────────────
    tile::split_pages(runner, config.magick(), &job).await?;

    // ── Step 8: Cleanup ──────────────────────────────────────────────────
    drop(intermediates);

    let pages = eligibility::converted_pages(&document.parent, &document.stem);
    let duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Converted {} → {} page(s) in {}ms",
        document.file_name(),
        pages.len(),
        duration_ms
    );

    Ok(ConversionOutcome::Converted(ConversionReport {
        pdf: document.path,
        resolution: job.resolution,
        page_range: job.page_range,
        outlined,
        pages,
        font_warnings: warnings.len(),
        duration_ms,
    }))
}

/// [`convert_document`] with real subprocesses.
pub async fn convert(pdf: impl AsRef<Path>, config: &ConverterConfig) -> Result<ConversionOutcome, Pdf2TiffError> {
    convert_document(pdf.as_ref(), config, &SystemRunner).await
}
