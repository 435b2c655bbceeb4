//! Directory scanner: the outer polling loop.
//!
//! Each pass walks every root, converts whatever has no output yet, and
//! never lets one document's failure stop the pass. Progress is tracked only
//! through the files on disk, so a document that keeps failing is simply
//! tried again on the next pass.

use crate::config::ConverterConfig;
use crate::convert::convert_document;
use crate::eligibility;
use crate::error::{Pdf2TiffError, SkipReason};
use crate::output::{ConversionOutcome, ScanReport};
use crate::runner::CommandRunner;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// PDFs below `root`, split into convertible candidates and templates.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Discovered {
    pub candidates: Vec<PathBuf>,
    pub templates: Vec<PathBuf>,
}

/// Recursively list `*.pdf` files below `root`, sorted by path.
///
/// Files directly inside `root` are templates. Curve-only working copies
/// left by interrupted jobs are not listed at all.
pub fn discover(root: &Path) -> Discovered {
    let mut found = Discovered::default();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !has_pdf_extension(path) {
            continue;
        }
        if eligibility::is_intermediate(path) {
            continue;
        }
        if eligibility::is_template(path, root) {
            found.templates.push(path.to_path_buf());
        } else {
            found.candidates.push(path.to_path_buf());
        }
    }

    found
}

/// [`discover`] on the blocking pool.
async fn discover_in_background(root: PathBuf) -> Result<Discovered, Pdf2TiffError> {
    tokio::task::spawn_blocking(move || discover(&root))
        .await
        .map_err(|e| Pdf2TiffError::Internal(format!("directory walk failed: {e}")))
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// One pass over every root.
pub async fn scan_once<R: CommandRunner>(config: &ConverterConfig, runner: &R) -> ScanReport {
    let mut report = ScanReport::default();

    for root in &config.roots {
        debug!("Scanning: {}", root.display());
        if !root.is_dir() {
            warn!("Root {} is not a directory, skipping", root.display());
            continue;
        }

        let discovered = match discover_in_background(root.clone()).await {
            Ok(d) => d,
            Err(e) => {
                error!("{}: {}", root.display(), e);
                continue;
            }
        };
        report.templates += discovered.templates.len();
        report.candidates += discovered.candidates.len();

        for pdf in discovered.candidates {
            if let Some(existing) = eligibility::existing_output(&pdf) {
                debug!("Skipped {}: {}", pdf.display(), SkipReason::AlreadyConverted { existing });
                report.already_converted += 1;
                continue;
            }

            match convert_document(&pdf, config, runner).await {
                Ok(ConversionOutcome::Converted(_)) => report.converted += 1,
                Ok(ConversionOutcome::Skipped(reason)) => {
                    debug!("Skipped {}: {}", pdf.display(), reason);
                    report.skipped += 1;
                }
                Err(e) => {
                    error!("{}: {}", pdf.display(), e);
                    report.failed += 1;
                }
            }
        }
    }

    if report.converted + report.failed + report.skipped > 0 {
        info!(
            "Pass complete: {} converted, {} skipped, {} failed",
            report.converted, report.skipped, report.failed
        );
    }
    report
}

/// Scan forever, sleeping `config.poll_interval` between passes.
///
/// Returns only if the runtime is shut down.
pub async fn watch<R: CommandRunner>(config: &ConverterConfig, runner: &R) {
    info!(
        "Watching {} root(s) every {}s",
        config.roots.len(),
        config.poll_interval.as_secs_f64()
    );
    loop {
        scan_once(config, runner).await;
        tokio::time::sleep(config.poll_interval).await;
    }
}
