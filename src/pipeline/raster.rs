//! Ghostscript rasterisation to a single multi-page CMYK TIFF.
//!
//! Device, rendering intent, anti-aliasing and both ICC profiles are fixed
//! for every job; only the DPI and the optional first-page restriction vary.

use super::launch;
use crate::config::IccProfiles;
use crate::error::Pdf2TiffError;
use crate::job::{escape_percent, ConversionJob};
use crate::output::PageRange;
use crate::runner::{path_arg, CommandOutput, CommandRunner, Invocation};
use std::path::Path;
use tracing::info;

/// Flags shared by every raster run.
const FIXED_FLAGS: [&str; 7] = [
    "-dBATCH",
    "-dNOPAUSE",
    "-dSAFER",
    "-sDEVICE=tiff32nc",
    "-dRenderIntent=1",
    "-dTextAlphaBits=4",
    "-dGraphicsAlphaBits=4",
];

/// Substrings marking a font problem in Ghostscript's stderr.
const FONT_WARNING_MARKERS: [&str; 2] = ["Loading font", "substitute"];

/// Command line for rendering `job`.
pub fn raster_invocation(ghostscript: &Path, icc: &IccProfiles, job: &ConversionJob) -> Invocation {
    let mut invocation = Invocation::new(ghostscript)
        .args(FIXED_FLAGS)
        .arg(path_arg("-sDefaultRGBProfile=", &icc.input_rgb))
        .arg(path_arg("-sOutputICCProfile=", &icc.output_cmyk))
        .arg(format!("-r{}", job.resolution.dpi));

    if job.page_range == PageRange::FirstPageOnly {
        invocation = invocation.args(["-dFirstPage=1", "-dLastPage=1"]);
    }

    invocation
        .arg(path_arg("-sOutputFile=", &escape_percent(&job.raster_tif)))
        .arg(&job.source)
}

/// Run Ghostscript for `job`.
///
/// Only a launch failure is an error here: the caller still has to harvest
/// font warnings from a failed run before deciding what to do with it.
pub async fn rasterize<R: CommandRunner>(
    runner: &R,
    ghostscript: &Path,
    icc: &IccProfiles,
    job: &ConversionJob,
) -> Result<CommandOutput, Pdf2TiffError> {
    info!(
        "Rasterising {} at {} DPI{}",
        job.source.file_name().unwrap_or_default().to_string_lossy(),
        job.resolution.dpi,
        match job.page_range {
            PageRange::All => "",
            PageRange::FirstPageOnly => " (first page only)",
        }
    );
    let invocation = raster_invocation(ghostscript, icc, job);
    launch(runner, "ghostscript", &invocation).await
}

/// Stderr lines reporting missing or substituted fonts, verbatim.
pub fn font_warnings(stderr: &str) -> Vec<String> {
    stderr
        .lines()
        .filter(|line| FONT_WARNING_MARKERS.iter().any(|m| line.contains(m)))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{DpiReason, ResolutionDecision};
    use std::path::PathBuf;

    fn job(range: PageRange) -> ConversionJob {
        ConversionJob {
            source: PathBuf::from("/jobs/a/poster_outlined.pdf"),
            resolution: ResolutionDecision {
                dpi: 100,
                reason: DpiReason::ClampedToNearestTier,
            },
            page_range: range,
            raster_tif: PathBuf::from("/jobs/a/poster_gs.tif"),
            output_pattern: PathBuf::from("/jobs/a/poster-%03d.tif"),
        }
    }

    fn icc() -> IccProfiles {
        IccProfiles {
            input_rgb: PathBuf::from("/icc/sRGB.icc"),
            output_cmyk: PathBuf::from("/icc/SWOP.icc"),
        }
    }

    #[test]
    fn test_full_command_line() {
        let inv = raster_invocation(Path::new("/usr/bin/gs"), &icc(), &job(PageRange::All));
        assert_eq!(
            inv.arg_strings(),
            vec![
                "-dBATCH",
                "-dNOPAUSE",
                "-dSAFER",
                "-sDEVICE=tiff32nc",
                "-dRenderIntent=1",
                "-dTextAlphaBits=4",
                "-dGraphicsAlphaBits=4",
                "-sDefaultRGBProfile=/icc/sRGB.icc",
                "-sOutputICCProfile=/icc/SWOP.icc",
                "-r100",
                "-sOutputFile=/jobs/a/poster_gs.tif",
                "/jobs/a/poster_outlined.pdf",
            ]
        );
    }

    #[test]
    fn test_first_page_only_flags() {
        let inv = raster_invocation(Path::new("gs"), &icc(), &job(PageRange::FirstPageOnly));
        let args = inv.arg_strings();
        let r = args.iter().position(|a| a == "-r100").unwrap();
        assert_eq!(args[r + 1], "-dFirstPage=1");
        assert_eq!(args[r + 2], "-dLastPage=1");
    }

    #[test]
    fn test_output_file_percent_escaped() {
        let mut j = job(PageRange::All);
        j.source = PathBuf::from("/jobs/a/desconto 50%_outlined.pdf");
        j.raster_tif = PathBuf::from("/jobs/a/desconto 50%_gs.tif");
        let args = raster_invocation(Path::new("gs"), &icc(), &j).arg_strings();
        assert!(args.contains(&"-sOutputFile=/jobs/a/desconto 50%%_gs.tif".to_string()));
        // the input is an ordinary path argument
        assert_eq!(args.last().unwrap(), "/jobs/a/desconto 50%_outlined.pdf");
    }

    #[test]
    fn test_font_warnings() {
        let stderr = "GPL Ghostscript 10.05.1\n\
Loading font Helvetica (or substitute) from /usr/share/fonts/n019003l.pfb\n\
Page 1\n\
Can't find (or can't open) font file Gotham-Bold, substitute font used\n";
        let found = font_warnings(stderr);
        assert_eq!(found.len(), 2);
        assert!(found[0].starts_with("Loading font Helvetica"));
        assert!(found[1].contains("Gotham-Bold"));
        assert!(font_warnings("Page 1\nPage 2\n").is_empty());
    }
}
