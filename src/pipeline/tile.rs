//! ImageMagick post-processing: split the multi-page raster into one
//! LZW-compressed TIFF per page.

use super::{check_status, launch};
use crate::error::Pdf2TiffError;
use crate::job::ConversionJob;
use crate::runner::{CommandRunner, Invocation};
use std::path::Path;

/// Command line for splitting `job.raster_tif` into `job.output_pattern`.
///
/// `-scene 1` starts the `%03d` page index at 001.
pub fn tile_invocation(magick: &Path, job: &ConversionJob) -> Invocation {
    Invocation::new(magick)
        .arg(&job.raster_tif)
        .args(["-define", "tiff:alpha=associated", "-compress", "LZW", "-scene", "1"])
        .arg(&job.output_pattern)
}

/// Write `{stem}-NNN.tif` pages. Any failure is fatal for the document.
pub async fn split_pages<R: CommandRunner>(
    runner: &R,
    magick: &Path,
    job: &ConversionJob,
) -> Result<(), Pdf2TiffError> {
    let invocation = tile_invocation(magick, job);
    let output = launch(runner, "imagemagick", &invocation).await?;
    check_status("imagemagick", &job.raster_tif, output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::PageRange;
    use crate::policy::resolve_dpi;
    use std::path::PathBuf;

    #[test]
    fn test_tile_command_line() {
        let job = ConversionJob {
            source: PathBuf::from("/jobs/a/flyer.pdf"),
            resolution: resolve_dpi(0.0, 0.0),
            page_range: PageRange::All,
            raster_tif: PathBuf::from("/jobs/a/flyer_gs.tif"),
            output_pattern: PathBuf::from("/jobs/a/flyer-%03d.tif"),
        };
        let inv = tile_invocation(Path::new("/usr/bin/magick"), &job);
        assert_eq!(
            inv.arg_strings(),
            vec![
                "/jobs/a/flyer_gs.tif",
                "-define",
                "tiff:alpha=associated",
                "-compress",
                "LZW",
                "-scene",
                "1",
                "/jobs/a/flyer-%03d.tif",
            ]
        );
    }
}
