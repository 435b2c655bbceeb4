//! External-tool stages of one conversion.
//!
//! Each submodule wraps exactly one tool. Stages only build the command line
//! and interpret the result; sequencing, cleanup and journaling live in
//! [`crate::convert`].
//!
//! ## Data Flow
//!
//! ```text
//! outline ─▶ inspect ─▶ raster ─▶ tile
//! (mutool)   (pdfinfo)  (gs)      (magick)
//! ```
//!
//! 1. [`outline`]: `mutool clean -gg`, text to curves; optional
//! 2. [`inspect`]: validity, page count and page size; fails soft to "unknown"
//! 3. [`raster`]: Ghostscript to one multi-page 32-bit CMYK TIFF
//! 4. [`tile`]: ImageMagick splits it into `{stem}-NNN.tif` pages

pub mod inspect;
pub mod outline;
pub mod raster;
pub mod tile;

use crate::error::Pdf2TiffError;
use crate::runner::{CommandOutput, CommandRunner, Invocation};
use std::path::Path;

/// Lines of stderr kept in [`Pdf2TiffError::ToolFailed`].
const STDERR_TAIL_LINES: usize = 20;

/// Run a tool, turning only a launch failure into an error.
pub(crate) async fn launch<R: CommandRunner>(
    runner: &R,
    tool: &'static str,
    invocation: &Invocation,
) -> Result<CommandOutput, Pdf2TiffError> {
    runner
        .run(invocation)
        .await
        .map_err(|source| Pdf2TiffError::ToolLaunch {
            tool,
            path: invocation.program.clone(),
            source,
        })
}

/// Turn a non-zero exit into [`Pdf2TiffError::ToolFailed`].
pub(crate) fn check_status(
    tool: &'static str,
    input: &Path,
    output: CommandOutput,
) -> Result<CommandOutput, Pdf2TiffError> {
    if output.success {
        Ok(output)
    } else {
        Err(Pdf2TiffError::ToolFailed {
            tool,
            input: input.to_path_buf(),
            code: output.code,
            stderr: output.stderr_tail(STDERR_TAIL_LINES),
        })
    }
}
