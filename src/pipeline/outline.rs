//! Text-to-curves flattening via `mutool clean -gg`.
//!
//! Rendering machines rarely have every font a customer embedded or
//! referenced. Flattening glyphs into vector paths first means Ghostscript
//! never has to substitute a font.

use super::{check_status, launch};
use crate::error::Pdf2TiffError;
use crate::runner::{CommandRunner, Invocation};
use std::path::Path;
use tracing::info;

/// Command line for flattening `input` into `output`.
pub fn outline_invocation(mutool: &Path, input: &Path, output: &Path) -> Invocation {
    Invocation::new(mutool)
        .args(["clean", "-gg"])
        .arg(input)
        .arg(output)
}

/// Write a curve-only copy of `input` to `output`.
///
/// Any failure is fatal for the document.
pub async fn outline<R: CommandRunner>(
    runner: &R,
    mutool: &Path,
    input: &Path,
    output: &Path,
) -> Result<(), Pdf2TiffError> {
    let invocation = outline_invocation(mutool, input, output);
    let result = launch(runner, "mutool", &invocation).await?;
    check_status("mutool", input, result)?;
    info!(
        "Text converted to curves: {}",
        output.file_name().unwrap_or_default().to_string_lossy()
    );
    Ok(())
}
