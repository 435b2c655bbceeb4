//! Per-directory operator journals.
//!
//! * `log_pdfs_incorretos.txt`: append-only, one timestamped line per PDF
//!   the metadata tool could not open.
//! * `fontes-faltando.txt`: overwritten by every raster run that reported
//!   font problems; holds only the most recent job's warnings.

use crate::error::Pdf2TiffError;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::warn;

pub const INVALID_PDF_LOG: &str = "log_pdfs_incorretos.txt";
pub const MISSING_FONTS_LOG: &str = "fontes-faltando.txt";

/// Append `"<timestamp> - <file name>"` to the invalid-PDF journal in `dir`.
pub async fn record_invalid_pdf(dir: &Path, file_name: &str) -> Result<PathBuf, Pdf2TiffError> {
    let path = dir.join(INVALID_PDF_LOG);
    let line = format!(
        "{} - {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        file_name
    );

    let write = async {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    };
    write
        .await
        .map_err(|source| Pdf2TiffError::JournalWriteFailed {
            path: path.clone(),
            source,
        })?;

    warn!("Invalid PDF: {} (logged to {})", file_name, path.display());
    Ok(path)
}

/// Replace the font journal in `dir` with `lines`, one per line.
pub async fn record_missing_fonts(dir: &Path, lines: &[String]) -> Result<PathBuf, Pdf2TiffError> {
    let path = dir.join(MISSING_FONTS_LOG);
    let mut body = lines.join("\n");
    body.push('\n');
    tokio::fs::write(&path, body)
        .await
        .map_err(|source| Pdf2TiffError::JournalWriteFailed {
            path: path.clone(),
            source,
        })?;

    warn!("Missing fonts recorded in {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_pdf_log_appends() {
        let dir = tempfile::tempdir().unwrap();
        record_invalid_pdf(dir.path(), "a.pdf").await.unwrap();
        let path = record_invalid_pdf(dir.path(), "b.pdf").await.unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" - a.pdf"), "got: {}", lines[0]);
        assert!(lines[1].ends_with(" - b.pdf"), "got: {}", lines[1]);
        // "YYYY-mm-dd HH:MM:SS"
        assert_eq!(lines[0].find(" - "), Some(19));
    }

    #[tokio::test]
    async fn test_missing_fonts_log_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        record_missing_fonts(dir.path(), &["old warning".to_string()])
            .await
            .unwrap();
        let path = record_missing_fonts(dir.path(), &["Loading font X".to_string(), "substitute Y".to_string()])
            .await
            .unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content, "Loading font X\nsubstitute Y\n");
    }

    #[tokio::test]
    async fn test_unwritable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let err = record_invalid_pdf(&missing, "a.pdf").await.unwrap_err();
        assert!(matches!(err, Pdf2TiffError::JournalWriteFailed { .. }));
    }
}
