//! Per-attempt state: the document being converted, the job parameters, and
//! the guard that owns its intermediate files.
//!
//! ## Why a drop guard?
//!
//! A job can end in many places: a controlled abort after validation, a
//! propagated tool failure, or success. Registering every intermediate path
//! with [`Intermediates`] before the tool that creates it runs means cleanup
//! happens when the guard is dropped, whichever way the job ends.

use crate::error::Pdf2TiffError;
use crate::output::PageRange;
use crate::policy::ResolutionDecision;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Suffix of the curve-only working copy.
pub const OUTLINED_SUFFIX: &str = "_outlined";
/// Suffix of the temporary multi-page raster.
pub const RASTER_SUFFIX: &str = "_gs";

/// A candidate PDF and the names derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub stem: String,
    pub parent: PathBuf,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, Pdf2TiffError> {
        let path = path.into();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty());
        let parent = path.parent().map(Path::to_path_buf);
        match (stem, parent) {
            (Some(stem), Some(parent)) => Ok(Self { path, stem, parent }),
            _ => Err(Pdf2TiffError::InvalidDocumentPath { path }),
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// `{stem}_outlined.pdf`
    pub fn outlined_path(&self) -> PathBuf {
        self.parent.join(format!("{}{OUTLINED_SUFFIX}.pdf", self.stem))
    }

    /// `{stem}_gs.tif`
    pub fn raster_path(&self) -> PathBuf {
        self.parent.join(format!("{}{RASTER_SUFFIX}.tif", self.stem))
    }

    /// `{stem}-%03d.tif`, expanded by ImageMagick per page. Any `%` of the
    /// directory or stem is doubled so only the page index is substituted.
    pub fn output_pattern(&self) -> PathBuf {
        escape_percent(&self.parent).join(format!("{}-%03d.tif", self.stem.replace('%', "%%")))
    }
}

/// Double every `%` so Ghostscript and ImageMagick read `path` literally
/// where they expect a printf-style output name.
pub fn escape_percent(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    if text.contains('%') {
        PathBuf::from(text.replace('%', "%%"))
    } else {
        path.to_path_buf()
    }
}

/// Everything the raster and tile stages need for one attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionJob {
    /// The original PDF, or its outlined copy.
    pub source: PathBuf,
    pub resolution: ResolutionDecision,
    pub page_range: PageRange,
    pub raster_tif: PathBuf,
    pub output_pattern: PathBuf,
}

/// Deletes the registered files when dropped. Missing files are ignored.
#[derive(Debug, Default)]
pub struct Intermediates {
    paths: Vec<PathBuf>,
}

impl Intermediates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `path`; it will be removed when the guard drops.
    pub fn register(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    /// Remove leftovers of an attempt that died before its cleanup ran.
    pub fn clear_stale(document: &Document) {
        for stale in [document.outlined_path(), document.raster_path()] {
            if stale.exists() {
                warn!("Removing stale intermediate {}", stale.display());
                remove_quietly(&stale);
            }
        }
    }
}

impl Drop for Intermediates {
    fn drop(&mut self) {
        for path in self.paths.drain(..) {
            remove_quietly(&path);
        }
    }
}

fn remove_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_names() {
        let doc = Document::new("/jobs/pedido-12/Cartao Frente.pdf").unwrap();
        assert_eq!(doc.stem, "Cartao Frente");
        assert_eq!(doc.parent, PathBuf::from("/jobs/pedido-12"));
        assert_eq!(doc.file_name(), "Cartao Frente.pdf");
        assert_eq!(
            doc.outlined_path(),
            PathBuf::from("/jobs/pedido-12/Cartao Frente_outlined.pdf")
        );
        assert_eq!(
            doc.raster_path(),
            PathBuf::from("/jobs/pedido-12/Cartao Frente_gs.tif")
        );
        assert_eq!(
            doc.output_pattern(),
            PathBuf::from("/jobs/pedido-12/Cartao Frente-%03d.tif")
        );
    }

    #[test]
    fn test_percent_in_names_is_escaped() {
        let doc = Document::new("/jobs/50% off/desconto 50%.pdf").unwrap();
        assert_eq!(doc.stem, "desconto 50%");
        assert_eq!(
            doc.output_pattern(),
            PathBuf::from("/jobs/50%% off/desconto 50%%-%03d.tif")
        );
        assert_eq!(
            escape_percent(&doc.raster_path()),
            PathBuf::from("/jobs/50%% off/desconto 50%%_gs.tif")
        );
        // real files keep their single `%`
        assert_eq!(doc.raster_path(), PathBuf::from("/jobs/50% off/desconto 50%_gs.tif"));
        assert_eq!(escape_percent(Path::new("/jobs/a.tif")), PathBuf::from("/jobs/a.tif"));
    }

    #[test]
    fn test_document_rejects_bare_root() {
        assert!(Document::new("/").is_err());
    }

    #[test]
    fn test_guard_removes_registered_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a_gs.tif");
        let b = dir.path().join("a_outlined.pdf");
        std::fs::write(&a, b"tif").unwrap();
        std::fs::write(&b, b"pdf").unwrap();
        {
            let mut guard = Intermediates::new();
            guard.register(&a);
            guard.register(&b);
            guard.register(dir.path().join("never-created.tif"));
        }
        assert!(!a.exists());
        assert!(!b.exists());
    }

    #[test]
    fn test_clear_stale() {
        let dir = tempfile::tempdir().unwrap();
        let doc = Document::new(dir.path().join("banner.pdf")).unwrap();
        std::fs::write(doc.raster_path(), b"old").unwrap();
        Intermediates::clear_stale(&doc);
        assert!(!doc.raster_path().exists());
    }
}
