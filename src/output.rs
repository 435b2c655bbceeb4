//! Result types produced by the pipeline.

use crate::error::SkipReason;
use crate::policy::ResolutionDecision;
use serde::Serialize;
use std::path::PathBuf;

/// What `pdfinfo` told us about one document (inspect-only mode).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub path: PathBuf,
    /// `None` when no metadata tool is available.
    pub valid: Option<bool>,
    /// 0 when unknown.
    pub page_count: u32,
    /// 0 when unknown.
    pub width_cm: f64,
    /// 0 when unknown.
    pub height_cm: f64,
    /// DPI the resolution policy picks for this geometry (before overrides).
    pub resolution: ResolutionDecision,
}

/// Which pages the raster stage renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PageRange {
    #[default]
    All,
    FirstPageOnly,
}

/// Result of one successful conversion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionReport {
    pub pdf: PathBuf,
    pub resolution: ResolutionDecision,
    pub page_range: PageRange,
    /// Whether the text was converted to curves before rendering.
    pub outlined: bool,
    /// `{stem}-NNN.tif` files now beside the PDF, sorted.
    pub pages: Vec<PathBuf>,
    /// Number of font warnings written to the font journal.
    pub font_warnings: usize,
    pub duration_ms: u64,
}

/// What happened to one document.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ConversionOutcome {
    Converted(ConversionReport),
    Skipped(SkipReason),
}

/// Counters for one pass over all roots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    /// PDFs found below the roots (templates excluded).
    pub candidates: usize,
    /// PDFs sitting directly inside a root.
    pub templates: usize,
    pub already_converted: usize,
    pub converted: usize,
    /// Controlled aborts (invalid PDF, aspect ratio).
    pub skipped: usize,
    pub failed: usize,
}
