//! Error types for the pdf2tiff library.
//!
//! Two distinct types reflect two distinct outcomes:
//!
//! * [`Pdf2TiffError`]: **Fatal for the current document**: an external tool
//!   could not be launched or exited non-zero, a journal file could not be
//!   written, or the configuration is unusable. Returned as `Err` from
//!   [`crate::convert::convert_document`]; the scanner logs it and moves on to
//!   the next document.
//!
//! * [`SkipReason`]: **Expected**: the document is already converted, cannot
//!   be opened, or has a disallowed shape. Carried inside
//!   [`crate::output::ConversionOutcome::Skipped`], never raised.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the conversion of one document (or start-up).
#[derive(Debug, Error)]
pub enum Pdf2TiffError {
    // ── External tools ────────────────────────────────────────────────────
    /// The tool binary could not be spawned at all.
    #[error("Failed to launch {tool} at '{path}': {source}")]
    ToolLaunch {
        tool: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but reported failure.
    #[error("{tool} exited with {} while processing '{input}'\n{stderr}", exit_label(.code))]
    ToolFailed {
        tool: &'static str,
        input: PathBuf,
        code: Option<i32>,
        /// Last few lines of the tool's standard error.
        stderr: String,
    },

    // ── Filesystem ────────────────────────────────────────────────────────
    /// The path has no file stem or no parent directory.
    #[error("Not a usable document path: '{path}'")]
    InvalidDocumentPath { path: PathBuf },

    /// A per-directory journal file could not be written.
    #[error("Failed to write journal '{path}': {source}")]
    JournalWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a blocking task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Why a document was left alone this cycle.
///
/// None of these leave a persistent marker: the document is looked at again
/// on the next scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum SkipReason {
    /// At least one `{stem}-???.tif` already sits beside the PDF.
    AlreadyConverted { existing: PathBuf },
    /// The metadata tool could not open the working copy.
    InvalidPdf { code: Option<i32> },
    /// Page is too elongated for production printing.
    AspectRatio { ratio: f64, limit: f64 },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::AlreadyConverted { existing } => {
                write!(f, "already converted ({})", existing.display())
            }
            SkipReason::InvalidPdf { .. } => write!(f, "invalid PDF"),
            SkipReason::AspectRatio { ratio, limit } => {
                write!(f, "aspect ratio {ratio:.1}:1 > {limit}:1")
            }
        }
    }
}
