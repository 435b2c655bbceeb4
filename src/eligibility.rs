//! Which documents get converted.
//!
//! There is no job database: the `{stem}-NNN.tif` pages beside a PDF are the
//! only record that it was processed.

use glob::Pattern;
use std::path::{Path, PathBuf};

use crate::job::OUTLINED_SUFFIX;

fn output_matcher(stem: &str) -> Option<Pattern> {
    Pattern::new(&format!("{}-???.tif", Pattern::escape(stem))).ok()
}

/// Every `{stem}-???.tif` in `dir`, sorted by name.
pub fn converted_pages(dir: &Path, stem: &str) -> Vec<PathBuf> {
    let Some(matcher) = output_matcher(stem) else {
        return Vec::new();
    };
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut pages: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| matcher.matches(name))
        })
        .map(|entry| entry.path())
        .collect();
    pages.sort();
    pages
}

/// First existing output page of `pdf`, if it was already converted.
pub fn existing_output(pdf: &Path) -> Option<PathBuf> {
    let stem = pdf.file_stem()?.to_string_lossy();
    let dir = pdf.parent()?;
    converted_pages(dir, &stem).into_iter().next()
}

/// PDFs placed directly in a root are templates, never converted.
pub fn is_template(pdf: &Path, root: &Path) -> bool {
    pdf.parent() == Some(root)
}

/// A curve-only working copy left behind by an interrupted job: a
/// `{base}_outlined.pdf` whose `{base}.pdf` sits in the same directory.
///
/// A lone `*_outlined.pdf` is a customer document and gets converted.
pub fn is_intermediate(pdf: &Path) -> bool {
    let Some(base) = pdf
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.strip_suffix(OUTLINED_SUFFIX))
    else {
        return false;
    };
    let Some(Ok(entries)) = pdf.parent().map(std::fs::read_dir) else {
        return false;
    };
    entries.filter_map(Result::ok).any(|entry| {
        entry.file_name().to_str().is_some_and(|name| {
            name.len() == base.len() + 4
                && name.starts_with(base)
                && name[base.len()..].eq_ignore_ascii_case(".pdf")
        })
    })
}

/// `max(w/h, h/w)`, or `None` while either side is unknown.
pub fn aspect_ratio(width_cm: f64, height_cm: f64) -> Option<f64> {
    (width_cm > 0.0 && height_cm > 0.0).then(|| (width_cm / height_cm).max(height_cm / width_cm))
}
