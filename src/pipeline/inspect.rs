//! Metadata inspection via `pdfinfo`.
//!
//! Every call is one fresh `pdfinfo` run; nothing is cached because the
//! orchestrator deliberately re-reads geometry from the outlined copy.
//! All helpers fail soft: a missing tool, a launch failure, a non-zero exit
//! or unparsable output all collapse to "unknown" (0 pages, 0 × 0 cm).

use crate::output::DocumentInfo;
use crate::policy;
use crate::runner::{CommandRunner, Invocation};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

/// Points → centimetres.
pub const CM_PER_POINT: f64 = 2.54 / 72.0;

static RE_PAGES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Pages:\s+(\d+)").unwrap());

static RE_PAGE_SIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Page size:\s+([0-9]*\.?[0-9]+)\s+x\s+([0-9]*\.?[0-9]+)\s+pts").unwrap()
});

/// Outcome of one `pdfinfo` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoProbe {
    /// The tool opened the file; its report is attached.
    Report(String),
    /// The tool ran but could not open the file.
    Failed { code: Option<i32> },
    /// No tool configured, or it could not be launched.
    Unavailable,
}

/// Run `pdfinfo <pdf>` once.
pub async fn probe<R: CommandRunner>(runner: &R, pdfinfo: Option<&Path>, pdf: &Path) -> InfoProbe {
    let Some(pdfinfo) = pdfinfo else {
        return InfoProbe::Unavailable;
    };
    let invocation = Invocation::new(pdfinfo).arg(pdf);
    match runner.run(&invocation).await {
        Ok(out) if out.success => InfoProbe::Report(out.stdout),
        Ok(out) => InfoProbe::Failed { code: out.code },
        Err(e) => {
            debug!("pdfinfo could not be launched: {}", e);
            InfoProbe::Unavailable
        }
    }
}

/// Page count, or 0 when unknown.
pub async fn page_count<R: CommandRunner>(runner: &R, pdfinfo: Option<&Path>, pdf: &Path) -> u32 {
    match probe(runner, pdfinfo, pdf).await {
        InfoProbe::Report(text) => parse_pages(&text).unwrap_or(0),
        _ => 0,
    }
}

/// First page's size in centimetres, or `(0.0, 0.0)` when unknown.
pub async fn page_size_cm<R: CommandRunner>(
    runner: &R,
    pdfinfo: Option<&Path>,
    pdf: &Path,
) -> (f64, f64) {
    match probe(runner, pdfinfo, pdf).await {
        InfoProbe::Report(text) => parse_page_size_cm(&text).unwrap_or((0.0, 0.0)),
        _ => (0.0, 0.0),
    }
}

/// Page count, size and the DPI the policy would pick, from a single run.
pub async fn inspect<R: CommandRunner>(runner: &R, pdfinfo: Option<&Path>, pdf: &Path) -> DocumentInfo {
    let (valid, text) = match probe(runner, pdfinfo, pdf).await {
        InfoProbe::Report(text) => (Some(true), text),
        InfoProbe::Failed { .. } => (Some(false), String::new()),
        InfoProbe::Unavailable => (None, String::new()),
    };
    let page_count = parse_pages(&text).unwrap_or(0);
    let (width_cm, height_cm) = parse_page_size_cm(&text).unwrap_or((0.0, 0.0));
    DocumentInfo {
        path: pdf.to_path_buf(),
        valid,
        page_count,
        width_cm,
        height_cm,
        resolution: policy::resolve_dpi(width_cm, height_cm),
    }
}

/// Value of the first `Pages:` line.
pub fn parse_pages(report: &str) -> Option<u32> {
    report
        .lines()
        .find_map(|line| RE_PAGES.captures(line.trim_end()))
        .and_then(|caps| caps[1].parse().ok())
}

/// First `Page size: <w> x <h> pts` line, converted to centimetres.
pub fn parse_page_size_cm(report: &str) -> Option<(f64, f64)> {
    let line = report.lines().find(|l| l.starts_with("Page size:"))?;
    let caps = RE_PAGE_SIZE.captures(line)?;
    let w: f64 = caps[1].parse().ok()?;
    let h: f64 = caps[2].parse().ok()?;
    Some((w * CM_PER_POINT, h * CM_PER_POINT))
}

#[cfg(test)]
mod tests {
    use super::*;

    const A4_REPORT: &str = "Title:          Flyer\n\
Creator:        Adobe InDesign\n\
Producer:       Adobe PDF Library\n\
Tagged:         no\n\
Pages:          2\n\
Encrypted:      no\n\
Page size:      595.276 x 841.89 pts (A4)\n\
Page rot:       0\n\
PDF version:    1.6\n";

    #[test]
    fn test_parse_pages() {
        assert_eq!(parse_pages(A4_REPORT), Some(2));
        assert_eq!(parse_pages("Title: x\n"), None);
        assert_eq!(parse_pages("Pages:   abc\n"), None);
    }

    #[test]
    fn test_parse_page_size_with_label() {
        let (w, h) = parse_page_size_cm(A4_REPORT).unwrap();
        assert!((w - 21.0).abs() < 0.01, "got {w}");
        assert!((h - 29.7).abs() < 0.01, "got {h}");
    }

    #[test]
    fn test_parse_page_size_without_label() {
        let (w, h) = parse_page_size_cm("Page size:      72 x 144 pts\n").unwrap();
        assert!((w - 2.54).abs() < 1e-9);
        assert!((h - 5.08).abs() < 1e-9);
    }

    #[test]
    fn test_parse_page_size_uses_first_line_only() {
        let report = "Page size: 72 x 72 pts\nPage size: 144 x 144 pts\n";
        let (w, _) = parse_page_size_cm(report).unwrap();
        assert!((w - 2.54).abs() < 1e-9);
    }

    #[test]
    fn test_parse_page_size_garbage() {
        assert_eq!(parse_page_size_cm("Page size: unknown\n"), None);
        assert_eq!(parse_page_size_cm(""), None);
    }

    #[test]
    fn test_parse_handles_crlf() {
        let report = "Pages:          7\r\nPage size:      72 x 72 pts\r\n";
        assert_eq!(parse_pages(report), Some(7));
        assert!(parse_page_size_cm(report).is_some());
    }
}
