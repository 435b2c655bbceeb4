//! Resolution policy: physical page area → raster DPI.
//!
//! Small pieces (business cards, flyers) get a high DPI that falls off with
//! the logarithm of the area; large-format prints (> 2500 cm², roughly
//! 50 × 50 cm) are snapped to one of the shop's standard tiers. Named
//! product-line overrides and the page-range rule are applied on top by the
//! orchestrator because they depend on the path, not on geometry.

use crate::config::ProductRules;
use crate::output::PageRange;
use serde::Serialize;
use std::ffi::OsStr;
use std::path::Path;
use tracing::warn;

/// DPI used whenever the geometry is unknown or unusable.
pub const DEFAULT_DPI: u32 = 300;

/// Area above which the DPI is snapped to [`PRINT_TIERS`].
pub const LARGE_FORMAT_AREA_CM2: f64 = 2500.0;

/// Production DPI tiers for large-format output, in tie-break order.
pub const PRINT_TIERS: [u32; 3] = [150, 100, 50];

/// Distance from a tier that still counts as an exact match.
pub const TIER_TOLERANCE: u32 = 5;

/// Above this the formula is still followed, but loudly: pages barely larger
/// than 1 cm² yield tens of thousands of DPI.
pub const SUSPICIOUS_DPI: u32 = 1200;

/// Why a DPI was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DpiReason {
    #[serde(rename = "default300")]
    Default300,
    AreaScaled,
    ClampedToNearestTier,
    OverrideSublimationShirt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolutionDecision {
    pub dpi: u32,
    pub reason: DpiReason,
}

impl ResolutionDecision {
    const fn default300() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            reason: DpiReason::Default300,
        }
    }
}

/// Pick the DPI for a page of `width_cm` × `height_cm`.
///
/// Areas of 1 cm² or less (including unknown 0 × 0 geometry) get
/// [`DEFAULT_DPI`]: `log10` is not positive there.
pub fn resolve_dpi(width_cm: f64, height_cm: f64) -> ResolutionDecision {
    let area = width_cm * height_cm;
    // NaN falls through here as well
    if !(area > 1.0) {
        return ResolutionDecision::default300();
    }

    let Some(raw) = checked_dpi((300.0 / area.log10()).round()) else {
        warn!(
            "DPI for {:.4} cm² does not fit a u32, using {}",
            area, DEFAULT_DPI
        );
        return ResolutionDecision::default300();
    };
    if raw > SUSPICIOUS_DPI {
        warn!("{:.4} cm² page resolves to {} DPI", area, raw);
    }

    if area > LARGE_FORMAT_AREA_CM2 {
        ResolutionDecision {
            dpi: snap_to_tier(raw),
            reason: DpiReason::ClampedToNearestTier,
        }
    } else {
        ResolutionDecision {
            dpi: raw.max(1),
            reason: DpiReason::AreaScaled,
        }
    }
}

fn checked_dpi(value: f64) -> Option<u32> {
    (value.is_finite() && value >= 0.0 && value <= f64::from(u32::MAX)).then(|| value as u32)
}

/// Nearest of [`PRINT_TIERS`], where anything within [`TIER_TOLERANCE`]
/// counts as distance zero. Ties go to the tier listed first.
pub fn snap_to_tier(raw: u32) -> u32 {
    PRINT_TIERS
        .iter()
        .copied()
        .min_by_key(|&tier| raw.abs_diff(tier).saturating_sub(TIER_TOLERANCE))
        .unwrap_or(DEFAULT_DPI)
}

/// Apply the sublimation-garment override to a geometric decision.
pub fn apply_overrides(
    decision: ResolutionDecision,
    pdf: &Path,
    stem: &str,
    rules: &ProductRules,
) -> ResolutionDecision {
    let in_sublimation_line = pdf
        .components()
        .any(|c| c.as_os_str() == OsStr::new(&rules.sublimation_dir));
    let is_garment = contains_ignore_case(stem, &rules.garment_marker);

    if in_sublimation_line && is_garment {
        ResolutionDecision {
            dpi: rules.garment_dpi,
            reason: DpiReason::OverrideSublimationShirt,
        }
    } else {
        decision
    }
}

/// Long digital-print runs only get their first page rendered.
pub fn page_range(stem: &str, page_count: u32, rules: &ProductRules) -> PageRange {
    if contains_ignore_case(stem, &rules.first_page_marker) && page_count > rules.first_page_threshold {
        PageRange::FirstPageOnly
    } else {
        PageRange::All
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
