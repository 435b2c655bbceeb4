//! Configuration types for the watch-and-rasterise pipeline.
//!
//! Everything the pipeline needs to know about its environment (which
//! folders to watch, where the external tools live, which ICC profiles to
//! convert through, and the product-line rules) sits in one immutable
//! [`ConverterConfig`], built once at start-up via [`ConverterConfigBuilder`]
//! and passed by reference into the scanner and the orchestrator.

use crate::error::Pdf2TiffError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Configuration for the directory scanner and the conversion orchestrator.
///
/// # Example
/// ```rust
/// use pdf2tiff::{ConverterConfig, ToolPaths};
/// use std::time::Duration;
///
/// let config = ConverterConfig::builder()
///     .root("/srv/print/cartao_de_visita")
///     .root("/srv/print/folhetos")
///     .tools(ToolPaths {
///         pdfinfo: Some("/usr/bin/pdfinfo".into()),
///         mutool: None,
///         ghostscript: Some("/usr/bin/gs".into()),
///         magick: Some("/usr/bin/magick".into()),
///     })
///     .icc_profiles("/srv/icc/sRGB.icc", "/srv/icc/USWebCoatedSWOP.icc")
///     .poll_interval(Duration::from_secs(30))
///     .build()
///     .unwrap();
/// assert_eq!(config.roots.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Directories scanned recursively. PDFs sitting directly inside a root
    /// are templates and are never converted.
    pub roots: Vec<PathBuf>,

    /// Locations of the external tools.
    pub tools: ToolPaths,

    /// Fixed RGB → CMYK colour conversion profiles handed to Ghostscript.
    pub icc: IccProfiles,

    /// Sleep between two full passes over all roots. Default: 10 s.
    pub poll_interval: Duration,

    /// Product-line rules (page-range marker, DPI override, aspect limit).
    pub rules: ProductRules,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            tools: ToolPaths::default(),
            icc: IccProfiles::default(),
            poll_interval: Duration::from_secs(10),
            rules: ProductRules::default(),
        }
    }
}

impl ConverterConfig {
    /// Create a new builder for `ConverterConfig`.
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder {
            config: Self::default(),
        }
    }

    /// Ghostscript binary. Always set on a built config.
    pub fn ghostscript(&self) -> &Path {
        self.tools.ghostscript.as_deref().unwrap_or(Path::new("gs"))
    }

    /// ImageMagick binary. Always set on a built config.
    pub fn magick(&self) -> &Path {
        self.tools.magick.as_deref().unwrap_or(Path::new("magick"))
    }
}

/// Paths of the four external collaborators.
///
/// `pdfinfo` and `mutool` are optional: without `pdfinfo` every document is
/// treated as valid with unknown geometry (300 DPI), without `mutool` the
/// outline stage is skipped. Ghostscript and ImageMagick are required.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolPaths {
    pub pdfinfo: Option<PathBuf>,
    pub mutool: Option<PathBuf>,
    pub ghostscript: Option<PathBuf>,
    pub magick: Option<PathBuf>,
}

impl ToolPaths {
    /// Look every tool up on `PATH`.
    pub fn discover() -> Self {
        Self {
            pdfinfo: which::which("pdfinfo").ok(),
            mutool: which::which("mutool").ok(),
            ghostscript: which::which("gs")
                .or_else(|_| which::which("gswin64c"))
                .ok(),
            magick: which::which("magick").ok(),
        }
    }

    /// Fill every unset entry from `PATH` discovery.
    pub fn or_discover(self) -> Self {
        let found = Self::discover();
        Self {
            pdfinfo: self.pdfinfo.or(found.pdfinfo),
            mutool: self.mutool.or(found.mutool),
            ghostscript: self.ghostscript.or(found.ghostscript),
            magick: self.magick.or(found.magick),
        }
    }

    /// Log which tools were resolved and warn about degraded features.
    pub fn log_availability(&self) {
        match &self.pdfinfo {
            Some(p) => info!("pdfinfo: {}", p.display()),
            None => warn!("pdfinfo not found: PDF validation disabled, every page rendered at 300 DPI"),
        }
        match &self.mutool {
            Some(p) => info!("mutool: {}", p.display()),
            None => warn!("mutool not found: text will not be converted to curves"),
        }
        if let Some(p) = &self.ghostscript {
            info!("ghostscript: {}", p.display());
        }
        if let Some(p) = &self.magick {
            info!("imagemagick: {}", p.display());
        }
    }
}

/// Input and output colour profiles for the raster stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IccProfiles {
    /// Profile assumed for untagged RGB content (`-sDefaultRGBProfile`).
    pub input_rgb: PathBuf,
    /// Press profile the raster is converted to (`-sOutputICCProfile`).
    pub output_cmyk: PathBuf,
}

/// Naming conventions of the print shop's product lines.
#[derive(Debug, Clone, Serialize)]
pub struct ProductRules {
    /// File-name marker (case-insensitive) of the digital-print line.
    pub first_page_marker: String,
    /// Documents of that line with more pages than this only render page 1.
    pub first_page_threshold: u32,
    /// Directory name of the sublimation product line.
    pub sublimation_dir: String,
    /// File-name marker (case-insensitive) of garment products.
    pub garment_marker: String,
    /// DPI forced on sublimation garments.
    pub garment_dpi: u32,
    /// Longest-to-shortest side ratio above which a document is skipped.
    pub max_aspect_ratio: f64,
}

impl Default for ProductRules {
    fn default() -> Self {
        Self {
            first_page_marker: "impressao-digital".to_string(),
            first_page_threshold: 16,
            sublimation_dir: "Sign - Sublimação".to_string(),
            garment_marker: "camisa".to_string(),
            garment_dpi: 100,
            max_aspect_ratio: 10.0,
        }
    }
}

/// Builder for [`ConverterConfig`].
#[derive(Debug)]
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.roots.push(root.into());
        self
    }

    pub fn roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.config.roots.extend(roots.into_iter().map(Into::into));
        self
    }

    pub fn tools(mut self, tools: ToolPaths) -> Self {
        self.config.tools = tools;
        self
    }

    pub fn icc_profiles(mut self, input_rgb: impl Into<PathBuf>, output_cmyk: impl Into<PathBuf>) -> Self {
        self.config.icc = IccProfiles {
            input_rgb: input_rgb.into(),
            output_cmyk: output_cmyk.into(),
        };
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn rules(mut self, rules: ProductRules) -> Self {
        self.config.rules = rules;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConverterConfig, Pdf2TiffError> {
        let c = &self.config;
        if c.roots.is_empty() {
            return Err(Pdf2TiffError::InvalidConfig(
                "at least one root directory is required".into(),
            ));
        }
        if c.tools.ghostscript.is_none() {
            return Err(Pdf2TiffError::InvalidConfig(
                "Ghostscript not found; set --ghostscript or put gs on PATH".into(),
            ));
        }
        if c.tools.magick.is_none() {
            return Err(Pdf2TiffError::InvalidConfig(
                "ImageMagick not found; set --magick or put magick on PATH".into(),
            ));
        }
        if c.icc.input_rgb.as_os_str().is_empty() || c.icc.output_cmyk.as_os_str().is_empty() {
            return Err(Pdf2TiffError::InvalidConfig(
                "both the RGB input and the CMYK output ICC profiles are required".into(),
            ));
        }
        if c.poll_interval.is_zero() {
            return Err(Pdf2TiffError::InvalidConfig(
                "poll interval must be greater than zero".into(),
            ));
        }
        if c.rules.garment_dpi == 0 {
            return Err(Pdf2TiffError::InvalidConfig("garment DPI must be ≥ 1".into()));
        }
        if c.rules.max_aspect_ratio.is_nan() || c.rules.max_aspect_ratio < 1.0 {
            return Err(Pdf2TiffError::InvalidConfig(format!(
                "aspect ratio limit must be ≥ 1, got {}",
                c.rules.max_aspect_ratio
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tools() -> ToolPaths {
        ToolPaths {
            pdfinfo: Some("/opt/poppler/pdfinfo".into()),
            mutool: None,
            ghostscript: Some("/opt/gs/gs".into()),
            magick: Some("/opt/im/magick".into()),
        }
    }

    fn valid() -> ConverterConfigBuilder {
        ConverterConfig::builder()
            .root("/srv/print/folhetos")
            .tools(tools())
            .icc_profiles("rgb.icc", "cmyk.icc")
    }

    #[test]
    fn build_valid_config() {
        let config = valid().build().unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.ghostscript(), Path::new("/opt/gs/gs"));
        assert_eq!(config.rules.first_page_threshold, 16);
        assert_eq!(config.rules.garment_dpi, 100);
    }

    #[test]
    fn build_requires_roots() {
        let err = ConverterConfig::builder()
            .tools(tools())
            .icc_profiles("rgb.icc", "cmyk.icc")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("root"));
    }

    #[test]
    fn build_requires_ghostscript() {
        let mut t = tools();
        t.ghostscript = None;
        let err = valid().tools(t).build().unwrap_err();
        assert!(err.to_string().contains("Ghostscript"));
    }

    #[test]
    fn build_requires_icc_profiles() {
        let err = ConverterConfig::builder()
            .root("/srv")
            .tools(tools())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("ICC"));
    }

    #[test]
    fn build_rejects_zero_interval() {
        assert!(valid().poll_interval(Duration::ZERO).build().is_err());
    }

    #[test]
    fn build_rejects_aspect_limit_below_one() {
        let rules = ProductRules {
            max_aspect_ratio: 0.5,
            ..ProductRules::default()
        };
        assert!(valid().rules(rules).build().is_err());
    }

    #[test]
    fn or_discover_keeps_explicit_paths() {
        let t = tools().or_discover();
        assert_eq!(t.ghostscript.as_deref(), Some(Path::new("/opt/gs/gs")));
        assert_eq!(t.pdfinfo.as_deref(), Some(Path::new("/opt/poppler/pdfinfo")));
    }
}
