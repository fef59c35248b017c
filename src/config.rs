//! Export configuration – per-session page geometry, break-marker classes,
//! and output naming captured when the exporter is constructed.

/// Page orientation forwarded to the document engine.
///
/// Orientation affects only the physical page geometry; the slicing
/// arithmetic always runs against the configured width/height as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Portrait mode: height > width (default).
    #[default]
    Portrait,
    /// Landscape mode: width > height.
    Landscape,
}

impl Orientation {
    /// Parse the accepted spellings: `"p"`, `"portrait"`, `"l"`, `"landscape"`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "p" | "portrait" => Some(Orientation::Portrait),
            "l" | "landscape" => Some(Orientation::Landscape),
            _ => None,
        }
    }
}

/// Configuration for one export session.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Output file name without extension (default: "document").
    pub file_name: String,
    /// Page width in points (default: 595).
    pub page_width: f32,
    /// Page height in points (default: 842).
    pub page_height: f32,
    /// Page orientation passed through to the document engine.
    pub orientation: Orientation,
    /// Marker class for elements that must never straddle a page boundary
    /// (default: "itemClass").
    pub keep_together_class: String,
    /// Marker class for elements that force a page break (default:
    /// "break_page").
    pub force_break_class: String,
    /// Whether scrollable descendants are expanded before capture
    /// (default: true). When false no scroll snapshots are taken at all.
    pub expand_scrollables: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "document".to_string(),
            page_width: 595.0,
            page_height: 842.0,
            orientation: Orientation::Portrait,
            keep_together_class: "itemClass".to_string(),
            force_break_class: "break_page".to_string(),
            expand_scrollables: true,
        }
    }
}

impl ExportConfig {
    /// Legacy one-argument construction form: everything defaulted except
    /// the output file name.
    pub fn with_file_name(name: &str) -> Self {
        Self {
            file_name: name.to_string(),
            ..Self::default()
        }
    }

    /// Create a landscape config with all other defaults.
    pub fn landscape() -> Self {
        Self {
            orientation: Orientation::Landscape,
            ..Self::default()
        }
    }

    /// Page height expressed in the units of a content strip of the given
    /// width, keeping the page's aspect ratio.
    ///
    /// Used with the root's scroll width before capture and with the
    /// bitmap's pixel width after capture; it is recomputed from the
    /// current width every time, never cached across exports.
    pub fn page_height_for_width(&self, content_width: f32) -> f32 {
        content_width / self.page_width * self.page_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_options() {
        let config = ExportConfig::default();
        assert_eq!(config.file_name, "document");
        assert_eq!(config.page_width, 595.0);
        assert_eq!(config.page_height, 842.0);
        assert_eq!(config.orientation, Orientation::Portrait);
        assert_eq!(config.keep_together_class, "itemClass");
        assert_eq!(config.force_break_class, "break_page");
        assert!(config.expand_scrollables);
    }

    #[test]
    fn orientation_accepts_all_four_spellings() {
        assert_eq!(Orientation::parse("p"), Some(Orientation::Portrait));
        assert_eq!(Orientation::parse("portrait"), Some(Orientation::Portrait));
        assert_eq!(Orientation::parse("l"), Some(Orientation::Landscape));
        assert_eq!(Orientation::parse("landscape"), Some(Orientation::Landscape));
        assert_eq!(Orientation::parse("sideways"), None);
    }

    #[test]
    fn page_height_scales_with_content_width() {
        let config = ExportConfig::default();
        // Bitmap twice as wide as the page: one page covers twice the pixels.
        assert_eq!(config.page_height_for_width(1190.0), 1684.0);
        assert_eq!(config.page_height_for_width(595.0), 842.0);
    }

    #[test]
    fn file_name_constructor_keeps_other_defaults() {
        let config = ExportConfig::with_file_name("quarterly-report");
        assert_eq!(config.file_name, "quarterly-report");
        assert_eq!(config.page_width, 595.0);
        assert!(config.expand_scrollables);
    }
}
