//! Export plan – the serialisable intermediate representation between the
//! slicing pass and the document builder. One captured bitmap produces one
//! plan; the orchestrator replays the plan into a document engine.

use serde::{Deserialize, Serialize};

/// Placement of the full-bitmap embed on one page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageEmbed {
    /// 1-based page the embed is placed on.
    pub page: u32,
    /// Horizontal placement in points (half the fixed right margin).
    pub x: f32,
    /// Vertical placement in points: 0 on the first page, then one page
    /// height more negative per page, so each page's physical window
    /// exposes the next band of the same oversized image.
    pub y: f32,
    /// Embed width in points.
    pub width: f32,
    /// Embed height in points (the full bitmap scaled to page width).
    pub height: f32,
}

/// Start of one page's visible window in the source bitmap.
///
/// Derived from the plan on demand, never persisted across exports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PageBoundary {
    /// 1-based page index.
    pub page: u32,
    /// Vertical pixel offset into the source bitmap where the page's
    /// window starts.
    pub source_offset: f32,
}

/// Complete slicing outcome for one captured bitmap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportPlan {
    /// Page width in points, as configured (not orientation-swapped).
    pub page_width: f32,
    /// Page height in points, as configured.
    pub page_height: f32,
    /// Pixel width of the source bitmap the plan was computed from.
    pub source_width: u32,
    /// Pixel height of the source bitmap.
    pub source_height: u32,
    /// One page height expressed in source bitmap pixels.
    pub page_height_in_source: f32,
    /// Total page count.
    pub page_count: u32,
    /// Embeds in page order, one per page (none for the degenerate
    /// blank-page plan).
    pub embeds: Vec<ImageEmbed>,
}

impl ExportPlan {
    /// Visible-window starts for every page of the plan.
    pub fn boundaries(&self) -> Vec<PageBoundary> {
        (1..=self.page_count)
            .map(|page| PageBoundary {
                page,
                source_offset: (page - 1) as f32 * self.page_height_in_source,
            })
            .collect()
    }

    /// Serialise to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| e.to_string())
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| e.to_string())
    }
}
