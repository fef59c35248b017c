//! Page slicing – turns one captured bitmap into per-page embed placements.
//!
//! The core trick: the full bitmap is the source of every embed. Each page
//! places the same oversized image with a placement y one page-height more
//! negative than the previous page, so the page's physical boundary exposes
//! a different vertical band. No pixel cropping happens anywhere.

use crate::config::ExportConfig;
use crate::plan::{ExportPlan, ImageEmbed};

/// Fixed right margin in points. Embeds are inset by half of it on the
/// left and narrowed by the whole of it.
pub const RIGHT_MARGIN_PT: f32 = 10.0;

/// Compute embed placements for a captured bitmap of the given pixel
/// dimensions.
///
/// The per-page height in bitmap pixels is derived from the current
/// bitmap width on every call; a document always has at least one page.
pub fn slice(pixel_width: u32, pixel_height: u32, config: &ExportConfig) -> ExportPlan {
    let content_width = pixel_width as f32;
    let content_height = pixel_height as f32;

    let mut plan = ExportPlan {
        page_width: config.page_width,
        page_height: config.page_height,
        source_width: pixel_width,
        source_height: pixel_height,
        page_height_in_source: 0.0,
        page_count: 1,
        embeds: Vec::new(),
    };

    if content_width <= 0.0 {
        log::warn!("capture has no width; emitting a single blank page");
        return plan;
    }

    // One page height in bitmap pixels, from the current bitmap width.
    let page_height_in_source = config.page_height_for_width(content_width);
    plan.page_height_in_source = page_height_in_source;

    let embed_x = RIGHT_MARGIN_PT / 2.0;
    let embed_width = config.page_width - RIGHT_MARGIN_PT;
    let embed_height = config.page_width / content_width * content_height;

    if content_height < page_height_in_source {
        // Fits on one page.
        plan.embeds.push(ImageEmbed {
            page: 1,
            x: embed_x,
            y: 0.0,
            width: embed_width,
            height: embed_height,
        });
    } else {
        let mut remaining = content_height;
        let mut position = 0.0f32;
        let mut page = 1u32;
        while remaining > 0.0 {
            plan.embeds.push(ImageEmbed {
                page,
                x: embed_x,
                y: position,
                width: embed_width,
                height: embed_height,
            });
            remaining -= page_height_in_source;
            position -= config.page_height;
            // A further page only when content actually remains, so the
            // final iteration never leaves a trailing blank page.
            if remaining > 0.0 {
                page += 1;
            }
        }
        plan.page_count = page;
    }

    log::debug!(
        "sliced {}x{}px capture into {} page(s), {} embed(s)",
        pixel_width,
        pixel_height,
        plan.page_count,
        plan.embeds.len()
    );
    plan
}
