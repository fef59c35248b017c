//! Break-aware layout walk – runs over the live tree before capture,
//! pushing marked elements onto page boundaries.
//!
//! Two markers drive it:
//! - keep-together: the element must never straddle a page boundary; a
//!   blank spacer is inserted in front of it to push it onto its page.
//! - force-break: the element's height is stretched so everything after
//!   it starts on a fresh page.

use crate::config::ExportConfig;
use crate::element::{HeightStyle, LiveElement};

/// Extra headroom in source pixels added above a pushed keep-together
/// element.
pub const SPACER_TOP_MARGIN: f32 = 30.0;

/// Extra tail in source pixels added below a force-break element.
pub const BREAK_BOTTOM_MARGIN: f32 = 20.0;

/// Summary of one break pass.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakReport {
    /// One page height in source pixels, derived from the root's scroll
    /// width at the start of the pass.
    pub page_height: f32,
    /// The tracked page number after the walk (1 when nothing broke).
    pub pages: u32,
    /// Spacers inserted for keep-together elements.
    pub spacers_inserted: usize,
    /// Elements stretched by the force-break rule.
    pub forced_breaks: usize,
}

/// Walk all descendants of `root` in document order and apply both break
/// rules. The page counter starts at 1 on every call; page height is
/// rederived from the root's current scroll width, never carried over
/// from a previous export.
pub fn apply_breaks<E: LiveElement>(root: &E, config: &ExportConfig) -> BreakReport {
    let page_height = config.page_height_for_width(root.scroll_size().width);
    let mut walker = Walker {
        root: root.clone(),
        config,
        page_height,
        page: 1,
        spacers_inserted: 0,
        forced_breaks: 0,
    };

    if page_height > 0.0 {
        walker.walk(root);
    } else {
        log::warn!("root has no scroll width; skipping break pass");
    }

    let report = BreakReport {
        page_height,
        pages: walker.page,
        spacers_inserted: walker.spacers_inserted,
        forced_breaks: walker.forced_breaks,
    };
    log::debug!(
        "break pass: {} page(s), {} spacer(s), {} forced break(s)",
        report.pages,
        report.spacers_inserted,
        report.forced_breaks
    );
    report
}

struct Walker<'a, E: LiveElement> {
    root: E,
    config: &'a ExportConfig,
    page_height: f32,
    page: u32,
    spacers_inserted: usize,
    forced_breaks: usize,
}

impl<E: LiveElement> Walker<'_, E> {
    fn walk(&mut self, parent: &E) {
        let children = parent.children();
        for (index, child) in children.iter().enumerate() {
            let class = child.class_attr();
            // A node carrying both markers gets the keep-together rule
            // first, then the forced break, both effects applied.
            if has_marker(&class, &self.config.keep_together_class) {
                self.keep_together(parent, child, index + 1 == children.len());
            }
            if has_marker(&class, &self.config.force_break_class) {
                self.force_break(child);
            }
            if !child.children().is_empty() {
                self.walk(child);
            }
        }
    }

    /// Push a keep-together element down to the start of the page its
    /// bottom edge reaches into.
    fn keep_together(&mut self, parent: &E, node: &E, is_last_child: bool) {
        let root_top = self.root.bounding_rect().top;
        let rect = node.bounding_rect();
        let top_offset = rect.top - root_top;
        let bottom_offset = rect.bottom() - root_top;

        let current_page = (bottom_offset / self.page_height).ceil() as u32;
        if current_page <= self.page {
            return;
        }
        self.page = current_page;

        let spacer_height =
            self.page_height * (self.page - 1) as f32 - top_offset + SPACER_TOP_MARGIN;
        if is_last_child {
            parent.append_spacer(spacer_height);
        } else {
            parent.insert_spacer_before(node, spacer_height);
        }
        self.spacers_inserted += 1;
        log::debug!(
            "keep-together element at {top_offset}px pushed to page {} with a {spacer_height}px spacer",
            self.page
        );
    }

    /// Stretch a force-break element to the bottom of its page so the
    /// following content starts on the next one.
    fn force_break(&mut self, node: &E) {
        self.page += 1;
        let root_top = self.root.bounding_rect().top;
        let top_offset = node.bounding_rect().top - root_top;
        let consumed = top_offset % self.page_height;
        let remaining = self.page_height - consumed + BREAK_BOTTOM_MARGIN;
        node.set_inline_height(Some(HeightStyle::Px(remaining)));
        self.forced_breaks += 1;
        log::debug!("forced break at {top_offset}px, element stretched to {remaining}px");
    }
}

/// Marker matching is substring containment on the raw class attribute,
/// not token equality: a marker that is a substring of an unrelated class
/// name also matches.
fn has_marker(class_attr: &str, marker: &str) -> bool {
    class_attr.contains(marker)
}
