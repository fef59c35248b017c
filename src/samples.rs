//! Sample scenes for testing and demonstration.
//!
//! Each scene exercises a different part of the pipeline: keep-together
//! rows, forced breaks, and scrolled panels.

use crate::element::Overflow;
use crate::tree::SceneNode;

/// Look a sample scene up by name.
pub fn sample(name: &str) -> Option<SceneNode> {
    match name {
        "report" => Some(report()),
        "ledger" => Some(ledger()),
        "dashboard" => Some(dashboard()),
        _ => None,
    }
}

pub const SAMPLE_NAMES: [&str; 3] = ["report", "ledger", "dashboard"];

/// Multi-page report whose summary rows are marked keep-together, so
/// rows landing on a page boundary get pushed to the next page.
pub fn report() -> SceneNode {
    let mut root = SceneNode::root(595.0)
        .with_child(
            SceneNode::block()
                .with_label("masthead")
                .with_content_height(120.0)
                .with_background([26, 54, 93]),
        )
        .with_child(
            SceneNode::block()
                .with_label("executive-summary")
                .with_content_height(560.0),
        );
    for quarter in 1..=6 {
        let shade = if quarter % 2 == 0 {
            [237, 242, 247]
        } else {
            [255, 255, 255]
        };
        root = root.with_child(
            SceneNode::block()
                .with_label("summary-row")
                .with_class("itemClass")
                .with_content_height(150.0)
                .with_background(shade),
        );
    }
    root
}

/// Ledger of sections separated by forced page breaks: every section
/// after a break starts at the top of a fresh page.
pub fn ledger() -> SceneNode {
    let mut root = SceneNode::root(595.0);
    for (i, height) in [520.0, 340.0, 610.0].iter().enumerate() {
        root = root
            .with_child(
                SceneNode::block()
                    .with_label("section-heading")
                    .with_content_height(60.0)
                    .with_background([203, 213, 224]),
            )
            .with_child(
                SceneNode::block()
                    .with_label("section-body")
                    .with_content_height(*height),
            );
        if i < 2 {
            root = root.with_child(
                SceneNode::block()
                    .with_label("page-divider")
                    .with_class("break_page")
                    .with_content_height(2.0),
            );
        }
    }
    root
}

/// Dashboard with an event feed that scrolls independently; exporting
/// it exercises scroll expansion and restoration.
pub fn dashboard() -> SceneNode {
    let mut feed = SceneNode::block()
        .with_label("event-feed")
        .with_height(240.0)
        .with_overflow_y(Overflow::Auto)
        .with_scroll_top(120.0);
    for i in 0..10 {
        let shade = 240 - (i as u8) * 12;
        feed = feed.with_child(
            SceneNode::block()
                .with_label("event")
                .with_content_height(80.0)
                .with_background([shade, shade, 255]),
        );
    }
    SceneNode::root(595.0)
        .with_child(
            SceneNode::block()
                .with_label("status-bar")
                .with_content_height(80.0)
                .with_background([26, 54, 93]),
        )
        .with_child(feed)
        .with_child(
            SceneNode::block()
                .with_label("footer")
                .with_content_height(100.0)
                .with_background([237, 242, 247]),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::LiveElement;
    use crate::scroll::expand_scrollables;

    #[test]
    fn every_sample_name_resolves() {
        for name in SAMPLE_NAMES {
            assert!(sample(name).is_some(), "missing sample {name}");
        }
        assert!(sample("brochure").is_none());
    }

    #[test]
    fn report_rows_carry_the_keep_together_marker() {
        let rows = report()
            .children()
            .iter()
            .filter(|c| c.class_attr().contains("itemClass"))
            .count();
        assert_eq!(rows, 6);
    }

    #[test]
    fn ledger_has_two_forced_breaks() {
        let breaks = ledger()
            .children()
            .iter()
            .filter(|c| c.class_attr().contains("break_page"))
            .count();
        assert_eq!(breaks, 2);
    }

    #[test]
    fn dashboard_feed_scrolls_independently() {
        let root = dashboard();
        let feed = root.children()[1].clone();
        assert!(feed.scroll_size().height > feed.client_size().height);
        assert_eq!(feed.scroll_offset().y, 120.0);
    }

    #[test]
    fn dashboard_expansion_crosses_a_page_boundary() {
        let root = dashboard();
        assert_eq!(root.scroll_size().height, 420.0);

        // Expanded, the feed's revealed events must push the root past
        // one 842pt page so exports exercise the multi-page path.
        let restorer = expand_scrollables(&root).unwrap();
        assert_eq!(restorer.len(), 1);
        assert_eq!(root.scroll_size().height, 880.0);

        restorer.restore();
        assert_eq!(root.scroll_size().height, 420.0);
    }
}
