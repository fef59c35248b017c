//! Scroll state management – discovers descendants whose content is
//! clipped or scrolled out of view, neutralizes the clipping so the full
//! content renders in natural flow position, and restores the original
//! state exactly once per export attempt.

use crate::element::{Axis, LiveElement, OverflowStyle, ScrollOffset};
use crate::error::Result;

/// Captured pre-export state of one scrollable element.
#[derive(Debug, Clone)]
pub struct ScrollSnapshot<E: LiveElement> {
    /// Handle to the element the state belongs to.
    pub element: E,
    /// Scroll offsets at capture time.
    pub offset: ScrollOffset,
    /// Inline overflow values at capture time.
    pub overflow: OverflowStyle,
}

impl<E: LiveElement> ScrollSnapshot<E> {
    fn capture(element: &E) -> Self {
        Self {
            element: element.clone(),
            offset: element.scroll_offset(),
            overflow: element.inline_overflow(),
        }
    }

    fn write_back(&self) {
        self.element.set_inline_overflow(self.overflow);
        self.element.set_scroll_offset(self.offset);
    }
}

/// Restoration guard over the snapshots taken by one expansion pass.
///
/// Consuming [`restore`](Self::restore) writes every snapshot back in
/// capture order; snapshots are drained as they are written, so the
/// write-back happens exactly once even though dropping an unrestored
/// guard also writes back. Call `restore` explicitly on both the success
/// and the failure path so the release point stays visible.
#[derive(Debug)]
pub struct ScrollRestorer<E: LiveElement> {
    snapshots: Vec<ScrollSnapshot<E>>,
}

impl<E: LiveElement> ScrollRestorer<E> {
    fn new(snapshots: Vec<ScrollSnapshot<E>>) -> Self {
        Self { snapshots }
    }

    /// A guard with nothing to restore, used when expansion is disabled.
    pub fn empty() -> Self {
        Self {
            snapshots: Vec::new(),
        }
    }

    /// Number of snapshots held.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// The held snapshots, in capture order.
    pub fn snapshots(&self) -> &[ScrollSnapshot<E>] {
        &self.snapshots
    }

    /// Write all captured state back to the referenced elements.
    pub fn restore(mut self) {
        self.write_back_all();
    }

    fn write_back_all(&mut self) {
        let count = self.snapshots.len();
        for snapshot in self.snapshots.drain(..) {
            snapshot.write_back();
        }
        if count > 0 {
            log::debug!("restored scroll state of {} element(s)", count);
        }
    }
}

impl<E: LiveElement> Drop for ScrollRestorer<E> {
    fn drop(&mut self) {
        self.write_back_all();
    }
}

/// Walk the subtree rooted at `root` (root included) in document order,
/// snapshot every scrollable element, then expand it: overflow visible on
/// all axes and scroll offsets reset to the origin.
///
/// If classification fails partway, the snapshots taken so far are written
/// back before the error is returned, so a failed expansion never leaves
/// the tree half-mutated.
pub fn expand_scrollables<E: LiveElement>(root: &E) -> Result<ScrollRestorer<E>> {
    let mut snapshots = Vec::new();
    match visit(root, &mut snapshots) {
        Ok(()) => {
            log::debug!("expanded {} scrollable element(s)", snapshots.len());
            Ok(ScrollRestorer::new(snapshots))
        }
        Err(err) => {
            ScrollRestorer::new(snapshots).restore();
            Err(err)
        }
    }
}

fn visit<E: LiveElement>(node: &E, snapshots: &mut Vec<ScrollSnapshot<E>>) -> Result<()> {
    if is_scrollable(node)? {
        snapshots.push(ScrollSnapshot::capture(node));
        node.set_inline_overflow(OverflowStyle::visible_all());
        node.set_scroll_offset(ScrollOffset::origin());
    }
    for child in node.children() {
        visit(&child, snapshots)?;
    }
    Ok(())
}

/// An element is scrollable iff its content extent exceeds its client
/// extent in an axis AND its resolved overflow for that axis hides the
/// excess. The style is read before the extent comparison, as a host may
/// fail the read for any element, overflowing or not.
fn is_scrollable<E: LiveElement>(node: &E) -> Result<bool> {
    let overflow_x = node.resolved_overflow(Axis::Horizontal)?;
    let overflow_y = node.resolved_overflow(Axis::Vertical)?;
    let scroll = node.scroll_size();
    let client = node.client_size();
    Ok((scroll.height > client.height && overflow_y.clips())
        || (scroll.width > client.width && overflow_x.clips()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Extent, HeightStyle, Overflow, Rect};
    use crate::error::Error;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Minimal element double: fixed geometry, mutable style state, and an
    /// optional poisoned computed-style read.
    #[derive(Debug, Clone)]
    struct StubElement {
        state: Rc<RefCell<StubState>>,
    }

    #[derive(Debug)]
    struct StubState {
        children: Vec<StubElement>,
        client: Extent,
        scroll: Extent,
        offset: ScrollOffset,
        inline_overflow: OverflowStyle,
        base_overflow_x: Overflow,
        base_overflow_y: Overflow,
        unreadable_style: bool,
    }

    impl StubElement {
        fn new(client: Extent, scroll: Extent) -> Self {
            Self {
                state: Rc::new(RefCell::new(StubState {
                    children: Vec::new(),
                    client,
                    scroll,
                    offset: ScrollOffset::default(),
                    inline_overflow: OverflowStyle::default(),
                    base_overflow_x: Overflow::Visible,
                    base_overflow_y: Overflow::Visible,
                    unreadable_style: false,
                })),
            }
        }

        fn plain(height: f32) -> Self {
            let size = Extent::new(400.0, height);
            Self::new(size, size)
        }

        fn with_overflow(self, x: Overflow, y: Overflow) -> Self {
            {
                let mut state = self.state.borrow_mut();
                state.base_overflow_x = x;
                state.base_overflow_y = y;
            }
            self
        }

        fn with_scroll_offset(self, offset: ScrollOffset) -> Self {
            self.state.borrow_mut().offset = offset;
            self
        }

        fn poison_style(self) -> Self {
            self.state.borrow_mut().unreadable_style = true;
            self
        }

        fn add_child(&self, child: &StubElement) {
            self.state.borrow_mut().children.push(child.clone());
        }
    }

    impl LiveElement for StubElement {
        fn children(&self) -> Vec<Self> {
            self.state.borrow().children.clone()
        }

        fn class_attr(&self) -> String {
            String::new()
        }

        fn client_size(&self) -> Extent {
            self.state.borrow().client
        }

        fn scroll_size(&self) -> Extent {
            self.state.borrow().scroll
        }

        fn scroll_offset(&self) -> ScrollOffset {
            self.state.borrow().offset
        }

        fn set_scroll_offset(&self, offset: ScrollOffset) {
            self.state.borrow_mut().offset = offset;
        }

        fn resolved_overflow(&self, axis: Axis) -> Result<Overflow> {
            let state = self.state.borrow();
            if state.unreadable_style {
                return Err(Error::ScrollProcessing("unreadable style".into()));
            }
            let inline = match axis {
                Axis::Horizontal => state.inline_overflow.x,
                Axis::Vertical => state.inline_overflow.y,
            };
            let base = match axis {
                Axis::Horizontal => state.base_overflow_x,
                Axis::Vertical => state.base_overflow_y,
            };
            Ok(inline.or(state.inline_overflow.shorthand).unwrap_or(base))
        }

        fn inline_overflow(&self) -> OverflowStyle {
            self.state.borrow().inline_overflow
        }

        fn set_inline_overflow(&self, style: OverflowStyle) {
            self.state.borrow_mut().inline_overflow = style;
        }

        fn bounding_rect(&self) -> Rect {
            Rect::default()
        }

        fn set_inline_height(&self, _height: Option<HeightStyle>) {}

        fn is_spacer(&self) -> bool {
            false
        }

        fn insert_spacer_before(&self, _anchor: &Self, _height: f32) {}

        fn append_spacer(&self, _height: f32) {}

        fn remove_spacers(&self) -> usize {
            0
        }
    }

    fn scrollable_panel() -> StubElement {
        StubElement::new(Extent::new(400.0, 200.0), Extent::new(400.0, 600.0))
            .with_overflow(Overflow::Visible, Overflow::Auto)
            .with_scroll_offset(ScrollOffset::new(0.0, 150.0))
    }

    #[test]
    fn clipped_overflowing_descendant_is_expanded() {
        let root = StubElement::plain(800.0);
        let panel = scrollable_panel();
        root.add_child(&panel);

        let restorer = expand_scrollables(&root).unwrap();
        assert_eq!(restorer.len(), 1);
        assert_eq!(panel.scroll_offset(), ScrollOffset::origin());
        assert_eq!(panel.inline_overflow(), OverflowStyle::visible_all());
        restorer.restore();
    }

    #[test]
    fn visibly_overflowing_content_is_left_alone() {
        let root = StubElement::plain(800.0);
        let child = StubElement::new(Extent::new(400.0, 200.0), Extent::new(400.0, 600.0));
        root.add_child(&child);

        let restorer = expand_scrollables(&root).unwrap();
        assert!(restorer.is_empty());
    }

    #[test]
    fn clipping_without_overflowing_content_is_left_alone() {
        let root = StubElement::plain(800.0);
        let child =
            StubElement::plain(200.0).with_overflow(Overflow::Hidden, Overflow::Hidden);
        root.add_child(&child);

        let restorer = expand_scrollables(&root).unwrap();
        assert!(restorer.is_empty());
    }

    #[test]
    fn horizontal_scrollers_are_discovered_too() {
        let root = StubElement::plain(800.0);
        let strip = StubElement::new(Extent::new(400.0, 100.0), Extent::new(900.0, 100.0))
            .with_overflow(Overflow::Scroll, Overflow::Visible);
        root.add_child(&strip);

        let restorer = expand_scrollables(&root).unwrap();
        assert_eq!(restorer.len(), 1);
    }

    #[test]
    fn the_root_itself_can_be_scrollable() {
        let root = StubElement::new(Extent::new(400.0, 300.0), Extent::new(400.0, 900.0))
            .with_overflow(Overflow::Visible, Overflow::Scroll);

        let restorer = expand_scrollables(&root).unwrap();
        assert_eq!(restorer.len(), 1);
    }

    #[test]
    fn restore_round_trips_state_exactly() {
        let root = StubElement::plain(800.0);
        let panel = scrollable_panel();
        let pre_offset = panel.scroll_offset();
        let pre_overflow = panel.inline_overflow();
        root.add_child(&panel);

        let restorer = expand_scrollables(&root).unwrap();
        assert_ne!(panel.scroll_offset(), pre_offset);
        restorer.restore();

        assert_eq!(panel.scroll_offset(), pre_offset);
        assert_eq!(panel.inline_overflow(), pre_overflow);
    }

    #[test]
    fn dropping_the_guard_also_restores() {
        let root = StubElement::plain(800.0);
        let panel = scrollable_panel();
        let pre_offset = panel.scroll_offset();
        root.add_child(&panel);

        let restorer = expand_scrollables(&root).unwrap();
        drop(restorer);
        assert_eq!(panel.scroll_offset(), pre_offset);
    }

    #[test]
    fn failed_classification_restores_earlier_snapshots() {
        let root = StubElement::plain(800.0);
        let first = scrollable_panel();
        let second = scrollable_panel().poison_style();
        root.add_child(&first);
        root.add_child(&second);

        let err = expand_scrollables(&root).unwrap_err();
        assert!(matches!(err, Error::ScrollProcessing(_)));
        // The first panel was expanded before the failure and must be back
        // at its captured state.
        assert_eq!(first.scroll_offset(), ScrollOffset::new(0.0, 150.0));
        assert_eq!(first.inline_overflow(), OverflowStyle::default());
    }
}
