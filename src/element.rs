//! Live-element capability surface – the geometry and style operations the
//! export algorithms need from a UI tree, expressed as a trait so they run
//! against any tree representation (the in-memory scene tree in this crate,
//! or an adapter over a real rendering engine).

use crate::error::Result;

/// Layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Resolved overflow behavior of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    /// Content overflows the box and stays visible (default).
    #[default]
    Visible,
    /// Content is clipped at the box edge.
    Hidden,
    /// Content scrolls when it overflows.
    Auto,
    /// Content always scrolls.
    Scroll,
}

impl Overflow {
    /// Whether this value hides overflowing content rather than letting it
    /// render in natural flow. Both axes are classified against the same
    /// three-value set.
    pub fn clips(self) -> bool {
        !matches!(self, Overflow::Visible)
    }
}

/// Inline overflow style values of an element: the shorthand plus the two
/// per-axis properties. `None` means the property carries no inline value,
/// which is distinct from an explicit `visible`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverflowStyle {
    pub shorthand: Option<Overflow>,
    pub x: Option<Overflow>,
    pub y: Option<Overflow>,
}

impl OverflowStyle {
    /// The expanded state: `visible` written to all three properties.
    pub fn visible_all() -> Self {
        Self {
            shorthand: Some(Overflow::Visible),
            x: Some(Overflow::Visible),
            y: Some(Overflow::Visible),
        }
    }
}

/// Inline height override of an element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeightStyle {
    /// Revert to the natural (content-driven) height.
    Natural,
    /// Fixed height in source pixels.
    Px(f32),
}

/// A width/height pair in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Extent {
    pub width: f32,
    pub height: f32,
}

impl Extent {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The extent along one axis.
    pub fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }
}

/// Scroll offsets of an element, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollOffset {
    pub x: f32,
    pub y: f32,
}

impl ScrollOffset {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The document origin.
    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

/// An element's bounding box in document coordinates, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Handle to one element of a live, currently rendered tree.
///
/// Handles are cheap clones referring to shared state; mutators take
/// `&self` and the tree reflows before the next geometry read. The style
/// inspection capability (`resolved_overflow`, `scroll_size`,
/// `client_size`) is what the scroll-state discovery runs on; the
/// spacer operations are what the break walk runs on.
pub trait LiveElement: Clone {
    /// Current children, oldest first. Callers iterate a snapshot; the
    /// underlying child list may be mutated while iterating.
    fn children(&self) -> Vec<Self>;

    /// The raw class attribute. Marker detection is substring containment
    /// on this string, so a marker that happens to be a substring of
    /// another class name also matches.
    fn class_attr(&self) -> String;

    /// Visible box extent.
    fn client_size(&self) -> Extent;

    /// Full content extent, including content hidden by clipping or
    /// scrolled out of view. Never smaller than the client extent.
    fn scroll_size(&self) -> Extent;

    /// Current scroll offsets.
    fn scroll_offset(&self) -> ScrollOffset;

    /// Write scroll offsets back.
    fn set_scroll_offset(&self, offset: ScrollOffset);

    /// The overflow behavior this element resolves to on one axis, after
    /// inline and stylesheet values are combined.
    ///
    /// Hosts that cannot read computed style for an element report it as
    /// [`crate::Error::ScrollProcessing`].
    fn resolved_overflow(&self, axis: Axis) -> Result<Overflow>;

    /// Inline overflow values as currently written on the element.
    fn inline_overflow(&self) -> OverflowStyle;

    /// Overwrite the inline overflow values.
    fn set_inline_overflow(&self, style: OverflowStyle);

    /// Bounding box in document coordinates, reflecting ancestor scroll
    /// offsets and any spacers inserted so far.
    fn bounding_rect(&self) -> Rect;

    /// Set or clear the inline height override.
    fn set_inline_height(&self, height: Option<HeightStyle>);

    /// Whether this element is a spacer inserted by the break walk.
    fn is_spacer(&self) -> bool;

    /// Insert a blank spacer of the given height immediately before
    /// `anchor`, which must be a child of `self`.
    fn insert_spacer_before(&self, anchor: &Self, height: f32);

    /// Append a blank spacer of the given height as the last child.
    fn append_spacer(&self, height: f32);

    /// Remove every spacer in the subtree rooted here. Returns the number
    /// removed; calling it again is a no-op.
    fn remove_spacers(&self) -> usize;
}
