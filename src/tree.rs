//! Scene tree – the in-memory live-tree implementation of [`LiveElement`].
//!
//! Nodes are cheap shared handles over interior-mutable state, stacked
//! vertically like document blocks. Flow positions, client sizes, and
//! content sizes come from a Taffy pass that reruns lazily after any
//! structural or size mutation, so geometry reads always reflect the
//! current tree, including spacers inserted mid-walk. Scroll offsets do
//! not move boxes in flow; they shift descendant bounding rects and what
//! the rasterizer paints, which is what a real scroll does.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use taffy::{AvailableSpace, Dimension, LengthPercentage, NodeId, TaffyTree};

use crate::element::{
    Axis, Extent, HeightStyle, LiveElement, Overflow, OverflowStyle, Rect, ScrollOffset,
};
use crate::error::Result;

/// Background fill of a node, 8-bit RGB.
pub type Rgb = [u8; 3];

/// Marker class carried by spacer nodes so they stay removable after the
/// export that created them.
pub const SPACER_CLASS: &str = "emptyDiv";

#[derive(Clone, Copy, Default)]
struct NodeLayout {
    // Flow position relative to the parent, before scroll adjustment.
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    content_width: f32,
    content_height: f32,
}

struct NodeData {
    label: String,
    class_attr: String,
    background: Option<Rgb>,
    width: Option<f32>,
    height: Option<f32>,
    content_height: f32,
    inline_height: Option<HeightStyle>,
    overflow_x: Overflow,
    overflow_y: Overflow,
    inline_overflow: OverflowStyle,
    scroll: ScrollOffset,
    spacer: bool,
    children: Vec<SceneNode>,
    parent: Weak<NodeInner>,
}

struct NodeInner {
    data: RefCell<NodeData>,
    layout: Cell<NodeLayout>,
    layout_dirty: Cell<bool>,
}

/// Handle to one node of the scene tree.
#[derive(Clone)]
pub struct SceneNode {
    inner: Rc<NodeInner>,
}

impl SceneNode {
    fn with_data(data: NodeData) -> Self {
        Self {
            inner: Rc::new(NodeInner {
                data: RefCell::new(data),
                layout: Cell::new(NodeLayout::default()),
                layout_dirty: Cell::new(true),
            }),
        }
    }

    fn fresh(label: &str) -> Self {
        Self::with_data(NodeData {
            label: label.to_string(),
            class_attr: String::new(),
            background: None,
            width: None,
            height: None,
            content_height: 0.0,
            inline_height: None,
            overflow_x: Overflow::Visible,
            overflow_y: Overflow::Visible,
            inline_overflow: OverflowStyle::default(),
            scroll: ScrollOffset::default(),
            spacer: false,
            children: Vec::new(),
            parent: Weak::new(),
        })
    }

    /// An export root with a fixed width.
    pub fn root(width: f32) -> Self {
        let node = Self::fresh("root");
        node.inner.data.borrow_mut().width = Some(width);
        node
    }

    /// A plain block node.
    pub fn block() -> Self {
        Self::fresh("block")
    }

    fn spacer(height: f32) -> Self {
        let node = Self::fresh("spacer");
        {
            let mut data = node.inner.data.borrow_mut();
            data.class_attr = SPACER_CLASS.to_string();
            data.background = Some([255, 255, 255]);
            data.height = Some(height);
            data.spacer = true;
        }
        node
    }

    // -----------------------------------------------------------------------
    // Builder-style construction
    // -----------------------------------------------------------------------

    pub fn with_label(self, label: &str) -> Self {
        self.inner.data.borrow_mut().label = label.to_string();
        self
    }

    /// Append a class token to the class attribute.
    pub fn with_class(self, class: &str) -> Self {
        {
            let mut data = self.inner.data.borrow_mut();
            if data.class_attr.is_empty() {
                data.class_attr = class.to_string();
            } else {
                data.class_attr.push(' ');
                data.class_attr.push_str(class);
            }
        }
        self
    }

    /// Fixed width in source pixels.
    pub fn with_width(self, width: f32) -> Self {
        self.inner.data.borrow_mut().width = Some(width);
        self.mark_layout_dirty();
        self
    }

    /// Fixed height in source pixels (the stylesheet height; an inline
    /// override set later wins over it).
    pub fn with_height(self, height: f32) -> Self {
        self.inner.data.borrow_mut().height = Some(height);
        self.mark_layout_dirty();
        self
    }

    /// Intrinsic content height of the node itself, stacked above any
    /// children (a text block, a chart, …).
    pub fn with_content_height(self, height: f32) -> Self {
        self.inner.data.borrow_mut().content_height = height;
        self.mark_layout_dirty();
        self
    }

    pub fn with_background(self, color: Rgb) -> Self {
        self.inner.data.borrow_mut().background = Some(color);
        self
    }

    /// Stylesheet overflow for both axes.
    pub fn with_overflow(self, overflow: Overflow) -> Self {
        {
            let mut data = self.inner.data.borrow_mut();
            data.overflow_x = overflow;
            data.overflow_y = overflow;
        }
        self.mark_layout_dirty();
        self
    }

    pub fn with_overflow_x(self, overflow: Overflow) -> Self {
        self.inner.data.borrow_mut().overflow_x = overflow;
        self.mark_layout_dirty();
        self
    }

    pub fn with_overflow_y(self, overflow: Overflow) -> Self {
        self.inner.data.borrow_mut().overflow_y = overflow;
        self.mark_layout_dirty();
        self
    }

    /// Initial vertical scroll position.
    pub fn with_scroll_top(self, top: f32) -> Self {
        self.inner.data.borrow_mut().scroll.y = top;
        self
    }

    /// Append a child and return self, for chained construction.
    pub fn with_child(self, child: SceneNode) -> Self {
        self.append_child(&child);
        self
    }

    /// Append a child node.
    pub fn append_child(&self, child: &SceneNode) {
        child.inner.data.borrow_mut().parent = Rc::downgrade(&self.inner);
        self.inner.data.borrow_mut().children.push(child.clone());
        self.mark_layout_dirty();
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn label(&self) -> String {
        self.inner.data.borrow().label.clone()
    }

    pub fn background(&self) -> Option<Rgb> {
        self.inner.data.borrow().background
    }

    fn parent(&self) -> Option<SceneNode> {
        self.inner
            .data
            .borrow()
            .parent
            .upgrade()
            .map(|inner| SceneNode { inner })
    }

    fn tree_root(&self) -> SceneNode {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    fn mark_layout_dirty(&self) {
        self.tree_root().inner.layout_dirty.set(true);
    }

    // -----------------------------------------------------------------------
    // Layout
    // -----------------------------------------------------------------------

    /// The height the node currently renders with, if fixed.
    fn effective_height(data: &NodeData) -> Option<f32> {
        match data.inline_height {
            Some(HeightStyle::Px(height)) => Some(height),
            Some(HeightStyle::Natural) => None,
            None => data.height,
        }
    }

    /// Overflow the node resolves to: inline axis value, else inline
    /// shorthand, else the stylesheet value.
    fn resolved(data: &NodeData, axis: Axis) -> Overflow {
        let (inline, base) = match axis {
            Axis::Horizontal => (data.inline_overflow.x, data.overflow_x),
            Axis::Vertical => (data.inline_overflow.y, data.overflow_y),
        };
        inline.or(data.inline_overflow.shorthand).unwrap_or(base)
    }

    fn ensure_layout(&self) {
        let root = self.tree_root();
        if root.inner.layout_dirty.get() {
            root.reflow();
            root.inner.layout_dirty.set(false);
        }
    }

    /// Recompute flow positions and sizes for the whole tree.
    fn reflow(&self) {
        let mut taffy: TaffyTree<()> = TaffyTree::new();
        let mut mapping: Vec<(NodeId, SceneNode)> = Vec::new();
        let root_id = self.build_taffy(&mut taffy, &mut mapping);

        let root_width = self.inner.data.borrow().width;
        let available_width = match root_width {
            Some(width) => AvailableSpace::Definite(width),
            None => AvailableSpace::MaxContent,
        };
        taffy
            .compute_layout(
                root_id,
                taffy::Size {
                    width: available_width,
                    height: AvailableSpace::MaxContent,
                },
            )
            .unwrap();

        for (id, node) in mapping {
            let layout = taffy.layout(id).unwrap();
            node.inner.layout.set(NodeLayout {
                x: layout.location.x,
                y: layout.location.y,
                width: layout.size.width,
                height: layout.size.height,
                content_width: layout.content_size.width,
                content_height: layout.content_size.height,
            });
        }
    }

    fn build_taffy(
        &self,
        taffy: &mut TaffyTree<()>,
        mapping: &mut Vec<(NodeId, SceneNode)>,
    ) -> NodeId {
        let (style, children) = {
            let data = self.inner.data.borrow();
            // A clipping node keeps its overflow out of ancestor scroll
            // extents; a visible one extends them. Expansion flips this at
            // the next reflow, which is how newly unclipped content grows
            // the root's capture height.
            let overflow_to_taffy = |overflow: Overflow| {
                if overflow.clips() {
                    taffy::Overflow::Hidden
                } else {
                    taffy::Overflow::Visible
                }
            };
            let style = taffy::Style {
                display: taffy::Display::Flex,
                flex_direction: taffy::FlexDirection::Column,
                // Block children overflow a too-small container instead of
                // shrinking into it.
                flex_shrink: 0.0,
                overflow: taffy::Point {
                    x: overflow_to_taffy(Self::resolved(&data, Axis::Horizontal)),
                    y: overflow_to_taffy(Self::resolved(&data, Axis::Vertical)),
                },
                size: taffy::Size {
                    width: match data.width {
                        Some(width) => Dimension::Length(width),
                        None => Dimension::Auto,
                    },
                    height: match Self::effective_height(&data) {
                        Some(height) => Dimension::Length(height),
                        None => Dimension::Auto,
                    },
                },
                // The node's own content occupies the top of its box,
                // stacking any children below it.
                padding: taffy::Rect {
                    left: LengthPercentage::Length(0.0),
                    right: LengthPercentage::Length(0.0),
                    top: LengthPercentage::Length(data.content_height),
                    bottom: LengthPercentage::Length(0.0),
                },
                ..Default::default()
            };
            (style, data.children.clone())
        };

        let child_ids: Vec<NodeId> = children
            .iter()
            .map(|child| child.build_taffy(taffy, mapping))
            .collect();
        let id = taffy.new_with_children(style, &child_ids).unwrap();
        mapping.push((id, self.clone()));
        id
    }

    /// Document-space position: accumulated flow offsets minus every
    /// ancestor's scroll offset.
    fn document_position(&self) -> (f32, f32) {
        let layout = self.inner.layout.get();
        let mut x = layout.x;
        let mut y = layout.y;
        let mut current = self.parent();
        while let Some(node) = current {
            let parent_layout = node.inner.layout.get();
            let scroll = node.inner.data.borrow().scroll;
            x += parent_layout.x - scroll.x;
            y += parent_layout.y - scroll.y;
            current = node.parent();
        }
        (x, y)
    }

    fn remove_spacers_recursive(node: &SceneNode) -> usize {
        let mut removed;
        let children: Vec<SceneNode> = {
            let mut data = node.inner.data.borrow_mut();
            let before = data.children.len();
            data.children
                .retain(|child| !child.inner.data.borrow().spacer);
            removed = before - data.children.len();
            data.children.clone()
        };
        for child in &children {
            removed += Self::remove_spacers_recursive(child);
        }
        removed
    }
}

impl LiveElement for SceneNode {
    fn children(&self) -> Vec<Self> {
        self.inner.data.borrow().children.clone()
    }

    fn class_attr(&self) -> String {
        self.inner.data.borrow().class_attr.clone()
    }

    fn client_size(&self) -> Extent {
        self.ensure_layout();
        let layout = self.inner.layout.get();
        Extent::new(layout.width, layout.height)
    }

    fn scroll_size(&self) -> Extent {
        self.ensure_layout();
        let layout = self.inner.layout.get();
        Extent::new(
            layout.width.max(layout.content_width),
            layout.height.max(layout.content_height),
        )
    }

    fn scroll_offset(&self) -> ScrollOffset {
        self.inner.data.borrow().scroll
    }

    fn set_scroll_offset(&self, offset: ScrollOffset) {
        self.inner.data.borrow_mut().scroll = offset;
    }

    fn resolved_overflow(&self, axis: Axis) -> Result<Overflow> {
        let data = self.inner.data.borrow();
        Ok(Self::resolved(&data, axis))
    }

    fn inline_overflow(&self) -> OverflowStyle {
        self.inner.data.borrow().inline_overflow
    }

    fn set_inline_overflow(&self, style: OverflowStyle) {
        self.inner.data.borrow_mut().inline_overflow = style;
        // Resolved overflow feeds content-size propagation.
        self.mark_layout_dirty();
    }

    fn bounding_rect(&self) -> Rect {
        self.ensure_layout();
        let (x, y) = self.document_position();
        let layout = self.inner.layout.get();
        Rect::new(x, y, layout.width, layout.height)
    }

    fn set_inline_height(&self, height: Option<HeightStyle>) {
        self.inner.data.borrow_mut().inline_height = height;
        self.mark_layout_dirty();
    }

    fn is_spacer(&self) -> bool {
        self.inner.data.borrow().spacer
    }

    fn insert_spacer_before(&self, anchor: &Self, height: f32) {
        let spacer = SceneNode::spacer(height);
        {
            let mut data = self.inner.data.borrow_mut();
            let index = data
                .children
                .iter()
                .position(|child| Rc::ptr_eq(&child.inner, &anchor.inner))
                .expect("spacer anchor must be a child of the parent");
            spacer.inner.data.borrow_mut().parent = Rc::downgrade(&self.inner);
            data.children.insert(index, spacer);
        }
        self.mark_layout_dirty();
    }

    fn append_spacer(&self, height: f32) {
        let spacer = SceneNode::spacer(height);
        spacer.inner.data.borrow_mut().parent = Rc::downgrade(&self.inner);
        self.inner.data.borrow_mut().children.push(spacer);
        self.mark_layout_dirty();
    }

    fn remove_spacers(&self) -> usize {
        let removed = Self::remove_spacers_recursive(self);
        if removed > 0 {
            log::debug!("removed {removed} spacer(s)");
            self.mark_layout_dirty();
        }
        removed
    }
}

impl fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.data.borrow();
        f.debug_struct("SceneNode")
            .field("label", &data.label)
            .field("class", &data.class_attr)
            .field("children", &data.children.len())
            .finish()
    }
}
