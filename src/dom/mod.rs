mod document;
mod html;

pub use document::{Document, DocumentError, DocumentResult, NodeSpec, PageSpec, UiNodeRecord};

use crate::geometry::{Point, Rect, Viewport};

/// Handle to an element of the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Handle to a node the copier itself inserted into the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UiNodeId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiNodeKind {
    Backdrop,
    Palette,
    Highlight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Capabilities the copier consumes from the page of a single frame.
///
/// Every read reflects the live state of the page at call time; nothing is
/// cached behind this trait.
pub trait Page {
    /// Topmost element painted at `point`, in viewport coordinates.
    fn element_at(&self, point: Point) -> Option<NodeId>;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    /// The frame's root container (the body element).
    fn root(&self) -> Option<NodeId>;
    fn tag_name(&self, node: NodeId) -> String;
    fn text_content(&self, node: NodeId) -> String;
    fn inner_html(&self, node: NodeId) -> String;
    fn outer_html(&self, node: NodeId) -> String;
    /// Attributes in the element's native order.
    fn attributes(&self, node: NodeId) -> Vec<Attribute>;
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    /// Current bounding box in viewport coordinates, `None` once the node is gone.
    fn bounding_rect(&self, node: NodeId) -> Option<Rect>;
    fn viewport(&self) -> Viewport;
    fn scroll_into_view(&mut self, node: NodeId);

    fn mount_ui(&mut self, kind: UiNodeKind) -> UiNodeId;
    fn place_ui(&mut self, id: UiNodeId, rect: Rect, visible: bool);
    fn unmount_ui(&mut self, id: UiNodeId);
}
