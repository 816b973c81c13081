use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::html;
use super::{Attribute, NodeId, Page, UiNodeId, UiNodeKind};
use crate::geometry::{Point, Rect, Viewport};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read page fixture {path}: {source}")]
    ReadFixture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse page fixture {path}: {source}")]
    ParseFixture {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("page fixture root must be an element")]
    TextRoot,
}

pub type DocumentResult<T> = std::result::Result<T, DocumentError>;

/// JSON description of a page, used by fixtures and the `inspect` command.
#[derive(Debug, Clone, Deserialize)]
pub struct PageSpec {
    #[serde(default)]
    pub viewport: Viewport,
    pub root: NodeSpec,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Text {
        text: String,
    },
    Element {
        tag: String,
        #[serde(default)]
        attributes: Vec<(String, String)>,
        #[serde(default)]
        rect: Option<Rect>,
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UiNodeRecord {
    pub kind: UiNodeKind,
    pub rect: Option<Rect>,
    pub visible: bool,
}

#[derive(Debug, Clone)]
enum NodeData {
    Element {
        tag: String,
        attributes: Vec<Attribute>,
        children: Vec<NodeId>,
        rect: Option<Rect>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    data: NodeData,
}

/// In-memory page with explicit layout boxes.
///
/// Hit-testing follows paint order: later elements in document order sit on
/// top of earlier ones.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    viewport: Viewport,
    ui_nodes: BTreeMap<UiNodeId, UiNodeRecord>,
    next_ui_id: u64,
    last_scrolled: Option<NodeId>,
}

impl Document {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            viewport,
            ui_nodes: BTreeMap::new(),
            next_ui_id: 1,
            last_scrolled: None,
        }
    }

    pub fn from_spec(spec: &PageSpec) -> DocumentResult<Self> {
        let mut document = Self::new(spec.viewport);
        match &spec.root {
            NodeSpec::Text { .. } => return Err(DocumentError::TextRoot),
            NodeSpec::Element {
                tag,
                attributes,
                rect,
                children,
            } => {
                let root = document.create_root(tag);
                document.apply_spec(root, attributes, *rect, children);
            }
        }
        Ok(document)
    }

    pub fn load_fixture(path: &Path) -> DocumentResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| DocumentError::ReadFixture {
            path: path.to_path_buf(),
            source,
        })?;
        let spec: PageSpec =
            serde_json::from_str(&contents).map_err(|source| DocumentError::ParseFixture {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_spec(&spec)
    }

    fn apply_spec(
        &mut self,
        node: NodeId,
        attributes: &[(String, String)],
        rect: Option<Rect>,
        children: &[NodeSpec],
    ) {
        for (name, value) in attributes {
            self.set_attribute(node, name, value);
        }
        if let Some(rect) = rect {
            self.set_rect(node, rect);
        }
        for child in children {
            match child {
                NodeSpec::Text { text } => {
                    self.append_text(node, text);
                }
                NodeSpec::Element {
                    tag,
                    attributes,
                    rect,
                    children,
                } => {
                    let id = self.append_element(node, tag);
                    self.apply_spec(id, attributes, *rect, children);
                }
            }
        }
    }

    pub fn create_root(&mut self, tag: &str) -> NodeId {
        let id = self.push(None, element_data(tag));
        self.root = Some(id);
        id
    }

    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.push(Some(parent), element_data(tag));
        self.attach(parent, id);
        id
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.push(Some(parent), NodeData::Text(text.to_string()));
        self.attach(parent, id);
        id
    }

    /// Sets or replaces an attribute, keeping the position of an existing one.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(NodeData::Element { attributes, .. }) = self.data_mut(node) {
            match attributes.iter_mut().find(|attr| attr.name == name) {
                Some(existing) => existing.value = value.to_string(),
                None => attributes.push(Attribute::new(name, value)),
            }
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(NodeData::Element { attributes, .. }) = self.data_mut(node) {
            attributes.retain(|attr| attr.name != name);
        }
    }

    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        if let Some(NodeData::Element { rect: slot, .. }) = self.data_mut(node) {
            *slot = Some(rect);
        }
    }

    /// Replaces every child of `node` with a single text node.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        let old_children = match self.data_mut(node) {
            Some(NodeData::Element { children, .. }) => std::mem::take(children),
            _ => return,
        };
        for child in old_children {
            if let Some(entry) = self.nodes.get_mut(child.0) {
                entry.parent = None;
            }
        }
        self.append_text(node, text);
    }

    /// Moves every layout box by the given delta, as a page scroll would.
    pub fn scroll_by(&mut self, dx: f64, dy: f64) {
        for node in &mut self.nodes {
            if let NodeData::Element {
                rect: Some(rect), ..
            } = &mut node.data
            {
                rect.x -= dx;
                rect.y -= dy;
            }
        }
    }

    pub fn resize_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Removes `node` from its parent; the subtree stays addressable.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node.0).and_then(|entry| entry.parent) else {
            return;
        };
        if let Some(NodeData::Element { children, .. }) = self.data_mut(parent) {
            children.retain(|child| *child != node);
        }
        if let Some(entry) = self.nodes.get_mut(node.0) {
            entry.parent = None;
        }
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if Some(id) == self.root {
                return true;
            }
            current = self.nodes.get(id.0).and_then(|entry| entry.parent);
        }
        false
    }

    pub fn ui_nodes(&self) -> &BTreeMap<UiNodeId, UiNodeRecord> {
        &self.ui_nodes
    }

    pub fn last_scrolled_into_view(&self) -> Option<NodeId> {
        self.last_scrolled
    }

    pub(super) fn children(&self, node: NodeId) -> &[NodeId] {
        match self.nodes.get(node.0).map(|entry| &entry.data) {
            Some(NodeData::Element { children, .. }) => children,
            _ => &[],
        }
    }

    pub(super) fn text_of(&self, node: NodeId) -> Option<&str> {
        match self.nodes.get(node.0).map(|entry| &entry.data) {
            Some(NodeData::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub(super) fn element_parts(&self, node: NodeId) -> Option<(&str, &[Attribute])> {
        match self.nodes.get(node.0).map(|entry| &entry.data) {
            Some(NodeData::Element {
                tag, attributes, ..
            }) => Some((tag, attributes)),
            _ => None,
        }
    }

    fn push(&mut self, parent: Option<NodeId>, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { parent, data });
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(NodeData::Element { children, .. }) = self.data_mut(parent) {
            children.push(child);
        }
    }

    fn data_mut(&mut self, node: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(node.0).map(|entry| &mut entry.data)
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        if let Some(text) = self.text_of(node) {
            out.push_str(text);
            return;
        }
        for child in self.children(node) {
            self.collect_text(*child, out);
        }
    }

    fn hit_test(&self, node: NodeId, point: Point, hit: &mut Option<NodeId>) {
        let Some(NodeData::Element { rect, children, .. }) =
            self.nodes.get(node.0).map(|entry| &entry.data)
        else {
            return;
        };
        if rect.is_some_and(|rect| rect.contains(point)) {
            *hit = Some(node);
        }
        for child in children {
            self.hit_test(*child, point, hit);
        }
    }
}

fn element_data(tag: &str) -> NodeData {
    NodeData::Element {
        tag: tag.to_ascii_lowercase(),
        attributes: Vec::new(),
        children: Vec::new(),
        rect: None,
    }
}

impl Page for Document {
    fn element_at(&self, point: Point) -> Option<NodeId> {
        let root = self.root?;
        let mut hit = None;
        self.hit_test(root, point, &mut hit);
        hit
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|entry| entry.parent)
    }

    fn root(&self) -> Option<NodeId> {
        self.root
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.element_parts(node)
            .map(|(tag, _)| tag.to_string())
            .unwrap_or_default()
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn inner_html(&self, node: NodeId) -> String {
        html::serialize_children(self, node)
    }

    fn outer_html(&self, node: NodeId) -> String {
        html::serialize_node(self, node)
    }

    fn attributes(&self, node: NodeId) -> Vec<Attribute> {
        self.element_parts(node)
            .map(|(_, attributes)| attributes.to_vec())
            .unwrap_or_default()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element_parts(node).and_then(|(_, attributes)| {
            attributes
                .iter()
                .find(|attr| attr.name == name)
                .map(|attr| attr.value.clone())
        })
    }

    fn bounding_rect(&self, node: NodeId) -> Option<Rect> {
        if !self.is_connected(node) {
            return None;
        }
        match self.nodes.get(node.0).map(|entry| &entry.data) {
            Some(NodeData::Element { rect, .. }) => Some(rect.unwrap_or_default()),
            _ => None,
        }
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn scroll_into_view(&mut self, node: NodeId) {
        self.last_scrolled = Some(node);
    }

    fn mount_ui(&mut self, kind: UiNodeKind) -> UiNodeId {
        let id = UiNodeId(self.next_ui_id);
        self.next_ui_id += 1;
        self.ui_nodes.insert(
            id,
            UiNodeRecord {
                kind,
                rect: None,
                visible: false,
            },
        );
        id
    }

    fn place_ui(&mut self, id: UiNodeId, rect: Rect, visible: bool) {
        if let Some(record) = self.ui_nodes.get_mut(&id) {
            record.rect = Some(rect);
            record.visible = visible;
        }
    }

    fn unmount_ui(&mut self, id: UiNodeId) {
        self.ui_nodes.remove(&id);
    }
}
