//! Arena-backed element tree.
//!
//! Every node lives in a single `Vec` owned by the [`Document`]. Children are held as ordered
//! [`NodeId`] lists and the parent link is a plain index, so the tree never holds a second owner
//! for any node. Detaching a node only unlinks it; the slot stays in the arena and is simply no
//! longer reachable from the root.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node inside its owning [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Element,
    /// `text` holds the comment body.
    Comment,
    /// `tag` holds the target, `text` the remaining instruction content.
    ProcessingInstruction,
}

/// Attribute mapping. Keys are unique; insertion order is kept only so that serialization
/// reproduces the source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(key, _)| key == name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.0.iter().position(|(key, _)| key == name)?;
        Some(self.0.remove(idx).1)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub tag: String,
    pub attributes: Attributes,
    pub text: Option<String>,
    pub tail: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Node {
    fn new(kind: NodeKind, tag: &str) -> Node {
        Node {
            kind,
            tag: tag.to_string(),
            attributes: Attributes::default(),
            text: None,
            tail: None,
            children: Vec::new(),
            parent: None,
        }
    }
}

/// A parsed document: one root element plus the verbatim text surrounding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    /// Everything before the root start tag (declaration, DOCTYPE, comments).
    pub(crate) prolog: String,
    /// Everything after the root end tag.
    pub(crate) epilog: String,
}

impl Document {
    /// Create a document consisting of a single empty root element.
    pub fn new(root_tag: &str) -> Document {
        Document {
            nodes: vec![Node::new(NodeKind::Element, root_tag)],
            root: NodeId(0),
            prolog: String::new(),
            epilog: String::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.0].kind
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.kind(id) == NodeKind::Element
    }

    pub fn tag(&self, id: NodeId) -> &str {
        &self.nodes[id.0].tag
    }

    /// Tag of the root element.
    pub fn root_tag(&self) -> &str {
        self.tag(self.root)
    }

    pub fn has_attributes(&self, id: NodeId) -> bool {
        !self.nodes[id.0].attributes.is_empty()
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.nodes[id.0].attributes.contains(name)
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes[id.0].attributes.get(name)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        self.nodes[id.0].attributes.set(name, value);
    }

    pub fn attributes(&self, id: NodeId) -> &Attributes {
        &self.nodes[id.0].attributes
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].text.as_deref()
    }

    pub fn set_text(&mut self, id: NodeId, text: Option<String>) {
        self.nodes[id.0].text = text.filter(|t| !t.is_empty());
    }

    pub fn tail(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].tail.as_deref()
    }

    pub fn set_tail(&mut self, id: NodeId, tail: Option<String>) {
        self.nodes[id.0].tail = tail.filter(|t| !t.is_empty());
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Position of `child` within `parent`'s child list.
    pub fn index_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.nodes[parent.0].children.iter().position(|c| *c == child)
    }

    /// Whether `id` is the root or still reachable from it through parent links.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Allocate a new, detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(Node::new(NodeKind::Element, tag))
    }

    pub(crate) fn create_node(&mut self, kind: NodeKind, tag: &str) -> NodeId {
        self.alloc(Node::new(kind, tag))
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Insert `child` into `parent` at `index` (clamped to the child count). A child that is
    /// still attached elsewhere is detached first.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if let Some(old_parent) = self.parent(child) {
            self.remove_child(old_parent, child);
        }
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let index = self.nodes[parent.0].children.len();
        self.insert_child(parent, index, child);
    }

    /// Detach `child` from `parent`. The child keeps its tail, so any text trailing it leaves
    /// the tree together with it. Returns `false` if `child` was not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        match self.index_of(parent, child) {
            Some(idx) => {
                self.nodes[parent.0].children.remove(idx);
                self.nodes[child.0].parent = None;
                true
            }
            None => false,
        }
    }

    /// Pre-order list of `start` and every node below it.
    ///
    /// The list is a snapshot, so callers may mutate the tree while walking it. Nodes created
    /// during the walk are not visited.
    pub fn descendants(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            result.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev());
        }
        result
    }

    /// Pre-order snapshot of every node in the document, root included.
    pub fn iter(&self) -> Vec<NodeId> {
        self.descendants(self.root)
    }

    /// Pre-order snapshot of every element, root included.
    pub fn elements(&self) -> Vec<NodeId> {
        self.iter()
            .into_iter()
            .filter(|id| self.is_element(*id))
            .collect()
    }
}
