//! Arena-backed mutable XML element tree.
//!
//! All nodes of a run (every document plus any detached clone in flight)
//! live in one [`XmlTree`] arena and are addressed by copyable [`NodeId`]
//! handles. This gives the merge engine cheap parent backreferences,
//! cross-document subtree cloning, and deferred deletion (detach by handle)
//! without fighting ownership of a pointer-linked tree.
//!
//! A node is attached when it has a parent (or is a document root held by
//! the workspace) and detached otherwise. Detaching never destroys nodes;
//! a detached subtree simply becomes unreachable from its old document.

use indexmap::IndexMap;
use smol_str::SmolStr;

/// Handle to a node in an [`XmlTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Payload of a tree node.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// An element with a tag and an ordered, name-unique attribute set.
    Element {
        tag: SmolStr,
        attrs: IndexMap<SmolStr, String>,
    },
    /// Character data between elements.
    Text(String),
    /// An XML comment (kept so foreign comments survive clones).
    Comment(String),
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The arena of XML nodes for one synchronization run.
#[derive(Clone, Debug, Default)]
pub struct XmlTree {
    nodes: Vec<NodeData>,
}

impl XmlTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    // ── Construction ────────────────────────────────────────────────

    /// Create a detached element node.
    pub fn new_element(&mut self, tag: impl Into<SmolStr>) -> NodeId {
        self.push_node(NodeKind::Element {
            tag: tag.into(),
            attrs: IndexMap::new(),
        })
    }

    /// Create a detached element whose only child is a text node.
    pub fn new_text_element(&mut self, tag: impl Into<SmolStr>, text: impl Into<String>) -> NodeId {
        let element = self.new_element(tag);
        let text = self.new_text(text);
        self.append_child(element, text);
        element
    }

    /// Create a detached text node.
    pub fn new_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push_node(NodeKind::Text(text.into()))
    }

    /// Create a detached comment node.
    pub fn new_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push_node(NodeKind::Comment(text.into()))
    }

    // ── Structure ───────────────────────────────────────────────────

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.index()].kind
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.index()].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.index()].children
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.index()].kind, NodeKind::Element { .. })
    }

    /// Element children of `node`, in order.
    pub fn child_elements(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(node)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
    }

    /// First element child with the given tag.
    pub fn find_child_element(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        self.child_elements(node).find(|&c| self.tag(c) == Some(tag))
    }

    /// Position of `node` among all children of its parent.
    pub fn position_in_parent(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|&c| c == node)
    }

    /// Append a detached node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.nodes[child.index()].parent.is_none());
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    /// Insert a detached node as a child of `parent` at `index`.
    pub fn insert_child_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        debug_assert!(self.nodes[child.index()].parent.is_none());
        self.nodes[child.index()].parent = Some(parent);
        let children = &mut self.nodes[parent.index()].children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    /// Splice a detached node immediately before `anchor` in the anchor's
    /// parent. No-op when the anchor is itself detached.
    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) {
        let Some(parent) = self.parent(anchor) else {
            return;
        };
        let Some(position) = self.position_in_parent(anchor) else {
            return;
        };
        self.insert_child_at(parent, position, node);
    }

    /// Detach a node from its parent. The subtree below it stays intact.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes[node.index()].parent.take() else {
            return;
        };
        self.nodes[parent.index()].children.retain(|&c| c != node);
    }

    /// Whether the node is still attached to some parent.
    pub fn has_parent(&self, node: NodeId) -> bool {
        self.parent(node).is_some()
    }

    // ── Element access ──────────────────────────────────────────────

    /// Tag of an element node; `None` for text/comment nodes.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.index()].kind {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Rename an element. No-op on non-element nodes.
    pub fn set_tag(&mut self, node: NodeId, new_tag: impl Into<SmolStr>) {
        if let NodeKind::Element { tag, .. } = &mut self.nodes[node.index()].kind {
            *tag = new_tag.into();
        }
    }

    /// Attribute value on an element node.
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[node.index()].kind {
            NodeKind::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            _ => None,
        }
    }

    /// Set (or overwrite) an attribute on an element node.
    pub fn set_attr(&mut self, node: NodeId, name: impl Into<SmolStr>, value: impl Into<String>) {
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[node.index()].kind {
            attrs.insert(name.into(), value.into());
        }
    }

    /// The ordered attribute map of an element node.
    pub fn attrs(&self, node: NodeId) -> Option<&IndexMap<SmolStr, String>> {
        match &self.nodes[node.index()].kind {
            NodeKind::Element { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    /// Concatenated text content of an element's direct text children.
    pub fn element_text(&self, node: NodeId) -> Option<String> {
        let mut out: Option<String> = None;
        for &child in self.children(node) {
            if let NodeKind::Text(text) = &self.nodes[child.index()].kind {
                out.get_or_insert_with(String::new).push_str(text);
            }
        }
        out
    }

    /// Text of the `SHORT-NAME` child, the arxml naming convention.
    pub fn short_name(&self, node: NodeId) -> Option<String> {
        let short_name = self.find_child_element(node, super::tag::SHORT_NAME)?;
        self.element_text(short_name)
    }

    // ── Cloning & traversal ─────────────────────────────────────────

    /// Recursively clone a subtree, returning a detached copy.
    ///
    /// Attributes, text, comments and nesting are copied verbatim; this is
    /// what makes foreign content survive a Modify/Copy classification
    /// byte-for-byte.
    pub fn clone_subtree(&mut self, src: NodeId) -> NodeId {
        let kind = self.nodes[src.index()].kind.clone();
        let children = self.nodes[src.index()].children.clone();
        let clone = self.push_node(kind);
        for child in children {
            let cloned_child = self.clone_subtree(child);
            self.append_child(clone, cloned_child);
        }
        clone
    }

    /// Element descendants of `root` in document (pre-)order, excluding
    /// `root` itself.
    pub fn descendant_elements(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if self.is_element(node) {
                out.push(node);
                stack.extend(self.children(node).iter().rev().copied());
            }
        }
        out
    }
}
