//! The arena-backed component tree.
//!
//! Nodes live in a flat arena owned by [`Tree`]; [`NodeId`] is a typed index
//! into it. A node stores its children in declaration order and a non-owning
//! handle to its parent, used only for upward lookups (e.g. finding the
//! nearest delegate ancestor).
//!
//! Every `&mut` access to the tree bumps a generation counter. The geometry
//! cache in `trellis-layout` stamps its entries with the generation they were
//! computed for, so any structural or style mutation conservatively
//! invalidates the whole cached layout.

use smallvec::SmallVec;

use crate::style::{LeafKind, NodeKind, Style};

/// Handle to a node in a [`Tree`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(u32);

impl NodeId {
    /// Arena slot index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the component tree: structural kind, style attributes, and
/// optional text content consumed by measurement.
#[derive(Debug, Clone)]
pub struct Component {
    pub kind: NodeKind,
    pub style: Style,
    /// Text content for text-bearing leaves
    pub text: Option<String>,
    /// Optional name for diagnostics
    pub name: Option<String>,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
}

impl Component {
    /// Create a component of the given kind with default style.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            style: Style::default(),
            text: None,
            name: None,
            parent: None,
            children: SmallVec::new(),
        }
    }

    /// A horizontal container.
    pub fn row() -> Self {
        Self::new(NodeKind::Row)
    }

    /// A vertical container.
    pub fn column() -> Self {
        Self::new(NodeKind::Column)
    }

    /// A generic container; main axis from [`Style::direction`].
    pub fn boxed() -> Self {
        Self::new(NodeKind::Box)
    }

    /// A container that centers its single child.
    pub fn center() -> Self {
        Self::new(NodeKind::Center)
    }

    /// A text leaf.
    pub fn text(content: impl Into<String>) -> Self {
        let mut component = Self::new(NodeKind::Leaf(LeafKind::Text));
        component.text = Some(content.into());
        component
    }

    /// A button leaf with a label.
    pub fn button(label: impl Into<String>) -> Self {
        let mut component = Self::new(NodeKind::Leaf(LeafKind::Button));
        component.text = Some(label.into());
        component
    }

    /// Set the style.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Set the diagnostic name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Parent handle, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in declaration order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A component tree rooted at a single node.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Component>,
    root: NodeId,
    generation: u64,
}

impl Tree {
    /// Create a tree from its root component.
    pub fn new(root: Component) -> Self {
        Self {
            nodes: vec![root],
            root: NodeId(0),
            generation: 0,
        }
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Current mutation generation. Bumped by every `&mut` accessor; the
    /// geometry cache compares against it to detect staleness.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Get a node by id.
    pub fn get(&self, id: NodeId) -> Option<&Component> {
        self.nodes.get(id.index())
    }

    /// Append a child under `parent`, returning the new node's id.
    ///
    /// `parent` must be a handle into this tree.
    pub fn push_child(&mut self, parent: NodeId, mut component: Component) -> NodeId {
        debug_assert!(parent.index() < self.nodes.len());
        let id = NodeId(self.nodes.len() as u32);
        component.parent = Some(parent);
        self.nodes.push(component);
        if let Some(parent_node) = self.nodes.get_mut(parent.index()) {
            parent_node.children.push(id);
        }
        self.generation += 1;
        id
    }

    /// Mutable style access. Bumps the generation: any style change
    /// invalidates the whole cached layout.
    pub fn style_mut(&mut self, id: NodeId) -> Option<&mut Style> {
        self.generation += 1;
        self.nodes.get_mut(id.index()).map(|node| &mut node.style)
    }

    /// Replace a node's text content.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.text = Some(text.into());
            self.generation += 1;
        }
    }

    /// Explicitly invalidate all cached layout for this tree.
    pub fn touch(&mut self) {
        self.generation += 1;
    }

    /// Children of a node, empty for leaves and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|node| node.children()).unwrap_or(&[])
    }

    /// Parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent())
    }

    /// Walk up the parent chain and return the first ancestor matching the
    /// predicate. The starting node itself is not considered.
    pub fn nearest_ancestor(
        &self,
        id: NodeId,
        predicate: impl Fn(&Component) -> bool,
    ) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(ancestor_id) = current {
            let ancestor = self.get(ancestor_id)?;
            if predicate(ancestor) {
                return Some(ancestor_id);
            }
            current = ancestor.parent();
        }
        None
    }

    /// Iterate over all node ids in arena order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }
}

impl std::ops::Index<NodeId> for Tree {
    type Output = Component;

    fn index(&self, id: NodeId) -> &Component {
        &self.nodes[id.index()]
    }
}
