use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::writer::format_float;

/// Handle to a node inside a [`PhyloTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub dist: f64,
    pub support: f64,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    features: BTreeMap<String, String>,
}

impl Node {
    fn new(name: String) -> Self {
        Node {
            name,
            dist: 1.0,
            support: 1.0,
            parent: None,
            children: Vec::new(),
            features: BTreeMap::new(),
        }
    }
}

/// An arena backed rooted tree.
///
/// Nodes are never freed: detaching a node only unlinks it, so a `NodeId` stays valid for the
/// lifetime of the tree. Everything that walks the tree starts at the root, which means
/// unlinked nodes are invisible to traversals and to the writer.
#[derive(Debug, Clone)]
pub struct PhyloTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for PhyloTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PhyloTree {
    /// Create a tree holding a single unnamed root
    pub fn new() -> Self {
        Self::with_root_name("")
    }

    pub fn with_root_name(name: impl Into<String>) -> Self {
        PhyloTree {
            nodes: vec![Node::new(name.into())],
            root: NodeId(0),
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

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].name
    }

    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) {
        self.nodes[id.0].name = name.into();
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id.0].children.is_empty()
    }

    /// Allocate a node that is not linked to the tree yet
    pub fn new_node(&mut self, name: impl Into<String>) -> NodeId {
        self.nodes.push(Node::new(name.into()));
        NodeId(self.nodes.len() - 1)
    }

    pub fn add_child(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        let child = self.new_node(name);
        self.attach(parent, child);
        child
    }

    /// Append `child` as last child of `parent`, unlinking it from its current parent first
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Unlink a node (and the subtree below it) from its parent
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    /// Remove a node, moving its children to its parent at the position the node occupied.
    /// Deleting the root is a no-op.
    pub fn delete(&mut self, id: NodeId) {
        let parent = match self.nodes[id.0].parent {
            Some(p) => p,
            None => return,
        };

        let children = std::mem::take(&mut self.nodes[id.0].children);
        for &child in &children {
            self.nodes[child.0].parent = Some(parent);
        }

        let siblings = &mut self.nodes[parent.0].children;
        if let Some(index) = siblings.iter().position(|&c| c == id) {
            siblings.splice(index..=index, children);
        }
        self.nodes[id.0].parent = None;
    }

    /// Make `id` the root of the tree, dropping everything that is not below it
    pub fn set_root(&mut self, id: NodeId) {
        self.detach(id);
        self.root = id;
    }

    /// All nodes reachable from the root, in preorder
    pub fn traverse(&self) -> Vec<NodeId> {
        let mut order = vec![self.root];
        order.extend(self.descendants(self.root));
        order
    }

    /// All nodes below `id`, in preorder
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();

        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.children(current).iter().rev());
        }

        order
    }

    pub fn leaves(&self) -> Vec<NodeId> {
        self.traverse()
            .into_iter()
            .filter(|&n| self.is_leaf(n))
            .collect()
    }

    /// Number of nodes reachable from the root
    pub fn node_count(&self) -> usize {
        self.traverse().len()
    }

    pub fn set_feature(&mut self, id: NodeId, key: impl Into<String>, value: impl ToString) {
        self.nodes[id.0]
            .features
            .insert(key.into(), value.to_string());
    }

    pub fn has_feature(&self, id: NodeId, key: &str) -> bool {
        self.nodes[id.0].features.contains_key(key)
    }

    /// Look up a feature. `name`, `dist` and `support` resolve to the node attributes.
    pub fn feature(&self, id: NodeId, key: &str) -> Option<Cow<'_, str>> {
        let node = &self.nodes[id.0];
        match key {
            "name" => Some(Cow::Borrowed(node.name.as_str())),
            "dist" => Some(Cow::Owned(format_float(node.dist))),
            "support" => Some(Cow::Owned(format_float(node.support))),
            _ => node.features.get(key).map(|v| Cow::Borrowed(v.as_str())),
        }
    }

    pub fn features(&self, id: NodeId) -> &BTreeMap<String, String> {
        &self.nodes[id.0].features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tree: &PhyloTree, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&n| tree.name(n).to_string()).collect()
    }

    fn sample() -> (PhyloTree, NodeId, NodeId) {
        // root -> (a -> (c, d), b)
        let mut tree = PhyloTree::with_root_name("root");
        let root = tree.root();
        let a = tree.add_child(root, "a");
        let b = tree.add_child(root, "b");
        tree.add_child(a, "c");
        tree.add_child(a, "d");
        (tree, a, b)
    }

    #[test]
    fn test_traverse_preorder() {
        let (tree, _, _) = sample();

        assert_eq!(names(&tree, &tree.traverse()), vec!["root", "a", "c", "d", "b"]);
        assert_eq!(names(&tree, &tree.leaves()), vec!["c", "d", "b"]);
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn test_delete_splices_children_in_place() {
        let (mut tree, a, _) = sample();
        tree.delete(a);

        let root = tree.root();
        assert_eq!(names(&tree, tree.children(root)), vec!["c", "d", "b"]);
        for &child in tree.children(root) {
            assert_eq!(tree.parent(child), Some(root));
        }
    }

    #[test]
    fn test_delete_root_is_noop() {
        let (mut tree, _, _) = sample();
        let root = tree.root();
        tree.delete(root);

        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn test_attach_moves_subtree() {
        let (mut tree, a, b) = sample();
        tree.attach(b, a);

        assert_eq!(names(&tree, &tree.traverse()), vec!["root", "b", "a", "c", "d"]);
        assert_eq!(tree.parent(a), Some(b));
    }

    #[test]
    fn test_set_root() {
        let (mut tree, a, _) = sample();
        tree.set_root(a);

        assert_eq!(tree.parent(a), None);
        assert_eq!(names(&tree, &tree.traverse()), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_builtin_features() {
        let (mut tree, a, _) = sample();
        tree.node_mut(a).dist = 0.5;
        tree.set_feature(a, "rank", "genus");

        assert_eq!(tree.feature(a, "name").unwrap(), "a");
        assert_eq!(tree.feature(a, "dist").unwrap(), "0.5");
        assert_eq!(tree.feature(a, "support").unwrap(), "1");
        assert_eq!(tree.feature(a, "rank").unwrap(), "genus");
        assert!(tree.feature(a, "taxid").is_none());
    }
}
