use std::fmt;
use std::hash::{Hash, Hasher};

use hashmint_types::TreeHash;

use crate::bits::BitString;
use crate::builder::TreeBuilder;
use crate::reader::TreeReader;

/// One sealed node inside a [`BitTree`] arena.
#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) bits: BitString,
    /// Arena indices of the children, in order. Always less than this
    /// node's own index.
    pub(crate) children: Vec<u32>,
    pub(crate) hash: TreeHash,
}

/// An immutable, content-addressed tree of bit strings.
///
/// Nodes live in an arena in post-order with the root last. A `BitTree` can
/// only be produced by [`TreeBuilder::seal`], and every child is moved into
/// its parent's arena when appended, so no node is ever shared between two
/// trees.
///
/// Two trees are equal when their root hashes are equal.
#[derive(Clone)]
pub struct BitTree {
    nodes: Vec<Node>,
}

impl BitTree {
    pub(crate) fn from_arena(nodes: Vec<Node>) -> Self {
        debug_assert!(!nodes.is_empty(), "a sealed tree has at least its root");
        Self { nodes }
    }

    pub(crate) fn into_arena(self) -> Vec<Node> {
        self.nodes
    }

    /// A tree with no bits and no children.
    pub fn empty() -> Self {
        TreeBuilder::new().seal()
    }

    /// Borrowed view of the root node.
    pub fn root(&self) -> TreeRef<'_> {
        TreeRef {
            nodes: &self.nodes,
            index: self.nodes.len() - 1,
        }
    }

    /// Content address of the whole tree.
    pub fn hash(&self) -> TreeHash {
        self.root().hash()
    }

    /// Bits of the root node.
    pub fn bits(&self) -> &BitString {
        &self.nodes[self.nodes.len() - 1].bits
    }

    /// Number of children of the root node.
    pub fn child_count(&self) -> usize {
        self.root().child_count()
    }

    /// Borrowed view of the root's child at `index`.
    pub fn child(&self, index: usize) -> Option<TreeRef<'_>> {
        self.root().child(index)
    }

    /// Total number of nodes in the tree, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// A fresh reader positioned at the start of the root node.
    pub fn reader(&self) -> TreeReader<'_> {
        TreeReader::new(self.root())
    }
}

impl PartialEq for BitTree {
    fn eq(&self, other: &Self) -> bool {
        self.hash() == other.hash()
    }
}

impl Eq for BitTree {}

impl Hash for BitTree {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.root().hash().hash(state);
    }
}

impl Default for BitTree {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for BitTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.root(), f)
    }
}

/// Borrowed view of one node in a [`BitTree`].
#[derive(Clone, Copy)]
pub struct TreeRef<'a> {
    nodes: &'a [Node],
    index: usize,
}

impl<'a> TreeRef<'a> {
    fn node(&self) -> &'a Node {
        &self.nodes[self.index]
    }

    /// Content address of the subtree rooted here.
    pub fn hash(&self) -> TreeHash {
        self.node().hash
    }

    /// Bits of this node.
    pub fn bits(&self) -> &'a BitString {
        &self.node().bits
    }

    /// Number of children of this node.
    pub fn child_count(&self) -> usize {
        self.node().children.len()
    }

    /// The child at `index`, if present.
    pub fn child(&self, index: usize) -> Option<TreeRef<'a>> {
        self.node().children.get(index).map(|&child| TreeRef {
            nodes: self.nodes,
            index: child as usize,
        })
    }

    /// Iterate over this node's children in order.
    pub fn children(&self) -> impl Iterator<Item = TreeRef<'a>> + 'a {
        let nodes = self.nodes;
        self.node().children.iter().map(move |&child| TreeRef {
            nodes,
            index: child as usize,
        })
    }

    /// Copy the subtree rooted here into a standalone [`BitTree`].
    pub fn to_owned_tree(&self) -> BitTree {
        let mut arena = Vec::new();
        self.copy_into(&mut arena);
        BitTree::from_arena(arena)
    }

    /// A fresh reader positioned at the start of this node.
    pub fn reader(&self) -> TreeReader<'a> {
        TreeReader::new(*self)
    }

    fn copy_into(&self, arena: &mut Vec<Node>) -> u32 {
        let node = self.node();
        let children = self
            .children()
            .map(|child| child.copy_into(arena))
            .collect();
        arena.push(Node {
            bits: node.bits.clone(),
            children,
            hash: node.hash,
        });
        (arena.len() - 1) as u32
    }
}

impl fmt::Debug for TreeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_struct("BitTree");
        list.field("hash", &self.hash())
            .field("bits", self.bits());
        let children: Vec<TreeRef<'_>> = self.children().collect();
        if !children.is_empty() {
            list.field("children", &children);
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(byte: u8) -> BitTree {
        let mut builder = TreeBuilder::new();
        builder.append_u8(byte).unwrap();
        builder.seal()
    }

    fn pair(a: u8, b: u8) -> BitTree {
        let mut builder = TreeBuilder::new();
        builder.append_child(leaf(a)).unwrap();
        builder.append_child(leaf(b)).unwrap();
        builder.seal()
    }

    #[test]
    fn empty_tree_has_no_bits_or_children() {
        let tree = BitTree::empty();
        assert!(tree.bits().is_empty());
        assert_eq!(tree.child_count(), 0);
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn children_point_backwards_in_arena() {
        let mut builder = TreeBuilder::new();
        builder.append_child(pair(1, 2)).unwrap();
        builder.append_child(leaf(3)).unwrap();
        let tree = builder.seal();
        for (index, node) in tree.nodes.iter().enumerate() {
            for &child in &node.children {
                assert!((child as usize) < index);
            }
        }
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn equal_structure_has_equal_hash() {
        assert_eq!(pair(1, 2), pair(1, 2));
        assert_eq!(pair(1, 2).hash(), pair(1, 2).hash());
    }

    #[test]
    fn changing_a_child_changes_the_root_hash() {
        assert_ne!(pair(1, 2).hash(), pair(1, 3).hash());
        assert_ne!(pair(1, 2).hash(), pair(2, 1).hash());
    }

    #[test]
    fn child_views_expose_subtrees() {
        let tree = pair(7, 9);
        let second = tree.child(1).unwrap();
        assert_eq!(second.hash(), leaf(9).hash());
        assert!(tree.child(2).is_none());
    }

    #[test]
    fn to_owned_tree_preserves_hash_and_shape() {
        let mut builder = TreeBuilder::new();
        builder.append_u32(42).unwrap();
        builder.append_child(pair(4, 5)).unwrap();
        let tree = builder.seal();

        let sub = tree.child(0).unwrap().to_owned_tree();
        assert_eq!(sub, pair(4, 5));
        assert_eq!(sub.node_count(), 3);

        let whole = tree.root().to_owned_tree();
        assert_eq!(whole.hash(), tree.hash());
    }

    #[test]
    fn debug_output_names_hash() {
        let text = format!("{:?}", pair(1, 2));
        assert!(text.contains("hash"));
        assert!(text.contains("children"));
    }
}
