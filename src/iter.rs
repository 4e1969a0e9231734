use core::iter::FusedIterator;

use crate::{
    node::{Link, NodeId},
    AvlTree, Side,
};

enum CameFrom {
    Parent,
    LeftChild,
    Here,
}

/// An iterator over the keys of an [`AvlTree`] in ascending order.
pub struct Iter<'tree, K> {
    tree: &'tree AvlTree<K>,

    front_cur: Link,
    front_from: CameFrom,

    len: usize,
}

impl<'tree, K> Iter<'tree, K> {
    pub(crate) fn new(tree: &'tree AvlTree<K>) -> Self {
        Iter {
            tree,

            front_cur: tree.root,
            front_from: CameFrom::Parent,
            len: tree.len(),
        }
    }
}

impl<'tree, K> Iterator for Iter<'tree, K> {
    type Item = &'tree K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let tree: &'tree AvlTree<K> = self.tree;
        let nodes = &tree.nodes;
        let mut cur = self.front_cur?;

        loop {
            match self.front_from {
                CameFrom::Parent => {
                    // Upon entering a new subtree, find the minimum element.
                    while let Some(left) = nodes[cur].left() {
                        cur = left;
                    }

                    self.front_from = CameFrom::LeftChild;
                }

                CameFrom::LeftChild => {
                    // The left subtree has been exhausted, so this node is up next.
                    self.front_cur = Some(cur);
                    self.front_from = CameFrom::Here;
                    self.len -= 1;

                    return Some(&nodes[cur].key);
                }

                CameFrom::Here => {
                    if let Some(right) = nodes[cur].right() {
                        self.front_from = CameFrom::Parent;
                        cur = right;
                        continue;
                    }

                    // Climb out of every subtree this node closes. The first ancestor reached
                    // from a left child is the successor.
                    while nodes[cur].side == Side::Right {
                        cur = nodes[cur].parent?;
                    }

                    cur = nodes[cur].parent?;
                    self.front_from = CameFrom::LeftChild;
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}

/// A pre-order walk over an [`AvlTree`], yielding each key with its [`Side`].
///
/// Cloning the walk gives an independent copy that resumes from the same point.
pub struct PreOrder<'tree, K> {
    tree: &'tree AvlTree<K>,
    stack: Vec<NodeId>,
}

impl<'tree, K> PreOrder<'tree, K> {
    pub(crate) fn new(tree: &'tree AvlTree<K>) -> Self {
        PreOrder {
            tree,
            stack: tree.root.into_iter().collect(),
        }
    }
}

impl<K> Clone for PreOrder<'_, K> {
    fn clone(&self) -> Self {
        PreOrder {
            tree: self.tree,
            stack: self.stack.clone(),
        }
    }
}

impl<'tree, K> Iterator for PreOrder<'tree, K> {
    type Item = (&'tree K, Side);

    fn next(&mut self) -> Option<Self::Item> {
        let tree: &'tree AvlTree<K> = self.tree;
        let node = &tree.nodes[self.stack.pop()?];

        // Right is pushed first so that the left subtree is walked first.
        self.stack.extend(node.right());
        self.stack.extend(node.left());

        Some((&node.key, node.side))
    }
}

impl<K> FusedIterator for PreOrder<'_, K> {}

/// An owning iterator over the keys of an [`AvlTree`].
///
/// Keys are taken from the front with [`AvlTree::poll_low`] and from the back with
/// [`AvlTree::poll_high`].
pub struct IntoIter<K> {
    tree: AvlTree<K>,
}

impl<K> IntoIter<K> {
    pub(crate) fn new(tree: AvlTree<K>) -> Self {
        IntoIter { tree }
    }
}

impl<K> Iterator for IntoIter<K> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        self.tree.poll_low()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.tree.len(), Some(self.tree.len()))
    }
}

impl<K> DoubleEndedIterator for IntoIter<K> {
    fn next_back(&mut self) -> Option<K> {
        self.tree.poll_high()
    }
}

impl<K> ExactSizeIterator for IntoIter<K> {}

impl<K> FusedIterator for IntoIter<K> {}
