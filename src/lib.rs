//! An AVL tree with constant-time access to its minimum and maximum keys.

// Conventions used in comments:
// - The height of a node `x` is denoted `h(x)`; a missing child has height 0.
// - The balance factor of `x` is `h(left(x)) - h(right(x))`.
// - `low` and `high` are the cached boundary nodes, i.e. the leftmost and rightmost nodes.
//
// The invariants restored by every public operation are:
// 1. An in-order walk yields strictly increasing keys.
// 2. Every balance factor is -1, 0 or 1.
// 3. `len` is the number of nodes reachable from the root.
// 4. `low` and `high` are `None` exactly when the tree is empty.
//
// Nodes live in an arena and refer to each other by `NodeId`. Children are owned through the
// arena; parent links are plain handles used only to walk upwards.

use core::{borrow::Borrow, cmp::Ordering, fmt, mem};

mod balance;
mod debug;
mod error;
mod iter;
mod node;

#[cfg(any(test, feature = "model"))]
pub mod model;

#[cfg(test)]
mod tests;

pub use error::InvariantViolation;
pub use iter::{IntoIter, Iter, PreOrder};
pub use node::Side;

use node::{Arena, Dir, Link, Node, NodeId};

/// An ordered set backed by an AVL tree.
///
/// Membership queries, insertion and removal complete in _O(log(n))_ time. The minimum and
/// maximum keys are cached, so [`peek_low`] and [`peek_high`] complete in _O(1)_ time.
///
/// [`peek_low`]: AvlTree::peek_low
/// [`peek_high`]: AvlTree::peek_high
pub struct AvlTree<K> {
    nodes: Arena<K>,
    root: Link,
    low: Link,
    high: Link,
    len: usize,
}

/// Where a search for a key ended.
enum Search {
    /// The tree has no nodes.
    Empty,
    /// The key is stored at this node.
    Found(NodeId),
    /// The key is absent; it belongs in the `dir` child slot of `parent`, which is empty.
    Vacant { parent: NodeId, dir: Dir },
}

impl<K> AvlTree<K> {
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree<K> {
        AvlTree {
            nodes: Arena::new(),
            root: None,
            low: None,
            high: None,
            len: 0,
        }
    }

    /// Returns `true` if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        let empty = self.len == 0;

        if cfg!(debug_assertions) {
            assert_eq!(empty, self.root.is_none());
        }

        empty
    }

    /// Returns the number of elements in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of elements in the tree.
    ///
    /// This is the same as [`len`](AvlTree::len).
    pub const fn size(&self) -> usize {
        self.len
    }

    /// Returns the key stored at the root, or `None` if the tree is empty.
    pub fn root(&self) -> Option<&K> {
        self.root.map(|root| &self.nodes[root].key)
    }

    /// Returns the height of the tree. An empty tree has height 0 and a single node has height 1.
    pub fn height(&self) -> usize {
        self.nodes.height(self.root).into()
    }

    /// Returns the minimum key of the tree.
    ///
    /// This operation completes in _O(1)_ time.
    pub fn peek_low(&self) -> Option<&K> {
        self.low.map(|low| &self.nodes[low].key)
    }

    /// Returns the maximum key of the tree.
    ///
    /// This operation completes in _O(1)_ time.
    pub fn peek_high(&self) -> Option<&K> {
        self.high.map(|high| &self.nodes[high].key)
    }

    /// Removes and returns the minimum key of the tree.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn poll_low(&mut self) -> Option<K> {
        // The minimum has no left child.
        let low = self.low?;
        Some(self.unlink(low))
    }

    /// Removes and returns the maximum key of the tree.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn poll_high(&mut self) -> Option<K> {
        // The maximum has no right child.
        let high = self.high?;
        Some(self.unlink(high))
    }

    /// Clears the tree, removing all elements.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.low = None;
        self.high = None;
        self.len = 0;
    }

    /// Returns an iterator over the keys of the tree in ascending order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self)
    }

    /// Returns a pre-order walk of the tree, yielding each key with its position relative to its
    /// parent.
    ///
    /// The walk is lazy; calling this again restarts it from the root.
    pub fn pre_order(&self) -> PreOrder<'_, K> {
        PreOrder::new(self)
    }

    // Removes the key held by `id` from the tree and returns it.
    fn remove_node(&mut self, id: NodeId) -> K {
        let node = &self.nodes[id];

        match (node.left(), node.right()) {
            (Some(_), Some(right)) => {
                // The successor is the minimum of the right subtree, so it has no left child and
                // can be unlinked directly. Its key then replaces the removed one, which keeps the
                // in-order sequence intact.
                let successor = self.extreme(right, Dir::Left);
                let key = self.unlink(successor);
                mem::replace(&mut self.nodes[id].key, key)
            }

            _ => self.unlink(id),
        }
    }

    // Unlinks `id`, which must have at most one child, elevating that child into its slot.
    //
    // Boundary references are moved off `id`, `len` is decremented and the tree is rebalanced
    // from the parent of `id` up to the root.
    fn unlink(&mut self, id: NodeId) -> K {
        let Node {
            key,
            side,
            parent,
            children,
            ..
        } = self.nodes.free(id);

        debug_assert!(children.iter().any(Option::is_none));
        let child = children[Dir::Left as usize].or(children[Dir::Right as usize]);

        if let Some(child) = child {
            let child = &mut self.nodes[child];
            child.parent = parent;
            child.side = side;
        }

        self.replace_child_or_set_root(parent, side, child);

        // The low node has no left child, so its replacement is the minimum of its right subtree;
        // if it had none, its parent is the next key up.
        if self.low == Some(id) {
            self.low = child.map(|c| self.extreme(c, Dir::Left)).or(parent);
        }

        if self.high == Some(id) {
            self.high = child.map(|c| self.extreme(c, Dir::Right)).or(parent);
        }

        self.len -= 1;

        if let Some(parent) = parent {
            self.rebalance_from(parent);
        }

        key
    }

    // Points the `side` child link of `parent` at `child`, or makes `child` the root.
    //
    // `child`'s own parent link and side tag are not updated.
    #[inline]
    fn replace_child_or_set_root(&mut self, parent: Link, side: Side, child: Link) {
        match (parent, side.dir()) {
            (Some(parent), Some(dir)) => {
                self.nodes[parent].set_child(dir, child);
            }
            _ => self.root = child,
        }
    }

    // Returns the node reached by following `dir` children from `node` until none remain.
    fn extreme(&self, node: NodeId, dir: Dir) -> NodeId {
        let mut cur = node;

        while let Some(next) = self.nodes[cur].child(dir) {
            cur = next;
        }

        cur
    }
}

impl<K: Ord> AvlTree<K> {
    /// Returns `true` if the tree contains `key`.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        matches!(self.search(key), Search::Found(_))
    }

    /// Returns a reference to the stored key equal to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.search(key) {
            Search::Found(id) => Some(&self.nodes[id].key),
            _ => None,
        }
    }

    fn search<Q>(&self, key: &Q) -> Search
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(mut cur) = self.root else {
            return Search::Empty;
        };

        loop {
            let node = &self.nodes[cur];

            let dir = match key.cmp(node.key.borrow()) {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return Search::Found(cur),
                Ordering::Greater => Dir::Right,
            };

            match node.child(dir) {
                Some(child) => cur = child,
                None => return Search::Vacant { parent: cur, dir },
            }
        }
    }

    /// Inserts `key` into the tree.
    ///
    /// Returns `false`, leaving the tree untouched, if an equal key is already present.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, key: K) -> bool {
        let (parent, dir) = match self.search(&key) {
            Search::Found(_) => return false,

            Search::Empty => {
                let id = self.nodes.alloc(Node::new(key, None, Side::Root));
                self.root = Some(id);
                self.low = Some(id);
                self.high = Some(id);
                self.len = 1;
                return true;
            }

            Search::Vacant { parent, dir } => (parent, dir),
        };

        let id = self
            .nodes
            .alloc(Node::new(key, Some(parent), Side::from(dir)));
        self.nodes[parent].set_child(dir, Some(id));

        match dir {
            Dir::Left if self.low == Some(parent) => self.low = Some(id),
            Dir::Right if self.high == Some(parent) => self.high = Some(id),
            _ => (),
        }

        self.len += 1;

        // If the parent already had a child its height is unchanged, and so is every ancestor's.
        if self.nodes[parent].height == self.fresh_height(parent) {
            return true;
        }

        self.rebalance_from(parent);
        true
    }

    /// Removes `key` from the tree, returning `true` if it was present.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.take(key).is_some()
    }

    /// Removes and returns the stored key equal to `key`.
    pub fn take<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.search(key) {
            Search::Found(id) => Some(self.remove_node(id)),
            _ => None,
        }
    }

    /// Checks every structural invariant of the tree.
    ///
    /// This walks the whole tree and completes in _O(n)_ time.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let Some(root) = self.root else {
            if self.len != 0 {
                return Err(InvariantViolation::SizeMismatch {
                    recorded: self.len,
                    reachable: 0,
                });
            }

            if self.low.is_some() {
                return Err(InvariantViolation::LowBoundary);
            }

            if self.high.is_some() {
                return Err(InvariantViolation::HighBoundary);
            }

            return Ok(());
        };

        let root_node = &self.nodes[root];
        if root_node.parent.is_some() || root_node.side != Side::Root {
            return Err(InvariantViolation::DetachedRoot);
        }

        let mut reachable = 0;
        self.validate_at(root, None, None, &mut reachable)?;

        if reachable != self.len {
            return Err(InvariantViolation::SizeMismatch {
                recorded: self.len,
                reachable,
            });
        }

        if self.low != Some(self.extreme(root, Dir::Left)) {
            return Err(InvariantViolation::LowBoundary);
        }

        if self.high != Some(self.extreme(root, Dir::Right)) {
            return Err(InvariantViolation::HighBoundary);
        }

        Ok(())
    }

    // Validates the subtree at `id`, whose keys must lie strictly between `lower` and `upper`.
    //
    // `seen` counts the nodes already visited in order. Returns the subtree's actual height.
    fn validate_at<'a>(
        &'a self,
        id: NodeId,
        lower: Option<&'a K>,
        upper: Option<&'a K>,
        seen: &mut usize,
    ) -> Result<u8, InvariantViolation> {
        let node = &self.nodes[id];

        let left = match node.left() {
            Some(left) => self.validate_at(left, lower, Some(&node.key), seen)?,
            None => 0,
        };

        let position = *seen;
        *seen += 1;

        if lower.is_some_and(|lo| node.key <= *lo) || upper.is_some_and(|hi| node.key >= *hi) {
            return Err(InvariantViolation::OutOfOrder { position });
        }

        for dir in [Dir::Left, Dir::Right] {
            if let Some(child) = node.child(dir) {
                let linked = self
                    .nodes
                    .get(child)
                    .is_some_and(|c| c.parent == Some(id) && c.side == Side::from(dir));

                if !linked {
                    return Err(InvariantViolation::BrokenLink { position });
                }
            }
        }

        let right = match node.right() {
            Some(right) => self.validate_at(right, Some(&node.key), upper, seen)?,
            None => 0,
        };

        let actual = 1 + left.max(right);
        if node.height != actual {
            return Err(InvariantViolation::StaleHeight {
                position,
                cached: node.height,
                actual,
            });
        }

        let factor = i16::from(left) - i16::from(right);
        if !(-1..=1).contains(&factor) {
            return Err(InvariantViolation::Unbalanced { position, factor });
        }

        Ok(actual)
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        if let Err(violation) = self.validate() {
            panic!("AVL invariant violated: {violation}");
        }
    }
}

impl<K> Default for AvlTree<K> {
    fn default() -> Self {
        AvlTree::new()
    }
}

impl<K: fmt::Debug> fmt::Debug for AvlTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: Ord> FromIterator<K> for AvlTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = AvlTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord> Extend<K> for AvlTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'tree, K> IntoIterator for &'tree AvlTree<K> {
    type Item = &'tree K;
    type IntoIter = Iter<'tree, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K> IntoIterator for AvlTree<K> {
    type Item = K;
    type IntoIter = IntoIter<K>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}
