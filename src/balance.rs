use crate::{
    node::{Dir, NodeId},
    AvlTree, Side,
};

impl<K> AvlTree<K> {
    /// Returns `1 + max(h(left), h(right))` for `id` from its children's cached heights.
    #[inline]
    pub(crate) fn fresh_height(&self, id: NodeId) -> u8 {
        let node = &self.nodes[id];
        1 + self
            .nodes
            .height(node.left())
            .max(self.nodes.height(node.right()))
    }

    #[inline]
    fn update_height(&mut self, id: NodeId) {
        self.nodes[id].height = self.fresh_height(id);
    }

    #[inline]
    fn balance_factor(&self, id: NodeId) -> i16 {
        let node = &self.nodes[id];
        i16::from(self.nodes.height(node.left())) - i16::from(self.nodes.height(node.right()))
    }

    // Walks from `start` up to the root, refreshing heights and rotating wherever a balance
    // factor has left [-1, 1].
    //
    // The walk never stops early: after a removal, rotations may be needed at several levels.
    pub(crate) fn rebalance_from(&mut self, start: NodeId) {
        let mut opt_cur = Some(start);

        while let Some(cur) = opt_cur {
            self.update_height(cur);
            let factor = self.balance_factor(cur);

            let top = if factor > 1 {
                // Left-heavy. If the left child leans right, straighten it first.
                let left = self.nodes[cur].left();
                if let Some(left) = left.filter(|&l| self.balance_factor(l) < 0) {
                    self.rotate_left(left);
                }

                self.rotate_right(cur)
            } else if factor < -1 {
                let right = self.nodes[cur].right();
                if let Some(right) = right.filter(|&r| self.balance_factor(r) > 0) {
                    self.rotate_right(right);
                }

                self.rotate_left(cur)
            } else {
                cur
            };

            // `top` is the root of the subtree formerly rooted at `cur`, with its height current.
            opt_cur = self.nodes[top].parent;
        }
    }

    /// Promotes the left child of `node`, returning it.
    #[inline]
    fn rotate_right(&mut self, node: NodeId) -> NodeId {
        self.rotate(node, Dir::Right)
    }

    /// Promotes the right child of `node`, returning it.
    #[inline]
    fn rotate_left(&mut self, node: NodeId) -> NodeId {
        self.rotate(node, Dir::Left)
    }

    // Performs a rotation, moving `down` into the `dir` child slot of its `!dir` child `up`, and
    // returns `up`. If `down` has no `!dir` child nothing changes and `down` is returned.
    //
    // - `up` takes over the parent link and side tag of `down`.
    // - `across` goes from the `dir` child of `up` to the `!dir` child of `down`.
    // - Heights of `down` and then `up` are recomputed.
    fn rotate(&mut self, down: NodeId, dir: Dir) -> NodeId {
        let Some(up) = self.nodes[down].child(!dir) else {
            return down;
        };

        let across = self.nodes[up].child(dir);
        self.nodes[down].set_child(!dir, across);
        if let Some(across) = across {
            let across = &mut self.nodes[across];
            across.parent = Some(down);
            across.side = Side::from(!dir);
        }

        let parent = self.nodes[down].parent;
        let side = self.nodes[down].side;
        self.replace_child_or_set_root(parent, side, Some(up));

        let up_node = &mut self.nodes[up];
        up_node.parent = parent;
        up_node.side = side;
        up_node.set_child(dir, Some(down));

        let down_node = &mut self.nodes[down];
        down_node.parent = Some(up);
        down_node.side = Side::from(dir);

        self.update_height(down);
        self.update_height(up);

        up
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(keys: &[u32]) -> AvlTree<u32> {
        let mut tree = AvlTree::new();
        for &key in keys {
            assert!(tree.insert(key));
        }
        tree.assert_invariants();
        tree
    }

    fn shape(tree: &AvlTree<u32>) -> Vec<(u32, Side)> {
        tree.pre_order().map(|(&key, side)| (key, side)).collect()
    }

    #[test]
    fn rotation_preserves_order_and_links() {
        // 2(1, 4(3, 5)) -> 4(2(1, 3), 5)
        let mut tree = tree_of(&[2, 1, 4, 3, 5]);
        let root = tree.root.unwrap();

        let up = tree.rotate_left(root);
        assert_eq!(tree.root, Some(up));
        assert_eq!(tree.nodes[up].key, 4);
        assert_eq!(
            shape(&tree),
            [
                (4, Side::Root),
                (2, Side::Left),
                (1, Side::Left),
                (3, Side::Right),
                (5, Side::Right),
            ]
        );
        assert_eq!(tree.height(), 3);

        // This shape is left-heavy but still AVL-balanced.
        tree.assert_invariants();

        let back = tree.rotate_right(up);
        assert_eq!(tree.nodes[back].key, 2);
        assert_eq!(
            shape(&tree),
            [
                (2, Side::Root),
                (1, Side::Left),
                (4, Side::Right),
                (3, Side::Left),
                (5, Side::Right),
            ]
        );
        tree.assert_invariants();
    }

    #[test]
    fn rotate_without_child_is_noop() {
        let mut tree = tree_of(&[1, 2]);
        let root = tree.root.unwrap();

        assert_eq!(tree.rotate_right(root), root);
        assert_eq!(shape(&tree), [(1, Side::Root), (2, Side::Right)]);
    }

    #[test]
    fn balance_factor_sign() {
        let tree = tree_of(&[2, 1]);
        assert_eq!(tree.balance_factor(tree.root.unwrap()), 1);

        let tree = tree_of(&[1, 2]);
        assert_eq!(tree.balance_factor(tree.root.unwrap()), -1);
    }
}
