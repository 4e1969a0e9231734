use std::ops::Range;

use proptest::prelude::*;

use crate::model;

use super::*;

fn tree_of(keys: &[u32]) -> AvlTree<u32> {
    let mut tree = AvlTree::new();

    for &key in keys {
        assert!(tree.insert(key));
        model::check_tree(&tree);
    }

    tree
}

fn shape(tree: &AvlTree<u32>) -> Vec<(u32, Side)> {
    tree.pre_order().map(|(&key, side)| (key, side)).collect()
}

fn contents(tree: &AvlTree<u32>) -> Vec<u32> {
    tree.iter().copied().collect()
}

// Calls `f` with every ordering of `0..n`.
fn for_each_permutation(n: u32, mut f: impl FnMut(&[u32])) {
    fn go(keys: &mut Vec<u32>, k: usize, f: &mut impl FnMut(&[u32])) {
        if k == keys.len() {
            f(&keys[..]);
            return;
        }

        for i in k..keys.len() {
            keys.swap(k, i);
            go(keys, k + 1, f);
            keys.swap(k, i);
        }
    }

    go(&mut (0..n).collect(), 0, &mut f);
}

fn insert_find_all(keys: &[u32]) {
    let tree = tree_of(keys);

    for key in keys {
        assert_eq!(tree.get(key), Some(key));
    }

    let mut sorted = keys.to_vec();
    sorted.sort_unstable();
    assert_eq!(contents(&tree), sorted);
}

fn insert_remove_all(keys: &[u32]) {
    let mut tree = tree_of(keys);

    for key in keys {
        assert!(tree.remove(key));
        model::check_tree(&tree);
    }
    assert!(tree.is_empty());

    for &key in keys {
        assert!(tree.insert(key));
        model::check_tree(&tree);
    }

    for key in keys.iter().rev() {
        assert_eq!(tree.take(key), Some(*key));
        model::check_tree(&tree);
    }
    assert!(tree.is_empty());
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn small_trees_find() {
    for n in 1..=6 {
        for_each_permutation(n, insert_find_all);
    }
}

#[test]
fn small_trees_remove() {
    for n in 1..=6 {
        for_each_permutation(n, insert_remove_all);
    }
}

#[test]
fn single_left_rotation() {
    let tree = tree_of(&[10, 20, 30]);

    assert_eq!(
        shape(&tree),
        [(20, Side::Root), (10, Side::Left), (30, Side::Right)]
    );
    assert_eq!(tree.root(), Some(&20));
    assert_eq!(tree.height(), 2);
}

#[test]
fn single_right_rotation() {
    let tree = tree_of(&[30, 20, 10]);

    assert_eq!(
        shape(&tree),
        [(20, Side::Root), (10, Side::Left), (30, Side::Right)]
    );
    assert_eq!(tree.height(), 2);
}

#[test]
fn double_rotation() {
    let tree = tree_of(&[10, 30, 20]);
    assert_eq!(
        shape(&tree),
        [(20, Side::Root), (10, Side::Left), (30, Side::Right)]
    );

    let tree = tree_of(&[30, 10, 20]);
    assert_eq!(
        shape(&tree),
        [(20, Side::Root), (10, Side::Left), (30, Side::Right)]
    );
}

#[test]
fn double_rotation_below_root() {
    // 20 becomes left-right heavy while the root stays balanced; the fix must happen at 20.
    let tree = tree_of(&[50, 20, 80, 10, 90, 15]);

    assert_eq!(
        shape(&tree),
        [
            (50, Side::Root),
            (15, Side::Left),
            (10, Side::Left),
            (20, Side::Right),
            (80, Side::Right),
            (90, Side::Right),
        ]
    );
    assert_eq!(tree.height(), 3);
}

#[test]
fn remove_inner_node() {
    let mut tree = tree_of(&[1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(tree.root(), Some(&4));

    assert!(tree.remove(&4));
    model::check_tree(&tree);

    assert_eq!(tree.size(), 6);
    assert!(!tree.contains(&4));
    assert_eq!(contents(&tree), [1, 2, 3, 5, 6, 7]);
    assert_eq!(tree.root(), Some(&5));
}

#[test]
fn remove_successor_that_is_high() {
    // 2's successor is 3, which is also the maximum.
    let mut tree = tree_of(&[2, 1, 3]);

    assert!(tree.remove(&2));
    model::check_tree(&tree);

    assert_eq!(shape(&tree), [(3, Side::Root), (1, Side::Left)]);
    assert_eq!(tree.peek_low(), Some(&1));
    assert_eq!(tree.peek_high(), Some(&3));
}

#[test]
fn remove_requires_rotations_on_two_levels() {
    // A left-leaning tree of height 5; removing its maximum unbalances 11 and then the root.
    let mut tree = tree_of(&[8, 5, 11, 3, 7, 10, 12, 2, 4, 6, 9, 1]);
    assert_eq!(tree.height(), 5);

    assert!(tree.remove(&12));
    model::check_tree(&tree);
    assert_eq!(contents(&tree), [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
    assert_eq!(tree.height(), 4);
}

#[test]
fn empty_tree() {
    let mut tree: AvlTree<u32> = AvlTree::new();

    assert_eq!(tree.root(), None);
    assert_eq!(tree.height(), 0);
    assert_eq!(tree.size(), 0);
    assert_eq!(tree.peek_low(), None);
    assert_eq!(tree.peek_high(), None);
    assert_eq!(tree.poll_low(), None);
    assert_eq!(tree.poll_high(), None);
    assert!(!tree.contains(&7));
    assert!(!tree.remove(&7));
    assert_eq!(tree.pre_order().count(), 0);
    tree.assert_invariants();
}

#[test]
fn poll_low_repeatedly() {
    let mut tree = tree_of(&[5, 3, 8, 1, 4, 7, 9]);

    for expected in [1, 3, 4, 5] {
        assert_eq!(tree.poll_low(), Some(expected));
        model::check_tree(&tree);
    }

    assert_eq!(contents(&tree), [7, 8, 9]);
    assert_eq!(tree.peek_low(), Some(&7));
    assert_eq!(tree.peek_high(), Some(&9));
}

#[test]
fn poll_high_promotes_left_subtree() {
    let mut tree = tree_of(&[2, 1, 4, 3]);

    assert_eq!(tree.poll_high(), Some(4));
    model::check_tree(&tree);
    assert_eq!(tree.peek_high(), Some(&3));

    assert_eq!(tree.poll_high(), Some(3));
    assert_eq!(tree.poll_high(), Some(2));
    assert_eq!(tree.poll_high(), Some(1));
    assert_eq!(tree.poll_high(), None);
    assert!(tree.is_empty());
    tree.assert_invariants();
}

#[test]
fn duplicate_insert_changes_nothing() {
    let mut tree = tree_of(&[4, 2, 6, 1, 3]);
    let before = shape(&tree);

    assert!(!tree.insert(3));

    assert_eq!(tree.size(), 5);
    assert_eq!(tree.height(), 3);
    assert_eq!(tree.peek_low(), Some(&1));
    assert_eq!(tree.peek_high(), Some(&6));
    assert_eq!(shape(&tree), before);
}

#[test]
fn pre_order_restarts() {
    let tree = tree_of(&[2, 1, 3]);

    let mut walk = tree.pre_order();
    assert_eq!(walk.next(), Some((&2, Side::Root)));

    let replay = walk.clone();
    assert_eq!(walk.collect::<Vec<_>>(), [(&1, Side::Left), (&3, Side::Right)]);
    assert_eq!(replay.count(), 2);
    assert_eq!(tree.pre_order().count(), 3);

    let printed = tree
        .pre_order()
        .map(|(key, side)| format!("{key}:{side}"))
        .collect::<Vec<_>>()
        .join(" ");
    assert_eq!(printed, "2:root 1:left 3:right");
}

#[test]
fn into_iter_drains_both_ends() {
    let tree: AvlTree<u32> = [5, 1, 4, 2, 3].into_iter().collect();

    let mut drain = tree.into_iter();
    assert_eq!(drain.len(), 5);
    assert_eq!(drain.next(), Some(1));
    assert_eq!(drain.next_back(), Some(5));
    assert_eq!(drain.collect::<Vec<_>>(), [2, 3, 4]);
}

#[test]
fn clear_resets_boundaries() {
    let mut tree = tree_of(&[3, 1, 2]);

    tree.clear();
    tree.assert_invariants();
    assert!(tree.is_empty());
    assert_eq!(tree.peek_low(), None);

    assert!(tree.insert(9));
    assert_eq!(tree.peek_low(), Some(&9));
    assert_eq!(tree.peek_high(), Some(&9));
}

#[test]
fn debug_formats_as_set() {
    let tree = tree_of(&[3, 1, 2]);
    assert_eq!(format!("{tree:?}"), "{1, 2, 3}");
}

#[test]
fn borrowed_lookup() {
    let mut tree = AvlTree::new();
    assert!(tree.insert(String::from("b")));
    assert!(tree.insert(String::from("a")));

    assert!(tree.contains("a"));
    assert_eq!(tree.get("b").map(String::as_str), Some("b"));
    assert_eq!(tree.take("a"), Some(String::from("a")));
    assert!(!tree.contains("a"));
}

#[test]
fn dotgraph_lists_every_node() {
    let mut out = String::new();
    AvlTree::<u32>::new().dotgraph("empty", &mut out).unwrap();
    assert_eq!(out, "digraph \"graph-empty\" {}");

    let tree = tree_of(&[2, 1, 3]);
    let mut out = String::new();
    tree.dotgraph("t", &mut out).unwrap();

    assert!(out.starts_with("digraph \"graph-t\" {"));
    assert!(out.contains("[label=\"2:2\"]"));
    assert!(out.contains("[label=\"1:1\"]"));
    assert!(out.contains("[label=\"3:1\"]"));
    assert_eq!(out.matches("[shape=point]").count(), 4);
    assert!(out.ends_with(" }\n}"));
}

#[test]
fn validate_reports_corruption() {
    let mut tree = tree_of(&[2, 1, 3]);
    let root = tree.root.unwrap();

    tree.nodes[root].height = 7;
    assert_eq!(
        tree.validate(),
        Err(InvariantViolation::StaleHeight {
            position: 1,
            cached: 7,
            actual: 2,
        })
    );
    tree.nodes[root].height = 2;

    // 1 now sits left of a smaller key.
    tree.nodes[root].key = 0;
    assert_eq!(
        tree.validate(),
        Err(InvariantViolation::OutOfOrder { position: 0 })
    );
    tree.nodes[root].key = 2;

    tree.len = 4;
    assert_eq!(
        tree.validate(),
        Err(InvariantViolation::SizeMismatch {
            recorded: 4,
            reachable: 3,
        })
    );
    tree.len = 3;

    tree.low = tree.root;
    assert_eq!(tree.validate(), Err(InvariantViolation::LowBoundary));
}

#[test]
fn validate_reports_imbalance() {
    let mut tree = tree_of(&[1, 2]);
    let root = tree.root.unwrap();
    let right = tree.nodes[root].right().unwrap();

    // Hang a third node off the right child without rebalancing.
    let third = tree
        .nodes
        .alloc(Node::new(3, Some(right), Side::Right));
    tree.nodes[right].set_child(Dir::Right, Some(third));
    tree.nodes[right].height = 2;
    tree.nodes[root].height = 3;
    tree.high = Some(third);
    tree.len = 3;

    assert_eq!(
        tree.validate(),
        Err(InvariantViolation::Unbalanced {
            position: 0,
            factor: -2,
        })
    );
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence(ops);
    }

    #[test]
    fn drain_is_sorted(keys in proptest::collection::vec(any::<u16>(), 0..300)) {
        let mut expected = keys.clone();
        expected.sort_unstable();
        expected.dedup();

        let mut tree: AvlTree<u16> = keys.iter().copied().collect();
        prop_assert_eq!(tree.size(), expected.len());

        let mut ascending = Vec::new();
        while let Some(key) = tree.poll_low() {
            ascending.push(key);
            tree.assert_invariants();
        }
        prop_assert_eq!(&ascending, &expected);

        let tree: AvlTree<u16> = keys.iter().copied().collect();
        let descending: Vec<u16> = tree.into_iter().rev().collect();
        expected.reverse();
        prop_assert_eq!(descending, expected);
    }
}
