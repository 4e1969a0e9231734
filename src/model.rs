use std::collections::BTreeSet;

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::AvlTree;

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    Contains(ItemValue),
    Remove(ItemValue),
    PeekLow,
    PollLow,
    PeekHigh,
    PollHigh,
}

impl Op {
    fn finalize(self, sorted: &[u32]) -> FinalOp {
        // Index values pick an existing key so that hits are as likely as misses.
        fn get_value(v: &[u32], i: ItemValue) -> u32 {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        idx as u32
                    } else {
                        v[idx % v.len()]
                    }
                }
                ItemValue::Random(v) => v,
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_value(sorted, item)),
            Op::Contains(item) => FinalOp::Contains(get_value(sorted, item)),
            Op::Remove(item) => FinalOp::Remove(get_value(sorted, item)),
            Op::PeekLow => FinalOp::PeekLow,
            Op::PollLow => FinalOp::PollLow,
            Op::PeekHigh => FinalOp::PeekHigh,
            Op::PollHigh => FinalOp::PollHigh,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32),
    Contains(u32),
    Remove(u32),
    PeekLow,
    PollLow,
    PeekHigh,
    PollHigh,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        value_strategy().prop_map(Op::Insert),
        value_strategy().prop_map(Op::Contains),
        value_strategy().prop_map(Op::Remove),
        Just(Op::PeekLow),
        Just(Op::PollLow),
        Just(Op::PeekHigh),
        Just(Op::PollHigh),
    ]
}

/// Returns the worst-case AVL height for `len` keys, `ceil(1.44 * log2(len + 2))`.
pub fn height_bound(len: usize) -> usize {
    (1.44 * ((len + 2) as f64).log2()).ceil() as usize
}

/// Asserts every invariant of `tree` along with the AVL height bound.
pub fn check_tree(tree: &AvlTree<u32>) {
    if let Err(violation) = tree.validate() {
        panic!("{violation}\n{tree:?}");
    }

    assert!(
        tree.height() <= height_bound(tree.len()),
        "height {} exceeds bound for {} keys",
        tree.height(),
        tree.len()
    );
}

/// Applies `ops` to both an [`AvlTree`] and a [`BTreeSet`], asserting equivalent results and a
/// valid tree after every step.
pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut sorted_values = Vec::with_capacity(ops.len());
    let mut btree = BTreeSet::new();
    let mut avl: AvlTree<u32> = AvlTree::new();

    fn insert_sorted(v: &mut Vec<u32>, value: u32) {
        if let Err(idx) = v.binary_search(&value) {
            v.insert(idx, value);
        }
    }

    fn remove_sorted(v: &mut Vec<u32>, value: u32) {
        if let Ok(idx) = v.binary_search(&value) {
            v.remove(idx);
        }
    }

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&sorted_values);

        match final_op {
            FinalOp::Insert(value) => {
                insert_sorted(&mut sorted_values, value);

                let from_btree = btree.insert(value);
                let from_avl = avl.insert(value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Contains(value) => {
                let from_btree = btree.contains(&value);
                let from_avl = avl.contains(&value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Remove(value) => {
                remove_sorted(&mut sorted_values, value);

                let from_btree = btree.remove(&value);
                let from_avl = avl.remove(&value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PeekLow => {
                let from_btree = btree.first();
                let from_avl = avl.peek_low();

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PollLow => {
                let from_btree = btree.pop_first();
                let from_avl = avl.poll_low();

                if let Some(value) = from_btree {
                    remove_sorted(&mut sorted_values, value);
                }

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PeekHigh => {
                let from_btree = btree.last();
                let from_avl = avl.peek_high();

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PollHigh => {
                let from_btree = btree.pop_last();
                let from_avl = avl.poll_high();

                if let Some(value) = from_btree {
                    remove_sorted(&mut sorted_values, value);
                }

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }
        }

        check_tree(&avl);
        assert_eq!(btree.len(), avl.len());
        assert_eq!(btree.first(), avl.peek_low());
        assert_eq!(btree.last(), avl.peek_high());
        assert!(btree.iter().eq(avl.iter()));
    }
}
