use avl_bounds::AvlTree;

fn print_tree(tree: &AvlTree<u32>) {
    let positions = tree
        .pre_order()
        .map(|(key, side)| format!("{key}:{side}"))
        .collect::<Vec<_>>();

    println!("{}", positions.join(" "));
    println!("{:?}", tree.iter().collect::<Vec<_>>());
}

fn main() {
    let mut tree: AvlTree<u32> = AvlTree::new();

    for key in [2, 0, 3, 4, 5, 1, 6] {
        tree.insert(key);
        tree.assert_invariants();
        print_tree(&tree);
    }

    let zero = tree.poll_low();
    assert_eq!(zero, Some(0));
    tree.assert_invariants();

    let six = tree.poll_high();
    assert_eq!(six, Some(6));
    tree.assert_invariants();

    tree.remove(&3);
    tree.assert_invariants();
    print_tree(&tree);

    let mut graph = String::new();
    if tree.dotgraph("demo", &mut graph).is_ok() {
        println!("{graph}");
    }
}
