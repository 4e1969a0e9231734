use std::{collections::VecDeque, fmt};

use crate::{node::NodeId, AvlTree};

impl<K: fmt::Display> AvlTree<K> {
    /// Writes the tree to `w` as a Graphviz `digraph` named `name`.
    ///
    /// Each level of the tree is emitted as one rank. Nodes are labelled `key:height` and missing
    /// children are drawn as points.
    pub fn dotgraph<W>(&self, name: &str, mut w: W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let root = match self.root {
            Some(r) => r,
            None => return write!(w, "digraph \"graph-{name}\" {{}}"),
        };

        enum Item {
            Node(NodeId),
            Missing(u32),
        }

        let mut queue = VecDeque::new();
        queue.push_back(Item::Node(root));

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut missing = 0;
        let mut links = String::new();

        while !queue.is_empty() {
            use fmt::Write;

            write!(w, "{{rank=same; ")?;

            for _ in 0..queue.len() {
                let id = match queue.pop_front() {
                    Some(Item::Node(id)) => id,
                    Some(Item::Missing(m)) => {
                        write!(w, "\"graph{name}-missing{m}\" [shape=point]; ")?;
                        continue;
                    }
                    None => break,
                };

                let node = &self.nodes[id];
                write!(
                    w,
                    "\"graph{name}-{id}\" [label=\"{}:{}\"]; ",
                    node.key, node.height
                )?;

                for child in [node.left(), node.right()] {
                    match child {
                        Some(child) => {
                            queue.push_back(Item::Node(child));
                            writeln!(links, "\"graph{name}-{id}\" -> \"graph{name}-{child}\";")?;
                        }
                        None => {
                            queue.push_back(Item::Missing(missing));
                            writeln!(
                                links,
                                "\"graph{name}-{id}\" -> \"graph{name}-missing{missing}\";"
                            )?;
                            missing += 1;
                        }
                    }
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&links)?;

        w.write_str(" }\n}")
    }
}
