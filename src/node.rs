use core::{
    fmt,
    ops::{Index, IndexMut, Not},
};

/// A stable handle to a node stored in an [`Arena`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// The position of a node relative to its parent.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The node is its parent's left child.
    Left,
    /// The node is its parent's right child.
    Right,
    /// The node has no parent.
    Root,
}

impl Side {
    #[inline]
    pub(crate) fn dir(self) -> Option<Dir> {
        match self {
            Side::Left => Some(Dir::Left),
            Side::Right => Some(Dir::Right),
            Side::Root => None,
        }
    }
}

impl From<Dir> for Side {
    fn from(dir: Dir) -> Self {
        match dir {
            Dir::Left => Side::Left,
            Dir::Right => Side::Right,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Left => "left",
            Side::Right => "right",
            Side::Root => "root",
        })
    }
}

pub(crate) type Link = Option<NodeId>;

#[derive(Debug)]
pub(crate) struct Node<K> {
    pub(crate) key: K,
    pub(crate) height: u8,
    pub(crate) side: Side,
    pub(crate) parent: Link,
    pub(crate) children: [Link; 2],
}

impl<K> Node<K> {
    pub(crate) fn new(key: K, parent: Link, side: Side) -> Self {
        Node {
            key,
            height: 1,
            side,
            parent,
            children: [None; 2],
        }
    }

    #[inline]
    pub(crate) fn child(&self, dir: Dir) -> Link {
        self.children[dir as usize]
    }

    #[inline]
    pub(crate) fn left(&self) -> Link {
        self.child(Dir::Left)
    }

    #[inline]
    pub(crate) fn right(&self) -> Link {
        self.child(Dir::Right)
    }

    #[inline]
    pub(crate) fn set_child(&mut self, dir: Dir, child: Link) -> Link {
        core::mem::replace(&mut self.children[dir as usize], child)
    }
}

/// Backing storage for tree nodes.
///
/// Vacated slots are recycled through a free list before the table grows, so a
/// handle stays valid for as long as its node is in the tree.
pub(crate) struct Arena<K> {
    slots: Vec<Option<Node<K>>>,
    free: Vec<NodeId>,
}

impl<K> Arena<K> {
    pub(crate) const fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn alloc(&mut self, node: Node<K>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                debug_assert!(self.slots[id.index()].is_none());
                self.slots[id.index()] = Some(node);
                id
            }
            None => {
                let index = u32::try_from(self.slots.len()).expect("node arena exhausted");
                self.slots.push(Some(node));
                NodeId(index)
            }
        }
    }

    pub(crate) fn free(&mut self, id: NodeId) -> Node<K> {
        let node = self.slots[id.index()]
            .take()
            .expect("attempted to free a vacant node");
        self.free.push(id);
        node
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<K>> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    /// Returns the height of the subtree at `link`, or 0 if it is absent.
    #[inline]
    pub(crate) fn height(&self, link: Link) -> u8 {
        link.map_or(0, |id| self[id].height)
    }
}

impl<K> Index<NodeId> for Arena<K> {
    type Output = Node<K>;

    #[inline]
    fn index(&self, id: NodeId) -> &Node<K> {
        self.slots[id.index()]
            .as_ref()
            .expect("attempted to access invalid node")
    }
}

impl<K> IndexMut<NodeId> for Arena<K> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K> {
        self.slots[id.index()]
            .as_mut()
            .expect("attempted to access invalid node")
    }
}
