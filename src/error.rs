use thiserror::Error;

/// A broken structural invariant, as reported by [`AvlTree::validate`].
///
/// Nodes are identified by their zero-based position in ascending key order.
///
/// [`AvlTree::validate`]: crate::AvlTree::validate
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("key at position {position} is out of order")]
    OutOfOrder { position: usize },

    #[error("node at position {position} has balance factor {factor}")]
    Unbalanced { position: usize, factor: i16 },

    #[error("node at position {position} caches height {cached} but has height {actual}")]
    StaleHeight {
        position: usize,
        cached: u8,
        actual: u8,
    },

    #[error("a child of the node at position {position} has a stale parent link or side tag")]
    BrokenLink { position: usize },

    #[error("root node has a parent link or is not tagged as the root")]
    DetachedRoot,

    #[error("tree records {recorded} elements but {reachable} are reachable")]
    SizeMismatch { recorded: usize, reachable: usize },

    #[error("low boundary does not point at the minimum")]
    LowBoundary,

    #[error("high boundary does not point at the maximum")]
    HighBoundary,
}
