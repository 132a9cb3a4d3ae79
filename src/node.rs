use crate::reference::Ref;
use crate::types::Var;

/// A BDD node: one Shannon decomposition point in the shared diagram.
///
/// # Fields
///
/// - `variable`: variable id (1-indexed; [`Var::ZERO`] marks the terminal)
/// - `low`: else-child edge (may carry a complement bit)
/// - `high`: then-child edge (never complemented, by canonicity)
/// - `next`: next node in the unique-table collision chain
/// - `refs`: saturating 16-bit reference counter
/// - `marked`: transient traversal flag
///
/// # Structure
///
/// Each node represents a Shannon decomposition:
/// ```text
/// f = (¬v ∧ f_low) ∨ (v ∧ f_high)
/// ```
///
/// Nodes live in a single arena and double as unique-table entries: the
/// `next` field chains nodes whose key hashes into the same bucket, so no
/// separate entry wrapper is needed.
///
/// The reference counter saturates at `u16::MAX`; a saturated node is pinned
/// and never collected. The `marked` flag is reserved for depth-first
/// traversals and must be left cleared between them.
#[derive(Debug, Copy, Clone)]
pub struct Node {
    pub variable: Var,
    pub low: Ref,
    pub high: Ref,
    /// Next node in the collision chain. [`NO_NEXT`][Node::NO_NEXT] means end of chain.
    pub next: u32,
    pub refs: u16,
    pub marked: bool,
}

impl Node {
    /// Sentinel value for end of hash collision chain.
    pub const NO_NEXT: u32 = 0;

    /// Refcount value at which the node becomes pinned.
    pub const SATURATED: u16 = u16::MAX;

    /// Creates a new node with the given variable and children.
    ///
    /// The refcount starts at 1, accounting for the handle returned to the
    /// creator; child edge ownership is established by the storage layer.
    pub fn new(variable: Var, low: Ref, high: Ref) -> Self {
        Self {
            variable,
            low,
            high,
            next: Self::NO_NEXT,
            refs: 1,
            marked: false,
        }
    }

    /// The single constant leaf. It has no children and starts pinned with
    /// one reference that is never released.
    pub fn terminal() -> Self {
        Self {
            variable: Var::ZERO,
            low: Ref::INVALID,
            high: Ref::INVALID,
            next: Self::NO_NEXT,
            refs: 1,
            marked: false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.variable.is_terminal()
    }

    pub fn is_saturated(&self) -> bool {
        self.refs == Self::SATURATED
    }
}

impl Default for Node {
    fn default() -> Self {
        Self {
            variable: Var::ZERO,
            low: Ref::INVALID,
            high: Ref::INVALID,
            next: Self::NO_NEXT,
            refs: 0,
            marked: false,
        }
    }
}
