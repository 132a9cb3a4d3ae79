use std::fmt;

/// A variable identifier (1-indexed, 16 bits).
///
/// A smaller id is closer to the root of the diagram. Id 0 is reserved for
/// the terminal node, which is ordered below every variable; ordering
/// comparisons must therefore treat [`Var::ZERO`] specially rather than rely
/// on its numeric value.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(u16);

impl Var {
    /// The id carried by the terminal node.
    pub const ZERO: Self = Var(0);

    /// Creates a new variable with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id == 0`. Variables are 1-indexed.
    pub fn new(id: u16) -> Self {
        assert_ne!(id, 0, "Variable ids must be >= 1");
        Var(id)
    }

    pub const fn id(self) -> u16 {
        self.0
    }

    /// True for the id reserved for the terminal node.
    pub const fn is_terminal(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl From<Var> for u16 {
    fn from(var: Var) -> Self {
        var.0
    }
}
