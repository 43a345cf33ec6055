//! Variables and their metadata.
//!
//! A [`Var`] is the position of a variable in the store order (0 is the root-most level).
//! Variables are append-only, so the index of a variable never changes once assigned.

use std::fmt;

/// A variable index, which is also its order in the store.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(u32);

impl Var {
    pub const fn new(index: u32) -> Self {
        Var(index)
    }

    /// Returns the raw variable index.
    pub const fn id(self) -> u32 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl From<Var> for u32 {
    fn from(var: Var) -> Self {
        var.0
    }
}

/// Metadata of a variable registered in a manager.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Variable {
    /// Opaque identity used to match variables across managers.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Domain size (number of values), at least 2.
    pub nbval: u8,
    /// Position in the store order.
    pub order: Var,
}

impl Variable {
    /// Two variables are compatible when they share the key and the domain size.
    pub fn is_compatible(&self, other: &Variable) -> bool {
        self.key == other.key && self.nbval == other.nbval
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nbval == 2 {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}[{}]", self.name, self.nbval)
        }
    }
}

/// Effect of a variable on the value of a function.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VariableEffect {
    /// The variable never changes the result.
    #[default]
    None,
    /// Increasing the variable never decreases the result.
    Positive,
    /// Increasing the variable never increases the result.
    Negative,
    /// Both positive and negative effects occur.
    Dual,
}

impl VariableEffect {
    /// Merge two effects observed in different parts of a function.
    pub fn combine(self, other: VariableEffect) -> VariableEffect {
        match (self, other) {
            (VariableEffect::None, e) | (e, VariableEffect::None) => e,
            (a, b) if a == b => a,
            _ => VariableEffect::Dual,
        }
    }

    /// Whether the variable has a (non-trivial) effect.
    pub fn is_functional(self) -> bool {
        self != VariableEffect::None
    }
}
