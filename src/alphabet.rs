use std::fmt;

use itertools::Itertools;

use crate::math::OrderedSet;

/// Atomic input element that automata read. Epsilon is deliberately not a
/// symbol; transitions that consume nothing carry [`Label::Epsilon`] instead,
/// so an alphabet can never contain epsilon by construction.
pub type Symbol = char;

/// Label of a single transition. Either an alphabet symbol or epsilon, the label
/// of transitions taken without consuming input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    /// Consumes the contained symbol.
    Symbol(Symbol),
    /// Consumes nothing.
    Epsilon,
}

impl Label {
    /// Returns true if this label is epsilon.
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Label::Epsilon)
    }

    /// Returns the consumed symbol, or `None` for epsilon.
    pub fn symbol(&self) -> Option<Symbol> {
        match self {
            Label::Symbol(sym) => Some(*sym),
            Label::Epsilon => None,
        }
    }
}

impl From<Symbol> for Label {
    fn from(sym: Symbol) -> Self {
        Label::Symbol(sym)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Symbol(sym) => write!(f, "{sym}"),
            Label::Epsilon => write!(f, "ε"),
        }
    }
}

/// A finite set of input symbols, kept in sorted order so that iteration and
/// display are canonical. Drives completion and the product operations, which
/// enumerate the full symbol universe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alphabet {
    symbols: OrderedSet<Symbol>,
}

impl Alphabet {
    /// Creates an empty alphabet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an alphabet of the first `size` lower-case letters. Mainly
    /// useful for tests and examples.
    pub fn of_size(size: usize) -> Self {
        assert!(size <= 26, "supports at most 26 letters");
        (0..size).map(|i| (b'a' + i as u8) as char).collect()
    }

    /// Returns true if `sym` is declared in this alphabet.
    pub fn contains(&self, sym: Symbol) -> bool {
        self.symbols.contains(&sym)
    }

    /// Declares `sym`, returning true if it was not present before.
    pub fn insert(&mut self, sym: Symbol) -> bool {
        self.symbols.insert(sym)
    }

    /// Removes `sym`, returning true if it was present.
    pub fn remove(&mut self, sym: Symbol) -> bool {
        self.symbols.remove(&sym)
    }

    /// Iterates the declared symbols in ascending order.
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.symbols.iter().copied()
    }

    /// Number of declared symbols.
    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if no symbol is declared.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Returns the union of `self` and `other`, used to reconcile operands of
    /// language operations onto a common alphabet.
    pub fn union(&self, other: &Alphabet) -> Alphabet {
        self.symbols().chain(other.symbols()).collect()
    }
}

impl FromIterator<Symbol> for Alphabet {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Self {
            symbols: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.symbols().join(", "))
    }
}
