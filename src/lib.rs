//! Library for building and analyzing finite automata.
//!
//! The central type is [`Automaton`]: a finite collection of states held in a flat arena and addressed by stable [`StateId`]s, connected by transitions that are labelled either with a symbol of the associated [`Alphabet`] or with [`Label::Epsilon`]. Each state carries a display name together with its initial and accepting flags. There is deliberately just one automaton type and determinism is a property of a value rather than of a type: [`Automaton::is_deterministic`] checks it, and [`Automaton::determinism_violations`] explains a failed check with concrete [`Nondeterminism`] witnesses instead of a bare boolean.
//!
//! All classical constructions are implemented as non-mutating methods. Each call consumes a snapshot of the automaton and returns a fresh one, the input is never touched: [`Automaton::determinize`] performs the subset construction, [`Automaton::complete`] adds a rejecting sink for the missing transitions, [`Automaton::minimize`] runs partition refinement down to the unique minimal DFA, and [`Automaton::union`], [`Automaton::intersection`] and [`Automaton::complement`] lift the boolean set operations to languages via the product construction. Languages are compared with [`Automaton::equivalent`], which reduces both sides to their canonical forms, or refuted concretely with [`Automaton::distinguishing_word`].
//!
//! Words are run with [`Automaton::accepts`], while [`Automaton::trace`] records the visited state sets one symbol at a time, which is the representation a debugger or animation frontend consumes. [`Automaton::accepted_words`] and [`Automaton::rejected_words`] enumerate the language up to a length bound in length-lexicographic order.
//!
//! Automata are either grown through the checked mutation API on [`Automaton`] itself, which reports [`AutomatonError`]s for inconsistent edits, or declared succinctly with the panicking [`AutomatonBuilder`], which is the preferred way in tests and examples.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use nerode::prelude::*;` should be enough to work with the crate.
pub mod prelude {
    pub use super::{
        alphabet::{Alphabet, Label, Symbol},
        automaton::{Automaton, AutomatonBuilder, State, StateId},
        deterministic::Nondeterminism,
        error::AutomatonError,
        math,
        math::{Map, OrderedSet, Partition, Set},
        run::{Trace, TraceStep, Verdict},
    };
}

/// This module contains some definitions of mathematical objects which are used
/// throughout the crate and do not really fit to the top level.
pub mod math;

/// Module that contains definitions for dealing with alphabets and transition labels.
pub mod alphabet;
pub use alphabet::{Alphabet, Label, Symbol};

/// Errors reported by the fallible operations on automata.
pub mod error;
pub use error::AutomatonError;

/// The automaton representation itself, its states and the builder.
pub mod automaton;
pub use automaton::{Automaton, AutomatonBuilder, State, StateId};

/// Epsilon closure computation.
mod closure;

/// Determinism and completeness checking, reachability and name normalization.
pub mod deterministic;
pub use deterministic::Nondeterminism;

/// The subset construction turning any automaton into a DFA.
mod determinization;

/// Completion of partial DFAs with a rejecting sink state.
mod completion;

/// DFA minimization through partition refinement.
mod minimization;

/// The product construction and the language level set operations built on it.
mod operations;

/// Running words against automata, with verdicts and step by step traces.
pub mod run;
pub use run::{Trace, TraceStep, Verdict};

/// Bounded enumeration of accepted and rejected words.
mod enumeration;
