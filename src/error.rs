use thiserror::Error;

use crate::alphabet::Alphabet;
use crate::automaton::StateId;
use crate::deterministic::Nondeterminism;

/// Abstracts the kinds of errors that operations on automata can report. Every
/// variant is a caller-correctable precondition violation, there are no
/// retryable failures. An operation either succeeds and returns a freshly built
/// automaton or fails with one of these, leaving its inputs untouched.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum AutomatonError {
    /// A state id was referenced that the automaton does not contain. Raised by
    /// mutation calls with stale ids and by [`validate`](crate::Automaton::validate)
    /// for dangling transition endpoints.
    #[error("state {0} does not exist")]
    MissingState(StateId),
    /// Two states with the same id were passed to
    /// [`from_parts`](crate::Automaton::from_parts).
    #[error("duplicate state id {0}")]
    DuplicateState(StateId),
    /// A transition label or input word uses a symbol the alphabet does not declare.
    #[error("symbol `{0}` is not in the alphabet")]
    SymbolNotInAlphabet(char),
    /// The automaton has no initial state at all, so no run can start.
    #[error("automaton has no initial state")]
    NoInitialState,
    /// An operation that requires a deterministic automaton was given a
    /// nondeterministic one. Carries the first witness encountered.
    #[error("automaton is not deterministic: {0}")]
    NotDeterministic(Nondeterminism),
    /// Minimization or a product was invoked on a partial automaton. Carries one
    /// missing (state, symbol) pair.
    #[error("automaton is not complete: state {state} has no transition on `{symbol}`")]
    NotComplete {
        /// State missing an outgoing transition.
        state: StateId,
        /// Symbol for which no transition is defined.
        symbol: char,
    },
    /// A product was attempted between automata over different alphabets.
    #[error("alphabets do not match: {left} and {right}")]
    AlphabetMismatch {
        /// Alphabet of the left operand.
        left: Alphabet,
        /// Alphabet of the right operand.
        right: Alphabet,
    },
}
