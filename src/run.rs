use std::fmt;

use tracing::trace;

use crate::automaton::{Automaton, StateId};
use crate::error::AutomatonError;
use crate::math::OrderedSet;

/// Terminal outcome of simulating a word. Rejection is a normal outcome, never
/// an error; errors are reserved for malformed inputs such as out-of-alphabet
/// symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The run ended in at least one accepting state.
    Accepted,
    /// The run ended outside the accepting states or died at a dead end.
    Rejected,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accepted => write!(f, "accepted"),
            Verdict::Rejected => write!(f, "rejected"),
        }
    }
}

/// One snapshot of a [`Trace`]: the closed set of states the run occupies,
/// a singleton for deterministic automata, together with the prefix consumed
/// so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStep {
    states: OrderedSet<StateId>,
    consumed: String,
}

impl TraceStep {
    /// The states the run occupies at this point.
    pub fn states(&self) -> &OrderedSet<StateId> {
        &self.states
    }

    /// The prefix of the word consumed up to this point.
    pub fn consumed(&self) -> &str {
        &self.consumed
    }
}

/// The complete record of simulating one word, an ordered sequence of
/// snapshots ending in a verdict. A renderer can replay the snapshots at any
/// cadence, this type has no opinion on presentation. The first snapshot is
/// taken before the first symbol, so a trace always has at least one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    steps: Vec<TraceStep>,
    verdict: Verdict,
}

impl Trace {
    /// The snapshots in consumption order.
    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    /// The terminal outcome.
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }
}

impl Automaton {
    fn check_word(&self, word: &str) -> Result<(), AutomatonError> {
        match word.chars().find(|&sym| !self.alphabet().contains(sym)) {
            Some(sym) => Err(AutomatonError::SymbolNotInAlphabet(sym)),
            None => Ok(()),
        }
    }

    /// Simulates the automaton on `word` and decides acceptance. A
    /// deterministic automaton is walked state by state, a missing transition
    /// rejects immediately. Otherwise the run carries the epsilon-closed set
    /// of current states, starting from the closure of the initial states, and
    /// accepts iff the final set meets an accepting state.
    ///
    /// A word using a symbol outside the alphabet is a caller error, distinct
    /// from rejection.
    ///
    /// # Example
    /// ```
    /// use nerode::prelude::*;
    ///
    /// // even length words over {0, 1}
    /// let dfa = AutomatonBuilder::default()
    ///     .with_transitions([(0, '0', 1), (0, '1', 1), (1, '0', 0), (1, '1', 0)])
    ///     .with_accepting_states([0])
    ///     .into_dfa(0);
    /// assert_eq!(dfa.accepts("10"), Ok(true));
    /// assert_eq!(dfa.accepts("101"), Ok(false));
    /// assert!(dfa.accepts("2").is_err());
    /// ```
    pub fn accepts(&self, word: &str) -> Result<bool, AutomatonError> {
        self.validate()?;
        self.check_word(word)?;

        if self.is_deterministic() {
            let Some(mut current) = self.initial_states().into_iter().next() else {
                return Ok(false);
            };
            for sym in word.chars() {
                match self.successor(current, sym) {
                    Some(next) => current = next,
                    None => return Ok(false),
                }
            }
            return Ok(self
                .state(current)
                .is_some_and(|state| state.is_accepting()));
        }

        let mut current = self.epsilon_closure(self.initial_states());
        for sym in word.chars() {
            current = self.closed_step(&current, sym);
            if current.is_empty() {
                return Ok(false);
            }
        }
        Ok(self.subset_accepts(&current))
    }

    /// Simulates `word` and records every intermediate configuration for
    /// animation. The first snapshot holds the epsilon closure of the initial
    /// states with nothing consumed, every further snapshot follows one
    /// symbol. A dead end is recorded as a final empty snapshot and stops the
    /// trace early, the remaining input stays unconsumed and the verdict is
    /// [`Verdict::Rejected`].
    pub fn trace(&self, word: &str) -> Result<Trace, AutomatonError> {
        self.validate()?;
        self.check_word(word)?;

        let mut current = self.epsilon_closure(self.initial_states());
        let mut consumed = String::new();
        let mut steps = vec![TraceStep {
            states: current.clone(),
            consumed: consumed.clone(),
        }];

        for sym in word.chars() {
            current = self.closed_step(&current, sym);
            consumed.push(sym);
            steps.push(TraceStep {
                states: current.clone(),
                consumed: consumed.clone(),
            });
            if current.is_empty() {
                trace!("run died after consuming {consumed:?}");
                return Ok(Trace {
                    steps,
                    verdict: Verdict::Rejected,
                });
            }
        }

        let verdict = if self.subset_accepts(&current) {
            Verdict::Accepted
        } else {
            Verdict::Rejected
        };
        Ok(Trace { steps, verdict })
    }
}
