use crate::alphabet::{Alphabet, Label};
use crate::automaton::{Automaton, StateId};
use crate::math::Set;

/// Helper for constructing automata on the fly, mainly in tests and examples.
/// States are referenced by dense indices starting at zero; every index that
/// appears in a transition, name or flag brings the whole range up to it into
/// existence. The alphabet is inferred from the transition symbols, with
/// [`with_alphabet_symbols`](AutomatonBuilder::with_alphabet_symbols) forcing
/// additional ones. Inconsistencies panic, the checked path for fallible
/// construction is the mutation API on [`Automaton`] itself.
///
/// # Example
///
/// A two state DFA over `['a', 'b']` accepting all words with an even number
/// of `b`s:
/// ```
/// use nerode::prelude::*;
///
/// let dfa = AutomatonBuilder::default()
///     .with_transitions([(0, 'a', 0), (0, 'b', 1), (1, 'a', 1), (1, 'b', 0)])
///     .with_accepting_states([0])
///     .into_dfa(0);
/// assert!(dfa.accepts("abba").unwrap());
/// ```
#[derive(Default)]
pub struct AutomatonBuilder {
    symbols: Set<char>,
    edges: Vec<(u32, Label, u32)>,
    names: Vec<(u32, String)>,
    accepting: Vec<u32>,
}

impl AutomatonBuilder {
    /// By default the alphabet consists of exactly the symbols appearing on at
    /// least one transition. This method forces additional symbols to be
    /// declared, which matters for completion and the product operations.
    pub fn with_alphabet_symbols<I>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        self.symbols.extend(symbols);
        self
    }

    /// Adds a list of symbol transitions given as `(source, symbol, target)`
    /// tuples over builder indices.
    pub fn with_transitions<I>(mut self, iter: I) -> Self
    where
        I: IntoIterator<Item = (u32, char, u32)>,
    {
        self.edges.extend(
            iter.into_iter()
                .map(|(q, sym, p)| (q, Label::Symbol(sym), p)),
        );
        self
    }

    /// Adds a list of epsilon transitions given as `(source, target)` pairs.
    pub fn with_epsilon_transitions<I>(mut self, iter: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        self.edges
            .extend(iter.into_iter().map(|(q, p)| (q, Label::Epsilon, p)));
        self
    }

    /// Assigns display names to the states in index order. States without an
    /// assigned name are called `q0`, `q1` and so on after their index.
    pub fn with_state_names<I>(self, iter: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        iter.into_iter()
            .enumerate()
            .fold(self, |acc, (i, name)| acc.named(i as u32, name))
    }

    /// Assigns the given display name to the state with builder index `idx`.
    pub fn named(mut self, idx: u32, name: impl Into<String>) -> Self {
        assert!(
            self.names.iter().all(|(q, _)| *q != idx),
            "state {idx} was already named"
        );
        self.names.push((idx, name.into()));
        self
    }

    /// Marks the given builder indices as accepting.
    pub fn with_accepting_states<I>(mut self, iter: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        self.accepting.extend(iter);
        self
    }

    /// Builds the automaton and marks `initial` as the single initial state.
    /// Panics if the result is not deterministic, use
    /// [`into_nfa`](AutomatonBuilder::into_nfa) when nondeterminism is intended.
    pub fn into_dfa(self, initial: u32) -> Automaton {
        let automaton = self.into_nfa([initial]);
        assert!(
            automaton.is_deterministic(),
            "automaton is not deterministic\n{automaton:?}"
        );
        automaton
    }

    /// Builds the automaton with the given set of initial states.
    pub fn into_nfa(self, initial: impl IntoIterator<Item = u32>) -> Automaton {
        let alphabet: Alphabet = self
            .edges
            .iter()
            .filter_map(|(_, label, _)| label.symbol())
            .chain(self.symbols.iter().copied())
            .collect();

        let initial: Vec<u32> = initial.into_iter().collect();
        let num_states = self
            .edges
            .iter()
            .flat_map(|(q, _, p)| [*q, *p])
            .chain(self.names.iter().map(|(q, _)| *q))
            .chain(self.accepting.iter().copied())
            .chain(initial.iter().copied())
            .max()
            .map_or(0, |max| max + 1);

        let mut automaton = Automaton::new(alphabet);
        for i in 0..num_states {
            let name = self
                .names
                .iter()
                .find_map(|(q, name)| (*q == i).then(|| name.clone()))
                .unwrap_or_else(|| format!("q{i}"));
            let id = automaton.add_state(
                name,
                initial.contains(&i),
                self.accepting.contains(&i),
            );
            debug_assert_eq!(id, StateId::from(i));
        }
        for (q, label, p) in self.edges {
            automaton
                .add_transition(StateId::from(q), label, StateId::from(p))
                .unwrap_or_else(|err| panic!("builder produced invalid transition: {err}"));
        }
        automaton
    }
}
