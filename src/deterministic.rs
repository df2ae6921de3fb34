use std::collections::VecDeque;
use std::fmt;

use itertools::Itertools;
use tracing::debug;

use crate::alphabet::Symbol;
use crate::automaton::{Automaton, StateId};
use crate::error::AutomatonError;
use crate::math::OrderedSet;

/// One concrete witness of nondeterminism, as reported by
/// [`determinism_violations`](Automaton::determinism_violations) and carried
/// inside [`AutomatonError::NotDeterministic`]. Displayable so an editor can
/// point at the offending structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nondeterminism {
    /// More than one state is marked initial, a single-start run cannot begin.
    MultipleInitial(Vec<StateId>),
    /// An epsilon transition exists.
    Epsilon {
        /// Source of the epsilon transition.
        source: StateId,
        /// Target of the epsilon transition.
        target: StateId,
    },
    /// Some (state, symbol) pair has two or more targets.
    Ambiguous {
        /// State with the ambiguous outgoing transitions.
        source: StateId,
        /// Symbol for which more than one target exists.
        sym: Symbol,
        /// All targets on that symbol, in ascending order.
        targets: Vec<StateId>,
    },
}

impl fmt::Display for Nondeterminism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nondeterminism::MultipleInitial(states) => {
                write!(f, "states {} are all initial", states.iter().join(", "))
            }
            Nondeterminism::Epsilon { source, target } => {
                write!(f, "epsilon transition from state {source} to state {target}")
            }
            Nondeterminism::Ambiguous {
                source,
                sym,
                targets,
            } => write!(
                f,
                "state {source} reads `{sym}` into states {}",
                targets.iter().join(", ")
            ),
        }
    }
}

impl Automaton {
    /// Decides whether this automaton is a DFA: exactly one initial state, no
    /// epsilon transitions and at most one target per (state, symbol) pair.
    /// This is a runtime property of the value, there is no separate DFA type.
    pub fn is_deterministic(&self) -> bool {
        if self.initial_states().len() != 1 {
            return false;
        }
        for source in self.state_ids() {
            let mut seen = OrderedSet::new();
            for (label, _) in self.transitions_from(source) {
                match label.symbol() {
                    None => return false,
                    Some(sym) => {
                        if !seen.insert(sym) {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }

    /// Collects every witness of nondeterminism, in ascending state order.
    /// Empty precisely when [`is_deterministic`](Automaton::is_deterministic)
    /// holds on an automaton with at least one initial state.
    pub fn determinism_violations(&self) -> Vec<Nondeterminism> {
        let mut violations = Vec::new();
        let initial = self.initial_states();
        if initial.len() > 1 {
            violations.push(Nondeterminism::MultipleInitial(
                initial.into_iter().collect(),
            ));
        }
        for source in self.state_ids() {
            for target in self.epsilon_targets(source) {
                violations.push(Nondeterminism::Epsilon { source, target });
            }
            for sym in self.alphabet().symbols() {
                let targets = self.targets(source, sym);
                if targets.len() > 1 {
                    violations.push(Nondeterminism::Ambiguous {
                        source,
                        sym,
                        targets: targets.into_iter().collect(),
                    });
                }
            }
        }
        violations
    }

    /// Validates and then demands determinism, surfacing the first witness.
    pub(crate) fn require_deterministic(&self) -> Result<(), AutomatonError> {
        self.validate()?;
        match self.determinism_violations().into_iter().next() {
            Some(witness) => Err(AutomatonError::NotDeterministic(witness)),
            None => Ok(()),
        }
    }

    /// All states reachable from the initial set by following any transition,
    /// epsilon included. BFS over the transition graph.
    pub fn reachable_states(&self) -> OrderedSet<StateId> {
        let mut reachable = self.initial_states();
        let mut queue: VecDeque<StateId> = reachable.iter().copied().collect();
        while let Some(state) = queue.pop_front() {
            for (_, target) in self.transitions_from(state) {
                if reachable.insert(target) {
                    queue.push_back(target);
                }
            }
        }
        reachable
    }

    /// States no run can ever visit. These never influence the accepted
    /// language, minimization prunes them and an editor may warn about them.
    pub fn unreachable_states(&self) -> OrderedSet<StateId> {
        let reachable = self.reachable_states();
        self.state_ids()
            .filter(|id| !reachable.contains(id))
            .collect()
    }

    /// Returns a copy with all unreachable states and their transitions
    /// removed. The accepted language is untouched.
    pub fn trim(&self) -> Result<Automaton, AutomatonError> {
        self.validate()?;
        let mut trimmed = self.clone();
        for id in self.unreachable_states() {
            trimmed.remove_state(id)?;
        }
        debug!(
            "trimmed {} unreachable states, {} remain",
            self.size() - trimmed.size(),
            trimmed.size()
        );
        Ok(trimmed)
    }

    /// Whether this automaton is a complete DFA, i.e. deterministic with a
    /// transition for every (state, symbol) pair. Nondeterministic automata
    /// are never complete in this sense.
    pub fn is_complete(&self) -> bool {
        self.is_deterministic() && self.missing_transitions().is_empty()
    }

    /// All (state, symbol) pairs without an outgoing transition, in ascending
    /// order. Completion fills exactly these.
    pub(crate) fn missing_transitions(&self) -> Vec<(StateId, Symbol)> {
        self.state_ids()
            .flat_map(|id| {
                self.alphabet()
                    .symbols()
                    .filter(move |&sym| self.successor(id, sym).is_none())
                    .map(move |sym| (id, sym))
            })
            .collect()
    }

    /// Demands a complete DFA, reporting the first missing (state, symbol)
    /// pair otherwise.
    pub(crate) fn require_complete(&self) -> Result<(), AutomatonError> {
        self.require_deterministic()?;
        match self.missing_transitions().into_iter().next() {
            Some((state, symbol)) => Err(AutomatonError::NotComplete { state, symbol }),
            None => Ok(()),
        }
    }

    /// Canonical traversal order: BFS from the initial states, expanding edges
    /// sorted by label and target, followed by any unreachable states in
    /// ascending id order. Two structurally equal automata enumerate their
    /// states in the same order.
    pub(crate) fn bfs_order(&self) -> Vec<StateId> {
        let mut order: Vec<StateId> = Vec::with_capacity(self.size());
        let mut seen = self.initial_states();
        let mut queue: VecDeque<StateId> = seen.iter().copied().collect();
        while let Some(state) = queue.pop_front() {
            order.push(state);
            for (_, target) in self.transitions_from(state).sorted() {
                if seen.insert(target) {
                    queue.push_back(target);
                }
            }
        }
        order.extend(self.state_ids().filter(|id| !seen.contains(id)));
        order
    }

    /// Returns a copy whose display names are `q0, q1, …` assigned in
    /// canonical BFS order. Structure and ids are untouched. Useful after
    /// algorithms that synthesize long names, such as subset construction.
    pub fn normalize_names(&self) -> Result<Automaton, AutomatonError> {
        self.validate()?;
        let mut renamed = self.clone();
        for (position, id) in self.bfs_order().into_iter().enumerate() {
            renamed.rename_state(id, format!("q{position}"))?;
        }
        Ok(renamed)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn ids(automaton: &Automaton) -> Vec<StateId> {
        automaton.state_ids().collect()
    }

    #[test]
    fn deterministic_automaton_has_no_violations() {
        let dfa = AutomatonBuilder::default()
            .with_transitions([(0, 'a', 1), (0, 'b', 0), (1, 'a', 0), (1, 'b', 1)])
            .with_accepting_states([1])
            .into_dfa(0);
        assert!(dfa.is_deterministic());
        assert!(dfa.determinism_violations().is_empty());
        assert!(dfa.is_complete());
    }

    #[test]
    fn epsilon_and_ambiguity_are_witnessed() {
        let nfa = AutomatonBuilder::default()
            .with_transitions([(0, 'a', 1), (0, 'a', 2)])
            .with_epsilon_transitions([(1, 2)])
            .into_nfa([0]);
        let q = ids(&nfa);

        assert!(!nfa.is_deterministic());
        let violations = nfa.determinism_violations();
        assert!(violations.contains(&Nondeterminism::Epsilon {
            source: q[1],
            target: q[2]
        }));
        assert!(violations.contains(&Nondeterminism::Ambiguous {
            source: q[0],
            sym: 'a',
            targets: vec![q[1], q[2]],
        }));
    }

    #[test]
    fn multiple_initial_states_are_witnessed() {
        let nfa = AutomatonBuilder::default()
            .with_transitions([(0, 'a', 1)])
            .into_nfa([0, 1]);
        let q = ids(&nfa);

        assert!(!nfa.is_deterministic());
        assert_eq!(
            nfa.determinism_violations(),
            vec![Nondeterminism::MultipleInitial(vec![q[0], q[1]])]
        );
    }

    #[test]
    fn violations_render_for_display() {
        let witness = Nondeterminism::Ambiguous {
            source: StateId::from(0),
            sym: 'a',
            targets: vec![StateId::from(1), StateId::from(2)],
        };
        assert_eq!(witness.to_string(), "state 0 reads `a` into states 1, 2");
    }

    #[test]
    fn reachability_finds_islands() {
        let nfa = AutomatonBuilder::default()
            .with_transitions([(0, 'a', 1), (2, 'a', 3), (3, 'a', 2)])
            .with_accepting_states([1, 3])
            .into_nfa([0]);
        let q = ids(&nfa);

        assert_eq!(nfa.reachable_states(), [q[0], q[1]].into_iter().collect());
        assert_eq!(nfa.unreachable_states(), [q[2], q[3]].into_iter().collect());

        let trimmed = nfa.trim().unwrap();
        assert_eq!(trimmed.size(), 2);
        assert_eq!(trimmed.accepts("a"), Ok(true));
        assert_eq!(trimmed.accepts("aa"), Ok(false));
    }

    #[test]
    fn completeness_requires_determinism_and_totality() {
        let partial = AutomatonBuilder::default()
            .with_transitions([(0, 'a', 1)])
            .with_alphabet_symbols(['b'])
            .into_dfa(0);
        assert!(!partial.is_complete());

        let nfa = AutomatonBuilder::default()
            .with_transitions([(0, 'a', 0), (0, 'a', 1), (0, 'b', 1), (1, 'a', 1), (1, 'b', 1)])
            .into_nfa([0]);
        assert!(!nfa.is_complete());
    }

    #[test]
    fn normalized_names_follow_bfs_order() {
        let automaton = AutomatonBuilder::default()
            .with_transitions([(0, 'b', 2), (0, 'a', 1), (1, 'a', 2)])
            .with_state_names(["long_synthesized", "middle", "last"])
            .into_nfa([0]);
        let q = ids(&automaton);

        let renamed = automaton.normalize_names().unwrap();
        assert_eq!(renamed.state(q[0]).unwrap().name(), "q0");
        assert_eq!(renamed.state(q[1]).unwrap().name(), "q1");
        assert_eq!(renamed.state(q[2]).unwrap().name(), "q2");
        assert_eq!(automaton.state(q[0]).unwrap().name(), "long_synthesized");
    }
}
