use std::collections::VecDeque;

use crate::alphabet::Symbol;
use crate::automaton::{Automaton, StateId};
use crate::math::OrderedSet;

impl Automaton {
    /// Computes the epsilon closure of a set of states, the smallest superset
    /// closed under following epsilon transitions. The result is an ordered
    /// set, which doubles as the canonical representation that subset
    /// construction keys its worklist by. Only newly discovered states are
    /// enqueued, so epsilon cycles terminate.
    pub fn epsilon_closure(
        &self,
        states: impl IntoIterator<Item = StateId>,
    ) -> OrderedSet<StateId> {
        let mut closure: OrderedSet<StateId> = states.into_iter().collect();
        let mut queue: VecDeque<StateId> = closure.iter().copied().collect();
        while let Some(state) = queue.pop_front() {
            for target in self.epsilon_targets(state) {
                if closure.insert(target) {
                    queue.push_back(target);
                }
            }
        }
        closure
    }

    /// One simulation step of a closed state set: all `sym` successors of any
    /// member, closed under epsilon again. Empty input and missing successors
    /// yield the empty set, the dead end of a run.
    pub(crate) fn closed_step(
        &self,
        states: &OrderedSet<StateId>,
        sym: Symbol,
    ) -> OrderedSet<StateId> {
        let moved = states
            .iter()
            .flat_map(|&state| self.targets(state, sym))
            .collect::<OrderedSet<_>>();
        self.epsilon_closure(moved)
    }
}
