use std::collections::VecDeque;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::automaton::{Automaton, StateId};
use crate::error::AutomatonError;
use crate::math::{Map, OrderedMap, OrderedSet};

impl Automaton {
    /// Converts this automaton into an equivalent DFA by subset construction.
    /// An already deterministic input comes back as an equivalent copy.
    ///
    /// Every output state corresponds to a set of input states, starting from
    /// the epsilon closure of the initial set. The successor of a set under a
    /// symbol is the closure of the union of member successors; sets are
    /// identified by their canonical sorted representation, so each reachable
    /// subset becomes exactly one state. A set is accepting iff it contains an
    /// accepting member. Empty successor sets produce no transition, the
    /// result may be partial; run [`complete`](Automaton::complete) afterwards
    /// when totality matters.
    ///
    /// Output names join the member names with `_` in sorted order, the same
    /// scheme an editor displays after conversion.
    pub fn determinize(&self) -> Result<Automaton, AutomatonError> {
        self.validate()?;
        if self.is_deterministic() {
            debug!("input is already deterministic, returning an equivalent copy");
            return Ok(self.clone());
        }

        // Single-state closures are computed once up front, successor sets
        // are unions of these.
        let closures: Map<StateId, OrderedSet<StateId>> = self
            .state_ids()
            .map(|id| (id, self.epsilon_closure([id])))
            .collect();

        let mut dfa = Automaton::new(self.alphabet().clone());
        let mut subset_ids: OrderedMap<OrderedSet<StateId>, StateId> = OrderedMap::new();

        let start = self.epsilon_closure(self.initial_states());
        let start_id = dfa.add_state(self.subset_name(&start), true, self.subset_accepts(&start));
        subset_ids.insert(start.clone(), start_id);
        let mut worklist = VecDeque::from([start]);

        while let Some(subset) = worklist.pop_front() {
            let source_id = subset_ids[&subset];
            for sym in self.alphabet().symbols() {
                let mut successor = OrderedSet::new();
                for &member in &subset {
                    for target in self.targets(member, sym) {
                        successor.extend(closures[&target].iter().copied());
                    }
                }
                if successor.is_empty() {
                    continue;
                }
                let target_id = match subset_ids.get(&successor) {
                    Some(&known) => known,
                    None => {
                        let minted = dfa.add_state(
                            self.subset_name(&successor),
                            false,
                            self.subset_accepts(&successor),
                        );
                        trace!(
                            "discovered subset {{{}}} as state {minted}",
                            successor.iter().join(", ")
                        );
                        subset_ids.insert(successor.clone(), minted);
                        worklist.push_back(successor);
                        minted
                    }
                };
                dfa.add_transition(source_id, sym, target_id)?;
            }
        }

        debug!(
            "subset construction produced {} states from {}",
            dfa.size(),
            self.size()
        );
        Ok(dfa)
    }

    fn subset_name(&self, subset: &OrderedSet<StateId>) -> String {
        subset
            .iter()
            .filter_map(|id| self.state(*id))
            .map(|state| state.name().to_string())
            .sorted()
            .join("_")
    }

    pub(crate) fn subset_accepts(&self, subset: &OrderedSet<StateId>) -> bool {
        subset
            .iter()
            .filter_map(|id| self.state(*id))
            .any(|state| state.is_accepting())
    }
}
