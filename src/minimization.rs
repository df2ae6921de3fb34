use std::collections::VecDeque;

use bit_set::BitSet;
use tracing::{debug, trace};

use crate::automaton::{Automaton, StateId};
use crate::error::AutomatonError;
use crate::math::{Map, Partition};

impl Automaton {
    /// Minimizes a complete DFA into the unique smallest complete DFA for the
    /// same language, up to state renaming. Fails with
    /// [`AutomatonError::NotDeterministic`] or [`AutomatonError::NotComplete`]
    /// when the precondition is violated, completion is the caller's job.
    ///
    /// Unreachable states are pruned first, then the states are refined by
    /// Hopcroft partition refinement: starting from the accepting versus
    /// non-accepting split, a worklist of (block, symbol) pairs drives
    /// splitting every block whose members disagree on where the symbol leads.
    /// When the worklist drains, blocks group exactly the states with equal
    /// residual languages and become the states of the result. Each block
    /// state is named after its smallest member.
    pub fn minimize(&self) -> Result<Automaton, AutomatonError> {
        self.require_complete()?;
        let trimmed = self.trim()?;
        let (ids, index_of) = trimmed.dense_index();
        let blocks = trimmed.refine_blocks(&ids, &index_of);
        let minimized = trimmed.quotient_by_blocks(&ids, &blocks)?;
        debug!(
            "minimized {} states down to {}",
            self.size(),
            minimized.size()
        );
        Ok(minimized)
    }

    /// Computes the language partition underlying
    /// [`minimize`](Automaton::minimize): the reachable states of a complete
    /// DFA grouped into classes with equal residual languages. Exposed
    /// separately so tooling can show which original states collapsed.
    pub fn state_partition(&self) -> Result<Partition<StateId>, AutomatonError> {
        self.require_complete()?;
        let trimmed = self.trim()?;
        let (ids, index_of) = trimmed.dense_index();
        let blocks = trimmed.refine_blocks(&ids, &index_of);
        Ok(Partition::new(blocks.iter().map(|block| {
            block.iter().map(|dense| ids[dense]).collect::<Vec<_>>()
        })))
    }

    /// Checks whether the automaton is already as small as its language
    /// allows: every state is reachable and no two states share a residual
    /// language, so [`minimize`](Automaton::minimize) would return an
    /// automaton of the same size. Shares the complete-DFA precondition with
    /// [`state_partition`](Automaton::state_partition).
    pub fn is_minimal(&self) -> Result<bool, AutomatonError> {
        Ok(self.state_partition()?.size() == self.size())
    }

    /// Sorted state ids paired with their positions, the dense indexing the
    /// bit sets below work on.
    fn dense_index(&self) -> (Vec<StateId>, Map<StateId, usize>) {
        let ids: Vec<StateId> = self.state_ids().collect();
        let index_of = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        (ids, index_of)
    }

    /// Partition refinement over dense state indices. Assumes `self` is a
    /// trimmed complete DFA. Returns the final blocks, each non-empty.
    fn refine_blocks(&self, ids: &[StateId], index_of: &Map<StateId, usize>) -> Vec<BitSet> {
        let accepting: BitSet = ids
            .iter()
            .enumerate()
            .filter(|(_, id)| self.state(**id).is_some_and(|state| state.is_accepting()))
            .map(|(dense, _)| dense)
            .collect();
        let mut rejecting: BitSet = (0..ids.len()).collect();
        rejecting.difference_with(&accepting);

        let mut blocks: Vec<BitSet> = Vec::new();
        if !accepting.is_empty() {
            blocks.push(accepting);
        }
        if !rejecting.is_empty() {
            blocks.push(rejecting);
        }

        // reverse transition index: who enters `target` on `sym`
        let mut predecessors: Map<(usize, char), BitSet> = Map::default();
        for (dense, &id) in ids.iter().enumerate() {
            for sym in self.alphabet().symbols() {
                if let Some(target) = self.successor(id, sym) {
                    predecessors
                        .entry((index_of[&target], sym))
                        .or_default()
                        .insert(dense);
                }
            }
        }

        let mut worklist: VecDeque<(usize, char)> = (0..blocks.len())
            .flat_map(|idx| self.alphabet().symbols().map(move |sym| (idx, sym)))
            .collect();

        while let Some((splitter_idx, sym)) = worklist.pop_front() {
            let mut moving = BitSet::new();
            for target in blocks[splitter_idx].iter() {
                if let Some(sources) = predecessors.get(&(target, sym)) {
                    moving.union_with(sources);
                }
            }
            if moving.is_empty() {
                continue;
            }

            let mut splits = Vec::new();
            for (idx, block) in blocks.iter().enumerate() {
                let mut inside = block.clone();
                inside.intersect_with(&moving);
                if inside.is_empty() || inside.len() == block.len() {
                    continue;
                }
                let mut outside = block.clone();
                outside.difference_with(&moving);
                // the smaller half is the one that gets re-enqueued
                let (keep, push) = if inside.len() <= outside.len() {
                    (outside, inside)
                } else {
                    (inside, outside)
                };
                splits.push((idx, keep, push));
            }

            for (idx, keep, push) in splits {
                let minted = blocks.len();
                trace!(
                    "splitting block {idx} on `{sym}` into sizes {} and {}",
                    keep.len(),
                    push.len()
                );
                blocks[idx] = keep;
                blocks.push(push);
                for enqueue_sym in self.alphabet().symbols() {
                    worklist.push_back((minted, enqueue_sym));
                }
            }
        }

        blocks
    }

    /// Builds the quotient automaton with one state per block. Transitions
    /// follow any representative, refinement guarantees all members agree.
    fn quotient_by_blocks(
        &self,
        ids: &[StateId],
        blocks: &[BitSet],
    ) -> Result<Automaton, AutomatonError> {
        let mut block_of: Map<StateId, usize> = Map::default();
        for (idx, block) in blocks.iter().enumerate() {
            for dense in block.iter() {
                block_of.insert(ids[dense], idx);
            }
        }

        let initial = self.initial_states();
        let mut minimized = Automaton::new(self.alphabet().clone());
        let mut minted: Vec<StateId> = Vec::with_capacity(blocks.len());
        let mut representatives: Vec<StateId> = Vec::with_capacity(blocks.len());
        for block in blocks {
            let Some(first) = block.iter().next() else {
                continue;
            };
            let representative = ids[first];
            let name = self
                .state(representative)
                .map(|state| state.name().to_string())
                .unwrap_or_default();
            let accepting = self
                .state(representative)
                .is_some_and(|state| state.is_accepting());
            let is_initial = block.iter().any(|dense| initial.contains(&ids[dense]));
            minted.push(minimized.add_state(name, is_initial, accepting));
            representatives.push(representative);
        }

        for (idx, &representative) in representatives.iter().enumerate() {
            for sym in self.alphabet().symbols() {
                if let Some(target) = self.successor(representative, sym) {
                    minimized.add_transition(minted[idx], sym, minted[block_of[&target]])?;
                }
            }
        }
        Ok(minimized)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    // the classic six state minimization example, collapses to three states
    fn wiki_dfa() -> Automaton {
        AutomatonBuilder::default()
            .with_transitions([
                (0, 'a', 1),
                (0, 'b', 2),
                (1, 'a', 0),
                (1, 'b', 3),
                (2, 'a', 4),
                (2, 'b', 5),
                (3, 'a', 4),
                (3, 'b', 5),
                (4, 'a', 4),
                (4, 'b', 5),
                (5, 'a', 5),
                (5, 'b', 5),
            ])
            .with_accepting_states([2, 3, 4])
            .into_dfa(0)
    }

    #[test_log::test]
    fn minimization_collapses_equivalent_states() {
        let dfa = wiki_dfa();
        let minimized = dfa.minimize().unwrap();
        assert_eq!(minimized.size(), 3);
        assert!(minimized.is_complete());

        for word in ["", "a", "b", "ab", "ba", "bb", "aba", "abb", "bab"] {
            assert_eq!(dfa.accepts(word), minimized.accepts(word), "word {word:?}");
        }
    }

    #[test]
    fn partition_groups_language_equivalent_states() {
        let dfa = wiki_dfa();
        let q: Vec<StateId> = dfa.state_ids().collect();
        let partition = dfa.state_partition().unwrap();

        assert_eq!(partition.size(), 3);
        assert_eq!(
            partition.class_of(&q[0]),
            Some(&[q[0], q[1]].into_iter().collect())
        );
        assert_eq!(
            partition.class_of(&q[2]),
            Some(&[q[2], q[3], q[4]].into_iter().collect())
        );
        assert_eq!(partition.class_of(&q[5]), Some(&[q[5]].into_iter().collect()));
    }

    #[test]
    fn minimization_is_idempotent_up_to_isomorphism() {
        let once = wiki_dfa().minimize().unwrap();
        let twice = once.minimize().unwrap();
        assert!(twice.size() <= once.size());
        assert_eq!(once.isomorphic(&twice), Ok(true));
    }

    #[test]
    fn minimality_check_spots_collapsible_and_unreachable_states() {
        let dfa = wiki_dfa();
        assert_eq!(dfa.is_minimal(), Ok(false));

        let minimized = dfa.minimize().unwrap();
        assert_eq!(minimized.is_minimal(), Ok(true));

        // an unreachable state disqualifies even a refined transition core
        let mut padded = minimized.clone();
        let island = padded.add_state("island", false, false);
        padded.add_transition(island, 'a', island).unwrap();
        padded.add_transition(island, 'b', island).unwrap();
        assert_eq!(padded.is_minimal(), Ok(false));

        let nfa = AutomatonBuilder::default()
            .with_transitions([(0, 'a', 0), (0, 'a', 1)])
            .into_nfa([0]);
        assert!(matches!(
            nfa.is_minimal(),
            Err(AutomatonError::NotDeterministic(_))
        ));
    }

    #[test]
    fn unreachable_states_are_pruned_before_refinement() {
        let mut dfa = wiki_dfa();
        let island = dfa.add_state("island", false, true);
        dfa.add_transition(island, 'a', island).unwrap();
        dfa.add_transition(island, 'b', island).unwrap();

        let minimized = dfa.minimize().unwrap();
        assert_eq!(minimized.size(), 3);
    }

    #[test]
    fn minimization_demands_a_complete_dfa() {
        let partial = AutomatonBuilder::default()
            .with_transitions([(0, 'a', 1)])
            .with_alphabet_symbols(['b'])
            .with_accepting_states([1])
            .into_dfa(0);
        assert!(matches!(
            partial.minimize(),
            Err(AutomatonError::NotComplete { .. })
        ));

        let nfa = AutomatonBuilder::default()
            .with_transitions([(0, 'a', 0), (0, 'a', 1)])
            .into_nfa([0]);
        assert!(matches!(
            nfa.minimize(),
            Err(AutomatonError::NotDeterministic(_))
        ));
    }

    #[test]
    fn empty_language_minimizes_to_a_single_rejecting_state() {
        let dfa = AutomatonBuilder::default()
            .with_transitions([(0, 'a', 1), (1, 'a', 0)])
            .into_dfa(0);
        let minimized = dfa.minimize().unwrap();
        assert_eq!(minimized.size(), 1);
        assert_eq!(minimized.accepts(""), Ok(false));
        assert_eq!(minimized.accepts("aaaa"), Ok(false));
    }

    #[test]
    fn full_language_minimizes_to_a_single_accepting_state() {
        let dfa = AutomatonBuilder::default()
            .with_transitions([(0, 'a', 1), (1, 'a', 0)])
            .with_accepting_states([0, 1])
            .into_dfa(0);
        let minimized = dfa.minimize().unwrap();
        assert_eq!(minimized.size(), 1);
        assert_eq!(minimized.accepts(""), Ok(true));
        assert_eq!(minimized.accepts("aaa"), Ok(true));
    }
}
