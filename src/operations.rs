use std::collections::VecDeque;

use tracing::debug;

use crate::alphabet::Alphabet;
use crate::automaton::{Automaton, StateId};
use crate::error::AutomatonError;
use crate::math::{Bijection, Map, OrderedSet, Set};

impl Automaton {
    pub(crate) fn accepting(&self, id: StateId) -> bool {
        self.state(id).is_some_and(|state| state.is_accepting())
    }

    fn pair_name(&self, other: &Automaton, left: StateId, right: StateId) -> String {
        format!(
            "{}_{}",
            self.state(left).map(|state| state.name()).unwrap_or_default(),
            other.state(right).map(|state| state.name()).unwrap_or_default()
        )
    }

    /// Determinizes a copy, widens it onto `alphabet` and completes it. The
    /// shared normalization in front of every language level operation.
    fn normalize_over(&self, alphabet: &Alphabet) -> Result<Automaton, AutomatonError> {
        let mut dfa = self.determinize()?;
        dfa.set_alphabet(alphabet.clone())?;
        dfa.complete()
    }

    /// Strict product construction. Both operands must be complete DFAs over
    /// the same alphabet, otherwise [`AutomatonError::AlphabetMismatch`] or
    /// the respective precondition error is reported. Builds only the pairs
    /// reachable from the pair of initial states; a pair accepts according to
    /// `accept` applied to the members' accepting flags, OR for union, AND for
    /// intersection.
    pub fn product(
        &self,
        other: &Automaton,
        accept: impl Fn(bool, bool) -> bool,
    ) -> Result<Automaton, AutomatonError> {
        self.require_complete()?;
        other.require_complete()?;
        if self.alphabet() != other.alphabet() {
            return Err(AutomatonError::AlphabetMismatch {
                left: self.alphabet().clone(),
                right: other.alphabet().clone(),
            });
        }
        let Some(left_start) = self.initial_states().into_iter().next() else {
            return Err(AutomatonError::NoInitialState);
        };
        let Some(right_start) = other.initial_states().into_iter().next() else {
            return Err(AutomatonError::NoInitialState);
        };

        let mut result = Automaton::new(self.alphabet().clone());
        let mut pairs: Map<(StateId, StateId), StateId> = Map::default();
        let start = (left_start, right_start);
        let start_id = result.add_state(
            self.pair_name(other, left_start, right_start),
            true,
            accept(self.accepting(left_start), other.accepting(right_start)),
        );
        pairs.insert(start, start_id);
        let mut worklist = VecDeque::from([start]);

        while let Some((left, right)) = worklist.pop_front() {
            let source = pairs[&(left, right)];
            for sym in self.alphabet().symbols() {
                let (Some(left_to), Some(right_to)) =
                    (self.successor(left, sym), other.successor(right, sym))
                else {
                    continue;
                };
                let target = match pairs.get(&(left_to, right_to)) {
                    Some(&known) => known,
                    None => {
                        let minted = result.add_state(
                            self.pair_name(other, left_to, right_to),
                            false,
                            accept(self.accepting(left_to), other.accepting(right_to)),
                        );
                        pairs.insert((left_to, right_to), minted);
                        worklist.push_back((left_to, right_to));
                        minted
                    }
                };
                result.add_transition(source, sym, target)?;
            }
        }
        debug!("product construction reached {} state pairs", result.size());
        Ok(result)
    }

    /// Automaton accepting the union of both languages. The operands may be
    /// arbitrary automata over different alphabets, they are determinized,
    /// reconciled onto the union alphabet and completed internally.
    pub fn union(&self, other: &Automaton) -> Result<Automaton, AutomatonError> {
        let alphabet = self.alphabet().union(other.alphabet());
        let left = self.normalize_over(&alphabet)?;
        let right = other.normalize_over(&alphabet)?;
        left.product(&right, |a, b| a || b)
    }

    /// Automaton accepting the intersection of both languages, normalized the
    /// same way as [`union`](Automaton::union).
    pub fn intersection(&self, other: &Automaton) -> Result<Automaton, AutomatonError> {
        let alphabet = self.alphabet().union(other.alphabet());
        let left = self.normalize_over(&alphabet)?;
        let right = other.normalize_over(&alphabet)?;
        left.product(&right, |a, b| a && b)
    }

    /// Automaton accepting exactly the rejected words. The input is
    /// determinized and completed internally so that flipping the accepting
    /// flags really complements the language, the sink turning accepting
    /// catches all previously dead inputs.
    pub fn complement(&self) -> Result<Automaton, AutomatonError> {
        let mut flipped = self.determinize()?.complete()?;
        for id in flipped.state_ids().collect::<Vec<_>>() {
            let accepting = flipped.accepting(id);
            flipped.set_accepting(id, !accepting)?;
        }
        Ok(flipped)
    }

    /// Decides whether both automata accept the same language: normalize both
    /// onto the union alphabet, minimize and compare the canonical forms
    /// structurally. Ids and names never matter, only the shape does.
    pub fn equivalent(&self, other: &Automaton) -> Result<bool, AutomatonError> {
        let alphabet = self.alphabet().union(other.alphabet());
        let left = self.normalize_over(&alphabet)?.minimize()?;
        let right = other.normalize_over(&alphabet)?.minimize()?;
        left.isomorphic(&right)
    }

    /// Structural isomorphism of two deterministic automata, decided by a
    /// paired BFS that grows a bijection between their states. Display names
    /// and raw id values are irrelevant. States unreachable from the initial
    /// state can never be paired, so trim first when they should not count.
    pub fn isomorphic(&self, other: &Automaton) -> Result<bool, AutomatonError> {
        self.require_deterministic()?;
        other.require_deterministic()?;
        if self.alphabet() != other.alphabet() || self.size() != other.size() {
            return Ok(false);
        }
        let (Some(left_start), Some(right_start)) = (
            self.initial_states().into_iter().next(),
            other.initial_states().into_iter().next(),
        ) else {
            return Err(AutomatonError::NoInitialState);
        };

        let mut matched: Bijection<StateId, StateId> = Bijection::new();
        matched.insert(left_start, right_start);
        let mut queue = VecDeque::from([(left_start, right_start)]);

        while let Some((left, right)) = queue.pop_front() {
            if self.accepting(left) != other.accepting(right) {
                return Ok(false);
            }
            for sym in self.alphabet().symbols() {
                match (self.successor(left, sym), other.successor(right, sym)) {
                    (None, None) => {}
                    (Some(left_to), Some(right_to)) => {
                        match (matched.get_by_left(&left_to), matched.get_by_right(&right_to)) {
                            (None, None) => {
                                matched.insert(left_to, right_to);
                                queue.push_back((left_to, right_to));
                            }
                            (Some(&paired), Some(&reverse))
                                if paired == right_to && reverse == left_to => {}
                            _ => return Ok(false),
                        }
                    }
                    _ => return Ok(false),
                }
            }
        }
        Ok(matched.len() == self.size())
    }

    /// Whether no word at all is accepted, i.e. no accepting state is
    /// reachable.
    pub fn is_empty_language(&self) -> Result<bool, AutomatonError> {
        Ok(self.shortest_word()?.is_none())
    }

    /// A shortest accepted word, if any exists. Found by BFS over closed state
    /// sets, so it works directly on NFAs; among equally short words the one
    /// earliest in symbol order is returned.
    pub fn shortest_word(&self) -> Result<Option<String>, AutomatonError> {
        self.validate()?;
        let start = self.epsilon_closure(self.initial_states());
        if self.subset_accepts(&start) {
            return Ok(Some(String::new()));
        }
        let mut seen: Set<OrderedSet<StateId>> = Set::default();
        seen.insert(start.clone());
        let mut queue = VecDeque::from([(start, String::new())]);

        while let Some((states, word)) = queue.pop_front() {
            for sym in self.alphabet().symbols() {
                let next = self.closed_step(&states, sym);
                if next.is_empty() {
                    continue;
                }
                let mut extended = word.clone();
                extended.push(sym);
                if self.subset_accepts(&next) {
                    return Ok(Some(extended));
                }
                if seen.insert(next.clone()) {
                    queue.push_back((next, extended));
                }
            }
        }
        Ok(None)
    }

    /// A shortest word on which the two languages disagree, accepted by
    /// exactly one of the automata, or `None` when they are equivalent. The
    /// natural counterexample to show alongside a failed equivalence check.
    pub fn distinguishing_word(
        &self,
        other: &Automaton,
    ) -> Result<Option<String>, AutomatonError> {
        let alphabet = self.alphabet().union(other.alphabet());
        let left = self.normalize_over(&alphabet)?;
        let right = other.normalize_over(&alphabet)?;
        let (Some(left_start), Some(right_start)) = (
            left.initial_states().into_iter().next(),
            right.initial_states().into_iter().next(),
        ) else {
            return Err(AutomatonError::NoInitialState);
        };

        let mut seen: Set<(StateId, StateId)> = Set::default();
        seen.insert((left_start, right_start));
        let mut queue = VecDeque::from([(left_start, right_start, String::new())]);

        while let Some((l, r, word)) = queue.pop_front() {
            if left.accepting(l) != right.accepting(r) {
                return Ok(Some(word));
            }
            for sym in alphabet.symbols() {
                let (Some(l_to), Some(r_to)) = (left.successor(l, sym), right.successor(r, sym))
                else {
                    continue;
                };
                if seen.insert((l_to, r_to)) {
                    let mut extended = word.clone();
                    extended.push(sym);
                    queue.push_back((l_to, r_to, extended));
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    // all words over {a, b} with an odd number of a's
    fn odd_a() -> Automaton {
        AutomatonBuilder::default()
            .with_transitions([(0, 'a', 1), (0, 'b', 0), (1, 'a', 0), (1, 'b', 1)])
            .with_accepting_states([1])
            .into_dfa(0)
    }

    // all words over {a, b} ending in b
    fn ends_in_b() -> Automaton {
        AutomatonBuilder::default()
            .with_transitions([(0, 'a', 0), (0, 'b', 1), (1, 'a', 0), (1, 'b', 1)])
            .with_accepting_states([1])
            .into_dfa(0)
    }

    const SAMPLES: [&str; 12] = [
        "", "a", "b", "aa", "ab", "ba", "bb", "aab", "aba", "bab", "abab", "bbaa",
    ];

    #[test_log::test]
    fn union_and_intersection_follow_boolean_algebra() {
        let left = odd_a();
        let right = ends_in_b();
        let either = left.union(&right).unwrap();
        let both = left.intersection(&right).unwrap();

        for word in SAMPLES {
            let l = left.accepts(word).unwrap();
            let r = right.accepts(word).unwrap();
            assert_eq!(either.accepts(word), Ok(l || r), "union on {word:?}");
            assert_eq!(both.accepts(word), Ok(l && r), "intersection on {word:?}");
        }
    }

    #[test]
    fn set_operations_are_commutative_at_the_language_level() {
        let left = odd_a();
        let right = ends_in_b();
        assert_eq!(
            left.union(&right).unwrap().equivalent(&right.union(&left).unwrap()),
            Ok(true)
        );
        assert_eq!(
            left.intersection(&right)
                .unwrap()
                .equivalent(&right.intersection(&left).unwrap()),
            Ok(true)
        );
    }

    #[test]
    fn set_operations_are_associative_at_the_language_level() {
        // three parity languages over pairwise different alphabets
        let even = |counted: char, other: char| {
            AutomatonBuilder::default()
                .with_transitions([
                    (0, counted, 1),
                    (0, other, 0),
                    (1, counted, 0),
                    (1, other, 1),
                ])
                .with_accepting_states([0])
                .into_dfa(0)
        };
        let a = even('a', 'b');
        let b = even('b', 'c');
        let c = even('c', 'a');

        let grouped_left = a.union(&b).unwrap().union(&c).unwrap();
        let grouped_right = a.union(&b.union(&c).unwrap()).unwrap();
        assert_eq!(grouped_left.equivalent(&grouped_right), Ok(true));

        let grouped_left = a.intersection(&b).unwrap().intersection(&c).unwrap();
        let grouped_right = a.intersection(&b.intersection(&c).unwrap()).unwrap();
        assert_eq!(grouped_left.equivalent(&grouped_right), Ok(true));
        assert_eq!(grouped_left.accepts(""), Ok(true));
    }

    #[test]
    fn operands_over_different_alphabets_are_reconciled() {
        let only_a = AutomatonBuilder::default()
            .with_transitions([(0, 'a', 1), (1, 'a', 1)])
            .with_accepting_states([1])
            .into_dfa(0);
        let only_b = AutomatonBuilder::default()
            .with_transitions([(0, 'b', 1), (1, 'b', 1)])
            .with_accepting_states([1])
            .into_dfa(0);

        let either = only_a.union(&only_b).unwrap();
        assert_eq!(either.accepts("aa"), Ok(true));
        assert_eq!(either.accepts("bb"), Ok(true));
        assert_eq!(either.accepts("ab"), Ok(false));

        let both = only_a.intersection(&only_b).unwrap();
        assert_eq!(both.is_empty_language(), Ok(true));
    }

    #[test]
    fn the_low_level_product_stays_strict() {
        let complete = odd_a().complete().unwrap();
        let foreign = AutomatonBuilder::default()
            .with_transitions([(0, 'c', 0)])
            .with_accepting_states([0])
            .into_dfa(0);
        assert!(matches!(
            complete.product(&foreign, |a, b| a || b),
            Err(AutomatonError::AlphabetMismatch { .. })
        ));

        let partial = AutomatonBuilder::default()
            .with_transitions([(0, 'a', 0)])
            .with_alphabet_symbols(['b'])
            .into_dfa(0);
        assert!(matches!(
            partial.product(&partial, |a, b| a && b),
            Err(AutomatonError::NotComplete { .. })
        ));
    }

    #[test]
    fn complement_flips_exactly_the_language() {
        let dfa = ends_in_b();
        let complement = dfa.complement().unwrap();
        for word in SAMPLES {
            assert_eq!(
                complement.accepts(word),
                Ok(!dfa.accepts(word).unwrap()),
                "complement on {word:?}"
            );
        }

        let involution = complement.complement().unwrap();
        assert_eq!(involution.equivalent(&dfa), Ok(true));
    }

    #[test]
    fn complement_covers_nfas_by_determinizing() {
        // nondeterministic description of words containing aa
        let nfa = AutomatonBuilder::default()
            .with_transitions([
                (0, 'a', 0),
                (0, 'b', 0),
                (0, 'a', 1),
                (1, 'a', 2),
                (2, 'a', 2),
                (2, 'b', 2),
            ])
            .with_accepting_states([2])
            .into_nfa([0]);

        let complement = nfa.complement().unwrap();
        assert_eq!(complement.accepts("aa"), Ok(false));
        assert_eq!(complement.accepts("aba"), Ok(true));
        assert_eq!(complement.accepts(""), Ok(true));
    }

    #[test_log::test]
    fn equivalence_ignores_structure_and_names() {
        // a bloated automaton for "odd number of a's" with a redundant state
        let bloated = AutomatonBuilder::default()
            .with_transitions([
                (0, 'a', 1),
                (0, 'b', 2),
                (1, 'a', 0),
                (1, 'b', 1),
                (2, 'a', 1),
                (2, 'b', 2),
            ])
            .with_accepting_states([1])
            .into_dfa(0);

        assert_eq!(bloated.equivalent(&odd_a()), Ok(true));
        assert_eq!(bloated.equivalent(&ends_in_b()), Ok(false));
    }

    #[test]
    fn equivalence_covers_nfas_via_normalization() {
        // nondeterministic description of "contains an a"
        let nfa = AutomatonBuilder::default()
            .with_transitions([(0, 'a', 1), (0, 'b', 0), (1, 'a', 1), (1, 'b', 1)])
            .with_transitions([(0, 'a', 0)])
            .with_accepting_states([1])
            .into_nfa([0]);
        let dfa = AutomatonBuilder::default()
            .with_transitions([(0, 'b', 0), (0, 'a', 1), (1, 'a', 1), (1, 'b', 1)])
            .with_accepting_states([1])
            .into_dfa(0);
        assert_eq!(nfa.equivalent(&dfa), Ok(true));
    }

    #[test]
    fn isomorphism_matches_shape_not_labels() {
        let first = AutomatonBuilder::default()
            .with_transitions([(0, 'a', 1), (1, 'a', 0)])
            .with_accepting_states([1])
            .into_dfa(0);
        let second = AutomatonBuilder::default()
            .with_transitions([(0, 'a', 1), (1, 'a', 0)])
            .with_state_names(["even", "odd"])
            .with_accepting_states([1])
            .into_dfa(0);
        assert_eq!(first.isomorphic(&second), Ok(true));

        let different = AutomatonBuilder::default()
            .with_transitions([(0, 'a', 1), (1, 'a', 1)])
            .with_accepting_states([1])
            .into_dfa(0);
        assert_eq!(first.isomorphic(&different), Ok(false));
    }

    #[test]
    fn emptiness_and_witness_words() {
        let dfa = ends_in_b();
        assert_eq!(dfa.is_empty_language(), Ok(false));
        assert_eq!(dfa.shortest_word(), Ok(Some("b".to_string())));

        let empty = AutomatonBuilder::default()
            .with_transitions([(0, 'a', 0)])
            .into_dfa(0);
        assert_eq!(empty.is_empty_language(), Ok(true));
        assert_eq!(empty.shortest_word(), Ok(None));

        let via_epsilon = AutomatonBuilder::default()
            .with_epsilon_transitions([(0, 1)])
            .with_transitions([(1, 'a', 2)])
            .with_accepting_states([2])
            .into_nfa([0]);
        assert_eq!(via_epsilon.shortest_word(), Ok(Some("a".to_string())));
    }

    #[test]
    fn distinguishing_words_witness_inequivalence() {
        let left = odd_a();
        let right = ends_in_b();
        let witness = left.distinguishing_word(&right).unwrap().unwrap();
        assert_ne!(
            left.accepts(&witness).unwrap(),
            right.accepts(&witness).unwrap()
        );

        assert_eq!(left.distinguishing_word(&odd_a()), Ok(None));
    }
}
