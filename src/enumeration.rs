use tracing::trace;

use crate::automaton::Automaton;
use crate::error::AutomatonError;

impl Automaton {
    /// All accepted words of length at most `max_len`, in length-lexicographic
    /// order: shorter words first, words of equal length sorted by symbol.
    /// Words are drawn from the full language of the alphabet, `max_len` of
    /// zero considers only the empty word. The automaton may be
    /// nondeterministic, a determinized and completed copy is explored
    /// internally so that every word is emitted exactly once.
    pub fn accepted_words(&self, max_len: usize) -> Result<Vec<String>, AutomatonError> {
        self.bounded_words(max_len, true)
    }

    /// All words of length at most `max_len` over the alphabet that are *not*
    /// accepted, in the same length-lexicographic order as
    /// [`accepted_words`](Automaton::accepted_words). Together the two calls
    /// partition every word up to the bound.
    pub fn rejected_words(&self, max_len: usize) -> Result<Vec<String>, AutomatonError> {
        self.bounded_words(max_len, false)
    }

    fn bounded_words(
        &self,
        max_len: usize,
        accepted: bool,
    ) -> Result<Vec<String>, AutomatonError> {
        let dfa = self.determinize()?.complete()?;
        let Some(start) = dfa.initial_states().into_iter().next() else {
            return Err(AutomatonError::NoInitialState);
        };

        let mut found = Vec::new();
        let mut layer = vec![(start, String::new())];
        for depth in 0..=max_len {
            for (state, word) in &layer {
                if dfa.accepting(*state) == accepted {
                    found.push(word.clone());
                }
            }
            if depth == max_len {
                break;
            }
            let mut next = Vec::with_capacity(layer.len() * dfa.alphabet().size());
            for (state, word) in &layer {
                for sym in dfa.alphabet().symbols() {
                    if let Some(target) = dfa.successor(*state, sym) {
                        let mut extended = word.clone();
                        extended.push(sym);
                        next.push((target, extended));
                    }
                }
            }
            layer = next;
        }
        trace!(
            "enumeration up to length {max_len} collected {} words",
            found.len()
        );
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    // the even binary numbers, the empty word and every word ending in 0
    fn even_numbers() -> Automaton {
        AutomatonBuilder::default()
            .with_transitions([(0, '0', 0), (0, '1', 1), (1, '0', 0), (1, '1', 1)])
            .with_accepting_states([0])
            .into_dfa(0)
    }

    #[test_log::test]
    fn enumeration_lists_words_in_length_lex_order() {
        let dfa = even_numbers();
        assert_eq!(
            dfa.accepted_words(2),
            Ok(vec![
                String::new(),
                "0".to_string(),
                "00".to_string(),
                "10".to_string()
            ])
        );
        assert_eq!(
            dfa.rejected_words(2),
            Ok(vec!["1".to_string(), "01".to_string(), "11".to_string()])
        );
    }

    #[test]
    fn a_bound_of_zero_considers_only_the_empty_word() {
        let dfa = even_numbers();
        assert_eq!(dfa.accepted_words(0), Ok(vec![String::new()]));
        assert_eq!(dfa.rejected_words(0), Ok(vec![]));
    }

    #[test]
    fn partial_automata_reject_words_running_into_a_dead_end() {
        let partial = AutomatonBuilder::default()
            .with_transitions([(0, 'a', 1)])
            .with_alphabet_symbols(['b'])
            .with_accepting_states([1])
            .into_dfa(0);
        assert_eq!(partial.accepted_words(2), Ok(vec!["a".to_string()]));
        assert_eq!(
            partial.rejected_words(1),
            Ok(vec![String::new(), "b".to_string()])
        );
    }

    #[test]
    fn enumeration_determinizes_nfas_first() {
        let nfa = AutomatonBuilder::default()
            .with_epsilon_transitions([(0, 1)])
            .with_transitions([(1, 'a', 2), (2, 'b', 2)])
            .with_accepting_states([2])
            .into_nfa([0]);

        let accepted = nfa.accepted_words(3).unwrap();
        assert_eq!(accepted, vec!["a", "ab", "abb"]);
        for word in &accepted {
            assert_eq!(nfa.accepts(word), Ok(true));
        }
    }
}
