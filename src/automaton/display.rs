use std::fmt;

use itertools::Itertools;

use crate::automaton::{Automaton, StateId};
use crate::math::OrderedSet;

impl Automaton {
    /// Renders the transition structure as a text table with one row per state
    /// and one column per alphabet symbol, plus a trailing ε column when
    /// epsilon transitions are present. Initial states carry a leading arrow,
    /// accepting states are printed bold, absent transitions show as `-`.
    pub fn transition_table(&self) -> String {
        use owo_colors::OwoColorize;

        let has_epsilon = self.transitions().any(|(_, label, _)| label.is_epsilon());
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("state".to_string())
                .chain(self.alphabet.symbols().map(|sym| sym.to_string()))
                .chain(has_epsilon.then(|| "ε".to_string())),
        );

        for id in self.state_ids() {
            let state = &self.states[&id];
            let mut name = state.name().to_string();
            if state.is_accepting() {
                name = name.bold().to_string();
            }
            if state.is_initial() {
                name = format!("→ {name}");
            }

            let mut row = vec![name];
            for sym in self.alphabet.symbols() {
                row.push(self.cell(self.targets(id, sym)));
            }
            if has_epsilon {
                row.push(self.cell(self.epsilon_targets(id)));
            }
            builder.push_record(row);
        }

        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }

    fn cell(&self, targets: OrderedSet<StateId>) -> String {
        if targets.is_empty() {
            "-".to_string()
        } else {
            targets
                .iter()
                .map(|target| self.states[target].name())
                .join(", ")
        }
    }
}

impl fmt::Debug for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "automaton over {} with {} states",
            self.alphabet,
            self.size()
        )?;
        write!(f, "{}", self.transition_table())
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn table_lists_symbols_and_marks_states() {
        let automaton = AutomatonBuilder::default()
            .with_transitions([(0, 'a', 1), (0, 'b', 0), (1, 'a', 1)])
            .with_state_names(["start", "end"])
            .with_accepting_states([1])
            .into_dfa(0);

        let table = automaton.transition_table();
        assert!(table.contains("start"));
        assert!(table.contains("end"));
        assert!(table.contains("→"));
        assert!(table.contains('-'));
        assert!(!table.contains('ε'));
    }

    #[test]
    fn table_grows_an_epsilon_column_when_needed() {
        let automaton = AutomatonBuilder::default()
            .with_transitions([(0, 'a', 1)])
            .with_epsilon_transitions([(0, 1)])
            .into_nfa([0]);

        assert!(automaton.transition_table().contains('ε'));
        let debugged = format!("{automaton:?}");
        assert!(debugged.contains("2 states"));
    }
}
