use tracing::debug;

use crate::automaton::Automaton;
use crate::error::AutomatonError;

impl Automaton {
    /// Turns a partial DFA into a complete one. Requires a deterministic
    /// input. If every (state, symbol) pair already has a transition the
    /// result is an equivalent copy; otherwise one non-accepting sink state
    /// with self-loops on every symbol is added and every missing pair gets a
    /// transition into it. Words that previously died at a missing transition
    /// now run into the sink and are still rejected, the language is
    /// unchanged. Completing an already complete DFA is idempotent up to
    /// isomorphism.
    pub fn complete(&self) -> Result<Automaton, AutomatonError> {
        self.require_deterministic()?;
        let missing = self.missing_transitions();
        if missing.is_empty() {
            debug!("automaton is already complete");
            return Ok(self.clone());
        }

        let mut completed = self.clone();
        let filled = missing.len();
        let sink = completed.add_state("sink", false, false);
        for sym in self.alphabet().symbols() {
            completed.add_transition(sink, sym, sink)?;
        }
        for (state, sym) in missing {
            completed.add_transition(state, sym, sink)?;
        }
        debug!("added sink state {sink} and filled {filled} missing transitions");
        Ok(completed)
    }
}
