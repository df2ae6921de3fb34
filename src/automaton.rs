use std::fmt;

use itertools::Itertools;
use tracing::trace;

use crate::alphabet::{Alphabet, Label, Symbol};
use crate::error::AutomatonError;
use crate::math::{Map, OrderedSet};

mod builder;
mod display;

pub use builder::AutomatonBuilder;

/// Identifier of a state inside one [`Automaton`]. Ids are minted by the
/// automaton, stay stable for its lifetime and are never reused after a
/// removal. They carry no meaning across different automata; algorithms that
/// build new automata assign fresh ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(u32);

impl StateId {
    /// Returns the raw index behind this id.
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl From<u32> for StateId {
    fn from(raw: u32) -> Self {
        StateId(raw)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single state. Stores the display name, the initial and accepting flags and
/// the list of outgoing edges. The name is presentation only, it is not
/// required to be unique and renaming never affects identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    name: String,
    initial: bool,
    accepting: bool,
    edges: Vec<(Label, StateId)>,
}

impl State {
    fn new(name: String, initial: bool, accepting: bool) -> Self {
        Self {
            name,
            initial,
            accepting,
            edges: Vec::new(),
        }
    }

    /// The display name of this state.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether runs may start in this state.
    pub fn is_initial(&self) -> bool {
        self.initial
    }

    /// Whether runs ending in this state accept.
    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Iterates the outgoing edges as (label, target) pairs.
    pub fn edges(&self) -> impl Iterator<Item = (Label, StateId)> + '_ {
        self.edges.iter().copied()
    }

    fn add_edge(&mut self, label: Label, to: StateId) -> bool {
        if self.edges.iter().any(|&(l, q)| l == label && q == to) {
            return false;
        }
        self.edges.push((label, to));
        true
    }

    fn remove_edge(&mut self, label: Label, to: StateId) -> bool {
        if let Some(position) = self.edges.iter().position(|&(l, q)| l == label && q == to) {
            self.edges.remove(position);
            true
        } else {
            false
        }
    }

    fn remove_edges_to(&mut self, target: StateId) {
        self.edges.retain(|&(_, q)| q != target);
    }
}

/// A finite automaton over [`char`] symbols, deterministic or not. States live
/// in a flat arena keyed by [`StateId`], edges are (label, target) records on
/// their source state, so cyclic transition structure needs no special
/// treatment. Whether the automaton is a DFA is a runtime property, see
/// [`is_deterministic`](Automaton::is_deterministic), never a separate type.
///
/// Every mutation checks its own preconditions and fails with an
/// [`AutomatonError`] instead of silently repairing anything. Algorithms never
/// mutate their input, they return freshly constructed automata.
#[derive(Clone)]
pub struct Automaton {
    alphabet: Alphabet,
    states: Map<StateId, State>,
    next_id: u32,
}

impl PartialEq for Automaton {
    fn eq(&self, other: &Self) -> bool {
        self.alphabet == other.alphabet && self.states == other.states
    }
}
impl Eq for Automaton {}

impl Automaton {
    /// Creates an empty automaton over the given alphabet. An empty automaton
    /// fails [`validate`](Automaton::validate) until an initial state is added.
    pub fn new(alphabet: Alphabet) -> Self {
        Self {
            alphabet,
            states: Map::default(),
            next_id: 0,
        }
    }

    /// Reassembles an automaton from raw parts, typically produced by an
    /// external deserializer. States are `(id, name, initial, accepting)`
    /// tuples, transitions are `(source, label, target)` triples. Fails on
    /// duplicate ids, dangling endpoints, undeclared symbols or a missing
    /// initial state; on success the result is valid by construction.
    pub fn from_parts(
        alphabet: Alphabet,
        states: impl IntoIterator<Item = (StateId, String, bool, bool)>,
        transitions: impl IntoIterator<Item = (StateId, Label, StateId)>,
    ) -> Result<Self, AutomatonError> {
        let mut automaton = Self::new(alphabet);
        for (id, name, initial, accepting) in states {
            if automaton.states.contains_key(&id) {
                return Err(AutomatonError::DuplicateState(id));
            }
            automaton
                .states
                .insert(id, State::new(name, initial, accepting));
            automaton.next_id = automaton.next_id.max(id.raw().saturating_add(1));
        }
        for (source, label, target) in transitions {
            automaton.add_transition(source, label, target)?;
        }
        automaton.validate()?;
        Ok(automaton)
    }

    /// Decomposes the automaton into the parts accepted by
    /// [`from_parts`](Automaton::from_parts), sorted by state id.
    #[allow(clippy::type_complexity)]
    pub fn into_parts(
        self,
    ) -> (
        Alphabet,
        Vec<(StateId, String, bool, bool)>,
        Vec<(StateId, Label, StateId)>,
    ) {
        let transitions = self.transitions().collect();
        let states = self
            .states
            .iter()
            .sorted_by_key(|(id, _)| **id)
            .map(|(id, state)| (*id, state.name.clone(), state.initial, state.accepting))
            .collect();
        (self.alphabet, states, transitions)
    }

    /// The alphabet this automaton reads.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Number of states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Number of transitions, epsilon included.
    pub fn transition_count(&self) -> usize {
        self.states.values().map(|state| state.edges.len()).sum()
    }

    /// Iterates all state ids in ascending order.
    pub fn state_ids(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.keys().copied().sorted()
    }

    /// Checks whether the state exists.
    pub fn contains_state(&self, id: StateId) -> bool {
        self.states.contains_key(&id)
    }

    /// Returns the state behind `id`, if it exists.
    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(&id)
    }

    /// The set of initial state ids, derived from the per-state flags.
    pub fn initial_states(&self) -> OrderedSet<StateId> {
        self.states
            .iter()
            .filter(|(_, state)| state.initial)
            .map(|(id, _)| *id)
            .collect()
    }

    /// The set of accepting state ids.
    pub fn accepting_states(&self) -> OrderedSet<StateId> {
        self.states
            .iter()
            .filter(|(_, state)| state.accepting)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Iterates all transitions as (source, label, target) triples, grouped by
    /// source id in ascending order.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, Label, StateId)> + '_ {
        self.state_ids().flat_map(move |id| {
            self.states[&id]
                .edges()
                .map(move |(label, target)| (id, label, target))
        })
    }

    /// Iterates the outgoing edges of `source`. Empty if the state is unknown.
    pub fn transitions_from(&self, source: StateId) -> impl Iterator<Item = (Label, StateId)> + '_ {
        self.states
            .get(&source)
            .into_iter()
            .flat_map(|state| state.edges())
    }

    /// All targets reachable from `source` by consuming `sym` once. Epsilon
    /// edges are not followed, see [`epsilon_closure`](Automaton::epsilon_closure)
    /// for that.
    pub fn targets(&self, source: StateId, sym: Symbol) -> OrderedSet<StateId> {
        self.transitions_from(source)
            .filter(|(label, _)| label.symbol() == Some(sym))
            .map(|(_, target)| target)
            .collect()
    }

    /// All targets of epsilon edges leaving `source`.
    pub fn epsilon_targets(&self, source: StateId) -> OrderedSet<StateId> {
        self.transitions_from(source)
            .filter(|(label, _)| label.is_epsilon())
            .map(|(_, target)| target)
            .collect()
    }

    /// The unique `sym` successor of `source`, i.e. the first one found.
    /// Meaningful on deterministic automata, where at most one exists.
    pub fn successor(&self, source: StateId, sym: Symbol) -> Option<StateId> {
        self.transitions_from(source)
            .find(|(label, _)| label.symbol() == Some(sym))
            .map(|(_, target)| target)
    }

    /// Adds a state with the given display name and flags, minting a fresh id.
    pub fn add_state(
        &mut self,
        name: impl Into<String>,
        initial: bool,
        accepting: bool,
    ) -> StateId {
        let id = StateId(self.next_id);
        self.next_id += 1;
        self.states
            .insert(id, State::new(name.into(), initial, accepting));
        trace!("added state {id} named {}", self.states[&id].name);
        id
    }

    /// Removes a state and every transition touching it, returning the removed
    /// state. Incident edges of other states are dropped as well, the arena
    /// never holds dangling references.
    pub fn remove_state(&mut self, id: StateId) -> Result<State, AutomatonError> {
        let state = self
            .states
            .remove(&id)
            .ok_or(AutomatonError::MissingState(id))?;
        for other in self.states.values_mut() {
            other.remove_edges_to(id);
        }
        trace!("removed state {id} and its incident transitions");
        Ok(state)
    }

    /// Adds a transition. The label must be epsilon or a declared symbol and
    /// both endpoints must exist. Transitions form a set, re-adding an existing
    /// one returns `Ok(false)`.
    pub fn add_transition(
        &mut self,
        source: StateId,
        label: impl Into<Label>,
        target: StateId,
    ) -> Result<bool, AutomatonError> {
        let label = label.into();
        if let Some(sym) = label.symbol() {
            if !self.alphabet.contains(sym) {
                return Err(AutomatonError::SymbolNotInAlphabet(sym));
            }
        }
        if !self.states.contains_key(&target) {
            return Err(AutomatonError::MissingState(target));
        }
        let state = self
            .states
            .get_mut(&source)
            .ok_or(AutomatonError::MissingState(source))?;
        Ok(state.add_edge(label, target))
    }

    /// Removes a transition, returning whether it was present.
    pub fn remove_transition(
        &mut self,
        source: StateId,
        label: impl Into<Label>,
        target: StateId,
    ) -> Result<bool, AutomatonError> {
        let label = label.into();
        let state = self
            .states
            .get_mut(&source)
            .ok_or(AutomatonError::MissingState(source))?;
        Ok(state.remove_edge(label, target))
    }

    /// Marks or unmarks `id` as initial.
    pub fn set_initial(&mut self, id: StateId, initial: bool) -> Result<(), AutomatonError> {
        self.states
            .get_mut(&id)
            .ok_or(AutomatonError::MissingState(id))?
            .initial = initial;
        Ok(())
    }

    /// Marks or unmarks `id` as accepting.
    pub fn set_accepting(&mut self, id: StateId, accepting: bool) -> Result<(), AutomatonError> {
        self.states
            .get_mut(&id)
            .ok_or(AutomatonError::MissingState(id))?
            .accepting = accepting;
        Ok(())
    }

    /// Changes the display name of `id`. Identity is untouched, ids never change.
    pub fn rename_state(
        &mut self,
        id: StateId,
        name: impl Into<String>,
    ) -> Result<(), AutomatonError> {
        self.states
            .get_mut(&id)
            .ok_or(AutomatonError::MissingState(id))?
            .name = name.into();
        Ok(())
    }

    /// Declares an additional symbol, returning true if it was new.
    pub fn insert_symbol(&mut self, sym: Symbol) -> bool {
        self.alphabet.insert(sym)
    }

    /// Undeclares a symbol. Fails if a transition still consumes it, removal
    /// would leave that transition's label outside the alphabet.
    pub fn remove_symbol(&mut self, sym: Symbol) -> Result<bool, AutomatonError> {
        if self
            .transitions()
            .any(|(_, label, _)| label.symbol() == Some(sym))
        {
            return Err(AutomatonError::SymbolNotInAlphabet(sym));
        }
        Ok(self.alphabet.remove(sym))
    }

    /// Replaces the alphabet wholesale. Fails if any existing transition
    /// consumes a symbol the new alphabet does not declare.
    pub fn set_alphabet(&mut self, alphabet: Alphabet) -> Result<(), AutomatonError> {
        for (_, label, _) in self.transitions() {
            if let Some(sym) = label.symbol() {
                if !alphabet.contains(sym) {
                    return Err(AutomatonError::SymbolNotInAlphabet(sym));
                }
            }
        }
        self.alphabet = alphabet;
        Ok(())
    }

    /// Structural validity check: every transition endpoint exists, every
    /// non-epsilon label is declared and at least one state is initial.
    /// Reports the first violation found, in ascending state order. Algorithms
    /// call this before running and fail fast instead of working on an
    /// inconsistent structure.
    pub fn validate(&self) -> Result<(), AutomatonError> {
        for source in self.state_ids() {
            for (label, target) in self.states[&source].edges() {
                if !self.states.contains_key(&target) {
                    return Err(AutomatonError::MissingState(target));
                }
                if let Some(sym) = label.symbol() {
                    if !self.alphabet.contains(sym) {
                        return Err(AutomatonError::SymbolNotInAlphabet(sym));
                    }
                }
            }
        }
        if !self.states.values().any(|state| state.initial) {
            return Err(AutomatonError::NoInitialState);
        }
        Ok(())
    }
}
