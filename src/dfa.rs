use std::fmt::{Debug, Display};

use itertools::Itertools;
use tracing::trace;

use crate::{
    math::{OrderedMap, OrderedSet},
    prelude::*,
};

/// A state of a [`DFA`]. It stores whether the state is accepting together with the outgoing
/// edges, which are kept sorted by symbol. As the automaton is deterministic, every symbol
/// appears at most once.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct DfaState {
    accepting: bool,
    edges: Vec<(Symbol, StateIndex)>,
}

impl DfaState {
    /// Creates a new state without outgoing edges.
    pub fn new(accepting: bool) -> Self {
        Self {
            accepting,
            edges: Vec::new(),
        }
    }

    /// Returns true if the state is accepting.
    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Returns the outgoing edges as pairs of symbol and target, sorted by symbol.
    pub fn edges(&self) -> &[(Symbol, StateIndex)] {
        &self.edges
    }

    fn target(&self, symbol: Symbol) -> Option<StateIndex> {
        self.edges
            .binary_search_by_key(&symbol, |(a, _)| *a)
            .ok()
            .map(|pos| self.edges[pos].1)
    }
}

/// A deterministic finite automaton with a partial transition function. States are indexed
/// by `0..size()` and symbols by `0..symbols()`. The transition function is stored as one
/// edge list per state, and the determinism invariant (at most one target for each pair of
/// state and symbol) is upheld by every method that modifies the automaton.
#[derive(Clone, Eq, PartialEq)]
pub struct DFA {
    symbols: usize,
    initial: StateIndex,
    states: Vec<DfaState>,
}

/// The normalized record describing an automaton. This is what the readers in
/// [`crate::formats`] produce and what [`DFA::from_parts`] consumes. Missing entries in
/// `transitions` mean that there is no transition.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DfaParts {
    /// The number of states.
    pub num_states: usize,
    /// The number of symbols in the alphabet.
    pub num_symbols: usize,
    /// The index of the initial state.
    pub initial: StateIndex,
    /// The indices of all accepting states.
    pub accepting: OrderedSet<StateIndex>,
    /// Maps a pair of state and symbol to the target of the transition.
    pub transitions: OrderedMap<(StateIndex, Symbol), StateIndex>,
}

impl DFA {
    /// Creates an automaton with `states` non-accepting states, no transitions and the given
    /// initial state. Fails if there are no states or `initial` is out of range.
    pub fn new(
        states: usize,
        symbols: usize,
        initial: StateIndex,
    ) -> Result<Self, MinimizationError> {
        if states == 0 {
            return Err(MinimizationError::NoStates);
        }
        if initial >= states {
            return Err(MinimizationError::InitialOutOfRange {
                initial: initial as i64,
                states,
            });
        }
        Ok(Self {
            symbols,
            initial,
            states: vec![DfaState::default(); states],
        })
    }

    /// Creates a [`DfaBuilder`], which offers a convenient way of assembling an automaton.
    pub fn builder() -> DfaBuilder {
        DfaBuilder::default()
    }

    /// Builds an automaton from its normalized record, verifying that all indices are in
    /// range and that no pair of state and symbol is mapped to two different targets.
    pub fn from_parts(parts: DfaParts) -> Result<Self, MinimizationError> {
        let DfaParts {
            num_states,
            num_symbols,
            initial,
            accepting,
            transitions,
        } = parts;
        let mut dfa = Self::new(num_states, num_symbols, initial)?;
        for q in accepting {
            if q >= num_states {
                return Err(MinimizationError::AcceptingOutOfRange {
                    state: q,
                    states: num_states,
                });
            }
            dfa.set_accepting(q, true);
        }
        for ((q, a), p) in transitions {
            dfa.checked_add_transition(q, a, p)?;
        }
        Ok(dfa)
    }

    /// Builds an automaton from a dense transition table as it appears in the plain text
    /// format. Row `q` of `table` holds the targets of state `q` for every symbol, and a
    /// negative entry (conventionally `-1`) means that there is no transition. The number
    /// of states is given by the length of `accepting`.
    pub fn from_table(
        symbols: usize,
        initial: i64,
        accepting: &[bool],
        table: &[Vec<i64>],
    ) -> Result<Self, MinimizationError> {
        let states = accepting.len();
        if table.len() != states || table.iter().any(|row| row.len() != symbols) {
            return Err(MinimizationError::TableShape {
                rows: table.len(),
                columns: table.iter().map(|row| row.len()).find(|len| *len != symbols),
                states,
                symbols,
            });
        }
        if initial < 0 {
            return Err(MinimizationError::InitialOutOfRange { initial, states });
        }

        let mut dfa = Self::new(states, symbols, initial as StateIndex)?;
        for (q, flag) in accepting.iter().enumerate() {
            dfa.set_accepting(q, *flag);
        }
        for (q, row) in table.iter().enumerate() {
            for (a, target) in row.iter().enumerate() {
                if *target < 0 {
                    continue;
                }
                dfa.checked_add_transition(q, a, *target as StateIndex)?;
            }
        }
        Ok(dfa)
    }

    /// Decomposes `self` into its normalized record.
    pub fn to_parts(&self) -> DfaParts {
        DfaParts {
            num_states: self.size(),
            num_symbols: self.symbols,
            initial: self.initial,
            accepting: self.accepting_states().collect(),
            transitions: self.transitions().map(|(q, a, p)| ((q, a), p)).collect(),
        }
    }

    /// Returns the dense transition table of `self`, where `-1` marks a missing transition.
    pub fn to_table(&self) -> Vec<Vec<i64>> {
        self.state_indices()
            .map(|q| {
                (0..self.symbols)
                    .map(|a| self.transition(q, a).map_or(-1, |p| p as i64))
                    .collect()
            })
            .collect()
    }

    /// Gives the number of states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Gives the number of symbols in the alphabet.
    pub fn symbols(&self) -> usize {
        self.symbols
    }

    /// Returns the index of the initial state.
    pub fn initial(&self) -> StateIndex {
        self.initial
    }

    /// Returns an iterator over all state indices, in increasing order.
    pub fn state_indices(&self) -> std::ops::Range<StateIndex> {
        0..self.states.len()
    }

    /// Gives a reference to the state with the given index, if it exists.
    pub fn state(&self, state: StateIndex) -> Option<&DfaState> {
        self.states.get(state)
    }

    /// Returns true if `state` exists and is accepting.
    pub fn is_accepting(&self, state: StateIndex) -> bool {
        self.states.get(state).is_some_and(|s| s.accepting)
    }

    /// Marks `state` as accepting or rejecting. Does nothing if the state does not exist.
    pub fn set_accepting(&mut self, state: StateIndex, accepting: bool) {
        match self.states.get_mut(state) {
            Some(s) => s.accepting = accepting,
            None => tracing::error!("cannot set acceptance of state {state} that does not exist"),
        }
    }

    /// Returns an iterator over the indices of all accepting states, in increasing order.
    pub fn accepting_states(&self) -> impl Iterator<Item = StateIndex> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter_map(|(q, s)| s.accepting.then_some(q))
    }

    /// Returns the target of the transition leaving `state` on `symbol`. The absence of a
    /// transition is a regular outcome, as the transition function is partial.
    pub fn transition(&self, state: StateIndex, symbol: Symbol) -> Option<StateIndex> {
        self.states.get(state)?.target(symbol)
    }

    /// Checks whether there is a transition from `from` to `to` on `symbol`.
    pub fn has_transition(&self, from: StateIndex, to: StateIndex, symbol: Symbol) -> bool {
        self.transition(from, symbol) == Some(to)
    }

    /// Adds a transition from `from` to `to` on `symbol` and returns whether the automaton
    /// changed. Nothing happens and `false` is returned if one of the indices does not exist,
    /// if the transition is already present, or if `from` already has a transition to a
    /// different state on `symbol`, as that would make the automaton nondeterministic.
    pub fn add_transition(&mut self, from: StateIndex, to: StateIndex, symbol: Symbol) -> bool {
        if to >= self.size() || symbol >= self.symbols {
            return false;
        }
        let Some(state) = self.states.get_mut(from) else {
            return false;
        };
        match state.edges.binary_search_by_key(&symbol, |(a, _)| *a) {
            Ok(_) => false,
            Err(pos) => {
                state.edges.insert(pos, (symbol, to));
                true
            }
        }
    }

    /// Removes the transition leaving `from` on `symbol` and returns its target, if there
    /// was one.
    pub fn remove_transition(&mut self, from: StateIndex, symbol: Symbol) -> Option<StateIndex> {
        let state = self.states.get_mut(from)?;
        let pos = state
            .edges
            .binary_search_by_key(&symbol, |(a, _)| *a)
            .ok()?;
        Some(state.edges.remove(pos).1)
    }

    /// Like [`Self::add_transition`], but reports why a transition can not be added. Adding
    /// a transition that is already present is not an error.
    fn checked_add_transition(
        &mut self,
        from: StateIndex,
        symbol: Symbol,
        to: StateIndex,
    ) -> Result<(), MinimizationError> {
        let states = self.size();
        if from >= states {
            return Err(MinimizationError::SourceOutOfRange {
                state: from,
                states,
            });
        }
        if to >= states {
            return Err(MinimizationError::TargetOutOfRange { state: to, states });
        }
        if symbol >= self.symbols {
            return Err(MinimizationError::SymbolOutOfRange {
                symbol,
                symbols: self.symbols,
            });
        }
        match self.transition(from, symbol) {
            Some(existing) if existing != to => Err(MinimizationError::Nondeterministic {
                state: from,
                symbol,
                first: existing,
                second: to,
            }),
            Some(_) => Ok(()),
            None => {
                self.add_transition(from, to, symbol);
                Ok(())
            }
        }
    }

    /// Returns an iterator over the edges leaving `state` as pairs of symbol and target,
    /// ordered by symbol. Returns `None` if the state does not exist.
    pub fn edges_from(
        &self,
        state: StateIndex,
    ) -> Option<impl Iterator<Item = (Symbol, StateIndex)> + '_> {
        self.states.get(state).map(|s| s.edges.iter().copied())
    }

    /// Returns an iterator over all transitions as triples of source, symbol and target,
    /// ordered by source and then by symbol.
    pub fn transitions(&self) -> impl Iterator<Item = (StateIndex, Symbol, StateIndex)> + '_ {
        self.states
            .iter()
            .enumerate()
            .flat_map(|(q, s)| s.edges.iter().map(move |(a, p)| (q, *a, *p)))
    }

    /// Verifies that no state has two edges on the same symbol. The methods of [`DFA`] never
    /// produce such a state, so this serves as a sanity check on results.
    pub fn is_deterministic(&self) -> bool {
        self.states.iter().all(|s| {
            s.edges
                .iter()
                .tuple_windows()
                .all(|((a, _), (b, _))| a < b)
        })
    }

    /// Returns true if every state has a transition on every symbol.
    pub fn is_complete(&self) -> bool {
        self.states.iter().all(|s| s.edges.len() == self.symbols)
    }

    /// Runs `word` from `origin` and returns the state that is reached, or `None` if the run
    /// gets stuck on a missing transition.
    pub fn reached_state_from<W>(&self, origin: StateIndex, word: W) -> Option<StateIndex>
    where
        W: IntoIterator<Item = Symbol>,
    {
        word.into_iter()
            .try_fold(origin, |q, a| self.transition(q, a))
    }

    /// Runs `word` from the initial state, see [`Self::reached_state_from`].
    pub fn reached_state<W>(&self, word: W) -> Option<StateIndex>
    where
        W: IntoIterator<Item = Symbol>,
    {
        self.reached_state_from(self.initial, word)
    }

    /// Decides whether `word` is accepted, which is the case if its run from the initial
    /// state exists and ends in an accepting state.
    pub fn accepts<W>(&self, word: W) -> bool
    where
        W: IntoIterator<Item = Symbol>,
    {
        self.reached_state(word)
            .is_some_and(|q| self.is_accepting(q))
    }

    /// Returns a string representation of the transition table. The initial state is
    /// prefixed with `→`, accepting states are marked with `*` and a missing transition is
    /// shown as `-`.
    pub fn build_transition_table(&self) -> String {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("State".to_string()).chain((0..self.symbols).map(|a| a.to_string())),
        );
        for q in self.state_indices() {
            let mut row = vec![format!(
                "{}{}{}",
                if q == self.initial { "→" } else { "" },
                q,
                if self.is_accepting(q) { "*" } else { "" }
            )];
            for a in 0..self.symbols {
                row.push(self.transition(q, a).map_or("-".to_string(), |p| p.to_string()));
            }
            builder.push_record(row);
        }

        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }
}

impl TransitionSystem for DFA {
    type SuccessorsIter<'this> = std::iter::Map<
        std::slice::Iter<'this, (Symbol, StateIndex)>,
        fn(&(Symbol, StateIndex)) -> StateIndex,
    >;

    fn size(&self) -> usize {
        self.states.len()
    }

    fn successors(&self, state: StateIndex) -> Option<Self::SuccessorsIter<'_>> {
        let target: fn(&(Symbol, StateIndex)) -> StateIndex = |(_, p)| *p;
        self.states.get(state).map(|s| s.edges.iter().map(target))
    }
}

impl TryFrom<DfaParts> for DFA {
    type Error = MinimizationError;

    fn try_from(value: DfaParts) -> Result<Self, Self::Error> {
        Self::from_parts(value)
    }
}

impl From<&DFA> for DfaParts {
    fn from(value: &DFA) -> Self {
        value.to_parts()
    }
}

impl Debug for DFA {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "DFA with {} states over {} symbols, initial state {}",
            self.size(),
            self.symbols,
            self.initial
        )?;
        write!(f, "{}", self.build_transition_table())
    }
}

impl Display for DFA {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.build_transition_table())
    }
}

/// Helper struct for the construction of a [`DFA`]. It collects accepting states and
/// transitions given as triples `(source, symbol, target)`. Unless set explicitly, the number
/// of states and symbols is the smallest one that accommodates every index that was given.
///
/// # Example
///
/// We want to create a DFA with two states 0 and 1 over two symbols that accepts all words
/// ending with symbol 1. State 0 is initial, state 1 is accepting.
/// ```
/// use minimal_dfa::prelude::*;
///
/// let dfa = DFA::builder()
///     .with_accepting([1])
///     .with_transitions([(0, 0, 0), (0, 1, 1), (1, 0, 0), (1, 1, 1)])
///     .into_dfa(0);
/// assert_eq!(dfa.size(), 2);
/// assert!(dfa.accepts([0, 0, 1]));
/// assert!(!dfa.accepts([1, 0]));
/// ```
#[derive(Clone, Debug, Default)]
pub struct DfaBuilder {
    states: Option<usize>,
    symbols: Option<usize>,
    accepting: OrderedSet<StateIndex>,
    transitions: Vec<(StateIndex, Symbol, StateIndex)>,
}

impl DfaBuilder {
    /// Fixes the number of states, which allows for states that appear on no transition.
    pub fn with_states(mut self, states: usize) -> Self {
        self.states = Some(states);
        self
    }

    /// Fixes the number of symbols, which allows for symbols that appear on no transition.
    pub fn with_symbols(mut self, symbols: usize) -> Self {
        self.symbols = Some(symbols);
        self
    }

    /// Marks the given states as accepting.
    pub fn with_accepting<I: IntoIterator<Item = StateIndex>>(mut self, iter: I) -> Self {
        self.accepting.extend(iter);
        self
    }

    /// Adds transitions given as triples of source, symbol and target.
    pub fn with_transitions<I>(mut self, iter: I) -> Self
    where
        I: IntoIterator<Item = (StateIndex, Symbol, StateIndex)>,
    {
        self.transitions.extend(iter);
        self
    }

    /// Attempts to build the automaton with the given initial state. This fails under the
    /// same conditions as [`DFA::from_parts`].
    pub fn try_into_dfa(self, initial: StateIndex) -> Result<DFA, MinimizationError> {
        let num_states = self.states.unwrap_or_else(|| {
            self.transitions
                .iter()
                .flat_map(|(q, _, p)| [*q, *p])
                .chain(self.accepting.iter().copied())
                .chain(std::iter::once(initial))
                .max()
                .map_or(0, |max| max + 1)
        });
        let num_symbols = self.symbols.unwrap_or_else(|| {
            self.transitions
                .iter()
                .map(|(_, a, _)| *a)
                .max()
                .map_or(0, |max| max + 1)
        });
        trace!("building DFA with {num_states} states over {num_symbols} symbols");

        let mut transitions = OrderedMap::default();
        for (q, a, p) in self.transitions {
            if let Some(existing) = transitions.insert((q, a), p) {
                if existing != p {
                    return Err(MinimizationError::Nondeterministic {
                        state: q,
                        symbol: a,
                        first: existing,
                        second: p,
                    });
                }
            }
        }

        DFA::from_parts(DfaParts {
            num_states,
            num_symbols,
            initial,
            accepting: self.accepting,
            transitions,
        })
    }

    /// Builds the automaton with the given initial state.
    ///
    /// # Panics
    /// Panics if the collected parts do not form a valid automaton, see
    /// [`Self::try_into_dfa`].
    pub fn into_dfa(self, initial: StateIndex) -> DFA {
        match self.try_into_dfa(initial) {
            Ok(dfa) => dfa,
            Err(e) => {
                tracing::error!("could not build DFA: {e}");
                panic!("could not build DFA: {e}");
            }
        }
    }
}
