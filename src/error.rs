use thiserror::Error;

use crate::{StateIndex, Symbol};

/// Abstracts the ways in which the parts handed to [`crate::DFA::from_parts`] can fail to
/// describe a deterministic automaton. Any of these aborts the construction, no partial
/// automaton is produced.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[allow(missing_docs)]
pub enum MinimizationError {
    #[error("automaton must have at least one state")]
    NoStates,
    #[error("initial state {initial} is out of range for {states} states")]
    InitialOutOfRange { initial: i64, states: usize },
    #[error("accepting state {state} is out of range for {states} states")]
    AcceptingOutOfRange { state: StateIndex, states: usize },
    #[error("transition source {state} is out of range for {states} states")]
    SourceOutOfRange { state: StateIndex, states: usize },
    #[error("transition target {state} is out of range for {states} states")]
    TargetOutOfRange { state: StateIndex, states: usize },
    #[error("symbol {symbol} is out of range for an alphabet of {symbols} symbols")]
    SymbolOutOfRange { symbol: Symbol, symbols: usize },
    #[error("state {state} has transitions to both {first} and {second} on symbol {symbol}")]
    Nondeterministic {
        state: StateIndex,
        symbol: Symbol,
        first: StateIndex,
        second: StateIndex,
    },
    #[error("transition table has {rows} rows with {columns:?} columns, expected {states} rows of {symbols} columns")]
    TableShape {
        rows: usize,
        columns: Option<usize>,
        states: usize,
        symbols: usize,
    },
}
