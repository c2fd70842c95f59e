//! Library for minimizing deterministic finite automata in Rust.
//!
//! A [`DFA`] consists of a finite collection of states that are indexed by `0..n`, an alphabet of
//! symbols indexed by `0..s`, a designated initial state, a set of accepting states and a *partial*
//! transition function. A state may lack an outgoing transition for some symbol, in which case any
//! run that attempts to take it is rejecting.
//!
//! Minimization proceeds in three stages, each of which produces a fresh automaton:
//! 1. states that are not reachable from the initial state are removed (see [`reachability`]),
//! 2. states from which no accepting state can be reached are removed (see [`reversed`]),
//! 3. states that can not be distinguished by any word are merged (see [`table_filling`]).
//!
//! The stages only ever remove states through [`DFA::restrict`], which renumbers the surviving
//! states contiguously and drops every transition touching a removed state. The whole pipeline is
//! available through [`Minimizer`] and the shortcut [`DFA::minimize`].
//!
//! ```
//! use minimal_dfa::prelude::*;
//!
//! // accepts words of even length, states 2 and 3 are unreachable
//! let dfa = DFA::builder()
//!     .with_symbols(1)
//!     .with_accepting([0])
//!     .with_transitions([(0, 0, 1), (1, 0, 0), (2, 0, 0), (3, 0, 2)])
//!     .into_dfa(0);
//! let minimal = dfa.minimize();
//! assert_eq!(minimal.size(), 2);
//! assert!(minimal.accepts([0, 0]));
//! assert!(!minimal.accepts([0]));
//! ```
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use minimal_dfa::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        dfa::{DfaBuilder, DfaParts, DFA},
        error::MinimizationError,
        formats::{Format, FormatError},
        math,
        minimize::{minimize_parts, MinimizationReport, Minimized, Minimizer},
        reachability::Reachability,
        restrict::Restriction,
        reversed::Reversed,
        table_filling::{DistinguishabilityTable, Representatives},
        transition_system::TransitionSystem,
        StateIndex, Symbol,
    };
}

/// Type used for indexing states. States of an automaton with `n` states are always
/// indexed by `0..n`.
pub type StateIndex = usize;

/// Type used for the symbols of the alphabet. An automaton over `s` symbols uses `0..s`.
pub type Symbol = usize;

/// Sets, maps and partitions that are used throughout the crate.
pub mod math;

/// Errors that can arise when an automaton is assembled from its parts.
pub mod error;
pub use error::MinimizationError;

/// Abstraction over anything that has states and successors, this is the seam on which
/// the reachability analysis operates.
pub mod transition_system;
pub use transition_system::TransitionSystem;

/// The automaton model.
#[allow(clippy::upper_case_acronyms)]
pub mod dfa;
pub use dfa::DFA;

/// Depth-first reachability analysis.
pub mod reachability;

/// Reversal of an automaton, used to determine which states can reach acceptance.
pub mod reversed;

/// Compaction of an automaton to a subset of its states.
pub mod restrict;

/// Myhill-Nerode table filling and construction of the quotient automaton.
pub mod table_filling;

/// Puts the individual stages together.
pub mod minimize;
pub use minimize::Minimizer;

/// Reading and writing automata in the plain text and the JFLAP format.
pub mod formats;

/// Implements the generation of random automata and words. This is feature gated behind
/// the `random` feature.
#[cfg(feature = "random")]
pub mod random;

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    /// The classic example from the Wikipedia article on DFA minimization, with `a = 0` and
    /// `b = 1`. States 0 and 1 as well as 2, 3 and 4 are equivalent.
    pub fn wiki_dfa() -> DFA {
        DFA::builder()
            .with_symbols(2)
            .with_accepting([2, 3, 4])
            .with_transitions([
                (0, 0, 1),
                (0, 1, 2),
                (1, 0, 0),
                (1, 1, 3),
                (2, 0, 4),
                (2, 1, 5),
                (3, 0, 4),
                (3, 1, 5),
                (4, 0, 4),
                (4, 1, 5),
                (5, 0, 5),
                (5, 1, 5),
            ])
            .into_dfa(0)
    }

    #[test]
    fn wiki_dfa_minimizes_to_two_states() {
        // state 5 is a sink and therefore useless, what remains is {0, 1} and {2, 3, 4}
        let minimal = wiki_dfa().minimize();
        assert_eq!(minimal.size(), 2);
        assert!(!minimal.is_accepting(minimal.initial()));
        assert!(minimal.accepts([1]));
        assert!(minimal.accepts([0, 0, 0, 1, 0, 0]));
        assert!(!minimal.accepts([1, 1]));
    }
}
