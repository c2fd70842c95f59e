use bit_set::BitSet;
use tracing::trace;

use crate::prelude::*;

/// The reversal of a [`DFA`], extended by one synthetic state. For every transition from `u`
/// to `v` in the original automaton, there is an edge from `v` to `u` in the reversal.
/// Additionally, the synthetic state with index `n` (where `n` is the number of states of the
/// original automaton) has an edge to every accepting state. Consequently, a state is reachable
/// from the synthetic state in the reversal if and only if some accepting state is reachable
/// from it in the original automaton.
///
/// Symbols play no role for reachability, so edges of the reversal are not labelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reversed {
    predecessors: Vec<Vec<StateIndex>>,
}

impl Reversed {
    /// Builds the reversal of `dfa`.
    pub fn new(dfa: &DFA) -> Self {
        let mut predecessors = vec![Vec::new(); dfa.size() + 1];
        for (u, _, v) in dfa.transitions() {
            predecessors[v].push(u);
        }
        predecessors[dfa.size()].extend(dfa.accepting_states());
        Self { predecessors }
    }

    /// Returns the index of the synthetic state, which coincides with the number of states
    /// in the original automaton.
    pub fn sink(&self) -> StateIndex {
        self.predecessors.len() - 1
    }

    /// Returns the states of the original automaton from which an accepting state can be
    /// reached. Every accepting state is among them.
    pub fn useful_states(&self) -> BitSet {
        let sink = self.sink();
        let reach = self.reachability_from(sink);
        let useful: BitSet = reach.reachable().filter(|q| *q != sink).collect();
        trace!(
            "{} of {} states can reach an accepting state",
            useful.len(),
            sink
        );
        useful
    }
}

impl TransitionSystem for Reversed {
    type SuccessorsIter<'this> = std::iter::Copied<std::slice::Iter<'this, StateIndex>>;

    fn size(&self) -> usize {
        self.predecessors.len()
    }

    fn successors(&self, state: StateIndex) -> Option<Self::SuccessorsIter<'_>> {
        self.predecessors.get(state).map(|p| p.iter().copied())
    }
}

impl DFA {
    /// Builds the [`Reversed`] automaton of `self`.
    pub fn reversed(&self) -> Reversed {
        Reversed::new(self)
    }

    /// Returns the set of states from which some accepting state is reachable. All other
    /// states are useless, no word read from them is ever accepted.
    pub fn useful_states(&self) -> BitSet {
        self.reversed().useful_states()
    }
}
