use tracing::debug;

use crate::prelude::*;

/// The result of restricting a [`DFA`] to a subset of its states, see [`DFA::restrict`]. Next
/// to the compacted automaton, it remembers where each original state ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restriction {
    dfa: DFA,
    mapping: Vec<Option<StateIndex>>,
}

impl Restriction {
    /// Gives a reference to the compacted automaton.
    pub fn dfa(&self) -> &DFA {
        &self.dfa
    }

    /// Consumes `self` and returns the compacted automaton.
    pub fn into_dfa(self) -> DFA {
        self.dfa
    }

    /// Returns the index that the original state `old` has in the compacted automaton, or
    /// `None` if it was removed.
    pub fn new_index(&self, old: StateIndex) -> Option<StateIndex> {
        self.mapping.get(old).copied().flatten()
    }

    /// Returns an iterator over the original indices of all removed states.
    pub fn removed(&self) -> impl Iterator<Item = StateIndex> + '_ {
        self.mapping
            .iter()
            .enumerate()
            .filter_map(|(q, new)| new.is_none().then_some(q))
    }

    /// Gives the number of removed states.
    pub fn removed_count(&self) -> usize {
        self.mapping.iter().filter(|new| new.is_none()).count()
    }
}

impl DFA {
    /// Builds a new automaton consisting only of the states for which `keep` returns true.
    /// The kept states are renumbered contiguously while preserving their relative order, so
    /// the `k`-th kept state becomes state `k`. A transition survives if and only if both its
    /// source and its target are kept. The initial state and the accepting states are
    /// renumbered accordingly.
    ///
    /// # Panics
    /// Panics if `keep` does not hold for the initial state, as the initial state can never
    /// be removed.
    pub fn restrict<F>(&self, keep: F) -> Restriction
    where
        F: Fn(StateIndex) -> bool,
    {
        assert!(
            keep(self.initial()),
            "restriction must keep the initial state {}",
            self.initial()
        );

        let mut mapping = vec![None; self.size()];
        let mut kept = 0;
        for q in self.state_indices() {
            if keep(q) {
                mapping[q] = Some(kept);
                kept += 1;
            }
        }

        let initial = mapping[self.initial()].expect("initial state is kept");
        let mut dfa = DFA::new(kept, self.symbols(), initial)
            .expect("initial state is among the kept states");
        for (q, new) in mapping.iter().enumerate() {
            if let Some(new) = new {
                dfa.set_accepting(*new, self.is_accepting(q));
            }
        }
        for (q, a, p) in self.transitions() {
            if let (Some(source), Some(target)) = (mapping[q], mapping[p]) {
                let added = dfa.add_transition(source, target, a);
                debug_assert!(added, "restriction produced a duplicate transition");
            }
        }

        debug!("restricted DFA from {} to {kept} states", self.size());
        Restriction { dfa, mapping }
    }

    /// Removes all states that are not reachable from the initial state.
    pub fn trim_unreachable(&self) -> Restriction {
        let reach = self.reachability_from(self.initial());
        self.restrict(|q| reach.is_reachable(q))
    }

    /// Removes all states from which no accepting state can be reached. The initial state is
    /// kept even if it is useless, in which case the accepted language is empty and the
    /// remaining automaton has no accepting state.
    pub fn trim_useless(&self) -> Restriction {
        let useful = self.useful_states();
        let initial = self.initial();
        self.restrict(|q| q == initial || useful.contains(q))
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use crate::prelude::*;

    #[test]
    fn restriction_renumbers_and_drops_edges() {
        let dfa = DFA::builder()
            .with_accepting([1, 3])
            .with_transitions([(0, 0, 1), (0, 1, 2), (1, 0, 3), (2, 0, 3), (3, 1, 0)])
            .into_dfa(0);
        let restriction = dfa.restrict(|q| q != 2);
        let small = restriction.dfa();

        assert_eq!(small.size(), 3);
        assert_eq!(small.initial(), 0);
        assert_eq!(small.accepting_states().collect_vec(), vec![1, 2]);
        assert_eq!(
            small.transitions().collect_vec(),
            vec![(0, 0, 1), (1, 0, 2), (2, 1, 0)]
        );
        assert_eq!(restriction.new_index(3), Some(2));
        assert_eq!(restriction.new_index(2), None);
        assert_eq!(restriction.removed().collect_vec(), vec![2]);
        assert_eq!(restriction.removed_count(), 1);
    }

    #[test]
    fn initial_state_is_renumbered() {
        let dfa = DFA::builder()
            .with_accepting([2])
            .with_transitions([(0, 0, 2), (2, 0, 1), (1, 0, 2)])
            .into_dfa(2);
        let trimmed = dfa.trim_unreachable().into_dfa();
        assert_eq!(trimmed.size(), 2);
        assert_eq!(trimmed.initial(), 1);
        assert!(trimmed.is_accepting(1));
        assert!(trimmed.accepts([0, 0]));
    }

    #[test]
    #[should_panic(expected = "must keep the initial state")]
    fn restriction_never_drops_initial() {
        let dfa = DFA::builder().with_transitions([(0, 0, 1)]).into_dfa(0);
        dfa.restrict(|q| q != 0);
    }

    #[test]
    fn unreachable_trimming_is_idempotent() {
        let dfa = DFA::builder()
            .with_accepting([2])
            .with_transitions([(0, 0, 1), (1, 0, 2), (2, 0, 2), (3, 0, 1), (4, 0, 3)])
            .into_dfa(0);
        let once = dfa.trim_unreachable();
        assert_eq!(once.removed().collect_vec(), vec![3, 4]);
        let twice = once.dfa().trim_unreachable();
        assert_eq!(twice.removed_count(), 0);
        assert_eq!(once.dfa(), twice.dfa());
    }

    #[test]
    fn useless_trimming_keeps_useless_initial() {
        let dfa = DFA::builder()
            .with_transitions([(0, 0, 1), (1, 0, 0)])
            .into_dfa(0);
        let trimmed = dfa.trim_useless().into_dfa();
        assert_eq!(trimmed.size(), 1);
        assert_eq!(trimmed.initial(), 0);
        assert_eq!(trimmed.transitions().count(), 0);
        assert!(!trimmed.accepts([]));
    }
}
