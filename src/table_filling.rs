use bit_set::BitSet;
use itertools::Itertools;
use tracing::{debug, trace};

use crate::{math::Partition, prelude::*};

/// Position of the unordered pair `{p, q}` with `p != q` in the lower triangle of the table.
fn pair_index(p: StateIndex, q: StateIndex) -> usize {
    let (hi, lo) = if p > q { (p, q) } else { (q, p) };
    hi * (hi - 1) / 2 + lo
}

/// Records for every unordered pair of states of a [`DFA`] whether the two states are
/// distinguishable, meaning there is a word that leads to acceptance from one of them and to
/// rejection from the other. Only pairs `p > q` are stored, the relation is symmetric and no
/// state is distinguishable from itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistinguishabilityTable {
    size: usize,
    marked: BitSet,
    passes: usize,
}

impl DistinguishabilityTable {
    /// Fills the table for `dfa` using the Myhill-Nerode table filling algorithm.
    ///
    /// Initially, exactly the pairs consisting of an accepting and a rejecting state are
    /// marked. Then full passes over all unmarked pairs are made until a pass marks nothing.
    /// In such a pass, a pair `{p, q}` is marked if for some symbol exactly one of `p` and `q`
    /// has a transition, or both have one and the targets form a marked pair. Marks are never
    /// removed, so at most quadratically many passes are needed.
    pub fn fill(dfa: &DFA) -> Self {
        let size = dfa.size();
        let mut table = Self {
            size,
            marked: BitSet::with_capacity(size * size.saturating_sub(1) / 2),
            passes: 0,
        };

        for p in 0..size {
            for q in 0..p {
                if dfa.is_accepting(p) != dfa.is_accepting(q) {
                    table.mark(p, q);
                }
            }
        }
        trace!("seeded table with {} distinguishable pairs", table.marked.len());

        loop {
            table.passes += 1;
            let mut changed = 0usize;
            for p in 0..size {
                for q in 0..p {
                    if table.are_distinguishable(p, q) {
                        continue;
                    }
                    let split = (0..dfa.symbols()).any(|a| {
                        match (dfa.transition(p, a), dfa.transition(q, a)) {
                            (Some(p_next), Some(q_next)) => {
                                table.are_distinguishable(p_next, q_next)
                            }
                            (None, None) => false,
                            _ => true,
                        }
                    });
                    if split {
                        table.mark(p, q);
                        changed += 1;
                    }
                }
            }
            trace!("pass {} marked {changed} additional pairs", table.passes);
            if changed == 0 {
                break;
            }
        }

        debug!(
            "table filling over {size} states converged after {} passes with {} distinguishable pairs",
            table.passes,
            table.marked.len()
        );
        table
    }

    fn mark(&mut self, p: StateIndex, q: StateIndex) {
        debug_assert_ne!(p, q, "a state is never distinguishable from itself");
        self.marked.insert(pair_index(p, q));
    }

    /// Returns true if `p` and `q` are distinguishable. This is always false for `p == q`.
    pub fn are_distinguishable(&self, p: StateIndex, q: StateIndex) -> bool {
        p != q && self.marked.contains(pair_index(p, q))
    }

    /// Gives the number of states the table was computed for.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Gives the number of passes it took until no more pairs were marked, including the
    /// final pass that changed nothing.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Returns an iterator over all distinguishable pairs `(p, q)` with `p > q`.
    pub fn distinguishable_pairs(&self) -> impl Iterator<Item = (StateIndex, StateIndex)> + '_ {
        (0..self.size)
            .flat_map(|p| (0..p).map(move |q| (p, q)))
            .filter(|(p, q)| self.are_distinguishable(*p, *q))
    }

    /// Assigns each state the id of its equivalence class. States are processed in increasing
    /// order, and a state that has not been assigned a class yet opens a fresh class, which
    /// also receives every later state that is not distinguishable from it.
    pub fn representatives(&self) -> Representatives {
        let mut class_of: Vec<Option<usize>> = vec![None; self.size];
        let mut classes = 0;
        for p in 0..self.size {
            if class_of[p].is_some() {
                continue;
            }
            class_of[p] = Some(classes);
            for q in (p + 1)..self.size {
                if class_of[q].is_none() && !self.are_distinguishable(p, q) {
                    class_of[q] = Some(classes);
                }
            }
            classes += 1;
        }
        Representatives::new(
            class_of
                .into_iter()
                .map(|c| c.expect("every state is assigned a class"))
                .collect(),
        )
    }
}

/// Maps every state to the id of its equivalence class. Two states share an id if and only if
/// they are not distinguishable. Class ids are contiguous and ordered by their smallest member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Representatives {
    class_of: Vec<usize>,
    representatives: Vec<StateIndex>,
}

impl Representatives {
    /// Creates the map from the class id of every state.
    ///
    /// # Panics
    /// Panics if the class ids are not contiguous or not ordered by their smallest member,
    /// i.e. if state `q` is in a class `c` that is larger than every class used by the states
    /// before `q` plus one.
    pub fn new(class_of: Vec<usize>) -> Self {
        let mut representatives = Vec::new();
        for (q, class) in class_of.iter().enumerate() {
            assert!(
                *class <= representatives.len(),
                "class {class} of state {q} skips a class id"
            );
            if *class == representatives.len() {
                representatives.push(q);
            }
        }
        Self {
            class_of,
            representatives,
        }
    }

    /// Returns the class id of `state`.
    ///
    /// # Panics
    /// Panics if `state` is not covered by the map.
    pub fn class_of(&self, state: StateIndex) -> usize {
        self.class_of[state]
    }

    /// Returns the smallest state in the class of `state`.
    pub fn representative_of(&self, state: StateIndex) -> StateIndex {
        self.representatives[self.class_of(state)]
    }

    /// Gives the number of states covered by the map.
    pub fn len(&self) -> usize {
        self.class_of.len()
    }

    /// Returns true if no state is covered by the map.
    pub fn is_empty(&self) -> bool {
        self.class_of.is_empty()
    }

    /// Gives the number of classes.
    pub fn classes(&self) -> usize {
        self.representatives.len()
    }

    /// Groups the states into their classes.
    pub fn partition(&self) -> Partition {
        let mut classes = vec![Vec::new(); self.classes()];
        for (q, class) in self.class_of.iter().enumerate() {
            classes[*class].push(q);
        }
        Partition::new(classes)
    }
}

impl DFA {
    /// Computes the [`DistinguishabilityTable`] of `self`.
    pub fn distinguishability_table(&self) -> DistinguishabilityTable {
        DistinguishabilityTable::fill(self)
    }

    /// Builds the quotient of `self` with respect to the given class assignment. Each class
    /// becomes one state, ordered by class id. A class is initial if it contains the initial
    /// state, and accepting if its members are. The transition of a class on some symbol
    /// leads to the class of the targets of its members.
    ///
    /// # Panics
    /// Panics if `representatives` does not cover every state, or if two members of a class
    /// disagree on acceptance or on the class that some symbol leads to. Neither can happen
    /// for the classes computed by [`DistinguishabilityTable::representatives`].
    pub fn quotient(&self, representatives: &Representatives) -> DFA {
        assert_eq!(
            representatives.len(),
            self.size(),
            "representative map must cover every state"
        );

        let mut rows: Vec<Option<(bool, Vec<Option<usize>>)>> =
            vec![None; representatives.classes()];
        for q in self.state_indices() {
            let class = representatives.class_of(q);
            let row = (
                self.is_accepting(q),
                (0..self.symbols())
                    .map(|a| self.transition(q, a).map(|p| representatives.class_of(p)))
                    .collect_vec(),
            );
            if let Some(existing) = &rows[class] {
                assert_eq!(
                    existing,
                    &row,
                    "states {} and {q} are merged but behave differently",
                    representatives.representative_of(q)
                );
            } else {
                rows[class] = Some(row);
            }
        }

        let mut quotient = DFA::new(
            representatives.classes(),
            self.symbols(),
            representatives.class_of(self.initial()),
        )
        .expect("quotient has a state for the class of the initial state");
        for (class, row) in rows.into_iter().enumerate() {
            let (accepting, targets) = row.expect("every class has a member");
            quotient.set_accepting(class, accepting);
            for (a, target) in targets.into_iter().enumerate() {
                if let Some(p) = target {
                    quotient.add_transition(class, p, a);
                }
            }
        }
        quotient
    }

    /// Merges all states that are not distinguishable, returning the quotient together with
    /// the class assignment that was used.
    pub fn merge_equivalent(&self) -> (DFA, Representatives) {
        let representatives = self.distinguishability_table().representatives();
        let quotient = self.quotient(&representatives);
        debug!(
            "merging equivalent states reduced {} states to {}",
            self.size(),
            quotient.size()
        );
        (quotient, representatives)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::{pair_index, Representatives};
    use crate::{math::Partition, prelude::*};

    #[test]
    fn pair_indices_are_dense() {
        let indices = (0..6)
            .flat_map(|p| (0..p).map(move |q| pair_index(p, q)))
            .collect_vec();
        assert_eq!(indices, (0..15).collect_vec());
        assert_eq!(pair_index(2, 4), pair_index(4, 2));
    }

    #[test_log::test]
    fn siblings_are_merged() {
        // 1 and 2 are rejecting and both lead back to 0 on every symbol
        let dfa = DFA::builder()
            .with_accepting([0])
            .with_transitions([(0, 0, 1), (0, 1, 2), (1, 0, 0), (1, 1, 0), (2, 0, 0), (2, 1, 0)])
            .into_dfa(0);
        let table = dfa.distinguishability_table();
        assert!(!table.are_distinguishable(1, 2));
        assert!(!table.are_distinguishable(2, 1));
        assert!(table.are_distinguishable(0, 1));
        assert!(!table.are_distinguishable(1, 1));
        assert_eq!(table.distinguishable_pairs().collect_vec(), vec![(1, 0), (2, 0)]);

        let representatives = table.representatives();
        assert_eq!(representatives.classes(), 2);
        assert_eq!(representatives.representative_of(2), 1);
        assert_eq!(representatives.partition(), Partition::new([vec![0], vec![1, 2]]));

        let (quotient, _) = dfa.merge_equivalent();
        assert_eq!(quotient.size(), dfa.size() - 1);
        assert_eq!(
            quotient.transitions().collect_vec(),
            vec![(0, 0, 1), (0, 1, 1), (1, 0, 0), (1, 1, 0)]
        );
    }

    #[test_log::test]
    fn distinction_propagates_backwards() {
        // 0 -> 1 -> 2 -> 3 with only 3 accepting, every state needs its own class
        let dfa = DFA::builder()
            .with_accepting([3])
            .with_transitions([(0, 0, 1), (1, 0, 2), (2, 0, 3), (3, 0, 3)])
            .into_dfa(0);
        let table = dfa.distinguishability_table();
        assert_eq!(table.distinguishable_pairs().count(), 6);
        assert!(table.passes() >= 3);
        assert_eq!(dfa.merge_equivalent().0, dfa);
    }

    #[test]
    fn missing_transition_distinguishes() {
        // 1 and 2 are both accepting, but only 1 can continue
        let dfa = DFA::builder()
            .with_accepting([1, 2])
            .with_transitions([(0, 0, 1), (0, 1, 2), (1, 0, 1)])
            .into_dfa(0);
        let table = dfa.distinguishability_table();
        assert!(table.are_distinguishable(1, 2));
        assert_eq!(dfa.merge_equivalent().0.size(), 3);
    }

    #[test]
    fn quotient_marks_class_of_initial() {
        // 0 and 2 are equivalent, the initial state is 2
        let dfa = DFA::builder()
            .with_accepting([1])
            .with_transitions([(0, 0, 1), (2, 0, 1), (1, 0, 1)])
            .into_dfa(2);
        let (quotient, representatives) = dfa.merge_equivalent();
        assert_eq!(representatives.class_of(2), representatives.class_of(0));
        assert_eq!(quotient.size(), 2);
        assert_eq!(quotient.initial(), 0);
        assert!(quotient.accepts([0, 0]));
    }

    #[test]
    #[should_panic(expected = "behave differently")]
    fn quotient_rejects_incongruent_classes() {
        let dfa = DFA::builder()
            .with_accepting([1])
            .with_transitions([(0, 0, 1), (1, 0, 1), (2, 0, 0)])
            .into_dfa(0);
        dfa.quotient(&Representatives::new(vec![0, 1, 0]));
    }

    #[test]
    #[should_panic(expected = "skips a class id")]
    fn representatives_must_be_contiguous() {
        Representatives::new(vec![0, 2, 1]);
    }
}
