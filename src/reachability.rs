use bit_set::BitSet;
use tracing::trace;

use crate::prelude::*;

/// The outcome of a depth-first traversal of a [`TransitionSystem`]. A state is marked as
/// visited when the traversal enters it and as finalized once all of its successors have been
/// explored. After the traversal has terminated, the finalized states are precisely those that
/// are reachable from the origin.
///
/// The marks live in this struct and not on the transition system, so every analysis starts
/// from a clean slate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reachability {
    origin: StateIndex,
    size: usize,
    visited: BitSet,
    finalized: BitSet,
}

impl Reachability {
    /// Runs the traversal on `ts` starting in `origin`. Symbols are ignored, a state is
    /// reachable if there is any path of edges leading to it.
    ///
    /// The traversal uses an explicit stack of partially consumed successor iterators, so
    /// large automata do not exhaust the call stack.
    ///
    /// # Panics
    /// Panics if `origin` is not a state of `ts`.
    pub fn compute<Ts: TransitionSystem>(ts: &Ts, origin: StateIndex) -> Self {
        let size = ts.size();
        let mut visited = BitSet::with_capacity(size);
        let mut finalized = BitSet::with_capacity(size);

        let start = ts
            .successors(origin)
            .expect("origin of the traversal must be a state");
        visited.insert(origin);
        let mut stack = vec![(origin, start)];

        while let Some((q, mut successors)) = stack.pop() {
            match successors.find(|p| !visited.contains(*p)) {
                Some(p) => {
                    visited.insert(p);
                    stack.push((q, successors));
                    match ts.successors(p) {
                        Some(next) => stack.push((p, next)),
                        None => {
                            trace!("edge from {q} leads to nonexistent state {p}");
                            finalized.insert(p);
                        }
                    }
                }
                None => {
                    finalized.insert(q);
                }
            }
        }

        trace!(
            "traversal from {origin} reached {} of {size} states",
            finalized.len()
        );
        Self {
            origin,
            size,
            visited,
            finalized,
        }
    }

    /// The state in which the traversal started.
    pub fn origin(&self) -> StateIndex {
        self.origin
    }

    /// Returns true if the traversal entered `state`.
    pub fn is_visited(&self, state: StateIndex) -> bool {
        self.visited.contains(state)
    }

    /// Returns true if the traversal has completely explored `state`.
    pub fn is_finalized(&self, state: StateIndex) -> bool {
        self.finalized.contains(state)
    }

    /// Returns true if `state` is reachable from the origin.
    pub fn is_reachable(&self, state: StateIndex) -> bool {
        self.is_finalized(state)
    }

    /// Returns an iterator over the reachable states, in increasing order.
    pub fn reachable(&self) -> impl Iterator<Item = StateIndex> + '_ {
        (0..self.size).filter(|q| self.finalized.contains(*q))
    }

    /// Returns an iterator over the states that are not reachable, in increasing order.
    pub fn unreachable(&self) -> impl Iterator<Item = StateIndex> + '_ {
        (0..self.size).filter(|q| !self.finalized.contains(*q))
    }

    /// Gives the number of reachable states.
    pub fn count(&self) -> usize {
        // the size hint of `bit_set::Iter` is not reliable, so never count through it
        (0..self.size)
            .filter(|q| self.finalized.contains(*q))
            .count()
    }

    /// Returns true if every state is reachable.
    pub fn is_total(&self) -> bool {
        self.count() == self.size
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use crate::prelude::*;

    #[test]
    fn reachable_states() {
        let dfa = DFA::builder()
            .with_accepting([2])
            .with_transitions([
                (0, 0, 1),
                (0, 1, 0),
                (1, 0, 2),
                (1, 1, 0),
                (2, 0, 2),
                (2, 1, 2),
                (3, 0, 1),
                (4, 1, 4),
            ])
            .into_dfa(0);

        let reach = dfa.reachability_from(0);
        assert_eq!(reach.reachable().collect_vec(), vec![0, 1, 2]);
        assert_eq!(reach.unreachable().collect_vec(), vec![3, 4]);
        assert!(reach.is_visited(2) && reach.is_finalized(2));
        assert!(!reach.is_visited(3));
        assert_eq!(reach.count(), 3);
        assert!(!reach.is_total());

        let from_three = dfa.reachability_from(3);
        assert_eq!(from_three.reachable().collect_vec(), vec![0, 1, 2, 3]);
        assert_eq!(dfa.reachability_from(2).reachable().collect_vec(), vec![2]);
    }

    #[test]
    fn origin_is_reachable_without_edges() {
        let dfa = DFA::builder()
            .with_states(3)
            .with_symbols(1)
            .with_accepting([0])
            .with_transitions([(1, 0, 0), (2, 0, 0)])
            .into_dfa(0);
        let reach = dfa.reachability_from(dfa.initial());
        assert_eq!(reach.reachable().collect_vec(), vec![0]);
        assert_eq!(reach.origin(), 0);
    }

    #[test]
    fn count_spans_several_blocks() {
        // 0 -> 1 -> ... -> 69 reachable, 70..100 only lead into the chain
        let dfa = DFA::builder()
            .with_transitions((0..69).map(|q| (q, 0, q + 1)))
            .with_transitions((70..100).map(|q| (q, 0, 0)))
            .into_dfa(0);
        let reach = dfa.reachability_from(0);
        assert_eq!(reach.count(), 70);
        assert_eq!(reach.reachable().count(), 70);
        assert_eq!(reach.unreachable().count(), 30);
        assert!(!reach.is_total());
        assert!(!dfa.reachability_from(70).is_total());
        assert_eq!(dfa.reachability_from(70).count(), 71);
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let n = 200_000;
        let dfa = DFA::builder()
            .with_transitions((0..n - 1).map(|q| (q, 0, q + 1)))
            .into_dfa(0);
        assert!(dfa.reachability_from(0).is_total());
    }
}
