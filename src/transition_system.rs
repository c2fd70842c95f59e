use crate::{reachability::Reachability, StateIndex};

/// A transition system in the most reduced sense: a finite number of states indexed by
/// `0..size()` and for each of them an iterator over the states it has an edge to. Symbols
/// are irrelevant for the questions asked through this trait, so they are not exposed.
///
/// This is implemented by [`crate::DFA`] as well as by [`crate::reversed::Reversed`], which
/// allows running the same traversal forwards and backwards.
pub trait TransitionSystem {
    /// The type of iterator over the successors of a state.
    type SuccessorsIter<'this>: Iterator<Item = StateIndex>
    where
        Self: 'this;

    /// Returns the number of states.
    fn size(&self) -> usize;

    /// Returns an iterator over the targets of all edges leaving `state`. A target may be
    /// emitted more than once if multiple edges lead to it. Returns `None` if the state does
    /// not exist.
    fn successors(&self, state: StateIndex) -> Option<Self::SuccessorsIter<'_>>;

    /// Returns true if and only if `state` is a valid index.
    fn contains_state(&self, state: StateIndex) -> bool {
        state < self.size()
    }

    /// Runs a depth-first traversal starting in `origin` and returns the resulting marks.
    /// See [`Reachability`].
    fn reachability_from(&self, origin: StateIndex) -> Reachability
    where
        Self: Sized,
    {
        Reachability::compute(self, origin)
    }
}

impl<Ts: TransitionSystem> TransitionSystem for &Ts {
    type SuccessorsIter<'this> = Ts::SuccessorsIter<'this> where Self: 'this;

    fn size(&self) -> usize {
        Ts::size(self)
    }

    fn successors(&self, state: StateIndex) -> Option<Self::SuccessorsIter<'_>> {
        Ts::successors(self, state)
    }
}
