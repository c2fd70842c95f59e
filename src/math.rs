use std::collections::{BTreeMap, BTreeSet};

use crate::StateIndex;

/// Type alias for maps, we use this to hide which type of `HashMap` we are actually using.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;

/// Type alias for sets whose iteration order is the order of the elements.
pub type OrderedSet<S> = BTreeSet<S>;
/// Type alias for maps whose iteration order is the order of the keys.
pub type OrderedMap<K, V> = BTreeMap<K, V>;

/// A partition is a different view on an equivalence relation over states, by grouping the
/// states into their respective classes. Class `i` is the `i`-th set in the partition.
#[derive(Debug, Clone)]
pub struct Partition(Vec<OrderedSet<StateIndex>>);

impl std::ops::Deref for Partition {
    type Target = Vec<OrderedSet<StateIndex>>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Partition {
    type Item = &'a OrderedSet<StateIndex>;
    type IntoIter = std::slice::Iter<'a, OrderedSet<StateIndex>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Two partitions are equal if they consist of the same classes, the order in which the
/// classes are listed does not matter.
impl PartialEq for Partition {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|o| other.contains(o))
    }
}
impl Eq for Partition {}

impl Partition {
    /// Returns the size of the partition, i.e. the number of classes.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Builds a new partition from an iterator that yields iterators over the states
    /// of each class.
    pub fn new<X: IntoIterator<Item = StateIndex>, Y: IntoIterator<Item = X>>(iter: Y) -> Self {
        Self(
            iter.into_iter()
                .map(|it| it.into_iter().collect::<OrderedSet<_>>())
                .collect(),
        )
    }

    /// Returns the position of the class containing `state`, if there is one.
    pub fn class_of(&self, state: StateIndex) -> Option<usize> {
        self.0.iter().position(|class| class.contains(&state))
    }
}

impl From<Vec<OrderedSet<StateIndex>>> for Partition {
    fn from(value: Vec<OrderedSet<StateIndex>>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::Partition;

    #[test]
    fn partition_equality_ignores_class_order() {
        let left = Partition::new([vec![0, 2], vec![1]]);
        let right = Partition::new([vec![1], vec![2, 0]]);
        assert_eq!(left, right);
        assert_eq!(left.size(), 2);
        assert_eq!(left.class_of(2), Some(0));
        assert_eq!(right.class_of(2), Some(1));
        assert_eq!(left.class_of(7), None);
        assert_ne!(left, Partition::new([vec![0], vec![1], vec![2]]));
    }
}
