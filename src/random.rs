use tracing::trace;

use crate::prelude::*;

/// Generates a random [`DFA`] with `size` states over `symbols` symbols, using the given
/// random number generator. The algorithm is as follows:
/// 1. Start with `size` states, each of which is accepting with probability one half.
/// 2. For each state and each symbol, with probability `density` draw a target state
///    uniformly and add the corresponding transition.
///
/// State 0 is initial. Depending on the drawn transitions, there may be unreachable and useless
/// states, which makes the result a good input for minimization.
///
/// # Panics
/// Panics if `size` is zero.
pub fn generate_random_dfa_with(
    rng: &mut fastrand::Rng,
    size: usize,
    symbols: usize,
    density: f64,
) -> DFA {
    assert!(size > 0, "a DFA needs at least one state");
    let mut dfa = DFA::new(size, symbols, 0).expect("state 0 exists");
    for q in 0..size {
        dfa.set_accepting(q, rng.bool());
        for a in 0..symbols {
            if rng.f64() < density {
                let target = rng.usize(..size);
                dfa.add_transition(q, target, a);
            }
        }
    }
    trace!(
        "generated random DFA with {size} states and {} transitions",
        dfa.transitions().count()
    );
    dfa
}

/// Works as [`generate_random_dfa_with`], but uses the thread local generator.
pub fn generate_random_dfa(size: usize, symbols: usize, density: f64) -> DFA {
    generate_random_dfa_with(&mut fastrand::Rng::new(), size, symbols, density)
}

/// Generate a random word over `symbols` symbols. The length of the word is drawn uniformly
/// from the range `min_len..=max_len`.
pub fn generate_random_word_with(
    rng: &mut fastrand::Rng,
    symbols: usize,
    min_len: usize,
    max_len: usize,
) -> Vec<Symbol> {
    assert!(min_len <= max_len);
    if symbols == 0 {
        return vec![];
    }
    let length = rng.usize(min_len..=max_len);
    (0..length).map(|_| rng.usize(..symbols)).collect()
}

/// Generate `number` random words over `symbols` symbols, with lengths drawn uniformly from
/// the range `min_len..=max_len`. The words need not be distinct.
pub fn generate_random_words_with(
    rng: &mut fastrand::Rng,
    symbols: usize,
    min_len: usize,
    max_len: usize,
    number: usize,
) -> Vec<Vec<Symbol>> {
    (0..number)
        .map(|_| generate_random_word_with(rng, symbols, min_len, max_len))
        .collect()
}

/// Works as [`generate_random_words_with`], but uses the thread local generator.
pub fn generate_random_words(
    symbols: usize,
    min_len: usize,
    max_len: usize,
    number: usize,
) -> Vec<Vec<Symbol>> {
    generate_random_words_with(&mut fastrand::Rng::new(), symbols, min_len, max_len, number)
}

#[cfg(test)]
mod tests {
    use super::{generate_random_dfa, generate_random_dfa_with, generate_random_words};

    #[test]
    fn random_dfa_sized() {
        let dfa = generate_random_dfa(10, 3, 0.5);
        assert_eq!(dfa.size(), 10);
        assert_eq!(dfa.symbols(), 3);
        assert_eq!(dfa.initial(), 0);
        assert!(dfa.is_deterministic());

        let complete = generate_random_dfa(5, 2, 1.0);
        assert!(complete.is_complete());
        let empty = generate_random_dfa(5, 2, 0.0);
        assert_eq!(empty.transitions().count(), 0);
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let first = generate_random_dfa_with(&mut fastrand::Rng::with_seed(3), 8, 2, 0.6);
        let second = generate_random_dfa_with(&mut fastrand::Rng::with_seed(3), 8, 2, 0.6);
        assert_eq!(first, second);
    }

    #[test]
    fn random_words() {
        let words = generate_random_words(2, 1, 10, 20);
        assert_eq!(words.len(), 20);
        assert!(words
            .iter()
            .all(|w| (1..=10).contains(&w.len()) && w.iter().all(|a| *a < 2)));
    }
}
