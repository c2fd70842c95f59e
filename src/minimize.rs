use std::fmt::Display;

use tracing::debug;

use crate::prelude::*;

/// Configures which stages of the minimization are run. By default all of them are enabled,
/// which yields the unique minimal automaton for the language of the input. Disabling a stage
/// still yields an automaton for the same language, it may just not be minimal.
///
/// # Example
/// ```
/// use minimal_dfa::prelude::*;
///
/// let dfa = DFA::builder()
///     .with_accepting([1])
///     .with_transitions([(0, 0, 1), (1, 0, 1), (2, 0, 1)])
///     .into_dfa(0);
/// let minimized = Minimizer::default().remove_unreachable(false).run(&dfa);
/// // state 2 is kept, but merged with state 0
/// assert_eq!(minimized.dfa().size(), 2);
/// assert_eq!(minimized.report().merged, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Minimizer {
    remove_unreachable: bool,
    remove_useless: bool,
    merge_equivalent: bool,
}

impl Default for Minimizer {
    fn default() -> Self {
        Self {
            remove_unreachable: true,
            remove_useless: true,
            merge_equivalent: true,
        }
    }
}

/// Summarizes what the individual stages of a [`Minimizer`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MinimizationReport {
    /// Number of states of the input.
    pub original: usize,
    /// Number of states that were removed because they are not reachable.
    pub unreachable: usize,
    /// Number of states that were removed because they can not reach an accepting state.
    pub useless: usize,
    /// Number of states that disappeared by merging equivalent states.
    pub merged: usize,
    /// Number of passes the table filling needed, zero if it did not run.
    pub passes: usize,
    /// Number of states of the result.
    pub minimized: usize,
}

impl Display for MinimizationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} states ({} unreachable, {} useless, {} merged in {} passes)",
            self.original, self.minimized, self.unreachable, self.useless, self.merged, self.passes
        )
    }
}

/// The outcome of running a [`Minimizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minimized {
    dfa: DFA,
    report: MinimizationReport,
}

impl Minimized {
    /// Gives a reference to the resulting automaton.
    pub fn dfa(&self) -> &DFA {
        &self.dfa
    }

    /// Gives the report on what was done.
    pub fn report(&self) -> &MinimizationReport {
        &self.report
    }

    /// Consumes `self` and returns the resulting automaton.
    pub fn into_dfa(self) -> DFA {
        self.dfa
    }
}

impl Minimizer {
    /// Enables or disables the removal of unreachable states.
    pub fn remove_unreachable(mut self, enabled: bool) -> Self {
        self.remove_unreachable = enabled;
        self
    }

    /// Enables or disables the removal of states that can not reach an accepting state.
    pub fn remove_useless(mut self, enabled: bool) -> Self {
        self.remove_useless = enabled;
        self
    }

    /// Enables or disables merging of equivalent states.
    pub fn merge_equivalent(mut self, enabled: bool) -> Self {
        self.merge_equivalent = enabled;
        self
    }

    /// Runs the enabled stages on `dfa`, in the order unreachable states, useless states,
    /// equivalent states. Each stage works on the output of the previous one, which is dropped
    /// as soon as the stage is done.
    pub fn run(&self, dfa: &DFA) -> Minimized {
        let mut report = MinimizationReport {
            original: dfa.size(),
            ..Default::default()
        };
        let mut current = dfa.clone();

        if self.remove_unreachable {
            let restriction = current.trim_unreachable();
            report.unreachable = restriction.removed_count();
            debug!(
                "removed {} unreachable states {:?}",
                report.unreachable,
                restriction.removed().collect::<Vec<_>>()
            );
            current = restriction.into_dfa();
        }

        if self.remove_useless {
            let restriction = current.trim_useless();
            report.useless = restriction.removed_count();
            debug!(
                "removed {} useless states {:?}",
                report.useless,
                restriction.removed().collect::<Vec<_>>()
            );
            current = restriction.into_dfa();
        }

        if self.merge_equivalent {
            let table = current.distinguishability_table();
            report.passes = table.passes();
            let representatives = table.representatives();
            let quotient = current.quotient(&representatives);
            report.merged = current.size() - quotient.size();
            debug!("merged {} states into {} classes", current.size(), quotient.size());
            current = quotient;
        }

        debug_assert!(current.is_deterministic());
        report.minimized = current.size();
        debug!("minimization finished: {report}");
        Minimized {
            dfa: current,
            report,
        }
    }
}

impl DFA {
    /// Computes the minimal automaton that accepts the same language as `self`, by removing
    /// unreachable and useless states and merging equivalent ones. See [`Minimizer`] for
    /// running only some of these stages.
    pub fn minimize(&self) -> DFA {
        Minimizer::default().run(self).into_dfa()
    }
}

/// Minimizes the automaton described by `parts` and returns the description of the result.
/// Fails if `parts` does not describe a valid automaton, in which case nothing is computed.
pub fn minimize_parts(parts: DfaParts) -> Result<DfaParts, MinimizationError> {
    let dfa = DFA::from_parts(parts)?;
    Ok(dfa.minimize().to_parts())
}
