use itertools::Itertools;
use tracing::{trace, warn};

use super::FormatError;
use crate::prelude::*;

/// Pulls whitespace separated integers out of the input.
struct Tokens<'a> {
    it: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            it: input.split_whitespace(),
        }
    }

    fn next_int(&mut self, expected: &'static str) -> Result<i64, FormatError> {
        let token = self.it.next().ok_or(FormatError::UnexpectedEnd(expected))?;
        token.parse().map_err(|_| FormatError::InvalidToken {
            expected,
            found: token.to_string(),
        })
    }

    fn next_count(&mut self, expected: &'static str) -> Result<usize, FormatError> {
        let value = self.next_int(expected)?;
        usize::try_from(value).map_err(|_| FormatError::InvalidToken {
            expected,
            found: value.to_string(),
        })
    }
}

/// Parses an automaton in the plain text format. The input consists of whitespace separated
/// integers, line breaks carry no meaning:
/// - the number of states `n`, the number of symbols `s` and the initial state,
/// - `n` flags, where the `i`-th is `1` if state `i` is accepting and `0` otherwise,
/// - `n` rows of `s` entries each, where entry `j` of row `i` is the target of the transition
///   from state `i` on symbol `j`, or `-1` if there is no such transition.
///
/// # Example
/// ```
/// use minimal_dfa::formats::parse_text;
///
/// let dfa = parse_text("2 2 0\n0 1\n1 -1\n1 0\n").unwrap();
/// assert!(dfa.accepts([0, 1, 0]));
/// assert!(!dfa.accepts([1]));
/// ```
pub fn parse_text(input: &str) -> Result<DFA, FormatError> {
    let mut tokens = Tokens::new(input);
    let states = tokens.next_count("number of states")?;
    let symbols = tokens.next_count("number of symbols")?;
    let initial = tokens.next_int("initial state")?;
    trace!("parsing text automaton with {states} states over {symbols} symbols");

    let accepting = (0..states)
        .map(|_| match tokens.next_int("acceptance flag")? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(FormatError::InvalidToken {
                expected: "acceptance flag",
                found: other.to_string(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let table = (0..states)
        .map(|_| {
            (0..symbols)
                .map(|_| tokens.next_int("transition target"))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    if tokens.it.next().is_some() {
        warn!("ignoring trailing input after the transition table");
    }

    Ok(DFA::from_table(symbols, initial, &accepting, &table)?)
}

/// Renders `dfa` in the plain text format, see [`parse_text`].
pub fn to_text(dfa: &DFA) -> String {
    let mut out = format!("{} {} {}\n", dfa.size(), dfa.symbols(), dfa.initial());
    out.push_str(
        &dfa.state_indices()
            .map(|q| if dfa.is_accepting(q) { "1" } else { "0" })
            .join(" "),
    );
    out.push('\n');
    for row in dfa.to_table() {
        out.push_str(&row.iter().join(" "));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{parse_text, to_text};
    use crate::prelude::*;

    #[test_log::test]
    fn parse_and_print() {
        let input = "3 2 0\n0 0 1\n1 2\n-1 2\n2 2\n";
        let dfa = parse_text(input).unwrap();
        assert_eq!(dfa.size(), 3);
        assert_eq!(dfa.symbols(), 2);
        assert_eq!(dfa.transition(1, 0), None);
        assert_eq!(dfa.transition(1, 1), Some(2));
        assert!(dfa.accepts([1]));
        assert_eq!(to_text(&dfa), input);
    }

    #[test]
    fn layout_is_free() {
        let dfa = parse_text("  2 1 1 1 0 1 -1 trailing").unwrap();
        assert_eq!(dfa.initial(), 1);
        assert!(dfa.is_accepting(0));
        assert_eq!(dfa.transition(0, 0), Some(1));
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        assert!(matches!(
            parse_text("2 1"),
            Err(FormatError::UnexpectedEnd("initial state"))
        ));
        assert!(matches!(
            parse_text("2 1 0 0 x"),
            Err(FormatError::InvalidToken { found, .. }) if found == "x"
        ));
        assert!(matches!(
            parse_text("2 1 0 0 2 1 1"),
            Err(FormatError::InvalidToken { expected: "acceptance flag", .. })
        ));
        assert!(matches!(
            parse_text("-2 1 0"),
            Err(FormatError::InvalidToken { expected: "number of states", .. })
        ));
        assert!(matches!(
            parse_text("2 1 0 0 1 1"),
            Err(FormatError::UnexpectedEnd("transition target"))
        ));
        assert!(matches!(
            parse_text("2 1 5 0 1 1 1"),
            Err(FormatError::Invalid(MinimizationError::InitialOutOfRange { initial: 5, .. }))
        ));
        assert!(matches!(
            parse_text("2 1 0 0 1 1 2"),
            Err(FormatError::Invalid(MinimizationError::TargetOutOfRange { state: 2, .. }))
        ));
    }
}
