use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::prelude::*;

mod jflap;
pub use jflap::{parse_jflap, to_jflap, write_jflap};

mod text;
pub use text::{parse_text, to_text};

/// Abstracts the types of errors that can occur when reading or writing an automaton.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum FormatError {
    #[error("could not access automaton file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected end of input, expected {0}")]
    UnexpectedEnd(&'static str),
    #[error("expected {expected}, found `{found}`")]
    InvalidToken {
        expected: &'static str,
        found: String,
    },
    #[error("malformed JFLAP document: {0}")]
    MalformedJflap(String),
    #[error("alphabet of {0} symbols can not be written as single characters")]
    AlphabetTooLarge(usize),
    #[error("input does not describe a valid DFA: {0}")]
    Invalid(#[from] MinimizationError),
}

/// The formats in which automata can be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// The plain text format, see [`parse_text`].
    Text,
    /// The XML format of JFLAP, see [`parse_jflap`].
    Jflap,
}

impl Format {
    /// Determines the format from the extension of `path`: `.jff` (in any capitalization)
    /// means [`Format::Jflap`], everything else means [`Format::Text`].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jff") => Format::Jflap,
            _ => Format::Text,
        }
    }

    /// Parses an automaton in this format.
    pub fn parse(&self, input: &str) -> Result<DFA, FormatError> {
        match self {
            Format::Text => parse_text(input),
            Format::Jflap => parse_jflap(input),
        }
    }

    /// Renders `dfa` in this format.
    pub fn render(&self, dfa: &DFA) -> Result<String, FormatError> {
        match self {
            Format::Text => Ok(to_text(dfa)),
            Format::Jflap => to_jflap(dfa),
        }
    }
}

/// Reads an automaton from the file at `path`, whose format is determined by
/// [`Format::from_path`].
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<DFA, FormatError> {
    let format = Format::from_path(&path);
    debug!("reading {:?} as {format:?}", path.as_ref());
    let input = std::fs::read_to_string(path)?;
    format.parse(&input)
}

/// Writes `dfa` to the file at `path`, whose format is determined by [`Format::from_path`].
pub fn write_file<P: AsRef<Path>>(path: P, dfa: &DFA) -> Result<(), FormatError> {
    let format = Format::from_path(&path);
    debug!("writing {:?} as {format:?}", path.as_ref());
    std::fs::write(path, format.render(dfa)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{read_file, write_file, Format};
    use crate::prelude::*;

    #[test]
    fn format_is_detected_by_extension() {
        assert_eq!(Format::from_path("automaton.jff"), Format::Jflap);
        assert_eq!(Format::from_path("dir/AUTOMATON.JFF"), Format::Jflap);
        assert_eq!(Format::from_path("automaton.txt"), Format::Text);
        assert_eq!(Format::from_path("jff"), Format::Text);
        assert_eq!(Format::from_path("automaton"), Format::Text);
    }

    #[test]
    fn files_round_trip_in_both_formats() {
        let dfa = DFA::builder()
            .with_symbols(2)
            .with_accepting([1])
            .with_transitions([(0, 0, 1), (1, 1, 0), (1, 0, 1)])
            .into_dfa(0);
        let dir = std::env::temp_dir().join(format!("minimal-dfa-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        for name in ["automaton.txt", "automaton.jff"] {
            let path = dir.join(name);
            write_file(&path, &dfa).unwrap();
            assert_eq!(read_file(&path).unwrap(), dfa);
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            read_file("/nonexistent/automaton.txt"),
            Err(FormatError::Io(_))
        ));
    }
}
