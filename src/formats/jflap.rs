use std::f64::consts::PI;
use std::fmt::Write;

use tracing::trace;

use super::FormatError;
use crate::{
    math::{Map, OrderedMap, OrderedSet},
    prelude::*,
};

/// Characters used for writing symbols, symbol `a` is written as the `a`-th character. They
/// are listed in increasing order, so reading the result back keeps the relative order of the
/// symbols. Indices only survive if every symbol labels some transition, as the format has no
/// way of declaring symbols that are never read.
const SYMBOL_CHARS: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// An XML element, split into the raw attribute list of its opening tag and its body. The
/// body of a self-closing element is empty.
#[derive(Debug, Clone, Copy)]
struct Element<'a> {
    attributes: &'a str,
    body: &'a str,
}

/// Collects all elements with the given `tag` in `input`, in the order in which they appear.
/// Elements of the same tag must not be nested.
fn elements<'a>(input: &'a str, tag: &str) -> Result<Vec<Element<'a>>, FormatError> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut found = vec![];
    let mut rest = input;

    while let Some(start) = rest.find(&open) {
        let after = &rest[start + open.len()..];
        match after.chars().next() {
            Some(c) if c == '>' || c == '/' || c.is_whitespace() => {}
            _ => {
                // some other tag that merely starts with `tag`
                rest = after;
                continue;
            }
        }
        let head_end = after
            .find('>')
            .ok_or_else(|| FormatError::MalformedJflap(format!("unterminated <{tag}> tag")))?;
        let head = &after[..head_end];
        let content = &after[head_end + 1..];

        if let Some(attributes) = head.strip_suffix('/') {
            found.push(Element {
                attributes,
                body: "",
            });
            rest = content;
        } else {
            let body_end = content
                .find(&close)
                .ok_or_else(|| FormatError::MalformedJflap(format!("missing {close}")))?;
            found.push(Element {
                attributes: head,
                body: &content[..body_end],
            });
            rest = &content[body_end + close.len()..];
        }
    }
    Ok(found)
}

/// Extracts the value of the attribute `name` from a raw attribute list.
fn attribute<'a>(attributes: &'a str, name: &str) -> Option<&'a str> {
    let key = format!("{name}=");
    let mut offset = 0;
    while let Some(pos) = attributes[offset..].find(&key) {
        let start = offset + pos;
        offset = start + key.len();
        let preceded_by_space = attributes[..start]
            .chars()
            .next_back()
            .map_or(true, char::is_whitespace);
        if !preceded_by_space {
            continue;
        }
        let value = &attributes[offset..];
        let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let value = &value[1..];
        return value.find(quote).map(|end| &value[..end]);
    }
    None
}

/// Returns the trimmed body of the first child element with the given `tag`.
fn child_text<'a>(body: &'a str, tag: &str) -> Result<Option<&'a str>, FormatError> {
    Ok(elements(body, tag)?.first().map(|e| e.body.trim()))
}

/// Parses an automaton in the XML format used by JFLAP. States are numbered in the order in
/// which they appear, and transitions refer to states through their `id` attribute. Every
/// transition must read exactly one character. The alphabet consists of all characters that
/// are read, and symbol `j` is the `j`-th smallest of them. Characters that are never read
/// are not part of the alphabet, so a written automaton with unused symbols comes back over
/// fewer symbols, with the remaining ones renumbered in order.
///
/// Only the subset of XML that JFLAP emits is understood. Entities such as `&lt;` or `&amp;`
/// are not decoded, so a `<read>` holding one is rejected as more than one character, and
/// attribute values must not contain `>`.
pub fn parse_jflap(input: &str) -> Result<DFA, FormatError> {
    let mut ids = Map::default();
    let mut initial = None;
    let mut accepting = OrderedSet::default();

    let states = elements(input, "state")?;
    for (index, state) in states.iter().enumerate() {
        let id = attribute(state.attributes, "id")
            .ok_or_else(|| FormatError::MalformedJflap(format!("state {index} has no id")))?;
        if ids.insert(id, index).is_some() {
            return Err(FormatError::MalformedJflap(format!("state id {id} is used twice")));
        }
        if !elements(state.body, "initial")?.is_empty() && initial.replace(index).is_some() {
            return Err(FormatError::MalformedJflap("more than one initial state".to_string()));
        }
        if !elements(state.body, "final")?.is_empty() {
            accepting.insert(index);
        }
    }

    let lookup = |id: Option<&str>, role: &str| -> Result<StateIndex, FormatError> {
        let id = id.ok_or_else(|| {
            FormatError::MalformedJflap(format!("transition without <{role}> state"))
        })?;
        ids.get(id).copied().ok_or_else(|| {
            FormatError::MalformedJflap(format!("transition refers to unknown state {id}"))
        })
    };

    let mut read = vec![];
    let mut alphabet = OrderedSet::default();
    for transition in elements(input, "transition")? {
        let from = lookup(child_text(transition.body, "from")?, "from")?;
        let to = lookup(child_text(transition.body, "to")?, "to")?;
        let label = child_text(transition.body, "read")?.unwrap_or_default();
        let mut chars = label.chars();
        let symbol = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                return Err(FormatError::MalformedJflap(format!(
                    "transition from {from} must read a single character, found `{label}`"
                )))
            }
        };
        alphabet.insert(symbol);
        read.push((from, symbol, to));
    }
    let alphabet: Vec<char> = alphabet.into_iter().collect();
    trace!(
        "parsed JFLAP automaton with {} states, {} transitions and alphabet {alphabet:?}",
        states.len(),
        read.len()
    );

    let mut transitions = OrderedMap::default();
    for (from, symbol, to) in read {
        let a = alphabet
            .binary_search(&symbol)
            .expect("every symbol that is read is in the alphabet");
        if let Some(existing) = transitions.insert((from, a), to) {
            if existing != to {
                return Err(MinimizationError::Nondeterministic {
                    state: from,
                    symbol: a,
                    first: existing,
                    second: to,
                }
                .into());
            }
        }
    }

    let initial =
        initial.ok_or_else(|| FormatError::MalformedJflap("no initial state".to_string()))?;
    Ok(DFA::from_parts(DfaParts {
        num_states: states.len(),
        num_symbols: alphabet.len(),
        initial,
        accepting,
        transitions,
    })?)
}

/// Writes `dfa` in the XML format used by JFLAP. The states are laid out on a circle and
/// symbols are written as single characters, see [`parse_jflap`] for what reading the result
/// back yields when some symbol labels no transition.
///
/// # Panics
/// Panics if the automaton has more symbols than there are characters for writing them, use
/// [`to_jflap`] to have this reported as an error instead.
pub fn write_jflap<W: Write>(dfa: &DFA, w: &mut W) -> std::fmt::Result {
    let n = dfa.size();
    let step = 2.0 * PI / n as f64;
    let radius = n as f64 * 120.0 / (2.0 * PI);

    w.write_str(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?><!--Created with JFLAP 6.3.--><structure>\n",
    )?;
    w.write_str("\t<type>fa</type>\n")?;
    w.write_str("\t<automaton>\n")?;
    w.write_str("\t\t<!--The list of states.-->\n")?;

    for q in dfa.state_indices() {
        let angle = PI + step * q as f64;
        writeln!(w, "\t\t<state id=\"{q}\" name=\"q{q}\">")?;
        writeln!(w, "\t\t\t<x>{:.6}</x>", angle.cos() * radius + 1.7 * radius)?;
        writeln!(w, "\t\t\t<y>{:.6}</y>", angle.sin() * radius + 1.7 * radius)?;
        if q == dfa.initial() {
            w.write_str("\t\t\t<initial/>\n")?;
        }
        if dfa.is_accepting(q) {
            w.write_str("\t\t\t<final/>\n")?;
        }
        w.write_str("\t\t</state>\n")?;
    }

    w.write_str("\t\t<!--The list of transitions.-->\n")?;
    for (q, a, p) in dfa.transitions() {
        let symbol = SYMBOL_CHARS
            .chars()
            .nth(a)
            .expect("symbol must be representable by a character");
        w.write_str("\t\t<transition>\n")?;
        writeln!(w, "\t\t\t<from>{q}</from>")?;
        writeln!(w, "\t\t\t<to>{p}</to>")?;
        writeln!(w, "\t\t\t<read>{symbol}</read>")?;
        w.write_str("\t\t</transition>\n")?;
    }

    w.write_str("\t</automaton>\n")?;
    w.write_str("</structure>\n")
}

/// Renders `dfa` in the XML format used by JFLAP, see [`write_jflap`].
pub fn to_jflap(dfa: &DFA) -> Result<String, FormatError> {
    if dfa.symbols() > SYMBOL_CHARS.len() {
        return Err(FormatError::AlphabetTooLarge(dfa.symbols()));
    }
    let mut out = String::new();
    write_jflap(dfa, &mut out).expect("writing into a String can not fail");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{attribute, elements, parse_jflap, to_jflap};
    use crate::prelude::*;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?><structure>
        <type>fa</type>
        <automaton>
            <state id="7" name="start">
                <x>10.0</x>
                <y>20.0</y>
                <initial/>
            </state>
            <state id="3" name="end">
                <final />
            </state>
            <transition>
                <from>7</from>
                <to>3</to>
                <read>b</read>
            </transition>
            <transition>
                <from>3</from>
                <to>7</to>
                <read>a</read>
            </transition>
            <transition>
                <from>3</from>
                <to>3</to>
                <read>b</read>
            </transition>
        </automaton>
    </structure>"#;

    #[test]
    fn element_scanning() {
        let found = elements(DOCUMENT, "state").unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(attribute(found[0].attributes, "id"), Some("7"));
        assert_eq!(attribute(found[0].attributes, "name"), Some("start"));
        assert_eq!(attribute(found[1].attributes, "x"), None);
        assert_eq!(elements(DOCUMENT, "final").unwrap().len(), 1);
        // `<structure>` must not be mistaken for some `<struct>` element
        assert!(elements(DOCUMENT, "struct").unwrap().is_empty());
        assert_eq!(attribute(" nid='1' id='2'", "id"), Some("2"));
    }

    #[test_log::test]
    fn parse_document() {
        let dfa = parse_jflap(DOCUMENT).unwrap();
        assert_eq!(dfa.size(), 2);
        assert_eq!(dfa.symbols(), 2);
        assert_eq!(dfa.initial(), 0);
        assert_eq!(dfa.accepting_states().collect::<Vec<_>>(), vec![1]);
        // `a` is symbol 0 and `b` is symbol 1
        assert_eq!(dfa.transition(0, 1), Some(1));
        assert_eq!(dfa.transition(0, 0), None);
        assert_eq!(dfa.transition(1, 0), Some(0));
        assert!(dfa.accepts([1, 1, 0, 1]));
    }

    #[test]
    fn write_then_read() {
        let dfa = DFA::builder()
            .with_symbols(3)
            .with_accepting([0, 2])
            .with_transitions([(0, 0, 1), (1, 1, 2), (2, 2, 0), (2, 0, 2)])
            .into_dfa(1);
        let written = to_jflap(&dfa).unwrap();
        assert!(written.contains("<state id=\"1\" name=\"q1\">"));
        assert_eq!(parse_jflap(&written).unwrap(), dfa);
    }

    #[test]
    fn unused_symbols_are_dropped_on_read() {
        // symbol 0 labels no transition, so `1` becomes the only and therefore first symbol
        let dfa = DFA::builder()
            .with_symbols(3)
            .with_accepting([1])
            .with_transitions([(0, 1, 1), (1, 2, 0)])
            .into_dfa(0);
        let written = to_jflap(&dfa).unwrap();
        assert!(written.contains("<read>1</read>"));
        assert!(written.contains("<read>2</read>"));

        let read = parse_jflap(&written).unwrap();
        assert_eq!(read.size(), dfa.size());
        assert_eq!(read.symbols(), 2);
        assert_eq!(read.transitions().collect::<Vec<_>>(), vec![(0, 0, 1), (1, 1, 0)]);
        assert!(dfa.accepts([1, 2, 1]));
        assert!(read.accepts([0, 1, 0]));
    }

    #[test]
    fn entities_are_not_decoded() {
        let escaped = DOCUMENT.replace("<read>a</read>", "<read>&lt;</read>");
        assert!(matches!(
            parse_jflap(&escaped),
            Err(FormatError::MalformedJflap(_))
        ));
    }

    #[test]
    fn oversized_alphabet_is_rejected() {
        let dfa = DFA::new(1, 63, 0).unwrap();
        assert!(matches!(
            to_jflap(&dfa),
            Err(FormatError::AlphabetTooLarge(63))
        ));
    }

    #[test]
    fn malformed_documents_are_rejected() {
        let no_initial = DOCUMENT.replace("<initial/>", "");
        assert!(matches!(
            parse_jflap(&no_initial),
            Err(FormatError::MalformedJflap(_))
        ));

        let epsilon = DOCUMENT.replace("<read>a</read>", "<read/>");
        assert!(matches!(
            parse_jflap(&epsilon),
            Err(FormatError::MalformedJflap(_))
        ));

        let unknown = DOCUMENT.replace("<to>7</to>", "<to>9</to>");
        assert!(matches!(
            parse_jflap(&unknown),
            Err(FormatError::MalformedJflap(_))
        ));

        let nondeterministic = DOCUMENT.replace("<read>a</read>", "<read>b</read>");
        assert!(matches!(
            parse_jflap(&nondeterministic),
            Err(FormatError::Invalid(MinimizationError::Nondeterministic { .. }))
        ));
    }
}
