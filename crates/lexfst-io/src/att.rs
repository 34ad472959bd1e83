// AT&T tab-separated text format.
//
//   from<TAB>to<TAB>input<TAB>output[<TAB>weight]   transition
//   state[<TAB>weight]                                accepting state
//
// State 0 is the start state; the writer swaps ids so that it is. Weights are
// parsed and discarded.

use std::io::Write;

use lexfst::alphabet::Alphabet;
use lexfst::transition::{self, StateId, Transition};
use lexfst::{FstError, MutableTransducer, StateIterator};

use crate::producer::Producer;

/// An AT&T text parsed into memory, served through [`StateIterator`].
#[derive(Debug, Clone)]
pub struct AttReader {
    alphabet: Alphabet,
    accepting: Vec<bool>,
    spans: Vec<Vec<Transition>>,
    transition_count: usize,
    state: Option<usize>,
    cursor: usize,
}

impl AttReader {
    /// Parse `text`. With `inverse` the input and output columns swap.
    ///
    /// Errors carry the 1-based line number as their position. A line names
    /// at most two states, so ids of `2 * lines` and above are rejected.
    pub fn parse(text: &str, producer: Producer, inverse: bool) -> Result<Self, FstError> {
        let limit = 2 * text.lines().count() + 1;
        let mut alphabet = Alphabet::new();
        let mut accepting: Vec<bool> = vec![false];
        let mut spans: Vec<Vec<Transition>> = vec![Vec::new()];
        let mut transition_count = 0;

        for (index, line) in text.lines().enumerate() {
            let lineno = index + 1;
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            let from = parse_state(fields[0], limit, lineno)?;
            match fields.len() {
                1 | 2 => {
                    if let Some(w) = fields.get(1) {
                        parse_weight(w, lineno)?;
                    }
                    grow(&mut accepting, &mut spans, from);
                    accepting[from as usize] = true;
                }
                4 | 5 => {
                    if let Some(w) = fields.get(4) {
                        parse_weight(w, lineno)?;
                    }
                    let to = parse_state(fields[1], limit, lineno)?;
                    let (i, o) = if inverse {
                        (fields[3], fields[2])
                    } else {
                        (fields[2], fields[3])
                    };
                    let i = intern(&mut alphabet, producer, i, lineno)?;
                    let o = intern(&mut alphabet, producer, o, lineno)?;
                    grow(&mut accepting, &mut spans, from.max(to));
                    spans[from as usize].push(Transition::new(i, o, to));
                    transition_count += 1;
                }
                n => {
                    return Err(FstError::format(
                        lineno,
                        format!("expected 1, 2, 4 or 5 fields, found {n}"),
                    ));
                }
            }
        }
        for span in &mut spans {
            transition::normalize(span);
        }
        log::trace!(
            "att: {} states, {} transition lines, {} symbols",
            accepting.len(),
            transition_count,
            alphabet.len()
        );
        Ok(AttReader {
            alphabet,
            accepting,
            spans,
            transition_count,
            state: None,
            cursor: 0,
        })
    }

    /// Number of transition lines read, duplicates included.
    pub fn line_count(&self) -> usize {
        self.transition_count
    }
}

fn grow(accepting: &mut Vec<bool>, spans: &mut Vec<Vec<Transition>>, state: StateId) {
    let needed = state as usize + 1;
    if accepting.len() < needed {
        accepting.resize(needed, false);
        spans.resize_with(needed, Vec::new);
    }
}

fn parse_state(field: &str, limit: usize, lineno: usize) -> Result<StateId, FstError> {
    let id = field
        .trim()
        .parse::<StateId>()
        .map_err(|_| FstError::format(lineno, format!("invalid state id {field:?}")))?;
    if id as usize >= limit {
        return Err(FstError::format(
            lineno,
            format!("state id {id} is beyond what the text can define"),
        ));
    }
    Ok(id)
}

fn parse_weight(field: &str, lineno: usize) -> Result<f64, FstError> {
    field
        .trim()
        .parse::<f64>()
        .map_err(|_| FstError::format(lineno, format!("invalid weight {field:?}")))
}

fn intern(
    alphabet: &mut Alphabet,
    producer: Producer,
    field: &str,
    lineno: usize,
) -> Result<lexfst::SymbolId, FstError> {
    let symbol = producer.to_internal(field);
    if symbol.is_empty() {
        return Err(FstError::format(lineno, "empty symbol"));
    }
    alphabet.intern(symbol)
}

impl StateIterator for AttReader {
    fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    fn state_count(&self) -> usize {
        self.accepting.len()
    }

    /// Distinct transitions; duplicated lines count once.
    fn transition_count(&self) -> usize {
        self.spans.iter().map(Vec::len).sum()
    }

    fn start_state(&self) -> StateId {
        0
    }

    fn next_state(&mut self) -> Result<bool, FstError> {
        let next = self.state.map_or(0, |s| s + 1);
        self.cursor = 0;
        self.state = Some(next.min(self.accepting.len()));
        Ok(next < self.accepting.len())
    }

    fn accepting(&self) -> bool {
        self.state
            .and_then(|s| self.accepting.get(s))
            .copied()
            .unwrap_or(false)
    }

    fn next_transition(&mut self) -> Result<Option<Transition>, FstError> {
        let t = self
            .state
            .and_then(|s| self.spans.get(s))
            .and_then(|span| span.get(self.cursor))
            .copied();
        if t.is_some() {
            self.cursor += 1;
        }
        Ok(t)
    }
}

/// Parse AT&T text into a mutable automaton.
pub fn read(text: &str, producer: Producer, inverse: bool) -> Result<MutableTransducer, FstError> {
    MutableTransducer::from_states(&mut AttReader::parse(text, producer, inverse)?)
}

/// Write every state of `states` as AT&T text, spelling reserved symbols
/// the way `producer` does.
///
/// The start state and state 0 trade ids, since readers take 0 as the start.
pub fn write<W: Write, S: StateIterator + ?Sized>(
    out: &mut W,
    states: &mut S,
    producer: Producer,
) -> Result<(), FstError> {
    let start = states.start_state() as usize;
    let id = |s: usize| match s {
        s if s == start => 0,
        0 => start,
        s => s,
    };
    let mut from = 0usize;
    while states.next_state()? {
        while let Some(t) = states.next_transition()? {
            let alphabet = states.alphabet();
            let i = producer.spell(t.input(), alphabet.symbol(t.input()))?;
            let o = producer.spell(t.output(), alphabet.symbol(t.output()))?;
            writeln!(out, "{}\t{}\t{i}\t{o}", id(from), id(t.target() as usize))?;
        }
        if states.accepting() {
            writeln!(out, "{}", id(from))?;
        }
        from += 1;
    }
    log::trace!("att: wrote {from} states");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexfst::Transducer;

    const SAMPLE: &str = "0\t1\tk\tg\n\
                          0\t1\t@_IDENTITY_SYMBOL_@\t@_IDENTITY_SYMBOL_@\n\
                          1\t2\t@0@\tx\t0.5\n\
                          2\t0.0\n";

    #[test]
    fn parses_transitions_and_finals() {
        let r = AttReader::parse(SAMPLE, Producer::HfstAtt, false).unwrap();
        assert_eq!(r.state_count(), 3);
        assert_eq!(r.transition_count(), 3);
        let m = read(SAMPLE, Producer::HfstAtt, false).unwrap();
        assert_eq!(m.apply("k").to_vec(), ["gx"]);
        assert_eq!(m.apply("q").to_vec(), ["qx"]);
        assert!(m.apply("kk").is_empty());
    }

    #[test]
    fn inverse_swaps_columns() {
        let m = read(SAMPLE, Producer::HfstAtt, true).unwrap();
        assert_eq!(m.apply("gx").to_vec(), ["k"]);
    }

    #[test]
    fn bad_line_reports_line_number() {
        let text = "0\t1\ta\tb\n0\t1\ta\n";
        let err = AttReader::parse(text, Producer::HfstAtt, false).unwrap_err();
        assert!(matches!(err, FstError::Format { position: 2, .. }));
        let err = AttReader::parse("x\n", Producer::HfstAtt, false).unwrap_err();
        assert!(matches!(err, FstError::Format { position: 1, .. }));
    }

    #[test]
    fn far_state_id_is_rejected() {
        let err = AttReader::parse("0\t4294967295\ta\tb\n", Producer::HfstAtt, false).unwrap_err();
        assert!(matches!(err, FstError::Format { position: 1, .. }));
        let err = AttReader::parse("0\t1\ta\tb\n9\n", Producer::HfstAtt, false).unwrap_err();
        assert!(matches!(err, FstError::Format { position: 2, .. }));
        assert!(AttReader::parse("0\t3\ta\tb\n3\n", Producer::HfstAtt, false).is_ok());
    }

    #[test]
    fn writer_puts_start_first() {
        let mut m = MutableTransducer::new();
        let s = m.add_state(false).unwrap();
        let f = m.add_state(true).unwrap();
        m.add_transition(s, "a", "b", f).unwrap();
        m.add_transition(f, "c", "d", 0).unwrap();
        m.set_start(s);
        let mut out = Vec::new();
        write(&mut out, &mut m.states(), Producer::HfstAtt).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "0\t2\ta\tb\n2\t1\tc\td\n2\n");
        let copy = read(&text, Producer::HfstAtt, false).unwrap();
        assert_eq!(copy.apply("a").to_vec(), ["b"]);
        assert!(copy.apply("ac").is_empty());
    }

    #[test]
    fn empty_text_has_one_state() {
        let m = read("", Producer::Native, false).unwrap();
        assert_eq!(m.state_count(), 1);
        assert!(m.apply("").is_empty());
    }

    #[test]
    fn writer_uses_producer_spellings() {
        let m = read(SAMPLE, Producer::HfstAtt, false).unwrap();
        let mut out = Vec::new();
        write(&mut out, &mut m.states(), Producer::HfstAtt).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\t@_IDENTITY_SYMBOL_@\t@_IDENTITY_SYMBOL_@\n"));
        assert!(text.contains("1\t2\t@0@\tx\n"));
        assert!(text.ends_with("2\n"));

        let err = write(&mut Vec::new(), &mut m.states(), Producer::Sfst).unwrap_err();
        assert!(matches!(err, FstError::UnsupportedProducer(_)));
    }
}
