// Native binary format.
//
// Layout, all integers big-endian:
//
//   symbols        UTF-16 code units, each symbol ended by 0x000A
//   0x000A         end of alphabet
//   u32            state count N
//   start          s bytes, s = bytes_needed_for(N - 1)
//   u32            transition count
//   per state:
//     records      (to: s bytes, in: a bytes, out: a bytes), a = bytes_needed_for(alphabet - 1)
//     control      0xFF accepting, 0xFE non-accepting
//
// Widths use signed sizing, so the first byte of a record is always below
// 0x80 and can never be mistaken for a control byte.

use std::io::Write;

use lexfst::alphabet::{Alphabet, SymbolId};
use lexfst::transition::{StateId, Transition};
use lexfst::{FstError, MutableTransducer, StateIterator};

use crate::cursor::Cursor;

/// Control byte ending the records of an accepting state.
pub const ACCEPTING: u8 = 0xFF;
/// Control byte ending the records of a non-accepting state.
pub const NON_ACCEPTING: u8 = 0xFE;

const NEWLINE: u16 = 0x000A;

/// Smallest number of bytes holding `n` as a signed big-endian integer.
pub fn bytes_needed_for(n: u64) -> usize {
    let mut bytes = 1;
    while bytes < 8 && n >= 1u64 << (8 * bytes - 1) {
        bytes += 1;
    }
    bytes
}

/// Streaming reader over a native binary image.
///
/// States are decoded one at a time. A record cut short by the end of the
/// data ends the stream early, which loaders report as a state-count
/// mismatch.
pub struct NativeReader<'a> {
    cursor: Cursor<'a>,
    inverse: bool,
    alphabet: Alphabet,
    /// File symbol index to alphabet id.
    symbols: Vec<SymbolId>,
    state_count: usize,
    start: StateId,
    transition_count: usize,
    state_bytes: usize,
    symbol_bytes: usize,
    decoded: usize,
    eof: bool,
    accepting: bool,
    pending: Vec<Transition>,
    next: usize,
}

impl<'a> NativeReader<'a> {
    /// Decode the alphabet and counts; states follow lazily.
    pub fn new(data: &'a [u8], inverse: bool) -> Result<Self, FstError> {
        let mut cursor = Cursor::new(data);
        let mut alphabet = Alphabet::new();
        let mut symbols = Vec::new();
        loop {
            let mut units = Vec::new();
            loop {
                let unit = cursor.u16_be("alphabet")?;
                if unit == NEWLINE {
                    break;
                }
                units.push(unit);
            }
            if units.is_empty() {
                break;
            }
            let symbol = String::from_utf16(&units).map_err(|_| {
                FstError::format(cursor.pos(), "symbol is not valid UTF-16")
            })?;
            symbols.push(alphabet.intern(&symbol)?);
        }
        log::trace!("native: {} symbols", symbols.len());

        let state_count = cursor.u32_be("state count")? as usize;
        let state_bytes = bytes_needed_for(state_count.saturating_sub(1) as u64);
        let start = cursor.uint_be(state_bytes, "start state")?;
        let start = StateId::try_from(start)
            .map_err(|_| FstError::format(cursor.pos(), "start state out of range"))?;
        let transition_count = cursor.u32_be("transition count")? as usize;
        let symbol_bytes = bytes_needed_for(symbols.len().saturating_sub(1) as u64);
        log::trace!("native: {state_count} states, {transition_count} transitions");

        Ok(NativeReader {
            cursor,
            inverse,
            alphabet,
            symbols,
            state_count,
            start,
            transition_count,
            state_bytes,
            symbol_bytes,
            decoded: 0,
            eof: false,
            accepting: false,
            pending: Vec::new(),
            next: 0,
        })
    }

    fn symbol(&self, index: u64) -> Result<SymbolId, FstError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.symbols.get(i))
            .copied()
            .ok_or_else(|| FstError::format(self.cursor.pos(), format!("unknown symbol index {index}")))
    }

    fn read_record(&mut self) -> Result<Transition, FstError> {
        let to = self.cursor.uint_be(self.state_bytes, "transition")?;
        let i = self.cursor.uint_be(self.symbol_bytes, "transition")?;
        let o = self.cursor.uint_be(self.symbol_bytes, "transition")?;
        let (i, o) = if self.inverse { (o, i) } else { (i, o) };
        let (i, o) = (self.symbol(i)?, self.symbol(o)?);
        Transition::try_new(u64::from(i), u64::from(o), to)
    }
}

impl StateIterator for NativeReader<'_> {
    fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    fn state_count(&self) -> usize {
        self.state_count
    }

    fn transition_count(&self) -> usize {
        self.transition_count
    }

    fn start_state(&self) -> StateId {
        self.start
    }

    fn next_state(&mut self) -> Result<bool, FstError> {
        self.pending.clear();
        self.next = 0;
        if self.eof || self.decoded >= self.state_count {
            return Ok(false);
        }
        let record = self.state_bytes + 2 * self.symbol_bytes;
        loop {
            match self.cursor.peek() {
                Some(b @ (ACCEPTING | NON_ACCEPTING)) => {
                    self.accepting = b == ACCEPTING;
                    self.cursor.skip(1, "control byte")?;
                    break;
                }
                _ if self.cursor.remaining() >= record => {
                    let t = self.read_record()?;
                    self.pending.push(t);
                }
                _ => {
                    log::warn!(
                        "native: data ends inside state {} of {}",
                        self.decoded,
                        self.state_count
                    );
                    self.eof = true;
                    self.pending.clear();
                    return Ok(false);
                }
            }
        }
        self.decoded += 1;
        if self.decoded == self.state_count && self.cursor.remaining() > 0 {
            log::warn!("native: {} trailing bytes ignored", self.cursor.remaining());
        }
        Ok(true)
    }

    fn accepting(&self) -> bool {
        self.accepting
    }

    fn next_transition(&mut self) -> Result<Option<Transition>, FstError> {
        let t = self.pending.get(self.next).copied();
        if t.is_some() {
            self.next += 1;
        }
        Ok(t)
    }
}

/// Decode a native binary image into a mutable automaton.
pub fn read(data: &[u8], inverse: bool) -> Result<MutableTransducer, FstError> {
    MutableTransducer::from_states(&mut NativeReader::new(data, inverse)?)
}

/// Encode every state of `states` in the native binary format.
pub fn write<W: Write, S: StateIterator + ?Sized>(
    out: &mut W,
    states: &mut S,
) -> Result<(), FstError> {
    let state_count = states.state_count();
    let n_states = u32::try_from(state_count).map_err(|_| FstError::StateCapacity {
        max: u64::from(u32::MAX),
    })?;
    let n_trans = u32::try_from(states.transition_count())
        .map_err(|_| FstError::format(0, "too many transitions for the native format"))?;
    let alphabet_len = states.alphabet().len();
    let s = bytes_needed_for(state_count.saturating_sub(1) as u64);
    let a = bytes_needed_for(alphabet_len.saturating_sub(1) as u64);

    let mut header = Vec::new();
    for symbol in states.alphabet().symbols() {
        for unit in symbol.encode_utf16() {
            header.extend_from_slice(&unit.to_be_bytes());
        }
        header.extend_from_slice(&NEWLINE.to_be_bytes());
    }
    header.extend_from_slice(&NEWLINE.to_be_bytes());
    header.extend_from_slice(&n_states.to_be_bytes());
    push_truncated(&mut header, u64::from(states.start_state()), s);
    header.extend_from_slice(&n_trans.to_be_bytes());
    out.write_all(&header)?;

    let mut record = Vec::with_capacity(s + 2 * a);
    while states.next_state()? {
        let mut body = Vec::new();
        while let Some(t) = states.next_transition()? {
            record.clear();
            push_truncated(&mut record, u64::from(t.target()), s);
            push_truncated(&mut record, u64::from(t.input()), a);
            push_truncated(&mut record, u64::from(t.output()), a);
            body.extend_from_slice(&record);
        }
        body.push(if states.accepting() { ACCEPTING } else { NON_ACCEPTING });
        out.write_all(&body)?;
    }
    Ok(())
}

/// Append the low `width` bytes of `value`, big-endian.
fn push_truncated(buf: &mut Vec<u8>, value: u64, width: usize) {
    buf.extend_from_slice(&value.to_be_bytes()[8 - width..]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexfst::Transducer;

    #[test]
    fn signed_sizing() {
        assert_eq!(bytes_needed_for(0), 1);
        assert_eq!(bytes_needed_for(127), 1);
        assert_eq!(bytes_needed_for(128), 2);
        assert_eq!(bytes_needed_for(32767), 2);
        assert_eq!(bytes_needed_for(32768), 3);
        assert_eq!(bytes_needed_for(8_388_607), 3);
        assert_eq!(bytes_needed_for(8_388_608), 4);
        assert_eq!(bytes_needed_for(u64::from(u32::MAX)), 5);
    }

    fn sample() -> MutableTransducer {
        let mut m = MutableTransducer::new();
        let s = m.add_state(true).unwrap();
        m.add_transition(0, "ä", "a", s).unwrap();
        m.add_transition(s, "𝔵", "x", s).unwrap();
        m
    }

    #[test]
    fn layout_of_small_automaton() {
        let m = sample();
        let mut out = Vec::new();
        write(&mut out, &mut m.states()).unwrap();
        // Reserved symbols come first: U+0000, U+0001, U+0002.
        assert_eq!(&out[..4], &[0x00, 0x00, 0x00, 0x0A]);
        let tail = &out[out.len() - 4..];
        // State 1: one record (to 1, in 𝔵, out x) then ACCEPTING.
        assert_eq!(tail[..3], [0x01, 0x05, 0x06]);
        assert_eq!(tail[3], ACCEPTING);
        let copy = read(&out, false).unwrap();
        assert_eq!(copy.apply("ä𝔵𝔵").to_vec(), ["axx"]);
    }

    #[test]
    fn truncated_data_is_a_format_error() {
        let m = sample();
        let mut out = Vec::new();
        write(&mut out, &mut m.states()).unwrap();
        out.truncate(out.len() - 2);
        let err = read(&out, false).unwrap_err();
        assert!(matches!(err, FstError::Format { .. }));
    }
}
