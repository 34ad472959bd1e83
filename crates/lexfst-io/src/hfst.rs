// HFST binary transducers (OpenFST backend), read only.
//
// Layout, integers little-endian:
//
//   "HFST" 0x00 u16:header_len 0x00 header[header_len - 1] 0x00
//   u32 0x7EB2FDD6
//   u32:len bytes[len]                 vector blob, skipped
//   u32:len bytes[len]                 standard blob, skipped
//   16 bytes
//   u32 start, 4 bytes
//   u32 states, 12 bytes
//   u32 0x7EB2FB74, 4 bytes
//   u32 max symbol id, 4 bytes
//   u32 alphabet size, 4 bytes
//   alphabet size x { u32:len utf8[len] u32:id u32:weight }
//   per state: StateRecord then count x ArcRecord

use bytemuck::{Pod, Zeroable};
use hashbrown::HashMap;

use lexfst::alphabet::{Alphabet, SymbolId};
use lexfst::transition::{StateId, Transition};
use lexfst::{FstError, MutableTransducer, StateIterator};

use crate::cursor::Cursor;
use crate::producer::Producer;

const MAGIC: &[u8; 4] = b"HFST";
/// Sanity constant before the skipped blobs.
pub const SANITY_1: u32 = 0x7EB2_FDD6;
/// Sanity constant after the state count.
pub const SANITY_2: u32 = 0x7EB2_FB74;

/// Per-state header: final weight (zero bits for accepting), arc count, padding.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct StateRecord {
    pub weight: [u8; 4],
    pub count: [u8; 4],
    pub pad: [u8; 4],
}

/// One arc: input id, output id, weight, target state.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ArcRecord {
    pub input: [u8; 4],
    pub output: [u8; 4],
    pub weight: [u8; 4],
    pub target: [u8; 4],
}

const STATE_RECORD: usize = std::mem::size_of::<StateRecord>();
const ARC_RECORD: usize = std::mem::size_of::<ArcRecord>();

const _: () = assert!(STATE_RECORD == 12);
const _: () = assert!(ARC_RECORD == 16);

/// Header fields of an HFST file.
#[derive(Debug, Clone)]
pub struct HfstHeader {
    /// `key\0value\0` pairs from the HFST header block.
    pub properties: HashMap<String, String>,
    pub start: StateId,
    pub state_count: usize,
    pub max_symbol_id: u32,
    pub alphabet_size: usize,
}

/// Streaming reader over an HFST image.
pub struct HfstReader<'a> {
    cursor: Cursor<'a>,
    inverse: bool,
    header: HfstHeader,
    alphabet: Alphabet,
    /// HFST symbol id to alphabet id.
    symbols: HashMap<u32, SymbolId>,
    transition_count: usize,
    decoded: usize,
    accepting: bool,
    arcs_left: usize,
}

impl<'a> HfstReader<'a> {
    /// Parse header and symbol table; states follow lazily.
    pub fn new(data: &'a [u8], inverse: bool) -> Result<Self, FstError> {
        let mut cursor = Cursor::new(data);
        let header = read_header(&mut cursor)?;
        let (alphabet, symbols) = read_alphabet(&mut cursor, header.alphabet_size)?;

        let state_bytes = header.state_count.saturating_mul(STATE_RECORD);
        let transition_count = cursor.remaining().saturating_sub(state_bytes) / ARC_RECORD;
        log::debug!(
            "hfst: {} states (start {}), {} transitions, {} symbols, ids below {}",
            header.state_count,
            header.start,
            transition_count,
            header.alphabet_size,
            header.max_symbol_id
        );
        Ok(HfstReader {
            cursor,
            inverse,
            header,
            alphabet,
            symbols,
            transition_count,
            decoded: 0,
            accepting: false,
            arcs_left: 0,
        })
    }

    pub fn header(&self) -> &HfstHeader {
        &self.header
    }

    fn symbol(&self, raw: [u8; 4]) -> Result<SymbolId, FstError> {
        let id = u32::from_le_bytes(raw);
        self.symbols
            .get(&id)
            .copied()
            .ok_or_else(|| FstError::format(self.cursor.pos(), format!("unknown symbol id {id}")))
    }
}

fn read_header(cursor: &mut Cursor<'_>) -> Result<HfstHeader, FstError> {
    if cursor.take(4, "magic")? != MAGIC {
        return Err(FstError::format(0, "not an HFST file"));
    }
    cursor.skip(1, "header")?;
    let len = cursor.u16_le("header length")? as usize;
    cursor.skip(1, "header")?;
    if len == 0 {
        return Err(FstError::format(cursor.pos(), "empty HFST header"));
    }
    let block = cursor.take(len - 1, "header")?;
    cursor.skip(1, "header")?;
    let properties = parse_properties(block, cursor.pos())?;
    log::trace!("hfst: header {properties:?}");
    if let Some(kind) = properties.get("type") {
        if !kind.contains("OPENFST") {
            return Err(FstError::UnsupportedProducer(format!(
                "HFST transducer type {kind}"
            )));
        }
    }

    let sanity = cursor.u32_le("sanity constant")?;
    if sanity != SANITY_1 {
        log::warn!("hfst: sanity constant {sanity:#x}, expected {SANITY_1:#x}");
    }
    let vector = cursor.u32_le("vector length")? as usize;
    cursor.skip(vector, "vector blob")?;
    let standard = cursor.u32_le("standard length")? as usize;
    cursor.skip(standard, "standard blob")?;
    cursor.skip(16, "header")?;

    let start = cursor.u32_le("start state")?;
    cursor.skip(4, "header")?;
    let state_count = cursor.u32_le("state count")? as usize;
    cursor.skip(12, "header")?;
    let sanity = cursor.u32_le("sanity constant")?;
    if sanity != SANITY_2 {
        log::warn!("hfst: sanity constant {sanity:#x}, expected {SANITY_2:#x}");
    }
    cursor.skip(4, "header")?;
    let max_symbol_id = cursor.u32_le("max symbol id")?;
    cursor.skip(4, "header")?;
    let alphabet_size = cursor.u32_le("alphabet size")? as usize;
    cursor.skip(4, "header")?;

    Ok(HfstHeader {
        properties,
        start,
        state_count,
        max_symbol_id,
        alphabet_size,
    })
}

fn parse_properties(block: &[u8], pos: usize) -> Result<HashMap<String, String>, FstError> {
    let text = std::str::from_utf8(block)
        .map_err(|_| FstError::format(pos, "HFST header is not valid UTF-8"))?;
    let mut fields = text.split('\0');
    let mut properties = HashMap::new();
    while let Some(key) = fields.next() {
        if key.is_empty() {
            continue;
        }
        let value = fields.next().unwrap_or_default();
        properties.insert(key.to_string(), value.to_string());
    }
    Ok(properties)
}

fn read_alphabet(
    cursor: &mut Cursor<'_>,
    size: usize,
) -> Result<(Alphabet, HashMap<u32, SymbolId>), FstError> {
    let mut alphabet = Alphabet::new();
    // length, id and weight: at least 12 bytes per declared symbol
    let mut symbols = HashMap::with_capacity(size.min(cursor.remaining() / 12));
    for _ in 0..size {
        let len = cursor.u32_le("symbol length")? as usize;
        let bytes = cursor.take(len, "symbol")?;
        let text = std::str::from_utf8(bytes)
            .map_err(|_| FstError::format(cursor.pos(), "symbol is not valid UTF-8"))?;
        let id = cursor.u32_le("symbol id")?;
        cursor.skip(4, "symbol weight")?;
        let text = Producer::HfstInternal.to_internal(text);
        if text.is_empty() {
            return Err(FstError::format(cursor.pos(), "empty symbol"));
        }
        symbols.insert(id, alphabet.intern(text)?);
    }
    log::trace!("hfst: {} symbols", symbols.len());
    Ok((alphabet, symbols))
}

impl StateIterator for HfstReader<'_> {
    fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    fn state_count(&self) -> usize {
        self.header.state_count
    }

    fn transition_count(&self) -> usize {
        self.transition_count
    }

    fn start_state(&self) -> StateId {
        self.header.start
    }

    fn next_state(&mut self) -> Result<bool, FstError> {
        if self.arcs_left > 0 {
            self.cursor.skip(self.arcs_left * ARC_RECORD, "arcs")?;
            self.arcs_left = 0;
        }
        if self.decoded >= self.header.state_count {
            return Ok(false);
        }
        let state: StateRecord = self.cursor.record("state header")?;
        self.accepting = state.weight == [0; 4];
        self.arcs_left = u32::from_le_bytes(state.count) as usize;
        self.decoded += 1;
        Ok(true)
    }

    fn accepting(&self) -> bool {
        self.accepting
    }

    fn next_transition(&mut self) -> Result<Option<Transition>, FstError> {
        if self.arcs_left == 0 {
            return Ok(None);
        }
        let arc: ArcRecord = self.cursor.record("arc")?;
        self.arcs_left -= 1;
        let (i, o) = (self.symbol(arc.input)?, self.symbol(arc.output)?);
        let (i, o) = if self.inverse { (o, i) } else { (i, o) };
        Ok(Some(Transition::new(i, o, u32::from_le_bytes(arc.target))))
    }
}

/// Decode an HFST image into a mutable automaton.
pub fn read(data: &[u8], inverse: bool) -> Result<MutableTransducer, FstError> {
    MutableTransducer::from_states(&mut HfstReader::new(data, inverse)?)
}
