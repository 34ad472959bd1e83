//! Reading and writing through every supported format.
//!
//! Run: cargo test -p lexfst-io --test formats

use lexfst::alphabet::{EPSILON_STR, IDENTITY_STR};
use lexfst::{CompactTransducer, FstError, MutableTransducer, StateIterator, Transducer};
use lexfst_io::hfst::{HfstReader, SANITY_1, SANITY_2};
use lexfst_io::{Producer, att, binary, read_binary};
use test_log::test;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Noun stems with case endings, plus an identity fallback for unknown
/// characters and an epsilon-output marker.
fn lexicon() -> MutableTransducer {
    let mut m = MutableTransducer::new();
    let words = [
        ("talo", "talo"),
        ("talossa", "talo+ine"),
        ("kissa", "kissa"),
        ("kissan", "kissa+gen"),
    ];
    for (input, output) in words {
        let ins: Vec<String> = input.chars().map(String::from).collect();
        let mut outs: Vec<String> = vec![output.to_string()];
        outs.resize(ins.len(), EPSILON_STR.to_string());
        let mut state = m.start_state();
        for (i, o) in ins.iter().zip(&outs) {
            let next = m.add_state(false).unwrap();
            m.add_transition(state, i, o, next).unwrap();
            state = next;
        }
        m.set_accepting(state, true);
    }
    let copy = m.add_state(true).unwrap();
    m.add_transition(0, IDENTITY_STR, IDENTITY_STR, copy).unwrap();
    m
}

const PROBES: &[&str] = &["talo", "talossa", "kissa", "kissan", "kiss", "q", "", "talon"];

fn assert_same_language(a: &impl Transducer, b: &impl Transducer) {
    for input in PROBES {
        assert_eq!(a.apply(input), b.apply(input), "input {input:?}");
    }
}

fn native_bytes(m: &MutableTransducer) -> Vec<u8> {
    let mut out = Vec::new();
    binary::write(&mut out, &mut m.states()).unwrap();
    out
}

// ---------------------------------------------------------------------------
// Native binary
// ---------------------------------------------------------------------------

#[test]
fn native_round_trip_is_exact() {
    let mut m = lexicon();
    m.minimize().unwrap();
    let bytes = native_bytes(&m);
    let copy = read_binary(&bytes, Producer::Native, false).unwrap();
    assert_eq!(copy.make_compact(), m.make_compact());
    assert_eq!(copy.apply("talossa").to_vec(), ["talo+ine"]);
}

#[test]
fn native_reader_streams_into_compact() {
    let m = lexicon();
    let bytes = native_bytes(&m);
    let mut reader = binary::NativeReader::new(&bytes, false).unwrap();
    assert_eq!(reader.state_count(), m.state_count());
    assert_eq!(reader.transition_count(), m.transition_count());
    let c = CompactTransducer::from_states(&mut reader).unwrap();
    assert_same_language(&c, &m);
}

#[test]
fn native_inverse_read() {
    let bytes = native_bytes(&lexicon());
    let inv = binary::read(&bytes, true).unwrap();
    assert_eq!(inv.apply("kissa+gen").to_vec(), ["kissan"]);
}

#[test]
fn native_truncation_is_reported() {
    let bytes = native_bytes(&lexicon());
    for cut in [1, 5, bytes.len() / 2] {
        let err = binary::read(&bytes[..bytes.len() - cut], false).unwrap_err();
        assert!(matches!(err, FstError::Format { .. }), "cut {cut}");
    }
}

#[test]
fn native_huge_state_count_is_a_format_error() {
    // empty alphabet, u32::MAX states, five-byte start, zero transitions
    let mut bytes = vec![0x00, 0x0A, 0xFF, 0xFF, 0xFF, 0xFF];
    bytes.extend_from_slice(&[0; 9]);
    let err = read_binary(&bytes, Producer::Native, false).unwrap_err();
    assert!(matches!(err, FstError::Format { .. }));
}

#[test]
fn native_zero_states_load_as_empty_language() {
    // empty alphabet, zero states, one-byte start, zero transitions
    let bytes = [0x00, 0x0A, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    let mut reader = binary::NativeReader::new(&bytes, false).unwrap();
    let c = CompactTransducer::from_states(&mut reader).unwrap();
    assert_eq!(c.state_count(), 1);
    assert!(c.apply("").is_empty());
    assert!(c.prefix_search("").is_empty());
}

#[test]
fn native_wide_ids() {
    // More than 127 states and symbols forces two-byte fields.
    let mut m = MutableTransducer::new();
    let mut state = 0;
    for i in 0..200u32 {
        let next = m.add_state(false).unwrap();
        let sym = char::from_u32(0x4E00 + i).unwrap().to_string();
        m.add_transition(state, &sym, &sym, next).unwrap();
        state = next;
    }
    m.set_accepting(state, true);
    let copy = binary::read(&native_bytes(&m), false).unwrap();
    assert_eq!(copy.make_compact(), m.make_compact());
}

// ---------------------------------------------------------------------------
// AT&T
// ---------------------------------------------------------------------------

#[test]
fn att_round_trip_keeps_language() {
    let m = lexicon();
    for producer in [Producer::HfstInternal, Producer::HfstAtt, Producer::Native] {
        let mut out = Vec::new();
        att::write(&mut out, &mut m.states(), producer).unwrap();
        let text = String::from_utf8(out).unwrap();
        let copy = att::read(&text, producer, false).unwrap();
        assert_eq!(copy.state_count(), m.state_count(), "{producer}");
        assert_same_language(&copy, &m);
    }
}

#[test]
fn att_round_trip_after_union() {
    let mut a = MutableTransducer::new();
    let f = a.add_state(true).unwrap();
    a.add_transition(0, "a", "A", f).unwrap();
    let mut b = MutableTransducer::new();
    let f = b.add_state(true).unwrap();
    b.add_transition(0, "b", "B", f).unwrap();
    a.union(&b).unwrap();
    assert_ne!(a.start_state(), 0);

    let mut out = Vec::new();
    att::write(&mut out, &mut a.states(), Producer::HfstAtt).unwrap();
    let copy = att::read(&String::from_utf8(out).unwrap(), Producer::HfstAtt, false).unwrap();
    for input in ["a", "b", "", "ab"] {
        assert_eq!(copy.apply(input), a.apply(input), "input {input:?}");
    }
    assert_eq!(copy.apply("b").to_vec(), ["B"]);
}

#[test]
fn att_to_native_and_back() {
    let text = "0\t1\ta\tb\n1\t2\t@_SPACE_@\t@0@\n2\n";
    let m = att::read(text, Producer::HfstAtt, false).unwrap();
    assert_eq!(m.apply("a ").to_vec(), ["b"]);
    let copy = binary::read(&native_bytes(&m), false).unwrap();
    let mut out = Vec::new();
    att::write(&mut out, &mut copy.states(), Producer::HfstAtt).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), text);
}

// ---------------------------------------------------------------------------
// HFST
// ---------------------------------------------------------------------------

struct HfstImage<'a> {
    kind: &'a str,
    sanity: u32,
    /// Overrides the declared alphabet size.
    symbol_count: Option<u32>,
    symbols: &'a [(&'a str, u32)],
    start: u32,
    /// (accepting, arcs as (in, out, to))
    states: &'a [(bool, &'a [(u32, u32, u32)])],
}

impl HfstImage<'_> {
    fn bytes(&self) -> Vec<u8> {
        let mut out = b"HFST\0".to_vec();
        let header = format!("version\x003.3\x00type\x00{}\x00name\x00test\x00", self.kind);
        out.extend_from_slice(&(header.len() as u16).to_le_bytes());
        out.push(0);
        out.extend_from_slice(header.as_bytes());
        let u32s = |out: &mut Vec<u8>, values: &[u32]| {
            for v in values {
                out.extend_from_slice(&v.to_le_bytes());
            }
        };
        u32s(&mut out, &[self.sanity, 3]);
        out.extend_from_slice(b"vec");
        u32s(&mut out, &[2]);
        out.extend_from_slice(b"st");
        out.extend_from_slice(&[0; 16]);
        let max_id = self.symbols.iter().map(|&(_, id)| id).max().unwrap_or(0) + 1;
        u32s(&mut out, &[self.start, 0, self.states.len() as u32, 0, 0, 0]);
        let symbol_count = self.symbol_count.unwrap_or(self.symbols.len() as u32);
        u32s(&mut out, &[SANITY_2, 0, max_id, 0, symbol_count, 0]);
        for &(sym, id) in self.symbols {
            u32s(&mut out, &[sym.len() as u32]);
            out.extend_from_slice(sym.as_bytes());
            u32s(&mut out, &[id, 0]);
        }
        for &(accepting, arcs) in self.states {
            let weight = if accepting { 0 } else { f32::INFINITY.to_bits() };
            u32s(&mut out, &[weight, arcs.len() as u32, 0]);
            for &(i, o, to) in arcs {
                u32s(&mut out, &[i, o, 0, to]);
            }
        }
        out
    }
}

const HFST_SYMBOLS: &[(&str, u32)] = &[
    ("@_EPSILON_SYMBOL_@", 0),
    ("@_UNKNOWN_SYMBOL_@", 1),
    ("@_IDENTITY_SYMBOL_@", 2),
    ("k", 3),
    ("g", 4),
    ("@_SPACE_@", 5),
];

const HFST_STATES: &[(bool, &[(u32, u32, u32)])] = &[
    (false, &[(3, 4, 1), (2, 2, 1)]),
    (false, &[(5, 5, 2), (0, 3, 2)]),
    (true, &[]),
];

fn image(kind: &str) -> HfstImage<'_> {
    HfstImage {
        kind,
        sanity: SANITY_1,
        symbol_count: None,
        symbols: HFST_SYMBOLS,
        start: 0,
        states: HFST_STATES,
    }
}

#[test]
fn hfst_reads_openfst_image() {
    let bytes = image("TROPICAL_OPENFST").bytes();
    let reader = HfstReader::new(&bytes, false).unwrap();
    assert_eq!(reader.state_count(), 3);
    assert_eq!(reader.transition_count(), 4);
    assert_eq!(reader.header().max_symbol_id, 6);

    let m = read_binary(&bytes, Producer::HfstInternal, false).unwrap();
    assert_eq!(m.apply("k ").to_vec(), ["g "]);
    assert_eq!(m.apply("q ").to_vec(), ["q "]);
    assert_eq!(m.apply("k").to_vec(), ["gk"]);
    assert!(m.apply("kk").is_empty());
}

#[test]
fn hfst_inverse() {
    let bytes = image("LOG_OPENFST").bytes();
    let m = read_binary(&bytes, Producer::HfstAtt, true).unwrap();
    assert_eq!(m.apply("gk").to_vec(), ["k"]);
}

#[test]
fn hfst_other_backend_is_rejected() {
    let bytes = image("FOMA").bytes();
    let err = read_binary(&bytes, Producer::HfstInternal, false).unwrap_err();
    assert!(matches!(err, FstError::UnsupportedProducer(_)));
}

#[test]
fn hfst_bad_sanity_constant_still_reads() {
    let mut img = image("TROPICAL_OPENFST");
    img.sanity = 0xDEAD_BEEF;
    let m = read_binary(&img.bytes(), Producer::HfstInternal, false).unwrap();
    assert_eq!(m.apply("k ").to_vec(), ["g "]);
}

#[test]
fn hfst_huge_alphabet_size_is_a_format_error() {
    let mut img = image("TROPICAL_OPENFST");
    img.symbol_count = Some(u32::MAX);
    let err = read_binary(&img.bytes(), Producer::HfstInternal, false).unwrap_err();
    assert!(matches!(err, FstError::Format { .. }));
}

#[test]
fn hfst_truncated_arcs() {
    let bytes = image("TROPICAL_OPENFST").bytes();
    // Cut inside the last arc of state 1; state 2's header is gone too.
    let err = read_binary(&bytes[..bytes.len() - 20], Producer::HfstInternal, false).unwrap_err();
    assert!(matches!(err, FstError::Format { .. }));
}

#[test]
fn hfst_image_converts_to_native() {
    let bytes = image("TROPICAL_OPENFST").bytes();
    let m = read_binary(&bytes, Producer::HfstInternal, false).unwrap();
    let copy = binary::read(&native_bytes(&m), false).unwrap();
    assert_eq!(copy.make_compact(), m.make_compact());
}
