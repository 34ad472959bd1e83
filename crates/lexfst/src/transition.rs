// Packed transition encoding shared by the compact and mutable automata.

use crate::FstError;
use crate::alphabet::{EPSILON, SymbolId};
use bytemuck::{Pod, Zeroable};

/// Dense state id. Packed transitions reserve 32 bits for the target.
pub type StateId = u32;

/// Upper bound on the number of states imposed by the 32-bit target field.
pub const MAX_STATES: u64 = 1 << 32;

/// One transition packed into a 64-bit word.
///
/// Layout, most significant first:
/// - bits 48-63: input symbol id
/// - bits 32-47: output symbol id
/// - bits 0-31: target state id
///
/// Ordering on the raw word equals ordering by `(input, output, target)`,
/// so a sorted slice can be range-searched by input symbol.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
pub struct Transition(u64);

impl Transition {
    #[inline]
    pub const fn new(input: SymbolId, output: SymbolId, target: StateId) -> Self {
        Transition(((input as u64) << 48) | ((output as u64) << 32) | target as u64)
    }

    /// Build from wide ids, failing instead of truncating bits.
    pub fn try_new(input: u64, output: u64, target: u64) -> Result<Self, FstError> {
        let max = crate::alphabet::MAX_SYMBOLS;
        if input >= max as u64 || output >= max as u64 {
            return Err(FstError::AlphabetCapacity { max });
        }
        if target >= MAX_STATES {
            return Err(FstError::StateCapacity { max: MAX_STATES });
        }
        Ok(Self::new(input as SymbolId, output as SymbolId, target as StateId))
    }

    #[inline]
    pub const fn input(self) -> SymbolId {
        (self.0 >> 48) as SymbolId
    }

    #[inline]
    pub const fn output(self) -> SymbolId {
        (self.0 >> 32) as SymbolId
    }

    #[inline]
    pub const fn target(self) -> StateId {
        self.0 as StateId
    }

    /// The `(input, output)` pair as one key, target stripped.
    #[inline]
    pub const fn label(self) -> u32 {
        (self.0 >> 32) as u32
    }

    #[inline]
    pub const fn with_target(self, target: StateId) -> Self {
        Transition((self.0 & !0xFFFF_FFFF) | target as u64)
    }

    #[inline]
    pub const fn inverted(self) -> Self {
        Self::new(self.output(), self.input(), self.target())
    }

    /// True for an `epsilon:epsilon` transition.
    #[inline]
    pub const fn is_epsilon(self) -> bool {
        self.label() == 0
    }

    /// True when the transition consumes no input.
    #[inline]
    pub const fn consumes_nothing(self) -> bool {
        self.input() == EPSILON
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} -> {}", self.input(), self.output(), self.target())
    }
}

/// Label key of a pair, comparable with [`Transition::label`].
#[inline]
pub const fn label_of(input: SymbolId, output: SymbolId) -> u32 {
    ((input as u32) << 16) | output as u32
}

/// The sub-slice of a sorted span whose input symbol is `input`.
#[inline]
pub fn input_range(sorted: &[Transition], input: SymbolId) -> &[Transition] {
    let lo = sorted.partition_point(|t| t.input() < input);
    let hi = lo + sorted[lo..].partition_point(|t| t.input() == input);
    &sorted[lo..hi]
}

/// The sub-slice of a sorted span whose `(input, output)` pair is `label`.
#[inline]
pub fn label_range(sorted: &[Transition], label: u32) -> &[Transition] {
    let lo = sorted.partition_point(|t| t.label() < label);
    let hi = lo + sorted[lo..].partition_point(|t| t.label() == label);
    &sorted[lo..hi]
}

/// Insert `t` keeping `sorted` ordered and duplicate-free.
///
/// Returns `false` when the triple was already present.
#[inline]
pub fn insert_sorted(sorted: &mut Vec<Transition>, t: Transition) -> bool {
    match sorted.binary_search(&t) {
        Ok(_) => false,
        Err(pos) => {
            sorted.insert(pos, t);
            true
        }
    }
}

/// Sort and deduplicate a span after bulk edits.
#[inline]
pub fn normalize(span: &mut Vec<Transition>) {
    span.sort_unstable();
    span.dedup();
}

const _: () = assert!(size_of::<Transition>() == 8);
