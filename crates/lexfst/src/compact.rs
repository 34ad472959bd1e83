// Immutable compact transducer: one flat sorted transition array.

use crate::alphabet::Alphabet;
use crate::iter::{StateIterator, drain};
use crate::mutable::MutableTransducer;
use crate::transition::{StateId, Transition};
use crate::{FstError, Transducer};

/// Read-optimized automaton built once and never mutated.
///
/// Transitions of all states live in one array; state `s` owns
/// `transitions[offsets[s]..offsets[s + 1]]`, sorted so lookups by input
/// symbol are a binary search. Holds no interior mutability, so a shared
/// reference can be applied from several threads at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactTransducer {
    alphabet: Alphabet,
    start: StateId,
    accepting: Vec<bool>,
    offsets: Vec<usize>,
    transitions: Vec<Transition>,
}

impl CompactTransducer {
    /// Build from any state source.
    pub fn from_states<S: StateIterator + ?Sized>(source: &mut S) -> Result<Self, FstError> {
        let drained = drain(source)?;
        Ok(Self::from_parts(
            drained.alphabet,
            drained.start,
            drained.accepting,
            &drained.transitions,
        ))
    }

    /// Pack per-state sorted spans. Spans must already be sorted and deduplicated.
    pub(crate) fn from_parts(
        alphabet: Alphabet,
        start: StateId,
        accepting: Vec<bool>,
        spans: &[Vec<Transition>],
    ) -> Self {
        debug_assert_eq!(accepting.len(), spans.len());
        let total = spans.iter().map(Vec::len).sum();
        let mut offsets = Vec::with_capacity(spans.len() + 1);
        let mut transitions = Vec::with_capacity(total);
        offsets.push(0);
        for span in spans {
            transitions.extend_from_slice(span);
            offsets.push(transitions.len());
        }
        log::debug!(
            "compact: {} states, {} transitions",
            accepting.len(),
            transitions.len()
        );
        CompactTransducer {
            alphabet,
            start,
            accepting,
            offsets,
            transitions,
        }
    }

    #[inline]
    pub fn state_count(&self) -> usize {
        self.accepting.len()
    }

    #[inline]
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// An independent editable copy.
    pub fn to_mutable(&self) -> MutableTransducer {
        let spans = (0..self.state_count())
            .map(|s| self.transitions(s as StateId).to_vec())
            .collect();
        MutableTransducer::from_parts(
            self.alphabet.clone(),
            self.start,
            self.accepting.clone(),
            spans,
        )
    }

    /// Iterate states and transitions in id order.
    pub fn states(&self) -> CompactStates<'_> {
        CompactStates {
            fst: self,
            state: None,
            cursor: 0,
        }
    }
}

impl Transducer for CompactTransducer {
    #[inline]
    fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    #[inline]
    fn start_state(&self) -> StateId {
        self.start
    }

    #[inline]
    fn is_accepting(&self, state: StateId) -> bool {
        self.accepting[state as usize]
    }

    #[inline]
    fn transitions(&self, state: StateId) -> &[Transition] {
        let s = state as usize;
        &self.transitions[self.offsets[s]..self.offsets[s + 1]]
    }
}

/// [`StateIterator`] over a [`CompactTransducer`].
pub struct CompactStates<'a> {
    fst: &'a CompactTransducer,
    state: Option<usize>,
    cursor: usize,
}

impl StateIterator for CompactStates<'_> {
    fn alphabet(&self) -> &Alphabet {
        &self.fst.alphabet
    }

    fn state_count(&self) -> usize {
        self.fst.state_count()
    }

    fn transition_count(&self) -> usize {
        self.fst.transition_count()
    }

    fn start_state(&self) -> StateId {
        self.fst.start
    }

    fn next_state(&mut self) -> Result<bool, FstError> {
        let next = self.state.map_or(0, |s| s + 1);
        if next >= self.fst.state_count() {
            self.state = Some(self.fst.state_count());
            return Ok(false);
        }
        self.state = Some(next);
        self.cursor = self.fst.offsets[next];
        Ok(true)
    }

    fn accepting(&self) -> bool {
        self.state
            .is_some_and(|s| self.fst.accepting.get(s).copied().unwrap_or(false))
    }

    fn next_transition(&mut self) -> Result<Option<Transition>, FstError> {
        let Some(s) = self.state else {
            return Ok(None);
        };
        if s >= self.fst.state_count() || self.cursor >= self.fst.offsets[s + 1] {
            return Ok(None);
        }
        let t = self.fst.transitions[self.cursor];
        self.cursor += 1;
        Ok(Some(t))
    }
}
