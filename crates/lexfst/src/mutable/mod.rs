// Mutable transducer: per-state sorted transition sets plus lazy flags.
//
// The construction algorithms live in the sibling modules; each one reports
// its effect on the flags through `Properties::record`.

mod combine;
mod determinize;
mod epsilon;
mod minimize;
mod product;
mod prune;
mod repeat;
mod wildcard;

use crate::alphabet::{Alphabet, SymbolId};
use crate::compact::CompactTransducer;
use crate::iter::{StateIterator, drain};
use crate::properties::{Edit, Properties};
use crate::transition::{self, MAX_STATES, StateId, Transition};
use crate::{FstError, Transducer};

/// Editable automaton with an in-place construction algebra.
///
/// A new automaton holds a single non-accepting start state. Symbols are
/// given as strings and interned into the automaton's own alphabet;
/// alphabets are never shared between automata, binary operators align and
/// translate instead.
#[derive(Debug, Clone)]
pub struct MutableTransducer {
    alphabet: Alphabet,
    start: StateId,
    accepting: Vec<bool>,
    transitions: Vec<Vec<Transition>>,
    props: Properties,
}

impl Default for MutableTransducer {
    fn default() -> Self {
        Self::new()
    }
}

impl MutableTransducer {
    /// A single non-accepting start state and no transitions.
    pub fn new() -> Self {
        Self::with_alphabet(Alphabet::new())
    }

    /// Like [`MutableTransducer::new`] with a preset alphabet.
    pub fn with_alphabet(alphabet: Alphabet) -> Self {
        MutableTransducer {
            alphabet,
            start: 0,
            accepting: vec![false],
            transitions: vec![Vec::new()],
            props: Properties::from_bits(
                Properties::EPSILON_FREE | Properties::DETERMINISTIC | Properties::NO_UNREACHABLE,
            ),
        }
    }

    /// Load every state of `source`.
    pub fn from_states<S: StateIterator + ?Sized>(source: &mut S) -> Result<Self, FstError> {
        let d = drain(source)?;
        Ok(Self::from_parts(d.alphabet, d.start, d.accepting, d.transitions))
    }

    /// Spans must be sorted and deduplicated.
    pub(crate) fn from_parts(
        alphabet: Alphabet,
        start: StateId,
        accepting: Vec<bool>,
        transitions: Vec<Vec<Transition>>,
    ) -> Self {
        debug_assert_eq!(accepting.len(), transitions.len());
        MutableTransducer {
            alphabet,
            start,
            accepting,
            transitions,
            props: Properties::empty(),
        }
    }

    #[inline]
    pub fn state_count(&self) -> usize {
        self.accepting.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.iter().map(Vec::len).sum()
    }

    /// Facts currently known to hold.
    #[inline]
    pub fn properties(&self) -> Properties {
        self.props
    }

    #[inline]
    fn record(&mut self, edit: Edit) {
        self.props.record(edit);
    }

    /// Append a state and return its id.
    pub fn add_state(&mut self, accepting: bool) -> Result<StateId, FstError> {
        let id = self.state_count() as u64;
        if id >= MAX_STATES {
            return Err(FstError::StateCapacity { max: MAX_STATES });
        }
        self.accepting.push(accepting);
        self.transitions.push(Vec::new());
        self.record(Edit::AddState { accepting });
        Ok(id as StateId)
    }

    pub fn set_accepting(&mut self, state: StateId, accepting: bool) {
        let slot = &mut self.accepting[state as usize];
        if *slot != accepting {
            *slot = accepting;
            self.record(Edit::SetAccepting(accepting));
        }
    }

    pub fn set_start(&mut self, state: StateId) {
        assert!((state as usize) < self.state_count(), "no state {state}");
        if state != self.start {
            self.start = state;
            self.record(Edit::Combine);
        }
    }

    /// Intern `symbol` without expanding wildcard transitions.
    ///
    /// Use [`MutableTransducer::add_symbol`] when existing identity or
    /// unknown transitions must stop covering the new symbol implicitly.
    pub fn intern(&mut self, symbol: &str) -> Result<SymbolId, FstError> {
        self.alphabet.intern(symbol)
    }

    /// Add `from --input:output--> to`, interning both symbols.
    ///
    /// Returns `false` when the transition already existed.
    pub fn add_transition(
        &mut self,
        from: StateId,
        input: &str,
        output: &str,
        to: StateId,
    ) -> Result<bool, FstError> {
        let i = self.alphabet.intern(input)?;
        let o = self.alphabet.intern(output)?;
        Ok(self.add_arc(from, Transition::new(i, o, to)))
    }

    /// Add an already-encoded transition leaving `from`.
    ///
    /// Panics if either state or either symbol id is unknown.
    pub fn add_arc(&mut self, from: StateId, t: Transition) -> bool {
        let n = self.state_count();
        assert!((from as usize) < n, "no state {from}");
        assert!((t.target() as usize) < n, "no state {}", t.target());
        assert!(
            (t.input() as usize) < self.alphabet.len() && (t.output() as usize) < self.alphabet.len(),
            "symbol id outside the alphabet"
        );
        let added = transition::insert_sorted(&mut self.transitions[from as usize], t);
        if added {
            self.record(Edit::AddTransition {
                epsilon: t.is_epsilon(),
            });
        }
        added
    }

    /// Add an `epsilon:epsilon` transition.
    pub fn add_epsilon(&mut self, from: StateId, to: StateId) -> bool {
        self.add_arc(from, Transition::new(0, 0, to))
    }

    /// Freeze into the compact form. `self` stays usable.
    pub fn make_compact(&self) -> CompactTransducer {
        CompactTransducer::from_parts(
            self.alphabet.clone(),
            self.start,
            self.accepting.clone(),
            &self.transitions,
        )
    }

    /// Iterate states and transitions in id order.
    pub fn states(&self) -> MutableStates<'_> {
        MutableStates {
            fst: self,
            state: None,
            cursor: 0,
        }
    }

    /// Also accept the empty string.
    ///
    /// Usually this only marks the start state accepting. When the start state
    /// is re-entered by some transition, marking it would accept longer strings
    /// too, so a fresh accepting start with an epsilon to the old one is added
    /// instead and [`state_count`](Self::state_count) grows by one.
    pub fn optional(&mut self) -> Result<(), FstError> {
        if self.is_accepting(self.start) {
            return Ok(());
        }
        if self.has_incoming(self.start) {
            let old = self.start;
            let fresh = self.add_state(true)?;
            self.add_epsilon(fresh, old);
            self.start = fresh;
        } else {
            self.set_accepting(self.start, true);
        }
        Ok(())
    }

    fn has_incoming(&self, state: StateId) -> bool {
        self.transitions
            .iter()
            .any(|span| span.iter().any(|t| t.target() == state))
    }

    /// Swap input and output of every transition.
    pub fn inverse(&mut self) {
        self.relabel(Transition::inverted);
        self.record(Edit::Invert);
    }

    /// Replace every output with the input.
    pub fn project_up(&mut self) {
        self.relabel(|t| Transition::new(t.input(), t.input(), t.target()));
        self.record(Edit::Relabel);
    }

    /// Replace every input with the output.
    pub fn project_down(&mut self) {
        self.relabel(|t| Transition::new(t.output(), t.output(), t.target()));
        self.record(Edit::Relabel);
    }

    fn relabel(&mut self, f: impl Fn(Transition) -> Transition) {
        for span in &mut self.transitions {
            for t in span.iter_mut() {
                *t = f(*t);
            }
            transition::normalize(span);
        }
    }

    /// Replace the automaton with one accepting only the empty string.
    fn reset_to_empty_string(&mut self) {
        self.start = 0;
        self.accepting = vec![true];
        self.transitions = vec![Vec::new()];
        self.record(Edit::EmptyString);
    }

    /// Append `other`'s states, translating its symbol ids into this alphabet.
    ///
    /// Returns the offset added to every state id of `other`. Symbols missing
    /// here are interned as plain literals; callers wanting wildcard-correct
    /// merges align the alphabets first.
    fn absorb(&mut self, other: &MutableTransducer) -> Result<StateId, FstError> {
        let offset = self.state_count() as u64;
        if offset + other.state_count() as u64 > MAX_STATES {
            return Err(FstError::StateCapacity { max: MAX_STATES });
        }
        let offset = offset as StateId;
        let identical = self.alphabet == other.alphabet;
        let mut map: Vec<SymbolId> = Vec::with_capacity(other.alphabet.len());
        for (i, sym) in other.alphabet.symbols().enumerate() {
            map.push(if identical {
                i as SymbolId
            } else {
                self.alphabet.intern(sym)?
            });
        }
        for span in &other.transitions {
            let mut moved: Vec<Transition> = span
                .iter()
                .map(|t| {
                    Transition::new(
                        map[t.input() as usize],
                        map[t.output() as usize],
                        t.target() + offset,
                    )
                })
                .collect();
            if !identical {
                transition::normalize(&mut moved);
            }
            self.transitions.push(moved);
        }
        self.accepting.extend_from_slice(&other.accepting);
        self.record(Edit::Combine);
        Ok(offset)
    }

    /// Pairs `(input, output)` occurring on any transition.
    fn labels(&self) -> Vec<u32> {
        let mut labels: Vec<u32> = self
            .transitions
            .iter()
            .flat_map(|span| span.iter().map(|t| t.label()))
            .collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }

    fn log_size(&self, op: &str) {
        log::debug!(
            "{op}: {} states, {} transitions",
            self.state_count(),
            self.transition_count()
        );
    }
}

impl Transducer for MutableTransducer {
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
        &self.transitions[state as usize]
    }
}

/// [`StateIterator`] over a [`MutableTransducer`].
pub struct MutableStates<'a> {
    fst: &'a MutableTransducer,
    state: Option<usize>,
    cursor: usize,
}

impl StateIterator for MutableStates<'_> {
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
        self.cursor = 0;
        if next >= self.fst.state_count() {
            self.state = Some(self.fst.state_count());
            return Ok(false);
        }
        self.state = Some(next);
        Ok(true)
    }

    fn accepting(&self) -> bool {
        self.state
            .is_some_and(|s| self.fst.accepting.get(s).copied().unwrap_or(false))
    }

    fn next_transition(&mut self) -> Result<Option<Transition>, FstError> {
        let Some(span) = self.state.and_then(|s| self.fst.transitions.get(s)) else {
            return Ok(None);
        };
        let t = span.get(self.cursor).copied();
        if t.is_some() {
            self.cursor += 1;
        }
        Ok(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::{EPSILON_STR, IDENTITY_STR};

    #[test]
    fn new_has_single_nonaccepting_start() {
        let m = MutableTransducer::new();
        assert_eq!(m.state_count(), 1);
        assert_eq!(m.transition_count(), 0);
        assert!(!m.is_accepting(0));
        assert!(m.apply("").is_empty());
    }

    #[test]
    fn add_transition_is_idempotent() {
        let mut m = MutableTransducer::new();
        let s = m.add_state(true).unwrap();
        assert!(m.add_transition(0, "a", "b", s).unwrap());
        assert!(!m.add_transition(0, "a", "b", s).unwrap());
        assert_eq!(m.transition_count(), 1);
        assert!(!m.properties().contains(Properties::DETERMINISTIC));
    }

    #[test]
    fn epsilon_transition_clears_epsilon_free() {
        let mut m = MutableTransducer::new();
        assert!(m.properties().contains(Properties::EPSILON_FREE));
        m.add_transition(0, EPSILON_STR, EPSILON_STR, 0).unwrap();
        assert!(!m.properties().contains(Properties::EPSILON_FREE));
    }

    #[test]
    #[should_panic(expected = "no state")]
    fn dangling_target_fails_fast() {
        let mut m = MutableTransducer::new();
        let _ = m.add_transition(0, "a", "a", 5);
    }

    #[test]
    fn make_compact_does_not_alias() {
        let mut m = MutableTransducer::new();
        let s = m.add_state(true).unwrap();
        m.add_transition(0, "a", "A", s).unwrap();
        let c = m.make_compact();
        m.add_transition(0, "b", "B", s).unwrap();
        assert_eq!(c.transition_count(), 1);
        assert_eq!(m.transition_count(), 2);
        assert!(c.apply("b").is_empty());
        assert_eq!(m.apply("b").to_vec(), ["B"]);
    }

    #[test]
    fn inverse_twice_is_identity() {
        let mut m = MutableTransducer::new();
        let s = m.add_state(true).unwrap();
        m.add_transition(0, "a", "x", s).unwrap();
        m.add_transition(s, "b", "y", s).unwrap();
        let before = m.make_compact();
        m.inverse();
        assert_eq!(m.apply("xyy").to_vec(), ["abb"]);
        m.inverse();
        assert_eq!(m.make_compact(), before);
    }

    #[test]
    fn projections() {
        let mut m = MutableTransducer::new();
        let s = m.add_state(true).unwrap();
        m.add_transition(0, "a", "x", s).unwrap();
        let mut up = m.clone();
        up.project_up();
        assert_eq!(up.apply("a").to_vec(), ["a"]);
        m.project_down();
        assert_eq!(m.apply("x").to_vec(), ["x"]);
        assert!(m.apply("a").is_empty());
    }

    #[test]
    fn optional_accepts_empty_string() {
        let mut m = MutableTransducer::new();
        let s = m.add_state(true).unwrap();
        m.add_transition(0, "a", "A", s).unwrap();
        m.optional().unwrap();
        assert_eq!(m.state_count(), 2);
        assert_eq!(m.apply("").to_vec(), [""]);
        assert_eq!(m.apply("a").to_vec(), ["A"]);
    }

    #[test]
    fn optional_with_reentered_start_adds_state() {
        // a(ba)* must not start accepting "ab".
        let mut m = MutableTransducer::new();
        let s = m.add_state(true).unwrap();
        m.add_transition(0, "a", "a", s).unwrap();
        m.add_transition(s, "b", "b", 0).unwrap();
        m.optional().unwrap();
        assert_eq!(m.state_count(), 3);
        assert_eq!(m.apply("").to_vec(), [""]);
        assert!(m.apply("ab").is_empty());
        assert_eq!(m.apply("aba").to_vec(), ["aba"]);
    }

    #[test]
    fn iterator_reloads_identically() {
        let mut m = MutableTransducer::new();
        let s = m.add_state(true).unwrap();
        m.add_transition(0, IDENTITY_STR, IDENTITY_STR, s).unwrap();
        m.add_transition(0, "k", "g", s).unwrap();
        let copy = MutableTransducer::from_states(&mut m.states()).unwrap();
        assert_eq!(copy.make_compact(), m.make_compact());
    }
}
