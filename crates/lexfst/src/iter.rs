// State/transition iteration contract.
//
// Both automaton representations and every file reader implement this trait,
// so any of them can be loaded into any other without sharing internals.

use crate::FstError;
use crate::alphabet::Alphabet;
use crate::transition::{StateId, Transition};

/// Sequential access to an automaton graph.
///
/// States are visited in id order starting at 0. After [`next_state`]
/// returns `true`, [`accepting`] describes the current state and
/// [`next_transition`] yields its transitions until it returns `None`.
/// Sources that decode external data may fail part way; in-memory sources
/// never return `Err`.
///
/// [`next_state`]: StateIterator::next_state
/// [`accepting`]: StateIterator::accepting
/// [`next_transition`]: StateIterator::next_transition
pub trait StateIterator {
    fn alphabet(&self) -> &Alphabet;
    fn state_count(&self) -> usize;
    fn transition_count(&self) -> usize;
    fn start_state(&self) -> StateId;

    /// Advance to the next state. Returns `false` when no states remain.
    fn next_state(&mut self) -> Result<bool, FstError>;

    /// Whether the current state is accepting.
    fn accepting(&self) -> bool;

    /// The next transition of the current state.
    fn next_transition(&mut self) -> Result<Option<Transition>, FstError>;
}

impl<T: StateIterator + ?Sized> StateIterator for Box<T> {
    fn alphabet(&self) -> &Alphabet {
        (**self).alphabet()
    }
    fn state_count(&self) -> usize {
        (**self).state_count()
    }
    fn transition_count(&self) -> usize {
        (**self).transition_count()
    }
    fn start_state(&self) -> StateId {
        (**self).start_state()
    }
    fn next_state(&mut self) -> Result<bool, FstError> {
        (**self).next_state()
    }
    fn accepting(&self) -> bool {
        (**self).accepting()
    }
    fn next_transition(&mut self) -> Result<Option<Transition>, FstError> {
        (**self).next_transition()
    }
}

/// Upper bound on buffer space reserved from a source's declared state count.
/// Declared counts come from untrusted headers; storage beyond this grows as
/// states actually arrive.
const RESERVE_LIMIT: usize = 1 << 16;

/// A fully drained source: per-state accepting flags and sorted transitions.
pub(crate) struct Drained {
    pub alphabet: Alphabet,
    pub start: StateId,
    pub accepting: Vec<bool>,
    pub transitions: Vec<Vec<Transition>>,
}

/// Read every state of `source`, validating targets and symbol ids.
///
/// A source with no states yields a single non-accepting start state.
pub(crate) fn drain<S: StateIterator + ?Sized>(source: &mut S) -> Result<Drained, FstError> {
    let declared = source.state_count();
    if declared as u64 > crate::transition::MAX_STATES {
        return Err(FstError::StateCapacity {
            max: crate::transition::MAX_STATES,
        });
    }
    let mut accepting = Vec::with_capacity(declared.min(RESERVE_LIMIT));
    let mut transitions = Vec::with_capacity(declared.min(RESERVE_LIMIT));
    while source.next_state()? {
        accepting.push(source.accepting());
        let mut span = Vec::new();
        while let Some(t) = source.next_transition()? {
            span.push(t);
        }
        crate::transition::normalize(&mut span);
        transitions.push(span);
    }
    if accepting.len() != declared {
        return Err(FstError::format(
            accepting.len(),
            format!("expected {declared} states, found {}", accepting.len()),
        ));
    }
    if declared == 0 {
        accepting.push(false);
        transitions.push(Vec::new());
    }
    let start = source.start_state();
    if start as usize >= accepting.len() {
        return Err(FstError::format(0, format!("start state {start} out of range")));
    }
    let symbols = source.alphabet().len();
    for (state, span) in transitions.iter().enumerate() {
        for t in span {
            if t.target() as usize >= declared {
                return Err(FstError::format(
                    state,
                    format!("transition to missing state {}", t.target()),
                ));
            }
            if t.input() as usize >= symbols || t.output() as usize >= symbols {
                return Err(FstError::format(state, "transition uses an unknown symbol id"));
            }
        }
    }
    Ok(Drained {
        alphabet: source.alphabet().clone(),
        start,
        accepting,
        transitions,
    })
}
