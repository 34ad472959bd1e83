// Reverse, concatenation and union.

use super::MutableTransducer;
use crate::FstError;
use crate::properties::Edit;
use crate::transition::{self, MAX_STATES, StateId, Transition};

impl MutableTransducer {
    /// Reverse every path: `x:y` is accepted afterwards iff the reversed
    /// strings were accepted before.
    ///
    /// A fresh start state gets epsilon transitions to the old accepting
    /// states, and the old start becomes the only accepting state.
    pub fn reverse(&mut self) -> Result<(), FstError> {
        let n = self.state_count();
        if n as u64 + 1 > MAX_STATES {
            return Err(FstError::StateCapacity { max: MAX_STATES });
        }
        let had_accepting = self.accepting.iter().any(|&a| a);
        let mut spans: Vec<Vec<Transition>> = vec![Vec::new(); n + 1];
        for (s, span) in self.transitions.iter().enumerate() {
            for t in span {
                spans[t.target() as usize].push(t.with_target(s as StateId));
            }
        }
        for (s, &acc) in self.accepting.iter().enumerate() {
            if acc {
                spans[n].push(Transition::new(0, 0, s as StateId));
            }
        }
        for span in &mut spans {
            transition::normalize(span);
        }
        let mut accepting = vec![false; n + 1];
        accepting[self.start as usize] = true;

        self.transitions = spans;
        self.accepting = accepting;
        self.start = n as StateId;
        self.record(Edit::Reverse { had_accepting });
        self.log_size("reverse");
        Ok(())
    }

    /// Append `other`: accepted strings become concatenations of one string
    /// from each automaton.
    pub fn concat(&mut self, other: &MutableTransducer) -> Result<(), FstError> {
        let other = self.align_with(other)?;
        let finals: Vec<StateId> = self.accepting_states().collect();
        let offset = self.absorb(&other)?;
        let next = other.start + offset;
        for f in finals {
            self.accepting[f as usize] = false;
            self.add_epsilon(f, next);
        }
        self.record(Edit::Combine);
        self.log_size("concat");
        Ok(())
    }

    /// Accept what either automaton accepts.
    pub fn union(&mut self, other: &MutableTransducer) -> Result<(), FstError> {
        let other = self.align_with(other)?;
        let offset = self.absorb(&other)?;
        let old_start = self.start;
        let start = self.add_state(false)?;
        self.add_epsilon(start, old_start);
        self.add_epsilon(start, other.start + offset);
        self.start = start;
        self.record(Edit::Combine);
        self.log_size("union");
        Ok(())
    }

    pub(crate) fn accepting_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.accepting
            .iter()
            .enumerate()
            .filter(|(_, a)| **a)
            .map(|(s, _)| s as StateId)
    }
}
