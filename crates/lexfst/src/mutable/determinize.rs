// Subset construction over (input, output) pairs.

use std::collections::BTreeMap;

use hashbrown::HashMap;

use super::MutableTransducer;
use crate::FstError;
use crate::properties::{Edit, Properties};
use crate::transition::{MAX_STATES, StateId, Transition};

/// Interns sorted sets of old states as new state ids.
struct SubsetArena {
    map: HashMap<Vec<StateId>, StateId>,
    sets: Vec<Vec<StateId>>,
}

impl SubsetArena {
    fn new() -> Self {
        SubsetArena {
            map: HashMap::new(),
            sets: Vec::new(),
        }
    }

    fn intern(&mut self, set: Vec<StateId>) -> Result<StateId, FstError> {
        if let Some(&id) = self.map.get(&set) {
            return Ok(id);
        }
        if self.sets.len() as u64 >= MAX_STATES {
            return Err(FstError::StateCapacity { max: MAX_STATES });
        }
        let id = self.sets.len() as StateId;
        self.sets.push(set.clone());
        self.map.insert(set, id);
        Ok(id)
    }
}

impl MutableTransducer {
    /// Make the automaton deterministic over `(input, output)` pairs.
    ///
    /// Epsilons are removed first. New states are numbered in discovery
    /// order from the start set, so only reachable subsets are created.
    pub fn determinize(&mut self) -> Result<(), FstError> {
        if self.props.contains(Properties::DETERMINISTIC) {
            return Ok(());
        }
        self.remove_epsilons();

        let mut arena = SubsetArena::new();
        arena.intern(vec![self.start])?;
        let mut accepting = Vec::new();
        let mut spans = Vec::new();
        let mut groups: BTreeMap<u32, Vec<StateId>> = BTreeMap::new();

        // Ids are handed out in order, so the arena doubles as the worklist.
        let mut next = 0;
        while next < arena.sets.len() {
            groups.clear();
            let mut any_accepting = false;
            for &q in &arena.sets[next] {
                any_accepting |= self.accepting[q as usize];
                for &t in &self.transitions[q as usize] {
                    groups.entry(t.label()).or_default().push(t.target());
                }
            }
            let mut span = Vec::with_capacity(groups.len());
            for (&label, targets) in groups.iter_mut() {
                targets.sort_unstable();
                targets.dedup();
                let to = arena.intern(std::mem::take(targets))?;
                span.push(Transition::new((label >> 16) as u16, label as u16, to));
            }
            accepting.push(any_accepting);
            spans.push(span);
            next += 1;
        }

        self.start = 0;
        self.accepting = accepting;
        self.transitions = spans;
        self.record(Edit::Determinize);
        self.log_size("determinize");
        Ok(())
    }
}
