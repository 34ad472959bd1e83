// Removal of unreachable states and traps, with contiguous renumbering.

use std::collections::VecDeque;

use super::MutableTransducer;
use crate::properties::{Edit, Properties};
use crate::transition::StateId;

impl MutableTransducer {
    /// Delete states not reachable from the start state.
    pub fn remove_unreachable_states(&mut self) {
        if self.props.contains(Properties::NO_UNREACHABLE) {
            return;
        }
        let n = self.state_count();
        let mut reached = vec![false; n];
        let mut queue = VecDeque::new();
        reached[self.start as usize] = true;
        queue.push_back(self.start);
        while let Some(s) = queue.pop_front() {
            for t in &self.transitions[s as usize] {
                let d = t.target() as usize;
                if !reached[d] {
                    reached[d] = true;
                    queue.push_back(t.target());
                }
            }
        }
        self.retain_states(&reached);
        self.record(Edit::DropUnreachable);
        self.log_size("remove_unreachable_states");
    }

    /// Delete states from which no accepting state can be reached.
    ///
    /// The start state always survives, so an automaton with an empty
    /// language shrinks to its start state alone.
    pub fn remove_traps(&mut self) {
        if self.props.contains(Properties::NO_TRAPS) {
            return;
        }
        let mut keep = self.co_reachable();
        let start_live = keep[self.start as usize];
        keep[self.start as usize] = true;
        self.retain_states(&keep);
        self.record(Edit::DropTraps { start_live });
        self.log_size("remove_traps");
    }

    /// States from which an accepting state is reachable, found by a
    /// breadth-first walk over the reversed graph.
    pub(crate) fn co_reachable(&self) -> Vec<bool> {
        let n = self.state_count();
        let mut reversed: Vec<Vec<StateId>> = vec![Vec::new(); n];
        for (s, span) in self.transitions.iter().enumerate() {
            for t in span {
                reversed[t.target() as usize].push(s as StateId);
            }
        }
        let mut live = vec![false; n];
        let mut queue = VecDeque::new();
        for (s, &acc) in self.accepting.iter().enumerate() {
            if acc {
                live[s] = true;
                queue.push_back(s);
            }
        }
        while let Some(s) = queue.pop_front() {
            for &p in &reversed[s] {
                if !live[p as usize] {
                    live[p as usize] = true;
                    queue.push_back(p as usize);
                }
            }
        }
        live
    }

    /// Keep states with `keep[s]`, renumbering survivors in order.
    ///
    /// Transitions into dropped states disappear. Renumbering is monotone,
    /// so every surviving span stays sorted.
    pub(crate) fn retain_states(&mut self, keep: &[bool]) {
        assert!(keep[self.start as usize], "the start state must be kept");
        let n = self.state_count();
        let mut remap = vec![StateId::MAX; n];
        let mut next: StateId = 0;
        for s in 0..n {
            if keep[s] {
                remap[s] = next;
                next += 1;
            }
        }
        if next as usize == n {
            return;
        }
        let transitions = std::mem::take(&mut self.transitions);
        let accepting = std::mem::take(&mut self.accepting);
        for (s, span) in transitions.into_iter().enumerate() {
            if !keep[s] {
                continue;
            }
            let span = span
                .into_iter()
                .filter(|t| keep[t.target() as usize])
                .map(|t| t.with_target(remap[t.target() as usize]))
                .collect();
            self.transitions.push(span);
            self.accepting.push(accepting[s]);
        }
        self.start = remap[self.start as usize];
    }
}
