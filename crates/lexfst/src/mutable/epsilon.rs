// Epsilon removal by closure absorption.

use super::MutableTransducer;
use crate::properties::{Edit, Properties};
use crate::transition::{self, Transition};

impl MutableTransducer {
    /// Remove every `epsilon:epsilon` transition without changing the relation.
    ///
    /// Each state absorbs the accepting flag and the non-epsilon transitions
    /// of every state in its epsilon closure. The closure walk marks visited
    /// states, so epsilon cycles terminate. Transitions that consume nothing
    /// but emit a symbol are kept.
    pub fn remove_epsilons(&mut self) {
        if self.props.contains(Properties::EPSILON_FREE) {
            return;
        }
        let n = self.state_count();
        let mut spans: Vec<Vec<Transition>> = Vec::with_capacity(n);
        let mut accepting = self.accepting.clone();
        // done[q] == s once q joined the closure of s
        let mut done = vec![usize::MAX; n];
        let mut stack = Vec::new();

        for s in 0..n {
            let mut span = Vec::new();
            done[s] = s;
            stack.push(s);
            while let Some(q) = stack.pop() {
                if self.accepting[q] {
                    accepting[s] = true;
                }
                for &t in &self.transitions[q] {
                    if !t.is_epsilon() {
                        span.push(t);
                        continue;
                    }
                    let r = t.target() as usize;
                    if done[r] != s {
                        done[r] = s;
                        stack.push(r);
                    }
                }
            }
            transition::normalize(&mut span);
            spans.push(span);
        }

        self.transitions = spans;
        self.accepting = accepting;
        self.record(Edit::RemoveEpsilons);
        self.log_size("remove_epsilons");
    }
}

#[cfg(test)]
mod tests {
    use crate::alphabet::EPSILON_STR;
    use crate::properties::Properties;
    use crate::{MutableTransducer, Transducer};

    #[test]
    fn epsilon_cycle_terminates_and_merges() {
        let mut m = MutableTransducer::new();
        let a = m.add_state(false).unwrap();
        let b = m.add_state(true).unwrap();
        m.add_epsilon(0, a);
        m.add_epsilon(a, 0);
        m.add_epsilon(a, b);
        m.add_transition(b, "x", "y", b).unwrap();
        m.remove_epsilons();
        assert!(m.properties().contains(Properties::EPSILON_FREE));
        assert!(m.is_accepting(0));
        assert!(m.is_accepting(a));
        assert_eq!(m.transitions(0).len(), 1);
        assert_eq!(m.apply("xx").to_vec(), ["yy"]);
    }

    #[test]
    fn insertions_survive() {
        let mut m = MutableTransducer::new();
        let s = m.add_state(true).unwrap();
        m.add_transition(0, EPSILON_STR, "i", s).unwrap();
        m.remove_epsilons();
        assert_eq!(m.transition_count(), 1);
        assert_eq!(m.apply("").to_vec(), ["i"]);
    }
}
