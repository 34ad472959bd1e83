// Repetition operators.

use super::MutableTransducer;
use crate::FstError;
use crate::properties::Edit;

impl MutableTransducer {
    /// Accept exactly `n` consecutive strings of the current language.
    ///
    /// `repeat(0)` leaves only the empty string; `repeat(1)` changes nothing.
    /// Copies are chained by epsilon transitions and the start stays in the
    /// first copy.
    pub fn repeat(&mut self, n: usize) -> Result<(), FstError> {
        match n {
            0 => self.reset_to_empty_string(),
            1 => {}
            _ => {
                let base = self.clone();
                for _ in 1..n {
                    self.concat(&base)?;
                }
            }
        }
        self.log_size("repeat");
        Ok(())
    }

    /// Accept `n` or more consecutive strings of the current language.
    ///
    /// The last copy loops back to its own start, so any number of further
    /// repetitions follows the first `n - 1`.
    pub fn repeat_min(&mut self, n: usize) -> Result<(), FstError> {
        let mut tail = self.clone();
        tail.loop_back();
        if n <= 1 {
            *self = tail;
        } else {
            self.repeat(n - 1)?;
            self.concat(&tail)?;
        }
        if n == 0 {
            self.optional()?;
        }
        self.log_size("repeat_min");
        Ok(())
    }

    /// Zero or more repetitions.
    pub fn kleene_star(&mut self) -> Result<(), FstError> {
        self.repeat_min(0)
    }

    /// One or more repetitions.
    pub fn kleene_plus(&mut self) -> Result<(), FstError> {
        self.repeat_min(1)
    }

    /// Epsilon transitions from every accepting state back to the start.
    fn loop_back(&mut self) {
        let start = self.start;
        let finals: Vec<_> = self.accepting_states().collect();
        for f in finals {
            self.add_epsilon(f, start);
        }
        self.record(Edit::Combine);
    }
}

#[cfg(test)]
mod tests {
    use crate::{MutableTransducer, Transducer};

    fn ab() -> MutableTransducer {
        let mut m = MutableTransducer::new();
        let s = m.add_state(false).unwrap();
        let f = m.add_state(true).unwrap();
        m.add_transition(0, "a", "x", s).unwrap();
        m.add_transition(s, "b", "y", f).unwrap();
        m
    }

    #[test]
    fn repeat_zero_is_empty_string() {
        let mut m = ab();
        m.repeat(0).unwrap();
        assert_eq!(m.state_count(), 1);
        assert_eq!(m.apply("").to_vec(), [""]);
        assert!(m.apply("ab").is_empty());
    }

    #[test]
    fn repeat_two() {
        let mut m = ab();
        m.repeat(2).unwrap();
        assert_eq!(m.apply("abab").to_vec(), ["xyxy"]);
        assert!(m.apply("ab").is_empty());
    }

    #[test]
    fn kleene_plus_requires_one() {
        let mut m = ab();
        m.kleene_plus().unwrap();
        assert!(m.apply("").is_empty());
        assert_eq!(m.apply("ab").to_vec(), ["xy"]);
        assert_eq!(m.apply("ababab").to_vec(), ["xyxyxy"]);
        assert!(m.apply("aba").is_empty());
    }

    #[test]
    fn repeat_min_two() {
        let mut m = ab();
        m.repeat_min(2).unwrap();
        assert!(m.apply("ab").is_empty());
        assert_eq!(m.apply("abab").to_vec(), ["xyxy"]);
        assert_eq!(m.apply("ababab").to_vec(), ["xyxyxy"]);
    }
}
