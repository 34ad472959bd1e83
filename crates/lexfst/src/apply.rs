// Bounded nondeterministic search behind apply and prefix_search.
//
// Both searches are depth-first over (state, input position, epsilon moves
// since the last consumed symbol). Outputs accumulate in one buffer that is
// truncated on backtrack; complete strings go into an ordered set.

use std::collections::BTreeSet;

use crate::Transducer;
use crate::alphabet::{Alphabet, EPSILON, IDENTITY, SymbolId, UNKNOWN};
use crate::config::ApplyConfig;
use crate::transition::{StateId, Transition};

/// Result of [`Transducer::apply`] or [`Transducer::prefix_search`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Applied {
    /// Distinct result strings, ordered.
    pub outputs: BTreeSet<String>,
    /// Set when an insertion or suffix bound cut off a live branch, i.e. the
    /// outputs may be incomplete.
    pub truncated: bool,
}

impl Applied {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn contains(&self, s: &str) -> bool {
        self.outputs.contains(s)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(String::as_str)
    }

    /// Outputs as borrowed strings, in order.
    pub fn to_vec(&self) -> Vec<&str> {
        self.iter().collect()
    }
}

/// Apply `fst` to `input`, returning every output string reachable on an
/// accepting path.
pub fn apply<T: Transducer + ?Sized>(fst: &T, input: &str, config: &ApplyConfig) -> Applied {
    let mut search = Search::new(fst, input, config);
    search.apply_from(fst.start_state(), 0, 0);
    search.finish()
}

/// Enumerate accepted input strings of `fst` that start with `prefix`.
pub fn prefix_search<T: Transducer + ?Sized>(
    fst: &T,
    prefix: &str,
    config: &ApplyConfig,
) -> Applied {
    let mut search = Search::new(fst, prefix, config);
    let budget = config.max_suffix as isize;
    search.prefix_from(fst.start_state(), 0, 0, budget);
    search.finish()
}

struct Search<'a, T: ?Sized> {
    fst: &'a T,
    input: &'a str,
    max_insertions: usize,
    ignore: Vec<SymbolId>,
    buf: String,
    found: BTreeSet<String>,
    /// Completed paths, duplicates included.
    emitted: usize,
    truncated: bool,
}

impl<'a, T: Transducer + ?Sized> Search<'a, T> {
    fn new(fst: &'a T, input: &'a str, config: &ApplyConfig) -> Self {
        let alphabet = fst.alphabet();
        let ignore = config
            .ignore
            .iter()
            .filter_map(|s| alphabet.id_of(s))
            .collect();
        Search {
            fst,
            input,
            max_insertions: config.max_insertions,
            ignore,
            buf: String::new(),
            found: BTreeSet::new(),
            emitted: 0,
            truncated: false,
        }
    }

    fn finish(self) -> Applied {
        Applied {
            outputs: self.found,
            truncated: self.truncated,
        }
    }

    #[inline]
    fn emit(&mut self) {
        self.emitted += 1;
        if !self.found.contains(&self.buf) {
            self.found.insert(self.buf.clone());
        }
    }

    /// The next character of the input at `pos`, as a slice.
    fn next_char(&self, pos: usize) -> Option<&'a str> {
        let input = self.input;
        let rest = &input[pos..];
        rest.chars().next().map(|c| &rest[..c.len_utf8()])
    }

    fn apply_from(&mut self, state: StateId, pos: usize, ins: usize) {
        let fst = self.fst;
        let input = self.input;
        let at_end = pos >= input.len();
        if at_end && fst.is_accepting(state) {
            self.emit();
        }

        for i in 0..self.ignore.len() {
            for &t in fst.transitions_on(state, self.ignore[i]) {
                let mark = self.push_output(t, "");
                self.apply_from(t.target(), pos, ins);
                self.buf.truncate(mark);
            }
        }

        let epsilons = fst.transitions_on(state, EPSILON);
        if !epsilons.is_empty() {
            if ins < self.max_insertions {
                for &t in epsilons {
                    let mark = self.push_output(t, "");
                    self.apply_from(t.target(), pos, ins + 1);
                    self.buf.truncate(mark);
                }
            } else {
                self.truncated = true;
            }
        }

        if at_end {
            return;
        }
        let matches = fst.alphabet().matching_prefixes(input, pos);
        for &id in &matches {
            let end = pos + fst.alphabet().symbol(id).len();
            let consumed = &input[pos..end];
            for &t in fst.transitions_on(state, id) {
                let mark = self.push_output(t, consumed);
                self.apply_from(t.target(), end, 0);
                self.buf.truncate(mark);
            }
        }
        if !matches.is_empty() {
            return;
        }

        let Some(consumed) = self.next_char(pos) else {
            return;
        };
        let end = pos + consumed.len();
        // Within each wildcard, the first transition that yields anything wins.
        for wildcard in [IDENTITY, UNKNOWN] {
            for &t in fst.transitions_on(state, wildcard) {
                let before = self.emitted;
                let mark = self.push_output(t, consumed);
                self.apply_from(t.target(), end, 0);
                self.buf.truncate(mark);
                if self.emitted > before {
                    break;
                }
            }
        }
    }

    fn prefix_from(&mut self, state: StateId, pos: usize, ins: usize, suffix_left: isize) {
        let fst = self.fst;
        let input = self.input;
        let at_end = pos >= input.len();
        let suffix_left = if at_end { suffix_left - 1 } else { suffix_left };
        if at_end && fst.is_accepting(state) {
            self.emit();
        }

        if at_end {
            let transitions = fst.transitions(state);
            if suffix_left < 0 {
                if !transitions.is_empty() {
                    self.truncated = true;
                }
                return;
            }
            for &t in transitions {
                let mark = self.buf.len();
                match t.input() {
                    EPSILON => {}
                    IDENTITY | UNKNOWN => {
                        // A wildcard has no concrete spelling to enumerate.
                        self.truncated = true;
                        continue;
                    }
                    id => self.buf.push_str(fst.alphabet().symbol(id)),
                }
                self.prefix_from(t.target(), pos, ins, suffix_left);
                self.buf.truncate(mark);
            }
            return;
        }

        for i in 0..self.ignore.len() {
            let ign = self.ignore[i];
            for &t in fst.transitions_on(state, ign) {
                let mark = self.buf.len();
                self.buf.push_str(fst.alphabet().symbol(ign));
                self.prefix_from(t.target(), pos, ins, suffix_left);
                self.buf.truncate(mark);
            }
        }

        let epsilons = fst.transitions_on(state, EPSILON);
        if !epsilons.is_empty() {
            if ins < self.max_insertions {
                for &t in epsilons {
                    self.prefix_from(t.target(), pos, ins + 1, suffix_left);
                }
            } else {
                self.truncated = true;
            }
        }

        let matches = fst.alphabet().matching_prefixes(input, pos);
        for &id in &matches {
            let end = pos + fst.alphabet().symbol(id).len();
            for &t in fst.transitions_on(state, id) {
                let mark = self.buf.len();
                self.buf.push_str(&input[pos..end]);
                self.prefix_from(t.target(), end, 0, suffix_left);
                self.buf.truncate(mark);
            }
        }
        if !matches.is_empty() {
            return;
        }

        let Some(consumed) = self.next_char(pos) else {
            return;
        };
        let end = pos + consumed.len();
        for wildcard in [IDENTITY, UNKNOWN] {
            for &t in fst.transitions_on(state, wildcard) {
                let mark = self.buf.len();
                self.buf.push_str(consumed);
                self.prefix_from(t.target(), end, 0, suffix_left);
                self.buf.truncate(mark);
            }
        }
    }

    /// Append the output of `t` and return the buffer length to restore.
    #[inline]
    fn push_output(&mut self, t: Transition, consumed: &str) -> usize {
        let mark = self.buf.len();
        self.buf
            .push_str(render_output(self.fst.alphabet(), t.output(), consumed));
        mark
    }
}

/// Text produced by output symbol `out` when `consumed` was read.
///
/// Wildcard outputs echo the consumed text; epsilon produces nothing.
#[inline]
pub fn render_output<'s>(alphabet: &'s Alphabet, out: SymbolId, consumed: &'s str) -> &'s str {
    match out {
        EPSILON => "",
        IDENTITY | UNKNOWN => consumed,
        id => alphabet.symbol(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MutableTransducer;

    fn chain(pairs: &[(&str, &str)]) -> MutableTransducer {
        let mut m = MutableTransducer::new();
        let mut state = m.start_state();
        for (i, o) in pairs {
            let next = m.add_state(false).unwrap();
            m.add_transition(state, i, o, next).unwrap();
            state = next;
        }
        m.set_accepting(state, true);
        m
    }

    #[test]
    fn accepting_start_yields_empty_output() {
        let mut m = MutableTransducer::new();
        m.set_accepting(0, true);
        assert_eq!(m.apply("").to_vec(), [""]);
        assert!(m.apply("a").is_empty());
    }

    #[test]
    fn multichar_symbols_are_all_tried() {
        let mut m = MutableTransducer::new();
        let s1 = m.add_state(false).unwrap();
        let s2 = m.add_state(true).unwrap();
        m.add_transition(0, "c", "C", s1).unwrap();
        m.add_transition(s1, "h", "H", s2).unwrap();
        m.add_transition(0, "ch", "X", s2).unwrap();
        assert_eq!(m.apply("ch").to_vec(), ["CH", "X"]);
    }

    #[test]
    fn epsilon_output_contributes_nothing() {
        let m = chain(&[("a", crate::alphabet::EPSILON_STR), ("b", "B")]);
        assert_eq!(m.apply("ab").to_vec(), ["B"]);
    }

    #[test]
    fn identity_copies_unknown_characters() {
        let mut m = MutableTransducer::new();
        m.set_accepting(0, true);
        m.add_transition(0, crate::alphabet::IDENTITY_STR, crate::alphabet::IDENTITY_STR, 0)
            .unwrap();
        m.add_transition(0, "a", "A", 0).unwrap();
        assert_eq!(m.apply("xay").to_vec(), ["xAy"]);
        assert_eq!(m.apply("öö").to_vec(), ["öö"]);
    }

    #[test]
    fn wildcards_skip_characters_in_alphabet() {
        let mut m = MutableTransducer::new();
        let s = m.add_state(true).unwrap();
        m.add_transition(0, crate::alphabet::IDENTITY_STR, crate::alphabet::IDENTITY_STR, s)
            .unwrap();
        m.add_transition(s, "a", "b", s).unwrap();
        assert_eq!(m.apply("q").to_vec(), ["q"]);
        assert!(m.apply("a").is_empty());
    }

    #[test]
    fn first_productive_identity_transition_wins() {
        let mut m = MutableTransducer::new();
        let dead = m.add_state(false).unwrap();
        let left = m.add_state(true).unwrap();
        let right = m.add_state(true).unwrap();
        let id = crate::alphabet::IDENTITY_STR;
        m.add_transition(0, id, id, dead).unwrap();
        m.add_transition(0, id, id, left).unwrap();
        m.add_transition(0, id, "R", right).unwrap();
        // Sorted by output then target: identity output first, dead before left.
        assert_eq!(m.apply("q").to_vec(), ["q"]);
        // Prefix search follows every wildcard branch.
        assert_eq!(m.prefix_search("q").to_vec(), ["q"]);
    }

    #[test]
    fn epsilon_cycle_is_bounded_and_reported() {
        let mut m = MutableTransducer::new();
        let s = m.add_state(true).unwrap();
        let eps = crate::alphabet::EPSILON_STR;
        m.add_transition(0, eps, "x", 0).unwrap();
        m.add_transition(0, "a", "a", s).unwrap();
        let r = m.apply_with("a", &ApplyConfig::new().with_max_insertions(2));
        assert_eq!(r.to_vec(), ["a", "xa", "xxa"]);
        assert!(r.truncated);
        let r = m.apply("a");
        assert_eq!(r.len(), 16);
    }

    #[test]
    fn ignore_symbols_pass_without_input() {
        let m = {
            let mut m = chain(&[("a", "a"), ("#", "#"), ("b", "b")]);
            m.add_transition(0, "c", "c", 0).unwrap();
            m
        };
        assert!(m.apply("ab").is_empty());
        let cfg = ApplyConfig::new().with_ignored("#");
        assert_eq!(m.apply_with("ab", &cfg).to_vec(), ["a#b"]);
        assert_eq!(m.prefix_search_with("ab", &cfg).to_vec(), ["a#b"]);
    }

    #[test]
    fn prefix_search_enumerates_continuations() {
        let mut m = MutableTransducer::new();
        for word in ["abcx", "abcxy", "abcp", "abdef", "abdz"] {
            let mut state = m.start_state();
            for (i, c) in word.char_indices() {
                let sym = &word[i..i + c.len_utf8()];
                let existing = m
                    .alphabet()
                    .id_of(sym)
                    .and_then(|id| m.transitions_on(state, id).first().copied());
                let next = match existing {
                    Some(t) => t.target(),
                    None => {
                        let n = m.add_state(false).unwrap();
                        m.add_transition(state, sym, sym, n).unwrap();
                        n
                    }
                };
                state = next;
            }
            m.set_accepting(state, true);
        }
        assert_eq!(m.prefix_search("abc").to_vec(), ["abcp", "abcx", "abcxy"]);
        assert_eq!(m.prefix_search("abd").to_vec(), ["abdef", "abdz"]);
        assert!(m.prefix_search("b").is_empty());
        let r = m.prefix_search_with("ab", &ApplyConfig::new().with_max_suffix(2));
        assert_eq!(r.to_vec(), ["abcp", "abcx", "abdz"]);
        assert!(r.truncated);
    }
}
