// Cross-product constructions: intersection, composition, and the
// complement-based operators built on them.

use hashbrown::HashMap;

use super::MutableTransducer;
use crate::FstError;
use crate::alphabet::{EPSILON, IDENTITY};
use crate::properties::{Edit, Properties};
use crate::transition::{self, MAX_STATES, StateId, Transition, label_of};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Join {
    /// Both sides carry the same `(input, output)` pair.
    Intersect,
    /// The left output feeds the right input.
    Compose,
}

/// Visited state pairs, keyed by `left + N * right`.
struct PairIndex {
    left_count: u64,
    ids: HashMap<u64, StateId>,
    pairs: Vec<(StateId, StateId)>,
}

impl PairIndex {
    fn new(left_count: usize) -> Self {
        PairIndex {
            left_count: left_count as u64,
            ids: HashMap::new(),
            pairs: Vec::new(),
        }
    }

    fn id(&mut self, left: StateId, right: StateId) -> Result<StateId, FstError> {
        let key = left as u64 + self.left_count * right as u64;
        if let Some(&id) = self.ids.get(&key) {
            return Ok(id);
        }
        if self.pairs.len() as u64 >= MAX_STATES {
            return Err(FstError::StateCapacity { max: MAX_STATES });
        }
        let id = self.pairs.len() as StateId;
        self.ids.insert(key, id);
        self.pairs.push((left, right));
        Ok(id)
    }
}

impl MutableTransducer {
    /// Keep only the string pairs accepted by both automata.
    pub fn intersect(&mut self, other: &MutableTransducer) -> Result<(), FstError> {
        let mut other = self.align_with(other)?;
        if !other.props.contains(Properties::EPSILON_FREE) {
            other.to_mut().remove_epsilons();
        }
        self.remove_epsilons();
        self.join(&other, Join::Intersect)?;
        self.log_size("intersect");
        Ok(())
    }

    /// Feed the output of this automaton into `other`.
    ///
    /// Every state of both sides behaves as if it carried an extra
    /// `epsilon:epsilon` self-loop, so deletions on the left and insertions on
    /// the right advance one side alone. The loop-with-loop combination is
    /// never emitted.
    pub fn compose(&mut self, other: &MutableTransducer) -> Result<(), FstError> {
        let other = self.align_with(other)?;
        self.join(&other, Join::Compose)?;
        self.log_size("compose");
        Ok(())
    }

    fn join(&mut self, other: &MutableTransducer, mode: Join) -> Result<(), FstError> {
        let mut index = PairIndex::new(self.state_count());
        index.id(self.start, other.start)?;
        let mut accepting = Vec::new();
        let mut spans = Vec::new();

        let mut next = 0;
        while next < index.pairs.len() {
            let (a, b) = index.pairs[next];
            accepting.push(self.accepting[a as usize] && other.accepting[b as usize]);
            let left = &self.transitions[a as usize];
            let right = &other.transitions[b as usize];
            let mut span = Vec::new();
            match mode {
                Join::Intersect => {
                    for &ta in left {
                        for &tb in transition::label_range(right, ta.label()) {
                            let to = index.id(ta.target(), tb.target())?;
                            span.push(Transition::new(ta.input(), ta.output(), to));
                        }
                    }
                }
                Join::Compose => {
                    let stay_a = Transition::new(EPSILON, EPSILON, a);
                    let stay_b = Transition::new(EPSILON, EPSILON, b);
                    for ta in left.iter().copied().chain(std::iter::once(stay_a)) {
                        let matching = transition::input_range(right, ta.output());
                        let idle = (ta.output() == EPSILON).then_some(stay_b);
                        for tb in matching.iter().copied().chain(idle) {
                            if ta == stay_a && tb == stay_b {
                                continue;
                            }
                            let to = index.id(ta.target(), tb.target())?;
                            span.push(Transition::new(ta.input(), tb.output(), to));
                        }
                    }
                }
            }
            transition::normalize(&mut span);
            spans.push(span);
            next += 1;
        }

        self.start = 0;
        self.accepting = accepting;
        self.transitions = spans;
        self.record(Edit::Combine);
        self.remove_epsilons();
        self.remove_unreachable_states();
        self.remove_traps();
        Ok(())
    }

    /// Accept exactly the pair strings this automaton rejects.
    ///
    /// Totality is relative to the pairs on existing transitions, the
    /// `x:x` pair of every literal and `identity:identity`.
    pub fn complement(&mut self) -> Result<(), FstError> {
        let mut labels = self.labels();
        labels.extend(self.diagonal());
        self.complement_over(labels)?;
        self.log_size("complement");
        Ok(())
    }

    /// Remove the string pairs accepted by `other`.
    pub fn subtract(&mut self, other: &MutableTransducer) -> Result<(), FstError> {
        let mut negated = self.align_with(other)?.into_owned();
        let mut labels = self.labels();
        labels.extend(negated.labels());
        labels.extend(self.diagonal());
        negated.complement_over(labels)?;
        self.intersect(&negated)?;
        self.log_size("subtract");
        Ok(())
    }

    /// Union with `other` restricted to inputs this automaton does not accept.
    pub fn priority_union(&mut self, other: &MutableTransducer) -> Result<(), FstError> {
        let other = self.align_with(other)?.into_owned();
        let mut rest = self.clone();
        rest.project_up();
        let mut labels = rest.labels();
        labels.extend(rest.diagonal());
        rest.complement_over(labels)?;
        rest.compose(&other)?;
        self.union(&rest)?;
        self.log_size("priority_union");
        Ok(())
    }

    /// `x:x` for every literal plus `identity:identity`.
    fn diagonal(&self) -> impl Iterator<Item = u32> + '_ {
        self.alphabet
            .literals()
            .chain(std::iter::once(IDENTITY))
            .map(|s| label_of(s, s))
    }

    fn complement_over(&mut self, mut labels: Vec<u32>) -> Result<(), FstError> {
        labels.sort_unstable();
        labels.dedup();
        labels.retain(|&l| l != label_of(EPSILON, EPSILON));

        self.determinize()?;
        let trap = self.add_state(false)?;
        for span in &mut self.transitions {
            let missing: Vec<Transition> = labels
                .iter()
                .filter(|&&l| transition::label_range(span, l).is_empty())
                .map(|&l| Transition::new((l >> 16) as u16, l as u16, trap))
                .collect();
            span.extend(missing);
            transition::normalize(span);
        }
        for acc in &mut self.accepting {
            *acc = !*acc;
        }
        self.record(Edit::Combine);
        self.props.set(Properties::DETERMINISTIC | Properties::EPSILON_FREE);
        Ok(())
    }
}
