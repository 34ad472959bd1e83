// Hopcroft partition refinement over (input, output) pair labels.

use hashbrown::{HashMap, HashSet};

use super::MutableTransducer;
use crate::FstError;
use crate::properties::{Edit, Properties};
use crate::transition::{self, StateId, Transition};

impl MutableTransducer {
    /// Minimize: determinize, trim, then merge equivalent states.
    pub fn minimize(&mut self) -> Result<(), FstError> {
        if self.props.contains(Properties::MINIMAL) {
            return Ok(());
        }
        self.determinize()?;
        self.remove_unreachable_states();
        self.remove_traps();

        let class = self.refine();
        let classes = class.iter().copied().max().map_or(0, |c| c as usize + 1);
        let mut accepting = vec![false; classes];
        let mut spans: Vec<Vec<Transition>> = vec![Vec::new(); classes];
        for (s, span) in self.transitions.iter().enumerate() {
            let c = class[s] as usize;
            accepting[c] |= self.accepting[s];
            spans[c].extend(
                span.iter()
                    .map(|t| t.with_target(class[t.target() as usize])),
            );
        }
        for span in &mut spans {
            transition::normalize(span);
        }

        self.start = class[self.start as usize];
        self.accepting = accepting;
        self.transitions = spans;
        // Every state is reachable, so the start is live iff anything accepts.
        let start_live = self.accepting.contains(&true);
        self.record(Edit::Minimize { start_live });
        self.log_size("minimize");
        Ok(())
    }

    /// Equivalence class of every state, numbered in order of first appearance.
    fn refine(&self) -> Vec<StateId> {
        let n = self.state_count();
        let labels = self.labels();
        let k = labels.len();
        let label_index: HashMap<u32, usize> =
            labels.iter().enumerate().map(|(i, &l)| (l, i)).collect();

        // inv[j * k + a] = states with a transition labelled a into j
        let mut inv: Vec<Vec<StateId>> = vec![Vec::new(); n * k];
        for (s, span) in self.transitions.iter().enumerate() {
            for t in span {
                let a = label_index[&t.label()];
                inv[t.target() as usize * k + a].push(s as StateId);
            }
        }

        let (finals, others): (Vec<StateId>, Vec<StateId>) =
            (0..n as StateId).partition(|&s| self.accepting[s as usize]);
        let mut blocks: Vec<Vec<StateId>> = Vec::new();
        let mut find: Vec<usize> = vec![0; n];
        let mut in_worklist: Vec<bool> = Vec::new();
        let mut worklist: Vec<usize> = Vec::new();
        for block in [finals, others] {
            if block.is_empty() {
                continue;
            }
            let id = blocks.len();
            for &s in &block {
                find[s as usize] = id;
            }
            blocks.push(block);
            // Both halves start pending; partial automata need it.
            in_worklist.push(true);
            worklist.push(id);
        }

        let mut preimages: HashMap<usize, HashSet<StateId>> = HashMap::new();
        while let Some(a_id) = worklist.pop() {
            in_worklist[a_id] = false;
            let splitter = blocks[a_id].clone();
            for a in 0..k {
                preimages.clear();
                for &j in &splitter {
                    for &i in &inv[j as usize * k + a] {
                        preimages.entry(find[i as usize]).or_default().insert(i);
                    }
                }
                for (&y_id, x) in &preimages {
                    let y_len = blocks[y_id].len();
                    if x.len() == y_len {
                        continue;
                    }
                    let (yx, y_minus_x): (Vec<StateId>, Vec<StateId>) =
                        blocks[y_id].iter().copied().partition(|s| x.contains(s));
                    blocks[y_id] = yx;
                    let new_id = blocks.len();
                    for &s in &y_minus_x {
                        find[s as usize] = new_id;
                    }
                    blocks.push(y_minus_x);
                    in_worklist.push(false);

                    let pick = if in_worklist[y_id] || blocks[new_id].len() <= blocks[y_id].len() {
                        new_id
                    } else {
                        y_id
                    };
                    in_worklist[pick] = true;
                    worklist.push(pick);
                }
            }
        }

        let mut class_of_block = vec![StateId::MAX; blocks.len()];
        let mut next: StateId = 0;
        let mut class = vec![0; n];
        for s in 0..n {
            let b = find[s];
            if class_of_block[b] == StateId::MAX {
                class_of_block[b] = next;
                next += 1;
            }
            class[s] = class_of_block[b];
        }
        class
    }
}
