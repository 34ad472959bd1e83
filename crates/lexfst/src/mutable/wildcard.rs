// Alphabet growth with wildcard expansion, and alignment of two alphabets.

use std::borrow::Cow;

use super::MutableTransducer;
use crate::FstError;
use crate::alphabet::{EPSILON, IDENTITY, SymbolId, UNKNOWN, is_reserved};
use crate::properties::Edit;
use crate::transition::{self, Transition};

impl MutableTransducer {
    /// Add a literal symbol, making wildcard transitions cover it explicitly.
    ///
    /// Identity and unknown match only characters outside the alphabet, so a
    /// new literal would silently drop out of them. To keep the relation
    /// unchanged, every identity transition gains a copy transition for the
    /// new symbol, and every unknown transition gains the mappings of the new
    /// symbol to and from every other literal. Returns the existing id when
    /// the symbol is already present.
    pub fn add_symbol(&mut self, symbol: &str) -> Result<SymbolId, FstError> {
        if let Some(id) = self.alphabet.id_of(symbol) {
            return Ok(id);
        }
        let id = self.alphabet.intern(symbol)?;
        let others: Vec<SymbolId> = self.alphabet.literals().filter(|&s| s != id).collect();

        let mut added = false;
        for span in &mut self.transitions {
            let mut extra = Vec::new();
            for &t in span.iter() {
                expand(t, id, &others, &mut extra);
            }
            if !extra.is_empty() {
                added = true;
                span.extend(extra);
                transition::normalize(span);
            }
        }
        if added {
            self.record(Edit::AddTransition { epsilon: false });
        }
        Ok(id)
    }

    /// Bring both alphabets to the same symbol set.
    ///
    /// Symbols only `other` knows are added here through
    /// [`MutableTransducer::add_symbol`]; symbols only this automaton knows
    /// are added to a copy of `other`, which is returned. When nothing is
    /// missing on the other side, `other` is returned as is.
    pub(crate) fn align_with<'o>(
        &mut self,
        other: &'o MutableTransducer,
    ) -> Result<Cow<'o, MutableTransducer>, FstError> {
        for id in other.alphabet.literals() {
            self.add_symbol(other.alphabet.symbol(id))?;
        }
        let missing: Vec<&str> = self
            .alphabet
            .literals()
            .map(|id| self.alphabet.symbol(id))
            .filter(|s| !other.alphabet.contains(s))
            .collect();
        if missing.is_empty() {
            return Ok(Cow::Borrowed(other));
        }
        let mut copy = other.clone();
        for s in missing {
            copy.add_symbol(s)?;
        }
        Ok(Cow::Owned(copy))
    }
}

/// Explicit transitions for `new` implied by wildcard transition `t`.
fn expand(t: Transition, new: SymbolId, others: &[SymbolId], out: &mut Vec<Transition>) {
    let to = t.target();
    match (t.input(), t.output()) {
        (UNKNOWN, UNKNOWN) => {
            for &s in others {
                out.push(Transition::new(new, s, to));
                out.push(Transition::new(s, new, to));
            }
        }
        (IDENTITY | UNKNOWN, IDENTITY) | (IDENTITY, UNKNOWN) => {
            out.push(Transition::new(new, new, to));
        }
        (IDENTITY | UNKNOWN, o) => out.push(Transition::new(new, o, to)),
        (i, UNKNOWN) if i == EPSILON || !is_reserved(i) => out.push(Transition::new(i, new, to)),
        _ => {}
    }
}
