// Lazy correctness flags and the table of which edits invalidate them.

/// Facts known to hold for a mutable automaton.
///
/// A set flag lets an algorithm skip its pass; a cleared flag only means
/// "not known", never "known false". Every mutation reports an [`Edit`]
/// and [`Properties::record`] is the single place that decides what survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Properties {
    bits: u8,
}

impl Properties {
    /// No `epsilon:epsilon` transitions.
    pub const EPSILON_FREE: u8 = 0x01;
    /// No two transitions of a state share an `(input, output)` pair, and
    /// no epsilon transitions.
    pub const DETERMINISTIC: u8 = 0x02;
    /// Every state is reachable from the start state.
    pub const NO_UNREACHABLE: u8 = 0x04;
    /// Every state can reach an accepting state.
    pub const NO_TRAPS: u8 = 0x08;
    /// Deterministic, trimmed and with no two equivalent states.
    pub const MINIMAL: u8 = 0x10;

    const ALL: u8 = 0x1F;

    pub const fn empty() -> Self {
        Properties { bits: 0 }
    }

    pub const fn from_bits(bits: u8) -> Self {
        Properties {
            bits: bits & Self::ALL,
        }
    }

    #[inline]
    pub const fn contains(self, flag: u8) -> bool {
        self.bits & flag == flag
    }

    #[inline]
    pub fn set(&mut self, flag: u8) {
        self.bits |= flag;
    }

    #[inline]
    pub fn clear(&mut self, flag: u8) {
        self.bits &= !flag;
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.bits
    }

    /// Update the flags after `edit`.
    ///
    /// | edit                       | cleared                                   | established                |
    /// |----------------------------|-------------------------------------------|----------------------------|
    /// | `AddState { accepting }`   | no-unreachable, minimal, no-traps (if not accepting) | -               |
    /// | `AddTransition { epsilon }`| deterministic, minimal, epsilon-free (if epsilon) | -                  |
    /// | `SetAccepting(true)`       | minimal                                    | -                          |
    /// | `SetAccepting(false)`      | minimal, no-traps                          | -                          |
    /// | `RemoveEpsilons`           | deterministic, minimal, no-unreachable     | epsilon-free               |
    /// | `Determinize`              | minimal                                    | epsilon-free, deterministic, no-unreachable |
    /// | `DropUnreachable`          | -                                          | no-unreachable             |
    /// | `DropTraps { start_live }` | -                                          | no-traps (if start live)   |
    /// | `Minimize { start_live }`  | -                                          | all, no-traps only if start live |
    /// | `Relabel`                  | deterministic, minimal, epsilon-free       | -                          |
    /// | `Invert`                   | -                                          | -                          |
    /// | `Reverse`                  | see [`Properties::reversed`]               |                            |
    /// | `Combine`                  | all                                        | -                          |
    /// | `EmptyString`              | -                                          | all                        |
    pub fn record(&mut self, edit: Edit) {
        match edit {
            Edit::AddState { accepting } => {
                self.clear(Self::NO_UNREACHABLE | Self::MINIMAL);
                if !accepting {
                    self.clear(Self::NO_TRAPS);
                }
            }
            Edit::AddTransition { epsilon } => {
                self.clear(Self::DETERMINISTIC | Self::MINIMAL);
                if epsilon {
                    self.clear(Self::EPSILON_FREE);
                }
            }
            Edit::SetAccepting(true) => self.clear(Self::MINIMAL),
            Edit::SetAccepting(false) => self.clear(Self::MINIMAL | Self::NO_TRAPS),
            Edit::RemoveEpsilons => {
                self.clear(Self::DETERMINISTIC | Self::MINIMAL | Self::NO_UNREACHABLE);
                self.set(Self::EPSILON_FREE);
            }
            Edit::Determinize => {
                self.clear(Self::MINIMAL);
                self.set(Self::EPSILON_FREE | Self::DETERMINISTIC | Self::NO_UNREACHABLE);
            }
            Edit::DropUnreachable => self.set(Self::NO_UNREACHABLE),
            Edit::DropTraps { start_live } => {
                if start_live {
                    self.set(Self::NO_TRAPS);
                }
            }
            Edit::Minimize { start_live } => {
                self.set(Self::ALL);
                if !start_live {
                    self.clear(Self::NO_TRAPS);
                }
            }
            Edit::EmptyString => self.set(Self::ALL),
            Edit::Relabel => self.clear(Self::DETERMINISTIC | Self::MINIMAL | Self::EPSILON_FREE),
            Edit::Invert => {}
            Edit::Reverse { had_accepting } => *self = self.reversed(had_accepting),
            Edit::Combine => *self = Self::empty(),
        }
    }

    /// Flags of the reversed automaton.
    ///
    /// States unreachable in one direction are exactly the traps of the other,
    /// so the two reachability flags swap. The added start state is a trap
    /// only when nothing was accepting.
    pub fn reversed(self, had_accepting: bool) -> Self {
        let mut out = Self::empty();
        if self.contains(Self::NO_TRAPS) {
            out.set(Self::NO_UNREACHABLE);
        }
        if self.contains(Self::NO_UNREACHABLE) && had_accepting {
            out.set(Self::NO_TRAPS);
        }
        if !had_accepting && self.contains(Self::EPSILON_FREE) {
            out.set(Self::EPSILON_FREE);
        }
        out
    }
}

/// Mutations that affect [`Properties`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    AddState { accepting: bool },
    AddTransition { epsilon: bool },
    SetAccepting(bool),
    RemoveEpsilons,
    Determinize,
    DropUnreachable,
    /// Traps removed. The start state is kept even when it is one, in which
    /// case `start_live` is false and the language is empty.
    DropTraps { start_live: bool },
    Minimize { start_live: bool },
    /// Labels rewritten (projection, wildcard expansion).
    Relabel,
    /// Input and output swapped.
    Invert,
    Reverse { had_accepting: bool },
    /// Graph restructured: another automaton merged in (concat, union,
    /// products, complement, repeat) or the start state moved.
    Combine,
    /// Replaced by the automaton accepting only the empty string.
    EmptyString,
}
