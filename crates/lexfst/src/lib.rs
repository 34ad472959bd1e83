//! Finite-state transducer engine.
//!
//! This crate provides an editable automaton with a construction algebra
//! (determinization, minimization, products, repetition) and a frozen,
//! space-packed form for fast repeated application to strings.
//!
//! # Architecture
//!
//! - [`alphabet`] -- Symbol interning and multi-character prefix matching
//! - [`transition`] -- Packed 64-bit transition encoding
//! - [`iter`] -- State/transition iteration contract shared with file readers
//! - [`properties`] -- Lazy correctness flags and their invalidation table
//! - [`config`] -- Application limits (insertion bound, suffix bound, ignore symbols)
//! - [`apply`] -- Bounded nondeterministic search behind `apply` and `prefix_search`
//! - [`compact`] -- Immutable compact transducer
//! - [`mutable`] -- Mutable transducer and its construction algorithms

pub mod alphabet;
pub mod apply;
pub mod compact;
pub mod config;
pub mod iter;
pub mod mutable;
pub mod properties;
pub mod transition;

pub use alphabet::{Alphabet, SymbolId};
pub use apply::Applied;
pub use compact::CompactTransducer;
pub use config::ApplyConfig;
pub use iter::StateIterator;
pub use mutable::MutableTransducer;
pub use transition::{StateId, Transition};

/// Error type for automaton construction, reading and writing.
#[derive(Debug, thiserror::Error)]
pub enum FstError {
    #[error("alphabet capacity exceeded: at most {max} symbols fit a packed transition")]
    AlphabetCapacity { max: usize },
    #[error("state capacity exceeded: at most {max} states fit a packed transition")]
    StateCapacity { max: u64 },
    #[error("malformed input at {position}: {message}")]
    Format { position: usize, message: String },
    #[error("unsupported producer: {0}")]
    UnsupportedProducer(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl FstError {
    /// Shorthand for a [`FstError::Format`] at `position`.
    pub fn format(position: usize, message: impl Into<String>) -> Self {
        FstError::Format {
            position,
            message: message.into(),
        }
    }
}

/// Application contract shared by both automaton representations.
///
/// Implementors expose a sorted transition span per state; the search in
/// [`apply`] relies on that ordering for binary-search lookups by input symbol.
pub trait Transducer {
    /// The symbol table transitions refer to.
    fn alphabet(&self) -> &Alphabet;

    /// Id of the start state.
    fn start_state(&self) -> StateId;

    /// Whether `state` is accepting.
    fn is_accepting(&self, state: StateId) -> bool;

    /// All transitions leaving `state`, sorted by `(in, out, to)`.
    fn transitions(&self, state: StateId) -> &[Transition];

    /// Transitions leaving `state` with input symbol `input`.
    ///
    /// An absent symbol yields an empty slice.
    fn transitions_on(&self, state: StateId, input: SymbolId) -> &[Transition] {
        transition::input_range(self.transitions(state), input)
    }

    /// Apply the transducer to `input` with default limits.
    fn apply(&self, input: &str) -> Applied {
        apply::apply(self, input, &ApplyConfig::default())
    }

    /// Apply the transducer to `input` with explicit limits.
    fn apply_with(&self, input: &str, config: &ApplyConfig) -> Applied {
        apply::apply(self, input, config)
    }

    /// Enumerate accepted input strings starting with `prefix`, with default limits.
    fn prefix_search(&self, prefix: &str) -> Applied {
        apply::prefix_search(self, prefix, &ApplyConfig::default())
    }

    /// Enumerate accepted input strings starting with `prefix`, with explicit limits.
    fn prefix_search_with(&self, prefix: &str, config: &ApplyConfig) -> Applied {
        apply::prefix_search(self, prefix, config)
    }
}

/// Either representation of an automaton.
#[derive(Debug, Clone)]
pub enum Fst {
    Compact(CompactTransducer),
    Mutable(MutableTransducer),
}

impl Fst {
    /// Freeze into the compact form, consuming a mutable automaton.
    pub fn into_compact(self) -> CompactTransducer {
        match self {
            Fst::Compact(c) => c,
            Fst::Mutable(m) => m.make_compact(),
        }
    }

    /// Take an editable automaton, thawing a compact one.
    pub fn into_mutable(self) -> MutableTransducer {
        match self {
            Fst::Compact(c) => c.to_mutable(),
            Fst::Mutable(m) => m,
        }
    }

    /// Number of states.
    pub fn state_count(&self) -> usize {
        match self {
            Fst::Compact(c) => c.state_count(),
            Fst::Mutable(m) => m.state_count(),
        }
    }

    /// Number of transitions.
    pub fn transition_count(&self) -> usize {
        match self {
            Fst::Compact(c) => c.transition_count(),
            Fst::Mutable(m) => m.transition_count(),
        }
    }

    /// Iterate states and transitions of whichever representation is held.
    pub fn states(&self) -> Box<dyn StateIterator + '_> {
        match self {
            Fst::Compact(c) => Box::new(c.states()),
            Fst::Mutable(m) => Box::new(m.states()),
        }
    }
}

impl Transducer for Fst {
    fn alphabet(&self) -> &Alphabet {
        match self {
            Fst::Compact(c) => c.alphabet(),
            Fst::Mutable(m) => m.alphabet(),
        }
    }

    fn start_state(&self) -> StateId {
        match self {
            Fst::Compact(c) => c.start_state(),
            Fst::Mutable(m) => m.start_state(),
        }
    }

    fn is_accepting(&self, state: StateId) -> bool {
        match self {
            Fst::Compact(c) => c.is_accepting(state),
            Fst::Mutable(m) => m.is_accepting(state),
        }
    }

    fn transitions(&self, state: StateId) -> &[Transition] {
        match self {
            Fst::Compact(c) => c.transitions(state),
            Fst::Mutable(m) => m.transitions(state),
        }
    }
}

impl From<CompactTransducer> for Fst {
    fn from(c: CompactTransducer) -> Self {
        Fst::Compact(c)
    }
}

impl From<MutableTransducer> for Fst {
    fn from(m: MutableTransducer) -> Self {
        Fst::Mutable(m)
    }
}
