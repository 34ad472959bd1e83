// Application limits for apply / prefix_search.

/// Default bound on consecutive epsilon moves between consumed symbols.
pub const DEFAULT_MAX_INSERTIONS: usize = 15;

/// Default bound on the number of steps taken past the end of a search prefix.
pub const DEFAULT_MAX_SUFFIX: usize = 100;

/// Limits and options for the search behind [`Transducer::apply`] and
/// [`Transducer::prefix_search`].
///
/// Both bounds exist to guarantee termination on epsilon cycles and on
/// unbounded accepting continuations. Hitting either one marks the result
/// as truncated.
///
/// [`Transducer::apply`]: crate::Transducer::apply
/// [`Transducer::prefix_search`]: crate::Transducer::prefix_search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyConfig {
    /// Epsilon moves allowed before the next consumed symbol.
    pub max_insertions: usize,
    /// Positions visited at or past the end of the prefix in a prefix search.
    pub max_suffix: usize,
    /// Symbols whose transitions are followed without consuming input.
    pub ignore: Vec<String>,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplyConfig {
    pub fn new() -> Self {
        Self {
            max_insertions: DEFAULT_MAX_INSERTIONS,
            max_suffix: DEFAULT_MAX_SUFFIX,
            ignore: Vec::new(),
        }
    }

    pub fn with_max_insertions(mut self, max_insertions: usize) -> Self {
        self.max_insertions = max_insertions;
        self
    }

    pub fn with_max_suffix(mut self, max_suffix: usize) -> Self {
        self.max_suffix = max_suffix;
        self
    }

    /// Add a symbol to follow without consuming input.
    pub fn with_ignored(mut self, symbol: impl Into<String>) -> Self {
        self.ignore.push(symbol.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ApplyConfig::default();
        assert_eq!(c.max_insertions, 15);
        assert_eq!(c.max_suffix, 100);
        assert!(c.ignore.is_empty());
    }

    #[test]
    fn builder_setters() {
        let c = ApplyConfig::new()
            .with_max_insertions(3)
            .with_max_suffix(7)
            .with_ignored("#");
        assert_eq!(c.max_insertions, 3);
        assert_eq!(c.max_suffix, 7);
        assert_eq!(c.ignore, vec!["#".to_string()]);
    }
}
