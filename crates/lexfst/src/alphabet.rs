// Symbol interning: string-to-id and id-to-string mapping with prefix lookup.

use crate::FstError;
use hashbrown::HashMap;

/// Dense symbol id. Packed transitions reserve 16 bits for each side.
pub type SymbolId = u16;

/// The empty symbol: consumes and produces nothing.
pub const EPSILON: SymbolId = 0;
/// Wildcard matching any character outside the alphabet and copying it to the output.
pub const IDENTITY: SymbolId = 1;
/// Wildcard matching any character outside the alphabet, output given by the transition.
pub const UNKNOWN: SymbolId = 2;

/// Internal spelling of [`EPSILON`].
pub const EPSILON_STR: &str = "\u{0}";
/// Internal spelling of [`IDENTITY`].
pub const IDENTITY_STR: &str = "\u{1}";
/// Internal spelling of [`UNKNOWN`].
pub const UNKNOWN_STR: &str = "\u{2}";

/// Number of reserved ids preceding the first literal.
pub const RESERVED_COUNT: usize = 3;

/// Upper bound on alphabet size imposed by the 16-bit symbol fields.
pub const MAX_SYMBOLS: usize = 1 << 16;

/// Append-only symbol table.
///
/// Ids `0..3` are always epsilon, identity and unknown; literals follow in
/// first-seen order. Literal lookup by first character backs
/// [`Alphabet::matching_prefixes`], which has to return every symbol that
/// prefixes the input at some offset (single characters as well as digraphs
/// and longer multi-character symbols).
#[derive(Debug, Clone)]
pub struct Alphabet {
    symbols: Vec<String>,
    ids: HashMap<String, SymbolId>,
    /// Literal ids grouped by their first character.
    by_first_char: HashMap<char, Vec<SymbolId>>,
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Alphabet {
    fn eq(&self, other: &Self) -> bool {
        self.symbols == other.symbols
    }
}

impl Eq for Alphabet {}

impl Alphabet {
    /// Create an alphabet holding only the reserved symbols.
    pub fn new() -> Self {
        let mut alphabet = Self {
            symbols: Vec::with_capacity(RESERVED_COUNT),
            ids: HashMap::new(),
            by_first_char: HashMap::new(),
        };
        for reserved in [EPSILON_STR, IDENTITY_STR, UNKNOWN_STR] {
            let id = alphabet.symbols.len() as SymbolId;
            alphabet.symbols.push(reserved.to_string());
            alphabet.ids.insert(reserved.to_string(), id);
        }
        alphabet
    }

    /// Build an alphabet from literal symbols, in order.
    pub fn from_symbols<I, S>(symbols: I) -> Result<Self, FstError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut alphabet = Self::new();
        for s in symbols {
            alphabet.intern(s.as_ref())?;
        }
        Ok(alphabet)
    }

    /// Return the id of `symbol`, adding it if absent.
    ///
    /// Fails only when the table already holds [`MAX_SYMBOLS`] entries.
    pub fn intern(&mut self, symbol: &str) -> Result<SymbolId, FstError> {
        if let Some(&id) = self.ids.get(symbol) {
            return Ok(id);
        }
        assert!(!symbol.is_empty(), "literal symbols must not be empty");
        if self.symbols.len() >= MAX_SYMBOLS {
            return Err(FstError::AlphabetCapacity { max: MAX_SYMBOLS });
        }
        let id = self.symbols.len() as SymbolId;
        self.symbols.push(symbol.to_string());
        self.ids.insert(symbol.to_string(), id);
        self.index_literal(symbol, id);
        Ok(id)
    }

    fn index_literal(&mut self, symbol: &str, id: SymbolId) {
        if let Some(first) = symbol.chars().next() {
            self.by_first_char.entry(first).or_default().push(id);
        }
    }

    /// Replace the spelling of an existing literal without changing its id.
    pub fn rename(&mut self, id: SymbolId, symbol: &str) {
        let idx = id as usize;
        assert!(idx >= RESERVED_COUNT, "reserved symbols cannot be renamed");
        assert!(!symbol.is_empty(), "literal symbols must not be empty");
        let old = std::mem::replace(&mut self.symbols[idx], symbol.to_string());
        self.ids.remove(&old);
        self.ids.insert(symbol.to_string(), id);
        if let Some(ids) = old.chars().next().and_then(|c| self.by_first_char.get_mut(&c)) {
            ids.retain(|&other| other != id);
        }
        self.index_literal(symbol, id);
    }

    /// The string for `id`. Panics on an id this table never issued.
    #[inline]
    pub fn symbol(&self, id: SymbolId) -> &str {
        &self.symbols[id as usize]
    }

    /// The id of `symbol`, if interned.
    #[inline]
    pub fn id_of(&self, symbol: &str) -> Option<SymbolId> {
        self.ids.get(symbol).copied()
    }

    #[inline]
    pub fn contains(&self, symbol: &str) -> bool {
        self.ids.contains_key(symbol)
    }

    /// Number of symbols, reserved ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True when no literal has been interned.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.len() == RESERVED_COUNT
    }

    /// Ids of all literal symbols, in id order.
    pub fn literals(&self) -> impl Iterator<Item = SymbolId> + '_ {
        (RESERVED_COUNT..self.symbols.len()).map(|i| i as SymbolId)
    }

    /// All symbol strings in id order, reserved ones first.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }

    /// Every literal symbol that is a prefix of `input[offset..]`.
    ///
    /// `offset` is a byte offset on a character boundary. The result is
    /// empty when `offset` is at or past the end.
    pub fn matching_prefixes(&self, input: &str, offset: usize) -> Vec<SymbolId> {
        let Some(rest) = input.get(offset..) else {
            return Vec::new();
        };
        let Some(first) = rest.chars().next() else {
            return Vec::new();
        };
        match self.by_first_char.get(&first) {
            Some(ids) => ids
                .iter()
                .copied()
                .filter(|&id| rest.starts_with(self.symbol(id)))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Whether `id` is one of the reserved symbols.
#[inline]
pub fn is_reserved(id: SymbolId) -> bool {
    (id as usize) < RESERVED_COUNT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_ids_are_fixed() {
        let a = Alphabet::new();
        assert_eq!(a.len(), 3);
        assert!(a.is_empty());
        assert_eq!(a.id_of(EPSILON_STR), Some(EPSILON));
        assert_eq!(a.id_of(IDENTITY_STR), Some(IDENTITY));
        assert_eq!(a.id_of(UNKNOWN_STR), Some(UNKNOWN));
    }

    #[test]
    fn intern_is_idempotent_and_dense() {
        let mut a = Alphabet::new();
        assert_eq!(a.intern("a").unwrap(), 3);
        assert_eq!(a.intern("ch").unwrap(), 4);
        assert_eq!(a.intern("a").unwrap(), 3);
        assert_eq!(a.len(), 5);
        assert_eq!(a.symbol(4), "ch");
        assert!(a.contains("ch"));
        assert!(!a.contains("c"));
    }

    #[test]
    fn matching_prefixes_returns_all_multichar_matches() {
        let a = Alphabet::from_symbols(["c", "ch", "chr", "h", "x"]).unwrap();
        let mut found: Vec<&str> = a
            .matching_prefixes("achrx", 1)
            .into_iter()
            .map(|id| a.symbol(id))
            .collect();
        found.sort();
        assert_eq!(found, vec!["c", "ch", "chr"]);
        assert!(a.matching_prefixes("achrx", 5).is_empty());
        assert!(a.matching_prefixes("q", 0).is_empty());
    }

    #[test]
    fn matching_prefixes_handles_multibyte_offsets() {
        let a = Alphabet::from_symbols(["ä", "äö"]).unwrap();
        let ids = a.matching_prefixes("aäö", 1);
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn rename_keeps_id() {
        let mut a = Alphabet::from_symbols(["x"]).unwrap();
        a.rename(3, "y");
        assert_eq!(a.id_of("y"), Some(3));
        assert_eq!(a.id_of("x"), None);
        assert_eq!(a.matching_prefixes("y", 0), vec![3]);
        assert!(a.matching_prefixes("x", 0).is_empty());
    }

    #[test]
    fn capacity_is_enforced() {
        let mut a = Alphabet::new();
        for i in 0..(MAX_SYMBOLS - RESERVED_COUNT) {
            a.intern(&format!("s{i}")).unwrap();
        }
        assert_eq!(a.len(), MAX_SYMBOLS);
        assert!(a.intern("s0").is_ok());
        assert!(matches!(
            a.intern("overflow"),
            Err(FstError::AlphabetCapacity { max: 65536 })
        ));
    }
}
