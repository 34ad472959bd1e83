// Symbol spelling conventions of the toolkits that write automaton files.

use std::fmt;
use std::str::FromStr;

use lexfst::FstError;
use lexfst::alphabet::{EPSILON, EPSILON_STR, IDENTITY, IDENTITY_STR, SymbolId, UNKNOWN, UNKNOWN_STR};

/// The toolkit a file was written by (or is written for).
///
/// Readers translate the producer's spellings of epsilon, the two wildcards
/// and the space into the engine's reserved symbols; writers translate back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Producer {
    /// HFST internal symbol names, as found in HFST binaries.
    HfstInternal,
    /// HFST's AT&T export, which spells epsilon `@0@`.
    HfstAtt,
    /// SFST. Has no wildcard spellings.
    Sfst,
    /// This engine's own reserved symbol strings.
    Native,
}

impl Producer {
    pub const ALL: [Producer; 4] = [
        Producer::HfstInternal,
        Producer::HfstAtt,
        Producer::Sfst,
        Producer::Native,
    ];

    pub fn epsilon(self) -> &'static str {
        match self {
            Producer::HfstInternal => "@_EPSILON_SYMBOL_@",
            Producer::HfstAtt => "@0@",
            Producer::Sfst => "<>",
            Producer::Native => EPSILON_STR,
        }
    }

    pub fn unknown(self) -> Option<&'static str> {
        match self {
            Producer::HfstInternal | Producer::HfstAtt => Some("@_UNKNOWN_SYMBOL_@"),
            Producer::Sfst => None,
            Producer::Native => Some(UNKNOWN_STR),
        }
    }

    pub fn identity(self) -> Option<&'static str> {
        match self {
            Producer::HfstInternal | Producer::HfstAtt => Some("@_IDENTITY_SYMBOL_@"),
            Producer::Sfst => None,
            Producer::Native => Some(IDENTITY_STR),
        }
    }

    pub fn space(self) -> &'static str {
        match self {
            Producer::HfstInternal | Producer::HfstAtt => "@_SPACE_@",
            Producer::Sfst | Producer::Native => " ",
        }
    }

    /// Translate a symbol as spelled in a file into the engine's spelling.
    pub fn to_internal(self, symbol: &str) -> &str {
        if symbol == self.epsilon() {
            EPSILON_STR
        } else if Some(symbol) == self.unknown() {
            UNKNOWN_STR
        } else if Some(symbol) == self.identity() {
            IDENTITY_STR
        } else if symbol == self.space() {
            " "
        } else {
            symbol
        }
    }

    /// Spell symbol `id` (whose engine spelling is `symbol`) for this producer.
    ///
    /// Fails when `id` is a wildcard the producer has no spelling for.
    pub fn spell<'a>(self, id: SymbolId, symbol: &'a str) -> Result<&'a str, FstError> {
        match id {
            EPSILON => Ok(self.epsilon()),
            IDENTITY => self.identity().ok_or_else(|| self.missing("identity")),
            UNKNOWN => self.unknown().ok_or_else(|| self.missing("unknown")),
            _ if symbol == " " => Ok(self.space()),
            _ => Ok(symbol),
        }
    }

    fn missing(self, what: &str) -> FstError {
        FstError::UnsupportedProducer(format!("{self} has no spelling for the {what} symbol"))
    }

    pub fn name(self) -> &'static str {
        match self {
            Producer::HfstInternal => "hfst",
            Producer::HfstAtt => "hfst-att",
            Producer::Sfst => "sfst",
            Producer::Native => "native",
        }
    }
}

impl fmt::Display for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Producer {
    type Err = FstError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Producer::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| FstError::UnsupportedProducer(s.to_string()))
    }
}
