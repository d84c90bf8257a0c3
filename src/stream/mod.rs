//! Input mode classification (command prefix vs freeform memory).
//!
//! classify -> Classified { mode: Mode, argument }
//! Prefixes checked in fixed priority order at position 0 (case-sensitive):
//!   /ask /apikey /vault /help - anything else is a freeform memory.
//!
use std::fmt;

pub mod config;
pub mod dispatch;
pub mod filter;

/// Closed set of command intents a submission can carry.
///
/// Exactly one mode applies to any input; the dispatch site matches
/// exhaustively so a newly added prefix cannot fall through silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Freeform text, stored as a memory.
    None,
    /// `/ask` - question against the stored memories.
    Ask,
    /// `/apikey` - provider credential configuration.
    Configure,
    /// `/vault` - open the browse view, optionally filtered.
    Browse,
    /// `/help` - show the command reference.
    Help,
}

impl Mode {
    /// The literal prefix token for command modes (`None` has no prefix).
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            Mode::None => None,
            Mode::Ask => Some("/ask"),
            Mode::Configure => Some("/apikey"),
            Mode::Browse => Some("/vault"),
            Mode::Help => Some("/help"),
        }
    }

}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::None => "memory",
            Mode::Ask => "ask",
            Mode::Configure => "configure",
            Mode::Browse => "vault",
            Mode::Help => "help",
        };
        f.write_str(s)
    }
}

/// Result of classifying one raw input string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub mode: Mode,
    /// Mode-stripped argument. For command modes this is the text after the
    /// prefix with surrounding whitespace trimmed; for `Mode::None` it is
    /// the full original text, untrimmed (whitespace is significant for
    /// stored content).
    pub argument: String,
}

/// Classify raw input into a mode plus its argument text.
///
/// Pure function, re-evaluated on every submission. First matching prefix
/// wins; prefixes are distinct tokens so order only matters in principle.
pub fn classify(text: &str) -> Classified {
    const ORDER: [Mode; 4] = [Mode::Ask, Mode::Configure, Mode::Browse, Mode::Help];

    for mode in ORDER {
        if let Some(prefix) = mode.prefix()
            && let Some(rest) = text.strip_prefix(prefix)
        {
            return Classified {
                mode,
                argument: rest.trim().to_string(),
            };
        }
    }

    Classified {
        mode: Mode::None,
        argument: text.to_string(),
    }
}
