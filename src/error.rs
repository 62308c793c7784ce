//! Error types for the automaton core.

use crate::engine::Alphabet;
use thiserror::Error;

/// Shorthand for results produced by the core.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported to the caller of [`Automaton::run`](crate::Automaton::run).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The inputs were rejected before any step was computed.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),

    /// A neighborhood with no entry in the rule table was met mid-run.
    #[error("no rule table entry for neighborhood {key:?} at cell {cell}")]
    InvalidSymbol {
        /// Index of the cell whose neighborhood was looked up.
        cell: usize,
        /// The neighborhood as a digit string.
        key: String,
    },
}

/// Reasons an invocation is refused at the `Ready` transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Rule numbers are non-negative integers.
    #[error("rule number {0} is negative")]
    NegativeRuleNumber(String),

    /// The text is not a decimal integer at all.
    #[error("rule number {0:?} is not an integer")]
    MalformedRuleNumber(String),

    /// A lattice needs at least one cell.
    #[error("initial configuration is empty")]
    EmptyConfiguration,

    /// A cell holds a symbol the rule's alphabet does not have.
    #[error("symbol {symbol} at cell {index} is outside the {alphabet} alphabet")]
    SymbolOutOfAlphabet {
        index: usize,
        symbol: u8,
        alphabet: Alphabet,
    },
}
