use crate::{engine::Symbol, error::InputError};
use num_bigint::BigUint;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// A malformed line in a rule or configuration list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {reason}")]
pub struct ParseError {
    /// 1-based line number
    pub line: usize,
    pub reason: ParseReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseReason {
    #[error(transparent)]
    Rule(#[from] InputError),
    #[error("{0:?} is not a list of symbols")]
    Configuration(String),
}

/// A decoded value and the line it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<T> {
    pub line: usize,
    pub value: T,
}

/// Decodes line-oriented lists where every non-blank line is one record
///
/// Anything after a `#` is a comment.
pub trait RecordDecoder {
    type Item;

    fn decode_record(&self, text: &str) -> Result<Self::Item, ParseReason>;

    /// Decodes every record, keeping failures alongside successes
    fn records(&self, value: &str) -> Vec<Result<Record<Self::Item>, ParseError>> {
        value
            .lines()
            .enumerate()
            .filter_map(|(i, mut line)| {
                if let Some(comment) = line.find('#') {
                    line = &line[..comment];
                }
                let line_no = i + 1;
                let text = line.trim();
                if text.is_empty() {
                    return None;
                }
                Some(
                    self.decode_record(text)
                        .map(|value| Record {
                            line: line_no,
                            value,
                        })
                        .map_err(|reason| ParseError {
                            line: line_no,
                            reason,
                        }),
                )
            })
            .collect()
    }

    /// Decodes every record, failing on the first malformed one
    fn decode(&self, value: &str) -> Result<Vec<Self::Item>, ParseError> {
        self.records(value)
            .into_iter()
            .map(|record| record.map(|r| r.value))
            .collect()
    }
}

/// One non-negative decimal rule number per line
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleList;

impl RuleList {
    /// Parses a single rule number, rejecting negative values
    pub fn parse_rule(text: &str) -> Result<BigUint, InputError> {
        let text = text.trim();
        let digits = match text.strip_prefix('-') {
            Some(rest) if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) => {
                return Err(InputError::NegativeRuleNumber(text.to_owned()));
            }
            Some(_) => return Err(InputError::MalformedRuleNumber(text.to_owned())),
            None => text.strip_prefix('+').unwrap_or(text),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InputError::MalformedRuleNumber(text.to_owned()));
        }
        BigUint::parse_bytes(digits.as_bytes(), 10)
            .ok_or_else(|| InputError::MalformedRuleNumber(text.to_owned()))
    }
}

impl RecordDecoder for RuleList {
    type Item = BigUint;

    fn decode_record(&self, text: &str) -> Result<Self::Item, ParseReason> {
        Ok(Self::parse_rule(text)?)
    }
}

/// One bracketed list literal per line, e.g. `[0, 1, 0, 2]`
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigurationList;

impl ConfigurationList {
    fn list_pattern() -> &'static Regex {
        static CELL: OnceLock<Regex> = OnceLock::new();
        CELL.get_or_init(|| {
            Regex::new(r"^\[\s*(?:\d+\s*(?:,\s*\d+\s*)*,?\s*)?\]$")
                .expect("valid list pattern")
        })
    }
    fn symbol_pattern() -> &'static Regex {
        static CELL: OnceLock<Regex> = OnceLock::new();
        CELL.get_or_init(|| Regex::new(r"\d+").expect("valid symbol pattern"))
    }

    /// Writes a configuration in the same list form [`ConfigurationList`] reads
    pub fn encode(cells: &[Symbol]) -> String {
        let symbols: Vec<String> = cells.iter().map(Symbol::to_string).collect();
        format!("[{}]", symbols.join(", "))
    }
}

impl RecordDecoder for ConfigurationList {
    type Item = Vec<Symbol>;

    fn decode_record(&self, text: &str) -> Result<Self::Item, ParseReason> {
        let malformed = || ParseReason::Configuration(text.to_owned());
        if !Self::list_pattern().is_match(text) {
            return Err(malformed());
        }
        Self::symbol_pattern()
            .find_iter(text)
            .map(|m| m.as_str().parse::<Symbol>().map_err(|_| malformed()))
            .collect()
    }
}

/// A configuration as a row of digits, e.g. `"01021"`
pub fn encode_row(cells: &[Symbol]) -> String {
    cells.iter().map(Symbol::to_string).collect()
}
