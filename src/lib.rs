//! Core library for one-dimensional binary and ternary cellular automata.

pub mod enc;
pub mod engine;
pub mod error;

pub use enc::{ConfigurationList, RuleList};
pub use engine::{
    Alphabet, Automaton, Generation, Generations, Observer, RuleTable, State, StepCallback,
    Symbol, build_rule_table, run,
};
pub use error::{Error, InputError, Result};
