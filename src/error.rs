use thiserror::Error;

use crate::grid::Pos;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed map at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("line {line} should have exactly one opening, found {found}")]
    Openings { line: usize, found: usize },

    #[error("map has no interior")]
    TooSmall,

    #[error("{states} time-expanded states exceed the limit of {limit}")]
    TooLarge { states: usize, limit: usize },

    #[error("no path from {from} to {to} departing at minute {depart}")]
    Unreachable { from: Pos, to: Pos, depart: usize },

    #[error("search gave up after {limit} expansions")]
    BudgetExhausted { limit: usize },

    #[error("{0}")]
    Usage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
