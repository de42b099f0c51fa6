//! The single error type surfaced by every fallible operation in this crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TdtError>;

/// Everything that can go wrong while selecting, tokenizing, evaluating
/// rules for, or emitting an EPC identifier. Every variant is fatal to the
/// current `translate` call; nothing here is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TdtError {
    #[error("no (scheme, level, option) matched identifier {identifier:?}")]
    NoMatch { identifier: String },

    #[error(
        "identifier {identifier:?} matched {count} options, expected exactly one: {candidates}"
    )]
    AmbiguousMatch {
        identifier: String,
        count: usize,
        candidates: String,
    },

    #[error("field {field:?} value {value:?} does not match character set /{charset}/")]
    InvalidCharacterSet {
        field: String,
        value: String,
        charset: String,
    },

    #[error("field {field:?} value {value} is below minimum {minimum}")]
    BelowMinimum {
        field: String,
        value: String,
        minimum: String,
    },

    #[error("field {field:?} value {value} is above maximum {maximum}")]
    AboveMaximum {
        field: String,
        value: String,
        maximum: String,
    },

    #[error("unsupported compaction width {0}, expected 5, 6, 7, or 8")]
    UnsupportedCompaction(u8),

    #[error("invalid binary string {0:?}: expected only '0'/'1' characters")]
    InvalidBinary(String),

    #[error("rule evaluator does not know table {0:?}")]
    TableNotFound(String),

    #[error("table {table:?} has no entry for key {key:?}")]
    MissingTableKey { table: String, key: String },

    #[error("substr({field:?}, {start}, {len:?}) is out of range for value {value:?}")]
    OutOfRange {
        field: String,
        start: i64,
        len: Option<i64>,
        value: String,
    },

    #[error("arithmetic error evaluating rule {rule:?}: {reason}")]
    ArithmeticError { rule: String, reason: String },

    #[error("rule tried to redefine existing field {0:?}")]
    DuplicateField(String),

    #[error("invalid scheme file: {0}")]
    InvalidSchemeFile(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error reading {path:?}: {reason}")]
    Io { path: String, reason: String },

    #[error("malformed XML in {path:?}: {reason}")]
    Xml { path: String, reason: String },
}
