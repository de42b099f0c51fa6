//! Tag Data Translation engine: selection, tokenization, rule evaluation, and
//! bit-level codecs for translating EPC identifiers between representations
//! within a single coding scheme.
//!
//! This crate is a pure library: it never touches a filesystem path or an
//! XML byte. Building a [`model::SchemeSet`] from scheme files is the job of
//! the `tdt-loader` crate; this crate only consumes the data model in
//! [`model`] and exposes [`engine::Engine`] as the single translation entry
//! point.

pub mod bits;
pub mod emitter;
pub mod engine;
pub mod errors;
pub mod hints;
pub mod model;
pub mod rules;
pub mod selector;
pub mod tokenizer;
pub mod validate;

pub use engine::Engine;
pub use errors::{Result, TdtError};
pub use hints::Hints;
pub use model::{CompanyPrefixTable, LevelType, SchemeSet};
