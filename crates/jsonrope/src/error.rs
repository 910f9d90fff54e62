//! Error types.

use thiserror::Error;

/// A recoverable failure surfaced by the JSON layer or a native function.
///
/// Allocation exhaustion is not represented here: it follows the global
/// allocator's abort semantics and never reaches callers as a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// `TypeError`-class failure: cyclic structure, non-callable callee.
    #[error("type error: {0}")]
    Type(String),
    /// JSON syntax error.
    #[error(transparent)]
    Syntax(#[from] ParseError),
}

/// A JSON parse failure: a short message plus up to seven code units of
/// source context taken from the failure point (stopping early at
/// whitespace).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} at offset {offset} near \"{context}\"")]
pub struct ParseError {
    /// What went wrong.
    pub message: &'static str,
    /// Source excerpt from the failure point; may be empty at end of input.
    pub context: String,
    /// Code unit offset of the failure in the input text.
    pub offset: usize,
}
