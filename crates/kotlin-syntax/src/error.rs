//! Parse error types.

use thiserror::Error;

/// An error producing a syntax tree.
///
/// These cover failures of the parser itself, not syntax errors in the
/// analyzed source; erroneous source still parses into a tree with error
/// nodes.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// The Kotlin grammar could not be loaded into the parser.
    #[error("kotlin grammar unavailable: {0}")]
    Grammar(String),

    /// The parser returned no tree (cancellation or timeout).
    #[error("parse was cancelled before producing a tree")]
    Cancelled,
}
