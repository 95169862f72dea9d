//! Structured evaluator errors.
//!
//! Every failure mode is a typed variant rather than a formatted string,
//! so callers can match on error kind instead of parsing messages.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvaError {
    #[error("undefined name: {0}")]
    UndefinedName(String),

    #[error("type mismatch in {op}: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
        op: &'static str,
    },

    #[error("arity mismatch: expected {expected} arguments, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("division by zero")]
    DivisionByZero,

    #[error("malformed node: {0}")]
    MalformedNode(&'static str),

    /// Raised when call nesting passes a fixed depth, so a runaway
    /// recursive program fails cleanly instead of overflowing the stack.
    #[error("recursion limit exceeded ({0} calls deep)")]
    RecursionLimit(usize),
}
