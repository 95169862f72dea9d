//! A tree-walking evaluator for a small dynamically-typed expression
//! language: literals, arithmetic and comparisons, lexically-scoped
//! blocks, conditionals, loops, first-class functions with closures, and
//! single-inheritance classes.
//!
//! This crate evaluates an AST built by an external caller; it does not
//! parse source text. Construct a [`ast::Node`] tree and pass it to
//! [`eval`].

pub mod ast;
pub mod environment;
pub mod error;
pub mod eval;
pub mod value;

pub use environment::{global, Environment};
pub use error::EvaError;
pub use eval::{eval, eval_or_null};
pub use value::Value;
