//! The AST node set.
//!
//! Nodes are produced by an external builder layer and consumed by
//! [`crate::eval`]. The evaluator never mutates a node, so re-evaluating
//! the same tree is always safe; `Node` derives `Clone` only because a
//! handful of desugaring rules (`ForLoop`, `Increment`/`Decrement`) need
//! to build a small equivalent subtree out of pieces of the one they
//! were given.

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Gt,
    Lt,
    Gte,
    Lte,
    Eq,
    Neq,
}

/// The left-hand side of an `Assignment`: either a plain name (`set x
/// ...`) or a member slot on an instance (`set (prop p field) ...`).
#[derive(Debug, Clone)]
pub enum AssignTarget {
    Name(String),
    Member { instance: String, member: String },
}

/// The callee of a `FunctionCall`: resolved by name, produced by an
/// arbitrary expression, or read off an instance's member table.
#[derive(Debug, Clone)]
pub enum Callee {
    Name(String),
    Expr(Box<Node>),
    Member { instance: String, member: String },
}

#[derive(Debug, Clone)]
pub enum Node {
    Literal(Value),
    Identifier(String),
    VariableDeclaration {
        name: String,
        value: Box<Node>,
    },
    Assignment {
        target: AssignTarget,
        value: Box<Node>,
    },
    BinaryOperation {
        op: BinOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Block(Vec<Node>),
    Condition {
        cond: Box<Node>,
        then: Box<Node>,
        otherwise: Box<Node>,
    },
    Loop {
        cond: Box<Node>,
        body: Box<Node>,
    },
    ForLoop {
        init: Box<Node>,
        cond: Box<Node>,
        step: Box<Node>,
        body: Box<Node>,
    },
    FunctionDeclaration {
        name: String,
        params: Vec<String>,
        body: Box<Node>,
    },
    Lambda {
        params: Vec<String>,
        body: Box<Node>,
    },
    FunctionCall {
        callee: Callee,
        args: Vec<Node>,
    },
    /// An ordered list of `(condition, body)` pairs. The fallthrough
    /// default case is encoded as a trailing pair whose condition always
    /// evaluates to `true`.
    Switch(Vec<(Node, Node)>),
    Increment(String),
    Decrement(String),
    ClassDeclaration {
        name: String,
        /// Evaluated to resolve the parent class; `Literal(Value::Null)`
        /// (or an identifier bound to `null`) means "no parent".
        parent: Box<Node>,
        /// Must be a `Block`; its statements populate the class
        /// environment directly rather than a nested child scope.
        body: Box<Node>,
    },
    NewInstance {
        class_name: String,
        args: Vec<Node>,
    },
    MemberAccess {
        instance: String,
        member: String,
    },
}
