//! The evaluator: per-node dispatch over the AST.
//!
//! Dispatch is a single `match` over [`Node`], with one private helper
//! function per node variant.

use std::rc::Rc;

use tracing::trace;

use crate::ast::{AssignTarget, BinOp, Callee, Node};
use crate::environment::{self, Environment};
use crate::error::EvaError;
use crate::value::{ClassValue, FunctionValue, InstanceValue, Value};

/// Guards against unbounded call recursion in untrusted ASTs.
const MAX_CALL_DEPTH: usize = 512;

/// Evaluates `node`, using `env` if given or a freshly seeded global
/// environment otherwise.
pub fn eval(node: &Node, env: Option<&Rc<Environment>>) -> Result<Value, EvaError> {
    let fallback;
    let env = match env {
        Some(env) => env,
        None => {
            fallback = environment::global();
            &fallback
        }
    };
    eval_node(node, env, 0)
}

/// Logs the error to stderr and returns `Null` instead of propagating it.
/// Prefer [`eval`] for normal library use; this exists for callers that
/// want a print-and-swallow evaluation loop.
pub fn eval_or_null(node: &Node, env: Option<&Rc<Environment>>) -> Value {
    match eval(node, env) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("Error evaluating expression:\n- {err}");
            Value::Null
        }
    }
}

fn eval_node(node: &Node, env: &Rc<Environment>, depth: usize) -> Result<Value, EvaError> {
    match node {
        Node::Literal(value) => Ok(value.clone()),
        Node::Identifier(name) => env.lookup(name),
        Node::VariableDeclaration { name, value } => {
            let value = eval_node(value, env, depth)?;
            Ok(env.define(name.clone(), value))
        }
        Node::Assignment { target, value } => eval_assignment(target, value, env, depth),
        Node::BinaryOperation { op, left, right } => eval_binary_operation(*op, left, right, env, depth),
        Node::Block(exprs) => eval_block(exprs, env, depth),
        Node::Condition { cond, then, otherwise } => eval_condition(cond, then, otherwise, env, depth),
        Node::Loop { cond, body } => eval_loop(cond, body, env, depth),
        Node::ForLoop { init, cond, step, body } => eval_for_loop(init, cond, step, body, env, depth),
        Node::FunctionDeclaration { name, params, body } => {
            eval_function_declaration(name, params, body, env)
        }
        Node::Lambda { params, body } => Ok(eval_lambda(params, body, env)),
        Node::FunctionCall { callee, args } => eval_function_call(callee, args, env, depth),
        Node::Switch(cases) => eval_switch(cases, env, depth),
        Node::Increment(name) => eval_increment(name, env, depth),
        Node::Decrement(name) => eval_decrement(name, env, depth),
        Node::ClassDeclaration { name, parent, body } => eval_class_declaration(name, parent, body, env, depth),
        Node::NewInstance { class_name, args } => eval_new_instance(class_name, args, env, depth),
        Node::MemberAccess { instance, member } => eval_member_access(instance, member, env),
    }
}

fn as_int(value: Value, op: &'static str) -> Result<i64, EvaError> {
    match value {
        Value::Int(n) => Ok(n),
        other => Err(EvaError::TypeMismatch {
            expected: "Int",
            actual: other.type_name(),
            op,
        }),
    }
}

fn as_bool(value: Value, op: &'static str) -> Result<bool, EvaError> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(EvaError::TypeMismatch {
            expected: "Bool",
            actual: other.type_name(),
            op,
        }),
    }
}

fn as_function(value: Value, op: &'static str) -> Result<Rc<FunctionValue>, EvaError> {
    match value {
        Value::Function(f) => Ok(f),
        other => Err(EvaError::TypeMismatch {
            expected: "Function",
            actual: other.type_name(),
            op,
        }),
    }
}

fn as_class(value: Value, op: &'static str) -> Result<Rc<ClassValue>, EvaError> {
    match value {
        Value::Class(c) => Ok(c),
        other => Err(EvaError::TypeMismatch {
            expected: "Class",
            actual: other.type_name(),
            op,
        }),
    }
}

fn as_instance(value: Value, op: &'static str) -> Result<Rc<InstanceValue>, EvaError> {
    match value {
        Value::Instance(i) => Ok(i),
        other => Err(EvaError::TypeMismatch {
            expected: "Instance",
            actual: other.type_name(),
            op,
        }),
    }
}

fn eval_assignment(
    target: &AssignTarget,
    value: &Node,
    env: &Rc<Environment>,
    depth: usize,
) -> Result<Value, EvaError> {
    match target {
        AssignTarget::Name(name) => {
            let value = eval_node(value, env, depth)?;
            env.assign(name, value)
        }
        AssignTarget::Member { instance, member } => {
            let instance_val = env.lookup(instance)?;
            let instance = as_instance(instance_val, "member assignment")?;
            let value = eval_node(value, env, depth)?;
            // Member assignment uses define semantics: it creates the
            // field if it doesn't already exist on the instance.
            Ok(instance.instance_env.define(member.clone(), value))
        }
    }
}

fn eval_binary_operation(
    op: BinOp,
    left: &Node,
    right: &Node,
    env: &Rc<Environment>,
    depth: usize,
) -> Result<Value, EvaError> {
    let op_name = binop_name(op);
    let lhs = as_int(eval_node(left, env, depth)?, op_name)?;
    let rhs = as_int(eval_node(right, env, depth)?, op_name)?;
    match op {
        BinOp::Add => Ok(Value::Int(lhs + rhs)),
        BinOp::Sub => Ok(Value::Int(lhs - rhs)),
        BinOp::Mul => Ok(Value::Int(lhs * rhs)),
        BinOp::Div => {
            if rhs == 0 {
                Err(EvaError::DivisionByZero)
            } else {
                Ok(Value::Int(lhs / rhs))
            }
        }
        BinOp::Mod => {
            if rhs == 0 {
                Err(EvaError::DivisionByZero)
            } else {
                Ok(Value::Int(lhs % rhs))
            }
        }
        BinOp::Gt => Ok(Value::Bool(lhs > rhs)),
        BinOp::Lt => Ok(Value::Bool(lhs < rhs)),
        BinOp::Gte => Ok(Value::Bool(lhs >= rhs)),
        BinOp::Lte => Ok(Value::Bool(lhs <= rhs)),
        BinOp::Eq => Ok(Value::Bool(lhs == rhs)),
        BinOp::Neq => Ok(Value::Bool(lhs != rhs)),
    }
}

fn binop_name(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "addition",
        BinOp::Sub => "subtraction",
        BinOp::Mul => "multiplication",
        BinOp::Div => "division",
        BinOp::Mod => "modulo",
        BinOp::Gt => "greater-than",
        BinOp::Lt => "less-than",
        BinOp::Gte => "greater-or-equal",
        BinOp::Lte => "less-or-equal",
        BinOp::Eq => "equality",
        BinOp::Neq => "inequality",
    }
}

fn eval_block(exprs: &[Node], env: &Rc<Environment>, depth: usize) -> Result<Value, EvaError> {
    let block_env = Environment::extend(env);
    trace!(len = exprs.len(), "entering block scope");
    eval_sequence(exprs, &block_env, depth)
}

/// Evaluates `exprs` in `env` without creating a new scope. Used both by
/// ordinary blocks (after they push a fresh env) and by class bodies
/// (which populate the class env directly).
fn eval_sequence(exprs: &[Node], env: &Rc<Environment>, depth: usize) -> Result<Value, EvaError> {
    let mut result = Value::Null;
    for expr in exprs {
        result = eval_node(expr, env, depth)?;
    }
    Ok(result)
}

fn eval_condition(
    cond: &Node,
    then: &Node,
    otherwise: &Node,
    env: &Rc<Environment>,
    depth: usize,
) -> Result<Value, EvaError> {
    if as_bool(eval_node(cond, env, depth)?, "condition")? {
        eval_node(then, env, depth)
    } else {
        eval_node(otherwise, env, depth)
    }
}

fn eval_loop(cond: &Node, body: &Node, env: &Rc<Environment>, depth: usize) -> Result<Value, EvaError> {
    let mut result = Value::Null;
    while as_bool(eval_node(cond, env, depth)?, "loop condition")? {
        result = eval_node(body, env, depth)?;
    }
    Ok(result)
}

fn eval_for_loop(
    init: &Node,
    cond: &Node,
    step: &Node,
    body: &Node,
    env: &Rc<Environment>,
    depth: usize,
) -> Result<Value, EvaError> {
    eval_node(init, env, depth)?;
    // Equivalent to a while loop over a block of [body, step], built
    // once up front rather than re-evaluated per iteration.
    let loop_body = Node::Block(vec![body.clone(), step.clone()]);
    eval_loop(cond, &loop_body, env, depth)
}

fn eval_function_declaration(
    name: &str,
    params: &[String],
    body: &Node,
    env: &Rc<Environment>,
) -> Result<Value, EvaError> {
    // Sugar for a variable declaration binding a lambda: same
    // construction as `eval_lambda`, just also given a name to bind.
    let function = eval_lambda(params, body, env);
    Ok(env.define(name.to_string(), function))
}

fn eval_lambda(params: &[String], body: &Node, env: &Rc<Environment>) -> Value {
    Value::Function(Rc::new(FunctionValue {
        name: String::new(),
        params: params.to_vec(),
        body: body.clone(),
        captured_env: Rc::clone(env),
    }))
}

fn eval_function_call(
    callee: &Callee,
    args: &[Node],
    env: &Rc<Environment>,
    depth: usize,
) -> Result<Value, EvaError> {
    let function = match callee {
        Callee::Name(name) => as_function(env.lookup(name)?, "call")?,
        Callee::Expr(expr) => as_function(eval_node(expr, env, depth)?, "call")?,
        Callee::Member { instance, member } => {
            as_function(eval_member_access(instance, member, env)?, "method call")?
        }
    };

    if depth + 1 > MAX_CALL_DEPTH {
        return Err(EvaError::RecursionLimit(depth + 1));
    }

    // Arguments are evaluated in the caller's env, left to right, before
    // the callee's own env is built.
    let arg_values: Vec<Value> = args
        .iter()
        .map(|arg| eval_node(arg, env, depth))
        .collect::<Result<_, _>>()?;

    if arg_values.len() < function.params.len() {
        return Err(EvaError::ArityMismatch {
            expected: function.params.len(),
            actual: arg_values.len(),
        });
    }

    // Parented by the captured env, not the caller's env: this is what
    // gives closures lexical rather than dynamic scoping.
    let call_env = Environment::extend(&function.captured_env);
    for (param, value) in function.params.iter().zip(arg_values) {
        call_env.define(param.clone(), value);
    }

    trace!(name = %function.name, "calling function");
    eval_node(&function.body, &call_env, depth + 1)
}

fn eval_switch(cases: &[(Node, Node)], env: &Rc<Environment>, depth: usize) -> Result<Value, EvaError> {
    for (cond, body) in cases {
        if as_bool(eval_node(cond, env, depth)?, "switch case")? {
            return eval_node(body, env, depth);
        }
    }
    Ok(Value::Null)
}

fn eval_increment(name: &str, env: &Rc<Environment>, depth: usize) -> Result<Value, EvaError> {
    eval_node(&increment_desugar(name, BinOp::Add), env, depth)
}

fn eval_decrement(name: &str, env: &Rc<Environment>, depth: usize) -> Result<Value, EvaError> {
    eval_node(&increment_desugar(name, BinOp::Sub), env, depth)
}

/// `Increment`/`Decrement` are sugar for an assignment of a binary
/// operation over the current value and the literal `1`.
fn increment_desugar(name: &str, op: BinOp) -> Node {
    Node::Assignment {
        target: AssignTarget::Name(name.to_string()),
        value: Box::new(Node::BinaryOperation {
            op,
            left: Box::new(Node::Identifier(name.to_string())),
            right: Box::new(Node::Literal(Value::Int(1))),
        }),
    }
}

fn eval_class_declaration(
    name: &str,
    parent: &Node,
    body: &Node,
    env: &Rc<Environment>,
    depth: usize,
) -> Result<Value, EvaError> {
    let parent_env = match eval_node(parent, env, depth)? {
        Value::Class(class) => Rc::clone(&class.class_env),
        _ => Rc::clone(env),
    };

    let class_env = Environment::extend(&parent_env);
    let exprs = match body {
        Node::Block(exprs) => exprs,
        _ => return Err(EvaError::MalformedNode("ClassDeclaration body must be a Block")),
    };
    // The class body evaluates directly in class_env: it IS the class's
    // scope, not an additional nested one.
    eval_sequence(exprs, &class_env, depth)?;

    trace!(name, "declaring class");
    env.define(
        name.to_string(),
        Value::Class(Rc::new(ClassValue {
            name: name.to_string(),
            class_env,
        })),
    );
    Ok(Value::Null)
}

fn eval_new_instance(
    class_name: &str,
    args: &[Node],
    env: &Rc<Environment>,
    depth: usize,
) -> Result<Value, EvaError> {
    let class = as_class(env.lookup(class_name)?, "new")?;
    let instance_env = Environment::extend(&class.class_env);
    let instance = Rc::new(InstanceValue {
        instance_env: Rc::clone(&instance_env),
    });

    let constructor = as_function(class.class_env.lookup("constructor")?, "constructor")?;

    if depth + 1 > MAX_CALL_DEPTH {
        return Err(EvaError::RecursionLimit(depth + 1));
    }

    let constructor_env = Environment::extend(&constructor.captured_env);
    constructor_env.define("self", Value::Instance(Rc::clone(&instance)));

    // params[0] is the implicit `self` slot; remaining params bind the
    // evaluated call arguments.
    let remaining_params = constructor.params.get(1..).unwrap_or_default();
    if args.len() < remaining_params.len() {
        return Err(EvaError::ArityMismatch {
            expected: remaining_params.len(),
            actual: args.len(),
        });
    }
    for (param, arg) in remaining_params.iter().zip(args) {
        let value = eval_node(arg, env, depth)?;
        constructor_env.define(param.clone(), value);
    }

    trace!(class = class_name, "constructing instance");
    eval_node(&constructor.body, &constructor_env, depth + 1)?;

    Ok(Value::Instance(instance))
}

fn eval_member_access(instance: &str, member: &str, env: &Rc<Environment>) -> Result<Value, EvaError> {
    let instance = as_instance(env.lookup(instance)?, "member access")?;
    instance.instance_env.lookup(member)
}
