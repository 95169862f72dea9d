use std::rc::Rc;

use eva::ast::{AssignTarget, BinOp, Callee, Node};
use eva::value::Value;
use eva::{environment, eval, EvaError};

fn lit(n: i64) -> Node {
    Node::Literal(Value::Int(n))
}

fn id(name: &str) -> Node {
    Node::Identifier(name.to_string())
}

fn var(name: &str, value: Node) -> Node {
    Node::VariableDeclaration { name: name.to_string(), value: Box::new(value) }
}

fn bin(op: BinOp, left: Node, right: Node) -> Node {
    Node::BinaryOperation { op, left: Box::new(left), right: Box::new(right) }
}

fn call(name: &str, args: Vec<Node>) -> Node {
    Node::FunctionCall { callee: Callee::Name(name.to_string()), args }
}

/// `{ var x = 10; var y = 20; x*y + 30 }` -> 230
#[test]
fn arithmetic_with_local_bindings() {
    let program = Node::Block(vec![
        var("x", lit(10)),
        var("y", lit(20)),
        bin(BinOp::Add, bin(BinOp::Mul, id("x"), id("y")), lit(30)),
    ]);
    assert_eq!(eval(&program, None), Ok(Value::Int(230)));
}

/// `{ var x = 10; { var x = 20; x }; x }` -> 10
#[test]
fn inner_declaration_shadows_without_mutating_outer() {
    let program = Node::Block(vec![
        var("x", lit(10)),
        Node::Block(vec![var("x", lit(20)), id("x")]),
        id("x"),
    ]);
    assert_eq!(eval(&program, None), Ok(Value::Int(10)));
}

/// `{ var data = 10; { set data 100 }; data }` -> 100
#[test]
fn assignment_in_nested_block_mutates_enclosing_scope() {
    let program = Node::Block(vec![
        var("data", lit(10)),
        Node::Block(vec![Node::Assignment {
            target: AssignTarget::Name("data".into()),
            value: Box::new(lit(100)),
        }]),
        id("data"),
    ]);
    assert_eq!(eval(&program, None), Ok(Value::Int(100)));
}

/// `{ def square(a){ a*a }; square(2) }` -> 4
#[test]
fn function_declaration_and_call() {
    let program = Node::Block(vec![
        Node::FunctionDeclaration {
            name: "square".into(),
            params: vec!["a".into()],
            body: Box::new(bin(BinOp::Mul, id("a"), id("a"))),
        },
        call("square", vec![lit(2)]),
    ]);
    assert_eq!(eval(&program, None), Ok(Value::Int(4)));
}

/// `{ var value=100; def calc(x,y){ var z=x+y; def inner(foo){ foo+z+value };
/// inner }; var fn = calc(10,20); fn(30) }` -> 160
#[test]
fn closure_captures_two_enclosing_scopes() {
    let calc_body = Node::Block(vec![
        var("z", bin(BinOp::Add, id("x"), id("y"))),
        Node::FunctionDeclaration {
            name: "inner".into(),
            params: vec!["foo".into()],
            body: Box::new(bin(BinOp::Add, bin(BinOp::Add, id("foo"), id("z")), id("value"))),
        },
        id("inner"),
    ]);
    let program = Node::Block(vec![
        var("value", lit(100)),
        Node::FunctionDeclaration {
            name: "calc".into(),
            params: vec!["x".into(), "y".into()],
            body: Box::new(calc_body),
        },
        var("fn", call("calc", vec![lit(10), lit(20)])),
        Node::FunctionCall { callee: Callee::Name("fn".into()), args: vec![lit(30)] },
    ]);
    assert_eq!(eval(&program, None), Ok(Value::Int(160)));
}

/// Point with a constructor and a method that reads both fields back.
/// `var p = new Point(10,20); p.calc(p)` -> 30
#[test]
fn class_constructor_and_method_dispatch() {
    let class_body = Node::Block(vec![
        Node::FunctionDeclaration {
            name: "constructor".into(),
            params: vec!["self".into(), "x".into(), "y".into()],
            body: Box::new(Node::Block(vec![
                Node::Assignment {
                    target: AssignTarget::Member { instance: "self".into(), member: "x".into() },
                    value: Box::new(id("x")),
                },
                Node::Assignment {
                    target: AssignTarget::Member { instance: "self".into(), member: "y".into() },
                    value: Box::new(id("y")),
                },
            ])),
        },
        Node::FunctionDeclaration {
            name: "calc".into(),
            params: vec!["self".into()],
            body: Box::new(bin(
                BinOp::Add,
                Node::MemberAccess { instance: "self".into(), member: "x".into() },
                Node::MemberAccess { instance: "self".into(), member: "y".into() },
            )),
        },
    ]);
    let program = Node::Block(vec![
        Node::ClassDeclaration {
            name: "Point".into(),
            parent: Box::new(Node::Literal(Value::Null)),
            body: Box::new(class_body),
        },
        var("p", Node::NewInstance { class_name: "Point".into(), args: vec![lit(10), lit(20)] }),
        Node::FunctionCall {
            callee: Callee::Member { instance: "p".into(), member: "calc".into() },
            args: vec![id("p")],
        },
    ]);
    assert_eq!(eval(&program, None), Ok(Value::Int(30)));
}

/// A subclass that only defines its own constructor still resolves a
/// method declared on the parent class, walking the `class_env` chain.
#[test]
fn subclass_inherits_parent_methods() {
    let point_body = Node::Block(vec![Node::FunctionDeclaration {
        name: "calc".into(),
        params: vec!["self".into()],
        body: Box::new(bin(
            BinOp::Add,
            Node::MemberAccess { instance: "self".into(), member: "x".into() },
            Node::MemberAccess { instance: "self".into(), member: "y".into() },
        )),
    }]);
    let point3d_body = Node::Block(vec![Node::FunctionDeclaration {
        name: "constructor".into(),
        params: vec!["self".into(), "x".into(), "y".into(), "z".into()],
        body: Box::new(Node::Block(vec![
            Node::Assignment {
                target: AssignTarget::Member { instance: "self".into(), member: "x".into() },
                value: Box::new(id("x")),
            },
            Node::Assignment {
                target: AssignTarget::Member { instance: "self".into(), member: "y".into() },
                value: Box::new(id("y")),
            },
            Node::Assignment {
                target: AssignTarget::Member { instance: "self".into(), member: "z".into() },
                value: Box::new(id("z")),
            },
        ])),
    }]);
    let program = Node::Block(vec![
        Node::ClassDeclaration {
            name: "Point".into(),
            parent: Box::new(Node::Literal(Value::Null)),
            body: Box::new(point_body),
        },
        Node::ClassDeclaration {
            name: "Point3D".into(),
            parent: Box::new(id("Point")),
            body: Box::new(point3d_body),
        },
        var(
            "p",
            Node::NewInstance { class_name: "Point3D".into(), args: vec![lit(1), lit(2), lit(3)] },
        ),
        // `calc` is only defined on Point; lookup must walk Point3D's
        // class_env up to Point's class_env to find it.
        Node::FunctionCall {
            callee: Callee::Member { instance: "p".into(), member: "calc".into() },
            args: vec![id("p")],
        },
    ]);
    assert_eq!(eval(&program, None), Ok(Value::Int(3)));
}

/// `{ var sum=0; for(var x=10; x>0; set x = x-1){ set sum = sum+1 }; sum }` -> 10
#[test]
fn for_loop_counts_down_to_zero() {
    let program = Node::Block(vec![
        var("sum", lit(0)),
        Node::ForLoop {
            init: Box::new(var("x", lit(10))),
            cond: Box::new(bin(BinOp::Gt, id("x"), lit(0))),
            step: Box::new(Node::Assignment {
                target: AssignTarget::Name("x".into()),
                value: Box::new(bin(BinOp::Sub, id("x"), lit(1))),
            }),
            body: Box::new(Node::Assignment {
                target: AssignTarget::Name("sum".into()),
                value: Box::new(bin(BinOp::Add, id("sum"), lit(1))),
            }),
        },
        id("sum"),
    ]);
    assert_eq!(eval(&program, None), Ok(Value::Int(10)));
}

/// `{ var x=20; select(when(x==10,100), when(x>10,200), any(300)) }` -> 200
#[test]
fn switch_picks_the_first_true_case() {
    let program = Node::Block(vec![
        var("x", lit(20)),
        Node::Switch(vec![
            (bin(BinOp::Eq, id("x"), lit(10)), lit(100)),
            (bin(BinOp::Gt, id("x"), lit(10)), lit(200)),
            (Node::Literal(Value::Bool(true)), lit(300)),
        ]),
    ]);
    assert_eq!(eval(&program, None), Ok(Value::Int(200)));
}

/// A switch whose trailing case is `any` never returns `Null`, even when
/// every earlier case is false.
#[test]
fn switch_with_catchall_never_returns_null() {
    let program = Node::Switch(vec![
        (Node::Literal(Value::Bool(false)), lit(1)),
        (Node::Literal(Value::Bool(false)), lit(2)),
        (Node::Literal(Value::Bool(true)), lit(300)),
    ]);
    assert_eq!(eval(&program, None), Ok(Value::Int(300)));
}

#[test]
fn undefined_name_surfaces_as_a_typed_error() {
    assert_eq!(
        eval(&id("nope"), None),
        Err(EvaError::UndefinedName("nope".into()))
    );
}

#[test]
fn global_environment_can_be_reused_across_evaluations() {
    let env = environment::global();
    env.define("shared", Value::Int(1));
    assert_eq!(eval(&id("shared"), Some(&env)), Ok(Value::Int(1)));
    eval(
        &Node::Assignment { target: AssignTarget::Name("shared".into()), value: Box::new(lit(2)) },
        Some(&env),
    )
    .unwrap();
    assert_eq!(env.lookup("shared"), Ok(Value::Int(2)));
    let _ = Rc::strong_count(&env);
}
