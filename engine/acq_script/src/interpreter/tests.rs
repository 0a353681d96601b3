#![allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

use std::any::Any;

use super::*;
use crate::lexer::lex;
use crate::parser::Parser;
use crate::value::HostObject;
use pretty_assertions::assert_eq;

fn run_with(source: &str, params: Vec<(&str, Value)>) -> Result<Value, ExecError> {
    let body = Parser::new(lex(source)?).parse_body()?;
    Interpreter::new(params).run(&body)
}

fn run(source: &str) -> Result<Value, ExecError> {
    run_with(source, Vec::new())
}

/// Host object that echoes its method name and argument count.
#[derive(Debug)]
struct Echo;

impl HostObject for Echo {
    fn type_name(&self) -> &'static str {
        "echo"
    }

    fn call_method(&self, method: &str, args: &[Value]) -> Result<Value, String> {
        match method {
            "fail" => Err("always fails".to_owned()),
            _ => Ok(Value::record(Record::from_slots([
                ("method", Value::from(method)),
                ("argc", Value::Int(i64::try_from(args.len()).unwrap())),
            ]))),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn first_return_wins() {
    assert_eq!(run("return 1;\nreturn 2;").unwrap(), Value::Int(1));
}

#[test]
fn record_slots_and_missing_slot_is_nil() {
    let value = run(r#"let r = {a: 1}; r.b = r.a + 1; return [r.a, r.b, r.c, r["b"]];"#).unwrap();
    assert_eq!(
        value,
        Value::list(vec![Value::Int(1), Value::Int(2), Value::Nil, Value::Int(2)])
    );
}

#[test]
fn records_are_shared_by_reference() {
    let value = run("let a = {}; let b = a; b.x = 1; return a.x;").unwrap();
    assert_eq!(value, Value::Int(1));
}

#[test]
fn parameter_records_are_mutated_in_place() {
    let target = Record::new();
    run_with("t.ok = true;", vec![("t", Value::record(target.clone()))]).unwrap();
    assert_eq!(target.get("ok"), Some(Value::Bool(true)));
}

#[test]
fn reassignment_requires_declaration() {
    assert_eq!(run("let a = 1; a = 2; return a;").unwrap(), Value::Int(2));
    let err = run("b = 2;").unwrap_err();
    assert_eq!(err, ExecError::runtime(1, "assignment to undeclared name `b`"));
}

#[test]
fn undefined_name_reports_line() {
    let err = run("let a = 1;\n\nreturn missing;").unwrap_err();
    assert_eq!(err, ExecError::runtime(3, "undefined name `missing`"));
}

#[test]
fn integer_overflow_is_an_error() {
    let err = run("return 9223372036854775807 + 1;").unwrap_err();
    assert_eq!(err, ExecError::runtime(1, "integer overflow"));
}

#[test]
fn mismatched_add_is_an_error() {
    let err = run(r#"return "a" + 1;"#).unwrap_err();
    assert_eq!(err, ExecError::runtime(1, "cannot add `str` and `int`"));
}

#[test]
fn list_index_bounds() {
    assert_eq!(run("return [1, 2][1];").unwrap(), Value::Int(2));
    let err = run("return [1][3];").unwrap_err();
    assert_eq!(
        err,
        ExecError::runtime(1, "index 3 out of bounds for list of length 1")
    );
}

#[test]
fn builtin_methods() {
    let value = run(r#"let r = {b: 1, a: 2}; return [r.keys(), r.len(), [1, 2, 3].len(), "héllo".len()];"#)
        .unwrap();
    assert_eq!(
        value,
        Value::list(vec![
            Value::list(vec![Value::from("a"), Value::from("b")]),
            Value::Int(2),
            Value::Int(3),
            Value::Int(5),
        ])
    );
}

#[test]
fn host_methods_receive_evaluated_arguments() {
    let value = run_with(
        r#"return h.package("x", 1 + 1);"#,
        vec![("h", Value::host(Echo))],
    )
    .unwrap();
    let record = value.as_record().unwrap();
    assert_eq!(record.get("method"), Some(Value::from("package")));
    assert_eq!(record.get("argc"), Some(Value::Int(2)));
}

#[test]
fn host_method_failure_becomes_runtime_error() {
    let err = run_with("\nh.fail();", vec![("h", Value::host(Echo))]).unwrap_err();
    assert_eq!(err, ExecError::runtime(2, "echo.fail: always fails"));
}

#[test]
fn slot_access_on_scalar_is_an_error() {
    let err = run("let n = 1; return n.x;").unwrap_err();
    assert_eq!(
        err,
        ExecError::runtime(1, "cannot read slot `x` of a value of type `int`")
    );
}
