#![allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

use super::*;
use pretty_assertions::assert_eq;

fn run(source: &str) -> Result<Value, ExecError> {
    ScriptExecutor.execute(source, Path::new("/test.acq"), &Bindings::new())
}

#[test]
fn parameters_bind_in_declared_order() {
    let unit = Unit::compile("return a + b;", ["a", "b"]).unwrap();
    assert_eq!(unit.params(), ["a", "b"]);
    assert_eq!(
        unit.call(&[Value::from("x"), Value::from("y")]).unwrap(),
        Value::from("xy")
    );
}

#[test]
fn arity_mismatch_is_a_runtime_error() {
    let unit = Unit::compile("return 1;", ["a"]).unwrap();
    assert!(matches!(unit.call(&[]), Err(ExecError::Runtime { line: 0, .. })));
}

#[test]
fn executor_binds_filename() {
    let bindings = Bindings::new().with("__filename", Value::from("/lib/a.acq"));
    let value = ScriptExecutor
        .execute("return __filename;", Path::new("/lib/a.acq"), &bindings)
        .unwrap();
    assert_eq!(value, Value::from("/lib/a.acq"));
}

#[test]
fn syntax_errors_surface_before_running() {
    let bindings = Bindings::new().with("t", Value::record(Record::new()));
    let t = bindings.get("t").cloned().unwrap();
    let err = ScriptExecutor
        .execute("t.ran = true;\nreturn (;", Path::new("/x.acq"), &bindings)
        .unwrap_err();

    assert!(matches!(err, ExecError::Syntax { line: 2, .. }));
    assert!(!t.as_record().unwrap().contains("ran"));
}

#[test]
fn no_return_yields_nil() {
    assert_eq!(run("let a = 1;").unwrap(), Value::Nil);
}

#[test]
fn raise_aborts_with_message() {
    let err = run("let a = 1;\nraise \"boom \" + \"now\";\nreturn a;").unwrap_err();
    assert_eq!(err, ExecError::runtime(2, "boom now"));
    assert_eq!(err.to_string(), "runtime error on line 2: boom now");
}
