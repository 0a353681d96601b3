#![allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

use super::*;
use crate::error::{ErrorKind, ImportError};
use acq_script::Record;
use pretty_assertions::assert_eq;

fn module() -> Value {
    Value::record(Record::from_slots([
        ("a", Value::Int(1)),
        ("b", Value::Int(2)),
    ]))
}

fn ready(runtime: &Handle, outcome: Outcome) -> Acquisition {
    Acquisition::spawn(runtime, async move { outcome })
}

#[tokio::test]
async fn clones_observe_the_same_outcome() {
    let acquisition = ready(&Handle::current(), Ok(module()));
    let clone = acquisition.clone();

    let a = acquisition.await.unwrap();
    let b = clone.result().await.unwrap();
    assert_eq!(a, b);
    assert!(clone.is_settled());
    assert_eq!(clone.try_result().unwrap().unwrap(), a);
}

#[tokio::test]
async fn wait_inside_runtime_is_a_usage_error() {
    let acquisition = ready(&Handle::current(), Ok(Value::Nil));
    let err = acquisition.wait().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert!(matches!(
        err,
        AcquireError::Usage(UsageError::WaitInsideRuntime)
    ));
}

#[test]
fn wait_outside_runtime_blocks_until_settled() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .build()
        .unwrap();
    let acquisition = ready(runtime.handle(), Ok(Value::from("done")));

    assert_eq!(acquisition.wait().unwrap(), Value::from("done"));
}

#[tokio::test]
async fn import_projects_onto_target() {
    let runtime = Handle::current();
    let target = Record::from_slots([("own", Value::Nil)]);
    let projected = ready(&runtime, Ok(module()))
        .import(ImportSpec::slots(["b"]).onto(target.clone()))
        .await
        .unwrap();

    assert!(Record::ptr_eq(projected.as_record().unwrap(), &target));
    assert_eq!(target.keys(), vec!["b", "own"]);
}

#[tokio::test]
async fn import_propagates_source_failure() {
    let err = ready(&Handle::current(), Err(AcquireError::Abandoned))
        .import(ImportSpec::all())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Abandoned);
}

#[tokio::test]
async fn import_is_callable_from_units() {
    let acquisition = ready(&Handle::current(), Ok(module()));

    let handle = acquisition
        .call_method("import", &[Value::from("a")])
        .unwrap();
    let projected = handle
        .downcast_host::<Acquisition>()
        .unwrap()
        .result()
        .await
        .unwrap();
    assert_eq!(projected.as_record().unwrap().keys(), vec!["a"]);

    let handle = acquisition
        .call_method("import", &[Value::from("zz")])
        .unwrap();
    let err = handle
        .downcast_host::<Acquisition>()
        .unwrap()
        .result()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AcquireError::Import(ImportError::MissingSlot { .. })
    ));

    assert!(acquisition.call_method("wait", &[]).is_err());
    assert!(acquisition
        .call_method("import", &[Value::Int(1), Value::Nil])
        .is_err());
}
