#![allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

use std::path::Path;

use super::*;
use crate::error::ErrorKind;
use acq_script::Record;
use pretty_assertions::assert_eq;
use tokio::runtime::Handle;

fn unit() -> ResolvedPath {
    ResolvedPath::new(Path::new("/unit.acq")).unwrap()
}

fn ready(outcome: Outcome) -> Acquisition {
    Acquisition::spawn(&Handle::current(), async move { outcome })
}

#[tokio::test]
async fn only_acquisitions_inside_the_scope_are_recorded() {
    let issued = Arc::new(Issued::new());
    ready(Ok(Value::Int(0)));
    issued.scope(|| ready(Ok(Value::Int(1))));

    let recorded = issued.get(0).unwrap();
    assert!(issued.get(1).is_none());
    assert_eq!(recorded.result().await.unwrap(), Value::Int(1));
}

#[tokio::test]
async fn scope_restores_the_previous_unit() {
    let outer = Arc::new(Issued::new());
    let inner = Arc::new(Issued::new());
    outer.scope(|| {
        inner.scope(|| ready(Ok(Value::Nil)));
        ready(Ok(Value::Nil));
    });

    assert!(outer.get(0).is_some() && outer.get(1).is_none());
    assert!(inner.get(0).is_some() && inner.get(1).is_none());
}

#[tokio::test]
async fn settle_waits_for_every_issued_acquisition() {
    let issued = Arc::new(Issued::new());
    let target = Record::new();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let populate = target.clone();
    issued.scope(|| {
        Acquisition::spawn(&Handle::current(), async move {
            rx.await.unwrap();
            populate.set("done", Value::Bool(true));
            Ok::<_, AcquireError>(Value::Nil)
        })
    });

    let settling = tokio::spawn({
        let issued = Arc::clone(&issued);
        let target = target.clone();
        async move { issued.settle(&unit(), Value::record(target)).await }
    });
    tx.send(()).unwrap();

    let value = settling.await.unwrap().unwrap();
    assert_eq!(value.as_record().unwrap().get("done"), Some(Value::Bool(true)));
}

#[tokio::test]
async fn failed_dependency_fails_the_unit() {
    let issued = Arc::new(Issued::new());
    issued.scope(|| {
        ready(Ok(Value::Nil));
        ready(Err(AcquireError::Abandoned));
    });

    let err = issued.settle(&unit(), Value::Nil).await.unwrap_err();
    assert!(matches!(err, AcquireError::Dependency { .. }));
    assert_eq!(err.kind(), ErrorKind::Abandoned);

    // Closed: nothing more is recorded.
    issued.scope(|| ready(Ok(Value::Nil)));
    assert!(issued.get(0).is_none());
}

#[tokio::test]
async fn returned_handle_is_resolved_to_its_value() {
    let issued = Arc::new(Issued::new());
    let handle = ready(Ok(Value::from("inner")));

    let value = issued.settle(&unit(), Value::host(handle)).await.unwrap();
    assert_eq!(value, Value::from("inner"));
}
