#![allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

//! The default acquirer against files on disk.

use std::fs;
use std::path::Path;

use acquire::{AcquireConfig, Acquirer, ErrorKind, ImportSpec, Value};
use pretty_assertions::assert_eq;
use tokio::runtime::Handle;

fn write(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

#[tokio::test]
async fn package_resolves_across_roots_on_disk() {
    let vendor = tempfile::tempdir().unwrap();
    let site = tempfile::tempdir().unwrap();
    fs::create_dir_all(vendor.path().join("http")).unwrap();
    write(
        &site.path().join("http/http.acq"),
        r#"
        let lib = {name: "http"};
        from.relative("./codec").import("decode", lib);
        return lib;
        "#,
    );
    write(&site.path().join("http/codec.acq"), r#"return {decode: "ok"};"#);

    let config = AcquireConfig::new().with_search_roots([vendor.path(), site.path()]);
    let from = Acquirer::new(config, Handle::current());

    let http = from.package("http").await.unwrap();
    let http = http.as_record().unwrap();
    assert_eq!(http.keys(), vec!["decode", "name"]);
    assert_eq!(http.get("decode"), Some(Value::from("ok")));
}

#[tokio::test]
async fn missing_file_on_disk_does_not_exist() {
    let dir = tempfile::tempdir().unwrap();
    let from = Acquirer::new(AcquireConfig::new(), Handle::current());

    let target = dir.path().join("nothing");
    let err = from.absolute(target.to_str().unwrap()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DoesNotExist);
    assert_eq!(err.tried()[0], target);
}

#[test]
fn wait_blocks_outside_the_runtime() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("lib/conf.acq"), "return {port: 8080, host: \"local\"};");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .build()
        .unwrap();
    let config = AcquireConfig::new().with_search_roots([dir.path().join("lib")]);
    let from = Acquirer::new(config, runtime.handle().clone());

    let conf = from
        .package("conf")
        .import(ImportSpec::slots(["port"]))
        .wait()
        .unwrap();
    assert_eq!(conf.as_record().unwrap().get("port"), Some(Value::Int(8080)));
}

#[test]
fn tracing_initializes_once() {
    acquire::init_tracing();
    acquire::init_tracing();
}
