#![allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

use super::*;
use crate::specifier::{classify, EntryPoint};
use acq_fs::{Fault, MemoryFs};
use pretty_assertions::assert_eq;

fn resolver(fs: &Arc<MemoryFs>) -> Resolver {
    Resolver::new(fs.clone())
}

fn js_node() -> ExtensionPriority {
    ExtensionPriority::new(["js", "node"])
}

async fn package(
    fs: &Arc<MemoryFs>,
    name: &str,
    roots: &[&str],
) -> Result<ResolvedPath, ResolveError> {
    resolver(fs)
        .resolve(
            &classify(name, EntryPoint::Package),
            None,
            &SearchRoots::new(roots.iter().copied()),
            &js_node(),
        )
        .await
}

#[tokio::test]
async fn root_order_dominates_extension_order() {
    let fs = Arc::new(MemoryFs::new());
    fs.insert_file("/A/x.node", "");
    fs.insert_file("/B/x.js", "");

    let resolved = package(&fs, "x", &["/A", "/B"]).await.unwrap();
    assert_eq!(resolved.as_path(), Path::new("/A/x.node"));
}

#[tokio::test]
async fn any_suffixed_file_beats_self_named_directory() {
    let fs = Arc::new(MemoryFs::new());
    fs.insert_file("/A/x.node", "");
    fs.insert_file("/A/x/x", "");
    fs.insert_file("/A/x/x.js", "");

    let resolved = package(&fs, "x", &["/A"]).await.unwrap();
    assert_eq!(resolved.as_path(), Path::new("/A/x.node"));
}

#[tokio::test]
async fn exact_name_beats_extensions() {
    let fs = Arc::new(MemoryFs::new());
    fs.insert_file("/A/x", "");
    fs.insert_file("/A/x.js", "");
    fs.insert_file("/A/x.node", "");

    let resolved = package(&fs, "x", &["/A"]).await.unwrap();
    assert_eq!(resolved.as_path(), Path::new("/A/x"));
}

#[tokio::test]
async fn earlier_extension_beats_later_and_directory() {
    let fs = Arc::new(MemoryFs::new());
    fs.insert_file("/A/x.node", "");
    fs.insert_file("/A/x.js", "");

    let resolved = package(&fs, "x", &["/A"]).await.unwrap();
    assert_eq!(resolved.as_path(), Path::new("/A/x.js"));
}

#[tokio::test]
async fn self_named_directory_in_precedence_order() {
    let fs = Arc::new(MemoryFs::new());
    fs.insert_file("/A/x/x.node", "");
    fs.insert_file("/A/x/x.js", "");

    let resolved = package(&fs, "x", &["/A"]).await.unwrap();
    assert_eq!(resolved.as_path(), Path::new("/A/x/x.js"));

    fs.insert_file("/A/x/x", "");
    let resolved = package(&fs, "x", &["/A"]).await.unwrap();
    assert_eq!(resolved.as_path(), Path::new("/A/x/x"));
}

#[tokio::test]
async fn wrong_type_falls_through_to_next_root() {
    let fs = Arc::new(MemoryFs::new());
    fs.insert_dir("/A/x");
    fs.insert_file("/B/x.js", "");

    let resolved = package(&fs, "x", &["/A", "/B"]).await.unwrap();
    assert_eq!(resolved.as_path(), Path::new("/B/x.js"));
}

#[tokio::test]
async fn io_error_aborts_despite_later_match() {
    let fs = Arc::new(MemoryFs::new());
    fs.insert_dir("/A");
    fs.inject("/A/x.js", Fault::Denied);
    fs.insert_file("/B/x.js", "");

    let err = package(&fs, "x", &["/A", "/B"]).await.unwrap_err();
    let ResolveError::Io { source, .. } = &err else {
        panic!("expected an I/O error, got {err:?}");
    };
    assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
    assert_eq!(source.path(), Path::new("/A/x.js"));
}

#[tokio::test]
async fn package_exhaustion_is_does_not_exist_with_tried_list() {
    let fs = Arc::new(MemoryFs::new());
    fs.insert_dir("/A/x");

    let err = package(&fs, "x", &["/A", "/B"]).await.unwrap_err();
    assert!(matches!(err, ResolveError::DoesNotExist { .. }));
    assert_eq!(err.tried().len(), 12);
    assert_eq!(err.tried()[0], PathBuf::from("/A/x"));
    assert_eq!(err.tried()[6], PathBuf::from("/B/x"));
}

#[tokio::test]
async fn package_with_no_roots_does_not_exist() {
    let fs = Arc::new(MemoryFs::new());
    let err = package(&fs, "x", &[]).await.unwrap_err();
    assert!(matches!(err, ResolveError::DoesNotExist { .. }));
    assert_eq!(fs.probe_count(), 0);
}

#[tokio::test]
async fn absolute_probes_its_own_variants() {
    let fs = Arc::new(MemoryFs::new());
    fs.insert_file("/lib/pkg/pkg.acq", "");

    let resolved = resolver(&fs)
        .resolve(
            &classify("/lib/pkg", EntryPoint::Absolute),
            None,
            &SearchRoots::new(["/ignored"]),
            &ExtensionPriority::default(),
        )
        .await
        .unwrap();
    assert_eq!(resolved.as_path(), Path::new("/lib/pkg/pkg.acq"));
}

#[tokio::test]
async fn absolute_directory_without_inner_file_is_not_a_file() {
    let fs = Arc::new(MemoryFs::new());
    fs.insert_dir("/lib/pkg");

    let err = resolver(&fs)
        .resolve(
            &classify("/lib/pkg", EntryPoint::Absolute),
            None,
            &SearchRoots::default(),
            &ExtensionPriority::default(),
        )
        .await
        .unwrap_err();
    let ResolveError::NotAFile { path, .. } = &err else {
        panic!("expected NotAFile, got {err:?}");
    };
    assert_eq!(path, &PathBuf::from("/lib/pkg"));
}

#[tokio::test]
async fn absolute_missing_is_does_not_exist() {
    let fs = Arc::new(MemoryFs::new());
    let err = resolver(&fs)
        .resolve(
            &classify("/nowhere/x", EntryPoint::Absolute),
            None,
            &SearchRoots::default(),
            &ExtensionPriority::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::DoesNotExist { .. }));
}

#[tokio::test]
async fn unrooted_absolute_is_rejected_without_probing() {
    let fs = Arc::new(MemoryFs::new());
    let err = resolver(&fs)
        .resolve(
            &classify("lib/x", EntryPoint::Absolute),
            None,
            &SearchRoots::default(),
            &ExtensionPriority::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::NotAbsolute { .. }));
    assert_eq!(fs.probe_count(), 0);
}

#[tokio::test]
async fn relative_joins_context_directory() {
    let fs = Arc::new(MemoryFs::new());
    fs.insert_file("/project/lib/util.acq", "");
    let context = Context::new("/project/src/main.acq").unwrap();

    let resolved = resolver(&fs)
        .resolve(
            &classify("../lib/util", EntryPoint::Relative),
            Some(&context),
            &SearchRoots::default(),
            &ExtensionPriority::default(),
        )
        .await
        .unwrap();
    assert_eq!(resolved.as_path(), Path::new("/project/lib/util.acq"));
}

#[tokio::test]
async fn relative_without_context_is_a_usage_error() {
    let fs = Arc::new(MemoryFs::new());
    let err = resolver(&fs)
        .resolve(
            &classify("./util", EntryPoint::Relative),
            None,
            &SearchRoots::default(),
            &ExtensionPriority::default(),
        )
        .await
        .unwrap_err();
    assert!(err.is_usage());
    assert_eq!(fs.probe_count(), 0);
}

#[tokio::test]
async fn package_names_cannot_climb_out_of_a_root() {
    let fs = Arc::new(MemoryFs::new());
    fs.insert_file("/etc/x.js", "");
    fs.insert_file("/A/pkg/x.js", "");

    for name in ["../../etc/x", "pkg/../../etc/x", "pkg/.."] {
        let err = package(&fs, name, &["/A/pkg"]).await.unwrap_err();
        assert!(
            matches!(err, ResolveError::EscapesRoot { .. }),
            "{name}: {err:?}"
        );
        assert!(err.is_usage());
    }

    // `.` components are harmless.
    let resolved = package(&fs, "./x", &["/A/pkg"]).await.unwrap();
    assert_eq!(resolved.as_path(), Path::new("/A/pkg/x.js"));
}
