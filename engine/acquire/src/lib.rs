//! Asynchronous module acquisition.
//!
//! An [`Acquirer`] turns a specifier into the value a unit produces:
//!
//! - `absolute("/srv/lib/http")`: a rooted path, probed as-is.
//! - `relative("./util")`: joined onto the requesting unit's directory.
//! - `package("std/http")`: looked up under each search root in order.
//! - `file(spec)`: absolute when rooted, relative otherwise.
//!
//! Each returns an [`Acquisition`] that is awaited (or, outside the
//! runtime, [`wait`](Acquisition::wait)ed on). Every resolved path is read
//! and executed at most once per acquirer; concurrent and later requesters
//! share the first load's outcome.
//!
//! ```no_run
//! use acquire::{AcquireConfig, Acquirer, ImportSpec};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let from = Acquirer::current(AcquireConfig::from_env()?)?;
//! let http = from.package("std/http").await?;
//! let helpers = from.absolute("/srv/lib/helpers").import(ImportSpec::slots(["log"])).await?;
//! # let _ = (http, helpers);
//! # Ok(()) }
//! ```

mod acquisition;
mod cache;
mod completion;
mod config;
mod error;
mod facade;
mod import;
mod issued;
mod loader;
mod wait_graph;

use std::sync::Once;

pub use acq_fs::{Fault, FileSystem, FsError, MemoryFs, TokioFs};
pub use acq_resolve::{Context, EntryPoint, ResolvedPath};
pub use acq_script::{Bindings, ExecError, Executor, HostObject, Record, ScriptExecutor, Value};
pub use acquisition::Acquisition;
pub use cache::LoadCache;
pub use completion::Outcome;
pub use config::{AcquireConfig, ConfigError, ExecutionMode, RESERVED_BINDINGS};
pub use error::{AcquireError, CompileError, ErrorKind, ImportError, ImportRole, UsageError};
pub use facade::Acquirer;
pub use import::ImportSpec;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber for the engine's diagnostics.
///
/// Safe to call more than once. Does nothing unless `ACQUIRE_LOG` (or,
/// failing that, `RUST_LOG`) is set, e.g. `ACQUIRE_LOG=acquire=debug`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = std::env::var("ACQUIRE_LOG")
            .ok()
            .map(EnvFilter::new)
            .or_else(|| std::env::var("RUST_LOG").is_ok().then(EnvFilter::from_default_env));
        if let Some(filter) = filter {
            // Another subscriber may already be installed by the embedder.
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
        }
    });
}
