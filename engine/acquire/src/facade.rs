//! The acquisition facade: `absolute`, `relative`, `package` and `file`.
//!
//! ```text
//! acquire(spec) ─► classify ─► resolve ─► lineage check
//!                                              │
//!                     LoadCache::get_or_load (wait-for check)
//!                                              │ first requester only
//!                                              ▼
//!                     read ─► execute(__filename, from, extras...)
//!                                              │
//!                     settle issued acquisitions ─► outcome
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;

use acq_fs::{FileSystem, TokioFs};
use acq_resolve::{classify, Context, EntryPoint, ResolvedPath, Resolver, Specifier};
use acq_script::{Bindings, Executor, HostObject, ScriptExecutor, Value};

use crate::acquisition::Acquisition;
use crate::cache::LoadCache;
use crate::completion::Outcome;
use crate::config::AcquireConfig;
use crate::error::{AcquireError, UsageError};
use crate::issued::Issued;
use crate::loader::Loader;

/// State shared by an acquirer and every `from` handed to its units.
#[derive(Debug)]
struct Shared {
    config: AcquireConfig,
    resolver: Resolver,
    loader: Loader,
    cache: LoadCache,
    runtime: Handle,
}

/// Entry point for acquiring units.
///
/// Cheap to clone. Clones share the configuration snapshot and the load
/// cache; each may carry its own [`Context`] for relative specifiers.
/// Units receive an `Acquirer` bound to their own path as `from`.
#[derive(Clone)]
pub struct Acquirer {
    shared: Arc<Shared>,
    context: Option<Context>,
    /// The unit this acquirer was handed to, while that unit loads.
    unit: Option<ResolvedPath>,
}

impl Acquirer {
    /// An acquirer over the real filesystem and the built-in unit language.
    pub fn new(config: AcquireConfig, runtime: Handle) -> Self {
        Self::with_parts(config, runtime, Arc::new(TokioFs), Arc::new(ScriptExecutor))
    }

    /// Like [`Acquirer::new`], on the runtime the caller is running in.
    pub fn current(config: AcquireConfig) -> Result<Self, AcquireError> {
        let runtime = Handle::try_current().map_err(|_| UsageError::NoRuntime)?;
        Ok(Self::new(config, runtime))
    }

    pub fn with_parts(
        config: AcquireConfig,
        runtime: Handle,
        fs: Arc<dyn FileSystem>,
        executor: Arc<dyn Executor>,
    ) -> Self {
        let loader = Loader::new(Arc::clone(&fs), executor, config.execution());
        Acquirer {
            shared: Arc::new(Shared {
                resolver: Resolver::new(fs),
                loader,
                cache: LoadCache::new(),
                runtime,
                config,
            }),
            context: None,
            unit: None,
        }
    }

    /// A clone that resolves relative specifiers against `context`.
    #[must_use]
    pub fn with_context(&self, context: Context) -> Self {
        Acquirer {
            shared: Arc::clone(&self.shared),
            context: Some(context),
            unit: self.unit.clone(),
        }
    }

    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    pub fn config(&self) -> &AcquireConfig {
        &self.shared.config
    }

    pub fn cache(&self) -> &LoadCache {
        &self.shared.cache
    }

    /// Acquire the unit at an absolute path.
    pub fn absolute(&self, path: &str) -> Acquisition {
        self.acquire(path, EntryPoint::Absolute)
    }

    /// Acquire a unit relative to this acquirer's context.
    pub fn relative(&self, path: &str) -> Acquisition {
        self.acquire(path, EntryPoint::Relative)
    }

    /// Acquire a unit by name from the configured search roots.
    pub fn package(&self, name: &str) -> Acquisition {
        self.acquire(name, EntryPoint::Package)
    }

    /// Absolute if `path` is rooted, otherwise relative.
    pub fn file(&self, path: &str) -> Acquisition {
        self.acquire(path, EntryPoint::File)
    }

    pub fn acquire(&self, specifier: &str, entry: EntryPoint) -> Acquisition {
        let specifier = classify(specifier, entry);
        let this = self.clone();
        Acquisition::spawn(&self.shared.runtime, async move { this.run(specifier).await })
    }

    async fn run(self, specifier: Specifier) -> Outcome {
        let config = &self.shared.config;
        let path = self
            .shared
            .resolver
            .resolve(
                &specifier,
                self.context.as_ref(),
                config.search_roots(),
                config.extensions(),
            )
            .await?;

        let context = match &self.context {
            Some(parent) if parent.is_ancestor_or_self(path.as_path()) => {
                let mut chain = parent.lineage().to_vec();
                chain.push(path.as_path().to_path_buf());
                tracing::debug!(%path, "acquisition cycle");
                return Err(AcquireError::Cycle { path, chain });
            }
            Some(parent) => parent.child(path.as_path()),
            None => Context::for_unit(&path),
        };

        let shared = Arc::clone(&self.shared);
        self.shared
            .cache
            .get_or_load(path, self.unit.as_ref(), move |path| {
                load_unit(shared, path, context)
            })
            .await
    }
}

/// Run the unit at `path` and settle everything it acquired.
async fn load_unit(shared: Arc<Shared>, path: ResolvedPath, context: Context) -> Outcome {
    let from = Acquirer {
        shared: Arc::clone(&shared),
        context: Some(context),
        unit: Some(path.clone()),
    };
    let mut bindings = Bindings::new()
        .with("__filename", Value::string(path.to_string()))
        .with("from", Value::host(from));
    for (name, value) in shared.config.bindings().iter() {
        bindings.bind(name, value.clone());
    }

    let issued = Arc::new(Issued::new());
    let value = shared.loader.load(&path, bindings, &issued).await?;
    issued.settle(&path, value).await
}

impl fmt::Debug for Acquirer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Acquirer")
            .field("context", &self.context.as_ref().map(Context::file))
            .field("cache", &self.shared.cache)
            .finish_non_exhaustive()
    }
}

impl HostObject for Acquirer {
    fn type_name(&self) -> &'static str {
        "from"
    }

    fn call_method(&self, method: &str, args: &[Value]) -> Result<Value, String> {
        let entry = match method {
            "absolute" => EntryPoint::Absolute,
            "relative" => EntryPoint::Relative,
            "package" => EntryPoint::Package,
            "file" => EntryPoint::File,
            _ => return Err(format!("no method `{method}`")),
        };
        let [spec] = args else {
            return Err(format!("expected 1 argument, found {}", args.len()));
        };
        let spec = spec
            .as_str()
            .ok_or_else(|| format!("expected a string, found `{}`", spec.type_name()))?;
        Ok(Value::host(self.acquire(spec, entry)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
