//! Specifier resolution.
//!
//! Turns a specifier string into a single [`ResolvedPath`]:
//!
//! ```text
//! classify(spec, entry) ──► Specifier { Absolute | Relative | Package }
//!                                │
//!            candidates(base, extensions)   (fixed precedence)
//!                                │
//!   Resolver::resolve ── probe each candidate, root by root ──► ResolvedPath
//! ```
//!
//! Resolution never reads file content; it only probes. Reading and
//! executing a resolved file is the loader's job (`acquire` crate).

mod candidates;
mod context;
mod error;
mod path;
mod resolver;
mod specifier;

pub use candidates::{candidates, Candidates, ExtensionPriority};
pub use context::Context;
pub use error::ResolveError;
pub use path::{normalize_path, ResolvedPath};
pub use resolver::{Resolver, SearchRoots};
pub use specifier::{classify, EntryPoint, Specifier, SpecifierKind};
