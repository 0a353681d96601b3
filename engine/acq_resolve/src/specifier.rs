//! Specifier classification.
//!
//! Classification is mostly "which entry point was called". The one
//! exception is content-detected: a specifier that starts at the filesystem
//! root is absolute no matter how it arrived.

use std::fmt;
use std::path::Path;

/// How a specifier is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpecifierKind {
    /// Rooted path; probed as-is, no search roots.
    Absolute,
    /// Joined onto the directory of the requesting unit.
    Relative,
    /// Looked up under each search root in order.
    Package,
}

/// The facade operation a specifier came through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    Absolute,
    Relative,
    Package,
    /// Absolute if rooted, otherwise relative to the requesting unit.
    File,
}

/// A classified specifier. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Specifier {
    raw: String,
    kind: SpecifierKind,
}

impl Specifier {
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> SpecifierKind {
        self.kind
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.raw)
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Classify `raw` as requested through `entry`.
///
/// Only `EntryPoint::Absolute` can produce a non-rooted `Absolute`
/// specifier; the resolver rejects it with `NotAbsolute`.
pub fn classify(raw: impl Into<String>, entry: EntryPoint) -> Specifier {
    let raw = raw.into();
    let kind = if Path::new(&raw).has_root() {
        SpecifierKind::Absolute
    } else {
        match entry {
            EntryPoint::Absolute => SpecifierKind::Absolute,
            EntryPoint::Relative | EntryPoint::File => SpecifierKind::Relative,
            EntryPoint::Package => SpecifierKind::Package,
        }
    };
    Specifier { raw, kind }
}
