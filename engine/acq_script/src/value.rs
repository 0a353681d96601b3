//! Runtime values produced by units.
//!
//! # Sharing
//!
//! Values cross task boundaries (a load outcome is handed to every waiter),
//! so every heap variant is `Arc`-backed and `Send + Sync`. Records are the
//! one mutable type: a [`Record`] is a shared handle, and two values holding
//! clones of the same handle are the *same* record. Equality on records is
//! identity, not content.
//!
//! # Host objects
//!
//! Anything the embedder wants units to call into (the acquisition facade,
//! acquisition handles, object factories) is a [`HostObject`] wrapped in
//! [`Value::Host`].

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// Native object exposed to units.
///
/// Method failures are plain messages; the interpreter turns them into
/// runtime errors carrying the failing statement's line.
pub trait HostObject: Send + Sync + fmt::Debug {
    /// Name shown when the object is printed.
    fn type_name(&self) -> &'static str;

    /// Invoke `method` with already-evaluated arguments.
    fn call_method(&self, method: &str, args: &[Value]) -> Result<Value, String>;

    /// Downcasting hook for embedders.
    fn as_any(&self) -> &dyn Any;
}

/// A shared, mutable mapping from slot names to values.
///
/// Slots iterate in name order. Cloning a `Record` clones the handle.
#[derive(Clone, Default)]
pub struct Record(Arc<RwLock<BTreeMap<String, Value>>>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(name, value)` pairs. Later duplicates win.
    pub fn from_slots<I, K>(slots: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Record(Arc::new(RwLock::new(
            slots.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    pub fn get(&self, slot: &str) -> Option<Value> {
        self.0.read().get(slot).cloned()
    }

    /// Set `slot`, returning the previous value.
    pub fn set(&self, slot: impl Into<String>, value: Value) -> Option<Value> {
        self.0.write().insert(slot.into(), value)
    }

    pub fn contains(&self, slot: &str) -> bool {
        self.0.read().contains_key(slot)
    }

    /// Slot names, in iteration order.
    pub fn keys(&self) -> Vec<String> {
        self.0.read().keys().cloned().collect()
    }

    /// Snapshot of every slot. The lock is released before returning, so
    /// callers may recurse into nested records safely.
    pub fn slots(&self) -> Vec<(String, Value)> {
        self.0
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Returns `true` if both handles refer to the same record.
    pub fn ptr_eq(a: &Record, b: &Record) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        Record::ptr_eq(self, other)
    }
}

impl fmt::Debug for Record {
    /// Shallow: slot names only. Records may contain themselves.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("at", &Arc::as_ptr(&self.0))
            .field("slots", &self.keys())
            .finish()
    }
}

/// Runtime value.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Str(Arc<str>),
    List(Arc<[Value]>),
    Record(Record),
    Host(Arc<dyn HostObject>),
}

impl Value {
    #[inline]
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    #[inline]
    pub fn list(items: impl Into<Arc<[Value]>>) -> Self {
        Value::List(items.into())
    }

    #[inline]
    pub fn record(record: Record) -> Self {
        Value::Record(record)
    }

    #[inline]
    pub fn host(object: impl HostObject + 'static) -> Self {
        Value::Host(Arc::new(object))
    }

    /// Name of the value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Record(_) => "record",
            Value::Host(h) => h.type_name(),
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Borrow a host object as its concrete type.
    pub fn downcast_host<T: 'static>(&self) -> Option<&T> {
        match self {
            Value::Host(h) => h.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Identity for shared values, content for scalars.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Arc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            (Value::Host(a), Value::Host(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            _ => self == other,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Host(a), Value::Host(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            _ => false,
        }
    }
}

/// Nesting depth past which printing elides records and lists.
const MAX_PRINT_DEPTH: usize = 8;

fn write_value(f: &mut fmt::Formatter<'_>, value: &Value, depth: usize) -> fmt::Result {
    match value {
        Value::Nil => f.write_str("nil"),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Int(n) => write!(f, "{n}"),
        Value::Str(s) => write!(f, "{s:?}"),
        Value::List(_) | Value::Record(_) if depth >= MAX_PRINT_DEPTH => f.write_str("..."),
        Value::List(items) => {
            f.write_str("[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_value(f, item, depth + 1)?;
            }
            f.write_str("]")
        }
        Value::Record(record) => {
            f.write_str("{")?;
            for (i, (name, slot)) in record.slots().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{name}: ")?;
                write_value(f, slot, depth + 1)?;
            }
            f.write_str("}")
        }
        Value::Host(h) => write!(f, "<{}>", h.type_name()),
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, 0)
    }
}

/// Like `Debug`, except top-level strings print without quotes.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            other => write_value(f, other, 0),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}
