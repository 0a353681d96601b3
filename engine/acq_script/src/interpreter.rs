//! Tree-walking interpreter for unit bodies.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::ast::{Expr, Place, Stmt, StmtKind};
use crate::executor::ExecError;
use crate::stack::ensure_sufficient_stack;
use crate::value::{Record, Value};

/// Control flow out of a statement.
enum Flow {
    Next,
    Return(Value),
}

pub(crate) struct Interpreter {
    env: FxHashMap<String, Value>,
    /// Line of the statement being executed, for error reports.
    line: u32,
}

impl Interpreter {
    pub(crate) fn new<'a>(params: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        Interpreter {
            env: params
                .into_iter()
                .map(|(name, value)| (name.to_owned(), value))
                .collect(),
            line: 0,
        }
    }

    /// Run `body`, producing the first returned value or nil.
    pub(crate) fn run(&mut self, body: &[Stmt]) -> Result<Value, ExecError> {
        for stmt in body {
            self.line = stmt.line;
            if let Flow::Return(value) = self.exec(stmt)? {
                return Ok(value);
            }
        }
        Ok(Value::Nil)
    }

    fn exec(&mut self, stmt: &Stmt) -> Result<Flow, ExecError> {
        match &stmt.kind {
            StmtKind::Let { name, value } => {
                let value = self.eval(value)?;
                self.env.insert(name.clone(), value);
            }
            StmtKind::Assign { target, value } => {
                let value = self.eval(value)?;
                self.assign(target, value)?;
            }
            StmtKind::Return(expr) => return Ok(Flow::Return(self.eval(expr)?)),
            StmtKind::Raise(expr) => {
                let value = self.eval(expr)?;
                return Err(self.error(value.to_string()));
            }
            StmtKind::Expr(expr) => {
                self.eval(expr)?;
            }
        }
        Ok(Flow::Next)
    }

    fn assign(&mut self, target: &Place, value: Value) -> Result<(), ExecError> {
        match target {
            Place::Var(name) => match self.env.get_mut(name) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(self.error(format!("assignment to undeclared name `{name}`"))),
            },
            Place::Slot { object, slot } => match self.eval(object)? {
                Value::Record(record) => {
                    record.set(slot.as_str(), value);
                    Ok(())
                }
                other => Err(self.error(format!(
                    "cannot set slot `{slot}` on a value of type `{}`",
                    other.type_name()
                ))),
            },
        }
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, ExecError> {
        ensure_sufficient_stack(|| self.eval_inner(expr))
    }

    fn eval_inner(&mut self, expr: &Expr) -> Result<Value, ExecError> {
        match expr {
            Expr::Nil => Ok(Value::Nil),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Str(s) => Ok(Value::Str(Arc::clone(s))),
            Expr::Var(name) => self
                .env
                .get(name)
                .cloned()
                .ok_or_else(|| self.error(format!("undefined name `{name}`"))),
            Expr::Record(fields) => {
                let record = Record::new();
                for (name, field) in fields {
                    let value = self.eval(field)?;
                    record.set(name.as_str(), value);
                }
                Ok(Value::Record(record))
            }
            Expr::List(items) => {
                let values = items
                    .iter()
                    .map(|item| self.eval(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::list(values))
            }
            Expr::Slot { object, slot } => match self.eval(object)? {
                // Absent slots read as nil.
                Value::Record(record) => Ok(record.get(slot).unwrap_or_default()),
                other => Err(self.error(format!(
                    "cannot read slot `{slot}` of a value of type `{}`",
                    other.type_name()
                ))),
            },
            Expr::Index { object, index } => {
                let object = self.eval(object)?;
                let index = self.eval(index)?;
                self.index(&object, &index)
            }
            Expr::Call {
                object,
                method,
                args,
            } => {
                let receiver = self.eval(object)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(&receiver, method, &args)
            }
            Expr::Add(lhs, rhs) => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                self.add(&lhs, &rhs)
            }
        }
    }

    fn index(&self, object: &Value, index: &Value) -> Result<Value, ExecError> {
        match (object, index) {
            (Value::List(items), Value::Int(i)) => usize::try_from(*i)
                .ok()
                .and_then(|i| items.get(i))
                .cloned()
                .ok_or_else(|| {
                    self.error(format!(
                        "index {i} out of bounds for list of length {}",
                        items.len()
                    ))
                }),
            (Value::Record(record), Value::Str(slot)) => Ok(record.get(slot).unwrap_or_default()),
            _ => Err(self.error(format!(
                "cannot index a value of type `{}` with `{}`",
                object.type_name(),
                index.type_name()
            ))),
        }
    }

    fn call(&self, receiver: &Value, method: &str, args: &[Value]) -> Result<Value, ExecError> {
        match (receiver, method, args) {
            (Value::Host(host), _, _) => host
                .call_method(method, args)
                .map_err(|message| self.error(format!("{}.{method}: {message}", host.type_name()))),
            (Value::Record(record), "keys", []) => Ok(Value::list(
                record
                    .keys()
                    .into_iter()
                    .map(Value::string)
                    .collect::<Vec<_>>(),
            )),
            (Value::Record(record), "len", []) => Ok(len_value(record.len())),
            (Value::List(items), "len", []) => Ok(len_value(items.len())),
            (Value::Str(s), "len", []) => Ok(len_value(s.chars().count())),
            _ => Err(self.error(format!(
                "no method `{method}` taking {} argument(s) on a value of type `{}`",
                args.len(),
                receiver.type_name()
            ))),
        }
    }

    fn add(&self, lhs: &Value, rhs: &Value) -> Result<Value, ExecError> {
        match (lhs, rhs) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_add(*b)
                .map(Value::Int)
                .ok_or_else(|| self.error("integer overflow")),
            (Value::Str(a), Value::Str(b)) => {
                let mut joined = String::with_capacity(a.len() + b.len());
                joined.push_str(a);
                joined.push_str(b);
                Ok(Value::string(joined))
            }
            _ => Err(self.error(format!(
                "cannot add `{}` and `{}`",
                lhs.type_name(),
                rhs.type_name()
            ))),
        }
    }

    #[cold]
    fn error(&self, message: impl Into<String>) -> ExecError {
        ExecError::runtime(self.line, message)
    }
}

fn len_value(n: usize) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests;
