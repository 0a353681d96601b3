//! Value model and execution collaborator for acquired units.
//!
//! A unit is a source file whose body runs as an anonymous function of its
//! bindings. [`Executor`] is the seam the loader calls through;
//! [`ScriptExecutor`] implements it for a small statement language:
//!
//! ```text
//! let lib = {};
//! lib.greeting = "hello, " + name;
//! from.relative("./helpers").import("shout", lib);
//! return lib;
//! ```

mod ast;
mod bindings;
mod executor;
mod interpreter;
mod lexer;
mod parser;
mod stack;
mod value;

use std::path::Path;

pub use bindings::Bindings;
pub use executor::{ExecError, Executor};
pub use value::{HostObject, Record, Value};

use ast::Stmt;
use interpreter::Interpreter;
use parser::Parser;

/// A compiled unit body with named parameters.
#[derive(Clone, Debug)]
pub struct Unit {
    params: Vec<String>,
    body: Vec<Stmt>,
}

impl Unit {
    /// Parse `source` as the body of a unit taking `params`.
    pub fn compile<I, S>(source: &str, params: I) -> Result<Self, ExecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let body = Parser::new(lexer::lex(source)?).parse_body()?;
        Ok(Unit {
            params: params.into_iter().map(Into::into).collect(),
            body,
        })
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Run the body with `args` bound positionally to the parameters.
    ///
    /// An arity mismatch is reported as a runtime error on line 0.
    pub fn call(&self, args: &[Value]) -> Result<Value, ExecError> {
        if args.len() != self.params.len() {
            return Err(ExecError::runtime(
                0,
                format!(
                    "unit takes {} argument(s) but {} were supplied",
                    self.params.len(),
                    args.len()
                ),
            ));
        }
        let params = self.params.iter().map(String::as_str).zip(args.iter().cloned());
        Interpreter::new(params).run(&self.body)
    }
}

/// [`Executor`] for the built-in unit language.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScriptExecutor;

impl Executor for ScriptExecutor {
    fn execute(
        &self,
        source: &str,
        origin: &Path,
        bindings: &Bindings,
    ) -> Result<Value, ExecError> {
        tracing::trace!(origin = %origin.display(), params = bindings.len(), "executing unit");
        let unit = Unit::compile(source, bindings.names())?;
        let args: Vec<Value> = bindings.iter().map(|(_, v)| v.clone()).collect();
        unit.call(&args)
    }
}

#[cfg(test)]
mod tests;
