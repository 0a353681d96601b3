//! Recursive-descent parser for unit bodies.
//!
//! ```text
//! body    := stmt*
//! stmt    := "let" IDENT "=" expr ";"
//!          | "return" expr ";"
//!          | "raise" expr ";"
//!          | expr ( "=" expr )? ";"
//! expr    := postfix ( "+" postfix )*
//! postfix := primary ( "." IDENT ( "(" args ")" )? | "[" expr "]" )*
//! primary := INT | STR | "true" | "false" | "nil" | IDENT
//!          | "{" ( key ":" expr ),* "}" | "[" expr,* "]" | "(" expr ")"
//! key     := IDENT | STR
//! ```

use std::sync::Arc;

use crate::ast::{Expr, Place, Stmt, StmtKind};
use crate::executor::ExecError;
use crate::lexer::{Spanned, Token};
use crate::stack::ensure_sufficient_stack;

pub(crate) struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Spanned>) -> Self {
        Parser { tokens, pos: 0 }
    }

    pub(crate) fn parse_body(mut self) -> Result<Vec<Stmt>, ExecError> {
        let mut body = Vec::new();
        while !self.at_end() {
            body.push(self.parse_stmt()?);
        }
        Ok(body)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ExecError> {
        let line = self.position().0;
        let kind = match self.peek() {
            Some(Token::Let) => {
                self.pos += 1;
                let name = self.expect_ident()?;
                self.expect(&Token::Eq)?;
                let value = self.parse_expr()?;
                StmtKind::Let { name, value }
            }
            Some(Token::Return) => {
                self.pos += 1;
                StmtKind::Return(self.parse_expr()?)
            }
            Some(Token::Raise) => {
                self.pos += 1;
                StmtKind::Raise(self.parse_expr()?)
            }
            _ => {
                let (target_line, target_column) = self.position();
                let expr = self.parse_expr()?;
                if self.eat(&Token::Eq) {
                    let target = match expr {
                        Expr::Var(name) => Place::Var(name),
                        Expr::Slot { object, slot } => Place::Slot {
                            object: *object,
                            slot,
                        },
                        _ => {
                            return Err(ExecError::syntax(
                                target_line,
                                target_column,
                                "invalid assignment target",
                            ))
                        }
                    };
                    StmtKind::Assign {
                        target,
                        value: self.parse_expr()?,
                    }
                } else {
                    StmtKind::Expr(expr)
                }
            }
        };
        self.expect(&Token::Semi)?;
        Ok(Stmt { kind, line })
    }

    fn parse_expr(&mut self) -> Result<Expr, ExecError> {
        ensure_sufficient_stack(|| {
            let mut lhs = self.parse_postfix()?;
            while self.eat(&Token::Plus) {
                let rhs = self.parse_postfix()?;
                lhs = Expr::Add(Box::new(lhs), Box::new(rhs));
            }
            Ok(lhs)
        })
    }

    fn parse_postfix(&mut self) -> Result<Expr, ExecError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(&Token::Dot) {
                let name = self.expect_ident()?;
                if self.eat(&Token::LParen) {
                    let args = self.parse_list(&Token::RParen)?;
                    expr = Expr::Call {
                        object: Box::new(expr),
                        method: name,
                        args,
                    };
                } else {
                    expr = Expr::Slot {
                        object: Box::new(expr),
                        slot: name,
                    };
                }
            } else if self.eat(&Token::LBracket) {
                let index = self.parse_expr()?;
                self.expect(&Token::RBracket)?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ExecError> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.error_here("expected an expression, found end of input"));
        };
        let expr = match token {
            Token::Int(n) => Expr::Int(n),
            Token::Str(s) => Expr::Str(Arc::from(s)),
            Token::True => Expr::Bool(true),
            Token::False => Expr::Bool(false),
            Token::Nil => Expr::Nil,
            Token::Ident(name) => Expr::Var(name),
            Token::LBrace => {
                self.pos += 1;
                return self.parse_record();
            }
            Token::LBracket => {
                self.pos += 1;
                return Ok(Expr::List(self.parse_list(&Token::RBracket)?));
            }
            Token::LParen => {
                self.pos += 1;
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                return Ok(inner);
            }
            other => {
                return Err(self.error_here(format!(
                    "expected an expression, found {}",
                    other.describe()
                )))
            }
        };
        self.pos += 1;
        Ok(expr)
    }

    /// Record literal body, after the opening brace.
    fn parse_record(&mut self) -> Result<Expr, ExecError> {
        let mut fields = Vec::new();
        while !self.eat(&Token::RBrace) {
            let key = match self.peek() {
                Some(Token::Ident(name) | Token::Str(name)) => name.clone(),
                _ => return Err(self.unexpected("a slot name")),
            };
            self.pos += 1;
            self.expect(&Token::Colon)?;
            fields.push((key, self.parse_expr()?));
            if !self.eat(&Token::Comma) {
                self.expect(&Token::RBrace)?;
                break;
            }
        }
        Ok(Expr::Record(fields))
    }

    /// Comma-separated expressions up to `close`; a trailing comma is allowed.
    fn parse_list(&mut self, close: &Token) -> Result<Vec<Expr>, ExecError> {
        let mut items = Vec::new();
        while !self.eat(close) {
            items.push(self.parse_expr()?);
            if !self.eat(&Token::Comma) {
                self.expect(close)?;
                break;
            }
        }
        Ok(items)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<(), ExecError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.unexpected(&token.describe()))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ExecError> {
        if let Some(Token::Ident(name)) = self.peek() {
            let name = name.clone();
            self.pos += 1;
            Ok(name)
        } else {
            Err(self.unexpected("an identifier"))
        }
    }

    /// Position of the current token, or just past the last one at end of input.
    fn position(&self) -> (u32, u32) {
        match (self.tokens.get(self.pos), self.tokens.last()) {
            (Some(current), _) => (current.line, current.column),
            (None, Some(last)) => (last.line, last.column.saturating_add(1)),
            (None, None) => (1, 1),
        }
    }

    #[cold]
    fn error_here(&self, message: impl Into<String>) -> ExecError {
        let (line, column) = self.position();
        ExecError::syntax(line, column, message)
    }

    #[cold]
    fn unexpected(&self, expected: &str) -> ExecError {
        let found = self
            .peek()
            .map_or_else(|| "end of input".to_owned(), Token::describe);
        self.error_here(format!("expected {expected}, found {found}"))
    }
}
