//! Unit-language lexer built on logos.

use logos::Logos;

use crate::executor::ExecError;

/// Token as produced by logos.
#[derive(Logos, Debug, Clone, PartialEq)]
// Whitespace and line comments.
#[logos(skip r"([ \t\r\n]+|//[^\n]*)")]
pub(crate) enum Token {
    #[token("let")]
    Let,
    #[token("return")]
    Return,
    #[token("raise")]
    Raise,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("nil")]
    Nil,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,
    #[token("=")]
    Eq,
    #[token("+")]
    Plus,

    // Out-of-range literals fail the callback and surface as a lex error.
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[regex(r#""([^"\\\n\r]|\\.)*""#, |lex| {
        let s = lex.slice();
        unescape_string(&s[1..s.len() - 1])
    })]
    Str(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_owned())]
    Ident(String),
}

impl Token {
    /// Short description for "expected X, found Y" messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Int(n) => format!("integer `{n}`"),
            Token::Str(_) => "string literal".to_owned(),
            Token::Ident(name) => format!("identifier `{name}`"),
            Token::Let => "`let`".to_owned(),
            Token::Return => "`return`".to_owned(),
            Token::Raise => "`raise`".to_owned(),
            Token::True => "`true`".to_owned(),
            Token::False => "`false`".to_owned(),
            Token::Nil => "`nil`".to_owned(),
            Token::LBrace => "`{`".to_owned(),
            Token::RBrace => "`}`".to_owned(),
            Token::LBracket => "`[`".to_owned(),
            Token::RBracket => "`]`".to_owned(),
            Token::LParen => "`(`".to_owned(),
            Token::RParen => "`)`".to_owned(),
            Token::Comma => "`,`".to_owned(),
            Token::Colon => "`:`".to_owned(),
            Token::Semi => "`;`".to_owned(),
            Token::Dot => "`.`".to_owned(),
            Token::Eq => "`=`".to_owned(),
            Token::Plus => "`+`".to_owned(),
        }
    }
}

/// A token with its 1-based source position.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub line: u32,
    pub column: u32,
}

/// Maps byte offsets to 1-based line/column pairs.
struct LineIndex<'a> {
    source: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        LineIndex { source, starts }
    }

    fn position(&self, offset: usize) -> (u32, u32) {
        let line = self.starts.partition_point(|&start| start <= offset);
        let start = self.starts[line - 1];
        let column = self.source[start..offset].chars().count() + 1;
        (to_u32(line), to_u32(column))
    }
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Lex `source` completely, failing on the first unrecognized input.
pub(crate) fn lex(source: &str) -> Result<Vec<Spanned>, ExecError> {
    let index = LineIndex::new(source);
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let (line, column) = index.position(lexer.span().start);
        match result {
            Ok(token) => tokens.push(Spanned {
                token,
                line,
                column,
            }),
            Err(()) => {
                return Err(ExecError::syntax(
                    line,
                    column,
                    format!("unexpected input `{}`", lexer.slice()),
                ))
            }
        }
    }

    Ok(tokens)
}

/// Resolve `\"`, `\\`, `\n` and `\t`. Other escapes are kept literally.
fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    result
}
