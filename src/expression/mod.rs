//! Expression model for evolved activation functions.
//!
//! An expression is a chain of unary function applications ending in a terminal,
//! e.g. `tanh(sin(x))`. The tree form is what the genetic operators work on; the
//! canonical text form is what candidates store, compare and display.

pub mod generator;
pub mod vocabulary;

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use thiserror::Error;

pub use generator::generate;
pub use vocabulary::{SymbolKind, Vocabulary};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Expression is empty")]
    Empty,
    #[error("Expected a symbol name at position {position}")]
    ExpectedName { position: usize },
    #[error("Parenthesis opened at position {position} is never closed")]
    UnclosedParen { position: usize },
    #[error("Unexpected input at position {position}")]
    TrailingInput { position: usize },
}

/// A node of an expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Variable or parameter
    Terminal(String),
    /// Unary function applied to an argument
    Call(String, Box<Expr>),
}

impl Expr {
    pub fn terminal(name: impl Into<String>) -> Self {
        Self::Terminal(name.into())
    }

    pub fn call(name: impl Into<String>, arg: Expr) -> Self {
        Self::Call(name.into(), Box::new(arg))
    }

    /// Parses canonical expression text.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ParseError::Empty);
        }
        let mut parser = Parser {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        };
        let expr = parser.expr()?;
        if parser.pos < parser.bytes.len() {
            return Err(ParseError::TrailingInput {
                position: parser.pos,
            });
        }
        Ok(expr)
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Self::Call(_, _))
    }

    /// Symbol at this node.
    pub fn name(&self) -> &str {
        match self {
            Self::Terminal(name) | Self::Call(name, _) => name,
        }
    }

    /// Number of nested levels, a bare terminal has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Self::Terminal(_) => 1,
            Self::Call(_, arg) => 1 + arg.depth(),
        }
    }

    /// Nodes from the root down to the terminal.
    pub fn nodes(&self) -> Vec<&Expr> {
        let mut nodes = Vec::new();
        let mut current = self;
        loop {
            nodes.push(current);
            match current {
                Self::Terminal(_) => return nodes,
                Self::Call(_, arg) => current = arg,
            }
        }
    }

    /// All function-application subtrees in pre-order, which matches the order their
    /// names appear in the rendered text.
    pub fn subtrees(&self) -> Vec<&Expr> {
        self.nodes().into_iter().filter(|n| n.is_call()).collect()
    }

    /// All symbol names in pre-order.
    pub fn tokens(&self) -> Vec<&str> {
        self.nodes().into_iter().map(Expr::name).collect()
    }

    /// Replaces the first pre-order node equal to `target` with `replacement`.
    ///
    /// Returns `None` when `target` does not occur in `self`.
    pub fn replace_first(&self, target: &Expr, replacement: &Expr) -> Option<Expr> {
        if self == target {
            return Some(replacement.clone());
        }
        match self {
            Self::Terminal(_) => None,
            Self::Call(name, arg) => arg
                .replace_first(target, replacement)
                .map(|new_arg| Self::Call(name.clone(), Box::new(new_arg))),
        }
    }

    /// Renames the token at pre-order position `index`, leaving every other
    /// occurrence of the same name untouched.
    pub fn with_token_at(&self, index: usize, new_name: &str) -> Option<Expr> {
        match (self, index) {
            (Self::Terminal(_), 0) => Some(Self::terminal(new_name)),
            (Self::Terminal(_), _) => None,
            (Self::Call(_, arg), 0) => Some(Self::Call(new_name.to_string(), arg.clone())),
            (Self::Call(name, arg), i) => arg
                .with_token_at(i - 1, new_name)
                .map(|new_arg| Self::Call(name.clone(), Box::new(new_arg))),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal(name) => write!(f, "{}", name),
            Self::Call(name, arg) => write!(f, "{}({})", name, arg),
        }
    }
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn expr(&mut self) -> Result<Expr, ParseError> {
        let name = self.name()?;
        if self.bytes.get(self.pos) != Some(&b'(') {
            return Ok(Expr::Terminal(name));
        }
        let open = self.pos;
        self.pos += 1;
        let arg = self.expr()?;
        match self.bytes.get(self.pos) {
            Some(b')') => {
                self.pos += 1;
                Ok(Expr::call(name, arg))
            }
            None => Err(ParseError::UnclosedParen { position: open }),
            Some(_) => Err(ParseError::TrailingInput { position: self.pos }),
        }
    }

    fn name(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_alphabetic() {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(ParseError::ExpectedName { position: start });
        }
        Ok(self.text[start..self.pos].to_string())
    }
}

lazy_static! {
    static ref TOKEN_REGEX: Regex = Regex::new(r"[A-Za-z]+").unwrap();
}

/// Alphabetic runs of raw expression text, in order of appearance.
///
/// Works on any text, well-formed or not.
pub fn alphabetic_tokens(text: &str) -> Vec<&str> {
    TOKEN_REGEX.find_iter(text).map(|m| m.as_str()).collect()
}

/// Replaces the alphabetic run at ordinal `index` of raw text with `new_token`.
///
/// Counterpart of [`Expr::with_token_at`] for text that does not parse.
pub fn replace_nth_token(text: &str, index: usize, new_token: &str) -> Option<String> {
    let m = TOKEN_REGEX.find_iter(text).nth(index)?;
    Some(format!("{}{}{}", &text[..m.start()], new_token, &text[m.end()..]))
}

/// Number of symbolic tokens (functions, variable, parameters) in `text`.
pub fn complexity(text: &str) -> usize {
    TOKEN_REGEX.find_iter(text).count()
}
