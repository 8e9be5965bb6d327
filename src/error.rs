use std::{io, path::PathBuf};

use thiserror::Error;

use crate::syntax::token::{Token, TokenType};

/// Malformed lexical input.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("[line {line}] Error: {message}")]
pub struct ScanError {
    pub line: usize,
    pub message: String,
}

impl ScanError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        ScanError {
            line,
            message: message.into(),
        }
    }
}

/// A grammar violation, reported against the token where it was detected.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("[line {}] Error {}: {message}", .token.line, location(.token))]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl ParseError {
    pub fn new(token: Token, message: impl Into<String>) -> Self {
        ParseError {
            token,
            message: message.into(),
        }
    }
}

fn location(token: &Token) -> String {
    match token.token_type {
        TokenType::Eof => String::from("at end"),
        _ => format!("at '{}'", token.lexeme),
    }
}

/// A fault raised while evaluating. Aborts the rest of the run.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}\n[line {}]", .token.line)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn new(token: &Token, message: impl Into<String>) -> Self {
        RuntimeError {
            token: token.clone(),
            message: message.into(),
        }
    }
}

/// Everything a single run of the pipeline can fail with.
#[derive(Error, Debug)]
pub enum LoxError {
    #[error("{}", join_lines(.0))]
    Scan(Vec<ScanError>),

    #[error("{}", join_lines(.0))]
    Parse(Vec<ParseError>),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("could not read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LoxError {
    /// Process exit status for this failure (sysexits.h conventions).
    pub fn exit_code(&self) -> i32 {
        match self {
            LoxError::Scan(_) | LoxError::Parse(_) => 65,
            LoxError::Runtime(_) => 70,
            LoxError::Io { .. } => 66,
        }
    }
}

fn join_lines<E: ToString>(errors: &[E]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
