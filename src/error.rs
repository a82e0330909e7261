use crate::token::{Keyword, Kind};
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("FileNotFoundError: {0}")]
    FileNotFound(String),
    #[error("IOError: {}: {source}", .path.display())]
    IO {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    LexingError(#[from] LexingError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("OutputError: {0}")]
    Output(#[from] io::Error),
    #[error("ConfigError: {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
    #[error("EnvError: {var}: {message}")]
    Env { var: &'static str, message: String },
}

impl CompilerError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CompilerError::IO {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum LexingErrorKind {
    UnrecognizedCharacter(u8),
    EndOfInput,
}

impl fmt::Display for LexingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LexingErrorKind::UnrecognizedCharacter(byte) if byte.is_ascii_graphic() => {
                write!(f, "Unrecognized character '{}'", *byte as char)
            }
            LexingErrorKind::UnrecognizedCharacter(byte) => {
                write!(f, "Unrecognized character 0x{:02x}", byte)
            }
            LexingErrorKind::EndOfInput => write!(f, "Advanced past the end of input"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("LexingError: {kind}\n  --> {}:{line}:{column}", .path.display())]
pub struct LexingError {
    pub(crate) kind: LexingErrorKind,
    pub(crate) path: PathBuf,
    pub(crate) offset: usize,
    pub(crate) line: usize,
    pub(crate) column: usize,
}

impl LexingError {
    pub fn new(kind: LexingErrorKind, path: PathBuf, offset: usize, line: usize, column: usize) -> Self {
        Self {
            kind,
            path,
            offset,
            line,
            column,
        }
    }

    pub fn kind(&self) -> &LexingErrorKind {
        &self.kind
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// What a consumption primitive was looking for when it failed.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Expected {
    Keyword(Keyword),
    OneOf(&'static [Keyword]),
    Identifier,
    Symbol(char),
    Type,
    ReturnType,
    Term,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expected::Keyword(keyword) => write!(f, "keyword '{}'", keyword),
            Expected::OneOf(keywords) => {
                let names: Vec<&str> = keywords.iter().map(|k| k.as_str()).collect();
                write!(f, "one of '{}'", names.join("', '"))
            }
            Expected::Identifier => write!(f, "identifier"),
            Expected::Symbol(c) => write!(f, "symbol '{}'", c),
            Expected::Type => write!(f, "type (int, char, boolean or a class name)"),
            Expected::ReturnType => write!(f, "return type (void or a type)"),
            Expected::Term => write!(f, "term"),
        }
    }
}

/// The token actually sitting at the cursor when a primitive failed.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Found {
    pub kind: Kind,
    pub lexeme: String,
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            Kind::Eof => write!(f, "end of input"),
            kind => write!(f, "{} '{}'", kind, self.lexeme),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum SyntaxError {
    #[error("SyntaxError: expected {expected}, found {found}\n  --> {}:{line}:{column}", .path.display())]
    UnexpectedToken {
        expected: Expected,
        found: Found,
        path: PathBuf,
        offset: usize,
        line: usize,
        column: usize,
    },
}

impl SyntaxError {
    pub fn expected(&self) -> &Expected {
        match self {
            SyntaxError::UnexpectedToken { expected, .. } => expected,
        }
    }

    pub fn found(&self) -> &Found {
        match self {
            SyntaxError::UnexpectedToken { found, .. } => found,
        }
    }

    pub fn offset(&self) -> usize {
        match self {
            SyntaxError::UnexpectedToken { offset, .. } => *offset,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
#[error("BufferTooSmall: lexeme needs {needed} bytes, destination holds {available}")]
pub struct BufferTooSmall {
    pub needed: usize,
    pub available: usize,
}
