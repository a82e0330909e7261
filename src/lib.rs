//! Syntax analyzer for the Jack language.
//!
//! Source text goes through an on-demand [`Lexer`] into a recursive-descent
//! [`Parser`], which validates it against the Jack grammar and writes one
//! indented XML element per rule and per token through an [`Emit`] sink.

pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod source;
pub mod token;
pub mod writer;

pub use config::Config;
pub use error::{BufferTooSmall, CompilerError, Expected, Found, LexingError, SyntaxError};
pub use lexer::Lexer;
pub use parser::Parser;
pub use source::{collect_sources, SourceFile};
pub use token::{Keyword, Kind, Span, Token};
pub use writer::{Emit, XmlWriter};

use tracing::debug;

/// Parses one class and streams its trace into `out`.
pub fn compile_source<E: Emit>(source: &SourceFile, out: &mut E) -> Result<(), CompilerError> {
    debug!(path = %source.path().display(), "compiling class");
    let mut lexer = Lexer::new(source.text(), source.path());
    lexer.prime()?;
    Parser::new(&mut lexer, out).compile_class()
}

/// Writes the flat token stream of `source` inside a `tokens` element.
pub fn dump_tokens<E: Emit>(source: &SourceFile, out: &mut E) -> Result<(), CompilerError> {
    debug!(path = %source.path().display(), "dumping tokens");
    let mut lexer = Lexer::new(source.text(), source.path());

    out.open(0, "tokens")?;
    while lexer.has_more() {
        lexer.advance()?;
        let token = *lexer.current();
        out.leaf(1, token.kind().tag(), lexer.lexeme(&token))?;
    }
    out.close(0, "tokens")?;
    Ok(())
}
