use std::path::Path;
use tracing::trace;
use crate::error::{BufferTooSmall, LexingError, LexingErrorKind};
use crate::token::{is_symbol, Keyword, Kind, Span, Token};

/// On-demand scanner over one source buffer.
///
/// Holds exactly the current token and the one before it. Whitespace and
/// `//` comments are skipped eagerly, after construction and after every
/// [`Lexer::advance`], so `has_more` is true only when a real token is left.
pub struct Lexer<'a> {
    source_code: &'a str,
    file_name: &'a Path,
    cursor: usize,
    current: Token,
    previous: Token,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, file_name: &'a Path) -> Self {
        let mut lexer = Self {
            source_code: input,
            file_name,
            cursor: 0,
            current: Token::none(0),
            previous: Token::none(0),
        };
        lexer.skip_trivia();
        lexer
    }

    fn at(&self) -> Option<u8> {
        self.source_code.as_bytes().get(self.cursor).copied()
    }

    fn at_offset(&self, offset: usize) -> Option<u8> {
        self.source_code.as_bytes().get(offset).copied()
    }

    fn is_eof(&self) -> bool {
        self.cursor >= self.source_code.len()
    }

    fn create_token(&self, kind: Kind, keyword: Option<Keyword>, start: usize, end: usize) -> Token {
        Token {
            kind,
            keyword,
            span: Span::new(start, end),
        }
    }

    fn error(&self, kind: LexingErrorKind, offset: usize) -> LexingError {
        let (line, column) = self.location(offset);
        LexingError::new(kind, self.file_name.to_path_buf(), offset, line, column)
    }

    fn skip_trivia(&mut self) {
        loop {
            let start = self.cursor;

            while matches!(self.at(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
                self.cursor += 1;
            }

            if self.at() == Some(b'/') && self.at_offset(self.cursor + 1) == Some(b'/') {
                while let Some(ch) = self.at() {
                    if ch == b'\n' {
                        break;
                    }
                    self.cursor += 1;
                }
            }

            if self.cursor == start {
                break;
            }
        }
    }

    fn take_while(&mut self, predicate: impl Fn(u8) -> bool) {
        while let Some(ch) = self.at() {
            if !predicate(ch) {
                break;
            }
            self.cursor += 1;
        }
    }

    pub fn has_more(&self) -> bool {
        !self.is_eof()
    }

    /// Scans the next token into `current`, shifting the old one to `previous`.
    pub fn advance(&mut self) -> Result<(), LexingError> {
        let start = self.cursor;
        let ch = match self.at() {
            Some(ch) => ch,
            None => return Err(self.error(LexingErrorKind::EndOfInput, start)),
        };

        let token = match ch {
            b'"' => {
                self.cursor += 1;
                let body = self.cursor;
                self.take_while(|c| c != b'"');
                let end = self.cursor;
                // Unterminated strings run to the end of the buffer.
                if !self.is_eof() {
                    self.cursor += 1;
                }
                self.create_token(Kind::StringConstant, None, body, end)
            }
            c if c.is_ascii_digit() => {
                self.take_while(|c| c.is_ascii_digit());
                self.create_token(Kind::IntegerConstant, None, start, self.cursor)
            }
            c if is_symbol(c) => {
                self.cursor += 1;
                self.create_token(Kind::Symbol, None, start, self.cursor)
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                self.take_while(|c| c.is_ascii_alphanumeric() || c == b'_');
                let ident = &self.source_code[start..self.cursor];
                match Keyword::lookup(ident) {
                    Some(keyword) => self.create_token(Kind::Keyword, Some(keyword), start, self.cursor),
                    None => self.create_token(Kind::Identifier, None, start, self.cursor),
                }
            }
            c => return Err(self.error(LexingErrorKind::UnrecognizedCharacter(c), start)),
        };

        trace!(kind = ?token.kind, lexeme = self.lexeme(&token), "advance");
        self.previous = std::mem::replace(&mut self.current, token);
        self.skip_trivia();
        Ok(())
    }

    /// Positions the lexer on its first token, if there is one.
    pub fn prime(&mut self) -> Result<(), LexingError> {
        if self.has_more() {
            self.advance()?;
        }
        Ok(())
    }

    /// Like [`Lexer::advance`], but parks on the end-of-input sentinel instead
    /// of failing when nothing is left.
    pub fn step(&mut self) -> Result<(), LexingError> {
        if self.has_more() {
            return self.advance();
        }
        let end = Token::none(self.source_code.len());
        self.previous = std::mem::replace(&mut self.current, end);
        Ok(())
    }

    pub fn current(&self) -> &Token {
        &self.current
    }

    pub fn previous(&self) -> &Token {
        &self.previous
    }

    pub fn file_name(&self) -> &Path {
        self.file_name
    }

    pub fn lexeme(&self, token: &Token) -> &'a str {
        &self.source_code[token.span.start..token.span.end]
    }

    /// First byte of the current token, for one-character lookahead.
    pub fn peek_char(&self) -> Option<u8> {
        if self.current.span.is_empty() {
            return None;
        }
        self.at_offset(self.current.span.start)
    }

    /// First byte of the token after the current one. Trivia is already
    /// skipped, so this is whatever sits at the cursor.
    pub fn peek_next_char(&self) -> Option<u8> {
        self.at()
    }

    /// Copies the lexeme of `token` plus a NUL terminator into `dest`,
    /// returning the lexeme length.
    pub fn string_value(&self, token: &Token, dest: &mut [u8]) -> Result<usize, BufferTooSmall> {
        let bytes = self.lexeme(token).as_bytes();
        let needed = bytes.len() + 1;
        if dest.len() < needed {
            return Err(BufferTooSmall {
                needed,
                available: dest.len(),
            });
        }
        dest[..bytes.len()].copy_from_slice(bytes);
        dest[bytes.len()] = 0;
        Ok(bytes.len())
    }

    /// 1-based line and column of a byte offset.
    pub fn location(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.source_code.len());
        let before = &self.source_code.as_bytes()[..offset];
        let line = before.iter().filter(|&&c| c == b'\n').count() + 1;
        let line_start = before
            .iter()
            .rposition(|&c| c == b'\n')
            .map(|pos| pos + 1)
            .unwrap_or(0);
        (line, offset - line_start + 1)
    }

    /// Drains the remaining input into a token list.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexingError> {
        let mut tokens = Vec::new();
        while self.has_more() {
            self.advance()?;
            tokens.push(self.current);
        }
        Ok(tokens)
    }
}
