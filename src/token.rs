use std::fmt;

/// Byte range of a token inside the source buffer.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Token {
    pub(crate) kind: Kind,
    pub(crate) keyword: Option<Keyword>,
    pub(crate) span: Span,
}

impl Token {
    /// Sentinel used before the first advance and once input is exhausted.
    pub fn none(offset: usize) -> Self {
        Self {
            kind: Kind::Eof,
            keyword: None,
            span: Span::new(offset, offset),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn keyword(&self) -> Option<Keyword> {
        self.keyword
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn is_eof(&self) -> bool {
        self.kind == Kind::Eof
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Kind {
    Keyword,
    Symbol,
    Identifier,
    IntegerConstant,
    StringConstant,

    Eof         // No token: before the first advance, or past the end
}

impl Kind {
    /// Element name used when the token is emitted as a trace leaf.
    pub fn tag(&self) -> &'static str {
        match self {
            Kind::Keyword => "keyword",
            Kind::Symbol => "symbol",
            Kind::Identifier => "identifier",
            Kind::IntegerConstant => "integerConstant",
            Kind::StringConstant => "stringConstant",
            Kind::Eof => "eof",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Kind::Eof => write!(f, "end of input"),
            kind => write!(f, "{}", kind.tag()),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Keyword {
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

pub static KEYWORDS: [(&str, Keyword); 21] = [
    ("class", Keyword::Class),
    ("constructor", Keyword::Constructor),
    ("function", Keyword::Function),
    ("method", Keyword::Method),
    ("field", Keyword::Field),
    ("static", Keyword::Static),
    ("var", Keyword::Var),
    ("int", Keyword::Int),
    ("char", Keyword::Char),
    ("boolean", Keyword::Boolean),
    ("void", Keyword::Void),
    ("true", Keyword::True),
    ("false", Keyword::False),
    ("null", Keyword::Null),
    ("this", Keyword::This),
    ("let", Keyword::Let),
    ("do", Keyword::Do),
    ("if", Keyword::If),
    ("else", Keyword::Else),
    ("while", Keyword::While),
    ("return", Keyword::Return),
];

pub const SYMBOLS: &[u8] = b"{}()[].,;+-*/&|<>=~";

impl Keyword {
    pub fn lookup(ident: &str) -> Option<Keyword> {
        KEYWORDS
            .iter()
            .find(|(text, _)| *text == ident)
            .map(|(_, keyword)| *keyword)
    }

    pub fn as_str(&self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|(_, keyword)| keyword == self)
            .map(|(text, _)| *text)
            .unwrap_or("")
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn is_symbol(byte: u8) -> bool {
    SYMBOLS.contains(&byte)
}
