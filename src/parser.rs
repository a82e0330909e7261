use tracing::{trace, warn};
use crate::error::{CompilerError, Expected, Found, SyntaxError};
use crate::lexer::Lexer;
use crate::token::{Keyword, Kind};
use crate::writer::Emit;

const CLASS_VAR_KEYWORDS: &[Keyword] = &[Keyword::Static, Keyword::Field];
const SUBROUTINE_KEYWORDS: &[Keyword] = &[Keyword::Constructor, Keyword::Function, Keyword::Method];
const STATEMENT_KEYWORDS: &[Keyword] = &[
    Keyword::Let,
    Keyword::Do,
    Keyword::If,
    Keyword::While,
    Keyword::Return,
];
const TYPE_KEYWORDS: &[Keyword] = &[Keyword::Int, Keyword::Char, Keyword::Boolean];
const KEYWORD_CONSTANTS: &[Keyword] = &[Keyword::True, Keyword::False, Keyword::Null, Keyword::This];

const BINARY_OPS: &[u8] = b"+-*/&|<>=";
const UNARY_OPS: &[u8] = b"-~";

type ParseResult = Result<(), CompilerError>;

/// Recursive-descent compilation engine.
///
/// One method per non-terminal. Every rule emits its opening element, its
/// terminals and sub-rules in grammar order, then its closing element. The
/// first mismatch aborts the whole parse; whatever was already emitted stays
/// in the sink.
pub struct Parser<'p, 'a, E: Emit> {
    lexer: &'p mut Lexer<'a>,
    out: &'p mut E,
    depth: usize,
}

impl<'p, 'a, E: Emit> Parser<'p, 'a, E> {
    /// The lexer must already sit on its first token (see [`Lexer::prime`]).
    pub fn new(lexer: &'p mut Lexer<'a>, out: &'p mut E) -> Self {
        Self {
            lexer,
            out,
            depth: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// class := 'class' identifier '{' classVarDec* subroutineDec* '}'
    pub fn compile_class(&mut self) -> ParseResult {
        self.rule("class", |p| {
            p.expect_keyword(Keyword::Class)?;
            p.expect_identifier()?;
            p.expect_symbol('{')?;

            while p.at_any_keyword(CLASS_VAR_KEYWORDS) {
                p.compile_class_var_dec()?;
            }

            while p.at_any_keyword(SUBROUTINE_KEYWORDS) {
                p.compile_subroutine_dec()?;
            }

            // Nothing after the closing brace is scanned until </class> is out.
            if !p.at_symbol('}') {
                return Err(p.unexpected(Expected::Symbol('}')));
            }
            p.leaf_current()
        })?;

        if let Err(err) = self.lexer.step() {
            warn!(
                path = %self.lexer.file_name().display(),
                offset = err.offset(),
                "ignoring unreadable input after the end of the class"
            );
            return Ok(());
        }

        if !self.lexer.current().is_eof() {
            let token = *self.lexer.current();
            warn!(
                path = %self.lexer.file_name().display(),
                offset = token.span().start,
                lexeme = self.lexer.lexeme(&token),
                "ignoring input after the end of the class"
            );
        }

        Ok(())
    }

    /// Runs `body` inside an element named `tag`. The depth is restored on
    /// every path; the closing element is only written on success.
    fn rule(&mut self, tag: &'static str, body: impl FnOnce(&mut Self) -> ParseResult) -> ParseResult {
        trace!(tag, depth = self.depth, "enter");
        self.out.open(self.depth, tag)?;

        self.depth += 1;
        let result = body(self);
        self.depth -= 1;

        result?;
        self.out.close(self.depth, tag)?;
        trace!(tag, depth = self.depth, "exit");
        Ok(())
    }

    fn compile_class_var_dec(&mut self) -> ParseResult {
        self.rule("classVarDec", |p| {
            if p.expect_one_of_keywords(CLASS_VAR_KEYWORDS)?.is_none() {
                return Err(p.unexpected(Expected::OneOf(CLASS_VAR_KEYWORDS)));
            }
            p.expect_type()?;
            p.expect_identifier()?;
            p.compile_name_list()
        })
    }

    fn compile_subroutine_dec(&mut self) -> ParseResult {
        self.rule("subroutineDec", |p| {
            if p.expect_one_of_keywords(SUBROUTINE_KEYWORDS)?.is_none() {
                return Err(p.unexpected(Expected::OneOf(SUBROUTINE_KEYWORDS)));
            }

            if p.at_keyword(Keyword::Void) {
                p.expect_keyword(Keyword::Void)?;
            } else if p.at_type() {
                p.expect_type()?;
            } else {
                return Err(p.unexpected(Expected::ReturnType));
            }

            p.expect_identifier()?;
            p.expect_symbol('(')?;
            p.compile_parameter_list()?;
            p.expect_symbol(')')?;
            p.compile_subroutine_body()
        })
    }

    fn compile_parameter_list(&mut self) -> ParseResult {
        self.rule("parameterList", |p| {
            if p.at_symbol(')') {
                return Ok(());
            }

            p.expect_type()?;
            p.expect_identifier()?;

            loop {
                if p.at_symbol(')') {
                    return Ok(());
                }
                p.expect_symbol(',')?;
                p.expect_type()?;
                p.expect_identifier()?;
            }
        })
    }

    fn compile_subroutine_body(&mut self) -> ParseResult {
        self.rule("subroutineBody", |p| {
            p.expect_symbol('{')?;

            while p.at_keyword(Keyword::Var) {
                p.compile_var_dec()?;
            }

            p.compile_statements()?;
            p.expect_symbol('}')
        })
    }

    fn compile_var_dec(&mut self) -> ParseResult {
        self.rule("varDec", |p| {
            p.expect_keyword(Keyword::Var)?;
            p.expect_type()?;
            p.expect_identifier()?;
            p.compile_name_list()
        })
    }

    /// Tail of `identifier (',' identifier)* ';'`: the terminator is tried
    /// before the separator on every round.
    fn compile_name_list(&mut self) -> ParseResult {
        loop {
            if self.try_symbol(';')? {
                return Ok(());
            }
            self.expect_symbol(',')?;
            self.expect_identifier()?;
        }
    }

    // statement*
    fn compile_statements(&mut self) -> ParseResult {
        while self.at_any_keyword(STATEMENT_KEYWORDS) {
            self.compile_statement()?;
        }
        Ok(())
    }

    fn compile_statement(&mut self) -> ParseResult {
        self.rule("statement", |p| match p.lexer.current().keyword() {
            Some(Keyword::Let) => p.compile_let(),
            Some(Keyword::Do) => p.compile_do(),
            Some(Keyword::If) => p.compile_if(),
            Some(Keyword::While) => p.compile_while(),
            Some(Keyword::Return) => p.compile_return(),
            _ => Err(p.unexpected(Expected::OneOf(STATEMENT_KEYWORDS))),
        })
    }

    fn compile_let(&mut self) -> ParseResult {
        self.rule("letStatement", |p| {
            p.expect_keyword(Keyword::Let)?;
            p.expect_identifier()?;

            if p.try_symbol('[')? {
                p.compile_expression()?;
                p.expect_symbol(']')?;
            }

            p.expect_symbol('=')?;
            p.compile_expression()?;
            p.expect_symbol(';')
        })
    }

    fn compile_do(&mut self) -> ParseResult {
        self.rule("doStatement", |p| {
            p.expect_keyword(Keyword::Do)?;
            p.compile_subroutine_call()?;
            p.expect_symbol(';')
        })
    }

    fn compile_if(&mut self) -> ParseResult {
        self.rule("ifStatement", |p| {
            p.expect_keyword(Keyword::If)?;
            p.compile_condition()?;
            p.compile_block()?;

            if p.at_keyword(Keyword::Else) {
                p.expect_keyword(Keyword::Else)?;
                p.compile_block()?;
            }
            Ok(())
        })
    }

    fn compile_while(&mut self) -> ParseResult {
        self.rule("whileStatement", |p| {
            p.expect_keyword(Keyword::While)?;
            p.compile_condition()?;
            p.compile_block()
        })
    }

    fn compile_return(&mut self) -> ParseResult {
        self.rule("returnStatement", |p| {
            p.expect_keyword(Keyword::Return)?;
            if !p.at_symbol(';') {
                p.compile_expression()?;
            }
            p.expect_symbol(';')
        })
    }

    // '(' expression ')'
    fn compile_condition(&mut self) -> ParseResult {
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')
    }

    // '{' statement* '}'
    fn compile_block(&mut self) -> ParseResult {
        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')
    }

    fn compile_expression(&mut self) -> ParseResult {
        self.rule("expression", |p| {
            p.compile_term()?;
            while p.at_symbol_in(BINARY_OPS) {
                p.emit_current()?;
                p.compile_term()?;
            }
            Ok(())
        })
    }

    fn compile_term(&mut self) -> ParseResult {
        self.rule("term", |p| {
            let token = *p.lexer.current();
            match token.kind() {
                Kind::IntegerConstant | Kind::StringConstant => p.emit_current(),
                Kind::Keyword if token.keyword().is_some_and(|k| KEYWORD_CONSTANTS.contains(&k)) => {
                    p.emit_current()
                }
                // The first byte after the identifier decides between a call
                // and a variable, before the identifier is consumed.
                Kind::Identifier if matches!(p.lexer.peek_next_char(), Some(b'(' | b'.')) => {
                    p.compile_subroutine_call()
                }
                Kind::Identifier => {
                    p.emit_current()?;
                    if p.try_symbol('[')? {
                        p.compile_expression()?;
                        p.expect_symbol(']')
                    } else {
                        Ok(())
                    }
                }
                Kind::Symbol if p.at_symbol('(') => {
                    p.emit_current()?;
                    p.compile_expression()?;
                    p.expect_symbol(')')
                }
                Kind::Symbol if p.at_symbol_in(UNARY_OPS) => {
                    p.emit_current()?;
                    p.compile_term()
                }
                _ => Err(p.unexpected(Expected::Term)),
            }
        })
    }

    /// subroutineCall := identifier ('.' identifier)? '(' expressionList ')'
    fn compile_subroutine_call(&mut self) -> ParseResult {
        self.rule("subroutineCall", |p| {
            p.expect_identifier()?;
            if p.try_symbol('.')? {
                p.expect_identifier()?;
            }
            p.expect_symbol('(')?;
            p.compile_expression_list()?;
            p.expect_symbol(')')
        })
    }

    fn compile_expression_list(&mut self) -> ParseResult {
        self.rule("expressionList", |p| {
            if p.at_symbol(')') {
                return Ok(());
            }

            p.compile_expression()?;

            loop {
                if p.at_symbol(')') {
                    return Ok(());
                }
                p.expect_symbol(',')?;
                p.compile_expression()?;
            }
        })
    }

    fn at_keyword(&self, keyword: Keyword) -> bool {
        self.lexer.current().keyword() == Some(keyword)
    }

    fn at_any_keyword(&self, keywords: &[Keyword]) -> bool {
        keywords.iter().any(|k| self.at_keyword(*k))
    }

    fn at_symbol(&self, symbol: char) -> bool {
        self.lexer.current().kind() == Kind::Symbol && self.lexer.peek_char() == Some(symbol as u8)
    }

    fn at_symbol_in(&self, symbols: &[u8]) -> bool {
        self.lexer.current().kind() == Kind::Symbol
            && self.lexer.peek_char().is_some_and(|c| symbols.contains(&c))
    }

    fn at_type(&self) -> bool {
        self.at_any_keyword(TYPE_KEYWORDS) || self.lexer.current().kind() == Kind::Identifier
    }

    /// Emits the current token as a leaf and moves on.
    fn emit_current(&mut self) -> ParseResult {
        self.leaf_current()?;
        self.lexer.step()?;
        Ok(())
    }

    fn leaf_current(&mut self) -> ParseResult {
        let token = *self.lexer.current();
        let text = self.lexer.lexeme(&token);
        self.out.leaf(self.depth, token.kind().tag(), text)?;
        Ok(())
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> ParseResult {
        if !self.at_keyword(keyword) {
            return Err(self.unexpected(Expected::Keyword(keyword)));
        }
        self.emit_current()
    }

    fn expect_identifier(&mut self) -> ParseResult {
        if self.lexer.current().kind() != Kind::Identifier {
            return Err(self.unexpected(Expected::Identifier));
        }
        self.emit_current()
    }

    fn expect_symbol(&mut self, symbol: char) -> ParseResult {
        if !self.at_symbol(symbol) {
            return Err(self.unexpected(Expected::Symbol(symbol)));
        }
        self.emit_current()
    }

    /// Consumes the first keyword of `keywords` that matches, in order.
    /// No match is not an error; the caller decides.
    fn expect_one_of_keywords(&mut self, keywords: &[Keyword]) -> Result<Option<Keyword>, CompilerError> {
        for keyword in keywords {
            if self.at_keyword(*keyword) {
                self.emit_current()?;
                return Ok(Some(*keyword));
            }
        }
        Ok(None)
    }

    fn expect_type(&mut self) -> ParseResult {
        if self.expect_one_of_keywords(TYPE_KEYWORDS)?.is_some() {
            return Ok(());
        }
        if self.lexer.current().kind() != Kind::Identifier {
            return Err(self.unexpected(Expected::Type));
        }
        self.emit_current()
    }

    fn try_symbol(&mut self, symbol: char) -> Result<bool, CompilerError> {
        if !self.at_symbol(symbol) {
            return Ok(false);
        }
        self.emit_current()?;
        Ok(true)
    }

    fn unexpected(&self, expected: Expected) -> CompilerError {
        let token = self.lexer.current();
        let offset = token.span().start;
        let (line, column) = self.lexer.location(offset);

        SyntaxError::UnexpectedToken {
            expected,
            found: Found {
                kind: token.kind(),
                lexeme: self.lexer.lexeme(token).to_string(),
            },
            path: self.lexer.file_name().to_path_buf(),
            offset,
            line,
            column,
        }
        .into()
    }
}
