use crate::{lexer::prelude::{LexResult, Lexer, Spanned, Token}, utils::prelude::SrcSpan};
use super::error::{ParseError, ParseErrorType};
use super::ast::{Expression, Program, Statement};

pub trait Parse<T: Iterator<Item = LexResult>>
    where Self: Sized,
{
    fn parse(
        parser: &mut Parser<T>,
        precedence: Option<Precedence>
    ) -> Result<Self, ParseError>;
}

pub trait InfixParse<T: Iterator<Item = LexResult>>
    where Self: Sized,
{
    fn parse(
        parser: &mut Parser<T>,
        left: Expression,
        precedence: Option<Precedence>
    ) -> Result<Self, ParseError>;
}

pub struct Parser<T: Iterator<Item = LexResult>> {
    pub current_token: Spanned,
    pub next_token: Spanned,

    /// Set when the last parsed block was closed by a `Dedent`, so the
    /// statement owning it needs no separate terminator.
    pub(crate) closed_block: bool,

    tokens: T,
    end_of_input: u32,
}

impl<T: Iterator<Item = LexResult>> Parser<T> {
    /// Primes both lookahead tokens; a lex error there fails construction.
    pub fn new(input: T) -> Result<Self, ParseError> {
        let mut parser = Self {
            current_token: (0, Token::Eof, 0),
            next_token: (0, Token::Eof, 0),
            closed_block: false,

            tokens: input,
            end_of_input: 0,
        };

        parser.step()?;
        parser.step()?;

        Ok(parser)
    }

    /// Advances by one token and returns the one that was current.
    pub fn step(&mut self) -> Result<Spanned, ParseError> {
        let pulled = match self.tokens.next() {
            Some(Ok(token)) => token,
            Some(Err(error)) => return parse_error(
                ParseErrorType::LexError { error },
                error.location
            ),
            None => (self.end_of_input, Token::Eof, self.end_of_input)
        };

        self.end_of_input = self.end_of_input.max(pulled.2);

        let next = std::mem::replace(&mut self.next_token, pulled);

        Ok(std::mem::replace(&mut self.current_token, next))
    }

    pub fn current(&self) -> &Token {
        &self.current_token.1
    }

    pub fn peek(&self) -> &Token {
        &self.next_token.1
    }

    pub fn current_span(&self) -> SrcSpan {
        SrcSpan { start: self.current_token.0, end: self.current_token.2 }
    }

    pub fn current_precedence(&self) -> Precedence {
        Precedence::from(self.current())
    }

    pub fn skip_newlines(&mut self) -> Result<(), ParseError> {
        while *self.current() == Token::Newline {
            self.step()?;
        }

        Ok(())
    }

    /// Steps over a line break when the following line continues the
    /// current statement, e.g. `そうでなければ` after a one-line block.
    pub fn skip_newline_if(&mut self, continues: impl Fn(&Token) -> bool) -> Result<(), ParseError> {
        if *self.current() == Token::Newline && continues(self.peek()) {
            self.step()?;
        }

        Ok(())
    }

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        Program::parse(self, None)
    }

    /// Parses statements until `until` matches the current token.
    pub fn parse_statements(&mut self, until: impl Fn(&Token) -> bool) -> Result<Vec<Statement>, ParseError> {
        let mut statements = vec![];

        loop {
            self.skip_newlines()?;

            if until(self.current()) {
                return Ok(statements);
            }

            statements.push(Statement::parse(self, None)?);

            self.expect_statement_end()?;
        }
    }

    pub fn expect_statement_end(&mut self) -> Result<(), ParseError> {
        match self.current() {
            Token::Newline | Token::Comma => {
                self.step()?;
                Ok(())
            },
            Token::Dedent | Token::Eof => Ok(()),
            _ if self.closed_block => Ok(()),
            _ => self.unexpected(vec!["改行".to_string()])
        }
    }

    pub fn expect_one(&mut self, token: Token) -> Result<(u32, u32), ParseError> {
        if *self.current() == token {
            let (start, _, end) = self.step()?;

            return Ok((start, end));
        }

        self.unexpected(vec![token.as_literal()])
    }

    pub fn expect_ident(&mut self) -> Result<(u32, String, u32), ParseError> {
        match self.current() {
            Token::Ident(_) => match self.step()? {
                (start, Token::Ident(value), end) => Ok((start, value, end)),
                (start, _, end) => parse_error(ParseErrorType::ExpectedIdent, SrcSpan { start, end })
            },
            Token::Eof => parse_error(ParseErrorType::UnexpectedEof, self.current_span()),
            _ => parse_error(ParseErrorType::ExpectedIdent, self.current_span())
        }
    }

    /// Error for the current token, which is none of `expected`.
    pub fn unexpected<R>(&self, expected: Vec<String>) -> Result<R, ParseError> {
        match self.current() {
            Token::Eof => parse_error(ParseErrorType::UnexpectedEof, self.current_span()),
            Token::Indent => parse_error(ParseErrorType::UnexpectedIndent, self.current_span()),
            token => parse_error(
                ParseErrorType::UnexpectedToken {
                    token: token.clone(),
                    expected,
                },
                self.current_span()
            )
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum Precedence {
    Lowest,
    Or,
    And,
    Not,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

impl From<&Token> for Precedence {
    fn from(value: &Token) -> Self {
        match value {
            Token::Or => Self::Or,
            Token::And => Self::And,
            Token::Not => Self::Not,
            Token::Equal | Token::NotEqual => Self::Equals,
            Token::LessThan | Token::GreaterThan |
            Token::LessThanOrEqual | Token::GreaterThanOrEqual => Self::LessGreater,
            Token::Plus | Token::Minus => Self::Sum,
            Token::Asterisk | Token::Slash | Token::IntDiv | Token::Percent => Self::Product,
            Token::LParen | Token::LSBracket => Self::Call,
            _ => Self::Lowest,
        }
    }
}

pub fn parse_program(src: &str) -> Result<Program, ParseError> {
    let lexer = Lexer::new(src);
    let mut parser = Parser::new(lexer)?;

    parser.parse_program()
}

pub fn parse_error<T>(error: ParseErrorType, span: SrcSpan) -> Result<T, ParseError> {
    Err(ParseError { error, span })
}
