use std::rc::Rc;

use crate::{lexer::prelude::{LexResult, Token}, utils::{prelude::SrcSpan, stack::ensure_sufficient_stack}};
use super::ast::{
    ArrayLiteral, BuiltInFunction, BuiltinCall, Call, Expression, Identifier, Index, Infix, Prefix,
    Primitive, SystemCommand
};
use super::error::{ParseError, ParseErrorType};
use super::parser::{parse_error, InfixParse, Parse, Parser, Precedence};
use super::statement::parse_function_literal;

impl<T: Iterator<Item = LexResult>> Parse<T> for Expression {
    fn parse(
        parser: &mut Parser<T>,
        precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        ensure_sufficient_stack(|| parse_expression(parser, precedence))
    }
}

fn parse_expression<T: Iterator<Item = LexResult>>(
    parser: &mut Parser<T>,
    precedence: Option<Precedence>
) -> Result<Expression, ParseError> {
    let mut expr = match parser.current() {
        Token::Int(_) | Token::Str(_) => Expression::Primitive(Primitive::parse(parser, None)?),
        Token::System(_) => match parser.step()? {
            (start, Token::System(command), end) => {
                Expression::SystemCommand(SystemCommand::from_text(command, SrcSpan { start, end }))
            },
            (start, _, end) => return parse_error(ParseErrorType::ExpectedIdent, SrcSpan { start, end })
        },
        Token::Ident(name) => match (BuiltInFunction::from_name(name), parser.peek()) {
            (Some(function), Token::LParen) => Expression::BuiltinCall(parse_builtin_call(parser, function)?),
            _ => Expression::Identifier(Identifier::from(parser.expect_ident()?)),
        },
        Token::Minus | Token::Plus => Expression::Prefix(Prefix::parse(parser, None)?),
        Token::LParen => {
            let (start, _) = parser.expect_one(Token::LParen)?;

            let expression = Box::new(Expression::parse(parser, None)?);

            let (_, end) = parser.expect_one(Token::RParen)?;

            Expression::Nested {
                expression,
                location: SrcSpan { start, end }
            }
        },
        Token::LSBracket => Expression::Array(ArrayLiteral::parse(parser, None)?),
        Token::Function => {
            let (start, _) = parser.expect_one(Token::Function)?;

            Expression::Function(Rc::new(parse_function_literal(parser, start)?))
        },
        _ => return parser.unexpected(vec![
            "名前".to_string(),
            "整数".to_string(),
            "文字列".to_string(),
            "`(`".to_string(),
            "`[`".to_string(),
        ])
    };

    while precedence.unwrap_or(Precedence::Lowest) < parser.current_precedence() {
        expr = match parser.current() {
            Token::LParen => Expression::Call(Call::parse(parser, expr, precedence)?),
            Token::LSBracket => Expression::Index(Index::parse(parser, expr, precedence)?),
            Token::Not => {
                let (_, end) = parser.expect_one(Token::Not)?;
                let location = SrcSpan { start: expr.location().start, end };

                Expression::Prefix(Prefix {
                    operator: Token::Not,
                    expression: Box::new(expr),
                    location
                })
            },
            token if token.is_operator() => Expression::Infix(Infix::parse(parser, expr, precedence)?),
            _ => break
        }
    }

    Ok(expr)
}

/// Parses `( [ <expression> {, <expression> } ] )` and returns the closing paren's end.
fn parse_arguments<T: Iterator<Item = LexResult>>(parser: &mut Parser<T>) -> Result<(Vec<Expression>, u32), ParseError> {
    parse_list(parser, Token::LParen, Token::RParen)
}

fn parse_list<T: Iterator<Item = LexResult>>(
    parser: &mut Parser<T>,
    open: Token,
    close: Token
) -> Result<(Vec<Expression>, u32), ParseError> {
    parser.expect_one(open)?;

    let mut items = vec![];

    if *parser.current() != close {
        loop {
            items.push(Expression::parse(parser, None)?);

            if *parser.current() != Token::Comma {
                break;
            }

            parser.step()?;
        }
    }

    if *parser.current() != close {
        return parser.unexpected(vec![Token::Comma.as_literal(), close.as_literal()]);
    }

    let (_, end) = parser.expect_one(close)?;

    Ok((items, end))
}

fn parse_builtin_call<T: Iterator<Item = LexResult>>(
    parser: &mut Parser<T>,
    function: BuiltInFunction
) -> Result<BuiltinCall, ParseError> {
    let (start, _, _) = parser.expect_ident()?;
    let (mut arguments, end) = parse_arguments(parser)?;
    let location = SrcSpan { start, end };

    // `戻り値()` returns null
    if function == BuiltInFunction::Return && arguments.is_empty() {
        arguments.push(Expression::Primitive(Primitive::System { location }));
    }

    Ok(BuiltinCall {
        function,
        arguments,
        location
    })
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Primitive {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        match parser.step()? {
            (start, Token::Int(value), end) => Ok(Self::Int {
                value,
                location: SrcSpan { start, end }
            }),
            (start, Token::Str(value), end) => Ok(Self::Str {
                value,
                location: SrcSpan { start, end }
            }),
            (start, token, end) => parse_error(
                ParseErrorType::UnexpectedToken {
                    token,
                    expected: vec!["整数".to_string(), "文字列".to_string()]
                },
                SrcSpan { start, end }
            )
        }
    }
}

impl<T: Iterator<Item = LexResult>> Parse<T> for ArrayLiteral {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let start = parser.current_token.0;
        let (elements, end) = parse_list(parser, Token::LSBracket, Token::RSBracket)?;

        Ok(Self {
            elements,
            location: SrcSpan { start, end }
        })
    }
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Prefix {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let (start, operator, _) = parser.step()?;

        let expression = Expression::parse(parser, Some(Precedence::Prefix))?;
        let end = expression.location().end;

        Ok(Self {
            operator,
            expression: Box::new(expression),
            location: SrcSpan { start, end }
        })
    }
}

impl<T: Iterator<Item = LexResult>> InfixParse<T> for Infix {
    fn parse(
        parser: &mut Parser<T>,
        left: Expression,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let precedence = parser.current_precedence();

        let SrcSpan { start, .. } = left.location();

        let (_, operator, _) = parser.step()?;

        let right = Expression::parse(parser, Some(precedence))?;

        let SrcSpan { end, .. } = right.location();

        Ok(Self {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            location: SrcSpan { start, end }
        })
    }
}

impl<T: Iterator<Item = LexResult>> InfixParse<T> for Call {
    fn parse(
        parser: &mut Parser<T>,
        left: Expression,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let start = left.location().start;
        let (arguments, end) = parse_arguments(parser)?;

        Ok(Self {
            function: Box::new(left),
            arguments,
            location: SrcSpan { start, end }
        })
    }
}

impl<T: Iterator<Item = LexResult>> InfixParse<T> for Index {
    fn parse(
        parser: &mut Parser<T>,
        left: Expression,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let start = left.location().start;

        parser.expect_one(Token::LSBracket)?;
        let index = Expression::parse(parser, None)?;
        let (_, end) = parser.expect_one(Token::RSBracket)?;

        Ok(Self {
            array: Box::new(left),
            index: Box::new(index),
            location: SrcSpan { start, end }
        })
    }
}
