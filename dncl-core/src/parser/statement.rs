use std::rc::Rc;

use crate::{lexer::prelude::{LexResult, Token}, utils::{prelude::SrcSpan, stack::ensure_sufficient_stack}};
use super::ast::{
    Alternative, Assignment, Block, Conditional, CountedLoop, Direction, DoUntilLoop, Expression,
    FunctionDefinition, FunctionLiteral, Identifier, Increment, Program, Return, Statement, WhileLoop
};
use super::error::{ParseError, ParseErrorType};
use super::parser::{parse_error, Parse, Parser, Precedence};

impl<T: Iterator<Item = LexResult>> Parse<T> for Program {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let statements = parser.parse_statements(|token| matches!(token, Token::Eof | Token::Dedent))?;

        if *parser.current() == Token::Dedent {
            return parser.unexpected(vec!["文".to_string()]);
        }

        let location = match (statements.first(), statements.last()) {
            (Some(first), Some(last)) => first.location().to(last.location()),
            _ => SrcSpan::default()
        };

        Ok(Self {
            statements,
            location
        })
    }
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Block {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let (start, colon_end) = match parser.current() {
            Token::Colon => parser.expect_one(Token::Colon)?,
            Token::Eof => return parse_error(ParseErrorType::UnexpectedEof, parser.current_span()),
            _ => return parse_error(ParseErrorType::ExpectedBlock, parser.current_span())
        };

        if *parser.current() != Token::Newline {
            let mut statements = vec![Statement::parse(parser, None)?];

            while *parser.current() == Token::Comma {
                parser.step()?;
                statements.push(Statement::parse(parser, None)?);
            }

            parser.closed_block = false;

            let end = statements.last()
                .map_or(colon_end, |statement| statement.location().end);

            return Ok(Self {
                statements,
                location: SrcSpan { start, end }
            });
        }

        parser.step()?;

        if *parser.current() != Token::Indent {
            return parse_error(ParseErrorType::ExpectedBlock, parser.current_span());
        }

        parser.step()?;

        let statements = parser.parse_statements(|token| matches!(token, Token::Dedent | Token::Eof))?;

        let end = statements.last()
            .map_or(colon_end, |statement| statement.location().end);

        parser.expect_one(Token::Dedent)?;
        parser.closed_block = true;

        Ok(Self {
            statements,
            location: SrcSpan { start, end }
        })
    }
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Statement {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        ensure_sufficient_stack(|| {
            parser.closed_block = false;

            match (parser.current(), parser.peek()) {
                (Token::Function, Token::Ident(_)) => {
                    Ok(Self::FunctionDefinition(FunctionDefinition::parse(parser, None)?))
                },
                (Token::If, _) => Ok(Self::Conditional(Conditional::parse(parser, None)?)),
                (Token::Loop, _) => Ok(Self::DoUntilLoop(DoUntilLoop::parse(parser, None)?)),
                (Token::Indent, _) => parse_error(ParseErrorType::UnexpectedIndent, parser.current_span()),
                _ => parse_expression_statement(parser)
            }
        })
    }
}

/// Statements that open with an expression and are told apart by what follows it.
fn parse_expression_statement<T: Iterator<Item = LexResult>>(parser: &mut Parser<T>) -> Result<Statement, ParseError> {
    let expression = Expression::parse(parser, None)?;

    match parser.current() {
        Token::Assign => {
            ensure_assignable(&expression)?;
            parser.step()?;

            let value = Expression::parse(parser, None)?;
            let location = expression.location().to(value.location());

            Ok(Statement::Assignment(Assignment {
                target: expression,
                value,
                location
            }))
        },
        Token::Wo => {
            parser.step()?;

            let operand = Expression::parse(parser, None)?;

            match parser.current() {
                Token::From => parse_counted_loop(parser, expression, operand),
                Token::Increment | Token::Decrement => {
                    ensure_assignable(&expression)?;

                    let (_, token, end) = parser.step()?;
                    let direction = match token {
                        Token::Increment => Direction::Increasing,
                        _ => Direction::Decreasing,
                    };

                    Ok(Statement::Increment(Increment {
                        location: SrcSpan { start: expression.location().start, end },
                        target: expression,
                        amount: operand,
                        direction,
                    }))
                },
                _ => parser.unexpected(vec![
                    Token::From.as_literal(),
                    Token::Increment.as_literal(),
                    Token::Decrement.as_literal(),
                ])
            }
        },
        Token::While => {
            parser.step()?;

            if *parser.current() == Token::Repeat {
                parser.step()?;
            }

            let body = Block::parse(parser, None)?;
            let location = expression.location().to(body.location);

            Ok(Statement::WhileLoop(WhileLoop {
                condition: expression,
                body,
                location
            }))
        },
        Token::Return => {
            let (_, end) = parser.expect_one(Token::Return)?;
            let location = SrcSpan { start: expression.location().start, end };

            Ok(Statement::Return(Return {
                value: expression,
                location
            }))
        },
        _ => Ok(Statement::Expression(expression))
    }
}

fn ensure_assignable(target: &Expression) -> Result<(), ParseError> {
    if target.is_assignable() {
        return Ok(());
    }

    parse_error(ParseErrorType::InvalidAssignmentTarget, target.location())
}

// <identifier> を <from> から <to> まで <step> ずつ (増やしながら | 減らしながら) [繰り返す] <block>
fn parse_counted_loop<T: Iterator<Item = LexResult>>(
    parser: &mut Parser<T>,
    variable: Expression,
    from: Expression
) -> Result<Statement, ParseError> {
    let variable = match variable {
        Expression::Identifier(ident) => ident,
        other => return parse_error(ParseErrorType::InvalidAssignmentTarget, other.location())
    };

    parser.expect_one(Token::From)?;
    let to = Expression::parse(parser, None)?;

    parser.expect_one(Token::To)?;
    let step = Expression::parse(parser, None)?;

    parser.expect_one(Token::By)?;

    let direction = match parser.current() {
        Token::Increasing => Direction::Increasing,
        Token::Decreasing => Direction::Decreasing,
        _ => return parser.unexpected(vec![
            Token::Increasing.as_literal(),
            Token::Decreasing.as_literal(),
        ])
    };

    parser.step()?;

    if *parser.current() == Token::Repeat {
        parser.step()?;
    }

    let body = Block::parse(parser, None)?;
    let location = variable.location.to(body.location);

    Ok(Statement::CountedLoop(CountedLoop {
        variable,
        from,
        to,
        step,
        direction,
        body,
        location
    }))
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Conditional {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        // `そうでなくもし` opens a nested conditional the same way `もし` does
        let (start, _) = match parser.current() {
            Token::ElseIf => parser.expect_one(Token::ElseIf)?,
            _ => parser.expect_one(Token::If)?,
        };

        let condition = Expression::parse(parser, None)?;

        parser.expect_one(Token::Then)?;

        let consequence = Block::parse(parser, None)?;
        let mut end = consequence.location.end;

        parser.skip_newline_if(|token| matches!(token, Token::ElseIf | Token::Else))?;

        let alternative = match parser.current() {
            Token::ElseIf => {
                let conditional = Conditional::parse(parser, None)?;
                end = conditional.location.end;

                Some(Box::new(Alternative::ElseIf(conditional)))
            },
            Token::Else => {
                parser.step()?;

                let block = Block::parse(parser, None)?;
                end = block.location.end;

                Some(Box::new(Alternative::Else(block)))
            },
            _ => None
        };

        Ok(Self {
            condition,
            consequence,
            alternative,
            location: SrcSpan { start, end }
        })
    }
}

impl<T: Iterator<Item = LexResult>> Parse<T> for DoUntilLoop {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::Loop)?;

        let body = Block::parse(parser, None)?;

        parser.skip_newline_if(|token| *token == Token::Wo)?;
        parser.expect_one(Token::Wo)?;

        if *parser.current() == Token::Comma {
            parser.step()?;
        }

        let condition = Expression::parse(parser, None)?;
        let (_, end) = parser.expect_one(Token::Until)?;

        parser.closed_block = false;

        Ok(Self {
            body,
            condition,
            location: SrcSpan { start, end }
        })
    }
}

impl<T: Iterator<Item = LexResult>> Parse<T> for FunctionDefinition {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::Function)?;
        let name = Identifier::from(parser.expect_ident()?);

        let function = parse_function_literal(parser, start)?;
        let location = SrcSpan { start, end: function.location.end };

        Ok(Self {
            name,
            function: Rc::new(function),
            location
        })
    }
}

/// Everything after `関数` and the optional name: parameters, `を`, body, `と定義する`.
pub(crate) fn parse_function_literal<T: Iterator<Item = LexResult>>(
    parser: &mut Parser<T>,
    start: u32
) -> Result<FunctionLiteral, ParseError> {
    parser.expect_one(Token::LParen)?;

    let mut parameters = vec![];

    if *parser.current() != Token::RParen {
        loop {
            parameters.push(Identifier::from(parser.expect_ident()?));

            if *parser.current() != Token::Comma {
                break;
            }

            parser.step()?;
        }
    }

    parser.expect_one(Token::RParen)?;
    parser.expect_one(Token::Wo)?;

    let body = Block::parse(parser, None)?;

    parser.skip_newline_if(|token| *token == Token::EndFunction)?;
    let (_, end) = parser.expect_one(Token::EndFunction)?;

    parser.closed_block = false;

    Ok(FunctionLiteral {
        parameters,
        body,
        location: SrcSpan { start, end }
    })
}
