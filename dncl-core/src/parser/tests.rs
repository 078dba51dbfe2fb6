use pretty_assertions::assert_eq;

use crate::{
    lexer::prelude::{Lexer, LexicalErrorType, Token},
    parser::prelude::{
        parse_program, Alternative, BuiltInFunction, Direction, Expression, ParseError,
        ParseErrorType, Parser, Primitive, Statement, SystemCommand
    },
    utils::prelude::SrcSpan
};

const CURRYING: &str = r#"関数 add(n) を:
    関数 f(x) を:
      もし x == "" ならば:
        戻り値(n)
      そうでなければ:
        戻り値( add(x + n) )
    と定義する
    戻り値(f)
と定義する
表示する(add(1)(2)(3)(4)(""))
"#;

fn first_expression(src: &str) -> Expression {
    let program = parse_program(src).unwrap();

    match program.statements.into_iter().next() {
        Some(Statement::Expression(expression)) => expression,
        other => panic!("expected an expression statement, got {other:?}")
    }
}

#[test]
fn test_parser_construction_reports_lex_errors() {
    let err = Parser::new(Lexer::new("\"never closed")).err().unwrap();

    assert_eq!(
        err.error,
        ParseErrorType::LexError { error: crate::lexer::prelude::LexicalError {
            error: LexicalErrorType::UnterminatedString,
            location: SrcSpan::from(0, 1)
        }}
    );
    assert_eq!(err.span, SrcSpan::from(0, 1));
}

#[test]
fn test_precedence() -> Result<(), ParseError> {
    let expression = first_expression("1 + 2 * 3 == 7 かつ 4 - 1 > 2");

    let Expression::Infix(and) = expression else { panic!("expected infix") };
    assert_eq!(and.operator, Token::And);

    let Expression::Infix(equal) = *and.left else { panic!("expected infix") };
    assert_eq!(equal.operator, Token::Equal);

    let Expression::Infix(sum) = *equal.left else { panic!("expected infix") };
    assert_eq!(sum.operator, Token::Plus);
    assert!(matches!(*sum.right, Expression::Infix(ref product) if product.operator == Token::Asterisk));

    let Expression::Infix(greater) = *and.right else { panic!("expected infix") };
    assert_eq!(greater.operator, Token::GreaterThan);

    Ok(())
}

#[test]
fn test_left_associativity_and_grouping() -> Result<(), ParseError> {
    let Expression::Infix(outer) = first_expression("10 - 3 - 2") else { panic!("expected infix") };

    assert_eq!(outer.operator, Token::Minus);
    assert!(matches!(*outer.left, Expression::Infix(_)));
    assert!(matches!(*outer.right, Expression::Primitive(Primitive::Int { value: 2, .. })));

    let Expression::Infix(product) = first_expression("(1 + 2) * 3") else { panic!("expected infix") };

    assert_eq!(product.operator, Token::Asterisk);
    assert!(matches!(*product.left, Expression::Nested { .. }));

    Ok(())
}

#[test]
fn test_postfix_not() -> Result<(), ParseError> {
    let Expression::Prefix(not) = first_expression("x == 1 でない") else { panic!("expected prefix") };

    assert_eq!(not.operator, Token::Not);
    assert!(matches!(*not.expression, Expression::Infix(ref infix) if infix.operator == Token::Equal));
    assert_eq!(not.location, SrcSpan::from(0, "x == 1 でない".len() as u32));

    Ok(())
}

#[test]
fn test_chained_calls_and_indexes() -> Result<(), ParseError> {
    let Expression::Index(index) = first_expression("f(1)(2)[3]") else { panic!("expected index") };
    let Expression::Call(outer) = *index.array else { panic!("expected call") };
    let Expression::Call(inner) = *outer.function else { panic!("expected call") };

    assert!(matches!(*inner.function, Expression::Identifier(ref ident) if ident.value == "f"));
    assert_eq!(inner.arguments.len(), 1);
    assert_eq!(outer.arguments.len(), 1);
    assert_eq!(index.location, SrcSpan::from(0, 10));

    Ok(())
}

#[test]
fn test_builtin_calls() -> Result<(), ParseError> {
    let Expression::BuiltinCall(print) = first_expression("表示する(1, \"a\")") else { panic!("expected builtin") };

    assert_eq!(print.function, BuiltInFunction::Print);
    assert_eq!(print.arguments.len(), 2);

    let Expression::BuiltinCall(ret) = first_expression("戻り値()") else { panic!("expected builtin") };

    assert_eq!(ret.function, BuiltInFunction::Return);
    assert_eq!(
        ret.arguments,
        vec![Expression::Primitive(Primitive::System { location: ret.location })]
    );

    // without parentheses a builtin name is an ordinary identifier
    assert!(matches!(first_expression("要素数"), Expression::Identifier(_)));

    Ok(())
}

#[test]
fn test_system_commands() -> Result<(), ParseError> {
    let program = parse_program("x = 【外部からの入力】\n【画面を消す】")?;

    let Statement::Assignment(assignment) = &program.statements[0] else { panic!("expected assignment") };
    assert!(matches!(
        assignment.value,
        Expression::SystemCommand(SystemCommand::Input { location }) if location == SrcSpan::from(4, 31)
    ));

    let Statement::Expression(Expression::SystemCommand(SystemCommand::Unknown { command, .. })) = &program.statements[1] else {
        panic!("expected system command")
    };
    assert_eq!(command, "画面を消す");

    Ok(())
}

#[test]
fn test_array_literal_and_index_assignment() -> Result<(), ParseError> {
    let program = parse_program("a = [1, 2, [3]]\na[2] = 5\nb = []")?;

    let Statement::Assignment(first) = &program.statements[0] else { panic!("expected assignment") };
    assert!(matches!(first.value, Expression::Array(ref array) if array.elements.len() == 3));

    let Statement::Assignment(second) = &program.statements[1] else { panic!("expected assignment") };
    assert!(matches!(second.target, Expression::Index(_)));

    let Statement::Assignment(third) = &program.statements[2] else { panic!("expected assignment") };
    assert!(matches!(third.value, Expression::Array(ref array) if array.elements.is_empty()));

    Ok(())
}

#[test]
fn test_conditional_chain() -> Result<(), ParseError> {
    let src = "もし x < 0 ならば: y = -1\nそうでなくもし x == 0 ならば: y = 0\nそうでなければ:\n    y = 1\nz = y";
    let program = parse_program(src)?;

    assert_eq!(program.statements.len(), 2);

    let Statement::Conditional(conditional) = &program.statements[0] else { panic!("expected conditional") };
    let Some(Alternative::ElseIf(else_if)) = conditional.alternative.as_deref() else { panic!("expected else if") };
    let Some(Alternative::Else(block)) = else_if.alternative.as_deref() else { panic!("expected else") };

    assert_eq!(block.statements.len(), 1);
    assert!(matches!(program.statements[1], Statement::Assignment(_)));

    Ok(())
}

#[test]
fn test_counted_loop() -> Result<(), ParseError> {
    let src = "i を 10 から 1 まで 2 ずつ減らしながら繰り返す:\n    表示する(i)\n    合計 を i 増やす";
    let program = parse_program(src)?;

    let Statement::CountedLoop(loop_) = &program.statements[0] else { panic!("expected counted loop") };

    assert_eq!(loop_.variable.value, "i");
    assert_eq!(loop_.direction, Direction::Decreasing);
    assert_eq!(loop_.body.statements.len(), 2);
    assert!(matches!(
        loop_.body.statements[1],
        Statement::Increment(ref increment) if increment.direction == Direction::Increasing
    ));

    Ok(())
}

#[test]
fn test_while_and_do_until_loops() -> Result<(), ParseError> {
    let src = "x < 10 の間繰り返す:\n    x を 1 増やす\n繰り返し:\n    x を 1 減らす\nを, x == 0 になるまで実行する\n繰り返し: x = x + 1 を x > 3 になるまで実行する";
    let program = parse_program(src)?;

    assert_eq!(program.statements.len(), 3);
    assert!(matches!(program.statements[0], Statement::WhileLoop(_)));
    assert!(matches!(program.statements[1], Statement::DoUntilLoop(_)));
    assert!(matches!(program.statements[2], Statement::DoUntilLoop(ref loop_) if loop_.body.statements.len() == 1));

    Ok(())
}

#[test]
fn test_return_statement_and_anonymous_function() -> Result<(), ParseError> {
    let src = "関数 twice(f) を:\n    関数(x) を: f(f(x)) を返す と定義する を返す\nと定義する";
    let program = parse_program(src)?;

    let Statement::FunctionDefinition(definition) = &program.statements[0] else { panic!("expected definition") };
    assert_eq!(definition.name.value, "twice");
    assert_eq!(definition.function.parameters.len(), 1);

    let Statement::Return(ret) = &definition.function.body.statements[0] else { panic!("expected return") };
    assert!(matches!(ret.value, Expression::Function(ref function) if function.parameters[0].value == "x"));

    Ok(())
}

#[test]
fn test_comma_joined_statements() -> Result<(), ParseError> {
    let program = parse_program("a = 1, b = 2\nc = 3")?;

    assert_eq!(program.statements.len(), 3);

    Ok(())
}

#[test]
fn test_currying_program_round_trips() -> Result<(), ParseError> {
    let program = parse_program(CURRYING)?;

    assert_eq!(program.statements.len(), 2);

    let expected = r#"関数 add(n) を:
    関数 f(x) を:
        もし x == "" ならば:
            戻り値(n)
        そうでなければ:
            戻り値(add(x + n))
    と定義する
    戻り値(f)
と定義する
表示する(add(1)(2)(3)(4)(""))"#;

    assert_eq!(program.to_string(), expected);
    assert_eq!(parse_program(expected)?.to_string(), expected);

    Ok(())
}

#[test]
fn test_missing_closing_paren_points_at_next_token() {
    let err = parse_program("f(1\nx = 2").unwrap_err();

    assert_eq!(
        err.error,
        ParseErrorType::UnexpectedToken {
            token: Token::Ident(String::from("x")),
            expected: vec![String::from(","), String::from(")")]
        }
    );
    assert_eq!(err.span, SrcSpan::from(4, 5));
}

#[test]
fn test_lex_error_inside_program() {
    let err = parse_program("x = 1\ny = 「abc").unwrap_err();

    assert!(matches!(
        err.error,
        ParseErrorType::LexError { error } if error.error == LexicalErrorType::UnterminatedString
    ));
    assert_eq!(err.span.start, 10);
}

#[test]
fn test_invalid_assignment_target() {
    let err = parse_program("1 + 2 = 3").unwrap_err();

    assert_eq!(err.error, ParseErrorType::InvalidAssignmentTarget);
    assert_eq!(err.span, SrcSpan::from(0, 5));

    let err = parse_program("f(1) を 1 増やす").unwrap_err();
    assert_eq!(err.error, ParseErrorType::InvalidAssignmentTarget);
}

#[test]
fn test_block_errors() {
    let err = parse_program("もし x ならば\n    y = 1").unwrap_err();
    assert_eq!(err.error, ParseErrorType::ExpectedBlock);

    let err = parse_program("x = 1\n    y = 2").unwrap_err();
    assert_eq!(err.error, ParseErrorType::UnexpectedIndent);

    let err = parse_program("関数 f(x) を:\n    x を返す").unwrap_err();
    assert_eq!(err.error, ParseErrorType::UnexpectedEof);
}

#[test]
fn test_missing_terminator() {
    let err = parse_program("x = 1 y = 2").unwrap_err();

    assert!(matches!(err.error, ParseErrorType::UnexpectedToken { token: Token::Ident(_), .. }));
    assert_eq!(err.span, SrcSpan::from(6, 7));
}

#[test]
fn test_empty_program() -> Result<(), ParseError> {
    let program = parse_program("# nothing here\n\n")?;

    assert!(program.statements.is_empty());
    assert_eq!(program.location, SrcSpan::default());

    Ok(())
}
