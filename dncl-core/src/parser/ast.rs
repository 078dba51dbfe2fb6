use std::fmt::Display;
use std::rc::Rc;

use crate::{lexer::prelude::Token, utils::prelude::SrcSpan};

fn join<T: Display>(items: &[T]) -> String {
    items.iter()
        .map(|item| item.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("    {line}"))
        .collect::<Vec<String>>()
        .join("\n")
}

// program -> { <statement> <terminator> } EOF
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub location: SrcSpan
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let statements = self.statements.iter()
            .map(|statement| statement.to_string())
            .collect::<Vec<String>>();

        write!(f, "{}", statements.join("\n"))
    }
}

// block -> : ( NEWLINE INDENT { <statement> <terminator> } DEDENT | <statement> {, <statement> } )
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub location: SrcSpan
}

impl Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let statements = self.statements.iter()
            .map(|statement| indent(&statement.to_string()))
            .collect::<Vec<String>>();

        write!(f, "{}", statements.join("\n"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(Expression),
    Assignment(Assignment),
    Conditional(Conditional),
    CountedLoop(CountedLoop),
    WhileLoop(WhileLoop),
    DoUntilLoop(DoUntilLoop),
    Increment(Increment),
    FunctionDefinition(FunctionDefinition),
    Return(Return),
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Expression(expression) => write!(f, "{expression}"),
            Self::Assignment(assignment) => write!(f, "{assignment}"),
            Self::Conditional(conditional) => write!(f, "{conditional}"),
            Self::CountedLoop(loop_) => write!(f, "{loop_}"),
            Self::WhileLoop(loop_) => write!(f, "{loop_}"),
            Self::DoUntilLoop(loop_) => write!(f, "{loop_}"),
            Self::Increment(increment) => write!(f, "{increment}"),
            Self::FunctionDefinition(definition) => write!(f, "{definition}"),
            Self::Return(ret) => write!(f, "{ret}"),
        }
    }
}

impl Statement {
    pub fn location(&self) -> SrcSpan {
        match self {
            Self::Expression(expression) => expression.location(),
            Self::Assignment(assignment) => assignment.location,
            Self::Conditional(conditional) => conditional.location,
            Self::CountedLoop(loop_) => loop_.location,
            Self::WhileLoop(loop_) => loop_.location,
            Self::DoUntilLoop(loop_) => loop_.location,
            Self::Increment(increment) => increment.location,
            Self::FunctionDefinition(definition) => definition.location,
            Self::Return(ret) => ret.location,
        }
    }
}

// assignment -> <target> = <expression>
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Either an `Identifier` or an `Index` chain.
    pub target: Expression,
    pub value: Expression,
    pub location: SrcSpan
}

impl Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.target, self.value)
    }
}

// conditional -> もし <expression> ならば <block> [ そうでなくもし ... | そうでなければ <block> ]
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub condition: Expression,
    pub consequence: Block,
    pub alternative: Option<Box<Alternative>>,
    pub location: SrcSpan
}

#[derive(Debug, Clone, PartialEq)]
pub enum Alternative {
    ElseIf(Conditional),
    Else(Block),
}

impl Display for Conditional {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "もし {} ならば:\n{}", self.condition, self.consequence)?;

        match self.alternative.as_deref() {
            Some(Alternative::ElseIf(conditional)) => write!(f, "\nそうでなく{conditional}"),
            Some(Alternative::Else(block)) => write!(f, "\nそうでなければ:\n{block}"),
            None => Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increasing,
    Decreasing,
}

// counted_loop -> <identifier> を <expression> から <expression> まで <expression> ずつ (増やしながら | 減らしながら) [繰り返す] <block>
#[derive(Debug, Clone, PartialEq)]
pub struct CountedLoop {
    pub variable: Identifier,
    pub from: Expression,
    pub to: Expression,
    pub step: Expression,
    pub direction: Direction,
    pub body: Block,
    pub location: SrcSpan
}

impl Display for CountedLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let direction = match self.direction {
            Direction::Increasing => "増やしながら",
            Direction::Decreasing => "減らしながら",
        };

        write!(f, "{} を {} から {} まで {} ずつ{direction}繰り返す:\n{}",
            self.variable,
            self.from,
            self.to,
            self.step,
            self.body
        )
    }
}

// while_loop -> <expression> の間 [繰り返す] <block>
#[derive(Debug, Clone, PartialEq)]
pub struct WhileLoop {
    pub condition: Expression,
    pub body: Block,
    pub location: SrcSpan
}

impl Display for WhileLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} の間繰り返す:\n{}", self.condition, self.body)
    }
}

// do_until_loop -> 繰り返し <block> を [,] <expression> になるまで実行する
#[derive(Debug, Clone, PartialEq)]
pub struct DoUntilLoop {
    pub body: Block,
    pub condition: Expression,
    pub location: SrcSpan
}

impl Display for DoUntilLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "繰り返し:\n{}\nを, {} になるまで実行する", self.body, self.condition)
    }
}

// increment -> <target> を <expression> (増やす | 減らす)
#[derive(Debug, Clone, PartialEq)]
pub struct Increment {
    pub target: Expression,
    pub amount: Expression,
    pub direction: Direction,
    pub location: SrcSpan
}

impl Display for Increment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verb = match self.direction {
            Direction::Increasing => "増やす",
            Direction::Decreasing => "減らす",
        };

        write!(f, "{} を {} {verb}", self.target, self.amount)
    }
}

// function_definition -> 関数 <identifier> <function_literal>
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub name: Identifier,
    pub function: Rc<FunctionLiteral>,
    pub location: SrcSpan
}

impl Display for FunctionDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "関数 {}({}) を:\n{}\nと定義する",
            self.name,
            join(&self.function.parameters),
            self.function.body
        )
    }
}

// function_literal -> ( [ <identifier> {, <identifier> } ] ) を <block> と定義する
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub parameters: Vec<Identifier>,
    pub body: Block,
    pub location: SrcSpan
}

impl Display for FunctionLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "関数({}) を:\n{}\nと定義する", join(&self.parameters), self.body)
    }
}

// return -> <expression> を返す
#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub value: Expression,
    pub location: SrcSpan
}

impl Display for Return {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} を返す", self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    Primitive(Primitive),
    Array(ArrayLiteral),
    Prefix(Prefix),
    Infix(Infix),
    Index(Index),
    Call(Call),
    BuiltinCall(BuiltinCall),
    Function(Rc<FunctionLiteral>),
    SystemCommand(SystemCommand),
    Nested {
        expression: Box<Expression>,
        location: SrcSpan
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identifier(ident) => write!(f, "{ident}"),
            Self::Primitive(primitive) => write!(f, "{primitive}"),
            Self::Array(array) => write!(f, "{array}"),
            Self::Prefix(prefix) => write!(f, "{prefix}"),
            Self::Infix(infix) => write!(f, "{infix}"),
            Self::Index(index) => write!(f, "{index}"),
            Self::Call(call) => write!(f, "{call}"),
            Self::BuiltinCall(call) => write!(f, "{call}"),
            Self::Function(function) => write!(f, "{function}"),
            Self::SystemCommand(command) => write!(f, "{command}"),
            Self::Nested { expression, .. } => write!(f, "({expression})")
        }
    }
}

impl Expression {
    pub fn location(&self) -> SrcSpan {
        match self {
            Self::Identifier(ident) => ident.location,
            Self::Primitive(primitive) => primitive.location(),
            Self::Array(array) => array.location,
            Self::Prefix(prefix) => prefix.location,
            Self::Infix(infix) => infix.location,
            Self::Index(index) => index.location,
            Self::Call(call) => call.location,
            Self::BuiltinCall(call) => call.location,
            Self::Function(function) => function.location,
            Self::SystemCommand(command) => command.location(),
            Self::Nested { location, .. } => *location
        }
    }

    pub fn is_assignable(&self) -> bool {
        match self {
            Self::Identifier(_) => true,
            Self::Index(index) => index.array.is_assignable(),
            _ => false
        }
    }
}

// identifier -> <letter> { <letter> | <digit> }
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub value: String,
    pub location: SrcSpan
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl From<(u32, String, u32)> for Identifier {
    fn from(value: (u32, String, u32)) -> Self {
        Identifier {
            value: value.1,
            location: SrcSpan { start: value.0, end: value.2 }
        }
    }
}

// primitive -> <int> | <string>
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Int {
        value: i64,
        location: SrcSpan
    },
    Str {
        value: String,
        location: SrcSpan
    },
    /// Synthesised null with no source text of its own.
    System {
        location: SrcSpan
    }
}

impl Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int { value, .. } => write!(f, "{value}"),
            Self::Str { value, .. } => {
                let escaped = value
                    .replace('\\', "\\\\")
                    .replace('"', "\\\"")
                    .replace('\n', "\\n")
                    .replace('\t', "\\t");

                write!(f, "\"{escaped}\"")
            },
            Self::System { .. } => Ok(())
        }
    }
}

impl Primitive {
    pub fn location(&self) -> SrcSpan {
        match self {
            Self::Int { location, .. } |
            Self::Str { location, .. } |
            Self::System { location } => *location
        }
    }
}

// array -> [ [ <expression> {, <expression> } ] ]
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteral {
    pub elements: Vec<Expression>,
    pub location: SrcSpan
}

impl Display for ArrayLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", join(&self.elements))
    }
}

/// Unary operation. `でない` is written after its operand but is stored here too.
#[derive(Debug, Clone, PartialEq)]
pub struct Prefix {
    pub operator: Token,
    pub expression: Box<Expression>,
    pub location: SrcSpan
}

impl Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.operator {
            Token::Not => write!(f, "{} でない", self.expression),
            _ => write!(f, "{}{}", self.operator.as_literal(), self.expression)
        }
    }
}

// infix -> <expression> <operator> <expression>
#[derive(Debug, Clone, PartialEq)]
pub struct Infix {
    pub left: Box<Expression>,
    pub operator: Token,
    pub right: Box<Expression>,
    pub location: SrcSpan
}

impl Display for Infix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator.as_literal(), self.right)
    }
}

// index -> <expression> [ <expression> ]
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub array: Box<Expression>,
    pub index: Box<Expression>,
    pub location: SrcSpan
}

impl Display for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.array, self.index)
    }
}

// call -> <expression> ( [ <expression> {, <expression> } ] )
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub function: Box<Expression>,
    pub arguments: Vec<Expression>,
    pub location: SrcSpan
}

impl Display for Call {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.function, join(&self.arguments))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltInFunction {
    Print,
    Length,
    Diff,
    Return,
}

impl BuiltInFunction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "表示する" => Some(Self::Print),
            "要素数" => Some(Self::Length),
            "差分" => Some(Self::Diff),
            "戻り値" => Some(Self::Return),
            _ => None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Print => "表示する",
            Self::Length => "要素数",
            Self::Diff => "差分",
            Self::Return => "戻り値",
        }
    }
}

impl Display for BuiltInFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuiltinCall {
    pub function: BuiltInFunction,
    pub arguments: Vec<Expression>,
    pub location: SrcSpan
}

impl Display for BuiltinCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.function, join(&self.arguments))
    }
}

pub const INPUT_COMMAND: &str = "外部からの入力";

#[derive(Debug, Clone, PartialEq)]
pub enum SystemCommand {
    Input {
        location: SrcSpan
    },
    Unknown {
        command: String,
        location: SrcSpan
    }
}

impl SystemCommand {
    pub fn from_text(command: String, location: SrcSpan) -> Self {
        if command.contains(INPUT_COMMAND) {
            Self::Input { location }
        } else {
            Self::Unknown { command, location }
        }
    }

    pub fn location(&self) -> SrcSpan {
        match self {
            Self::Input { location } |
            Self::Unknown { location, .. } => *location
        }
    }
}

impl Display for SystemCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input { .. } => write!(f, "【{INPUT_COMMAND}】"),
            Self::Unknown { command, .. } => write!(f, "【{command}】")
        }
    }
}
