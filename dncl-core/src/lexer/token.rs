#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // <文字>{<文字>|<数字>}
    Ident(String),
    // {<数字>}, full-width digits included
    Int(i64),
    // "..." or 「...」
    Str(String),
    // 【...】
    System(String),

    // Arithmetic
    Plus, // +
    Minus, // -
    Asterisk, // *
    Slash, // /
    IntDiv, // ÷
    Percent, // %

    // Comparison
    Equal, // ==
    NotEqual, // !=
    LessThan, // <
    LessThanOrEqual, // <=
    GreaterThan, // >
    GreaterThanOrEqual, // >=

    Assign, // =

    // Keywords
    Function, // 関数
    Wo, // を
    EndFunction, // と定義する
    If, // もし
    Then, // ならば
    ElseIf, // そうでなくもし
    Else, // そうでなければ
    From, // から
    To, // まで
    By, // ずつ
    Increasing, // 増やしながら
    Decreasing, // 減らしながら
    Repeat, // 繰り返す
    While, // の間
    Loop, // 繰り返し
    Until, // になるまで実行する
    And, // かつ
    Or, // または
    Not, // でない
    Increment, // 増やす
    Decrement, // 減らす
    Return, // を返す

    // Delimiters
    Comma, // ,
    Colon, // :
    LParen, // (
    RParen, // )
    LSBracket, // [
    RSBracket, // ]

    // Layout
    Newline,
    Indent,
    Dedent,

    Eof,
}

impl Token {
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Token::Function
            | Token::Wo
            | Token::EndFunction
            | Token::If
            | Token::Then
            | Token::ElseIf
            | Token::Else
            | Token::From
            | Token::To
            | Token::By
            | Token::Increasing
            | Token::Decreasing
            | Token::Repeat
            | Token::While
            | Token::Loop
            | Token::Until
            | Token::And
            | Token::Or
            | Token::Not
            | Token::Increment
            | Token::Decrement
            | Token::Return
        )
    }

    pub fn is_operator(&self) -> bool {
        matches!(
            self,
            Token::Plus
            | Token::Minus
            | Token::Asterisk
            | Token::Slash
            | Token::IntDiv
            | Token::Percent
            | Token::Equal
            | Token::NotEqual
            | Token::LessThan
            | Token::LessThanOrEqual
            | Token::GreaterThan
            | Token::GreaterThanOrEqual
            | Token::And
            | Token::Or
        )
    }

    /// Tokens that may end a statement.
    pub fn is_terminator(&self) -> bool {
        matches!(self, Token::Newline | Token::Dedent | Token::Eof)
    }

    pub fn as_literal(&self) -> String {
        match self {
            Token::Ident(value) => value.to_string(),
            Token::Int(value) => value.to_string(),
            Token::Str(value) => format!("\"{value}\""),
            Token::System(value) => format!("【{value}】"),

            Token::Plus => "+".to_string(),
            Token::Minus => "-".to_string(),
            Token::Asterisk => "*".to_string(),
            Token::Slash => "/".to_string(),
            Token::IntDiv => "÷".to_string(),
            Token::Percent => "%".to_string(),
            Token::Equal => "==".to_string(),
            Token::NotEqual => "!=".to_string(),
            Token::LessThan => "<".to_string(),
            Token::LessThanOrEqual => "<=".to_string(),
            Token::GreaterThan => ">".to_string(),
            Token::GreaterThanOrEqual => ">=".to_string(),
            Token::Assign => "=".to_string(),

            Token::Function => "関数".to_string(),
            Token::Wo => "を".to_string(),
            Token::EndFunction => "と定義する".to_string(),
            Token::If => "もし".to_string(),
            Token::Then => "ならば".to_string(),
            Token::ElseIf => "そうでなくもし".to_string(),
            Token::Else => "そうでなければ".to_string(),
            Token::From => "から".to_string(),
            Token::To => "まで".to_string(),
            Token::By => "ずつ".to_string(),
            Token::Increasing => "増やしながら".to_string(),
            Token::Decreasing => "減らしながら".to_string(),
            Token::Repeat => "繰り返す".to_string(),
            Token::While => "の間".to_string(),
            Token::Loop => "繰り返し".to_string(),
            Token::Until => "になるまで実行する".to_string(),
            Token::And => "かつ".to_string(),
            Token::Or => "または".to_string(),
            Token::Not => "でない".to_string(),
            Token::Increment => "増やす".to_string(),
            Token::Decrement => "減らす".to_string(),
            Token::Return => "を返す".to_string(),

            Token::Comma => ",".to_string(),
            Token::Colon => ":".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::LSBracket => "[".to_string(),
            Token::RSBracket => "]".to_string(),

            Token::Newline => "\n".to_string(),
            Token::Indent => "<indent>".to_string(),
            Token::Dedent => "<dedent>".to_string(),
            Token::Eof => "\0".to_string(),
        }
    }
}
