use crate::{lexer::prelude::{LexicalError, Token}, utils::prelude::SrcSpan};

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorType {
    UnexpectedToken {
        token: Token,
        expected: Vec<String>,
    },
    UnexpectedEof,
    UnexpectedIndent,
    ExpectedIdent,
    ExpectedBlock,
    InvalidAssignmentTarget,
    LexError { error: LexicalError },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub error: ParseErrorType,
    pub span: SrcSpan
}

impl ParseError {
    pub fn details(&self) -> (&'static str, Vec<String>) {
        match &self.error {
            ParseErrorType::UnexpectedToken { token, expected } => {
                let found = match token {
                    Token::Int(_) => "整数".to_string(),
                    Token::Str(_) => "文字列".to_string(),
                    Token::Ident(_) => format!("名前 `{}`", token.as_literal()),
                    Token::Newline => "改行".to_string(),
                    Token::Dedent => "ブロックの終わり".to_string(),
                    _ if token.is_keyword() => format!("キーワード `{}`", token.as_literal()),
                    _ => format!("`{}`", token.as_literal())
                };

                let messages = std::iter::once(format!("{found} が見つかりました。期待していたもの:"))
                    .chain(expected.iter().map(|s| format!("- {s}")))
                    .collect();

                ("ここには書けません", messages)
            },
            ParseErrorType::UnexpectedEof => ("プログラムが途中で終わっています", vec![]),
            ParseErrorType::UnexpectedIndent => ("字下げが不要な位置です", vec![]),
            ParseErrorType::ExpectedIdent => ("名前が必要です", vec![]),
            ParseErrorType::ExpectedBlock => (
                "ブロックが必要です",
                vec!["`:` の後に同じ行で文を書くか、次の行から字下げして書いてください".to_string()]
            ),
            ParseErrorType::InvalidAssignmentTarget => (
                "代入できない式です",
                vec!["変数か配列の要素にだけ代入できます".to_string()]
            ),
            ParseErrorType::LexError { error } => error.details()
        }
    }
}
