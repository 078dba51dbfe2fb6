use crate::utils::prelude::SrcSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexicalErrorType {
    UnrecognizedToken { tok: char },
    UnterminatedString,
    UnterminatedSystemCommand,
    IntegerOverflow,
    InconsistentIndentation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexicalError {
    pub error: LexicalErrorType,
    pub location: SrcSpan
}

impl LexicalError {
    pub fn details(&self) -> (&'static str, Vec<String>) {
        match self.error {
            LexicalErrorType::UnrecognizedToken { tok } => {
                ("この文字は使えません", vec![format!("`{tok}` (U+{:04X})", tok as u32)])
            },
            LexicalErrorType::UnterminatedString => {
                ("文字列が閉じられていません", vec!["`\"` または `」` で閉じてください".to_string()])
            },
            LexicalErrorType::UnterminatedSystemCommand => {
                ("`【` に対応する `】` がありません", vec![])
            },
            LexicalErrorType::IntegerOverflow => {
                ("整数が大きすぎます", vec![format!("最大値は {} です", i64::MAX)])
            },
            LexicalErrorType::InconsistentIndentation => {
                ("字下げがどのブロックにも揃っていません", vec![])
            },
        }
    }
}
