//! Handlers a host can plug into [`Evaluator`](super::Evaluator) as they are.

use std::io::{BufRead, Write};

use crate::{
    environment::prelude::DnclObject,
    parser::prelude::{BuiltInFunction, SystemCommand},
    utils::prelude::SrcSpan
};

use super::{BuiltinHandler, SystemCommandHandler};

pub const DEFAULT_SEPARATOR: &str = ", ";

fn arity_error(function: BuiltInFunction, expected: usize, given: usize, location: SrcSpan) -> DnclObject {
    DnclObject::error(
        format!("`{function}` の引数は {expected} 個です ({given} 個渡されました)"),
        location
    )
}

/// Print, length, character ordinal and the return wrapper. Printed lines go to `out`.
pub struct StandardBuiltins<W: Write> {
    out: W,
    separator: String,
}

impl<W: Write> StandardBuiltins<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    /// Text placed between the arguments of one print call.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print(&mut self, arguments: &[DnclObject], location: SrcSpan) -> DnclObject {
        let line = arguments.iter()
            .map(|argument| argument.to_string())
            .collect::<Vec<String>>()
            .join(&self.separator);

        match writeln!(self.out, "{line}").and_then(|_| self.out.flush()) {
            Ok(()) => DnclObject::null(location),
            Err(err) => DnclObject::error(format!("表示に失敗しました: {err}"), location)
        }
    }
}

impl<W: Write> BuiltinHandler for StandardBuiltins<W> {
    fn call(&mut self, function: BuiltInFunction, arguments: Vec<DnclObject>, location: SrcSpan) -> DnclObject {
        match function {
            BuiltInFunction::Print => self.print(&arguments, location),
            BuiltInFunction::Length => match arguments.as_slice() {
                [DnclObject::Array { elements, .. }] => {
                    DnclObject::int(elements.borrow().len() as i64, location)
                },
                [other] => DnclObject::type_error(
                    format!("`{function}` は配列にだけ使えます ({})", other.type_name()),
                    location
                ),
                _ => arity_error(function, 1, arguments.len(), location)
            },
            BuiltInFunction::Diff => match arguments.as_slice() {
                [DnclObject::String { value, .. }] => {
                    let mut chars = value.chars();

                    match (chars.next(), chars.next()) {
                        // a space sorts before every letter
                        (Some(' '), None) => DnclObject::int(-1, location),
                        (Some(ch), None) => DnclObject::int(ch as i64 - 'a' as i64, location),
                        _ => DnclObject::error(
                            format!("`{function}` には 1 文字の文字列を渡してください (\"{value}\")"),
                            location
                        )
                    }
                },
                [other] => DnclObject::type_error(
                    format!("`{function}` は文字列にだけ使えます ({})", other.type_name()),
                    location
                ),
                _ => arity_error(function, 1, arguments.len(), location)
            },
            BuiltInFunction::Return => match arguments.as_slice() {
                [value] => DnclObject::return_value(value.clone(), location),
                _ => arity_error(function, 1, arguments.len(), location)
            },
        }
    }
}

/// Answers `【外部からの入力】` with one line from `input`.
pub struct StdinCommands<R: BufRead> {
    input: R,
}

impl<R: BufRead> StdinCommands<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> SystemCommandHandler for StdinCommands<R> {
    fn execute(&mut self, command: &SystemCommand) -> DnclObject {
        match command {
            SystemCommand::Input { location } => read_input(&mut self.input, *location),
            SystemCommand::Unknown { command, location } => ignore_command(command, *location)
        }
    }
}

/// Reads one line from `input` for `【外部からの入力】`.
pub fn read_input(input: &mut impl BufRead, location: SrcSpan) -> DnclObject {
    let mut line = String::new();

    match input.read_line(&mut line) {
        Ok(0) => DnclObject::error("入力がありません", location),
        Ok(_) => parse_input(line.trim_end_matches(['\r', '\n']), location),
        Err(err) => DnclObject::error(format!("入力に失敗しました: {err}"), location)
    }
}

pub fn ignore_command(command: &str, location: SrcSpan) -> DnclObject {
    tracing::warn!(command = %command, %location, "unknown system command");

    DnclObject::null(location)
}

/// An integer when the line is one, the raw text otherwise.
pub fn parse_input(line: &str, location: SrcSpan) -> DnclObject {
    match line.trim().parse::<i64>() {
        Ok(value) => DnclObject::int(value, location),
        Err(_) => DnclObject::string(line, location)
    }
}
