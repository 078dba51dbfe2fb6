use std::path::PathBuf;

use termcolor::Buffer;
use thiserror::Error;

use crate::{
    environment::prelude::DnclObject,
    eval::EvalError,
    parser::prelude::{ParseError, ParseErrorType},
    utils::prelude::SrcSpan,
};
use super::diagnostic::{Diagnostic, Label, Level, Location};
use super::explain::explain_span;

/// Everything a host can surface to a user, bundled with the source it came from.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("failed to parse source code")]
    Parse {
        path: PathBuf,
        src: String,
        error: ParseError
    },
    #[error("program stopped with a runtime error")]
    Runtime {
        path: PathBuf,
        src: String,
        value: DnclObject
    },
    #[error("evaluation aborted: {error}")]
    Fatal {
        error: EvalError
    },
    #[error("IO operation failed")]
    StdIo {
        err: std::io::ErrorKind
    }
}

impl Error {
    pub fn pretty_string(&self) -> String {
        let mut nocolor = Buffer::no_color();

        if self.pretty(&mut nocolor).is_err() {
            return self.to_string();
        }

        String::from_utf8_lossy(&nocolor.into_inner()).into_owned()
    }

    pub fn pretty(&self, buf: &mut Buffer) -> std::io::Result<()> {
        use std::io::Write;

        for diagnostic in self.to_diagnostics() {
            diagnostic.write(buf)?;
            writeln!(buf)?;
        }

        Ok(())
    }

    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Error::Parse { path, src, error } => {
                let (label, extra) = error.details();
                let text = extra.join("\n");

                let adjusted_location = if matches!(error.error, ParseErrorType::UnexpectedEof) {
                    SrcSpan {
                        start: src.len() as u32,
                        end: src.len() as u32,
                    }
                } else {
                    error.span
                };

                vec![Diagnostic {
                    title: "Syntax error".into(),
                    text,
                    level: Level::Error,
                    location: Some(Location {
                        src,
                        path: path.clone(),
                        label: Label {
                            text: Some(label.to_string()),
                            span: adjusted_location,
                        },
                        extra_labels: vec![],
                    }),
                }]
            },
            Error::Runtime { src, value, .. } => {
                let (title, message, location) = match value {
                    DnclObject::TypeError { message, location } => ("Type error", message.as_str(), *location),
                    DnclObject::Error { message, location } => ("Runtime error", message.as_str(), *location),
                    other => ("Runtime error", "unexpected program result", other.location()),
                };

                vec![Diagnostic {
                    title: title.into(),
                    text: explain_span(src, message, location),
                    level: Level::Error,
                    location: None,
                }]
            },
            Error::Fatal { error } => {
                vec![Diagnostic {
                    title: "Internal interpreter error".into(),
                    text: format!("{error}"),
                    level: Level::Error,
                    location: None,
                }]
            },
            Error::StdIo { err } => {
                vec![Diagnostic {
                    title: "Standard IO error".into(),
                    text: format!("{err}"),
                    level: Level::Error,
                    location: None,
                }]
            }
        }
    }
}
