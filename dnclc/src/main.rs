mod cli;
mod repl;
mod rlpl;
mod rppl;
mod source;

use std::{path::PathBuf, process::ExitCode, time::Instant};

use clap::Parser;
use cli::{print_checked, print_checking, print_error, print_finished, print_running};
use dncl_core::{
    eval::{
        stdlib::{StandardBuiltins, StdinCommands, DEFAULT_SEPARATOR},
        Evaluator, Origin
    },
    parser::prelude::parse_program,
    utils::prelude::Error
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(version, about = "Interpreter for DNCL pseudocode")]
enum Command {
    /// Parses and evaluates a program
    Run {
        /// Path of source file, `-` for stdin
        path: PathBuf,
        /// Index of the first array element
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(i64).range(0..=1))]
        origin: i64,
        /// Text placed between the values of one `表示する` call
        #[arg(long, default_value = DEFAULT_SEPARATOR)]
        separator: String,
    },
    /// Performs lexical and syntactical analysis only
    Check {
        /// Path of source file, `-` for stdin
        path: PathBuf,
        /// Print ast instead of parsed source code
        #[arg(long, default_value_t = false)]
        print_ast: bool,
    },
    /// Runs Read Eval Print Loop
    Repl {
        /// Index of the first array element
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(i64).range(0..=1))]
        origin: i64,
    },
    /// Runs Read Lex Print Loop
    Rlpl,
    /// Runs Read Parse Print Loop
    Rppl
}

fn main() -> ExitCode {
    init_tracing();

    if let Err(err) = ctrlc::set_handler(|| std::process::exit(130)) {
        tracing::warn!(%err, "could not install the interrupt handler");
    }

    let result = match Command::parse() {
        Command::Run { path, origin, separator } => run(path, origin, separator),
        Command::Check { path, print_ast } => check(path, print_ast),
        Command::Repl { origin } => Origin::try_from(origin)
            .map_err(|error| Error::Fatal { error })
            .and_then(|origin| repl::start(origin).map_err(|err| Error::StdIo { err: err.kind() })),
        Command::Rlpl => rlpl::start().map_err(|err| Error::StdIo { err: err.kind() }),
        Command::Rppl => rppl::start().map_err(|err| Error::StdIo { err: err.kind() }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            print_error(&error);
            ExitCode::FAILURE
        }
    }
}

/// Log level comes from `DNCL_LOG` (e.g. `DNCL_LOG=dncl_core=trace`), `warn` otherwise.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("DNCL_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn run(path: PathBuf, origin: i64, separator: String) -> Result<(), Error> {
    let origin = Origin::try_from(origin).map_err(|error| Error::Fatal { error })?;
    let src = source::read(&path)?;

    let program = parse_program(&src).map_err(|error| Error::Parse {
        path: path.clone(),
        src: src.clone(),
        error
    })?;

    print_running(&path.display().to_string());
    let start = Instant::now();

    let mut evaluator = Evaluator::new(
        StandardBuiltins::new(std::io::stdout().lock()).with_separator(separator),
        StdinCommands::new(std::io::stdin().lock()),
        origin
    );

    let value = evaluator.eval_program(&program).map_err(|error| Error::Fatal { error })?;

    if value.is_error() {
        return Err(Error::Runtime { path, src, value });
    }

    print_finished(start.elapsed());

    Ok(())
}

fn check(path: PathBuf, print_ast: bool) -> Result<(), Error> {
    print_checking(&path.display().to_string());
    let start = Instant::now();

    let src = source::read(&path)?;

    let program = parse_program(&src).map_err(|error| Error::Parse {
        path: path.clone(),
        src: src.clone(),
        error
    })?;

    if print_ast {
        println!("{program:#?}");
    } else {
        println!("{program}");
    }

    print_checked(start.elapsed());

    Ok(())
}
