use std::{io::Write, path::PathBuf};

use dncl_core::{
    environment::prelude::Environment,
    eval::{
        stdlib::{ignore_command, read_input, StandardBuiltins},
        Evaluator, Origin
    },
    parser::prelude::{parse_program, SystemCommand},
    utils::prelude::Error
};

use crate::cli::print_error;

const PROMPT: &str = ">> ";
const CONTINUATION: &str = ".. ";

pub fn start(origin: Origin) -> std::io::Result<()> {
    let env = Environment::new_shared();

    // input is read per command so the prompt can keep using stdin
    let commands = |command: &SystemCommand| match command {
        SystemCommand::Input { location } => read_input(&mut std::io::stdin().lock(), *location),
        SystemCommand::Unknown { command, location } => ignore_command(command, *location),
    };

    let mut evaluator = Evaluator::new(StandardBuiltins::new(std::io::stdout()), commands, origin);

    loop {
        let Some(src) = read_entry()? else {
            return Ok(());
        };

        match src.trim() {
            "" => continue,
            ".exit" => return Ok(()),
            _ => {}
        }

        let program = match parse_program(&src) {
            Ok(program) => program,
            Err(error) => {
                print_error(&Error::Parse { path: PathBuf::from("<repl>"), src, error });
                continue;
            }
        };

        match evaluator.eval_program_in(&program, env.clone()) {
            Ok(value) if value.is_error() => {
                print_error(&Error::Runtime { path: PathBuf::from("<repl>"), src, value })
            },
            Ok(value) if value.is_null() => {},
            Ok(value) => println!("{value}"),
            Err(error) => print_error(&Error::Fatal { error }),
        }
    }
}

/// One line, or a block opened by a trailing `:` and closed by a blank line.
/// `None` at end of input.
fn read_entry() -> std::io::Result<Option<String>> {
    let stdin = std::io::stdin();
    let mut entry = String::new();

    print!("{PROMPT}");
    std::io::stdout().flush()?;

    if stdin.read_line(&mut entry)? == 0 {
        return Ok(None);
    }

    if !opens_block(&entry) {
        return Ok(Some(entry));
    }

    loop {
        print!("{CONTINUATION}");
        std::io::stdout().flush()?;

        let mut line = String::new();

        if stdin.read_line(&mut line)? == 0 || line.trim().is_empty() {
            return Ok(Some(entry));
        }

        entry.push_str(&line);
    }
}

fn opens_block(line: &str) -> bool {
    line.trim_end().ends_with([':', '：'])
}
