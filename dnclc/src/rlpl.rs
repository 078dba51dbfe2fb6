use std::io::Write;

use dncl_core::lexer::prelude::{Lexer, Token};

const PROMPT: &str = ">> ";

pub fn start() -> std::io::Result<()> {
	let stdin = std::io::stdin();

	loop {
		let mut input = String::from("");

		print!("{}", PROMPT);
		std::io::stdout().flush()?;

		if stdin.read_line(&mut input)? == 0 {
			return Ok(());
		}

		let input = input.trim_end_matches(['\r', '\n']);

		match input {
			"" => {},
			".exit" => return Ok(()),
			_ => {
				for res in Lexer::new(input) {
					match res {
						Ok((start, token, end)) => {
							println!("{start}..{end} {:?}", token);

							if token == Token::Eof {
								break;
							}
						},
						Err(err) => {
							let (message, extra) = err.details();
							println!("[at {}] Lexical Error: {}", err.location, message);
							if !extra.is_empty() {
								println!("{}", extra.join("\n"));
							}
							break;
						}
					}
				}
			}
		}
	}
}
