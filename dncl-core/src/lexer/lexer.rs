use std::collections::VecDeque;
use std::fmt::Display;

use super::error::{LexicalError, LexicalErrorType};
use super::token::Token;
use crate::utils::prelude::SrcSpan;

pub type Spanned = (u32, Token, u32);
pub type LexResult = std::result::Result<Spanned, LexicalError>;

/// Japanese keywords, longest first so the first match is the greediest.
pub const KEYWORDS: &[&str] = &[
	"になるまで実行する",
	"そうでなくもし",
	"そうでなければ",
	"増やしながら",
	"減らしながら",
	"と定義する",
	"繰り返す",
	"繰り返し",
	"ならば",
	"でない",
	"を返す",
	"増やす",
	"減らす",
	"または",
	"もし",
	"関数",
	"から",
	"まで",
	"ずつ",
	"の間",
	"かつ",
	"を",
];

pub fn str_to_keyword(word: &str) -> Option<Token> {
	Some(match word {
		"関数" => Token::Function,
		"を" => Token::Wo,
		"と定義する" => Token::EndFunction,
		"もし" => Token::If,
		"ならば" => Token::Then,
		"そうでなくもし" => Token::ElseIf,
		"そうでなければ" => Token::Else,
		"から" => Token::From,
		"まで" => Token::To,
		"ずつ" => Token::By,
		"増やしながら" => Token::Increasing,
		"減らしながら" => Token::Decreasing,
		"繰り返す" => Token::Repeat,
		"の間" => Token::While,
		"繰り返し" => Token::Loop,
		"になるまで実行する" => Token::Until,
		"かつ" => Token::And,
		"または" => Token::Or,
		"でない" => Token::Not,
		"増やす" => Token::Increment,
		"減らす" => Token::Decrement,
		"を返す" => Token::Return,

		_ => return None
	})
}

fn indent_width(ch: char) -> Option<u32> {
	match ch {
		' ' => Some(1),
		'\t' => Some(4),
		'\u{3000}' => Some(2),
		// block rulers printed in exam booklets
		'|' | '｜' | '│' | '⎿' | '└' => Some(1),
		_ => None
	}
}

fn digit_value(ch: char) -> Option<i64> {
	match ch {
		'0'..='9' => Some(ch as i64 - '0' as i64),
		'０'..='９' => Some(ch as i64 - '０' as i64),
		_ => None
	}
}

fn is_ident_start(ch: char) -> bool {
	ch == '_' || ch.is_alphabetic()
}

fn is_ident_continue(ch: char) -> bool {
	ch == '_' || ch.is_alphanumeric()
}

#[derive(Debug)]
pub struct Lexer<'a> {
	src: &'a str,
	position: u32,
	paren_depth: u32,
	indent_stack: Vec<u32>,
	at_line_start: bool,
	line_has_tokens: bool,
	finished: bool,
	pending: VecDeque<Spanned>,
}

impl<'a> Display for Lexer<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f,
			"Lexer {{\n\tposition: {},\n\tch: {:?}, next_ch: {:?},\n\tindent: {:?}\n}}",
			self.position, self.ch(), self.peek(), self.indent_stack
		)
	}
}

impl<'a> Lexer<'a> {
	pub fn new(src: &'a str) -> Self {
		Self {
			src,
			position: 0,
			paren_depth: 0,
			indent_stack: vec![0],
			at_line_start: true,
			line_has_tokens: false,
			finished: false,
			pending: VecDeque::new(),
		}
	}

	pub fn next_token(&mut self) -> LexResult {
		loop {
			if let Some(token) = self.pending.pop_front() {
				return Ok(token);
			}

			if self.finished {
				let end = self.src.len() as u32;
				return Ok((end, Token::Eof, end));
			}

			if self.at_line_start {
				self.at_line_start = false;
				self.lex_indentation()?;
				continue;
			}

			self.skip_whitespace();

			let ch = match self.ch() {
				Some(ch) => ch,
				None => {
					self.lex_eof();
					continue;
				}
			};

			match ch {
				'#' | '＃' => self.skip_comment(),
				'/' if self.peek() == Some('/') => self.skip_comment(),
				'\n' => {
					let start = self.position;
					self.next_char();

					if self.paren_depth > 0 {
						continue;
					}

					self.at_line_start = true;

					if self.line_has_tokens {
						self.line_has_tokens = false;
						return Ok((start, Token::Newline, self.position));
					}
				},
				ch => {
					let token = self.lex_token(ch)?;
					self.line_has_tokens = true;
					return Ok(token);
				}
			}
		}
	}

	fn lex_token(&mut self, ch: char) -> LexResult {
		let span = match ch {
			'"' => return self.lex_string('"'),
			'「' => return self.lex_string('」'),
			'【' => return self.lex_system_command(),
			ch if digit_value(ch).is_some() => return self.lex_number(),

			'+' | '＋' => self.eat_one_char(Token::Plus),
			'-' | '－' | '−' => self.eat_one_char(Token::Minus),
			'*' | '＊' | '×' => self.eat_one_char(Token::Asterisk),
			'/' | '／' => self.eat_one_char(Token::Slash),
			'÷' => self.eat_one_char(Token::IntDiv),
			'%' | '％' => self.eat_one_char(Token::Percent),

			'=' | '＝' => match self.peek() {
				Some('=' | '＝') => self.eat_two_chars(Token::Equal),
				_ => self.eat_one_char(Token::Assign),
			},
			'←' => self.eat_one_char(Token::Assign),
			'!' | '！' if matches!(self.peek(), Some('=' | '＝')) => self.eat_two_chars(Token::NotEqual),
			'≠' => self.eat_one_char(Token::NotEqual),
			'<' | '＜' => match self.peek() {
				Some('=' | '＝') => self.eat_two_chars(Token::LessThanOrEqual),
				_ => self.eat_one_char(Token::LessThan),
			},
			'≦' | '≤' => self.eat_one_char(Token::LessThanOrEqual),
			'>' | '＞' => match self.peek() {
				Some('=' | '＝') => self.eat_two_chars(Token::GreaterThanOrEqual),
				_ => self.eat_one_char(Token::GreaterThan),
			},
			'≧' | '≥' => self.eat_one_char(Token::GreaterThanOrEqual),

			',' | '，' | '、' => self.eat_one_char(Token::Comma),
			':' | '：' => self.eat_one_char(Token::Colon),
			'(' | '（' => {
				self.paren_depth += 1;
				self.eat_one_char(Token::LParen)
			},
			')' | '）' => {
				self.paren_depth = self.paren_depth.saturating_sub(1);
				self.eat_one_char(Token::RParen)
			},
			'[' | '［' => {
				self.paren_depth += 1;
				self.eat_one_char(Token::LSBracket)
			},
			']' | '］' => {
				self.paren_depth = self.paren_depth.saturating_sub(1);
				self.eat_one_char(Token::RSBracket)
			},

			ch if is_ident_start(ch) => self.lex_word(),

			tok => {
				let location = self.position;
				return Err(LexicalError {
					error: LexicalErrorType::UnrecognizedToken { tok },
					location: SrcSpan::from(location, location + tok.len_utf8() as u32),
				});
			}
		};

		Ok(span)
	}

	fn rest(&self) -> &'a str {
		self.src.get(self.position as usize..).unwrap_or("")
	}

	fn ch(&self) -> Option<char> {
		self.rest().chars().next()
	}

	fn peek(&self) -> Option<char> {
		self.rest().chars().nth(1)
	}

	fn next_char(&mut self) -> Option<char> {
		let ch = self.ch()?;
		self.position += ch.len_utf8() as u32;

		Some(ch)
	}

	fn eat_one_char(&mut self, token: Token) -> Spanned {
		let start_pos = self.position;
		self.next_char();

		(start_pos, token, self.position)
	}

	fn eat_two_chars(&mut self, token: Token) -> Spanned {
		let start_pos = self.position;
		self.next_char();
		self.next_char();

		(start_pos, token, self.position)
	}

	fn skip_whitespace(&mut self) {
		while let Some(' ' | '\t' | '\r' | '\u{3000}') = self.ch() {
			self.next_char();
		}
	}

	fn skip_comment(&mut self) {
		while !matches!(self.ch(), None | Some('\n')) {
			self.next_char();
		}
	}

	fn keyword_at_position(&self) -> Option<&'static str> {
		let rest = self.rest();

		KEYWORDS.iter()
			.find(|keyword| rest.starts_with(**keyword))
			.copied()
	}

	fn lex_indentation(&mut self) -> Result<(), LexicalError> {
		let start = self.position;
		let mut width = 0;

		while let Some(ch_width) = self.ch().and_then(indent_width) {
			width += ch_width;
			self.next_char();
		}

		let end = self.position;

		// blank and comment-only lines leave the block structure alone
		match self.ch() {
			None | Some('\n' | '\r' | '#' | '＃') => return Ok(()),
			Some('/') if self.peek() == Some('/') => return Ok(()),
			_ => {}
		}

		let current = self.indent_stack.last().copied().unwrap_or(0);

		if width > current {
			self.indent_stack.push(width);
			self.pending.push_back((start, Token::Indent, end));
		} else if width < current {
			while let Some(&top) = self.indent_stack.last() {
				if top <= width {
					break;
				}

				self.indent_stack.pop();
				self.pending.push_back((end, Token::Dedent, end));
			}

			if self.indent_stack.last().copied().unwrap_or(0) != width {
				return Err(LexicalError {
					error: LexicalErrorType::InconsistentIndentation,
					location: SrcSpan::from(start, end),
				});
			}
		}

		Ok(())
	}

	fn lex_eof(&mut self) {
		let end = self.src.len() as u32;
		self.finished = true;

		if self.line_has_tokens {
			self.line_has_tokens = false;
			self.pending.push_back((end, Token::Newline, end));
		}

		while self.indent_stack.len() > 1 {
			self.indent_stack.pop();
			self.pending.push_back((end, Token::Dedent, end));
		}
	}

	fn lex_word(&mut self) -> Spanned {
		let start_pos = self.position;

		if let Some(keyword) = self.keyword_at_position() {
			self.position += keyword.len() as u32;

			if let Some(token) = str_to_keyword(keyword) {
				return (start_pos, token, self.position);
			}
		}

		let mut ident = String::new();

		while let Some(ch) = self.ch() {
			if !is_ident_continue(ch) {
				break;
			}

			// a keyword glued to a Japanese name ends the name
			if !ident.is_empty() && !ch.is_ascii() && self.keyword_at_position().is_some() {
				break;
			}

			ident.push(ch);
			self.next_char();
		}

		(start_pos, Token::Ident(ident), self.position)
	}

	fn lex_number(&mut self) -> LexResult {
		let start_pos = self.position;

		let mut value: i64 = 0;
		let mut overflow = false;

		while let Some(digit) = self.ch().and_then(digit_value) {
			self.next_char();

			match value.checked_mul(10).and_then(|value| value.checked_add(digit)) {
				Some(next) => value = next,
				None => overflow = true,
			}
		}

		if overflow {
			return Err(LexicalError {
				error: LexicalErrorType::IntegerOverflow,
				location: SrcSpan::from(start_pos, self.position)
			});
		}

		Ok((start_pos, Token::Int(value), self.position))
	}

	fn lex_string(&mut self, close: char) -> LexResult {
		let start_pos = self.position;
		let quote_len = self.next_char().map_or(1, |quote| quote.len_utf8() as u32);

		let unterminated = LexicalError {
			error: LexicalErrorType::UnterminatedString,
			location: SrcSpan::from(start_pos, start_pos + quote_len),
		};

		let mut value = String::new();

		loop {
			match self.next_char() {
				None | Some('\n') => return Err(unterminated),
				Some(ch) if ch == close => break,
				Some('\\') => match self.next_char() {
					Some('n') => value.push('\n'),
					Some('t') => value.push('\t'),
					Some(escaped) => value.push(escaped),
					None => return Err(unterminated),
				},
				Some(ch) => value.push(ch),
			}
		}

		Ok((start_pos, Token::Str(value), self.position))
	}

	fn lex_system_command(&mut self) -> LexResult {
		let start_pos = self.position;
		self.next_char(); // skip 【

		let mut command = String::new();

		loop {
			match self.next_char() {
				None | Some('\n') => return Err(LexicalError {
					error: LexicalErrorType::UnterminatedSystemCommand,
					location: SrcSpan::from(start_pos, start_pos + '【'.len_utf8() as u32),
				}),
				Some('】') => break,
				Some(ch) => command.push(ch),
			}
		}

		Ok((start_pos, Token::System(command.trim().to_string()), self.position))
	}
}

impl<'a> Iterator for Lexer<'a> {
	type Item = LexResult;

	fn next(&mut self) -> Option<Self::Item> {
		let token = self.next_token();

		Some(token)
	}
}

/// Lexes the whole source, `Eof` included.
pub fn tokenize(src: &str) -> Result<Vec<Spanned>, LexicalError> {
	let mut lexer = Lexer::new(src);
	let mut tokens = vec![];

	loop {
		let token = lexer.next_token()?;
		let is_eof = token.1 == Token::Eof;

		tokens.push(token);

		if is_eof {
			return Ok(tokens);
		}
	}
}
