//! QuakeC lexer: raw character stream with pushback, trigraph/digraph
//! normalisation, whitespace collapsing, literal scanning, and the tokenizer
//! the declaration parser drives.
use std::path::{Path,PathBuf};

pub use self::token::{Token,Keyword,LexFail};
pub mod token;

#[derive(Debug)]
pub enum Error
{
	/// Any form of IO error from the underlying stream
	Io(::std::io::Error),
}
pub type Result<T> = ::std::result::Result<T,Error>;

/// Maximum unget depth. Exceeding it is a lexer bug (the scanners never
/// look ahead this far), not an input error.
const MAX_PUSHBACK: usize = 8;

trait ReadExt: ::std::io::Read {
	fn chars(self) -> ::utf8reader::UTF8Reader<Self> where Self: Sized;
}
impl<T: ::std::io::Read> ReadExt for T {
	fn chars(self) -> ::utf8reader::UTF8Reader<Self> {
		::utf8reader::UTF8Reader::new(self)
	}
}

enum Input
{
	File {
		path: PathBuf,
		chars: ::utf8reader::UTF8Reader<::std::io::BufReader<::std::fs::File>>,
	},
	Text {
		chars: Vec<char>,
		pos: usize,
	},
}

/// The character stream underneath the lexer.
///
/// `remaining` mirrors the classic "length left" counter: decremented on
/// every raw read (EOF probes included), incremented on every unget. It is a
/// loop-termination guard, not a byte-exact count.
pub struct SourceStream
{
	input: Input,
	/// LIFO unget buffer
	pushback: Vec<char>,
	remaining: i64,
	size: i64,
	line: usize,
}

impl SourceStream
{
	pub fn open(path: &Path) -> Result<SourceStream>
	{
		let file = ::std::fs::File::open(path).map_err(Error::Io)?;
		let size = file.metadata().map_err(Error::Io)?.len() as i64;
		Ok(SourceStream {
			input: Input::File {
				path: path.to_owned(),
				chars: ::std::io::BufReader::new(file).chars(),
				},
			pushback: Vec::new(),
			remaining: size,
			size: size,
			line: 1,
			})
	}
	pub fn from_str(text: &str) -> SourceStream
	{
		let chars: Vec<char> = text.chars().collect();
		let size = chars.len() as i64;
		SourceStream {
			input: Input::Text { chars: chars, pos: 0 },
			pushback: Vec::new(),
			remaining: size,
			size: size,
			line: 1,
			}
	}

	pub fn remaining(&self) -> i64 {
		self.remaining
	}
	/// 1-based line of the next character to be read
	pub fn line(&self) -> usize {
		self.line
	}

	/// Next raw character, preferring pushback. `None` is end-of-input.
	pub fn get_raw(&mut self) -> Result<Option<char>>
	{
		self.remaining -= 1;
		let rv = if let Some(ch) = self.pushback.pop() {
				Some(ch)
			}
			else {
				match self.input
				{
				Input::File { ref mut chars, .. } =>
					match chars.next()
					{
					Some(Ok(ch)) => Some(ch),
					Some(Err(e)) => return Err(Error::Io(e)),
					None => None,
					},
				Input::Text { ref chars, ref mut pos } => {
					let rv = chars.get(*pos).cloned();
					if rv.is_some() {
						*pos += 1;
					}
					rv
					},
				}
			};
		if rv == Some('\n') {
			self.line += 1;
		}
		Ok(rv)
	}
	/// Push one character back for re-reading (LIFO)
	pub fn unget(&mut self, ch: char)
	{
		if self.pushback.len() >= MAX_PUSHBACK {
			panic!("SourceStream::unget - pushback depth exceeds {}", MAX_PUSHBACK);
		}
		if ch == '\n' {
			self.line -= 1;
		}
		self.pushback.push(ch);
		self.remaining += 1;
	}
	/// Rewind to the start of the input, clearing all pushback
	pub fn reset(&mut self) -> Result<()>
	{
		self.pushback.clear();
		self.remaining = self.size;
		self.line = 1;
		match self.input
		{
		Input::File { ref path, ref mut chars } => {
			let file = ::std::fs::File::open(path).map_err(Error::Io)?;
			*chars = ::std::io::BufReader::new(file).chars();
			},
		Input::Text { ref mut pos, .. } => {
			*pos = 0;
			},
		}
		Ok(())
	}
}

/// Result of a pre-tokenizer fetch: literals and comments become whole
/// tokens below the tokenizer proper, everything else is a plain character.
enum Sourced
{
	End,
	Ch(char),
	Tok(Token),
}

pub struct Lexer
{
	stream: SourceStream,
}

impl Lexer
{
	pub fn new(stream: SourceStream) -> Lexer
	{
		Lexer {
			stream: stream,
			}
	}
	pub fn open(path: &Path) -> Result<Lexer>
	{
		Ok(Lexer::new( SourceStream::open(path)? ))
	}
	pub fn from_str(text: &str) -> Lexer
	{
		Lexer::new( SourceStream::from_str(text) )
	}

	pub fn line(&self) -> usize {
		self.stream.line()
	}
	pub fn remaining(&self) -> i64 {
		self.stream.remaining()
	}
	/// Rewind for another pass over the same source
	pub fn reset(&mut self) -> Result<()>
	{
		self.stream.reset()
	}

	/// Trigraph resolution - entered after a raw `?`.
	///
	/// On any mismatch the consumed characters go back on the stream so that
	/// re-reading reproduces the original byte sequence exactly.
	fn trigraph(&mut self) -> Result<char>
	{
		let ch2 = match self.stream.get_raw()?
			{
			Some(c) => c,
			None => return Ok('?'),
			};
		if ch2 != '?' {
			self.stream.unget(ch2);
			return Ok('?');
		}
		let ch3 = match self.stream.get_raw()?
			{
			Some(c) => c,
			None => {
				self.stream.unget('?');
				return Ok('?');
				},
			};
		Ok(match ch3
		{
		'(' => '[',
		')' => ']',
		'/' => '\\',
		'\'' => '^',
		'<' => '{',
		'>' => '}',
		'!' => '|',
		'-' => '~',
		'=' => '#',
		_ => {
			// `ch3` below `?` in the stack, so `?` comes back first
			self.stream.unget(ch3);
			self.stream.unget('?');
			'?'
			},
		})
	}
	/// Digraph resolution - entered after a raw `<`, `:` or `%`
	fn digraph(&mut self, first: char) -> Result<char>
	{
		let ch = match self.stream.get_raw()?
			{
			Some(c) => c,
			None => return Ok(first),
			};
		Ok(match (first, ch)
		{
		('<', '%') => '{',
		('<', ':') => '[',
		('%', '>') => '}',
		('%', ':') => '#',
		(':', '>') => ']',
		_ => {
			self.stream.unget(ch);
			first
			},
		})
	}

	/// One normalized character: trigraphs and digraphs rewritten.
	///
	/// Every scanner reads through here, so the sequences stay active inside
	/// comments and string bodies. Normalisation never emits one of its own
	/// trigger characters, so pushed-back output is safe to re-read.
	fn next_char(&mut self) -> Result<Option<char>>
	{
		Ok(match self.stream.get_raw()?
		{
		Some('?') => Some(self.trigraph()?),
		Some(ch @ '<') | Some(ch @ ':') | Some(ch @ '%') => Some(self.digraph(ch)?),
		v => v,
		})
	}

	/// Whitespace collapsing: a run of whitespace folds to a single space,
	/// except that a newline in the run is significant and returned verbatim.
	fn get(&mut self) -> Result<Option<char>>
	{
		let mut ch = match self.next_char()?
			{
			Some(c) => c,
			None => return Ok(None),
			};
		if !isspace(ch) {
			return Ok(Some(ch));
		}
		while isspace(ch) && ch != '\n'
		{
			ch = match self.next_char()?
				{
				Some(c) => c,
				None => return Ok(None),
				};
		}
		if ch == '\n' {
			return Ok(Some('\n'));
		}
		self.stream.unget(ch);
		Ok(Some(' '))
	}

	/// Character literal - the opening `'` has been eaten.
	///
	/// Body characters are read raw; an escape copies the backslash and one
	/// normalized follower verbatim, counting as a single constituent.
	fn scan_charlit(&mut self) -> Result<Token>
	{
		let mut text = String::new();
		text.push('\'');
		let mut count = 0;
		loop
		{
			let ch = match self.stream.get_raw()?
				{
				Some(c) => c,
				None => return Ok(Token::Error(LexFail::UnterminatedChar)),
				};
			if ch == '\'' {
				break;
			}
			if ch == '\n' {
				return Ok(Token::Error(LexFail::UnterminatedChar));
			}
			text.push(ch);
			count += 1;
			if ch == '\\' {
				match self.next_char()?
				{
				Some(c) => text.push(c),
				None => return Ok(Token::Error(LexFail::UnterminatedChar)),
				}
			}
		}
		if count > 2 {
			return Ok(Token::Error(LexFail::OverlongChar));
		}
		text.push('\'');
		Ok(Token::CharLit(text))
	}

	/// String literal - the opening `"` has been eaten.
	///
	/// The body reads through the normalizer; the one character after a `\`
	/// bypasses it, and the pair is copied uninterpreted.
	fn scan_strlit(&mut self) -> Result<Token>
	{
		let mut text = String::new();
		text.push('"');
		loop
		{
			let ch = match self.next_char()?
				{
				Some(c) => c,
				None => return Ok(Token::Error(LexFail::UnterminatedString)),
				};
			if ch == '"' {
				break;
			}
			if ch == '\n' {
				return Ok(Token::Error(LexFail::UnterminatedString));
			}
			text.push(ch);
			if ch == '\\' {
				match self.stream.get_raw()?
				{
				Some(c) => text.push(c),
				None => return Ok(Token::Error(LexFail::UnterminatedString)),
				}
			}
		}
		text.push('"');
		Ok(Token::StringLit(text))
	}

	/// Comment - a leading `/` has been eaten. If the next character opens
	/// neither comment form, the `/` is a plain punctuation token.
	fn scan_comment(&mut self) -> Result<Token>
	{
		let ch = match self.next_char()?
			{
			Some(c) => c,
			None => return Ok(Token::Punct('/')),
			};
		if ch == '/' {
			let mut text = String::from("//");
			loop
			{
				let ch = match self.next_char()?
					{
					Some(c) => c,
					None => break,
					};
				if ch == '\n' {
					break;
				}
				text.push(ch);
				if ch == '\\' {
					// line continuation: copy the pair and keep scanning
					match self.next_char()?
					{
					Some(c) => text.push(c),
					None => break,
					}
				}
			}
			return Ok(Token::Comment(text));
		}
		if ch != '*' {
			self.stream.unget(ch);
			return Ok(Token::Punct('/'));
		}
		let mut text = String::from("/*");
		loop
		{
			match self.next_char()?
			{
			None => return Ok(Token::Error(LexFail::UnterminatedComment)),
			Some('*') =>
				match self.next_char()?
				{
				None => return Ok(Token::Error(LexFail::UnterminatedComment)),
				Some('/') => {
					text.push_str("*/");
					break;
					},
				Some('*') => {
					// Handles '**/'
					text.push('*');
					self.stream.unget('*');
					},
				Some(c) => {
					text.push('*');
					text.push(c);
					},
				},
			Some(c) => text.push(c),
			}
		}
		Ok(Token::Comment(text))
	}

	/// Pre-tokenizer fetch: dispatch to the literal scanners, pass
	/// everything else through as a character.
	fn get_source(&mut self) -> Result<Sourced>
	{
		Ok(match self.get()?
		{
		None => Sourced::End,
		Some('\'') => Sourced::Tok(self.scan_charlit()?),
		Some('"') => Sourced::Tok(self.scan_strlit()?),
		Some('/') =>
			match self.scan_comment()?
			{
			Token::Punct(c) => Sourced::Ch(c),
			t => Sourced::Tok(t),
			},
		Some(ch) => Sourced::Ch(ch),
		})
	}

	/// Read a single classified token from the stream
	pub fn next_token(&mut self) -> Result<Token>
	{
		let ch = match self.get_source()?
			{
			Sourced::End => return Ok(Token::EOF),
			Sourced::Tok(t) => {
				trace!("next_token: {:?}", t);
				return Ok(t);
				},
			Sourced::Ch(c) => c,
			};
		let rv = if ch == '_' || ch.is_ascii_alphabetic() {
				let mut name = String::new();
				let mut ch = ch;
				loop
				{
					name.push(ch);
					ch = match self.get()?
						{
						Some(c) => c,
						None => break,
						};
					if !(ch.is_ascii_alphanumeric() || ch == '_') {
						self.stream.unget(ch);
						break;
					}
				}
				match Keyword::from_ident(&name)
				{
				Some(kw) => Token::Keyword(kw),
				None => Token::Ident(name),
				}
			}
			else {
				Token::Punct(ch)
			};
		trace!("next_token: {:?}", rv);
		Ok(rv)
	}
}

/// Two-pass token statistics listing: keyword counts and echoed punctuation
/// first, identifiers after a rewind. A debug aid carried over from the
/// original front end; also a live demonstration that `reset` replays the
/// stream identically.
pub fn debug_dump(lex: &mut Lexer) -> Result<()>
{
	let mut counts = [0usize; 9];
	println!("===========================");
	println!("TOKENS:");
	println!("===========================");
	loop
	{
		match lex.next_token()?
		{
		Token::EOF | Token::Error(_) => break,
		Token::Keyword(kw) => counts[kw as usize] += 1,
		Token::Punct(ch) =>
			if ch >= '!' && ch <= '~' {
				print!("{}", ch);
			},
		_ => {},
		}
		if lex.remaining() < 0 {
			break;
		}
	}
	println!("");
	println!("===========================");
	println!("KEYWORDS");
	println!("===========================");
	for (i, &(name, _)) in token::KEYWORDS.iter().enumerate()
	{
		println!("\t {:<8} {:8}", name, counts[i]);
	}
	println!("===========================");
	println!("IDENTIFIERS");
	println!("===========================");
	lex.reset()?;
	loop
	{
		match lex.next_token()?
		{
		Token::EOF | Token::Error(_) => break,
		Token::Ident(name) => print!("{} ", name),
		_ => {},
		}
		if lex.remaining() < 0 {
			break;
		}
	}
	println!("");
	lex.reset()?;
	Ok(())
}

fn isspace(ch: char) -> bool
{
	match ch
	{
	' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r' => true,
	_ => false,
	}
}

#[cfg(test)]
mod tests
{
	use super::Lexer;
	use super::token::{Token,Keyword,LexFail};

	fn lex_all(src: &str) -> Vec<Token>
	{
		let mut lex = Lexer::from_str(src);
		let mut rv = Vec::new();
		loop
		{
			let t = lex.next_token().unwrap();
			let done = t == Token::EOF || matches!(t, Token::Error(_));
			rv.push(t);
			if done {
				break;
			}
		}
		rv
	}

	#[test]
	fn trigraphs_map()
	{
		let src = "??( ??) ??/ ??' ??< ??> ??! ??- ??=";
		let expect = ['[', ']', '\\', '^', '{', '}', '|', '~', '#'];
		let mut lex = Lexer::from_str(src);
		for (i, &want) in expect.iter().enumerate()
		{
			assert_eq!(lex.next_char().unwrap(), Some(want), "trigraph #{}", i);
			if i + 1 < expect.len() {
				assert_eq!(lex.next_char().unwrap(), Some(' '));
			}
		}
		assert_eq!(lex.next_char().unwrap(), None);
	}

	#[test]
	fn failed_trigraph_round_trips()
	{
		// `??x` is not a trigraph: the lone `?` comes out, then the stream
		// replays `?x` byte for byte
		let mut lex = Lexer::from_str("??x");
		assert_eq!(lex.next_char().unwrap(), Some('?'));
		assert_eq!(lex.next_char().unwrap(), Some('?'));
		assert_eq!(lex.next_char().unwrap(), Some('x'));
		assert_eq!(lex.next_char().unwrap(), None);

		let mut lex = Lexer::from_str("?a");
		assert_eq!(lex.next_char().unwrap(), Some('?'));
		assert_eq!(lex.next_char().unwrap(), Some('a'));
	}

	#[test]
	fn digraphs_map()
	{
		let mut lex = Lexer::from_str("<%<:%>%::>");
		assert_eq!(lex.next_char().unwrap(), Some('{'));
		assert_eq!(lex.next_char().unwrap(), Some('['));
		assert_eq!(lex.next_char().unwrap(), Some('}'));
		assert_eq!(lex.next_char().unwrap(), Some('#'));
		assert_eq!(lex.next_char().unwrap(), Some(']'));
		assert_eq!(lex.next_char().unwrap(), None);
	}

	#[test]
	fn failed_digraph_restores_lookahead()
	{
		let mut lex = Lexer::from_str("<a:b%c");
		for want in ['<', 'a', ':', 'b', '%', 'c'].iter()
		{
			assert_eq!(lex.next_char().unwrap(), Some(*want));
		}
		assert_eq!(lex.next_char().unwrap(), None);
	}

	#[test]
	fn whitespace_collapses_but_newlines_survive()
	{
		let toks = lex_all("a  \t  b\nc");
		assert_eq!(toks, vec![
			Token::Ident("a".to_owned()),
			Token::Punct(' '),
			Token::Ident("b".to_owned()),
			Token::Punct('\n'),
			Token::Ident("c".to_owned()),
			Token::EOF,
			]);
	}

	#[test]
	fn keyword_resolution_and_maximal_munch()
	{
		let toks = lex_all("while whilex do");
		assert_eq!(toks[0], Token::Keyword(Keyword::While));
		assert_eq!(Keyword::While as usize, 3);
		assert_eq!(toks[2], Token::Ident("whilex".to_owned()));
		assert_eq!(toks[4], Token::Keyword(Keyword::Do));
	}

	#[test]
	fn string_literal_keeps_delimiters_and_escapes()
	{
		let toks = lex_all("\"hello\\n\";");
		assert_eq!(toks[0], Token::StringLit("\"hello\\n\"".to_owned()));
		assert_eq!(toks[1], Token::Punct(';'));
	}

	#[test]
	fn trigraphs_stay_active_inside_strings()
	{
		// Quirky but intentional layering: the normalizer sits below the
		// string scanner
		let toks = lex_all("\"??=\"");
		assert_eq!(toks[0], Token::StringLit("\"#\"".to_owned()));
	}

	#[test]
	fn newline_in_string_is_a_lex_error()
	{
		let toks = lex_all("\"abc\ndef\"");
		assert_eq!(toks[0], Token::Error(LexFail::UnterminatedString));
	}

	#[test]
	fn eof_in_string_is_a_lex_error()
	{
		let toks = lex_all("\"abc");
		assert_eq!(toks[0], Token::Error(LexFail::UnterminatedString));
	}

	#[test]
	fn char_literals()
	{
		assert_eq!(lex_all("'a'")[0], Token::CharLit("'a'".to_owned()));
		assert_eq!(lex_all("'\\n'")[0], Token::CharLit("'\\n'".to_owned()));
		// two constituents are the allowed maximum
		assert_eq!(lex_all("'ab'")[0], Token::CharLit("'ab'".to_owned()));
		assert_eq!(lex_all("'abc'")[0], Token::Error(LexFail::OverlongChar));
		assert_eq!(lex_all("'a\nb'")[0], Token::Error(LexFail::UnterminatedChar));
	}

	#[test]
	fn line_comments()
	{
		let toks = lex_all("// hi\nx");
		assert_eq!(toks[0], Token::Comment("// hi".to_owned()));
		assert_eq!(toks[1], Token::Ident("x".to_owned()));

		// an escaped line end continues the comment
		let toks = lex_all("// a\\\nb\nc");
		assert_eq!(toks[0], Token::Comment("// a\\\nb".to_owned()));
		assert_eq!(toks[1], Token::Ident("c".to_owned()));
	}

	#[test]
	fn block_comments()
	{
		let toks = lex_all("/* a\nb */x");
		assert_eq!(toks[0], Token::Comment("/* a\nb */".to_owned()));
		assert_eq!(toks[1], Token::Ident("x".to_owned()));

		assert_eq!(lex_all("/**/")[0], Token::Comment("/**/".to_owned()));
		assert_eq!(lex_all("/***/")[0], Token::Comment("/***/".to_owned()));
		assert_eq!(lex_all("/* open")[0], Token::Error(LexFail::UnterminatedComment));
	}

	#[test]
	fn lone_slash_is_punctuation()
	{
		let toks = lex_all("a/b");
		assert_eq!(toks, vec![
			Token::Ident("a".to_owned()),
			Token::Punct('/'),
			Token::Ident("b".to_owned()),
			Token::EOF,
			]);
	}

	#[test]
	fn reset_replays_identically()
	{
		let mut lex = Lexer::from_str("float x = 1; // done\nwhile \"??=\" 'a'");
		let mut first = Vec::new();
		loop
		{
			let t = lex.next_token().unwrap();
			let done = t == Token::EOF;
			first.push(t);
			if done { break; }
		}
		lex.reset().unwrap();
		let mut second = Vec::new();
		loop
		{
			let t = lex.next_token().unwrap();
			let done = t == Token::EOF;
			second.push(t);
			if done { break; }
		}
		assert_eq!(first, second);
	}

	#[test]
	#[should_panic]
	fn pushback_overflow_is_a_bug()
	{
		let mut stream = super::SourceStream::from_str("");
		for _ in 0 .. super::MAX_PUSHBACK + 1
		{
			stream.unget('x');
		}
	}
}

// vim: ft=rust
