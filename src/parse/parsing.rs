/*
 * Top-level declaration parser: typedefs, typed globals, compile-time
 * constants, and recursive `#include` handling.
 */
use std::collections::HashMap;
use std::path::{Path,PathBuf};

use lex::{Lexer,Token};
use parse::{Error,Result};
use parse::ops::OperatorSet;

/// Hard cap on `#include` nesting; cycles are also detected explicitly
const MAX_INCLUDE_DEPTH: usize = 32;

#[derive(Debug,PartialEq,Eq,Clone,Copy)]
pub enum ConstType
{
	Void,
	String,
	Vector,
	Entity,
	Float,
}
impl ConstType
{
	fn from_ident(name: &str) -> Option<ConstType>
	{
		Some(match name
		{
		"void" => ConstType::Void,
		"string" => ConstType::String,
		"vector" => ConstType::Vector,
		"entity" => ConstType::Entity,
		"float" => ConstType::Float,
		_ => return None,
		})
	}
	fn name(&self) -> &'static str
	{
		match *self
		{
		ConstType::Void => "VOID",
		ConstType::String => "STRING",
		ConstType::Vector => "VECTOR",
		ConstType::Entity => "ENTITY",
		ConstType::Float => "FLOAT",
		}
	}
}

/// A compile-time constant recorded during the declaration pass
#[derive(Debug,PartialEq,Clone)]
pub struct Constant
{
	pub name: String,
	pub ty: ConstType,
	/// Vector components; unused components stay zero for scalar types
	pub value: [f32; 3],
	/// String constants keep their surrounding quotes (see DESIGN.md);
	/// include markers carry the resolved path here
	pub string: Option<String>,
}

/// A bare declaration, a name in the defs table with no value attached yet
#[derive(Debug,PartialEq,Clone)]
pub struct Definition
{
	pub name: String,
	pub ty: ConstType,
}

/// All state for one parsing pass, shared by reference through include
/// recursion
pub struct ParseSession
{
	pub constants: Vec<Constant>,
	pub definitions: Vec<Definition>,
	typedefs: HashMap<String,String>,
	/// Resolved paths of the files currently being parsed, outermost first
	include_stack: Vec<PathBuf>,
	operators: OperatorSet,
	errors: usize,
}

impl ParseSession
{
	pub fn new(operators: OperatorSet) -> ParseSession
	{
		ParseSession {
			constants: Vec::new(),
			definitions: Vec::new(),
			typedefs: HashMap::new(),
			include_stack: Vec::new(),
			operators: operators,
			errors: 0,
			}
	}

	pub fn operators(&self) -> OperatorSet {
		self.operators
	}
	pub fn error_count(&self) -> usize {
		self.errors
	}
	pub fn typedef(&self, from: &str) -> Option<&str>
	{
		self.typedefs.get(from).map(|s| &s[..])
	}
	/// Register a type alias. Registration is the entire contract in this
	/// pass; resolution belongs to later stages.
	fn add_typedef(&mut self, from: String, to: String)
	{
		info!("typedef {} -> {}", from, to);
		self.typedefs.insert(from, to);
	}

	/// Listing of the recorded constants, printed once the top-level pass
	/// completes
	pub fn dump_constants(&self)
	{
		for c in &self.constants
		{
			match c.ty
			{
			ConstType::Vector =>
				println!("constant: {} VECTOR {{{},{},{}}}", c.name, c.value[0], c.value[1], c.value[2]),
			ConstType::String | ConstType::Void =>
				println!("constant: {} {}  {}", c.name, c.ty.name(),
					c.string.as_ref().map(|s| &s[..]).unwrap_or("")),
			_ =>
				println!("constant: {} {}   {}", c.name, c.ty.name(), c.value[0]),
			}
		}
	}
}

/// Parse a source file, and recursively everything it includes, into the
/// session's tables, then dump the recorded constants.
pub fn parse(session: &mut ParseSession, path: &Path) -> Result<()>
{
	parse_file(session, path)?;
	session.dump_constants();
	Ok(())
}

/// One file, top-level or included. Guards the include stack on the way in
/// and out.
fn parse_file(session: &mut ParseSession, path: &Path) -> Result<()>
{
	let full = path.canonicalize().unwrap_or_else(|_| path.to_owned());
	if session.include_stack.len() >= MAX_INCLUDE_DEPTH {
		return Err(Error::Fatal(format!("#include nesting deeper than {} at {}",
			MAX_INCLUDE_DEPTH, path.display())));
	}
	if session.include_stack.iter().any(|p| *p == full) {
		return Err(Error::Fatal(format!("#include cycle: {} is already being parsed",
			path.display())));
	}
	let lex = match Lexer::open(path)
		{
		Ok(l) => l,
		Err(::lex::Error::Io(e)) =>
			return Err(Error::Fatal(format!("Include subsystem failure: unable to open {}: {}",
				path.display(), e))),
		};

	session.include_stack.push(full);
	let rv = {
		let mut state = ParseState {
			session: session,
			lex: lex,
			path: path.to_owned(),
			saved_tok: None,
			};
		state.parse_root()
		};
	session.include_stack.pop();
	rv
}

struct ParseState<'s>
{
	session: &'s mut ParseSession,
	lex: Lexer,
	path: PathBuf,
	/// Saved token for `put_back`
	saved_tok: Option<Token>,
}

impl<'s> ParseState<'s>
{
	fn put_back(&mut self, tok: Token)
	{
		assert!( self.saved_tok.is_none() );
		self.saved_tok = Some(tok);
	}
	fn next_token(&mut self) -> Result<Token>
	{
		if let Some(tok) = self.saved_tok.take() {
			return Ok(tok);
		}
		Ok(self.lex.next_token()?)
	}
	/// Next token with a single collapsed-space token skipped
	fn next_nonspace(&mut self) -> Result<Token>
	{
		let tok = self.next_token()?;
		if tok == Token::Punct(' ') {
			return self.next_token();
		}
		Ok(tok)
	}

	/// Report a recoverable parse error and keep going
	fn error(&mut self, msg: &str)
	{
		error!("{}:{}: {}", self.path.display(), self.lex.line(), msg);
		self.session.errors += 1;
	}

	fn parse_root(&mut self) -> Result<()>
	{
		loop
		{
			let tok = self.next_token()?;
			debug!("parse_root: tok={:?}", tok);
			match tok
			{
			Token::EOF => break,
			Token::Error(f) => {
				// A lex failure ends the pass for this file
				self.error(&format!("{}", f));
				break;
				},
			Token::Ident(name) => {
				if name == "typedef" {
					self.parse_typedef()?;
				}
				else if let Some(ty) = ConstType::from_ident(&name) {
					self.parse_declaration(ty)?;
				}
				else {
					// Stray identifier: the token after it is consumed and
					// discarded too
					let _ = self.next_token()?;
				}
				},
			Token::Punct('#') => {
				self.parse_directive()?;
				},
			_ => {},
			}
		}
		Ok(())
	}

	/// `typedef A B ;`
	fn parse_typedef(&mut self) -> Result<()>
	{
		let from = match self.next_nonspace()?
			{
			Token::Ident(name) => name,
			t => {
				self.error(&format!("Expected source type in typedef statement, got {:?}", t));
				return Ok(());
				},
			};
		let to = match self.next_nonspace()?
			{
			Token::Ident(name) => name,
			t => {
				self.error(&format!("Expected target type in typedef statement, got {:?}", t));
				return Ok(());
				},
			};
		self.session.add_typedef(from, to);
		match self.next_nonspace()?
		{
		Token::Punct(';') => {},
		_ => self.error("Expected a `;` at end of typedef statement"),
		}
		Ok(())
	}

	/// A typed top-level declaration; the type name has been eaten
	fn parse_declaration(&mut self, ty: ConstType) -> Result<()>
	{
		let name = match self.next_nonspace()?
			{
			Token::Ident(name) => name,
			t => {
				self.error(&format!("Expected name in declaration, got {:?}", t));
				return Ok(());
				},
			};
		match self.next_nonspace()?
		{
		Token::Punct(';') => {
			self.session.definitions.push(Definition { name: name, ty: ty });
			},
		Token::Punct('=') => {
			self.parse_initializer(ty, name)?;
			},
		Token::Punct('(') => {
			debug!("function declaration {} {} - not handled in this pass", ty.name(), name);
			},
		t => {
			self.error(&format!("Expected `;` or `=` after declaration of {}, got {:?}", name, t));
			},
		}
		Ok(())
	}

	/// A constant initializer; `NAME =` has been eaten
	fn parse_initializer(&mut self, ty: ConstType, name: String) -> Result<()>
	{
		let tok = self.next_nonspace()?;
		match ty
		{
		ConstType::Void => {
			self.error("Cannot assign value to type void");
			},
		ConstType::String =>
			match tok
			{
			Token::StringLit(text) => {
				self.session.constants.push(Constant {
					name: name,
					ty: ConstType::String,
					value: [0.0; 3],
					string: Some(text),
					});
				},
			_ => self.error("Expected a '\"' (quote) for string constant"),
			},
		ConstType::Vector => {
			if tok != Token::Punct('{') {
				self.error("Expected initializer list for vector constant");
				return Ok(());
			}
			let x = self.parse_vec_element('x', false)?;
			let y = self.parse_vec_element('y', false)?;
			let z = self.parse_vec_element('z', true)?;
			match self.next_nonspace()?
			{
			Token::Punct(';') => {},
			_ => self.error("Expected `;` on end of constant initialization for vector"),
			}
			self.session.constants.push(Constant {
				name: name,
				ty: ConstType::Vector,
				value: [x, y, z],
				string: None,
				});
			},
		ConstType::Entity | ConstType::Float =>
			match tok
			{
			// Only the leading digit is validated here; the remaining digit
			// tokens fall through the main loop
			Token::Punct(ch) if ch.is_ascii_digit() => {
				self.session.constants.push(Constant {
					name: name,
					ty: ConstType::Float,
					value: [0.0; 3],
					string: None,
					});
				},
			_ => self.error("Expected numeric constant for float constant"),
			},
		}
		Ok(())
	}

	/// One positional vector component: digits, at most one `.`, a sign only
	/// in the leading position. Errors are reported and scanning continues;
	/// a malformed accumulation falls back to zero.
	fn parse_vec_element(&mut self, name: char, is_last: bool) -> Result<f32>
	{
		let mut text = String::new();
		let mut seen_dot = false;

		let mut tok = self.next_nonspace()?;
		match tok
		{
		Token::Punct('.') => { seen_dot = true; },
		Token::Punct('+') | Token::Punct('-') => {},
		Token::Punct(ch) if ch.is_ascii_digit() => {},
		_ => {
			self.error(&format!("Invalid constant initializer element {} for vector, must be numeric", name));
			},
		}

		loop
		{
			match tok
			{
			Token::Punct(c) if c.is_ascii_digit() || c == '.' || c == '+' || c == '-' =>
				text.push(c),
			_ => break,
			}
			tok = self.next_token()?;
			match tok
			{
			Token::Punct('.') if seen_dot => {
				self.error(&format!("Invalid constant initializer element {} for vector, must be numeric", name));
				tok = self.next_token()?;
				},
			Token::Punct('.') => { seen_dot = true; },
			Token::Punct('+') | Token::Punct('-') => {
				self.error(&format!("Invalid constant initializer sign for vector element {}", name));
				tok = self.next_token()?;
				},
			_ => {},
			}
		}

		if tok == Token::Punct(' ') {
			tok = self.next_token()?;
		}
		if !is_last {
			if tok != Token::Punct(',') && tok != Token::Punct(' ') {
				self.error(&format!("Invalid constant initializer element {} for vector (missing spaces, or comma delimited list?)", name));
			}
		}
		else if tok != Token::Punct('}') {
			self.error("Expected `}` on end of constant initialization for vector");
		}

		Ok(text.parse().unwrap_or(0.0))
	}

	/// A `#` directive; the `#` has been eaten. Only `#include` is
	/// recognized, everything else is discarded to end of line.
	fn parse_directive(&mut self) -> Result<()>
	{
		let tok = self.next_nonspace()?;
		if let Token::Ident(ref name) = tok {
			if name == "include" {
				return self.parse_include();
			}
		}
		self.skip_to_newline(tok)
	}

	/// `#include "path"`. Double quotes only, angle brackets are
	/// deliberately unsupported.
	fn parse_include(&mut self) -> Result<()>
	{
		// Scan forward for the quoted path; anything before it is discarded
		let quoted;
		loop
		{
			match self.next_token()?
			{
			Token::StringLit(text) => {
				quoted = text;
				break;
				},
			Token::Punct('\n') | Token::EOF =>
				return Err(Error::Parse(format!(
					"{}:{}: Invalid use of include preprocessor directive: wanted #include \"file.h\"",
					self.path.display(), self.lex.line()))),
			Token::Error(f) =>
				return Err(Error::Parse(format!("{}:{}: {}",
					self.path.display(), self.lex.line(), f))),
			_ => {},
			}
		}

		// The scanner guarantees the delimiting quotes
		let rel = &quoted[1 .. quoted.len() - 1];
		let inc_path = match self.path.parent()
			{
			Some(dir) => dir.join(rel),
			None => PathBuf::from(rel),
			};
		info!("#include {:?} from {}", rel, self.path.display());

		// Record the marker before descending, keeping the constant table in
		// document order
		self.session.constants.push(Constant {
			name: "#include".to_owned(),
			ty: ConstType::Void,
			value: [0.0; 3],
			string: Some(inc_path.display().to_string()),
			});

		parse_file(&mut *self.session, &inc_path)?;

		// Discard the remainder of the directive line
		let tok = self.next_token()?;
		self.skip_to_newline(tok)
	}

	fn skip_to_newline(&mut self, mut tok: Token) -> Result<()>
	{
		loop
		{
			match tok
			{
			Token::Punct('\n') => break,
			Token::EOF | Token::Error(_) => {
				// Leave it for the main loop to act on
				self.put_back(tok);
				break;
				},
			_ => {},
			}
			tok = self.next_token()?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests
{
	use std::path::PathBuf;
	use lex::Lexer;
	use parse::Error;
	use parse::ops::OperatorSet;
	use super::{parse,ParseSession,ParseState,ConstType};

	fn parse_str(src: &str) -> ParseSession
	{
		let mut session = ParseSession::new(OperatorSet::C);
		{
			let mut state = ParseState {
				session: &mut session,
				lex: Lexer::from_str(src),
				path: PathBuf::from("<test>"),
				saved_tok: None,
				};
			state.parse_root().unwrap();
		}
		session
	}

	#[test]
	fn vector_constant()
	{
		let session = parse_str("vector v = {1, -2.5, 3};\n");
		assert_eq!(session.error_count(), 0);
		assert_eq!(session.constants.len(), 1);
		let c = &session.constants[0];
		assert_eq!(c.name, "v");
		assert_eq!(c.ty, ConstType::Vector);
		assert_eq!(c.value, [1.0, -2.5, 3.0]);
		assert_eq!(c.string, None);
	}

	#[test]
	fn vector_rejects_double_dot()
	{
		let session = parse_str("vector v = {1.2.3, 0, 0};\n");
		assert!(session.error_count() > 0);
		// non-fatal: the constant is still recorded, malformed element zeroed
		assert_eq!(session.constants.len(), 1);
	}

	#[test]
	fn string_constant_keeps_quotes()
	{
		let session = parse_str("string s = \"hello\";\n");
		assert_eq!(session.error_count(), 0);
		let c = &session.constants[0];
		assert_eq!(c.ty, ConstType::String);
		assert_eq!(c.string.as_ref().unwrap(), "\"hello\"");
	}

	#[test]
	fn string_constant_requires_quote()
	{
		let session = parse_str("string s = hello;\n");
		assert!(session.error_count() > 0);
		assert!(session.constants.is_empty());
	}

	#[test]
	fn void_cannot_be_initialized()
	{
		let session = parse_str("void v = 1;\n");
		assert!(session.error_count() > 0);
		assert!(session.constants.is_empty());
	}

	#[test]
	fn float_initializer_records_placeholder()
	{
		let session = parse_str("float health = 100;\n");
		assert_eq!(session.error_count(), 0);
		let c = &session.constants[0];
		assert_eq!(c.ty, ConstType::Float);
		assert_eq!(c.value, [0.0; 3]);
	}

	#[test]
	fn float_initializer_requires_digit()
	{
		let session = parse_str("float health = x;\n");
		assert!(session.error_count() > 0);
	}

	#[test]
	fn bare_declarations_go_to_defs()
	{
		let session = parse_str("entity world;\nfloat time;\n");
		assert_eq!(session.error_count(), 0);
		assert_eq!(session.definitions.len(), 2);
		assert_eq!(session.definitions[0].name, "world");
		assert_eq!(session.definitions[0].ty, ConstType::Entity);
		assert_eq!(session.definitions[1].ty, ConstType::Float);
	}

	#[test]
	fn typedef_registers_alias()
	{
		let session = parse_str("typedef float scalar;\n");
		assert_eq!(session.error_count(), 0);
		assert_eq!(session.typedef("float"), Some("scalar"));
	}

	#[test]
	fn typedef_requires_semicolon()
	{
		let session = parse_str("typedef float scalar\n");
		assert!(session.error_count() > 0);
	}

	#[test]
	fn unknown_directives_are_discarded()
	{
		let session = parse_str("#pragma whatever 1 2 3\nfloat f;\n");
		assert_eq!(session.error_count(), 0);
		assert_eq!(session.definitions.len(), 1);
	}

	#[test]
	fn lex_error_stops_the_pass()
	{
		let session = parse_str("float before;\n\"unterminated\nfloat after;\n");
		assert!(session.error_count() > 0);
		assert_eq!(session.definitions.len(), 1);
		assert_eq!(session.definitions[0].name, "before");
	}

	#[test]
	fn include_ordering()
	{
		let dir = ::tempfile::tempdir().unwrap();
		let main_path = dir.path().join("main.qc");
		let inc_path = dir.path().join("inc.qc");
		::std::fs::write(&main_path,
			"float before = 1;\n#include \"inc.qc\"\nfloat after = 2;\n").unwrap();
		::std::fs::write(&inc_path,
			"string greeting = \"hi\";\n").unwrap();

		let mut session = ParseSession::new(OperatorSet::C);
		parse(&mut session, &main_path).unwrap();
		assert_eq!(session.error_count(), 0);

		let names: Vec<&str> = session.constants.iter().map(|c| &c.name[..]).collect();
		assert_eq!(names, ["before", "#include", "greeting", "after"]);
		let marker = &session.constants[1];
		assert_eq!(marker.ty, ConstType::Void);
		assert!(marker.string.as_ref().unwrap().ends_with("inc.qc"));
	}

	#[test]
	fn missing_include_is_fatal()
	{
		let dir = ::tempfile::tempdir().unwrap();
		let main_path = dir.path().join("main.qc");
		::std::fs::write(&main_path, "#include \"nowhere.qc\"\n").unwrap();

		let mut session = ParseSession::new(OperatorSet::C);
		match parse(&mut session, &main_path)
		{
		Err(Error::Fatal(msg)) => assert!(msg.contains("Include subsystem failure")),
		other => panic!("expected fatal error, got {:?}", other.map(|_| ())),
		}
	}

	#[test]
	fn include_nesting_beyond_the_cap_is_fatal()
	{
		let dir = ::tempfile::tempdir().unwrap();
		// a chain of distinct files, each including the next, longer than
		// the nesting cap - the cycle guard never fires on it
		for i in 0 .. 40
		{
			let path = dir.path().join(format!("f{}.qc", i));
			::std::fs::write(&path, format!("#include \"f{}.qc\"\n", i + 1)).unwrap();
		}
		::std::fs::write(dir.path().join("f40.qc"), "float bottom;\n").unwrap();

		let mut session = ParseSession::new(OperatorSet::C);
		match parse(&mut session, &dir.path().join("f0.qc"))
		{
		Err(Error::Fatal(msg)) => assert!(msg.contains("nesting deeper than 32")),
		other => panic!("expected fatal error, got {:?}", other.map(|_| ())),
		}
	}

	#[test]
	fn self_include_trips_the_cycle_guard()
	{
		let dir = ::tempfile::tempdir().unwrap();
		let path = dir.path().join("a.qc");
		::std::fs::write(&path, "#include \"a.qc\"\n").unwrap();

		let mut session = ParseSession::new(OperatorSet::C);
		match parse(&mut session, &path)
		{
		Err(Error::Fatal(msg)) => assert!(msg.contains("cycle")),
		other => panic!("expected fatal error, got {:?}", other.map(|_| ())),
		}
	}

	#[test]
	fn include_without_quoted_path_is_structural()
	{
		let dir = ::tempfile::tempdir().unwrap();
		let path = dir.path().join("bad.qc");
		::std::fs::write(&path, "#include nowhere\nfloat f;\n").unwrap();

		let mut session = ParseSession::new(OperatorSet::C);
		match parse(&mut session, &path)
		{
		Err(Error::Parse(msg)) => assert!(msg.contains("include")),
		other => panic!("expected parse error, got {:?}", other.map(|_| ())),
		}
	}
}

// vim: ft=rust
