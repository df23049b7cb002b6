#[derive(Debug,PartialEq,Clone)]
/// Token type (result of lexing)
pub enum Token
{
	EOF,
	/// A malformed literal; fatal to any parse pass that sees it
	Error(LexFail),

	// Ignored Tokens
	Comment(String),

	// Leaves
	Ident(String),
	Keyword(Keyword),
	/// Raw literal text, surrounding quotes included
	CharLit(String),
	StringLit(String),

	/// Any other single character - classified by its own ordinal, so
	/// downstream code can switch directly on printable ASCII. The
	/// collapsed space and the newline travel through here too.
	Punct(char),
}

/// Reserved words.
///
/// The discriminant values are a stable external contract: consumers key off
/// the zero-based index into the keyword list, in this exact order.
#[allow(dead_code)]
#[derive(Debug,PartialEq,Eq,Clone,Copy)]
pub enum Keyword
{
	Do,
	Else,
	If,
	While,
	Break,
	Continue,
	Return,
	Goto,
	For,
}

/// Keyword spellings, in ordinal order
pub static KEYWORDS: [(&'static str, Keyword); 9] = [
	("do",       Keyword::Do),
	("else",     Keyword::Else),
	("if",       Keyword::If),
	("while",    Keyword::While),
	("break",    Keyword::Break),
	("continue", Keyword::Continue),
	("return",   Keyword::Return),
	("goto",     Keyword::Goto),
	("for",      Keyword::For),
];

impl Keyword
{
	/// Exact-match lookup (the tokenizer has already done maximal munch)
	pub fn from_ident(name: &str) -> Option<Keyword>
	{
		KEYWORDS.iter()
			.find(|&&(spelling, _)| spelling == name)
			.map(|&(_, kw)| kw)
	}
	pub fn name(&self) -> &'static str
	{
		KEYWORDS[*self as usize].0
	}
}

#[derive(Debug,PartialEq,Eq,Clone,Copy)]
pub enum LexFail
{
	/// Newline or EOF inside a character literal
	UnterminatedChar,
	/// More than two constituent characters before the closing quote
	OverlongChar,
	/// Newline or EOF inside a string literal
	UnterminatedString,
	/// EOF inside a block comment
	UnterminatedComment,
}
impl ::std::fmt::Display for LexFail
{
	fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result
	{
		match *self
		{
		LexFail::UnterminatedChar => write!(f, "unterminated character constant"),
		LexFail::OverlongChar => write!(f, "over-long character constant"),
		LexFail::UnterminatedString => write!(f, "unterminated string constant"),
		LexFail::UnterminatedComment => write!(f, "malformatted comment"),
		}
	}
}

#[cfg(test)]
mod tests
{
	use super::Keyword;

	#[test]
	fn keyword_ordinals_are_stable()
	{
		assert_eq!(Keyword::Do as usize, 0);
		assert_eq!(Keyword::While as usize, 3);
		assert_eq!(Keyword::For as usize, 8);
		for (i, &(spelling, kw)) in super::KEYWORDS.iter().enumerate()
		{
			assert_eq!(kw as usize, i);
			assert_eq!(kw.name(), spelling);
		}
	}

	#[test]
	fn keyword_lookup_is_exact()
	{
		assert_eq!(Keyword::from_ident("while"), Some(Keyword::While));
		assert_eq!(Keyword::from_ident("whilex"), None);
		assert_eq!(Keyword::from_ident("whil"), None);
		assert_eq!(Keyword::from_ident(""), None);
	}
}

// vim: ft=rust
