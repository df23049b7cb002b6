/*
 * Front-end error plumbing and the public parser surface
 */
pub use self::parsing::{parse,ParseSession};
pub use self::ops::OperatorSet;

pub mod ops;
mod parsing;

#[derive(Debug)]
pub enum Error
{
	/// Any form of IO error
	Io(::std::io::Error),
	/// A structural syntax error with no useful continuation
	Parse(String),
	/// An unrecoverable condition - include resolution failure, inclusion
	/// depth/cycle violations. Parsing cannot continue past one of these.
	Fatal(String),
}
impl From<::lex::Error> for Error
{
	fn from(e: ::lex::Error) -> Error
	{
		match e
		{
		::lex::Error::Io(e) => Error::Io(e),
		}
	}
}

pub type Result<T> = ::std::result::Result<T,Error>;

// vim: ft=rust
