/*
 * Operator precedence tables for the C-like and QuakeC-like operator sets.
 *
 * A pure data surface: the expression parser built on top performs
 * longest-match selection over the spellings, then drives precedence
 * climbing off `prec`/`assoc`. Precedence values compare only within one
 * table, and exactly one table is active per parse session.
 */

pub const OP_SUFFIX: u32 = 1;
pub const OP_PREFIX: u32 = 2;

#[derive(Debug,PartialEq,Eq,Clone,Copy)]
pub enum Assoc
{
	Left,
	Right,
}

#[derive(Debug,PartialEq,Eq,Clone,Copy)]
pub struct OperInfo
{
	pub op: &'static str,
	/// Operand count, 0-3 (0 is the bare grouping paren)
	pub operands: u32,
	/// Packed spelling id, see `opid1`/`opid2`/`opid3`
	pub id: u32,
	pub assoc: Assoc,
	/// Higher binds tighter
	pub prec: u32,
	pub flags: u32,
}

// Packed operator ids: up to three characters folded into one integer, so
// e.g. suffix `++` (S,+,+) and prefix `++` (+,+,P) stay distinct.
const fn opid1(a: char) -> u32 {
	a as u32
}
const fn opid2(a: char, b: char) -> u32 {
	((a as u32) << 8) | b as u32
}
const fn opid3(a: char, b: char, c: char) -> u32 {
	((a as u32) << 16) | ((b as u32) << 8) | c as u32
}

pub static C_OPERATORS: [OperInfo; 42] = [
	// paren expression - non function call
	OperInfo { op: "(",   operands: 0, id: opid1('('),           assoc: Assoc::Left,  prec: 99, flags: OP_PREFIX },

	OperInfo { op: "++",  operands: 1, id: opid3('S','+','+'),   assoc: Assoc::Left,  prec: 16, flags: OP_SUFFIX },
	OperInfo { op: "--",  operands: 1, id: opid3('S','-','-'),   assoc: Assoc::Left,  prec: 16, flags: OP_SUFFIX },

	OperInfo { op: ".",   operands: 2, id: opid1('.'),           assoc: Assoc::Left,  prec: 15, flags: 0 },
	// function call
	OperInfo { op: "(",   operands: 0, id: opid1('('),           assoc: Assoc::Left,  prec: 15, flags: 0 },

	OperInfo { op: "!",   operands: 1, id: opid2('!','P'),       assoc: Assoc::Right, prec: 14, flags: OP_PREFIX },
	OperInfo { op: "~",   operands: 1, id: opid2('~','P'),       assoc: Assoc::Right, prec: 14, flags: OP_PREFIX },
	OperInfo { op: "+",   operands: 1, id: opid2('+','P'),       assoc: Assoc::Right, prec: 14, flags: OP_PREFIX },
	OperInfo { op: "-",   operands: 1, id: opid2('-','P'),       assoc: Assoc::Right, prec: 14, flags: OP_PREFIX },
	OperInfo { op: "++",  operands: 1, id: opid3('+','+','P'),   assoc: Assoc::Right, prec: 14, flags: OP_PREFIX },
	OperInfo { op: "--",  operands: 1, id: opid3('-','-','P'),   assoc: Assoc::Right, prec: 14, flags: OP_PREFIX },

	OperInfo { op: "*",   operands: 2, id: opid1('*'),           assoc: Assoc::Left,  prec: 13, flags: 0 },
	OperInfo { op: "/",   operands: 2, id: opid1('/'),           assoc: Assoc::Left,  prec: 13, flags: 0 },
	OperInfo { op: "%",   operands: 2, id: opid1('%'),           assoc: Assoc::Left,  prec: 13, flags: 0 },

	OperInfo { op: "+",   operands: 2, id: opid1('+'),           assoc: Assoc::Left,  prec: 12, flags: 0 },
	OperInfo { op: "-",   operands: 2, id: opid1('-'),           assoc: Assoc::Left,  prec: 12, flags: 0 },

	OperInfo { op: "<<",  operands: 2, id: opid2('<','<'),       assoc: Assoc::Left,  prec: 11, flags: 0 },
	OperInfo { op: ">>",  operands: 2, id: opid2('>','>'),       assoc: Assoc::Left,  prec: 11, flags: 0 },

	OperInfo { op: "<",   operands: 2, id: opid1('<'),           assoc: Assoc::Left,  prec: 10, flags: 0 },
	OperInfo { op: ">",   operands: 2, id: opid1('>'),           assoc: Assoc::Left,  prec: 10, flags: 0 },
	OperInfo { op: "<=",  operands: 2, id: opid2('<','='),       assoc: Assoc::Left,  prec: 10, flags: 0 },
	OperInfo { op: ">=",  operands: 2, id: opid2('>','='),       assoc: Assoc::Left,  prec: 10, flags: 0 },

	OperInfo { op: "==",  operands: 2, id: opid2('=','='),       assoc: Assoc::Left,  prec: 9,  flags: 0 },
	OperInfo { op: "!=",  operands: 2, id: opid2('!','='),       assoc: Assoc::Left,  prec: 9,  flags: 0 },

	OperInfo { op: "&",   operands: 2, id: opid1('&'),           assoc: Assoc::Left,  prec: 8,  flags: 0 },

	OperInfo { op: "^",   operands: 2, id: opid1('^'),           assoc: Assoc::Left,  prec: 7,  flags: 0 },

	OperInfo { op: "|",   operands: 2, id: opid1('|'),           assoc: Assoc::Left,  prec: 6,  flags: 0 },

	OperInfo { op: "&&",  operands: 2, id: opid2('&','&'),       assoc: Assoc::Left,  prec: 5,  flags: 0 },

	OperInfo { op: "||",  operands: 2, id: opid2('|','|'),       assoc: Assoc::Left,  prec: 4,  flags: 0 },

	OperInfo { op: "?",   operands: 3, id: opid2('?',':'),       assoc: Assoc::Right, prec: 3,  flags: 0 },

	OperInfo { op: "=",   operands: 2, id: opid1('='),           assoc: Assoc::Right, prec: 2,  flags: 0 },
	OperInfo { op: "+=",  operands: 2, id: opid2('+','='),       assoc: Assoc::Right, prec: 2,  flags: 0 },
	OperInfo { op: "-=",  operands: 2, id: opid2('-','='),       assoc: Assoc::Right, prec: 2,  flags: 0 },
	OperInfo { op: "*=",  operands: 2, id: opid2('*','='),       assoc: Assoc::Right, prec: 2,  flags: 0 },
	OperInfo { op: "/=",  operands: 2, id: opid2('/','='),       assoc: Assoc::Right, prec: 2,  flags: 0 },
	OperInfo { op: "%=",  operands: 2, id: opid2('%','='),       assoc: Assoc::Right, prec: 2,  flags: 0 },
	OperInfo { op: ">>=", operands: 2, id: opid3('>','>','='),   assoc: Assoc::Right, prec: 2,  flags: 0 },
	OperInfo { op: "<<=", operands: 2, id: opid3('<','<','='),   assoc: Assoc::Right, prec: 2,  flags: 0 },
	OperInfo { op: "&=",  operands: 2, id: opid2('&','='),       assoc: Assoc::Right, prec: 2,  flags: 0 },
	OperInfo { op: "^=",  operands: 2, id: opid2('^','='),       assoc: Assoc::Right, prec: 2,  flags: 0 },
	OperInfo { op: "|=",  operands: 2, id: opid2('|','='),       assoc: Assoc::Right, prec: 2,  flags: 0 },

	OperInfo { op: ",",   operands: 2, id: opid1(','),           assoc: Assoc::Left,  prec: 1,  flags: 0 },
];

pub static QCC_OPERATORS: [OperInfo; 29] = [
	// paren expression - non function call
	OperInfo { op: "(",   operands: 0, id: opid1('('),           assoc: Assoc::Left,  prec: 99, flags: OP_PREFIX },

	OperInfo { op: ".",   operands: 2, id: opid1('.'),           assoc: Assoc::Left,  prec: 15, flags: 0 },
	// function call
	OperInfo { op: "(",   operands: 0, id: opid1('('),           assoc: Assoc::Left,  prec: 15, flags: 0 },

	OperInfo { op: "!",   operands: 1, id: opid2('!','P'),       assoc: Assoc::Right, prec: 14, flags: OP_PREFIX },
	OperInfo { op: "+",   operands: 1, id: opid2('+','P'),       assoc: Assoc::Right, prec: 14, flags: OP_PREFIX },
	OperInfo { op: "-",   operands: 1, id: opid2('-','P'),       assoc: Assoc::Right, prec: 14, flags: OP_PREFIX },

	OperInfo { op: "*",   operands: 2, id: opid1('*'),           assoc: Assoc::Left,  prec: 13, flags: 0 },
	OperInfo { op: "/",   operands: 2, id: opid1('/'),           assoc: Assoc::Left,  prec: 13, flags: 0 },
	OperInfo { op: "&",   operands: 2, id: opid1('&'),           assoc: Assoc::Left,  prec: 13, flags: 0 },
	OperInfo { op: "|",   operands: 2, id: opid1('|'),           assoc: Assoc::Left,  prec: 13, flags: 0 },

	OperInfo { op: "+",   operands: 2, id: opid1('+'),           assoc: Assoc::Left,  prec: 12, flags: 0 },
	OperInfo { op: "-",   operands: 2, id: opid1('-'),           assoc: Assoc::Left,  prec: 12, flags: 0 },

	OperInfo { op: "<",   operands: 2, id: opid1('<'),           assoc: Assoc::Left,  prec: 10, flags: 0 },
	OperInfo { op: ">",   operands: 2, id: opid1('>'),           assoc: Assoc::Left,  prec: 10, flags: 0 },
	OperInfo { op: "<=",  operands: 2, id: opid2('<','='),       assoc: Assoc::Left,  prec: 10, flags: 0 },
	OperInfo { op: ">=",  operands: 2, id: opid2('>','='),       assoc: Assoc::Left,  prec: 10, flags: 0 },
	OperInfo { op: "==",  operands: 2, id: opid2('=','='),       assoc: Assoc::Left,  prec: 10, flags: 0 },
	OperInfo { op: "!=",  operands: 2, id: opid2('!','='),       assoc: Assoc::Left,  prec: 10, flags: 0 },

	OperInfo { op: "=",   operands: 2, id: opid1('='),           assoc: Assoc::Right, prec: 8,  flags: 0 },
	OperInfo { op: "+=",  operands: 2, id: opid2('+','='),       assoc: Assoc::Right, prec: 8,  flags: 0 },
	OperInfo { op: "-=",  operands: 2, id: opid2('-','='),       assoc: Assoc::Right, prec: 8,  flags: 0 },
	OperInfo { op: "*=",  operands: 2, id: opid2('*','='),       assoc: Assoc::Right, prec: 8,  flags: 0 },
	OperInfo { op: "/=",  operands: 2, id: opid2('/','='),       assoc: Assoc::Right, prec: 8,  flags: 0 },
	OperInfo { op: "%=",  operands: 2, id: opid2('%','='),       assoc: Assoc::Right, prec: 8,  flags: 0 },
	OperInfo { op: "&=",  operands: 2, id: opid2('&','='),       assoc: Assoc::Right, prec: 8,  flags: 0 },
	OperInfo { op: "|=",  operands: 2, id: opid2('|','='),       assoc: Assoc::Right, prec: 8,  flags: 0 },

	OperInfo { op: "&&",  operands: 2, id: opid2('&','&'),       assoc: Assoc::Left,  prec: 5,  flags: 0 },
	OperInfo { op: "||",  operands: 2, id: opid2('|','|'),       assoc: Assoc::Left,  prec: 5,  flags: 0 },

	OperInfo { op: ",",   operands: 2, id: opid1(','),           assoc: Assoc::Left,  prec: 1,  flags: 0 },
];

/// Which operator table a parse session uses. Selected once at session
/// start; the tables are not interchangeable mid-session.
#[derive(Debug,PartialEq,Eq,Clone,Copy)]
pub enum OperatorSet
{
	/// C-family operator set
	C,
	/// Traditional QuakeC operator set
	Qcc,
}

impl OperatorSet
{
	pub fn table(&self) -> &'static [OperInfo]
	{
		match *self
		{
		OperatorSet::C => &C_OPERATORS,
		OperatorSet::Qcc => &QCC_OPERATORS,
		}
	}

	/// First table entry with this exact spelling. Spellings shared between
	/// prefix/suffix/call forms resolve to the earliest entry; callers that
	/// care use `id` or `flags` to pick between duplicates.
	pub fn find(&self, spelling: &str) -> Option<&'static OperInfo>
	{
		self.table().iter().find(|o| o.op == spelling)
	}

	/// Longest-match lookup at the head of `text`, so `<<=` is never read
	/// as `<`,`<`,`=`
	pub fn longest_match(&self, text: &str) -> Option<&'static OperInfo>
	{
		let mut best: Option<&'static OperInfo> = None;
		for o in self.table().iter()
		{
			if text.starts_with(o.op) {
				match best
				{
				Some(b) if b.op.len() >= o.op.len() => {},
				_ => best = Some(o),
				}
			}
		}
		best
	}
}


// vim: ft=rust
