/*!
 * QuakeC front end: lexer and top-level declaration parser
 */

#[macro_use]
extern crate log;
extern crate env_logger;

extern crate utf8reader;
#[macro_use]
extern crate structopt;

#[cfg(test)]
extern crate tempfile;

mod lex;
mod parse;

#[derive(StructOpt)]
struct Options
{
	#[structopt(parse(from_os_str))]
	input: ::std::path::PathBuf,

	/// Use the reduced QuakeC operator table instead of the full C one
	#[structopt(long="qcc")]
	qcc_operators: bool,

	/// Print token statistics instead of parsing
	#[structopt(short="d",long="dump-tokens")]
	dump_tokens: bool,
}

fn main()
{
	env_logger::init();

	// 1. Parse command line arguments
	let args: Options = ::structopt::StructOpt::from_args();

	if args.dump_tokens
	{
		let mut lexer = match ::lex::Lexer::open(&args.input)
			{
			Ok(l) => l,
			Err(e) => {
				error!("Unable to open {}: {:?}", args.input.display(), e);
				::std::process::exit(1);
				},
			};
		if let Err(e) = ::lex::debug_dump(&mut lexer) {
			error!("Error reading {}: {:?}", args.input.display(), e);
			::std::process::exit(1);
		}
		return ;
	}

	let opset = if args.qcc_operators {
			::parse::OperatorSet::Qcc
		}
		else {
			::parse::OperatorSet::C
		};
	info!("operator table: {:?} ({} entries)", opset, opset.table().len());

	// 2. Parse the input (and its includes) into the session tables
	let mut session = ::parse::ParseSession::new(opset);
	match ::parse::parse(&mut session, &args.input)
	{
	Err(e) => {
		error!("Error parsing {}: {:?}", args.input.display(), e);
		::std::process::exit(1);
		},
	Ok(_) => {},
	}
	if session.error_count() > 0 {
		error!("{} parse error(s)", session.error_count());
		::std::process::exit(1);
	}
}

// vim: ft=rust
