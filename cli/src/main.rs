//! The classic Naval Fate demo: its whole command-line surface is the
//! embedded usage text, interpreted at runtime. The matched mapping is
//! printed as JSON.

use argot_parser::{InterpretError, Outcome, UsageSpec};

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

const USAGE: &str = "\
Naval Fate.

Usage:
  naval_fate ship new <name>...
  naval_fate ship <name> move <x> <y> [--speed=<kn>]
  naval_fate ship shoot <x> <y>
  naval_fate mine (set|remove) <x> <y> [--moored|--drifting]
  naval_fate -h | --help
  naval_fate --version

Options:
  -h --help     Show this screen.
  --version     Show version.
  --speed=<kn>  Speed in knots [default: 10].
  --moored      Moored (anchored) mine.
  --drifting    Drifting mine.
";

fn main() {
    if let Err(err) = run() {
        match err {
            InterpretError::Grammar(err) => {
                eprintln!("error: {err}");
                std::process::exit(2);
            }
            err => {
                eprintln!("{err}");
                std::process::exit(1);
            }
        }
    }
}

fn run() -> Result<(), InterpretError> {
    let spec = UsageSpec::parse(USAGE)?.with_version(PACKAGE_VERSION);
    let outcome = spec
        .evaluate(std::env::args().skip(1))
        .map_err(|source| InterpretError::Usage {
            usage: spec.usage_text().to_string(),
            source,
        })?;
    match outcome {
        Outcome::Matched(args) => println!("{args}"),
        Outcome::Help(text) => print!("{text}"),
        Outcome::Version(version) => println!("{version}"),
    }
    Ok(())
}
