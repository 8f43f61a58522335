//! Usage-grammar compiler and pattern matcher for command-line arguments.
//!
//! This crate interprets argument vectors against a human-readable usage
//! text: the `Usage:` section declares the valid invocation shapes and the
//! `Options:` section describes the flags (argument arity, defaults). The
//! result is a mapping from every named grammar element to its bound value.
//!
//! # Main entry points
//!
//! - [`UsageSpec::parse`] — compile a doc string into a reusable grammar.
//! - [`UsageSpec::evaluate`] — interpret one argument vector against it.
//! - [`interpret`] — one-shot convenience wrapping both.
//!
//! # Example
//!
//! ```
//! use argot_parser::{Outcome, UsageSpec};
//!
//! let doc = "\
//! Usage:
//!   prog go <x> <y> [--speed=<kn>]
//!
//! Options:
//!   --speed=<kn>  Speed in knots [default: 10].
//! ";
//!
//! let spec = UsageSpec::parse(doc).unwrap();
//! let Outcome::Matched(args) = spec.evaluate(["go", "1", "2"]).unwrap() else {
//!     panic!("expected a match");
//! };
//! assert!(args.get_bool("go"));
//! assert_eq!(args.get_str("<x>"), "1");
//! assert_eq!(args.get_str("--speed"), "10");
//! ```

mod argv;
mod matcher;
mod registry;
mod usage;

use thiserror::Error;
use tracing::debug;

pub use argot_core::{ArgMap, GrammarError, UsageError, Value};

use argot_core::Pattern;
use registry::Registry;

/// A compiled usage grammar, reusable across argument vectors.
///
/// Compilation happens once in [`UsageSpec::parse`]; the registry and the
/// pattern tree are immutable afterwards, so evaluation has no hidden state
/// and identical inputs always produce identical mappings.
#[derive(Debug, Clone)]
pub struct UsageSpec {
    doc: String,
    usage_section: String,
    program: String,
    registry: Registry,
    pattern: Pattern,
    help: bool,
    version: Option<String>,
    permissive: bool,
}

/// The three terminal results of a successful evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The argument vector matched one usage alternative; every named
    /// grammar element is present in the mapping.
    Matched(ArgMap),
    /// A help trigger was supplied; the text is the full doc string,
    /// intended to be printed verbatim before exiting.
    Help(String),
    /// A version trigger was supplied; the text is the configured version
    /// string.
    Version(String),
}

/// Error from the one-shot [`interpret`] entry point: either the grammar
/// text itself is malformed, or the argument vector fits no alternative.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpretError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    /// The argument error paired with the usage text for display.
    #[error("{source}\n\n{usage}")]
    Usage {
        source: UsageError,
        usage: String,
    },
}

impl UsageSpec {
    /// Compiles `doc` into a grammar: parses the Options block into the
    /// registry, extracts the usage section, and compiles each pattern line.
    ///
    /// The Options block is parsed first because its arity declarations
    /// disambiguate usage-line mentions (`--speed <kn>` versus a flag
    /// followed by a positional).
    pub fn parse(doc: &str) -> Result<UsageSpec, GrammarError> {
        let mut registry = Registry::new();
        registry::parse_options_section(doc, &mut registry)?;
        let section = usage::extract_usage_section(doc)?;
        let pattern = usage::compile(&section, &mut registry)?;
        debug!(program = section.program, "compiled usage grammar");
        Ok(UsageSpec {
            doc: doc.to_string(),
            usage_section: section.text,
            program: section.program,
            registry,
            pattern,
            help: true,
            version: None,
            permissive: false,
        })
    }

    /// Sets the version string reported by the `--version` trigger. Without
    /// one, `--version` has no special meaning.
    pub fn with_version(mut self, version: impl Into<String>) -> UsageSpec {
        self.version = Some(version.into());
        self
    }

    /// Enables or disables the `-h`/`--help` trigger (enabled by default).
    pub fn help(mut self, yes: bool) -> UsageSpec {
        self.help = yes;
        self
    }

    /// Switches unknown-option handling from strict (the default) to
    /// permissive: unknown long and short options are captured as extra
    /// switches/values instead of failing.
    pub fn permissive(mut self, yes: bool) -> UsageSpec {
        self.permissive = yes;
        self
    }

    /// The program name shared by all usage lines.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The usage section verbatim, suitable for error display.
    pub fn usage_text(&self) -> &str {
        &self.usage_section
    }

    /// Interprets one argument vector (without the program name).
    ///
    /// Help and version triggers are detected on the raw tokens before any
    /// grammar processing, so they win regardless of whether the rest of
    /// the vector would parse.
    pub fn evaluate<I, S>(&self, argv: I) -> Result<Outcome, UsageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();

        if self.help && argv.iter().any(|t| t == "-h" || t == "--help") {
            debug!("help trigger supplied");
            return Ok(Outcome::Help(self.doc.clone()));
        }
        if let Some(version) = &self.version {
            if argv.iter().any(|t| t == "--version") {
                debug!("version trigger supplied");
                return Ok(Outcome::Version(version.clone()));
            }
        }

        // Permissive capture registers options on the fly; keep the
        // compiled registry pristine by working on a copy.
        let mut registry = self.registry.clone();
        let tokens = argv::tokenize_argv(&mut registry, &argv, self.permissive)?;
        match matcher::match_pattern(&registry, &tokens, &self.pattern) {
            Some(map) => Ok(Outcome::Matched(map)),
            None => Err(UsageError::NoMatch),
        }
    }
}

/// One-shot interpretation of `argv` against `doc`, pairing argument errors
/// with the usage text for display.
///
/// # Examples
///
/// ```
/// use argot_parser::{interpret, Outcome};
///
/// let doc = "Usage: prog (--up | --down)\n\nOptions:\n  --up    Up.\n  --down  Down.\n";
/// let outcome = interpret(doc, ["--up"]).unwrap();
/// assert!(matches!(outcome, Outcome::Matched(_)));
///
/// let err = interpret(doc, ["sideways"]).unwrap_err();
/// assert!(err.to_string().contains("Usage: prog"));
/// ```
pub fn interpret<I, S>(doc: &str, argv: I) -> Result<Outcome, InterpretError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let spec = UsageSpec::parse(doc)?;
    spec.evaluate(argv).map_err(|source| InterpretError::Usage {
        usage: spec.usage_text().to_string(),
        source,
    })
}
