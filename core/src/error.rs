//! Error types for grammar compilation and argument interpretation.
//!
//! Two disjoint domains: [`GrammarError`] means the usage/options text
//! itself is malformed and is always fatal before any matching happens;
//! [`UsageError`] means the supplied argument vector does not fit the
//! compiled grammar. Neither carries partial results.

use thiserror::Error;

/// Errors in the usage or options text itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// No line containing `usage:` was found.
    #[error("no usage section found (expected a line containing 'usage:')")]
    MissingUsageSection,

    /// The usage section contains no pattern line with a program name.
    #[error("usage section declares no program name")]
    MissingProgramName,

    /// A usage line starts with a different program name than the first.
    #[error("usage line starts with '{found}' but the program is '{expected}'")]
    ProgramNameMismatch { expected: String, found: String },

    /// A `[` or `(` has no matching closer, or a closer appears alone.
    #[error("unbalanced '{0}' in usage pattern")]
    UnbalancedGroup(String),

    /// `[]` or `()` with nothing inside.
    #[error("empty group in usage pattern")]
    EmptyGroup,

    /// A `|` with no alternative on one side.
    #[error("dangling '|' in usage pattern (expected 'a | b')")]
    DanglingAlternation,

    /// `...` that does not directly follow a group, argument, option, or
    /// command.
    #[error("'...' must directly follow a group, argument, option, or command")]
    StrayEllipsis,

    /// A token the usage tokenizer cannot classify.
    #[error("unexpected token '{0}' in usage pattern")]
    UnexpectedToken(String),

    /// An options-block line yielded neither a short nor a long form.
    #[error("option description '{0}' has no short or long form")]
    OptionLineWithoutNames(String),

    /// More than one short form on a single options-block line.
    #[error("option description has multiple short forms: '{0}' and '{1}'")]
    MultipleShortForms(String, String),

    /// More than one long form on a single options-block line.
    #[error("option description has multiple long forms: '{0}' and '{1}'")]
    MultipleLongForms(String, String),

    /// A short form that is not exactly `-x`.
    #[error("short form '{0}' is not of the form '-x'")]
    BadShortForm(String),

    /// An argument placeholder that is neither `<arg>` nor `ARG`.
    #[error("argument placeholder '{0}' is not of the form <arg> or ARG")]
    BadPlaceholder(String),

    /// `[default: …]` on an option that takes no argument.
    #[error("option '{0}' takes no argument but declares a default value")]
    DefaultWithoutArgument(String),

    /// A second `[default: …]` for the same option.
    #[error("option '{option}' already has default '{existing}' (second default: '{duplicate}')")]
    DuplicateDefault {
        option: String,
        existing: String,
        duplicate: String,
    },

    /// The Options block and the Usage block disagree on whether an option
    /// takes an argument.
    #[error("option '{0}' is declared both with and without an argument")]
    ArityConflict(String),

    /// Usage-pattern nesting exceeds the fixed recursion bound.
    #[error("usage pattern nesting exceeds the supported depth of {0}")]
    TooDeep(usize),
}

/// Errors in the supplied argument vector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// An option the grammar does not define (strict mode only).
    #[error("unknown option: '{0}'")]
    Unknown(String),

    /// A long-option abbreviation that matches several defined options.
    #[error("option '{given}' is ambiguous: could be {}", .candidates.join(", "))]
    Ambiguous {
        given: String,
        candidates: Vec<String>,
    },

    /// A valued option at the end of the argument vector with no argument.
    #[error("option '{0}' requires an argument")]
    MissingArgument(String),

    /// `=value` supplied to an option that takes no argument.
    #[error("option '{0}' takes no argument")]
    UnexpectedArgument(String),

    /// The argument vector satisfies none of the usage alternatives.
    #[error("arguments match no usage pattern")]
    NoMatch,
}

/// Convenience alias for results of grammar compilation.
pub type GrammarResult<T> = std::result::Result<T, GrammarError>;

/// Convenience alias for results of argument interpretation.
pub type UsageResult<T> = std::result::Result<T, UsageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages_name_the_offender() {
        let err = GrammarError::ArityConflict("--speed".to_string());
        assert!(err.to_string().contains("--speed"));

        let err = UsageError::Ambiguous {
            given: "--m".to_string(),
            candidates: vec!["--moored".to_string(), "--mount".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "option '--m' is ambiguous: could be --moored, --mount"
        );
    }
}
