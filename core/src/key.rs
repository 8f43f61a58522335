//! Element identity: the four kinds of named things a usage grammar binds.

use std::fmt;

/// Identity of a named grammar element.
///
/// Short and long options store their name without the leading dashes;
/// commands and positionals keep the literal source spelling (so `<name>`
/// and `NAME` stay distinguishable, as required for output keys).
///
/// # Examples
///
/// ```
/// use argot_core::ElemKey;
///
/// assert_eq!(ElemKey::Short('h').spelling(), "-h");
/// assert_eq!(ElemKey::long("--speed").spelling(), "--speed");
/// assert_eq!(ElemKey::Positional("<name>".into()).spelling(), "<name>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElemKey {
    /// Single-letter option, e.g. `-h`.
    Short(char),
    /// Long option, e.g. `--speed` (stored as `speed`).
    Long(String),
    /// Fixed literal word, e.g. `ship`. Also used for the bare `-` and `--`
    /// separators when a grammar mentions them.
    Command(String),
    /// Positional argument, spelled `<name>` or `NAME`.
    Positional(String),
}

impl ElemKey {
    /// Builds a long-option key from a `--name` token (leading dashes are
    /// stripped if present).
    pub fn long(name: &str) -> ElemKey {
        ElemKey::Long(name.trim_start_matches('-').to_string())
    }

    /// The element's rendered source spelling, used as its output key.
    pub fn spelling(&self) -> String {
        match self {
            ElemKey::Short(c) => format!("-{c}"),
            ElemKey::Long(name) => format!("--{name}"),
            ElemKey::Command(name) => name.clone(),
            ElemKey::Positional(name) => name.clone(),
        }
    }

    /// Whether this key names an option (short or long form).
    pub fn is_option(&self) -> bool {
        matches!(self, ElemKey::Short(_) | ElemKey::Long(_))
    }

    /// Whether `token` is a short option or option cluster (`-x`, `-abc`),
    /// as opposed to a long option, a bare `-`, or a word.
    pub fn is_short_token(token: &str) -> bool {
        token.len() > 1 && token.starts_with('-') && !token.starts_with("--")
    }

    /// Whether `token` is a long option (`--name`, `--name=<arg>`), as
    /// opposed to the bare `--` separator or a malformed run of dashes.
    pub fn is_long_token(token: &str) -> bool {
        token.len() > 2 && token.starts_with("--") && !token.starts_with("---")
    }

    /// Whether `token` is argument-shaped: wrapped in `<>` or fully
    /// upper-case.
    ///
    /// ```
    /// use argot_core::ElemKey;
    ///
    /// assert!(ElemKey::is_placeholder_token("<kn>"));
    /// assert!(ElemKey::is_placeholder_token("FILE"));
    /// assert!(!ElemKey::is_placeholder_token("move"));
    /// assert!(!ElemKey::is_placeholder_token("--speed"));
    /// ```
    pub fn is_placeholder_token(token: &str) -> bool {
        if token.len() > 2 && token.starts_with('<') && token.ends_with('>') {
            return true;
        }
        !token.is_empty()
            && token
                .chars()
                .all(|c| c.is_uppercase() || c.is_ascii_digit() || c == '-' || c == '_')
            && token.chars().any(|c| c.is_uppercase())
    }
}

impl fmt::Display for ElemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spelling())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spellings_round_trip_source_forms() {
        assert_eq!(ElemKey::Short('v').spelling(), "-v");
        assert_eq!(ElemKey::long("speed").spelling(), "--speed");
        assert_eq!(ElemKey::Command("--".into()).spelling(), "--");
        assert_eq!(ElemKey::Positional("NAME".into()).spelling(), "NAME");
    }

    #[test]
    fn test_token_classification() {
        assert!(ElemKey::is_short_token("-abc"));
        assert!(!ElemKey::is_short_token("-"));
        assert!(!ElemKey::is_short_token("--speed"));

        assert!(ElemKey::is_long_token("--speed=<kn>"));
        assert!(!ElemKey::is_long_token("--"));
        assert!(!ElemKey::is_long_token("---x"));

        assert!(ElemKey::is_placeholder_token("<x>"));
        assert!(ElemKey::is_placeholder_token("FILE-NAME"));
        assert!(!ElemKey::is_placeholder_token("x"));
        assert!(!ElemKey::is_placeholder_token("123"));
    }
}
