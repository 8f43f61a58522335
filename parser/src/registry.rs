//! The option registry: element descriptors with synonym resolution, and the
//! Options-block parser that populates it.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use argot_core::{ArgSpec, ElemInfo, ElemKey, GrammarError, GrammarResult};

/// Case-insensitive `[default: VALUE]` annotation inside a description.
static DEFAULT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[default:\s*([^\]]*)\]").expect("static regex must compile")
});

/// All element descriptors for one grammar, keyed by identity.
///
/// When an option has both a short and a long form, the long form is the
/// canonical key and the short form is recorded as a synonym; every lookup
/// resolves synonyms first. Insertion order is preserved so `[options]`
/// expansion and default filling are deterministic.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    infos: HashMap<ElemKey, ElemInfo>,
    synonyms: HashMap<ElemKey, ElemKey>,
    order: Vec<ElemKey>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follows the synonym table to the canonical key.
    pub fn resolve(&self, key: &ElemKey) -> ElemKey {
        self.synonyms.get(key).cloned().unwrap_or_else(|| key.clone())
    }

    pub fn contains(&self, key: &ElemKey) -> bool {
        self.infos.contains_key(&self.resolve(key))
    }

    pub fn get(&self, key: &ElemKey) -> Option<&ElemInfo> {
        self.infos.get(&self.resolve(key))
    }

    pub fn get_mut(&mut self, key: &ElemKey) -> Option<&mut ElemInfo> {
        let canonical = self.resolve(key);
        self.infos.get_mut(&canonical)
    }

    /// Whether the (resolved) element consumes an argument.
    pub fn takes_value(&self, key: &ElemKey) -> bool {
        self.get(key).is_some_and(|info| info.arg.takes_value())
    }

    /// Inserts or replaces the descriptor under its canonical key.
    pub fn insert(&mut self, key: ElemKey, info: ElemInfo) {
        if !self.infos.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.infos.insert(key, info);
    }

    /// Registers the element if it is not already known.
    pub fn ensure(&mut self, key: &ElemKey, arg: ArgSpec) {
        if !self.contains(key) {
            self.insert(self.resolve(key), ElemInfo::new(arg));
        }
    }

    /// Records that `from` is another spelling of `to`.
    pub fn insert_synonym(&mut self, from: ElemKey, to: ElemKey) {
        self.synonyms.insert(from, to);
    }

    /// Canonical keys with their descriptors, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ElemKey, &ElemInfo)> {
        self.order.iter().filter_map(|k| self.infos.get(k).map(|i| (k, i)))
    }

    /// Options declared in the Options block, in declaration order. This is
    /// the expansion set of the `[options]` shortcut.
    pub fn described_options(&self) -> Vec<ElemKey> {
        self.iter()
            .filter(|(k, info)| k.is_option() && info.from_options)
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Long option names (without dashes) for abbreviation resolution.
    pub fn long_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().filter_map(|k| match k {
            ElemKey::Long(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

/// Parses the Options block of `doc` into `registry`.
///
/// The block starts after the first line containing `options:`
/// (case-insensitive) and ends at the first blank line or end of text. A
/// line whose trimmed form starts with `-` opens a new descriptor;
/// following non-blank lines continue its description and may carry its
/// `[default: …]` annotation.
pub(crate) fn parse_options_section(doc: &str, registry: &mut Registry) -> GrammarResult<()> {
    let mut lines = doc.lines();
    let mut found = false;
    let mut block: Vec<&str> = Vec::new();
    for line in lines.by_ref() {
        if let Some(idx) = find_header(line, "options:") {
            found = true;
            let rest = &line[idx..];
            if !rest.trim().is_empty() {
                block.push(rest);
            }
            break;
        }
    }
    if !found {
        debug!("no options section in doc");
        return Ok(());
    }
    for line in lines {
        if line.trim().is_empty() {
            break;
        }
        block.push(line);
    }

    let mut last_key: Option<ElemKey> = None;
    for line in block {
        if line.trim_start().starts_with('-') {
            last_key = Some(parse_option_line(line, registry)?);
        }
        // Any line of the block may carry the default for the most recently
        // opened descriptor.
        if let Some(caps) = DEFAULT_TAG.captures(line) {
            let value = caps[1].trim().to_string();
            let Some(key) = &last_key else {
                warn!(line, "ignoring [default: ...] before any option line");
                continue;
            };
            attach_default(registry, key, value)?;
        }
    }
    Ok(())
}

/// Finds a case-insensitive `header` inside `line`, returning the byte
/// offset just past it.
pub(crate) fn find_header(line: &str, header: &str) -> Option<usize> {
    line.to_ascii_lowercase()
        .find(header)
        .map(|idx| idx + header.len())
}

/// Parses one `-x, --long <arg>  description` line, registering the option
/// and returning its canonical key.
fn parse_option_line(line: &str, registry: &mut Registry) -> GrammarResult<ElemKey> {
    let trimmed = line.trim();
    // The description starts at the first run of two-or-more spaces.
    let names_part = match trimmed.find("  ") {
        Some(idx) => &trimmed[..idx],
        None => trimmed,
    };

    let mut short: Option<char> = None;
    let mut long: Option<String> = None;
    let mut has_arg = false;
    for token in names_part
        .split(|c: char| c.is_whitespace() || c == ',' || c == '=')
        .filter(|t| !t.is_empty())
    {
        if token.starts_with("--") {
            let name = token.trim_start_matches('-').to_string();
            if name.is_empty() {
                return Err(GrammarError::OptionLineWithoutNames(names_part.to_string()));
            }
            if let Some(existing) = &long {
                return Err(GrammarError::MultipleLongForms(
                    format!("--{existing}"),
                    token.to_string(),
                ));
            }
            long = Some(name);
        } else if let Some(rest) = token.strip_prefix('-') {
            let mut chars = rest.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                return Err(GrammarError::BadShortForm(token.to_string()));
            };
            if let Some(existing) = short {
                return Err(GrammarError::MultipleShortForms(
                    format!("-{existing}"),
                    token.to_string(),
                ));
            }
            short = Some(c);
        } else {
            if !ElemKey::is_placeholder_token(token) {
                return Err(GrammarError::BadPlaceholder(token.to_string()));
            }
            has_arg = true;
        }
    }

    let arg = if has_arg { ArgSpec::One } else { ArgSpec::Zero };
    let canonical = match (&short, &long) {
        (_, Some(name)) => ElemKey::Long(name.clone()),
        (Some(c), None) => ElemKey::Short(*c),
        (None, None) => {
            return Err(GrammarError::OptionLineWithoutNames(names_part.to_string()));
        }
    };
    if registry.infos.contains_key(&canonical) {
        warn!(option = %canonical, "option described more than once; later description wins");
    }
    registry.insert(canonical.clone(), ElemInfo::described(arg));
    if let (Some(c), Some(_)) = (short, &long) {
        registry.insert_synonym(ElemKey::Short(c), canonical.clone());
    }
    debug!(option = %canonical, takes_value = has_arg, "registered option description");
    Ok(canonical)
}

fn attach_default(registry: &mut Registry, key: &ElemKey, value: String) -> GrammarResult<()> {
    let spelling = key.spelling();
    let info = registry
        .get_mut(key)
        .unwrap_or_else(|| unreachable!("default target '{spelling}' was just registered"));
    match &info.arg {
        ArgSpec::Zero => Err(GrammarError::DefaultWithoutArgument(spelling)),
        ArgSpec::Defaulted(existing) => Err(GrammarError::DuplicateDefault {
            option: spelling,
            existing: existing.clone(),
            duplicate: value,
        }),
        ArgSpec::One => {
            info.arg = ArgSpec::Defaulted(value);
            Ok(())
        }
    }
}
