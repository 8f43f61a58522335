//! Argument-vector tokenization: option resolution (abbreviation,
//! clustering, `=value`), the `--` cutoff, and positional leaves.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use argot_core::{ArgSpec, ElemInfo, ElemKey, UsageError, UsageResult};

use crate::registry::Registry;

/// A positional or command candidate from the argument vector. Which of the
/// two it is gets decided by the matcher; `is_command` just records whether
/// the grammar knows the word as a command literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PosLeaf {
    pub(crate) text: String,
    pub(crate) is_command: bool,
}

/// A resolved option occurrence with its argument, if it takes one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OptLeaf {
    pub(crate) key: ElemKey,
    pub(crate) arg: Option<String>,
}

/// The tokenized argument vector: options matched order-insensitively,
/// positionals strictly in order.
#[derive(Debug, Default)]
pub(crate) struct ArgvTokens {
    pub(crate) positionals: Vec<PosLeaf>,
    pub(crate) options: Vec<OptLeaf>,
    /// Occurrences per canonical option key.
    pub(crate) counts: HashMap<ElemKey, u64>,
    /// Options auto-registered in permissive mode; the matcher treats these
    /// as permitted by every alternative.
    pub(crate) captured: HashSet<ElemKey>,
}

/// Tokenizes `argv` against the registry. In permissive mode unknown
/// options (long and short alike) are auto-registered and captured instead
/// of failing.
pub(crate) fn tokenize_argv(
    registry: &mut Registry,
    argv: &[String],
    permissive: bool,
) -> UsageResult<ArgvTokens> {
    let mut tokens = ArgvTokens::default();
    let mut iter = argv.iter();
    while let Some(raw) = iter.next() {
        if raw == "--" {
            // End of options; the separator itself stays visible so
            // grammars can match it as a literal.
            tokens.push_positional(registry, raw);
            for rest in iter.by_ref() {
                tokens.push_positional(registry, rest);
            }
            break;
        } else if ElemKey::is_long_token(raw) {
            let (name_part, inline) = match raw.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (raw.as_str(), None),
            };
            let key = resolve_long(
                registry,
                name_part,
                inline.is_some(),
                permissive,
                &mut tokens.captured,
            )?;
            let arg = match (registry.takes_value(&key), inline) {
                (false, None) => None,
                (false, Some(_)) => {
                    return Err(UsageError::UnexpectedArgument(key.spelling()));
                }
                (true, Some(value)) => Some(value),
                (true, None) => Some(
                    iter.next()
                        .ok_or_else(|| UsageError::MissingArgument(key.spelling()))?
                        .clone(),
                ),
            };
            tokens.push_option(key, arg);
        } else if ElemKey::is_short_token(raw) {
            let cluster: Vec<char> = raw.chars().skip(1).collect();
            for (i, c) in cluster.iter().enumerate() {
                let key = registry.resolve(&ElemKey::Short(*c));
                if !registry.contains(&key) {
                    if !permissive {
                        return Err(UsageError::Unknown(key.spelling()));
                    }
                    debug!(option = %key, "capturing unknown short option");
                    registry.insert(key.clone(), ElemInfo::new(ArgSpec::Zero));
                    tokens.captured.insert(key.clone());
                }
                if registry.takes_value(&key) {
                    let rest: String = cluster[i + 1..].iter().collect();
                    let arg = if rest.is_empty() {
                        iter.next()
                            .ok_or_else(|| UsageError::MissingArgument(key.spelling()))?
                            .clone()
                    } else {
                        rest
                    };
                    tokens.push_option(key, Some(arg));
                    // The rest of the cluster was the argument.
                    break;
                }
                tokens.push_option(key, None);
            }
        } else {
            tokens.push_positional(registry, raw);
        }
    }
    debug!(
        positionals = tokens.positionals.len(),
        options = tokens.options.len(),
        "tokenized argument vector"
    );
    Ok(tokens)
}

impl ArgvTokens {
    fn push_positional(&mut self, registry: &Registry, text: &str) {
        let is_command = registry.contains(&ElemKey::Command(text.to_string()));
        self.positionals.push(PosLeaf {
            text: text.to_string(),
            is_command,
        });
    }

    fn push_option(&mut self, key: ElemKey, arg: Option<String>) {
        *self.counts.entry(key.clone()).or_insert(0) += 1;
        self.options.push(OptLeaf { key, arg });
    }
}

/// Resolves a `--name` prefix: exact match first, then unique abbreviation
/// over the registered long names.
fn resolve_long(
    registry: &mut Registry,
    name_part: &str,
    has_inline: bool,
    permissive: bool,
    captured: &mut HashSet<ElemKey>,
) -> UsageResult<ElemKey> {
    let name = name_part.trim_start_matches('-');
    let exact = ElemKey::Long(name.to_string());
    if registry.contains(&exact) {
        return Ok(registry.resolve(&exact));
    }
    let mut candidates: Vec<String> = registry
        .long_names()
        .filter(|long| long.starts_with(name))
        .map(str::to_string)
        .collect();
    candidates.sort();
    match candidates.len() {
        1 => Ok(ElemKey::Long(candidates.remove(0))),
        0 => {
            if !permissive {
                return Err(UsageError::Unknown(format!("--{name}")));
            }
            debug!(option = %format!("--{name}"), "capturing unknown long option");
            let arg = if has_inline { ArgSpec::One } else { ArgSpec::Zero };
            registry.insert(exact.clone(), ElemInfo::new(arg));
            captured.insert(exact.clone());
            Ok(exact)
        }
        _ => Err(UsageError::Ambiguous {
            given: format!("--{name}"),
            candidates: candidates.iter().map(|c| format!("--{c}")).collect(),
        }),
    }
}
