//! The pattern matcher: explores candidate match states over the tokenized
//! argument vector and picks the first total match in source order.
//!
//! Options are matched order-insensitively against the occurrence counts
//! collected by the argv tokenizer; positional and command leaves are
//! consumed strictly left to right. Alternation and optionality branch the
//! state set (each branch owns a snapshot, giving full backtracking), and
//! `OneOrMore` repeats its child to a fixpoint with the greediest
//! repetition count tried first. A state survives only if it consumed every
//! positional leaf, the chosen alternative permits every supplied option,
//! and no option occurs more often than permitted.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use argot_core::{ArgMap, ArgSpec, ElemKey, Pattern, Value};

use crate::argv::ArgvTokens;
use crate::registry::Registry;

/// One candidate assignment of argv leaves to pattern leaves.
#[derive(Debug, Clone, PartialEq)]
struct MatchState {
    /// Cursor into the positional leaves.
    pos: usize,
    /// Supplied-but-not-yet-consumed occurrences per option.
    remaining: HashMap<ElemKey, u64>,
    /// Occurrences the walked pattern nodes permit per option.
    allowed: HashMap<ElemKey, u64>,
    /// Values bound by consumed positional/command leaves.
    bindings: BTreeMap<ElemKey, Value>,
}

/// Matches the tokenized argument vector against the compiled pattern.
/// Returns the final mapping on success, `None` when no alternative yields
/// a total match.
pub(crate) fn match_pattern(
    registry: &Registry,
    argv: &ArgvTokens,
    pattern: &Pattern,
) -> Option<ArgMap> {
    let matcher = Matcher { registry, argv };
    let mut init = MatchState {
        pos: 0,
        remaining: argv.counts.clone(),
        allowed: HashMap::new(),
        bindings: BTreeMap::new(),
    };
    // Captured unknown options (permissive mode) are permitted everywhere.
    for key in &argv.captured {
        init.allowed.insert(key.clone(), u64::MAX);
    }

    let states = matcher.expand(pattern, &init);
    let total = states.len();
    let chosen = states.into_iter().find(|s| matcher.is_total(s))?;
    debug!(candidates = total, "pattern matched");

    let mut bindings = chosen.bindings;
    matcher.bind_option_values(&mut bindings);
    matcher.bind_defaults(&mut bindings);

    let mut map = ArgMap::new();
    for (key, value) in bindings {
        map.insert(key.spelling(), value);
    }
    Some(map)
}

struct Matcher<'a> {
    registry: &'a Registry,
    argv: &'a ArgvTokens,
}

impl Matcher<'_> {
    fn expand(&self, pattern: &Pattern, state: &MatchState) -> Vec<MatchState> {
        match pattern {
            Pattern::Required(children) => {
                let mut states = vec![state.clone()];
                for child in children {
                    let mut next = Vec::new();
                    for s in &states {
                        next.extend(self.expand(child, s));
                    }
                    states = next;
                    if states.is_empty() {
                        break;
                    }
                }
                states
            }
            Pattern::Either(alternatives) => alternatives
                .iter()
                .flat_map(|alt| self.expand(alt, state))
                .collect(),
            Pattern::Optional(children) => {
                // Flags inside an optional group are permitted without being
                // consumed here; their occurrences bind from the argv side.
                let mut base = state.clone();
                let mut rest: Vec<&Pattern> = Vec::new();
                for child in children {
                    match child {
                        Pattern::Leaf(key) if key.is_option() => {
                            // An allowance beyond the supplied occurrence
                            // count is never consulted, so it caps there;
                            // repetition of a flag-only group then reaches
                            // its fixpoint instead of growing forever.
                            let cap = self.argv.counts.get(key).copied().unwrap_or(0);
                            let entry = base.allowed.entry(key.clone()).or_insert(0);
                            *entry = entry.saturating_add(1).min(cap);
                        }
                        other => rest.push(other),
                    }
                }
                self.optional_states(&base, &rest)
            }
            Pattern::OneOrMore(child) => {
                let mut generations = vec![self.expand(child, state)];
                loop {
                    let mut next: Vec<MatchState> = Vec::new();
                    for s in generations.last().unwrap_or(&Vec::new()).iter() {
                        next.extend(self.expand(child, s).into_iter().filter(|n| n != s));
                    }
                    if next.is_empty() {
                        break;
                    }
                    generations.push(next);
                }
                // Greedy: the most repetitions first.
                generations.into_iter().rev().flatten().collect()
            }
            Pattern::OptionsShortcut => {
                debug_assert!(false, "options shortcut must be expanded before matching");
                vec![state.clone()]
            }
            Pattern::Leaf(key) if key.is_option() => {
                let mut next = state.clone();
                next.allowed.entry(key.clone()).or_insert(0);
                match next.remaining.get_mut(key) {
                    Some(count) if *count > 0 => {
                        *count -= 1;
                        vec![next]
                    }
                    _ => Vec::new(),
                }
            }
            Pattern::Leaf(key) => {
                let Some(leaf) = self.argv.positionals.get(state.pos) else {
                    return Vec::new();
                };
                match key {
                    ElemKey::Command(name) => {
                        if !(leaf.is_command && leaf.text == *name) {
                            return Vec::new();
                        }
                        let mut next = state.clone();
                        next.pos += 1;
                        self.bind(&mut next.bindings, key, None);
                        vec![next]
                    }
                    ElemKey::Positional(_) => {
                        let mut next = state.clone();
                        next.pos += 1;
                        self.bind(&mut next.bindings, key, Some(leaf.text.clone()));
                        vec![next]
                    }
                    ElemKey::Short(_) | ElemKey::Long(_) => unreachable!("handled above"),
                }
            }
        }
    }

    /// Explores the non-flag children of an optional group: each child may
    /// match or be skipped, match-branches first.
    fn optional_states(&self, base: &MatchState, rest: &[&Pattern]) -> Vec<MatchState> {
        let Some((first, tail)) = rest.split_first() else {
            return vec![base.clone()];
        };
        let mut states = Vec::new();
        for s in self.expand(first, base) {
            states.extend(self.optional_states(&s, tail));
        }
        states.extend(self.optional_states(base, tail));
        states
    }

    /// A state is a total match when every positional leaf was consumed and
    /// the supplied options fit what the walked alternative permits.
    fn is_total(&self, state: &MatchState) -> bool {
        state.pos == self.argv.positionals.len()
            && self
                .argv
                .counts
                .keys()
                .all(|key| state.allowed.contains_key(key))
            && state
                .remaining
                .iter()
                .all(|(key, left)| *left <= state.allowed.get(key).copied().unwrap_or(0))
    }

    /// Binds every supplied option occurrence, in argv order.
    fn bind_option_values(&self, bindings: &mut BTreeMap<ElemKey, Value>) {
        for leaf in &self.argv.options {
            self.bind(bindings, &leaf.key, leaf.arg.clone());
        }
    }

    fn bind(&self, bindings: &mut BTreeMap<ElemKey, Value>, key: &ElemKey, arg: Option<String>) {
        let repeats = self.registry.get(key).is_some_and(|info| info.repeats);
        // Commands bind as switches, positionals carry their text; repeated
        // elements accumulate, scalar elements take the last binding.
        match (arg, repeats) {
            (None, false) => {
                bindings.insert(key.clone(), Value::Switch(true));
            }
            (Some(value), false) => {
                bindings.insert(key.clone(), Value::Plain(Some(value)));
            }
            (None, true) => {
                let entry = bindings
                    .entry(key.clone())
                    .or_insert_with(|| Value::Counted(0));
                if let Value::Counted(n) = entry {
                    *n += 1;
                } else {
                    *entry = Value::Counted(1);
                }
            }
            (Some(value), true) => {
                let entry = bindings
                    .entry(key.clone())
                    .or_insert_with(|| Value::List(Vec::new()));
                if let Value::List(items) = entry {
                    items.push(value);
                } else {
                    *entry = Value::List(vec![value]);
                }
            }
        }
    }

    /// Fills defaults for every registered element with no binding, so the
    /// final mapping names every element of the grammar.
    fn bind_defaults(&self, bindings: &mut BTreeMap<ElemKey, Value>) {
        for (key, info) in self.registry.iter() {
            if bindings.contains_key(key) {
                continue;
            }
            let value = match (info.repeats, &info.arg) {
                (false, ArgSpec::Zero) => Value::Switch(false),
                (true, ArgSpec::Zero) => Value::Counted(0),
                (false, ArgSpec::One) => Value::Plain(None),
                (true, ArgSpec::One) => Value::List(Vec::new()),
                (false, ArgSpec::Defaulted(v)) => Value::Plain(Some(v.clone())),
                (true, ArgSpec::Defaulted(v)) => {
                    Value::List(v.split_whitespace().map(str::to_string).collect())
                }
            };
            bindings.insert(key.clone(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argv::tokenize_argv;
    use crate::registry::parse_options_section;
    use crate::usage::{compile, extract_usage_section};

    fn run(doc: &str, argv: &[&str]) -> Option<ArgMap> {
        let mut registry = Registry::new();
        parse_options_section(doc, &mut registry).unwrap();
        let section = extract_usage_section(doc).unwrap();
        let pattern = compile(&section, &mut registry).unwrap();
        let argv: Vec<String> = argv.iter().map(|s| s.to_string()).collect();
        let tokens = tokenize_argv(&mut registry, &argv, false).unwrap();
        match_pattern(&registry, &tokens, &pattern)
    }

    #[test]
    fn test_commands_and_positionals_consume_in_order() {
        let map = run("Usage: prog go <x> <y>", &["go", "1", "2"]).unwrap();
        assert!(map.get_bool("go"));
        assert_eq!(map.get_str("<x>"), "1");
        assert_eq!(map.get_str("<y>"), "2");
    }

    #[test]
    fn test_leftover_positionals_fail() {
        assert!(run("Usage: prog go", &["go", "extra"]).is_none());
        assert!(run("Usage: prog go <x>", &["go"]).is_none());
    }

    #[test]
    fn test_required_flag_must_be_supplied() {
        let doc = "Usage: prog --moored\n\nOptions:\n  --moored  Moored.\n";
        assert!(run(doc, &[]).is_none());
        assert!(run(doc, &["--moored"]).unwrap().get_bool("--moored"));
    }

    #[test]
    fn test_unmentioned_option_rejects_the_line() {
        let doc = "Usage: prog go [--moored]\n\nOptions:\n  --moored  Moored.\n  --drifting  Drifting.\n";
        assert!(run(doc, &["go", "--drifting"]).is_none());
    }

    #[test]
    fn test_one_or_more_is_greedy_but_backtracks() {
        let map = run("Usage: prog <name>... move <x>", &["a", "b", "move", "1"]).unwrap();
        assert_eq!(map.get_vec("<name>"), ["a", "b"]);
        assert!(map.get_bool("move"));
        assert_eq!(map.get_str("<x>"), "1");
    }

    #[test]
    fn test_repeated_switch_counts() {
        let doc = "Usage: prog [-v]...\n\nOptions:\n  -v  Verbose.\n";
        let map = run(doc, &["-v", "-v", "-v"]).unwrap();
        assert_eq!(map.get_count("-v"), 3);
        assert_eq!(run(doc, &[]).unwrap().get_count("-v"), 0);
    }

    #[test]
    fn test_option_supplied_more_often_than_permitted_fails() {
        let doc = "Usage: prog [-v]\n\nOptions:\n  -v  Verbose.\n";
        assert!(run(doc, &["-v", "-v"]).is_none());
    }

    #[test]
    fn test_options_shortcut_permits_unmentioned_options() {
        let doc = "\
Usage:
  prog run [options]

Options:
  -v         Verbose.
  --speed=<kn>  Speed [default: 10].
";
        let map = run(doc, &["run", "-v", "--speed=20"]).unwrap();
        assert!(map.get_bool("-v"));
        assert_eq!(map.get_str("--speed"), "20");
    }

    #[test]
    fn test_defaults_fill_every_registered_element() {
        let doc = "\
Usage:
  prog go <x> [--speed=<kn>]

Options:
  --speed=<kn>  Speed [default: 10].
";
        let map = run(doc, &["go", "7"]).unwrap();
        assert_eq!(map.get_str("--speed"), "10");
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_all_optional_either_accepts_empty_input() {
        let map = run("Usage: prog [go] | [stop]", &[]).unwrap();
        assert!(!map.get_bool("go"));
        assert!(!map.get_bool("stop"));
    }
}
