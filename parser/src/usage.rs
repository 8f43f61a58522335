//! Usage-section extraction, tokenization, and pattern compilation.
//!
//! The compiler is a recursive-descent parse over the tokenized pattern
//! lines, producing one [`Pattern`] per line and reconciling every option
//! mention against the [`Registry`] as it goes. Nesting depth is bounded so
//! pathological input fails with a [`GrammarError`] instead of exhausting
//! the stack.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use argot_core::{ArgSpec, ElemInfo, ElemKey, GrammarError, GrammarResult, Pattern};

use crate::registry::{Registry, find_header};

/// Maximum structural nesting of one usage line.
const MAX_DEPTH: usize = 64;

/// Grouping operators get padded with spaces so plain whitespace splitting
/// yields them as standalone tokens.
static GROUPING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\.\.|\[|\]|\(|\)|\|").expect("static regex must compile"));

/// The usage section of a doc string: its verbatim text, the program name,
/// and one token stream per pattern line.
#[derive(Debug)]
pub(crate) struct UsageSection {
    pub(crate) text: String,
    pub(crate) program: String,
    pub(crate) lines: Vec<Vec<String>>,
}

/// Extracts the usage section: everything from the line containing
/// `usage:` (case-insensitive) through the first blank line or end of text.
/// Every pattern line must start with the same program name.
pub(crate) fn extract_usage_section(doc: &str) -> GrammarResult<UsageSection> {
    let mut lines = doc.lines();
    let mut raw: Vec<&str> = Vec::new();
    let mut pattern_lines: Vec<&str> = Vec::new();
    let mut found = false;
    for line in lines.by_ref() {
        if let Some(idx) = find_header(line, "usage:") {
            found = true;
            raw.push(line);
            let rest = &line[idx..];
            if !rest.trim().is_empty() {
                pattern_lines.push(rest);
            }
            break;
        }
    }
    if !found {
        return Err(GrammarError::MissingUsageSection);
    }
    for line in lines {
        if line.trim().is_empty() {
            break;
        }
        raw.push(line);
        pattern_lines.push(line);
    }

    let mut program = String::new();
    let mut tokenized: Vec<Vec<String>> = Vec::new();
    for line in pattern_lines {
        let mut tokens = tokenize(line);
        if tokens.is_empty() {
            continue;
        }
        let prog = tokens.remove(0);
        if program.is_empty() {
            program = prog;
        } else if prog != program {
            return Err(GrammarError::ProgramNameMismatch {
                expected: program,
                found: prog,
            });
        }
        tokenized.push(tokens);
    }
    if program.is_empty() {
        return Err(GrammarError::MissingProgramName);
    }
    debug!(program, lines = tokenized.len(), "extracted usage section");
    Ok(UsageSection {
        text: raw.join("\n"),
        program,
        lines: tokenized,
    })
}

/// Splits one usage line into tokens, keeping `[ ] ( ) |` and `...` as
/// standalone tokens.
pub(crate) fn tokenize(line: &str) -> Vec<String> {
    GROUPING
        .replace_all(line.trim(), " $0 ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Compiles every usage line and unions them into the top-level pattern
/// `Required(Either(line_1, …, line_n))`.
pub(crate) fn compile(section: &UsageSection, registry: &mut Registry) -> GrammarResult<Pattern> {
    let mut alternatives = Vec::with_capacity(section.lines.len());
    for tokens in &section.lines {
        let mut compiler = LineCompiler {
            registry: &mut *registry,
            tokens,
            pos: 0,
        };
        let mut line = compiler.pattern(None, 0)?;
        tag_repeats(&line, registry);
        expand_options_shortcut(&mut line, registry);
        alternatives.push(line);
    }
    Ok(Pattern::Required(vec![Pattern::Either(alternatives)]))
}

/// Marks elements that repeat so their values accumulate across
/// occurrences: under `...`, or mentioned more than once within a single
/// alternative. `prog -h | --help` names one element twice but each
/// alternative uses it once, so it does not repeat.
fn tag_repeats(line: &Pattern, registry: &mut Registry) {
    for (key, count) in leaf_counts(line, registry) {
        if count > 1 {
            if let Some(info) = registry.get_mut(&key) {
                info.repeats = true;
            }
        }
    }
}

/// Maximum occurrences of each canonical leaf key within any single
/// alternative of the pattern: sequencing adds per-key counts, alternation
/// takes the per-key maximum, `...` doubles its child's counts so a lone
/// leaf under it still reads as repeating. One map per node, so the fold
/// stays linear in the pattern size.
fn leaf_counts(pattern: &Pattern, registry: &Registry) -> HashMap<ElemKey, u64> {
    match pattern {
        Pattern::Leaf(key) => HashMap::from([(registry.resolve(key), 1)]),
        Pattern::OneOrMore(child) => {
            let mut counts = leaf_counts(child, registry);
            for count in counts.values_mut() {
                *count = count.saturating_mul(2);
            }
            counts
        }
        Pattern::Required(children) | Pattern::Optional(children) => {
            let mut counts: HashMap<ElemKey, u64> = HashMap::new();
            for child in children {
                for (key, count) in leaf_counts(child, registry) {
                    let entry = counts.entry(key).or_insert(0);
                    *entry = entry.saturating_add(count);
                }
            }
            counts
        }
        Pattern::Either(alternatives) => {
            let mut counts: HashMap<ElemKey, u64> = HashMap::new();
            for alt in alternatives {
                for (key, count) in leaf_counts(alt, registry) {
                    let entry = counts.entry(key).or_insert(0);
                    *entry = (*entry).max(count);
                }
            }
            counts
        }
        Pattern::OptionsShortcut => HashMap::new(),
    }
}

/// Replaces every `[options]` placeholder with an `Optional` over the
/// Options-block options that the line does not already mention.
fn expand_options_shortcut(line: &mut Pattern, registry: &Registry) {
    let mut mentioned: HashSet<ElemKey> = HashSet::new();
    line.for_each_leaf(&mut |key| {
        if key.is_option() {
            mentioned.insert(registry.resolve(key));
        }
    });
    let remaining: Vec<Pattern> = registry
        .described_options()
        .into_iter()
        .filter(|key| !mentioned.contains(key))
        .map(Pattern::Leaf)
        .collect();
    rewrite_shortcut(line, &remaining);
}

fn rewrite_shortcut(pattern: &mut Pattern, remaining: &[Pattern]) {
    match pattern {
        Pattern::OptionsShortcut => {
            *pattern = Pattern::Optional(remaining.to_vec());
        }
        Pattern::Required(children) | Pattern::Optional(children) | Pattern::Either(children) => {
            for child in children {
                rewrite_shortcut(child, remaining);
            }
        }
        Pattern::OneOrMore(child) => rewrite_shortcut(child, remaining),
        Pattern::Leaf(_) => {}
    }
}

/// Recursive-descent compiler for one usage line.
struct LineCompiler<'r, 't> {
    registry: &'r mut Registry,
    tokens: &'t [String],
    pos: usize,
}

impl LineCompiler<'_, '_> {
    fn pattern(&mut self, closing: Option<&str>, depth: usize) -> GrammarResult<Pattern> {
        if depth > MAX_DEPTH {
            return Err(GrammarError::TooDeep(MAX_DEPTH));
        }
        let mut alternatives: Vec<Pattern> = Vec::new();
        let mut sequence: Vec<Pattern> = Vec::new();
        loop {
            let Some(token) = self.current().map(str::to_string) else {
                if let Some(close) = closing {
                    let opener = if close == "]" { "[" } else { "(" };
                    return Err(GrammarError::UnbalancedGroup(opener.to_string()));
                }
                break;
            };
            match token.as_str() {
                "..." => return Err(GrammarError::StrayEllipsis),
                "|" => {
                    if sequence.is_empty() {
                        return Err(GrammarError::DanglingAlternation);
                    }
                    alternatives.push(Pattern::Required(sequence));
                    sequence = Vec::new();
                    self.advance();
                    if self.current().is_none() {
                        return Err(GrammarError::DanglingAlternation);
                    }
                }
                "]" | ")" => {
                    if closing != Some(token.as_str()) {
                        return Err(GrammarError::UnbalancedGroup(token.clone()));
                    }
                    if sequence.is_empty() && alternatives.is_empty() {
                        return Err(GrammarError::EmptyGroup);
                    }
                    if sequence.is_empty() {
                        return Err(GrammarError::DanglingAlternation);
                    }
                    self.advance();
                    break;
                }
                "[" => {
                    if self.peek_is(1, "options") && self.peek_is(2, "]") {
                        self.advance();
                        self.advance();
                        self.advance();
                        sequence.push(self.maybe_repeat(Pattern::OptionsShortcut));
                    } else {
                        self.advance();
                        let inner = self.pattern(Some("]"), depth + 1)?;
                        sequence.push(self.maybe_repeat(Pattern::Optional(ungroup(inner))));
                    }
                }
                "(" => {
                    self.advance();
                    // A group parse yields `Required` or `Either`, both
                    // directly usable as the required-group node.
                    let inner = self.pattern(Some(")"), depth + 1)?;
                    sequence.push(self.maybe_repeat(inner));
                }
                "-" | "--" => {
                    // Bare dashes are conventional literal separators.
                    sequence.push(self.command(token.clone()));
                }
                _ if ElemKey::is_long_token(&token) => {
                    let leaf = self.long_option(&token)?;
                    sequence.push(leaf);
                }
                _ if ElemKey::is_short_token(&token) => {
                    sequence.extend(self.short_stack(&token)?);
                }
                _ if ElemKey::is_placeholder_token(&token) => {
                    // Positionals always carry text, so they default to
                    // `Plain(None)` rather than a switch when unmatched.
                    let key = ElemKey::Positional(token.clone());
                    self.registry.ensure(&key, ArgSpec::One);
                    self.advance();
                    sequence.push(self.maybe_repeat(Pattern::Leaf(key)));
                }
                _ if !token.starts_with('-') => {
                    sequence.push(self.command(token.clone()));
                }
                _ => return Err(GrammarError::UnexpectedToken(token)),
            }
        }
        if alternatives.is_empty() {
            Ok(Pattern::Required(sequence))
        } else {
            alternatives.push(Pattern::Required(sequence));
            Ok(Pattern::Either(alternatives))
        }
    }

    fn command(&mut self, word: String) -> Pattern {
        let key = ElemKey::Command(word);
        self.registry.ensure(&key, ArgSpec::Zero);
        self.advance();
        self.maybe_repeat(Pattern::Leaf(key))
    }

    /// `--name` or `--name=<arg>`, reconciled against the registry.
    fn long_option(&mut self, token: &str) -> GrammarResult<Pattern> {
        let (name, placeholder) = match token.split_once('=') {
            Some((name, arg)) => (name.to_string(), Some(arg.to_string())),
            None => (token.to_string(), None),
        };
        if let Some(arg) = &placeholder {
            if !ElemKey::is_placeholder_token(arg) {
                return Err(GrammarError::BadPlaceholder(arg.clone()));
            }
        }
        let key = self.registry.resolve(&ElemKey::long(&name));
        if self.registry.contains(&key) {
            let takes_value = self.registry.takes_value(&key);
            if placeholder.is_some() && !takes_value {
                return Err(GrammarError::ArityConflict(key.spelling()));
            }
            if placeholder.is_none() && takes_value {
                // The registry says this option is valued, so the usage line
                // must spell the argument as the next token.
                self.expect_placeholder_after(&key)?;
            }
        } else {
            let arg = if placeholder.is_some() {
                ArgSpec::One
            } else {
                ArgSpec::Zero
            };
            self.registry.insert(key.clone(), ElemInfo::new(arg));
        }
        self.advance();
        Ok(self.maybe_repeat(Pattern::Leaf(key)))
    }

    /// A short token: either one option or a stack like `-abc`. A stacked
    /// letter that takes an argument consumes the rest of the stack (or the
    /// next token) as its placeholder and ends the stack.
    fn short_stack(&mut self, token: &str) -> GrammarResult<Vec<Pattern>> {
        let stack: Vec<char> = token.chars().skip(1).collect();
        let mut leaves = Vec::new();
        for (i, c) in stack.iter().enumerate() {
            let key = self.registry.resolve(&ElemKey::Short(*c));
            leaves.push(Pattern::Leaf(key.clone()));
            if self.registry.contains(&key) && self.registry.takes_value(&key) {
                let rest: String = stack[i + 1..].iter().collect();
                if rest.is_empty() {
                    self.expect_placeholder_after(&key)?;
                } else if !ElemKey::is_placeholder_token(&rest) {
                    return Err(GrammarError::BadPlaceholder(rest));
                }
                break;
            }
            self.registry.ensure(&key, ArgSpec::Zero);
        }
        self.advance();
        if self.current() == Some("...") {
            self.advance();
            leaves = leaves
                .into_iter()
                .map(|leaf| Pattern::OneOrMore(Box::new(leaf)))
                .collect();
        }
        Ok(leaves)
    }

    /// Consumes the argument placeholder that must follow a valued option
    /// written without `=`.
    fn expect_placeholder_after(&mut self, key: &ElemKey) -> GrammarResult<()> {
        match self.peek(1) {
            Some(next) if ElemKey::is_placeholder_token(next) => {
                // Swallow the placeholder; it names the option's argument,
                // not a positional.
                self.advance();
                Ok(())
            }
            _ => Err(GrammarError::ArityConflict(key.spelling())),
        }
    }

    fn maybe_repeat(&mut self, pattern: Pattern) -> Pattern {
        if self.current() == Some("...") {
            self.advance();
            Pattern::OneOrMore(Box::new(pattern))
        } else {
            pattern
        }
    }

    fn current(&self) -> Option<&str> {
        self.peek(0)
    }

    fn peek(&self, offset: usize) -> Option<&str> {
        self.tokens.get(self.pos + offset).map(String::as_str)
    }

    fn peek_is(&self, offset: usize, token: &str) -> bool {
        self.peek(offset) == Some(token)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }
}

/// Unwraps a `Required` produced by a group parse into its children, so
/// `[a b]` compiles to `Optional(a, b)` rather than
/// `Optional(Required(a, b))`.
fn ungroup(pattern: Pattern) -> Vec<Pattern> {
    match pattern {
        Pattern::Required(children) => children,
        other => vec![other],
    }
}
