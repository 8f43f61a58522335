//! The compiled usage-pattern AST.

use crate::ElemKey;

/// One node of a compiled usage pattern.
///
/// The top-level pattern produced by the compiler is always
/// `Required(Either(line_1, …, line_n))`, one alternative per usage line.
/// [`Pattern::OptionsShortcut`] only exists transiently: the compiler
/// replaces it with an [`Pattern::Optional`] over every Options-block option
/// not already mentioned in the same usage line before matching begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// All children must match, in order.
    Required(Vec<Pattern>),
    /// Children are attempted; consuming nothing is not a failure.
    Optional(Vec<Pattern>),
    /// Exactly one alternative must match; alternatives are tried in source
    /// order and the first total match wins.
    Either(Vec<Pattern>),
    /// The child repeats one or more times, greedily.
    OneOrMore(Box<Pattern>),
    /// The `[options]` placeholder, compiled away before matching.
    OptionsShortcut,
    /// A single named element: command, positional, or option reference.
    Leaf(ElemKey),
}

impl Pattern {
    /// Visits every leaf key, left to right.
    pub fn for_each_leaf<'a>(&'a self, f: &mut impl FnMut(&'a ElemKey)) {
        match self {
            Pattern::Required(ps) | Pattern::Optional(ps) | Pattern::Either(ps) => {
                for p in ps {
                    p.for_each_leaf(f);
                }
            }
            Pattern::OneOrMore(p) => p.for_each_leaf(f),
            Pattern::OptionsShortcut => {}
            Pattern::Leaf(key) => f(key),
        }
    }
}
