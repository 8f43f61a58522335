//! Reconciled element descriptors: argument arity, defaults, repetition.

/// Argument arity of an element, with an optional default value.
///
/// Commands are always [`ArgSpec::Zero`] and positionals [`ArgSpec::One`];
/// only options vary. A default value implies arity one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgSpec {
    /// The option takes no argument.
    Zero,
    /// The option takes one argument, with no default.
    One,
    /// The option takes one argument and falls back to this value when the
    /// argument vector does not supply one.
    Defaulted(String),
}

impl ArgSpec {
    /// Whether this arity consumes an argument.
    ///
    /// ```
    /// use argot_core::ArgSpec;
    ///
    /// assert!(!ArgSpec::Zero.takes_value());
    /// assert!(ArgSpec::One.takes_value());
    /// assert!(ArgSpec::Defaulted("10".into()).takes_value());
    /// ```
    pub fn takes_value(&self) -> bool {
        !matches!(self, ArgSpec::Zero)
    }
}

/// The reconciled descriptor for one grammar element.
///
/// One `ElemInfo` exists per element identity, merging what the Options
/// block and the Usage block each declared about it. The two sources must
/// agree on arity; disagreement is a grammar error raised by the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElemInfo {
    /// Argument arity plus default.
    pub arg: ArgSpec,
    /// True when the element appears under `...` or more than once in a
    /// usage line, making its bound value accumulate (count or list).
    pub repeats: bool,
    /// True when the element was declared in the Options block (as opposed
    /// to auto-registered from a usage-line mention). Only these participate
    /// in `[options]` expansion.
    pub from_options: bool,
}

impl ElemInfo {
    /// Descriptor for an element first seen in a usage line.
    pub fn new(arg: ArgSpec) -> Self {
        Self {
            arg,
            repeats: false,
            from_options: false,
        }
    }

    /// Descriptor for an option declared in the Options block.
    pub fn described(arg: ArgSpec) -> Self {
        Self {
            arg,
            repeats: false,
            from_options: true,
        }
    }
}
