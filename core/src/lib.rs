//! Core types for usage-grammar argument interpretation.
//!
//! This crate defines the data model shared by the grammar compiler and the
//! pattern matcher:
//!
//! - [`ElemKey`] — the identity of a named grammar element (short option,
//!   long option, command word, positional argument).
//! - [`ArgSpec`] / [`ElemInfo`] — the reconciled descriptor for one element:
//!   argument arity, default value, repetition.
//! - [`Pattern`] — the compiled usage-pattern AST
//!   (required/optional/alternation/repetition over element leaves).
//! - [`Value`] / [`ArgMap`] — the bound values produced by a successful
//!   match, keyed by the element's literal source spelling.
//! - [`GrammarError`] / [`UsageError`] — the two error domains: malformed
//!   usage/options text versus argument vectors that fit no alternative.
//!
//! # Example
//!
//! ```
//! use argot_core::{ArgMap, Value};
//!
//! let mut map = ArgMap::new();
//! map.insert("<x>", Value::Plain(Some("1".into())));
//! map.insert("--speed", Value::Plain(Some("10".into())));
//! map.insert("move", Value::Switch(true));
//!
//! assert_eq!(map.get_str("<x>"), "1");
//! assert!(map.get_bool("move"));
//! assert_eq!(map.get_str("--missing"), "");
//! ```

mod descriptor;
mod error;
mod key;
mod pattern;
mod value;

pub use descriptor::{ArgSpec, ElemInfo};
pub use error::{GrammarError, GrammarResult, UsageError, UsageResult};
pub use key::ElemKey;
pub use pattern::Pattern;
pub use value::{ArgMap, Value};
