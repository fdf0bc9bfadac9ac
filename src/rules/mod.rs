//! Executable rule sets compiled from the pattern configuration.
//!
//! Configuration is resolved exactly once per run: every regex is compiled
//! into a [`CompiledPattern`], noise groups are laid out in processing order
//! in a [`PatternSet`], and the whole lot is held by a [`RuleBook`] that is
//! shared read-only by every page.

mod pattern;
mod pattern_set;
mod rule_book;

pub use pattern::{CompiledPattern, PatternCompiler};
pub use pattern_set::{PatternSet, RuleGroup};
pub use rule_book::{HeadingRules, LineBreak, RuleBook};
