//! Annotation filter - field-aware filtering of in-memory annotation collections.
//!
//! Given annotation records and a filter specification, returns the ids of
//! the matching records in input order. It supports:
//!
//! - Per-field filters on `text`, `uri`, `tag`, `user`, `quote` and `since`
//! - A virtual `any` field searching all text of a record at once
//! - `and` / `or` combination of terms within a field
//! - Case- and accent-insensitive substring matching via a pluggable
//!   [`TextNormalizer`]
//! - Parsing of faceted search text (`tag:poetry since:1day tiger`)
//!
//! # Quick Start
//!
//! ```rust
//! use annotation_filter::{Annotation, Evaluator, FilterSpec, Operator};
//!
//! let annotations = vec![
//!     Annotation::new("1").with_text("Tiger burning bright"),
//!     Annotation::new("2").with_text("Raven tapping"),
//! ];
//!
//! let spec = FilterSpec::new().text(Operator::And, ["Tiger", "burning"]);
//! let ids = Evaluator::new().filter(&annotations, &spec).unwrap();
//! assert_eq!(ids, vec!["1"]);
//! ```
//!
//! # Match Semantics
//!
//! ```text
//! match = record has a non-empty id
//!       ∧ (every field filter with terms passes)
//!
//! field passes = and: every term matches the field
//!                or:  at least one term matches the field
//! ```
//!
//! - Field filters without terms are skipped, never failing.
//! - Records without an id (drafts) are never returned.
//! - Missing fields make every term against them fail; they never error.
//!
//! # Fields
//!
//! | Field | Candidates | Term matches when |
//! |-------|------------|-------------------|
//! | `text` | body | body contains term |
//! | `uri` | resource locator | uri contains term |
//! | `tag` | each tag | some tag contains term |
//! | `quote` | each `target[].selector[].exact` | some quote contains term |
//! | `user` | account local name, display name | either contains term |
//! | `since` | `updated` | `now - updated <= term` seconds |
//! | `any` | all of the above except `since`, joined | the joined text contains term |
//!
//! Textual comparisons pass both sides through
//! [`TextNormalizer::prepare`] first.
//!
//! # Errors
//!
//! Only the specification can be invalid: an operator other than `and` /
//! `or`, or a `since` term that is not a non-negative number. Both are
//! reported before any record is examined.

mod annotation;
mod error;
mod evaluator;
mod field;
mod normalize;
mod op;
mod search;
mod since;
mod spec;
mod term;
mod traits;

// Re-export public API
pub use annotation::{username, Annotation, Selector, Target, UserInfo};
pub use error::{FilterError, Result};
pub use evaluator::{CompiledFilter, Evaluator};
pub use field::{FieldKey, UnsupportedField};
pub use normalize::{CaseFold, TextNormalizer, Transliterate, UnicodeFolder};
pub use op::Operator;
pub use search::{default_operator, parse_search, tokenize};
pub use since::{parse_age, parse_timestamp, within_age};
pub use spec::FilterSpec;
pub use term::{FieldFilter, Term};
pub use traits::Filterable;

/// Filters `records` against `spec` with the default [`Evaluator`].
///
/// Returns the ids of matching published records, in input order.
pub fn filter<'a, R: Filterable>(records: &'a [R], spec: &FilterSpec) -> Result<Vec<&'a str>> {
    Evaluator::new().filter(records, spec)
}
