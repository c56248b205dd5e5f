//! Terms and field filters.
//!
//! A [`FieldFilter`] is the unit of a filter specification: an ordered list
//! of [`Term`]s plus the [`Operator`] that combines their results.

use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};
use crate::op::Operator;

/// A single search term.
///
/// Terms arrive either as text or as numbers (ages for `since`). Each field
/// coerces the term into the form it compares against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Term {
    Text(String),
    Number(f64),
}

impl Term {
    /// Renders the term as text. Whole numbers have no fractional part.
    pub fn to_text(&self) -> String {
        match self {
            Term::Text(s) => s.clone(),
            Term::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Term::Number(n) => n.to_string(),
        }
    }

    /// Reads the term as an age in seconds.
    ///
    /// Fails for non-numeric text, negative values, and non-finite values.
    pub fn to_age_secs(&self) -> Result<f64> {
        let secs = match self {
            Term::Number(n) => Some(*n),
            Term::Text(s) => s.trim().parse::<f64>().ok(),
        };
        secs.filter(|secs| secs.is_finite() && *secs >= 0.0)
            .ok_or_else(|| FilterError::InvalidSinceTerm {
                term: self.to_text(),
            })
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Term::Text(s.to_string())
    }
}

impl From<String> for Term {
    fn from(s: String) -> Self {
        Term::Text(s)
    }
}

impl From<&String> for Term {
    fn from(s: &String) -> Self {
        Term::Text(s.clone())
    }
}

impl From<f64> for Term {
    fn from(n: f64) -> Self {
        Term::Number(n)
    }
}

impl From<i64> for Term {
    fn from(n: i64) -> Self {
        Term::Number(n as f64)
    }
}

impl From<u64> for Term {
    fn from(n: u64) -> Self {
        Term::Number(n as f64)
    }
}

impl From<i32> for Term {
    fn from(n: i32) -> Self {
        Term::Number(n as f64)
    }
}

impl From<u32> for Term {
    fn from(n: u32) -> Self {
        Term::Number(n as f64)
    }
}

/// Terms for one field, and how their results combine.
///
/// A field filter without terms is inert: it excludes nothing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldFilter {
    pub terms: Vec<Term>,
    #[serde(default)]
    pub operator: Operator,
}

impl FieldFilter {
    /// Creates a field filter from an operator and terms.
    pub fn new<I, T>(operator: Operator, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        FieldFilter {
            terms: terms.into_iter().map(Into::into).collect(),
            operator,
        }
    }

    /// Creates a field filter requiring every term.
    pub fn all<I, T>(terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        FieldFilter::new(Operator::And, terms)
    }

    /// Creates a field filter requiring at least one term.
    pub fn any<I, T>(terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        FieldFilter::new(Operator::Or, terms)
    }

    /// Returns `true` if this filter has no terms and therefore excludes nothing.
    pub fn is_inert(&self) -> bool {
        self.terms.is_empty()
    }

    /// Appends a term.
    pub fn push(&mut self, term: impl Into<Term>) {
        self.terms.push(term.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_render_without_fraction() {
        assert_eq!(Term::Number(2.0).to_text(), "2");
        assert_eq!(Term::Number(2.5).to_text(), "2.5");
        assert_eq!(Term::from("2.0").to_text(), "2.0");
    }

    #[test]
    fn age_from_number_or_numeric_text() {
        assert_eq!(Term::Number(3600.0).to_age_secs().unwrap(), 3600.0);
        assert_eq!(Term::from(" 60 ").to_age_secs().unwrap(), 60.0);
        assert_eq!(Term::from(0i64).to_age_secs().unwrap(), 0.0);
    }

    #[test]
    fn invalid_ages_fail_fast() {
        for bad in [
            Term::from("yesterday"),
            Term::from("5min"),
            Term::Number(-1.0),
            Term::Number(f64::NAN),
            Term::Number(f64::INFINITY),
        ] {
            assert!(
                matches!(bad.to_age_secs(), Err(FilterError::InvalidSinceTerm { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn deserializes_mixed_terms() {
        let filter: FieldFilter =
            serde_json::from_value(json!({ "terms": ["a", 3], "operator": "or" })).unwrap();
        assert_eq!(filter.terms, vec![Term::from("a"), Term::Number(3.0)]);
        assert_eq!(filter.operator, Operator::Or);
    }

    #[test]
    fn operator_defaults_to_and() {
        let filter: FieldFilter = serde_json::from_value(json!({ "terms": ["a"] })).unwrap();
        assert_eq!(filter.operator, Operator::And);
    }

    #[test]
    fn inert_when_empty() {
        assert!(FieldFilter::all(Vec::<String>::new()).is_inert());
        let mut filter = FieldFilter::any(["x"]);
        assert!(!filter.is_inert());
        filter.push("y");
        assert_eq!(filter.terms.len(), 2);
    }
}
