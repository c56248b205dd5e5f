//! Boolean operators combining the terms of a field filter.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// How the per-term results of a field filter combine.
///
/// - **And**: every term must match
/// - **Or**: at least one term must match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    #[default]
    And,
    Or,
}

impl Operator {
    /// Folds per-term results into the field verdict.
    ///
    /// Short-circuits like `Iterator::all` / `Iterator::any`. Callers never
    /// pass an empty iterator: inert filters are dropped before evaluation.
    pub fn combine<I>(self, results: I) -> bool
    where
        I: IntoIterator<Item = bool>,
    {
        let mut results = results.into_iter();
        match self {
            Operator::And => results.all(|hit| hit),
            Operator::Or => results.any(|hit| hit),
        }
    }

    /// Returns the wire name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::And => "and",
            Operator::Or => "or",
        }
    }

    /// Parses an operator, attributing failures to `field`.
    pub(crate) fn parse_for(field: &str, operator: &str) -> Result<Self, FilterError> {
        operator
            .parse()
            .map_err(|_: FilterError| FilterError::UnknownOperator {
                field: field.to_string(),
                operator: operator.to_string(),
            })
    }
}

impl FromStr for Operator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "and" => Ok(Operator::And),
            "or" => Ok(Operator::Or),
            other => Err(FilterError::UnknownOperator {
                field: String::new(),
                operator: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
