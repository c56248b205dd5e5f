//! Filter specifications.
//!
//! A [`FilterSpec`] maps [`FieldKey`]s to [`FieldFilter`]s. Field filters are
//! AND-ed with each other; filters without terms are skipped.
//!
//! On the wire a specification is a JSON object:
//!
//! ```json
//! {
//!   "text": { "terms": ["tiger", "burning"], "operator": "and" },
//!   "since": { "terms": [3600], "operator": "and" }
//! }
//! ```
//!
//! Unsupported field names are ignored. Unknown operators are rejected.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{FilterError, Result};
use crate::field::FieldKey;
use crate::op::Operator;
use crate::term::{FieldFilter, Term};

/// A full filter query: one optional field filter per field.
///
/// # Example
///
/// ```
/// use annotation_filter::{FieldKey, FilterSpec, Operator};
///
/// let spec = FilterSpec::new()
///     .tag(Operator::And, ["poetry"])
///     .user(Operator::Or, ["poe", "blake"])
///     .since([86_400]);
///
/// assert_eq!(spec.active().count(), 3);
/// assert_eq!(spec.get(FieldKey::User).unwrap().terms.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "RawFilterSpec")]
pub struct FilterSpec {
    fields: BTreeMap<FieldKey, FieldFilter>,
}

impl FilterSpec {
    /// Creates an empty specification, which matches every published record.
    pub fn new() -> Self {
        FilterSpec::default()
    }

    /// Parses a specification from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawFilterSpec = serde_json::from_str(json)?;
        FilterSpec::try_from(raw)
    }

    /// Converts a specification from a JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let raw: RawFilterSpec = serde_json::from_value(value)?;
        FilterSpec::try_from(raw)
    }

    // ========================================================================
    // Builders
    // ========================================================================

    /// Sets the filter for `field`, replacing any previous one.
    pub fn field(mut self, field: FieldKey, filter: FieldFilter) -> Self {
        self.insert(field, filter);
        self
    }

    /// Sets the `any` filter.
    pub fn any<I, T>(self, operator: Operator, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        self.field(FieldKey::Any, FieldFilter::new(operator, terms))
    }

    /// Sets the `quote` filter.
    pub fn quote<I, T>(self, operator: Operator, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        self.field(FieldKey::Quote, FieldFilter::new(operator, terms))
    }

    /// Sets the `since` filter. Every age must hold (operator `and`).
    pub fn since<I, T>(self, ages_secs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        self.field(FieldKey::Since, FieldFilter::all(ages_secs))
    }

    /// Sets the `tag` filter.
    pub fn tag<I, T>(self, operator: Operator, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        self.field(FieldKey::Tag, FieldFilter::new(operator, terms))
    }

    /// Sets the `text` filter.
    pub fn text<I, T>(self, operator: Operator, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        self.field(FieldKey::Text, FieldFilter::new(operator, terms))
    }

    /// Sets the `uri` filter.
    pub fn uri<I, T>(self, operator: Operator, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        self.field(FieldKey::Uri, FieldFilter::new(operator, terms))
    }

    /// Sets the `user` filter.
    pub fn user<I, T>(self, operator: Operator, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        self.field(FieldKey::User, FieldFilter::new(operator, terms))
    }

    // ========================================================================
    // Mutation and introspection
    // ========================================================================

    /// Sets the filter for `field`, returning the one it replaced.
    pub fn insert(&mut self, field: FieldKey, filter: FieldFilter) -> Option<FieldFilter> {
        self.fields.insert(field, filter)
    }

    /// Removes the filter for `field`.
    pub fn remove(&mut self, field: FieldKey) -> Option<FieldFilter> {
        self.fields.remove(&field)
    }

    /// Returns the filter for `field`, inert or not.
    pub fn get(&self, field: FieldKey) -> Option<&FieldFilter> {
        self.fields.get(&field)
    }

    /// Iterates over every field filter, including inert ones.
    pub fn fields(&self) -> impl Iterator<Item = (FieldKey, &FieldFilter)> {
        self.fields.iter().map(|(key, filter)| (*key, filter))
    }

    /// Iterates over the field filters that have terms.
    pub fn active(&self) -> impl Iterator<Item = (FieldKey, &FieldFilter)> {
        self.fields().filter(|(_, filter)| !filter.is_inert())
    }

    /// Returns `true` if no field filter has terms (matches every published record).
    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }

    /// Overlays `other` onto `self`: fields set in `other` replace ours.
    pub fn merge(mut self, other: FilterSpec) -> Self {
        self.fields.extend(other.fields);
        self
    }
}

impl Serialize for FilterSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// Wire form before field names and operators are validated.
///
/// Values stay untyped until their key is known, so an unsupported field
/// of any shape is skipped rather than rejected.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct RawFilterSpec(BTreeMap<String, serde_json::Value>);

#[derive(Debug, Deserialize)]
struct RawFieldFilter {
    #[serde(default)]
    terms: Vec<Term>,
    #[serde(default)]
    operator: Option<String>,
}

impl TryFrom<RawFilterSpec> for FilterSpec {
    type Error = FilterError;

    fn try_from(raw: RawFilterSpec) -> Result<Self> {
        let mut spec = FilterSpec::new();
        for (name, value) in raw.0 {
            let Ok(field) = name.parse::<FieldKey>() else {
                tracing::debug!(field = %name, "ignoring unsupported filter field");
                continue;
            };
            let raw_filter: RawFieldFilter = serde_json::from_value(value)?;
            let operator = match raw_filter.operator.as_deref() {
                Some(op) => Operator::parse_for(&name, op)?,
                None => Operator::default(),
            };
            spec.insert(
                field,
                FieldFilter {
                    terms: raw_filter.terms,
                    operator,
                },
            );
        }
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builders_set_fields() {
        let spec = FilterSpec::new()
            .text(Operator::And, ["a", "b"])
            .uri(Operator::Or, ["example.com"]);

        assert_eq!(
            spec.get(FieldKey::Text),
            Some(&FieldFilter::all(["a", "b"]))
        );
        assert_eq!(spec.get(FieldKey::Uri).unwrap().operator, Operator::Or);
        assert_eq!(spec.get(FieldKey::Tag), None);
    }

    #[test]
    fn setting_a_field_twice_replaces_it() {
        let spec = FilterSpec::new()
            .tag(Operator::And, ["first"])
            .tag(Operator::Or, ["second"]);
        assert_eq!(spec.get(FieldKey::Tag), Some(&FieldFilter::any(["second"])));
    }

    #[test]
    fn inert_filters_are_not_active() {
        let spec = FilterSpec::new()
            .text(Operator::And, Vec::<String>::new())
            .tag(Operator::Or, ["x"]);
        let active: Vec<_> = spec.active().map(|(key, _)| key).collect();
        assert_eq!(active, vec![FieldKey::Tag]);
        assert_eq!(spec.fields().count(), 2);
    }

    #[test]
    fn empty_when_only_inert_filters() {
        let spec = FilterSpec::new().text(Operator::And, Vec::<String>::new());
        assert!(spec.is_empty());
        assert!(FilterSpec::new().is_empty());
    }

    #[test]
    fn parses_wire_form() {
        let spec = FilterSpec::from_value(json!({
            "text": { "terms": ["Tiger"], "operator": "and" },
            "since": { "terms": [3600], "operator": "and" },
            "user": { "terms": ["poe", "blake"], "operator": "or" }
        }))
        .unwrap();

        assert_eq!(spec.get(FieldKey::Text), Some(&FieldFilter::all(["Tiger"])));
        assert_eq!(spec.get(FieldKey::Since), Some(&FieldFilter::all([3600])));
        assert_eq!(
            spec.get(FieldKey::User),
            Some(&FieldFilter::any(["poe", "blake"]))
        );
    }

    #[test]
    fn unsupported_fields_are_ignored() {
        let spec = FilterSpec::from_json(
            r#"{"cleaned_tags": {"terms": ["x"], "operator": "bogus"}, "tag": {"terms": ["y"]}}"#,
        )
        .unwrap();
        assert_eq!(spec.fields().count(), 1);
        assert_eq!(spec.get(FieldKey::Tag), Some(&FieldFilter::all(["y"])));
    }

    #[test]
    fn unsupported_fields_of_any_shape_are_ignored() {
        let spec = FilterSpec::from_json(
            r#"{"group": "__world__", "flagged": true, "limit": 20, "text": {"terms": ["a"]}}"#,
        )
        .unwrap();
        assert_eq!(spec.fields().count(), 1);
        assert_eq!(spec.get(FieldKey::Text), Some(&FieldFilter::all(["a"])));

        assert!(FilterSpec::from_json(r#"{"flagged": true}"#).unwrap().is_empty());
    }

    #[test]
    fn malformed_supported_field_is_reported() {
        let err = FilterSpec::from_json(r#"{"text": "tiger"}"#).unwrap_err();
        assert!(matches!(err, FilterError::Json(_)));
    }

    #[test]
    fn unknown_operator_fails_fast() {
        let err = FilterSpec::from_value(json!({
            "text": { "terms": ["a"], "operator": "xor" }
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            FilterError::UnknownOperator { ref field, ref operator }
                if field == "text" && operator == "xor"
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = FilterSpec::from_json("{not json").unwrap_err();
        assert!(matches!(err, FilterError::Json(_)));
    }

    #[test]
    fn serde_deserialize_goes_through_validation() {
        let ok: FilterSpec =
            serde_json::from_value(json!({ "uri": { "terms": ["a"], "operator": "or" } })).unwrap();
        assert_eq!(ok.get(FieldKey::Uri), Some(&FieldFilter::any(["a"])));

        let bad = serde_json::from_value::<FilterSpec>(json!({
            "uri": { "terms": ["a"], "operator": "maybe" }
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn serializes_to_wire_form() {
        let spec = FilterSpec::new().tag(Operator::Or, ["a"]);
        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            json!({ "tag": { "terms": ["a"], "operator": "or" } })
        );
    }

    #[test]
    fn merge_overrides_fields() {
        let base = FilterSpec::new()
            .text(Operator::And, ["a"])
            .tag(Operator::And, ["t"]);
        let overlay = FilterSpec::new().tag(Operator::Or, ["u"]);
        let merged = base.merge(overlay);

        assert_eq!(merged.get(FieldKey::Text), Some(&FieldFilter::all(["a"])));
        assert_eq!(merged.get(FieldKey::Tag), Some(&FieldFilter::any(["u"])));
    }
}
