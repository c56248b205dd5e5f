//! Filter evaluation.
//!
//! [`Evaluator`] turns a [`FilterSpec`] into a [`CompiledFilter`] and runs it
//! over a collection of [`Filterable`] records.
//!
//! The match logic is:
//! ```text
//! match = record has a non-empty id
//!       ∧ for every field filter with terms:
//!             operator.combine(term matches field, for each term)
//! ```
//!
//! Compilation validates the specification and normalizes every textual term
//! once, so evaluation never fails and costs O(records × fields × terms).

use chrono::{DateTime, Utc};

use crate::annotation::username;
use crate::error::Result;
use crate::field::FieldKey;
use crate::normalize::{TextNormalizer, UnicodeFolder};
use crate::op::Operator;
use crate::since::{parse_timestamp, within_age};
use crate::spec::FilterSpec;
use crate::traits::Filterable;

/// Builds compiled filters and evaluates them.
///
/// # Example
///
/// ```
/// use annotation_filter::{Annotation, Evaluator, FilterSpec, Operator};
///
/// let annotations = vec![
///     Annotation::new("1").with_text("Tiger burning bright"),
///     Annotation::new("2").with_text("Raven tapping"),
///     Annotation::draft().with_text("Tiger draft"),
/// ];
///
/// let spec = FilterSpec::new().text(Operator::Or, ["tiger", "TAPPING"]);
/// let ids = Evaluator::new().filter(&annotations, &spec).unwrap();
/// assert_eq!(ids, vec!["1", "2"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Evaluator<N = UnicodeFolder> {
    normalizer: N,
    now: Option<DateTime<Utc>>,
}

impl Evaluator<UnicodeFolder> {
    /// Creates an evaluator with the default normalizer and the wall clock.
    pub fn new() -> Self {
        Evaluator::default()
    }
}

impl<N: TextNormalizer> Evaluator<N> {
    /// Creates an evaluator using `normalizer` for every text comparison.
    pub fn with_normalizer(normalizer: N) -> Self {
        Evaluator {
            normalizer,
            now: None,
        }
    }

    /// Pins the instant `since` ages are measured from.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Returns the normalizer.
    pub fn normalizer(&self) -> &N {
        &self.normalizer
    }

    /// Validates `spec` and prepares it for evaluation.
    ///
    /// Inert field filters are dropped. Fails on `since` terms that are not
    /// non-negative numbers.
    pub fn compile(&self, spec: &FilterSpec) -> Result<CompiledFilter<'_, N>> {
        let mut fields = Vec::new();
        let mut skipped = 0usize;

        for (key, filter) in spec.fields() {
            if filter.is_inert() {
                skipped += 1;
                continue;
            }
            let terms = if key.is_textual() {
                CompiledTerms::Text(
                    filter
                        .terms
                        .iter()
                        .map(|term| self.prepare_term(&term.to_text()))
                        .collect(),
                )
            } else {
                CompiledTerms::Age(
                    filter
                        .terms
                        .iter()
                        .map(|term| term.to_age_secs())
                        .collect::<Result<Vec<_>>>()?,
                )
            };
            fields.push(CompiledField {
                key,
                operator: filter.operator,
                terms,
            });
        }

        tracing::debug!(
            active = ?fields.iter().map(|f| f.key.as_str()).collect::<Vec<_>>(),
            skipped,
            "compiled annotation filter"
        );

        Ok(CompiledFilter {
            normalizer: &self.normalizer,
            now: self.now.unwrap_or_else(Utc::now),
            fields,
        })
    }

    /// A term the normalizer erases entirely (a lone combining mark, say)
    /// matches nothing, rather than every present field.
    fn prepare_term(&self, raw: &str) -> Option<String> {
        let prepared = self.normalizer.prepare(raw);
        if prepared.is_empty() && !raw.is_empty() {
            tracing::debug!(term = raw, "term normalizes to nothing");
            return None;
        }
        Some(prepared)
    }

    /// Returns the ids of the records matching `spec`, in input order.
    pub fn filter<'a, R: Filterable>(
        &self,
        records: &'a [R],
        spec: &FilterSpec,
    ) -> Result<Vec<&'a str>> {
        Ok(self.compile(spec)?.filter(records))
    }

    /// Counts the records matching `spec`.
    pub fn count<R: Filterable>(&self, records: &[R], spec: &FilterSpec) -> Result<usize> {
        Ok(self.compile(spec)?.count(records))
    }
}

/// A validated specification bound to a normalizer and a reference instant.
#[derive(Debug)]
pub struct CompiledFilter<'n, N> {
    normalizer: &'n N,
    now: DateTime<Utc>,
    fields: Vec<CompiledField>,
}

#[derive(Debug)]
struct CompiledField {
    key: FieldKey,
    operator: Operator,
    terms: CompiledTerms,
}

#[derive(Debug)]
enum CompiledTerms {
    /// Normalized substrings; `None` never matches.
    Text(Vec<Option<String>>),
    /// Maximum ages in seconds.
    Age(Vec<f64>),
}

impl<N: TextNormalizer> CompiledFilter<'_, N> {
    /// Returns the instant `since` ages are measured from.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Returns `true` if no field filter is active.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Tests whether `record` passes every active field filter.
    ///
    /// Ignores the record's id; drafts are excluded by [`CompiledFilter::filter`].
    pub fn matches<R: Filterable + ?Sized>(&self, record: &R) -> bool {
        self.fields
            .iter()
            .all(|field| self.field_matches(field, record))
    }

    /// Returns the ids of matching published records, in input order.
    pub fn filter<'a, R: Filterable>(&self, records: &'a [R]) -> Vec<&'a str> {
        let ids: Vec<&'a str> = records
            .iter()
            .filter_map(|record| self.matching_id(record))
            .collect();
        tracing::debug!(records = records.len(), matched = ids.len(), "filtered annotations");
        ids
    }

    /// Returns references to matching published records, in input order.
    pub fn select<'a, R: Filterable>(&self, records: &'a [R]) -> Vec<&'a R> {
        records
            .iter()
            .filter(|record| self.matching_id(*record).is_some())
            .collect()
    }

    /// Counts matching published records.
    pub fn count<R: Filterable>(&self, records: &[R]) -> usize {
        records
            .iter()
            .filter(|record| self.matching_id(*record).is_some())
            .count()
    }

    fn matching_id<'a, R: Filterable>(&self, record: &'a R) -> Option<&'a str> {
        let Some(id) = record.published_id() else {
            tracing::trace!("skipping draft annotation");
            return None;
        };
        self.matches(record).then_some(id)
    }

    fn field_matches<R: Filterable + ?Sized>(&self, field: &CompiledField, record: &R) -> bool {
        match &field.terms {
            CompiledTerms::Age(ages) => {
                let Some(updated) = record.updated().and_then(parse_timestamp) else {
                    tracing::trace!(
                        id = ?record.id(),
                        updated = ?record.updated(),
                        "no usable updated timestamp"
                    );
                    return false;
                };
                field
                    .operator
                    .combine(ages.iter().map(|age| within_age(updated, self.now, *age)))
            }
            CompiledTerms::Text(terms) => {
                let candidates = self.candidates(field.key, record);
                field.operator.combine(terms.iter().map(|term| {
                    term.as_deref()
                        .is_some_and(|term| candidates.iter().any(|text| text.contains(term)))
                }))
            }
        }
    }

    /// Normalized candidate texts of `record` for a textual field.
    fn candidates<R: Filterable + ?Sized>(&self, key: FieldKey, record: &R) -> Vec<String> {
        let prepare = |text: &str| self.normalizer.prepare(text);
        match key {
            FieldKey::Text => record.text().map(prepare).into_iter().collect(),
            FieldKey::Uri => record.uri().map(prepare).into_iter().collect(),
            FieldKey::Tag => record.tags().into_iter().map(prepare).collect(),
            FieldKey::Quote => record.quotes().into_iter().map(prepare).collect(),
            FieldKey::User => user_names(record).into_iter().map(prepare).collect(),
            FieldKey::Any => {
                let parts = searchable_parts(record);
                if parts.is_empty() {
                    Vec::new()
                } else {
                    vec![prepare(&parts.join(" "))]
                }
            }
            FieldKey::Since => Vec::new(),
        }
    }
}

/// Local account name, then display name when present.
fn user_names<R: Filterable + ?Sized>(record: &R) -> Vec<&str> {
    record
        .user()
        .map(username)
        .into_iter()
        .chain(record.display_name())
        .collect()
}

/// Everything the `any` field searches, in blob order.
fn searchable_parts<R: Filterable + ?Sized>(record: &R) -> Vec<&str> {
    let mut parts = Vec::new();
    parts.extend(record.text());
    parts.extend(record.uri());
    parts.extend(record.tags());
    parts.extend(user_names(record));
    parts.extend(record.quotes());
    parts
}
