//! The annotation record, as served by annotation APIs.
//!
//! Every member is optional and JSON `null` reads as absent, so partially
//! loaded records and drafts deserialize without error. Members of an
//! unexpected type read as absent too, and list entries that do not fit are
//! dropped. Numeric ids are kept as their decimal text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::traits::Filterable;

static ACCOUNT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^acct:([^@]+)@(.+)$").expect("account id pattern is valid"));

/// Extracts the local name from an `acct:<name>@<domain>` account id.
///
/// Strings that are not account ids are returned unchanged.
///
/// ```
/// use annotation_filter::username;
///
/// assert_eq!(username("acct:poe@example.com"), "poe");
/// assert_eq!(username("poe"), "poe");
/// ```
pub fn username(user: &str) -> &str {
    ACCOUNT_ID
        .captures(user)
        .and_then(|caps| caps.get(1))
        .map_or(user, |name| name.as_str())
}

/// A loosely structured annotation record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotation {
    /// Identifier. Absent on drafts.
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub uri: Option<String>,
    /// Account identifier (`acct:<name>@<domain>`).
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::record")]
    pub user_info: Option<UserInfo>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::texts")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::records")]
    pub target: Option<Vec<Target>>,
    /// Last update time, as sent by the server.
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub updated: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInfo {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub display_name: Option<String>,
}

/// One annotated target. A page note has targets without selectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Target {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::records")]
    pub selector: Option<Vec<Selector>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selector {
    #[serde(
        rename = "type",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub kind: Option<String>,
    /// Quoted text, present on text-quote selectors.
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub exact: Option<String>,
}

/// Field deserializers that degrade mismatched JSON to "absent".
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Strings as they are, numbers as decimal text, anything else absent.
    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(into_text(Value::deserialize(deserializer)?))
    }

    /// The textual entries of an array.
    pub fn texts<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => Some(items.into_iter().filter_map(into_text).collect()),
            _ => None,
        })
    }

    /// A nested object, absent when it does not fit `T`.
    pub fn record<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(deserializer)? {
            object @ Value::Object(_) => serde_json::from_value(object).ok(),
            _ => None,
        })
    }

    /// The array entries that fit `T`. A lone object counts as one entry.
    pub fn records<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let items = match Value::deserialize(deserializer)? {
            Value::Array(items) => items,
            object @ Value::Object(_) => vec![object],
            _ => return Ok(None),
        };
        Ok(Some(
            items
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ))
    }

    fn into_text(value: Value) -> Option<String> {
        match value {
            Value::String(text) => Some(text),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }
}

impl Annotation {
    /// Creates an annotation with the given id and nothing else.
    pub fn new(id: impl Into<String>) -> Self {
        Annotation {
            id: Some(id.into()),
            ..Annotation::default()
        }
    }

    /// Creates a draft: an annotation without id.
    pub fn draft() -> Self {
        Annotation::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.user_info = Some(UserInfo {
            display_name: Some(name.into()),
        });
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Appends a target carrying a single text-quote selector.
    pub fn with_quote(mut self, exact: impl Into<String>) -> Self {
        let target = Target {
            source: self.uri.clone(),
            selector: Some(vec![Selector {
                kind: Some("TextQuoteSelector".to_string()),
                exact: Some(exact.into()),
            }]),
        };
        self.target.get_or_insert_with(Vec::new).push(target);
        self
    }

    pub fn with_updated(mut self, updated: impl Into<String>) -> Self {
        self.updated = Some(updated.into());
        self
    }
}

impl Filterable for Annotation {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    fn display_name(&self) -> Option<&str> {
        self.user_info.as_ref()?.display_name.as_deref()
    }

    fn tags(&self) -> Vec<&str> {
        self.tags
            .iter()
            .flatten()
            .map(String::as_str)
            .collect()
    }

    fn quotes(&self) -> Vec<&str> {
        self.target
            .iter()
            .flatten()
            .filter_map(|target| target.selector.as_ref())
            .flatten()
            .filter_map(|selector| selector.exact.as_deref())
            .collect()
    }

    fn updated(&self) -> Option<&str> {
        self.updated.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn username_strips_scheme_and_domain() {
        assert_eq!(username("acct:poe@example.com"), "poe");
        assert_eq!(username("acct:first.last@sub.example.org"), "first.last");
    }

    #[test]
    fn username_passes_through_other_shapes() {
        assert_eq!(username("poe@example.com"), "poe@example.com");
        assert_eq!(username("acct:nodomain"), "acct:nodomain");
        assert_eq!(username(""), "");
    }

    #[test]
    fn deserializes_full_record() {
        let ann: Annotation = serde_json::from_value(json!({
            "id": "a1",
            "text": "Tiger burning bright",
            "uri": "https://example.com/blake",
            "user": "acct:poe@example.com",
            "user_info": { "display_name": "Edgar Poe" },
            "tags": ["poetry", "Blake"],
            "target": [{
                "source": "https://example.com/blake",
                "selector": [
                    { "type": "TextPositionSelector", "start": 1, "end": 9 },
                    { "type": "TextQuoteSelector", "exact": "The Tiger" }
                ]
            }],
            "updated": "2024-01-29T10:00:00.000000+00:00",
            "permissions": { "read": ["group:__world__"] }
        }))
        .unwrap();

        assert_eq!(ann.id(), Some("a1"));
        assert_eq!(ann.display_name(), Some("Edgar Poe"));
        assert_eq!(ann.tags(), vec!["poetry", "Blake"]);
        assert_eq!(ann.quotes(), vec!["The Tiger"]);
        assert_eq!(ann.updated(), Some("2024-01-29T10:00:00.000000+00:00"));
    }

    #[test]
    fn nulls_and_missing_members_are_absent() {
        let ann: Annotation = serde_json::from_value(json!({
            "text": null,
            "tags": null,
            "target": [{ "source": "x" }, { "selector": null }, { "selector": [{}] }],
            "user_info": { "display_name": null }
        }))
        .unwrap();

        assert_eq!(ann.id(), None);
        assert_eq!(ann.text(), None);
        assert!(ann.tags().is_empty());
        assert!(ann.quotes().is_empty());
        assert_eq!(ann.display_name(), None);
    }

    #[test]
    fn numeric_ids_read_as_text() {
        let ann: Annotation = serde_json::from_value(json!({ "id": 7, "text": "seven" })).unwrap();
        assert_eq!(ann.id(), Some("7"));
    }

    #[test]
    fn mistyped_members_are_absent() {
        let ann: Annotation = serde_json::from_value(json!({
            "id": "m1",
            "text": ["not", "a", "string"],
            "uri": true,
            "user": { "name": "poe" },
            "user_info": "Edgar Poe",
            "tags": "poetry",
            "updated": false
        }))
        .unwrap();

        assert_eq!(ann.id(), Some("m1"));
        assert_eq!(ann.text(), None);
        assert_eq!(ann.uri(), None);
        assert_eq!(ann.user(), None);
        assert_eq!(ann.display_name(), None);
        assert!(ann.tags().is_empty());
        assert_eq!(ann.updated(), None);
    }

    #[test]
    fn bad_list_entries_are_dropped() {
        let ann: Annotation = serde_json::from_value(json!({
            "id": "m2",
            "tags": ["x", null, 3, { "tag": "y" }],
            "target": [
                null,
                "https://example.com",
                { "selector": [null, { "exact": "kept" }, { "exact": 5 }] }
            ]
        }))
        .unwrap();

        assert_eq!(ann.tags(), vec!["x", "3"]);
        assert_eq!(ann.quotes(), vec!["kept", "5"]);
    }

    #[test]
    fn lone_target_object_counts_as_one() {
        let ann: Annotation = serde_json::from_value(json!({
            "id": "m3",
            "target": { "selector": { "exact": "solo" } }
        }))
        .unwrap();
        assert_eq!(ann.quotes(), vec!["solo"]);

        let empty: Annotation =
            serde_json::from_value(json!({ "id": "m4", "target": { "selector": [] } })).unwrap();
        assert!(empty.quotes().is_empty());
    }

    #[test]
    fn builder_sets_fields() {
        let ann = Annotation::new("b")
            .with_uri("https://example.com")
            .with_quote("first")
            .with_quote("second")
            .with_display_name("Bee");

        assert_eq!(ann.quotes(), vec!["first", "second"]);
        assert_eq!(ann.display_name(), Some("Bee"));
        assert_eq!(
            ann.target.as_ref().unwrap()[0].source.as_deref(),
            Some("https://example.com")
        );
    }

    #[test]
    fn serialization_skips_absent_members() {
        let value = serde_json::to_value(Annotation::new("c").with_text("hi")).unwrap();
        assert_eq!(value, json!({ "id": "c", "text": "hi" }));
    }
}
