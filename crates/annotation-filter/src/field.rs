//! The closed set of filterable fields.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A field a filter can target.
///
/// Every key except [`FieldKey::Since`] is matched by normalized substring
/// containment. [`FieldKey::Any`] is virtual: it spans several real fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKey {
    /// Every searchable text of the record, joined into one blob.
    Any,
    /// Quoted target text (`target[].selector[].exact`).
    Quote,
    /// Age threshold in seconds against `updated`.
    Since,
    /// Any entry of `tags`.
    Tag,
    /// Annotation body.
    Text,
    /// Annotated resource locator.
    Uri,
    /// Account local name or display name.
    User,
}

impl FieldKey {
    /// All keys, in wire-name order.
    pub const ALL: [FieldKey; 7] = [
        FieldKey::Any,
        FieldKey::Quote,
        FieldKey::Since,
        FieldKey::Tag,
        FieldKey::Text,
        FieldKey::Uri,
        FieldKey::User,
    ];

    /// Returns the wire name of this field.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::Any => "any",
            FieldKey::Quote => "quote",
            FieldKey::Since => "since",
            FieldKey::Tag => "tag",
            FieldKey::Text => "text",
            FieldKey::Uri => "uri",
            FieldKey::User => "user",
        }
    }

    /// Returns `true` if terms for this field are compared as text.
    pub fn is_textual(self) -> bool {
        !matches!(self, FieldKey::Since)
    }
}

/// Returned when a string names no supported field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported filter field '{0}'")]
pub struct UnsupportedField(pub String);

impl FromStr for FieldKey {
    type Err = UnsupportedField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnsupportedField(s.to_string()))
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
