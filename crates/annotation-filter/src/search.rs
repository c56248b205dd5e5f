//! Faceted search text.
//!
//! Converts what a user types into a search box, e.g.
//! `tag:poetry user:poe since:1week "burning bright"`, into a
//! [`FilterSpec`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::field::FieldKey;
use crate::op::Operator;
use crate::since::parse_age;
use crate::spec::FilterSpec;
use crate::term::FieldFilter;

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:[^\s"']+|"[^"]*"|'[^']*')+"#).expect("token pattern is valid")
});

/// Splits search text into tokens.
///
/// Whitespace separates tokens except inside single or double quotes. A
/// token wrapped in matching quotes loses them, and so does the value of a
/// `facet:value` token.
///
/// ```
/// use annotation_filter::tokenize;
///
/// assert_eq!(
///     tokenize(r#"tag:"two words" 'quoted phrase' plain"#),
///     vec!["tag:two words", "quoted phrase", "plain"]
/// );
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    TOKEN
        .find_iter(text)
        .map(|m| {
            let token = strip_quotes(m.as_str());
            match token.split_once(':') {
                Some((facet, value)) => format!("{facet}:{}", strip_quotes(value)),
                None => token.to_string(),
            }
        })
        .collect()
}

fn strip_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// Builds a filter specification from search text.
///
/// Recognized facets are `quote:`, `since:`, `tag:`, `text:`, `uri:` and
/// `user:`. Everything else searches the virtual `any` field. `uri` and
/// `user` terms are alternatives (`or`); all other fields require every term
/// (`and`). `focus_user`, when given, is always the first `user` term.
///
/// `since:` values are ages like `30`, `10min`, `2day` or `1year`; a value
/// that does not parse contributes nothing.
///
/// ```
/// use annotation_filter::{parse_search, FieldKey, Operator};
///
/// let spec = parse_search("tag:poetry since:1hour tiger", None);
/// assert_eq!(spec.get(FieldKey::Tag).unwrap().terms.len(), 1);
/// assert_eq!(spec.get(FieldKey::Any).unwrap().operator, Operator::And);
/// assert_eq!(spec.active().count(), 3);
/// ```
pub fn parse_search(text: &str, focus_user: Option<&str>) -> FilterSpec {
    let empty = |field| FieldFilter::new(default_operator(field), Vec::<String>::new());
    let mut any = empty(FieldKey::Any);
    let mut quote = empty(FieldKey::Quote);
    let mut since = empty(FieldKey::Since);
    let mut tag = empty(FieldKey::Tag);
    let mut text_filter = empty(FieldKey::Text);
    let mut uri = empty(FieldKey::Uri);
    let mut user = FieldFilter::new(default_operator(FieldKey::User), focus_user);

    for token in tokenize(text) {
        let Some((facet, value)) = token.split_once(':') else {
            any.push(token.as_str());
            continue;
        };
        match facet.parse::<FieldKey>() {
            Ok(FieldKey::Quote) => quote.push(value),
            Ok(FieldKey::Since) => match parse_age(value) {
                Some(secs) => since.push(secs),
                None => tracing::debug!(value, "ignoring malformed since: value"),
            },
            Ok(FieldKey::Tag) => tag.push(value),
            Ok(FieldKey::Text) => text_filter.push(value),
            Ok(FieldKey::Uri) => uri.push(value),
            Ok(FieldKey::User) => user.push(value),
            Ok(FieldKey::Any) | Err(_) => any.push(token.as_str()),
        }
    }

    FilterSpec::new()
        .field(FieldKey::Any, any)
        .field(FieldKey::Quote, quote)
        .field(FieldKey::Since, since)
        .field(FieldKey::Tag, tag)
        .field(FieldKey::Text, text_filter)
        .field(FieldKey::Uri, uri)
        .field(FieldKey::User, user)
}

/// Operator used for `field` by [`parse_search`].
pub fn default_operator(field: FieldKey) -> Operator {
    match field {
        FieldKey::Uri | FieldKey::User => Operator::Or,
        _ => Operator::And,
    }
}
