//! Field access for filterable records.
//!
//! The evaluator never inspects a concrete record type. It reads fields
//! through [`Filterable`], which [`Annotation`](crate::Annotation) implements
//! and which callers can implement for their own annotation-like structs.

/// Trait for records that can be filtered.
///
/// Only [`Filterable::id`] is required. Every other accessor defaults to
/// "absent", which makes every term against that field fail.
///
/// # Manual Implementation
///
/// ```
/// use annotation_filter::{Evaluator, FilterSpec, Filterable, Operator};
///
/// struct Note {
///     id: String,
///     body: String,
/// }
///
/// impl Filterable for Note {
///     fn id(&self) -> Option<&str> {
///         Some(&self.id)
///     }
///
///     fn text(&self) -> Option<&str> {
///         Some(&self.body)
///     }
/// }
///
/// let notes = vec![
///     Note { id: "a".into(), body: "Café au lait".into() },
///     Note { id: "b".into(), body: "Black coffee".into() },
/// ];
///
/// let spec = FilterSpec::new().text(Operator::And, ["cafe"]);
/// let ids = Evaluator::new().filter(&notes, &spec).unwrap();
/// assert_eq!(ids, vec!["a"]);
/// ```
pub trait Filterable {
    /// Record identifier. `None` (or an empty string) marks a draft.
    fn id(&self) -> Option<&str>;

    /// Free text body.
    fn text(&self) -> Option<&str> {
        None
    }

    /// Resource locator.
    fn uri(&self) -> Option<&str> {
        None
    }

    /// Account identifier, conventionally `acct:<name>@<domain>`.
    fn user(&self) -> Option<&str> {
        None
    }

    /// Human readable name of the account.
    fn display_name(&self) -> Option<&str> {
        None
    }

    /// Tags, in record order.
    fn tags(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Quoted target text, one entry per selector carrying an `exact`.
    fn quotes(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Last-updated timestamp, unparsed.
    fn updated(&self) -> Option<&str> {
        None
    }

    /// Returns the identifier if this record is not a draft.
    fn published_id(&self) -> Option<&str> {
        self.id().filter(|id| !id.is_empty())
    }
}

impl<T: Filterable + ?Sized> Filterable for &T {
    fn id(&self) -> Option<&str> {
        (**self).id()
    }

    fn text(&self) -> Option<&str> {
        (**self).text()
    }

    fn uri(&self) -> Option<&str> {
        (**self).uri()
    }

    fn user(&self) -> Option<&str> {
        (**self).user()
    }

    fn display_name(&self) -> Option<&str> {
        (**self).display_name()
    }

    fn tags(&self) -> Vec<&str> {
        (**self).tags()
    }

    fn quotes(&self) -> Vec<&str> {
        (**self).quotes()
    }

    fn updated(&self) -> Option<&str> {
        (**self).updated()
    }
}
