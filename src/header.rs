//! Multi-valued header lists.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The value every CORS field falls back to when left unconfigured.
pub const WILDCARD: &str = "*";

/// An ordered list of header values rendered as one comma-separated value.
///
/// ```rust
/// use strata::HeaderList;
///
/// assert_eq!(HeaderList::from(["GET", "POST"]).to_header_value(), "GET, POST");
/// assert_eq!(HeaderList::default().to_header_value(), "");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderList(Vec<String>);

impl HeaderList {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    /// A fresh `["*"]` list. Each call allocates its own list.
    pub fn wildcard() -> Self {
        Self(vec![WILDCARD.to_owned()])
    }

    /// Joins the entries with `", "`. An empty list renders as `""`.
    pub fn to_header_value(&self) -> String {
        self.0.join(", ")
    }

    /// The entries in order, before joining.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for HeaderList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_header_value())
    }
}

impl From<Vec<String>> for HeaderList {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl<const N: usize> From<[&str; N]> for HeaderList {
    fn from(values: [&str; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for HeaderList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
