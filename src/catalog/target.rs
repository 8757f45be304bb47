//! Upstream URL construction.
//!
//! The inbound request is reduced to path segments plus a grouped query
//! mapping, then rebuilt under the upstream base. Keys keep the order in
//! which they first appeared; repeated keys (`includes[]`) keep every value
//! in order.

use url::Url;

/// Query key reserved for the catch-all path and never forwarded.
pub const PATH_KEY: &str = "path";

/// Value of a single query key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    Multi(Vec<String>),
}

impl QueryValue {
    fn push(&mut self, value: String) {
        match self {
            QueryValue::Single(first) => {
                let first = std::mem::take(first);
                *self = QueryValue::Multi(vec![first, value]);
            }
            QueryValue::Multi(values) => values.push(value),
        }
    }

    /// Values in forwarding order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            QueryValue::Single(value) => std::slice::from_ref(value),
            QueryValue::Multi(values) => values,
        };
        slice.iter().map(String::as_str)
    }
}

/// Query parameters to forward, grouped by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardQuery {
    entries: Vec<(String, QueryValue)>,
}

impl ForwardQuery {
    /// Parse a raw (still percent-encoded) query string.
    pub fn parse(raw: &str) -> Self {
        let mut query = Self::default();
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            query.append(key.into_owned(), value.into_owned());
        }
        query
    }

    /// Append one occurrence of `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => existing.push(value),
            None => self.entries.push((key, QueryValue::Single(value))),
        }
    }

    /// Set `key` to an explicit value, replacing any earlier occurrences.
    pub fn insert(&mut self, key: impl Into<String>, value: QueryValue) {
        let key = key.into();
        self.remove(&key);
        self.entries.push((key, value));
    }

    pub fn remove(&mut self, key: &str) -> Option<QueryValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flattened `(key, value)` pairs in forwarding order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(key, value)| value.values().map(move |v| (key.as_str(), v)))
    }
}

/// Split a catch-all path capture into segments, dropping empty ones.
pub fn split_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Rebuild the upstream URL for a forwarded request.
///
/// Segments are percent-encoded individually; the `path` key is never
/// forwarded even if the caller sent one.
pub fn build_upstream_url(
    base: &str,
    segments: &[String],
    query: &ForwardQuery,
) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?;
    url.set_query(None);
    url.set_fragment(None);

    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(segments);

    let mut pairs = query.pairs().filter(|(key, _)| *key != PATH_KEY).peekable();
    if pairs.peek().is_some() {
        url.query_pairs_mut().extend_pairs(pairs);
    }

    Ok(url)
}
