//! Path parameter decoding against a route pattern.
//!
//! Binding a record with `path` fields needs the matched route pattern and
//! a decode function extracting named segment values from the concrete
//! request path. The decode function is pluggable, so an embedding router
//! can hand over its own match results; [`decode_segments`] is the default
//! for `{name}` segment patterns.

use smallvec::SmallVec;

/// Maximum number of path parameters stored inline.
const INLINE_PARAMS: usize = 4;

/// Named path parameters decoded from one request path.
///
/// Small-vector backed; typical routes carry one to four parameters.
///
/// # Example
///
/// ```rust
/// use paramware::PathParams;
///
/// let mut params = PathParams::new();
/// params.push("id", "123");
/// assert_eq!(params.get("id"), Some("123"));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathParams {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl PathParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the value of a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true when no parameters were decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The number of decoded parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterates over `(name, value)` pairs in decode order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

/// Function decoding named path parameters from a request path and the
/// route pattern it matched.
pub type PathDecodeFn = fn(path: &str, pattern: &str) -> PathParams;

/// Default path decoder for `{name}` segment patterns.
///
/// Walks path and pattern segment by segment; a `{name}` pattern segment
/// captures the corresponding path segment. Literal segments must match
/// exactly and segment counts must agree, otherwise no parameters are
/// returned.
///
/// # Example
///
/// ```rust
/// use paramware::decode_segments;
///
/// let params = decode_segments("/users/42/posts/7", "/users/{uid}/posts/{pid}");
/// assert_eq!(params.get("uid"), Some("42"));
/// assert_eq!(params.get("pid"), Some("7"));
/// ```
#[must_use]
pub fn decode_segments(path: &str, pattern: &str) -> PathParams {
    let path_segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let pattern_segments: Vec<&str> = pattern.trim_matches('/').split('/').collect();

    if path_segments.len() != pattern_segments.len() {
        return PathParams::new();
    }

    let mut params = PathParams::new();
    for (actual, expected) in path_segments.iter().zip(&pattern_segments) {
        if let Some(name) = expected
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
        {
            params.push(name, *actual);
        } else if actual != expected {
            return PathParams::new();
        }
    }
    params
}
