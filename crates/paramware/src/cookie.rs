//! Request cookie parsing and the cookie-record field type.

use std::collections::HashMap;

/// A single parsed request cookie.
///
/// Fields declared with the cookie-record shape receive the named cookie
/// directly; string and byte-sequence fields receive its serialized
/// `name=value` form instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cookie {
    name: String,
    value: String,
}

impl Cookie {
    /// Creates a new cookie.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The cookie name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The cookie value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The serialized `name=value` form.
    #[must_use]
    pub fn serialized(&self) -> String {
        format!("{}={}", self.name, self.value)
    }

    pub(crate) fn is_unset(&self) -> bool {
        self.name.is_empty() && self.value.is_empty()
    }
}

/// All cookies parsed from a request's `Cookie` header.
#[derive(Debug, Clone, Default)]
pub(crate) struct CookieJar {
    cookies: HashMap<String, String>,
}

impl CookieJar {
    /// Parses a `Cookie` header value. Surrounding whitespace and quotes
    /// are trimmed from values.
    pub(crate) fn parse(header_value: &str) -> Self {
        let mut cookies = HashMap::new();
        for cookie in header_value.split(';') {
            if let Some((name, value)) = cookie.trim().split_once('=') {
                let name = name.trim();
                let value = value.trim().trim_matches('"');
                cookies.insert(name.to_owned(), value.to_owned());
            }
        }
        Self { cookies }
    }

    pub(crate) fn get(&self, name: &str) -> Option<Cookie> {
        self.cookies
            .get(name)
            .map(|value| Cookie::new(name, value.clone()))
    }
}
