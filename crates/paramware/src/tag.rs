//! Tag grammar parser for binding annotations.
//!
//! An annotation is a comma-separated list of options. Each option is
//! either a bare key (`required`) or a `key(value)` pair (`len(3:6)`),
//! where the value is the text between the first `(` and the trailing
//! character, which is stripped.
//!
//! Malformed parenthesis forms degrade to a bare key equal to the full
//! option text (`len()` becomes the key `"len()"`). Existing annotation
//! corpora rely on this fallback, so it is preserved exactly. Key legality
//! is not checked here; that is the schema compiler's job.

use std::collections::HashMap;

/// Parses one annotation string into a key→value map.
///
/// Bare keys map to the empty string; duplicate keys keep the last value.
///
/// # Example
///
/// ```rust
/// use paramware::tag::parse_tag;
///
/// let opts = parse_tag("type(path),required,desc(banana)");
/// assert_eq!(opts.get("type").map(String::as_str), Some("path"));
/// assert_eq!(opts.get("required").map(String::as_str), Some(""));
/// assert_eq!(opts.get("desc").map(String::as_str), Some("banana"));
/// ```
#[must_use]
pub fn parse_tag(tag: &str) -> HashMap<String, String> {
    let mut options = HashMap::new();
    for option in tag.split(',') {
        let parts: Vec<&str> = option.split('(').collect();
        if parts.len() == 2 && parts[1].chars().count() > 1 {
            let mut value = parts[1].chars();
            value.next_back();
            options.insert(parts[0].to_owned(), value.as_str().to_owned());
        } else {
            options.insert(option.to_owned(), String::new());
        }
    }
    options
}
