//! Naming function mapping field identifiers to wire parameter names.

/// Function deriving a wire-level parameter name from a field identifier.
///
/// Used whenever a field carries no explicit `name(...)` override.
pub type NamingFn = fn(&str) -> String;

/// Default naming function: ASCII camel/Pascal case to snake case.
///
/// # Example
///
/// ```rust
/// use paramware::naming::to_snake;
///
/// assert_eq!(to_snake("ColPrimary"), "col_primary");
/// assert_eq!(to_snake("userId"), "user_id");
/// assert_eq!(to_snake("already_snake"), "already_snake");
/// ```
#[must_use]
pub fn to_snake(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, ch) in ident.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case() {
        assert_eq!(to_snake("ColIsRequired"), "col_is_required");
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(to_snake("maxMemoryMb"), "max_memory_mb");
    }

    #[test]
    fn test_leading_upper_gets_no_separator() {
        assert_eq!(to_snake("Name"), "name");
    }

    #[test]
    fn test_snake_passthrough() {
        assert_eq!(to_snake("already_snake"), "already_snake");
        assert_eq!(to_snake(""), "");
    }
}
