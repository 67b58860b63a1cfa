//! Error types for schema compilation, binding and validation.
//!
//! Three failure families exist, mirroring the three phases of the engine:
//!
//! - [`SchemaError`]: raised while compiling a record type's annotations
//!   into a [`Schema`](crate::Schema). Fatal for that type; never cached.
//! - [`BindError`]: raised while binding one request onto a record.
//! - [`ValidationError`]: a bind-time specialization carrying a fixed
//!   failure kind (`too short`, `not set`, ...) or a per-field custom
//!   message.
//!
//! All failures are ordinary error values; nothing crosses the bind
//! boundary as a panic.

use http::StatusCode;
use std::fmt;
use thiserror::Error;

use crate::schema::Channel;

/// Error produced while compiling a record type into a binding schema.
///
/// Names the record type, the offending field (`"*"` for type-level
/// failures) and a human-readable reason.
///
/// # Example
///
/// ```rust
/// use paramware::SchemaError;
///
/// let err = SchemaError::new("demo::Login", "token", "invalid param type");
/// assert_eq!(err.to_string(), "demo::Login.token: invalid param type");
/// ```
#[derive(Debug, Clone, Error)]
#[error("{type_name}.{field}: {reason}")]
pub struct SchemaError {
    type_name: String,
    field: String,
    reason: String,
}

impl SchemaError {
    /// Creates a new schema error.
    #[must_use]
    pub fn new(
        type_name: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The record type the schema was compiled for.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The offending field identifier, or `"*"` for type-level failures.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The failure reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Error produced when a source string cannot be converted into the
/// destination field's scalar kind.
#[derive(Debug, Clone, Error)]
#[error("cannot parse `{text}` as {kind}")]
pub struct CoerceError {
    kind: &'static str,
    text: String,
}

impl CoerceError {
    pub(crate) fn new(kind: &'static str, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// The destination kind that rejected the input (e.g. `"u32"`).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The offending source text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Error produced by a body decode function.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct DecodeError(pub String);

impl DecodeError {
    /// Creates a decode error from any displayable cause.
    #[must_use]
    pub fn new(cause: impl fmt::Display) -> Self {
        Self(cause.to_string())
    }
}

/// Fixed validation failure kinds, plus the per-field custom override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationKind {
    /// String shorter than the declared minimum length.
    TooShort,
    /// String longer than the declared maximum length.
    TooLong,
    /// Numeric value below the declared minimum.
    TooSmall,
    /// Numeric value above the declared maximum.
    TooBig,
    /// Value equals its shape's zero value despite `nonzero`.
    NotSet,
    /// String does not match the declared pattern.
    NotMatch,
    /// The field's custom error message, replacing any of the above.
    Custom(String),
}

impl ValidationKind {
    fn suffix(&self) -> &str {
        match self {
            Self::TooShort => "too short",
            Self::TooLong => "too long",
            Self::TooSmall => "too small",
            Self::TooBig => "too big",
            Self::NotSet => "not set",
            Self::NotMatch => "not match",
            Self::Custom(msg) => msg,
        }
    }
}

/// A validation constraint failure for one field.
///
/// Displays as `"{field} {suffix}"` (for example `"p too short"`), or as
/// the bare custom message when the field declares one.
#[derive(Debug, Clone, Error)]
pub struct ValidationError {
    field: String,
    kind: ValidationKind,
}

impl ValidationError {
    /// Creates a validation error for a field.
    #[must_use]
    pub fn new(field: impl Into<String>, kind: ValidationKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    /// The wire-level field name.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The failure kind.
    #[must_use]
    pub fn kind(&self) -> &ValidationKind {
        &self.kind
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValidationKind::Custom(msg) => write!(f, "{msg}"),
            kind => write!(f, "{} {}", self.field, kind.suffix()),
        }
    }
}

/// Error produced while binding one request onto a record.
///
/// Carries the schema's type name and the field name; `"*"` marks
/// request-level failures, `"?"` marks intercepted internal faults.
#[derive(Debug, Error)]
pub enum BindError {
    /// A required parameter was absent from its source channel.
    #[error("{schema}.{field}: missing {channel} param")]
    Missing {
        /// Record type name.
        schema: &'static str,
        /// Wire-level field name.
        field: String,
        /// The channel the value was expected on.
        channel: Channel,
    },

    /// A source string could not be coerced to the field's shape.
    #[error("{schema}.{field}: {source}")]
    Coerce {
        /// Record type name.
        schema: &'static str,
        /// Wire-level field name.
        field: String,
        /// The underlying coercion failure.
        source: CoerceError,
    },

    /// Decoding request material (body, form, multipart) failed.
    #[error("{schema}.{field}: {reason}")]
    Decode {
        /// Record type name.
        schema: &'static str,
        /// Wire-level field name, or `"*"` for request-level failures.
        field: String,
        /// The failure reason.
        reason: String,
    },

    /// The request body exceeded the schema's memory ceiling.
    #[error("{schema}.{field}: payload too large: max {max} bytes, got {actual}")]
    PayloadTooLarge {
        /// Record type name.
        schema: &'static str,
        /// Wire-level field name.
        field: String,
        /// Effective ceiling in bytes.
        max: u64,
        /// Observed body size in bytes.
        actual: u64,
    },

    /// An internal invariant broke during binding; converted at the bind
    /// boundary instead of propagating as a fault.
    #[error("{schema}.?: {reason}")]
    Internal {
        /// Record type name.
        schema: &'static str,
        /// The failure reason.
        reason: String,
    },

    /// A field value failed its declared constraints.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// First-use compilation of the record's schema failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl BindError {
    pub(crate) fn missing(schema: &'static str, field: &str, channel: Channel) -> Self {
        Self::Missing {
            schema,
            field: field.to_owned(),
            channel,
        }
    }

    pub(crate) fn coerce(schema: &'static str, field: &str, source: CoerceError) -> Self {
        Self::Coerce {
            schema,
            field: field.to_owned(),
            source,
        }
    }

    pub(crate) fn decode(schema: &'static str, field: &str, reason: impl fmt::Display) -> Self {
        Self::Decode {
            schema,
            field: field.to_owned(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn internal(schema: &'static str, reason: impl Into<String>) -> Self {
        Self::Internal {
            schema,
            reason: reason.into(),
        }
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Missing { .. } | Self::Coerce { .. } | Self::Decode { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal { .. } | Self::Schema(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_display() {
        let err = SchemaError::new("demo::Login", "*", "duplicated `body` param");
        assert_eq!(err.to_string(), "demo::Login.*: duplicated `body` param");
        assert_eq!(err.field(), "*");
    }

    #[test]
    fn test_missing_param_display() {
        let err = BindError::missing("demo::Login", "user_id", Channel::FormData);
        assert_eq!(err.to_string(), "demo::Login.user_id: missing formData param");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("p", ValidationKind::TooShort);
        assert_eq!(err.to_string(), "p too short");

        let err = ValidationError::new("p", ValidationKind::Custom("bad password".into()));
        assert_eq!(err.to_string(), "bad password");
    }

    #[test]
    fn test_status_codes() {
        let err = BindError::Validation(ValidationError::new("a", ValidationKind::NotSet));
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let err = BindError::PayloadTooLarge {
            schema: "T",
            field: "f".into(),
            max: 1,
            actual: 2,
        };
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);

        let err = BindError::internal("T", "field path did not resolve");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "T.?: field path did not resolve");
    }

    #[test]
    fn test_coerce_error_display() {
        let err = CoerceError::new("u32", "abc");
        assert_eq!(err.to_string(), "cannot parse `abc` as u32");
    }
}
