//! Static classification of bindable field types.
//!
//! Every destination a request value can be bound into is described by a
//! [`Shape`], resolved once per field at schema compilation time. At bind
//! time a live field is viewed through a [`SlotMut`], a closed
//! tagged-variant enum the coercion engine and validator switch on. No
//! open-ended type introspection happens per request.

use serde::de::DeserializeOwned;
use std::any::Any;

use crate::cookie::Cookie;
use crate::error::DecodeError;
use crate::file::UploadedFile;

/// Scalar destination kinds with a canonical textual grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ScalarKind {
    String,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl ScalarKind {
    /// The kind's name as used in coercion error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    /// Whether the kind is an integer or floating-point number.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        !matches!(self, Self::String | Self::Bool)
    }
}

/// Closed classification of a field's destination type.
///
/// Drives both coercion and the schema compiler's shape/channel legality
/// checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A single scalar value.
    Scalar(ScalarKind),
    /// A list of scalar values, one per source string.
    List(ScalarKind),
    /// An uploaded file; legal only on the `formData` channel.
    File,
    /// A cookie record; legal only on the `cookie` channel.
    Cookie,
    /// A nested record decoded from the raw body; legal only on the
    /// `body` channel.
    Record,
}

impl Shape {
    /// Whether `len`/pattern constraints are legal on this shape.
    #[must_use]
    pub fn is_string(self) -> bool {
        matches!(
            self,
            Self::Scalar(ScalarKind::String) | Self::List(ScalarKind::String)
        )
    }

    /// Whether `range` constraints are legal on this shape.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        match self {
            Self::Scalar(kind) | Self::List(kind) => kind.is_numeric(),
            _ => false,
        }
    }

    /// Whether this shape may be bound from the `cookie` channel.
    ///
    /// The whitelist is the cookie record itself, a string (serialized
    /// cookie) or a byte sequence (serialized cookie bytes).
    #[must_use]
    pub fn is_cookie_compatible(self) -> bool {
        matches!(
            self,
            Self::Cookie | Self::Scalar(ScalarKind::String) | Self::List(ScalarKind::U8)
        )
    }
}

/// Mutable view of a scalar field slot.
#[derive(Debug)]
#[allow(missing_docs)]
pub enum ScalarSlot<'a> {
    String(&'a mut String),
    Bool(&'a mut bool),
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    F32(&'a mut f32),
    F64(&'a mut f64),
}

/// Mutable view of a slice-of-scalar field slot.
#[derive(Debug)]
#[allow(missing_docs)]
pub enum ListSlot<'a> {
    String(&'a mut Vec<String>),
    Bool(&'a mut Vec<bool>),
    I8(&'a mut Vec<i8>),
    I16(&'a mut Vec<i16>),
    I32(&'a mut Vec<i32>),
    I64(&'a mut Vec<i64>),
    U8(&'a mut Vec<u8>),
    U16(&'a mut Vec<u16>),
    U32(&'a mut Vec<u32>),
    U64(&'a mut Vec<u64>),
    F32(&'a mut Vec<f32>),
    F64(&'a mut Vec<f64>),
}

/// Type-erased view of a `body` field slot.
///
/// Pairs the erased target with a monomorphized JSON decode hook so the
/// pluggable body decoder can either take the default JSON path via
/// [`BodySlot::decode_json`] or downcast to a concrete type it knows.
pub struct BodySlot<'a> {
    target: &'a mut dyn Any,
    decode_json: fn(&mut dyn Any, &[u8]) -> Result<(), DecodeError>,
}

impl<'a> BodySlot<'a> {
    /// Creates a body slot over a deserializable target.
    pub fn new<T: DeserializeOwned + 'static>(target: &'a mut T) -> Self {
        Self {
            target,
            decode_json: |any, body| {
                let target = any
                    .downcast_mut::<T>()
                    .ok_or_else(|| DecodeError::new("body slot type mismatch"))?;
                *target = serde_json::from_slice(body).map_err(DecodeError::new)?;
                Ok(())
            },
        }
    }

    /// Decodes the raw body as JSON into the slot.
    pub fn decode_json(&mut self, body: &[u8]) -> Result<(), DecodeError> {
        (self.decode_json)(self.target, body)
    }

    /// Downcasts the slot to a concrete target type.
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.target.downcast_mut()
    }
}

impl std::fmt::Debug for BodySlot<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BodySlot").finish_non_exhaustive()
    }
}

/// Mutable view of one live field slot, resolved per bind call.
#[derive(Debug)]
pub enum SlotMut<'a> {
    /// A scalar destination.
    Scalar(ScalarSlot<'a>),
    /// A slice-of-scalar destination.
    List(ListSlot<'a>),
    /// An uploaded-file destination.
    File(&'a mut UploadedFile),
    /// A cookie-record destination.
    Cookie(&'a mut Cookie),
    /// A body-decoded record destination.
    Record(BodySlot<'a>),
}

impl SlotMut<'_> {
    /// The string value of the slot, when the slot is a string scalar.
    ///
    /// Slice shapes intentionally yield `None`: constraints whose
    /// applicability does not match the value's shape are skipped.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(ScalarSlot::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The numeric value of the slot as `f64`, when the slot is a numeric
    /// scalar.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_lossless)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Scalar(ScalarSlot::I8(v)) => Some(f64::from(**v)),
            Self::Scalar(ScalarSlot::I16(v)) => Some(f64::from(**v)),
            Self::Scalar(ScalarSlot::I32(v)) => Some(f64::from(**v)),
            Self::Scalar(ScalarSlot::I64(v)) => Some(**v as f64),
            Self::Scalar(ScalarSlot::U8(v)) => Some(f64::from(**v)),
            Self::Scalar(ScalarSlot::U16(v)) => Some(f64::from(**v)),
            Self::Scalar(ScalarSlot::U32(v)) => Some(f64::from(**v)),
            Self::Scalar(ScalarSlot::U64(v)) => Some(**v as f64),
            Self::Scalar(ScalarSlot::F32(v)) => Some(f64::from(**v)),
            Self::Scalar(ScalarSlot::F64(v)) => Some(**v),
            _ => None,
        }
    }

    /// Whether the slot holds its shape's zero value.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Scalar(scalar) => match scalar {
                ScalarSlot::String(v) => v.is_empty(),
                ScalarSlot::Bool(v) => !**v,
                ScalarSlot::I8(v) => **v == 0,
                ScalarSlot::I16(v) => **v == 0,
                ScalarSlot::I32(v) => **v == 0,
                ScalarSlot::I64(v) => **v == 0,
                ScalarSlot::U8(v) => **v == 0,
                ScalarSlot::U16(v) => **v == 0,
                ScalarSlot::U32(v) => **v == 0,
                ScalarSlot::U64(v) => **v == 0,
                ScalarSlot::F32(v) => **v == 0.0,
                ScalarSlot::F64(v) => **v == 0.0,
            },
            Self::List(list) => match list {
                ListSlot::String(v) => v.is_empty(),
                ListSlot::Bool(v) => v.is_empty(),
                ListSlot::I8(v) => v.is_empty(),
                ListSlot::I16(v) => v.is_empty(),
                ListSlot::I32(v) => v.is_empty(),
                ListSlot::I64(v) => v.is_empty(),
                ListSlot::U8(v) => v.is_empty(),
                ListSlot::U16(v) => v.is_empty(),
                ListSlot::U32(v) => v.is_empty(),
                ListSlot::U64(v) => v.is_empty(),
                ListSlot::F32(v) => v.is_empty(),
                ListSlot::F64(v) => v.is_empty(),
            },
            Self::File(file) => file.is_unset(),
            Self::Cookie(cookie) => cookie.is_unset(),
            Self::Record(_) => false,
        }
    }
}

/// Types usable as bindable record fields.
///
/// Maps the type to its [`Shape`] once, and exposes the live field as a
/// [`SlotMut`] at bind time. Implemented for the supported scalars, their
/// `Vec` forms, [`UploadedFile`], [`Cookie`] and [`Payload`].
pub trait BindValue {
    /// The static shape of this destination type.
    const SHAPE: Shape;

    /// Views the live field as a mutable slot.
    fn slot_mut(&mut self) -> SlotMut<'_>;
}

macro_rules! impl_bind_value_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl BindValue for $ty {
                const SHAPE: Shape = Shape::Scalar(ScalarKind::$variant);

                fn slot_mut(&mut self) -> SlotMut<'_> {
                    SlotMut::Scalar(ScalarSlot::$variant(self))
                }
            }

            impl BindValue for Vec<$ty> {
                const SHAPE: Shape = Shape::List(ScalarKind::$variant);

                fn slot_mut(&mut self) -> SlotMut<'_> {
                    SlotMut::List(ListSlot::$variant(self))
                }
            }
        )*
    };
}

impl_bind_value_scalar! {
    String => String,
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

impl BindValue for UploadedFile {
    const SHAPE: Shape = Shape::File;

    fn slot_mut(&mut self) -> SlotMut<'_> {
        SlotMut::File(self)
    }
}

impl BindValue for Cookie {
    const SHAPE: Shape = Shape::Cookie;

    fn slot_mut(&mut self) -> SlotMut<'_> {
        SlotMut::Cookie(self)
    }
}

/// Wrapper marking a field as the body-decoded record.
///
/// The inner type is filled by the binder's body decode function (JSON by
/// default). A schema may declare at most one such field, on the `body`
/// channel.
///
/// # Example
///
/// ```rust
/// use paramware::Payload;
/// use serde::Deserialize;
///
/// #[derive(Debug, Default, Deserialize)]
/// struct CreateUser {
///     name: String,
/// }
///
/// let payload: Payload<CreateUser> = Payload::default();
/// assert_eq!(payload.name, "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload<T>(pub T);

impl<T> Payload<T> {
    /// Consumes the wrapper and returns the decoded record.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Payload<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> std::ops::DerefMut for Payload<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T: DeserializeOwned + 'static> BindValue for Payload<T> {
    const SHAPE: Shape = Shape::Record;

    fn slot_mut(&mut self) -> SlotMut<'_> {
        SlotMut::Record(BodySlot::new(&mut self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_shape_classification() {
        assert!(Shape::Scalar(ScalarKind::String).is_string());
        assert!(Shape::List(ScalarKind::String).is_string());
        assert!(!Shape::Scalar(ScalarKind::U32).is_string());

        assert!(Shape::Scalar(ScalarKind::F32).is_numeric());
        assert!(Shape::List(ScalarKind::I64).is_numeric());
        assert!(!Shape::Scalar(ScalarKind::Bool).is_numeric());
        assert!(!Shape::File.is_numeric());
    }

    #[test]
    fn test_cookie_whitelist() {
        assert!(Shape::Cookie.is_cookie_compatible());
        assert!(Shape::Scalar(ScalarKind::String).is_cookie_compatible());
        assert!(Shape::List(ScalarKind::U8).is_cookie_compatible());
        assert!(!Shape::Scalar(ScalarKind::U64).is_cookie_compatible());
        assert!(!Shape::File.is_cookie_compatible());
    }

    #[test]
    fn test_static_shapes() {
        assert_eq!(String::SHAPE, Shape::Scalar(ScalarKind::String));
        assert_eq!(<Vec<f64>>::SHAPE, Shape::List(ScalarKind::F64));
        assert_eq!(UploadedFile::SHAPE, Shape::File);
        assert_eq!(Cookie::SHAPE, Shape::Cookie);
    }

    #[test]
    fn test_slot_probes() {
        let mut s = String::from("abc");
        let slot = s.slot_mut();
        assert_eq!(slot.as_str(), Some("abc"));
        assert_eq!(slot.as_f64(), None);
        assert!(!slot.is_zero());

        let mut n = 0_u32;
        let slot = n.slot_mut();
        assert_eq!(slot.as_f64(), Some(0.0));
        assert!(slot.is_zero());

        let mut v: Vec<String> = vec!["x".into()];
        let slot = v.slot_mut();
        // Slice shapes are not string-convertible for constraint purposes.
        assert_eq!(slot.as_str(), None);
        assert!(!slot.is_zero());
    }

    #[test]
    fn test_body_slot_decode_json() {
        #[derive(Debug, Default, PartialEq, Deserialize)]
        struct Doc {
            id: u32,
        }

        let mut payload: Payload<Doc> = Payload::default();
        let SlotMut::Record(mut slot) = payload.slot_mut() else {
            panic!("payload must expose a record slot");
        };
        slot.decode_json(br#"{"id": 7}"#).unwrap();
        assert_eq!(payload.id, 7);
    }

    #[test]
    fn test_body_slot_rejects_malformed_json() {
        #[derive(Debug, Default, Deserialize)]
        struct Doc {
            #[allow(dead_code)]
            id: u32,
        }

        let mut payload: Payload<Doc> = Payload::default();
        let SlotMut::Record(mut slot) = payload.slot_mut() else {
            panic!("payload must expose a record slot");
        };
        assert!(slot.decode_json(b"{oops").is_err());
    }
}
