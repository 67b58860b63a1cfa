//! # Paramware
//!
//! Tag-driven binding of HTTP request parameters onto typed records.
//!
//! A record declares, per field, which request channel its value comes
//! from and which constraints it must satisfy. The annotations are
//! compiled once per type into a [`Schema`]; a shared [`Binder`] then
//! fills records from live requests, coercing source strings to the
//! field's type and validating fail-fast.
//!
//! ## Channels
//!
//! | Channel | Source | Notes |
//! |----------|--------|-------|
//! | `path` | Matched URL path segments | Always required |
//! | `query` | URL query string | Repeats feed slice fields |
//! | `formData` | Urlencoded or multipart body | Files via [`UploadedFile`] |
//! | `body` | Raw request body | One [`Payload<T>`] field, JSON by default |
//! | `header` | Request headers | Repeats feed slice fields |
//! | `cookie` | `Cookie` header | [`Cookie`], `String` or `Vec<u8>` fields |
//!
//! ## Example
//!
//! ```rust,ignore
//! use paramware::{BindContext, Bindable, Binder};
//!
//! #[derive(Default, Bindable)]
//! struct GetUser {
//!     #[param("type(path),desc(user id)")]
//!     user_id: u64,
//!
//!     #[param("type(query),len(1:32)")]
//!     #[regex("^[a-z_]+$")]
//!     view: String,
//! }
//!
//! let binder = Binder::new();
//! let call: GetUser = binder.bind(&ctx, "/users/{user_id}").await?;
//! ```
//!
//! ## Error Handling
//!
//! Schema problems surface as [`SchemaError`] when a type is first
//! compiled; per-request problems surface as [`BindError`], which maps to
//! an HTTP status through [`BindError::status_code`]. Validation messages
//! follow a fixed `{field} {reason}` form (`"p too short"`) unless the
//! field declares a custom message.

#![doc(html_root_url = "https://docs.rs/paramware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bind;
mod blueprint;
mod cache;
mod coerce;
mod context;
mod cookie;
mod error;
mod file;
pub mod naming;
mod pattern;
mod schema;
mod shape;
pub mod tag;
mod validate;

pub use bind::{json_body_decoder, Binder, BodyDecodeFn};
pub use blueprint::{Bindable, Blueprint, FieldDecl, FieldPath};
pub use cache::SchemaCache;
pub use context::{BindContext, BindContextBuilder};
pub use cookie::Cookie;
pub use error::{
    BindError, CoerceError, DecodeError, SchemaError, ValidationError, ValidationKind,
};
pub use file::UploadedFile;
pub use naming::{to_snake, NamingFn};
pub use pattern::{decode_segments, PathDecodeFn, PathParams};
pub use schema::{Channel, Constraints, FieldSpec, Schema, DEFAULT_MAX_MEMORY, IGNORE_TAG};
pub use shape::{
    BindValue, BodySlot, ListSlot, Payload, ScalarKind, ScalarSlot, Shape, SlotMut,
};
pub use validate::validate;

/// Derives [`Bindable`] for a named-field struct.
///
/// Fields opt in with `#[param("...")]`; unannotated fields are skipped.
/// `#[regex("...")]` and `#[errmsg("...")]` attach a pattern constraint
/// and a custom failure message, and `#[embed]` flattens a nested
/// bindable record into the parent.
pub use paramware_macros::Bindable;
