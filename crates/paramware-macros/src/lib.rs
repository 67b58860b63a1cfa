//! Procedural macros for paramware records.
//!
//! This crate provides the `#[derive(Bindable)]` macro that turns an
//! annotated struct into a bindable record. The derive emits the record's
//! static blueprint and the index-path slot resolver; all annotation
//! semantics (tag grammar, channel legality, constraints) stay in the
//! runtime crate's schema compiler, so a malformed annotation string is a
//! schema error at first use, not a compile error here.
//!
//! # Example
//!
//! ```rust,ignore
//! use paramware::{Bindable, Payload, UploadedFile};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct CreateNote {
//!     text: String,
//! }
//!
//! #[derive(Default, Bindable)]
//! struct CreateNoteCall {
//!     #[param("type(path),desc(notebook id)")]
//!     notebook_id: u64,
//!
//!     #[param("type(header),required,len(8:128)")]
//!     authorization: String,
//!
//!     #[param("type(body),required")]
//!     note: Payload<CreateNote>,
//! }
//! ```

mod expand;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives the `Bindable` trait for a named-field struct.
///
/// # Field attributes
///
/// - `#[param("...")]`: the binding annotation; fields without it are
///   not bound. The string is the tag grammar understood by the runtime
///   crate (`type(query),required,len(3:6)` and so on).
/// - `#[regex("...")]`: pattern constraint for string fields.
/// - `#[errmsg("...")]`: custom message replacing any validation
///   failure message for this field.
/// - `#[embed]`: flattens a nested `Bindable` record into this one.
#[proc_macro_derive(Bindable, attributes(param, regex, errmsg, embed))]
pub fn derive_bindable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand::derive(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
