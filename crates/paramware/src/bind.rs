//! The binding engine: pulls request data onto typed records.
//!
//! A [`Binder`] owns the naming function, the path and body decode hooks
//! and the schema cache. One binder is meant to be shared for the life of
//! the process; every bind call compiles the target record's schema at
//! most once and then walks its compiled fields in declaration order,
//! resolving each from its channel, coercing and validating fail-fast.

use bytes::Bytes;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use crate::blueprint::Bindable;
use crate::cache::SchemaCache;
use crate::coerce::assign;
use crate::context::BindContext;
use crate::cookie::{Cookie, CookieJar};
use crate::error::{BindError, DecodeError, SchemaError};
use crate::file::UploadedFile;
use crate::naming::{to_snake, NamingFn};
use crate::pattern::{decode_segments, PathDecodeFn, PathParams};
use crate::schema::{Channel, FieldSpec, Schema};
use crate::shape::{BodySlot, ListSlot, ScalarSlot, Shape, SlotMut};
use crate::validate::validate;

/// Function decoding the raw request body into a record slot.
pub type BodyDecodeFn = fn(&mut BodySlot<'_>, &[u8]) -> Result<(), DecodeError>;

/// Default body decode function: the body is a JSON document.
///
/// # Errors
///
/// Returns a [`DecodeError`] when the body is not valid JSON for the
/// target record.
pub fn json_body_decoder(slot: &mut BodySlot<'_>, body: &[u8]) -> Result<(), DecodeError> {
    slot.decode_json(body)
}

/// Binds request data onto annotated records.
///
/// # Example
///
/// ```rust,ignore
/// use paramware::{BindContext, Bindable, Binder};
///
/// #[derive(Default, Bindable)]
/// struct Page {
///     #[param("type(query),required,range(1:100)")]
///     per_page: u32,
/// }
///
/// let binder = Binder::new();
/// let page: Page = binder.bind(&ctx, "/items").await?;
/// ```
#[derive(Debug)]
pub struct Binder {
    naming: NamingFn,
    path_decode: PathDecodeFn,
    body_decode: BodyDecodeFn,
    cache: SchemaCache,
}

impl Default for Binder {
    fn default() -> Self {
        Self {
            naming: to_snake,
            path_decode: decode_segments,
            body_decode: json_body_decoder,
            cache: SchemaCache::new(),
        }
    }
}

impl Binder {
    /// Creates a binder with snake-case naming, `{name}` path patterns and
    /// JSON body decoding.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the field-to-parameter naming function.
    #[must_use]
    pub fn with_naming(mut self, naming: NamingFn) -> Self {
        self.naming = naming;
        self
    }

    /// Replaces the path parameter decode function.
    #[must_use]
    pub fn with_path_decoder(mut self, path_decode: PathDecodeFn) -> Self {
        self.path_decode = path_decode;
        self
    }

    /// Replaces the body decode function.
    #[must_use]
    pub fn with_body_decoder(mut self, body_decode: BodyDecodeFn) -> Self {
        self.body_decode = body_decode;
        self
    }

    /// Compiles and caches the schema for `T` ahead of the first bind.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] when `T`'s annotations are malformed.
    pub fn register<T: Bindable>(&self) -> Result<Arc<Schema>, SchemaError> {
        self.cache.get_or_compile::<T>(self.naming)
    }

    /// Returns the cached schema for `T` without compiling.
    #[must_use]
    pub fn schema_of<T: Bindable>(&self) -> Option<Arc<Schema>> {
        self.cache.get::<T>()
    }

    /// Binds a fresh `T` from the request.
    ///
    /// `pattern` is the route pattern the request path matched, consumed
    /// by the path decode function.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] on the first missing parameter, coercion
    /// failure, decode failure or constraint violation.
    pub async fn bind<T: Bindable + Default>(
        &self,
        ctx: &BindContext,
        pattern: &str,
    ) -> Result<T, BindError> {
        let mut value = T::default();
        self.bind_into(&mut value, ctx, pattern).await?;
        Ok(value)
    }

    /// Binds the request onto an existing record.
    ///
    /// Fields whose optional parameters are absent keep their current
    /// values.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] on the first missing parameter, coercion
    /// failure, decode failure or constraint violation.
    pub async fn bind_into<T: Bindable>(
        &self,
        value: &mut T,
        ctx: &BindContext,
        pattern: &str,
    ) -> Result<(), BindError> {
        let schema = self.cache.get_or_compile::<T>(self.naming)?;
        tracing::trace!(type_name = schema.type_name, pattern, "binding request");

        let mut request = RequestMaterial::new(ctx, &schema, self.path_decode, pattern);

        for field in &schema.fields {
            let sources: Sources = match field.channel {
                Channel::Path => {
                    let Some(text) = request.path_params.get(&field.name) else {
                        return Err(BindError::missing(
                            schema.type_name,
                            &field.name,
                            Channel::Path,
                        ));
                    };
                    Sources::Strings(vec![text.to_owned()])
                }
                Channel::Query => {
                    let values = request.query_values(schema.type_name, &field.name)?;
                    Self::strings_or_missing(&schema, field, values, Channel::Query)?
                }
                Channel::Header => {
                    let values: Vec<String> =
                        ctx.header_all(&field.name).map(str::to_owned).collect();
                    Self::strings_or_missing(&schema, field, values, Channel::Header)?
                }
                Channel::FormData => {
                    let form = request.form(schema.type_name, &field.name).await?;
                    if field.shape == Shape::File {
                        match form.files.get(&field.name) {
                            Some(file) => Sources::File(file.clone()),
                            None if field.required => {
                                return Err(BindError::missing(
                                    schema.type_name,
                                    &field.name,
                                    Channel::FormData,
                                ));
                            }
                            None => Sources::Absent,
                        }
                    } else {
                        let values = form.values.get(&field.name).cloned().unwrap_or_default();
                        Self::strings_or_missing(&schema, field, values, Channel::FormData)?
                    }
                }
                Channel::Body => {
                    if ctx.is_body_empty() {
                        if field.required {
                            return Err(BindError::missing(
                                schema.type_name,
                                &field.name,
                                Channel::Body,
                            ));
                        }
                        Sources::Absent
                    } else {
                        Sources::Body(ctx.body().clone())
                    }
                }
                Channel::Cookie => match request.cookies().get(&field.name) {
                    Some(cookie) => Sources::Cookie(cookie),
                    None if field.required => {
                        return Err(BindError::missing(
                            schema.type_name,
                            &field.name,
                            Channel::Cookie,
                        ));
                    }
                    None => Sources::Absent,
                },
            };

            let mut slot = value.slot(&field.path).ok_or_else(|| {
                BindError::internal(
                    schema.type_name,
                    format!("field path for `{}` did not resolve to a slot", field.name),
                )
            })?;

            match sources {
                // The slot keeps its current value; constraints still run
                // against it, exactly as for an empty string source.
                Sources::Absent => {}
                Sources::Strings(values) => {
                    let values: Vec<&str> = values.iter().map(String::as_str).collect();
                    assign(&mut slot, &values).map_err(|e| {
                        BindError::coerce(schema.type_name, &field.name, e)
                    })?;
                }
                Sources::File(file) => {
                    let SlotMut::File(dest) = &mut slot else {
                        return Err(BindError::internal(
                            schema.type_name,
                            format!("file param `{}` bound to a non-file slot", field.name),
                        ));
                    };
                    **dest = file;
                }
                Sources::Cookie(cookie) => {
                    set_cookie(&mut slot, &cookie).map_err(|reason| {
                        BindError::internal(schema.type_name, reason)
                    })?;
                }
                Sources::Body(body) => {
                    let SlotMut::Record(dest) = &mut slot else {
                        return Err(BindError::internal(
                            schema.type_name,
                            format!("body param `{}` bound to a non-record slot", field.name),
                        ));
                    };
                    (self.body_decode)(dest, &body).map_err(|e| {
                        BindError::decode(schema.type_name, &field.name, e)
                    })?;
                }
            }

            validate(field, &slot)?;
        }
        Ok(())
    }

    fn strings_or_missing(
        schema: &Schema,
        field: &FieldSpec,
        values: Vec<String>,
        channel: Channel,
    ) -> Result<Sources, BindError> {
        if values.is_empty() && field.required {
            return Err(BindError::missing(schema.type_name, &field.name, channel));
        }
        Ok(Sources::Strings(values))
    }
}

/// Resolved values for one field, per channel family.
enum Sources {
    Strings(Vec<String>),
    File(UploadedFile),
    Cookie(Cookie),
    Body(Bytes),
    /// Optional parameter with no value in the request.
    Absent,
}

/// Writes a cookie into a slot following the cookie channel's whitelist.
fn set_cookie(slot: &mut SlotMut<'_>, cookie: &Cookie) -> Result<(), String> {
    match slot {
        SlotMut::Cookie(dest) => {
            **dest = cookie.clone();
            Ok(())
        }
        SlotMut::Scalar(ScalarSlot::String(dest)) => {
            **dest = cookie.serialized();
            Ok(())
        }
        SlotMut::List(ListSlot::U8(dest)) => {
            **dest = cookie.serialized().into_bytes();
            Ok(())
        }
        _ => Err("cookie param bound to a non-whitelisted slot".to_owned()),
    }
}

/// Per-bind lazily materialized request data.
struct RequestMaterial<'a> {
    ctx: &'a BindContext,
    schema: &'a Schema,
    path_params: PathParams,
    query: Option<MultiMap>,
    form: Option<FormMaterial>,
    cookies: Option<CookieJar>,
}

impl<'a> RequestMaterial<'a> {
    fn new(
        ctx: &'a BindContext,
        schema: &'a Schema,
        path_decode: PathDecodeFn,
        pattern: &str,
    ) -> Self {
        Self {
            ctx,
            schema,
            path_params: path_decode(ctx.path(), pattern),
            query: None,
            form: None,
            cookies: None,
        }
    }

    fn query_values(
        &mut self,
        type_name: &'static str,
        name: &str,
    ) -> Result<Vec<String>, BindError> {
        if self.query.is_none() {
            let pairs: Vec<(String, String)> = match self.ctx.query_string() {
                Some(q) => serde_urlencoded::from_str(q)
                    .map_err(|e| BindError::decode(type_name, "*", e))?,
                None => Vec::new(),
            };
            self.query = Some(MultiMap::from_pairs(pairs));
        }
        Ok(self.query.get_or_insert_with(MultiMap::default).collect(name))
    }

    async fn form(
        &mut self,
        type_name: &'static str,
        field: &str,
    ) -> Result<&FormMaterial, BindError> {
        if self.form.is_none() {
            self.form = Some(load_form(self.ctx, self.schema, type_name, field).await?);
        }
        Ok(self.form.get_or_insert_with(FormMaterial::default))
    }

    fn cookies(&mut self) -> &CookieJar {
        let header = self.ctx.header("cookie").unwrap_or_default();
        self.cookies.get_or_insert_with(|| CookieJar::parse(header))
    }
}

/// Ordered multi-valued key set, as decoded from a query string.
#[derive(Default)]
struct MultiMap {
    pairs: Vec<(String, String)>,
}

impl MultiMap {
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    fn collect(&self, name: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
            .collect()
    }
}

/// Parsed form body: textual values plus uploaded files.
#[derive(Default)]
struct FormMaterial {
    values: HashMap<String, Vec<String>>,
    files: HashMap<String, UploadedFile>,
}

async fn load_form(
    ctx: &BindContext,
    schema: &Schema,
    type_name: &'static str,
    field: &str,
) -> Result<FormMaterial, BindError> {
    let mut material = FormMaterial {
        values: HashMap::new(),
        files: HashMap::new(),
    };

    let Some(content_type) = ctx.content_type() else {
        return Ok(material);
    };
    let Ok(mime_type) = content_type.parse::<mime::Mime>() else {
        return Ok(material);
    };

    if mime_type.essence_str() == mime::MULTIPART_FORM_DATA.essence_str() {
        let actual = ctx.body().len() as u64;
        if actual > schema.max_memory {
            return Err(BindError::PayloadTooLarge {
                schema: type_name,
                field: field.to_owned(),
                max: schema.max_memory,
                actual,
            });
        }

        let boundary = multer::parse_boundary(content_type)
            .map_err(|e| BindError::decode(type_name, field, e))?;
        let body = ctx.body().clone();
        let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });
        let mut multipart = multer::Multipart::new(stream, boundary);

        while let Some(part) = multipart
            .next_field()
            .await
            .map_err(|e| BindError::decode(type_name, field, e))?
        {
            let Some(name) = part.name().map(str::to_owned) else {
                continue;
            };
            if part.file_name().is_some() {
                let file_name = part.file_name().map(str::to_owned);
                let part_content_type = part.content_type().map(ToString::to_string);
                let data = part
                    .bytes()
                    .await
                    .map_err(|e| BindError::decode(type_name, field, e))?;
                // First file per name wins; extra uploads under the same
                // name are ignored.
                material
                    .files
                    .entry(name.clone())
                    .or_insert_with(|| {
                        UploadedFile::new(Some(name), file_name, part_content_type, data)
                    });
            } else {
                let text = part
                    .text()
                    .await
                    .map_err(|e| BindError::decode(type_name, field, e))?;
                material.values.entry(name).or_default().push(text);
            }
        }
    } else if mime_type.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(ctx.body())
            .map_err(|e| BindError::decode(type_name, field, e))?;
        for (name, value) in pairs {
            material.values.entry(name).or_default().push(value);
        }
    }

    Ok(material)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::{Blueprint, FieldDecl};
    use crate::shape::BindValue;
    use http::{Method, Uri};

    #[derive(Debug, Default)]
    struct Search {
        q: String,
        limit: u32,
        tags: Vec<String>,
    }

    impl Bindable for Search {
        fn blueprint() -> Blueprint {
            Blueprint {
                type_name: "Search",
                fields: vec![
                    FieldDecl::Param {
                        ident: "q",
                        tag: "type(query),required,len(1:64)",
                        pattern: None,
                        error_msg: None,
                        shape: String::SHAPE,
                    },
                    FieldDecl::Param {
                        ident: "limit",
                        tag: "type(query),range(1:100)",
                        pattern: None,
                        error_msg: None,
                        shape: u32::SHAPE,
                    },
                    FieldDecl::Param {
                        ident: "tags",
                        tag: "type(query)",
                        pattern: None,
                        error_msg: None,
                        shape: <Vec<String>>::SHAPE,
                    },
                ],
            }
        }

        fn slot(&mut self, path: &[usize]) -> Option<SlotMut<'_>> {
            match path {
                [0] => Some(self.q.slot_mut()),
                [1] => Some(self.limit.slot_mut()),
                [2] => Some(self.tags.slot_mut()),
                _ => None,
            }
        }
    }

    fn ctx(uri: &str) -> BindContext {
        BindContext::builder()
            .method(Method::GET)
            .uri(uri.parse::<Uri>().unwrap())
            .build()
    }

    #[tokio::test]
    async fn test_query_bind_with_repeats() {
        let binder = Binder::new();
        let search: Search = binder
            .bind(&ctx("/search?q=rust&limit=10&tags=a&tags=b"), "/search")
            .await
            .unwrap();
        assert_eq!(search.q, "rust");
        assert_eq!(search.limit, 10);
        assert_eq!(search.tags, vec!["a".to_owned(), "b".to_owned()]);
    }

    #[tokio::test]
    async fn test_missing_required_query_param() {
        let binder = Binder::new();
        let e = binder
            .bind::<Search>(&ctx("/search?limit=10"), "/search")
            .await
            .unwrap_err();
        assert_eq!(e.to_string(), "Search.q: missing query param");
    }

    #[tokio::test]
    async fn test_optional_absent_param_keeps_default() {
        let binder = Binder::new();
        let search: Search = binder.bind(&ctx("/search?q=x"), "/search").await.unwrap();
        assert_eq!(search.limit, 0);
        assert!(search.tags.is_empty());
    }

    #[tokio::test]
    async fn test_range_violation() {
        let binder = Binder::new();
        let e = binder
            .bind::<Search>(&ctx("/search?q=x&limit=999"), "/search")
            .await
            .unwrap_err();
        assert_eq!(e.to_string(), "limit too big");
    }

    #[tokio::test]
    async fn test_coerce_failure_names_field() {
        let binder = Binder::new();
        let e = binder
            .bind::<Search>(&ctx("/search?q=x&limit=ten"), "/search")
            .await
            .unwrap_err();
        assert_eq!(e.to_string(), "Search.limit: cannot parse `ten` as u32");
    }

    #[test]
    fn test_multi_map_collects_in_order() {
        let map = MultiMap::from_pairs(vec![
            ("t".into(), "1".into()),
            ("u".into(), "x".into()),
            ("t".into(), "2".into()),
        ]);
        assert_eq!(map.collect("t"), vec!["1".to_owned(), "2".to_owned()]);
        assert!(map.collect("missing").is_empty());
    }
}
