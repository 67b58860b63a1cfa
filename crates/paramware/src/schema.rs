//! Schema compilation: from a record blueprint to a validated binding plan.
//!
//! Compilation walks the blueprint once, parses every annotation, checks
//! channel/shape legality, parses constraint tuples and compiles regular
//! expressions. Anything malformed is reported as a [`SchemaError`] here,
//! before any request is bound. The bind loop trusts a compiled schema
//! completely.

use regex::Regex;
use smallvec::smallvec;
use std::fmt;
use std::str::FromStr;

use crate::blueprint::{Blueprint, FieldDecl, FieldPath};
use crate::error::SchemaError;
use crate::naming::NamingFn;
use crate::shape::Shape;
use crate::tag::parse_tag;

/// Annotation text marking a field as ignored by binding.
pub const IGNORE_TAG: &str = "-";

const MB: u64 = 1 << 20;

/// Default aggregate in-memory ceiling for multipart bodies, 32 MiB.
pub const DEFAULT_MAX_MEMORY: u64 = 32 * MB;

/// Request channel a parameter is bound from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// A segment of the matched URL path. Always required.
    Path,
    /// The URL query string.
    Query,
    /// An urlencoded or multipart form body.
    FormData,
    /// The raw request body, decoded as one record.
    Body,
    /// A request header.
    Header,
    /// A request cookie.
    Cookie,
}

impl Channel {
    /// The channel's wire spelling as used in annotations and messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::FormData => "formData",
            Self::Body => "body",
            Self::Header => "header",
            Self::Cookie => "cookie",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(Self::Path),
            "query" => Ok(Self::Query),
            "formData" => Ok(Self::FormData),
            "body" => Ok(Self::Body),
            "header" => Ok(Self::Header),
            "cookie" => Ok(Self::Cookie),
            _ => Err(()),
        }
    }
}

/// Validation constraints attached to one field.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    /// Minimum byte length, inclusive.
    pub len_min: Option<usize>,
    /// Maximum byte length, inclusive.
    pub len_max: Option<usize>,
    /// Minimum numeric value, inclusive within tolerance.
    pub range_min: Option<f64>,
    /// Maximum numeric value, inclusive within tolerance.
    pub range_max: Option<f64>,
    /// The value must not be its shape's zero value.
    pub nonzero: bool,
    /// The string value must match this expression.
    pub pattern: Option<Regex>,
}

impl Constraints {
    /// Whether any constraint is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len_min.is_none()
            && self.len_max.is_none()
            && self.range_min.is_none()
            && self.range_max.is_none()
            && !self.nonzero
            && self.pattern.is_none()
    }
}

/// One compiled bindable field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Index path into the record's blueprint tree.
    pub path: FieldPath,
    /// Wire parameter name.
    pub name: String,
    /// Channel the value is read from.
    pub channel: Channel,
    /// Whether the parameter must be present.
    pub required: bool,
    /// The destination shape.
    pub shape: Shape,
    /// Validation constraints.
    pub constraints: Constraints,
    /// Custom message replacing any validation failure message.
    pub error_msg: Option<String>,
    /// Documentation text from the `desc(...)` option.
    pub desc: Option<String>,
}

impl FieldSpec {
    /// Whether the field receives an uploaded file.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.shape == Shape::File
    }

    /// The field's `desc(...)` documentation text.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.desc.as_deref()
    }
}

/// Compiled binding plan for one record type.
#[derive(Debug, Clone)]
pub struct Schema {
    /// The record's type name, used in diagnostics.
    pub type_name: &'static str,
    /// Compiled fields in declaration order, embedded records flattened.
    pub fields: Vec<FieldSpec>,
    /// Aggregate in-memory ceiling for multipart bodies, in bytes.
    pub max_memory: u64,
}

impl Schema {
    /// Compiles a blueprint into a schema using the given naming function.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] when any annotation is malformed, a
    /// constraint does not apply to its field's shape, or channel/shape
    /// rules are violated.
    pub fn compile(blueprint: &Blueprint, naming: NamingFn) -> Result<Self, SchemaError> {
        let mut compiler = Compiler {
            type_name: blueprint.type_name,
            naming,
            fields: Vec::new(),
            has_form_data: false,
            has_body: false,
            max_memory_mb: 0,
        };
        compiler.walk(blueprint, &smallvec![])?;

        let max_memory = if compiler.max_memory_mb > 0 {
            compiler.max_memory_mb * MB
        } else {
            DEFAULT_MAX_MEMORY
        };

        Ok(Self {
            type_name: blueprint.type_name,
            fields: compiler.fields,
            max_memory,
        })
    }

    /// Looks up a compiled field by wire name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Iterates over the compiled fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }
}

struct Compiler {
    type_name: &'static str,
    naming: NamingFn,
    fields: Vec<FieldSpec>,
    // Conflict flags and the memory ceiling aggregate over the whole
    // record tree, embedded levels included.
    has_form_data: bool,
    has_body: bool,
    max_memory_mb: u64,
}

impl Compiler {
    fn walk(&mut self, blueprint: &Blueprint, prefix: &FieldPath) -> Result<(), SchemaError> {
        for (index, decl) in blueprint.fields.iter().enumerate() {
            let mut path = prefix.clone();
            path.push(index);
            match decl {
                FieldDecl::Embedded { blueprint, .. } => self.walk(&blueprint(), &path)?,
                FieldDecl::Param {
                    ident,
                    tag,
                    pattern,
                    error_msg,
                    shape,
                } => self.compile_field(path, ident, tag, *pattern, *error_msg, *shape)?,
            }
        }
        Ok(())
    }

    fn compile_field(
        &mut self,
        path: FieldPath,
        ident: &'static str,
        tag: &'static str,
        pattern: Option<&'static str>,
        error_msg: Option<&'static str>,
        shape: Shape,
    ) -> Result<(), SchemaError> {
        if tag == IGNORE_TAG {
            return Ok(());
        }

        let err = |reason: String| SchemaError::new(self.type_name, ident, reason);
        let mut tags = parse_tag(tag);

        let channel = tags
            .remove("type")
            .as_deref()
            .map(Channel::from_str)
            .transpose()
            .ok()
            .flatten()
            .ok_or_else(|| {
                err(
                    "invalid param type, refer to the following: `path`, `query`, `formData`, \
                     `body`, `header` or `cookie`"
                        .to_owned(),
                )
            })?;

        match shape {
            Shape::File if channel != Channel::FormData => {
                return Err(err(
                    "when field shape is a file, param type must be `formData`".to_owned(),
                ));
            }
            Shape::Cookie if channel != Channel::Cookie => {
                return Err(err(
                    "when field shape is a cookie, param type must be `cookie`".to_owned(),
                ));
            }
            _ => {}
        }

        match channel {
            Channel::FormData => {
                if self.has_body {
                    return Err(err(
                        "`formData` and `body` params can not exist at the same time".to_owned(),
                    ));
                }
                self.has_form_data = true;
            }
            Channel::Body => {
                if self.has_form_data {
                    return Err(err(
                        "`formData` and `body` params can not exist at the same time".to_owned(),
                    ));
                }
                if self.has_body {
                    return Err(err(
                        "there should not be more than one `body` param".to_owned(),
                    ));
                }
                if shape != Shape::Record {
                    return Err(err(
                        "`body` param must be a `Payload<T>` record field".to_owned(),
                    ));
                }
                self.has_body = true;
            }
            Channel::Cookie => {
                if !shape.is_cookie_compatible() {
                    return Err(err(
                        "invalid field shape for `cookie` param, refer to the following: \
                         `Cookie`, `String` or `Vec<u8>`"
                            .to_owned(),
                    ));
                }
            }
            Channel::Path | Channel::Query | Channel::Header => {}
        }

        if shape == Shape::Record && channel != Channel::Body {
            return Err(err(
                "`Payload<T>` fields are only usable with param type `body`".to_owned(),
            ));
        }

        if let Some(mb) = tags.remove("maxmb") {
            let mb: u64 = mb
                .parse()
                .ok()
                .filter(|mb| *mb > 0)
                .ok_or_else(|| err("invalid `maxmb` tag, it must be positive integer".to_owned()))?;
            self.max_memory_mb = self.max_memory_mb.max(mb);
        }

        let mut constraints = Constraints::default();

        if let Some(tuple) = tags.remove("len") {
            if !shape.is_string() {
                return Err(err(
                    "`len` constraint is only usable on string params".to_owned(),
                ));
            }
            let (min, max) = parse_tuple(&tuple)
                .ok_or_else(|| err(format!("invalid `len` tuple `{tuple}`")))?;
            constraints.len_min = parse_bound(min)
                .map_err(|()| err(format!("invalid `len` bound `{}`", min.unwrap_or(""))))?;
            constraints.len_max = parse_bound(max)
                .map_err(|()| err(format!("invalid `len` bound `{}`", max.unwrap_or(""))))?;
        }

        if let Some(tuple) = tags.remove("range") {
            if !shape.is_numeric() {
                return Err(err(
                    "`range` constraint is only usable on numeric params".to_owned(),
                ));
            }
            let (min, max) = parse_tuple(&tuple)
                .ok_or_else(|| err(format!("invalid `range` tuple `{tuple}`")))?;
            constraints.range_min = parse_bound(min)
                .map_err(|()| err(format!("invalid `range` bound `{}`", min.unwrap_or(""))))?;
            constraints.range_max = parse_bound(max)
                .map_err(|()| err(format!("invalid `range` bound `{}`", max.unwrap_or(""))))?;
        }

        constraints.nonzero = tags.remove("nonzero").is_some();

        if let Some(pattern) = pattern {
            if !shape.is_string() {
                return Err(err(
                    "`regex` constraint is only usable on string params".to_owned(),
                ));
            }
            constraints.pattern = Some(
                Regex::new(pattern).map_err(|e| err(format!("invalid `regex` pattern: {e}")))?,
            );
        }

        let required = tags.remove("required").is_some() || channel == Channel::Path;

        let name = tags
            .remove("name")
            .unwrap_or_else(|| (self.naming)(ident));

        let desc = tags.remove("desc");

        self.fields.push(FieldSpec {
            path,
            name,
            channel,
            required,
            shape,
            constraints,
            error_msg: error_msg.map(str::to_owned),
            desc,
        });
        Ok(())
    }
}

/// Splits a `min:max` tuple. A single value stands for both bounds; an
/// empty side leaves that bound open. Returns `None` when both sides are
/// empty or there are more than two parts.
fn parse_tuple(tuple: &str) -> Option<(Option<&str>, Option<&str>)> {
    let mut parts = tuple.split(':');
    let a = parts.next().unwrap_or("");
    let Some(b) = parts.next() else {
        return (!a.is_empty()).then_some((Some(a), Some(a)));
    };
    if parts.next().is_some() || (a.is_empty() && b.is_empty()) {
        return None;
    }
    Some(((!a.is_empty()).then_some(a), (!b.is_empty()).then_some(b)))
}

fn parse_bound<T: FromStr>(bound: Option<&str>) -> Result<Option<T>, ()> {
    match bound {
        None => Ok(None),
        Some(text) => text.parse().map(Some).map_err(|_| ()),
    }
}
