//! Static record descriptions emitted by the derive macro.
//!
//! A [`Blueprint`] lists a record's annotated fields in declaration order,
//! carrying the raw annotation text. The schema compiler turns a blueprint
//! into a validated [`Schema`](crate::schema::Schema); the binder then
//! addresses live fields through [`Bindable::slot`] using the index paths
//! established here.

use smallvec::SmallVec;

use crate::shape::{Shape, SlotMut};

/// Index path addressing one field slot within a (possibly nested) record.
///
/// Each element indexes into the declared entries of one blueprint level,
/// descending through embedded records. Skipped fields do not occupy an
/// index.
pub type FieldPath = SmallVec<[usize; 4]>;

/// One declared entry of a record blueprint.
#[derive(Debug, Clone)]
pub enum FieldDecl {
    /// A directly bindable field carrying an annotation.
    Param {
        /// The field identifier as written in source.
        ident: &'static str,
        /// The raw annotation text, parsed by the tag grammar.
        tag: &'static str,
        /// An optional regular-expression constraint.
        pattern: Option<&'static str>,
        /// An optional custom validation failure message.
        error_msg: Option<&'static str>,
        /// The field's destination shape.
        shape: Shape,
    },
    /// An embedded record whose fields are flattened into the parent.
    Embedded {
        /// The field identifier as written in source.
        ident: &'static str,
        /// The embedded record's own blueprint.
        blueprint: fn() -> Blueprint,
    },
}

/// Static description of one bindable record type.
#[derive(Debug, Clone)]
pub struct Blueprint {
    /// The record's type name, used in diagnostics.
    pub type_name: &'static str,
    /// Declared entries in source order.
    pub fields: Vec<FieldDecl>,
}

/// Records whose fields can be bound from request data.
///
/// Implement through `#[derive(Bindable)]`; the derive keeps
/// [`blueprint`](Self::blueprint) and [`slot`](Self::slot) index-consistent,
/// which hand-written implementations must also guarantee.
pub trait Bindable: Sized + 'static {
    /// The static description of this record's annotated fields.
    fn blueprint() -> Blueprint;

    /// Resolves an index path to a mutable slot over the addressed field.
    ///
    /// Returns `None` when the path does not address a field of this
    /// record. The binder treats that as an internal fault, not a request
    /// error.
    fn slot(&mut self, path: &[usize]) -> Option<SlotMut<'_>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::BindValue;

    struct Inner {
        token: String,
    }

    impl Bindable for Inner {
        fn blueprint() -> Blueprint {
            Blueprint {
                type_name: "Inner",
                fields: vec![FieldDecl::Param {
                    ident: "token",
                    tag: "type(header),required",
                    pattern: None,
                    error_msg: None,
                    shape: String::SHAPE,
                }],
            }
        }

        fn slot(&mut self, path: &[usize]) -> Option<SlotMut<'_>> {
            match path {
                [0] => Some(self.token.slot_mut()),
                _ => None,
            }
        }
    }

    struct Outer {
        id: u64,
        inner: Inner,
    }

    impl Bindable for Outer {
        fn blueprint() -> Blueprint {
            Blueprint {
                type_name: "Outer",
                fields: vec![
                    FieldDecl::Param {
                        ident: "id",
                        tag: "type(path),required",
                        pattern: None,
                        error_msg: None,
                        shape: u64::SHAPE,
                    },
                    FieldDecl::Embedded {
                        ident: "inner",
                        blueprint: Inner::blueprint,
                    },
                ],
            }
        }

        fn slot(&mut self, path: &[usize]) -> Option<SlotMut<'_>> {
            let (head, rest) = path.split_first()?;
            match (head, rest) {
                (0, []) => Some(self.id.slot_mut()),
                (1, rest) => self.inner.slot(rest),
                _ => None,
            }
        }
    }

    #[test]
    fn test_slot_resolution_through_embedding() {
        let mut outer = Outer {
            id: 9,
            inner: Inner {
                token: "abc".into(),
            },
        };
        assert!(outer.slot(&[0]).is_some());
        assert_eq!(outer.slot(&[1, 0]).unwrap().as_str(), Some("abc"));
        assert!(outer.slot(&[2]).is_none());
        assert!(outer.slot(&[1, 1]).is_none());
        assert!(outer.slot(&[]).is_none());
    }

    #[test]
    fn test_blueprint_lists_entries_in_order() {
        let bp = Outer::blueprint();
        assert_eq!(bp.type_name, "Outer");
        assert_eq!(bp.fields.len(), 2);
        assert!(matches!(bp.fields[0], FieldDecl::Param { ident: "id", .. }));
        assert!(matches!(bp.fields[1], FieldDecl::Embedded { ident: "inner", .. }));
    }
}
