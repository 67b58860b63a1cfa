//! Process-wide cache of compiled schemas.

use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::blueprint::Bindable;
use crate::error::SchemaError;
use crate::naming::NamingFn;
use crate::schema::Schema;

/// Cache mapping record types to their compiled schemas.
///
/// Compilation happens at most once per type; concurrent readers share the
/// compiled schema through an `Arc`. A compilation failure is not cached,
/// so a later call reports the same error again.
#[derive(Debug, Default)]
pub struct SchemaCache {
    schemas: RwLock<HashMap<TypeId, Arc<Schema>>>,
}

impl SchemaCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached schema for `T`, if compiled already.
    #[must_use]
    pub fn get<T: Bindable>(&self) -> Option<Arc<Schema>> {
        self.schemas.read().get(&TypeId::of::<T>()).cloned()
    }

    /// Returns the schema for `T`, compiling and caching it on first use.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] when `T`'s annotations are malformed.
    pub fn get_or_compile<T: Bindable>(&self, naming: NamingFn) -> Result<Arc<Schema>, SchemaError> {
        if let Some(schema) = self.get::<T>() {
            return Ok(schema);
        }

        let schema = Arc::new(Schema::compile(&T::blueprint(), naming)?);
        let mut schemas = self.schemas.write();
        // A racing compiler may have won; keep the first entry.
        let entry = schemas
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                tracing::debug!(type_name = schema.type_name, "schema compiled");
                schema
            });
        Ok(Arc::clone(entry))
    }

    /// Inserts a precompiled schema for `T`, replacing any cached one.
    pub fn insert<T: Bindable>(&self, schema: Schema) {
        self.schemas
            .write()
            .insert(TypeId::of::<T>(), Arc::new(schema));
    }

    /// The number of cached schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::{Blueprint, FieldDecl};
    use crate::naming::to_snake;
    use crate::shape::{BindValue, SlotMut};

    struct Page {
        offset: u32,
    }

    impl Bindable for Page {
        fn blueprint() -> Blueprint {
            Blueprint {
                type_name: "Page",
                fields: vec![FieldDecl::Param {
                    ident: "offset",
                    tag: "type(query)",
                    pattern: None,
                    error_msg: None,
                    shape: u32::SHAPE,
                }],
            }
        }

        fn slot(&mut self, path: &[usize]) -> Option<SlotMut<'_>> {
            match path {
                [0] => Some(self.offset.slot_mut()),
                _ => None,
            }
        }
    }

    struct Broken;

    impl Bindable for Broken {
        fn blueprint() -> Blueprint {
            Blueprint {
                type_name: "Broken",
                fields: vec![FieldDecl::Param {
                    ident: "p",
                    tag: "type(teapot)",
                    pattern: None,
                    error_msg: None,
                    shape: String::SHAPE,
                }],
            }
        }

        fn slot(&mut self, _path: &[usize]) -> Option<SlotMut<'_>> {
            None
        }
    }

    #[test]
    fn test_compile_once_and_share() {
        let cache = SchemaCache::new();
        assert!(cache.get::<Page>().is_none());

        let first = cache.get_or_compile::<Page>(to_snake).unwrap();
        let second = cache.get_or_compile::<Page>(to_snake).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failed_compile_is_not_cached() {
        let cache = SchemaCache::new();
        assert!(cache.get_or_compile::<Broken>(to_snake).is_err());
        assert!(cache.is_empty());
        assert!(cache.get_or_compile::<Broken>(to_snake).is_err());
    }
}
