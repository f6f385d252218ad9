//! Dynamic Type Registry
//!
//! Maps native type descriptors onto the closed set of interpreter kinds.
//! Lookup is total: a type without a mapping reports `Kind::Unregistered`,
//! and it is up to registration and conversion to treat that as an error.

use std::any::TypeId;

use hostbind_sdk::{Kind, NativeType, ObjectId, Vector3f};
use rustc_hash::FxHashMap;

/// Native type → kind mapping
#[derive(Debug, Clone)]
pub struct KindRegistry {
    by_type: FxHashMap<TypeId, Kind>,
}

impl KindRegistry {
    /// Registry preloaded with the built-in mappings
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register::<()>(Kind::Void);
        registry.register::<i32>(Kind::Int);
        registry.register::<f32>(Kind::Float);
        registry.register::<bool>(Kind::Bool);
        registry.register::<String>(Kind::String);
        registry.register::<&'static str>(Kind::String);
        registry.register::<ObjectId>(Kind::Object);
        registry.register::<Vector3f>(Kind::Vector3f);
        registry
    }

    /// Registry with no mappings at all
    pub fn empty() -> Self {
        Self {
            by_type: FxHashMap::default(),
        }
    }

    /// Map `T` onto `kind`, replacing any previous mapping.
    ///
    /// Mapping onto `Kind::Unregistered` removes the type.
    pub fn register<T: ?Sized + 'static>(&mut self, kind: Kind) {
        let id = TypeId::of::<T>();
        if kind.is_registered() {
            self.by_type.insert(id, kind);
        } else {
            self.by_type.remove(&id);
        }
    }

    /// Kind of a native type, `Unregistered` when unmapped
    pub fn kind_of(&self, ty: &NativeType) -> Kind {
        self.by_type
            .get(&ty.id())
            .copied()
            .unwrap_or(Kind::Unregistered)
    }

    /// Kind of `T`
    pub fn kind_of_type<T: ?Sized + 'static>(&self) -> Kind {
        self.kind_of(&NativeType::of::<T>())
    }

    /// Number of mapped types
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    /// True when no type is mapped
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::new()
    }
}
