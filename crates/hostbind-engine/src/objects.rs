//! Object table
//!
//! Reference implementation of the object-registry collaborator. Host
//! objects are owned by the table, addressed by id on the script side and
//! by their native address on the host side. Each object sits behind its
//! own lock so a method call on one object never blocks another.

use std::any::Any;
use std::sync::Arc;

use hostbind_sdk::{hash, ObjectAddr, ObjectEntry, ObjectId, ObjectRegistry};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::adapter::ScriptClass;

struct ObjectSlot {
    namespaces: Vec<u32>,
    addr: ObjectAddr,
    object: Mutex<Box<dyn Any + Send>>,
}

#[derive(Default)]
struct TableInner {
    next_id: u32,
    objects: FxHashMap<ObjectId, Arc<ObjectSlot>>,
    by_addr: FxHashMap<ObjectAddr, ObjectId>,
}

/// Owns host objects and resolves them by id or address
#[derive(Default)]
pub struct ObjectTable {
    inner: Mutex<TableInner>,
}

impl ObjectTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object in the namespace of its class
    pub fn register<T: ScriptClass>(&self, object: T) -> ObjectId {
        self.register_in(object, &[T::CLASS_NAME])
    }

    /// Add an object with an explicit namespace chain, most derived first.
    ///
    /// Zero-sized objects all share one address, so only the latest of them
    /// resolves by address.
    pub fn register_in<T: Any + Send>(&self, object: T, namespaces: &[&str]) -> ObjectId {
        let boxed: Box<dyn Any + Send> = Box::new(object);
        let addr = ObjectAddr::of(boxed.as_ref());

        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = ObjectId(inner.next_id);
        let slot = ObjectSlot {
            namespaces: namespaces.iter().map(|ns| hash(ns)).collect(),
            addr,
            object: Mutex::new(boxed),
        };
        inner.objects.insert(id, Arc::new(slot));
        inner.by_addr.insert(addr, id);
        tracing::debug!(object = %id, ?namespaces, "object registered");
        id
    }

    /// Remove an object, handing it back if it was of type `T`
    pub fn remove<T: Any>(&self, id: ObjectId) -> Option<T> {
        let slot = {
            let mut inner = self.inner.lock();
            let slot = inner.objects.remove(&id)?;
            if inner.by_addr.get(&slot.addr) == Some(&id) {
                inner.by_addr.remove(&slot.addr);
            }
            slot
        };
        let slot = Arc::try_unwrap(slot).ok()?;
        slot.object.into_inner().downcast::<T>().ok().map(|b| *b)
    }

    /// Native address of an object
    pub fn address_of(&self, id: ObjectId) -> Option<ObjectAddr> {
        self.inner.lock().objects.get(&id).map(|slot| slot.addr)
    }

    /// True when `id` names a live object
    pub fn contains(&self, id: ObjectId) -> bool {
        self.inner.lock().objects.contains_key(&id)
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.inner.lock().objects.len()
    }

    /// True when the table holds no object
    pub fn is_empty(&self) -> bool {
        self.inner.lock().objects.is_empty()
    }

    fn slot(&self, id: ObjectId) -> Option<Arc<ObjectSlot>> {
        self.inner.lock().objects.get(&id).cloned()
    }

    /// Run `f` on the object as `T`.
    ///
    /// Returns `None` if the object is missing, of another type, or already
    /// borrowed by a call in progress.
    pub fn with_object<T: Any, R>(&self, id: ObjectId, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let slot = self.slot(id)?;
        let mut object = slot.object.try_lock()?;
        object.downcast_mut::<T>().map(f)
    }

    /// Run `f` on the type-erased object; `None` under the same conditions as `with_object`
    pub fn with_any<R>(&self, id: ObjectId, f: impl FnOnce(&mut dyn Any) -> R) -> Option<R> {
        let slot = self.slot(id)?;
        let mut object = slot.object.try_lock()?;
        let any: &mut dyn Any = &mut **object;
        Some(f(any))
    }
}

impl ObjectRegistry for ObjectTable {
    fn find_object_by_address(&self, addr: ObjectAddr) -> Option<ObjectId> {
        self.inner.lock().by_addr.get(&addr).copied()
    }

    fn find_object_entry(&self, id: ObjectId) -> Option<ObjectEntry> {
        self.inner.lock().objects.get(&id).map(|slot| ObjectEntry {
            id,
            namespaces: slot.namespaces.clone(),
        })
    }
}
