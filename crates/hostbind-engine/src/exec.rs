//! Execute collaborator
//!
//! The binding layer never runs code itself: once a function context is
//! populated it hands it to an `Executor`, which reports success or failure.
//! `NativeExecutor` runs registered native entries; an interpreter embeds
//! its own executor to run script-defined functions.

use std::sync::Arc;

use hostbind_sdk::{ObjectId, GLOBAL_NAMESPACE};

use crate::entry::EntryKey;
use crate::objects::ObjectTable;
use crate::registry::Registry;
use crate::slots::FunctionContext;

/// Runs a function whose parameter slots are already populated
pub trait Executor: Send + Sync {
    /// Execute `function` in `namespace`, on `object` for methods
    /// (`ObjectId::NONE` for free functions). Slot 0 holds the result on success.
    fn execute(
        &self,
        object: ObjectId,
        namespace: u32,
        function: u32,
        ctx: &mut FunctionContext,
    ) -> bool;
}

/// Executor for native entries of a registry, with receivers from an object table
pub struct NativeExecutor {
    registry: Arc<Registry>,
    objects: Arc<ObjectTable>,
}

impl NativeExecutor {
    /// Executor over `registry` and `objects`
    pub fn new(registry: Arc<Registry>, objects: Arc<ObjectTable>) -> Self {
        Self { registry, objects }
    }

    /// Registry this executor dispatches from
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Object table receivers come from
    pub fn objects(&self) -> &Arc<ObjectTable> {
        &self.objects
    }
}

impl Executor for NativeExecutor {
    fn execute(
        &self,
        object: ObjectId,
        namespace: u32,
        function: u32,
        ctx: &mut FunctionContext,
    ) -> bool {
        let key = EntryKey::from_hashes(namespace, function);
        let Some(entry) = self.registry.find(key) else {
            tracing::debug!(%key, "no entry to execute");
            return false;
        };
        let Some(adapter) = entry.adapter() else {
            tracing::debug!(function = %entry.qualified_name(), "script-defined function needs an interpreter");
            return false;
        };

        let result = if object.is_none() || namespace == GLOBAL_NAMESPACE {
            adapter.dispatch(None, ctx)
        } else {
            match self
                .objects
                .with_any(object, |receiver| adapter.dispatch(Some(receiver), ctx))
            {
                Some(result) => result,
                None => {
                    tracing::debug!(%object, "receiver missing or busy");
                    return false;
                }
            }
        };

        match result {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(function = %entry.qualified_name(), error = %err, "dispatch failed");
                false
            }
        }
    }
}
