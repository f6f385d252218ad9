//! Host-to-Script Call Interface
//!
//! The reverse of dispatch: host code names a function (or a method on an
//! object), passes natively typed arguments, and gets a typed result back.
//!
//! A call runs in a fixed order and stops at the first failure, reporting
//! it once to the registry's diagnostic sink:
//!
//! 1. resolve the target to a registration entry
//! 2. check the argument count against the declared arity
//! 3. check that the requested return type maps to a kind
//! 4. convert every argument to its slot kind
//! 5. take the entry's slot table, write the slots, execute
//! 6. convert slot 0 to the requested return type
//!
//! No slot is written before step 5, so a call rejected in steps 1-4
//! leaves the slot table untouched.

use std::fmt;

use hostbind_sdk::{
    hash, ArgSource, BindError, BindResult, FromSlot, HostArg, ObjectAddr, ObjectId,
    ObjectRegistry, SlotValue, GLOBAL_NAMESPACE,
};

use crate::convert::{convert, convert_str};
use crate::diagnostics::fail;
use crate::entry::RegistrationEntry;
use crate::exec::Executor;
use crate::registry::Registry;

// ============================================================================
// Call targets
// ============================================================================

/// How the receiver of a method call is identified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectRef {
    /// By script object id
    Id(ObjectId),
    /// By native address, resolved through the object registry
    Addr(ObjectAddr),
}

impl From<ObjectId> for ObjectRef {
    fn from(id: ObjectId) -> Self {
        ObjectRef::Id(id)
    }
}

impl From<ObjectAddr> for ObjectRef {
    fn from(addr: ObjectAddr) -> Self {
        ObjectRef::Addr(addr)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectRef::Id(id) => write!(f, "object {}", id),
            ObjectRef::Addr(addr) => write!(f, "object at {:#x}", addr.to_raw()),
        }
    }
}

/// Callee of a host-to-script call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    /// Free function
    Function {
        /// Hash of the function name
        name_hash: u32,
        /// Name for diagnostics
        label: String,
    },
    /// Method on an object
    Method {
        /// Receiver
        object: ObjectRef,
        /// Namespace hash, 0 to search the object's namespace chain
        namespace: u32,
        /// Hash of the method name
        name_hash: u32,
        /// Name for diagnostics
        label: String,
    },
}

impl CallTarget {
    /// Free function by name
    pub fn function(name: &str) -> Self {
        CallTarget::Function {
            name_hash: hash(name),
            label: name.to_string(),
        }
    }

    /// Free function by name hash
    pub fn function_hash(name_hash: u32) -> Self {
        CallTarget::Function {
            name_hash,
            label: format!("#{:08x}", name_hash),
        }
    }

    /// Method by name, searched along the object's namespace chain
    pub fn method(object: impl Into<ObjectRef>, name: &str) -> Self {
        CallTarget::Method {
            object: object.into(),
            namespace: GLOBAL_NAMESPACE,
            name_hash: hash(name),
            label: name.to_string(),
        }
    }

    /// Method by hashes
    pub fn method_hash(object: impl Into<ObjectRef>, namespace: u32, name_hash: u32) -> Self {
        CallTarget::Method {
            object: object.into(),
            namespace,
            name_hash,
            label: format!("#{:08x}", name_hash),
        }
    }

    /// Restrict a method lookup to one namespace of the object's chain
    pub fn in_namespace(self, namespace: &str) -> Self {
        match self {
            CallTarget::Method {
                object,
                name_hash,
                label,
                ..
            } => CallTarget::Method {
                object,
                namespace: hash(namespace),
                name_hash,
                label: format!("{}::{}", namespace, label),
            },
            function => function,
        }
    }

    fn label(&self) -> &str {
        match self {
            CallTarget::Function { label, .. } | CallTarget::Method { label, .. } => label,
        }
    }
}

// ============================================================================
// Argument lists
// ============================================================================

/// A list of host arguments
pub trait HostArgs {
    /// Number of arguments
    fn count(&self) -> usize;

    /// Argument sources, in order
    fn sources(&self) -> Vec<ArgSource<'_>>;
}

macro_rules! impl_host_args {
    ($count:expr; $($arg:ident => $idx:tt),*) => {
        impl<$($arg: HostArg,)*> HostArgs for ($($arg,)*) {
            fn count(&self) -> usize {
                $count
            }

            fn sources(&self) -> Vec<ArgSource<'_>> {
                vec![$(self.$idx.source()),*]
            }
        }
    };
}

impl_host_args!(0;);
impl_host_args!(1; A1 => 0);
impl_host_args!(2; A1 => 0, A2 => 1);
impl_host_args!(3; A1 => 0, A2 => 1, A3 => 2);
impl_host_args!(4; A1 => 0, A2 => 1, A3 => 2, A4 => 3);
impl_host_args!(5; A1 => 0, A2 => 1, A3 => 2, A4 => 3, A5 => 4);
impl_host_args!(6; A1 => 0, A2 => 1, A3 => 2, A4 => 3, A5 => 4, A6 => 5);
impl_host_args!(7; A1 => 0, A2 => 1, A3 => 2, A4 => 3, A5 => 4, A6 => 5, A7 => 6);
impl_host_args!(8; A1 => 0, A2 => 1, A3 => 2, A4 => 3, A5 => 4, A6 => 5, A7 => 6, A8 => 7);
impl_host_args!(
    9; A1 => 0, A2 => 1, A3 => 2, A4 => 3, A5 => 4, A6 => 5, A7 => 6, A8 => 7, A9 => 8
);
impl_host_args!(
    10; A1 => 0, A2 => 1, A3 => 2, A4 => 3, A5 => 4, A6 => 5, A7 => 6, A8 => 7, A9 => 8, A10 => 9
);
impl_host_args!(
    11; A1 => 0, A2 => 1, A3 => 2, A4 => 3, A5 => 4, A6 => 5, A7 => 6, A8 => 7, A9 => 8,
    A10 => 9, A11 => 10
);
impl_host_args!(
    12; A1 => 0, A2 => 1, A3 => 2, A4 => 3, A5 => 4, A6 => 5, A7 => 6, A8 => 7, A9 => 8,
    A10 => 9, A11 => 10, A12 => 11
);

impl HostArgs for [SlotValue] {
    fn count(&self) -> usize {
        self.len()
    }

    fn sources(&self) -> Vec<ArgSource<'_>> {
        self.iter().map(|v| v.source()).collect()
    }
}

impl HostArgs for Vec<SlotValue> {
    fn count(&self) -> usize {
        self.len()
    }

    fn sources(&self) -> Vec<ArgSource<'_>> {
        self.as_slice().sources()
    }
}

impl<T: HostArgs + ?Sized> HostArgs for &T {
    fn count(&self) -> usize {
        (**self).count()
    }

    fn sources(&self) -> Vec<ArgSource<'_>> {
        (**self).sources()
    }
}

// ============================================================================
// ScriptCaller
// ============================================================================

/// Issues host-to-script calls against a registry
pub struct ScriptCaller<'a> {
    registry: &'a Registry,
    executor: &'a dyn Executor,
    objects: &'a dyn ObjectRegistry,
}

struct Resolved<'r> {
    entry: &'r RegistrationEntry,
    object: ObjectId,
}

impl<'a> ScriptCaller<'a> {
    /// Caller over a registry, an executor and an object registry
    pub fn new(
        registry: &'a Registry,
        executor: &'a dyn Executor,
        objects: &'a dyn ObjectRegistry,
    ) -> Self {
        Self {
            registry,
            executor,
            objects,
        }
    }

    /// Call `target` with `args` and convert the result to `R`
    pub fn call<R, A>(&self, target: &CallTarget, args: A) -> BindResult<R>
    where
        R: FromSlot + 'static,
        A: HostArgs,
    {
        let sink = self.registry.diagnostics();
        self.try_call::<R, A>(target, &args)
            .or_else(|err| fail(sink, err))
    }

    /// Call and discard the result
    pub fn call_void<A: HostArgs>(&self, target: &CallTarget, args: A) -> BindResult<()> {
        self.call::<(), A>(target, args)
    }

    fn try_call<R, A>(&self, target: &CallTarget, args: &A) -> BindResult<R>
    where
        R: FromSlot + 'static,
        A: HostArgs,
    {
        let Resolved { entry, object } = self.resolve(target)?;
        let function = entry.qualified_name();

        let supplied = args.count();
        if supplied != entry.arity() {
            return Err(BindError::ArityMismatch {
                function,
                expected: entry.arity(),
                supplied,
            });
        }

        let return_kind = self.registry.kinds().kind_of_type::<R>();
        if !return_kind.is_registered() {
            return Err(BindError::UnsupportedReturnType(
                std::any::type_name::<R>().to_string(),
            ));
        }

        let params = &entry.signature().params;
        let mut values = Vec::with_capacity(supplied);
        for (i, (source, kind)) in args.sources().into_iter().zip(params).enumerate() {
            let converted = match source {
                ArgSource::Str(s) => convert_str(s, *kind),
                ArgSource::Value(v) => convert(&v, *kind, self.objects),
            };
            let value = converted.ok_or_else(|| BindError::ArgumentConversionFailed {
                function: function.clone(),
                index: i + 1,
            })?;
            values.push(value);
        }

        let result = {
            let mut ctx = entry.lock_context()?;
            for (i, value) in values.into_iter().enumerate() {
                ctx.set_value(i + 1, value)?;
            }
            let key = entry.key();
            if !self.executor.execute(object, key.scope, key.name, &mut ctx) {
                return Err(BindError::ExecutionFailed(function));
            }
            ctx.return_value().clone()
        };

        let converted = convert(&result, return_kind, self.objects)
            .ok_or_else(|| BindError::ReturnConversionFailed {
                function: function.clone(),
                from: result.kind(),
                to: return_kind,
            })?;
        let value = R::from_slot(&converted).map_err(|_| BindError::ReturnConversionFailed {
            function: function.clone(),
            from: converted.kind(),
            to: return_kind,
        })?;
        tracing::debug!(function = %function, "host call complete");
        Ok(value)
    }

    fn resolve(&self, target: &CallTarget) -> BindResult<Resolved<'a>> {
        match target {
            CallTarget::Function { name_hash, .. } => self
                .registry
                .find_function(*name_hash)
                .map(|entry| Resolved {
                    entry,
                    object: ObjectId::NONE,
                })
                .ok_or_else(|| BindError::TargetNotFound(format!("function '{}'", target.label()))),
            CallTarget::Method {
                object,
                namespace,
                name_hash,
                ..
            } => {
                let id = match object {
                    ObjectRef::Id(id) => *id,
                    ObjectRef::Addr(addr) => self
                        .objects
                        .find_object_by_address(*addr)
                        .ok_or_else(|| BindError::TargetNotFound(object.to_string()))?,
                };
                let object_entry = self
                    .objects
                    .find_object_entry(id)
                    .ok_or_else(|| BindError::TargetNotFound(ObjectRef::Id(id).to_string()))?;
                self.registry
                    .find_method(&object_entry, *namespace, *name_hash)
                    .map(|entry| Resolved { entry, object: id })
                    .ok_or_else(|| {
                        BindError::TargetNotFound(format!(
                            "method '{}' on object {}",
                            target.label(),
                            id
                        ))
                    })
            }
        }
    }
}
