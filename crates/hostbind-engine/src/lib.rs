//! hostbind engine - native-function binding layer
//!
//! Connects an embedded interpreter to host functions and methods:
//! - **Registration**: native callables are described once, checked against
//!   the dynamic type registry and published into a sealed [`Registry`]
//! - **Dispatch**: each entry owns a slot table; the interpreter writes the
//!   argument slots and the entry's adapter calls the native function
//! - **Host calls**: [`ScriptCaller`] runs the reverse direction, calling a
//!   registered function by name with natively typed arguments
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hostbind_engine::{CallTarget, NativeExecutor, ObjectTable, RegistryBuilder, ScriptCaller};
//!
//! let mut builder = RegistryBuilder::new();
//! builder.register_function("Add", |a: i32, b: i32| a + b)?;
//! let registry = Arc::new(builder.build());
//!
//! let objects = Arc::new(ObjectTable::new());
//! let executor = NativeExecutor::new(registry.clone(), objects.clone());
//! let caller = ScriptCaller::new(&registry, &executor, objects.as_ref());
//! let sum: i32 = caller.call(&CallTarget::function("Add"), (3, 4))?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// ============================================================================
// Core Modules
// ============================================================================

/// Native type to kind mappings
pub mod kinds;

/// Parameter slots and function contexts
pub mod slots;

/// Typed adapters between slot tables and native callables
pub mod adapter;

/// Default argument records
pub mod default_args;

/// Registration entries
pub mod entry;

/// Registry builder, sealed registry and the process-wide instance
pub mod registry;

/// Host-to-script calls
pub mod call;

// ============================================================================
// Support Modules
// ============================================================================

/// Kind conversion matrix and string parsing
pub mod convert;

/// Execute collaborator
pub mod exec;

/// Reference object table
pub mod objects;

/// Diagnostic sinks
pub mod diagnostics;

/// Binding configuration
pub mod config;

/// Limits and names
pub mod defaults;

// ============================================================================
// Re-exports
// ============================================================================

pub use adapter::{
    DispatchAdapter, Exclusive, FunctionAdapter, MethodAdapter, NativeFunction, NativeMethod,
    ScriptClass, Shared,
};
pub use call::{CallTarget, HostArgs, ObjectRef, ScriptCaller};
pub use config::{BindConfig, ConfigError, DuplicatePolicy};
pub use default_args::{DefaultArgs, DefaultValue};
pub use diagnostics::{MemorySink, TracingSink};
pub use entry::{EntryKey, FunctionKind, RegistrationEntry, Signature};
pub use exec::{Executor, NativeExecutor};
pub use kinds::KindRegistry;
pub use objects::ObjectTable;
pub use registry::{global, install, Binding, InstallReport, Registry, RegistryBuilder};
pub use slots::{FunctionContext, ParameterSlot};

pub use hostbind_sdk::{
    hash, ArgSource, BindError, BindResult, Diagnostic, DiagnosticSink, FromSlot, HostArg,
    IntoSlot, Kind, NativeType, ObjectAddr, ObjectEntry, ObjectId, ObjectRegistry, Severity,
    SlotValue, Vector3f, GLOBAL_NAMESPACE,
};
