//! hostbind SDK - value model shared by native bindings and the interpreter
//!
//! This crate provides the minimal types and traits needed to describe a
//! native binding without depending on the full hostbind-engine:
//!
//! - [`Kind`]: the closed set of dynamic value kinds the interpreter knows
//! - [`SlotValue`]: the tagged value stored in a parameter slot
//! - [`FromSlot`] / [`IntoSlot`]: typed conversion out of and into slots
//! - [`HostArg`]: how a natively typed argument enters a host-to-script call
//! - [`BindError`]: the error taxonomy of the binding layer
//! - collaborator traits for the object registry and diagnostic reporting
//!
//! # Example
//!
//! ```ignore
//! use hostbind_sdk::{FromSlot, IntoSlot, SlotValue};
//!
//! let v = 7i32.into_slot();
//! assert_eq!(i32::from_slot(&v).unwrap(), 7);
//! ```

#![warn(missing_docs)]

pub mod context;
pub mod convert;
pub mod error;
pub mod hash;
pub mod kind;
pub mod value;

pub use context::{Diagnostic, DiagnosticSink, ObjectEntry, ObjectRegistry, Severity};
pub use convert::{ArgSource, FromSlot, HostArg, IntoSlot, NativeType};
pub use error::{BindError, BindResult};
pub use hash::{hash, GLOBAL_NAMESPACE};
pub use kind::Kind;
pub use value::{ObjectAddr, ObjectId, SlotValue, Vector3f};
