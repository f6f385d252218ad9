//! Registration Entry
//!
//! Binds a (scope, name) pair to a dispatch adapter and the function's
//! shared slot table. Entries are created during startup and live for as
//! long as the registry that holds them.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use hostbind_sdk::{hash, BindError, BindResult, DiagnosticSink, Kind, SlotValue};
use parking_lot::{Mutex, MutexGuard};

use crate::adapter::DispatchAdapter;
use crate::default_args::DefaultArgs;
use crate::diagnostics::{fail, TracingSink};
use crate::slots::FunctionContext;

/// Registry key: (owner scope hash, name hash). Scope 0 is the global namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey {
    /// Hash of the owner scope
    pub scope: u32,
    /// Hash of the function name
    pub name: u32,
}

impl EntryKey {
    /// Key of `scope::name`
    pub const fn new(scope: &str, name: &str) -> Self {
        Self {
            scope: hash(scope),
            name: hash(name),
        }
    }

    /// Key from precomputed hashes
    pub const fn from_hashes(scope: u32, name: u32) -> Self {
        Self { scope, name }
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}:{:08x}", self.scope, self.name)
    }
}

/// How an entry is executed
pub enum FunctionKind {
    /// Native code behind a dispatch adapter
    Registered(Box<dyn DispatchAdapter>),
    /// Defined by the script; run by the executor
    Script,
}

impl fmt::Debug for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionKind::Registered(_) => f.write_str("Registered"),
            FunctionKind::Script => f.write_str("Script"),
        }
    }
}

/// Declared shape of an entry, readable without locking the context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Return kind
    pub return_kind: Kind,
    /// Parameter kinds, in order
    pub params: Vec<Kind>,
    /// Parameter slot names, in order
    pub param_names: Vec<String>,
}

impl Signature {
    fn of(ctx: &FunctionContext) -> Self {
        Self {
            return_kind: ctx.return_kind(),
            params: ctx.parameter_kinds().collect(),
            param_names: ctx.slots()[1..]
                .iter()
                .map(|slot| slot.name().to_string())
                .collect(),
        }
    }

    /// Number of parameters
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// A registered function or method
pub struct RegistrationEntry {
    scope: String,
    name: String,
    key: EntryKey,
    signature: Signature,
    kind: FunctionKind,
    context: Mutex<FunctionContext>,
    defaults: Option<DefaultArgs>,
    sink: Arc<dyn DiagnosticSink>,
}

impl fmt::Debug for RegistrationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationEntry")
            .field("name", &self.qualified_name())
            .field("key", &self.key)
            .field("signature", &self.signature)
            .field("kind", &self.kind)
            .field("defaults", &self.defaults.is_some())
            .finish()
    }
}

impl RegistrationEntry {
    pub(crate) fn new(scope: &str, name: &str, kind: FunctionKind, context: FunctionContext) -> Self {
        Self {
            scope: scope.to_string(),
            name: name.to_string(),
            key: EntryKey::new(scope, name),
            signature: Signature::of(&context),
            kind,
            context: Mutex::new(context),
            defaults: None,
            sink: Arc::new(TracingSink),
        }
    }

    /// Sink that failed `invoke` calls report to
    pub(crate) fn set_diagnostics(&mut self, sink: Arc<dyn DiagnosticSink>) {
        self.sink = sink;
    }

    /// Owner scope, empty for free functions
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Function name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `scope::name`, or just `name` for free functions
    pub fn qualified_name(&self) -> String {
        if self.scope.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.scope, self.name)
        }
    }

    /// Registry key
    pub fn key(&self) -> EntryKey {
        self.key
    }

    /// Hash of the function name
    pub fn name_hash(&self) -> u32 {
        self.key.name
    }

    /// Declared shape
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Number of parameters
    pub fn arity(&self) -> usize {
        self.signature.arity()
    }

    /// Whether the entry belongs to a class scope
    pub fn is_method(&self) -> bool {
        !self.scope.is_empty()
    }

    /// Whether the entry is script-defined
    pub fn is_script(&self) -> bool {
        matches!(self.kind, FunctionKind::Script)
    }

    /// Dispatch adapter of a native entry
    pub fn adapter(&self) -> Option<&dyn DispatchAdapter> {
        match &self.kind {
            FunctionKind::Registered(adapter) => Some(adapter.as_ref()),
            FunctionKind::Script => None,
        }
    }

    /// Attached default-argument record
    pub fn defaults(&self) -> Option<&DefaultArgs> {
        self.defaults.as_ref()
    }

    pub(crate) fn set_defaults(&mut self, defaults: DefaultArgs) -> BindResult<()> {
        if self.defaults.is_some() {
            return Err(BindError::DefaultsAlreadyAttached(self.qualified_name()));
        }
        self.defaults = Some(defaults);
        Ok(())
    }

    /// Slot table, while the entry is still owned by the builder
    pub(crate) fn context_mut(&mut self) -> &mut FunctionContext {
        self.context.get_mut()
    }

    /// Acquire the shared slot table for one call.
    ///
    /// Fails with `ContextBusy` if another call holds it.
    pub fn lock_context(&self) -> BindResult<MutexGuard<'_, FunctionContext>> {
        self.context
            .try_lock()
            .ok_or_else(|| BindError::ContextBusy(self.qualified_name()))
    }

    /// Call a native entry with already-converted argument values.
    ///
    /// Every value must match its slot kind exactly; slots are only written
    /// once all of them have been checked. Returns the content of slot 0.
    /// A failure is reported once to the registry's diagnostic sink.
    pub fn invoke(&self, receiver: Option<&mut dyn Any>, args: &[SlotValue]) -> BindResult<SlotValue> {
        self.try_invoke(receiver, args)
            .or_else(|err| fail(self.sink.as_ref(), err))
    }

    fn try_invoke(&self, receiver: Option<&mut dyn Any>, args: &[SlotValue]) -> BindResult<SlotValue> {
        let adapter = self.adapter().ok_or_else(|| {
            BindError::ExecutionFailed(format!(
                "'{}' is script-defined and has no native adapter",
                self.qualified_name()
            ))
        })?;

        if args.len() != self.arity() {
            return Err(BindError::ArityMismatch {
                function: self.qualified_name(),
                expected: self.arity(),
                supplied: args.len(),
            });
        }
        for (i, (arg, kind)) in args.iter().zip(&self.signature.params).enumerate() {
            if arg.kind() != *kind {
                return Err(BindError::SlotKindMismatch {
                    slot: i + 1,
                    expected: *kind,
                    found: arg.kind(),
                });
            }
        }

        let mut ctx = self.lock_context()?;
        for (i, arg) in args.iter().enumerate() {
            ctx.set_value(i + 1, arg.clone())?;
        }
        adapter.dispatch(receiver, &mut ctx)?;
        Ok(ctx.return_value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{FunctionAdapter, NativeFunction};
    use crate::diagnostics::MemorySink;
    use crate::kinds::KindRegistry;
    use hostbind_sdk::NativeType;

    fn entry_for<F, Args>(scope: &str, name: &str, func: F) -> RegistrationEntry
    where
        F: NativeFunction<Args>,
        Args: 'static,
    {
        let ctx = FunctionContext::for_signature(
            &KindRegistry::new(),
            NativeType::of::<F::Output>(),
            &F::param_types(),
        )
        .unwrap();
        RegistrationEntry::new(
            scope,
            name,
            FunctionKind::Registered(Box::new(FunctionAdapter::new(func))),
            ctx,
        )
    }

    #[test]
    fn test_key_and_names() {
        let entry = entry_for("", "Add", |a: i32, b: i32| a + b);
        assert_eq!(entry.key(), EntryKey::new("", "Add"));
        assert_eq!(entry.key().scope, 0);
        assert_eq!(entry.name_hash(), hash("Add"));
        assert_eq!(entry.qualified_name(), "Add");
        assert!(!entry.is_method());
        assert!(!entry.is_script());
        assert_eq!(entry.arity(), 2);

        let entry = entry_for("Widget", "Size", || 3);
        assert_eq!(entry.qualified_name(), "Widget::Size");
        assert!(entry.is_method());
    }

    #[test]
    fn test_invoke() {
        let entry = entry_for("", "Add", |a: i32, b: i32| a + b);
        let result = entry
            .invoke(None, &[SlotValue::Int(3), SlotValue::Int(4)])
            .unwrap();
        assert_eq!(result, SlotValue::Int(7));
    }

    #[test]
    fn test_invoke_checks_before_writing() {
        let entry = entry_for("", "Add", |a: i32, b: i32| a + b);
        let err = entry
            .invoke(None, &[SlotValue::Int(3), SlotValue::Float(4.0)])
            .unwrap_err();
        assert_eq!(
            err,
            BindError::SlotKindMismatch {
                slot: 2,
                expected: Kind::Int,
                found: Kind::Float
            }
        );
        assert!(entry.lock_context().unwrap().value(1).unwrap().is_void());

        let err = entry.invoke(None, &[SlotValue::Int(3)]).unwrap_err();
        assert!(matches!(err, BindError::ArityMismatch { expected: 2, supplied: 1, .. }));
    }

    #[test]
    fn test_busy_context() {
        let entry = entry_for("", "Add", |a: i32, b: i32| a + b);
        let _held = entry.lock_context().unwrap();
        let err = entry
            .invoke(None, &[SlotValue::Int(1), SlotValue::Int(2)])
            .unwrap_err();
        assert_eq!(err, BindError::ContextBusy("Add".to_string()));
    }

    #[test]
    fn test_failed_invoke_reports_once() {
        let sink = Arc::new(MemorySink::new());
        let mut entry = entry_for("", "Add", |a: i32, b: i32| a + b);
        entry.set_diagnostics(sink.clone());

        let err = entry.invoke(None, &[SlotValue::Int(1)]).unwrap_err();
        assert!(matches!(err, BindError::ArityMismatch { expected: 2, supplied: 1, .. }));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.diagnostics()[0].message, err.to_string());

        {
            let _held = entry.lock_context().unwrap();
            entry
                .invoke(None, &[SlotValue::Int(1), SlotValue::Int(2)])
                .unwrap_err();
        }
        assert_eq!(sink.len(), 2);

        entry
            .invoke(None, &[SlotValue::Int(1), SlotValue::Int(2)])
            .unwrap();
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_signature_keeps_parameter_names() {
        let params = [("from", Kind::Float), ("to", Kind::Float)];
        let ctx = FunctionContext::for_script(Kind::Float, &params).unwrap();
        let entry = RegistrationEntry::new("", "Lerp", FunctionKind::Script, ctx);
        assert_eq!(entry.signature().param_names, vec!["from", "to"]);

        let entry = entry_for("", "Add", |a: i32, b: i32| a + b);
        assert_eq!(entry.signature().param_names, vec!["_p1", "_p2"]);
    }

    #[test]
    fn test_script_entry_has_no_adapter() {
        let ctx = FunctionContext::for_script(Kind::Int, &[("x", Kind::Int)]).unwrap();
        let entry = RegistrationEntry::new("", "Double", FunctionKind::Script, ctx);
        assert!(entry.is_script());
        assert!(entry.adapter().is_none());
        assert!(matches!(
            entry.invoke(None, &[SlotValue::Int(1)]),
            Err(BindError::ExecutionFailed(_))
        ));
    }

    #[test]
    fn test_defaults_attach_once() {
        let mut entry = entry_for("", "Neg", |a: i32| -a);
        entry.set_defaults(DefaultArgs::new("r").param("a", 1)).unwrap();
        let err = entry
            .set_defaults(DefaultArgs::new("r").param("a", 2))
            .unwrap_err();
        assert_eq!(err, BindError::DefaultsAlreadyAttached("Neg".to_string()));
        assert_eq!(
            entry.defaults().unwrap().default_value(1).unwrap().value(),
            &SlotValue::Int(1)
        );
    }
}
