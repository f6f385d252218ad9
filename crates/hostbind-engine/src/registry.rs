//! Registry
//!
//! Process-wide lookup from (scope hash, name hash) to registration entries.
//! Populated once during startup through a `RegistryBuilder`, then sealed
//! into an immutable `Registry` that is shared across threads.
//!
//! # Example
//!
//! ```ignore
//! let mut builder = RegistryBuilder::new();
//! builder.register_function("Add", |a: i32, b: i32| a + b)?;
//! let registry = Arc::new(builder.build());
//! ```

use std::fmt::Write as _;
use std::sync::Arc;

use hostbind_sdk::{
    BindError, BindResult, Diagnostic, DiagnosticSink, Kind, NativeType, ObjectEntry,
    SlotValue, GLOBAL_NAMESPACE,
};
use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;

use crate::adapter::{
    DispatchAdapter, FunctionAdapter, MethodAdapter, NativeFunction, NativeMethod, ScriptClass,
};
use crate::config::{BindConfig, DuplicatePolicy};
use crate::default_args::DefaultArgs;
use crate::diagnostics::{fail, TracingSink};
use crate::entry::{EntryKey, FunctionKind, RegistrationEntry};
use crate::kinds::KindRegistry;
use crate::slots::FunctionContext;

// ============================================================================
// Binding descriptors
// ============================================================================

/// Everything needed to register one native function or method
pub struct Binding {
    scope: String,
    name: String,
    return_type: NativeType,
    params: Vec<NativeType>,
    adapter: Box<dyn DispatchAdapter>,
    defaults: Option<DefaultArgs>,
}

impl Binding {
    /// Free function `name`
    pub fn function<F, Args>(name: &str, func: F) -> Self
    where
        F: NativeFunction<Args>,
        Args: 'static,
    {
        Self {
            scope: String::new(),
            name: name.to_string(),
            return_type: NativeType::of::<F::Output>(),
            params: F::param_types(),
            adapter: Box::new(FunctionAdapter::new(func)),
            defaults: None,
        }
    }

    /// Method `name` of `C`, in the namespace of `C::CLASS_NAME`
    pub fn method<C, F, Args>(name: &str, func: F) -> Self
    where
        C: ScriptClass,
        F: NativeMethod<C, Args>,
        Args: 'static,
    {
        Self::method_in::<C, F, Args>(C::CLASS_NAME, name, func)
    }

    /// Method `name` of `C`, in the namespace `class_name`
    pub fn method_in<C, F, Args>(class_name: &'static str, name: &str, func: F) -> Self
    where
        C: 'static,
        F: NativeMethod<C, Args>,
        Args: 'static,
    {
        Self {
            scope: class_name.to_string(),
            name: name.to_string(),
            return_type: NativeType::of::<F::Output>(),
            params: F::param_types(),
            adapter: Box::new(MethodAdapter::<C, F, Args>::new(name, class_name, func)),
            defaults: None,
        }
    }

    /// Attach a default-argument record, installed together with the entry
    pub fn with_defaults(mut self, defaults: DefaultArgs) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Owner scope, empty for free functions
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Function name
    pub fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> String {
        qualified(&self.scope, &self.name)
    }
}

fn qualified(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", scope, name)
    }
}

/// Outcome of installing a registration table
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InstallReport {
    /// Keys of the entries that were published
    pub installed: Vec<EntryKey>,
    /// Bindings that were rejected, by qualified name
    pub failed: Vec<(String, BindError)>,
}

impl InstallReport {
    /// True when every binding was installed
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

// ============================================================================
// RegistryBuilder
// ============================================================================

/// Collects registration entries during startup
pub struct RegistryBuilder {
    config: BindConfig,
    kinds: KindRegistry,
    entries: FxHashMap<EntryKey, RegistrationEntry>,
    sink: Arc<dyn DiagnosticSink>,
}

impl RegistryBuilder {
    /// Builder with the default configuration, built-in kinds and a tracing sink
    pub fn new() -> Self {
        Self::with_config(BindConfig::default())
    }

    /// Builder with `config`
    pub fn with_config(config: BindConfig) -> Self {
        Self {
            config,
            kinds: KindRegistry::new(),
            entries: FxHashMap::default(),
            sink: Arc::new(TracingSink),
        }
    }

    /// Route diagnostics to `sink`
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Type registry, for host mappings added before registration starts
    pub fn kinds_mut(&mut self) -> &mut KindRegistry {
        &mut self.kinds
    }

    /// Active configuration
    pub fn config(&self) -> &BindConfig {
        &self.config
    }

    /// Register a native callable from its parts.
    ///
    /// The entry is published only if every type maps to a kind and the
    /// key is free (or the duplicate policy allows replacing it).
    pub fn register_raw(
        &mut self,
        scope: &str,
        name: &str,
        return_type: NativeType,
        params: &[NativeType],
        adapter: Box<dyn DispatchAdapter>,
    ) -> BindResult<EntryKey> {
        let entry = self
            .build_native_entry(scope, name, return_type, params, adapter)
            .or_else(|err| fail(self.sink.as_ref(), err))?;
        self.publish(entry)
    }

    /// Register a free function
    pub fn register_function<F, Args>(&mut self, name: &str, func: F) -> BindResult<EntryKey>
    where
        F: NativeFunction<Args>,
        Args: 'static,
    {
        self.register(Binding::function(name, func))
    }

    /// Register a method of `C`
    pub fn register_method<C, F, Args>(&mut self, name: &str, func: F) -> BindResult<EntryKey>
    where
        C: ScriptClass,
        F: NativeMethod<C, Args>,
        Args: 'static,
    {
        self.register(Binding::method::<C, F, Args>(name, func))
    }

    /// Register one binding, together with its default-argument record.
    ///
    /// A binding whose defaults do not fit its signature is not published.
    pub fn register(&mut self, binding: Binding) -> BindResult<EntryKey> {
        let Binding {
            scope,
            name,
            return_type,
            params,
            adapter,
            defaults,
        } = binding;

        let mut entry = self
            .build_native_entry(&scope, &name, return_type, &params, adapter)
            .or_else(|err| fail(self.sink.as_ref(), err))?;
        if let Some(defaults) = defaults {
            self.check_defaults(&mut entry, &defaults)
                .or_else(|err| fail(self.sink.as_ref(), err))?;
            entry.set_defaults(defaults)?;
        }
        self.publish(entry)
    }

    /// Install a registration table in one pass.
    ///
    /// Each failure is reported and recorded; it never stops the remaining
    /// bindings from installing.
    pub fn install<I>(&mut self, bindings: I) -> InstallReport
    where
        I: IntoIterator<Item = Binding>,
    {
        let mut report = InstallReport::default();
        for binding in bindings {
            let label = binding.label();
            match self.register(binding) {
                Ok(key) => report.installed.push(key),
                Err(err) => report.failed.push((label, err)),
            }
        }
        tracing::debug!(
            installed = report.installed.len(),
            failed = report.failed.len(),
            "registration table installed"
        );
        report
    }

    /// Declare a script-defined function; the executor runs it
    pub fn declare_script_function(
        &mut self,
        scope: &str,
        name: &str,
        return_kind: Kind,
        params: &[(&str, Kind)],
    ) -> BindResult<EntryKey> {
        let entry = self
            .check_arity(scope, name, params.len())
            .and_then(|()| FunctionContext::for_script(return_kind, params))
            .map(|ctx| RegistrationEntry::new(scope, name, FunctionKind::Script, ctx))
            .or_else(|err| fail(self.sink.as_ref(), err))?;
        self.publish(entry)
    }

    /// Attach a default-argument record to an already registered entry.
    ///
    /// On failure the entry stays registered without defaults.
    pub fn attach_defaults(&mut self, key: EntryKey, defaults: DefaultArgs) -> BindResult<()> {
        let validate = self.config.validate_defaults;
        let Some(entry) = self.entries.get_mut(&key) else {
            return fail(
                self.sink.as_ref(),
                BindError::TargetNotFound(format!("no entry for key {}", key)),
            );
        };
        let result = if entry.defaults().is_some() {
            Err(BindError::DefaultsAlreadyAttached(entry.qualified_name()))
        } else {
            let name = entry.qualified_name();
            defaults.validate(&name, entry.context_mut(), validate)
        };
        match result {
            Ok(()) => {
                tracing::debug!(function = %entry.qualified_name(), "default arguments attached");
                entry.set_defaults(defaults)
            }
            Err(err) => fail(self.sink.as_ref(), err),
        }
    }

    /// Whether `key` is registered
    pub fn contains(&self, key: EntryKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Number of registered entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Seal into a read-only registry
    pub fn build(mut self) -> Registry {
        for entry in self.entries.values_mut() {
            entry.set_diagnostics(self.sink.clone());
        }
        tracing::debug!(entries = self.entries.len(), "registry sealed");
        Registry {
            config: self.config,
            kinds: self.kinds,
            entries: self.entries,
            sink: self.sink,
        }
    }

    fn check_arity(&self, scope: &str, name: &str, arity: usize) -> BindResult<()> {
        if arity > self.config.max_parameters {
            return Err(BindError::TooManyParameters {
                name: qualified(scope, name),
                arity,
                max: self.config.max_parameters,
            });
        }
        Ok(())
    }

    fn build_native_entry(
        &self,
        scope: &str,
        name: &str,
        return_type: NativeType,
        params: &[NativeType],
        adapter: Box<dyn DispatchAdapter>,
    ) -> BindResult<RegistrationEntry> {
        self.check_arity(scope, name, params.len())?;
        let ctx = FunctionContext::for_signature(&self.kinds, return_type, params)?;
        Ok(RegistrationEntry::new(
            scope,
            name,
            FunctionKind::Registered(adapter),
            ctx,
        ))
    }

    fn check_defaults(&self, entry: &mut RegistrationEntry, defaults: &DefaultArgs) -> BindResult<()> {
        let name = entry.qualified_name();
        defaults.validate(&name, entry.context_mut(), self.config.validate_defaults)
    }

    fn publish(&mut self, entry: RegistrationEntry) -> BindResult<EntryKey> {
        let key = entry.key();
        if let Some(existing) = self.entries.get(&key) {
            match self.config.duplicate_policy {
                DuplicatePolicy::Reject => {
                    return fail(
                        self.sink.as_ref(),
                        BindError::RegistrationConflict {
                            scope: existing.scope().to_string(),
                            name: existing.name().to_string(),
                        },
                    );
                }
                DuplicatePolicy::LastWins => {
                    self.sink.report(Diagnostic::warning(format!(
                        "'{}' registered twice, replacing the earlier entry",
                        entry.qualified_name()
                    )));
                }
            }
        }

        tracing::debug!(
            function = %entry.qualified_name(),
            arity = entry.arity(),
            script = entry.is_script(),
            "registered"
        );
        self.entries.insert(key, entry);
        Ok(key)
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Sealed, read-only registry of entries
pub struct Registry {
    config: BindConfig,
    kinds: KindRegistry,
    entries: FxHashMap<EntryKey, RegistrationEntry>,
    sink: Arc<dyn DiagnosticSink>,
}

impl Registry {
    /// Entry at `key`
    pub fn find(&self, key: EntryKey) -> Option<&RegistrationEntry> {
        self.entries.get(&key)
    }

    /// Entry by scope and name
    pub fn find_by_name(&self, scope: &str, name: &str) -> Option<&RegistrationEntry> {
        self.find(EntryKey::new(scope, name))
    }

    /// Free function by name hash
    pub fn find_function(&self, name_hash: u32) -> Option<&RegistrationEntry> {
        self.find(EntryKey::from_hashes(GLOBAL_NAMESPACE, name_hash))
    }

    /// Method of an object.
    ///
    /// With `namespace` 0 the object's namespace chain is searched, most
    /// derived first. Otherwise only `namespace` is searched, and it must
    /// belong to the object's chain.
    pub fn find_method(
        &self,
        object: &ObjectEntry,
        namespace: u32,
        name_hash: u32,
    ) -> Option<&RegistrationEntry> {
        if namespace != GLOBAL_NAMESPACE {
            if !object.has_namespace(namespace) {
                return None;
            }
            return self.find(EntryKey::from_hashes(namespace, name_hash));
        }
        object
            .namespaces
            .iter()
            .find_map(|ns| self.find(EntryKey::from_hashes(*ns, name_hash)))
    }

    /// Type registry the entries were built with
    pub fn kinds(&self) -> &KindRegistry {
        &self.kinds
    }

    /// Configuration the registry was built with
    pub fn config(&self) -> &BindConfig {
        &self.config
    }

    /// Diagnostic sink
    pub fn diagnostics(&self) -> &dyn DiagnosticSink {
        self.sink.as_ref()
    }

    /// Every entry, in no particular order
    pub fn entries(&self) -> impl Iterator<Item = &RegistrationEntry> {
        self.entries.values()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Signature line and help text of an entry, for help output:
    ///
    /// ```text
    /// int Add(int a = 1, int b = 2)
    /// Adds two numbers
    /// ```
    pub fn describe(&self, key: EntryKey) -> Option<String> {
        let entry = self.find(key)?;
        let signature = entry.signature();
        let defaults = entry.defaults();
        let script_names: &[String] = if entry.is_script() && defaults.is_none() {
            &signature.param_names
        } else {
            &[]
        };

        let mut out = String::new();
        let _ = write!(
            out,
            "{} {}(",
            signature.return_kind,
            entry.qualified_name()
        );
        for (i, kind) in signature.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(kind.name());
            let index = i + 1;
            if let Some(d) = defaults.and_then(|d| d.default_value(index)) {
                let _ = write!(out, " {} = ", d.name());
                match d.value() {
                    SlotValue::String(s) => {
                        let _ = write!(out, "\"{}\"", s);
                    }
                    value => {
                        let _ = write!(out, "{}", value);
                    }
                }
            } else if let Some(name) = script_names.get(i) {
                let _ = write!(out, " {}", name);
            }
        }
        out.push(')');

        if let Some(help) = defaults.map(|d| d.help()).filter(|h| !h.is_empty()) {
            out.push('\n');
            out.push_str(help);
        }
        Some(out)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.entries.len())
            .field("config", &self.config)
            .finish()
    }
}

// ============================================================================
// Process-wide registry
// ============================================================================

static GLOBAL: OnceCell<Arc<Registry>> = OnceCell::new();

/// Install the process-wide registry; only the first call succeeds
pub fn install(registry: Arc<Registry>) -> BindResult<()> {
    GLOBAL
        .set(registry)
        .map_err(|_| BindError::AlreadyInstalled)
}

/// The process-wide registry, once installed
pub fn global() -> Option<&'static Arc<Registry>> {
    GLOBAL.get()
}
