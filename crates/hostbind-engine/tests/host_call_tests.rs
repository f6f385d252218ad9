//! Host-to-Script Call Tests
//!
//! End-to-end tests of the binding layer: bindings generated by the
//! attribute macros are installed into a registry, objects live in an
//! `ObjectTable`, and calls go through `ScriptCaller` and `NativeExecutor`.
//!
//! # Running Tests
//! ```bash
//! cargo test --test host_call_tests
//! ```

use std::sync::Arc;

use hostbind_engine::{
    hash, BindError, CallTarget, DefaultArgs, EntryKey, FromSlot, IntoSlot, MemorySink,
    NativeExecutor, ObjectAddr, ObjectTable, Registry, RegistryBuilder, ScriptCaller,
    ScriptClass, Severity, SlotValue, Vector3f,
};
use hostbind_native::{function, method};

// ===== Bindings =====

#[function(name = "Add")]
fn add(a: i32, b: i32) -> i32 {
    a + b
}

#[function(name = "Scale")]
fn scale(v: Vector3f, factor: f32) -> Vector3f {
    Vector3f::new(v.x * factor, v.y * factor, v.z * factor)
}

#[function]
fn shout(text: String) -> String {
    text.to_uppercase()
}

struct Text {
    value: String,
}

impl ScriptClass for Text {
    const CLASS_NAME: &'static str = "Text";
}

impl Text {
    #[method(name = "Concat")]
    fn concat(&self, suffix: String) -> String {
        format!("{}{}", self.value, suffix)
    }

    #[method(name = "Append")]
    fn append(&mut self, suffix: String) -> i32 {
        self.value.push_str(&suffix);
        self.value.len() as i32
    }

    #[method(name = "Length", class = "Sequence")]
    fn length(&self) -> i32 {
        self.value.len() as i32
    }
}

struct Joiner {
    separator: String,
}

impl ScriptClass for Joiner {
    const CLASS_NAME: &'static str = "Joiner";
}

impl Joiner {
    #[method(name = "Concat")]
    fn concat(&self, a: String, b: String) -> String {
        format!("{}{}{}", a, self.separator, b)
    }
}

#[function(name = "Sum12")]
#[allow(clippy::too_many_arguments)]
fn sum12(
    a: i32,
    b: i32,
    c: i32,
    d: i32,
    e: i32,
    f: i32,
    g: i32,
    h: i32,
    i: i32,
    j: i32,
    k: i32,
    l: f32,
) -> f32 {
    (a + b + c + d + e + f + g + h + i + j + k) as f32 + l
}

struct Tally {
    total: i32,
}

impl ScriptClass for Tally {
    const CLASS_NAME: &'static str = "Tally";
}

impl Tally {
    #[method(name = "AddAll")]
    #[allow(clippy::too_many_arguments)]
    fn add_all(
        &mut self,
        a: i32,
        b: i32,
        c: i32,
        d: i32,
        e: i32,
        f: i32,
        g: i32,
        h: i32,
        i: i32,
        j: i32,
        k: i32,
        label: String,
    ) -> String {
        self.total += a + b + c + d + e + f + g + h + i + j + k;
        format!("{}={}", label, self.total)
    }
}

/// Host type with slot conversions but no kind mapping
struct Kelvin(f32);

impl FromSlot for Kelvin {
    fn from_slot(value: &SlotValue) -> Result<Self, BindError> {
        f32::from_slot(value).map(Kelvin)
    }
}

impl IntoSlot for Kelvin {
    fn into_slot(self) -> SlotValue {
        SlotValue::Float(self.0)
    }
}

#[function(name = "ToKelvin")]
fn to_kelvin(celsius: f32) -> Kelvin {
    Kelvin(celsius + 273.15)
}

// ===== Harness =====

struct Harness {
    registry: Arc<Registry>,
    objects: Arc<ObjectTable>,
    executor: NativeExecutor,
    sink: Arc<MemorySink>,
}

impl Harness {
    fn caller(&self) -> ScriptCaller<'_> {
        ScriptCaller::new(&self.registry, &self.executor, self.objects.as_ref())
    }
}

fn harness() -> Harness {
    let sink = Arc::new(MemorySink::new());
    let mut builder = RegistryBuilder::new().with_diagnostics(sink.clone());
    let report = builder.install([
        add_binding().with_defaults(
            DefaultArgs::new("sum")
                .param("a", 1)
                .param("b", 2)
                .with_help("Adds two numbers"),
        ),
        scale_binding(),
        shout_binding(),
        Text::concat_binding(),
        Text::append_binding(),
        Text::length_binding(),
        Joiner::concat_binding(),
        sum12_binding(),
        Tally::add_all_binding(),
    ]);
    assert!(report.is_ok(), "{:?}", report.failed);
    assert!(sink.is_empty());

    let registry = Arc::new(builder.build());
    let objects = Arc::new(ObjectTable::new());
    let executor = NativeExecutor::new(registry.clone(), objects.clone());
    Harness {
        registry,
        objects,
        executor,
        sink,
    }
}

// ===== Free Functions =====

#[test]
fn test_add() {
    let h = harness();
    let sum: i32 = h.caller().call(&CallTarget::function("Add"), (3, 4)).unwrap();
    assert_eq!(sum, 7);
    assert!(h.sink.is_empty());
}

#[test]
fn test_add_converts_arguments_and_result() {
    let h = harness();
    let caller = h.caller();
    let target = CallTarget::function("Add");

    let sum: i32 = caller.call(&target, ("3", 4.9f32)).unwrap();
    assert_eq!(sum, 7);
    let sum: i32 = caller.call(&target, (true, "0x10")).unwrap();
    assert_eq!(sum, 17);

    let text: String = caller.call(&target, (3, 4)).unwrap();
    assert_eq!(text, "7");
    let float: f32 = caller.call(&target, (3, 4)).unwrap();
    assert_eq!(float, 7.0);
    let flag: bool = caller.call(&target, (0, 0)).unwrap();
    assert!(!flag);
}

#[test]
fn test_call_by_hash() {
    let h = harness();
    let sum: i32 = h
        .caller()
        .call(&CallTarget::function_hash(hash("Add")), (20, 22))
        .unwrap();
    assert_eq!(sum, 42);
}

#[test]
fn test_vector_arguments() {
    let h = harness();
    let caller = h.caller();
    let target = CallTarget::function("Scale");

    let v: Vector3f = caller
        .call(&target, (Vector3f::new(1.0, 2.0, 3.0), 2))
        .unwrap();
    assert_eq!(v, Vector3f::new(2.0, 4.0, 6.0));

    let v: Vector3f = caller.call(&target, ("1, 2, 3", 0.5f32)).unwrap();
    assert_eq!(v, Vector3f::new(0.5, 1.0, 1.5));

    let text: String = caller.call(&target, ("1 1 1", 1)).unwrap();
    assert_eq!(text, "1.0000 1.0000 1.0000");
}

#[test]
fn test_string_argument_by_reference_and_by_value() {
    let h = harness();
    let caller = h.caller();
    let target = CallTarget::function("shout");
    let owned = String::from("quiet");

    let by_literal: String = caller.call(&target, ("quiet",)).unwrap();
    let by_ref: String = caller.call(&target, (&owned,)).unwrap();
    let by_str: String = caller.call(&target, (owned.as_str(),)).unwrap();
    let by_value: String = caller.call(&target, (owned.clone(),)).unwrap();

    assert_eq!(by_literal, "QUIET");
    assert_eq!(by_ref, by_literal);
    assert_eq!(by_str, by_literal);
    assert_eq!(by_value, by_literal);

    // non-string arguments are rendered into the string slot
    let number: String = caller.call(&target, (2.5f32,)).unwrap();
    assert_eq!(number, "2.5000");
}

#[test]
fn test_slot_values_as_arguments() {
    let h = harness();
    let args = vec![SlotValue::Int(5), SlotValue::string("6")];
    let sum: i32 = h.caller().call(&CallTarget::function("Add"), &args).unwrap();
    assert_eq!(sum, 11);
}

#[test]
fn test_twelve_argument_function() {
    let h = harness();
    let total: f32 = h
        .caller()
        .call(
            &CallTarget::function("Sum12"),
            (1, 2, 3, 4, 5, 6, 7, 8, 9, 10, "11", 0.5f32),
        )
        .unwrap();
    assert_eq!(total, 66.5);
    assert_eq!(h.registry.find_by_name("", "Sum12").unwrap().arity(), 12);
    assert!(h.sink.is_empty());
}

// ===== Methods =====

#[test]
fn test_twelve_argument_method() {
    let h = harness();
    let id = h.objects.register(Tally { total: 0 });
    let target = CallTarget::method(id, "AddAll");
    let args = (1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, "tally");

    let out: String = h.caller().call(&target, args).unwrap();
    assert_eq!(out, "tally=11");
    let out: String = h.caller().call(&target, args).unwrap();
    assert_eq!(out, "tally=22");
    assert_eq!(h.objects.with_object(id, |t: &mut Tally| t.total), Some(22));
}

#[test]
fn test_concat_method_by_id() {
    let h = harness();
    let id = h.objects.register(Text {
        value: "foo".to_string(),
    });
    let out: String = h
        .caller()
        .call(&CallTarget::method(id, "Concat"), ("bar",))
        .unwrap();
    assert_eq!(out, "foobar");
}

#[test]
fn test_two_argument_concat() {
    let h = harness();
    let id = h.objects.register(Joiner {
        separator: String::new(),
    });
    let out: String = h
        .caller()
        .call(&CallTarget::method(id, "Concat"), ("foo", "bar"))
        .unwrap();
    assert_eq!(out, "foobar");
    assert!(h.sink.is_empty());
}

#[test]
fn test_concat_method_by_address() {
    let h = harness();
    let id = h.objects.register(Text {
        value: "foo".to_string(),
    });
    let addr = h.objects.address_of(id).unwrap();
    let out: String = h
        .caller()
        .call(&CallTarget::method(addr, "Concat"), ("bar",))
        .unwrap();
    assert_eq!(out, "foobar");

    let err = h
        .caller()
        .call::<String, _>(
            &CallTarget::method(ObjectAddr::from_raw(0x10), "Concat"),
            ("bar",),
        )
        .unwrap_err();
    assert!(matches!(err, BindError::TargetNotFound(_)));
    assert_eq!(h.sink.count(Severity::Error), 1);
}

#[test]
fn test_mutating_method() {
    let h = harness();
    let id = h.objects.register(Text {
        value: "foo".to_string(),
    });
    let len: i32 = h
        .caller()
        .call(&CallTarget::method(id, "Append"), ("bar",))
        .unwrap();
    assert_eq!(len, 6);
    h.caller()
        .call_void(&CallTarget::method(id, "Append"), ("!",))
        .unwrap();

    let value = h.objects.with_object(id, |t: &mut Text| t.value.clone());
    assert_eq!(value.as_deref(), Some("foobar!"));
}

#[test]
fn test_method_namespace_chain() {
    let h = harness();
    let id = h.objects.register_in(
        Text {
            value: "abc".to_string(),
        },
        &["Text", "Sequence"],
    );
    let caller = h.caller();

    // found further down the chain
    let len: i32 = caller.call(&CallTarget::method(id, "Length"), ()).unwrap();
    assert_eq!(len, 3);

    let out: String = caller
        .call(&CallTarget::method(id, "Concat").in_namespace("Text"), ("d",))
        .unwrap();
    assert_eq!(out, "abcd");

    let err = caller
        .call::<String, _>(&CallTarget::method(id, "Concat").in_namespace("Sequence"), ("d",))
        .unwrap_err();
    assert!(matches!(err, BindError::TargetNotFound(_)));

    // an object outside the `Sequence` namespace does not see `Length`
    let plain = h.objects.register(Text {
        value: "x".to_string(),
    });
    let err = caller
        .call::<i32, _>(&CallTarget::method(plain, "Length"), ())
        .unwrap_err();
    assert!(matches!(err, BindError::TargetNotFound(_)));
    assert_eq!(h.sink.len(), 2);
}

#[test]
fn test_method_on_removed_object() {
    let h = harness();
    let id = h.objects.register(Text {
        value: "gone".to_string(),
    });
    let text: Text = h.objects.remove(id).unwrap();
    assert_eq!(text.value, "gone");

    let err = h
        .caller()
        .call::<String, _>(&CallTarget::method(id, "Concat"), ("x",))
        .unwrap_err();
    assert!(matches!(err, BindError::TargetNotFound(_)));
}

// ===== Failures =====

#[test]
fn test_unknown_function_reports_once() {
    let h = harness();
    let err = h
        .caller()
        .call::<i32, _>(&CallTarget::function_hash(hash("Subtract")), (1, 2))
        .unwrap_err();
    assert!(matches!(err, BindError::TargetNotFound(_)));
    assert_eq!(h.sink.len(), 1);
    assert_eq!(h.sink.count(Severity::Error), 1);
}

#[test]
fn test_arity_mismatch_leaves_slots_untouched() {
    let h = harness();
    let caller = h.caller();
    let target = CallTarget::function("Add");
    let _: i32 = caller.call(&target, (3, 4)).unwrap();

    for err in [
        caller.call::<i32, _>(&target, (9,)).unwrap_err(),
        caller.call::<i32, _>(&target, (9, 9, 9)).unwrap_err(),
    ] {
        assert!(matches!(
            err,
            BindError::ArityMismatch {
                expected: 2,
                ..
            }
        ));
    }
    assert_eq!(h.sink.len(), 2);

    let entry = h.registry.find_by_name("", "Add").unwrap();
    let ctx = entry.lock_context().unwrap();
    assert_eq!(ctx.value(1), Some(&SlotValue::Int(3)));
    assert_eq!(ctx.value(2), Some(&SlotValue::Int(4)));
    assert_eq!(ctx.return_value(), &SlotValue::Int(7));
}

#[test]
fn test_failed_conversion_leaves_slots_untouched() {
    let h = harness();
    let caller = h.caller();
    let target = CallTarget::function("Add");
    let _: i32 = caller.call(&target, (1, 1)).unwrap();

    let err = caller
        .call::<i32, _>(&target, (5, Vector3f::ZERO))
        .unwrap_err();
    assert_eq!(
        err,
        BindError::ArgumentConversionFailed {
            function: "Add".to_string(),
            index: 2
        }
    );

    let err = caller.call::<Kelvin, _>(&target, (5, 5)).err().unwrap();
    assert!(matches!(err, BindError::UnsupportedReturnType(_)));

    let entry = h.registry.find_by_name("", "Add").unwrap();
    assert_eq!(entry.lock_context().unwrap().value(1), Some(&SlotValue::Int(1)));
    assert_eq!(h.sink.len(), 2);
}

#[test]
fn test_return_conversion_failure() {
    let h = harness();
    let err = h
        .caller()
        .call::<Vector3f, _>(&CallTarget::function("Add"), (1, 2))
        .unwrap_err();
    assert!(matches!(err, BindError::ReturnConversionFailed { .. }));
    assert_eq!(h.sink.len(), 1);
}

#[test]
fn test_unregistered_type_is_never_published() {
    let sink = Arc::new(MemorySink::new());
    let mut builder = RegistryBuilder::new().with_diagnostics(sink.clone());
    let report = builder.install([add_binding(), to_kelvin_binding()]);

    assert_eq!(report.installed, vec![EntryKey::new("", "Add")]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "ToKelvin");
    assert!(matches!(
        report.failed[0].1,
        BindError::UnrecognizedType { position: 0, .. }
    ));
    assert_eq!(sink.len(), 1);

    let registry = builder.build();
    assert!(registry.find_by_name("", "ToKelvin").is_none());
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_host_mapping_makes_type_bindable() {
    let mut builder = RegistryBuilder::new();
    builder.kinds_mut().register::<Kelvin>(hostbind_engine::Kind::Float);
    builder.register(to_kelvin_binding()).unwrap();
    let registry = Arc::new(builder.build());
    let objects = Arc::new(ObjectTable::new());
    let executor = NativeExecutor::new(registry.clone(), objects.clone());
    let caller = ScriptCaller::new(&registry, &executor, objects.as_ref());

    let k: Kelvin = caller.call(&CallTarget::function("ToKelvin"), (0,)).unwrap();
    assert!((k.0 - 273.15).abs() < 1e-4);
}

// ===== Introspection and direct invocation =====

#[test]
fn test_describe_with_defaults() {
    let h = harness();
    let text = h.registry.describe(EntryKey::new("", "Add")).unwrap();
    assert_eq!(text, "int Add(int a = 1, int b = 2)\nAdds two numbers");

    let defaults = h.registry.find_by_name("", "Add").unwrap().defaults().unwrap();
    assert_eq!(defaults.storage().0, 3);
    assert_eq!(defaults.value_as_string(2).as_deref(), Some("2"));
    assert_eq!(defaults.return_name(), "sum");
}

#[test]
fn test_invoke_entry_directly() {
    let h = harness();
    let entry = h.registry.find_by_name("", "Add").unwrap();
    let out = entry
        .invoke(None, &[SlotValue::Int(2), SlotValue::Int(3)])
        .unwrap();
    assert_eq!(out, SlotValue::Int(5));

    let err = entry
        .invoke(None, &[SlotValue::Int(2), SlotValue::Float(3.0)])
        .unwrap_err();
    assert!(matches!(err, BindError::SlotKindMismatch { slot: 2, .. }));

    let id = h.objects.register(Text {
        value: "ab".to_string(),
    });
    let concat = h.registry.find_by_name("Text", "Concat").unwrap();
    let out = h
        .objects
        .with_any(id, |receiver| concat.invoke(Some(receiver), &[SlotValue::string("c")]))
        .unwrap()
        .unwrap();
    assert_eq!(out.as_str(), Some("abc"));

    let err = concat.invoke(None, &[SlotValue::string("c")]).unwrap_err();
    assert!(matches!(err, BindError::MissingReceiver(_)));

    // each failed invoke is reported once
    assert_eq!(h.sink.len(), 2);
    assert_eq!(h.sink.count(Severity::Error), 2);
}
