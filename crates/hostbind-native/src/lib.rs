// hostbind-native: registration descriptors from annotated Rust items
//
// Provides attribute macros that keep a native item unchanged and add a
// constructor for its `Binding`:
// - #[function] - free function, adds `<name>_binding()`
// - #[method] - method inside an impl block, adds `Self::<name>_binding()`
//
// Example:
// ```
// use hostbind_native::{function, method};
//
// #[function(name = "Add")]
// fn add(a: i32, b: i32) -> i32 {
//     a + b
// }
//
// impl Text {
//     #[method(name = "Concat")]
//     fn concat(&self, suffix: String) -> String {
//         format!("{}{}", self.value, suffix)
//     }
// }
//
// builder.install([add_binding(), Text::concat_binding()]);
// ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, ImplItemFn, ItemFn};

mod attrs;
mod function;
mod method;

use attrs::BindingArgs;

/// Generates a registration descriptor for a free native function.
///
/// The function is kept as written. Next to it a function
/// `<ident>_binding()` is generated that returns a
/// `hostbind_engine::Binding` for it, ready to be passed to
/// `RegistryBuilder::install`.
///
/// The script-visible name defaults to the Rust identifier and can be set
/// with `name = "..."`.
///
/// # Example
///
/// ```ignore
/// #[function(name = "Add")]
/// fn add(a: i32, b: i32) -> i32 {
///     a + b
/// }
///
/// let key = builder.register(add_binding())?;
/// ```
#[proc_macro_attribute]
pub fn function(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut args = BindingArgs::default();
    let parser = syn::meta::parser(|meta| args.parse(meta));
    parse_macro_input!(attr with parser);

    let input = parse_macro_input!(item as ItemFn);
    function::expand_function(args, input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Generates a registration descriptor for a method of a script class.
///
/// Must be applied to a method taking `&self` or `&mut self` inside an
/// `impl` block. An associated function `<ident>_binding()` is added to the
/// same block. The method is registered in the namespace of the type's
/// `ScriptClass::CLASS_NAME` unless `class = "..."` names another one.
///
/// # Example
///
/// ```ignore
/// impl Counter {
///     #[method(name = "Add")]
///     fn add(&mut self, n: i32) -> i32 {
///         self.total += n;
///         self.total
///     }
/// }
///
/// let key = builder.register(Counter::add_binding())?;
/// ```
#[proc_macro_attribute]
pub fn method(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut args = BindingArgs::default();
    let parser = syn::meta::parser(|meta| args.parse(meta));
    parse_macro_input!(attr with parser);

    let input = parse_macro_input!(item as ImplItemFn);
    method::expand_method(args, input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
