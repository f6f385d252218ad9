// #[function] proc-macro implementation
//
// Generates a `Binding` constructor next to a free native function.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{FnArg, ItemFn, Result};

use crate::attrs::{check_signature, param_types, BindingArgs};

/// Expands the #[function] attribute macro.
///
/// Example expansion:
/// ```ignore
/// // Input:
/// #[function(name = "Add")]
/// pub fn add(a: i32, b: i32) -> i32 {
///     a + b
/// }
///
/// // Output:
/// pub fn add(a: i32, b: i32) -> i32 {
///     a + b
/// }
///
/// pub fn add_binding() -> ::hostbind_engine::Binding {
///     ::hostbind_engine::Binding::function::<_, (i32, i32,)>("Add", add)
/// }
/// ```
pub fn expand_function(args: BindingArgs, func: ItemFn) -> Result<TokenStream> {
    if let Some(class) = &args.class {
        return Err(syn::Error::new_spanned(
            class,
            "`class` only applies to #[method]",
        ));
    }

    let sig = &func.sig;
    check_signature(sig)?;
    if let Some(receiver) = sig.inputs.iter().find(|arg| matches!(arg, FnArg::Receiver(_))) {
        return Err(syn::Error::new_spanned(
            receiver,
            "methods (self) are not supported in #[function]; use #[method]",
        ));
    }

    let vis = &func.vis;
    let ident = &sig.ident;
    let binding_ident = format_ident!("{}_binding", ident);
    let name = args.script_name(sig);
    let types = param_types(sig)?;
    let doc = format!("Registration descriptor for [`{}`]", ident);

    Ok(quote! {
        #func

        #[doc = #doc]
        #vis fn #binding_ident() -> ::hostbind_engine::Binding {
            ::hostbind_engine::Binding::function::<_, (#(#types,)*)>(#name, #ident)
        }
    })
}
