// #[method] proc-macro implementation
//
// Generates an associated `Binding` constructor next to a method.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{FnArg, ImplItemFn, Receiver, Result};

use crate::attrs::{check_signature, param_types, BindingArgs};

/// Expands the #[method] attribute macro.
///
/// Example expansion:
/// ```ignore
/// // Input, inside `impl Counter`:
/// #[method(name = "Add")]
/// fn add(&mut self, n: i32) -> i32 { ... }
///
/// // Output:
/// fn add(&mut self, n: i32) -> i32 { ... }
///
/// fn add_binding() -> ::hostbind_engine::Binding {
///     ::hostbind_engine::Binding::method::<Self, _, (::hostbind_engine::Exclusive, i32,)>(
///         "Add",
///         Self::add,
///     )
/// }
/// ```
pub fn expand_method(args: BindingArgs, method: ImplItemFn) -> Result<TokenStream> {
    let sig = &method.sig;
    check_signature(sig)?;

    let receiver = match sig.inputs.first() {
        Some(FnArg::Receiver(receiver)) => receiver,
        _ => {
            return Err(syn::Error::new_spanned(
                &sig.ident,
                "#[method] requires a `&self` or `&mut self` receiver",
            ))
        }
    };
    let marker = receiver_marker(receiver)?;

    let vis = &method.vis;
    let ident = &sig.ident;
    let binding_ident = format_ident!("{}_binding", ident);
    let name = args.script_name(sig);
    let types = param_types(sig)?;
    let doc = format!("Registration descriptor for [`Self::{}`]", ident);

    let constructor = match &args.class {
        Some(class) => quote! {
            ::hostbind_engine::Binding::method_in::<Self, _, (#marker, #(#types,)*)>(
                #class,
                #name,
                Self::#ident,
            )
        },
        None => quote! {
            ::hostbind_engine::Binding::method::<Self, _, (#marker, #(#types,)*)>(
                #name,
                Self::#ident,
            )
        },
    };

    Ok(quote! {
        #method

        #[doc = #doc]
        #vis fn #binding_ident() -> ::hostbind_engine::Binding {
            #constructor
        }
    })
}

/// `Shared` for `&self`, `Exclusive` for `&mut self`
fn receiver_marker(receiver: &Receiver) -> Result<TokenStream> {
    if receiver.reference.is_none() || receiver.colon_token.is_some() {
        return Err(syn::Error::new_spanned(
            receiver,
            "only `&self` and `&mut self` receivers can be bound",
        ));
    }
    Ok(if receiver.mutability.is_some() {
        quote!(::hostbind_engine::Exclusive)
    } else {
        quote!(::hostbind_engine::Shared)
    })
}
