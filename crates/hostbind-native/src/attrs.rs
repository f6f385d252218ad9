// Attribute arguments shared by #[function] and #[method]

use syn::meta::ParseNestedMeta;
use syn::{FnArg, LitStr, Result, Signature, Type};

/// Highest arity the typed callable impls cover
pub const MAX_TYPED_PARAMETERS: usize = 12;

/// `name = "..."` and `class = "..."`
#[derive(Default)]
pub struct BindingArgs {
    pub name: Option<LitStr>,
    pub class: Option<LitStr>,
}

impl BindingArgs {
    pub fn parse(&mut self, meta: ParseNestedMeta<'_>) -> Result<()> {
        if meta.path.is_ident("name") {
            let name: LitStr = meta.value()?.parse()?;
            if name.value().is_empty() {
                return Err(syn::Error::new_spanned(name, "binding name must not be empty"));
            }
            self.name = Some(name);
            Ok(())
        } else if meta.path.is_ident("class") {
            self.class = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("expected `name = \"...\"` or `class = \"...\"`"))
        }
    }

    /// Script-visible name, the Rust identifier unless overridden
    pub fn script_name(&self, sig: &Signature) -> LitStr {
        self.name
            .clone()
            .unwrap_or_else(|| LitStr::new(&sig.ident.to_string(), sig.ident.span()))
    }
}

/// Reject signatures no binding can be generated for
pub fn check_signature(sig: &Signature) -> Result<()> {
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "async functions cannot be bound",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "generic functions cannot be bound; bind a concrete instantiation",
        ));
    }
    if let Some(variadic) = &sig.variadic {
        return Err(syn::Error::new_spanned(variadic, "variadic functions cannot be bound"));
    }
    Ok(())
}

/// Types of the typed (non-receiver) parameters
pub fn param_types(sig: &Signature) -> Result<Vec<&Type>> {
    let types: Vec<&Type> = sig
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(pat_type) => Some(&*pat_type.ty),
            FnArg::Receiver(_) => None,
        })
        .collect();

    if types.len() > MAX_TYPED_PARAMETERS {
        return Err(syn::Error::new_spanned(
            &sig.inputs,
            format!(
                "at most {} parameters can be bound this way; use RegistryBuilder::register_raw",
                MAX_TYPED_PARAMETERS
            ),
        ));
    }
    for ty in &types {
        if let Type::ImplTrait(_) = ty {
            return Err(syn::Error::new_spanned(ty, "`impl Trait` parameters cannot be bound"));
        }
    }
    Ok(types)
}
