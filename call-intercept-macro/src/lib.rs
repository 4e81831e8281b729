#![warn(missing_docs)]

//! Provides the `#[interceptable]` macro. See the `call-intercept` crate for
//! more details.

extern crate proc_macro;
use proc_macro::TokenStream;
use proc_macro2::{TokenStream as TokenStream2, TokenTree};
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, parse_quote, Attribute, Block, FnArg, Ident, ImplItem, Item, ItemFn,
    ItemImpl, LitStr, Pat, PatIdent, ReturnType, Signature, Type, Visibility,
};

// Must match `call_intercept::ORIGINAL_SUFFIX`.
const ORIGINAL_SUFFIX: &str = "__intercept_original";

/// The `#[interceptable]` macro. Needs to be applied to a free function or
/// an impl block, and makes the function (or every method of the block)
/// interceptable through `call_intercept::Interception`.
///
/// The original body is kept under `<name>__intercept_original`, and the
/// function itself is replaced by a wrapper that checks for a live
/// interception before calling it.
///
/// The owner name of methods is the last path segment of the implementing
/// type. It can be overridden with `#[interceptable(owner = "Name")]`.
///
/// # Example
/// ```notest
/// use call_intercept::interceptable;
///
/// #[interceptable]
/// fn foo(x: u32) -> u32 {
///     x + 1
/// }
///
/// #[interceptable]
/// impl MyType {
///     fn bar(&self) {
///         // ...
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn interceptable(attr: TokenStream, input: TokenStream) -> TokenStream {
    let mut owner: Option<LitStr> = None;
    let options = syn::meta::parser(|meta| {
        if meta.path.is_ident("owner") {
            owner = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported `interceptable` option"))
        }
    });
    parse_macro_input!(attr with options);

    let item = parse_macro_input!(input as Item);
    let expanded = match item {
        Item::Fn(func) => match owner {
            Some(owner) => Err(syn::Error::new(
                owner.span(),
                "`owner` can only be set on impl blocks",
            )),
            None => expand_fn(func),
        },
        Item::Impl(imp) => expand_impl(imp, owner),
        other => Err(syn::Error::new_spanned(
            other,
            "`#[interceptable]` applies to functions and impl blocks",
        )),
    };

    // Hand the output tokens back to the compiler
    TokenStream::from(expanded.unwrap_or_else(syn::Error::into_compile_error))
}

/// How a wrapper reaches the original body.
#[derive(Copy, Clone)]
enum Original {
    /// A sibling free function.
    Function,
    /// A sibling method in the same impl block, called through `Self::`.
    Method,
    /// A closure in the wrapper body. Trait impls cannot grow extra methods.
    Inline,
}

fn expand_fn(func: ItemFn) -> syn::Result<TokenStream2> {
    if let Some(reason) = unsupported(&func.sig) {
        return Err(syn::Error::new_spanned(&func.sig, reason));
    }

    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = func;
    let is_public = matches!(vis, Visibility::Public(_));
    let wrapper = wrap(None, is_public, &sig, &block, Original::Function);
    let preserved = preserve(&attrs, &sig, &block);
    let Wrapper { sig: wrapper_sig, body } = wrapper;

    Ok(quote! {
        #preserved

        #(#attrs)*
        #vis #wrapper_sig #body
    })
}

fn expand_impl(mut imp: ItemImpl, owner: Option<LitStr>) -> syn::Result<TokenStream2> {
    let owner = match owner {
        Some(owner) => owner.value(),
        None => owner_name(&imp.self_ty).ok_or_else(|| {
            syn::Error::new_spanned(
                &imp.self_ty,
                "cannot name this type, use `#[interceptable(owner = \"Name\")]`",
            )
        })?,
    };
    let original = match imp.trait_ {
        Some(_) => Original::Inline,
        None => Original::Method,
    };

    let mut preserved = Vec::new();
    for item in imp.items.iter_mut() {
        let method = match item {
            ImplItem::Fn(method) => method,
            _ => continue,
        };
        if unsupported(&method.sig).is_some() {
            continue;
        }

        // Trait methods are as visible as the trait.
        let is_public = match original {
            Original::Inline => true,
            _ => matches!(method.vis, Visibility::Public(_)),
        };
        let wrapper = wrap(Some(&owner), is_public, &method.sig, &method.block, original);
        if let Original::Method = original {
            preserved.push(preserve(&method.attrs, &method.sig, &method.block));
        }
        method.sig = wrapper.sig;
        method.block = wrapper.body;
    }
    for method in preserved {
        imp.items.push(ImplItem::Verbatim(method));
    }

    Ok(quote! { #imp })
}

fn unsupported(sig: &Signature) -> Option<&'static str> {
    if sig.asyncness.is_some() {
        Some("async functions cannot be intercepted")
    } else if sig.constness.is_some() {
        Some("const functions cannot be intercepted")
    } else if sig.variadic.is_some() {
        Some("variadic functions cannot be intercepted")
    } else {
        None
    }
}

fn owner_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
        Type::Reference(reference) => owner_name(&reference.elem),
        Type::Paren(paren) => owner_name(&paren.elem),
        Type::Group(group) => owner_name(&group.elem),
        _ => None,
    }
}

fn preserved_ident(sig: &Signature) -> Ident {
    format_ident!("{}{}", sig.ident, ORIGINAL_SUFFIX)
}

// The original function under its preserved name. Attributes that would
// clash with the wrapper are left off.
fn preserve(attrs: &[Attribute], sig: &Signature, block: &Block) -> TokenStream2 {
    let attrs = attrs.iter().filter(|attr| {
        let path = attr.path();
        !(path.is_ident("doc")
            || path.is_ident("no_mangle")
            || path.is_ident("export_name")
            || path.is_ident("test"))
    });
    let mut sig = sig.clone();
    sig.ident = preserved_ident(&sig);

    quote! {
        #(#attrs)*
        #[doc(hidden)]
        #[allow(non_snake_case, dead_code)]
        #sig #block
    }
}

struct Wrapper {
    sig: Signature,
    body: Block,
}

fn wrap(
    owner: Option<&str>,
    is_public: bool,
    sig: &Signature,
    block: &Block,
    original: Original,
) -> Wrapper {
    let mut wrapper_sig = sig.clone();
    let mut forwarded = Vec::new();
    let mut probes = Vec::new();
    let mut rebinds = Vec::new();
    let mut is_static = true;

    for (i, input) in wrapper_sig.inputs.iter_mut().enumerate() {
        match input {
            FnArg::Receiver(receiver) => {
                is_static = false;
                // `mut self` is only needed where the body lives.
                if receiver.reference.is_none() {
                    if let Original::Function | Original::Method = original {
                        receiver.mutability = None;
                    }
                }
                forwarded.push(quote!(self));
            }
            FnArg::Typed(arg) => {
                let ident = match &*arg.pat {
                    Pat::Ident(PatIdent {
                        by_ref: None,
                        subpat: None,
                        mutability,
                        ident,
                        ..
                    }) => {
                        // Inline bodies may mutate the binding in place.
                        if let (Original::Inline, Some(_)) = (original, mutability) {
                            forwarded.push(quote!(#ident));
                            probes.push(ident.clone());
                            continue;
                        }
                        ident.clone()
                    }
                    pat => {
                        let renamed = format_ident!("__intercept_arg{}", i);
                        if !matches!(pat, Pat::Wild(_)) {
                            rebinds.push(quote!(let #pat = #renamed;));
                        }
                        renamed
                    }
                };
                arg.pat = Box::new(parse_quote!(#ident));
                forwarded.push(quote!(#ident));
                probes.push(ident);
            }
        }
    }

    let member = sig.ident.to_string();
    let owner = match owner {
        Some(owner) => quote!(::core::option::Option::Some(#owner)),
        None => quote!(::core::option::Option::None),
    };

    let original_call = match original {
        Original::Function => {
            let preserved = preserved_ident(sig);
            quote!(#preserved(#(#forwarded),*))
        }
        Original::Method => {
            let preserved = preserved_ident(sig);
            quote!(Self::#preserved(#(#forwarded),*))
        }
        Original::Inline => {
            let stmts = &block.stmts;
            quote! {{
                #(#rebinds)*
                #(#stmts)*
            }}
        }
    };
    let original_call = match &sig.unsafety {
        Some(_) if !matches!(original, Original::Inline) => quote!(unsafe { #original_call }),
        _ => original_call,
    };
    let closure_output = match (&sig.output, original) {
        (ReturnType::Type(_, ty), Original::Inline) if !mentions_impl(ty) => quote!(-> #ty),
        (ReturnType::Default, Original::Inline) => quote!(-> ()),
        _ => quote!(),
    };

    let report = report(&sig.output);
    let body: Block = parse_quote! {{
        #[allow(unused_imports)]
        use ::call_intercept::__private::{DebugArg as _, OpaqueArg as _, SerializeArg as _};

        static __INTERCEPT_TARGET: ::call_intercept::Target = ::call_intercept::Target::__new(
            #owner,
            #member,
            ::core::module_path!(),
            ::core::file!(),
            ::core::line!(),
            #is_static,
            #is_public,
        );

        #[::call_intercept::__private::ctor::ctor]
        fn __intercept_declare() {
            ::call_intercept::__private::declare(&__INTERCEPT_TARGET);
        }

        let __intercept_frame = ::call_intercept::__private::enter(
            &__INTERCEPT_TARGET,
            &[#((&&&::call_intercept::__private::Probe(&#probes)).loggable()),*],
        );
        let __intercept_token = ::call_intercept::__private::Token;
        #[allow(unused_unsafe)]
        let __intercept_original = move || #closure_output {
            ::core::mem::drop(__intercept_token);
            #original_call
        };
        match __intercept_frame {
            ::core::option::Option::None => __intercept_original(),
            ::core::option::Option::Some(__intercept_frame) => {
                let __intercept_result = __intercept_frame.invoke(__intercept_original);
                #report
                __intercept_result
            }
        }
    }};

    Wrapper {
        sig: wrapper_sig,
        body,
    }
}

fn report(output: &ReturnType) -> TokenStream2 {
    if returns_result(output) {
        quote! {
            match &__intercept_result {
                ::core::result::Result::Ok(__intercept_value) => __intercept_frame.returned(
                    &(&&&::call_intercept::__private::Probe(__intercept_value)).loggable(),
                ),
                ::core::result::Result::Err(__intercept_error) => __intercept_frame.raised(
                    ::call_intercept::__private::type_name_of(__intercept_error),
                    &(&&&::call_intercept::__private::Probe(__intercept_error)).loggable(),
                ),
            }
        }
    } else {
        quote! {
            __intercept_frame.returned(
                &(&&&::call_intercept::__private::Probe(&__intercept_result)).loggable(),
            );
        }
    }
}

// `Result<..>`, `io::Result<..>`, `anyhow::Result<..>` and so on.
fn returns_result(output: &ReturnType) -> bool {
    match output {
        ReturnType::Type(_, ty) => match &**ty {
            Type::Path(path) => path
                .path
                .segments
                .last()
                .map_or(false, |segment| segment.ident == "Result"),
            _ => false,
        },
        ReturnType::Default => false,
    }
}

fn mentions_impl(ty: &Type) -> bool {
    fn scan(tokens: TokenStream2) -> bool {
        tokens.into_iter().any(|token| match token {
            TokenTree::Ident(ident) => ident == "impl",
            TokenTree::Group(group) => scan(group.stream()),
            _ => false,
        })
    }
    scan(quote!(#ty))
}
