use proc_macro::TokenStream;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, AttributeArgs, FnArg, GenericArgument, Ident, ItemFn, Lit, Meta, NestedMeta,
    Pat, PathArguments, ReturnType, Type,
};

/// Resolve the path of the host crate. Inside `tool-agent` itself the crate
/// declares `extern crate self as tool_agent`, so the absolute path works from
/// the library, its tests, and downstream crates alike.
fn host_crate() -> (proc_macro2::TokenStream, String) {
    let name = match crate_name("tool-agent") {
        Ok(FoundCrate::Name(name)) => name,
        Ok(FoundCrate::Itself) | Err(_) => "tool_agent".to_string(),
    };
    let ident = syn::Ident::new(&name, proc_macro2::Span::call_site());
    (quote!(::#ident), format!("::{}", name))
}

#[derive(Default)]
struct ToolAttrs {
    name: Option<String>,
    description: Option<String>,
    params: Vec<(String, String)>,
    return_direct: bool,
    handle_error: bool,
}

fn parse_attrs(args: AttributeArgs) -> syn::Result<ToolAttrs> {
    let mut attrs = ToolAttrs::default();
    for nested in args {
        match nested {
            NestedMeta::Meta(Meta::NameValue(nv)) => {
                let key = nv
                    .path
                    .get_ident()
                    .map(|i| i.to_string())
                    .unwrap_or_default();
                match (key.as_str(), &nv.lit) {
                    ("name", Lit::Str(s)) => attrs.name = Some(s.value()),
                    ("description", Lit::Str(s)) => attrs.description = Some(s.value()),
                    ("return_direct", Lit::Bool(b)) => attrs.return_direct = b.value,
                    ("handle_error", Lit::Bool(b)) => attrs.handle_error = b.value,
                    _ => {
                        return Err(syn::Error::new_spanned(
                            &nv,
                            format!("unsupported tool attribute `{}`", key),
                        ));
                    }
                }
            }
            NestedMeta::Meta(Meta::List(list)) if list.path.is_ident("params") => {
                for nm in list.nested {
                    match nm {
                        NestedMeta::Meta(Meta::NameValue(nv)) => {
                            if let (Some(ident), Lit::Str(s)) = (nv.path.get_ident(), &nv.lit) {
                                attrs.params.push((ident.to_string(), s.value()));
                            }
                        }
                        other => {
                            return Err(syn::Error::new_spanned(
                                other,
                                "expected `param = \"description\"`",
                            ));
                        }
                    }
                }
            }
            other => {
                return Err(syn::Error::new_spanned(other, "unsupported tool attribute"));
            }
        }
    }
    Ok(attrs)
}

/// Turn a free function into a `Tool`.
///
/// ```ignore
/// #[tool(description = "Look up things online.", params(query = "search query"))]
/// fn search(query: String) -> String { ... }
/// ```
///
/// generates `SearchParams` (the deserialized arguments) and a unit struct
/// `SearchTool` implementing `Tool`. Supported keys: `name` (defaults to the
/// function name), `description`, `params(arg = "doc", ..)`, `return_direct`
/// and `handle_error`. `Option<T>` arguments are optional; a `Result` return
/// maps `Err` to `ToolError::ExecutionError`.
#[proc_macro_attribute]
pub fn tool(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as AttributeArgs);
    let input_fn = parse_macro_input!(item as ItemFn);
    match parse_attrs(args).and_then(|attrs| expand(attrs, input_fn)) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// Typed arguments of the annotated function, in declaration order.
fn signature_fields(input_fn: &ItemFn) -> syn::Result<Vec<(Ident, Type)>> {
    input_fn
        .sig
        .inputs
        .iter()
        .map(|arg| match arg {
            FnArg::Typed(pt) => match &*pt.pat {
                Pat::Ident(pi) => Ok((pi.ident.clone(), (*pt.ty).clone())),
                other => Err(syn::Error::new_spanned(other, "tool arguments must be plain identifiers")),
            },
            FnArg::Receiver(recv) => Err(syn::Error::new_spanned(recv, "tools cannot take `self`")),
        })
        .collect()
}

fn expand(attrs: ToolAttrs, input_fn: ItemFn) -> syn::Result<proc_macro2::TokenStream> {
    let fn_ident = input_fn.sig.ident.clone();
    let description = attrs
        .description
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| syn::Error::new_spanned(&fn_ident, "tool requires a non-empty `description = \"...\"`"))?;
    let tool_name = attrs.name.unwrap_or_else(|| fn_ident.to_string());
    if tool_name.trim().is_empty() {
        return Err(syn::Error::new_spanned(&fn_ident, "tool name must not be empty"));
    }

    let fields = signature_fields(&input_fn)?;
    if let Some((unknown, _)) = attrs
        .params
        .iter()
        .find(|(doc_for, _)| !fields.iter().any(|(ident, _)| ident == doc_for.as_str()))
    {
        return Err(syn::Error::new_spanned(
            &fn_ident,
            format!("`params` documents `{}`, which is not an argument of `{}`", unknown, fn_ident),
        ));
    }

    let (host, host_str) = host_crate();
    let serde_path = format!("{}::serde", host_str);
    let base = pascal_case(&fn_ident.to_string());
    let params_ident = format_ident!("{}Params", base, span = fn_ident.span());
    let tool_ident = format_ident!("{}Tool", base, span = fn_ident.span());

    let mut field_defs = Vec::with_capacity(fields.len());
    let mut arg_schemas = Vec::with_capacity(fields.len());
    for (ident, ty) in &fields {
        let doc = attrs
            .params
            .iter()
            .find_map(|(name, doc)| (ident == name.as_str()).then(|| doc.as_str()))
            .filter(|doc| !doc.trim().is_empty())
            .ok_or_else(|| {
                syn::Error::new_spanned(ident, format!("missing description for param '{}'", ident))
            })?;

        let (json_type, required) = match option_inner(ty) {
            Some(inner) => (infer_json_type(inner), false),
            None => (infer_json_type(ty), true),
        };
        let serde_default = (!required).then(|| quote!(#[serde(default)]));
        field_defs.push(quote!(#serde_default pub #ident: #ty));

        let arg_name = ident.to_string();
        arg_schemas.push(quote! {
            #host::tools::ArgSchema {
                name: #arg_name.into(),
                arg_type: #json_type.into(),
                description: #doc.into(),
                required: #required,
            }
        });
    }

    let field_idents = fields.iter().map(|(ident, _)| ident);
    let mut call = quote!(#fn_ident(#(params.#field_idents),*));
    if input_fn.sig.asyncness.is_some() {
        call = quote!(#call.await);
    }
    let body = if returns_result(&input_fn.sig.output) {
        quote! {
            match #call {
                ::std::result::Result::Ok(value) => ::std::result::Result::Ok(::std::string::ToString::to_string(&value)),
                ::std::result::Result::Err(err) => ::std::result::Result::Err(#host::tools::ToolError::execution(#tool_name, err)),
            }
        }
    } else {
        quote!(::std::result::Result::Ok(::std::string::ToString::to_string(&#call)))
    };

    let handle_error = if attrs.handle_error {
        quote!(#host::tools::ErrorHandling::Message)
    } else {
        quote!(#host::tools::ErrorHandling::Propagate)
    };
    let return_direct = attrs.return_direct;

    Ok(quote! {
        #input_fn

        #[derive(#host::serde::Deserialize)]
        #[serde(crate = #serde_path)]
        pub struct #params_ident {
            #(#field_defs,)*
        }

        #[derive(Debug, Clone, Copy, Default)]
        pub struct #tool_ident;

        #[#host::async_trait::async_trait]
        impl #host::tools::Tool for #tool_ident {
            fn name(&self) -> &str {
                #tool_name
            }

            fn description(&self) -> &str {
                #description
            }

            fn args(&self) -> ::std::vec::Vec<#host::tools::ArgSchema> {
                ::std::vec![#(#arg_schemas),*]
            }

            fn return_direct(&self) -> bool {
                #return_direct
            }

            fn handle_error(&self) -> #host::tools::ErrorHandling {
                #handle_error
            }

            async fn run(
                &self,
                input: #host::serde_json::Value,
            ) -> ::std::result::Result<::std::string::String, #host::tools::ToolError> {
                let params: #params_ident = #host::serde_json::from_value(input)
                    .map_err(|e| #host::tools::ToolError::ParamsNotMatched(e.to_string()))?;
                #body
            }
        }
    })
}

/// `get_weather` -> `GetWeather`.
fn pascal_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    for word in snake.split('_').filter(|w| !w.is_empty()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(p) => p.path.segments.last(),
        _ => None,
    }
}

/// `Some(T)` when `ty` is `Option<T>`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let seg = last_segment(ty)?;
    if seg.ident != "Option" {
        return None;
    }
    match &seg.arguments {
        PathArguments::AngleBracketed(ab) => ab.args.iter().find_map(|a| match a {
            GenericArgument::Type(t) => Some(t),
            _ => None,
        }),
        _ => None,
    }
}

fn returns_result(output: &ReturnType) -> bool {
    match output {
        ReturnType::Type(_, ty) => last_segment(ty).is_some_and(|s| s.ident == "Result"),
        ReturnType::Default => false,
    }
}

fn infer_json_type(ty: &Type) -> &'static str {
    match last_segment(ty) {
        Some(seg) => match seg.ident.to_string().as_str() {
            "String" | "str" => "string",
            "bool" => "boolean",
            "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "u64" | "usize" | "isize" => {
                "integer"
            }
            "f32" | "f64" => "number",
            "Vec" => "array",
            _ => "object",
        },
        None => match ty {
            Type::Reference(r) => infer_json_type(&r.elem),
            _ => "object",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascal_case_joins_snake_segments() {
        assert_eq!(pascal_case("get_weather"), "GetWeather");
        assert_eq!(pascal_case("search"), "Search");
    }

    #[test]
    fn infers_json_types_through_option() {
        let ty: Type = syn::parse_str("Option<u32>").unwrap();
        let inner = option_inner(&ty).expect("option inner");
        assert_eq!(infer_json_type(inner), "integer");
        let ty: Type = syn::parse_str("Vec<String>").unwrap();
        assert!(option_inner(&ty).is_none());
        assert_eq!(infer_json_type(&ty), "array");
    }

    #[test]
    fn detects_result_return() {
        let item: ItemFn = syn::parse_str("fn f() -> Result<String, String> { todo!() }").unwrap();
        assert!(returns_result(&item.sig.output));
        let item: ItemFn = syn::parse_str("fn f() -> String { todo!() }").unwrap();
        assert!(!returns_result(&item.sig.output));
    }
}
