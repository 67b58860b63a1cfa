//! Parsing and code generation for `#[derive(Bindable)]`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{spanned::Spanned, Data, DeriveInput, Fields, Ident, LitStr, Type};

/// One record entry recognized on a struct field.
pub(crate) enum Entry {
    /// A `#[param("...")]` field.
    Param {
        ident: Ident,
        ty: Type,
        tag: LitStr,
        pattern: Option<LitStr>,
        error_msg: Option<LitStr>,
    },
    /// An `#[embed]` field.
    Embedded { ident: Ident, ty: Type },
}

/// The parsed derive input: the record entries in declaration order,
/// fields without binding attributes dropped.
pub(crate) struct Record {
    pub ident: Ident,
    pub entries: Vec<Entry>,
}

pub(crate) fn derive(input: &DeriveInput) -> syn::Result<TokenStream> {
    let record = parse(input)?;
    Ok(expand(&record))
}

pub(crate) fn parse(input: &DeriveInput) -> syn::Result<Record> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(
            input.ident.span(),
            "Bindable can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new(
            input.ident.span(),
            "Bindable requires named fields",
        ));
    };

    let mut entries = Vec::new();
    for field in &fields.named {
        let Some(ident) = field.ident.clone() else {
            continue;
        };

        let mut tag = None;
        let mut pattern = None;
        let mut error_msg = None;
        let mut embed = false;

        for attr in &field.attrs {
            if attr.path().is_ident("param") {
                tag = Some(attr.parse_args::<LitStr>()?);
            } else if attr.path().is_ident("regex") {
                pattern = Some(attr.parse_args::<LitStr>()?);
            } else if attr.path().is_ident("errmsg") {
                error_msg = Some(attr.parse_args::<LitStr>()?);
            } else if attr.path().is_ident("embed") {
                attr.meta.require_path_only()?;
                embed = true;
            }
        }

        if embed {
            if tag.is_some() || pattern.is_some() || error_msg.is_some() {
                return Err(syn::Error::new(
                    field.span(),
                    "#[embed] cannot be combined with #[param], #[regex] or #[errmsg]",
                ));
            }
            entries.push(Entry::Embedded {
                ident,
                ty: field.ty.clone(),
            });
            continue;
        }

        let Some(tag) = tag else {
            if pattern.is_some() || error_msg.is_some() {
                return Err(syn::Error::new(
                    field.span(),
                    "#[regex] and #[errmsg] require #[param] on the same field",
                ));
            }
            continue;
        };

        entries.push(Entry::Param {
            ident,
            ty: field.ty.clone(),
            tag,
            pattern,
            error_msg,
        });
    }

    Ok(Record {
        ident: input.ident.clone(),
        entries,
    })
}

pub(crate) fn expand(record: &Record) -> TokenStream {
    let ident = &record.ident;
    let type_name = ident.to_string();

    let decls = record.entries.iter().map(|entry| match entry {
        Entry::Param {
            ident,
            ty,
            tag,
            pattern,
            error_msg,
        } => {
            let ident = ident.to_string();
            let pattern = option_tokens(pattern.as_ref());
            let error_msg = option_tokens(error_msg.as_ref());
            quote! {
                ::paramware::FieldDecl::Param {
                    ident: #ident,
                    tag: #tag,
                    pattern: #pattern,
                    error_msg: #error_msg,
                    shape: <#ty as ::paramware::BindValue>::SHAPE,
                }
            }
        }
        Entry::Embedded { ident, ty } => {
            let ident = ident.to_string();
            quote! {
                ::paramware::FieldDecl::Embedded {
                    ident: #ident,
                    blueprint: <#ty as ::paramware::Bindable>::blueprint,
                }
            }
        }
    });

    let arms = record.entries.iter().enumerate().map(|(index, entry)| match entry {
        Entry::Param { ident, .. } => quote! {
            #index if rest.is_empty() => {
                ::core::option::Option::Some(::paramware::BindValue::slot_mut(&mut self.#ident))
            }
        },
        Entry::Embedded { ident, .. } => quote! {
            #index => ::paramware::Bindable::slot(&mut self.#ident, rest),
        },
    });

    let slot_body = if record.entries.is_empty() {
        quote! {
            let _ = path;
            ::core::option::Option::None
        }
    } else {
        quote! {
            let (head, rest) = path.split_first()?;
            match *head {
                #(#arms)*
                _ => ::core::option::Option::None,
            }
        }
    };

    quote! {
        #[automatically_derived]
        impl ::paramware::Bindable for #ident {
            fn blueprint() -> ::paramware::Blueprint {
                ::paramware::Blueprint {
                    type_name: #type_name,
                    fields: ::std::vec![#(#decls),*],
                }
            }

            fn slot(&mut self, path: &[usize]) -> ::core::option::Option<::paramware::SlotMut<'_>> {
                #slot_body
            }
        }
    }
}

fn option_tokens(lit: Option<&LitStr>) -> TokenStream {
    match lit {
        Some(lit) => quote! { ::core::option::Option::Some(#lit) },
        None => quote! { ::core::option::Option::None },
    }
}
