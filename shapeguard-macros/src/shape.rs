//! `#[derive(Shape)]` implementation.

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DataEnum, DeriveInput, Fields, FieldsNamed, Ident};

use crate::attrs::{ContainerAttrs, FieldAttrs, VariantAttrs};

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Shape cannot be derived for generic types",
        ));
    }
    let container = ContainerAttrs::parse(&input.attrs)?;

    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => expand_struct(&input.ident, &container, fields),
            _ => Err(syn::Error::new_spanned(
                &input.ident,
                "Shape can only be derived for structs with named fields",
            )),
        },
        Data::Enum(data) => expand_enum(&input.ident, &container, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "Shape cannot be derived for unions",
        )),
    }
}

struct ShapeField<'a> {
    ident: &'a Ident,
    ty: &'a syn::Type,
    key: String,
    attrs: FieldAttrs,
}

fn with_description(description: &Option<String>) -> TokenStream {
    match description {
        Some(text) => quote!(.with_description(#text)),
        None => quote!(),
    }
}

fn expand_struct(
    name: &Ident,
    container: &ContainerAttrs,
    fields: &FieldsNamed,
) -> syn::Result<TokenStream> {
    let fields = fields
        .named
        .iter()
        .map(|field| -> syn::Result<ShapeField> {
            let ident = field
                .ident
                .as_ref()
                .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
            let attrs = FieldAttrs::parse(&field.attrs)?;
            let raw = ident.unraw().to_string();
            let key = match (&attrs.rename, container.rename_all) {
                (Some(rename), _) => rename.clone(),
                (None, Some(rule)) => rule.apply(&raw),
                (None, None) => raw,
            };
            Ok(ShapeField {
                ident,
                ty: &field.ty,
                key,
                attrs,
            })
        })
        .collect::<syn::Result<Vec<_>>>()?;

    let type_name = name.to_string();
    let type_description = with_description(&container.description);

    let descriptors = fields.iter().map(|field| {
        let key = &field.key;
        let ty = field.ty;
        let attrs = &field.attrs;
        let mut meta = quote!(::shapeguard::core::FieldMeta::new());
        if let Some(description) = &attrs.description {
            meta.extend(quote!(.description(#description)));
        }
        if attrs.ignore {
            meta.extend(quote!(.ignore()));
        }
        if attrs.default {
            meta.extend(quote!(.default_when_missing()));
        }
        if let Some(pattern) = &attrs.pattern {
            meta.extend(quote!(.pattern(#pattern)));
        }
        if let Some(len) = attrs.min_length {
            meta.extend(quote!(.min_length(#len)));
        }
        if let Some(len) = attrs.max_length {
            meta.extend(quote!(.max_length(#len)));
        }
        if let Some(min) = attrs.minimum {
            meta.extend(quote!(.minimum(#min)));
        }
        if let Some(max) = attrs.maximum {
            meta.extend(quote!(.maximum(#max)));
        }
        // Ignored fields need not describe themselves.
        let ty_ref = if attrs.ignore {
            quote!(::shapeguard::core::TypeDescriptor::opaque(::std::stringify!(#ty)))
        } else {
            quote!(::shapeguard::core::TypeRef::of::<#ty>())
        };
        quote! {
            ::shapeguard::core::FieldDescriptor::new(#key, #ty_ref).with_meta(#meta)
        }
    });

    let inserts = fields.iter().filter(|f| !f.attrs.ignore).map(|field| {
        let key = &field.key;
        let ident = field.ident;
        quote! {
            members.insert(
                ::std::string::String::from(#key),
                ::shapeguard::json::ToValue::to_value(&self.#ident, serializer)?,
            );
        }
    });

    let reads = fields.iter().map(|field| {
        let key = &field.key;
        let ident = field.ident;
        if field.attrs.ignore {
            quote!(#ident: ::std::default::Default::default())
        } else if field.attrs.default {
            quote!(#ident: ::shapeguard::mapper::defaulted_field(members, #key, path)?)
        } else {
            quote!(#ident: ::shapeguard::mapper::required_field(members, #key, path)?)
        }
    });

    Ok(quote! {
        impl ::shapeguard::core::Describe for #name {
            fn describe() -> ::shapeguard::core::TypeDescriptor {
                ::shapeguard::core::TypeDescriptor::structure(
                    ::std::concat!(::std::module_path!(), "::", #type_name),
                    ::std::vec![#(#descriptors),*],
                )
                #type_description
            }
        }

        impl ::shapeguard::json::ToValue for #name {
            fn to_value(
                &self,
                serializer: &mut ::shapeguard::json::ValueSerializer,
            ) -> ::std::result::Result<::shapeguard::core::Value, ::shapeguard::json::SerializationError> {
                serializer.visit(self, |serializer| {
                    #[allow(unused_mut)]
                    let mut members = ::shapeguard::core::Map::new();
                    #(#inserts)*
                    ::std::result::Result::Ok(::shapeguard::core::Value::Object(members))
                })
            }
        }

        impl ::shapeguard::mapper::FromValue for #name {
            fn from_value(
                value: &::shapeguard::core::Value,
                path: &::shapeguard::core::FieldPath,
            ) -> ::std::result::Result<Self, ::shapeguard::mapper::MappingError> {
                #[allow(unused_variables)]
                let members = ::shapeguard::mapper::object_members(value, path)?;
                ::std::result::Result::Ok(Self {
                    #(#reads),*
                })
            }
        }
    })
}

fn expand_enum(name: &Ident, container: &ContainerAttrs, data: &DataEnum) -> syn::Result<TokenStream> {
    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            name,
            "Shape cannot be derived for enums without variants",
        ));
    }
    let mut idents = Vec::with_capacity(data.variants.len());
    let mut names = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Shape can only be derived for enums with unit variants",
            ));
        }
        let attrs = VariantAttrs::parse(&variant.attrs)?;
        let raw = variant.ident.unraw().to_string();
        names.push(match (attrs.rename, container.rename_all) {
            (Some(rename), _) => rename,
            (None, Some(rule)) => rule.apply(&raw),
            (None, None) => raw,
        });
        idents.push(&variant.ident);
    }

    let type_name = name.to_string();
    let type_description = with_description(&container.description);

    Ok(quote! {
        impl ::shapeguard::core::Describe for #name {
            fn describe() -> ::shapeguard::core::TypeDescriptor {
                ::shapeguard::core::TypeDescriptor::enumeration(
                    ::std::concat!(::std::module_path!(), "::", #type_name),
                    [#(#names),*],
                )
                #type_description
            }
        }

        impl ::shapeguard::json::ToValue for #name {
            fn to_value(
                &self,
                _serializer: &mut ::shapeguard::json::ValueSerializer,
            ) -> ::std::result::Result<::shapeguard::core::Value, ::shapeguard::json::SerializationError> {
                let name = match self {
                    #(Self::#idents => #names,)*
                };
                ::std::result::Result::Ok(::shapeguard::core::Value::from(name))
            }
        }

        impl ::shapeguard::mapper::FromValue for #name {
            fn from_value(
                value: &::shapeguard::core::Value,
                path: &::shapeguard::core::FieldPath,
            ) -> ::std::result::Result<Self, ::shapeguard::mapper::MappingError> {
                const VARIANTS: &[&str] = &[#(#names),*];
                match ::shapeguard::mapper::variant_name(value, path, VARIANTS)? {
                    #(#names => ::std::result::Result::Ok(Self::#idents),)*
                    other => ::std::result::Result::Err(
                        ::shapeguard::mapper::MappingError::unknown_variant(path, other, VARIANTS.iter().copied()),
                    ),
                }
            }
        }
    })
}
