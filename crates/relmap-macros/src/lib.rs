//! Procedural macros for relmap.
//!
//! `relmap-macros` is the **compile-time descriptor layer**. Instead of
//! inspecting values at runtime, every persistent struct declares a closed,
//! statically enumerable property list, and these derives write it.
//!
//! - `#[derive(Entity)]`: `Mappable` plus `Entity` (name, table, indexed
//!   property access) for a persistent type.
//! - `#[derive(Embeddable)]`: `Mappable` for a value object flattened into
//!   its owner's columns.
//!
//! Generated code refers to `relmap_core`, which must be a dependency of the
//! deriving crate.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;

mod parse;

use parse::{DeriveKind, EntityDef, FieldDef, parse_entity};

/// Derive macro for the `Entity` trait.
///
/// # Attributes
///
/// - `#[relmap(name = "..")]` - Logical entity name (defaults to the struct name)
/// - `#[relmap(table = "..")]` - Explicit table name, bypassing the naming strategy
/// - `#[relmap(id)]` - The id property (at most one)
/// - `#[relmap(transient)]` - Not persisted; rebuilt from `Default`
/// - `#[relmap(unique)]` / `#[relmap(indexed)]` - Derive a unique / plain index
/// - `#[relmap(column = "..")]` - Explicit column (path segment) name
/// - `#[relmap(length = N)]` - Declared text length
///
/// # Example
///
/// ```ignore
/// use relmap::prelude::*;
///
/// #[derive(Debug, Clone, Entity)]
/// struct City {
///     #[relmap(indexed, length = 80)]
///     name: String,
///     geo_location: Option<GeoLocation>,
///     #[relmap(id)]
///     id: ObjectId,
/// }
/// ```
#[proc_macro_derive(Entity, attributes(relmap))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);
    match parse_entity(&input, DeriveKind::Entity) {
        Ok(def) => {
            let mut out = generate_mappable(&def);
            out.extend(generate_entity(&def));
            out.into()
        }
        Err(e) => e.to_compile_error().into(),
    }
}

/// Derive macro for `Mappable` on an embedded value object.
///
/// Field attributes `transient`, `column` and `length` apply as for
/// entities.
#[proc_macro_derive(Embeddable, attributes(relmap))]
pub fn derive_embeddable(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);
    match parse_entity(&input, DeriveKind::Embeddable) {
        Ok(def) => generate_mappable(&def).into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// `PropertyInfo` constant for one field.
fn property_info(field: &FieldDef) -> TokenStream2 {
    let name = field.name();
    let ty = &field.ty;
    let descriptor = if field.transient {
        quote! { ::relmap_core::TypeDescriptor::scalar::<#ty> }
    } else {
        quote! { <#ty as ::relmap_core::Mappable>::descriptor }
    };
    let mut info = quote! { ::relmap_core::PropertyInfo::new(#name, #descriptor) };
    if let Some(column) = &field.column {
        info.extend(quote! { .column(#column) });
    }
    if field.id {
        info.extend(quote! { .id(true) });
    }
    if field.transient {
        info.extend(quote! { .transient(true) });
    }
    if field.unique {
        info.extend(quote! { .unique(true) });
    }
    if field.indexed {
        info.extend(quote! { .indexed(true) });
    }
    if let Some(length) = field.length {
        info.extend(quote! { .length(#length) });
    }
    info
}

/// The property table plus the `Mappable` implementation.
fn generate_mappable(def: &EntityDef) -> TokenStream2 {
    let ident = &def.ident;
    let properties = def.fields.iter().map(property_info);

    let record = def.persistent_fields().map(|f| {
        let field = &f.ident;
        let name = f.name();
        quote! { (#name, ::relmap_core::Mappable::to_datum(&self.#field)) }
    });

    let rebuild = def.fields.iter().map(|f| {
        let field = &f.ident;
        let name = f.name();
        let ty = &f.ty;
        if f.transient {
            quote! { #field: ::core::default::Default::default() }
        } else {
            quote! {
                #field: <#ty as ::relmap_core::Mappable>::from_datum(datum.take_field(#name)?)?
            }
        }
    });

    quote! {
        impl #ident {
            #[doc(hidden)]
            pub const RELMAP_PROPERTIES: &'static [::relmap_core::PropertyInfo] = &[
                #(#properties),*
            ];
        }

        impl ::relmap_core::Mappable for #ident {
            fn descriptor() -> ::relmap_core::TypeDescriptor {
                ::relmap_core::TypeDescriptor::embedded::<#ident>(|| #ident::RELMAP_PROPERTIES)
            }

            fn to_datum(&self) -> ::relmap_core::Datum {
                ::relmap_core::Datum::Record(vec![#(#record),*])
            }

            fn from_datum(mut datum: ::relmap_core::Datum) -> ::relmap_core::Result<Self> {
                Ok(Self {
                    #(#rebuild),*
                })
            }
        }
    }
}

/// The `Entity` implementation: indexed get/set over the property table.
fn generate_entity(def: &EntityDef) -> TokenStream2 {
    let ident = &def.ident;
    let name = &def.name;
    let table = match &def.table {
        Some(table) => quote! { Some(#table) },
        None => quote! { None },
    };

    let persistent: Vec<(usize, &FieldDef)> = def
        .fields
        .iter()
        .enumerate()
        .filter(|(_, f)| !f.transient)
        .collect();

    let getters = persistent.iter().map(|(index, f)| {
        let field = &f.ident;
        quote! { #index => Ok(::relmap_core::Mappable::to_datum(&self.#field)), }
    });

    let setters = persistent.iter().map(|(index, f)| {
        let field = &f.ident;
        let ty = &f.ty;
        quote! {
            #index => self.#field = <#ty as ::relmap_core::Mappable>::from_datum(value)?,
        }
    });

    quote! {
        impl ::relmap_core::Entity for #ident {
            const NAME: &'static str = #name;
            const TABLE: Option<&'static str> = #table;

            fn properties() -> &'static [::relmap_core::PropertyInfo] {
                Self::RELMAP_PROPERTIES
            }

            fn get(&self, index: usize) -> ::relmap_core::Result<::relmap_core::Datum> {
                match index {
                    #(#getters)*
                    _ => Err(::relmap_core::entity::no_such_property(Self::NAME, index)),
                }
            }

            fn set(
                &mut self,
                index: usize,
                value: ::relmap_core::Datum,
            ) -> ::relmap_core::Result<()> {
                match index {
                    #(#setters)*
                    _ => return Err(::relmap_core::entity::no_such_property(Self::NAME, index)),
                }
                Ok(())
            }
        }
    }
}
