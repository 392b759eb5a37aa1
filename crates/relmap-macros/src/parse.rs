//! Parsing logic for the Entity and Embeddable derives.
//!
//! This module extracts struct-level and field-level `#[relmap(...)]`
//! attributes into `EntityDef` and `FieldDef`, which drive code generation.

use proc_macro2::Span;
use syn::{Attribute, Data, DeriveInput, Error, Field, Fields, Ident, Lit, Result, Type};

/// Which derive is being expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeriveKind {
    Entity,
    Embeddable,
}

impl DeriveKind {
    fn label(self) -> &'static str {
        match self {
            DeriveKind::Entity => "Entity",
            DeriveKind::Embeddable => "Embeddable",
        }
    }
}

/// A parsed entity or embeddable struct.
#[derive(Debug)]
pub struct EntityDef {
    pub ident: Ident,
    /// Logical entity name (defaults to the struct name)
    pub name: String,
    /// Explicit table name
    pub table: Option<String>,
    pub fields: Vec<FieldDef>,
}

impl EntityDef {
    pub fn persistent_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| !f.transient)
    }
}

/// A parsed field.
#[derive(Debug)]
pub struct FieldDef {
    pub ident: Ident,
    pub ty: Type,
    pub column: Option<String>,
    pub id: bool,
    pub transient: bool,
    pub unique: bool,
    pub indexed: bool,
    pub length: Option<u32>,
}

impl FieldDef {
    pub fn name(&self) -> String {
        self.ident.to_string()
    }
}

/// Parse a derive input into an `EntityDef`.
///
/// Returns an error if:
/// - The input is not a struct with named fields
/// - The struct is generic
/// - Unknown or duplicate attributes are present
/// - Attribute combinations are contradictory (a transient id, two ids, ...)
pub fn parse_entity(input: &DeriveInput, kind: DeriveKind) -> Result<EntityDef> {
    let ident = input.ident.clone();

    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            format!("{} cannot be derived for generic structs", kind.label()),
        ));
    }

    let (name, table) = parse_struct_attrs(&input.attrs, kind)?;

    let fields = match &input.data {
        Data::Struct(data) => parse_fields(&data.fields, kind)?,
        Data::Enum(_) | Data::Union(_) => {
            return Err(Error::new_spanned(
                input,
                format!("{} can only be derived for structs", kind.label()),
            ));
        }
    };

    let ids: Vec<&FieldDef> = fields.iter().filter(|f| f.id).collect();
    if let [_, second, ..] = ids.as_slice() {
        return Err(Error::new_spanned(
            &second.ident,
            "only one field can be marked #[relmap(id)]",
        ));
    }

    Ok(EntityDef {
        name: name.unwrap_or_else(|| ident.to_string()),
        ident,
        table,
        fields,
    })
}

fn string_value(meta: &syn::meta::ParseNestedMeta<'_>, what: &str) -> Result<String> {
    let value: Lit = meta.value()?.parse()?;
    match value {
        Lit::Str(s) if !s.value().is_empty() => Ok(s.value()),
        Lit::Str(s) => Err(Error::new_spanned(s, format!("{} must not be empty", what))),
        other => Err(Error::new_spanned(
            other,
            format!("expected string literal for {}", what),
        )),
    }
}

/// Parse struct-level `#[relmap(...)]` attributes.
///
/// Supported keys: `name = ".."` (logical entity name) and `table = ".."`
/// (explicit table name), both for entities only.
fn parse_struct_attrs(
    attrs: &[Attribute],
    kind: DeriveKind,
) -> Result<(Option<String>, Option<String>)> {
    let mut name = None;
    let mut table = None;

    for attr in attrs {
        if !attr.path().is_ident("relmap") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if kind == DeriveKind::Embeddable {
                return Err(Error::new_spanned(
                    meta.path,
                    "Embeddable takes no struct attributes",
                ));
            }
            let (slot, what) = if meta.path.is_ident("name") {
                (&mut name, "name")
            } else if meta.path.is_ident("table") {
                (&mut table, "table")
            } else {
                return Err(Error::new_spanned(
                    meta.path,
                    "unknown relmap struct attribute (supported: name, table)",
                ));
            };
            if slot.is_some() {
                return Err(Error::new_spanned(
                    meta.path,
                    format!("duplicate relmap attribute: {}", what),
                ));
            }
            *slot = Some(string_value(&meta, what)?);
            Ok(())
        })?;
    }
    Ok((name, table))
}

fn parse_fields(fields: &Fields, kind: DeriveKind) -> Result<Vec<FieldDef>> {
    match fields {
        Fields::Named(named) => named.named.iter().map(|f| parse_field(f, kind)).collect(),
        Fields::Unnamed(_) | Fields::Unit => Err(Error::new(
            Span::call_site(),
            format!("{} requires a struct with named fields", kind.label()),
        )),
    }
}

fn parse_field(field: &Field, kind: DeriveKind) -> Result<FieldDef> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| Error::new_spanned(field, "expected named field"))?;
    let mut def = FieldDef {
        ident,
        ty: field.ty.clone(),
        column: None,
        id: false,
        transient: false,
        unique: false,
        indexed: false,
        length: None,
    };

    for attr in &field.attrs {
        if !attr.path().is_ident("relmap") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            let path = &meta.path;
            if path.is_ident("id") {
                def.id = true;
            } else if path.is_ident("transient") {
                def.transient = true;
            } else if path.is_ident("unique") {
                def.unique = true;
            } else if path.is_ident("indexed") {
                def.indexed = true;
            } else if path.is_ident("column") {
                def.column = Some(string_value(&meta, "column")?);
            } else if path.is_ident("length") {
                let value: Lit = meta.value()?.parse()?;
                let Lit::Int(int) = value else {
                    return Err(Error::new_spanned(value, "expected integer for length"));
                };
                let length: u32 = int.base10_parse()?;
                if length == 0 {
                    return Err(Error::new_spanned(int, "length must be positive"));
                }
                def.length = Some(length);
            } else {
                return Err(Error::new_spanned(
                    path,
                    "unknown relmap field attribute \
                     (supported: id, transient, unique, indexed, column, length)",
                ));
            }
            Ok(())
        })?;
    }

    validate_field(&def, kind)?;
    Ok(def)
}

fn validate_field(def: &FieldDef, kind: DeriveKind) -> Result<()> {
    if kind == DeriveKind::Embeddable && (def.id || def.unique || def.indexed) {
        return Err(Error::new_spanned(
            &def.ident,
            "id, unique and indexed apply to entity fields only",
        ));
    }
    if def.transient && (def.id || def.unique || def.indexed || def.column.is_some()) {
        return Err(Error::new_spanned(
            &def.ident,
            "a transient field cannot be an id, indexed or mapped to a column",
        ));
    }
    Ok(())
}
