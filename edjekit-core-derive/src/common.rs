use proc_macro2::Ident;
use syn::{spanned::Spanned, Field};

/// Name of a field; tuple struct fields are named after their position.
pub fn field_name(index: usize, field: &Field) -> Ident {
    field
        .ident
        .clone()
        .unwrap_or_else(|| Ident::new(&format!("field_{index}"), field.span()))
}
