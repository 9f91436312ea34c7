mod common;
mod deserialize;
mod serialize;

use syn::{parse_macro_input, ItemStruct};

/// Derives `edjekit_core::binary::Deserialize` for a struct by deserializing its fields in
/// declaration order.
#[proc_macro_derive(Deserialize)]
pub fn derive_deserialize(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(item as ItemStruct);

    deserialize::derive_deserialize_impl(input).into()
}

/// Derives `edjekit_core::binary::Serialize` for a struct by serializing its fields in
/// declaration order.
#[proc_macro_derive(Serialize)]
pub fn derive_serialize(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(item as ItemStruct);

    serialize::derive_serialize_impl(input).into()
}
