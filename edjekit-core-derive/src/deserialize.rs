use proc_macro2::TokenStream;
use quote::quote;
use syn::{spanned::Spanned, Fields, ItemStruct, LitStr};

use crate::common::field_name;

pub fn derive_deserialize_impl(st: ItemStruct) -> TokenStream {
    let mut variables = vec![];
    let mut constructor_fields = vec![];
    for (i, field) in st.fields.iter().enumerate() {
        let variable = field_name(i, field);
        let field_type = &field.ty;
        let error = LitStr::new(
            &format!("cannot deserialize field {}::{}", st.ident, variable),
            field.span(),
        );
        variables.push(quote! {
            let #variable: #field_type = ::edjekit_core::binary::ResultContextExt::context(
                ::edjekit_core::binary::Deserialize::deserialize(deserializer),
                #error,
            )?;
        });
        constructor_fields.push(variable);
    }

    let type_name = &st.ident;
    let (impl_generics, type_generics, where_clause) = st.generics.split_for_impl();
    let variables = TokenStream::from_iter(variables);
    let constructor = match &st.fields {
        Fields::Named(_) => quote! { Self { #(#constructor_fields,)* } },
        Fields::Unnamed(_) => quote! { Self ( #(#constructor_fields,)* ) },
        Fields::Unit => quote! { Self },
    };

    quote! {
        impl #impl_generics ::edjekit_core::binary::Deserialize for #type_name #type_generics #where_clause {
            fn deserialize(
                deserializer: &mut ::edjekit_core::binary::Deserializer<impl ::std::io::Read>,
            ) -> ::std::result::Result<Self, ::edjekit_core::binary::Error> {
                #variables
                ::std::result::Result::Ok(#constructor)
            }
        }
    }
}
