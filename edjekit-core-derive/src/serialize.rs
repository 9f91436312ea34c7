use proc_macro2::TokenStream;
use quote::quote;
use syn::{spanned::Spanned, Index, ItemStruct, LitStr, Member};

use crate::common::field_name;

pub fn derive_serialize_impl(st: ItemStruct) -> TokenStream {
    let mut stmts = vec![];
    for (i, field) in st.fields.iter().enumerate() {
        let member = match &field.ident {
            Some(ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(Index::from(i)),
        };
        let error = LitStr::new(
            &format!(
                "cannot serialize field {}::{}",
                st.ident,
                field_name(i, field)
            ),
            field.span(),
        );
        stmts.push(quote! {
            ::edjekit_core::binary::ResultContextExt::context(
                ::edjekit_core::binary::Serialize::serialize(&self.#member, serializer),
                #error,
            )?;
        });
    }

    let type_name = &st.ident;
    let (impl_generics, type_generics, where_clause) = st.generics.split_for_impl();
    let stmts = TokenStream::from_iter(stmts);

    quote! {
        impl #impl_generics ::edjekit_core::binary::Serialize for #type_name #type_generics #where_clause {
            fn serialize(
                &self,
                serializer: &mut ::edjekit_core::binary::Serializer<impl ::std::io::Write>,
            ) -> ::std::result::Result<(), ::edjekit_core::binary::Error> {
                #stmts
                ::std::result::Result::Ok(())
            }
        }
    }
}
