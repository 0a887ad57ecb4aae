use matches2::option_match;
use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::Parse;
use syn::{Error, Result};

use crate::util::{Attr, Named};

pub(crate) fn derive(input: TokenStream) -> Result<TokenStream> {
    let input: syn::DeriveInput = syn::parse2(input)?;

    let mut args: Attr<ItemOpt> = Attr::default();
    for attr in &input.attrs {
        if attr.path().is_ident("entwine") {
            let this_args: Attr<ItemOpt> = attr.parse_args()?;
            args.items.extend(this_args.items);
        }
    }

    let crate_name = args
        .find_one(|opt| option_match!(opt, ItemOpt::EntwineAs(_, crate_name) => crate_name))?
        .map_or_else(|| quote!(::entwine), |(_, crate_name)| crate_name.clone());

    let name_fn = args
        .find_one(|opt| option_match!(opt, ItemOpt::Name(_, name) => name))?
        .map(|(_, name)| {
            quote! {
                fn registered_name() -> &'static str { #name }
            }
        });

    let mut generics = input.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(syn::parse_quote!('static));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let input_ident = &input.ident;

    let output = quote! {
        impl #impl_generics #crate_name::identity::Registered for #input_ident #ty_generics #where_clause {
            #name_fn
        }
    };

    Ok(output)
}

enum ItemOpt {
    EntwineAs(syn::token::Paren, TokenStream),
    Name(syn::Token![=], syn::LitStr),
}

impl Parse for Named<ItemOpt> {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let name = input.parse::<syn::Ident>()?;

        let value = match name.to_string().as_str() {
            "entwine_as" => {
                let inner;
                let paren = syn::parenthesized!(inner in input);
                let args = inner.parse()?;
                ItemOpt::EntwineAs(paren, args)
            }
            "name" => {
                let eq: syn::Token![=] = input.parse()?;
                let lit: syn::LitStr = input.parse()?;
                ItemOpt::Name(eq, lit)
            }
            _ => return Err(Error::new_spanned(&name, format!("Unknown argument `{}`", name))),
        };

        Ok(Named { name, value })
    }
}
