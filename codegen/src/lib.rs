use proc_macro::TokenStream;

mod registered;
mod util;

#[proc_macro_derive(Registered, attributes(entwine))]
pub fn registered(input: TokenStream) -> TokenStream {
    registered::derive(input.into()).unwrap_or_else(|err| err.to_compile_error()).into()
}
