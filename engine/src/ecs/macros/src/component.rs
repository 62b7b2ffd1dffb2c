use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

pub fn derive_component(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    TokenStream::from(component_impl(&ast))
}

/// Expand the `Component` impl for a parsed type.
fn component_impl(ast: &DeriveInput) -> TokenStream2 {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    // `::rusty_sparse` resolves inside the crate too, through `extern crate self as rusty_sparse;`.
    quote! {
        impl #impl_generics ::rusty_sparse::ecs::Component for #name #ty_generics #where_clause {
        }
    }
}
