mod component;

use proc_macro::TokenStream;

/// Mark a type as storable in a `rusty_sparse` registry.
#[proc_macro_derive(Component)]
pub fn derive_component(item: TokenStream) -> TokenStream {
    component::derive_component(item)
}
