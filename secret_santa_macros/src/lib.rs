mod utilities;
mod simple_entity;

extern crate proc_macro;

use proc_macro::TokenStream;

use simple_entity::simple_entity_derive_impl;


#[proc_macro_derive(SimpleEntity, attributes(module_path, get_many_pools_func, pool_id))]
pub fn simple_entity_derive(input: TokenStream) -> TokenStream {
    simple_entity_derive_impl(input)
}
