//! MySQL implementations of the core store traits

mod token_store_impl;

pub use token_store_impl::MySqlTokenStore;
