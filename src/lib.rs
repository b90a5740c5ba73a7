pub mod api;
pub mod config;
pub mod edit_buffer;
pub mod editor;
pub mod error;
pub mod links;
pub mod search;
pub mod store;
pub mod suggest;

#[cfg(test)]
pub(crate) mod test_helpers;

// Convenience re-exports
pub use api::client::BackendClient;
pub use api::queries;
pub use api::types;
pub use error::{Error, Result};
