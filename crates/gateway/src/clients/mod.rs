//! Clients for the hosted auth + database backend.

mod backend;
mod baas_client;
mod http_backend;
pub mod names;
mod query;

pub use backend::{Backend, Caller};
pub use baas_client::BaasClient;
pub use http_backend::HttpBackend;
pub use query::Query;

#[cfg(test)]
pub use backend::MockBackend;
