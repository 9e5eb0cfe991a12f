mod cache;
mod fetch;
mod sanitize;

pub use cache::IssuerKeyCache;
pub use fetch::{jwks_uri, HttpKeyDiscovery, KeyDiscovery};
pub use sanitize::jwks_from_slice;

pub(crate) use cache::FetchSource;
