#![forbid(unsafe_code)]

mod authorizer;
mod caller;
mod config;
mod decision;
mod error;
mod jwks;
mod jwt;
mod request;
mod resource;

pub use authorizer::Authorizer;
pub use caller::{CallerContextError, CallerIdentity};
pub use config::{
    AuthorizerConfig, DEFAULT_AUDIENCE, DEFAULT_JWKS_PATH, DEFAULT_JWKS_TIMEOUT,
    DEFAULT_MIN_REFRESH_INTERVAL,
};
pub use decision::{
    AccessDecision, DecisionContext, Effect, IdentityContext, PolicyDocument, Statement,
};
pub use error::{deny_message, Error, FailureKind, KEYS_UNAVAILABLE_MESSAGE, MISSING_TOKEN_MESSAGE};
pub use jwks::{jwks_from_slice, jwks_uri, HttpKeyDiscovery, IssuerKeyCache, KeyDiscovery};
pub use jwt::{
    decode_unverified_header, decode_unverified_issuer, verify_es256, IdentityClaims,
    UnverifiedHeader, REQUIRED_ALG,
};
pub use request::{normalize_token, AuthorizerRequest, Headers};
pub use resource::{policy_resource, ResourceArn};
