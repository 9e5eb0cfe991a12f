use crate::config::AuthorizerConfig;
use crate::decision::AccessDecision;
use crate::error::{deny_message, Error};
use crate::jwks::{jwks_uri, FetchSource, HttpKeyDiscovery, IssuerKeyCache, KeyDiscovery};
use crate::jwt::{
    decode_unverified_header, decode_unverified_issuer, verify_es256, IdentityClaims,
};
use crate::request::AuthorizerRequest;
use crate::resource::policy_resource;
use jsonwebtoken::jwk::Jwk;
use log::{debug, error, info, warn};
use serde_json::Value;
use std::sync::Arc;

#[cfg(test)]
mod tests;

/// Turns an inbound gateway event into an Allow/Deny decision.
///
/// Every failure becomes a Deny; nothing is propagated to the caller.
#[derive(Debug)]
pub struct Authorizer<D = HttpKeyDiscovery> {
    config: AuthorizerConfig,
    discovery: D,
    keys: Arc<IssuerKeyCache>,
}

impl Authorizer<HttpKeyDiscovery> {
    /// Creates an authorizer fetching keys over HTTP.
    pub fn new(config: AuthorizerConfig) -> Result<Self, Error> {
        let discovery = HttpKeyDiscovery::new()?.with_timeout(config.jwks_timeout);
        Ok(Self::with_discovery(config, discovery))
    }

    pub fn from_env() -> Result<Self, Error> {
        Self::new(AuthorizerConfig::from_env())
    }
}

impl<D: KeyDiscovery> Authorizer<D> {
    pub fn with_discovery(config: AuthorizerConfig, discovery: D) -> Self {
        let keys = Arc::new(IssuerKeyCache::new(config.min_refresh_interval));
        Self {
            config,
            discovery,
            keys,
        }
    }

    /// Replaces the key cache, e.g. to share one between authorizers.
    pub fn with_key_cache(mut self, keys: Arc<IssuerKeyCache>) -> Self {
        self.keys = keys;
        self
    }

    pub fn config(&self) -> &AuthorizerConfig {
        &self.config
    }

    pub fn key_cache(&self) -> &IssuerKeyCache {
        &self.keys
    }

    pub fn authorize(&self, request: &AuthorizerRequest) -> AccessDecision {
        let resource = policy_resource(request.resource_identifier());
        let identity = request
            .bearer_token()
            .ok_or(Error::MissingToken)
            .and_then(|token| self.verify(token));
        match identity {
            Ok(claims) => {
                info!("token verified for principal {}", claims.subject);
                AccessDecision::allow(resource, claims.to_context())
            }
            Err(err) => {
                let kind = err.kind();
                if kind.is_retryable() {
                    error!("denying request ({kind}): {err}");
                } else {
                    warn!("denying request ({kind}): {err}");
                }
                AccessDecision::deny(resource, deny_message(&err))
            }
        }
    }

    /// Raw-event entry point: an event that does not deserialize is denied
    /// against whatever resource it names.
    pub fn authorize_value(&self, event: Value) -> Value {
        let decision = match serde_json::from_value::<AuthorizerRequest>(event.clone()) {
            Ok(request) => self.authorize(&request),
            Err(err) => {
                warn!("denying unparseable authorizer event: {err}");
                let raw = event
                    .get("methodArn")
                    .or_else(|| event.get("resource"))
                    .and_then(Value::as_str);
                let err = Error::MalformedToken("unreadable request".to_string());
                AccessDecision::deny(policy_resource(raw), deny_message(&err))
            }
        };
        decision.to_value()
    }

    /// Verifies `token` (already stripped of any `Bearer ` prefix) and returns
    /// its identity claims.
    pub fn verify(&self, token: &str) -> Result<IdentityClaims, Error> {
        let header = decode_unverified_header(token)?;
        let jwk = self.signing_key_for(token, &header.kid)?;
        let claims = verify_es256(token, &header, &jwk, &self.config)?;
        IdentityClaims::from_claims(&claims)
    }

    /// Finds the public key that should have signed `token`, fetching the
    /// issuer's key set on first sight.
    pub fn resolve_signing_key(&self, token: &str) -> Result<Jwk, Error> {
        let header = decode_unverified_header(token)?;
        self.signing_key_for(token, &header.kid)
    }

    fn signing_key_for(&self, token: &str, kid: &str) -> Result<Jwk, Error> {
        let issuer = decode_unverified_issuer(token)?;
        if !self.config.is_trusted_issuer(&issuer) {
            return Err(Error::UnknownSigningKey(
                "issuer is not trusted".to_string(),
            ));
        }
        let uri = jwks_uri(&issuer, &self.config.jwks_path)?;
        let (jwk, source) = self
            .keys
            .signing_key_with_source(&issuer, kid, || self.discovery.fetch(&uri))?;
        if source == FetchSource::Remote {
            debug!("signing key {kid} fetched from {uri}");
        }
        Ok(jwk)
    }
}
