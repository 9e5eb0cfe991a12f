use crate::config::AuthorizerConfig;
use crate::error::Error;
use crate::jwks::KeyDiscovery;
use crate::{Authorizer, AuthorizerRequest};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use jsonwebtoken::jwk::JwkSet;
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use rand::thread_rng;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

pub(super) const ISSUER: &str = "https://proj.supabase.co/auth/v1";
pub(super) const KID: &str = "key-1";
pub(super) const METHOD_ARN: &str =
    "arn:aws:execute-api:us-east-1:123456789012:abcxyz/prod/GET/posts";
pub(super) const STAGE_WILDCARD: &str = "arn:aws:execute-api:us-east-1:123456789012:abcxyz/prod/*";

pub(super) struct TestIssuer {
    pub(super) issuer: String,
    pub(super) kid: String,
    signing_key: SigningKey,
}

impl TestIssuer {
    pub(super) fn new(issuer: &str, kid: &str) -> Self {
        Self {
            issuer: issuer.to_string(),
            kid: kid.to_string(),
            signing_key: SigningKey::random(&mut thread_rng()),
        }
    }

    pub(super) fn jwks(&self) -> JwkSet {
        let verifying_key = VerifyingKey::from(&self.signing_key);
        let point = verifying_key.to_encoded_point(false);
        serde_json::from_value(json!({
            "keys": [{
                "kty": "EC",
                "crv": "P-256",
                "x": URL_SAFE_NO_PAD.encode(point.x().expect("x coord")),
                "y": URL_SAFE_NO_PAD.encode(point.y().expect("y coord")),
                "use": "sig",
                "kid": self.kid,
                "alg": "ES256",
            }]
        }))
        .expect("jwks")
    }

    pub(super) fn claims(&self) -> Value {
        json!({
            "iss": self.issuer,
            "sub": "user-123",
            "aud": "authenticated",
            "email": "a@b.com",
            "exp": jsonwebtoken::get_current_timestamp() + 3600,
        })
    }

    pub(super) fn header(&self) -> Value {
        json!({"alg": "ES256", "kid": self.kid, "typ": "JWT"})
    }

    pub(super) fn token(&self) -> String {
        self.sign(&self.header(), &self.claims())
    }

    pub(super) fn token_with_claims(&self, claims: &Value) -> String {
        self.sign(&self.header(), claims)
    }

    pub(super) fn sign(&self, header: &Value, claims: &Value) -> String {
        let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(header).expect("header"));
        let payload_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).expect("payload"));
        let signing_input = format!("{header_b64}.{payload_b64}");
        let signature: Signature = self.signing_key.sign(signing_input.as_bytes());
        let signature_b64 = URL_SAFE_NO_PAD.encode(signature.to_bytes());
        format!("{signing_input}.{signature_b64}")
    }
}

/// Serves key sets from memory and counts fetches.
#[derive(Default)]
pub(super) struct FakeDiscovery {
    sets: Mutex<HashMap<String, JwkSet>>,
    calls: AtomicUsize,
}

impl FakeDiscovery {
    pub(super) fn serving(issuer: &TestIssuer) -> Arc<Self> {
        let discovery = Arc::new(Self::default());
        discovery.serve(&issuer.issuer, issuer.jwks());
        discovery
    }

    pub(super) fn serve(&self, issuer: &str, jwks: JwkSet) {
        let uri = format!("{}/.well-known/jwks.json", issuer.trim_end_matches('/'));
        self.sets.lock().unwrap().insert(uri, jwks);
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl KeyDiscovery for FakeDiscovery {
    fn fetch(&self, jwks_uri: &Url) -> Result<JwkSet, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sets
            .lock()
            .unwrap()
            .get(jwks_uri.as_str())
            .cloned()
            .ok_or_else(|| Error::KeyFetch(format!("uri {jwks_uri} status 404 Not Found")))
    }
}

pub(super) fn authorizer(discovery: &Arc<FakeDiscovery>) -> Authorizer<Arc<FakeDiscovery>> {
    authorizer_with(AuthorizerConfig::default(), discovery)
}

pub(super) fn authorizer_with(
    config: AuthorizerConfig,
    discovery: &Arc<FakeDiscovery>,
) -> Authorizer<Arc<FakeDiscovery>> {
    Authorizer::with_discovery(config, Arc::clone(discovery))
}

pub(super) fn bearer_request(token: &str) -> AuthorizerRequest {
    AuthorizerRequest::new()
        .with_header("Authorization", format!("Bearer {token}"))
        .with_resource(METHOD_ARN)
}
