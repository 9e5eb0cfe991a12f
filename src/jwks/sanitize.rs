use crate::error::Error;
use jsonwebtoken::jwk::JwkSet;
use log::warn;
use serde_json::Value;
use url::Url;

const MAX_BODY_PREVIEW_BYTES: usize = 128;

// `alg` values jsonwebtoken's JWK model can represent.
const SUPPORTED_JWK_ALGS: &[&str] = &[
    "HS256",
    "HS384",
    "HS512",
    "ES256",
    "ES384",
    "RS256",
    "RS384",
    "RS512",
    "PS256",
    "PS384",
    "PS512",
    "EdDSA",
    "RSA1_5",
    "RSA-OAEP",
    "RSA-OAEP-256",
];

pub(super) fn sanitize_error_body(body: &[u8]) -> String {
    let mut sanitized = String::new();
    for &byte in body.iter().take(MAX_BODY_PREVIEW_BYTES) {
        match byte {
            b'\n' => sanitized.push_str("\\n"),
            b'\r' => sanitized.push_str("\\r"),
            b'\t' => sanitized.push_str("\\t"),
            _ if byte.is_ascii_graphic() || byte == b' ' => sanitized.push(byte as char),
            _ => sanitized.push('.'),
        }
    }
    if body.len() > MAX_BODY_PREVIEW_BYTES {
        sanitized.push_str("...");
    }
    sanitized
}

pub(super) fn redact_uri(uri: &Url) -> String {
    let mut redacted = uri.clone();
    let _ = redacted.set_username("");
    let _ = redacted.set_password(None);
    redacted.set_query(None);
    redacted.set_fragment(None);
    redacted.to_string()
}

/// Parses a key-discovery document, dropping `alg` values the JWK model
/// cannot hold so one odd key does not reject the whole set.
pub fn jwks_from_slice(body: &[u8]) -> Result<JwkSet, Error> {
    let mut value: Value = serde_json::from_slice(body)?;
    sanitize_jwks(&mut value);
    let jwks: JwkSet = serde_json::from_value(value)?;
    Ok(jwks)
}

pub(super) fn sanitize_jwks(value: &mut Value) -> usize {
    let Some(keys) = value.get_mut("keys").and_then(Value::as_array_mut) else {
        return 0;
    };
    let mut removed = 0;
    for key in keys {
        let Some(object) = key.as_object_mut() else {
            continue;
        };
        let Some(alg) = object.get("alg") else {
            continue;
        };
        let supported = alg
            .as_str()
            .is_some_and(|alg| SUPPORTED_JWK_ALGS.contains(&alg));
        if !supported {
            warn!(
                "dropping unsupported jwk alg; kid={}",
                object
                    .get("kid")
                    .and_then(Value::as_str)
                    .unwrap_or("<none>")
            );
            object.remove("alg");
            removed += 1;
        }
    }
    removed
}
