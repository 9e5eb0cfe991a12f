use crate::error::Error;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::Value;

pub(crate) struct TokenParts<'a> {
    pub(crate) header: &'a str,
    pub(crate) payload: &'a str,
}

/// Header fields read before the signature is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnverifiedHeader {
    pub alg: Option<String>,
    pub kid: String,
}

pub(crate) fn split_token(token: &str) -> Result<TokenParts<'_>, Error> {
    let mut iter = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) =
        (iter.next(), iter.next(), iter.next(), iter.next())
    else {
        return Err(malformed("token must have three segments"));
    };
    if header.is_empty() || payload.is_empty() || signature.is_empty() {
        return Err(malformed("token has an empty segment"));
    }
    Ok(TokenParts { header, payload })
}

/// Reads `alg` and the required `kid` without verifying the signature.
pub fn decode_unverified_header(token: &str) -> Result<UnverifiedHeader, Error> {
    let parts = split_token(token)?;
    let header = decode_segment(parts.header, "header")?;
    let kid = header
        .get("kid")
        .and_then(Value::as_str)
        .filter(|kid| !kid.is_empty())
        .ok_or_else(|| malformed("token header has no kid"))?;
    let alg = header
        .get("alg")
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(UnverifiedHeader {
        alg,
        kid: kid.to_string(),
    })
}

/// Reads the required `iss` claim without verifying the signature.
pub fn decode_unverified_issuer(token: &str) -> Result<String, Error> {
    let parts = split_token(token)?;
    let payload = decode_segment(parts.payload, "payload")?;
    payload
        .get("iss")
        .and_then(Value::as_str)
        .filter(|iss| !iss.is_empty())
        .map(str::to_string)
        .ok_or_else(|| malformed("token payload has no iss"))
}

fn decode_segment(segment: &str, name: &str) -> Result<Value, Error> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| malformed(&format!("token {name} is not base64url")))?;
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|_| malformed(&format!("token {name} is not json")))?;
    if !value.is_object() {
        return Err(malformed(&format!("token {name} is not a json object")));
    }
    Ok(value)
}

fn malformed(detail: &str) -> Error {
    Error::MalformedToken(detail.to_string())
}
