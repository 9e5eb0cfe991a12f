use crate::config::AuthorizerConfig;
use crate::error::Error;
use jsonwebtoken::jwk::{AlgorithmParameters, EllipticCurve, Jwk};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::Value;

use super::parts::UnverifiedHeader;

/// The only accepted signature algorithm, whatever the token header claims.
pub const REQUIRED_ALG: Algorithm = Algorithm::ES256;
const REQUIRED_ALG_NAME: &str = "ES256";

/// Verifies an ES256 signature with `jwk` and checks audience and time
/// claims, returning the verified payload.
pub fn verify_es256(
    token: &str,
    header: &UnverifiedHeader,
    jwk: &Jwk,
    config: &AuthorizerConfig,
) -> Result<Value, Error> {
    if header.alg.as_deref() != Some(REQUIRED_ALG_NAME) {
        return Err(Error::InvalidToken(format!(
            "algorithm must be {REQUIRED_ALG_NAME}"
        )));
    }
    let decoding_key = decoding_key(jwk, &header.kid)?;

    let mut validation = Validation::new(REQUIRED_ALG);
    validation.set_audience(&[config.audience.as_str()]);
    validation.leeway = config.leeway;
    validation.validate_exp = true;
    validation.validate_nbf = true;
    // exp/nbf are checked when present but not demanded; aud must be present
    // for the audience check to apply at all.
    validation.set_required_spec_claims(&["aud"]);

    let data = decode::<Value>(token, &decoding_key, &validation)?;
    Ok(data.claims)
}

fn decoding_key(jwk: &Jwk, kid: &str) -> Result<DecodingKey, Error> {
    match &jwk.algorithm {
        AlgorithmParameters::EllipticCurve(params) if params.curve == EllipticCurve::P256 => {}
        _ => {
            return Err(Error::UnknownSigningKey(format!(
                "key {kid} is not an EC P-256 key"
            )))
        }
    }
    DecodingKey::from_jwk(jwk)
        .map_err(|err| Error::UnknownSigningKey(format!("key {kid} is unusable: {err}")))
}
