use crate::config::DEFAULT_JWKS_TIMEOUT;
use crate::error::Error;
use jsonwebtoken::jwk::JwkSet;
use reqwest::blocking::{Client as HttpClient, Response};
use std::io::Read;
use std::time::Duration;
use url::Url;

use super::sanitize::{jwks_from_slice, redact_uri, sanitize_error_body};

const MAX_ERROR_BODY_BYTES: u64 = 4 * 1024;

/// Source of an issuer's key-discovery document.
pub trait KeyDiscovery: Send + Sync {
    fn fetch(&self, jwks_uri: &Url) -> Result<JwkSet, Error>;
}

impl<T: KeyDiscovery + ?Sized> KeyDiscovery for std::sync::Arc<T> {
    fn fetch(&self, jwks_uri: &Url) -> Result<JwkSet, Error> {
        (**self).fetch(jwks_uri)
    }
}

/// Location of `issuer`'s key-discovery document.
pub fn jwks_uri(issuer: &str, jwks_path: &str) -> Result<Url, Error> {
    let uri = Url::parse(&format!(
        "{}/{}",
        issuer.trim_end_matches('/'),
        jwks_path.trim_start_matches('/')
    ))?;
    if !matches!(uri.scheme(), "https" | "http") {
        return Err(Error::UnknownSigningKey(format!(
            "issuer scheme {} is not http(s)",
            uri.scheme()
        )));
    }
    Ok(uri)
}

#[derive(Debug, Clone)]
pub struct HttpKeyDiscovery {
    http: HttpClient,
    timeout: Option<Duration>,
}

impl HttpKeyDiscovery {
    pub fn new() -> Result<Self, Error> {
        let http = HttpClient::builder().build()?;
        Ok(Self {
            http,
            timeout: Some(DEFAULT_JWKS_TIMEOUT),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }
}

impl KeyDiscovery for HttpKeyDiscovery {
    fn fetch(&self, jwks_uri: &Url) -> Result<JwkSet, Error> {
        let mut req = self.http.get(jwks_uri.clone());
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let mut resp = req.send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = read_body_with_limit(&mut resp, MAX_ERROR_BODY_BYTES);
            let body_preview = sanitize_error_body(&body);
            let redacted = redact_uri(jwks_uri);
            return Err(Error::KeyFetch(if body_preview.is_empty() {
                format!("uri {redacted} status {status}")
            } else {
                format!("uri {redacted} status {status} body_preview {body_preview}")
            }));
        }
        let body = resp.bytes()?;
        jwks_from_slice(&body)
    }
}

// Best effort: a body that fails to read just yields no preview.
fn read_body_with_limit(resp: &mut Response, limit: u64) -> Vec<u8> {
    let mut body = Vec::new();
    let _ = Read::take(&mut *resp, limit).read_to_end(&mut body);
    body
}
