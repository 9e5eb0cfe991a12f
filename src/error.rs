use std::fmt;

/// Outward message for a request that carried no token at all.
pub const MISSING_TOKEN_MESSAGE: &str = "Authorization token missing";
/// Outward message for key-discovery failures; detail stays in the logs.
pub const KEYS_UNAVAILABLE_MESSAGE: &str = "Signing keys unavailable";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("authorization token missing")]
    MissingToken,
    #[error("malformed token: {0}")]
    MalformedToken(String),
    #[error("unknown signing key: {0}")]
    UnknownSigningKey(String),
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("jwks fetch failed: {0}")]
    KeyFetch(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

/// Closed set of reasons an authorization attempt is denied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    MissingToken,
    MalformedToken,
    UnknownSigningKey,
    InvalidToken,
    RemoteKeyFetchFailure,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::MissingToken => "missing_token",
            FailureKind::MalformedToken => "malformed_token",
            FailureKind::UnknownSigningKey => "unknown_signing_key",
            FailureKind::InvalidToken => "invalid_token",
            FailureKind::RemoteKeyFetchFailure => "remote_key_fetch_failure",
        }
    }

    /// True when the same request could succeed later without any change on
    /// the caller's side.
    pub fn is_retryable(self) -> bool {
        matches!(self, FailureKind::RemoteKeyFetchFailure)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::MissingToken => FailureKind::MissingToken,
            Error::MalformedToken(_) => FailureKind::MalformedToken,
            Error::UnknownSigningKey(_) | Error::Url(_) => FailureKind::UnknownSigningKey,
            Error::InvalidToken(_) | Error::Jwt(_) => FailureKind::InvalidToken,
            Error::KeyFetch(_) | Error::Http(_) | Error::Json(_) => {
                FailureKind::RemoteKeyFetchFailure
            }
        }
    }
}

/// Maps an error to the short diagnostic placed in a Deny decision's context.
///
/// Remote fetch failures collapse to a fixed string because their detail can
/// carry upstream response bodies.
pub fn deny_message(err: &Error) -> String {
    match err {
        Error::MissingToken => MISSING_TOKEN_MESSAGE.to_string(),
        Error::MalformedToken(detail) => format!("Malformed token: {detail}"),
        Error::UnknownSigningKey(detail) => format!("Unknown signing key: {detail}"),
        Error::Url(_) => "Unknown signing key: issuer is not a valid url".to_string(),
        Error::InvalidToken(detail) => format!("Invalid token: {detail}"),
        Error::Jwt(err) => format!("Invalid token: {err}"),
        Error::KeyFetch(_) | Error::Http(_) | Error::Json(_) => {
            KEYS_UNAVAILABLE_MESSAGE.to_string()
        }
    }
}
