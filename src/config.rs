use log::warn;
use std::env;
use std::time::Duration;

pub const DEFAULT_AUDIENCE: &str = "authenticated";
pub const DEFAULT_JWKS_PATH: &str = "/.well-known/jwks.json";
pub const DEFAULT_JWKS_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

pub const ENV_AUDIENCE: &str = "AUTHORIZER_AUDIENCE";
pub const ENV_TRUSTED_ISSUERS: &str = "AUTHORIZER_TRUSTED_ISSUERS";
pub const ENV_JWKS_TIMEOUT_SECS: &str = "AUTHORIZER_JWKS_TIMEOUT_SECS";
pub const ENV_JWKS_REFRESH_SECS: &str = "AUTHORIZER_JWKS_REFRESH_SECS";
pub const ENV_LEEWAY_SECS: &str = "AUTHORIZER_LEEWAY_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizerConfig {
    /// Required value of the `aud` claim.
    pub audience: String,
    /// Path appended to the issuer to locate its key-discovery document.
    pub jwks_path: String,
    pub jwks_timeout: Duration,
    /// Minimum spacing between refetches of an issuer whose key set lacks
    /// the requested `kid`.
    pub min_refresh_interval: Duration,
    /// Clock skew tolerated on `exp`/`nbf`, in seconds.
    pub leeway: u64,
    /// Issuers allowed to have their keys fetched. Empty accepts any issuer.
    pub trusted_issuers: Vec<String>,
}

impl Default for AuthorizerConfig {
    fn default() -> Self {
        Self {
            audience: DEFAULT_AUDIENCE.to_string(),
            jwks_path: DEFAULT_JWKS_PATH.to_string(),
            jwks_timeout: DEFAULT_JWKS_TIMEOUT,
            min_refresh_interval: DEFAULT_MIN_REFRESH_INTERVAL,
            leeway: 0,
            trusted_issuers: Vec::new(),
        }
    }
}

impl AuthorizerConfig {
    /// Reads overrides from `AUTHORIZER_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(audience) = lookup(ENV_AUDIENCE).filter(|v| !v.trim().is_empty()) {
            config.audience = audience.trim().to_string();
        }
        if let Some(issuers) = lookup(ENV_TRUSTED_ISSUERS) {
            config.trusted_issuers = issuers
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(secs) = parse_secs(&lookup, ENV_JWKS_TIMEOUT_SECS) {
            config.jwks_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_secs(&lookup, ENV_JWKS_REFRESH_SECS) {
            config.min_refresh_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_secs(&lookup, ENV_LEEWAY_SECS) {
            config.leeway = secs;
        }
        config
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    pub fn with_jwks_path(mut self, path: impl Into<String>) -> Self {
        self.jwks_path = path.into();
        self
    }

    pub fn with_jwks_timeout(mut self, timeout: Duration) -> Self {
        self.jwks_timeout = timeout;
        self
    }

    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    pub fn with_leeway(mut self, leeway: u64) -> Self {
        self.leeway = leeway;
        self
    }

    pub fn with_trusted_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.trusted_issuers.push(issuer.into());
        self
    }

    pub fn is_trusted_issuer(&self, issuer: &str) -> bool {
        self.trusted_issuers.is_empty()
            || self
                .trusted_issuers
                .iter()
                .any(|trusted| trusted.trim_end_matches('/') == issuer.trim_end_matches('/'))
    }
}

fn parse_secs<F>(lookup: &F, name: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.trim().parse::<u64>() {
        Ok(secs) => Some(secs),
        Err(_) => {
            warn!("ignoring {name}: not a whole number of seconds");
            None
        }
    }
}
