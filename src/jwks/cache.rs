use crate::config::DEFAULT_MIN_REFRESH_INTERVAL;
use crate::error::Error;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use log::{info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Issuer → key set, populated on first sight of an issuer and kept for the
/// life of the cache. There is no TTL and no capacity bound.
///
/// A `kid` missing from a cached set triggers a refetch of that issuer's set,
/// at most once per `min_refresh_interval` whether or not the refetch
/// succeeds, so rotated keys are picked up without letting unknown `kid`s
/// force a fetch on every request. Fetches are serialized per issuer only.
#[derive(Debug)]
pub struct IssuerKeyCache {
    entries: RwLock<HashMap<String, CachedKeySet>>,
    fetch_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    min_refresh_interval: Duration,
}

#[derive(Debug, Clone)]
struct CachedKeySet {
    jwks: JwkSet,
    // Last fetch attempt, successful or not.
    attempted_at: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FetchSource {
    Cache,
    Remote,
}

enum Lookup {
    Hit(Jwk),
    // Cached, kid absent, too soon to refetch.
    Miss,
    Stale,
    Unseen,
}

impl Default for IssuerKeyCache {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_REFRESH_INTERVAL)
    }
}

impl IssuerKeyCache {
    pub fn new(min_refresh_interval: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            fetch_locks: Mutex::new(HashMap::new()),
            min_refresh_interval,
        }
    }

    /// Seeds `issuer` with a known key set, as if it had just been fetched.
    pub fn preload(&self, issuer: impl Into<String>, jwks: JwkSet) {
        let cached = CachedKeySet {
            jwks,
            attempted_at: Instant::now(),
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(issuer.into(), cached);
    }

    pub fn contains_issuer(&self, issuer: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(issuer)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves `kid` under `issuer`, calling `fetch` only when the issuer is
    /// unseen or a rotation refetch is due.
    pub fn signing_key<F>(&self, issuer: &str, kid: &str, fetch: F) -> Result<Jwk, Error>
    where
        F: FnOnce() -> Result<JwkSet, Error>,
    {
        self.signing_key_with_source(issuer, kid, fetch)
            .map(|(jwk, _source)| jwk)
    }

    pub(crate) fn signing_key_with_source<F>(
        &self,
        issuer: &str,
        kid: &str,
        fetch: F,
    ) -> Result<(Jwk, FetchSource), Error>
    where
        F: FnOnce() -> Result<JwkSet, Error>,
    {
        match self.lookup(issuer, kid) {
            Lookup::Hit(jwk) => return Ok((jwk, FetchSource::Cache)),
            Lookup::Miss => return Err(unknown_kid(kid)),
            Lookup::Stale | Lookup::Unseen => {}
        }

        let issuer_lock = self.fetch_lock(issuer);
        let _guard = issuer_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have fetched while we waited.
        match self.lookup(issuer, kid) {
            Lookup::Hit(jwk) => return Ok((jwk, FetchSource::Cache)),
            Lookup::Miss => return Err(unknown_kid(kid)),
            Lookup::Stale => {
                info!("kid {kid} not cached for issuer {issuer}; refreshing keys");
                self.mark_attempt(issuer);
            }
            Lookup::Unseen => info!("fetching signing keys for issuer {issuer}"),
        }

        let jwks = match fetch() {
            Ok(jwks) => jwks,
            Err(err) => {
                if self.contains_issuer(issuer) {
                    warn!("refresh for issuer {issuer} failed; keeping previous keys");
                }
                return Err(err);
            }
        };
        let jwk = jwks.find(kid).cloned();
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                issuer.to_string(),
                CachedKeySet {
                    jwks,
                    attempted_at: Instant::now(),
                },
            );
        jwk.map(|jwk| (jwk, FetchSource::Remote))
            .ok_or_else(|| unknown_kid(kid))
    }

    fn fetch_lock(&self, issuer: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .fetch_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(issuer.to_string()).or_default())
    }

    fn mark_attempt(&self, issuer: &str) {
        if let Some(cached) = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(issuer)
        {
            cached.attempted_at = Instant::now();
        }
    }

    fn lookup(&self, issuer: &str, kid: &str) -> Lookup {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let Some(cached) = entries.get(issuer) else {
            return Lookup::Unseen;
        };
        if let Some(jwk) = cached.jwks.find(kid) {
            return Lookup::Hit(jwk.clone());
        }
        if cached.attempted_at + self.min_refresh_interval > Instant::now() {
            Lookup::Miss
        } else {
            Lookup::Stale
        }
    }

    #[cfg(test)]
    fn backdate(&self, issuer: &str, by: Duration) {
        if let Some(cached) = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(issuer)
        {
            cached.attempted_at -= by;
        }
    }
}

fn unknown_kid(kid: &str) -> Error {
    Error::UnknownSigningKey(format!("no key with kid {kid}"))
}
