//! Origin matching for outgoing requests.
//!
//! A request target is trusted when its origin (`scheme://host[:port]`) is the
//! application's own origin or one of the configured cross-origin whitelist
//! entries. Resolution results are cached per raw URL string.

use crate::error::{AuthError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};
use url::Url;

pub struct OriginMatcher {
    base: Url,
    application_origin: String,
    whitelist: HashSet<String>,
    cache: Mutex<HashMap<String, Option<String>>>,
}

impl OriginMatcher {
    pub fn new<I, S>(application_origin: &str, whitelist: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let base = Url::parse(application_origin).map_err(|e| {
            AuthError::ConfigError(format!(
                "Invalid application origin '{}': {}",
                application_origin, e
            ))
        })?;
        let application_origin = origin_of_url(&base).ok_or_else(|| {
            AuthError::ConfigError(format!(
                "Application origin '{}' has no host",
                application_origin
            ))
        })?;

        let whitelist = whitelist
            .into_iter()
            .map(|entry| normalize_whitelist_entry(entry.as_ref()))
            .collect();

        Ok(Self {
            base,
            application_origin,
            whitelist,
            cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn application_origin(&self) -> &str {
        &self.application_origin
    }

    pub fn whitelist(&self) -> impl Iterator<Item = &str> {
        self.whitelist.iter().map(String::as_str)
    }

    /// Whether credentials may be attached to a request for `url`.
    pub fn is_trusted(&self, url: &str) -> bool {
        match self.origin_of(url) {
            Some(origin) => origin == self.application_origin || self.whitelist.contains(&origin),
            None => false,
        }
    }

    /// Canonical origin of `url`, resolved against the application origin.
    pub fn origin_of(&self, url: &str) -> Option<String> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = cache.get(url) {
            return cached.clone();
        }

        let origin = self.base.join(url).ok().and_then(|u| origin_of_url(&u));
        debug!(url, origin = origin.as_deref().unwrap_or("<none>"), "resolved origin");
        cache.insert(url.to_string(), origin.clone());
        origin
    }
}

/// `scheme://host[:port]`, with the port omitted when it is the scheme default.
pub fn origin_of_url(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

fn normalize_whitelist_entry(entry: &str) -> String {
    let trimmed = entry.trim();
    match Url::parse(trimmed).ok().and_then(|u| origin_of_url(&u)) {
        Some(origin) => origin,
        None => {
            warn!(entry = trimmed, "whitelist entry is not an absolute URL; comparing verbatim");
            trimmed.trim_end_matches('/').to_string()
        }
    }
}
