//! Service credentials for the scheduled sweep handlers.
//!
//! The scheduler that invokes the sweeps is provisioned with `MARKET_SERVICE_URL` and
//! `MARKET_SERVICE_KEY`. Both must be present for a sweep to run.

/// Environment variable holding the service base URL.
pub const SERVICE_URL_VAR: &str = "MARKET_SERVICE_URL";
/// Environment variable holding the service key.
pub const SERVICE_KEY_VAR: &str = "MARKET_SERVICE_KEY";

/// The two credentials a sweep run requires.
#[derive(Clone)]
pub struct ServiceCredentials {
    /// Base URL of the service
    pub url: String,
    /// Service-role key
    pub key: String,
}

impl std::fmt::Debug for ServiceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCredentials")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl ServiceCredentials {
    /// Builds credentials from raw values, treating blank values as missing.
    #[must_use]
    pub fn new(url: Option<String>, key: Option<String>) -> Option<Self> {
        match (url, key) {
            (Some(url), Some(key)) if !url.trim().is_empty() && !key.trim().is_empty() => {
                Some(Self { url, key })
            }
            _ => None,
        }
    }

    /// Reads both credentials from the environment.
    ///
    /// Returns `None` when either variable is unset or blank.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::new(
            std::env::var(SERVICE_URL_VAR).ok(),
            std::env::var(SERVICE_KEY_VAR).ok(),
        )
    }
}
