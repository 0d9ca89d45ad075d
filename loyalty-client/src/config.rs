//! Client configuration

use std::path::PathBuf;

/// Client configuration for connecting to the loyalty backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "https://api.example.com/api")
    pub base_url: String,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,

    /// File holding the cashier's bearer credential.
    ///
    /// `None` keeps the credential in memory only.
    pub credential_path: Option<PathBuf>,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: 30_000,
            credential_path: None,
        }
    }

    /// Set the request timeout
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Persist the credential at the given path
    pub fn with_credential_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credential_path = Some(path.into());
        self
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> crate::ClientResult<crate::LoyaltyHttpClient> {
        crate::LoyaltyHttpClient::from_config(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ClientConfig::new("http://pos.local")
            .with_timeout_ms(5_000)
            .with_credential_path("/tmp/cashier.json");
        assert_eq!(config.base_url, "http://pos.local");
        assert_eq!(config.timeout_ms, 5_000);
        assert_eq!(
            config.credential_path.as_deref(),
            Some(std::path::Path::new("/tmp/cashier.json"))
        );
    }

    #[test]
    fn test_default() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout_ms, 30_000);
        assert!(config.credential_path.is_none());
    }
}
