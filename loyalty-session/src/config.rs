//! Session configuration

use std::time::Duration;

/// Engine tuning knobs
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Upper bound for each of the three lookup steps
    pub lookup_timeout: Duration,

    /// Capacity of the notice broadcast channel
    pub notice_capacity: usize,
}

impl SessionConfig {
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn with_notice_capacity(mut self, capacity: usize) -> Self {
        self.notice_capacity = capacity.max(1);
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lookup_timeout: Duration::from_secs(10),
            notice_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = SessionConfig::default()
            .with_lookup_timeout(Duration::from_millis(250))
            .with_notice_capacity(0);
        assert_eq!(config.lookup_timeout, Duration::from_millis(250));
        // broadcast::channel panics on zero capacity
        assert_eq!(config.notice_capacity, 1);
    }
}
