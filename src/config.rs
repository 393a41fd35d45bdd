use std::time::Duration;

use crate::DEFAULT_TIMEOUT;

/// Default upper bound on handler invocations running at the same time.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 64;

/// Default maximum size of a single frame on the wire.
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub bind_address: String,

    /// Budget a client gives each call; also sent to the server as the
    /// dispatch deadline.
    pub request_timeout: Duration,

    pub max_concurrent_requests: usize,

    pub max_frame_length: usize,
}

impl RpcConfig {
    pub fn new(bind_address: impl Into<String>) -> Self {
        Self {
            bind_address: bind_address.into(),
            request_timeout: DEFAULT_TIMEOUT,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_concurrent_requests(mut self, limit: usize) -> Self {
        self.max_concurrent_requests = limit;
        self
    }

    pub fn with_max_frame_length(mut self, length: usize) -> Self {
        self.max_frame_length = length;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = RpcConfig::new("127.0.0.1:0")
            .with_request_timeout(Duration::from_millis(250))
            .with_max_concurrent_requests(4)
            .with_max_frame_length(4096);

        assert_eq!(config.bind_address, "127.0.0.1:0");
        assert_eq!(config.request_timeout, Duration::from_millis(250));
        assert_eq!(config.max_concurrent_requests, 4);
        assert_eq!(config.max_frame_length, 4096);
    }

    #[test]
    fn new_uses_library_defaults() {
        let config = RpcConfig::new("0.0.0.0:15000");
        assert_eq!(config.request_timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.max_concurrent_requests, DEFAULT_MAX_CONCURRENT_REQUESTS);
        assert_eq!(config.max_frame_length, DEFAULT_MAX_FRAME_LENGTH);
    }
}
