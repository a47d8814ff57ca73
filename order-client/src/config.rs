//! Client configuration

/// Base address that selects the in-process order service
pub const MEMORY_BASE_URL: &str = "memory:";

/// Client configuration for connecting to the order service
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Order service base URL (e.g., "http://localhost:8000")
    pub base_url: String,

    /// Bearer token, if the order service wants one
    pub token: Option<String>,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout_ms: 10_000,
        }
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Whether this configuration points at the in-process service
    pub fn is_memory(&self) -> bool {
        self.base_url.trim() == MEMORY_BASE_URL
    }

    /// Create an HTTP order service from this configuration
    pub fn build_http_service(&self) -> crate::ClientResult<crate::HttpOrderService> {
        crate::HttpOrderService::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8000")
    }
}
