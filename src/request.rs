use serde::{Deserialize, Serialize};

// RPC Request envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct RpcRequest {
    id: u64,
    method: String,
    params: Vec<u8>,
    /// Remaining time budget of the caller when the request was sent.
    timeout_ms: Option<u64>,
}

impl RpcRequest {
    pub fn new(id: u64, method: String, params: Vec<u8>) -> Self {
        Self {
            id,
            method,
            params,
            timeout_ms: None,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> &[u8] {
        &self.params
    }

    pub fn timeout_ms(&self) -> Option<u64> {
        self.timeout_ms
    }
}
