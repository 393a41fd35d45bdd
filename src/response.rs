use serde::{Deserialize, Serialize};

use crate::errors::RpcError;

// RPC Response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct RpcResponse {
    id: u64,
    result: Option<Vec<u8>>,
    error: Option<String>,
}

impl RpcResponse {
    pub fn new(id: u64, result: Option<Vec<u8>>, error: Option<String>) -> Self {
        Self { id, result, error }
    }

    pub fn from_result(id: u64, result: Result<Vec<u8>, RpcError>) -> Self {
        match result {
            Ok(data) => Self::new(id, Some(data), None),
            Err(e) => Self::new(id, None, Some(e.to_string())),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn result(&self) -> Option<&Vec<u8>> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&String> {
        self.error.as_ref()
    }

    /// Collapses the envelope back into the handler outcome.
    pub fn into_result(self) -> Result<Vec<u8>, RpcError> {
        match (self.result, self.error) {
            (Some(data), None) => Ok(data),
            (None, Some(err_msg)) => Err(RpcError::RemoteError(err_msg)),
            _ => Err(RpcError::InternalError("Invalid response".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_result_success() {
        let resp = RpcResponse::from_result(42, Ok(b"ok".to_vec()));
        assert_eq!(resp.id(), 42);
        assert_eq!(resp.result(), Some(&b"ok".to_vec()));
        assert!(resp.error().is_none());
    }

    #[test]
    fn from_result_error() {
        let resp = RpcResponse::from_result(7, Err(RpcError::UnknownMethod("nope".into())));
        assert_eq!(resp.id(), 7);
        assert!(resp.result().is_none());
        assert_eq!(resp.error(), Some(&"Unknown method: nope".to_string()));
    }

    #[test]
    fn into_result_rejects_envelope_with_both_fields() {
        let resp = RpcResponse::new(1, Some(vec![1]), Some("boom".into()));
        assert!(matches!(resp.into_result(), Err(RpcError::InternalError(_))));
    }

    #[test]
    fn into_result_maps_error_to_remote_error() {
        let resp = RpcResponse::new(1, None, Some("boom".into()));
        match resp.into_result() {
            Err(RpcError::RemoteError(msg)) => assert_eq!(msg, "boom"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
