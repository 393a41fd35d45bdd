use std::net::SocketAddr;

use super::{CalculationRequest, CalculationResponse, CALCULATE_METHOD};
use crate::{RpcClient, RpcConfig, RpcError};

/// Client for calling the calculator service.
pub struct CalculatorClient {
    inner: RpcClient,
}

impl CalculatorClient {
    /// Connects to the service at the given address.
    pub async fn connect(addr: SocketAddr, config: RpcConfig) -> Result<Self, RpcError> {
        let inner = RpcClient::connect(addr, config).await?;
        Ok(Self { inner })
    }

    /// `Ok` means the call went through, even if the engine rejected the
    /// request; `Err` means the call itself failed.
    pub async fn calculate(
        &self,
        request: CalculationRequest,
    ) -> Result<CalculationResponse, RpcError> {
        let params = bincode::serialize(&request)?;
        let response_data = self.inner.call(CALCULATE_METHOD, params).await?;
        let response: CalculationResponse = bincode::deserialize(&response_data)?;

        if !response.is_well_formed() {
            return Err(RpcError::InternalError(
                "malformed calculation response".into(),
            ));
        }
        Ok(response)
    }
}
