use std::{future::Future, net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use tokio::net::TcpListener;

use super::{engine, CalculationRequest, CalculationResponse, CALCULATE_METHOD};
use crate::{RpcConfig, RpcError, RpcServer};

/// Handler trait that users implement for the service.
#[async_trait]
pub trait CalculatorHandler: Send + Sync + 'static {
    async fn calculate(&self, request: CalculationRequest) -> CalculationResponse;
}

/// Handler backed by the in-process engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct CalculatorService;

#[async_trait]
impl CalculatorHandler for CalculatorService {
    async fn calculate(&self, request: CalculationRequest) -> CalculationResponse {
        engine::calculate(&request)
    }
}

/// Server that registers the handler and routes calls to it.
pub struct CalculatorServer<H: CalculatorHandler> {
    handler: Arc<H>,
    rpc_server: RpcServer,
}

impl<H: CalculatorHandler> CalculatorServer<H> {
    pub fn new(handler: H, config: RpcConfig) -> Self {
        Self {
            handler: Arc::new(handler),
            rpc_server: RpcServer::new(config),
        }
    }

    /// Registers all service methods with the RPC server.
    pub async fn register_all(&self) {
        let handler = self.handler.clone();
        self.rpc_server
            .register_typed(CALCULATE_METHOD, move |request: CalculationRequest| {
                let handler = handler.clone();
                async move { Ok::<_, RpcError>(handler.calculate(request).await) }
            })
            .await;
    }

    /// Registers the service and binds the listening socket.
    pub async fn bind(&mut self) -> Result<TcpListener, RpcError> {
        self.register_all().await;
        self.rpc_server.bind().await
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.rpc_server.socket_addr
    }

    /// Serves on an already bound listener until `shutdown` resolves.
    pub async fn run<F>(mut self, listener: TcpListener, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()>,
    {
        self.rpc_server.start_with_shutdown(listener, shutdown).await
    }

    /// Starts the server and begins accepting connections.
    pub async fn serve(self) -> Result<(), RpcError> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    pub async fn serve_with_shutdown<F>(mut self, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()>,
    {
        let listener = self.bind().await?;
        self.run(listener, shutdown).await
    }
}
