use std::{
    collections::HashMap,
    future::Future,
    net::SocketAddr,
    panic::AssertUnwindSafe,
    pin::Pin,
    sync::Arc,
    time::Duration,
};

use futures_util::{FutureExt, StreamExt};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::{mpsc, RwLock, Semaphore},
    time::Instant,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    config::RpcConfig,
    connection::{decode, frame, send_envelope},
    errors::RpcError,
    handler::{AsyncHandlerFn, CallContext},
    request::RpcRequest,
    response::RpcResponse,
};

type HandlerMap = Arc<RwLock<HashMap<String, AsyncHandlerFn>>>;

#[derive(Clone)]
pub struct RpcServer {
    pub handlers: HandlerMap,

    pub socket_addr: Option<SocketAddr>,

    pub config: RpcConfig,

    // Bounds how many handlers run at once; excess calls queue here.
    limiter: Arc<Semaphore>,
}

impl RpcServer {
    pub fn new(config: RpcConfig) -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
            socket_addr: None,
            limiter: Arc::new(Semaphore::new(config.max_concurrent_requests.max(1))),
            config,
        }
    }

    pub async fn register<F, Fut>(&self, method: &str, handler: F)
    where
        F: Fn(Vec<u8>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<u8>, RpcError>> + Send + 'static,
    {
        let mut handlers = self.handlers.write().await;
        handlers.insert(
            method.to_string(),
            Box::new(move |params: Vec<u8>| {
                Box::pin(handler(params)) as Pin<Box<dyn Future<Output = _> + Send>>
            }),
        );
    }

    pub async fn register_typed<Req, Resp, F, Fut>(&self, method: &str, handler: F)
    where
        Req: serde::de::DeserializeOwned + Send + 'static,
        Resp: serde::Serialize + Send + 'static,
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Resp, RpcError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        self.register(method, move |params: Vec<u8>| {
            let handler = handler.clone();
            async move {
                let request: Req = bincode::deserialize(&params)?;
                let response = handler(request).await?;
                Ok(bincode::serialize(&response)?)
            }
        })
        .await;
    }

    pub async fn bind(&mut self) -> Result<TcpListener, RpcError> {
        let listener = TcpListener::bind(self.config.bind_address.as_str())
            .await
            .map_err(|e| {
                RpcError::ConfigError(format!(
                    "Failed to bind {}: {e}",
                    self.config.bind_address
                ))
            })?;

        let local_addr = listener.local_addr()?;
        self.socket_addr = Some(local_addr);
        info!(%local_addr, "RPC server listening");
        Ok(listener)
    }

    /// Serves connections until the listener fails.
    pub async fn start(&mut self, listener: TcpListener) -> Result<(), RpcError> {
        self.start_with_shutdown(listener, std::future::pending())
            .await
    }

    /// Serves connections until `shutdown` resolves. The listener is dropped on
    /// return and calls that have not been dispatched yet are cancelled.
    pub async fn start_with_shutdown<F>(
        &mut self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), RpcError>
    where
        F: Future<Output = ()>,
    {
        let root = CancellationToken::new();
        tokio::pin!(shutdown);

        let result = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("RPC server shutting down");
                    break Ok(());
                }
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            debug!(%peer, "accepted connection");
                            tokio::spawn(Self::handle_connection(
                                self.handlers.clone(),
                                self.limiter.clone(),
                                self.config.max_frame_length,
                                stream,
                                root.child_token(),
                            ));
                        }
                        Err(e) => break Err(RpcError::IoError(e)),
                    }
                }
            }
        };

        root.cancel();
        result
    }

    async fn handle_connection(
        handlers: HandlerMap,
        limiter: Arc<Semaphore>,
        max_frame_length: usize,
        stream: TcpStream,
        token: CancellationToken,
    ) {
        let (mut sink, mut frames) = frame(stream, max_frame_length).split();
        let (tx, mut rx) = mpsc::channel::<RpcResponse>(64);

        // Runs until every in-flight dispatch has sent its response. A failed
        // write means the caller is gone, so calls still queued are cancelled.
        let writer_token = token.clone();
        let writer = tokio::spawn(async move {
            while let Some(response) = rx.recv().await {
                if let Err(e) = send_envelope(&mut sink, &response).await {
                    debug!(error = %e, "failed to write response, closing writer");
                    writer_token.cancel();
                    break;
                }
            }
        });

        loop {
            let next = tokio::select! {
                _ = token.cancelled() => break,
                next = frames.next() => next,
            };

            let data = match next {
                Some(Ok(data)) => data,
                Some(Err(e)) => {
                    debug!(error = %e, "connection read error");
                    break;
                }
                None => {
                    debug!("connection closed by peer");
                    break;
                }
            };

            let arrived = Instant::now();
            let request: RpcRequest = match decode(&data) {
                Ok(request) => request,
                Err(e) => {
                    warn!(error = %e, "undecodable request frame, closing connection");
                    break;
                }
            };

            let deadline = request
                .timeout_ms()
                .map(|ms| arrived + Duration::from_millis(ms));
            let ctx = CallContext::new(deadline, token.clone());

            let handlers = handlers.clone();
            let limiter = limiter.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let response = Self::dispatch(handlers, limiter, request, ctx).await;
                let _ = tx.send(response).await;
            });
        }

        // End of input is not a cancellation: a half-closed peer still reads
        // the responses to what it already sent.
        drop(tx);
        let _ = writer.await;
    }

    pub(crate) async fn dispatch(
        handlers: HandlerMap,
        limiter: Arc<Semaphore>,
        request: RpcRequest,
        ctx: CallContext,
    ) -> RpcResponse {
        let id = request.id();

        let _permit = match limiter.acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return RpcResponse::from_result(id, Err(RpcError::Cancelled)),
        };

        if let Err(e) = ctx.check() {
            warn!(id, method = request.method(), error = %e, "call not dispatched");
            return RpcResponse::from_result(id, Err(e));
        }

        let call = {
            let handlers = handlers.read().await;
            match handlers.get(request.method()) {
                Some(handler) => handler(request.params().to_vec()),
                None => {
                    let method = request.method().to_string();
                    return RpcResponse::from_result(id, Err(RpcError::UnknownMethod(method)));
                }
            }
        };

        debug!(id, method = request.method(), "dispatching request");
        let result = match AssertUnwindSafe(call).catch_unwind().await {
            Ok(result) => result,
            Err(_) => Err(RpcError::InternalError(format!(
                "handler for {} panicked",
                request.method()
            ))),
        };

        RpcResponse::from_result(id, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RpcConfig {
        RpcConfig::new("127.0.0.1:0").with_max_concurrent_requests(2)
    }

    fn context() -> CallContext {
        CallContext::new(None, CancellationToken::new())
    }

    #[tokio::test]
    async fn register_inserts_handler_and_dispatch_invokes_it() {
        let server = RpcServer::new(config());
        server
            .register("upper", |params| async move {
                Ok(params.iter().map(|b| b.to_ascii_uppercase()).collect())
            })
            .await;

        let request = RpcRequest::new(3, "upper".into(), b"abc".to_vec());
        let response =
            RpcServer::dispatch(server.handlers.clone(), server.limiter.clone(), request, context())
                .await;

        assert_eq!(response.id(), 3);
        assert_eq!(response.result(), Some(&b"ABC".to_vec()));
    }

    #[tokio::test]
    async fn dispatch_reports_unknown_method() {
        let server = RpcServer::new(config());
        let request = RpcRequest::new(1, "missing".into(), vec![]);
        let response =
            RpcServer::dispatch(server.handlers.clone(), server.limiter.clone(), request, context())
                .await;

        assert_eq!(response.error(), Some(&"Unknown method: missing".to_string()));
    }

    #[tokio::test]
    async fn dispatch_skips_handler_when_context_cancelled() {
        let server = RpcServer::new(config());
        let called = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = called.clone();
        server
            .register("touch", move |_| {
                let flag = flag.clone();
                async move {
                    flag.store(true, std::sync::atomic::Ordering::SeqCst);
                    Ok(vec![])
                }
            })
            .await;

        let token = CancellationToken::new();
        token.cancel();
        let ctx = CallContext::new(None, token);
        let request = RpcRequest::new(9, "touch".into(), vec![]);
        let response =
            RpcServer::dispatch(server.handlers.clone(), server.limiter.clone(), request, ctx).await;

        assert_eq!(response.error(), Some(&"Call cancelled".to_string()));
        assert!(!called.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn dispatch_turns_handler_panic_into_error_response() {
        let server = RpcServer::new(config());
        server
            .register("explode", |_| async move {
                if true {
                    panic!("boom");
                }
                Ok(vec![])
            })
            .await;

        let request = RpcRequest::new(5, "explode".into(), vec![]);
        let response =
            RpcServer::dispatch(server.handlers.clone(), server.limiter.clone(), request, context())
                .await;

        assert!(response.result().is_none());
        assert_eq!(
            response.error(),
            Some(&"Internal error: handler for explode panicked".to_string())
        );
    }

    #[tokio::test]
    async fn register_typed_round_trips_through_bincode() {
        let server = RpcServer::new(config());
        server
            .register_typed("sum", |nums: Vec<i32>| async move {
                Ok::<i32, RpcError>(nums.iter().sum())
            })
            .await;

        let params = bincode::serialize(&vec![1, 2, 3]).unwrap();
        let request = RpcRequest::new(2, "sum".into(), params);
        let response =
            RpcServer::dispatch(server.handlers.clone(), server.limiter.clone(), request, context())
                .await;

        let total: i32 = bincode::deserialize(response.result().unwrap()).unwrap();
        assert_eq!(total, 6);
    }

    #[tokio::test]
    async fn bind_records_socket_addr() {
        let mut server = RpcServer::new(config());
        let listener = server.bind().await.unwrap();
        assert_eq!(server.socket_addr, Some(listener.local_addr().unwrap()));
    }
}
