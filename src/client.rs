use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use bytes::Bytes;
use futures_util::{
    stream::{SplitSink, SplitStream},
    StreamExt,
};
use tokio::{
    net::TcpStream,
    sync::{oneshot, Mutex},
    task::JoinHandle,
};
use tracing::debug;

use crate::{
    config::RpcConfig,
    connection::{decode, frame, send_envelope, FramedConnection},
    errors::RpcError,
    request::RpcRequest,
    response::RpcResponse,
};

type Waiter = oneshot::Sender<Result<Vec<u8>, RpcError>>;

#[derive(Default)]
struct PendingCalls {
    closed: bool,
    waiters: HashMap<u64, Waiter>,
}

// RPC Client: many calls share one connection, matched by request id.
pub struct RpcClient {
    writer: Arc<Mutex<SplitSink<FramedConnection, Bytes>>>,
    pending: Arc<Mutex<PendingCalls>>,
    config: RpcConfig,
    pub next_id: Arc<AtomicU64>,
    reader: JoinHandle<()>,
}

impl RpcClient {
    pub async fn connect(addr: SocketAddr, config: RpcConfig) -> Result<Self, RpcError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| RpcError::ConnectionError(format!("{addr}: {e}")))?;
        stream.set_nodelay(true)?;

        let (writer, frames) = frame(stream, config.max_frame_length).split();
        let pending = Arc::new(Mutex::new(PendingCalls::default()));
        let reader = tokio::spawn(Self::receive_loop(frames, pending.clone()));

        Ok(Self {
            writer: Arc::new(Mutex::new(writer)),
            pending,
            config,
            next_id: Arc::new(AtomicU64::new(1)),
            reader,
        })
    }

    pub async fn call(&self, method: &str, params: Vec<u8>) -> Result<Vec<u8>, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let timeout = self.config.request_timeout;
        let request = RpcRequest::new(id, method.to_string(), params)
            .with_timeout_ms(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            if pending.closed {
                return Err(RpcError::ConnectionError("Connection closed".into()));
            }
            pending.waiters.insert(id, tx);
        }

        let sent = {
            let mut writer = self.writer.lock().await;
            send_envelope(&mut *writer, &request).await
        };
        if let Err(e) = sent {
            self.pending.lock().await.waiters.remove(&id);
            return Err(RpcError::ConnectionError(e.to_string()));
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(RpcError::ConnectionError(
                "Connection closed before response".into(),
            )),
            Err(_) => {
                self.pending.lock().await.waiters.remove(&id);
                Err(RpcError::Timeout)
            }
        }
    }

    async fn receive_loop(
        mut frames: SplitStream<FramedConnection>,
        pending: Arc<Mutex<PendingCalls>>,
    ) {
        while let Some(next) = frames.next().await {
            let data = match next {
                Ok(data) => data,
                Err(e) => {
                    debug!(error = %e, "client receive error");
                    break;
                }
            };

            let response: RpcResponse = match decode(&data) {
                Ok(response) => response,
                Err(e) => {
                    debug!(error = %e, "dropping undecodable response frame");
                    continue;
                }
            };

            let waiter = pending.lock().await.waiters.remove(&response.id());
            match waiter {
                Some(tx) => {
                    let _ = tx.send(response.into_result());
                }
                None => debug!(id = response.id(), "response for unknown or expired call"),
            }
        }

        let mut pending = pending.lock().await;
        pending.closed = true;
        for (_, tx) in pending.waiters.drain() {
            let _ = tx.send(Err(RpcError::ConnectionError("Connection closed".into())));
        }
    }
}

impl Drop for RpcClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
