//! A small RPC stack over TCP plus the remote calculator service built on it.
//!
//! The transport half (`RpcServer`, `RpcClient`) moves bincode envelopes in
//! length-delimited frames and routes them by method name. The
//! [`calculator`] module holds the wire contract, the calculation engine and
//! the typed service bindings.

use std::time::Duration;

mod client;
mod config;
mod connection;
mod errors;
mod handler;
mod request;
mod response;
mod server;

pub mod calculator;
pub mod cli;

pub use client::RpcClient;
pub use config::{RpcConfig, DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_MAX_FRAME_LENGTH};
pub use errors::RpcError;
pub use handler::CallContext;
pub use request::RpcRequest;
pub use response::RpcResponse;
pub use server::RpcServer;

pub mod runtime {
    //! Helpers for configuring Tokio runtimes.
    use std::{env, thread};

    /// Environment variable that controls the number of server worker threads.
    pub const SERVER_THREADS_ENV: &str = "CALCNET_SERVER_THREADS";

    /// Returns the worker thread count derived from [`SERVER_THREADS_ENV`],
    /// falling back to the number of available CPU threads.
    pub fn server_worker_threads() -> usize {
        threads_from_env(SERVER_THREADS_ENV).unwrap_or_else(default_worker_threads)
    }

    /// Parses an environment variable as a positive worker-thread count.
    pub fn threads_from_env(key: &str) -> Option<usize> {
        let raw = env::var(key).ok()?;
        parse_threads(&raw)
    }

    fn default_worker_threads() -> usize {
        thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    fn parse_threads(raw: &str) -> Option<usize> {
        let value = raw.trim().parse::<usize>().ok()?;
        (value > 0).then_some(value)
    }

}

/// Default address of the calculator service.
pub const DEFAULT_ADDR: &str = "127.0.0.1:15000";

#[cfg(not(test))]
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[cfg(test)]
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
