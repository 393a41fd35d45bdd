//! Remote calculator service: wire contract, engine and typed bindings.
//!
//! A single method, [`CALCULATE_METHOD`], carries a [`CalculationRequest`] to
//! the server and brings back a [`CalculationResponse`]. Engine failures
//! travel inside the response; only transport failures surface as
//! [`RpcError`](crate::RpcError) on the client.

pub mod client;
pub mod engine;
pub mod server;
pub mod types;

pub use client::CalculatorClient;
pub use engine::calculate;
pub use server::{CalculatorHandler, CalculatorServer, CalculatorService};
pub use types::{CalcError, CalculationRequest, CalculationResponse, Operation, MAX_NUMBERS};

/// Method name the service is registered under.
pub const CALCULATE_METHOD: &str = "Calculator.calculate";
