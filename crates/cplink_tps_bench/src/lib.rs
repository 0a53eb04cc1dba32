//! Throughput benchmark for CP-link verifier contracts.
//!
//! For each batch size a verifier is deployed, one `verify` transaction per ephemeral client is
//! pre-signed, and the time until the node acknowledges all of them is measured.

pub mod args;
pub mod bench;
pub mod broadcaster;
pub mod commands;
pub mod config;
pub mod contract;
pub mod errors;
pub mod rpc;
pub mod tracing_utils;
pub mod tx_factory;

#[cfg(any(feature = "testing", test))]
pub mod test_utils;
