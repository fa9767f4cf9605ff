//! Providers Module - External Data Sources
//!
//! The chain log adapter interface and its JSON-RPC implementation.

pub mod client;
pub mod rpc;

pub use client::*;
pub use rpc::*;
