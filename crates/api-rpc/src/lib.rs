//! JSON-RPC API Layer
//!
//! Read access to a mounted dashboard and button dispatch over JSON-RPC 2.0.

pub mod error;
pub mod handler;
pub mod server;
pub mod throttle;
pub mod types;

pub use jsonrpsee::server::ServerHandle;
pub use server::{RpcServer, RpcServerConfig};
