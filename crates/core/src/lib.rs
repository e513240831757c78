// dashpanel Core - Domain Logic, Ports & Polling Primitives
// NO infrastructure dependencies: process spawning lives in infra-system

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
