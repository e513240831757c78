// Port Layer - Interfaces for external dependencies

pub mod command_runner;
pub mod id_provider; // For deterministic testing
pub mod time_provider;
pub mod tool_probe;

// Re-exports
pub use command_runner::{CommandOutput, CommandRequest, CommandRunner, ExecutionError};
pub use id_provider::IdProvider;
pub use time_provider::TimeProvider;
pub use tool_probe::ToolProbe;
