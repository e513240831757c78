// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid {kind} name '{name}': {reason}")]
    InvalidName {
        kind: &'static str,
        name: String,
        reason: String,
    },

    #[error("Invalid interval for poll '{poll}': {interval_ms}ms (must be greater than zero)")]
    InvalidInterval { poll: String, interval_ms: u64 },

    #[error("Empty {kind} command for '{name}'")]
    EmptyCommand { kind: &'static str, name: String },

    #[error("Duplicate {kind} name: {name}")]
    Duplicate { kind: &'static str, name: String },

    #[error("Widget '{widget}' references unknown {kind} '{name}'")]
    DanglingReference {
        widget: String,
        kind: &'static str,
        name: String,
    },
}

pub type Result<T> = std::result::Result<T, DomainError>;
