//! SDK Error Types

use thiserror::Error;

/// SDK Result type
pub type Result<T> = std::result::Result<T, SdkError>;

/// Stable error codes returned by the daemon
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const THROTTLED: i32 = 4003;
}

/// SDK Error
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("RPC error ({code}): {message}")]
    Rpc { code: i32, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl SdkError {
    /// Unknown widget or action
    pub fn is_not_found(&self) -> bool {
        matches!(self, SdkError::Rpc { code, .. } if *code == code::NOT_FOUND)
    }

    /// Dispatch rate limit hit; retry later
    pub fn is_throttled(&self) -> bool {
        matches!(self, SdkError::Rpc { code, .. } if *code == code::THROTTLED)
    }
}

impl From<jsonrpsee::core::ClientError> for SdkError {
    fn from(e: jsonrpsee::core::ClientError) -> Self {
        match e {
            jsonrpsee::core::ClientError::Call(call_err) => SdkError::Rpc {
                code: call_err.code(),
                message: call_err.message().to_string(),
            },
            jsonrpsee::core::ClientError::Transport(e) => SdkError::Transport(e.to_string()),
            jsonrpsee::core::ClientError::RestartNeeded(_) => {
                SdkError::Connection("Connection restart needed".to_string())
            }
            jsonrpsee::core::ClientError::ParseError(e) => SdkError::Serialization(e),
            _ => SdkError::Other(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let not_found = SdkError::Rpc {
            code: code::NOT_FOUND,
            message: "Widget weather not found".to_string(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_throttled());
        assert_eq!(
            not_found.to_string(),
            "RPC error (4001): Widget weather not found"
        );

        let throttled = SdkError::Rpc {
            code: code::THROTTLED,
            message: "slow down".to_string(),
        };
        assert!(throttled.is_throttled());
        assert!(!SdkError::Transport("refused".to_string()).is_not_found());
    }
}
