// Action - a fire-and-forget command bound to a button

use serde::{Deserialize, Serialize};

use super::error::{DomainError, Result};
use super::name::validate_name;

/// Shell command dispatched when a widget button is pressed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpec {
    pub command: String,
}

impl ActionSpec {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        validate_name("action", name)?;
        if self.command.trim().is_empty() {
            return Err(DomainError::EmptyCommand {
                kind: "action",
                name: name.to_string(),
            });
        }
        Ok(())
    }
}
