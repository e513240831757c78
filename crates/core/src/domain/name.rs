// Identifier validation shared by widgets, polls and actions

use super::error::{DomainError, Result};

/// Maximum identifier length (widget, poll and action names)
pub const MAX_NAME_LEN: usize = 64;

/// Validate a widget/poll/action identifier.
///
/// Names are used as RPC arguments and log fields, so they are restricted to
/// lowercase ASCII alphanumerics, `_` and `-`.
pub fn validate_name(kind: &'static str, name: &str) -> Result<()> {
    let invalid = |reason: &str| DomainError::InvalidName {
        kind,
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name cannot be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(invalid("name too long (max 64 characters)"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return Err(invalid(
            "only lowercase alphanumeric characters, '_' and '-' are allowed",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_snake_and_kebab_names() {
        assert!(validate_name("poll", "play_pause").is_ok());
        assert!(validate_name("widget", "system-stats").is_ok());
        assert!(validate_name("action", "up10").is_ok());
    }

    #[test]
    fn test_rejects_empty_name() {
        let err = validate_name("poll", "").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_rejects_long_name() {
        let err = validate_name("poll", &"a".repeat(65)).unwrap_err();
        assert!(err.to_string().contains("too long"));
    }

    #[test]
    fn test_rejects_uppercase_and_symbols() {
        assert!(validate_name("widget", "Volume").is_err());
        let err = validate_name("action", "vol@up").unwrap_err();
        assert!(err.to_string().contains("alphanumeric"));
    }
}
