//! Validation trait and helpers shared by configuration domains.

use crate::error::{ConfigError, ConfigResult};

/// Trait for configuration domains that can validate themselves.
pub trait Validatable {
    /// Validate the configuration, returning the first problem found.
    fn validate(&self) -> ConfigResult<()>;

    /// Name of this configuration domain for error messages.
    fn domain_name(&self) -> &'static str;

    /// Build a domain-scoped validation error.
    fn validation_error(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::DomainError {
            domain: self.domain_name().to_string(),
            message: message.into(),
        }
    }
}

/// Validates that a directory name is safe to place under the I/O base path.
/// It must be non-empty, lowercase alphanumeric with interior hyphens, at
/// most 64 characters, and free of URL-encoded sequences.
pub fn validate_io_dir_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("I/O directory name must not be empty".to_string());
    }

    if name.contains('%') {
        return Err("I/O directory name cannot contain URL-encoded sequences".to_string());
    }

    for (i, c) in name.chars().enumerate() {
        let ok = c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-';
        if !ok {
            return Err(format!(
                "I/O directory name must be lowercase alphanumeric with hyphens only, got {c:?} at position {i}"
            ));
        }
    }

    if name.starts_with('-') || name.ends_with('-') {
        return Err("I/O directory name cannot start or end with hyphen".to_string());
    }

    if name.len() > 64 {
        return Err("I/O directory name too long (max 64 characters)".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_dir_name_accepts_safe_names() {
        for name in ["hotpod", "a", "a-b", "load-gen-3", "x0", &"a".repeat(64)] {
            assert!(validate_io_dir_name(name).is_ok(), "expected ok: {name}");
        }
    }

    #[test]
    fn io_dir_name_rejects_unsafe_names() {
        for name in [
            "",
            "-leading",
            "trailing-",
            "UPPER",
            "has space",
            "sl/ash",
            "dot.dot",
            "..",
            "enc%2e%2e",
            &"a".repeat(65),
        ] {
            assert!(validate_io_dir_name(name).is_err(), "expected err: {name}");
        }
    }
}
