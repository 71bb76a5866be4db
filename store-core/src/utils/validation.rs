//! Input validation helpers
//!
//! Centralized text length constants and validation functions. The store
//! accepts whatever JSON it is given, so length enforcement happens here,
//! at the command boundary.

// ── Text length limits ──────────────────────────────────────────────

/// Names: product names, first/last names, category labels
pub const MAX_NAME_LEN: usize = 200;

/// Product descriptions
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Review comments
pub const MAX_COMMENT_LEN: usize = 500;

/// Short identifiers: phone numbers, reference codes, payment references
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Secrets (before digesting)
pub const MAX_SECRET_LEN: usize = 128;

/// Address lines: street, city, zip, country
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-blank and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    if value.len() > max_len {
        return Err(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ));
    }
    Ok(())
}

/// Validate that a string which may be blank is within the length limit.
pub fn validate_optional_text(value: &str, field: &str, max_len: usize) -> Result<(), String> {
    if value.len() > max_len {
        return Err(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_rejects_blank_and_overlong() {
        assert!(validate_required_text("Line Follower", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(201), "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_optional_text_allows_blank() {
        assert!(validate_optional_text("", "comment", MAX_COMMENT_LEN).is_ok());
        assert!(validate_optional_text(&"x".repeat(501), "comment", MAX_COMMENT_LEN).is_err());
    }
}
