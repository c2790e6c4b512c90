//! Input validation for API requests.

use super::ApiError;

/// Validate an email address. Intentionally loose: non-empty, exactly
/// one '@' with text on both sides, no whitespace.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ApiError::validation("Email must not be empty"));
    }

    if email.chars().any(char::is_whitespace) {
        return Err(ApiError::validation("Email must not contain whitespace"));
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ApiError::validation("Email address is not valid"));
    }

    Ok(())
}

/// Validate a display name: non-empty, at most 100 characters.
pub fn validate_name(name: &str) -> Result<(), ApiError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ApiError::validation("Name must not be empty"));
    }

    if name.chars().count() > 100 {
        return Err(ApiError::validation("Name must be 100 characters or less"));
    }

    Ok(())
}

/// Validate a password. Only emptiness is rejected; length and
/// composition policy are left to the client.
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.is_empty() {
        return Err(ApiError::validation("Password must not be empty"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("alice.smith@example.co.uk").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("   ").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@missing-local").is_err());
        assert!(validate_email("missing-domain@").is_err());
        assert!(validate_email("two@@ats.com").is_err());
        assert!(validate_email("has space@x.com").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Alice").is_ok());
        assert!(validate_name("J").is_ok());

        assert!(validate_name("").is_err());
        assert!(validate_name("  ").is_err());
        assert!(validate_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_password() {
        // Short passwords are accepted on purpose
        assert!(validate_password("secret1").is_ok());
        assert!(validate_password("a").is_ok());

        assert!(validate_password("").is_err());
    }
}
