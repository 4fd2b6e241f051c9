//! Input validation for outgoing messages and login fields

/// Maximum characters accepted in the compose line
pub const MAX_MESSAGE_CHARS: usize = 280;
/// Maximum characters in a username
pub const MAX_USERNAME_CHARS: usize = 32;

/// Validates a message before it is handed to the backend
pub fn validate_message(msg: &str) -> Result<(), String> {
    if msg.trim().is_empty() {
        return Err("Message cannot be empty".to_string());
    }

    if msg.chars().count() > MAX_MESSAGE_CHARS {
        return Err(format!(
            "Message too long (max {} characters)",
            MAX_MESSAGE_CHARS
        ));
    }

    // The compose line is single-line; the backend expects the same
    if msg.contains('\r') || msg.contains('\n') {
        return Err("Message cannot contain newline characters".to_string());
    }

    Ok(())
}

/// Sanitizes a message by removing or replacing invalid characters
pub fn sanitize_message(msg: &str) -> String {
    msg.chars()
        .filter(|&c| c != '\r' && c != '\n' && c != '\0')
        .take(MAX_MESSAGE_CHARS)
        .collect()
}

/// Validates a login username
pub fn validate_username(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Username cannot be empty".to_string());
    }

    if name.chars().count() > MAX_USERNAME_CHARS {
        return Err(format!(
            "Username too long (max {} characters)",
            MAX_USERNAME_CHARS
        ));
    }

    if name.contains(|c: char| c.is_whitespace() || c.is_control()) {
        return Err("Username cannot contain spaces or control characters".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_message() {
        assert!(validate_message("Hello, world!").is_ok());
        assert!(validate_message("Test message with 日本語").is_ok());
        assert!(validate_message(&"語".repeat(MAX_MESSAGE_CHARS)).is_ok());

        assert!(validate_message("").is_err());
        assert!(validate_message("   ").is_err());
        assert!(validate_message("Line1\nLine2").is_err());
        assert!(validate_message("Line1\rLine2").is_err());
        assert!(validate_message(&"x".repeat(MAX_MESSAGE_CHARS + 1)).is_err());
    }

    #[test]
    fn test_sanitize_message() {
        assert_eq!(sanitize_message("Hello, world!"), "Hello, world!");
        assert_eq!(sanitize_message("Line1\nLine2"), "Line1Line2");
        assert_eq!(sanitize_message("CR\rLF"), "CRLF");
        assert_eq!(sanitize_message(&"x".repeat(500)), "x".repeat(MAX_MESSAGE_CHARS));
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("Bob_123").is_ok());
        assert!(validate_username("ユーザー").is_ok());

        assert!(validate_username("").is_err());
        assert!(validate_username("two words").is_err());
        assert!(validate_username("tab\there").is_err());
        assert!(validate_username(&"a".repeat(MAX_USERNAME_CHARS + 1)).is_err());
    }
}
