/// Validate a person or organisation name: 2-100 chars.
pub fn validate_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Some("Name is required".to_string());
    }
    if trimmed.len() < 2 {
        return Some("Name must be at least 2 characters".to_string());
    }
    if trimmed.len() > 100 {
        return Some("Name must be at most 100 characters".to_string());
    }
    None
}

/// Validate an email: must contain '@' and '.', max 254 chars.
pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("Email is required".to_string());
    }
    if trimmed.len() > 254 {
        return Some("Email must be at most 254 characters".to_string());
    }
    if !trimmed.contains('@') || !trimmed.contains('.') {
        return Some("Email must be a valid address (contain '@' and '.')".to_string());
    }
    None
}

/// Validate a password: min 8 chars on create.
pub fn validate_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.len() < 8 {
        return Some("Password must be at least 8 characters".to_string());
    }
    None
}

/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.len() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate an optional text field with a max length (empty is OK).
pub fn validate_optional(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if !trimmed.is_empty() && trimmed.len() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate an optional URL field: empty is OK, otherwise http(s) and <= 500 chars.
pub fn validate_optional_url(value: &str, field_name: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.len() > 500 {
        return Some(format!("{field_name} must be at most 500 characters"));
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Some(format!("{field_name} must start with http:// or https://"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_bounds() {
        assert!(validate_name("").is_some());
        assert!(validate_name("A").is_some());
        assert!(validate_name("Balai Riset").is_none());
        assert!(validate_name(&"x".repeat(101)).is_some());
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("user@example.com").is_none());
        assert!(validate_email("not-an-email").is_some());
        assert!(validate_email("").is_some());
    }

    #[test]
    fn optional_url_accepts_empty_and_https() {
        assert!(validate_optional_url("", "Website").is_none());
        assert!(validate_optional_url("https://orbit.example", "Website").is_none());
        assert!(validate_optional_url("ftp://orbit.example", "Website").is_some());
    }

    #[test]
    fn required_respects_max_len() {
        assert!(validate_required("ok", "Overview", 10).is_none());
        assert!(validate_required("", "Overview", 10).is_some());
        assert!(validate_required(&"x".repeat(11), "Overview", 10).is_some());
    }
}
