use rand::Rng;

/// Generate a fresh storage key: `<prefix>/<12 hex chars>_<sanitized name>`.
///
/// The random component makes keys unique per upload, so a re-submitted
/// file never overwrites an earlier blob still referenced elsewhere.
pub fn new_key(prefix: &str, file_name: &str) -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 6] = rng.random();
    let name = sanitize(file_name);
    format!("{prefix}/{}_{name}", hex::encode(bytes))
}

fn sanitize(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('_').is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique_and_prefixed() {
        let a = new_key("innovations", "photo.png");
        let b = new_key("innovations", "photo.png");
        assert_ne!(a, b);
        assert!(a.starts_with("innovations/"));
        assert!(a.ends_with("_photo.png"));
    }

    #[test]
    fn sanitizes_awkward_file_names() {
        let key = new_key("news", "weird name?/evil.jpg");
        assert!(!key.contains(' '));
        assert!(!key.contains('?'));
        // slash in the original name must not create extra path segments
        assert_eq!(key.matches('/').count(), 1);
        assert!(super::super::validate_key(&key).is_ok());
    }

    #[test]
    fn empty_file_name_gets_a_placeholder() {
        let key = new_key("banners", "");
        assert!(key.ends_with("_file"));
    }
}
