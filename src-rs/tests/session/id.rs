use crate::session::id::{
    generate_session_id, random_base36, validate_session_id, MIN_SESSION_ID_LEN,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_meets_runtime_minimum_length() {
        let id = generate_session_id();
        assert!(
            id.len() >= MIN_SESSION_ID_LEN,
            "id {:?} is only {} chars",
            id,
            id.len()
        );
    }

    #[test]
    fn generated_id_uses_runtime_safe_charset() {
        let id = generate_session_id();
        assert!(id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        validate_session_id(&id).expect("generated id validates");
    }

    #[test]
    fn generated_ids_are_distinct() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_ne!(a, b);
    }

    #[test]
    fn random_base36_covers_requested_entropy() {
        // 96 bits need two u64 draws, 13 digits each
        assert_eq!(random_base36(96).len(), 26);
        assert_eq!(random_base36(64).len(), 13);
    }

    #[test]
    fn validate_rejects_short_ids() {
        assert!(validate_session_id("short").is_err());
    }

    #[test]
    fn validate_rejects_bad_characters() {
        let id = format!("{}!", "a".repeat(MIN_SESSION_ID_LEN));
        assert!(validate_session_id(&id).is_err());
    }

    #[test]
    fn validate_rejects_overlong_ids() {
        assert!(validate_session_id(&"a".repeat(129)).is_err());
    }
}
