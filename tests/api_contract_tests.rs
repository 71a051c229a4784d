/// Tests for API-level conventions
///
/// Note: These are unit tests that verify the logic is correct.
/// Integration tests would require a running server.

#[cfg(test)]
mod tests {
    // Test reference code generation
    #[test]
    fn test_reference_code_generation() {
        use rand::Rng;
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
        let mut rng = rand::thread_rng();

        let booking_id: i64 = 42;
        let suffix: String = (0..6)
            .map(|_| {
                let idx = rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect();
        let code = format!("NA{}{}", suffix, booking_id);

        assert!(code.starts_with("NA"));
        assert_eq!(code.len(), 2 + 6 + booking_id.to_string().len());
        assert!(code[2..8]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert!(code.ends_with("42"));
    }

    #[test]
    fn test_multiple_reference_suffixes_are_distinct_per_id() {
        use rand::Rng;
        use std::collections::HashSet;
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

        // Codes embed the row id, so uniqueness holds even on suffix collision
        let mut codes = HashSet::new();
        for id in 0..100i64 {
            let mut rng = rand::thread_rng();
            let suffix: String = (0..6)
                .map(|_| {
                    let idx = rng.gen_range(0..CHARSET.len());
                    CHARSET[idx] as char
                })
                .collect();
            codes.insert(format!("NA{}{}", suffix, id));
        }

        assert_eq!(codes.len(), 100);
    }

    #[test]
    fn test_authorization_header_parsing() {
        let auth_header = "Bearer abc123token";
        let token = auth_header.strip_prefix("Bearer ");
        assert_eq!(token, Some("abc123token"));

        let invalid_header = "abc123token";
        let token = invalid_header.strip_prefix("Bearer ");
        assert_eq!(token, None);
    }

    #[test]
    fn test_default_week_shape() {
        // Mon-Sat open 10:00-19:00, Sunday closed
        let week: Vec<(i64, bool)> = (1..=7).map(|day| (day, day == 7)).collect();

        assert_eq!(week.len(), 7);
        assert_eq!(week.iter().filter(|(_, closed)| *closed).count(), 1);
        assert_eq!(week[6], (7, true));
    }
}
