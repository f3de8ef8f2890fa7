//! Phone number normalization to E.164.
//!
//! [`normalize`] is a best-effort heuristic and never fails. Callers that need
//! a guarantee check the result with [`is_valid_e164`].

use std::sync::OnceLock;

use regex::Regex;

fn e164_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+[1-9][0-9]{1,14}$").expect("valid E.164 pattern"))
}

/// Convert user-entered phone text to E.164.
///
/// Keeps digits and a leading `+`. Ten digits are assumed North American and
/// get `+1`; eleven digits starting with `1` get `+`; anything else is
/// prefixed with `+` as-is.
pub fn normalize(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len() + 2);
    for c in raw.chars() {
        if c.is_ascii_digit() || (c == '+' && cleaned.is_empty()) {
            cleaned.push(c);
        }
    }

    if cleaned.starts_with('+') {
        return cleaned;
    }

    match cleaned.len() {
        10 => format!("+1{}", cleaned),
        11 if cleaned.starts_with('1') => format!("+{}", cleaned),
        _ => format!("+{}", cleaned),
    }
}

/// Check a string against `^\+[1-9][0-9]{1,14}$`.
pub fn is_valid_e164(phone: &str) -> bool {
    e164_pattern().is_match(phone)
}

/// Whether an E.164 number is in the North American numbering plan.
pub fn is_north_american(phone: &str) -> bool {
    phone.len() == 12 && phone.starts_with("+1") && is_valid_e164(phone)
}

/// Shorten a number for log output, keeping the last four digits.
pub fn redact(phone: &str) -> String {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if digits <= 4 {
        return phone.to_string();
    }
    let tail: String = phone.chars().skip(phone.chars().count() - 4).collect();
    format!("***{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_digits_get_country_code() {
        assert_eq!(normalize("5551234567"), "+15551234567");
        assert_eq!(normalize("(555) 123-4567"), "+15551234567");
        assert_eq!(normalize("555.123.4567"), "+15551234567");
    }

    #[test]
    fn test_eleven_digits_with_leading_one() {
        assert_eq!(normalize("15551234567"), "+15551234567");
        assert_eq!(normalize("1-555-123-4567"), "+15551234567");
    }

    #[test]
    fn test_plus_prefix_kept() {
        assert_eq!(normalize("+44 20 7946 0958"), "+442079460958");
        assert_eq!(normalize("+1 (555) 123-4567"), "+15551234567");
    }

    #[test]
    fn test_fallback_prefixes_plus() {
        assert_eq!(normalize("442079460958"), "+442079460958");
        assert_eq!(normalize("25551234567"), "+25551234567");
        assert_eq!(normalize("12345"), "+12345");
        assert_eq!(normalize(""), "+");
        assert_eq!(normalize("call me"), "+");
    }

    #[test]
    fn test_only_leading_plus_survives() {
        assert_eq!(normalize("555+123+4567"), "+15551234567");
        assert_eq!(normalize("++15551234567"), "+15551234567");
    }

    #[test]
    fn test_normalize_is_idempotent_for_plus_inputs() {
        for input in ["+15551234567", "+1 555 123 4567", "+442079460958", "+", "+0123"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input}");
        }
    }

    #[test]
    fn test_all_ten_digit_strings_prefix_plus_one() {
        for d in ["0000000000", "2125550199", "9999999999", "5550000001"] {
            assert_eq!(normalize(d), format!("+1{d}"));
        }
    }

    #[test]
    fn test_all_eleven_digit_strings_with_one_prefix_plus() {
        for d in ["10000000000", "12125550199", "19999999999"] {
            assert_eq!(normalize(d), format!("+{d}"));
        }
    }

    #[test]
    fn test_is_valid_e164() {
        assert!(is_valid_e164("+15551234567"));
        assert!(is_valid_e164("+442079460958"));
        assert!(is_valid_e164("+12"));

        assert!(!is_valid_e164("15551234567"));
        assert!(!is_valid_e164("+05551234567"));
        assert!(!is_valid_e164("+1"));
        assert!(!is_valid_e164("+"));
        assert!(!is_valid_e164("+1234567890123456"));
        assert!(!is_valid_e164("+1555123456a"));
    }

    #[test]
    fn test_non_ascii_digits_are_not_e164() {
        // Arabic-Indic and fullwidth digits.
        assert!(!is_valid_e164("+1٥٥٥١٢٣٤٥٦٧"));
        assert!(!is_valid_e164("+１５５５１２３４５６７"));
        assert!(!is_north_american("+1٥٥٥"));
        assert_eq!(normalize("٥٥٥١٢٣٤٥٦٧"), "+");
    }

    #[test]
    fn test_is_north_american() {
        assert!(is_north_american("+15551234567"));
        assert!(!is_north_american("+442079460958"));
        assert!(!is_north_american("+1555123456"));
    }

    #[test]
    fn test_redact() {
        assert_eq!(redact("+15551234567"), "***4567");
        assert_eq!(redact("+12"), "+12");
    }
}
