use crate::error::CoreError;

/// Parse a vacancy id from user input (route segment, CLI argument, prompt).
///
/// Only plain decimal integers are accepted; anything else is rejected
/// before a request is made.
pub fn parse_vacancy_id(raw: &str) -> Result<i64, CoreError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::InvalidVacancyId { raw: raw.to_owned() });
    }
    trimmed
        .parse()
        .map_err(|_| CoreError::InvalidVacancyId { raw: raw.to_owned() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_integers() {
        assert!(matches!(parse_vacancy_id("42"), Ok(42)));
        assert!(matches!(parse_vacancy_id(" 7 "), Ok(7)));
    }

    #[test]
    fn rejects_everything_else() {
        for raw in ["", "abc", "12abc", "1.5", "+3", "-", "0x10", "99999999999999999999"] {
            let err = parse_vacancy_id(raw);
            assert!(
                matches!(err, Err(CoreError::InvalidVacancyId { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejection_is_a_validation_error() {
        let Err(err) = parse_vacancy_id("abc") else {
            panic!("expected an error");
        };
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Invalid vacancy id: abc");
    }
}
