/// Parses a stored decimal string, accepting either `.` or `,` as separator.
///
/// Blank, malformed, and non-finite input all come back as `None`; a missing
/// measurement is never read as zero.
pub fn parse_decimal(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = trimmed.replacen(',', ".", 1);
    normalized
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

#[cfg(test)]
mod tests {
    use super::parse_decimal;

    #[test]
    fn accepts_both_separators() {
        assert_eq!(parse_decimal("31.5"), Some(31.5));
        assert_eq!(parse_decimal("31,5"), Some(31.5));
        assert_eq!(parse_decimal(" 42 "), Some(42.0));
    }

    #[test]
    fn rejects_blank_and_garbage() {
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("   "), None);
        assert_eq!(parse_decimal("n/a"), None);
        assert_eq!(parse_decimal("1,2,3"), None);
        assert_eq!(parse_decimal("inf"), None);
        assert_eq!(parse_decimal("NaN"), None);
    }
}
