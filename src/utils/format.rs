/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None
pub fn format_optional(value: &Option<String>, default: &str) -> String {
    value.as_deref().unwrap_or(default).to_string()
}

/// Format a timestamp or date string to a more readable format
pub fn format_date(date: &str) -> String {
    // Try to parse ISO format and convert to readable
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y %H:%M").to_string()
    } else if date.len() >= 10 {
        // Try to parse YYYY-MM-DD format
        date.chars().take(10).collect()
    } else {
        date.to_string()
    }
}

/// Format a payment amount with its currency code, e.g. "120.50 USD"
pub fn format_money(amount: f64, currency: &str) -> String {
    format!("{:.2} {}", amount, currency.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-03-14T09:26:53Z"), "Mar 14, 2025 09:26");
        assert_eq!(format_date("1985-06-15"), "1985-06-15");
        assert_eq!(format_date("n/a"), "n/a");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(120.5, "usd"), "120.50 USD");
        assert_eq!(format_money(0.0, "EUR"), "0.00 EUR");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(&Some("x".to_string()), "-"), "x");
        assert_eq!(format_optional(&None, "-"), "-");
    }
}
