//! Display text helpers.

/// Keep the first `max_words` whitespace-separated words.
///
/// Returns the shortened title and whether anything was cut.
pub fn truncate_words(title: &str, max_words: usize) -> (String, bool) {
    let words: Vec<&str> = title.split_whitespace().collect();
    if words.len() <= max_words {
        return (title.trim().to_string(), false);
    }
    (format!("{}…", words[..max_words].join(" ")), true)
}

/// Integer with thousands separators: `12345` -> `12,345`
pub fn pretty_number(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_words() {
        assert_eq!(truncate_words("Alice", 3), ("Alice".to_string(), false));
        assert_eq!(
            truncate_words("one two three", 3),
            ("one two three".to_string(), false)
        );
        assert_eq!(
            truncate_words("one  two three four", 3),
            ("one two three…".to_string(), true)
        );
    }

    #[test]
    fn test_pretty_number() {
        assert_eq!(pretty_number(2), "2");
        assert_eq!(pretty_number(999), "999");
        assert_eq!(pretty_number(1000), "1,000");
        assert_eq!(pretty_number(1234567), "1,234,567");
    }
}
