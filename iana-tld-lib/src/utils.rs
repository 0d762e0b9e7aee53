//! Small helpers for TLD label handling.

/// Normalize a user-supplied TLD for lookup.
///
/// Lowercases the label and strips at most one leading dot, so `".NL"`,
/// `"NL"` and `"nl"` all address the same entry.
pub fn normalize_tld(tld: &str) -> String {
    let lowered = tld.trim().to_lowercase();
    match lowered.strip_prefix('.') {
        Some(stripped) => stripped.to_string(),
        None => lowered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_one_dot() {
        assert_eq!(normalize_tld(".NL"), "nl");
        assert_eq!(normalize_tld("NL"), "nl");
        assert_eq!(normalize_tld("nl"), "nl");
        assert_eq!(normalize_tld(".XN--P1AI"), "xn--p1ai");
    }

    #[test]
    fn strips_at_most_one_dot() {
        assert_eq!(normalize_tld("..nl"), ".nl");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(normalize_tld("  .nl \n"), "nl");
    }
}
