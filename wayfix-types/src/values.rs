//! Canonical OSM boolean-ish tag values.

pub const TRUE_VALUE: &str = "yes";
pub const REVERSE_VALUE: &str = "-1";

const TRUE_VALUES: &[&str] = &["true", "yes", "1", "on"];
const REVERSE_VALUES: &[&str] = &["-1"];

pub fn is_true(value: &str) -> bool {
    TRUE_VALUES.contains(&value)
}

pub fn is_reversed(value: &str) -> bool {
    REVERSE_VALUES.contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_values_case_sensitively() {
        assert!(is_true("yes"));
        assert!(is_true("on"));
        assert!(!is_true("Yes"));
        assert!(is_reversed("-1"));
        assert!(!is_reversed("reverse"));
    }
}
