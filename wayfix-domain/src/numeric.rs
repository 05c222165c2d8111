use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Optional sign, then a digit-led remainder on a single line.
static SIGNED_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?)([0-9].*)\z").expect("signed number pattern is valid")
});

/// Toggle the sign of a signed number such as `-5`, `+10%` or `12°`.
///
/// A leading `-` is dropped; no sign or `+` becomes `-`. The text after the sign must start with
/// an ASCII digit and stay on one line, anything else is returned unchanged.
pub fn invert_number(value: &str) -> Cow<'_, str> {
    let Some(caps) = SIGNED_NUMBER.captures(value) else {
        return Cow::Borrowed(value);
    };
    let (sign, rest) = (&caps[1], &caps[2]);

    if sign == "-" {
        Cow::Owned(rest.to_string())
    } else {
        Cow::Owned(format!("-{}", rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_sign() {
        assert_eq!(invert_number("-5"), "5");
        assert_eq!(invert_number("5"), "-5");
        assert_eq!(invert_number("+5"), "-5");
        assert_eq!(invert_number("10%"), "-10%");
        assert_eq!(invert_number("-3.5°"), "3.5°");
    }

    #[test]
    fn leaves_non_numbers_alone() {
        assert_eq!(invert_number("up"), "up");
        assert_eq!(invert_number(""), "");
        assert_eq!(invert_number("-"), "-");
        assert_eq!(invert_number("--5"), "--5");
        assert_eq!(invert_number("-x5"), "-x5");
        assert_eq!(invert_number("5\n"), "5\n");
        assert_eq!(invert_number("5\nx"), "5\nx");
        assert!(matches!(invert_number("steep"), Cow::Borrowed(_)));
    }

    #[test]
    fn only_ascii_digits_lead() {
        assert_eq!(invert_number("\u{663}5"), "\u{663}5");
        assert_eq!(invert_number("7\u{663}"), "-7\u{663}");
    }
}
