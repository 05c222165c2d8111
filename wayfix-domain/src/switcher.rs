use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Two mutually inverse tokens that swap when a way is reversed.
///
/// A token only matches as a whole component of the text: it must start the text or follow a
/// separator (`:` or `_`), and must end the text or be followed by a separator. Matching ignores
/// ASCII case; the substituted token is always the lowercase counterpart.
#[derive(Debug, Clone)]
pub struct DirectionalPair {
    pub a: &'static str,
    pub b: &'static str,
    matcher: Regex,
}

/// Swap table in priority order.
pub static DIRECTIONAL_PAIRS: LazyLock<[DirectionalPair; 6]> = LazyLock::new(|| {
    [
        DirectionalPair::new("left", "right"),
        DirectionalPair::new("forward", "backward"),
        DirectionalPair::new("forwards", "backwards"),
        DirectionalPair::new("up", "down"),
        DirectionalPair::new("east", "west"),
        DirectionalPair::new("north", "south"),
    ]
});

/// Used on its own for `incline`/`direction` values.
pub static UP_DOWN: LazyLock<&'static DirectionalPair> =
    LazyLock::new(|| &DIRECTIONAL_PAIRS[3]);

impl DirectionalPair {
    /// Build the matcher for `a`/`b`.
    ///
    /// The optional prefix is lazy so a token at the very start wins; otherwise `.*` is greedy and
    /// the right-most component holding a token is chosen. `.` stops at the first line break, and
    /// a single trailing line break still ends a component.
    pub fn new(a: &'static str, b: &'static str) -> Self {
        let pattern = format!(
            r"^(?:.*[:_])??((?i-u:{}|{}))(?:[:_]|(?:\r?\n)?\z)",
            regex::escape(a),
            regex::escape(b)
        );
        let matcher = Regex::new(&pattern).expect("directional pair pattern is valid");
        Self { a, b, matcher }
    }

    pub fn name(&self) -> String {
        format!("{}/{}", self.a, self.b)
    }

    /// Swap the matched token for its counterpart; text without a match is returned as is.
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let Some(token) = self.matcher.captures(text).and_then(|c| c.get(1)) else {
            return Cow::Borrowed(text);
        };

        let replacement = if token.as_str().eq_ignore_ascii_case(self.a) {
            self.b
        } else {
            self.a
        };

        let mut out = String::with_capacity(text.len() + replacement.len());
        out.push_str(&text[..token.start()]);
        out.push_str(replacement);
        out.push_str(&text[token.end()..]);
        Cow::Owned(out)
    }

    /// True if [`apply`](Self::apply) would produce a different string.
    pub fn changes(&self, text: &str) -> bool {
        self.apply(text) != text
    }
}

impl PartialEq for DirectionalPair {
    fn eq(&self, other: &Self) -> bool {
        self.a == other.a && self.b == other.b
    }
}

impl Eq for DirectionalPair {}

#[cfg(test)]
mod tests {
    use super::*;

    fn left_right() -> &'static DirectionalPair {
        &DIRECTIONAL_PAIRS[0]
    }

    #[test]
    fn swaps_whole_components_only() {
        assert_eq!(left_right().apply("left"), "right");
        assert_eq!(left_right().apply("right"), "left");
        assert_eq!(left_right().apply("sidewalk:left"), "sidewalk:right");
        assert_eq!(left_right().apply("left:sidewalk"), "right:sidewalk");
        assert_eq!(left_right().apply("parking:lane:right:parallel"), "parking:lane:left:parallel");
        assert_eq!(left_right().apply("cycleway_right"), "cycleway_left");
    }

    #[test]
    fn ignores_substrings() {
        assert_eq!(left_right().apply("leftover"), "leftover");
        assert_eq!(left_right().apply("copyright"), "copyright");
        assert_eq!(left_right().apply("turn left"), "turn left");
        assert_eq!(UP_DOWN.apply("upper:deck"), "upper:deck");
        assert!(matches!(left_right().apply("highway"), Cow::Borrowed(_)));
    }

    #[test]
    fn matching_ignores_case_but_substitutes_lowercase() {
        assert_eq!(left_right().apply("LEFT"), "right");
        assert_eq!(left_right().apply("Sidewalk:Right"), "Sidewalk:left");
    }

    #[test]
    fn leading_token_wins_over_later_ones() {
        assert_eq!(left_right().apply("left:right"), "right:right");
    }

    #[test]
    fn rightmost_component_wins_when_not_leading() {
        assert_eq!(left_right().apply("a:left:b:right"), "a:left:b:left");
    }

    #[test]
    fn forward_does_not_match_forwards() {
        let fb = &DIRECTIONAL_PAIRS[1];
        let fsbs = &DIRECTIONAL_PAIRS[2];
        assert_eq!(fb.apply("forwards"), "forwards");
        assert_eq!(fsbs.apply("forwards"), "backwards");
        assert_eq!(fb.apply("backward:stop"), "forward:stop");
    }

    #[test]
    fn trailing_line_break_still_ends_a_component() {
        assert_eq!(left_right().apply("left\n"), "right\n");
        assert_eq!(left_right().apply("x:left\r\n"), "x:right\r\n");
        assert_eq!(left_right().apply("a\nb:left"), "a\nb:left");
    }

    #[test]
    fn case_folding_is_ascii_only() {
        let north_south = &DIRECTIONAL_PAIRS[5];
        assert_eq!(north_south.apply("SOUTH"), "north");
        assert_eq!(north_south.apply("\u{17f}outh"), "\u{17f}outh");
    }

    #[test]
    fn up_down_shares_the_table_entry() {
        assert!(std::ptr::eq(*UP_DOWN, &DIRECTIONAL_PAIRS[3]));
        assert_eq!(UP_DOWN.apply("incline:up"), "incline:down");
    }

    #[test]
    fn empty_text_is_untouched() {
        for pair in DIRECTIONAL_PAIRS.iter() {
            assert!(!pair.changes(""));
        }
    }

    #[test]
    fn table_priority_order() {
        let names: Vec<String> = DIRECTIONAL_PAIRS.iter().map(DirectionalPair::name).collect();
        assert_eq!(
            names,
            vec![
                "left/right",
                "forward/backward",
                "forwards/backwards",
                "up/down",
                "east/west",
                "north/south"
            ]
        );
    }
}
