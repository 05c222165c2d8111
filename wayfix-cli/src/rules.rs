//! Rule explanations for the `wayfix list-rules` and `wayfix explain` commands.

/// One correction rule as shown to users.
#[derive(Debug, Clone)]
pub struct RuleExplanation {
    /// Short key (e.g., "oneway").
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Tag or role before and after reversal.
    pub examples: &'static [(&'static str, &'static str)],
}

/// Rules in the order they are checked for a single tag.
pub static RULE_REGISTRY: &[RuleExplanation] = &[
    RuleExplanation {
        key: "oneway",
        title: "Oneway values",
        description: r#"Keys starting or ending with `oneway` keep their key. A true value
(`yes`, `true`, `1`, `on`) becomes `-1`, and `-1` becomes `yes`. Every other
value (`no`, `reversible`, `alternating`, ...) is left alone.

This rule wins over the directional pairs, so `cycleway:right:oneway=yes`
becomes `cycleway:right:oneway=-1` and the key is not swapped."#,
        examples: &[
            ("oneway=yes", "oneway=-1"),
            ("oneway=-1", "oneway=yes"),
            ("oneway:bicycle=true", "oneway:bicycle=-1"),
        ],
    },
    RuleExplanation {
        key: "incline",
        title: "Incline and direction values",
        description: r#"Keys starting or ending with `incline` or `direction` keep their key.
The value has `up` and `down` swapped; if it contains neither, a leading
number has its sign flipped (`-5` becomes `5`, `12%` becomes `-12%`).
Values that are neither are kept."#,
        examples: &[
            ("incline=up", "incline=down"),
            ("incline=-5%", "incline=5%"),
            ("direction=down", "direction=up"),
        ],
    },
    RuleExplanation {
        key: "exclusions",
        title: "Keys never swapped",
        description: r#"Keys containing `name`, keys starting with `note`, `fixme` in any case,
and `tiger:county` describe places or carry free text. Their keys and values
are never rewritten by the directional pairs."#,
        examples: &[("name:left=North Street", "name:left=North Street")],
    },
    RuleExplanation {
        key: "pairs",
        title: "Directional pairs",
        description: r#"Every other tag is matched against the directional pairs in priority order:
left/right, forward/backward, forwards/backwards, up/down, east/west,
north/south. A token matches at the start of the text or after the last `:`
or `_` where a token appears, and must end at a `:`, `_` or the end of the text.

The first pair that changes the key rewrites the key and, with the same pair,
the value. If no pair changes the key, the first pair that changes the value
rewrites the value."#,
        examples: &[
            ("sidewalk=left", "sidewalk=right"),
            ("parking:lane:left=parallel", "parking:lane:right=parallel"),
            ("cycleway:left=lane", "cycleway:right=lane"),
        ],
    },
    RuleExplanation {
        key: "roles",
        title: "Relation member roles",
        description: r#"Every relation member slot that refers to the reversed way and has a role
gets the first directional pair that changes the role. A relation listing the
same way twice gets one correction per slot."#,
        examples: &[("role forward", "role backward"), ("role north", "role south")],
    },
];

pub fn lookup_rule(key: &str) -> Option<&'static RuleExplanation> {
    RULE_REGISTRY
        .iter()
        .find(|r| r.key.eq_ignore_ascii_case(key))
}

pub fn list_rule_keys() -> Vec<&'static str> {
    RULE_REGISTRY.iter().map(|r| r.key).collect()
}
