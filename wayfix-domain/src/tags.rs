use crate::classify::has_direction_marker;
use crate::numeric::invert_number;
use crate::switcher::{DIRECTIONAL_PAIRS, DirectionalPair, UP_DOWN};
use std::borrow::Cow;
use tracing::debug;
use wayfix_types::correction::TagCorrection;
use wayfix_types::osm::Tagged;
use wayfix_types::values;

/// Which directional pair, if any, rewrites a generic tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapDecision {
    NoChange,
    /// First pair (in priority order) that changes the key. It is applied to the value as well.
    KeyChanged(&'static DirectionalPair),
    /// No pair changes the key; first pair that changes the value.
    ValueChanged(&'static DirectionalPair),
}

/// Two-phase decision: all pairs are tried against the key first, then against the value.
pub fn decide_swap(key: &str, value: &str) -> SwapDecision {
    if let Some(pair) = DIRECTIONAL_PAIRS.iter().find(|p| p.changes(key)) {
        return SwapDecision::KeyChanged(pair);
    }
    if let Some(pair) = DIRECTIONAL_PAIRS.iter().find(|p| p.changes(value)) {
        return SwapDecision::ValueChanged(pair);
    }
    SwapDecision::NoChange
}

/// Keys whose text mentions directions without describing the way's direction.
pub fn is_excluded_from_swap(key: &str) -> bool {
    key.contains("name")
        || key == "tiger:county"
        || key.eq_ignore_ascii_case("fixme")
        || key.starts_with("note")
}

/// Compute the tag rewrites needed after reversing the node order of `primitive`.
///
/// Corrections follow the tag iteration order of the primitive.
pub fn compute_tag_corrections<T: Tagged + ?Sized>(primitive: &T) -> Vec<TagCorrection> {
    let mut out = Vec::new();

    for (key, value) in primitive.tags() {
        let (new_key, new_value) = corrected_tag(key, value);

        let mut needs_correction = new_key != key.as_str();
        if primitive.get(&new_key) == Some(&*new_value) {
            needs_correction = false;
        }
        if new_value != value.as_str() {
            needs_correction = true;
        }

        if needs_correction {
            debug!(
                "tag correction {}={} -> {}={}",
                key, value, new_key, new_value
            );
            out.push(TagCorrection::new(
                key.as_str(),
                value.as_str(),
                new_key.into_owned(),
                new_value.into_owned(),
            ));
        }
    }

    out
}

fn corrected_tag<'a>(key: &'a str, value: &'a str) -> (Cow<'a, str>, Cow<'a, str>) {
    if has_direction_marker(key, "oneway") {
        let new_value = if values::is_reversed(value) {
            Cow::Borrowed(values::TRUE_VALUE)
        } else if values::is_true(value) {
            Cow::Borrowed(values::REVERSE_VALUE)
        } else {
            Cow::Borrowed(value)
        };
        return (Cow::Borrowed(key), new_value);
    }

    if has_direction_marker(key, "incline") || has_direction_marker(key, "direction") {
        let swapped = UP_DOWN.apply(value);
        let new_value = if swapped == value {
            invert_number(value)
        } else {
            swapped
        };
        return (Cow::Borrowed(key), new_value);
    }

    if is_excluded_from_swap(key) {
        return (Cow::Borrowed(key), Cow::Borrowed(value));
    }

    match decide_swap(key, value) {
        SwapDecision::NoChange => (Cow::Borrowed(key), Cow::Borrowed(value)),
        SwapDecision::KeyChanged(pair) => (pair.apply(key), pair.apply(value)),
        SwapDecision::ValueChanged(pair) => (Cow::Borrowed(key), pair.apply(value)),
    }
}
