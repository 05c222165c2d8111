use crate::switcher::DIRECTIONAL_PAIRS;
use wayfix_types::osm::{Tagged, Way};

/// Key markers whose tags always depend on the direction of a way.
pub const DIRECTION_MARKERS: [&str; 3] = ["oneway", "incline", "direction"];

/// True if `key` starts or ends with `marker`, e.g. `oneway:bicycle` or `cycleway:right:oneway`.
pub fn has_direction_marker(key: &str, marker: &str) -> bool {
    key.starts_with(marker) || key.ends_with(marker)
}

/// Tests whether a way can be reversed without semantic change.
///
/// Returns false as soon as one key carries a direction marker or one key/value is affected by a
/// directional pair.
pub fn is_reversible<T: Tagged + ?Sized>(primitive: &T) -> bool {
    for (key, value) in primitive.tags() {
        if DIRECTION_MARKERS
            .iter()
            .any(|marker| has_direction_marker(key, marker))
        {
            return false;
        }
        if DIRECTIONAL_PAIRS
            .iter()
            .any(|pair| pair.changes(key) || pair.changes(value))
        {
            return false;
        }
    }
    true
}

/// The ways that need corrections when reversed, in input order.
pub fn irreversible_ways<'a, I>(ways: I) -> Vec<&'a Way>
where
    I: IntoIterator<Item = &'a Way>,
{
    ways.into_iter().filter(|w| !is_reversible(*w)).collect()
}
