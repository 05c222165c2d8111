//! Property-based tests for the apply engine.
//!
//! These tests verify that:
//! - Applying a reversal and undoing it restores the data set exactly
//! - Reversing twice with every correction accepted restores node order and tags

use proptest::prelude::*;
use wayfix_domain::AcceptAll;
use wayfix_edit::{ApplyOptions, reverse_ways, undo};
use wayfix_types::osm::{DataSet, Way};

fn arb_tag() -> impl Strategy<Value = (String, String)> {
    let keys = prop::sample::select(vec![
        "highway",
        "oneway",
        "incline",
        "sidewalk",
        "sidewalk:left",
        "sidewalk:right",
        "cycleway:forward",
        "turn:lanes:backward",
        "name",
    ]);
    let values = prop::sample::select(vec![
        "yes", "no", "-1", "left", "right", "both", "up", "down", "5%", "-5%", "primary",
    ]);
    (keys, values).prop_map(|(k, v)| (k.to_string(), v.to_string()))
}

fn arb_way() -> impl Strategy<Value = Way> {
    (
        prop::collection::vec(1i64..100, 2..8),
        prop::collection::vec(arb_tag(), 0..6),
    )
        .prop_map(|(nodes, tags)| {
            tags.into_iter()
                .fold(Way::new(1, nodes), |w, (k, v)| w.with_tag(k, v))
        })
}

proptest! {
    #[test]
    fn undo_restores_data(way in arb_way()) {
        let mut ds = DataSet::new();
        ds.add_way(way);
        let original = ds.clone();

        let outcome = reverse_ways(&mut ds, &[1], &mut AcceptAll, &ApplyOptions::default())
            .expect("reversed");
        undo(&mut ds, outcome.undo).expect("undo");

        prop_assert_eq!(ds, original);
    }

    #[test]
    fn node_order_round_trips(way in arb_way()) {
        let mut ds = DataSet::new();
        ds.add_way(way.clone());

        reverse_ways(&mut ds, &[1], &mut AcceptAll, &ApplyOptions::default()).expect("once");
        reverse_ways(&mut ds, &[1], &mut AcceptAll, &ApplyOptions::default()).expect("twice");

        prop_assert_eq!(&ds.ways[&1].nodes, &way.nodes);
    }
}
