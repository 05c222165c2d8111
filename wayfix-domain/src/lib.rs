//! Domain logic: turn a way and its relation memberships into the corrections that keep its
//! meaning intact once its node order is reversed.
//!
//! This crate owns *what* should be corrected and why. It does not own *how* edits are applied;
//! that's the `wayfix-edit` crate.

mod classify;
mod corrector;
mod error;
mod numeric;
mod ports;
mod roles;
mod switcher;
mod tags;

pub use classify::{DIRECTION_MARKERS, has_direction_marker, irreversible_ways, is_reversible};
pub use corrector::{
    REVERSE_WAY_MESSAGE, ReverseWayCorrector, build_change_set, deterministic_change_set_id,
};
pub use error::CorrectionError;
pub use numeric::invert_number;
pub use ports::{
    AcceptAll, CorrectionReviewer, DataView, KeepUnchanged, RejectAll, ReviewDecision,
};
pub use roles::compute_role_corrections;
pub use switcher::{DIRECTIONAL_PAIRS, DirectionalPair, UP_DOWN};
pub use tags::{SwapDecision, compute_tag_corrections, decide_swap, is_excluded_from_swap};
