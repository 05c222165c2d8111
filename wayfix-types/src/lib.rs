//! Shared DTOs (schemas-as-code) for the wayfix workspace.
//!
//! # Design constraints
//! - Data sets, change-sets and reports are serialized to disk as JSON.
//! - Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod change;
pub mod correction;
pub mod osm;
pub mod report;
pub mod values;

/// Schema identifiers.
pub mod schema {
    pub const WAYFIX_CHANGESET_V1: &str = "wayfix.changeset.v1";
    pub const WAYFIX_REPORT_V1: &str = "wayfix.report.v1";
}
