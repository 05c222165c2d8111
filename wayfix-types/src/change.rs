use crate::osm::{PrimitiveId, Tags};
use serde::{Deserialize, Serialize};

/// A reviewed, ready-to-apply set of edits.
///
/// Change-sets are declarative: they carry the expected "before" state of every edit so the
/// apply engine can refuse to touch data that moved on since planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub schema: String,

    /// Deterministic id derived from the changes. Empty until assigned.
    #[serde(default)]
    pub id: String,

    pub description: String,

    #[serde(default)]
    pub preconditions: Vec<PrimitivePrecondition>,

    #[serde(default)]
    pub changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            schema: crate::schema::WAYFIX_CHANGESET_V1.to_string(),
            id: String::new(),
            description: description.into(),
            preconditions: vec![],
            changes: vec![],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Every primitive touched by a change, deduplicated and ordered.
    pub fn touched(&self) -> Vec<PrimitiveId> {
        let mut ids: Vec<PrimitiveId> = self.changes.iter().map(Change::target).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Merge another change-set into this one, keeping change order.
    pub fn extend(&mut self, other: ChangeSet) {
        self.changes.extend(other.changes);
        for pre in other.preconditions {
            if !self.preconditions.iter().any(|p| p.target == pre.target) {
                self.preconditions.push(pre);
            }
        }
    }
}

/// Fingerprint of a primitive at planning time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimitivePrecondition {
    pub target: PrimitiveId,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Change {
    ReplaceWayNodes {
        way: i64,
        before: Vec<i64>,
        after: Vec<i64>,
    },
    ReplaceTags {
        target: PrimitiveId,
        before: Tags,
        after: Tags,
    },
    ChangeMemberRole {
        relation: i64,
        position: usize,
        member: PrimitiveId,
        old_role: String,
        new_role: String,
    },
}

impl Change {
    pub fn target(&self) -> PrimitiveId {
        match self {
            Change::ReplaceWayNodes { way, .. } => PrimitiveId::Way(*way),
            Change::ReplaceTags { target, .. } => *target,
            Change::ChangeMemberRole { relation, .. } => PrimitiveId::Relation(*relation),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Change::ReplaceWayNodes { .. } => "replace_way_nodes",
            Change::ReplaceTags { .. } => "replace_tags",
            Change::ChangeMemberRole { .. } => "change_member_role",
        }
    }
}
