use crate::osm::PrimitiveId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A proposed rewrite of one tag on one primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCorrection {
    pub old_key: String,
    pub old_value: String,
    pub new_key: String,
    pub new_value: String,
}

impl TagCorrection {
    pub fn new(
        old_key: impl Into<String>,
        old_value: impl Into<String>,
        new_key: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            old_key: old_key.into(),
            old_value: old_value.into(),
            new_key: new_key.into(),
            new_value: new_value.into(),
        }
    }

    pub fn is_key_changed(&self) -> bool {
        self.old_key != self.new_key
    }

    pub fn is_value_changed(&self) -> bool {
        self.old_value != self.new_value
    }
}

/// A proposed role rewrite for one member slot of a relation.
///
/// The slot is identified by `position` because a relation may reference the same primitive
/// several times with different roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCorrection {
    pub relation: i64,
    pub position: usize,
    pub member: PrimitiveId,
    pub old_role: String,
    pub new_role: String,
}

/// Everything the reviewer is shown for one correction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionProposal {
    pub message: String,

    #[serde(default, with = "keyed_list")]
    pub tag_corrections: BTreeMap<PrimitiveId, Vec<TagCorrection>>,

    #[serde(default, with = "keyed_list")]
    pub role_corrections: BTreeMap<PrimitiveId, Vec<RoleCorrection>>,
}

impl CorrectionProposal {
    pub fn is_empty(&self) -> bool {
        self.tag_corrections.values().all(Vec::is_empty)
            && self.role_corrections.values().all(Vec::is_empty)
    }

    pub fn tag_count(&self) -> usize {
        self.tag_corrections.values().map(Vec::len).sum()
    }

    pub fn role_count(&self) -> usize {
        self.role_corrections.values().map(Vec::len).sum()
    }
}

/// Indices of the corrections a reviewer accepted, per primitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub tags: BTreeMap<PrimitiveId, Vec<usize>>,
    pub roles: BTreeMap<PrimitiveId, Vec<usize>>,
}

impl Selection {
    /// Select every correction of the proposal.
    pub fn all(proposal: &CorrectionProposal) -> Self {
        let tags = proposal
            .tag_corrections
            .iter()
            .map(|(id, list)| (*id, (0..list.len()).collect()))
            .collect();
        let roles = proposal
            .role_corrections
            .iter()
            .map(|(id, list)| (*id, (0..list.len()).collect()))
            .collect();
        Self { tags, roles }
    }

    pub fn is_tag_selected(&self, id: PrimitiveId, index: usize) -> bool {
        self.tags.get(&id).is_some_and(|ix| ix.contains(&index))
    }

    pub fn is_role_selected(&self, id: PrimitiveId, index: usize) -> bool {
        self.roles.get(&id).is_some_and(|ix| ix.contains(&index))
    }

    pub fn deselect_tag(&mut self, id: PrimitiveId, index: usize) {
        if let Some(ix) = self.tags.get_mut(&id) {
            ix.retain(|i| *i != index);
        }
    }

    pub fn deselect_role(&mut self, id: PrimitiveId, index: usize) {
        if let Some(ix) = self.roles.get_mut(&id) {
            ix.retain(|i| *i != index);
        }
    }
}

/// JSON objects cannot be keyed by a structured id, so maps keyed by `PrimitiveId` are written as
/// `[{"primitive": ..., "corrections": [...]}]`.
mod keyed_list {
    use crate::osm::PrimitiveId;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct EntryRef<'a, T> {
        primitive: PrimitiveId,
        corrections: &'a [T],
    }

    #[derive(Deserialize)]
    struct Entry<T> {
        primitive: PrimitiveId,
        corrections: Vec<T>,
    }

    pub fn serialize<S, T>(
        map: &BTreeMap<PrimitiveId, Vec<T>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        serializer.collect_seq(map.iter().map(|(id, list)| EntryRef {
            primitive: *id,
            corrections: list.as_slice(),
        }))
    }

    pub fn deserialize<'de, D, T>(
        deserializer: D,
    ) -> Result<BTreeMap<PrimitiveId, Vec<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        let entries = Vec::<Entry<T>>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|e| (e.primitive, e.corrections))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_all_covers_every_index() {
        let mut proposal = CorrectionProposal::default();
        proposal.tag_corrections.insert(
            PrimitiveId::Way(1),
            vec![
                TagCorrection::new("oneway", "yes", "oneway", "-1"),
                TagCorrection::new("sidewalk", "left", "sidewalk", "right"),
            ],
        );

        let mut sel = Selection::all(&proposal);
        assert!(sel.is_tag_selected(PrimitiveId::Way(1), 0));
        assert!(sel.is_tag_selected(PrimitiveId::Way(1), 1));
        assert!(!sel.is_tag_selected(PrimitiveId::Way(2), 0));

        sel.deselect_tag(PrimitiveId::Way(1), 0);
        assert!(!sel.is_tag_selected(PrimitiveId::Way(1), 0));
        assert!(sel.is_tag_selected(PrimitiveId::Way(1), 1));
    }

    #[test]
    fn key_and_value_change_flags() {
        let c = TagCorrection::new("left:x", "a", "right:x", "a");
        assert!(c.is_key_changed());
        assert!(!c.is_value_changed());
    }
}
