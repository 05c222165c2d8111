use crate::error::CorrectionError;
use crate::ports::{CorrectionReviewer, DataView, ReviewDecision};
use crate::roles::compute_role_corrections;
use crate::tags::compute_tag_corrections;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use tracing::{debug, info};
use uuid::Uuid;
use wayfix_types::change::{Change, ChangeSet};
use wayfix_types::correction::{CorrectionProposal, Selection, TagCorrection};
use wayfix_types::osm::{Tags, Way};

pub const REVERSE_WAY_MESSAGE: &str = "When reversing this way, the following changes to \
     properties of the way and its nodes are suggested in order to maintain data consistency.";

/// Proposes and packages the corrections for a reversed way.
///
/// Never mutates data: the result is a [`ChangeSet`] for the apply engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReverseWayCorrector;

impl ReverseWayCorrector {
    /// Tag corrections for `new_way`, role corrections for the relations referencing `old_way`.
    pub fn proposal(
        &self,
        old_way: &Way,
        new_way: &Way,
        data: &dyn DataView,
    ) -> CorrectionProposal {
        let mut proposal = CorrectionProposal {
            message: REVERSE_WAY_MESSAGE.to_string(),
            ..Default::default()
        };

        let tag_corrections = compute_tag_corrections(new_way);
        if !tag_corrections.is_empty() {
            proposal
                .tag_corrections
                .insert(new_way.primitive_id(), tag_corrections);
        }

        let role_corrections = compute_role_corrections(old_way, data);
        if !role_corrections.is_empty() {
            proposal
                .role_corrections
                .insert(new_way.primitive_id(), role_corrections);
        }

        proposal
    }

    /// Compute corrections, let `reviewer` decide, and package the accepted ones.
    ///
    /// The reviewer is not consulted when there is nothing to correct.
    pub fn execute(
        &self,
        old_way: &Way,
        new_way: &Way,
        data: &dyn DataView,
        reviewer: &mut dyn CorrectionReviewer,
    ) -> Result<ChangeSet, CorrectionError> {
        let proposal = self.proposal(old_way, new_way, data);
        if proposal.is_empty() {
            debug!("way {} needs no corrections", new_way.id);
            return Ok(ChangeSet::new(REVERSE_WAY_MESSAGE));
        }

        let decision = reviewer
            .review(&proposal)
            .map_err(CorrectionError::Review)?;

        match decision {
            ReviewDecision::Apply(selection) => {
                let change_set = build_change_set(new_way, &proposal, &selection)?;
                info!(
                    "way {}: {} change(s) accepted",
                    new_way.id,
                    change_set.changes.len()
                );
                Ok(change_set)
            }
            ReviewDecision::KeepUnchanged => {
                info!("way {}: corrections declined", new_way.id);
                Ok(ChangeSet::new(REVERSE_WAY_MESSAGE))
            }
            ReviewDecision::Cancel => Err(CorrectionError::UserCancelled),
        }
    }
}

/// Package the selected corrections of `proposal` as a change-set.
///
/// Tag corrections are folded into one tag replacement for `way`. Role corrections become one
/// change per member slot.
pub fn build_change_set(
    way: &Way,
    proposal: &CorrectionProposal,
    selection: &Selection,
) -> Result<ChangeSet, CorrectionError> {
    let mut change_set = ChangeSet::new(proposal.message.clone());
    let id = way.primitive_id();

    if let Some(corrections) = proposal.tag_corrections.get(&id) {
        let selected: Vec<&TagCorrection> = corrections
            .iter()
            .enumerate()
            .filter(|(i, _)| selection.is_tag_selected(id, *i))
            .map(|(_, c)| c)
            .collect();

        if !selected.is_empty() {
            let after = corrected_tags(&way.tags, &selected);
            if after != way.tags {
                change_set.changes.push(Change::ReplaceTags {
                    target: id,
                    before: way.tags.clone(),
                    after,
                });
            }
        }
    }

    for (primitive, corrections) in &proposal.role_corrections {
        for (i, rc) in corrections.iter().enumerate() {
            if !selection.is_role_selected(*primitive, i) {
                continue;
            }
            change_set.changes.push(Change::ChangeMemberRole {
                relation: rc.relation,
                position: rc.position,
                member: rc.member,
                old_role: rc.old_role.clone(),
                new_role: rc.new_role.clone(),
            });
        }
    }

    change_set.id = deterministic_change_set_id(&change_set)?.to_string();
    Ok(change_set)
}

/// Apply corrections in order. A key written by an earlier correction is not removed again by a
/// later one, so swapped key pairs (`left:x` / `right:x`) keep both values.
fn corrected_tags(tags: &Tags, corrections: &[&TagCorrection]) -> Tags {
    let mut out = tags.clone();
    let mut written: BTreeSet<&str> = BTreeSet::new();

    for c in corrections {
        if c.is_key_changed() && !written.contains(c.old_key.as_str()) {
            out.remove(&c.old_key);
        }
        out.insert(c.new_key.clone(), c.new_value.clone());
        written.insert(c.new_key.as_str());
    }

    out
}

/// Deterministic id: v5(namespace, sha256 of the canonical change list).
pub fn deterministic_change_set_id(change_set: &ChangeSet) -> Result<Uuid, serde_json::Error> {
    const NAMESPACE: Uuid = Uuid::from_bytes([
        0x9d, 0x1e, 0x6a, 0x42, 0x3c, 0x7f, 0x4b, 0x11, 0xa5, 0x0e, 0x5b, 0x2d, 0x61, 0x88, 0xc3,
        0x07,
    ]);

    let json = serde_json::to_vec(&change_set.changes)?;
    let mut hasher = Sha256::new();
    hasher.update(&json);
    let digest = hex::encode(hasher.finalize());
    Ok(Uuid::new_v5(&NAMESPACE, digest.as_bytes()))
}
