//! Edit engine for wayfix change-sets.
//!
//! Responsibilities:
//! - Plan the reversal of ways: new node order plus the reviewed tag/role corrections.
//! - Attach primitive preconditions (sha256) to a change-set.
//! - Apply change-sets all-or-nothing, and undo them.
//! - Generate a unified diff preview.

mod error;

pub use error::{EditError, EditResult, PolicyBlockError};

use anyhow::Context;
use diffy::PatchFormatter;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};
use wayfix_domain::{
    CorrectionReviewer, ReverseWayCorrector, ReviewDecision, deterministic_change_set_id,
};
use wayfix_types::change::{Change, ChangeSet, PrimitivePrecondition};
use wayfix_types::correction::CorrectionProposal;
use wayfix_types::osm::{DataSet, Node, PrimitiveId, Relation, Tags, Way};
use wayfix_types::report::{WayOutcome, WayStatus};

#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Plan and review, but leave the data set untouched.
    pub dry_run: bool,
}

/// The reviewed reversal of one way.
#[derive(Debug, Clone)]
pub struct ReversalPlan {
    pub way: i64,
    pub status: WayStatus,
    pub tag_corrections: u64,
    pub role_corrections: u64,
    pub change_set: ChangeSet,
}

impl ReversalPlan {
    pub fn outcome(&self) -> WayOutcome {
        WayOutcome {
            way: self.way,
            status: self.status,
            tag_corrections: self.tag_corrections,
            role_corrections: self.role_corrections,
        }
    }
}

/// Inverse changes of an applied change-set, newest first.
#[derive(Debug, Clone, Default)]
pub struct UndoLog {
    changes: Vec<Change>,
}

impl UndoLog {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

/// Result of reversing several ways in one go.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub plans: Vec<ReversalPlan>,
    pub change_set: ChangeSet,
    pub undo: UndoLog,
}

/// sha256 over the JSON form of a primitive, `None` if it does not exist.
pub fn fingerprint(data: &DataSet, id: PrimitiveId) -> EditResult<Option<String>> {
    let Some(primitive) = lookup(data, id) else {
        return Ok(None);
    };
    let json = primitive
        .to_json()
        .with_context(|| format!("serialize {}", id))?;
    let mut hasher = Sha256::new();
    hasher.update(&json);
    Ok(Some(hex::encode(hasher.finalize())))
}

fn assign_id(change_set: &mut ChangeSet) -> EditResult<()> {
    let id = deterministic_change_set_id(change_set).context("hash change-set")?;
    change_set.id = id.to_string();
    Ok(())
}

/// Record the current fingerprint of every primitive the change-set touches.
pub fn attach_preconditions(data: &DataSet, change_set: &mut ChangeSet) -> EditResult<()> {
    let mut preconditions = Vec::new();
    for id in change_set.touched() {
        let sha256 = fingerprint(data, id)?.ok_or(PolicyBlockError::UnknownPrimitive { id })?;
        preconditions.push(PrimitivePrecondition { target: id, sha256 });
    }
    change_set.preconditions = preconditions;
    Ok(())
}

/// Fail with a policy block if any touched primitive changed since planning.
pub fn check_preconditions(data: &DataSet, change_set: &ChangeSet) -> EditResult<()> {
    let mut mismatched = Vec::new();
    for pre in &change_set.preconditions {
        match fingerprint(data, pre.target)? {
            None => {
                return Err(PolicyBlockError::UnknownPrimitive { id: pre.target }.into());
            }
            Some(sha) if sha != pre.sha256 => mismatched.push(pre.target.to_string()),
            Some(_) => {}
        }
    }

    if mismatched.is_empty() {
        Ok(())
    } else {
        Err(PolicyBlockError::PreconditionMismatch {
            message: format!("changed since planning: {}", mismatched.join(", ")),
        }
        .into())
    }
}

/// Reverse the node order of a way and collect the reviewed corrections.
///
/// Nothing is applied; the returned change-set carries preconditions against `data`.
pub fn plan_reversal(
    data: &DataSet,
    way_id: i64,
    reviewer: &mut dyn CorrectionReviewer,
) -> EditResult<ReversalPlan> {
    let old_way = data
        .ways
        .get(&way_id)
        .ok_or(PolicyBlockError::UnknownPrimitive {
            id: PrimitiveId::Way(way_id),
        })?;
    let new_way = old_way.reversed();

    let mut recording = RecordingReviewer::new(reviewer);
    let corrections = ReverseWayCorrector.execute(old_way, &new_way, data, &mut recording)?;

    let mut change_set = ChangeSet::new(format!("Reverse way {}", way_id));
    change_set.changes.push(Change::ReplaceWayNodes {
        way: way_id,
        before: old_way.nodes.clone(),
        after: new_way.nodes.clone(),
    });
    change_set.extend(corrections);
    assign_id(&mut change_set)?;
    attach_preconditions(data, &mut change_set)?;

    let status = if !recording.consulted {
        WayStatus::Reversible
    } else if recording.kept || recording.tags + recording.roles == 0 {
        WayStatus::KeptUnchanged
    } else {
        WayStatus::Corrected
    };
    debug!("way {} planned as {:?}", way_id, status);

    Ok(ReversalPlan {
        way: way_id,
        status,
        tag_corrections: recording.tags,
        role_corrections: recording.roles,
        change_set,
    })
}

/// Plan every way, then apply all change-sets as one unit.
///
/// A cancellation on any way aborts the whole batch before anything is applied. Duplicate ids are
/// reversed once.
pub fn reverse_ways(
    data: &mut DataSet,
    way_ids: &[i64],
    reviewer: &mut dyn CorrectionReviewer,
    opts: &ApplyOptions,
) -> EditResult<BatchOutcome> {
    let mut seen = BTreeSet::new();
    let ids: Vec<i64> = way_ids.iter().copied().filter(|id| seen.insert(*id)).collect();

    let description = match ids.as_slice() {
        [one] => format!("Reverse way {}", one),
        many => format!("Reverse {} ways", many.len()),
    };
    let mut change_set = ChangeSet::new(description);
    let mut plans = Vec::with_capacity(ids.len());

    for id in ids {
        let plan = plan_reversal(data, id, reviewer)?;
        change_set.extend(plan.change_set.clone());
        plans.push(plan);
    }
    assign_id(&mut change_set)?;

    let undo = if opts.dry_run {
        UndoLog::default()
    } else {
        apply_change_set(data, &change_set)?
    };

    Ok(BatchOutcome {
        plans,
        change_set,
        undo,
    })
}

/// Apply a change-set. Every precondition and every change is checked before the data set is
/// modified; on error nothing is written.
pub fn apply_change_set(data: &mut DataSet, change_set: &ChangeSet) -> EditResult<UndoLog> {
    check_preconditions(data, change_set)?;

    let mut staging = Staging::load(data, &change_set.touched())?;
    for change in &change_set.changes {
        staging.apply(change)?;
    }
    staging.commit(data);

    info!(
        "applied change-set {} ({} change(s))",
        change_set.id,
        change_set.changes.len()
    );

    Ok(UndoLog {
        changes: change_set.changes.iter().rev().map(inverse).collect(),
    })
}

/// Revert a previously applied change-set.
pub fn undo(data: &mut DataSet, log: UndoLog) -> EditResult<()> {
    let touched: Vec<PrimitiveId> = log
        .changes
        .iter()
        .map(Change::target)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut staging = Staging::load(data, &touched)?;
    for change in &log.changes {
        staging.apply(change)?;
    }
    staging.commit(data);

    info!("undid {} change(s)", log.changes.len());
    Ok(())
}

/// Unified diff of every primitive the change-set would modify.
pub fn preview_patch(data: &DataSet, change_set: &ChangeSet) -> EditResult<String> {
    let touched = change_set.touched();
    let mut staging = Staging::load(data, &touched)?;
    for change in &change_set.changes {
        staging.apply(change)?;
    }

    let mut out = String::new();
    let formatter = PatchFormatter::new();

    for id in touched {
        let old = lookup(data, id).map(|p| p.describe()).unwrap_or_default();
        let new = staging.get(id).map(|p| p.describe()).unwrap_or_default();
        if old == new {
            continue;
        }

        out.push_str(&format!("diff --git a/{0}/{1} b/{0}/{1}\n", id.kind(), id.raw()));
        let patch = diffy::create_patch(&old, &new);
        out.push_str(&formatter.fmt_patch(&patch).to_string());
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }

    Ok(out)
}

fn inverse(change: &Change) -> Change {
    match change.clone() {
        Change::ReplaceWayNodes { way, before, after } => Change::ReplaceWayNodes {
            way,
            before: after,
            after: before,
        },
        Change::ReplaceTags {
            target,
            before,
            after,
        } => Change::ReplaceTags {
            target,
            before: after,
            after: before,
        },
        Change::ChangeMemberRole {
            relation,
            position,
            member,
            old_role,
            new_role,
        } => Change::ChangeMemberRole {
            relation,
            position,
            member,
            old_role: new_role,
            new_role: old_role,
        },
    }
}

fn mismatch(message: String) -> EditError {
    PolicyBlockError::PreconditionMismatch { message }.into()
}

fn unknown(id: PrimitiveId) -> EditError {
    PolicyBlockError::UnknownPrimitive { id }.into()
}

#[derive(Debug, Clone, Copy)]
enum PrimitiveRef<'a> {
    Node(&'a Node),
    Way(&'a Way),
    Relation(&'a Relation),
}

impl PrimitiveRef<'_> {
    fn to_json(self) -> serde_json::Result<Vec<u8>> {
        match self {
            PrimitiveRef::Node(n) => serde_json::to_vec(n),
            PrimitiveRef::Way(w) => serde_json::to_vec(w),
            PrimitiveRef::Relation(r) => serde_json::to_vec(r),
        }
    }

    /// One line per node list, tag and member, for diffing.
    fn describe(self) -> String {
        let mut out = String::new();
        let tags: &Tags = match self {
            PrimitiveRef::Node(n) => {
                out.push_str(&format!("position {} {}\n", n.lat, n.lon));
                &n.tags
            }
            PrimitiveRef::Way(w) => {
                let nodes: Vec<String> = w.nodes.iter().map(i64::to_string).collect();
                out.push_str(&format!("nodes {}\n", nodes.join(" ")));
                &w.tags
            }
            PrimitiveRef::Relation(r) => {
                for (i, m) in r.members.iter().enumerate() {
                    out.push_str(&format!("member #{} {} role={}\n", i, m.member, m.role));
                }
                &r.tags
            }
        };
        for (k, v) in tags {
            out.push_str(&format!("tag {}={}\n", k, v));
        }
        out
    }
}

fn lookup(data: &DataSet, id: PrimitiveId) -> Option<PrimitiveRef<'_>> {
    match id {
        PrimitiveId::Node(id) => data.nodes.get(&id).map(PrimitiveRef::Node),
        PrimitiveId::Way(id) => data.ways.get(&id).map(PrimitiveRef::Way),
        PrimitiveId::Relation(id) => data.relations.get(&id).map(PrimitiveRef::Relation),
    }
}

/// Working copies of the touched primitives. Changes are applied here first and only written
/// back once all of them succeeded.
#[derive(Debug, Default)]
struct Staging {
    nodes: BTreeMap<i64, Node>,
    ways: BTreeMap<i64, Way>,
    relations: BTreeMap<i64, Relation>,
}

impl Staging {
    fn load(data: &DataSet, ids: &[PrimitiveId]) -> EditResult<Self> {
        let mut staging = Staging::default();
        for id in ids {
            match *id {
                PrimitiveId::Node(raw) => {
                    let node = data.nodes.get(&raw).ok_or_else(|| unknown(*id))?;
                    staging.nodes.insert(raw, node.clone());
                }
                PrimitiveId::Way(raw) => {
                    let way = data.ways.get(&raw).ok_or_else(|| unknown(*id))?;
                    staging.ways.insert(raw, way.clone());
                }
                PrimitiveId::Relation(raw) => {
                    let relation = data.relations.get(&raw).ok_or_else(|| unknown(*id))?;
                    staging.relations.insert(raw, relation.clone());
                }
            }
        }
        Ok(staging)
    }

    fn get(&self, id: PrimitiveId) -> Option<PrimitiveRef<'_>> {
        match id {
            PrimitiveId::Node(id) => self.nodes.get(&id).map(PrimitiveRef::Node),
            PrimitiveId::Way(id) => self.ways.get(&id).map(PrimitiveRef::Way),
            PrimitiveId::Relation(id) => self.relations.get(&id).map(PrimitiveRef::Relation),
        }
    }

    fn tags_mut(&mut self, id: PrimitiveId) -> Option<&mut Tags> {
        match id {
            PrimitiveId::Node(id) => self.nodes.get_mut(&id).map(|n| &mut n.tags),
            PrimitiveId::Way(id) => self.ways.get_mut(&id).map(|w| &mut w.tags),
            PrimitiveId::Relation(id) => self.relations.get_mut(&id).map(|r| &mut r.tags),
        }
    }

    fn apply(&mut self, change: &Change) -> EditResult<()> {
        match change {
            Change::ReplaceWayNodes { way, before, after } => {
                let w = self
                    .ways
                    .get_mut(way)
                    .ok_or_else(|| unknown(PrimitiveId::Way(*way)))?;
                if &w.nodes != before {
                    return Err(mismatch(format!("nodes of way {} differ", way)));
                }
                w.nodes = after.clone();
            }
            Change::ReplaceTags {
                target,
                before,
                after,
            } => {
                let tags = self.tags_mut(*target).ok_or_else(|| unknown(*target))?;
                if tags != before {
                    return Err(mismatch(format!("tags of {} differ", target)));
                }
                *tags = after.clone();
            }
            Change::ChangeMemberRole {
                relation,
                position,
                member,
                old_role,
                new_role,
            } => {
                let r = self
                    .relations
                    .get_mut(relation)
                    .ok_or_else(|| unknown(PrimitiveId::Relation(*relation)))?;
                let slot = r.members.get_mut(*position).ok_or_else(|| {
                    EditError::from(PolicyBlockError::MemberMismatch {
                        message: format!("relation {} has no member #{}", relation, position),
                    })
                })?;
                if slot.member != *member || slot.role != *old_role {
                    return Err(PolicyBlockError::MemberMismatch {
                        message: format!(
                            "relation {} member #{} is {} with role '{}', expected {} with role '{}'",
                            relation, position, slot.member, slot.role, member, old_role
                        ),
                    }
                    .into());
                }
                slot.role = new_role.clone();
            }
        }
        Ok(())
    }

    fn commit(self, data: &mut DataSet) {
        data.nodes.extend(self.nodes);
        data.ways.extend(self.ways);
        data.relations.extend(self.relations);
    }
}

/// Wraps the caller's reviewer to remember what was decided.
struct RecordingReviewer<'r> {
    inner: &'r mut dyn CorrectionReviewer,
    consulted: bool,
    kept: bool,
    tags: u64,
    roles: u64,
}

impl<'r> RecordingReviewer<'r> {
    fn new(inner: &'r mut dyn CorrectionReviewer) -> Self {
        Self {
            inner,
            consulted: false,
            kept: false,
            tags: 0,
            roles: 0,
        }
    }
}

impl CorrectionReviewer for RecordingReviewer<'_> {
    fn review(&mut self, proposal: &CorrectionProposal) -> anyhow::Result<ReviewDecision> {
        self.consulted = true;
        let decision = self.inner.review(proposal).context("reviewer")?;
        match &decision {
            ReviewDecision::Apply(selection) => {
                self.tags = proposal
                    .tag_corrections
                    .iter()
                    .map(|(id, list)| {
                        (0..list.len())
                            .filter(|i| selection.is_tag_selected(*id, *i))
                            .count() as u64
                    })
                    .sum();
                self.roles = proposal
                    .role_corrections
                    .iter()
                    .map(|(id, list)| {
                        (0..list.len())
                            .filter(|i| selection.is_role_selected(*id, *i))
                            .count() as u64
                    })
                    .sum();
            }
            ReviewDecision::KeepUnchanged => self.kept = true,
            ReviewDecision::Cancel => {}
        }
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfix_types::osm::RelationMember;

    #[test]
    fn inverse_swaps_before_and_after() {
        let change = Change::ChangeMemberRole {
            relation: 1,
            position: 3,
            member: PrimitiveId::Way(2),
            old_role: "left".to_string(),
            new_role: "right".to_string(),
        };
        let Change::ChangeMemberRole {
            old_role, new_role, ..
        } = inverse(&change)
        else {
            panic!("kind changed");
        };
        assert_eq!(old_role, "right");
        assert_eq!(new_role, "left");
    }

    #[test]
    fn describe_lists_members_and_tags() {
        let mut r = Relation::new(1, vec![RelationMember::new(PrimitiveId::Way(2), "forward")]);
        r.tags.insert("type".to_string(), "route".to_string());
        let text = PrimitiveRef::Relation(&r).describe();
        assert_eq!(text, "member #0 way 2 role=forward\ntag type=route\n");
    }

    #[test]
    fn staging_rejects_missing_member_slot() {
        let mut ds = DataSet::new();
        ds.add_relation(Relation::new(1, vec![]));
        let mut staging = Staging::load(&ds, &[PrimitiveId::Relation(1)]).expect("load");
        let err = staging
            .apply(&Change::ChangeMemberRole {
                relation: 1,
                position: 0,
                member: PrimitiveId::Way(2),
                old_role: "left".to_string(),
                new_role: "right".to_string(),
            })
            .expect_err("no slot");
        assert!(err.is_policy_block());
    }

    #[test]
    fn fingerprint_tracks_content() {
        let mut ds = DataSet::new();
        ds.add_way(Way::new(1, vec![1, 2]));
        let before = fingerprint(&ds, PrimitiveId::Way(1)).expect("hash").expect("exists");
        ds.ways.get_mut(&1).expect("way").nodes.push(3);
        let after = fingerprint(&ds, PrimitiveId::Way(1)).expect("hash").expect("exists");
        assert_ne!(before, after);
        assert_eq!(before.len(), 64);
        assert!(fingerprint(&ds, PrimitiveId::Way(2)).expect("hash").is_none());
    }
}
