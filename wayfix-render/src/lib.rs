//! Rendering helpers (markdown and plain text) for human-readable artifacts.

use wayfix_types::change::{Change, ChangeSet};
use wayfix_types::correction::CorrectionProposal;
use wayfix_types::osm::PrimitiveId;
use wayfix_types::report::{VerdictStatus, WayStatus, WayfixReport};

/// Points at one correction inside a [`CorrectionProposal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRef {
    Tag(PrimitiveId, usize),
    Role(PrimitiveId, usize),
}

/// Every correction of the proposal with a one-line label: tags first, then roles.
///
/// The order is stable, so position `n` in the list can be shown to a user as number `n + 1`.
pub fn proposal_entries(proposal: &CorrectionProposal) -> Vec<(EntryRef, String)> {
    let mut out = Vec::with_capacity(proposal.tag_count() + proposal.role_count());

    for (id, corrections) in &proposal.tag_corrections {
        for (i, c) in corrections.iter().enumerate() {
            out.push((
                EntryRef::Tag(*id, i),
                format!(
                    "{}: {}={} -> {}={}",
                    id, c.old_key, c.old_value, c.new_key, c.new_value
                ),
            ));
        }
    }

    for (id, corrections) in &proposal.role_corrections {
        for (i, c) in corrections.iter().enumerate() {
            out.push((
                EntryRef::Role(*id, i),
                format!(
                    "relation {} member #{} ({}): role {} -> {}",
                    c.relation,
                    c.position,
                    id,
                    role_label(&c.old_role),
                    role_label(&c.new_role)
                ),
            ));
        }
    }

    out
}

/// Numbered plain-text listing for terminal review.
pub fn render_proposal_text(proposal: &CorrectionProposal) -> String {
    let mut out = String::new();
    out.push_str(&proposal.message);
    out.push_str("\n\n");
    for (n, (_, label)) in proposal_entries(proposal).iter().enumerate() {
        out.push_str(&format!("  [{}] {}\n", n + 1, label));
    }
    out
}

pub fn render_proposal_md(proposal: &CorrectionProposal) -> String {
    let mut out = String::new();
    out.push_str("# wayfix proposal\n\n");
    out.push_str(&format!("{}\n\n", proposal.message));
    out.push_str(&format!(
        "- Tag corrections: {}\n- Role corrections: {}\n\n",
        proposal.tag_count(),
        proposal.role_count()
    ));

    if proposal.is_empty() {
        out.push_str("_No corrections needed._\n");
        return out;
    }

    if !proposal.tag_corrections.is_empty() {
        out.push_str("## Tags\n\n");
        out.push_str("| Primitive | Old | New |\n|---|---|---|\n");
        for (id, corrections) in &proposal.tag_corrections {
            for c in corrections {
                out.push_str(&format!(
                    "| {} | `{}={}` | `{}={}` |\n",
                    id, c.old_key, c.old_value, c.new_key, c.new_value
                ));
            }
        }
        out.push('\n');
    }

    if !proposal.role_corrections.is_empty() {
        out.push_str("## Roles\n\n");
        out.push_str("| Relation | Position | Member | Old role | New role |\n");
        out.push_str("|---|---|---|---|---|\n");
        for corrections in proposal.role_corrections.values() {
            for c in corrections {
                out.push_str(&format!(
                    "| {} | {} | {} | `{}` | `{}` |\n",
                    c.relation, c.position, c.member, c.old_role, c.new_role
                ));
            }
        }
        out.push('\n');
    }

    out
}

pub fn render_change_set_md(change_set: &ChangeSet) -> String {
    let mut out = String::new();
    out.push_str("# wayfix change-set\n\n");
    if !change_set.id.is_empty() {
        out.push_str(&format!("- Id: `{}`\n", change_set.id));
    }
    out.push_str(&format!("- Description: {}\n", change_set.description));
    out.push_str(&format!("- Changes: {}\n", change_set.changes.len()));
    out.push_str(&format!(
        "- Primitives touched: {}\n\n",
        change_set.touched().len()
    ));

    out.push_str("## Changes\n\n");
    if change_set.changes.is_empty() {
        out.push_str("_No changes planned._\n");
        return out;
    }

    for (i, change) in change_set.changes.iter().enumerate() {
        out.push_str(&format!(
            "### {}. `{}` {}\n\n",
            i + 1,
            change.kind(),
            change.target()
        ));
        match change {
            Change::ReplaceWayNodes { before, after, .. } => {
                out.push_str(&format!("- Nodes before: {}\n", join_ids(before)));
                out.push_str(&format!("- Nodes after: {}\n", join_ids(after)));
            }
            Change::ReplaceTags { before, after, .. } => {
                for (k, v) in before {
                    if after.get(k) != Some(v) {
                        out.push_str(&format!("- Remove `{}={}`\n", k, v));
                    }
                }
                for (k, v) in after {
                    if before.get(k) != Some(v) {
                        out.push_str(&format!("- Set `{}={}`\n", k, v));
                    }
                }
            }
            Change::ChangeMemberRole {
                position,
                member,
                old_role,
                new_role,
                ..
            } => {
                out.push_str(&format!(
                    "- Member #{} ({}): `{}` → `{}`\n",
                    position, member, old_role, new_role
                ));
            }
        }
        out.push('\n');
    }

    out
}

pub fn render_report_md(report: &WayfixReport) -> String {
    let mut out = String::new();
    out.push_str("# wayfix report\n\n");
    out.push_str(&format!(
        "- Verdict: `{}`\n- Ways: {}\n- Tag corrections: {}\n- Role corrections: {}\n",
        verdict_label(report.verdict.status),
        report.verdict.counts.ways,
        report.verdict.counts.tag_corrections,
        report.verdict.counts.role_corrections
    ));
    if let Some(id) = &report.changeset_id {
        out.push_str(&format!("- Change-set: `{}`\n", id));
    }
    out.push('\n');

    out.push_str("## Ways\n\n");
    if report.ways.is_empty() {
        out.push_str("_No ways processed._\n");
        return out;
    }

    for w in &report.ways {
        out.push_str(&format!(
            "- way {}: `{}` ({} tag, {} role)\n",
            w.way,
            way_status_label(w.status),
            w.tag_corrections,
            w.role_corrections
        ));
    }

    out
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn role_label(role: &str) -> &str {
    if role.is_empty() { "(none)" } else { role }
}

fn verdict_label(s: VerdictStatus) -> &'static str {
    match s {
        VerdictStatus::Clean => "clean",
        VerdictStatus::Corrected => "corrected",
        VerdictStatus::Cancelled => "cancelled",
    }
}

fn way_status_label(s: WayStatus) -> &'static str {
    match s {
        WayStatus::Reversible => "reversible",
        WayStatus::Corrected => "corrected",
        WayStatus::KeptUnchanged => "kept_unchanged",
        WayStatus::Cancelled => "cancelled",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use wayfix_types::correction::{RoleCorrection, TagCorrection};
    use wayfix_types::report::{ToolInfo, WayOutcome};

    fn proposal() -> CorrectionProposal {
        let mut tags = BTreeMap::new();
        tags.insert(
            PrimitiveId::Way(7),
            vec![TagCorrection::new("oneway", "yes", "oneway", "-1")],
        );
        let mut roles = BTreeMap::new();
        roles.insert(
            PrimitiveId::Way(7),
            vec![RoleCorrection {
                relation: 20,
                position: 0,
                member: PrimitiveId::Way(7),
                old_role: "forward".to_string(),
                new_role: "backward".to_string(),
            }],
        );
        CorrectionProposal {
            message: "Reverse?".to_string(),
            tag_corrections: tags,
            role_corrections: roles,
        }
    }

    #[test]
    fn entries_list_tags_before_roles() {
        let entries = proposal_entries(&proposal());
        assert_eq!(
            entries,
            vec![
                (
                    EntryRef::Tag(PrimitiveId::Way(7), 0),
                    "way 7: oneway=yes -> oneway=-1".to_string()
                ),
                (
                    EntryRef::Role(PrimitiveId::Way(7), 0),
                    "relation 20 member #0 (way 7): role forward -> backward".to_string()
                ),
            ]
        );
    }

    #[test]
    fn proposal_text_is_numbered() {
        let text = render_proposal_text(&proposal());
        assert!(text.starts_with("Reverse?\n\n"));
        assert!(text.contains("  [1] way 7: oneway=yes -> oneway=-1\n"));
        assert!(text.contains("  [2] relation 20"));
    }

    #[test]
    fn proposal_md_has_both_tables() {
        let md = render_proposal_md(&proposal());
        assert!(md.contains("## Tags"));
        assert!(md.contains("| way 7 | `oneway=yes` | `oneway=-1` |"));
        assert!(md.contains("## Roles"));
        assert!(md.contains("| 20 | 0 | way 7 | `forward` | `backward` |"));
    }

    #[test]
    fn empty_proposal_md() {
        let md = render_proposal_md(&CorrectionProposal::default());
        assert!(md.contains("_No corrections needed._"));
    }

    #[test]
    fn change_set_md_lists_tag_diff() {
        let mut before = BTreeMap::new();
        before.insert("oneway".to_string(), "yes".to_string());
        let mut after = BTreeMap::new();
        after.insert("oneway".to_string(), "-1".to_string());

        let mut cs = ChangeSet::new("Reverse way 7");
        cs.changes.push(Change::ReplaceWayNodes {
            way: 7,
            before: vec![1, 2],
            after: vec![2, 1],
        });
        cs.changes.push(Change::ReplaceTags {
            target: PrimitiveId::Way(7),
            before,
            after,
        });

        let md = render_change_set_md(&cs);
        assert!(md.contains("- Changes: 2\n"));
        assert!(md.contains("- Primitives touched: 1\n"));
        assert!(md.contains("- Nodes after: 2, 1\n"));
        assert!(md.contains("- Remove `oneway=yes`\n"));
        assert!(md.contains("- Set `oneway=-1`\n"));
    }

    #[test]
    fn report_md_shows_verdict_and_ways() {
        let mut report = WayfixReport::new(
            ToolInfo {
                name: "wayfix".to_string(),
                version: None,
            },
            Utc::now(),
        );
        report.ways.push(WayOutcome {
            way: 7,
            status: WayStatus::Corrected,
            tag_corrections: 1,
            role_corrections: 1,
        });
        report.finish(Utc::now());

        let md = render_report_md(&report);
        assert!(md.contains("- Verdict: `corrected`"));
        assert!(md.contains("- way 7: `corrected` (1 tag, 1 role)"));
    }
}
