use crate::ports::DataView;
use crate::switcher::DIRECTIONAL_PAIRS;
use tracing::debug;
use wayfix_types::correction::RoleCorrection;
use wayfix_types::osm::{PrimitiveId, RelationMember, Way};

/// Compute the role rewrites needed in every relation that references `way`.
///
/// `way` is the way as it is stored in `data`, before reversal. Each member slot is handled on
/// its own, so a relation that lists the way twice can yield two corrections.
pub fn compute_role_corrections(way: &Way, data: &dyn DataView) -> Vec<RoleCorrection> {
    let mut out = Vec::new();

    for relation in data.referrers(way.primitive_id()) {
        for (position, member) in relation.members.iter().enumerate() {
            if !member.has_role() || !refers_to(member, way, data) {
                continue;
            }

            let new_role = DIRECTIONAL_PAIRS
                .iter()
                .map(|pair| pair.apply(&member.role))
                .find(|role| role != &member.role);

            if let Some(new_role) = new_role {
                debug!(
                    "role correction relation {} #{}: {} -> {}",
                    relation.id, position, member.role, new_role
                );
                out.push(RoleCorrection {
                    relation: relation.id,
                    position,
                    member: member.member,
                    old_role: member.role.clone(),
                    new_role: new_role.into_owned(),
                });
            }
        }
    }

    out
}

fn refers_to(member: &RelationMember, way: &Way, data: &dyn DataView) -> bool {
    let PrimitiveId::Way(id) = member.member else {
        return false;
    };
    id == way.id
        && data
            .way(id)
            .is_some_and(|stored| stored.has_equal_semantic_attributes(way))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wayfix_types::osm::{DataSet, Relation};

    fn data_with(way: &Way, members: Vec<RelationMember>) -> DataSet {
        let mut ds = DataSet::new();
        ds.add_way(way.clone());
        ds.add_relation(Relation::new(50, members));
        ds
    }

    #[test]
    fn duplicate_member_slots_are_corrected_independently() {
        let way = Way::new(7, vec![1, 2, 3]);
        let ds = data_with(
            &way,
            vec![
                RelationMember::new(PrimitiveId::Way(7), "left"),
                RelationMember::new(PrimitiveId::Way(8), "left"),
                RelationMember::new(PrimitiveId::Way(7), "forward"),
            ],
        );

        let corrections = compute_role_corrections(&way, &ds);
        assert_eq!(
            corrections,
            vec![
                RoleCorrection {
                    relation: 50,
                    position: 0,
                    member: PrimitiveId::Way(7),
                    old_role: "left".to_string(),
                    new_role: "right".to_string(),
                },
                RoleCorrection {
                    relation: 50,
                    position: 2,
                    member: PrimitiveId::Way(7),
                    old_role: "forward".to_string(),
                    new_role: "backward".to_string(),
                },
            ]
        );
    }

    #[test]
    fn members_without_role_or_direction_are_skipped() {
        let way = Way::new(7, vec![1, 2]);
        let ds = data_with(
            &way,
            vec![
                RelationMember::new(PrimitiveId::Way(7), ""),
                RelationMember::new(PrimitiveId::Way(7), "outer"),
            ],
        );
        assert!(compute_role_corrections(&way, &ds).is_empty());
    }

    #[test]
    fn stale_way_copy_matches_no_member() {
        let way = Way::new(7, vec![1, 2]);
        let ds = data_with(&way, vec![RelationMember::new(PrimitiveId::Way(7), "left")]);

        let stale = way.clone().with_tag("highway", "service");
        assert!(compute_role_corrections(&stale, &ds).is_empty());
    }

    #[test]
    fn first_pair_in_priority_order_wins() {
        let way = Way::new(7, vec![1, 2]);
        let ds = data_with(&way, vec![RelationMember::new(PrimitiveId::Way(7), "north:left")]);

        let corrections = compute_role_corrections(&way, &ds);
        assert_eq!(corrections.len(), 1);
        assert_eq!(corrections[0].new_role, "north:right");
    }
}
