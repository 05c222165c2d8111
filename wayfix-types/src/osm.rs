use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Tag map of a primitive. Ordered so that everything derived from it iterates deterministically.
pub type Tags = BTreeMap<String, String>;

/// Identity of a primitive in a [`DataSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum PrimitiveId {
    Node(i64),
    Way(i64),
    Relation(i64),
}

impl PrimitiveId {
    pub fn kind(self) -> &'static str {
        match self {
            PrimitiveId::Node(_) => "node",
            PrimitiveId::Way(_) => "way",
            PrimitiveId::Relation(_) => "relation",
        }
    }

    pub fn raw(self) -> i64 {
        match self {
            PrimitiveId::Node(id) | PrimitiveId::Way(id) | PrimitiveId::Relation(id) => id,
        }
    }
}

impl fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.raw())
    }
}

/// Read access to the tags of a primitive.
pub trait Tagged {
    fn tags(&self) -> &Tags;

    fn get(&self, key: &str) -> Option<&str> {
        self.tags().get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: Tags,
}

/// An ordered sequence of node references plus tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Way {
    pub id: i64,

    #[serde(default)]
    pub nodes: Vec<i64>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: Tags,
}

impl Way {
    pub fn new(id: i64, nodes: Vec<i64>) -> Self {
        Self {
            id,
            nodes,
            tags: Tags::new(),
        }
    }

    /// Builder-style tag insertion, mostly for fixtures.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn primitive_id(&self) -> PrimitiveId {
        PrimitiveId::Way(self.id)
    }

    /// Copy of this way with the node order reversed. Tags are left untouched.
    pub fn reversed(&self) -> Way {
        let mut nodes = self.nodes.clone();
        nodes.reverse();
        Way {
            id: self.id,
            nodes,
            tags: self.tags.clone(),
        }
    }

    /// Same identity, same node sequence, same tags.
    pub fn has_equal_semantic_attributes(&self, other: &Way) -> bool {
        self.id == other.id && self.nodes == other.nodes && self.tags == other.tags
    }
}

/// A relation member. An empty role means "no role".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationMember {
    pub member: PrimitiveId,

    #[serde(default)]
    pub role: String,
}

impl RelationMember {
    pub fn new(member: PrimitiveId, role: impl Into<String>) -> Self {
        Self {
            member,
            role: role.into(),
        }
    }

    pub fn has_role(&self) -> bool {
        !self.role.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub id: i64,

    #[serde(default)]
    pub members: Vec<RelationMember>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: Tags,
}

impl Relation {
    pub fn new(id: i64, members: Vec<RelationMember>) -> Self {
        Self {
            id,
            members,
            tags: Tags::new(),
        }
    }

    pub fn primitive_id(&self) -> PrimitiveId {
        PrimitiveId::Relation(self.id)
    }

    pub fn references(&self, id: PrimitiveId) -> bool {
        self.members.iter().any(|m| m.member == id)
    }
}

impl Tagged for Node {
    fn tags(&self) -> &Tags {
        &self.tags
    }
}

impl Tagged for Way {
    fn tags(&self) -> &Tags {
        &self.tags
    }
}

impl Tagged for Relation {
    fn tags(&self) -> &Tags {
        &self.tags
    }
}

/// In-memory OSM data.
///
/// Serialized as three arrays; primitives are indexed by id once loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
    #[serde(default, with = "id_list")]
    pub nodes: BTreeMap<i64, Node>,

    #[serde(default, with = "id_list")]
    pub ways: BTreeMap<i64, Way>,

    #[serde(default, with = "id_list")]
    pub relations: BTreeMap<i64, Relation>,
}

impl DataSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.id, node);
    }

    pub fn add_way(&mut self, way: Way) {
        self.ways.insert(way.id, way);
    }

    pub fn add_relation(&mut self, relation: Relation) {
        self.relations.insert(relation.id, relation);
    }

    /// Relations that have `id` among their members, ordered by relation id.
    pub fn referrers(&self, id: PrimitiveId) -> Vec<&Relation> {
        self.relations
            .values()
            .filter(|r| r.references(id))
            .collect()
    }
}

trait HasId {
    fn id(&self) -> i64;
}

impl HasId for Node {
    fn id(&self) -> i64 {
        self.id
    }
}

impl HasId for Way {
    fn id(&self) -> i64 {
        self.id
    }
}

impl HasId for Relation {
    fn id(&self) -> i64 {
        self.id
    }
}

mod id_list {
    use super::HasId;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S, T>(map: &BTreeMap<i64, T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<BTreeMap<i64, T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + HasId,
    {
        let items = Vec::<T>::deserialize(deserializer)?;
        let mut out = BTreeMap::new();
        for item in items {
            let id = item.id();
            if out.insert(id, item).is_some() {
                return Err(serde::de::Error::custom(format!("duplicate id {}", id)));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_keeps_tags_and_flips_nodes() {
        let way = Way::new(1, vec![1, 2, 3]).with_tag("highway", "residential");
        let rev = way.reversed();
        assert_eq!(rev.nodes, vec![3, 2, 1]);
        assert_eq!(rev.tags, way.tags);
        assert!(!rev.has_equal_semantic_attributes(&way));
        assert!(way.has_equal_semantic_attributes(&way.clone()));
    }

    #[test]
    fn referrers_lists_each_relation_once() {
        let mut ds = DataSet::new();
        ds.add_way(Way::new(7, vec![1, 2]));
        ds.add_relation(Relation::new(
            1,
            vec![
                RelationMember::new(PrimitiveId::Way(7), "left"),
                RelationMember::new(PrimitiveId::Way(7), "forward"),
            ],
        ));
        ds.add_relation(Relation::new(
            2,
            vec![RelationMember::new(PrimitiveId::Way(8), "")],
        ));

        let refs = ds.referrers(PrimitiveId::Way(7));
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].id, 1);
    }

    #[test]
    fn primitive_id_display() {
        assert_eq!(PrimitiveId::Way(42).to_string(), "way 42");
        assert_eq!(PrimitiveId::Relation(-1).to_string(), "relation -1");
    }
}
