use serde::ser::{Serialize, SerializeMap, Serializer};

use super::confidence::{aggregate_confidence, entity_confidences};
use crate::pipeline::extraction::types::{Entity, ProcessedDocument};

/// Key under which the full document text is attached.
pub const RAW_TEXT_KEY: &str = "raw_text";

/// Key under which the aggregate entity confidence is attached.
pub const CONFIDENCE_KEY: &str = "confidence_score";

/// One value in the intermediate tree.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum EntityNode {
    Text(String),
    Number(f32),
    Map(EntityMap),
    /// Same entity type seen more than once, in encounter order.
    List(Vec<EntityNode>),
}

impl EntityNode {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&EntityMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// Insertion-ordered mapping from entity type to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityMap {
    entries: Vec<(String, EntityNode)>,
}

impl EntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&EntityNode> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Insert `value` under `key`. A repeated key turns the existing value
    /// into a sequence (if it isn't one already) and appends.
    pub fn insert_merged(&mut self, key: &str, value: EntityNode) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => match existing {
                EntityNode::List(items) => items.push(value),
                _ => {
                    let first = std::mem::replace(existing, EntityNode::List(Vec::new()));
                    *existing = EntityNode::List(vec![first, value]);
                }
            },
            None => self.entries.push((key.to_string(), value)),
        }
    }

    /// Insert or overwrite without merging.
    pub fn set(&mut self, key: &str, value: EntityNode) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }
}

impl Serialize for EntityMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Value of a single entity: nested map when it carries properties,
/// otherwise its text.
fn entity_value(entity: &Entity) -> EntityNode {
    if entity.properties.is_empty() {
        EntityNode::Text(entity.value_text().to_string())
    } else {
        EntityNode::Map(build_entity_tree(&entity.properties))
    }
}

/// Build the intermediate tree from entities in source order.
pub fn build_entity_tree(entities: &[Entity]) -> EntityMap {
    let mut tree = EntityMap::new();
    for entity in entities {
        tree.insert_merged(&entity.entity_type, entity_value(entity));
    }
    tree
}

/// Build the tree for a whole processed document, attaching the full text
/// and the aggregate confidence of the top-level entities.
pub fn build_document_tree(document: &ProcessedDocument) -> EntityMap {
    let mut tree = build_entity_tree(&document.entities);
    tree.set(RAW_TEXT_KEY, EntityNode::Text(document.text.clone()));

    if let Some(score) = aggregate_confidence(&entity_confidences(&document.entities)) {
        tree.set(CONFIDENCE_KEY, EntityNode::Number(score));
    }

    tree
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> EntityNode {
        EntityNode::Text(s.to_string())
    }

    #[test]
    fn repeated_type_collects_in_order() {
        let tree = build_entity_tree(&[
            Entity::text("diagnosis", "A"),
            Entity::text("diagnosis", "B"),
        ]);
        assert_eq!(tree.get("diagnosis"), Some(&EntityNode::List(vec![text("A"), text("B")])));
    }

    #[test]
    fn single_type_is_not_wrapped() {
        let tree = build_entity_tree(&[Entity::text("diagnosis", "A")]);
        assert_eq!(tree.get("diagnosis"), Some(&text("A")));
    }

    #[test]
    fn third_occurrence_appends_to_existing_list() {
        let tree = build_entity_tree(&[
            Entity::text("notes", "one"),
            Entity::text("notes", "two"),
            Entity::text("notes", "three"),
        ]);
        assert_eq!(
            tree.get("notes"),
            Some(&EntityNode::List(vec![text("one"), text("two"), text("three")]))
        );
    }

    #[test]
    fn properties_become_nested_map_with_merge() {
        let tree = build_entity_tree(&[Entity::group(
            "patient",
            vec![
                Entity::text("name", "OLAGBEGI, ADEDOYIN"),
                Entity::text("phone", "555-0100"),
                Entity::text("phone", "555-0199"),
            ],
        )]);

        let patient = tree.get("patient").and_then(EntityNode::as_map).unwrap();
        assert_eq!(patient.get("name"), Some(&text("OLAGBEGI, ADEDOYIN")));
        assert_eq!(
            patient.get("phone"),
            Some(&EntityNode::List(vec![text("555-0100"), text("555-0199")]))
        );
    }

    #[test]
    fn nested_properties_recurse() {
        let tree = build_entity_tree(&[Entity::group(
            "originating_provider",
            vec![Entity::group(
                "address",
                vec![Entity::text("city", "Austin")],
            )],
        )]);
        let provider = tree.get("originating_provider").and_then(EntityNode::as_map).unwrap();
        let address = provider.get("address").and_then(EntityNode::as_map).unwrap();
        assert_eq!(address.get("city"), Some(&text("Austin")));
    }

    #[test]
    fn normalized_text_wins_over_mention() {
        let tree = build_entity_tree(&[
            Entity::text("referral_date", "Oct 3, 2024").with_normalized("2024-10-03"),
        ]);
        assert_eq!(tree.get("referral_date"), Some(&text("2024-10-03")));
    }

    #[test]
    fn repeated_groups_collect_maps() {
        let tree = build_entity_tree(&[
            Entity::group("patient", vec![Entity::text("name", "First")]),
            Entity::group("patient", vec![Entity::text("name", "Second")]),
        ]);
        match tree.get("patient") {
            Some(EntityNode::List(items)) => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[1].as_map().unwrap().get("name"), Some(&text("Second")));
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn key_order_follows_first_encounter() {
        let tree = build_entity_tree(&[
            Entity::text("b", "1"),
            Entity::text("a", "2"),
            Entity::text("b", "3"),
        ]);
        assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn document_tree_attaches_text_and_confidence() {
        let doc = ProcessedDocument {
            text: "full text".into(),
            entities: vec![
                Entity::text("notes", "x").with_confidence(0.9),
                Entity::text("order_name", "y").with_confidence(0.7),
            ],
        };
        let tree = build_document_tree(&doc);
        assert_eq!(tree.get(RAW_TEXT_KEY), Some(&text("full text")));
        match tree.get(CONFIDENCE_KEY) {
            Some(EntityNode::Number(n)) => assert!((n - 0.8).abs() < 1e-6),
            other => panic!("expected number, got {other:?}"),
        }
    }

    #[test]
    fn document_tree_without_confidence_has_no_score() {
        let tree = build_document_tree(&ProcessedDocument::default());
        assert!(tree.get(CONFIDENCE_KEY).is_none());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn serializes_as_plain_json() {
        let tree = build_entity_tree(&[
            Entity::text("diagnosis", "A"),
            Entity::text("diagnosis", "B"),
            Entity::group("patient", vec![Entity::text("sex", "F")]),
        ]);
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"diagnosis": ["A", "B"], "patient": {"sex": "F"}})
        );
    }
}
