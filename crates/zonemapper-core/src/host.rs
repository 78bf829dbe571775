//! Host-side state as seen by the card.
//!
//! The host hands the card a snapshot of entity states on every update. The
//! card only reads from it; nothing here is mutated by the editor.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// One external entity state record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityState {
    /// Raw state string as reported by the host.
    #[serde(default)]
    pub state: String,
    /// Free-form attributes.
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl EntityState {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            attributes: Map::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Parses the state as a finite number.
    ///
    /// `unknown`, `unavailable`, blank and non-numeric states yield `None`.
    pub fn numeric(&self) -> Option<f64> {
        let text = self.state.trim();
        if text.is_empty() || text == "unknown" || text == "unavailable" {
            return None;
        }
        text.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }
}

/// Snapshot of every entity state the host currently knows about.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateSnapshot {
    states: HashMap<String, EntityState>,
}

impl StateSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity_id: impl Into<String>, state: EntityState) {
        self.states.insert(entity_id.into(), state);
    }

    pub fn with(mut self, entity_id: impl Into<String>, state: EntityState) -> Self {
        self.insert(entity_id, state);
        self
    }

    pub fn get(&self, entity_id: &str) -> Option<&EntityState> {
        self.states.get(entity_id)
    }

    /// Numeric state of an entity, if present and parseable.
    pub fn numeric(&self, entity_id: &str) -> Option<f64> {
        self.get(entity_id).and_then(EntityState::numeric)
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl FromIterator<(String, EntityState)> for StateSnapshot {
    fn from_iter<T: IntoIterator<Item = (String, EntityState)>>(iter: T) -> Self {
        Self {
            states: iter.into_iter().collect(),
        }
    }
}

/// Two external scalar sensors read as one live 2D position.
///
/// Either side may be blank while the user is still editing the pair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityPair {
    #[serde(default)]
    pub x: String,
    #[serde(default)]
    pub y: String,
}

impl EntityPair {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.x.trim().is_empty() && !self.y.trim().is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.x.trim().is_empty() && self.y.trim().is_empty()
    }
}

/// Keeps only pairs with both sides set.
pub fn complete_pairs(pairs: &[EntityPair]) -> Vec<EntityPair> {
    pairs.iter().filter(|p| p.is_complete()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_state_parsing() {
        assert_eq!(EntityState::new("1250").numeric(), Some(1250.0));
        assert_eq!(EntityState::new(" -3.5 ").numeric(), Some(-3.5));
        assert_eq!(EntityState::new("unknown").numeric(), None);
        assert_eq!(EntityState::new("unavailable").numeric(), None);
        assert_eq!(EntityState::new("12abc").numeric(), None);
        assert_eq!(EntityState::new("").numeric(), None);
        assert_eq!(EntityState::new("inf").numeric(), None);
    }

    #[test]
    fn test_snapshot_deserializes_from_host_json() {
        let snapshot: StateSnapshot = serde_json::from_value(json!({
            "sensor.target_x": {"state": "3000"},
            "sensor.zone_mapper_office_zone_1": {
                "state": "rect",
                "attributes": {"shape": "rect", "name": "Desk"}
            }
        }))
        .unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.numeric("sensor.target_x"), Some(3000.0));
        let zone = snapshot.get("sensor.zone_mapper_office_zone_1").unwrap();
        assert!(zone.has_attribute("shape"));
        assert_eq!(zone.attribute("name"), Some(&json!("Desk")));
    }

    #[test]
    fn test_pair_completeness() {
        assert!(EntityPair::new("sensor.x", "sensor.y").is_complete());
        assert!(!EntityPair::new("sensor.x", " ").is_complete());
        assert!(EntityPair::default().is_empty());
        let pairs = vec![
            EntityPair::new("a", "b"),
            EntityPair::new("c", ""),
            EntityPair::new("d", "e"),
        ];
        assert_eq!(complete_pairs(&pairs).len(), 2);
    }
}
