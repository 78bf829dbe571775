//! Reconciliation of backend-reported zone state.
//!
//! The backend publishes one state record per zone under
//! [`zone_state_key`]. Its attributes are the source of truth for geometry on
//! (re)connect; names and cone rotation are pulled when they differ, and
//! tracked pairs are only offered back to the caller.

use serde_json::Value;
use tracing::{debug, info, warn};
use zonemapper_core::{discover_zone_ids, zone_state_key, Cone, EntityPair, StateSnapshot};

use crate::model::ZoneGeometry;
use crate::roster::ZoneRoster;
use crate::zone_store::ZoneStore;

/// What a reconciliation pass changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// Ids added to an empty roster by discovery.
    pub discovered: Vec<i64>,
    /// Zones whose geometry was inserted or replaced.
    pub updated: Vec<i64>,
    /// Zones whose geometry was removed.
    pub removed: Vec<i64>,
    /// Whether any roster name changed.
    pub relabeled: bool,
    /// Clamped rotation from the last record carrying one.
    pub rotation_deg: Option<f64>,
    /// Complete pairs from the last record carrying a non-empty list.
    pub restored_pairs: Option<Vec<EntityPair>>,
    /// Records whose geometry could not be decoded.
    pub malformed: usize,
}

impl ReconcileReport {
    pub fn has_changes(&self) -> bool {
        !self.discovered.is_empty()
            || !self.updated.is_empty()
            || !self.removed.is_empty()
            || self.relabeled
            || self.rotation_deg.is_some()
            || self.restored_pairs.is_some()
    }
}

fn decode_pairs(value: &Value) -> Option<Vec<EntityPair>> {
    let items = value.as_array().filter(|items| !items.is_empty())?;
    Some(
        items
            .iter()
            .filter_map(|item| serde_json::from_value::<EntityPair>(item.clone()).ok())
            .filter(EntityPair::is_complete)
            .collect(),
    )
}

/// Merges the zone records found in `states` into `roster` and `store`.
///
/// An empty roster is first filled from the zone ids discovered for
/// `location`. Rotation and restored pairs are returned in the report for the
/// caller to apply.
pub fn reconcile(
    location: &str,
    states: &StateSnapshot,
    roster: &mut ZoneRoster,
    store: &mut ZoneStore,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    if roster.is_empty() {
        let ids = discover_zone_ids(location, states.entity_ids());
        if !ids.is_empty() {
            debug!("Discovered {} zones for {}", ids.len(), location);
            *roster = ZoneRoster::from_discovered(ids.clone());
            report.discovered = ids;
        }
    }

    let mut ids = roster.ids();
    ids.sort_unstable();
    for id in ids {
        let key = zone_state_key(location, id);
        let Some(state) = states.get(&key) else {
            continue;
        };

        if let Some(shape) = state.attribute("shape") {
            let shape = shape.as_str().unwrap_or_default();
            let data = state.attribute("data").unwrap_or(&Value::Null);
            match ZoneGeometry::from_wire(shape, data) {
                Ok(Some(geometry)) => {
                    if store.upsert(id, geometry) {
                        report.updated.push(id);
                    }
                }
                Ok(None) => {
                    if store.remove(id).is_some() {
                        report.removed.push(id);
                    }
                }
                Err(e) => {
                    warn!("Ignoring zone {} state from {}: {}", id, key, e);
                    report.malformed += 1;
                }
            }
        }

        if let Some(name) = state
            .attribute("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
        {
            report.relabeled |= roster.relabel(id, name);
        }

        if let Some(rotation) = state.attribute("rotation_deg").and_then(Value::as_f64) {
            report.rotation_deg = Some(Cone::clamp_angle(rotation.round()));
        }

        if let Some(pairs) = state.attribute("entities").and_then(decode_pairs) {
            report.restored_pairs = Some(pairs);
        }
    }

    if report.has_changes() {
        info!(
            "Reconciled {}: {} updated, {} removed, relabeled: {}",
            location,
            report.updated.len(),
            report.removed.len(),
            report.relabeled
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use zonemapper_core::EntityState;
    use zonemapper_settings::ZoneSeed;

    fn zone_state(attrs: Value) -> EntityState {
        let map = match attrs {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        EntityState::new("ok").with_attributes(map)
    }

    #[test]
    fn test_discovery_fills_empty_roster() {
        let states = StateSnapshot::new()
            .with("sensor.zone_mapper_office_zone_3", zone_state(json!({})))
            .with("sensor.zone_mapper_office_zone_1", zone_state(json!({})))
            .with("sensor.zone_mapper_kitchen_zone_2", zone_state(json!({})));
        let mut roster = ZoneRoster::default();
        let mut store = ZoneStore::new();
        let report = reconcile("Office", &states, &mut roster, &mut store);
        assert_eq!(report.discovered, vec![1, 3]);
        assert_eq!(roster.ids(), vec![1, 3]);
        assert_eq!(roster.label(3), "Zone 3");
    }

    #[test]
    fn test_configured_roster_skips_discovery() {
        let states = StateSnapshot::new().with(
            "sensor.zone_mapper_office_zone_2",
            zone_state(json!({"shape": "rect", "data": {"x_min": 0, "x_max": 10, "y_min": 0, "y_max": 10}})),
        );
        let mut roster = ZoneRoster::new(vec![ZoneSeed::new(1, "Desk")]);
        let mut store = ZoneStore::new();
        let report = reconcile("Office", &states, &mut roster, &mut store);
        assert!(report.discovered.is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_geometry_names_and_rotation() {
        let states = StateSnapshot::new()
            .with(
                "sensor.zone_mapper_office_zone_1",
                zone_state(json!({
                    "shape": "rect",
                    "data": {"x_min": 2000, "x_max": -1000, "y_min": 1000, "y_max": 4000},
                    "name": "Desk",
                    "rotation_deg": 270.4
                })),
            )
            .with(
                "sensor.zone_mapper_office_zone_2",
                zone_state(json!({"shape": "none", "data": null})),
            );
        let mut roster = ZoneRoster::new(vec![ZoneSeed::new(1, "Zone 1"), ZoneSeed::new(2, "Bed")]);
        let mut store = ZoneStore::new();
        store.upsert(2, ZoneGeometry::ellipse(0.0, 0.0, 10.0, 10.0));

        let report = reconcile("Office", &states, &mut roster, &mut store);
        assert_eq!(report.updated, vec![1]);
        assert_eq!(report.removed, vec![2]);
        assert!(report.relabeled);
        assert_eq!(report.rotation_deg, Some(180.0));
        assert_eq!(roster.label(1), "Desk");
        assert_eq!(
            store.get(1).map(|z| z.geometry.clone()),
            Some(ZoneGeometry::rect(-1000.0, 1000.0, 2000.0, 4000.0))
        );
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let states = StateSnapshot::new().with(
            "sensor.zone_mapper_office_zone_1",
            zone_state(json!({"shape": "polygon", "data": {"points": [{"x": 0, "y": 0}]}})),
        );
        let mut roster = ZoneRoster::new(vec![ZoneSeed::new(1, "A")]);
        let mut store = ZoneStore::new();
        store.upsert(1, ZoneGeometry::rect(0.0, 0.0, 5.0, 5.0));
        let report = reconcile("Office", &states, &mut roster, &mut store);
        assert_eq!(report.malformed, 1);
        assert!(store.contains(1));
    }

    #[test]
    fn test_pairs_keep_only_complete() {
        let states = StateSnapshot::new().with(
            "sensor.zone_mapper_office_zone_1",
            zone_state(json!({"entities": [{"x": "sensor.a_x", "y": "sensor.a_y"}, {"x": "sensor.b_x"}]})),
        );
        let mut roster = ZoneRoster::new(vec![ZoneSeed::new(1, "A")]);
        let report = reconcile("Office", &states, &mut roster, &mut ZoneStore::new());
        assert_eq!(
            report.restored_pairs,
            Some(vec![EntityPair::new("sensor.a_x", "sensor.a_y")])
        );
        assert!(report.has_changes());
    }
}
