//! Backend persistence interface.
//!
//! Every edit is mirrored to the host through a single `update_zone` call
//! whose payload only carries the fields relevant to that edit. Calls are
//! fire-and-forget: local state is updated first, a failed call is logged and
//! not retried.

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use zonemapper_core::{complete_pairs, EntityPair};

use crate::model::{ZoneGeometry, ZoneShape};

/// Payload of one `update_zone` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateZoneRequest {
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<ZoneShape>,
    /// `Some(None)` serializes as an explicit `null`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Option<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<EntityPair>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<bool>,
}

impl UpdateZoneRequest {
    fn base(location: &str) -> Self {
        Self {
            location: location.to_string(),
            zone_id: None,
            shape: None,
            data: None,
            name: None,
            rotation_deg: None,
            entities: None,
            delete: None,
        }
    }

    /// Geometry commit or clear (`None`), with the complete tracked pairs.
    pub fn geometry(
        location: &str,
        zone_id: i64,
        geometry: Option<&ZoneGeometry>,
        pairs: &[EntityPair],
    ) -> Self {
        Self {
            zone_id: Some(zone_id),
            shape: Some(geometry.map_or(ZoneShape::None, ZoneGeometry::shape)),
            data: Some(geometry.map(ZoneGeometry::to_data)),
            entities: Some(complete_pairs(pairs)),
            ..Self::base(location)
        }
    }

    /// Empty zone announced when a zone is added.
    pub fn new_zone(location: &str, zone_id: i64, name: &str) -> Self {
        Self {
            zone_id: Some(zone_id),
            shape: Some(ZoneShape::None),
            data: Some(None),
            name: Some(name.to_string()),
            ..Self::base(location)
        }
    }

    pub fn rename(location: &str, zone_id: i64, name: &str) -> Self {
        Self {
            zone_id: Some(zone_id),
            name: Some(name.to_string()),
            ..Self::base(location)
        }
    }

    pub fn delete(location: &str, zone_id: i64) -> Self {
        Self {
            zone_id: Some(zone_id),
            delete: Some(true),
            ..Self::base(location)
        }
    }

    pub fn rotation(location: &str, rotation_deg: f64) -> Self {
        Self {
            rotation_deg: Some(rotation_deg),
            ..Self::base(location)
        }
    }

    pub fn entities(location: &str, pairs: &[EntityPair]) -> Self {
        Self {
            entities: Some(complete_pairs(pairs)),
            ..Self::base(location)
        }
    }

    /// JSON form of the call, as sent to the host.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Host persistence collaborator.
pub trait ZoneBackend: Send + Sync {
    /// Persists one edit.
    fn update_zone(&self, request: &UpdateZoneRequest) -> zonemapper_core::Result<()>;

    /// Blocking user alert, used when no notice subscriber is listening.
    fn alert(&self, _message: &str) {}
}

/// Backend that keeps every call in memory.
///
/// Useful for hosts without persistence and for tests.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<UpdateZoneRequest>>,
    alerts: Mutex<Vec<String>>,
    fail_with: Mutex<Option<String>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<UpdateZoneRequest> {
        self.calls.lock().clone()
    }

    pub fn last_call(&self) -> Option<UpdateZoneRequest> {
        self.calls.lock().last().cloned()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
        self.alerts.lock().clear();
    }

    /// Makes subsequent calls fail with `reason` (still recorded).
    pub fn fail_with(&self, reason: Option<&str>) {
        *self.fail_with.lock() = reason.map(str::to_string);
    }
}

impl ZoneBackend for RecordingBackend {
    fn update_zone(&self, request: &UpdateZoneRequest) -> zonemapper_core::Result<()> {
        self.calls.lock().push(request.clone());
        match self.fail_with.lock().as_ref() {
            Some(reason) => Err(zonemapper_core::Error::Backend(reason.clone())),
            None => Ok(()),
        }
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_geometry_payload() {
        let rect = ZoneGeometry::rect(-1000.0, 1000.0, 2000.0, 4000.0);
        let req = UpdateZoneRequest::geometry("Office", 1, Some(&rect), &[]);
        assert_eq!(
            req.to_value(),
            json!({
                "location": "Office",
                "zone_id": 1,
                "shape": "rect",
                "data": {"x_min": -1000.0, "x_max": 2000.0, "y_min": 1000.0, "y_max": 4000.0},
                "entities": []
            })
        );
    }

    #[test]
    fn test_clear_payload_has_null_data() {
        let pairs = vec![EntityPair::new("a", "b"), EntityPair::new("c", "")];
        let req = UpdateZoneRequest::geometry("Office", 2, None, &pairs);
        assert_eq!(
            req.to_value(),
            json!({
                "location": "Office",
                "zone_id": 2,
                "shape": "none",
                "data": null,
                "entities": [{"x": "a", "y": "b"}]
            })
        );
    }

    #[test]
    fn test_small_payloads() {
        assert_eq!(
            UpdateZoneRequest::delete("Office", 3).to_value(),
            json!({"location": "Office", "zone_id": 3, "delete": true})
        );
        assert_eq!(
            UpdateZoneRequest::rotation("Office", -45.0).to_value(),
            json!({"location": "Office", "rotation_deg": -45.0})
        );
        assert_eq!(
            UpdateZoneRequest::new_zone("Office", 4, "Zone 4").to_value(),
            json!({"location": "Office", "zone_id": 4, "shape": "none", "data": null, "name": "Zone 4"})
        );
    }

    #[test]
    fn test_recording_backend_failure() {
        let backend = RecordingBackend::new();
        backend.fail_with(Some("offline"));
        let result = backend.update_zone(&UpdateZoneRequest::rotation("x", 0.0));
        assert!(result.is_err());
        assert_eq!(backend.calls().len(), 1);
    }
}
