use async_trait::async_trait;
use serde_json::json;
use zonemapper_devicedb::{
    DeviceEntry, DeviceRegistry, EntityEntry, RegistryError, RegistryResult, RegistrySource,
    StaticRegistrySource,
};

struct FailingSource;

#[async_trait]
impl RegistrySource for FailingSource {
    async fn list_devices(&self) -> RegistryResult<Vec<DeviceEntry>> {
        Ok(vec![DeviceEntry::new("radar", "LD2450")])
    }

    async fn list_entities(&self) -> RegistryResult<Vec<EntityEntry>> {
        Err(RegistryError::fetch("entity", "connection lost"))
    }
}

#[tokio::test]
async fn load_from_json_dumps() {
    let source = StaticRegistrySource::from_json(
        json!([
            {"id": "radar", "name": "LD2450", "name_by_user": "Office radar"},
            {"id": "plug", "name": null}
        ]),
        json!([
            {"entity_id": "sensor.target_1_x", "device_id": "radar"},
            {"entity_id": "sensor.target_1_y", "device_id": "radar"},
            {"entity_id": "sun.sun"}
        ]),
    )
    .expect("registry dumps decode");

    let registry = DeviceRegistry::load(&source).await.expect("load succeeds");
    assert_eq!(registry.devices().len(), 2);
    assert_eq!(registry.devices()[0].display_name(), "Office radar");
    assert_eq!(registry.devices()[1].display_name(), "plug");
    assert_eq!(registry.entity_options(Some("radar")).len(), 2);
}

#[tokio::test]
async fn non_array_responses_are_empty() {
    let source = StaticRegistrySource::from_json(json!(null), json!({"error": true}))
        .expect("non-arrays are tolerated");
    let registry = DeviceRegistry::load(&source).await.expect("load succeeds");
    assert!(registry.is_empty());
}

#[tokio::test]
async fn failure_in_either_registry_fails_the_load() {
    let err = DeviceRegistry::load(&FailingSource).await.unwrap_err();
    assert!(matches!(err, RegistryError::Fetch { .. }));
}

#[test]
fn malformed_entries_fail_to_decode() {
    let err = StaticRegistrySource::from_json(json!([{"name": "no id"}]), json!([])).unwrap_err();
    assert!(matches!(err, RegistryError::Decode(_)));
}
