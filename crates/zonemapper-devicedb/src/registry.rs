//! Loaded registry snapshot and lookups.

use zonemapper_core::EntityPair;

use crate::error::RegistryResult;
use crate::model::{DeviceEntry, EntityEntry};
use crate::source::RegistrySource;

/// Devices and entities fetched from the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceRegistry {
    devices: Vec<DeviceEntry>,
    entities: Vec<EntityEntry>,
}

impl DeviceRegistry {
    pub fn new(devices: Vec<DeviceEntry>, entities: Vec<EntityEntry>) -> Self {
        Self { devices, entities }
    }

    /// Fetches both registries concurrently.
    pub async fn load(source: &dyn RegistrySource) -> RegistryResult<Self> {
        let (devices, entities) = tokio::try_join!(source.list_devices(), source.list_entities())?;
        tracing::debug!(
            "Loaded registries: {} devices, {} entities",
            devices.len(),
            entities.len()
        );
        Ok(Self { devices, entities })
    }

    pub fn devices(&self) -> &[DeviceEntry] {
        &self.devices
    }

    pub fn entities(&self) -> &[EntityEntry] {
        &self.entities
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.entities.is_empty()
    }

    pub fn device(&self, device_id: &str) -> Option<&DeviceEntry> {
        self.devices.iter().find(|d| d.id == device_id)
    }

    pub fn find_entity(&self, entity_id: &str) -> Option<&EntityEntry> {
        if entity_id.is_empty() {
            return None;
        }
        self.entities.iter().find(|e| e.entity_id == entity_id)
    }

    /// Entities attached to `device_id`, in registry order.
    pub fn device_entities(&self, device_id: &str) -> Vec<&EntityEntry> {
        self.entities
            .iter()
            .filter(|e| e.belongs_to(device_id) && !e.entity_id.is_empty())
            .collect()
    }

    /// Sorted entity ids offered in the X/Y pickers.
    ///
    /// With no device selected every registry entity is offered.
    pub fn entity_options(&self, device_id: Option<&str>) -> Vec<String> {
        let mut ids: Vec<String> = self
            .entities
            .iter()
            .filter(|e| !e.entity_id.is_empty())
            .filter(|e| device_id.is_none_or(|id| e.belongs_to(id)))
            .map(|e| e.entity_id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Device owning the first pair's X entity, or its Y entity.
    pub fn infer_device(&self, pairs: &[EntityPair]) -> Option<String> {
        let first = pairs.first()?;
        self.find_entity(&first.x)
            .or_else(|| self.find_entity(&first.y))
            .and_then(|e| e.device_id.clone())
    }
}
