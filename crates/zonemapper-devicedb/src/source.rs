//! Registry source interface
//!
//! The host owns the device and entity registries; the card only reads them
//! through this trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RegistryResult;
use crate::model::{DeviceEntry, EntityEntry};

/// Async access to the host registries.
#[async_trait]
pub trait RegistrySource: Send + Sync {
    /// Lists every device in the host registry.
    async fn list_devices(&self) -> RegistryResult<Vec<DeviceEntry>>;

    /// Lists every entity in the host registry.
    async fn list_entities(&self) -> RegistryResult<Vec<EntityEntry>>;
}

/// A source backed by registry dumps the host already holds in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistrySource {
    devices: Vec<DeviceEntry>,
    entities: Vec<EntityEntry>,
}

impl StaticRegistrySource {
    pub fn new(devices: Vec<DeviceEntry>, entities: Vec<EntityEntry>) -> Self {
        Self { devices, entities }
    }

    /// Decodes registry list responses.
    ///
    /// A response that is not an array is treated as an empty registry, so a
    /// host that returns `null` yields no devices instead of an error.
    pub fn from_json(devices: Value, entities: Value) -> RegistryResult<Self> {
        let devices = if devices.is_array() {
            serde_json::from_value(devices)?
        } else {
            Vec::new()
        };
        let entities = if entities.is_array() {
            serde_json::from_value(entities)?
        } else {
            Vec::new()
        };
        Ok(Self { devices, entities })
    }
}

#[async_trait]
impl RegistrySource for StaticRegistrySource {
    async fn list_devices(&self) -> RegistryResult<Vec<DeviceEntry>> {
        Ok(self.devices.clone())
    }

    async fn list_entities(&self) -> RegistryResult<Vec<EntityEntry>> {
        Ok(self.entities.clone())
    }
}
