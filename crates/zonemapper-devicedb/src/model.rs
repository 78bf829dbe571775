use serde::{Deserialize, Serialize};

/// One device from the host's device registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_by_user: Option<String>,
}

impl DeviceEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            name_by_user: None,
        }
    }

    /// User-assigned name, else the integration name, else the id.
    pub fn display_name(&self) -> &str {
        [&self.name_by_user, &self.name]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|name| !name.is_empty())
            .unwrap_or(&self.id)
    }
}

impl std::fmt::Display for DeviceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One entity from the host's entity registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityEntry {
    pub entity_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl EntityEntry {
    pub fn new(entity_id: impl Into<String>, device_id: Option<&str>) -> Self {
        Self {
            entity_id: entity_id.into(),
            device_id: device_id.map(str::to_string),
        }
    }

    pub fn belongs_to(&self, device_id: &str) -> bool {
        self.device_id.as_deref() == Some(device_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_precedence() {
        let mut device = DeviceEntry::new("abc123", "LD2450");
        assert_eq!(device.display_name(), "LD2450");

        device.name_by_user = Some("Office radar".into());
        assert_eq!(device.display_name(), "Office radar");

        let bare = DeviceEntry {
            id: "abc123".into(),
            name: None,
            name_by_user: Some(String::new()),
        };
        assert_eq!(bare.display_name(), "abc123");
    }

    #[test]
    fn test_entity_decodes_without_device() {
        let entity: EntityEntry =
            serde_json::from_str(r#"{"entity_id": "sensor.outside_temp"}"#).unwrap();
        assert_eq!(entity.device_id, None);
        assert!(!entity.belongs_to("abc"));
    }
}
