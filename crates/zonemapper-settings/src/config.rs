//! Card configuration
//!
//! [`CardConfig`] mirrors the options a host passes to the card, loosely
//! typed the way a user's dashboard YAML arrives (numbers may come through as
//! strings). [`CardSettings`] is the resolved form: canonical millimeters,
//! normalized bounds, clamped cone, and parsed entity pairs.
//!
//! Resolution is layered. Applying a config on top of existing settings keeps
//! the previous value for any option that is absent or not a finite number,
//! so a bad edit in the dashboard never wipes a working viewport.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use zonemapper_core::units::{normalize_unit, to_canonical, LengthUnit};
use zonemapper_core::{Bounds, Cone, EntityPair};

use crate::error::{ConfigError, ConfigResult};

/// Default tick/range label size in pixels.
pub const DEFAULT_UNIT_LABEL_SIZE: u32 = 18;
const MIN_UNIT_LABEL_SIZE: f64 = 8.0;
const MAX_UNIT_LABEL_SIZE: f64 = 24.0;

/// A scalar that may arrive as a number or as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Number(f64),
    Text(String),
}

impl ConfigValue {
    /// Finite numeric reading of the value, if any.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            ConfigValue::Number(n) => *n,
            ConfigValue::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    pub fn as_text(&self) -> String {
        match self {
            ConfigValue::Number(n) => zonemapper_core::format_number(*n),
            ConfigValue::Text(text) => text.clone(),
        }
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Number(value)
    }
}

/// A configured zone seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSeed {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ZoneSeed {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }
}

/// Zone seed as written by the user; `id` may be a number or numeric text.
#[derive(Deserialize)]
struct RawZoneSeed {
    #[serde(default)]
    id: Option<ConfigValue>,
    #[serde(default)]
    name: Option<ConfigValue>,
}

impl RawZoneSeed {
    fn into_seed(self) -> Option<ZoneSeed> {
        let id = self.id.as_ref().and_then(ConfigValue::as_f64);
        match id {
            Some(id) if id >= 1.0 && id.fract() == 0.0 && id <= i64::MAX as f64 => Some(ZoneSeed {
                id: id as i64,
                name: self.name.as_ref().map(ConfigValue::as_text),
            }),
            _ => {
                tracing::debug!("Skipping zone seed with invalid id {:?}", self.id);
                None
            }
        }
    }
}

fn deserialize_zone_seeds<'de, D>(deserializer: D) -> Result<Vec<ZoneSeed>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Vec::<RawZoneSeed>::deserialize(deserializer)?;
    Ok(raw.into_iter().filter_map(RawZoneSeed::into_seed).collect())
}

/// `grid:` section, values in `grid_units`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_min: Option<ConfigValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_max: Option<ConfigValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_min: Option<ConfigValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_max: Option<ConfigValue>,
}

/// `cone:` section. `y_max` is in `grid_units`, angles in degrees.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConeSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_max: Option<ConfigValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fov_deg: Option<ConfigValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle_deg: Option<ConfigValue>,
}

/// Raw card configuration as supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardConfig {
    /// Host card type tag, carried through untouched.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    /// Location name. Required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ConfigValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
    #[serde(default)]
    pub unit_display: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_label_size: Option<ConfigValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_units: Option<String>,
    /// Seeds with a missing, non-numeric or non-positive id are dropped.
    #[serde(
        default,
        deserialize_with = "deserialize_zone_seeds",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub zones: Vec<ZoneSeed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cone: Option<ConeSection>,
    /// Use `entities` instead of the interactive device picker.
    #[serde(default)]
    pub direct_entity: bool,
    /// Entries like `{x0: "sensor.a"}`, `{y0: "sensor.b"}`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<BTreeMap<String, String>>,
}

impl CardConfig {
    /// Decodes a configuration from any JSON value the host hands over.
    pub fn from_value(value: serde_json::Value) -> ConfigResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// The configuration a dashboard editor starts from.
    pub fn stub() -> Self {
        Self {
            card_type: Some("custom:zone-mapper-card".to_string()),
            location: Some(ConfigValue::Text("Office".to_string())),
            dark_mode: Some(false),
            unit_display: false,
            unit_label_size: None,
            input_units: Some("mm".to_string()),
            grid_units: Some("mm".to_string()),
            zones: Vec::new(),
            grid: Some(GridSection {
                x_min: Some((-6000.0).into()),
                x_max: Some(6000.0.into()),
                y_min: Some(0.0.into()),
                y_max: Some(12000.0.into()),
            }),
            cone: Some(ConeSection {
                y_max: Some(6000.0.into()),
                fov_deg: Some(120.0.into()),
                angle_deg: Some(0.0.into()),
            }),
            direct_entity: false,
            entities: Vec::new(),
        }
    }

    /// Location name, if present and non-blank.
    pub fn location(&self) -> Option<String> {
        self.location
            .as_ref()
            .map(ConfigValue::as_text)
            .filter(|text| !text.trim().is_empty())
    }
}

/// Resolved card settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CardSettings {
    pub location: String,
    pub dark_mode: bool,
    pub unit_display: bool,
    pub unit_label_size: u32,
    pub input_units: LengthUnit,
    pub grid_units: LengthUnit,
    /// Viewport in canonical millimeters, always normalized.
    pub bounds: Bounds,
    pub cone: Cone,
    /// Angle the rotation slider resets to.
    pub default_cone_angle: f64,
    pub zones: Vec<ZoneSeed>,
    pub direct_entity: bool,
    /// Complete pairs from `entities` when `direct_entity` is set.
    pub entity_pairs: Vec<EntityPair>,
}

impl Default for CardSettings {
    fn default() -> Self {
        Self {
            location: String::new(),
            dark_mode: false,
            unit_display: false,
            unit_label_size: DEFAULT_UNIT_LABEL_SIZE,
            input_units: LengthUnit::Millimeter,
            grid_units: LengthUnit::Millimeter,
            bounds: Bounds::default(),
            cone: Cone::default(),
            default_cone_angle: 0.0,
            zones: Vec::new(),
            direct_entity: false,
            entity_pairs: Vec::new(),
        }
    }
}

impl CardSettings {
    /// Resolves a configuration against built-in defaults.
    pub fn from_config(config: &CardConfig) -> ConfigResult<Self> {
        Self::default().apply(config)
    }

    /// Resolves a configuration on top of these settings.
    ///
    /// Fails only when `location` is missing.
    pub fn apply(&self, config: &CardConfig) -> ConfigResult<Self> {
        let location = config.location().ok_or(ConfigError::MissingLocation)?;
        let mut next = self.clone();

        next.location = location;
        next.input_units = normalize_unit(config.input_units.as_deref());
        next.grid_units = normalize_unit(config.grid_units.as_deref());
        next.unit_display = config.unit_display;
        if let Some(size) = config.unit_label_size.as_ref().and_then(ConfigValue::as_f64) {
            next.unit_label_size = size.round().clamp(MIN_UNIT_LABEL_SIZE, MAX_UNIT_LABEL_SIZE) as u32;
        }
        if let Some(dark) = config.dark_mode {
            next.dark_mode = dark;
        }

        next.zones = config.zones.clone();
        next.direct_entity = config.direct_entity;
        next.entity_pairs = if config.direct_entity {
            process_entity_config(&config.entities)
        } else {
            Vec::new()
        };

        if let Some(grid) = &config.grid {
            next.apply_grid(grid);
        }
        if let Some(cone) = &config.cone {
            next.apply_cone(cone);
        }

        tracing::debug!(
            "Resolved settings for {}: grid {} ({}), cone {}mm/{}°/{}°",
            next.location,
            next.bounds,
            next.grid_units,
            next.cone.range_mm,
            next.cone.fov_deg,
            next.cone.angle_deg
        );
        Ok(next)
    }

    fn to_mm(&self, value: Option<&ConfigValue>) -> Option<f64> {
        value
            .and_then(ConfigValue::as_f64)
            .and_then(|v| to_canonical(v, self.grid_units))
    }

    fn apply_grid(&mut self, grid: &GridSection) {
        let mut bounds = self.bounds;
        if let Some(v) = self.to_mm(grid.x_min.as_ref()) {
            bounds.x_min = v;
        }
        if let Some(v) = self.to_mm(grid.x_max.as_ref()) {
            bounds.x_max = v;
        }
        if let Some(v) = self.to_mm(grid.y_min.as_ref()) {
            bounds.y_min = v;
        }
        if let Some(v) = self.to_mm(grid.y_max.as_ref()) {
            bounds.y_max = v;
        }
        self.bounds = bounds.normalized();
    }

    fn apply_cone(&mut self, cone: &ConeSection) {
        if let Some(range) = self.to_mm(cone.y_max.as_ref()) {
            self.cone.range_mm = range.max(0.0);
        }
        if let Some(fov) = cone.fov_deg.as_ref().and_then(ConfigValue::as_f64) {
            self.cone.fov_deg = Cone::clamp_fov(fov);
        }
        if let Some(raw) = &cone.angle_deg {
            let angle = Cone::clamp_angle(raw.as_f64().unwrap_or(f64::NAN));
            self.default_cone_angle = angle;
            self.cone.angle_deg = angle;
        }
    }
}

fn entity_key_regex() -> &'static Regex {
    static ENTITY_KEY: OnceLock<Regex> = OnceLock::new();
    ENTITY_KEY.get_or_init(|| Regex::new(r"([xy])(\d+)").expect("invalid entity key pattern"))
}

/// Builds entity pairs from `[{x0: id}, {y0: id}, {x1: id}, ...]` entries.
///
/// Entries are grouped by their numeric suffix and returned in suffix order.
/// Pairs missing either side are dropped.
pub fn process_entity_config(entries: &[BTreeMap<String, String>]) -> Vec<EntityPair> {
    let mut pairs: BTreeMap<u64, EntityPair> = BTreeMap::new();
    for (key, value) in entries.iter().flat_map(|entry| entry.iter()) {
        let Some(caps) = entity_key_regex().captures(key) else {
            continue;
        };
        let Ok(index) = caps[2].parse::<u64>() else {
            continue;
        };
        let pair = pairs.entry(index).or_default();
        match &caps[1] {
            "x" => pair.x = value.clone(),
            _ => pair.y = value.clone(),
        }
    }
    pairs.into_values().filter(EntityPair::is_complete).collect()
}
