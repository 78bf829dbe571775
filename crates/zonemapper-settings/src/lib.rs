//! Zone Mapper Settings Crate
//!
//! Parses the card configuration supplied by the host and resolves it into
//! validated, canonical-unit settings.

pub mod config;
pub mod error;

pub use config::{
    process_entity_config, CardConfig, CardSettings, ConeSection, ConfigValue, GridSection,
    ZoneSeed, DEFAULT_UNIT_LABEL_SIZE,
};
pub use error::{ConfigError, ConfigResult};
