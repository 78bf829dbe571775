//! # Zone Mapper
//!
//! An interactive 2D zone editor for presence sensors. Users draw named
//! rectangle, ellipse and polygon zones over the sensor's coordinate space,
//! see its field-of-view cone and live tracked targets, and every edit is
//! written through to a host backend.
//!
//! ## Architecture
//!
//! Zone Mapper is organized as a workspace with multiple crates:
//!
//! 1. **zonemapper-core** - Units, geometry, host state, location keys, events
//! 2. **zonemapper-settings** - Card configuration and resolved settings
//! 3. **zonemapper-devicedb** - Device/entity registries and pair suggestion
//! 4. **zonemapper-designer** - Viewport, renderers, drawing state machine,
//!    zone store and the `ZoneMapper` view-model
//! 5. **zonemapper** - Facade that re-exports the crates and sets up logging

pub use zonemapper_core as core;
pub use zonemapper_designer as designer;
pub use zonemapper_devicedb as devicedb;
pub use zonemapper_settings as settings;

pub use zonemapper_core::{
    AppEvent, Axis, Bounds, Cone, EntityPair, EntityState, Error, EventBus, EventFilter,
    LengthUnit, Point, Result, StateSnapshot, SubscriptionGuard,
};
pub use zonemapper_designer::{
    render_scene, DrawKey, DrawMode, DrawOutcome, PointerEvent, RecordingBackend, Scene,
    UpdateZoneRequest, ZoneBackend, ZoneGeometry, ZoneMapper, ZoneShape,
};
pub use zonemapper_devicedb::{DeviceRegistry, RegistrySource, StaticRegistrySource};
pub use zonemapper_settings::{CardConfig, CardSettings, ConfigError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Installs a registry with an `EnvFilter` (RUST_LOG, INFO by default) and a
/// pretty console layer. Fails if a global subscriber is already set.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
        assert!(BUILD_DATE.ends_with("UTC"));
    }

    #[test]
    fn test_stub_config_builds_a_mapper() {
        let config = CardConfig::stub();
        let backend = std::sync::Arc::new(RecordingBackend::new());
        let mut mapper = ZoneMapper::new(&config, backend).unwrap();
        assert_eq!(mapper.location(), "Office");
        let scene = mapper.render();
        assert_eq!((scene.width, scene.height), (800, 800));
    }
}
