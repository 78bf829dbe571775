//! # Zone Mapper Core
//!
//! Shared building blocks for the zone mapper editor: length units and
//! formatting, world geometry value types, the host state snapshot, location
//! slugs, error types, and the per-instance event bus.

pub mod error;
pub mod event_bus;
pub mod geometry;
pub mod host;
pub mod location;
pub mod units;

pub use error::{Error, Result};
pub use event_bus::{
    AppEvent, ConeEvent, DrawingEvent, EventBus, EventBusConfig, EventBusError, EventCategory,
    EventFilter, NotificationEvent, SubscriptionGuard, SubscriptionId, ZoneEvent,
};
pub use geometry::{point_on_arc, Axis, Bounds, Cone, Point};
pub use host::{complete_pairs, EntityPair, EntityState, StateSnapshot};
pub use location::{discover_zone_ids, parse_zone_state_key, slugify_location, zone_state_key};
pub use units::{
    format_grid_value, format_number, format_tick_label, from_canonical, normalize_unit,
    to_canonical, LengthUnit,
};
