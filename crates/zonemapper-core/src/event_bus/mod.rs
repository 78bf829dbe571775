//! # Event Bus Module
//!
//! Publish/subscribe plumbing between the editor view-model and its host.
//!
//! ## Usage
//!
//! ```rust
//! use zonemapper_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter};
//!
//! let bus = EventBus::new();
//! let guard = bus.subscribe_scoped(
//!     EventFilter::Categories(vec![EventCategory::Notification]),
//!     |event| println!("{}", event.description()),
//! );
//!
//! bus.publish(AppEvent::notify("Zone 1 saved")).ok();
//!
//! // Dropping the guard removes the handler.
//! drop(guard);
//! assert_eq!(bus.subscriber_count(), 0);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
