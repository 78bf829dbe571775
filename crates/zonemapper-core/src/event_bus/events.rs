//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so hosts can log or forward them.

use serde::{Deserialize, Serialize};

/// Root event enum for everything the editor announces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// Short user-facing notice (toast).
    Notification(NotificationEvent),
    /// Zone store changes
    Zone(ZoneEvent),
    /// Drawing state machine changes
    Drawing(DrawingEvent),
    /// Cone rotation changes
    Cone(ConeEvent),
}

impl AppEvent {
    /// Convenience constructor for a notice.
    pub fn notify(message: impl Into<String>) -> Self {
        AppEvent::Notification(NotificationEvent {
            message: message.into(),
        })
    }

    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Notification(_) => EventCategory::Notification,
            AppEvent::Zone(_) => EventCategory::Zone,
            AppEvent::Drawing(_) => EventCategory::Drawing,
            AppEvent::Cone(_) => EventCategory::Cone,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Notification(e) => e.message.clone(),
            AppEvent::Zone(e) => e.description(),
            AppEvent::Drawing(e) => e.description(),
            AppEvent::Cone(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// User-facing notices.
    Notification,
    /// Zone store events.
    Zone,
    /// Drawing state events.
    Drawing,
    /// Cone rotation events.
    Cone,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Notification => write!(f, "Notification"),
            EventCategory::Zone => write!(f, "Zone"),
            EventCategory::Drawing => write!(f, "Drawing"),
            EventCategory::Cone => write!(f, "Cone"),
        }
    }
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Text shown to the user.
    pub message: String,
}

/// Zone store events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ZoneEvent {
    /// Geometry was drawn and written through to the backend.
    Committed {
        /// Zone id.
        zone_id: i64,
        /// Shape tag (`rect`, `ellipse`, `polygon`).
        shape: String,
    },
    /// A zone's geometry was cleared.
    Cleared {
        /// Zone id.
        zone_id: i64,
    },
    /// Every roster zone was cleared.
    AllCleared {
        /// Number of zones cleared.
        count: usize,
    },
    /// A new zone was appended to the roster.
    Added {
        /// Zone id.
        zone_id: i64,
    },
    /// A zone was renamed locally.
    Renamed {
        /// Zone id.
        zone_id: i64,
        /// New display name.
        name: String,
    },
    /// A zone was deleted.
    Deleted {
        /// Zone id.
        zone_id: i64,
    },
    /// Zone names changed after reconciliation.
    Relabeled,
}

impl ZoneEvent {
    fn description(&self) -> String {
        match self {
            ZoneEvent::Committed { zone_id, shape } => {
                format!("Zone {} committed as {}", zone_id, shape)
            }
            ZoneEvent::Cleared { zone_id } => format!("Zone {} cleared", zone_id),
            ZoneEvent::AllCleared { count } => format!("{} zones cleared", count),
            ZoneEvent::Added { zone_id } => format!("Zone {} added", zone_id),
            ZoneEvent::Renamed { zone_id, name } => {
                format!("Zone {} renamed to {}", zone_id, name)
            }
            ZoneEvent::Deleted { zone_id } => format!("Zone {} deleted", zone_id),
            ZoneEvent::Relabeled => "Zone labels refreshed".to_string(),
        }
    }
}

/// Drawing state machine events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawingEvent {
    /// An in-progress gesture was dropped without committing.
    Cancelled,
    /// The lock flag changed.
    LockChanged {
        /// Whether drawing is now locked.
        locked: bool,
    },
    /// The draw mode changed.
    ModeChanged {
        /// Mode tag (`rect`, `ellipse`, `polygon`).
        mode: String,
    },
}

impl DrawingEvent {
    fn description(&self) -> String {
        match self {
            DrawingEvent::Cancelled => "Drawing cancelled".to_string(),
            DrawingEvent::LockChanged { locked } => {
                if *locked {
                    "Drawing locked".to_string()
                } else {
                    "Drawing unlocked".to_string()
                }
            }
            DrawingEvent::ModeChanged { mode } => format!("Draw mode: {}", mode),
        }
    }
}

/// Cone rotation events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConeEvent {
    /// The rotation angle changed.
    Rotated {
        /// New clamped angle in degrees.
        angle_deg: f64,
        /// Whether the new angle was sent to the backend.
        persisted: bool,
    },
}

impl ConeEvent {
    fn description(&self) -> String {
        match self {
            ConeEvent::Rotated {
                angle_deg,
                persisted,
            } => {
                if *persisted {
                    format!("Cone rotation saved at {}°", angle_deg)
                } else {
                    format!("Cone rotated to {}°", angle_deg)
                }
            }
        }
    }
}
