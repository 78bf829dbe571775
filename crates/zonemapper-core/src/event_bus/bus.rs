//! Event Bus implementation.
//!
//! Each editor instance owns its own [`EventBus`]; there is no process-wide
//! instance. Subscriptions can be held as [`SubscriptionGuard`]s so that
//! dropping the owner tears every listener down in one step.

use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{AppEvent, EventCategory};

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

/// Filter to receive only specific event types
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    /// Receive all events.
    #[default]
    All,
    /// Receive events matching any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    /// Check if an event matches this filter
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type EventHandler = Box<dyn Fn(AppEvent) + Send + Sync>;
type HandlerMap = HashMap<SubscriptionId, (EventFilter, EventHandler)>;

/// Configuration for the event bus
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Channel capacity for broadcast.
    pub channel_capacity: usize,
    /// Whether to keep event history.
    pub enable_history: bool,
    /// Maximum number of events to retain in history.
    pub max_history_size: usize,
    /// How long to retain events in history.
    pub history_retention: Duration,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            enable_history: false,
            max_history_size: 200,
            history_retention: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone)]
struct TimestampedEvent {
    event: AppEvent,
    timestamp: Instant,
}

/// Error types for event bus operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EventBusError {
    /// No subscribers are listening
    #[error("No active subscribers")]
    NoSubscribers,
    /// Channel is closed
    #[error("Event channel is closed")]
    ChannelClosed,
}

/// Publish/subscribe hub owned by one editor instance.
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
    handlers: Arc<RwLock<HandlerMap>>,
    history: Arc<RwLock<VecDeque<TimestampedEvent>>>,
    config: EventBusConfig,
}

impl EventBus {
    /// Create a new event bus with default configuration
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    /// Create a new event bus with custom configuration
    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            handlers: Arc::new(RwLock::new(HashMap::new())),
            history: Arc::new(RwLock::new(VecDeque::new())),
            config,
        }
    }

    /// Publish an event to all subscribers
    ///
    /// Returns the number of async receivers that will see the event, or
    /// [`EventBusError::NoSubscribers`] when nobody (handler or receiver) is
    /// listening.
    pub fn publish(&self, event: AppEvent) -> Result<usize, EventBusError> {
        if self.config.enable_history {
            self.add_to_history(&event);
        }

        tracing::trace!("Publishing {}", event.description());

        let handlers = self.handlers.read();
        let mut delivered = 0usize;
        for (filter, handler) in handlers.values() {
            if filter.matches(&event) {
                handler(event.clone());
                delivered += 1;
            }
        }

        match self.sender.send(event) {
            Ok(count) => Ok(count),
            Err(_) if delivered > 0 => Ok(0),
            Err(_) => Err(EventBusError::NoSubscribers),
        }
    }

    /// Subscribe to events with a synchronous handler
    ///
    /// The handler runs on the publishing thread and must not subscribe or
    /// unsubscribe on this bus.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers.write().insert(id, (filter, Box::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Subscribe and get a guard that unsubscribes when dropped.
    pub fn subscribe_scoped<F>(&self, filter: EventFilter, handler: F) -> SubscriptionGuard
    where
        F: Fn(AppEvent) + Send + Sync + 'static,
    {
        let id = self.subscribe(filter, handler);
        SubscriptionGuard {
            id,
            handlers: Arc::downgrade(&self.handlers),
        }
    }

    /// Get a receiver for manual event polling from async code.
    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Unsubscribe from events
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        remove_handler(&self.handlers, id)
    }

    /// Get the number of active handler subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Whether anyone (handler or async receiver) would see a published event.
    pub fn has_listeners(&self) -> bool {
        self.subscriber_count() > 0 || self.sender.receiver_count() > 0
    }

    /// Get recent event history (if enabled)
    ///
    /// Returns events since the given instant, or all history if None.
    pub fn history(&self, since: Option<Instant>) -> Vec<AppEvent> {
        if !self.config.enable_history {
            return Vec::new();
        }

        let history = self.history.read();
        match since {
            Some(since) => history
                .iter()
                .filter(|e| e.timestamp >= since)
                .map(|e| e.event.clone())
                .collect(),
            None => history.iter().map(|e| e.event.clone()).collect(),
        }
    }

    /// Clear event history
    pub fn clear_history(&self) {
        self.history.write().clear();
    }

    /// Get the current configuration
    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    fn add_to_history(&self, event: &AppEvent) {
        let mut history = self.history.write();
        let now = Instant::now();

        history.push_back(TimestampedEvent {
            event: event.clone(),
            timestamp: now,
        });

        let retention = self.config.history_retention;
        while history
            .front()
            .is_some_and(|e| now.duration_since(e.timestamp) > retention)
        {
            history.pop_front();
        }

        while history.len() > self.config.max_history_size {
            history.pop_front();
        }
    }
}

fn remove_handler(handlers: &RwLock<HandlerMap>, id: SubscriptionId) -> bool {
    let removed = handlers.write().remove(&id).is_some();
    if removed {
        tracing::debug!("Subscription {} removed", id);
    }
    removed
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("config", &self.config)
            .finish()
    }
}

/// Scoped subscription. Unsubscribes on drop; outliving the bus is harmless.
#[must_use = "dropping the guard immediately unsubscribes the handler"]
pub struct SubscriptionGuard {
    id: SubscriptionId,
    handlers: Weak<RwLock<HandlerMap>>,
}

impl SubscriptionGuard {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl std::fmt::Debug for SubscriptionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionGuard")
            .field("id", &self.id)
            .finish()
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(handlers) = self.handlers.upgrade() {
            remove_handler(&handlers, self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::events::{DrawingEvent, ZoneEvent};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_event_bus_creation() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);
        assert!(!bus.has_listeners());
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let bus = EventBus::new();

        let id = bus.subscribe(EventFilter::All, |_| {});
        assert_eq!(bus.subscriber_count(), 1);

        assert!(bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(), 0);

        // Double unsubscribe should return false
        assert!(!bus.unsubscribe(id));
    }

    #[test]
    fn test_guard_unsubscribes_on_drop() {
        let bus = EventBus::new();
        {
            let _guard = bus.subscribe_scoped(EventFilter::All, |_| {});
            assert_eq!(bus.subscriber_count(), 1);
        }
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_guard_outliving_bus() {
        let guard = {
            let bus = EventBus::new();
            bus.subscribe_scoped(EventFilter::All, |_| {})
        };
        drop(guard);
    }

    #[test]
    fn test_publish_without_listeners() {
        let bus = EventBus::new();
        assert_eq!(
            bus.publish(AppEvent::notify("nobody")),
            Err(EventBusError::NoSubscribers)
        );
    }

    #[test]
    fn test_event_filtering() {
        let bus = EventBus::new();
        let zone_count = Arc::new(AtomicUsize::new(0));
        let drawing_count = Arc::new(AtomicUsize::new(0));

        let zc = zone_count.clone();
        let _zone = bus.subscribe_scoped(
            EventFilter::Categories(vec![EventCategory::Zone]),
            move |_| {
                zc.fetch_add(1, Ordering::SeqCst);
            },
        );
        let dc = drawing_count.clone();
        let _drawing = bus.subscribe_scoped(
            EventFilter::Categories(vec![EventCategory::Drawing]),
            move |_| {
                dc.fetch_add(1, Ordering::SeqCst);
            },
        );

        bus.publish(AppEvent::Zone(ZoneEvent::Cleared { zone_id: 1 }))
            .ok();
        bus.publish(AppEvent::Drawing(DrawingEvent::Cancelled)).ok();
        bus.publish(AppEvent::Drawing(DrawingEvent::Cancelled)).ok();

        assert_eq!(zone_count.load(Ordering::SeqCst), 1);
        assert_eq!(drawing_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_filtered_out_event_counts_as_unheard() {
        let bus = EventBus::new();
        let _guard = bus.subscribe_scoped(
            EventFilter::Categories(vec![EventCategory::Zone]),
            |_| {},
        );
        assert_eq!(
            bus.publish(AppEvent::notify("hello")),
            Err(EventBusError::NoSubscribers)
        );
    }

    #[test]
    fn test_event_history() {
        let config = EventBusConfig {
            enable_history: true,
            max_history_size: 3,
            ..Default::default()
        };
        let bus = EventBus::with_config(config);
        for i in 0..5 {
            bus.publish(AppEvent::Zone(ZoneEvent::Added { zone_id: i })).ok();
        }
        let history = bus.history(None);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0], AppEvent::Zone(ZoneEvent::Added { zone_id: 2 }));

        bus.clear_history();
        assert!(bus.history(None).is_empty());
    }

    #[tokio::test]
    async fn test_async_receiver() {
        let bus = EventBus::new();
        let mut rx = bus.receiver();

        bus.publish(AppEvent::notify("Entity pairs saved"))
            .expect("receiver is listening");

        let event = rx.recv().await.expect("event delivered");
        assert_eq!(event, AppEvent::notify("Entity pairs saved"));
    }
}
