use crate::entity::Entity;
use crate::event::LifecycleEvent;

/// Observer that reacts to entity lifecycle events.
///
/// Observers only get a read-only view of the entity; the world never
/// depends on what they do with it.
pub trait Observer {
    /// Called when an entity event occurs
    fn on_event(&mut self, event: LifecycleEvent, entity: &Entity);

    /// Get name for debugging
    fn name(&self) -> &str {
        "Observer"
    }
}

impl<F> Observer for F
where
    F: FnMut(LifecycleEvent, &Entity),
{
    fn on_event(&mut self, event: LifecycleEvent, entity: &Entity) {
        self(event, entity)
    }
}

/// Registry that manages all observers
pub struct ObserverRegistry {
    observers: Vec<Box<dyn Observer>>,
}

impl ObserverRegistry {
    /// Create new registry
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Register observer, returning its index
    pub fn register(&mut self, observer: Box<dyn Observer>) -> usize {
        self.observers.push(observer);
        self.observers.len() - 1
    }

    /// Unregister observer by index
    pub fn unregister(&mut self, index: usize) -> Option<Box<dyn Observer>> {
        if index < self.observers.len() {
            Some(self.observers.remove(index))
        } else {
            None
        }
    }

    /// Broadcast event to all observers
    pub fn broadcast(&mut self, event: LifecycleEvent, entity: &Entity) {
        for observer in &mut self.observers {
            observer.on_event(event, entity);
        }
    }

    /// Get number of registered observers
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.observers.iter().map(|o| o.name())
    }

    /// Clear all observers
    pub fn clear(&mut self) {
        self.observers.clear();
    }
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Log observer that traces all events
#[cfg(feature = "profiling")]
pub struct LoggingObserver;

#[cfg(feature = "profiling")]
impl Observer for LoggingObserver {
    fn on_event(&mut self, event: LifecycleEvent, entity: &Entity) {
        tracing::debug!(
            event = event.event_type(),
            entity = entity.id(),
            components = entity.component_mask().count(),
            "entity lifecycle"
        );
    }

    fn name(&self) -> &str {
        "LoggingObserver"
    }
}
