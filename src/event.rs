/// World-level lifecycle events, emitted while the update drains its queues
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// Entity went through admission (created enabled, or re-enabled)
    Admitted,

    /// Entity was reconsidered after its components or criteria changed
    Changed,

    /// Entity left every unit (disabled or destroyed)
    Removed,
}

impl LifecycleEvent {
    /// Get event type name for debugging
    pub fn event_type(&self) -> &'static str {
        match self {
            LifecycleEvent::Admitted => "Admitted",
            LifecycleEvent::Changed => "Changed",
            LifecycleEvent::Removed => "Removed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_names() {
        assert_eq!(LifecycleEvent::Admitted.event_type(), "Admitted");
        assert_eq!(LifecycleEvent::Changed.event_type(), "Changed");
        assert_eq!(LifecycleEvent::Removed.event_type(), "Removed");
    }
}
