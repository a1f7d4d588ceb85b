/// Configuration for a [`Host`](crate::Host).
#[derive(Debug, Clone, Default)]
pub struct HostConfig {
    /// Maximum number of undispatched native events.
    ///
    /// `None` means unbounded. When bounded, events delivered to a full queue are dropped.
    pub event_queue_capacity: Option<usize>,

    /// Title given to the empty screen at the bottom of every stack screen.
    pub placeholder_title: Option<String>,
}

impl HostConfig {
    pub fn with_event_queue_capacity(mut self, capacity: usize) -> Self {
        self.event_queue_capacity = Some(capacity);
        self
    }

    pub fn with_placeholder_title(mut self, title: impl Into<String>) -> Self {
        self.placeholder_title = Some(title.into());
        self
    }
}
