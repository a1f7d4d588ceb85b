use crate::config::HostConfig;
use crate::error::UiError;
use crate::events::{Event, EventSink};
use crate::native::NativeRuntime;
use crate::tree::WidgetTree;
use crossbeam::channel::{self, Receiver, TryRecvError};
use tracing::debug;

/// Connects a widget tree to a native runtime’s event stream.
pub struct Host<R> {
    pub tree: WidgetTree<R>,
    event_recv: Receiver<Event>,
}

impl<R: NativeRuntime> Host<R> {
    /// Creates a new Host with the default configuration.
    pub fn new(runtime: R) -> Host<R> {
        Host::with_config(runtime, HostConfig::default())
    }

    /// Creates a new Host.
    ///
    /// The runtime is handed an [`EventSink`]; events it delivers are dispatched on `poll`.
    pub fn with_config(mut runtime: R, config: HostConfig) -> Host<R> {
        let (event_sender, event_recv) = match config.event_queue_capacity {
            Some(capacity) => channel::bounded(capacity),
            None => channel::unbounded(),
        };
        runtime.attach_event_sink(EventSink::new(event_sender));

        Host {
            tree: WidgetTree::with_config(runtime, &config),
            event_recv,
        }
    }

    /// Dispatches every queued event without blocking.
    ///
    /// Returns the number of events that reached a live widget. Stale events are reported by the
    /// dispatcher and skipped; failed deferred operations are logged there and still count.
    pub fn poll(&mut self) -> usize {
        let mut dispatched = 0;
        loop {
            match self.event_recv.try_recv() {
                Ok(event) => {
                    match self.tree.dispatch(event.widget, event.payload) {
                        Ok(()) | Err(UiError::Deferred(_)) => dispatched += 1,
                        Err(_) => {}
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("native runtime dropped its event sink");
                    break;
                }
            }
        }
        dispatched
    }

    /// Number of events waiting to be dispatched.
    pub fn pending(&self) -> usize {
        self.event_recv.len()
    }
}
