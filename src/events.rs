//! Events and listeners.

use crate::error::UiResult;
use crate::native::WidgetId;
use crate::tree::WidgetTree;
use crate::widget::AsWidget;
use cgmath::Point2;
use core::fmt;
use core::ops::Deref;
use crossbeam::channel::{Sender, TrySendError};
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// Payloads of native widget events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    /// A button or similar widget was clicked.
    Clicked,
    /// A pointer went down, in widget coordinates.
    PointerPressed(Point2<i32>),
    /// A pointer went up, in widget coordinates.
    PointerReleased(Point2<i32>),
    /// An item in a list widget was clicked.
    ItemClicked(usize),
    /// The user switched tabs on a tab screen.
    TabChanged(usize),
    /// The native runtime popped `from` off a stack screen by itself, e.g. because of the back
    /// button.
    StackScreenPopped { from: WidgetId },
    /// The text of an edit box changed.
    ValueChanged(String),
    /// Anything else; passed through untouched.
    Other { code: i32, data: i64 },
}

/// An event tagged with the widget it was emitted for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub widget: WidgetId,
    pub payload: WidgetEvent,
}

/// The sending half of the native event queue.
///
/// Native runtimes receive one through [`NativeRuntime::attach_event_sink`] and may deliver
/// from any thread; events are dispatched when the host polls.
///
/// [`NativeRuntime::attach_event_sink`]: crate::native::NativeRuntime::attach_event_sink
#[derive(Debug, Clone)]
pub struct EventSink(Sender<Event>);

impl EventSink {
    pub(crate) fn new(sender: Sender<Event>) -> EventSink {
        EventSink(sender)
    }

    /// Queues an event. Returns false if it was dropped.
    ///
    /// Never blocks: a full queue drops the event.
    pub fn deliver(&self, widget: WidgetId, payload: WidgetEvent) -> bool {
        match self.0.try_send(Event { widget, payload }) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!(
                    widget = %event.widget,
                    payload = ?event.payload,
                    "event queue full; dropping event"
                );
                false
            }
            Err(TrySendError::Disconnected(event)) => {
                tracing::debug!(widget = %event.widget, "event queue closed; dropping event");
                false
            }
        }
    }
}

/// Identifies one listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(Uuid);

impl ListenerToken {
    pub(crate) fn new() -> ListenerToken {
        ListenerToken(Uuid::new_v4())
    }
}

impl fmt::Display for ListenerToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A listener callback.
///
/// Cloning shares the callback, so the same listener can be registered on several widgets.
pub struct Listener<E, R>(Arc<Mutex<dyn for<'c> FnMut(&E, &mut EventContext<'c, R>) + Send>>);

impl<E, R> Clone for Listener<E, R> {
    fn clone(&self) -> Self {
        Listener(Arc::clone(&self.0))
    }
}

impl<E, R> Listener<E, R> {
    pub fn new<F>(handler: F) -> Self
    where
        F: for<'c> FnMut(&E, &mut EventContext<'c, R>) + Send + 'static,
    {
        Listener(Arc::new(Mutex::new(handler)))
    }

    pub(crate) fn call(&self, event: &E, context: &mut EventContext<'_, R>) {
        let mut handler = self.0.lock();
        (&mut *handler)(event, context)
    }
}

impl<E, R> fmt::Debug for Listener<E, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Listener<{}>", core::any::type_name::<E>())
    }
}

/// Listens to events delivered to a widget.
pub type WidgetListener<R> = Listener<Event, R>;

/// Listens to push and pop transitions of a stack screen.
pub type StackScreenListener<R> = Listener<StackTransition, R>;

/// A stack screen transition, reported after the native runtime has been asked to perform it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackTransition {
    /// `screen` was pushed and is now the top.
    Pushed { stack: WidgetId, screen: WidgetId },
    /// `from` was popped and `to` is now the top.
    Popped {
        stack: WidgetId,
        from: WidgetId,
        to: WidgetId,
    },
}

pub(crate) type Deferred<R> = Box<dyn FnOnce(&mut WidgetTree<R>) -> UiResult<()>>;

/// What a listener gets to work with while it runs.
///
/// The tree can be queried but not mutated from inside a callback; mutations (including
/// destroying the widget the callback was invoked for) are queued with [`defer`] and run after
/// every listener for the current event has returned.
///
/// [`defer`]: EventContext::defer
pub struct EventContext<'a, R> {
    tree: &'a WidgetTree<R>,
    deferred: Vec<Deferred<R>>,
}

impl<'a, R> EventContext<'a, R> {
    pub(crate) fn new(tree: &'a WidgetTree<R>) -> Self {
        EventContext {
            tree,
            deferred: Vec::new(),
        }
    }

    pub fn tree(&self) -> &'a WidgetTree<R> {
        self.tree
    }

    /// Queues a mutation to run once the current notification has finished.
    pub fn defer<F>(&mut self, op: F)
    where
        F: FnOnce(&mut WidgetTree<R>) -> UiResult<()> + 'static,
    {
        self.deferred.push(Box::new(op));
    }

    pub(crate) fn into_deferred(self) -> Vec<Deferred<R>> {
        self.deferred
    }
}

impl<'a, R: crate::native::NativeRuntime> EventContext<'a, R> {
    /// Queues destruction of a widget.
    pub fn defer_destroy<W: AsWidget + 'static>(&mut self, widget: W) {
        self.defer(move |tree| tree.destroy(widget));
    }
}

impl<'a, R> Deref for EventContext<'a, R> {
    type Target = WidgetTree<R>;

    fn deref(&self) -> &WidgetTree<R> {
        self.tree
    }
}
