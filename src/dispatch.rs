//! Routing native events to listeners.

use crate::error::{UiError, UiResult};
use crate::events::{Event, WidgetEvent};
use crate::native::{NativeRuntime, WidgetId, WidgetKind};
use crate::tree::WidgetTree;
use tracing::{trace, warn};

impl<R: NativeRuntime> WidgetTree<R> {
    /// Delivers an event to the listeners of the widget it names, in registration order.
    ///
    /// Events for widgets that no longer exist are dropped and reported as
    /// [`UiError::StaleWidget`]; native delivery can race teardown, so this is not fatal.
    ///
    /// A [`WidgetEvent::StackScreenPopped`] on a stack screen first mirrors the native pop and
    /// notifies the stack’s listeners.
    ///
    /// If operations deferred by listeners fail, every listener has still run and the failures
    /// are returned together as [`UiError::Deferred`].
    pub fn dispatch(&mut self, widget: WidgetId, payload: WidgetEvent) -> UiResult<()> {
        let kind = match self.nodes.get(&widget) {
            Some(node) => node.kind,
            None => {
                warn!(%widget, ?payload, "dropping event for a widget that no longer exists");
                return Err(UiError::StaleWidget(widget));
            }
        };

        let mut failures = Vec::new();
        if let (WidgetKind::StackScreen, WidgetEvent::StackScreenPopped { from }) =
            (kind, &payload)
        {
            match self.mirror_native_pop(widget, *from) {
                Ok(deferred) => failures.extend(deferred),
                Err(err) => warn!(%widget, %err, "failed to mirror native pop"),
            }
        }

        // a stack listener may have destroyed the widget by now
        if let Some(node) = self.nodes.get(&widget) {
            let listeners: Vec<_> = node.listeners.iter().map(|(_, l)| l.clone()).collect();
            trace!(%widget, ?payload, listeners = listeners.len(), "dispatching event");
            failures.extend(self.notify(&listeners, &Event { widget, payload }));
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(UiError::Deferred(failures))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventContext, Listener};
    use crate::headless::HeadlessRuntime;
    use crate::widget::{AsWidget, Button, Label, Screen, StackScreen, VerticalLayout};
    use parking_lot::Mutex;
    use std::sync::Arc;

    type Ctx<'a> = EventContext<'a, HeadlessRuntime>;

    #[test]
    fn test_stale_events_are_dropped() {
        let mut tree = WidgetTree::new(HeadlessRuntime::new());
        let button: Button = tree.create().unwrap();
        let id = button.id();
        tree.destroy(button).unwrap();

        assert_eq!(
            tree.dispatch(id, WidgetEvent::Clicked),
            Err(UiError::StaleWidget(id))
        );
    }

    #[test]
    fn test_listeners_in_registration_order() {
        let mut tree = WidgetTree::new(HeadlessRuntime::new());
        let button: Button = tree.create().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let log = Arc::clone(&log);
            tree.add_listener(
                button,
                Listener::new(move |event: &Event, _: &mut Ctx| {
                    log.lock().push((i, event.payload.clone()))
                }),
            )
            .unwrap();
        }

        tree.dispatch(button.id(), WidgetEvent::Clicked).unwrap();
        assert_eq!(
            *log.lock(),
            vec![
                (0, WidgetEvent::Clicked),
                (1, WidgetEvent::Clicked),
                (2, WidgetEvent::Clicked)
            ]
        );
    }

    #[test]
    fn test_one_listener_on_many_widgets() {
        let mut tree = WidgetTree::new(HeadlessRuntime::new());
        let a: Button = tree.create().unwrap();
        let b: Label = tree.create().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let listener = {
            let seen = Arc::clone(&seen);
            Listener::new(move |event: &Event, _: &mut Ctx| seen.lock().push(event.widget))
        };
        tree.add_listener(a, listener.clone()).unwrap();
        tree.add_listener(b, listener).unwrap();

        tree.dispatch(b.id(), WidgetEvent::Clicked).unwrap();
        tree.dispatch(a.id(), WidgetEvent::Clicked).unwrap();
        assert_eq!(*seen.lock(), vec![b.id(), a.id()]);
    }

    #[test]
    fn test_destroy_from_a_listener_is_deferred() {
        let mut tree = WidgetTree::new(HeadlessRuntime::new());
        let layout: VerticalLayout = tree.create().unwrap();
        let button: Button = tree.create().unwrap();
        tree.add_child(layout, button).unwrap();
        let calls = Arc::new(Mutex::new(0));

        for _ in 0..2 {
            let calls = Arc::clone(&calls);
            tree.add_listener(
                button,
                Listener::new(move |event: &Event, ctx: &mut Ctx| {
                    // still alive for every listener of this event
                    assert!(ctx.contains(event.widget));
                    *calls.lock() += 1;
                    ctx.defer_destroy(event.widget);
                }),
            )
            .unwrap();
        }

        // the second destroy finds nothing left to destroy
        assert_eq!(
            tree.dispatch(button.id(), WidgetEvent::Clicked),
            Err(UiError::Deferred(vec![UiError::UnknownWidget(button.id())]))
        );
        assert_eq!(*calls.lock(), 2);
        assert!(!tree.contains(button));
        assert!(tree.children(layout).is_empty());
    }

    #[test]
    fn test_failed_deferred_operations_are_returned() {
        let mut tree = WidgetTree::new(HeadlessRuntime::new());
        let stack: StackScreen = tree.create().unwrap();
        let screen: Screen = tree.create().unwrap();
        let button: Button = tree.create().unwrap();
        tree.push(stack, screen).unwrap();
        let ran = Arc::new(Mutex::new(false));

        tree.add_listener(
            button,
            Listener::new(move |_: &Event, ctx: &mut Ctx| ctx.defer_destroy(screen)),
        )
        .unwrap();
        let flag = Arc::clone(&ran);
        tree.add_listener(
            button,
            Listener::new(move |_: &Event, _: &mut Ctx| *flag.lock() = true),
        )
        .unwrap();

        assert_eq!(
            tree.dispatch(button.id(), WidgetEvent::Clicked),
            Err(UiError::Deferred(vec![UiError::Stacked(screen.id())]))
        );
        assert!(*ran.lock(), "later listeners still run");
        assert_eq!(tree.top(stack), Ok(screen.id()));
    }
}
