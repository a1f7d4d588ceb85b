//! Stack screens.
//!
//! A stack screen shows the top of a LIFO stack of screens. The stack is never empty: creating a
//! stack screen also creates an empty placeholder screen that sits at the bottom, so popping
//! everything that was pushed leaves the placeholder on display rather than nothing.

use crate::error::{native, UiError, UiResult};
use crate::events::{ListenerToken, StackScreenListener, StackTransition};
use crate::native::{NativeRuntime, WidgetId, WidgetKind};
use crate::property::PropertyKey;
use crate::tree::{StackState, WidgetTree};
use crate::widget::{AsWidget, HasStackSemantics, IsScreen};
use tracing::{debug, warn};

impl<R: NativeRuntime> WidgetTree<R> {
    /// Creates the placeholder screen and makes it the bottom of a new stack.
    pub(crate) fn seed_stack(&mut self, stack: WidgetId) -> UiResult<()> {
        let placeholder = self.create_node(WidgetKind::Screen)?;
        if let Some(title) = self.placeholder_title().map(str::to_string) {
            if let Err(err) = self.set_property(placeholder, PropertyKey::Title, title) {
                warn!(%stack, %placeholder, %err, "placeholder screen has no title");
            }
        }
        if let Err(err) = self
            .runtime_mut()
            .stack_push(stack, placeholder)
            .map_err(native(stack, "stack_push"))
        {
            self.destroy(placeholder)?;
            return Err(err);
        }

        let node = self.node_mut(stack)?;
        node.children.push(placeholder);
        node.stack = Some(StackState {
            placeholder,
            listeners: Vec::new(),
        });
        self.node_mut(placeholder)?.parent = Some(stack);
        Ok(())
    }

    fn stack_state(&self, stack: WidgetId) -> UiResult<&StackState<R>> {
        let node = self.node(stack)?;
        node.stack.as_ref().ok_or(UiError::WrongKind {
            id: stack,
            expected: WidgetKind::StackScreen,
            found: node.kind,
        })
    }

    fn stack_state_mut(&mut self, stack: WidgetId) -> UiResult<&mut StackState<R>> {
        let node = self.node_mut(stack)?;
        let found = node.kind;
        node.stack.as_mut().ok_or(UiError::WrongKind {
            id: stack,
            expected: WidgetKind::StackScreen,
            found,
        })
    }

    /// Pushes a screen and shows it.
    ///
    /// The screen is detached from its current parent first and put back if the native push
    /// fails. Listeners are notified after the native runtime has been asked to show the new top.
    pub fn push<S, W>(&mut self, stack: S, screen: W) -> UiResult<()>
    where
        S: HasStackSemantics,
        W: IsScreen,
    {
        let (stack, screen) = (stack.id(), screen.id());
        self.stack_state(stack)?;
        self.sync_native_pops(stack)?;
        let node = self.node(screen)?;
        if !node.kind.is_screen() {
            return Err(UiError::NotAScreen(screen));
        }
        let current_parent = node.parent;
        if current_parent == Some(stack) {
            warn!(%stack, %screen, "screen is already on this stack");
            return Err(UiError::AlreadyInStack { stack, screen });
        }
        if screen == stack || self.is_in_subtree(stack, screen) {
            return Err(UiError::Cycle {
                parent: stack,
                child: screen,
            });
        }
        let previous = match current_parent {
            Some(parent) => Some((parent, self.detach(parent, screen)?)),
            None => None,
        };

        if let Err(err) = self
            .runtime_mut()
            .stack_push(stack, screen)
            .map_err(native(stack, "stack_push"))
        {
            if let Some((parent, index)) = previous {
                self.restore_child(parent, screen, index);
            }
            return Err(err);
        }
        self.node_mut(screen)?.parent = Some(stack);
        self.node_mut(stack)?.children.push(screen);
        debug!(%stack, %screen, size = self.children(stack).len(), "pushed screen");

        self.notify_stack(stack, StackTransition::Pushed { stack, screen })?;
        Ok(())
    }

    /// Pops the top screen and shows the one below it.
    ///
    /// Returns the popped screen, which is detached but not destroyed. Popping a stack that only
    /// holds its placeholder does nothing and returns `None`.
    pub fn pop<S: HasStackSemantics>(&mut self, stack: S) -> UiResult<Option<WidgetId>> {
        let stack = stack.id();
        self.stack_state(stack)?;
        self.sync_native_pops(stack)?;
        if self.children(stack).len() <= 1 {
            debug!(%stack, "nothing to pop; the placeholder stays");
            return Ok(None);
        }

        self.runtime_mut()
            .stack_pop(stack)
            .map_err(native(stack, "stack_pop"))?;
        let (from, to) = self.pop_local(stack)?;
        debug!(%stack, %from, %to, "popped screen");

        self.notify_stack(stack, StackTransition::Popped { stack, from, to })?;
        Ok(Some(from))
    }

    /// Brings the local stack in line after the native runtime popped `from` on its own.
    ///
    /// Does nothing if `from` has already left the local stack, which happens when a push or pop
    /// synced the stack before the event was dispatched. Returns the failures of operations
    /// deferred by stack listeners.
    pub(crate) fn mirror_native_pop(
        &mut self,
        stack: WidgetId,
        from: WidgetId,
    ) -> UiResult<Vec<UiError>> {
        self.stack_state(stack)?;
        if !self.children(stack).contains(&from) {
            debug!(%stack, %from, "native pop already mirrored");
            return Ok(Vec::new());
        }
        self.sync_native_pops(stack)
    }

    /// Drops the screens the native runtime has popped since the stack was last in sync.
    ///
    /// Native pops only ever remove the top, so the native stack is a prefix of the local one.
    fn sync_native_pops(&mut self, stack: WidgetId) -> UiResult<Vec<UiError>> {
        let mut failures = Vec::new();
        loop {
            let depth = self
                .runtime()
                .stack_depth(stack)
                .map_err(native(stack, "stack_depth"))?;
            if self.children(stack).len() <= depth.max(1) {
                return Ok(failures);
            }
            let (from, to) = self.pop_local(stack)?;
            debug!(%stack, %from, %to, "native runtime popped screen");
            let transition = StackTransition::Popped { stack, from, to };
            failures.extend(self.notify_stack(stack, transition)?);
        }
    }

    fn pop_local(&mut self, stack: WidgetId) -> UiResult<(WidgetId, WidgetId)> {
        let children = &mut self.node_mut(stack)?.children;
        let from = match children.pop() {
            Some(from) => from,
            None => return Err(UiError::UnknownWidget(stack)),
        };
        let to = match children.last() {
            Some(to) => *to,
            None => return Err(UiError::UnknownWidget(stack)),
        };
        self.node_mut(from)?.parent = None;
        Ok((from, to))
    }

    fn is_in_subtree(&self, root: WidgetId, id: WidgetId) -> bool {
        self.children(id)
            .iter()
            .any(|child| *child == root || self.is_in_subtree(root, *child))
    }

    fn notify_stack(
        &mut self,
        stack: WidgetId,
        transition: StackTransition,
    ) -> UiResult<Vec<UiError>> {
        let listeners: Vec<_> = self
            .stack_state(stack)?
            .listeners
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        Ok(self.notify(&listeners, &transition))
    }

    /// Sets whether the platform back button pops the stack.
    ///
    /// Platforms differ in what a disabled back button means, so this is only a native property
    /// and no local state is kept.
    pub fn enable_back_button<S: HasStackSemantics>(
        &mut self,
        stack: S,
        enabled: bool,
    ) -> UiResult<()> {
        self.set_property(stack, PropertyKey::BackButtonEnabled, enabled)
    }

    /// Number of screens on the stack, including the placeholder.
    pub fn stack_size<S: HasStackSemantics>(&self, stack: S) -> UiResult<usize> {
        self.stack_state(stack.id())?;
        Ok(self.children(stack).len())
    }

    /// The visible screen, as of the last push, pop or dispatched native pop.
    pub fn top<S: HasStackSemantics>(&self, stack: S) -> UiResult<WidgetId> {
        let placeholder = self.stack_state(stack.id())?.placeholder;
        Ok(self.children(stack).last().copied().unwrap_or(placeholder))
    }

    pub fn placeholder<S: HasStackSemantics>(&self, stack: S) -> UiResult<WidgetId> {
        Ok(self.stack_state(stack.id())?.placeholder)
    }

    pub fn add_stack_listener<S: HasStackSemantics>(
        &mut self,
        stack: S,
        listener: StackScreenListener<R>,
    ) -> UiResult<ListenerToken> {
        let token = ListenerToken::new();
        self.stack_state_mut(stack.id())?
            .listeners
            .push((token, listener));
        Ok(token)
    }

    pub fn remove_stack_listener<S: HasStackSemantics>(
        &mut self,
        stack: S,
        token: ListenerToken,
    ) -> UiResult<()> {
        let listeners = &mut self.stack_state_mut(stack.id())?.listeners;
        match listeners.iter().position(|(t, _)| *t == token) {
            Some(pos) => {
                listeners.remove(pos);
                Ok(())
            }
            None => {
                warn!(stack = %stack.id(), %token, "no such stack listener");
                Err(UiError::UnknownListener(token))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostConfig;
    use crate::events::{EventContext, Listener};
    use crate::headless::HeadlessRuntime;
    use crate::widget::{Screen, StackScreen, TabScreen};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn tree() -> WidgetTree<HeadlessRuntime> {
        WidgetTree::new(HeadlessRuntime::new())
    }

    #[test]
    fn test_new_stack_has_a_placeholder_top() {
        let mut tree = tree();
        let stack: StackScreen = tree.create().unwrap();

        assert_eq!(tree.stack_size(stack), Ok(1));
        let placeholder = tree.placeholder(stack).unwrap();
        assert_eq!(tree.top(stack), Ok(placeholder));
        assert_eq!(tree.runtime().visible_screen(stack.id()), Some(placeholder));
    }

    #[test]
    fn test_push_push_pop() {
        let mut tree = tree();
        let stack: StackScreen = tree.create().unwrap();
        let x: Screen = tree.create().unwrap();
        let y: Screen = tree.create().unwrap();

        tree.push(stack, x).unwrap();
        tree.push(stack, y).unwrap();
        assert_eq!(tree.pop(stack), Ok(Some(y.id())));

        assert_eq!(tree.top(stack), Ok(x.id()));
        assert_eq!(tree.stack_size(stack), Ok(2));
        assert_eq!(tree.runtime().visible_screen(stack.id()), Some(x.id()));
        assert_eq!(tree.parent(y), None, "popped screens are detached");
        assert!(tree.contains(y), "popped screens are not destroyed");
    }

    #[test]
    fn test_pop_never_empties_the_stack() {
        let mut tree = tree();
        let stack: StackScreen = tree.create().unwrap();
        let placeholder = tree.placeholder(stack).unwrap();

        assert_eq!(tree.pop(stack), Ok(None));
        assert_eq!(tree.pop(stack), Ok(None));
        assert_eq!(tree.stack_size(stack), Ok(1));
        assert_eq!(tree.top(stack), Ok(placeholder));
        assert_eq!(tree.runtime().visible_screen(stack.id()), Some(placeholder));
    }

    #[test]
    fn test_size_follows_push_and_pop_counts() {
        let mut tree = tree();
        let stack: StackScreen = tree.create().unwrap();
        // true = push, false = pop
        let ops = [
            true, false, false, true, true, true, false, true, false, false, false, false, true,
        ];

        let mut expected = 1;
        for push in ops.iter() {
            if *push {
                let screen: Screen = tree.create().unwrap();
                tree.push(stack, screen).unwrap();
                expected += 1;
            } else {
                tree.pop(stack).unwrap();
                if expected > 1 {
                    expected -= 1;
                }
            }
            assert_eq!(tree.stack_size(stack), Ok(expected));
            assert_eq!(
                tree.runtime().visible_screen(stack.id()),
                Some(tree.top(stack).unwrap()),
                "the visible screen must be the top"
            );
        }
        assert_eq!(expected, 2);
    }

    #[test]
    fn test_listeners_run_in_order_after_the_transition() {
        let mut tree = tree();
        let stack: StackScreen = tree.create().unwrap();
        let screen: Screen = tree.create().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));

        for name in &["first", "second"] {
            let log = Arc::clone(&log);
            let name = *name;
            tree.add_stack_listener(
                stack,
                Listener::new(
                    move |transition: &StackTransition,
                          ctx: &mut EventContext<'_, HeadlessRuntime>| {
                        if let StackTransition::Pushed { stack, screen } = *transition {
                            let stack = ctx.downcast::<StackScreen>(stack).unwrap();
                            assert_eq!(ctx.top(stack), Ok(screen));
                            assert_eq!(ctx.runtime().visible_screen(stack.id()), Some(screen));
                        }
                        log.lock().push(name);
                    },
                ),
            )
            .unwrap();
        }

        tree.push(stack, screen).unwrap();
        assert_eq!(*log.lock(), vec!["first", "second"]);
    }

    #[test]
    fn test_removed_stack_listener_is_not_called() {
        let mut tree = tree();
        let stack: StackScreen = tree.create().unwrap();
        let screen: Screen = tree.create().unwrap();
        let calls = Arc::new(Mutex::new(0));

        let counter = Arc::clone(&calls);
        let token = tree
            .add_stack_listener(
                stack,
                Listener::new(move |_: &StackTransition, _| *counter.lock() += 1),
            )
            .unwrap();
        tree.remove_stack_listener(stack, token).unwrap();
        assert_eq!(
            tree.remove_stack_listener(stack, token),
            Err(UiError::UnknownListener(token))
        );

        tree.push(stack, screen).unwrap();
        assert_eq!(*calls.lock(), 0);
    }

    #[test]
    fn test_pushing_twice_is_rejected() {
        let mut tree = tree();
        let stack: StackScreen = tree.create().unwrap();
        let screen: Screen = tree.create().unwrap();

        tree.push(stack, screen).unwrap();
        assert_eq!(
            tree.push(stack, screen),
            Err(UiError::AlreadyInStack {
                stack: stack.id(),
                screen: screen.id()
            })
        );
        assert_eq!(tree.stack_size(stack), Ok(2));
    }

    #[test]
    fn test_push_takes_a_screen_out_of_a_tab_screen() {
        let mut tree = tree();
        let stack: StackScreen = tree.create().unwrap();
        let tabs: TabScreen = tree.create().unwrap();
        let screen: Screen = tree.create().unwrap();
        tree.add_tab(tabs, screen).unwrap();

        tree.push(stack, screen).unwrap();

        assert_eq!(tree.tab_count(tabs), Ok(0));
        assert_eq!(tree.top(stack), Ok(screen.id()));
    }

    #[test]
    fn test_stacked_screens_cannot_be_reparented_or_destroyed() {
        let mut tree = tree();
        let stack: StackScreen = tree.create().unwrap();
        let tabs: TabScreen = tree.create().unwrap();
        let screen: Screen = tree.create().unwrap();
        tree.push(stack, screen).unwrap();

        assert_eq!(tree.add_tab(tabs, screen), Err(UiError::Stacked(screen.id())));
        assert_eq!(tree.destroy(screen), Err(UiError::Stacked(screen.id())));
        assert_eq!(tree.top(stack), Ok(screen.id()));
    }

    #[test]
    fn test_destroying_the_stack_destroys_its_screens() {
        let mut tree = tree();
        let stack: StackScreen = tree.create().unwrap();
        let screen: Screen = tree.create().unwrap();
        tree.push(stack, screen).unwrap();
        let placeholder = tree.placeholder(stack).unwrap();

        tree.destroy(stack).unwrap();
        assert!(!tree.contains(screen));
        assert!(!tree.contains(placeholder));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_back_button_is_a_native_property() {
        let mut tree = tree();
        let stack: StackScreen = tree.create().unwrap();

        tree.enable_back_button(stack, false).unwrap();
        assert_eq!(
            tree.runtime().property(stack.id(), "backButtonEnabled"),
            Some(&crate::native::NativeValue::Int(0))
        );
    }

    #[test]
    fn test_failed_push_returns_the_screen_to_its_tab() {
        let mut tree = tree();
        let stack: StackScreen = tree.create().unwrap();
        let tabs: TabScreen = tree.create().unwrap();
        let screens: Vec<Screen> = (0..3).map(|_| tree.create().unwrap()).collect();
        for screen in &screens {
            tree.add_tab(tabs, *screen).unwrap();
        }
        let ids: Vec<_> = screens.iter().map(|s| s.id()).collect();
        tree.runtime_mut().fail("stack_push");

        assert!(matches!(
            tree.push(stack, screens[1]),
            Err(UiError::Native { .. })
        ));

        assert_eq!(tree.children(tabs), &ids[..]);
        assert_eq!(tree.runtime().children(tabs.id()), &ids[..]);
        assert_eq!(tree.stack_size(stack), Ok(1));
    }

    #[test]
    fn test_rejected_placeholder_title_still_creates_the_stack() {
        let mut runtime = HeadlessRuntime::new();
        runtime.reject("title");
        let config = HostConfig::default().with_placeholder_title("Home");
        let mut tree = WidgetTree::with_config(runtime, &config);

        let stack: StackScreen = tree.create().unwrap();
        let placeholder = tree.placeholder(stack).unwrap();
        assert_eq!(tree.stack_size(stack), Ok(1));
        assert_eq!(tree.runtime().property(placeholder, "title"), None);
    }

    #[test]
    fn test_add_child_to_a_stack_points_to_push() {
        let mut tree = tree();
        let stack: StackScreen = tree.create().unwrap();
        let screen: Screen = tree.create().unwrap();

        assert_eq!(
            tree.add_child(stack, screen),
            Err(UiError::StackChild {
                stack: stack.id(),
                child: screen.id()
            })
        );
        assert_eq!(tree.stack_size(stack), Ok(1));
        assert_eq!(tree.parent(screen), None);
    }
}
