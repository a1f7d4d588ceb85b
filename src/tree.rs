use crate::color::Color;
use crate::config::HostConfig;
use crate::error::{native, UiError, UiResult};
use crate::events::{EventContext, Listener, ListenerToken, StackScreenListener, WidgetListener};
use crate::native::{NativeRuntime, WidgetId, WidgetKind};
use crate::property::{PropertyHandle, PropertyKey, PropertyValue};
use crate::widget::{AsWidget, Widget, WidgetType};
use cgmath::{Point2, Vector2};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Extra state owned by stack screens.
pub(crate) struct StackState<R> {
    /// The empty screen at the bottom of the stack.
    pub(crate) placeholder: WidgetId,
    pub(crate) listeners: Vec<(ListenerToken, StackScreenListener<R>)>,
}

/// A node in the widget tree.
pub(crate) struct WidgetNode<R> {
    pub(crate) kind: WidgetKind,
    pub(crate) handle: PropertyHandle,
    /// The immediate parent.
    pub(crate) parent: Option<WidgetId>,
    /// An ordered list of all children. For stack screens, this is the stack (top last).
    pub(crate) children: Vec<WidgetId>,
    pub(crate) listeners: Vec<(ListenerToken, WidgetListener<R>)>,
    pub(crate) stack: Option<StackState<R>>,
}

impl<R> WidgetNode<R> {
    fn new(id: WidgetId, kind: WidgetKind) -> Self {
        WidgetNode {
            kind,
            handle: PropertyHandle::new(id),
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
            stack: None,
        }
    }
}

/// A tree of widgets mirrored onto a native runtime.
///
/// Every widget is owned by the tree and addressed through typed handles. Structural changes are
/// forwarded to the runtime as they happen, so the native hierarchy always matches this one.
pub struct WidgetTree<R> {
    runtime: R,
    pub(crate) nodes: HashMap<WidgetId, WidgetNode<R>>,
    placeholder_title: Option<String>,
}

impl<R: NativeRuntime> WidgetTree<R> {
    pub fn new(runtime: R) -> WidgetTree<R> {
        WidgetTree::with_config(runtime, &HostConfig::default())
    }

    pub fn with_config(runtime: R, config: &HostConfig) -> WidgetTree<R> {
        WidgetTree {
            runtime,
            nodes: HashMap::new(),
            placeholder_title: config.placeholder_title.clone(),
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Direct access to the runtime.
    ///
    /// Structural changes made through this bypass the tree and will desynchronize it.
    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    pub(crate) fn node(&self, id: WidgetId) -> UiResult<&WidgetNode<R>> {
        self.nodes.get(&id).ok_or(UiError::UnknownWidget(id))
    }

    pub(crate) fn node_mut(&mut self, id: WidgetId) -> UiResult<&mut WidgetNode<R>> {
        self.nodes.get_mut(&id).ok_or(UiError::UnknownWidget(id))
    }

    /// Creates a widget of the handle’s kind.
    pub fn create<W: WidgetType>(&mut self) -> UiResult<W> {
        let id = self.create_node(W::KIND)?;
        Ok(W::from_id(id))
    }

    pub(crate) fn create_node(&mut self, kind: WidgetKind) -> UiResult<WidgetId> {
        let id = self
            .runtime
            .create_widget(kind)
            .map_err(|source| UiError::CreateFailed { kind, source })?;
        // the id still names the live widget, so there is nothing to release
        if self.nodes.contains_key(&id) {
            warn!(%id, ?kind, "native runtime handed out an identifier that is still in use");
            return Err(UiError::IdReused(id));
        }
        self.nodes.insert(id, WidgetNode::new(id, kind));
        debug!(%id, ?kind, "created widget");

        if kind == WidgetKind::StackScreen {
            if let Err(err) = self.seed_stack(id) {
                self.destroy_subtree(id);
                return Err(err);
            }
        }
        Ok(id)
    }

    pub(crate) fn placeholder_title(&self) -> Option<&str> {
        self.placeholder_title.as_deref()
    }

    /// Returns a typed handle if the widget exists and has the handle’s kind.
    pub fn downcast<W: WidgetType>(&self, widget: impl AsWidget) -> UiResult<W> {
        let id = widget.id();
        let found = self.node(id)?.kind;
        if found != W::KIND {
            return Err(UiError::WrongKind {
                id,
                expected: W::KIND,
                found,
            });
        }
        Ok(W::from_id(id))
    }

    /// Destroys a widget and, recursively, all of its children.
    ///
    /// Screens on a stack must be popped first.
    pub fn destroy(&mut self, widget: impl AsWidget) -> UiResult<()> {
        let id = widget.id();
        if let Some(parent) = self.node(id)?.parent {
            if self.node(parent)?.kind == WidgetKind::StackScreen {
                warn!(%id, stack = %parent, "refusing to destroy a stacked screen");
                return Err(UiError::Stacked(id));
            }
            self.node_mut(parent)?.children.retain(|child| *child != id);
        }
        self.destroy_subtree(id);
        Ok(())
    }

    /// Removes a node and its descendants, children first.
    fn destroy_subtree(&mut self, id: WidgetId) {
        if let Some(node) = self.nodes.remove(&id) {
            for child in node.children {
                self.destroy_subtree(child);
            }
            if let Err(err) = self.runtime.destroy_widget(id) {
                warn!(%id, %err, "native runtime failed to destroy widget");
            }
            debug!(%id, "destroyed widget");
        }
    }

    pub fn contains(&self, widget: impl AsWidget) -> bool {
        self.nodes.contains_key(&widget.id())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, widget: impl AsWidget) -> UiResult<WidgetKind> {
        Ok(self.node(widget.id())?.kind)
    }

    pub fn parent(&self, widget: impl AsWidget) -> Option<Widget> {
        self.nodes
            .get(&widget.id())
            .and_then(|node| node.parent)
            .map(Widget::new)
    }

    /// Children in order. Empty for unknown widgets.
    pub fn children(&self, widget: impl AsWidget) -> &[WidgetId] {
        self.nodes
            .get(&widget.id())
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn property_handle(&self, widget: impl AsWidget) -> UiResult<PropertyHandle> {
        Ok(self.node(widget.id())?.handle)
    }

    /// Returns true if `ancestor` is `id` or one of its ancestors.
    fn is_ancestor_or_self(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        let mut current = Some(id);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(&id).and_then(|node| node.parent);
        }
        false
    }

    /// Appends `child` to `parent`, detaching it from its current parent first.
    pub fn add_child(&mut self, parent: impl AsWidget, child: impl AsWidget) -> UiResult<()> {
        let (parent, child) = (parent.id(), child.id());
        let parent_kind = self.node(parent)?.kind;
        let current_parent = self.node(child)?.parent;

        if parent_kind == WidgetKind::StackScreen {
            return Err(UiError::StackChild {
                stack: parent,
                child,
            });
        }
        if self.is_ancestor_or_self(child, parent) {
            warn!(%parent, %child, "refusing to create a cycle");
            return Err(UiError::Cycle { parent, child });
        }

        let previous = match current_parent {
            Some(current_parent) => Some((current_parent, self.detach(current_parent, child)?)),
            None => None,
        };

        if let Err(err) = self
            .runtime
            .add_child(parent, child)
            .map_err(native(parent, "add_child"))
        {
            if let Some((previous_parent, index)) = previous {
                self.restore_child(previous_parent, child, index);
            }
            return Err(err);
        }
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        debug!(%parent, %child, "added child");
        Ok(())
    }

    /// Removes `child` from `parent`. The child is not destroyed.
    pub fn remove_child(&mut self, parent: impl AsWidget, child: impl AsWidget) -> UiResult<()> {
        let (parent, child) = (parent.id(), child.id());
        self.node(parent)?;
        if self.node(child)?.parent != Some(parent) {
            warn!(%parent, %child, "not a child; nothing to remove");
            return Err(UiError::NotAChild { parent, child });
        }
        self.detach(parent, child).map(|_| ())
    }

    /// Removes the parent relationship, both natively and locally. Returns the child's former
    /// index.
    pub(crate) fn detach(&mut self, parent: WidgetId, child: WidgetId) -> UiResult<usize> {
        if self.node(parent)?.kind == WidgetKind::StackScreen {
            warn!(stack = %parent, screen = %child, "stacked screens can only leave by popping");
            return Err(UiError::Stacked(child));
        }
        self.runtime
            .remove_child(child)
            .map_err(native(child, "remove_child"))?;
        let children = &mut self.node_mut(parent)?.children;
        let index = children.iter().position(|id| *id == child).unwrap_or(children.len());
        children.retain(|id| *id != child);
        self.node_mut(child)?.parent = None;
        debug!(%parent, %child, "removed child");
        Ok(index)
    }

    /// Puts a detached child back where it was after a failed move.
    pub(crate) fn restore_child(&mut self, parent: WidgetId, child: WidgetId, index: usize) {
        if let Err(err) = self.runtime.insert_child(parent, child, index) {
            warn!(%parent, %child, %err, "could not restore child; it stays detached");
            return;
        }
        if let Ok(node) = self.node_mut(parent) {
            let index = index.min(node.children.len());
            node.children.insert(index, child);
        }
        if let Ok(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        debug!(%parent, %child, index, "restored child");
    }

    /// Writes a property, validating the value against the key’s declared type.
    pub fn set_property(
        &mut self,
        widget: impl AsWidget,
        key: PropertyKey,
        value: impl Into<PropertyValue>,
    ) -> UiResult<()> {
        let handle = self.property_handle(widget)?;
        handle.set(&mut self.runtime, key, value.into())
    }

    pub fn get_property_int(&self, widget: impl AsWidget, key: PropertyKey) -> UiResult<i32> {
        self.property_handle(widget)?.get_int(&self.runtime, key)
    }

    pub fn get_property_string(&self, widget: impl AsWidget, key: PropertyKey) -> UiResult<String> {
        self.property_handle(widget)?.get_string(&self.runtime, key)
    }

    pub fn set_size(&mut self, widget: impl AsWidget, size: Vector2<i32>) -> UiResult<()> {
        self.set_property(widget, PropertyKey::Width, size.x)?;
        self.set_property(widget, PropertyKey::Height, size.y)
    }

    pub fn set_position(&mut self, widget: impl AsWidget, position: Point2<i32>) -> UiResult<()> {
        self.set_property(widget, PropertyKey::Left, position.x)?;
        self.set_property(widget, PropertyKey::Top, position.y)
    }

    pub fn set_background_color(
        &mut self,
        widget: impl AsWidget,
        color: impl Into<Color>,
    ) -> UiResult<()> {
        self.set_property(widget, PropertyKey::BackgroundColor, color.into())
    }

    pub fn set_visible(&mut self, widget: impl AsWidget, visible: bool) -> UiResult<()> {
        self.set_property(widget, PropertyKey::Visible, visible)
    }

    pub fn set_enabled(&mut self, widget: impl AsWidget, enabled: bool) -> UiResult<()> {
        self.set_property(widget, PropertyKey::Enabled, enabled)
    }

    /// Registers a listener for events delivered to `widget`.
    ///
    /// Listeners are called in registration order.
    pub fn add_listener(
        &mut self,
        widget: impl AsWidget,
        listener: WidgetListener<R>,
    ) -> UiResult<ListenerToken> {
        let token = ListenerToken::new();
        self.node_mut(widget.id())?.listeners.push((token, listener));
        Ok(token)
    }

    pub fn remove_listener(&mut self, widget: impl AsWidget, token: ListenerToken) -> UiResult<()> {
        let id = widget.id();
        let listeners = &mut self.node_mut(id)?.listeners;
        match listeners.iter().position(|(t, _)| *t == token) {
            Some(pos) => {
                listeners.remove(pos);
                Ok(())
            }
            None => {
                warn!(%id, %token, "no such listener");
                Err(UiError::UnknownListener(token))
            }
        }
    }

    /// Calls every listener with the event, then applies whatever they deferred.
    ///
    /// Returns the errors of deferred operations that failed.
    pub(crate) fn notify<E>(&mut self, listeners: &[Listener<E, R>], event: &E) -> Vec<UiError> {
        let deferred = {
            let mut context = EventContext::new(self);
            for listener in listeners {
                listener.call(event, &mut context);
            }
            context.into_deferred()
        };

        let mut failures = Vec::new();
        for op in deferred {
            if let Err(err) = op(self) {
                warn!(%err, "deferred operation failed");
                failures.push(err);
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;
    use crate::headless::{HeadlessRuntime, NativeCall};
    use crate::native::NativeValue;
    use crate::widget::{Button, Label, Screen, TabScreen, VerticalLayout};

    fn tree() -> WidgetTree<HeadlessRuntime> {
        WidgetTree::new(HeadlessRuntime::new())
    }

    #[test]
    fn test_add_child_keeps_insertion_order() {
        let mut tree = tree();
        let layout: VerticalLayout = tree.create().unwrap();
        let a: Label = tree.create().unwrap();
        let b: Button = tree.create().unwrap();
        let c: Label = tree.create().unwrap();

        for child in &[a.id(), b.id(), c.id()] {
            tree.add_child(layout, *child).unwrap();
        }

        assert_eq!(tree.children(layout), &[a.id(), b.id(), c.id()]);
        assert_eq!(tree.parent(b), Some(Widget::from(layout)));
        assert_eq!(
            tree.runtime().children(layout.id()),
            &[a.id(), b.id(), c.id()],
            "native children should match"
        );
    }

    #[test]
    fn test_add_child_reparents() {
        let mut tree = tree();
        let first: VerticalLayout = tree.create().unwrap();
        let second: VerticalLayout = tree.create().unwrap();
        let label: Label = tree.create().unwrap();

        tree.add_child(first, label).unwrap();
        tree.add_child(second, label).unwrap();

        assert!(tree.children(first).is_empty(), "label should have left the first parent");
        assert_eq!(tree.children(second), &[label.id()]);
        assert_eq!(tree.parent(label), Some(Widget::from(second)));
        assert!(tree.runtime().children(first.id()).is_empty());
        assert_eq!(tree.runtime().children(second.id()), &[label.id()]);
    }

    #[test]
    fn test_remove_child_that_is_not_a_child() {
        let mut tree = tree();
        let layout: VerticalLayout = tree.create().unwrap();
        let label: Label = tree.create().unwrap();

        assert_eq!(
            tree.remove_child(layout, label),
            Err(UiError::NotAChild {
                parent: layout.id(),
                child: label.id()
            })
        );

        tree.add_child(layout, label).unwrap();
        tree.remove_child(layout, label).unwrap();
        assert!(tree.children(layout).is_empty());
        assert_eq!(tree.parent(label), None);
        assert!(tree.contains(label), "removing must not destroy");
    }

    #[test]
    fn test_cycles_are_rejected() {
        let mut tree = tree();
        let outer: VerticalLayout = tree.create().unwrap();
        let inner: VerticalLayout = tree.create().unwrap();
        tree.add_child(outer, inner).unwrap();

        assert!(matches!(
            tree.add_child(inner, outer),
            Err(UiError::Cycle { .. })
        ));
        assert!(matches!(
            tree.add_child(outer, outer),
            Err(UiError::Cycle { .. })
        ));
        assert_eq!(tree.children(outer), &[inner.id()]);
    }

    #[test]
    fn test_destroy_is_recursive() {
        let mut tree = tree();
        let screen: Screen = tree.create().unwrap();
        let layout: VerticalLayout = tree.create().unwrap();
        let label: Label = tree.create().unwrap();
        tree.add_child(screen, layout).unwrap();
        tree.add_child(layout, label).unwrap();

        tree.destroy(layout).unwrap();

        assert!(!tree.contains(layout));
        assert!(!tree.contains(label));
        assert!(tree.children(screen).is_empty());
        assert!(!tree.runtime().is_alive(label.id()));
        assert!(!tree.runtime().is_alive(layout.id()));

        let calls = tree.runtime().calls();
        let label_destroyed = calls
            .iter()
            .position(|c| *c == NativeCall::Destroy(label.id()))
            .unwrap();
        let layout_destroyed = calls
            .iter()
            .position(|c| *c == NativeCall::Destroy(layout.id()))
            .unwrap();
        assert!(label_destroyed < layout_destroyed, "children go first");
    }

    #[test]
    fn test_property_type_is_checked_before_the_runtime_sees_it() {
        let mut tree = tree();
        let label: Label = tree.create().unwrap();
        tree.runtime_mut().clear_calls();

        assert!(matches!(
            tree.set_property(label, PropertyKey::FontSize, "large"),
            Err(UiError::PropertyType { .. })
        ));
        assert!(tree.runtime().calls().is_empty());
    }

    #[test]
    fn test_rejected_properties_surface() {
        let mut tree = tree();
        let layout: VerticalLayout = tree.create().unwrap();

        let err = tree.set_property(layout, PropertyKey::Text, "nope").unwrap_err();
        assert!(matches!(err, UiError::Native { .. }));
    }

    #[test]
    fn test_geometry() {
        let mut tree = tree();
        let label: Label = tree.create().unwrap();

        tree.set_size(label, Vector2::new(120, 40)).unwrap();
        tree.set_position(label, Point2::new(5, 10)).unwrap();
        tree.set_background_color(label, Color::Packed(0x00FF00)).unwrap();

        let runtime = tree.runtime();
        assert_eq!(runtime.property(label.id(), "width"), Some(&NativeValue::Int(120)));
        assert_eq!(runtime.property(label.id(), "height"), Some(&NativeValue::Int(40)));
        assert_eq!(runtime.property(label.id(), "left"), Some(&NativeValue::Int(5)));
        assert_eq!(runtime.property(label.id(), "top"), Some(&NativeValue::Int(10)));
        assert_eq!(
            runtime.property(label.id(), "backgroundColor"),
            Some(&NativeValue::Str("0x00FF00".to_string()))
        );
        assert_eq!(tree.get_property_int(label, PropertyKey::Width), Ok(120));
    }

    #[test]
    fn test_downcast() {
        let mut tree = tree();
        let label: Label = tree.create().unwrap();
        let any = Widget::new(label.id());

        assert_eq!(tree.downcast::<Label>(any), Ok(label));
        assert!(matches!(
            tree.downcast::<Button>(any),
            Err(UiError::WrongKind { .. })
        ));
    }

    #[test]
    fn test_unknown_listener_token() {
        let mut tree = tree();
        let label: Label = tree.create().unwrap();
        let token = tree
            .add_listener(
                label,
                Listener::new(|_: &Event, _: &mut EventContext<'_, HeadlessRuntime>| {}),
            )
            .unwrap();

        tree.remove_listener(label, token).unwrap();
        assert_eq!(
            tree.remove_listener(label, token),
            Err(UiError::UnknownListener(token))
        );
    }

    #[test]
    fn test_rejected_move_keeps_the_old_parent() {
        let mut tree = tree();
        let layout: VerticalLayout = tree.create().unwrap();
        let tabs: TabScreen = tree.create().unwrap();
        let a: Label = tree.create().unwrap();
        let label: Label = tree.create().unwrap();
        let b: Label = tree.create().unwrap();
        for child in &[a, label, b] {
            tree.add_child(layout, *child).unwrap();
        }

        // tab screens only hold screens
        assert!(matches!(
            tree.add_child(tabs, label),
            Err(UiError::Native { .. })
        ));

        assert_eq!(tree.parent(label), Some(Widget::from(layout)));
        assert_eq!(tree.children(layout), &[a.id(), label.id(), b.id()]);
        assert_eq!(
            tree.runtime().children(layout.id()),
            &[a.id(), label.id(), b.id()]
        );
        assert!(tree.children(tabs).is_empty());
    }

    #[test]
    fn test_reused_id_leaves_the_live_widget_alone() {
        let mut tree = tree();
        let label: Label = tree.create().unwrap();
        tree.runtime_mut().reuse_id(label.id());
        tree.runtime_mut().clear_calls();

        assert_eq!(tree.create::<Button>(), Err(UiError::IdReused(label.id())));
        assert_eq!(tree.kind(label), Ok(WidgetKind::Label));
        assert!(tree.runtime().is_alive(label.id()));
        assert!(!tree
            .runtime()
            .calls()
            .contains(&NativeCall::Destroy(label.id())));
    }
}
