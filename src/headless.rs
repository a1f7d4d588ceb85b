//! An in-memory native runtime.
//!
//! `HeadlessRuntime` keeps widgets, properties and stacks in plain maps and behaves the way the
//! platform runtimes do where it matters to this crate:
//!
//! - each widget kind only accepts its own properties
//! - writing `selectedTab` changes what `currentTab` reads back, and out-of-range indices are
//!   refused
//! - a widget must be removed from its parent before it can be added elsewhere
//! - stack screens show their top, and the back button pops them unless it was disabled
//!
//! Every request is recorded as a [`NativeCall`] so tests can check what reached the runtime.

use crate::events::{EventSink, WidgetEvent};
use crate::native::{NativeError, NativeRuntime, NativeValue, WidgetId, WidgetKind};
use std::collections::{HashMap, HashSet};

/// A request that reached the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeCall {
    Create(WidgetKind, WidgetId),
    Destroy(WidgetId),
    SetProperty(WidgetId, String, NativeValue),
    AddChild(WidgetId, WidgetId),
    InsertChild(WidgetId, WidgetId, usize),
    RemoveChild(WidgetId),
    StackPush(WidgetId, WidgetId),
    StackPop(WidgetId),
    Show(WidgetId),
}

#[derive(Debug)]
struct NativeWidget {
    kind: WidgetKind,
    properties: HashMap<String, NativeValue>,
    parent: Option<WidgetId>,
    /// For stack screens, the stack with its top last.
    children: Vec<WidgetId>,
}

/// Whether a widget kind has a property.
fn supports(kind: WidgetKind, key: &str) -> bool {
    match key {
        "width" | "height" | "left" | "top" | "backgroundColor" | "visible" | "enabled" => true,
        "text" | "textHorizontalAlignment" | "textVerticalAlignment" | "fontColor" | "fontSize" => {
            kind.has_text()
        }
        "title" => kind.is_screen(),
        "selectedTab" | "currentTab" => kind == WidgetKind::TabScreen,
        "backButtonEnabled" => kind == WidgetKind::StackScreen,
        _ => false,
    }
}

/// Whether `parent` may hold `child` as a regular child.
fn accepts_child(parent: WidgetKind, child: WidgetKind) -> bool {
    match parent {
        WidgetKind::TabScreen => child.is_screen(),
        WidgetKind::Screen | WidgetKind::VerticalLayout | WidgetKind::HorizontalLayout => {
            !child.is_screen()
        }
        _ => false,
    }
}

fn as_int(value: &NativeValue) -> Result<i32, NativeError> {
    match value {
        NativeValue::Int(i) => Ok(*i),
        NativeValue::Str(s) => s.trim().parse().map_err(|_| NativeError::InvalidPropertyValue),
    }
}

#[derive(Debug)]
pub struct HeadlessRuntime {
    next_id: i32,
    widgets: HashMap<WidgetId, NativeWidget>,
    shown: Option<WidgetId>,
    sink: Option<EventSink>,
    rejected: HashSet<String>,
    failing: HashSet<&'static str>,
    reused_id: Option<WidgetId>,
    calls: Vec<NativeCall>,
}

impl Default for HeadlessRuntime {
    fn default() -> Self {
        HeadlessRuntime::new()
    }
}

impl HeadlessRuntime {
    pub fn new() -> HeadlessRuntime {
        HeadlessRuntime {
            next_id: 0,
            widgets: HashMap::new(),
            shown: None,
            sink: None,
            rejected: HashSet::new(),
            failing: HashSet::new(),
            reused_id: None,
            calls: Vec::new(),
        }
    }

    /// Makes every write of `key` fail with [`NativeError::InvalidPropertyValue`].
    pub fn reject(&mut self, key: &str) {
        self.rejected.insert(key.to_string());
    }

    /// Makes every structural request named `op` fail with [`NativeError::InvalidLayout`].
    ///
    /// `op` is the [`NativeRuntime`] method name, e.g. `"stack_push"`.
    pub fn fail(&mut self, op: &'static str) {
        self.failing.insert(op);
    }

    /// Makes the next `create_widget` hand out `id` again, as a faulty runtime would.
    pub fn reuse_id(&mut self, id: WidgetId) {
        self.reused_id = Some(id);
    }

    fn check_failing(&self, op: &'static str) -> Result<(), NativeError> {
        if self.failing.contains(op) {
            return Err(NativeError::InvalidLayout);
        }
        Ok(())
    }

    pub fn calls(&self) -> &[NativeCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn is_alive(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(&id)
    }

    /// The stored value of a property, without defaults.
    pub fn property(&self, id: WidgetId, key: &str) -> Option<&NativeValue> {
        self.widgets.get(&id).and_then(|w| w.properties.get(key))
    }

    /// Native children; for stack screens, the stack.
    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.widgets
            .get(&id)
            .map(|w| w.children.as_slice())
            .unwrap_or(&[])
    }

    /// The screen a stack screen is displaying.
    pub fn visible_screen(&self, stack: WidgetId) -> Option<WidgetId> {
        self.widgets
            .get(&stack)
            .filter(|w| w.kind == WidgetKind::StackScreen)
            .and_then(|w| w.children.last().copied())
    }

    /// The screen shown by the application.
    pub fn shown(&self) -> Option<WidgetId> {
        self.shown
    }

    /// Delivers an event through the attached sink. Returns false if it went nowhere.
    pub fn emit(&self, id: WidgetId, event: WidgetEvent) -> bool {
        match &self.sink {
            Some(sink) => sink.deliver(id, event),
            None => false,
        }
    }

    pub fn click(&self, id: WidgetId) -> bool {
        self.emit(id, WidgetEvent::Clicked)
    }

    /// Simulates the platform back button on a stack screen.
    ///
    /// If the back button is enabled and there is something to pop, pops natively and reports
    /// it with [`WidgetEvent::StackScreenPopped`]. Returns whether a pop happened.
    pub fn press_back(&mut self, stack: WidgetId) -> bool {
        let top = match self.widgets.get(&stack) {
            Some(w)
                if w.kind == WidgetKind::StackScreen
                    && w.children.len() > 1
                    && w.properties.get("backButtonEnabled") != Some(&NativeValue::Int(0)) =>
            {
                w.children.last().copied()
            }
            _ => None,
        };
        let from = match top {
            Some(from) => from,
            None => return false,
        };
        if self.stack_pop(stack).is_err() {
            return false;
        }
        self.emit(stack, WidgetEvent::StackScreenPopped { from });
        true
    }

    fn widget(&self, id: WidgetId) -> Result<&NativeWidget, NativeError> {
        self.widgets.get(&id).ok_or(NativeError::InvalidHandle)
    }

    fn widget_mut(&mut self, id: WidgetId) -> Result<&mut NativeWidget, NativeError> {
        self.widgets.get_mut(&id).ok_or(NativeError::InvalidHandle)
    }

    fn attach(
        &mut self,
        parent: WidgetId,
        child: WidgetId,
        index: usize,
    ) -> Result<(), NativeError> {
        let parent_kind = self.widget(parent)?.kind;
        let child_widget = self.widget(child)?;
        if child_widget.parent.is_some() || !accepts_child(parent_kind, child_widget.kind) {
            return Err(NativeError::InvalidLayout);
        }
        self.widget_mut(child)?.parent = Some(parent);
        self.widget_mut(parent)?.children.insert(index, child);
        Ok(())
    }

    /// Keeps `currentTab` within the remaining tabs.
    fn clamp_current_tab(widget: &mut NativeWidget) {
        if widget.kind != WidgetKind::TabScreen {
            return;
        }
        let count = widget.children.len() as i32;
        if count == 0 {
            widget.properties.remove("currentTab");
        } else if let Some(NativeValue::Int(current)) = widget.properties.get_mut("currentTab") {
            if *current >= count {
                *current = count - 1;
            }
        }
    }
}

impl NativeRuntime for HeadlessRuntime {
    fn create_widget(&mut self, kind: WidgetKind) -> Result<WidgetId, NativeError> {
        if let Some(id) = self.reused_id.take() {
            self.calls.push(NativeCall::Create(kind, id));
            return Ok(id);
        }
        self.next_id += 1;
        let id = WidgetId(self.next_id);
        self.widgets.insert(
            id,
            NativeWidget {
                kind,
                properties: HashMap::new(),
                parent: None,
                children: Vec::new(),
            },
        );
        self.calls.push(NativeCall::Create(kind, id));
        Ok(id)
    }

    fn destroy_widget(&mut self, id: WidgetId) -> Result<(), NativeError> {
        self.calls.push(NativeCall::Destroy(id));
        let widget = self.widgets.remove(&id).ok_or(NativeError::InvalidHandle)?;
        if let Some(parent) = widget.parent.and_then(|p| self.widgets.get_mut(&p)) {
            parent.children.retain(|child| *child != id);
            HeadlessRuntime::clamp_current_tab(parent);
        }
        for child in widget.children {
            if let Some(child) = self.widgets.get_mut(&child) {
                child.parent = None;
            }
        }
        if self.shown == Some(id) {
            self.shown = None;
        }
        Ok(())
    }

    fn set_property(
        &mut self,
        id: WidgetId,
        key: &str,
        value: &NativeValue,
    ) -> Result<(), NativeError> {
        self.calls
            .push(NativeCall::SetProperty(id, key.to_string(), value.clone()));
        let rejected = self.rejected.contains(key);
        let widget = self.widget_mut(id)?;
        if !supports(widget.kind, key) {
            return Err(NativeError::InvalidPropertyName);
        }
        if rejected {
            return Err(NativeError::InvalidPropertyValue);
        }

        match key {
            "selectedTab" => {
                let index = as_int(value)?;
                if index < 0 || index as usize >= widget.children.len() {
                    return Err(NativeError::InvalidPropertyValue);
                }
                widget
                    .properties
                    .insert("currentTab".to_string(), NativeValue::Int(index));
                return Ok(());
            }
            "currentTab" => return Err(NativeError::Unsupported),
            "backButtonEnabled" | "visible" | "enabled" => match as_int(value)? {
                0 | 1 => {}
                _ => return Err(NativeError::InvalidPropertyValue),
            },
            _ => {}
        }
        widget.properties.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn get_property(&self, id: WidgetId, key: &str) -> Result<NativeValue, NativeError> {
        let widget = self.widget(id)?;
        if !supports(widget.kind, key) {
            return Err(NativeError::InvalidPropertyName);
        }
        if let Some(value) = widget.properties.get(key) {
            return Ok(value.clone());
        }
        match key {
            "selectedTab" => Err(NativeError::Unsupported),
            "currentTab" if widget.children.is_empty() => Err(NativeError::InvalidPropertyValue),
            "backButtonEnabled" | "visible" | "enabled" => Ok(NativeValue::Int(1)),
            "currentTab" | "width" | "height" | "left" | "top" | "fontSize" => {
                Ok(NativeValue::Int(0))
            }
            _ => Ok(NativeValue::Str(String::new())),
        }
    }

    fn add_child(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), NativeError> {
        self.calls.push(NativeCall::AddChild(parent, child));
        self.check_failing("add_child")?;
        let index = self.widget(parent)?.children.len();
        self.attach(parent, child, index)
    }

    fn insert_child(
        &mut self,
        parent: WidgetId,
        child: WidgetId,
        index: usize,
    ) -> Result<(), NativeError> {
        self.calls.push(NativeCall::InsertChild(parent, child, index));
        self.check_failing("insert_child")?;
        if index > self.widget(parent)?.children.len() {
            return Err(NativeError::InvalidPropertyValue);
        }
        self.attach(parent, child, index)
    }

    fn remove_child(&mut self, child: WidgetId) -> Result<(), NativeError> {
        self.calls.push(NativeCall::RemoveChild(child));
        self.check_failing("remove_child")?;
        let parent = self.widget(child)?.parent.ok_or(NativeError::InvalidLayout)?;
        let parent_widget = self.widget_mut(parent)?;
        if parent_widget.kind == WidgetKind::StackScreen {
            return Err(NativeError::InvalidLayout);
        }
        parent_widget.children.retain(|id| *id != child);
        HeadlessRuntime::clamp_current_tab(parent_widget);
        self.widget_mut(child)?.parent = None;
        Ok(())
    }

    fn stack_push(&mut self, stack: WidgetId, screen: WidgetId) -> Result<(), NativeError> {
        self.calls.push(NativeCall::StackPush(stack, screen));
        self.check_failing("stack_push")?;
        if self.widget(stack)?.kind != WidgetKind::StackScreen {
            return Err(NativeError::Unsupported);
        }
        let screen_widget = self.widget(screen)?;
        if !screen_widget.kind.is_screen() || screen_widget.parent.is_some() {
            return Err(NativeError::InvalidLayout);
        }
        self.widget_mut(screen)?.parent = Some(stack);
        self.widget_mut(stack)?.children.push(screen);
        Ok(())
    }

    fn stack_pop(&mut self, stack: WidgetId) -> Result<(), NativeError> {
        self.calls.push(NativeCall::StackPop(stack));
        self.check_failing("stack_pop")?;
        let widget = self.widget_mut(stack)?;
        if widget.kind != WidgetKind::StackScreen {
            return Err(NativeError::Unsupported);
        }
        let popped = widget.children.pop().ok_or(NativeError::InvalidLayout)?;
        self.widget_mut(popped)?.parent = None;
        Ok(())
    }

    fn stack_depth(&self, stack: WidgetId) -> Result<usize, NativeError> {
        let widget = self.widget(stack)?;
        if widget.kind != WidgetKind::StackScreen {
            return Err(NativeError::Unsupported);
        }
        Ok(widget.children.len())
    }

    fn show_screen(&mut self, screen: WidgetId) -> Result<(), NativeError> {
        self.calls.push(NativeCall::Show(screen));
        if !self.widget(screen)?.kind.is_screen() {
            return Err(NativeError::Unsupported);
        }
        self.shown = Some(screen);
        Ok(())
    }

    fn attach_event_sink(&mut self, sink: EventSink) {
        self.sink = Some(sink);
    }
}
