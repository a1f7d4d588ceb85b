//! The boundary to the native widget runtime.
//!
//! Everything in this crate talks to the platform through [`NativeRuntime`]. The runtime owns the
//! actual widgets; this crate only ever sees their identifiers and reads and writes their
//! properties as strings or integers.

use crate::events::EventSink;
use core::fmt;
use thiserror::Error;

/// An opaque widget handle assigned by the native runtime.
///
/// The runtime guarantees that an identifier is not reused while the widget it names is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WidgetId(pub i32);

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Types of native widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Screen,
    TabScreen,
    StackScreen,
    Label,
    Button,
    EditBox,
    VerticalLayout,
    HorizontalLayout,
}

impl WidgetKind {
    /// The type name the native runtime uses for this kind.
    pub fn native_name(self) -> &'static str {
        match self {
            WidgetKind::Screen => "Screen",
            WidgetKind::TabScreen => "TabScreen",
            WidgetKind::StackScreen => "StackScreen",
            WidgetKind::Label => "Label",
            WidgetKind::Button => "Button",
            WidgetKind::EditBox => "EditBox",
            WidgetKind::VerticalLayout => "VerticalLayout",
            WidgetKind::HorizontalLayout => "HorizontalLayout",
        }
    }

    /// If true, widgets of this kind are navigable surfaces that can be tabs or stack elements.
    pub fn is_screen(self) -> bool {
        match self {
            WidgetKind::Screen | WidgetKind::TabScreen | WidgetKind::StackScreen => true,
            _ => false,
        }
    }

    /// If true, widgets of this kind carry text properties.
    pub fn has_text(self) -> bool {
        match self {
            WidgetKind::Label | WidgetKind::Button | WidgetKind::EditBox => true,
            _ => false,
        }
    }
}

/// A property value in the native protocol's encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeValue {
    Str(String),
    Int(i32),
}

impl fmt::Display for NativeValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NativeValue::Str(s) => write!(f, "{}", s),
            NativeValue::Int(i) => write!(f, "{}", i),
        }
    }
}

/// Result codes the native runtime reports when it refuses a request.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeError {
    #[error("invalid widget handle")]
    InvalidHandle,
    #[error("invalid property name")]
    InvalidPropertyName,
    #[error("invalid property value")]
    InvalidPropertyValue,
    #[error("invalid layout")]
    InvalidLayout,
    #[error("not supported by this widget kind")]
    Unsupported,
}

/// A native widget runtime.
///
/// Every call is a synchronous round trip. Implementations are the authority on which
/// properties and values a widget kind accepts; callers never cache what they wrote.
pub trait NativeRuntime: 'static {
    /// Creates a native widget and returns its handle.
    fn create_widget(&mut self, kind: WidgetKind) -> Result<WidgetId, NativeError>;

    /// Destroys a native widget and releases its handle.
    fn destroy_widget(&mut self, id: WidgetId) -> Result<(), NativeError>;

    /// Writes a property.
    fn set_property(
        &mut self,
        id: WidgetId,
        key: &str,
        value: &NativeValue,
    ) -> Result<(), NativeError>;

    /// Reads the current value of a property.
    fn get_property(&self, id: WidgetId, key: &str) -> Result<NativeValue, NativeError>;

    /// Appends a child to a native widget.
    fn add_child(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), NativeError>;

    /// Inserts a child at `index` among its parent's children.
    fn insert_child(
        &mut self,
        parent: WidgetId,
        child: WidgetId,
        index: usize,
    ) -> Result<(), NativeError>;

    /// Removes a widget from its native parent.
    fn remove_child(&mut self, child: WidgetId) -> Result<(), NativeError>;

    /// Pushes a screen onto a native stack screen and shows it.
    fn stack_push(&mut self, stack: WidgetId, screen: WidgetId) -> Result<(), NativeError>;

    /// Pops the top screen of a native stack screen and shows the previous one.
    fn stack_pop(&mut self, stack: WidgetId) -> Result<(), NativeError>;

    /// Number of screens currently on a native stack screen.
    ///
    /// The runtime may pop on its own (the back button), so this can be smaller than what was
    /// pushed.
    fn stack_depth(&self, stack: WidgetId) -> Result<usize, NativeError>;

    /// Makes a screen the one shown by the application.
    fn show_screen(&mut self, screen: WidgetId) -> Result<(), NativeError>;

    /// Hands the runtime the sink through which it delivers widget events.
    ///
    /// Runtimes that never emit events may ignore it.
    fn attach_event_sink(&mut self, sink: EventSink) {
        drop(sink);
    }
}
