//! Typed widget handles and capability traits.
//!
//! Handles are cheap `Copy` wrappers around a [`WidgetId`]; the widgets themselves live in a
//! [`WidgetTree`](crate::WidgetTree). What a handle can do is expressed through capability traits
//! instead of a type hierarchy:
//!
//! - [`IsScreen`]: can be shown, titled, added as a tab, or pushed onto a stack
//! - [`HasText`]: text, alignment, font color and font size
//! - [`HasTabSemantics`]: owns tabs and an active tab index
//! - [`HasStackSemantics`]: owns a LIFO stack of screens

use crate::native::{WidgetId, WidgetKind};

/// Anything that refers to a widget.
pub trait AsWidget: Copy {
    fn id(&self) -> WidgetId;
}

impl AsWidget for WidgetId {
    fn id(&self) -> WidgetId {
        *self
    }
}

/// A handle type bound to one native widget kind.
pub trait WidgetType: AsWidget {
    const KIND: WidgetKind;

    /// Wraps an identifier without checking its kind.
    #[doc(hidden)]
    fn from_id(id: WidgetId) -> Self;
}

pub trait IsScreen: AsWidget {}

pub trait HasText: AsWidget {}

pub trait HasTabSemantics: IsScreen {}

pub trait HasStackSemantics: IsScreen {}

/// Declares a handle type for a widget kind.
///
/// Syntax:
///
/// ```text
/// impl_widget! {
///     /// docs
///     HandleName: WidgetKindVariant, Capability, Capability...;
/// }
/// ```
macro_rules! impl_widget {
    ($(
        $(#[$attr:meta])*
        $name:ident: $kind:ident $(, $cap:ident)*;
    )+) => {
        $(
            $(#[$attr])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub struct $name(WidgetId);

            impl AsWidget for $name {
                fn id(&self) -> WidgetId {
                    self.0
                }
            }

            impl WidgetType for $name {
                const KIND: WidgetKind = WidgetKind::$kind;

                fn from_id(id: WidgetId) -> Self {
                    $name(id)
                }
            }

            $(impl $cap for $name {})*

            impl From<$name> for Widget {
                fn from(handle: $name) -> Widget {
                    Widget(handle.0)
                }
            }
        )+
    };
}

/// A handle to a widget of any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Widget(WidgetId);

impl Widget {
    pub fn new(id: WidgetId) -> Widget {
        Widget(id)
    }
}

impl AsWidget for Widget {
    fn id(&self) -> WidgetId {
        self.0
    }
}

impl_widget! {
    /// A plain screen.
    Screen: Screen, IsScreen;
    /// A screen that shows one of several child screens as tabs.
    TabScreen: TabScreen, IsScreen, HasTabSemantics;
    /// A screen that shows the top of a stack of screens.
    StackScreen: StackScreen, IsScreen, HasStackSemantics;
    Label: Label, HasText;
    Button: Button, HasText;
    EditBox: EditBox, HasText;
    VerticalLayout: VerticalLayout;
    HorizontalLayout: HorizontalLayout;
}
