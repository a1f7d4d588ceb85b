pub mod color;
mod config;
mod dispatch;
mod error;
pub mod events;
pub mod headless;
mod host;
pub mod logging;
pub mod native;
pub mod property;
mod screen;
mod stack;
mod tab;
mod text;
mod tree;
#[macro_use]
mod widget;

pub use color::Color;
pub use config::HostConfig;
pub use error::{UiError, UiResult};
pub use events::{
    Event, EventContext, EventSink, Listener, ListenerToken, StackScreenListener, StackTransition,
    WidgetEvent, WidgetListener,
};
pub use headless::HeadlessRuntime;
pub use host::Host;
pub use native::{NativeError, NativeRuntime, NativeValue, WidgetId, WidgetKind};
pub use property::{Alignment, PropertyKey, PropertyValue};
pub use tree::WidgetTree;
pub use widget::{
    AsWidget, Button, EditBox, HasStackSemantics, HasTabSemantics, HasText, HorizontalLayout,
    IsScreen, Label, Screen, StackScreen, TabScreen, VerticalLayout, Widget, WidgetType,
};
