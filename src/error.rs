//! Errors.
//!
//! Nothing in this crate aborts on a failed native request. Every failure comes back as a
//! [`UiError`] and leaves the tree in a state the caller can continue from.

use crate::events::ListenerToken;
use crate::native::{NativeError, WidgetId, WidgetKind};
use crate::property::ValueType;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UiError {
    /// The native runtime refused a request.
    #[error("native runtime rejected {op} on widget {id}: {source}")]
    Native {
        id: WidgetId,
        op: &'static str,
        source: NativeError,
    },

    #[error("native runtime could not create a {kind:?}: {source}")]
    CreateFailed {
        kind: WidgetKind,
        source: NativeError,
    },

    /// The native runtime handed out an identifier that a live widget already owns.
    ///
    /// The identifier still names the live widget, so nothing is destroyed; the runtime owns the
    /// failed creation.
    #[error("native runtime reused live widget id {0}")]
    IdReused(WidgetId),

    #[error("property `{key}` expects a {expected} value, got {found}")]
    PropertyType {
        key: &'static str,
        expected: ValueType,
        found: ValueType,
    },

    #[error("property `{key}` is not an integer: {value:?}")]
    NotAnInteger { key: &'static str, value: String },

    #[error("no widget with id {0}")]
    UnknownWidget(WidgetId),

    /// An event arrived for a widget that has already been destroyed.
    #[error("event for widget {0} which no longer exists")]
    StaleWidget(WidgetId),

    #[error("widget {child} is not a child of {parent}")]
    NotAChild { parent: WidgetId, child: WidgetId },

    #[error("no listener registered with token {0}")]
    UnknownListener(ListenerToken),

    #[error("screen {screen} is already on stack {stack}")]
    AlreadyInStack { stack: WidgetId, screen: WidgetId },

    /// The widget is an element of a stack screen and can only leave it by being popped.
    #[error("widget {0} is held by a stack screen")]
    Stacked(WidgetId),

    /// Stack screens only take screens through `push`.
    #[error("cannot add {child} to stack screen {stack}; push it instead")]
    StackChild { stack: WidgetId, child: WidgetId },

    #[error("adding {child} to {parent} would create a cycle")]
    Cycle { parent: WidgetId, child: WidgetId },

    #[error("widget {0} is not a screen")]
    NotAScreen(WidgetId),

    #[error("widget {id} is a {found:?}, expected {expected:?}")]
    WrongKind {
        id: WidgetId,
        expected: WidgetKind,
        found: WidgetKind,
    },

    /// Operations deferred by listeners failed after the event was delivered.
    #[error("{} deferred operation(s) failed", .0.len())]
    Deferred(Vec<UiError>),
}

pub type UiResult<T> = Result<T, UiError>;

/// Wraps a native error for a request on `id`, logging the rejection.
pub(crate) fn native(id: WidgetId, op: &'static str) -> impl FnOnce(NativeError) -> UiError {
    move |source| {
        tracing::warn!(%id, op, %source, "native runtime rejected request");
        UiError::Native { id, op, source }
    }
}
