//! Typed properties and their native encodings.

use crate::color::Color;
use crate::error::{native, UiError, UiResult};
use crate::native::{NativeRuntime, NativeValue, WidgetId};
use core::fmt;
use tracing::trace;

/// Known property keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Text,
    TextHorizontalAlignment,
    TextVerticalAlignment,
    FontColor,
    FontSize,
    Title,
    /// Write-only tab selection on tab screens.
    SelectedTab,
    /// The tab the native runtime is currently showing.
    CurrentTab,
    BackButtonEnabled,
    Width,
    Height,
    Left,
    Top,
    BackgroundColor,
    Visible,
    Enabled,
    /// A key outside the known set. Accepts any value type.
    Custom(&'static str),
}

impl PropertyKey {
    /// The key’s name in the native protocol.
    pub fn name(self) -> &'static str {
        match self {
            PropertyKey::Text => "text",
            PropertyKey::TextHorizontalAlignment => "textHorizontalAlignment",
            PropertyKey::TextVerticalAlignment => "textVerticalAlignment",
            PropertyKey::FontColor => "fontColor",
            PropertyKey::FontSize => "fontSize",
            PropertyKey::Title => "title",
            PropertyKey::SelectedTab => "selectedTab",
            PropertyKey::CurrentTab => "currentTab",
            PropertyKey::BackButtonEnabled => "backButtonEnabled",
            PropertyKey::Width => "width",
            PropertyKey::Height => "height",
            PropertyKey::Left => "left",
            PropertyKey::Top => "top",
            PropertyKey::BackgroundColor => "backgroundColor",
            PropertyKey::Visible => "visible",
            PropertyKey::Enabled => "enabled",
            PropertyKey::Custom(name) => name,
        }
    }

    /// The declared value type, or `None` if any type is accepted.
    pub fn value_type(self) -> Option<ValueType> {
        Some(match self {
            PropertyKey::Text | PropertyKey::Title => ValueType::Str,
            PropertyKey::TextHorizontalAlignment | PropertyKey::TextVerticalAlignment => {
                ValueType::Alignment
            }
            PropertyKey::FontColor | PropertyKey::BackgroundColor => ValueType::Color,
            PropertyKey::FontSize
            | PropertyKey::SelectedTab
            | PropertyKey::CurrentTab
            | PropertyKey::Width
            | PropertyKey::Height
            | PropertyKey::Left
            | PropertyKey::Top => ValueType::Int,
            PropertyKey::BackButtonEnabled | PropertyKey::Visible | PropertyKey::Enabled => {
                ValueType::Bool
            }
            PropertyKey::Custom(_) => return None,
        })
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Str,
    Int,
    Bool,
    Alignment,
    Color,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ValueType::Str => "string",
            ValueType::Int => "integer",
            ValueType::Bool => "boolean",
            ValueType::Alignment => "alignment",
            ValueType::Color => "color",
        })
    }
}

/// Text alignment constants.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    Left = 0,
    Center = 1,
    Right = 2,
    Top = 3,
    Bottom = 4,
}

impl Alignment {
    /// The integer the native runtime uses for this constant.
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// A typed property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Str(String),
    Int(i32),
    Bool(bool),
    Alignment(Alignment),
    Color(Color),
}

impl PropertyValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            PropertyValue::Str(_) => ValueType::Str,
            PropertyValue::Int(_) => ValueType::Int,
            PropertyValue::Bool(_) => ValueType::Bool,
            PropertyValue::Alignment(_) => ValueType::Alignment,
            PropertyValue::Color(_) => ValueType::Color,
        }
    }

    /// Converts this value into the native protocol’s encoding.
    pub fn encode(&self) -> NativeValue {
        match self {
            PropertyValue::Str(s) => NativeValue::Str(s.clone()),
            PropertyValue::Int(i) => NativeValue::Int(*i),
            PropertyValue::Bool(b) => NativeValue::Int(*b as i32),
            PropertyValue::Alignment(a) => NativeValue::Int(a.code()),
            PropertyValue::Color(c) => NativeValue::Str(c.encode()),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Str(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Str(s)
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        PropertyValue::Int(i)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<Alignment> for PropertyValue {
    fn from(a: Alignment) -> Self {
        PropertyValue::Alignment(a)
    }
}

impl From<Color> for PropertyValue {
    fn from(c: Color) -> Self {
        PropertyValue::Color(c)
    }
}

/// Typed access to the properties of one native widget.
///
/// Nothing is cached: every read goes to the native runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyHandle {
    id: WidgetId,
}

impl PropertyHandle {
    pub fn new(id: WidgetId) -> PropertyHandle {
        PropertyHandle { id }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// Validates the value against the key’s declared type, encodes it, and writes it.
    pub fn set<R: NativeRuntime>(
        &self,
        runtime: &mut R,
        key: PropertyKey,
        value: PropertyValue,
    ) -> UiResult<()> {
        if let Some(expected) = key.value_type() {
            let found = value.value_type();
            if found != expected {
                tracing::warn!(id = %self.id, %key, %expected, %found, "property type mismatch");
                return Err(UiError::PropertyType {
                    key: key.name(),
                    expected,
                    found,
                });
            }
        }
        self.set_native(runtime, key, &value.encode())
    }

    /// Writes an already encoded value.
    pub fn set_native<R: NativeRuntime>(
        &self,
        runtime: &mut R,
        key: PropertyKey,
        value: &NativeValue,
    ) -> UiResult<()> {
        trace!(id = %self.id, %key, %value, "set property");
        runtime
            .set_property(self.id, key.name(), value)
            .map_err(native(self.id, "set_property"))
    }

    pub fn get<R: NativeRuntime>(&self, runtime: &R, key: PropertyKey) -> UiResult<NativeValue> {
        let value = runtime
            .get_property(self.id, key.name())
            .map_err(native(self.id, "get_property"))?;
        trace!(id = %self.id, %key, %value, "get property");
        Ok(value)
    }

    pub fn get_int<R: NativeRuntime>(&self, runtime: &R, key: PropertyKey) -> UiResult<i32> {
        match self.get(runtime, key)? {
            NativeValue::Int(i) => Ok(i),
            NativeValue::Str(s) => s.trim().parse().map_err(|_| UiError::NotAnInteger {
                key: key.name(),
                value: s,
            }),
        }
    }

    pub fn get_string<R: NativeRuntime>(&self, runtime: &R, key: PropertyKey) -> UiResult<String> {
        Ok(match self.get(runtime, key)? {
            NativeValue::Str(s) => s,
            NativeValue::Int(i) => i.to_string(),
        })
    }
}
