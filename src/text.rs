//! Text properties.
//!
//! Plain writes: nothing here validates text or numeric ranges.

use crate::color::Color;
use crate::error::UiResult;
use crate::native::NativeRuntime;
use crate::property::{Alignment, PropertyKey};
use crate::tree::WidgetTree;
use crate::widget::HasText;

impl<R: NativeRuntime> WidgetTree<R> {
    pub fn set_text<W: HasText>(&mut self, widget: W, text: &str) -> UiResult<()> {
        self.set_property(widget, PropertyKey::Text, text)
    }

    pub fn text<W: HasText>(&self, widget: W) -> UiResult<String> {
        self.get_property_string(widget, PropertyKey::Text)
    }

    pub fn center_text_horizontally<W: HasText>(&mut self, widget: W) -> UiResult<()> {
        self.set_property(widget, PropertyKey::TextHorizontalAlignment, Alignment::Center)
    }

    pub fn center_text_vertically<W: HasText>(&mut self, widget: W) -> UiResult<()> {
        self.set_property(widget, PropertyKey::TextVerticalAlignment, Alignment::Center)
    }

    /// Sets the font color from a packed `0xRRGGBB` value; written as `0xRRGGBB`.
    pub fn set_font_color<W: HasText>(&mut self, widget: W, rgb: i32) -> UiResult<()> {
        self.set_property(widget, PropertyKey::FontColor, Color::Packed(rgb))
    }

    /// Sets the font color from components.
    ///
    /// Components are written as unpadded hex, see [`Color::Components`].
    pub fn set_font_color_rgb<W: HasText>(
        &mut self,
        widget: W,
        red: i32,
        green: i32,
        blue: i32,
    ) -> UiResult<()> {
        self.set_property(widget, PropertyKey::FontColor, Color::rgb(red, green, blue))
    }

    pub fn set_font_size<W: HasText>(&mut self, widget: W, size: i32) -> UiResult<()> {
        self.set_property(widget, PropertyKey::FontSize, size)
    }
}
