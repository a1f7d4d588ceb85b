//! Colors and their native string encodings.

/// An RGB color as the native runtime receives it.
///
/// The two variants encode differently on the wire and native runtimes expect both forms, so
/// they are kept apart instead of being normalized into one representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// A packed `0xRRGGBB` value.
    ///
    /// Encoded as `0x` followed by at least six uppercase hex digits.
    Packed(i32),

    /// Separate red, green and blue components, nominally 0–255.
    ///
    /// Each component is encoded as uppercase hex *without* padding and the three are
    /// concatenated, so `(255, 0, 0)` becomes `0xFF00`. Components below 0x10 therefore don’t
    /// have a fixed width.
    Components(i32, i32, i32),
}

impl Color {
    /// Creates a color from its components.
    pub fn rgb(red: i32, green: i32, blue: i32) -> Color {
        Color::Components(red, green, blue)
    }

    /// Returns the native property string for this color.
    pub fn encode(&self) -> String {
        match *self {
            Color::Packed(rgb) => format!("0x{:06X}", rgb),
            Color::Components(r, g, b) => format!("0x{:X}{:X}{:X}", r, g, b),
        }
    }
}

impl From<i32> for Color {
    fn from(rgb: i32) -> Color {
        Color::Packed(rgb)
    }
}

#[test]
fn test_packed_colors_are_zero_padded() {
    assert_eq!(Color::Packed(0x1A2B3C).encode(), "0x1A2B3C");
    assert_eq!(Color::Packed(0xFF).encode(), "0x0000FF");
    assert_eq!(Color::Packed(0).encode(), "0x000000");
}

#[test]
fn test_component_colors_are_not_padded() {
    assert_eq!(Color::rgb(255, 0, 0).encode(), "0xFF00");
    assert_eq!(Color::rgb(0x12, 0x34, 0x56).encode(), "0x123456");
    assert_eq!(Color::rgb(1, 2, 3).encode(), "0x123");
}
