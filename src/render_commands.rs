use std::borrow::Cow;

use crate::color::Color;
use crate::elements::{BorderWidth, CornerRadius};
use crate::math::BoundingBox;

/// Represents a rectangle with a specified color and corner radii.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rectangle {
    pub color: Color,
    pub corner_radii: CornerRadius,
}

/// One wrapped line of a text element.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Text {
    /// The line's characters. Borrowed when the element was declared with a static string.
    pub text: Cow<'static, str>,
    pub color: Color,
    pub font_id: u16,
    pub font_size: u16,
    pub letter_spacing: u16,
    pub line_height: u16,
}

/// Represents a border with a specified color, width, and corner radii.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Border {
    pub color: Color,
    pub corner_radii: CornerRadius,
    pub width: BorderWidth,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Image {
    /// Tint, taken from the element's background color.
    pub background_color: Color,
    pub corner_radii: CornerRadius,
    /// The handle given in the element's image config.
    pub data: usize,
}

/// Represents a custom element with a background color, corner radii, and associated data.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Custom<CustomElementData> {
    pub background_color: Color,
    pub corner_radii: CornerRadius,
    pub data: CustomElementData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum RenderCommandType {
    Rectangle,
    Border,
    Text,
    Image,
    ScissorStart,
    ScissorEnd,
    Custom,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RenderCommandConfig<CustomElementData> {
    Rectangle(Rectangle),
    Border(Border),
    Text(Text),
    Image(Image),
    /// Clip everything up to the matching [`RenderCommandConfig::ScissorEnd`] to the command's
    /// bounding box.
    ScissorStart,
    ScissorEnd,
    Custom(Custom<CustomElementData>),
}

impl<CustomElementData> RenderCommandConfig<CustomElementData> {
    pub fn command_type(&self) -> RenderCommandType {
        match self {
            Self::Rectangle(_) => RenderCommandType::Rectangle,
            Self::Border(_) => RenderCommandType::Border,
            Self::Text(_) => RenderCommandType::Text,
            Self::Image(_) => RenderCommandType::Image,
            Self::ScissorStart => RenderCommandType::ScissorStart,
            Self::ScissorEnd => RenderCommandType::ScissorEnd,
            Self::Custom(_) => RenderCommandType::Custom,
        }
    }
}

/// Represents a render command for drawing an element on the screen.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderCommand<CustomElementData> {
    /// Absolute position and size in layout coordinates.
    pub bounding_box: BoundingBox,
    pub config: RenderCommandConfig<CustomElementData>,
    /// Derived from the owning element's id. Stable across frames for an unchanged tree.
    pub id: u32,
    /// The z-index of the root the command belongs to.
    /// Commands are already sorted; this is informational for the renderer.
    pub z_index: i16,
    pub user_data: usize,
}

impl<CustomElementData> RenderCommand<CustomElementData> {
    #[inline]
    pub fn command_type(&self) -> RenderCommandType {
        self.config.command_type()
    }
}
