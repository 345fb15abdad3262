use crate::align::{AlignX, AlignY};
use crate::color::Color;
use crate::id::Id;
use crate::layout::LayoutConfig;
use crate::math::{Dimensions, Vector2};

/// Specifies how pointer capture should behave for floating elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PointerCaptureMode {
    /// Elements below this floating root are not hit tested.
    #[default]
    Capture,
    /// Allows pointer input to pass through.
    Passthrough,
}

/// Defines how a floating element is attached to other elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FloatingAttachToElement {
    /// The floating element is attached to its parent element.
    #[default]
    Parent,
    /// The floating element is attached to a specific element identified by an ID.
    ElementWithId,
    /// The floating element is attached to the root of the layout.
    Root,
}

/// Defines how a floating element is clipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FloatingClipToElement {
    /// The floating element is not clipped.
    #[default]
    None,
    /// The floating element inherits the clip region of the element it is attached to.
    AttachedParent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloatingAttachPoints {
    pub element_x: AlignX,
    pub element_y: AlignY,
    pub parent_x: AlignX,
    pub parent_y: AlignY,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloatingConfig {
    pub offset: Vector2,
    /// Grows the emitted bounding box on each side without affecting layout.
    pub expand: Dimensions,
    /// Only read when `attach_to` is [`FloatingAttachToElement::ElementWithId`].
    pub parent_id: u32,
    pub z_index: i16,
    pub attach_points: FloatingAttachPoints,
    pub pointer_capture_mode: PointerCaptureMode,
    pub attach_to: FloatingAttachToElement,
    pub clip_to: FloatingClipToElement,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollConfig {
    pub horizontal: bool,
    pub vertical: bool,
    /// Offset applied to every child. Filled from the retained scroll position when declared.
    pub child_offset: Vector2,
}

impl ScrollConfig {
    #[inline]
    pub(crate) fn along(&self, x_axis: bool) -> bool {
        if x_axis {
            self.horizontal
        } else {
            self.vertical
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageConfig {
    /// Opaque handle the renderer resolves to an image.
    pub data: usize,
    /// Width divided by height. Zero leaves both axes to the sizing rules.
    pub aspect_ratio: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CornerRadius {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_left: f32,
    pub bottom_right: f32,
}

impl CornerRadius {
    pub fn is_zero(&self) -> bool {
        self.top_left == 0.0
            && self.top_right == 0.0
            && self.bottom_left == 0.0
            && self.bottom_right == 0.0
    }
}

impl From<f32> for CornerRadius {
    /// Creates a corner radius with the same value for all corners.
    fn from(value: f32) -> Self {
        Self {
            top_left: value,
            top_right: value,
            bottom_left: value,
            bottom_right: value,
        }
    }
}

impl From<(f32, f32, f32, f32)> for CornerRadius {
    /// Creates corner radii from a tuple in CSS order: (top-left, top-right, bottom-right, bottom-left).
    fn from((tl, tr, br, bl): (f32, f32, f32, f32)) -> Self {
        Self {
            top_left: tl,
            top_right: tr,
            bottom_left: bl,
            bottom_right: br,
        }
    }
}

/// Defines the border width for each side of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BorderWidth {
    pub left: u16,
    pub right: u16,
    pub top: u16,
    pub bottom: u16,
    /// Width of the separators drawn in the gaps between children.
    pub between_children: u16,
}

impl BorderWidth {
    pub fn is_zero(&self) -> bool {
        self.left == 0
            && self.right == 0
            && self.top == 0
            && self.bottom == 0
            && self.between_children == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BorderConfig {
    pub color: Color,
    pub width: BorderWidth,
}

/// Everything that can be attached to an open element.
///
/// Optional parts that are `None` attach nothing. A transparent background with zero radius and
/// zero user data attaches no shared config either.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDeclaration<CustomElementData = ()> {
    /// Re-registers the element under this id instead of its anonymous one.
    pub id: Option<Id>,
    pub layout: LayoutConfig,
    pub background_color: Color,
    pub corner_radius: CornerRadius,
    pub user_data: usize,
    pub image: Option<ImageConfig>,
    pub floating: Option<FloatingConfig>,
    pub scroll: Option<ScrollConfig>,
    pub border: Option<BorderConfig>,
    pub custom_data: Option<CustomElementData>,
}

impl<CustomElementData> Default for ElementDeclaration<CustomElementData> {
    fn default() -> Self {
        Self {
            id: None,
            layout: LayoutConfig::default(),
            background_color: Color::TRANSPARENT,
            corner_radius: CornerRadius::default(),
            user_data: 0,
            image: None,
            floating: None,
            scroll: None,
            border: None,
            custom_data: None,
        }
    }
}

/// Builder for configuring floating element properties using a closure.
pub struct FloatingBuilder {
    pub(crate) config: FloatingConfig,
}

impl FloatingBuilder {
    /// Sets the floating element's offset.
    #[inline]
    pub fn offset(&mut self, x: f32, y: f32) -> &mut Self {
        self.config.offset = Vector2::new(x, y);
        self
    }

    /// Grows the emitted bounding box by `width` on the left and right, `height` on top and bottom.
    #[inline]
    pub fn expand(&mut self, width: f32, height: f32) -> &mut Self {
        self.config.expand = Dimensions::new(width, height);
        self
    }

    /// Sets the floating element's Z-index.
    #[inline]
    pub fn z_index(&mut self, z_index: i16) -> &mut Self {
        self.config.z_index = z_index;
        self
    }

    /// Sets the attachment points of the floating element and its parent.
    ///
    /// Each tuple is `(AlignX, AlignY)`, the first for the element, the second for the parent.
    /// ```ignore
    /// .floating(|f| f.anchor((CenterX, Bottom), (CenterX, Top)))
    /// ```
    #[inline]
    pub fn anchor(&mut self, element: (AlignX, AlignY), parent: (AlignX, AlignY)) -> &mut Self {
        self.config.attach_points = FloatingAttachPoints {
            element_x: element.0,
            element_y: element.1,
            parent_x: parent.0,
            parent_y: parent.1,
        };
        self
    }

    /// Attaches this floating element to its parent element (default behavior).
    #[inline]
    pub fn attach_parent(&mut self) -> &mut Self {
        self.config.attach_to = FloatingAttachToElement::Parent;
        self
    }

    /// Attaches this floating element to the root of the layout.
    #[inline]
    pub fn attach_root(&mut self) -> &mut Self {
        self.config.attach_to = FloatingAttachToElement::Root;
        self
    }

    /// Attaches this floating element to a specific element by ID.
    #[inline]
    pub fn attach_id(&mut self, id: impl Into<Id>) -> &mut Self {
        self.config.attach_to = FloatingAttachToElement::ElementWithId;
        self.config.parent_id = id.into().id;
        self
    }

    /// Clips this floating element to the clip region of the element it is attached to.
    #[inline]
    pub fn clip_by_parent(&mut self) -> &mut Self {
        self.config.clip_to = FloatingClipToElement::AttachedParent;
        self
    }

    /// Sets pointer capture mode to Passthrough.
    #[inline]
    pub fn passthrough(&mut self) -> &mut Self {
        self.config.pointer_capture_mode = PointerCaptureMode::Passthrough;
        self
    }
}

/// Builder for configuring border properties using a closure.
pub struct BorderBuilder {
    pub(crate) config: BorderConfig,
}

impl BorderBuilder {
    /// Sets the border color.
    #[inline]
    pub fn color(&mut self, color: impl Into<Color>) -> &mut Self {
        self.config.color = color.into();
        self
    }

    /// Set the same border width for all sides.
    #[inline]
    pub fn all(&mut self, width: u16) -> &mut Self {
        self.config.width.left = width;
        self.config.width.right = width;
        self.config.width.top = width;
        self.config.width.bottom = width;
        self
    }

    #[inline]
    pub fn left(&mut self, width: u16) -> &mut Self {
        self.config.width.left = width;
        self
    }

    #[inline]
    pub fn right(&mut self, width: u16) -> &mut Self {
        self.config.width.right = width;
        self
    }

    #[inline]
    pub fn top(&mut self, width: u16) -> &mut Self {
        self.config.width.top = width;
        self
    }

    #[inline]
    pub fn bottom(&mut self, width: u16) -> &mut Self {
        self.config.width.bottom = width;
        self
    }

    /// Sets the width of the separators drawn between children.
    #[inline]
    pub fn between_children(&mut self, width: u16) -> &mut Self {
        self.config.width.between_children = width;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_radius_tuple_is_css_order() {
        let radius: CornerRadius = (1.0, 2.0, 3.0, 4.0).into();
        assert_eq!(radius.top_left, 1.0);
        assert_eq!(radius.top_right, 2.0);
        assert_eq!(radius.bottom_right, 3.0);
        assert_eq!(radius.bottom_left, 4.0);
        assert!(CornerRadius::from(0.0).is_zero());
    }

    #[test]
    fn floating_builder_sets_attach_target() {
        let mut builder = FloatingBuilder {
            config: FloatingConfig::default(),
        };
        builder
            .attach_id("Tooltip")
            .anchor((AlignX::CenterX, AlignY::Bottom), (AlignX::CenterX, AlignY::Top))
            .passthrough();
        assert_eq!(builder.config.attach_to, FloatingAttachToElement::ElementWithId);
        assert_eq!(builder.config.parent_id, Id::new("Tooltip").id);
        assert_eq!(builder.config.attach_points.parent_y, AlignY::Top);
        assert_eq!(
            builder.config.pointer_capture_mode,
            PointerCaptureMode::Passthrough
        );
    }

    #[test]
    fn border_between_children_alone_is_not_zero() {
        let mut builder = BorderBuilder {
            config: BorderConfig::default(),
        };
        assert!(builder.config.width.is_zero());
        builder.between_children(2);
        assert!(!builder.config.width.is_zero());
    }
}
