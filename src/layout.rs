use crate::align::{AlignX, AlignY};

/// Which rule the sizing solver applies to an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum SizingType {
    /// Wraps the content, clamped to `[min, max]`.
    #[default]
    Fit,
    /// Takes a share of the parent's leftover space, clamped to `[min, max]`.
    Grow,
    /// A fraction of the parent's inner size.
    Percent,
    /// Exactly `min == max` pixels.
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizingMinMax {
    pub min: f32,
    pub max: f32,
}

/// Resolved sizing rule for one axis.
///
/// A `max` of zero or less means unbounded; the engine replaces it when the element closes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizingAxis {
    pub type_: SizingType,
    pub min_max: SizingMinMax,
    pub percent: f32,
}

impl SizingAxis {
    pub(crate) fn fixed(size: f32) -> Self {
        Sizing::Fixed(size).into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizingConfig {
    pub width: SizingAxis,
    pub height: SizingAxis,
}

impl SizingConfig {
    #[inline]
    pub(crate) fn along(&self, x_axis: bool) -> &SizingAxis {
        if x_axis {
            &self.width
        } else {
            &self.height
        }
    }

    #[inline]
    pub(crate) fn along_mut(&mut self, x_axis: bool) -> &mut SizingAxis {
        if x_axis {
            &mut self.width
        } else {
            &mut self.height
        }
    }
}

/// Sizing rule for one axis as written in a declaration.
///
/// Bounds of `0.0` for a max mean "no limit".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sizing {
    Fit(f32, f32),
    Grow(f32, f32),
    Fixed(f32),
    /// Fraction of the parent in `0.0..=1.0`; larger values are reported and clamped.
    Percent(f32),
}

impl From<Sizing> for SizingAxis {
    fn from(value: Sizing) -> Self {
        let (type_, min, max, percent) = match value {
            Sizing::Fit(min, max) => (SizingType::Fit, min, max, 0.0),
            Sizing::Grow(min, max) => (SizingType::Grow, min, max, 0.0),
            Sizing::Fixed(size) => (SizingType::Fixed, size, size, 0.0),
            Sizing::Percent(percent) => (SizingType::Percent, 0.0, 0.0, percent),
        };
        Self {
            type_,
            min_max: SizingMinMax { min, max },
            percent,
        }
    }
}

/// Space between an element's edge and its children, in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Padding {
    pub left: u16,
    pub right: u16,
    pub top: u16,
    pub bottom: u16,
}

impl Padding {
    pub fn new(left: u16, right: u16, top: u16, bottom: u16) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub fn all(value: u16) -> Self {
        Self::new(value, value, value, value)
    }

    /// Left and right only.
    pub fn horizontal(value: u16) -> Self {
        Self::new(value, value, 0, 0)
    }

    /// Top and bottom only.
    pub fn vertical(value: u16) -> Self {
        Self::new(0, 0, value, value)
    }

    /// Combined padding of both sides of one axis.
    #[inline]
    pub(crate) fn along(&self, x_axis: bool) -> f32 {
        if x_axis {
            self.left as f32 + self.right as f32
        } else {
            self.top as f32 + self.bottom as f32
        }
    }
}

impl From<u16> for Padding {
    fn from(value: u16) -> Self {
        Self::all(value)
    }
}

impl From<(u16, u16, u16, u16)> for Padding {
    /// CSS order: (top, right, bottom, left).
    fn from((top, right, bottom, left): (u16, u16, u16, u16)) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }
}

/// The axis children are stacked along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum LayoutDirection {
    #[default]
    LeftToRight,
    TopToBottom,
}

impl LayoutDirection {
    /// Whether children are stacked along `x_axis`.
    #[inline]
    pub(crate) fn is_along(self, x_axis: bool) -> bool {
        (self == LayoutDirection::LeftToRight) == x_axis
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChildAlignment {
    pub x: AlignX,
    pub y: AlignY,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutConfig {
    pub sizing: SizingConfig,
    pub padding: Padding,
    pub child_gap: u16,
    pub child_alignment: ChildAlignment,
    pub layout_direction: LayoutDirection,
}

/// Builder for configuring layout properties using a closure.
pub struct LayoutBuilder {
    pub(crate) config: LayoutConfig,
}

impl LayoutBuilder {
    /// Sets the width sizing rule.
    #[inline]
    pub fn width(&mut self, width: impl Into<SizingAxis>) -> &mut Self {
        self.config.sizing.width = width.into();
        self
    }

    /// Sets the height sizing rule.
    #[inline]
    pub fn height(&mut self, height: impl Into<SizingAxis>) -> &mut Self {
        self.config.sizing.height = height.into();
        self
    }

    /// Sets the spacing between child elements.
    #[inline]
    pub fn gap(&mut self, gap: u16) -> &mut Self {
        self.config.child_gap = gap;
        self
    }

    /// Sets the alignment of child elements using separate X and Y values.
    #[inline]
    pub fn align(&mut self, x: AlignX, y: AlignY) -> &mut Self {
        self.config.child_alignment = ChildAlignment { x, y };
        self
    }

    /// Sets the layout direction.
    #[inline]
    pub fn direction(&mut self, direction: LayoutDirection) -> &mut Self {
        self.config.layout_direction = direction;
        self
    }

    /// Sets padding values for the layout.
    #[inline]
    pub fn padding(&mut self, padding: impl Into<Padding>) -> &mut Self {
        self.config.padding = padding.into();
        self
    }
}

/// Shorthand macro for [`Sizing::Fit`]. Defaults max to `f32::MAX` if omitted.
#[macro_export]
macro_rules! fit {
    ($min:expr, $max:expr) => {
        $crate::layout::Sizing::Fit($min, $max)
    };
    ($min:expr) => {
        $crate::fit!($min, f32::MAX)
    };
    () => {
        $crate::fit!(0.0)
    };
}

/// Shorthand macro for [`Sizing::Grow`]. Defaults max to `f32::MAX` if omitted.
#[macro_export]
macro_rules! grow {
    ($min:expr, $max:expr) => {
        $crate::layout::Sizing::Grow($min, $max)
    };
    ($min:expr) => {
        $crate::grow!($min, f32::MAX)
    };
    () => {
        $crate::grow!(0.0)
    };
}

/// Shorthand macro for [`Sizing::Fixed`].
#[macro_export]
macro_rules! fixed {
    ($val:expr) => {
        $crate::layout::Sizing::Fixed($val)
    };
}

/// Shorthand macro for [`Sizing::Percent`].
/// The value has to be in range `0.0..=1.0`.
#[macro_export]
macro_rules! percent {
    ($percent:expr) => {{
        const _: () = assert!(
            $percent >= 0.0 && $percent <= 1.0,
            "Percent value must be between 0.0 and 1.0 inclusive!"
        );
        $crate::layout::Sizing::Percent($percent)
    }};
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fit_macro() {
        let both_args = fit!(12.0, 34.0);
        assert!(matches!(both_args, Sizing::Fit(12.0, 34.0)));

        let one_arg = fit!(12.0);
        assert!(matches!(one_arg, Sizing::Fit(12.0, f32::MAX)));

        let zero_args = fit!();
        assert!(matches!(zero_args, Sizing::Fit(0.0, f32::MAX)));
    }

    #[test]
    fn grow_macro() {
        let both_args = grow!(12.0, 34.0);
        assert!(matches!(both_args, Sizing::Grow(12.0, 34.0)));

        let zero_args = grow!();
        assert!(matches!(zero_args, Sizing::Grow(0.0, f32::MAX)));
    }

    #[test]
    fn fixed_pins_both_bounds() {
        let axis: SizingAxis = fixed!(123.0).into();
        assert_eq!(axis.type_, SizingType::Fixed);
        assert_eq!(axis.min_max, SizingMinMax { min: 123.0, max: 123.0 });
    }

    #[test]
    fn percent_keeps_fraction() {
        let axis: SizingAxis = percent!(0.5).into();
        assert_eq!(axis.type_, SizingType::Percent);
        assert_eq!(axis.percent, 0.5);
    }

    #[test]
    fn padding_tuple_is_css_order() {
        let padding: Padding = (1, 2, 3, 4).into();
        assert_eq!(padding, Padding::new(4, 2, 1, 3));
        assert_eq!(padding.along(true), 6.0);
        assert_eq!(padding.along(false), 4.0);
    }

    #[test]
    fn direction_axis() {
        assert!(LayoutDirection::LeftToRight.is_along(true));
        assert!(!LayoutDirection::LeftToRight.is_along(false));
        assert!(LayoutDirection::TopToBottom.is_along(false));
    }
}
