/// Paint color carried on rectangle, text and border commands.
///
/// Channels are plain `f32` on a 0 to 255 scale; the engine never blends, it only forwards the
/// value and checks alpha to decide whether a background is worth emitting.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 255.0)
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Byte channels, opaque.
    /// ```
    /// use ply_layout::color::Color;
    /// assert_eq!(Color::u_rgb(0x20, 0x40, 0x60), Color::rgb(32.0, 64.0, 96.0));
    /// ```
    pub const fn u_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::u_rgba(r, g, b, u8::MAX)
    }

    pub const fn u_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(r as f32, g as f32, b as f32, a as f32)
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Only colors with a nonzero alpha produce background rectangles.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.a > 0.0
    }
}

macro_rules! color_from_tuples {
    ($channel:ty, $rgb:ident, $rgba:ident) => {
        impl From<($channel, $channel, $channel)> for Color {
            fn from((r, g, b): ($channel, $channel, $channel)) -> Self {
                Self::$rgb(r, g, b)
            }
        }

        impl From<($channel, $channel, $channel, $channel)> for Color {
            fn from((r, g, b, a): ($channel, $channel, $channel, $channel)) -> Self {
                Self::$rgba(r, g, b, a)
            }
        }
    };
}

color_from_tuples!(f32, rgb, rgba);
color_from_tuples!(u8, u_rgb, u_rgba);

/// `0xRRGGBB`, always opaque.
impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        let [_, r, g, b] = hex.to_be_bytes();
        Color::u_rgb(r, g, b)
    }
}
