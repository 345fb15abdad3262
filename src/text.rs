use crate::align::AlignX;
use crate::color::Color;

/// Where a text element may break into lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum WrapMode {
    /// Breaks between words and at newlines; the element may shrink down to its longest word.
    #[default]
    Words,
    /// Breaks at newlines only.
    Newline,
    /// One line, overflowing the parent if it must.
    None,
}

/// How a text leaf is measured and laid out.
///
/// Everything except `color`, `alignment` and `user_data` feeds the measurement cache key, so
/// changing any of those fields measures the text again.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextConfig {
    /// Opaque value copied onto every text command of the element.
    pub user_data: usize,
    pub color: Color,
    /// Fonts live with the host; this is whatever handle its measure function understands.
    pub font_id: u16,
    pub font_size: u16,
    /// Extra pixels added after every word.
    pub letter_spacing: u16,
    /// Overrides the measured line height when nonzero.
    pub line_height: u16,
    pub wrap_mode: WrapMode,
    /// Horizontal placement of each wrapped line inside the element.
    pub alignment: AlignX,
    /// Key the measurement cache on the full text instead of its address.
    ///
    /// Owned text is always keyed on its contents.
    pub hash_string_contents: bool,
}

impl TextConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Height of one line: the configured override, or `measured` when none is set.
    #[inline]
    pub fn line_height_or(&self, measured: f32) -> f32 {
        if self.line_height > 0 {
            self.line_height as f32
        } else {
            measured
        }
    }

    #[inline]
    pub fn color(&mut self, color: impl Into<Color>) -> &mut Self {
        self.color = color.into();
        self
    }

    #[inline]
    pub fn font_id(&mut self, id: u16) -> &mut Self {
        self.font_id = id;
        self
    }

    #[inline]
    pub fn font_size(&mut self, size: u16) -> &mut Self {
        self.font_size = size;
        self
    }

    #[inline]
    pub fn letter_spacing(&mut self, spacing: u16) -> &mut Self {
        self.letter_spacing = spacing;
        self
    }

    #[inline]
    pub fn line_height(&mut self, height: u16) -> &mut Self {
        self.line_height = height;
        self
    }

    #[inline]
    pub fn wrap_mode(&mut self, mode: WrapMode) -> &mut Self {
        self.wrap_mode = mode;
        self
    }

    #[inline]
    pub fn alignment(&mut self, alignment: AlignX) -> &mut Self {
        self.alignment = alignment;
        self
    }

    #[inline]
    pub fn user_data(&mut self, user_data: usize) -> &mut Self {
        self.user_data = user_data;
        self
    }

    /// Forces content hashing for the measurement cache key.
    #[inline]
    pub fn hash_contents(&mut self) -> &mut Self {
        self.hash_string_contents = true;
        self
    }
}
