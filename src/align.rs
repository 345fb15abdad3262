/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum AlignX {
    #[default]
    Left,
    CenterX,
    Right,
}

/// Vertical alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum AlignY {
    #[default]
    Top,
    CenterY,
    Bottom,
}

impl AlignX {
    /// Portion of the free space placed before the aligned item.
    #[inline]
    pub(crate) fn leading_share(self, free_space: f32) -> f32 {
        match self {
            AlignX::Left => 0.0,
            AlignX::CenterX => free_space / 2.0,
            AlignX::Right => free_space,
        }
    }
}

impl AlignY {
    #[inline]
    pub(crate) fn leading_share(self, free_space: f32) -> f32 {
        match self {
            AlignY::Top => 0.0,
            AlignY::CenterY => free_space / 2.0,
            AlignY::Bottom => free_space,
        }
    }
}
