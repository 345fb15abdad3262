//! The Ply prelude: a single import for everything you need to declare a layout.
//!
//! ```rust
//! use ply_layout::prelude::*;
//! ```

// Core types
pub use crate::{ElementBuilder, Ply, Ui};
pub use crate::color::Color;
pub use crate::id::Id;
pub use crate::math::{BoundingBox, Dimensions, Vector2};
pub use crate::layout::{Padding, Sizing};
pub use crate::text::TextConfig;
pub use crate::engine::{PointerData, PointerDataInteractionState, Settings};
pub use crate::errors::{Error, ErrorType};
pub use crate::render_commands::{RenderCommand, RenderCommandConfig, RenderCommandType};

// Macros
pub use crate::{grow, fit, fixed, percent};

// Alignment, globbed
pub use crate::align::AlignX::{self, *};
pub use crate::align::AlignY::{self, *};

// LayoutDirection, globbed
pub use crate::layout::LayoutDirection::{self, *};

// WrapMode is not globbed
pub use crate::text::WrapMode;
