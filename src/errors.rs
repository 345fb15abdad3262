use std::borrow::Cow;

/// Every condition the engine reports through the error handler.
///
/// None of these abort a frame. The engine substitutes a usable default and keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ErrorType {
    /// A text element was declared but no measurement function was ever provided.
    TextMeasurementFunctionNotProvided,
    /// More elements were declared in one frame than `max_element_count` allows.
    ElementsCapacityExceeded,
    /// More render commands were produced than `max_render_command_count` allows.
    RenderCommandsCapacityExceeded,
    /// The measured-word pool or the measurement cache slots ran out.
    TextMeasurementCapacityExceeded,
    /// A `Percent` sizing value greater than `1.0` was declared.
    PercentageOver1,
    /// Thrown if you are trying to use an id that's already used by some other element
    DuplicateId,
    /// A floating element attached to an id that was never declared.
    FloatingContainerParentNotFound,
    /// Elements were still open at `end_layout`, or the frame protocol was violated.
    UnbalancedOpenClose,
    InternalError,
}

/// Coarse grouping of [`ErrorType`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A fixed capacity was hit. Reported once per frame, excess input is dropped.
    CapacityExceeded,
    /// The declaration asked for something impossible. A best-effort default is used instead.
    Configuration,
    /// Signals a caller or engine bug rather than a normal runtime condition.
    InternalInvariantViolation,
}

impl ErrorType {
    pub fn category(self) -> ErrorCategory {
        match self {
            ErrorType::ElementsCapacityExceeded
            | ErrorType::RenderCommandsCapacityExceeded
            | ErrorType::TextMeasurementCapacityExceeded => ErrorCategory::CapacityExceeded,
            ErrorType::TextMeasurementFunctionNotProvided
            | ErrorType::PercentageOver1
            | ErrorType::DuplicateId
            | ErrorType::FloatingContainerParentNotFound => ErrorCategory::Configuration,
            ErrorType::UnbalancedOpenClose | ErrorType::InternalError => {
                ErrorCategory::InternalInvariantViolation
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{type_:?}: {text}")]
pub struct Error {
    pub type_: ErrorType,
    pub text: Cow<'static, str>,
}

impl Error {
    pub fn new(type_: ErrorType, text: impl Into<Cow<'static, str>>) -> Self {
        Self {
            type_,
            text: text.into(),
        }
    }

    #[inline]
    pub fn category(&self) -> ErrorCategory {
        self.type_.category()
    }
}
