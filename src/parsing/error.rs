use thiserror::Error;

use crate::parsing::parse_result::ParseResult;

/// Why a piece of user-typed text could not be turned into a value.
///
/// `EmptyInput` marks a cleared field. Its message is empty so an input field
/// can render it unconditionally.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum ConversionError {
    #[error("")]
    EmptyInput,
    #[error("Hour must be 1-12")]
    HourOutOfRange,
    #[error("Minute must be 0-59")]
    MinuteOutOfRange,
    #[error("Duration must not be negative")]
    NegativeDuration,
    #[error("Could not parse as {expected}")]
    UnparseableText { expected: &'static str },
}

impl ConversionError {
    pub const UNPARSEABLE_TIME: ConversionError = ConversionError::UnparseableText {
        expected: "time",
    };
    pub const UNPARSEABLE_DURATION: ConversionError = ConversionError::UnparseableText {
        expected: "duration",
    };

    /// Everything except `EmptyInput` marks the field invalid.
    pub fn is_error(&self) -> bool {
        !matches!(self, ConversionError::EmptyInput)
    }
}

pub type Conversion<T> = ParseResult<T, ConversionError>;

impl<T> Conversion<T> {
    /// The reason to show next to the field, `EmptyInput` for a cleared one.
    pub fn reason(&self) -> Option<ConversionError> {
        match self {
            ParseResult::None => Some(ConversionError::EmptyInput),
            ParseResult::Valid(_) => None,
            ParseResult::Invalid(e) => Some(*e),
        }
    }
}
