/// Outcome of converting the text of an editable field.
///
/// `None` means the field is cleared. That is not a failure, callers must not
/// mark the field as invalid for it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseResult<T, E> {
    None,
    Valid(T),
    Invalid(E),
}

impl<T, E> Default for ParseResult<T, E> {
    fn default() -> Self {
        ParseResult::None
    }
}

impl<T, E> ParseResult<T, E> {
    pub fn and_then<RT>(self, f: impl FnOnce(T) -> ParseResult<RT, E>) -> ParseResult<RT, E> {
        match self {
            ParseResult::None => ParseResult::None,
            ParseResult::Valid(v) => f(v),
            ParseResult::Invalid(e) => ParseResult::Invalid(e),
        }
    }

    pub fn map<RT>(self, f: impl FnOnce(T) -> RT) -> ParseResult<RT, E> {
        match self {
            ParseResult::None => ParseResult::None,
            ParseResult::Valid(v) => ParseResult::Valid(f(v)),
            ParseResult::Invalid(e) => ParseResult::Invalid(e),
        }
    }

    pub fn get(self) -> Option<T> {
        match self {
            ParseResult::Valid(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            ParseResult::Invalid(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ParseResult::None)
    }

    /// Splits into the `(value, error)` pair an input field consumes.
    /// A cleared field yields `(None, None)`.
    pub fn into_parts(self) -> (Option<T>, Option<E>) {
        match self {
            ParseResult::None => (None, None),
            ParseResult::Valid(v) => (Some(v), None),
            ParseResult::Invalid(e) => (None, Some(e)),
        }
    }
}

impl<T, E> From<Result<T, E>> for ParseResult<T, E> {
    fn from(r: Result<T, E>) -> Self {
        match r {
            Ok(v) => ParseResult::Valid(v),
            Err(e) => ParseResult::Invalid(e),
        }
    }
}
