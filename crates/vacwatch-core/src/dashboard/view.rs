use serde::Serialize;

use crate::error::CoreError;

/// What a data view shows.
///
/// `Empty` (a successful fetch with no rows) and `Failed` are distinct
/// states; `Invalid` means the input was rejected before any request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum ViewState<T> {
    Loading,
    Invalid(String),
    Failed(String),
    Empty,
    Ready(T),
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self::Loading
    }
}

impl<T> ViewState<T> {
    /// Map a fetch result; every success is `Ready`.
    pub fn from_result(result: Result<T, CoreError>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(e) => Self::from_error(&e),
        }
    }

    pub fn from_error(err: &CoreError) -> Self {
        if err.is_validation() {
            Self::Invalid(err.to_string())
        } else {
            Self::Failed(err.to_string())
        }
    }

    /// Transform the `Ready` payload, keeping every other state.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ViewState<U> {
        match self {
            Self::Loading => ViewState::Loading,
            Self::Invalid(message) => ViewState::Invalid(message),
            Self::Failed(message) => ViewState::Failed(message),
            Self::Empty => ViewState::Empty,
            Self::Ready(value) => ViewState::Ready(f(value)),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> ViewState<Vec<T>> {
    /// Map a list fetch; an empty list is `Empty`, not `Ready(vec![])`.
    pub fn from_list(result: Result<Vec<T>, CoreError>) -> Self {
        match result {
            Ok(items) if items.is_empty() => Self::Empty,
            other => Self::from_result(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_is_not_an_error() {
        let state: ViewState<Vec<u8>> = ViewState::from_list(Ok(Vec::new()));
        assert_eq!(state, ViewState::Empty);
    }

    #[test]
    fn failure_keeps_message() {
        let state: ViewState<Vec<u8>> = ViewState::from_list(Err(CoreError::Timeout));
        assert!(matches!(state, ViewState::Failed(ref m) if m.contains("timed out")));
    }

    #[test]
    fn validation_is_its_own_state() {
        let state: ViewState<u8> = ViewState::from_result(Err(CoreError::InvalidVacancyId {
            raw: "abc".into(),
        }));
        assert_eq!(state, ViewState::Invalid("Invalid vacancy id: abc".into()));
    }
}
