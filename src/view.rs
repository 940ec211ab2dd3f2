//! Display-facing operation state.

use crate::sync::SyncError;

/// State of one user-triggered operation as the display layer sees it.
///
/// An operation starts in `Loading` and makes a single terminal transition
/// to `Loaded` or `Failed`. Nothing retries on its own; invoking the
/// operation again starts a fresh state.
#[derive(Debug)]
pub enum ViewState<T> {
    Loading,
    Loaded(T),
    Failed(SyncError),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Loading | Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&SyncError> {
        match self {
            Self::Failed(err) => Some(err),
            Self::Loading | Self::Loaded(_) => None,
        }
    }
}

impl<T> From<Result<T, SyncError>> for ViewState<T> {
    fn from(result: Result<T, SyncError>) -> Self {
        match result {
            Ok(value) => Self::Loaded(value),
            Err(err) => Self::Failed(err),
        }
    }
}
