//! Page view state: loading, failed or loaded.

use serde::Serialize;

/// Three-phase state of a page
///
/// `Loading` is the initial phase. `Failed` is terminal for the current
/// mount: later data is ignored until [`retry`](ViewState::retry).
/// `Loaded` keeps accepting incremental updates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", content = "value", rename_all = "lowercase")]
pub enum ViewState<T> {
    Loading,
    Failed(String),
    Loaded(T),
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        ViewState::Loading
    }
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    /// Replace the data
    ///
    /// Returns `false` when the state has already failed.
    pub fn load(&mut self, value: T) -> bool {
        if matches!(self, ViewState::Failed(_)) {
            return false;
        }
        *self = ViewState::Loaded(value);
        true
    }

    /// Move to the failed phase
    pub fn fail(&mut self, message: impl Into<String>) {
        *self = ViewState::Failed(message.into());
    }

    /// Apply an incremental update to loaded data
    ///
    /// Returns `false` when there is nothing loaded to update.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) -> bool {
        match self {
            ViewState::Loaded(value) => {
                f(value);
                true
            }
            _ => false,
        }
    }

    /// Start over from `Loading`
    pub fn retry(&mut self) {
        *self = ViewState::Loading;
    }
}
