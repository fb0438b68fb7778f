//! Data layer errors.

use thiserror::Error;

use crate::store::StoreError;

/// Errors from [`DataManager`](super::DataManager) operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A batch size, window length or similar knob is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A historical fetch was cancelled between windows.
    #[error("historical fetch cancelled after {windows_completed} window(s)")]
    Cancelled { windows_completed: usize },
}
