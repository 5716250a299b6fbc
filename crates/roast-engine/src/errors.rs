use roast_core::errors::{ExError, ExErrorKind};
use thiserror::Error;

/// Failure reported by a synchronization attempt
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// The remote side refused the transaction
    #[error("sync rejected: {reason}")]
    Rejected { reason: String },

    /// The remote side could not be reached
    #[error("sync transport failure: {message}")]
    Transport { message: String },

    /// The sync task panicked or was cancelled before reporting
    #[error("sync task failed: {message}")]
    TaskFailed { message: String },
}

impl From<SyncError> for ExError {
    fn from(err: SyncError) -> Self {
        ExError::new(ExErrorKind::SyncFailed).with_message(err.to_string())
    }
}
