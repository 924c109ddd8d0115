use shared::error::ErrorCode;
use thiserror::Error;

use crate::reorder::ReorderError;

/// Failure taxonomy of the synchronization engine. Nothing here is fatal to
/// the process: transport failures are recovered by scheduled reconnection,
/// decode failures are dropped inside the read loop, and command failures
/// are surfaced to the caller as recoverable errors.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The push connection failed to open or dropped mid-stream.
    #[error("push transport failed: {0}")]
    Transport(String),

    /// A push payload was not well-formed. Only ever logged; the read loop
    /// never propagates this.
    #[error("malformed push payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A request/response command failed at the network level.
    #[error("command transport failed: {0}")]
    Command(#[from] reqwest::Error),

    /// The server rejected a command.
    #[error("command rejected ({code:?}): {message}")]
    Rejected { code: ErrorCode, message: String },

    /// A drag gesture was used out of order.
    #[error(transparent)]
    Reorder(#[from] ReorderError),
}
