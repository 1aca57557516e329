//! Typed failure taxonomy for sync operations.
//!
//! Everything fatal surfaces as one `SyncError` variant with a message a
//! player can act on. Recoverable conditions (timestamp tier failures,
//! channel discovery failures) never appear here; they degrade to fallbacks
//! inside the modules that hit them.

use crate::remote::RemoteError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("FTP username or password not set; run `savepass config set --username ... --password ...`")]
    MissingCredentials,

    #[error("login rejected by {endpoint}: {message}")]
    AuthenticationFailure { endpoint: String, message: String },

    #[error("could not connect to any configured host (tried: {0}): {1}", .tried.join(", "), .last_error)]
    DialFailure {
        tried: Vec<String>,
        last_error: String,
    },

    #[error("remote directory {path}: {source}")]
    RemoteDirectory {
        path: String,
        #[source]
        source: RemoteError,
    },

    #[error("transfer of {name} failed: {source}")]
    Transfer {
        name: String,
        #[source]
        source: TransferFault,
    },

    #[error("no local save state at {}", .path.display())]
    LocalArtifactMissing { path: PathBuf },

    #[error("configuration error: {0}")]
    Config(String),
}

/// A transfer can die on either side of the wire.
#[derive(Debug, Error)]
pub enum TransferFault {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("local file error: {0}")]
    Local(#[from] std::io::Error),
}
