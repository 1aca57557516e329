//! Whole-file binary transfer once the policy has decided.

use crate::common::errors::{SyncError, TransferFault};
use crate::remote::RemoteSession;
use std::fs::File;
use std::path::Path;

/// Stores the local artifact under `file_name` in the session's current
/// directory. The local file must exist; the engine checks that before
/// dialing.
pub fn push(
    session: &mut dyn RemoteSession,
    local_path: &Path,
    file_name: &str,
) -> Result<u64, SyncError> {
    let mut source = File::open(local_path).map_err(|e| fault(file_name, e.into()))?;
    let bytes = session
        .store(file_name, &mut source)
        .map_err(|e| fault(file_name, e.into()))?;
    tracing::info!(file = file_name, bytes, "stored save state");
    Ok(bytes)
}

/// Retrieves `file_name` from the session's current directory into
/// `local_path`, creating the local parent directory if missing.
///
/// No partial-file cleanup is promised on a mid-transfer failure.
pub fn pull(
    session: &mut dyn RemoteSession,
    file_name: &str,
    local_path: &Path,
) -> Result<u64, SyncError> {
    if let Some(parent) = local_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| fault(file_name, e.into()))?;
    }

    let mut sink = File::create(local_path).map_err(|e| fault(file_name, e.into()))?;
    let bytes = session
        .retrieve(file_name, &mut sink)
        .map_err(|e| fault(file_name, e.into()))?;
    tracing::info!(file = file_name, bytes, "retrieved save state");
    Ok(bytes)
}

fn fault(name: &str, source: TransferFault) -> SyncError {
    SyncError::Transfer {
        name: name.to_string(),
        source,
    }
}
